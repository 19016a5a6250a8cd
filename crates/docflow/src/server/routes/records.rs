//! Registry record lookup

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::FileRecord;

/// GET /api/records/:file_id - registry record for a file
pub async fn get_record(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<FileRecord>> {
    state
        .records()
        .lookup(&file_id)?
        .map(Json)
        .ok_or(Error::RecordNotFound(file_id))
}
