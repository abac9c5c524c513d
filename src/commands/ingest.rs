use crate::database::{AudioFile, Database};
use crate::error::AppError;
use crate::pipeline::{audio, IngestOutcome, IngestPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tauri::{Emitter, State};

/// Upload and analyze one audio file for the selected user.
///
/// Blocks until the full collaborator chain has run and everything is
/// persisted; the returned outcome is the success notification, and an
/// `analysis_complete` event tells every result view to re-query.
#[tauri::command]
pub async fn ingest_audio(
    app: tauri::AppHandle,
    db: State<'_, Arc<Database>>,
    pipeline: State<'_, Arc<IngestPipeline>>,
    user_id: i64,
    file_path: String,
) -> Result<IngestOutcome, AppError> {
    let source = PathBuf::from(&file_path);

    if !audio::is_accepted(&source) {
        return Err(AppError::InvalidInput(format!(
            "Unsupported file type: {}",
            file_path
        )));
    }

    db.get_user(user_id)
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("No user with id {}", user_id)))?;

    let outcome = pipeline
        .run(&**db, user_id, &source)
        .await
        .map_err(|e| AppError::Collaborator(e.to_string()))?;

    if let Err(e) = app.emit("analysis_complete", outcome.transcription_id) {
        log::warn!("Failed to emit analysis_complete: {}", e);
    }

    Ok(outcome)
}

/// List a user's uploads, newest first.
#[tauri::command]
pub async fn get_audio_files(
    db: State<'_, Arc<Database>>,
    user_id: i64,
) -> Result<Vec<AudioFile>, AppError> {
    db.list_audio_files(user_id).map_err(AppError::from)
}
