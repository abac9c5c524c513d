use crate::database::{
    AppStats, Database, EmotionResult, GrammarFinding, PosTag, Transcription, VoiceQuality,
};
use crate::error::AppError;
use std::sync::Arc;
use tauri::State;

/// How many rows the list-shaped result views show.
const RECENT_LIMIT: i64 = 10;

/// Latest transcription, if any
#[tauri::command]
pub async fn get_latest_transcription(
    db: State<'_, Arc<Database>>,
) -> Result<Option<Transcription>, AppError> {
    db.latest_transcription().map_err(AppError::from)
}

/// Latest 10 grammar findings
#[tauri::command]
pub async fn get_recent_grammar_findings(
    db: State<'_, Arc<Database>>,
) -> Result<Vec<GrammarFinding>, AppError> {
    db.recent_grammar_findings(RECENT_LIMIT)
        .map_err(AppError::from)
}

/// Latest 10 POS tags
#[tauri::command]
pub async fn get_recent_pos_tags(db: State<'_, Arc<Database>>) -> Result<Vec<PosTag>, AppError> {
    db.recent_pos_tags(RECENT_LIMIT).map_err(AppError::from)
}

/// Latest emotion and fluency result, if any
#[tauri::command]
pub async fn get_latest_emotion(
    db: State<'_, Arc<Database>>,
) -> Result<Option<EmotionResult>, AppError> {
    db.latest_emotion().map_err(AppError::from)
}

/// Latest voice-quality summary, if any
#[tauri::command]
pub async fn get_latest_voice_quality(
    db: State<'_, Arc<Database>>,
) -> Result<Option<VoiceQuality>, AppError> {
    db.latest_voice_quality().map_err(AppError::from)
}

/// Row counts across all tables
#[tauri::command]
pub async fn get_stats(db: State<'_, Arc<Database>>) -> Result<AppStats, AppError> {
    db.get_stats().map_err(AppError::from)
}
