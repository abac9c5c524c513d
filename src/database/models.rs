use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFile {
    pub file_id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub upload_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub transcription_id: i64,
    pub file_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarFinding {
    pub grammar_id: i64,
    pub transcription_id: i64,
    pub issue: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosTag {
    pub pos_id: i64,
    pub transcription_id: i64,
    pub token: String,
    pub pos_tag: String,
    pub full_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionResult {
    pub emotion_id: i64,
    pub transcription_id: i64,
    pub emotion: String,
    pub fluency_score: f64,
    pub wpm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceQuality {
    pub vq_id: i64,
    pub transcription_id: i64,
    pub pitch: f64,
    pub volume: f64,
    pub clarity: f64,
    pub score: f64,
}

/// Everything one successful ingest writes, handed to the database as a
/// single unit so persistence is all-or-nothing.
#[derive(Debug, Clone)]
pub struct IngestRecord {
    pub user_id: i64,
    pub file_name: String,
    pub upload_date: String,
    pub transcript: String,
    /// (issue message, comma-joined replacement suggestions)
    pub grammar_findings: Vec<(String, String)>,
    /// (token, coarse tag, fine tag), in transcript order
    pub pos_tags: Vec<(String, String, String)>,
    pub emotion: String,
    pub fluency_score: f64,
    pub wpm: f64,
    pub pitch: f64,
    pub volume: f64,
    pub clarity: f64,
}

/// Row ids created by one ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestIds {
    pub file_id: i64,
    pub transcription_id: i64,
}

/// Row counts per table, for the stats view and the cascade tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStats {
    pub users: i64,
    pub audio_files: i64,
    pub transcriptions: i64,
    pub grammar_findings: i64,
    pub pos_tags: i64,
    pub emotions: i64,
    pub voice_qualities: i64,
}
