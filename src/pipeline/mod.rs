//! The audio ingest pipeline: one uploaded recording is normalized, run
//! through the collaborator chain (transcription, grammar, POS, emotion),
//! scored, and persisted as a unit.

pub mod audio;
pub mod emotion;
pub mod grammar;
pub mod metrics;
pub mod tagger;
pub mod transcribe;


use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::database::{Database, IngestIds, IngestRecord};
use emotion::{EmotionClassifier, Wav2Vec2Sidecar};
use grammar::{GrammarChecker, LanguageToolClient};
use tagger::{PosTagger, SpacyTagger};
use transcribe::{Transcriber, WhisperCli};

/// What one successful ingest produced, returned to the caller as the
/// success notification payload.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub file_id: i64,
    pub transcription_id: i64,
    pub transcript: String,
    pub grammar_finding_count: usize,
    pub pos_tag_count: usize,
    pub emotion: String,
    pub fluency_score: f64,
    pub wpm: f64,
}

/// Owns the collaborator handles and the scratch directory. Collaborators
/// sit behind traits so tests substitute fakes with the same contracts.
pub struct IngestPipeline {
    transcriber: Box<dyn Transcriber>,
    grammar: Box<dyn GrammarChecker>,
    tagger: Box<dyn PosTagger>,
    emotion: Box<dyn EmotionClassifier>,
    work_dir: PathBuf,
}

impl IngestPipeline {
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        grammar: Box<dyn GrammarChecker>,
        tagger: Box<dyn PosTagger>,
        emotion: Box<dyn EmotionClassifier>,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            transcriber,
            grammar,
            tagger,
            emotion,
            work_dir,
        }
    }

    /// Wire up the real collaborators from configuration. Handles hold
    /// paths only; no model weights load until the first upload needs them.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(WhisperCli::new(
                config.whisper_cli_path.clone(),
                config.whisper_model_path.clone(),
                config.work_dir.clone(),
            )),
            Box::new(LanguageToolClient::new(&config.languagetool_url)),
            Box::new(SpacyTagger::new(
                config.python_path.clone(),
                config.pos_script_path.clone(),
            )),
            Box::new(Wav2Vec2Sidecar::new(
                config.python_path.clone(),
                config.emotion_script_path.clone(),
            )),
            config.work_dir.clone(),
        )
    }

    /// Run the full ingest for one recording owned by `user_id`.
    ///
    /// Strictly sequential: normalize, transcribe, then fan out to the text
    /// and waveform analyses. Every collaborator must succeed before any
    /// row is written; persistence happens in a single transaction, so a
    /// failure anywhere leaves the database untouched.
    pub async fn run(&self, db: &Database, user_id: i64, source: &Path) -> Result<IngestOutcome> {
        let upload_date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.to_string_lossy().to_string());

        log::info!("Ingest started: {} (user {})", file_name, user_id);

        let prepared = audio::prepare_waveform(source, &self.work_dir).await?;
        let result = self
            .analyze(db, user_id, file_name, upload_date, &prepared)
            .await;
        prepared.cleanup();

        if let Ok(outcome) = &result {
            log::info!(
                "Ingest complete: file {} transcription {} ({} grammar, {} tags, emotion {})",
                outcome.file_id,
                outcome.transcription_id,
                outcome.grammar_finding_count,
                outcome.pos_tag_count,
                outcome.emotion
            );
        }

        result
    }

    async fn analyze(
        &self,
        db: &Database,
        user_id: i64,
        file_name: String,
        upload_date: String,
        prepared: &audio::PreparedAudio,
    ) -> Result<IngestOutcome> {
        let transcript = self.transcriber.transcribe(&prepared.wav_path).await?;

        let issues = self.grammar.check(&transcript.text).await?;
        let tokens = self.tagger.tag(&transcript.text).await?;
        let distribution = self.emotion.classify(&prepared.wav_path).await?;
        let predicted = emotion::dominant_label(&distribution)
            .ok_or_else(|| anyhow::anyhow!("Emotion classifier returned no labels"))?;

        let duration = prepared.duration_seconds();
        let words = metrics::word_count(&transcript.text);
        let wpm = metrics::words_per_minute(words, duration);
        let fluency = metrics::fluency_score(wpm);
        let voice = metrics::analyze_waveform(&prepared.samples, audio::NATIVE_SAMPLE_RATE);

        let record = IngestRecord {
            user_id,
            file_name,
            upload_date,
            transcript: transcript.text.clone(),
            grammar_findings: issues
                .iter()
                .map(|i| (i.message.clone(), i.suggestion()))
                .collect(),
            pos_tags: tokens
                .iter()
                .map(|t| (t.text.clone(), t.pos.clone(), t.tag.clone()))
                .collect(),
            emotion: predicted.label.clone(),
            fluency_score: fluency,
            wpm,
            pitch: voice.pitch,
            volume: voice.volume,
            clarity: voice.clarity,
        };

        let IngestIds {
            file_id,
            transcription_id,
        } = db.record_ingest(&record)?;

        Ok(IngestOutcome {
            file_id,
            transcription_id,
            transcript: transcript.text,
            grammar_finding_count: issues.len(),
            pos_tag_count: tokens.len(),
            emotion: predicted.label.clone(),
            fluency_score: fluency,
            wpm,
        })
    }
}
