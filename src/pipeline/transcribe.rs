//! Speech-to-text collaborator: whisper.cpp's CLI invoked on the prepared
//! waveform, JSON output parsed back into a transcript.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// The transcript of one waveform.
#[derive(Debug, Clone)]
pub struct TranscriptResult {
    pub text: String,
}

/// Waveform path in, transcript out.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav_path: &Path) -> Result<TranscriptResult>;
}

pub struct WhisperCli {
    cli_path: PathBuf,
    model_path: PathBuf,
    output_dir: PathBuf,
}

impl WhisperCli {
    pub fn new(cli_path: PathBuf, model_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            cli_path,
            model_path,
            output_dir,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(&self, wav_path: &Path) -> Result<TranscriptResult> {
        if !self.model_path.exists() {
            return Err(anyhow!("Model not found: {:?}", self.model_path));
        }

        let output_base = self
            .output_dir
            .join(format!("transcript_{}", uuid::Uuid::new_v4().simple()));

        log::info!("Running whisper-cli on {:?}", wav_path);

        let output = Command::new(&self.cli_path)
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(wav_path)
            .arg("-oj")
            .arg("-of")
            .arg(&output_base)
            .output()
            .await
            .map_err(|e| anyhow!("Failed to spawn whisper-cli: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "whisper-cli failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let json_path = output_base.with_extension("json");
        let content = std::fs::read_to_string(&json_path)
            .with_context(|| format!("Failed to read transcript output {:?}", json_path))?;
        let parsed: WhisperOutput =
            serde_json::from_str(&content).context("Failed to parse whisper-cli JSON output")?;

        if let Err(e) = std::fs::remove_file(&json_path) {
            log::warn!("Failed to remove transcript scratch file: {}", e);
        }

        let text = parsed
            .transcription
            .iter()
            .map(|s| s.text.as_str())
            .collect::<String>()
            .trim()
            .to_string();

        Ok(TranscriptResult { text })
    }
}

/// The slice of whisper-cli's `-oj` output this pipeline consumes.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    transcription: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    text: String,
}
