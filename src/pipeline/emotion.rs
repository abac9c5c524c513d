//! Emotion collaborator: a sidecar script wrapping a wav2vec2
//! speech-emotion model. The script returns the full label distribution;
//! the pipeline takes the arg-max.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// One label with its score from the classifier's output distribution.
#[derive(Debug, Clone, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f64,
}

/// 16 kHz mono waveform path in, label distribution out.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, wav_path: &Path) -> Result<Vec<EmotionScore>>;
}

/// The predicted emotion is the arg-max of the distribution.
pub fn dominant_label(scores: &[EmotionScore]) -> Option<&EmotionScore> {
    scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

pub struct Wav2Vec2Sidecar {
    python_path: PathBuf,
    script_path: PathBuf,
}

impl Wav2Vec2Sidecar {
    pub fn new(python_path: PathBuf, script_path: PathBuf) -> Self {
        Self {
            python_path,
            script_path,
        }
    }
}

#[async_trait]
impl EmotionClassifier for Wav2Vec2Sidecar {
    async fn classify(&self, wav_path: &Path) -> Result<Vec<EmotionScore>> {
        log::info!("Running emotion classifier sidecar on {:?}", wav_path);

        let output = Command::new(&self.python_path)
            .arg(&self.script_path)
            .arg(wav_path)
            .output()
            .await
            .map_err(|e| anyhow!("Failed to spawn emotion classifier: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Emotion classifier failed: {}", stderr.trim()));
        }

        let scores: Vec<EmotionScore> = serde_json::from_slice(&output.stdout)
            .context("Failed to parse emotion classifier output")?;

        if scores.is_empty() {
            return Err(anyhow!("Emotion classifier returned an empty distribution"));
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_highest_score() {
        let scores = vec![
            EmotionScore {
                label: "neutral".to_string(),
                score: 0.2,
            },
            EmotionScore {
                label: "happy".to_string(),
                score: 0.7,
            },
            EmotionScore {
                label: "sad".to_string(),
                score: 0.1,
            },
        ];
        assert_eq!(dominant_label(&scores).unwrap().label, "happy");
    }

    #[test]
    fn argmax_of_empty_is_none() {
        assert!(dominant_label(&[]).is_none());
    }

    #[test]
    fn parses_distribution() {
        let raw = r#"[
            {"label": "angry", "score": 0.05},
            {"label": "calm", "score": 0.83},
            {"label": "fearful", "score": 0.12}
        ]"#;
        let scores: Vec<EmotionScore> = serde_json::from_str(raw).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(dominant_label(&scores).unwrap().label, "calm");
    }
}
