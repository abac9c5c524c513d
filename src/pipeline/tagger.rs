//! Part-of-speech collaborator: a spaCy sidecar script fed the transcript
//! on stdin, returning one JSON record per token on stdout.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One token with its coarse and fine-grained tags, in transcript order.
#[derive(Debug, Clone, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    pub pos: String,
    pub tag: String,
}

/// Transcript text in, ordered token/tag list out.
#[async_trait]
pub trait PosTagger: Send + Sync {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedToken>>;
}

pub struct SpacyTagger {
    python_path: PathBuf,
    script_path: PathBuf,
}

impl SpacyTagger {
    pub fn new(python_path: PathBuf, script_path: PathBuf) -> Self {
        Self {
            python_path,
            script_path,
        }
    }
}

#[async_trait]
impl PosTagger for SpacyTagger {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
        log::info!("Running POS tagger sidecar: text_len={}", text.len());

        let mut child = Command::new(&self.python_path)
            .arg(&self.script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow!("Failed to spawn POS tagger: {}", e))?;

        // The transcript goes over stdin so arbitrarily long text never hits
        // argv limits.
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("Failed to open POS tagger stdin"))?;
            stdin.write_all(text.as_bytes()).await?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| anyhow!("Failed to wait for POS tagger: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("POS tagger failed: {}", stderr.trim()));
        }

        let tokens: Vec<TaggedToken> = serde_json::from_slice(&output.stdout)
            .context("Failed to parse POS tagger output")?;

        Ok(tokens)
    }
}
