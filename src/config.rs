use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration, loaded from `config.yaml` in the app data
/// directory. Every field has a default so a missing file just means a
/// stock installation; a malformed file is a startup error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Scratch directory for transcoded/normalized waveforms.
    pub work_dir: PathBuf,
    /// whisper.cpp CLI binary.
    pub whisper_cli_path: PathBuf,
    /// ggml model file passed to whisper-cli.
    pub whisper_model_path: PathBuf,
    /// Base URL of the local LanguageTool server.
    pub languagetool_url: String,
    /// Python interpreter used for the sidecar scripts.
    pub python_path: PathBuf,
    /// spaCy POS tagging sidecar script.
    pub pos_script_path: PathBuf,
    /// wav2vec2 emotion classification sidecar script.
    pub emotion_script_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = app_data_dir();
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let whisper_dir = home_dir.join("bin").join("whisper-cpp").join("whisper.cpp");

        Self {
            database_path: data_dir.join("voicelab.db"),
            work_dir: data_dir.join("work"),
            whisper_cli_path: whisper_dir.join("build").join("bin").join("whisper-cli"),
            whisper_model_path: whisper_dir.join("models").join("ggml-tiny.bin"),
            languagetool_url: "http://localhost:8081".to_string(),
            python_path: data_dir.join("venv").join("bin").join("python"),
            pos_script_path: data_dir.join("scripts").join("pos_tagger.py"),
            emotion_script_path: data_dir.join("scripts").join("emotion_classifier.py"),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&app_data_dir().join("config.yaml"))
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Create the directories the app writes into.
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }
        std::fs::create_dir_all(&self.work_dir)
            .with_context(|| format!("Failed to create work directory {:?}", self.work_dir))?;
        Ok(())
    }
}

fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voicelab")
}
