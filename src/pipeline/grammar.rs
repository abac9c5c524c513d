//! Grammar-checking collaborator: a local LanguageTool server queried over
//! its REST API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CHECK_LANGUAGE: &str = "en-US";

/// One issue flagged by the checker.
#[derive(Debug, Clone)]
pub struct GrammarIssue {
    pub message: String,
    pub replacements: Vec<String>,
}

impl GrammarIssue {
    /// The persisted suggestion field: replacements joined with ", ".
    pub fn suggestion(&self) -> String {
        self.replacements.join(", ")
    }
}

/// Transcript text in, flagged issues out.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, text: &str) -> Result<Vec<GrammarIssue>>;
}

pub struct LanguageToolClient {
    client: reqwest::Client,
    base_url: String,
}

impl LanguageToolClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<Vec<GrammarIssue>> {
        let url = format!("{}/v2/check", self.base_url);

        log::info!(
            "Checking grammar via LanguageTool: text_len={}",
            text.len()
        );

        let response = self
            .client
            .post(&url)
            .form(&[("text", text), ("language", CHECK_LANGUAGE)])
            .send()
            .await
            .map_err(|e| anyhow!("Grammar checker not reachable: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Grammar checker returned {}: {}", status, body));
        }

        let result: CheckResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse grammar checker response: {}", e))?;

        Ok(result
            .matches
            .into_iter()
            .map(|m| GrammarIssue {
                message: m.message,
                replacements: m.replacements.into_iter().map(|r| r.value).collect(),
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<CheckMatch>,
}

#[derive(Debug, Deserialize)]
struct CheckMatch {
    message: String,
    #[serde(default)]
    replacements: Vec<Replacement>,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_joins_replacements() {
        let issue = GrammarIssue {
            message: "Possible agreement error".to_string(),
            replacements: vec!["is".to_string(), "was".to_string()],
        };
        assert_eq!(issue.suggestion(), "is, was");
    }

    #[test]
    fn suggestion_empty_when_no_replacements() {
        let issue = GrammarIssue {
            message: "Unpaired bracket".to_string(),
            replacements: vec![],
        };
        assert_eq!(issue.suggestion(), "");
    }

    #[test]
    fn parses_check_response() {
        let raw = r#"{
            "software": {"name": "LanguageTool"},
            "matches": [
                {
                    "message": "This sentence does not start with an uppercase letter.",
                    "replacements": [{"value": "The"}],
                    "offset": 0,
                    "length": 3
                }
            ]
        }"#;
        let parsed: CheckResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(parsed.matches[0].replacements[0].value, "The");
    }
}
