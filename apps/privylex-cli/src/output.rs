use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use privylex_core::config::IoConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub query: String,
    pub processed_files: Vec<String>,
    pub analysis: String,
    pub timestamp: String,
}

impl AnalysisRecord {
    pub fn new(query: &str, processed_files: Vec<String>, analysis: String) -> Self {
        Self {
            query: query.to_string(),
            processed_files,
            analysis,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// The completion marker. Exactly one of `analysis_output_path` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionMarker {
    #[serde(rename = "deterministic-output-path")]
    pub deterministic_output_path: String,
    #[serde(rename = "analysis-output-path", skip_serializing_if = "Option::is_none", default)]
    pub analysis_output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Resolved artifact locations inside the output directory.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub result: PathBuf,
    pub analysis: PathBuf,
    pub computed: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, io: &IoConfig) -> Self {
        Self { result: dir.join(&io.result_file), analysis: dir.join(&io.analysis_file), computed: dir.join(&io.computed_file) }
    }

    pub fn write_success(&self, record: &AnalysisRecord) -> Result<()> {
        ensure_parent(&self.result)?;
        fs::write(&self.result, &record.analysis).with_context(|| format!("writing {}", self.result.display()))?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.analysis, json).with_context(|| format!("writing {}", self.analysis.display()))?;
        self.write_marker(&CompletionMarker {
            deterministic_output_path: self.result.display().to_string(),
            analysis_output_path: Some(self.analysis.display().to_string()),
            error: None,
        })
    }

    /// Best effort on `result.txt`; the marker write is what decides success.
    pub fn write_failure(&self, message: &str) -> Result<()> {
        ensure_parent(&self.result)?;
        if let Err(e) = fs::write(&self.result, message) {
            tracing::warn!(error = %e, "could not write error text to result file");
        }
        self.write_marker(&CompletionMarker {
            deterministic_output_path: self.result.display().to_string(),
            analysis_output_path: None,
            error: Some(message.to_string()),
        })
    }

    fn write_marker(&self, marker: &CompletionMarker) -> Result<()> {
        let json = serde_json::to_string(marker)?;
        fs::write(&self.computed, json).with_context(|| format!("writing {}", self.computed.display()))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_uses_hyphenated_keys() {
        let m = CompletionMarker {
            deterministic_output_path: "/out/result.txt".into(),
            analysis_output_path: Some("/out/analysis.json".into()),
            error: None,
        };
        assert_eq!(
            serde_json::to_string(&m).unwrap(),
            r#"{"deterministic-output-path":"/out/result.txt","analysis-output-path":"/out/analysis.json"}"#
        );
    }

    #[test]
    fn failure_marker_carries_error_only() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path(), &IoConfig::default());
        paths.write_failure("Error in legal document analysis: boom").unwrap();
        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&paths.computed).unwrap()).unwrap();
        assert_eq!(v["error"], "Error in legal document analysis: boom");
        assert!(v.get("analysis-output-path").is_none());
        assert_eq!(fs::read_to_string(&paths.result).unwrap(), "Error in legal document analysis: boom");
    }

    #[test]
    fn analysis_json_keeps_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path(), &IoConfig::default());
        paths.write_success(&AnalysisRecord::new("Kündigung?", vec!["vertrag.pdf".into()], "Frist: drei Monate.".into())).unwrap();
        let raw = fs::read_to_string(&paths.analysis).unwrap();
        assert!(raw.contains("Kündigung?"));
        assert!(raw.contains("\n  \"query\""));
        let rec: AnalysisRecord = serde_json::from_str(&raw).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&rec.timestamp).is_ok());
    }
}
