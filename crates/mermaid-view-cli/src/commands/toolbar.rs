//! `mermaid-view toolbar` command implementation.

use std::path::PathBuf;

use clap::Args;
use mermaid_view::{MermaidToolbarOptions, resolve};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the toolbar command.
#[derive(Args)]
pub(crate) struct ToolbarArgs {
    /// Toolbar options file (`.json`, otherwise TOML). Defaults when omitted.
    file: Option<PathBuf>,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,
}

impl ToolbarArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let json = self.resolved_json()?;
        output.document(&json)?;
        Ok(())
    }

    fn resolved_json(&self) -> Result<String, CliError> {
        let options = self
            .file
            .as_deref()
            .map(MermaidToolbarOptions::load)
            .transpose()?;
        let resolved = resolve(options.as_ref());
        let json = if self.compact {
            serde_json::to_string(&resolved)?
        } else {
            serde_json::to_string_pretty(&resolved)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let args = ToolbarArgs {
            file: None,
            compact: true,
        };
        let value: Value = serde_json::from_str(&args.resolved_json().unwrap()).unwrap();
        assert_eq!(value["showLanguageLabel"], json!(true));
        assert_eq!(value["mobile"]["buttons"]["zoomIn"], json!("disabled"));
    }

    #[test]
    fn test_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolbar.toml");
        std::fs::write(&path, "showLanguageLabel = false\n\n[desktop]\nzoomIn = \"disabled\"\n").unwrap();

        let args = ToolbarArgs {
            file: Some(path),
            compact: false,
        };
        let value: Value = serde_json::from_str(&args.resolved_json().unwrap()).unwrap();
        assert_eq!(value["showLanguageLabel"], json!(false));
        assert_eq!(value["desktop"]["buttons"]["zoomIn"], json!("disabled"));
        assert_eq!(value["desktop"]["buttons"]["zoomOut"], json!("enabled"));
    }

    #[test]
    fn test_missing_file() {
        let args = ToolbarArgs {
            file: Some(PathBuf::from("/nonexistent/toolbar.json")),
            compact: true,
        };
        assert!(matches!(args.resolved_json(), Err(CliError::Config(_))));
    }
}
