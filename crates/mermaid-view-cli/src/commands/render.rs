//! `mermaid-view render` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mermaid_view::{
    Document, HostBinding, MermaidConfig, MermaidRenderer, MermaidToolbarOptions,
    OrchestratorOptions, OrchestratorPhase, Page, PipelineOptions, ReadyState, RendererSettings,
    ToolbarInput,
};
use tokio::sync::mpsc;

use crate::compiler::PlaceholderCompiler;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// XHTML body content of the page to render.
    page: PathBuf,

    /// Toolbar options file (`.json`, otherwise TOML).
    #[arg(short, long)]
    toolbar: Option<PathBuf>,

    /// Compiler configuration as a JSON object (e.g. '{"theme":"dark"}').
    #[arg(short, long)]
    config: Option<String>,

    /// Scans to attempt before concluding the page has no diagrams.
    #[arg(long, default_value_t = 1)]
    attempts: u32,

    /// Print only the body's inner HTML.
    #[arg(long)]
    body_only: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the page or options cannot be loaded, or the
    /// renderer fails to start.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let html = runtime.block_on(self.render(output))?;
        output.document(&html)?;
        Ok(())
    }

    async fn render(&self, output: &Output) -> Result<String, CliError> {
        let markup = std::fs::read_to_string(&self.page)?;
        let page = Page::new(Document::from_body_html(&markup)?);

        let toolbar = self
            .toolbar
            .as_deref()
            .map(MermaidToolbarOptions::load)
            .transpose()?
            .map(ToolbarInput::from);
        let config = self.config.as_deref().map(parse_config).transpose()?;
        let settings = RendererSettings {
            toolbar,
            config,
            pipeline: PipelineOptions::headless(),
            orchestrator: OrchestratorOptions {
                max_attempts: self.attempts.max(1),
                ..OrchestratorOptions::default()
            },
        };

        let (_signals, signal_rx) = mpsc::channel(1);
        let renderer = MermaidRenderer::initialize(
            HostBinding {
                page: page.clone(),
                compiler: Arc::new(PlaceholderCompiler),
                ready_state: ReadyState::Complete,
                signals: signal_rx,
            },
            settings,
        )?;

        let status = renderer
            .handle()
            .wait_for(|s| {
                matches!(
                    s.phase,
                    OrchestratorPhase::Complete | OrchestratorPhase::Exhausted
                )
            })
            .await;
        renderer.shutdown().await;

        let views = renderer.pipeline().views();
        let failed = views.iter().filter(|view| view.render_error).count();
        if views.is_empty() {
            output.warning(&format!("No diagrams found after {} scan(s)", status.scans));
        } else if failed > 0 {
            output.warning(&format!("Rendered {} diagram(s), {failed} failed", views.len()));
        } else {
            output.success(&format!("Rendered {} diagram(s)", views.len()));
        }
        for view in views.iter().filter(|view| view.render_error) {
            if let Some(details) = &view.render_error_details {
                output.info(&format!("  {}: {details}", view.mount_id));
            }
        }

        let doc = page.lock();
        let html = match doc.body() {
            Some(body) if self.body_only => doc.inner_html(body),
            _ => doc.outer_html(doc.root()),
        };
        Ok(html)
    }
}

fn parse_config(raw: &str) -> Result<MermaidConfig, CliError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    MermaidConfig::from_value(value)
        .ok_or_else(|| CliError::Validation("--config must be a JSON object".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(page: PathBuf) -> RenderArgs {
        RenderArgs {
            page,
            toolbar: None,
            config: None,
            attempts: 1,
            body_only: true,
        }
    }

    #[tokio::test]
    async fn test_renders_page_with_placeholder_graphics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.xhtml");
        std::fs::write(
            &path,
            r#"<h1>Doc</h1><div class="language-mermaid"><button class="copy">Copy</button><pre><code>graph TD
  A --&gt; B</code></pre></div>"#,
        )
        .unwrap();

        let html = args(path).render(&Output::new()).await.unwrap();
        assert!(html.starts_with("<h1>Doc</h1>"));
        assert!(html.contains(r#"class="mermaid-wrapper""#));
        assert!(html.contains(r#"viewBox="0 0 480 80""#));
        assert!(html.contains("mermaid-flowchart"));
        assert!(!html.contains("<pre"));
        assert!(!html.contains("Copy"));
    }

    #[tokio::test]
    async fn test_page_without_diagrams_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.xhtml");
        std::fs::write(&path, "<p>No diagrams here.</p>").unwrap();

        let html = args(path).render(&Output::new()).await.unwrap();
        assert_eq!(html, "<p>No diagrams here.</p>");
    }

    #[test]
    fn test_config_must_be_an_object() {
        assert!(parse_config(r#"{"theme":"dark"}"#).is_ok());
        assert!(matches!(parse_config("[1, 2]"), Err(CliError::Validation(_))));
        assert!(matches!(parse_config("{"), Err(CliError::Json(_))));
    }
}
