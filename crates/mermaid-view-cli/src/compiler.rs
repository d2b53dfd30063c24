//! Stand-in compiler for headless previews.

use mermaid_view::{CompileError, CompileFuture, DiagramCompiler, DiagramKind, Graphic, MermaidConfig};

const WIDTH: f64 = 480.0;
const LINE_HEIGHT: f64 = 40.0;

/// Produces an empty graphic sized by the number of diagram lines.
pub(crate) struct PlaceholderCompiler;

impl DiagramCompiler for PlaceholderCompiler {
    fn initialize(&self, config: &MermaidConfig) {
        tracing::debug!(
            theme = config.theme().unwrap_or("default"),
            "Placeholder compiler initialized"
        );
    }

    fn compile<'a>(&'a self, code: &'a str, _config: &'a MermaidConfig) -> CompileFuture<'a> {
        Box::pin(async move { placeholder(code) })
    }
}

fn placeholder(code: &str) -> Result<Graphic, CompileError> {
    let lines = code
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("%%"))
        .count();
    if lines == 0 {
        return Err(CompileError::new("No diagram definition found"));
    }

    let kind = DiagramKind::detect(code);
    let height = LINE_HEIGHT * f64::from(u32::try_from(lines).unwrap_or(u32::MAX));
    tracing::debug!(kind = kind.name(), lines, "Compiled placeholder diagram");
    Ok(Graphic {
        view_box: Some(format!("0 0 {WIDTH} {height}")),
        ..Graphic::sized(WIDTH, height)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_height_follows_significant_lines() {
        let graphic = placeholder("%% title\ngraph TD\n  A --> B\n\n  B --> C").unwrap();
        assert_eq!(graphic.height, Some(120.0));
        assert_eq!(graphic.view_box.as_deref(), Some("0 0 480 120"));
    }

    #[test]
    fn test_blank_code_fails() {
        let err = placeholder("  \n%% only a comment").unwrap_err();
        assert_eq!(err.message(), "No diagram definition found");
    }
}
