use std::env;

use super::{ErrorCode, ErrorType, Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub title: String,
    pub code: Option<String>,
    pub error_type: Option<ErrorType>,
    pub message: Option<String>,
    pub file: Option<String>,
    pub span: Option<Span>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            code: None,
            error_type: None,
            message: None,
            file: None,
            span: None,
            hints: Vec::new(),
        }
    }

    /// Builds an error from a registered code; the title comes from the registry.
    pub fn make_error(spec: &'static ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Diagnostic::error(spec.title)
            .with_code(spec.code)
            .with_error_type(spec.error_type)
            .with_message(message)
            .with_span(span)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn position(&self) -> Option<Position> {
        self.span.map(|span| span.start)
    }

    pub fn render(&self, source: Option<&str>, default_file: Option<&str>) -> String {
        let mut out = String::new();
        let use_color = env::var_os("NO_COLOR").is_none() && source.is_some();
        let yellow = "\u{1b}[33m";
        let red = "\u{1b}[31m";
        let reset = "\u{1b}[0m";
        let file = self
            .file
            .as_deref()
            .filter(|f| !f.is_empty())
            .or(default_file)
            .unwrap_or("<unknown>");
        let code = self.code.as_deref().unwrap_or("E0000");
        let label = self.error_type.map(|t| t.prefix()).unwrap_or("Error");

        // Header: -- Compiler error: undefined symbol [E0102]
        if use_color {
            out.push_str(yellow);
        }
        out.push_str(&format!(
            "-- {}: {} [{}]\n",
            label,
            self.title.to_lowercase(),
            code
        ));
        if use_color {
            out.push_str(reset);
        }

        if let Some(message) = &self.message {
            out.push('\n');
            out.push_str(message);
            out.push('\n');
        }

        if let Some(span) = self.span {
            let position = span.start;
            out.push_str(&format!(
                "\n  --> {}:{}:{}\n",
                file,
                position.line,
                position.column + 1
            ));

            if let Some(line_text) = source.and_then(|src| source_line(src, position.line)) {
                let width = position.line.to_string().len();
                let line_len = line_text.len();
                let caret_start = position.column.min(line_len);
                let caret_end = if span.end.line == position.line {
                    span.end.column.min(line_len)
                } else {
                    line_len
                };
                let caret_len = caret_end.saturating_sub(caret_start).max(1);

                out.push_str(&format!("{:>width$} |\n", "", width = width));
                out.push_str(&format!(
                    "{:>width$} | {}\n",
                    position.line,
                    line_text,
                    width = width
                ));
                out.push_str(&format!(
                    "{:>width$} | {}",
                    "",
                    " ".repeat(caret_start),
                    width = width
                ));
                if use_color {
                    out.push_str(red);
                }
                out.push_str(&"^".repeat(caret_len));
                if use_color {
                    out.push_str(reset);
                }
                out.push('\n');
            }
        }

        if !self.hints.is_empty() {
            out.push_str("\nHint:\n");
            for hint in &self.hints {
                out.push_str(&format!("  {}\n", hint));
            }
        }

        out
    }
}

pub fn render_diagnostics(
    diagnostics: &[Diagnostic],
    source: Option<&str>,
    default_file: Option<&str>,
) -> String {
    diagnostics
        .iter()
        .map(|diag| diag.render(source, default_file))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders at most `max_errors` diagnostics and summarises the rest.
pub fn render_report(
    diagnostics: &[Diagnostic],
    source: Option<&str>,
    default_file: Option<&str>,
    max_errors: usize,
) -> String {
    let shown = diagnostics.len().min(max_errors);
    let mut out = render_diagnostics(&diagnostics[..shown], source, default_file);
    let hidden = diagnostics.len() - shown;
    if hidden > 0 {
        out.push_str(&format!(
            "\n... and {} more error{} not shown (use --max-errors to raise the limit)",
            hidden,
            if hidden == 1 { "" } else { "s" }
        ));
    }
    out
}

fn source_line(source: &str, line: usize) -> Option<&str> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::UNDEFINED_SYMBOL;

    #[test]
    fn render_includes_code_location_and_caret() {
        let span = Span::new(Position::new(2, 4), Position::new(2, 7));
        let diag = Diagnostic::make_error(&UNDEFINED_SYMBOL, "`foo` is not defined.", span)
            .with_file("main.em");
        let rendered = diag.render(None, None);

        assert!(rendered.contains("[E0102]"));
        assert!(rendered.contains("undefined symbol"));
        assert!(rendered.contains("main.em:2:5"));
    }

    #[test]
    fn report_summarises_hidden_diagnostics() {
        let span = Span::new(Position::new(1, 0), Position::new(1, 1));
        let diags: Vec<Diagnostic> = (0..3)
            .map(|_| Diagnostic::make_error(&UNDEFINED_SYMBOL, "x", span))
            .collect();
        let rendered = render_report(&diags, None, Some("t.em"), 1);

        assert_eq!(rendered.matches("[E0102]").count(), 1);
        assert!(rendered.ends_with("... and 2 more errors not shown (use --max-errors to raise the limit)"));
    }

    #[test]
    fn render_with_source_underlines_span() {
        let source = "let a = 1;\nlet b = foo;";
        let span = Span::new(Position::new(2, 8), Position::new(2, 11));
        let diag = Diagnostic::make_error(&UNDEFINED_SYMBOL, "`foo` is not defined.", span);
        let rendered = diag.render(Some(source), Some("t.em"));

        assert!(rendered.contains("2 | let b = foo;"));
        assert!(rendered.contains("^^^"));
    }
}
