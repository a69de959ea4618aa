pub mod diagnostic;
pub mod error_code;
pub mod position;

pub use diagnostic::{Diagnostic, Severity, render_diagnostics, render_report};
pub use error_code::*;
pub use position::{Position, Span};

/// Default number of diagnostics printed before the rest are summarised.
pub const DEFAULT_MAX_ERRORS: usize = 50;
