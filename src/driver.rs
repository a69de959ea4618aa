//! The scan → parse → resolve → compile → run pipeline, shared by the CLI,
//! the integration tests and the benches.

use std::sync::Arc;

use crate::analysis::{self, ResolveError};
use crate::bytecode::{compile, module::Module};
use crate::diagnostics::Diagnostic;
use crate::runtime::{RuntimeFault, value::Value, vm::Interpreter};
use crate::syntax;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmberError {
    #[error("{} error(s) before execution", .0.len())]
    Static(Vec<Diagnostic>),
    #[error(transparent)]
    Runtime(#[from] RuntimeFault),
}

impl EmberError {
    pub fn render(&self, source: Option<&str>, file: Option<&str>) -> String {
        match self {
            EmberError::Static(diagnostics) => {
                crate::diagnostics::render_diagnostics(diagnostics, source, file)
            }
            EmberError::Runtime(fault) => fault.render(source, file),
        }
    }
}

/// Every static diagnostic for `source`, or the compiled module.
pub fn compile_source(source: &str) -> Result<Module, Vec<Diagnostic>> {
    let mut program = syntax::parse(source)?;
    analysis::resolve(&mut program).map_err(|errors| {
        errors
            .iter()
            .map(ResolveError::to_diagnostic)
            .collect::<Vec<_>>()
    })?;
    compile(&program).map_err(|error| vec![error.to_diagnostic()])
}

pub fn run_source(source: &str) -> Result<Value, EmberError> {
    let module = compile_source(source).map_err(EmberError::Static)?;
    Ok(Interpreter::new(Arc::new(module)).run()?)
}
