//! Static analysis: binds every identifier to a local slot, a capture slot or
//! a native, and records per-function frame layouts for the compiler.

pub mod errors;
pub mod resolver;
pub mod scope;
pub mod variable;

pub use errors::{ResolveError, ResolveErrorKind};
pub use resolver::resolve;
pub use variable::{Resolution, VarHandle, Variable};
