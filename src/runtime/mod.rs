//! Values, cells and the bytecode interpreter.
//!
//! Locals live in reference-counted cells so closures can alias them.
//! Nothing here is `Send`: an interpreter and everything it creates stay on
//! one thread, and only the compiled [`Module`](crate::bytecode::Module) is
//! shared across threads.

pub mod closure;
pub mod errors;
pub mod frame;
pub mod hash_key;
pub mod native;
pub mod object;
pub mod value;
pub mod vm;

pub use errors::{RuntimeError, RuntimeFault, RuntimeResult, TraceEntry};
pub use value::{Cell, Value};
pub use vm::Interpreter;
