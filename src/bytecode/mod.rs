pub mod compiler;
pub mod module;
pub mod module_cache;
pub mod op_code;
pub mod verify;

pub use compiler::{CompileError, compile};
pub use module::{Constant, FunctionTemplate, LineEntry, Module, StructTemplate};
pub use verify::{VerifyError, verify};
