pub mod analysis;
pub mod bytecode;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod runtime;
pub mod syntax;
