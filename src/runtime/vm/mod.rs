use std::{
    io::{self, Write},
    rc::Rc,
    sync::Arc,
};

use crate::bytecode::{module::Module, verify::verify};
use crate::runtime::{
    closure::Closure,
    errors::{RuntimeError, RuntimeFault, RuntimeResult},
    frame::Frame,
    object::Layout,
    value::Value,
};

pub(crate) mod binary_ops;
pub(crate) mod comparison_ops;
mod dispatch;
mod function_call;
pub(crate) mod index_ops;
mod trace;

/// Deepest call chain before `StackOverflow`.
pub const MAX_FRAMES: usize = 4096;

/// Executes a compiled [`Module`]. Each interpreter owns its frames and
/// cells; only the module is shared.
pub struct Interpreter {
    module: Arc<Module>,
    constants: Vec<Value>,
    /// Closure names per function template.
    names: Vec<Rc<str>>,
    /// Field layout per struct template.
    layouts: Vec<Layout>,
    frames: Vec<Frame>,
    out: Box<dyn Write>,
}

impl Interpreter {
    pub fn new(module: Arc<Module>) -> Self {
        let constants = module.constants.iter().map(Value::from_constant).collect();
        let names = module
            .functions
            .iter()
            .map(|function| Rc::from(function.name.as_str()))
            .collect();
        let layouts = module
            .structs
            .iter()
            .map(|template| template.keys.iter().map(|key| Rc::from(key.as_str())).collect())
            .collect();

        Self {
            module,
            constants,
            names,
            layouts,
            frames: Vec::new(),
            out: Box::new(io::stdout()),
        }
    }

    /// Redirects `print`.
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Runs the root function and returns its value.
    pub fn run(&mut self) -> Result<Value, RuntimeFault> {
        verify(&self.module).map_err(|err| {
            RuntimeFault::new(RuntimeError::InvalidBytecode(err.to_string()), Vec::new())
        })?;
        let root = Rc::new(Closure::new(
            Module::ROOT,
            Rc::clone(&self.names[Module::ROOT]),
        ));
        self.call(&Value::Closure(root), Vec::new())
    }

    /// Calls `callee` to completion. Safe to use while other calls are in
    /// progress: it returns when its own outermost frame returns.
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeFault> {
        let base_depth = self.frames.len();
        let result = match callee {
            Value::Closure(closure) => self
                .push_call_frame(Rc::clone(closure), args)
                .and_then(|()| self.execute(base_depth)),
            Value::Native(native) => native.call(self.out.as_mut(), &args),
            other => Err(RuntimeError::NotCallable(other.type_name())),
        };

        result.map_err(|error| {
            let fault = RuntimeFault::new(error, self.stack_trace());
            self.frames.truncate(base_depth);
            fault
        })
    }

    /// Steps until the frame at `base_depth` returns.
    fn execute(&mut self, base_depth: usize) -> RuntimeResult<Value> {
        let module = Arc::clone(&self.module);
        loop {
            if let Some(value) = self.advance(&module, base_depth)? {
                return Ok(value);
            }
        }
    }

    fn current_frame(&self) -> RuntimeResult<&Frame> {
        self.frames.last().ok_or_else(no_frame)
    }

    fn current_frame_mut(&mut self) -> RuntimeResult<&mut Frame> {
        self.frames.last_mut().ok_or_else(no_frame)
    }
}

fn no_frame() -> RuntimeError {
    RuntimeError::InvalidBytecode("no active frame".to_string())
}

#[cfg(test)]
mod binary_ops_test;
#[cfg(test)]
mod comparison_ops_test;
#[cfg(test)]
mod index_ops_test;
#[cfg(test)]
mod trace_test;
