#![allow(dead_code)]

use std::{cell::RefCell, io, rc::Rc, sync::Arc};

use ember::driver::{EmberError, compile_source, run_source};
use ember::runtime::{RuntimeFault, value::Value, vm::Interpreter};

/// Runs `source` and renders the returned value.
pub fn eval(source: &str) -> String {
    match run_source(source) {
        Ok(value) => value.to_string(),
        Err(err) => panic!("{}", err.render(Some(source), Some("<test>"))),
    }
}

pub fn eval_err(source: &str) -> EmberError {
    match run_source(source) {
        Ok(value) => panic!("expected an error, got {}", value),
        Err(err) => err,
    }
}

pub fn runtime_fault(source: &str) -> RuntimeFault {
    match eval_err(source) {
        EmberError::Runtime(fault) => fault,
        EmberError::Static(diagnostics) => panic!("static errors: {:?}", diagnostics),
    }
}

/// Captures everything `print` writes.
#[derive(Clone, Default)]
pub struct Captured(Rc<RefCell<Vec<u8>>>);

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `source`, returning what it printed.
pub fn output_of(source: &str) -> (Result<Value, RuntimeFault>, String) {
    let module = match compile_source(source) {
        Ok(module) => module,
        Err(diagnostics) => panic!("static errors: {:?}", diagnostics),
    };
    let captured = Captured::default();
    let mut interpreter = Interpreter::new(Arc::new(module)).with_output(Box::new(captured.clone()));
    let result = interpreter.run();
    (result, captured.text())
}
