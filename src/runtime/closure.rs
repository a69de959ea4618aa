use std::{fmt, rc::Rc};

use super::value::Cell;

/// A runtime instance of a function template.
///
/// `captures` starts empty and is filled by the capture instructions that
/// follow `OpNewFunc`; each entry aliases a cell of the creating frame.
pub struct Closure {
    pub function: usize,
    pub name: Rc<str>,
    pub captures: Vec<Cell>,
}

impl Closure {
    pub fn new(function: usize, name: Rc<str>) -> Self {
        Self {
            function,
            name,
            captures: Vec::new(),
        }
    }
}

// Captured cells can point back at the closure itself.
impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("function", &self.function)
            .field("name", &self.name)
            .field("captures", &self.captures.len())
            .finish()
    }
}
