use std::{cell::Cell, fmt, rc::Rc};

/// Where a resolved name lives at runtime: a slot in the frame's locals, or a
/// slot in the running closure's capture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub slot: usize,
    pub is_const: bool,
    pub is_capture: bool,
}

impl Variable {
    pub fn local(slot: usize, is_const: bool) -> Self {
        Self {
            slot,
            is_const,
            is_capture: false,
        }
    }

    pub fn capture(slot: usize, is_const: bool) -> Self {
        Self {
            slot,
            is_const,
            is_capture: true,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_capture { "capture" } else { "local" };
        let constness = if self.is_const { " const" } else { "" };
        write!(f, "{}#{}{}", kind, self.slot, constness)
    }
}

/// A binding shared between every identifier that resolves to it.
///
/// Capture slots are only final once the owning function has been fully
/// visited (they are numbered in name order), so identifiers hold a handle
/// rather than a copy.
#[derive(Debug, Clone)]
pub struct VarHandle(Rc<Cell<Variable>>);

impl VarHandle {
    pub fn new(variable: Variable) -> Self {
        Self(Rc::new(Cell::new(variable)))
    }

    pub fn get(&self) -> Variable {
        self.0.get()
    }

    pub(crate) fn set_slot(&self, slot: usize) {
        let mut variable = self.0.get();
        variable.slot = slot;
        self.0.set(variable);
    }

    pub fn ptr_eq(&self, other: &VarHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// The binding the resolver attaches to an identifier use.
#[derive(Debug, Clone)]
pub enum Resolution {
    Variable(VarHandle),
    /// Index into the native function table.
    Native(u16),
}

impl Resolution {
    pub fn variable(&self) -> Option<Variable> {
        match self {
            Resolution::Variable(handle) => Some(handle.get()),
            Resolution::Native(_) => None,
        }
    }
}
