use std::collections::{BTreeMap, HashMap};

use crate::syntax::expression::FnInfo;

use super::variable::{VarHandle, Variable};

/// Name under which a struct literal's object is bound.
pub const THIS: &str = "this";

#[derive(Debug, Default)]
pub struct FunctionScope {
    num_locals: usize,
    captures: HashMap<String, VarHandle>,
    /// Name-ordered sources for each capture, taken from the enclosing function.
    parent_captures: BTreeMap<String, VarHandle>,
}

impl FunctionScope {
    fn next_slot(&mut self) -> usize {
        let slot = self.num_locals;
        self.num_locals += 1;
        slot
    }

    fn capture(&mut self, name: &str, source: VarHandle) -> VarHandle {
        let handle = VarHandle::new(Variable::capture(
            self.captures.len(),
            source.get().is_const,
        ));
        self.captures.insert(name.to_string(), handle.clone());
        self.parent_captures.insert(name.to_string(), source);
        handle
    }

    /// Freezes the function: capture slots follow the name order of `parent_captures`.
    fn finish(self) -> FnInfo {
        let mut parent_captures = Vec::with_capacity(self.parent_captures.len());
        for (slot, (name, source)) in self.parent_captures.into_iter().enumerate() {
            if let Some(handle) = self.captures.get(&name) {
                handle.set_slot(slot);
            }
            parent_captures.push(source);
        }
        FnInfo {
            num_locals: self.num_locals,
            num_captures: self.captures.len(),
            parent_captures,
        }
    }
}

#[derive(Debug)]
pub enum ScopeKind {
    Function(FunctionScope),
    Block,
    /// A struct literal; `this` is bound on first use.
    Struct { this: Option<VarHandle> },
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    defs: HashMap<String, VarHandle>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            defs: HashMap::new(),
        }
    }
}

/// Where a lookup stopped while walking outward.
enum Hit {
    Found(VarHandle),
    UnboundThis(usize),
}

/// The lexical scope chain, innermost last.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_function(&mut self) {
        self.scopes
            .push(Scope::new(ScopeKind::Function(FunctionScope::default())));
    }

    pub fn push_block(&mut self) {
        self.scopes.push(Scope::new(ScopeKind::Block));
    }

    pub fn push_struct(&mut self) {
        self.scopes.push(Scope::new(ScopeKind::Struct { this: None }));
    }

    /// Pops the innermost scope, which must be a function scope.
    pub fn pop_function(&mut self) -> FnInfo {
        match self.scopes.pop().map(|scope| scope.kind) {
            Some(ScopeKind::Function(function)) => function.finish(),
            _ => FnInfo::default(),
        }
    }

    pub fn pop_block(&mut self) {
        self.scopes.pop();
    }

    /// Pops a struct scope, returning the `this` slot if one was bound.
    pub fn pop_struct(&mut self) -> Option<usize> {
        match self.scopes.pop().map(|scope| scope.kind) {
            Some(ScopeKind::Struct { this }) => this.map(|handle| handle.get().slot),
            _ => None,
        }
    }

    pub fn is_defined_in_current(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.defs.contains_key(name))
    }

    /// Defines `name` in the innermost scope with a fresh local slot. Returns
    /// `None` if the name already exists there.
    pub fn define(&mut self, name: &str, is_const: bool) -> Option<VarHandle> {
        if self.is_defined_in_current(name) {
            return None;
        }
        let top = self.scopes.len().checked_sub(1)?;
        let slot = self.allocate_slot(top)?;
        let handle = VarHandle::new(Variable::local(slot, is_const));
        self.scopes[top]
            .defs
            .insert(name.to_string(), handle.clone());
        Some(handle)
    }

    /// Reserves an unnamed local slot in the nearest function scope.
    pub fn allocate_hidden(&mut self) -> Option<usize> {
        let top = self.scopes.len().checked_sub(1)?;
        self.allocate_slot(top)
    }

    /// Takes the next slot from the nearest function scope at or below `from`.
    fn allocate_slot(&mut self, from: usize) -> Option<usize> {
        self.scopes[..=from]
            .iter_mut()
            .rev()
            .find_map(|scope| match &mut scope.kind {
                ScopeKind::Function(function) => Some(function.next_slot()),
                _ => None,
            })
    }

    /// Resolves a reference, threading captures through every function
    /// boundary between the use and the definition.
    pub fn resolve(&mut self, name: &str) -> Option<VarHandle> {
        let mut crossed = Vec::new();
        let mut hit = None;

        for index in (0..self.scopes.len()).rev() {
            let scope = &self.scopes[index];
            if let Some(handle) = scope.defs.get(name) {
                hit = Some(Hit::Found(handle.clone()));
                break;
            }
            match &scope.kind {
                ScopeKind::Struct { this } if name == THIS => {
                    hit = Some(match this {
                        Some(handle) => Hit::Found(handle.clone()),
                        None => Hit::UnboundThis(index),
                    });
                    break;
                }
                ScopeKind::Function(function) => {
                    if let Some(handle) = function.captures.get(name) {
                        hit = Some(Hit::Found(handle.clone()));
                        break;
                    }
                    crossed.push(index);
                }
                _ => {}
            }
        }

        let mut handle = match hit? {
            Hit::Found(handle) => handle,
            Hit::UnboundThis(index) => self.bind_this(index)?,
        };

        // Outermost crossed function first, so each one captures from its parent.
        for &index in crossed.iter().rev() {
            if let ScopeKind::Function(function) = &mut self.scopes[index].kind {
                handle = function.capture(name, handle);
            }
        }
        Some(handle)
    }

    fn bind_this(&mut self, struct_index: usize) -> Option<VarHandle> {
        let slot = self.allocate_slot(struct_index)?;
        let handle = VarHandle::new(Variable::local(slot, true));
        if let ScopeKind::Struct { this } = &mut self.scopes[struct_index].kind {
            *this = Some(handle.clone());
        }
        Some(handle)
    }
}
