use std::rc::Rc;

use super::{
    errors::{RuntimeError, RuntimeResult},
    value::Value,
};

/// Field names shared by every object built from one struct template.
pub type Layout = Rc<[Rc<str>]>;

/// A struct instance. Created empty by `OpNewObject` and given its fields by
/// `OpInitObject`; until then every field access fails.
#[derive(Debug, Default)]
pub struct Object {
    layout: Option<Layout>,
    values: Vec<Value>,
}

impl Object {
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.layout.is_some()
    }

    pub fn initialize(&mut self, layout: Layout, values: Vec<Value>) -> RuntimeResult<()> {
        if self.layout.is_some() {
            return Err(RuntimeError::InvalidBytecode(
                "struct initialized twice".to_string(),
            ));
        }
        if layout.len() != values.len() {
            return Err(RuntimeError::InvalidBytecode(format!(
                "struct expects {} fields, got {}",
                layout.len(),
                values.len()
            )));
        }
        self.layout = Some(layout);
        self.values = values;
        Ok(())
    }

    fn position(&self, name: &str) -> RuntimeResult<usize> {
        let layout = self
            .layout
            .as_ref()
            .ok_or(RuntimeError::UninitializedObject)?;
        layout
            .iter()
            .position(|key| key.as_ref() == name)
            .ok_or_else(|| RuntimeError::NoSuchField(name.to_string()))
    }

    pub fn get(&self, name: &str) -> RuntimeResult<Value> {
        let index = self.position(name)?;
        Ok(self.values[index].clone())
    }

    /// Replaces an existing field. Fields cannot be added.
    pub fn set(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        let index = self.position(name)?;
        self.values[index] = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fields in declaration order; empty while uninitialized.
    pub fn fields(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.layout
            .iter()
            .flat_map(|layout| layout.iter())
            .zip(self.values.iter())
    }
}
