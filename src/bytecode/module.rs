use std::fmt;

use serde::{Deserialize, Serialize};

use super::op_code::{Instructions, disassemble};

/// A constant-pool entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{}", value),
            Constant::Float(value) => write!(f, "{:?}", value),
            Constant::Str(value) => write!(f, "{:?}", value),
        }
    }
}

/// Maps an instruction offset to the source line it was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntry {
    pub offset: usize,
    pub line: usize,
}

/// The immutable blueprint shared by every closure created from one function literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTemplate {
    pub name: String,
    pub arity: usize,
    pub num_locals: usize,
    pub num_captures: usize,
    pub instructions: Instructions,
    pub lines: Vec<LineEntry>,
}

impl FunctionTemplate {
    /// Source line of the instruction at (or last starting before) `ip`.
    pub fn line_at(&self, ip: usize) -> Option<usize> {
        match self.lines.binary_search_by_key(&ip, |entry| entry.offset) {
            Ok(index) => self.lines.get(index).map(|entry| entry.line),
            Err(index) => index
                .checked_sub(1)
                .and_then(|prev| self.lines.get(prev))
                .map(|entry| entry.line),
        }
    }
}

/// Field names of a struct literal, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructTemplate {
    pub keys: Vec<String>,
}

/// A compiled program. Function template 0 is the top level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    pub constants: Vec<Constant>,
    pub functions: Vec<FunctionTemplate>,
    pub structs: Vec<StructTemplate>,
}

impl Module {
    pub const ROOT: usize = 0;

    pub fn root(&self) -> Option<&FunctionTemplate> {
        self.functions.get(Self::ROOT)
    }

    /// Human-readable listing of every template and the constant pool.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for (index, function) in self.functions.iter().enumerate() {
            out.push_str(&format!(
                "== fn #{} {} (arity {}, locals {}, captures {}) ==\n",
                index, function.name, function.arity, function.num_locals, function.num_captures
            ));
            out.push_str(&disassemble(&function.instructions));
        }
        if !self.constants.is_empty() {
            out.push_str("== constants ==\n");
            for (index, constant) in self.constants.iter().enumerate() {
                out.push_str(&format!("{:04} {}\n", index, constant));
            }
        }
        if !self.structs.is_empty() {
            out.push_str("== structs ==\n");
            for (index, template) in self.structs.iter().enumerate() {
                out.push_str(&format!("{:04} {{{}}}\n", index, template.keys.join(", ")));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(lines: Vec<LineEntry>) -> FunctionTemplate {
        FunctionTemplate {
            name: "f".to_string(),
            arity: 0,
            num_locals: 0,
            num_captures: 0,
            instructions: Vec::new(),
            lines,
        }
    }

    #[test]
    fn line_at_uses_nearest_preceding_entry() {
        let function = template(vec![
            LineEntry { offset: 0, line: 1 },
            LineEntry { offset: 3, line: 2 },
            LineEntry { offset: 9, line: 4 },
        ]);
        assert_eq!(function.line_at(0), Some(1));
        assert_eq!(function.line_at(4), Some(2));
        assert_eq!(function.line_at(9), Some(4));
        assert_eq!(function.line_at(100), Some(4));
        assert_eq!(template(Vec::new()).line_at(0), None);
    }

    #[test]
    fn module_serializes_to_json() {
        let module = Module {
            constants: vec![Constant::Int(3), Constant::Str("hi".to_string())],
            functions: vec![template(vec![LineEntry { offset: 0, line: 1 }])],
            structs: vec![StructTemplate {
                keys: vec!["a".to_string()],
            }],
        };
        let json = serde_json::to_string(&module).expect("serialize");
        let back: Module = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, module);
    }
}
