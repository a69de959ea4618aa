use std::collections::HashSet;

use crate::runtime::native;

use super::{
    module::{Constant, FunctionTemplate, Module},
    op_code::{Decoded, OpCode, decode},
};

/// Structural problems that make a module unsafe to execute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("module has no root function")]
    MissingRoot,
    #[error("root function must take no parameters")]
    RootHasParameters,
    #[error("fn #{function}: invalid instruction at offset {offset}")]
    InvalidInstruction { function: usize, offset: usize },
    #[error("fn #{function}: unpatched {op} at offset {offset}")]
    LoopSentinel {
        function: usize,
        offset: usize,
        op: OpCode,
    },
    #[error("fn #{function}: operand {operand} of {op} at offset {offset} is out of range")]
    OperandOutOfRange {
        function: usize,
        offset: usize,
        op: OpCode,
        operand: u16,
    },
}

/// Checks every template before it reaches the interpreter: opcodes decode,
/// no loop sentinel survived compilation, and every operand points at
/// something that exists.
pub fn verify(module: &Module) -> Result<(), VerifyError> {
    let root = module.root().ok_or(VerifyError::MissingRoot)?;
    if root.arity != 0 {
        return Err(VerifyError::RootHasParameters);
    }
    for (index, function) in module.functions.iter().enumerate() {
        verify_function(module, index, function)?;
    }
    Ok(())
}

fn verify_function(
    module: &Module,
    index: usize,
    function: &FunctionTemplate,
) -> Result<(), VerifyError> {
    let mut decoded = Vec::new();
    for item in decode(&function.instructions) {
        match item {
            Ok(instruction) => decoded.push(instruction),
            Err(offset) => {
                return Err(VerifyError::InvalidInstruction {
                    function: index,
                    offset,
                });
            }
        }
    }

    let boundaries: HashSet<usize> = decoded
        .iter()
        .map(|instruction| instruction.offset)
        .chain(std::iter::once(function.instructions.len()))
        .collect();

    for instruction in &decoded {
        let Decoded {
            offset, op, operand, ..
        } = *instruction;

        if op.is_loop_sentinel() {
            return Err(VerifyError::LoopSentinel {
                function: index,
                offset,
                op,
            });
        }

        let Some(operand) = operand else {
            continue;
        };
        let value = operand as usize;
        let in_range = match op {
            OpCode::OpConstant => value < module.constants.len(),
            OpCode::OpGetField | OpCode::OpSetField => {
                matches!(module.constants.get(value), Some(Constant::Str(_)))
            }
            OpCode::OpLoadLocal | OpCode::OpStoreLocal | OpCode::OpCaptureLocal => {
                value < function.num_locals
            }
            OpCode::OpLoadCapture | OpCode::OpStoreCapture | OpCode::OpCaptureCapture => {
                value < function.num_captures
            }
            OpCode::OpLoadNative => value < native::NATIVES.len(),
            OpCode::OpNewFunc => value < module.functions.len(),
            OpCode::OpInitObject => value < module.structs.len(),
            OpCode::OpJump | OpCode::OpJumpIfFalse => boundaries.contains(&value),
            _ => true,
        };
        if !in_range {
            return Err(VerifyError::OperandOutOfRange {
                function: index,
                offset,
                op,
                operand,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::module::LineEntry;
    use crate::bytecode::op_code::make;

    fn module_with(instructions: Vec<u8>) -> Module {
        Module {
            constants: vec![Constant::Int(1)],
            functions: vec![FunctionTemplate {
                name: "<main>".to_string(),
                arity: 0,
                num_locals: 1,
                num_captures: 0,
                instructions,
                lines: vec![LineEntry { offset: 0, line: 1 }],
            }],
            structs: Vec::new(),
        }
    }

    fn code(parts: &[(OpCode, usize)]) -> Vec<u8> {
        parts.iter().flat_map(|(op, operand)| make(*op, *operand)).collect()
    }

    #[test]
    fn accepts_well_formed_code() {
        let module = module_with(code(&[
            (OpCode::OpConstant, 0),
            (OpCode::OpStoreLocal, 0),
            (OpCode::OpPop, 0),
            (OpCode::OpNull, 0),
            (OpCode::OpReturn, 0),
        ]));
        assert_eq!(verify(&module), Ok(()));
    }

    #[test]
    fn rejects_leftover_break() {
        let module = module_with(code(&[(OpCode::OpBreak, 0), (OpCode::OpReturn, 0)]));
        assert!(matches!(
            verify(&module),
            Err(VerifyError::LoopSentinel {
                op: OpCode::OpBreak,
                ..
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_operands() {
        let module = module_with(code(&[(OpCode::OpLoadLocal, 3), (OpCode::OpReturn, 0)]));
        assert!(matches!(
            verify(&module),
            Err(VerifyError::OperandOutOfRange { operand: 3, .. })
        ));

        // Jump into the middle of an instruction.
        let module = module_with(code(&[(OpCode::OpJump, 1), (OpCode::OpReturn, 0)]));
        assert!(verify(&module).is_err());
    }

    #[test]
    fn rejects_unknown_opcode() {
        let module = module_with(vec![250]);
        assert_eq!(
            verify(&module),
            Err(VerifyError::InvalidInstruction {
                function: 0,
                offset: 0
            })
        );
    }
}
