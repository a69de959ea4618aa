use std::fmt;

/// Largest value a 2-byte operand can carry. Slot, constant, template and
/// jump operands all share this limit.
pub const MAX_OPERAND: usize = u16::MAX as usize;

/// Operand written into a jump before its target is known.
pub const PLACEHOLDER: usize = MAX_OPERAND;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    OpConstant = 0,
    OpNull = 1,
    OpTrue = 2,
    OpFalse = 3,
    OpPop = 4,
    OpDup = 5,
    OpDup2 = 6,
    OpRot3 = 7,
    OpRot4 = 8,
    OpLoadLocal = 9,
    OpStoreLocal = 10,
    OpLoadCapture = 11,
    OpStoreCapture = 12,
    OpLoadNative = 13,
    OpAdd = 14,
    OpSub = 15,
    OpMul = 16,
    OpDiv = 17,
    OpMod = 18,
    OpEqual = 19,
    OpNotEqual = 20,
    OpLessThan = 21,
    OpLessEqual = 22,
    OpGreaterThan = 23,
    OpGreaterEqual = 24,
    OpMinus = 25,
    OpBang = 26,
    OpJump = 27,
    OpJumpIfFalse = 28,
    /// Unpatched `break`; only exists while its loop is being compiled.
    OpBreak = 29,
    /// Unpatched `continue`; only exists while its loop is being compiled.
    OpContinue = 30,
    OpCall = 31,
    OpReturn = 32,
    OpNewFunc = 33,
    OpCaptureLocal = 34,
    OpCaptureCapture = 35,
    OpNewList = 36,
    OpIndex = 37,
    OpSetIndex = 38,
    OpLen = 39,
    OpNewObject = 40,
    OpInitObject = 41,
    OpGetField = 42,
    OpSetField = 43,
}

impl OpCode {
    pub const COUNT: usize = OpCode::OpSetField as usize + 1;

    const ALL: [OpCode; OpCode::COUNT] = [
        OpCode::OpConstant,
        OpCode::OpNull,
        OpCode::OpTrue,
        OpCode::OpFalse,
        OpCode::OpPop,
        OpCode::OpDup,
        OpCode::OpDup2,
        OpCode::OpRot3,
        OpCode::OpRot4,
        OpCode::OpLoadLocal,
        OpCode::OpStoreLocal,
        OpCode::OpLoadCapture,
        OpCode::OpStoreCapture,
        OpCode::OpLoadNative,
        OpCode::OpAdd,
        OpCode::OpSub,
        OpCode::OpMul,
        OpCode::OpDiv,
        OpCode::OpMod,
        OpCode::OpEqual,
        OpCode::OpNotEqual,
        OpCode::OpLessThan,
        OpCode::OpLessEqual,
        OpCode::OpGreaterThan,
        OpCode::OpGreaterEqual,
        OpCode::OpMinus,
        OpCode::OpBang,
        OpCode::OpJump,
        OpCode::OpJumpIfFalse,
        OpCode::OpBreak,
        OpCode::OpContinue,
        OpCode::OpCall,
        OpCode::OpReturn,
        OpCode::OpNewFunc,
        OpCode::OpCaptureLocal,
        OpCode::OpCaptureCapture,
        OpCode::OpNewList,
        OpCode::OpIndex,
        OpCode::OpSetIndex,
        OpCode::OpLen,
        OpCode::OpNewObject,
        OpCode::OpInitObject,
        OpCode::OpGetField,
        OpCode::OpSetField,
    ];

    pub fn is_loop_sentinel(self) -> bool {
        matches!(self, OpCode::OpBreak | OpCode::OpContinue)
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Total operand bytes following the opcode byte (0 or 2).
pub fn operand_width(op: OpCode) -> usize {
    match op {
        OpCode::OpConstant
        | OpCode::OpLoadLocal
        | OpCode::OpStoreLocal
        | OpCode::OpLoadCapture
        | OpCode::OpStoreCapture
        | OpCode::OpLoadNative
        | OpCode::OpJump
        | OpCode::OpJumpIfFalse
        | OpCode::OpBreak
        | OpCode::OpContinue
        | OpCode::OpCall
        | OpCode::OpNewFunc
        | OpCode::OpCaptureLocal
        | OpCode::OpCaptureCapture
        | OpCode::OpNewList
        | OpCode::OpInitObject
        | OpCode::OpGetField
        | OpCode::OpSetField => 2,
        _ => 0,
    }
}

pub type Instructions = Vec<u8>;

/// Encodes one instruction. The operand must already be checked against
/// [`MAX_OPERAND`]; it is ignored for opcodes without one.
pub fn make(op: OpCode, operand: usize) -> Instructions {
    let mut instruction = vec![op as u8];
    if operand_width(op) == 2 {
        instruction.extend_from_slice(&(operand as u16).to_be_bytes());
    }
    instruction
}

pub fn read_u16(instructions: &[u8], offset: usize) -> Option<u16> {
    let bytes = instructions.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// A decoded instruction at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub offset: usize,
    pub op: OpCode,
    pub operand: Option<u16>,
    /// Offset of the following instruction.
    pub next: usize,
}

/// Walks an instruction stream. Yields `Err(offset)` once and stops at the
/// first unknown opcode or truncated operand.
pub fn decode(instructions: &[u8]) -> impl Iterator<Item = Result<Decoded, usize>> + '_ {
    let mut offset = 0;
    let mut failed = false;
    std::iter::from_fn(move || {
        if failed || offset >= instructions.len() {
            return None;
        }
        let at = offset;
        let Ok(op) = OpCode::try_from(instructions[at]) else {
            failed = true;
            return Some(Err(at));
        };
        let width = operand_width(op);
        let operand = if width == 2 {
            match read_u16(instructions, at + 1) {
                Some(value) => Some(value),
                None => {
                    failed = true;
                    return Some(Err(at));
                }
            }
        } else {
            None
        };
        offset = at + 1 + width;
        Some(Ok(Decoded {
            offset: at,
            op,
            operand,
            next: offset,
        }))
    })
}

pub fn disassemble(instructions: &[u8]) -> String {
    let mut result = String::new();

    for decoded in decode(instructions) {
        match decoded {
            Ok(Decoded {
                offset,
                op,
                operand: Some(operand),
                ..
            }) => result.push_str(&format!("{:04} {} {}\n", offset, op, operand)),
            Ok(Decoded {
                offset,
                op,
                operand: None,
                ..
            }) => result.push_str(&format!("{:04} {}\n", offset, op)),
            Err(offset) => {
                result.push_str(&format!("{:04} <invalid {}>\n", offset, instructions[offset]));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_encodes_big_endian_operands() {
        assert_eq!(make(OpCode::OpConstant, 65534), vec![0, 255, 254]);
        assert_eq!(make(OpCode::OpJump, 0x0102), vec![27, 1, 2]);
        assert_eq!(make(OpCode::OpAdd, 7), vec![14]);
    }

    #[test]
    fn every_opcode_round_trips_through_its_byte() {
        for byte in 0..OpCode::COUNT as u8 {
            let op = OpCode::try_from(byte).expect("known opcode");
            assert_eq!(op as u8, byte);
        }
        assert_eq!(OpCode::try_from(OpCode::COUNT as u8), Err(OpCode::COUNT as u8));
    }

    #[test]
    fn disassemble_lists_offsets() {
        let mut code = make(OpCode::OpConstant, 1);
        code.extend(make(OpCode::OpConstant, 2));
        code.extend(make(OpCode::OpAdd, 0));
        code.extend(make(OpCode::OpReturn, 0));

        assert_eq!(
            disassemble(&code),
            "0000 OpConstant 1\n0003 OpConstant 2\n0006 OpAdd\n0007 OpReturn\n"
        );
    }

    #[test]
    fn decode_stops_on_truncated_operand() {
        let code = vec![OpCode::OpPop as u8, OpCode::OpJump as u8, 0];
        let decoded: Vec<_> = decode(&code).collect();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1], Err(1));
    }
}
