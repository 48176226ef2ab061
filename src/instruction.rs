use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The instruction set. The discriminants are the on-the-wire opcodes and
/// must never be reused for a different operation.
#[derive(FromPrimitive, Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OpCode {
    #[serde(alias = "end")]
    EndOfProgram = 0,
    Or = 1,
    And = 2,
    /// Discards the top of the stack.
    #[serde(alias = "discard")]
    Pop = 3,
    PushConstant = 4,
}

impl OpCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            OpCode::EndOfProgram => "end",
            OpCode::Or => "or",
            OpCode::And => "and",
            OpCode::Pop => "pop",
            OpCode::PushConstant => "push_constant",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single VM instruction.
///
/// The opcode is kept in its raw form so that programs produced by a newer
/// compiler can still be loaded; unknown opcodes are rejected when the
/// instruction is executed.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    opcode: u8,
    operand: Option<Value>,
}

impl Instruction {
    pub const fn new(opcode: OpCode) -> Self {
        Self {
            opcode: opcode as u8,
            operand: None,
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self {
            opcode: OpCode::PushConstant as u8,
            operand: Some(value.into()),
        }
    }

    pub const fn from_raw(opcode: u8, operand: Option<Value>) -> Self {
        Self { opcode, operand }
    }

    /// The decoded opcode, or `None` if this VM doesn't know it.
    pub fn opcode(&self) -> Option<OpCode> {
        FromPrimitive::from_u8(self.opcode)
    }

    pub const fn raw_opcode(&self) -> u8 {
        self.opcode
    }

    pub const fn operand(&self) -> Option<&Value> {
        self.operand.as_ref()
    }

    pub fn is_end(&self) -> bool {
        self.opcode() == Some(OpCode::EndOfProgram)
    }
}

impl From<OpCode> for Instruction {
    fn from(opcode: OpCode) -> Self {
        Self::new(opcode)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.opcode(), &self.operand) {
            (Some(opcode), Some(operand)) => write!(f, "{opcode} {operand}"),
            (Some(opcode), None) => write!(f, "{opcode}"),
            (None, _) => write!(f, "<invalid {:#04x}>", self.opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_known_and_unknown() {
        assert_eq!(Instruction::new(OpCode::Or).opcode(), Some(OpCode::Or));
        assert_eq!(Instruction::from_raw(4, None).opcode(), Some(OpCode::PushConstant));
        assert_eq!(Instruction::from_raw(0xff, None).opcode(), None);
        assert!(Instruction::from_raw(0, None).is_end());
    }

    #[test]
    fn display() {
        assert_eq!(Instruction::constant("hello").to_string(), r#"push_constant "hello""#);
        assert_eq!(Instruction::new(OpCode::And).to_string(), "and");
        assert_eq!(Instruction::new(OpCode::EndOfProgram).to_string(), "end");
        assert_eq!(Instruction::from_raw(0x2a, None).to_string(), "<invalid 0x2a>");
    }

    #[test]
    fn opcode_names() {
        let parsed: Vec<OpCode> =
            serde_json::from_str(r#"["or", "and", "pop", "discard", "push_constant", "end", "end_of_program"]"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                OpCode::Or,
                OpCode::And,
                OpCode::Pop,
                OpCode::Pop,
                OpCode::PushConstant,
                OpCode::EndOfProgram,
                OpCode::EndOfProgram,
            ]
        );
    }
}
