use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};

use crate::{
    format::{self, Format, FormatError},
    instruction::{Instruction, OpCode},
    value::Value,
};

/// The program file format version this VM understands.
///
/// Bump this whenever the meaning of an existing opcode or the file layout
/// changes; loading a program written for another version fails.
pub const PROGRAM_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProgramError {
    #[snafu(display("Could not read program {}: {}", path.display(), source))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "Could not detect the format of {}; expected .toml, .json, .yaml or .yml",
        path.display()
    ))]
    UnknownFormat { path: PathBuf },
    #[snafu(display("Invalid {} program: {}", format, source))]
    Parse { format: Format, source: FormatError },
    #[snafu(display(
        "Program format version {} is not supported, expected version {}",
        found,
        expected
    ))]
    UnsupportedVersion { found: u32, expected: u32 },
    #[snafu(display("Instruction {}: {}", position, reason))]
    Operand {
        position: usize,
        reason: &'static str,
    },
}

/// An immutable, straight-line sequence of instructions.
///
/// Execution stops at the first [`OpCode::EndOfProgram`] or after the last
/// instruction, whichever comes first. Programs are never modified by a
/// run, so a single program can be shared between threads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Takes `instructions` verbatim; no end marker is added.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::default()
    }

    /// Reads a program file, guessing its format from the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let format = Format::from_path(path).map_err(|path| ProgramError::UnknownFormat {
            path: path.to_path_buf(),
        })?;
        let source = fs::read_to_string(path).context(ReadSnafu { path })?;

        Self::from_source(&source, format)
    }

    pub fn from_source(source: &str, format: Format) -> Result<Self, ProgramError> {
        let definition: ProgramDefinition =
            format::deserialize(source, format).context(ParseSnafu { format })?;

        Self::try_from(definition)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Renders one line per instruction, up to and including the end marker.
    pub fn disassemble(&self) -> Vec<String> {
        let reachable = self
            .instructions
            .iter()
            .position(Instruction::is_end)
            .map_or(self.instructions.len(), |end| end + 1);

        self.instructions[..reachable]
            .iter()
            .enumerate()
            .map(|(idx, instruction)| format!("{:04}: {}", idx, instruction))
            .collect()
    }
}

impl TryFrom<ProgramDefinition> for Program {
    type Error = ProgramError;

    fn try_from(definition: ProgramDefinition) -> Result<Self, Self::Error> {
        ensure!(
            definition.version == PROGRAM_FORMAT_VERSION,
            UnsupportedVersionSnafu {
                found: definition.version,
                expected: PROGRAM_FORMAT_VERSION,
            }
        );

        definition
            .instructions
            .into_iter()
            .enumerate()
            .map(|(position, instruction)| instruction.into_instruction(position))
            .collect::<Result<Vec<_>, _>>()
            .map(Program::new)
    }
}

/// Builds a [`Program`] and terminates it with [`OpCode::EndOfProgram`].
#[derive(Clone, Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    #[must_use]
    pub fn push_constant(mut self, value: impl Into<Value>) -> Self {
        self.instructions.push(Instruction::constant(value));
        self
    }

    #[must_use]
    pub fn or(self) -> Self {
        self.op(OpCode::Or)
    }

    #[must_use]
    pub fn and(self) -> Self {
        self.op(OpCode::And)
    }

    #[must_use]
    pub fn pop(self) -> Self {
        self.op(OpCode::Pop)
    }

    #[must_use]
    pub fn op(mut self, opcode: OpCode) -> Self {
        self.instructions.push(Instruction::new(opcode));
        self
    }

    /// Appends an instruction as-is, including opcodes this VM doesn't know.
    #[must_use]
    pub fn raw(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn build(mut self) -> Program {
        self.instructions.push(Instruction::new(OpCode::EndOfProgram));
        Program::new(self.instructions)
    }
}

/// The serialized form of a [`Program`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramDefinition {
    pub version: u32,
    #[serde(default)]
    pub instructions: Vec<InstructionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstructionDefinition {
    pub op: OpRef,
    /// Written as a single-key map such as `{ integer = 1 }` in every format.
    #[serde(
        default,
        with = "serde_yaml::with::singleton_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub constant: Option<Constant>,
}

/// An opcode given either by name or by its raw numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OpRef {
    Named(OpCode),
    Raw(u8),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Bytes(String),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
}

impl InstructionDefinition {
    fn into_instruction(self, position: usize) -> Result<Instruction, ProgramError> {
        let opcode = match self.op {
            OpRef::Named(opcode) => opcode as u8,
            OpRef::Raw(raw) => raw,
        };

        let operand = match self.constant {
            None => None,
            Some(Constant::Bytes(s)) => Some(Value::from(s)),
            Some(Constant::Integer(i)) => Some(Value::Integer(i)),
            Some(Constant::Float(f)) => Some(Value::from_f64(f).ok_or(ProgramError::Operand {
                position,
                reason: "float constants must not be NaN",
            })?),
            Some(Constant::Timestamp(ts)) => Some(Value::Timestamp(ts)),
        };

        match (OpCode::from_u8(opcode), &operand) {
            (Some(OpCode::PushConstant), None) => OperandSnafu {
                position,
                reason: "push_constant requires a constant",
            }
            .fail(),
            (Some(opcode), Some(_)) if opcode != OpCode::PushConstant => OperandSnafu {
                position,
                reason: "only push_constant takes a constant",
            }
            .fail(),
            _ => Ok(Instruction::from_raw(opcode, operand)),
        }
    }
}
