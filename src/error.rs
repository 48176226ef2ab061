use snafu::Snafu;

use crate::{conversion::ConversionError, value::Kind};

/// Every way a single [`Vm::run`](crate::Vm::run) can fail.
///
/// All of these abort the run. The stack is left as it was at the point of
/// failure and is cleared by the next run.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "stack underflow: {} operand(s) required, {} available",
        needed,
        available
    ))]
    StackUnderflow { needed: usize, available: usize },

    #[snafu(display("invalid opcode {:#04x} at instruction {}", opcode, position))]
    InvalidOpcode { opcode: u8, position: usize },

    #[snafu(display("type conversion failed: {}", source))]
    TypeConversion { source: ConversionError },

    #[snafu(display("`{}` is undefined for operands of type {}", operation, kind))]
    UnsupportedOperation { operation: &'static str, kind: Kind },

    #[snafu(display("push_constant at instruction {} carries no constant", position))]
    MissingOperand { position: usize },

    #[snafu(display("program finished without leaving a result on the stack"))]
    EmptyStack,

    #[snafu(display(
        "program finished with {} values on the stack, expected exactly one",
        depth
    ))]
    UnbalancedStack { depth: usize },
}

impl From<ConversionError> for Error {
    fn from(source: ConversionError) -> Self {
        Error::TypeConversion { source }
    }
}
