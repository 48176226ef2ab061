use std::path::Path;

use metrics::counter;

use crate::{Error, ProgramError, Value};

pub trait InternalEvent: Sized {
    fn emit(self);

    fn name(&self) -> Option<&'static str> {
        None
    }
}

pub fn emit(event: impl InternalEvent) {
    event.emit();
}

#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::internal_events::emit($event)
    };
}

pub mod error_type {
    pub const CONVERSION_FAILED: &str = "conversion_failed";
    pub const INVALID_PROGRAM: &str = "invalid_program";
    pub const READER_FAILED: &str = "reader_failed";
    pub const STACK_FAILED: &str = "stack_failed";
}

pub mod error_stage {
    pub const LOADING: &str = "loading";
    pub const EXECUTING: &str = "executing";
}

#[derive(Debug)]
pub struct VmProgramExecuted<'a> {
    pub path: &'a Path,
    pub result: &'a Value,
}

impl InternalEvent for VmProgramExecuted<'_> {
    fn emit(self) {
        debug!(
            message = "Program executed.",
            path = %self.path.display(),
            result = %self.result,
        );
        counter!("vm_programs_executed_total").increment(1);
    }

    fn name(&self) -> Option<&'static str> {
        Some("VmProgramExecuted")
    }
}

#[derive(Debug)]
pub struct VmProgramError<'a> {
    pub path: &'a Path,
    pub error: &'a Error,
}

impl VmProgramError<'_> {
    fn error_type(&self) -> &'static str {
        match self.error {
            Error::TypeConversion { .. } | Error::UnsupportedOperation { .. } => {
                error_type::CONVERSION_FAILED
            }
            Error::InvalidOpcode { .. } | Error::MissingOperand { .. } => {
                error_type::INVALID_PROGRAM
            }
            Error::StackUnderflow { .. } | Error::EmptyStack | Error::UnbalancedStack { .. } => {
                error_type::STACK_FAILED
            }
        }
    }
}

impl InternalEvent for VmProgramError<'_> {
    fn emit(self) {
        let error_type = self.error_type();
        error!(
            message = "Program execution failed.",
            path = %self.path.display(),
            error = %self.error,
            error_type,
            stage = error_stage::EXECUTING,
        );
        counter!(
            "vm_program_errors_total",
            "error_type" => error_type,
            "stage" => error_stage::EXECUTING,
        )
        .increment(1);
    }

    fn name(&self) -> Option<&'static str> {
        Some("VmProgramError")
    }
}

#[derive(Debug)]
pub struct VmProgramLoadError<'a> {
    pub path: &'a Path,
    pub error: &'a ProgramError,
}

impl VmProgramLoadError<'_> {
    fn error_type(&self) -> &'static str {
        match self.error {
            ProgramError::Read { .. } => error_type::READER_FAILED,
            _ => error_type::INVALID_PROGRAM,
        }
    }
}

impl InternalEvent for VmProgramLoadError<'_> {
    fn emit(self) {
        let error_type = self.error_type();
        error!(
            message = "Failed to load program.",
            path = %self.path.display(),
            error = %self.error,
            error_type,
            stage = error_stage::LOADING,
        );
        counter!(
            "vm_program_errors_total",
            "error_type" => error_type,
            "stage" => error_stage::LOADING,
        )
        .increment(1);
    }

    fn name(&self) -> Option<&'static str> {
        Some("VmProgramLoadError")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_types() {
        let path = Path::new("program.json");
        let cases = [
            (Error::EmptyStack, error_type::STACK_FAILED),
            (
                Error::InvalidOpcode {
                    opcode: 0x7f,
                    position: 3,
                },
                error_type::INVALID_PROGRAM,
            ),
            (
                Error::UnsupportedOperation {
                    operation: "or",
                    kind: crate::Kind::Timestamp,
                },
                error_type::CONVERSION_FAILED,
            ),
        ];

        for (error, expected) in cases {
            let event = VmProgramError {
                path,
                error: &error,
            };
            assert_eq!(event.error_type(), expected);
            assert_eq!(event.name(), Some("VmProgramError"));
        }
    }

    #[test]
    fn emit_without_recorder() {
        let path = Path::new("program.json");
        emit!(VmProgramExecuted {
            path,
            result: &Value::Integer(1),
        });
        emit!(VmProgramLoadError {
            path,
            error: &ProgramError::UnknownFormat {
                path: path.to_path_buf(),
            },
        });
    }
}
