#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]

//! A small stack-based virtual machine that evaluates compiled filter
//! expressions against text, numeric and timestamp values.
//!
//! A [`Program`] is built once (by a compiler, a program file, or the
//! [`ProgramBuilder`]) and can be shared read-only between any number of
//! [`Vm`]s. Each [`Vm`] owns its own [`Stack`] and runs programs one at a
//! time:
//!
//! ```
//! use vector_vm::{Program, Value, Vm};
//!
//! let program = Program::builder()
//!     .push_constant(0)
//!     .push_constant(1)
//!     .or()
//!     .build();
//!
//! let mut vm = Vm::new();
//! assert_eq!(vm.run(&program), Ok(Value::Integer(1)));
//! ```

#[macro_use]
extern crate tracing;

#[macro_use]
pub mod internal_events;

pub mod cli;
pub mod coercion;
pub mod config;
pub mod conversion;
pub mod datetime;
mod error;
pub mod format;
pub mod instruction;
pub mod program;
mod stack;
pub mod trace;
pub mod value;
mod vm;

pub use config::VmConfig;
pub use conversion::{Convert, ConversionError, StandardConversion};
pub use datetime::TimeZone;
pub use error::Error;
pub use instruction::{Instruction, OpCode};
pub use program::{Program, ProgramBuilder, ProgramError};
pub use stack::Stack;
pub use value::{Kind, Value};
pub use vm::Vm;

pub type Result<T> = std::result::Result<T, Error>;
