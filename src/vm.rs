use tracing::Level;

use crate::{
    coercion,
    config::VmConfig,
    conversion::{Convert, StandardConversion},
    instruction::{Instruction, OpCode},
    program::Program,
    stack::Stack,
    value::Value,
    Error,
};

/// Executes [`Program`]s.
///
/// A `Vm` owns one [`Stack`] and one converter and runs one program at a
/// time. Programs are only borrowed, so any number of `Vm`s (one per worker
/// thread, for instance) can run the same program concurrently.
#[derive(Debug)]
pub struct Vm<C = StandardConversion> {
    stack: Stack,
    converter: C,
    strict_result: bool,
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(&VmConfig::default())
    }

    pub fn with_config(config: &VmConfig) -> Self {
        Self::with_converter(StandardConversion::new(config.timezone), config)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Convert> Vm<C> {
    pub fn with_converter(converter: C, config: &VmConfig) -> Self {
        Self {
            stack: Stack::with_capacity(config.stack_capacity),
            converter,
            strict_result: config.strict_result,
        }
    }

    /// The stack as the last run left it.
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Resets the VM back to its original state.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// Runs `program` to completion and returns its result.
    ///
    /// Execution is strictly sequential and stops at the first end marker,
    /// after the last instruction, or at the first failing instruction.
    /// Nothing is rolled back on failure.
    pub fn run(&mut self, program: &Program) -> Result<Value, Error> {
        self.reset();

        for (position, instruction) in program.instructions().iter().enumerate() {
            let Some(opcode) = instruction.opcode() else {
                return Err(Error::InvalidOpcode {
                    opcode: instruction.raw_opcode(),
                    position,
                });
            };

            trace!(
                message = "Executing instruction.",
                position,
                %instruction,
                depth = self.stack.len()
            );

            match opcode {
                OpCode::EndOfProgram => break,
                OpCode::Or => self.logical(OpCode::Or, |a, b| a || b)?,
                OpCode::And => self.logical(OpCode::And, |a, b| a && b)?,
                OpCode::Pop => {
                    self.stack.pop()?;
                }
                OpCode::PushConstant => self.push_constant(instruction, position)?,
            }
        }

        self.result()
    }

    fn push_constant(&mut self, instruction: &Instruction, position: usize) -> Result<(), Error> {
        let value = instruction
            .operand()
            .ok_or(Error::MissingOperand { position })?;
        self.stack.push(value.clone());
        Ok(())
    }

    /// Pops two operands, reduces both to booleans and pushes `op(lhs, rhs)`
    /// as `1` or `0`.
    fn logical(&mut self, opcode: OpCode, op: fn(bool, bool) -> bool) -> Result<(), Error> {
        let (lhs, rhs) = self.stack.pop_pair()?;

        if enabled!(Level::TRACE) {
            let domain = coercion::domain(&self.converter, &lhs, &rhs);
            trace!(message = "Resolved operand domain.", operation = %opcode, %domain);
        }

        let operation = opcode.as_str();
        let lhs = coercion::truthiness(&self.converter, &lhs, operation)?;
        let rhs = coercion::truthiness(&self.converter, &rhs, operation)?;

        self.stack.push(Value::from(op(lhs, rhs)));
        Ok(())
    }

    fn result(&mut self) -> Result<Value, Error> {
        match self.stack.len() {
            0 => Err(Error::EmptyStack),
            1 => self.stack.pop(),
            depth if self.strict_result => Err(Error::UnbalancedStack { depth }),
            depth => {
                debug!(message = "Program left extra values on the stack.", depth);
                self.stack.pop()
            }
        }
    }
}
