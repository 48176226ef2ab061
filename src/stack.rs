use crate::{value::Value, Error};

/// The operand stack of a [`Vm`](crate::Vm).
///
/// Popping an empty stack reports [`Error::StackUnderflow`] and leaves the
/// stack untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, Error> {
        self.values.pop().ok_or(Error::StackUnderflow {
            needed: 1,
            available: 0,
        })
    }

    /// Pops the two operands of a binary operation and returns them in
    /// program order: `(lhs, rhs)`, where `rhs` was pushed last.
    pub fn pop_pair(&mut self) -> Result<(Value, Value), Error> {
        let available = self.values.len();
        if available < 2 {
            return Err(Error::StackUnderflow {
                needed: 2,
                available,
            });
        }

        let rhs = self.pop()?;
        let lhs = self.pop()?;
        Ok((lhs, rhs))
    }

    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterates from the bottom of the stack to the top.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}
