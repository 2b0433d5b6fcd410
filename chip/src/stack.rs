use tinyvec::ArrayVec;

use crate::{definitions::cpu, opcode::Address, StackError};

/// The stack is only used to store return addresses when subroutines are called. The original
/// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
/// `12` levels of nesting; modern implementations usually have more.
/// (here we are using `16`)
///
/// The stack pointer is the length of the stack, so it always lies in `[0, 16]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    frames: ArrayVec<[Address; cpu::stack::SIZE]>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will push the return address, a full stack is left untouched.
    pub fn push(&mut self, pointer: Address) -> Result<(), StackError> {
        match self.frames.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop the last return address.
    pub fn pop(&mut self) -> Result<Address, StackError> {
        self.frames.pop().ok_or(StackError::Empty)
    }

    /// The stack pointer
    pub fn pointer(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == cpu::stack::SIZE
    }

    /// The currently stored return addresses, oldest first.
    pub fn frames(&self) -> &[Address] {
        &self.frames
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
