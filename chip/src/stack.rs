//! The return address stack used by the subroutine opcodes.
use parking_lot::Mutex;
use tinyvec::ArrayVec;

use crate::{definitions::cpu, StackError};

/// The stack is only used to store return addresses when subroutines are called. The original
/// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
/// `12` levels of nesting; modern implementations usually have more.
/// (here we are using `16`)
///
/// Push and pop are guarded by a single lock, so the stack can be shared between threads.
#[derive(Debug, Default)]
pub struct Stack {
    addresses: Mutex<ArrayVec<[u16; cpu::stack::SIZE]>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will push the pointer on top of the stack, fails if all
    /// nesting levels are in use.
    pub fn push(&self, pointer: u16) -> Result<(), StackError> {
        let mut addresses = self.addresses.lock();
        // try_push hands the value back if there is no room left
        match addresses.try_push(pointer) {
            None => {
                log::debug!("Pushed {:#06X}, depth {}", pointer, addresses.len());
                Ok(())
            }
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop the last pushed pointer from the stack.
    pub fn pop(&self) -> Result<u16, StackError> {
        let pointer = self.addresses.lock().pop().ok_or(StackError::Empty)?;
        log::debug!("Popped {:#06X}", pointer);
        Ok(pointer)
    }

    /// The pointer that a `pop` would return.
    pub fn peek(&self) -> Option<u16> {
        self.addresses.lock().last().copied()
    }

    pub fn len(&self) -> usize {
        self.addresses.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.lock().is_empty()
    }

    /// A copy of the current entries, bottom first.
    pub fn entries(&self) -> Vec<u16> {
        self.addresses.lock().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let stack = Stack::new();
        assert!(stack.is_empty());

        let pointer = 0xFFCC;
        assert_eq!(Ok(()), stack.push(pointer));
        assert_eq!(1, stack.len());
        assert_eq!(Some(pointer), stack.peek());

        assert_eq!(Ok(pointer), stack.pop());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_full_and_empty() {
        let stack = Stack::new();
        let base = 0x0333;

        for i in 0..cpu::stack::SIZE as u16 {
            assert_eq!(Ok(()), stack.push(base + i * 8));
        }
        assert_eq!(Err(StackError::Full), stack.push(base));
        assert_eq!(cpu::stack::SIZE, stack.len());

        for i in (0..cpu::stack::SIZE as u16).rev() {
            assert_eq!(Ok(base + i * 8), stack.pop());
        }
        assert!(stack.is_empty());
        assert_eq!(Err(StackError::Empty), stack.pop());
    }

    #[test]
    fn test_entries_order() {
        let stack = Stack::new();
        for pointer in [0x200, 0x300, 0x400] {
            stack.push(pointer).unwrap();
        }
        assert_eq!(vec![0x200, 0x300, 0x400], stack.entries());
    }
}
