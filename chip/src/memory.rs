//! The flat, byte addressable memory of the machine.
//!
//! - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
//! - `0x050-0x09F` - Used for the built in `4x5` pixel font set (`0-F`)
//! - `0x200-0xFFF` - Program ROM and work RAM
use crate::{definitions::memory, MemoryError};

/// Every access is checked, an address outside of `[0, 4096)` is reported
/// and never clamped.
#[derive(Clone)]
pub struct Memory {
    data: Box<[u8; memory::SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Creates a fully zeroed memory block.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; memory::SIZE]),
        }
    }

    /// The amount of addressable bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn out_of_bounds(&self, address: usize) -> MemoryError {
        MemoryError::OutOfBounds {
            address,
            len: self.len(),
        }
    }

    /// Reads a single byte.
    pub fn read(&self, address: usize) -> Result<u8, MemoryError> {
        self.data
            .get(address)
            .copied()
            .ok_or_else(|| self.out_of_bounds(address))
    }

    /// Writes a single byte.
    pub fn write(&mut self, address: usize, value: u8) -> Result<(), MemoryError> {
        let len = self.len();
        match self.data.get_mut(address) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(MemoryError::OutOfBounds { address, len }),
        }
    }

    /// Checks that the whole range `from..from + len` lies inside of memory.
    /// The reported address is the first one that does not.
    fn check_range(&self, from: usize, len: usize) -> Result<(), MemoryError> {
        if from >= self.len() && len > 0 {
            return Err(self.out_of_bounds(from));
        }
        if from + len > self.len() {
            return Err(self.out_of_bounds(self.len()));
        }
        Ok(())
    }

    /// Borrows `len` bytes starting at `from`.
    pub fn slice(&self, from: usize, len: usize) -> Result<&[u8], MemoryError> {
        self.check_range(from, len)?;
        Ok(&self.data[from..from + len])
    }

    /// Mutably borrows `len` bytes starting at `from`, nothing is touched
    /// if any of them is out of bounds.
    pub fn slice_mut(&mut self, from: usize, len: usize) -> Result<&mut [u8], MemoryError> {
        self.check_range(from, len)?;
        Ok(&mut self.data[from..from + len])
    }

    /// Copies the data into memory starting at `from`.
    pub fn load(&mut self, from: usize, data: &[u8]) -> Result<(), MemoryError> {
        self.slice_mut(from, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// The raw content of the memory, used for printing.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_memory_is_zeroed() {
        let mem = Memory::new();
        assert_eq!(mem.len(), memory::SIZE);
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_write() {
        let mut mem = Memory::new();
        assert_eq!(Ok(()), mem.write(0x0FFF, 0xAB));
        assert_eq!(Ok(0xAB), mem.read(0x0FFF));
        assert_eq!(Ok(()), mem.write(0x0000, 0x12));
        assert_eq!(Ok(0x12), mem.read(0x0000));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut mem = Memory::new();
        let err = MemoryError::OutOfBounds {
            address: 0x1000,
            len: memory::SIZE,
        };
        assert_eq!(Err(err), mem.read(0x1000));
        assert_eq!(Err(err), mem.write(0x1000, 1));
        assert_eq!(
            "Address 0x1000 is out of bounds, the memory is 4096 bytes long.",
            err.to_string()
        );
    }

    #[test]
    fn test_slice_bounds() {
        let mut mem = Memory::new();
        assert_eq!(Ok(&[0u8, 0, 0][..]), mem.slice(0x0FFD, 3));
        assert!(mem.slice(0x0FFE, 3).is_err());
        assert!(mem.slice_mut(0x1000, 1).is_err());
        // an empty range at the very end is fine
        assert!(mem.slice(0x1000, 0).is_ok());
    }

    #[test]
    fn test_failed_load_leaves_memory_untouched() {
        let mut mem = Memory::new();
        assert!(mem.load(0x0FFE, &[1, 2, 3]).is_err());
        assert_eq!(Ok(0), mem.read(0x0FFE));
        assert_eq!(Ok(0), mem.read(0x0FFF));

        assert_eq!(Ok(()), mem.load(0x0200, &[1, 2, 3]));
        assert_eq!(Ok(&[1u8, 2, 3][..]), mem.slice(0x0200, 3));
    }
}
