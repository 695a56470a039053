use thiserror::Error;

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Raised when a load or store targets an address past the last valid offset.
///
/// Bound violations are never clamped or wrapped; every access either lands
/// inside the buffer or fails with this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("memory address {address:#06X} is out of bounds (max offset {max_offset:#06X})")]
pub struct OutOfBounds {
    /// The faulting address.
    pub address: usize,
    /// The largest valid byte offset of the memory that rejected the access.
    pub max_offset: usize,
}

/// Emulates the memory of the machine: a flat byte buffer of fixed capacity
/// with bounds-checked 8-bit and 16-bit access.
///
/// 16-bit values are stored big-endian (most significant byte first). The
/// append cursor used by [`Memory::push_byte`] and [`Memory::push16`] exists
/// for the program-construction phase; execution never touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<Byte>,
    cursor: usize,
}

impl Default for Memory {
    /// A zeroed memory spanning the full 16-bit address space.
    fn default() -> Self {
        Memory::new(Self::DEFAULT_CAPACITY)
    }
}

impl Memory {
    /// Capacity used by [`Memory::default`]: one byte per 16-bit address.
    pub const DEFAULT_CAPACITY: usize = 0x1_0000;

    /// Creates a zeroed memory of `capacity` bytes. Valid offsets run from
    /// `0` to `capacity - 1` inclusive.
    pub fn new(capacity: usize) -> Self {
        Memory {
            bytes: vec![0; capacity],
            cursor: 0,
        }
    }

    /// Number of bytes in the buffer.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The largest valid byte offset (one less than the capacity).
    pub fn max_offset(&self) -> usize {
        self.bytes.len().saturating_sub(1)
    }

    /// The offset the next push operation will write to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Repositions the append cursor.
    pub fn set_cursor(&mut self, address: Word) {
        self.cursor = usize::from(address);
    }

    fn check(&self, address: usize, width: usize) -> Result<(), OutOfBounds> {
        if address + width > self.bytes.len() {
            return Err(OutOfBounds {
                address,
                max_offset: self.max_offset(),
            });
        }
        Ok(())
    }

    /// Reads a byte from the memory.
    pub fn load_byte(&self, address: Word) -> Result<Byte, OutOfBounds> {
        let address = usize::from(address);
        self.check(address, 1)?;
        Ok(self.bytes[address])
    }

    /// Reads a word from the memory (big endian).
    pub fn load16(&self, address: Word) -> Result<Word, OutOfBounds> {
        let address = usize::from(address);
        self.check(address, 2)?;
        Ok(Word::from_be_bytes([
            self.bytes[address],
            self.bytes[address + 1],
        ]))
    }

    /// Writes a byte to the memory.
    pub fn store_byte(&mut self, address: Word, byte: Byte) -> Result<(), OutOfBounds> {
        let address = usize::from(address);
        self.check(address, 1)?;
        self.bytes[address] = byte;
        Ok(())
    }

    /// Writes a word to the memory (big endian).
    pub fn store16(&mut self, address: Word, word: Word) -> Result<(), OutOfBounds> {
        let address = usize::from(address);
        self.check(address, 2)?;
        let [high, low] = word.to_be_bytes();
        self.bytes[address] = high;
        self.bytes[address + 1] = low;
        Ok(())
    }

    /// Writes a block of bytes starting at `address`.
    pub fn store_bytes(&mut self, address: Word, bytes: &[Byte]) -> Result<(), OutOfBounds> {
        let address = usize::from(address);
        self.check(address, bytes.len())?;
        self.bytes[address..address + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Stores a byte at the cursor, then advances the cursor by one.
    ///
    /// A rejected push leaves the cursor where it was.
    pub fn push_byte(&mut self, byte: Byte) -> Result<(), OutOfBounds> {
        self.check(self.cursor, 1)?;
        self.bytes[self.cursor] = byte;
        self.cursor += 1;
        Ok(())
    }

    /// Stores a word at the cursor (big endian), then advances the cursor by
    /// two.
    pub fn push16(&mut self, word: Word) -> Result<(), OutOfBounds> {
        self.check(self.cursor, 2)?;
        let [high, low] = word.to_be_bytes();
        self.bytes[self.cursor] = high;
        self.bytes[self.cursor + 1] = low;
        self.cursor += 2;
        Ok(())
    }
}

/// Writes a program (a block of opcode and operand bytes) into memory at a
/// given address.
#[macro_export]
macro_rules! write_program {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ $(,)? ) => {
        $mem.store_bytes($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}
