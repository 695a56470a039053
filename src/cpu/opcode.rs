use num_enum::{FromPrimitive, IntoPrimitive};

/// Declares the opcode set: variant, encoded byte and program-text mnemonic.
macro_rules! opcodes {
    ( $( $( #[$attr:meta] )+ $name:ident = $value:literal => $mnemonic:literal ),+ $(,)? ) => {
        /// Operations the engine can execute.
        ///
        /// Converting from a byte is total: bytes without a matching opcode
        /// decode to [`Opcode::NoOp`].
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(FromPrimitive, IntoPrimitive)]
        pub enum Opcode {
            $(
                $( #[$attr] )+
                $name = $value,
            )+
        }

        impl Opcode {
            /// All known opcodes, in encoding order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$name,)+];

            /// The mnemonic used in program text.
            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(
                        Opcode::$name => $mnemonic,
                    )+
                }
            }

            /// Looks an opcode up by its mnemonic.
            pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
                match mnemonic {
                    $(
                        $mnemonic => Some(Opcode::$name),
                    )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for Opcode {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.mnemonic())
            }
        }
    };
}

opcodes!(
    /// Does nothing. Every byte without an assigned opcode executes as this.
    #[num_enum(default)]
    NoOp = 0x00 => "NO_OP",
    /// Adds two registers, sum (truncated to 16 bits) to `acc`.
    AddRegToReg = 0x10 => "ADD_REG_TO_REG",
    /// Bitwise AND of two registers, result to `acc`.
    AndRegToReg = 0x11 => "AND_REG_TO_REG",
    /// Bitwise OR of two registers, result to `acc`.
    OrRegToReg = 0x12 => "OR_REG_TO_REG",
    /// Loads a 16-bit literal into a register.
    MovLiteralToReg = 0x20 => "MOV_LITERAL_TO_REG",
    /// Copies one register into another.
    MovRegToReg = 0x21 => "MOV_REG_TO_REG",
    /// Loads the word at a memory address into a register.
    MovMemToReg = 0x22 => "MOV_MEM_TO_REG",
    /// Stores a register into memory at an address.
    MovRegToMem = 0x23 => "MOV_REG_TO_MEM",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_bytes_decode() {
        assert_eq!(Opcode::from(0x00), Opcode::NoOp);
        assert_eq!(Opcode::from(0x10), Opcode::AddRegToReg);
        assert_eq!(Opcode::from(0x23), Opcode::MovRegToMem);
    }

    #[test]
    fn test_unknown_bytes_decode_to_no_op() {
        assert_eq!(Opcode::from(0x01), Opcode::NoOp);
        assert_eq!(Opcode::from(0x13), Opcode::NoOp);
        assert_eq!(Opcode::from(0xEE), Opcode::NoOp);
        assert_eq!(Opcode::from(0xFF), Opcode::NoOp);
    }

    #[test]
    fn test_opcode_bytes() {
        assert_eq!(u8::from(Opcode::NoOp), 0x00);
        assert_eq!(u8::from(Opcode::MovLiteralToReg), 0x20);
    }

    #[test]
    fn test_mnemonic_round_trip() {
        for &opcode in Opcode::ALL {
            assert_eq!(Opcode::from_mnemonic(opcode.mnemonic()), Some(opcode));
            assert_eq!(format!("{}", opcode), opcode.mnemonic());
        }
        assert_eq!(Opcode::from_mnemonic("HCF"), None);
        assert_eq!(Opcode::from_mnemonic("no_op"), None); // mnemonics are uppercase
    }
}
