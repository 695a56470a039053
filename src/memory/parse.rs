//! Text format for seeding a [`Memory`] with a program.
//!
//! ```text
//! # load two literals and add them
//! 0x0000:
//!     MOV_LITERAL_TO_REG 0x00AB r1
//!     MOV_LITERAL_TO_REG 0x34FA r2
//!     ADD_REG_TO_REG r1 r2
//!
//! 0x1000:
//!     !W 0x4566
//! ```
//!
//! Address labels (`0x0000:`) reposition the write cursor, `!` and `!W`
//! place raw byte and word literals, `#` starts a comment. Numbers accept
//! the `0b`, `0o` and `0x` radix prefixes.

use std::str::{FromStr, Lines};

use thiserror::Error;

use crate::cpu::{Opcode, Register};

use super::{Byte, Memory, OutOfBounds, Word};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("no instruction matching `{0}` was found")]
    InvalidInstruction(String),
    #[error("no register named `{0}` exists")]
    InvalidRegister(String),
    #[error("failed to parse number with radix `{radix}`")]
    InvalidNumber { radix: u32 },
    #[error("an address label needs an address before the `:`")]
    InvalidAddressLabel,
    #[error("a literal needs a number after the `!`")]
    InvalidLiteral,
    #[error("{mnemonic} expects a {expected} operand")]
    MissingOperand {
        mnemonic: &'static str,
        expected: &'static str,
    },
    #[error("unexpected trailing operand `{0}`")]
    TrailingOperand(String),
    #[error("program does not fit in memory: {0}")]
    OutOfMemory(#[from] OutOfBounds),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error [ln: {line}]: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

macro_rules! parse_number {
    ( $ty:ty: $s:expr ) => {{
        let text = $s;

        let (radix, offset) = match text.as_bytes() {
            [b'0', b'b', ..] => (2, 2),
            [b'0', b'o', ..] => (8, 2),
            [b'0', b'x', ..] => (16, 2),
            _ => (10, 0),
        };

        <$ty>::from_str_radix(&text[offset..], radix).map_err(|_| radix)
    }};
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    memory: Memory,
}

impl<'a> Parser<'a> {
    /// Creates a parser for `source` which will try to populate `memory`,
    /// starting at its cursor.
    pub fn new(source: &'a str, memory: Memory) -> Self {
        Self {
            lines: source.lines(),
            line_nr: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse the whole source into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?.trim();
        self.line_nr += 1;
        Some(self.parse_line(line))
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if line.is_empty() || line.starts_with('#') {
            // comment or empty line; skip
            Ok(())
        } else if let Some(rest) = line.strip_prefix('!') {
            self.parse_literal(rest)
        } else if let Some(rest) = line.strip_suffix(':') {
            self.parse_address_label(rest)
        } else {
            self.parse_instruction(line)
        }
    }

    /// An address label repositions the cursor the following lines encode to.
    ///
    /// # Examples
    ///
    /// - `0x22:`
    /// - `0o44:`
    fn parse_address_label(&mut self, line: &str) -> Result<()> {
        let text = line.trim();
        if text.is_empty() {
            return Err(self.err(ParseErrorKind::InvalidAddressLabel));
        }

        let address = parse_number!(Word: text)
            .map_err(|radix| self.err(ParseErrorKind::InvalidNumber { radix }))?;

        log::debug!("[{}] address label {:#06X}", self.line_nr, address);
        self.memory.set_cursor(address);

        Ok(())
    }

    /// Raw data for the cursor position: one byte (`!`) or one big endian
    /// word (`!W`).
    ///
    /// # Examples
    ///
    /// - `! 0x22`
    /// - `!W 0xdead`
    fn parse_literal(&mut self, line: &str) -> Result<()> {
        if let Some(rest) = line.strip_prefix('W') {
            let text = rest.trim();
            if text.is_empty() {
                return Err(self.err(ParseErrorKind::InvalidLiteral));
            }

            let word = parse_number!(Word: text)
                .map_err(|radix| self.err(ParseErrorKind::InvalidNumber { radix }))?;

            log::debug!("[{}] word literal {:#06X}", self.line_nr, word);
            self.push16(word)
        } else {
            let text = line.trim();
            if text.is_empty() {
                return Err(self.err(ParseErrorKind::InvalidLiteral));
            }

            let byte = parse_number!(Byte: text)
                .map_err(|radix| self.err(ParseErrorKind::InvalidNumber { radix }))?;

            log::debug!("[{}] byte literal {:#04X}", self.line_nr, byte);
            self.push_byte(byte)
        }
    }

    /// A mnemonic followed by its operands, encoded at the cursor position.
    ///
    /// # Examples
    ///
    /// - `MOV_LITERAL_TO_REG 0x00AB r1`
    /// - `NO_OP`
    fn parse_instruction(&mut self, line: &str) -> Result<()> {
        let mut tokens = line.split_whitespace();
        let mnemonic = tokens.next().unwrap_or_default();

        let opcode = Opcode::from_mnemonic(mnemonic)
            .ok_or_else(|| self.err(ParseErrorKind::InvalidInstruction(mnemonic.to_string())))?;

        log::debug!("[{}] instruction {}", self.line_nr, opcode);

        // a line encodes nothing unless it parses completely
        let mut encoded: Vec<Byte> = vec![opcode.into()];
        match opcode {
            Opcode::NoOp => {}
            Opcode::AddRegToReg
            | Opcode::AndRegToReg
            | Opcode::OrRegToReg
            | Opcode::MovRegToReg => {
                let lhs = self.register_operand(&mut tokens, opcode)?;
                let rhs = self.register_operand(&mut tokens, opcode)?;
                encoded.push(lhs.into());
                encoded.push(rhs.into());
            }
            Opcode::MovLiteralToReg | Opcode::MovMemToReg => {
                let value = self.word_operand(&mut tokens, opcode)?;
                let dest = self.register_operand(&mut tokens, opcode)?;
                encoded.extend_from_slice(&value.to_be_bytes());
                encoded.push(dest.into());
            }
            Opcode::MovRegToMem => {
                let src = self.register_operand(&mut tokens, opcode)?;
                let address = self.word_operand(&mut tokens, opcode)?;
                encoded.push(src.into());
                encoded.extend_from_slice(&address.to_be_bytes());
            }
        }

        if let Some(trailing) = tokens.next() {
            return Err(self.err(ParseErrorKind::TrailingOperand(trailing.to_string())));
        }

        for byte in encoded {
            self.push_byte(byte)?;
        }

        Ok(())
    }

    fn register_operand<'t, I>(&self, tokens: &mut I, opcode: Opcode) -> Result<Register>
    where
        I: Iterator<Item = &'t str>,
    {
        let token = tokens.next().ok_or_else(|| {
            self.err(ParseErrorKind::MissingOperand {
                mnemonic: opcode.mnemonic(),
                expected: "register",
            })
        })?;

        Register::from_name(token)
            .ok_or_else(|| self.err(ParseErrorKind::InvalidRegister(token.to_string())))
    }

    fn word_operand<'t, I>(&self, tokens: &mut I, opcode: Opcode) -> Result<Word>
    where
        I: Iterator<Item = &'t str>,
    {
        let token = tokens.next().ok_or_else(|| {
            self.err(ParseErrorKind::MissingOperand {
                mnemonic: opcode.mnemonic(),
                expected: "number",
            })
        })?;

        parse_number!(Word: token)
            .map_err(|radix| self.err(ParseErrorKind::InvalidNumber { radix }))
    }

    fn push_byte(&mut self, byte: Byte) -> Result<()> {
        self.memory
            .push_byte(byte)
            .map_err(|err| self.err(err.into()))
    }

    fn push16(&mut self, word: Word) -> Result<()> {
        self.memory
            .push16(word)
            .map_err(|err| self.err(err.into()))
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line_nr,
            kind,
        }
    }
}

impl FromStr for Memory {
    type Err = Vec<ParseError>;

    /// Parses program text into a default-capacity memory.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Parser::new(source, Memory::default()).parse()
    }
}
