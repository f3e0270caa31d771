use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Wrapper for an LC-3 u16 instruction word.
/// The top 4 bits select the opcode, the remaining 12 bits are
/// opcode-specific operand fields.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

/// The closed set of LC-3 opcodes, one variant per value of the 4 bit field.
///
/// `Rti` and `Res` are reserved by the architecture, dispatching them is a
/// fatal error.
#[repr(u8)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Conditional branch
    Br = 0,
    /// Addition
    Add,
    /// Load PC-relative
    Ld,
    /// Store PC-relative
    St,
    /// Jump to sub-routine
    Jsr,
    /// Bit-wise AND
    And,
    /// Load base + offset
    Ldr,
    /// Store base + offset
    Str,
    /// Return from interrupt, reserved
    Rti,
    /// Bit-wise complement
    Not,
    /// Load indirect
    Ldi,
    /// Store indirect
    Sti,
    /// Jump / return from sub-routine
    Jmp,
    /// Reserved
    Res,
    /// Load effective address
    Lea,
    /// Trap service call
    Trap,
}

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), must be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        (self.0 >> from) & ((0b1 << (to - from + 1)) - 1)
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8, expect: &str) -> u8 {
        u8::try_from(self.get_bit_range(from, to)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.get_bit_range_u8(12, 15, "Error parsing op_code")
    }
    /// The decoded opcode. Total, every 4 bit value maps to a variant.
    #[must_use]
    pub fn opcode(self) -> Opcode {
        Opcode::n(self.op_code()).expect("4 bit opcode field always maps to a variant")
    }
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11, "Error parsing dr")
    }
    /// SR for store instructions shares the DR field bits.
    #[must_use]
    pub fn sr_number(self) -> u8 {
        self.dr_number()
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing sr1")
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2, "Error parsing sr2")
    }
    /// Base register for JMP, JSRR, LDR and STR, shares the SR1 field bits.
    #[must_use]
    pub fn base_r_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing base register")
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// The 5 bit immediate operand, sign extended to a full word.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Offset of length `len` bits to add to an address, sign extended to a
    /// full word so that wrapping addition moves backwards for negative
    /// offsets.
    #[must_use]
    pub fn offset(self, len: u8) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// The 8 bit trap vector in the low byte of a TRAP instruction.
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7, "Error parsing trap vector")
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Op: {:?}, DR: {:03b}, PC_Off: {}",
            self.opcode(),
            self.dr_number(),
            numbers::twos_complement_to_decimal(self.offset(9))
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}
