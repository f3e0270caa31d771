//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` executes machine-code images for the LC-3, a 16 bit
//! instruction-set computer with 8 general registers, 16 opcodes and
//! trap-based system calls for console IO.
//! Usage starts with loading one or more images via
//! [`emulator::from_program`] or [`Emulator::load_image`](emulator::Emulator::load_image),
//! then running them with [`Emulator::execute`](emulator::Emulator::execute).
//!
//! # Example
//! ```
//! use lc3_vm::emulator;
//! // image: origin word, ADD R2, R1, #5, HALT
//! let mut emu = emulator::from_program_bytes(&[0x3000, 0x14A5, 0xF025]).unwrap();
//! emu.execute().unwrap();
//! assert_eq!(emu.registers().get(2).as_decimal(), 5);
//! ```
//!
//! # Errors
//! - Image file is missing or unreadable
//! - Image is shorter than the one word .ORIG header
//! - A reserved opcode (RTI, RES) is dispatched during execution

pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod numbers;
pub mod terminal;
