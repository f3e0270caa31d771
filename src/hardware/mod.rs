//! The simulated LC-3 hardware: address space, register file and keyboard.

pub mod keyboard;
pub mod memory;
pub mod registers;
