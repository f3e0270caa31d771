//! The emulation core: image loading and the fetch-decode-dispatch loop.
pub mod instruction;
pub mod opcodes;
pub mod trap_routines;

#[cfg(test)]
pub(crate) mod test_helpers;

use crate::emulator::instruction::{Instruction, Opcode};
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::{KeyboardInputProvider, TerminalInputProvider};
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use byteorder::{BigEndian, ReadBytesExt};
use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::io::{BufReader, Read, Write};
use std::ops::ControlFlow;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// Creates an emulator with the image at `path` loaded.
///
/// # Errors
/// - image file missing or unreadable
/// - image shorter than the one word .ORIG header
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new();
    emu.load_image(path)?;
    Ok(emu)
}

/// Creates an emulator from an already byte-swapped image,
/// `image[0]` is the origin address.
///
/// # Errors
/// - image is empty and therefore missing the .ORIG header
pub fn from_program_bytes(image: &[u16]) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new();
    emu.load_image_words(image)?;
    Ok(emu)
}

/// The public facing emulator used to run LC-3 programs.
///
/// One value owns the complete machine state, independent instances do not
/// share anything.
pub struct Emulator {
    pub(crate) memory: Memory,
    pub(crate) registers: Registers,
    keyboard_input_provider: Rc<RefCell<dyn KeyboardInputProvider>>,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Emulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `keyboard_input_provider` is a `dyn` trait object that is not `Debug`,
        // so it (and `Memory`, which also holds one) is omitted here.
        f.debug_struct("Emulator")
            .field("registers", &self.registers)
            .finish_non_exhaustive()
    }
}

impl Emulator {
    /// Constructor wired to the real terminal keyboard.
    #[must_use]
    pub fn new() -> Self {
        Self::with_input_provider(Rc::new(RefCell::new(TerminalInputProvider::new())))
    }

    /// Constructor with a custom keyboard source for the memory-mapped
    /// status/data registers.
    #[must_use]
    pub fn with_input_provider(
        keyboard_input_provider: Rc<RefCell<dyn KeyboardInputProvider>>,
    ) -> Self {
        Self {
            memory: Memory::new(Rc::clone(&keyboard_input_provider)),
            registers: Registers::new(),
            keyboard_input_provider,
        }
    }

    /// Loads the image file at `path` into memory.
    ///
    /// Images loaded later overwrite earlier ones in overlapping regions.
    ///
    /// # Errors
    /// - image file missing or unreadable
    /// - image shorter than the one word .ORIG header
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<(), LoadProgramError> {
        let file = File::open(path)?;
        self.load_image_from(BufReader::new(file))
    }

    /// Loads an image from a reader of big-endian u16 words, the first word
    /// is the origin address the rest of the image is placed at.
    ///
    /// Words beyond the top of the address space and a trailing odd byte are
    /// ignored.
    ///
    /// # Errors
    /// - reader fails
    /// - reader is empty and therefore missing the .ORIG header
    pub fn load_image_from(&mut self, mut reader: impl Read) -> Result<(), LoadProgramError> {
        let origin = reader.read_u16::<BigEndian>().map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                LoadProgramError::ImageMissingOrigHeader
            } else {
                e.into()
            }
        })?;
        let mut words = Vec::new();
        loop {
            match reader.read_u16::<BigEndian>() {
                Ok(word) => words.push(word),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
        }
        let loaded = self.memory.load_image_at(origin, &words);
        debug!("loaded {loaded} words at origin {origin:#06X}");
        Ok(())
    }

    /// Loads an already byte-swapped image, `image[0]` is the origin address.
    ///
    /// # Errors
    /// - image is empty and therefore missing the .ORIG header
    pub fn load_image_words(&mut self, image: &[u16]) -> Result<(), LoadProgramError> {
        let (origin, rest) = image
            .split_first()
            .ok_or(LoadProgramError::ImageMissingOrigHeader)?;
        self.memory.load_image_at(*origin, rest);
        Ok(())
    }

    /// Runs the loaded program against the real console until it halts.
    ///
    /// The caller is responsible for putting the terminal into raw mode for
    /// the duration of the run, see [`crate::terminal::set_terminal_raw`].
    ///
    /// # Errors
    /// - a reserved opcode (RTI, RES) was dispatched
    /// - console IO failed
    /// - CTRL-C was observed while polling the keyboard
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.execute_with_io(&mut stdin.lock(), &mut stdout.lock())
    }

    /// Same as [`Emulator::execute`] with explicit console streams.
    ///
    /// # Errors
    /// See [`Emulator::execute`].
    pub fn execute_with_io<R: Read, W: Write>(
        &mut self,
        stdin: &mut R,
        stdout: &mut W,
    ) -> Result<(), ExecutionError> {
        loop {
            if self.keyboard_input_provider.borrow().is_interrupted() {
                return Err(ExecutionError::Interrupted);
            }
            match self.step(stdin, stdout) {
                ControlFlow::Continue(()) => {}
                ControlFlow::Break(result) => return result,
            }
        }
    }

    /// One fetch-decode-dispatch round.
    ///
    /// The PC is incremented directly after the fetch, handlers see it
    /// pointing at the following instruction.
    fn step<R: Read, W: Write>(
        &mut self,
        stdin: &mut R,
        stdout: &mut W,
    ) -> ControlFlow<Result<(), ExecutionError>> {
        let instruction_address = self.registers.pc().as_binary();
        let i = Instruction::from(self.memory.read(instruction_address));
        self.registers.set_pc(instruction_address.wrapping_add(1));
        match i.opcode() {
            Opcode::Br => opcodes::br(i, &mut self.registers),
            Opcode::Add => opcodes::add(i, &mut self.registers),
            Opcode::Ld => opcodes::ld(i, &mut self.registers, &mut self.memory),
            Opcode::St => opcodes::st(i, &self.registers, &mut self.memory),
            Opcode::Jsr => opcodes::jsr(i, &mut self.registers),
            Opcode::And => opcodes::and(i, &mut self.registers),
            Opcode::Ldr => opcodes::ldr(i, &mut self.registers, &mut self.memory),
            Opcode::Str => opcodes::str(i, &self.registers, &mut self.memory),
            Opcode::Not => opcodes::not(i, &mut self.registers),
            Opcode::Ldi => opcodes::ldi(i, &mut self.registers, &mut self.memory),
            Opcode::Sti => opcodes::sti(i, &self.registers, &mut self.memory),
            Opcode::Jmp => opcodes::jmp_or_ret(i, &mut self.registers),
            Opcode::Lea => opcodes::lea(i, &mut self.registers),
            Opcode::Rti | Opcode::Res => {
                return ControlFlow::Break(Err(ExecutionError::ReservedOpcode {
                    opcode: i.op_code(),
                    address: instruction_address,
                }));
            }
            Opcode::Trap => {
                return trap_routines::dispatch(
                    i,
                    &mut self.registers,
                    &self.memory,
                    stdin,
                    stdout,
                );
            }
        }
        ControlFlow::Continue(())
    }

    /// Puts the register file back into its power-on state, memory is kept,
    /// so the same image can be run again.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
}
