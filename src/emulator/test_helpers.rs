//! Shared fakes for unit tests: in-memory console streams, a scripted
//! keyboard provider and an emulator wired to all three.
use crate::emulator::Emulator;
use crate::errors::ExecutionError;
use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::io::{Read, Write};
use std::rc::Rc;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        Self {
            vec: Vec::<u8>::with_capacity(120),
        }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Stand-in for Stdin, either serves scripted bytes or fails every read.
pub struct StringReader {
    data: Vec<u8>,
    pos: usize,
    error_message: Option<String>,
}
impl StringReader {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            error_message: None,
        }
    }
    pub fn with_error(message: &[u8]) -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
            error_message: Some(String::from_utf8(message.to_vec()).unwrap()),
        }
    }
}
impl Read for StringReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(message) = &self.error_message {
            return Err(io::Error::other(message.clone()));
        }
        let remaining = &self.data[self.pos..];
        let count = remaining.len().min(buf.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.pos += count;
        Ok(count)
    }
}

/// Scripted keyboard input for the memory-mapped status/data registers.
pub struct FakeKeyboardInputProvider {
    characters: VecDeque<char>,
    interrupted: bool,
}
impl FakeKeyboardInputProvider {
    pub fn new(input: &str) -> Self {
        Self {
            characters: input.chars().collect(),
            interrupted: false,
        }
    }
    pub fn set_interrupted(&mut self) {
        self.interrupted = true;
    }
}
impl KeyboardInputProvider for FakeKeyboardInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        Ok(!self.characters.is_empty())
    }
    fn take_input_character(&mut self) -> char {
        self.characters.pop_front().expect("No input available")
    }
    fn is_interrupted(&self) -> bool {
        self.interrupted
    }
}

/// An [`Emulator`] with fake console streams and a scripted keyboard,
/// loaded with `program_no_header` at the default origin.
pub struct FakeEmulator<'a> {
    inner: Emulator,
    stdin_data: &'a [u8],
    stdout: StringWriter,
}
impl<'a> FakeEmulator<'a> {
    pub fn new(program_no_header: &[u16]) -> Self {
        Self::with_keyboard_input(program_no_header, "")
    }
    pub fn with_keyboard_input(program_no_header: &[u16], keyboard_input: &str) -> Self {
        let mut program = Vec::with_capacity(program_no_header.len() + 1);
        program.push(0x3000u16);
        if program_no_header.is_empty() {
            program.push(0);
        } else {
            program.extend_from_slice(program_no_header);
        }

        let kip = Rc::new(RefCell::new(FakeKeyboardInputProvider::new(keyboard_input)));
        let mut emu = Emulator::with_input_provider(kip);
        emu.load_image_words(program.as_slice())
            .expect("Error loading program");
        Self {
            inner: emu,
            stdin_data: b"",
            stdout: StringWriter::new(),
        }
    }
    pub fn add_stdin_input(&'_ mut self, input: &'a [u8]) -> &mut Self {
        self.stdin_data = input;
        self
    }
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, StringReader, &mut StringWriter) {
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            StringReader::from_bytes(self.stdin_data),
            &mut self.stdout,
        )
    }
    /// Runs the loaded program to completion against the fake streams.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        let mut stdin = StringReader::from_bytes(self.stdin_data);
        self.inner.execute_with_io(&mut stdin, &mut self.stdout)
    }
    pub fn registers(&self) -> &Registers {
        self.inner.registers()
    }
    pub fn output(&self) -> String {
        self.stdout.get_string()
    }
}
