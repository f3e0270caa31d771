//! Console IO services reachable through the TRAP opcode.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use std::io;
use std::io::{Read, Write};
use std::ops::ControlFlow;
use tracing::debug;

/// The six service routines of the LC-3 trap vector space.
#[repr(u8)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapVector {
    /// Get character from keyboard, not echoed
    Getc = 0x20,
    /// Output a character
    Out = 0x21,
    /// Output a word string
    Puts = 0x22,
    /// Get character from keyboard, echoed onto the terminal
    In = 0x23,
    /// Output a byte string
    Putsp = 0x24,
    /// Halt the program
    Halt = 0x25,
}

/// Routes a TRAP instruction to its service routine.
///
/// R7 receives the return address first, exactly as for JSR. A vector
/// outside the table is ignored so malformed programs keep running,
/// in contrast to the fatal reserved opcodes.
pub fn dispatch<R: Read, W: Write>(
    i: Instruction,
    regs: &mut Registers,
    mem: &Memory,
    stdin: &mut R,
    stdout: &mut W,
) -> ControlFlow<Result<(), ExecutionError>> {
    regs.set(7, regs.pc());
    match TrapVector::n(i.trap_vector()) {
        Some(TrapVector::Getc) => get_c(regs, stdin),
        Some(TrapVector::Out) => out(regs, stdout),
        Some(TrapVector::Puts) => put_s(regs, mem, stdout),
        Some(TrapVector::In) => in_trap(regs, stdin, stdout),
        Some(TrapVector::Putsp) => put_sp(regs, mem, stdout),
        Some(TrapVector::Halt) => halt(stdout),
        None => {
            debug!(vector = i.trap_vector(), "ignoring unknown trap vector");
            ControlFlow::Continue(())
        }
    }
}

fn read_character_from_console<R: Read>(
    regs: &mut Registers,
    stdin: &mut R,
) -> ControlFlow<Result<(), ExecutionError>, u8> {
    let mut b = [0; 1];
    match stdin.read_exact(&mut b) {
        Ok(()) => {
            regs.set(0, from_binary(u16::from(b[0])));
            regs.update_conditional_register(0);
            ControlFlow::Continue(b[0])
        }
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c<R: Read>(
    regs: &mut Registers,
    stdin: &mut R,
) -> ControlFlow<Result<(), ExecutionError>> {
    let _character = read_character_from_console(regs, stdin)?;
    ControlFlow::Continue(())
}

/// IN: Print a prompt on the screen and read a single character echoed back from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap<R: Read, W: Write>(
    regs: &mut Registers,
    stdin: &mut R,
    stdout: &mut W,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out("Input: ", stdout)?;
    let character = read_character_from_console(regs, stdin)?;
    write_str_out(&String::from(character as char), stdout)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out<W: Write>(regs: &Registers, stdout: &mut W) -> ControlFlow<Result<(), ExecutionError>> {
    let c: char = (regs.get(0).as_binary() & 0xFF) as u8 as char;
    write_str_out(&String::from(c), stdout)
}

fn put_one_char_per_u16(input: u16, append_to: &mut String) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Truncation is what is expected here"
    )]
    let c = (input as u8) as char;
    append_to.push(c);
}

fn put_two_chars_per_u16(input: u16, append_to: &mut String) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Truncation is what is expected here"
    )]
    let c = (input as u8) as char;
    append_to.push(c);
    let c = ((input >> 8) as u8) as char;
    if c != '\0' {
        append_to.push(c);
    }
}

fn put<W: Write>(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut W,
    handle_char: fn(u16, &mut String),
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0).as_binary();
    let mut s = String::with_capacity(120);
    while mem[address] != 0 {
        handle_char(mem[address], &mut s);
        address = address.wrapping_add(1);
    }
    write_str_out(s.as_str(), stdout)
}

/// PUTS: print the zero word terminated string starting at the address in R0,
/// one character per word.
pub fn put_s<W: Write>(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut W,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// The second character of the last memory location can be 0x00.
/// Writing terminates with a 0x0000 word.
pub fn put_sp<W: Write>(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut W,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: End program and stdout a message
pub fn halt<W: Write>(stdout: &mut W) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out("\nProgram halted\n", stdout)?;
    ControlFlow::Break(Ok(()))
}

fn write_str_out<W: Write>(
    message: &str,
    stdout: &mut W,
) -> ControlFlow<Result<(), ExecutionError>> {
    match write!(stdout, "{message}").and_then(|()| stdout.flush()) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf<C>(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, C> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::test_helpers::{FakeEmulator, StringReader};
    use crate::hardware::registers::ConditionFlag;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_get_c() {
        let mut stdin = StringReader::from_bytes(b"a");
        let mut regs = Registers::new();
        let res = get_c(&mut regs, &mut stdin);
        assert_that!(res, eq(&ControlFlow::Continue(())));
        expect_that!(regs.get(0), eq(from_binary(u16::from(b'a'))));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
    }
    #[gtest]
    pub fn test_get_c_read_error() {
        let mut stdin = StringReader::with_error(b"Error during read");
        let mut regs = Registers::new();
        let res = get_c(&mut regs, &mut stdin);
        assert!(res.is_break());
        let execution_error = res.break_value().unwrap().unwrap_err();
        assert_that!(
            execution_error.to_string(),
            eq("Error during reading Stdin or writing program output to Stdout: Error during read")
        );
    }
    #[gtest]
    pub fn test_put_s() {
        let data = [0x48u16, 0x49, 0x0000, 0x4F];
        let mut emu = FakeEmulator::new(&data);
        let (regs, mem, _reader, writer) = emu.get_parts();
        regs.set(0, from_binary(0x3000));
        let res = put_s(regs, mem, writer);
        assert!(res.is_continue());
        // stops at the zero word, nothing beyond "HI" is written
        assert_that!(writer.get_string(), eq("HI"));
    }
    #[gtest]
    pub fn test_put_sp() {
        let data = [
            0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0x6548u16, 0x6c6c, 0x206f, 0x6f57, 0x6c72,
            0x2164, 0x0000,
        ];
        let mut emu = FakeEmulator::new(&data);
        let (regs, mem, _reader, writer) = emu.get_parts();
        regs.set(0, from_binary(0x3005));
        let res = put_sp(regs, mem, writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Hello World!"));
    }
    #[gtest]
    pub fn test_in() {
        let mut emu = FakeEmulator::new(&[]);
        emu.add_stdin_input(b"abc");
        let (regs, _mem, mut reader, writer) = emu.get_parts();
        let res = in_trap(regs, &mut reader, writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("Input: a"));
        expect_that!(regs.get(0), eq(from_binary(u16::from(b'a'))));
    }
    #[gtest]
    pub fn test_out() {
        let mut emu = FakeEmulator::new(&[]);
        let (regs, _mem, _reader, writer) = emu.get_parts();
        regs.set(0, from_binary(u16::from(b'k')));
        let res = out(regs, writer);
        assert!(res.is_continue());
        assert_that!(writer.get_string(), eq("k"));
    }
    #[gtest]
    pub fn test_halt_breaks_with_success() {
        let mut emu = FakeEmulator::new(&[]);
        let (_regs, _mem, _reader, writer) = emu.get_parts();
        let res = halt(writer);
        assert_that!(res, eq(&ControlFlow::Break(Ok(()))));
        assert_that!(writer.get_string(), eq("\nProgram halted\n"));
    }
    #[gtest]
    pub fn test_dispatch_unknown_vector_is_a_noop() {
        let mut emu = FakeEmulator::new(&[]);
        let (regs, mem, mut reader, writer) = emu.get_parts();
        regs.set_pc(0x3001);
        // TRAP 0x77 is outside the vector table
        let res = dispatch(0xF077.into(), regs, mem, &mut reader, writer);
        assert_that!(res, eq(&ControlFlow::Continue(())));
        assert_that!(writer.get_string(), eq(""));
    }
    #[gtest]
    pub fn test_dispatch_links_return_address_in_r7() {
        let mut emu = FakeEmulator::new(&[]);
        let (regs, mem, mut reader, writer) = emu.get_parts();
        regs.set(0, from_binary(u16::from(b'x')));
        regs.set_pc(0x3042);
        let res = dispatch(0xF021.into(), regs, mem, &mut reader, writer);
        assert!(res.is_continue());
        expect_that!(regs.get(7), eq(from_binary(0x3042)));
        assert_that!(writer.get_string(), eq("x"));
    }
}
