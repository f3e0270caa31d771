use displaydoc::Display;
use std::error::Error;

/// Errors while loading an LC-3 image into memory, execution never starts.
#[derive(Display, Debug)]
pub enum LoadProgramError {
    /// Image is missing the leading .ORIG origin word
    ImageMissingOrigHeader,
    /// Error reading image data: {0}
    IOReadError(String),
}
impl Error for LoadProgramError {}

impl From<std::io::Error> for LoadProgramError {
    fn from(error: std::io::Error) -> Self {
        Self::IOReadError(error.to_string())
    }
}

/// Errors that stop the execution loop.
///
/// IO errors are carried as strings so execution outcomes stay comparable in tests.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Reserved opcode {opcode} executed at address {address:#06X}
    ReservedOpcode { opcode: u8, address: u16 },
    /// Execution interrupted by CTRL-C
    Interrupted,
}
impl Error for ExecutionError {}
