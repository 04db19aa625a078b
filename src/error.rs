// BlueStack Error Handling Module
// Every failure aborts the current run and travels back to the driver as a VmError

use colored::*;
use std::fmt;

/// Types of errors a run or a load can end with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CapacityExceeded,
    InvalidIndex,
    StackNotFound,
    StackOverflow,
    StackUnderflow,
    EmptySource,
    DivideByZero,
    LabelNotFound,
    InvalidInput,
    UnknownOpcode,
    MissingOperand,
    DuplicateLabel,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CapacityExceeded => write!(f, "CapacityExceeded"),
            ErrorKind::InvalidIndex => write!(f, "InvalidIndex"),
            ErrorKind::StackNotFound => write!(f, "StackNotFound"),
            ErrorKind::StackOverflow => write!(f, "StackOverflow"),
            ErrorKind::StackUnderflow => write!(f, "StackUnderflow"),
            ErrorKind::EmptySource => write!(f, "EmptySource"),
            ErrorKind::DivideByZero => write!(f, "DivideByZero"),
            ErrorKind::LabelNotFound => write!(f, "LabelNotFound"),
            ErrorKind::InvalidInput => write!(f, "InvalidInput"),
            ErrorKind::UnknownOpcode => write!(f, "UnknownOpcode"),
            ErrorKind::MissingOperand => write!(f, "MissingOperand"),
            ErrorKind::DuplicateLabel => write!(f, "DuplicateLabel"),
            ErrorKind::Io => write!(f, "IoError"),
        }
    }
}

/// Where an error happened: an instruction during a run, or a source line during loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Instruction { pc: usize, opcode: String },
    Line(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Instruction { pc, opcode } => write!(f, "pc {} ({})", pc, opcode),
            Location::Line(line) => write!(f, "line {}", line),
        }
    }
}

/// Main error type for BlueStack
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct VmError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
}

impl VmError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a location unless one is already set
    pub fn or_at(self, location: Location) -> Self {
        if self.location.is_some() {
            self
        } else {
            self.at(location)
        }
    }

    /// Format the error for the terminal: `Error: message` plus kind and location
    pub fn format(&self) -> String {
        let mut output = format!("{}: {}", "Error".red().bold(), self.message.white().bold());
        let detail = match &self.location {
            Some(location) => format!(" [{} at {}]", self.kind, location),
            None => format!(" [{}]", self.kind),
        };
        output.push_str(&detail.bright_black().to_string());
        output
    }

    /// Same as `format` without colors
    pub fn format_plain(&self) -> String {
        match &self.location {
            Some(location) => format!("Error: {} [{} at {}]", self.message, self.kind, location),
            None => format!("Error: {} [{}]", self.message, self.kind),
        }
    }
}

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        VmError::io(err.to_string())
    }
}

/// Result type for BlueStack operations
pub type VmResult<T> = Result<T, VmError>;

// Convenience constructors for common errors
impl VmError {
    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapacityExceeded, message)
    }

    pub fn invalid_index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidIndex, message)
    }

    pub fn stack_not_found(name: &str) -> Self {
        Self::new(ErrorKind::StackNotFound, format!("Stack not found: {}", name))
    }

    pub fn stack_overflow(name: &str) -> Self {
        Self::new(ErrorKind::StackOverflow, format!("Stack overflow on stack {}", name))
    }

    pub fn stack_underflow(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StackUnderflow, message)
    }

    pub fn empty_source() -> Self {
        Self::new(ErrorKind::EmptySource, "Cannot copy from empty stack")
    }

    pub fn divide_by_zero() -> Self {
        Self::new(ErrorKind::DivideByZero, "Divide by 0 error")
    }

    pub fn label_not_found(label: &str) -> Self {
        Self::new(ErrorKind::LabelNotFound, format!("Label not found: {}", label))
    }

    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput, "Invalid input")
    }

    pub fn unknown_opcode(token: &str) -> Self {
        Self::new(
            ErrorKind::UnknownOpcode,
            format!("Unexpected opcode received: {}", token),
        )
    }

    pub fn missing_operand(opcode: &str) -> Self {
        Self::new(
            ErrorKind::MissingOperand,
            format!("{} expects an operand", opcode),
        )
    }

    pub fn duplicate_label(label: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateLabel,
            format!("Label declared more than once: {}", label),
        )
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }
}
