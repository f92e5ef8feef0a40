use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use rand_distr::uniform::Error as UniformError;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// A line of the input file could not be turned into a record.
    Parse {
        line: usize,
        reason: String,
    },
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    UnknownColumn(String),
    InvalidConfig(String),
    /// `backward` was called without a training-mode forward pass before it.
    MissingForward,
    Io(io::Error),
    Config(serde_json::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::Parse { line, reason } => write!(f, "parse error at line {line}: {reason}"),
            MlErr::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} is out of bounds for a dataset of length {len}")
            }
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch for {what}: got {got}, expected {expected}"),
            MlErr::UnknownColumn(name) => write!(f, "unknown column {name:?}"),
            MlErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            MlErr::MissingForward => {
                write!(f, "backward pass requested without a training forward pass")
            }
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Config(e) => write!(f, "malformed config: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value)
    }
}

impl From<UniformError> for MlErr {
    fn from(value: UniformError) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}
