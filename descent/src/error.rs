use std::fmt;

/// Contract violations the numerical core can report.
///
/// Numerical divergence (NaN or infinity in a trajectory or a prediction) is
/// deliberately not represented here: it is a legitimate result that callers
/// detect by inspecting the values themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Shape mismatch between a parameter vector, an input batch, a target
    /// vector, or a gradient and the dimensionality the operation expects.
    Dimension(String),
    /// `backward` was handed an output that does not belong to the forward
    /// trace it was paired with.
    UnpairedBackward(String),
    /// A dropout probability outside `[0, 1]`.
    InvalidProbability(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Dimension(msg) => write!(f, "dimension mismatch: {msg}"),
            Error::UnpairedBackward(msg) => write!(f, "unpaired backward call: {msg}"),
            Error::InvalidProbability(msg) => write!(f, "invalid probability: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
