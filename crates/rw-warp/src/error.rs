use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum WarpError {
    NonInvertibleTransform,
    DimensionMismatch { expected: usize, actual: usize },
    Core(rw_core::Error),
}

impl fmt::Display for WarpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonInvertibleTransform => write!(f, "transform is not invertible"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected} axes, got {actual}")
            }
            Self::Core(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WarpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rw_core::Error> for WarpError {
    fn from(e: rw_core::Error) -> Self {
        Self::Core(e)
    }
}
