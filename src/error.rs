//! Error types for the symmetry-sampling filter.

use std::fmt;

/// Errors that can occur while configuring the filter.
///
/// Malformed clouds (a descriptor channel present with the wrong width)
/// are not represented here: they are programming errors in an internal
/// pipeline stage and fail a fatal assertion instead.
#[derive(Debug, Clone)]
pub enum SymmetryError {
    /// A configuration field is outside its documented range.
    InvalidParameter {
        name: &'static str,
        message: String,
    },
}

impl fmt::Display for SymmetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymmetryError::InvalidParameter { name, message } => {
                write!(f, "invalid parameter `{}`: {}", name, message)
            }
        }
    }
}

impl std::error::Error for SymmetryError {}
