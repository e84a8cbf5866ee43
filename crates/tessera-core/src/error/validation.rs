use super::Error;

/// Error when a value fails validation constraints.
#[derive(Debug)]
pub(super) struct ValidationError {
    pub(super) kind: ValidationErrorKind,
}

#[derive(Debug)]
pub(super) enum ValidationErrorKind {
    /// String length constraint violation
    Length {
        value_len: usize,
        min: Option<usize>,
        max: Option<usize>,
    },
}

impl std::error::Error for ValidationError {}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.kind {
            ValidationErrorKind::Length {
                value_len,
                min,
                max,
            } => match (min, max) {
                (Some(min), Some(max)) if min == max => write!(
                    f,
                    "value length {value_len} does not match required length {min}"
                ),
                (Some(min), _) if value_len < min => {
                    write!(f, "value length {value_len} is too short (minimum: {min})")
                }
                (_, Some(max)) if value_len > max => {
                    write!(f, "value length {value_len} is too long (maximum: {max})")
                }
                _ => f.write_str("length constraint violation"),
            },
        }
    }
}

impl Error {
    /// Creates a length validation error.
    pub fn validation_length(value_len: usize, min: Option<usize>, max: Option<usize>) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationError {
            kind: ValidationErrorKind::Length {
                value_len,
                min,
                max,
            },
        }))
    }

    /// Returns `true` if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Validation(_)))
    }
}
