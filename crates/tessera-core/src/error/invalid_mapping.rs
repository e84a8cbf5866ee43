use super::Error;

/// Error when an entity mapping is declared incorrectly.
///
/// This occurs when:
/// - An attribute is registered twice under the same qualified name
/// - An order or group entry names an attribute the mapper does not own
/// - A composite primary key is decomposed from a scalar key value
/// - A join is built without its join condition or entity composer
/// - Join mappers are nested in a way the query strategy cannot execute
///
/// These errors are raised while mappers and queries are being built, before
/// any statement reaches a backend.
#[derive(Debug)]
pub(super) struct InvalidMapping {
    message: Box<str>,
}

impl std::error::Error for InvalidMapping {}

impl core::fmt::Display for InvalidMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid mapping: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMapping(InvalidMapping {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid mapping error.
    pub fn is_invalid_mapping(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidMapping(_)))
    }
}
