use crate::key::RegistrationKey;
use thiserror::Error;

/// Why a value could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  /// Nothing is registered under the key. Register a provider first, or treat the
  /// dependency as not configured.
  #[error("Missing provider for {0}")]
  MissingProvider(RegistrationKey),

  /// An entry exists but the value it produced is not of the requested type. This
  /// only happens when a registration was made against the wrong key and points
  /// at a programming error.
  #[error("Provider for {0} produced a value of an incorrect type")]
  IncorrectType(RegistrationKey),
}

impl ResolveError {
  pub fn key(&self) -> &RegistrationKey {
    match self {
      ResolveError::MissingProvider(key) | ResolveError::IncorrectType(key) => key,
    }
  }
}

/// A specialized `Result` type for resolver operations.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
