//! Error types.
//!
//! - `ModelError` is what the pure model layer can report (bad inputs).
//! - `AppError` carries a process exit code for the `pcm` binary.
//!
//! Exit codes: 2 = bad user input or user file I/O, 3 = invalid model
//! parameters, 4 = internal / export failures.

use crate::domain::Field;

/// Errors raised while building or deriving `Parameters`.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A parameter is outside the model's domain.
    InvalidParameter {
        field: Field,
        value: f64,
        reason: &'static str,
    },
}

impl ModelError {
    pub fn invalid(field: Field, value: f64, reason: &'static str) -> Self {
        ModelError::InvalidParameter { field, value, reason }
    }

    /// The offending field.
    pub fn field(&self) -> Field {
        match self {
            ModelError::InvalidParameter { field, .. } => *field,
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidParameter { field, value, reason } => {
                write!(f, "Invalid parameter {}={value}: {reason}", field.symbol())
            }
        }
    }
}

impl std::error::Error for ModelError {}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_maps_to_exit_code_3() {
        let err = ModelError::invalid(Field::L, 0.0, "must be >= 1");
        assert_eq!(err.field(), Field::L);
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 3);
        assert_eq!(app.to_string(), "Invalid parameter L=0: must be >= 1");
    }
}
