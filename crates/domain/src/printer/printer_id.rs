use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Value object representing a printer identifier
///
/// Rules:
/// - Must be non-empty
/// - Must contain only alphanumeric, underscore, hyphen, dot and colon
/// - Max length 100 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrinterId(String);

impl PrinterId {
    /// Create a new PrinterId with validation
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(DomainError::InvalidPrinterId(
                "Printer ID cannot be empty".to_string(),
            ));
        }

        if id.len() > 100 {
            return Err(DomainError::InvalidPrinterId(format!(
                "Printer ID too long: {} chars (max 100)",
                id.len()
            )));
        }

        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        {
            return Err(DomainError::InvalidPrinterId(format!(
                "Printer ID {id} must contain only alphanumeric, underscore, hyphen, dot and colon"
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PrinterId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PrinterId> for String {
    fn from(id: PrinterId) -> Self {
        id.0
    }
}

impl std::fmt::Display for PrinterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
