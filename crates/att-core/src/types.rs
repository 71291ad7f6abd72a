//! Identifier newtypes with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// Identifier of a status change.
    ///
    /// Unique within its attendance record only; two records may reuse the
    /// same ID.
    StatusChangeId, "status change ID"
);

define_string_id!(
    /// Identifier of an employee in the directory.
    EmployeeId, "employee ID"
);

define_string_id!(
    /// Identifier of an edit-history entry.
    EditId, "edit ID"
);

impl StatusChangeId {
    /// Generates a fresh random ID for a manually added status change.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl EditId {
    /// Generates a fresh random ID for an edit-history entry.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_id_rejects_empty() {
        assert!(StatusChangeId::new("").is_err());
        assert!(StatusChangeId::new("2025-01-06-start").is_ok());
    }

    #[test]
    fn employee_id_rejects_empty() {
        let err = EmployeeId::new("").unwrap_err();
        assert_eq!(err.to_string(), "employee ID cannot be empty");
    }

    #[test]
    fn status_change_id_serde_roundtrip() {
        let id = StatusChangeId::new("lunch-start").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"lunch-start\"");
        let parsed: StatusChangeId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn status_change_id_serde_rejects_empty() {
        let result: Result<StatusChangeId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn generated_ids_are_distinct_and_non_empty() {
        let a = EditId::generate();
        let b = EditId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());

        let c = StatusChangeId::generate();
        assert_eq!(c.as_str().len(), 32);
    }

    #[test]
    fn edit_id_as_ref() {
        let id = EditId::new("edit-1").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "edit-1");
    }
}
