use std::fmt::{Display, Formatter};

use rolewarden_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted length for platform identifiers.
pub const IDENTIFIER_MAX_LENGTH: usize = 64;

macro_rules! opaque_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            pub fn new(value: impl Into<String>) -> AppResult<Self> {
                validate_identifier(value.into(), $label).map(Self)
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = AppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter.write_str(self.0.as_str())
            }
        }
    };
}

opaque_identifier!(
    /// Identifier of a community (guild) on the chat platform.
    CommunityId,
    "community id"
);

opaque_identifier!(
    /// Identifier of a role, unique across the whole platform.
    RoleId,
    "role id"
);

opaque_identifier!(
    /// Identifier of a platform user.
    UserId,
    "user id"
);

fn validate_identifier(value: String, label: &str) -> AppResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{label} must not be empty")));
    }

    if trimmed.len() > IDENTIFIER_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "{label} must be at most {IDENTIFIER_MAX_LENGTH} characters"
        )));
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(format!(
            "{label} '{trimmed}' must not contain whitespace"
        )));
    }

    Ok(trimmed.to_owned())
}
