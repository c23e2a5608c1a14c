//! Error codes for the storefront API
//!
//! Standardized error codes shared between the server and its clients.
//! The HTTP layer maps these onto status codes; clients switch on the
//! string code, not on the message.

/// Standard API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Success
    Success,
    /// Validation error (400)
    Validation,
    /// Authentication required (401)
    Unauthorized,
    /// Permission denied (403)
    Forbidden,
    /// Resource not found (404)
    NotFound,
    /// Resource already exists (409)
    Conflict,
    /// Business rule violation (422)
    BusinessRule,
    /// Precondition failed (422)
    PreconditionFailed,
    /// Internal server error (500)
    Internal,
    /// Storage error (500)
    Storage,
    /// Invalid request (400)
    Invalid,
}

impl ApiErrorCode {
    /// Get the default message for this error
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Validation => "Validation failed",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Permission denied",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::BusinessRule => "Business rule violation",
            Self::PreconditionFailed => "Precondition failed",
            Self::Internal => "Internal server error",
            Self::Storage => "Storage error",
            Self::Invalid => "Invalid request",
        }
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Success => "E0000",
            Self::Validation => "E0002",
            Self::Unauthorized => "E3001",
            Self::Forbidden => "E2001",
            Self::NotFound => "E0003",
            Self::Conflict => "E0004",
            Self::BusinessRule => "E0005",
            Self::PreconditionFailed => "E0007",
            Self::Internal => "E9001",
            Self::Storage => "E9002",
            Self::Invalid => "E0006",
        }
    }
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ApiErrorCode::Success.code(), "E0000");
        assert_eq!(ApiErrorCode::NotFound.code(), "E0003");
        assert_eq!(ApiErrorCode::PreconditionFailed.code(), "E0007");
    }
}
