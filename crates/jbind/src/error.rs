//! Error types for the typed call layer

use crate::resolve::MemberKind;

/// Result type for call-layer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Call-layer error kinds.
///
/// Every failure surfaces to the immediate caller as one of these variants;
/// nothing is retried internally and no variant leaves a half-constructed,
/// usable handle behind. Callers branch on the variant, never on message
/// text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The foreign runtime failed to initialize
    #[error("failed to create foreign runtime (status {status})")]
    Creation {
        /// Numeric status code reported by the runtime
        status: i32,
    },

    /// Class lookup by fully-qualified name failed
    #[error("class '{class}' not found")]
    ClassNotFound {
        /// Binary name that was looked up
        class: String,
    },

    /// Member lookup failed; carries the attempted triple for diagnostics
    #[error("failed to resolve {kind} '{member}' {descriptor} on class '{class}'")]
    Resolution {
        /// Owning class name
        class: String,
        /// Member name that was looked up
        member: String,
        /// Full signature descriptor that was attempted
        descriptor: String,
        /// Whether a static method, instance method, or constructor was requested
        kind: MemberKind,
    },

    /// String conversion overflow or native string-creation failure
    #[error("string encoding failed: {reason}")]
    Encoding {
        /// What went wrong
        reason: String,
    },

    /// A reference-returning call produced no object and no foreign exception
    #[error("foreign call '{member}' returned no object")]
    NullResult {
        /// Member whose invocation came back empty
        member: String,
    },

    /// A pending foreign exception was detected after a call
    #[error("foreign exception: {0}")]
    ForeignException(String),

    /// Argument list does not match the member signature
    #[error("argument mismatch: expected {expected}, got {got}")]
    ArgumentMismatch {
        /// Expected arity or descriptor token
        expected: String,
        /// What the caller supplied
        got: String,
    },
}
