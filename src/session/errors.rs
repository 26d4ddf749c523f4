use thiserror::Error;

/// Errors raised while constructing a [`CookieSessionProvider`].
///
/// All validation happens at construction time; a provider that exists
/// handles requests without configuration errors.
///
/// [`CookieSessionProvider`]: crate::CookieSessionProvider
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionConfigError {
    /// No priority was supplied in the provider options.
    #[error("Priority must be specified")]
    MissingPriority,

    /// The supplied priority falls outside the allowed candidate range.
    #[error("Invalid priority {0}: must be between 0 and 100")]
    InvalidPriority(i32),

    /// The configured SameSite value is not one of Strict, Lax or None.
    #[error("Invalid SameSite value: {0}")]
    InvalidSameSite(String),
}
