//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::SourceLocation;
use crate::configurator::directive::ScopeLevel;

/// Errors raised while applying directives. The first one aborts the walk.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigureError {
    #[error("{location}: unknown directive `{name}`")]
    UnknownDirective {
        name: String,
        location: SourceLocation,
    },

    #[error("{location}: `{name}` cannot be used at {level} level")]
    DirectiveNotAllowedAtLevel {
        name: String,
        level: ScopeLevel,
        location: SourceLocation,
    },

    #[error("{location}: `{value}` is not {expected}")]
    ScalarFormat {
        value: String,
        expected: &'static str,
        location: SourceLocation,
    },

    #[error("{location}: argument must be one of: {allowed} (got `{value}`)")]
    InvalidEnumChoice {
        value: String,
        allowed: String,
        location: SourceLocation,
    },

    #[error("{location}: failed to load certificates file {}: {reason}", path.display())]
    CertificateLoad {
        path: PathBuf,
        reason: String,
        location: SourceLocation,
    },

    #[error("{location}: failed to parse URL `{url}`: {reason}")]
    TargetUrlParse {
        url: String,
        reason: String,
        location: SourceLocation,
    },

    #[error("{location}: scopes nested deeper than {max_depth} levels")]
    DepthExceeded {
        max_depth: usize,
        location: SourceLocation,
    },

    #[error("{location}: `{name}` expects a scalar argument, got a {found}")]
    ExpectedScalar {
        name: String,
        found: &'static str,
        location: SourceLocation,
    },

    #[error("{location}: expected a mapping, got a {found}")]
    ExpectedMapping {
        found: &'static str,
        location: SourceLocation,
    },
}

impl ConfigureError {
    /// Location of the node that caused the error.
    pub fn location(&self) -> &SourceLocation {
        match self {
            ConfigureError::UnknownDirective { location, .. }
            | ConfigureError::DirectiveNotAllowedAtLevel { location, .. }
            | ConfigureError::ScalarFormat { location, .. }
            | ConfigureError::InvalidEnumChoice { location, .. }
            | ConfigureError::CertificateLoad { location, .. }
            | ConfigureError::TargetUrlParse { location, .. }
            | ConfigureError::DepthExceeded { location, .. }
            | ConfigureError::ExpectedScalar { location, .. }
            | ConfigureError::ExpectedMapping { location, .. } => location,
        }
    }
}
