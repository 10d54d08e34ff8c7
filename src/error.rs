//! Unified error types for sbom-enforcer.
//!
//! Structural problems with a BOM document abort the build of the component
//! graph, while rule findings are gathered into a single
//! [`VerificationFailure`] per rule pass.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-enforcer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EnforcerError {
    /// The BOM document could not be read or decoded
    #[error("Failed to parse BOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// The BOM document is well-formed but lacks required elements
    #[error("Invalid BOM structure: {context}")]
    Structure {
        context: String,
        #[source]
        source: StructureErrorKind,
    },

    /// A component has no usable package identifier
    #[error("Unresolvable identifier: {context}")]
    Identifier {
        context: String,
        #[source]
        source: IdentifierErrorKind,
    },

    /// A component declares a digest with an unrecognized algorithm name
    #[error("Unknown checksum algorithm `{algorithm}` for component {component}")]
    UnknownChecksumAlgorithm { component: String, algorithm: String },

    /// An artifact could not be resolved from its repository
    #[error("Artifact resolution failed: {context}")]
    Resolution {
        context: String,
        #[source]
        source: ResolutionError,
    },

    /// A rule found violations
    #[error("{0}")]
    Verification(VerificationFailure),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Unreadable document: {0}")]
    Unreadable(String),
}

/// Specific structural error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StructureErrorKind {
    #[error("document does not contain a `$.metadata` element")]
    MissingMetadata,

    #[error("document does not contain a `$.metadata.component` element")]
    MissingMainComponent,

    #[error("unsupported CycloneDX artifact type: {0}")]
    UnsupportedFormat(String),

    #[error("artifact is not a CycloneDX document")]
    NotABom,
}

/// Specific identifier error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IdentifierErrorKind {
    #[error("Malformed PURL: {purl} - {reason}")]
    Invalid { purl: String, reason: String },

    #[error("missing PURL and group")]
    Missing,
}

/// Failure to resolve an artifact through an [`ArtifactResolver`].
///
/// [`ArtifactResolver`]: crate::resolver::ArtifactResolver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolutionError {
    /// The repository answered, but does not hold the artifact
    #[error("artifact {coordinate} not found in {repository}")]
    NotFound {
        coordinate: String,
        repository: String,
    },

    /// The repository could not be reached or returned an unexpected answer
    #[error("transfer of {coordinate} from {repository} failed: {message}")]
    Transport {
        coordinate: String,
        repository: String,
        message: String,
    },

    /// The artifact could not be stored locally
    #[error("local storage of {coordinate} failed: {message}")]
    Io { coordinate: String, message: String },

    /// The coordinate does not map to a path inside the local repository
    #[error("artifact {coordinate} has no path in the local repository")]
    InvalidCoordinate { coordinate: String },
}

impl ResolutionError {
    /// Returns `true` if the artifact is simply absent from the repository.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Aggregated, sorted findings of one rule pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationFailure {
    header: String,
    messages: Vec<String>,
}

impl VerificationFailure {
    /// Create a failure; the messages are sorted lexicographically.
    pub fn new(header: impl Into<String>, mut messages: Vec<String>) -> Self {
        messages.sort();
        Self {
            header: header.into(),
            messages,
        }
    }

    /// Summary line naming the offending document
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Every violation found, in lexicographic order
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.header)?;
        for message in &self.messages {
            write!(f, "\n* {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationFailure {}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-enforcer operations
pub type Result<T> = std::result::Result<T, EnforcerError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl EnforcerError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a structural error with context
    pub fn structure(context: impl Into<String>, source: StructureErrorKind) -> Self {
        Self::Structure {
            context: context.into(),
            source,
        }
    }

    /// Create an identifier error with context
    pub fn identifier(context: impl Into<String>, source: IdentifierErrorKind) -> Self {
        Self::Identifier {
            context: context.into(),
            source,
        }
    }

    /// Create a resolution error with context
    pub fn resolution(context: impl Into<String>, source: ResolutionError) -> Self {
        Self::Resolution {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` for errors caused by the shape of the BOM document.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structure { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for EnforcerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for EnforcerError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<VerificationFailure> for EnforcerError {
    fn from(failure: VerificationFailure) -> Self {
        Self::Verification(failure)
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// creating a chain that shows the path through the code.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<EnforcerError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: EnforcerError, new_ctx: &str) -> EnforcerError {
    match err {
        EnforcerError::Parse {
            context: existing,
            source,
        } => EnforcerError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        EnforcerError::Structure {
            context: existing,
            source,
        } => EnforcerError::Structure {
            context: chain_context(new_ctx, &existing),
            source,
        },
        EnforcerError::Identifier {
            context: existing,
            source,
        } => EnforcerError::Identifier {
            context: chain_context(new_ctx, &existing),
            source,
        },
        EnforcerError::Resolution {
            context: existing,
            source,
        } => EnforcerError::Resolution {
            context: chain_context(new_ctx, &existing),
            source,
        },
        EnforcerError::Io {
            path,
            message,
            source,
        } => EnforcerError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        EnforcerError::Config(msg) => EnforcerError::Config(chain_context(new_ctx, &msg)),
        // These carry their own complete description
        other @ (EnforcerError::UnknownChecksumAlgorithm { .. }
        | EnforcerError::Verification(_)) => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to a structural error of the given kind.
    fn or_structure(self, context: impl Into<String>, kind: StructureErrorKind) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn or_structure(self, context: impl Into<String>, kind: StructureErrorKind) -> Result<T> {
        self.ok_or_else(|| EnforcerError::structure(context, kind))
    }
}
