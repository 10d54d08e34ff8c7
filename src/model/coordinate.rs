//! Artifact coordinates and the pure utilities that operate on them.
//!
//! A coordinate is immutable: every mutation (`with_classifier`,
//! `with_extension`, `with_file`, ...) returns a new value and leaves the
//! original untouched.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the property holding the URL of the repository that publishes an artifact.
pub const REPOSITORY_URL: &str = "repository_url";

/// URL of the default public registry (Maven Central as configured by the Super POM).
pub const DEFAULT_REGISTRY_URL: &str = "https://repo.maven.apache.org/maven2";

/// Alternative location of the default public registry.
pub const DEFAULT_REGISTRY_ALT_URL: &str = "https://repo1.maven.org/maven2";

/// Repository id used for the default public registry.
pub const DEFAULT_REGISTRY_ID: &str = "central";

/// Identifies a resolvable build artifact.
///
/// Equality takes every field into account, including the local file;
/// ordering between coordinates is given by [`compare`], which only looks at
/// `(group, name, version, classifier, extension)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    group: String,
    name: String,
    version: String,
    classifier: Option<String>,
    extension: String,
    repository_url: Option<String>,
    file: Option<PathBuf>,
}

/// The part of a coordinate that determines its identity in a graph.
pub type CoordinateKey = (String, String, String, String, String);

impl ArtifactCoordinate {
    /// Create a coordinate without classifier, repository URL or file.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            classifier: None,
            extension: extension.into(),
            repository_url: None,
            file: None,
        }
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Repository URL property, if the artifact is not on the default registry
    #[must_use]
    pub fn repository_url(&self) -> Option<&str> {
        self.repository_url.as_deref()
    }

    /// Local file holding the artifact, once resolved
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Returns a copy with the given classifier; an empty string clears it.
    #[must_use]
    pub fn with_classifier(&self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        Self {
            classifier: (!classifier.is_empty()).then_some(classifier),
            ..self.clone()
        }
    }

    /// Returns a copy with the given extension.
    #[must_use]
    pub fn with_extension(&self, extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with the given repository URL property.
    #[must_use]
    pub fn with_repository_url(&self, repository_url: Option<String>) -> Self {
        Self {
            repository_url,
            ..self.clone()
        }
    }

    /// Returns a copy attached to the given local file.
    #[must_use]
    pub fn with_file(&self, file: Option<PathBuf>) -> Self {
        Self {
            file,
            ..self.clone()
        }
    }

    /// Identity key used to order and deduplicate coordinates.
    #[must_use]
    pub fn key(&self) -> CoordinateKey {
        (
            self.group.clone(),
            self.name.clone(),
            self.version.clone(),
            self.classifier.clone().unwrap_or_default(),
            self.extension.clone(),
        )
    }

    /// File name of the artifact in a Maven 2 repository layout.
    #[must_use]
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.name, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.name, self.version, self.extension),
        }
    }

    /// Returns `true` if every part maps to a plain path segment of a Maven 2
    /// repository layout.
    ///
    /// Group, name, version and extension must be non-empty; no part may hold
    /// a separator, a NUL or `..`.
    #[must_use]
    pub fn is_layout_safe(&self) -> bool {
        !self.group.is_empty()
            && self.group.split('.').all(is_path_segment)
            && is_path_segment(&self.name)
            && is_path_segment(&self.version)
            && is_path_segment(&self.extension)
            && self.classifier.as_deref().is_none_or(is_path_segment)
    }

    /// Relative path of the artifact in a Maven 2 repository layout.
    ///
    /// Only meaningful for coordinates that are [layout safe](Self::is_layout_safe).
    #[must_use]
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.name,
            self.version,
            self.file_name()
        )
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

fn is_path_segment(part: &str) -> bool {
    !part.is_empty() && !part.contains("..") && !part.contains(['/', '\\', '\0'])
}

/// Total order over coordinates: group, name, version, classifier, extension.
///
/// A missing classifier sorts before any present one.
#[must_use]
pub fn compare(left: &ArtifactCoordinate, right: &ArtifactCoordinate) -> Ordering {
    left.group
        .cmp(&right.group)
        .then_with(|| left.name.cmp(&right.name))
        .then_with(|| left.version.cmp(&right.version))
        .then_with(|| {
            left.classifier
                .as_deref()
                .unwrap_or_default()
                .cmp(right.classifier.as_deref().unwrap_or_default())
        })
        .then_with(|| left.extension.cmp(&right.extension))
}

/// URL of the repository an artifact should be resolved from.
///
/// Falls back to the default registry, and maps its alternative location
/// to the canonical one so both resolve through the same repository.
#[must_use]
pub fn resolve_repository_url(coordinate: &ArtifactCoordinate) -> String {
    let url = coordinate
        .repository_url()
        .unwrap_or(DEFAULT_REGISTRY_URL)
        .trim_end_matches('/');
    if url == DEFAULT_REGISTRY_ALT_URL {
        DEFAULT_REGISTRY_URL.to_string()
    } else {
        url.to_string()
    }
}
