//! Artifact resolution.
//!
//! The BOM builder never fetches bytes itself; it asks an
//! [`ArtifactResolver`] for a local copy of each dependency and of each
//! candidate dependency BOM.

mod maven;

pub use maven::{MavenRepositoryResolver, MavenResolverConfig};

use crate::error::ResolutionError;
use crate::model::coordinate::{self, DEFAULT_REGISTRY_ID, DEFAULT_REGISTRY_URL};
use crate::model::ArtifactCoordinate;
use std::fmt;

/// A remote repository artifacts are resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRepository {
    id: String,
    url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// The default public registry.
    #[must_use]
    pub fn central() -> Self {
        Self::new(DEFAULT_REGISTRY_ID, DEFAULT_REGISTRY_URL)
    }

    /// Repository publishing the given coordinate.
    ///
    /// Coordinates without a repository URL property, or pointing at a mirror
    /// of the default registry, share the `central` repository. Any other URL
    /// is its own repository, identified by the URL.
    #[must_use]
    pub fn for_coordinate(artifact: &ArtifactCoordinate) -> Self {
        let url = coordinate::resolve_repository_url(artifact);
        if url == DEFAULT_REGISTRY_URL {
            Self::central()
        } else {
            Self::new(url.clone(), url)
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base URL, without trailing slash
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// Capability to obtain a local copy of an artifact.
///
/// Implementations are shared between the worker threads of the builder.
///
/// # Example
///
/// ```ignore
/// let resolver = MavenRepositoryResolver::new(MavenResolverConfig::default())?;
/// let repository = RemoteRepository::for_coordinate(&coordinate);
/// let resolved = resolver.resolve(&coordinate, &repository)?;
/// println!("{}", resolved.file().unwrap().display());
/// ```
pub trait ArtifactResolver: Send + Sync {
    /// Resolve an artifact; the returned coordinate carries the local file.
    fn resolve(
        &self,
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepository,
    ) -> Result<ArtifactCoordinate, ResolutionError>;
}

/// A resolver that never finds anything.
///
/// Useful when the graph should be built from the document alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ArtifactResolver for NoOpResolver {
    fn resolve(
        &self,
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepository,
    ) -> Result<ArtifactCoordinate, ResolutionError> {
        Err(ResolutionError::NotFound {
            coordinate: artifact.to_string(),
            repository: repository.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::coordinate::DEFAULT_REGISTRY_ALT_URL;

    #[test]
    fn test_for_coordinate_default_registry() {
        let artifact = ArtifactCoordinate::new("g", "a", "1", "jar");
        assert_eq!(RemoteRepository::for_coordinate(&artifact), RemoteRepository::central());

        let mirrored = artifact.with_repository_url(Some(DEFAULT_REGISTRY_ALT_URL.to_string()));
        assert_eq!(RemoteRepository::for_coordinate(&mirrored), RemoteRepository::central());
    }

    #[test]
    fn test_for_coordinate_private_registry() {
        let artifact = ArtifactCoordinate::new("g", "a", "1", "jar")
            .with_repository_url(Some("https://repo.example.com/m2/".to_string()));
        let repository = RemoteRepository::for_coordinate(&artifact);
        assert_eq!(repository.id(), "https://repo.example.com/m2");
        assert_eq!(repository.url(), "https://repo.example.com/m2");
    }

    #[test]
    fn test_noop_resolver() {
        let artifact = ArtifactCoordinate::new("g", "a", "1", "jar");
        let err = NoOpResolver
            .resolve(&artifact, &RemoteRepository::central())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
