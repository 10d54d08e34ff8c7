//! Resolver backed by a Maven 2 repository layout.

use super::{ArtifactResolver, RemoteRepository};
use crate::error::{EnforcerError, ResolutionError, Result};
use crate::model::coordinate::DEFAULT_REGISTRY_ID;
use crate::model::ArtifactCoordinate;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Maven resolver configuration.
#[derive(Debug, Clone)]
pub struct MavenResolverConfig {
    /// Directory holding the local repository
    pub local_repository: PathBuf,
    /// Replaces the URL of the default registry for downloads
    pub central_mirror: Option<String>,
    /// Never contact remote repositories
    pub offline: bool,
    /// Timeout of a single download
    pub timeout: Duration,
}

impl Default for MavenResolverConfig {
    fn default() -> Self {
        Self {
            local_repository: default_local_repository(),
            central_mirror: None,
            offline: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// `~/.m2/repository`, the usual location of the local repository.
#[must_use]
pub fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".m2")
        .join("repository")
}

/// Looks artifacts up in a local repository, downloading missing ones.
pub struct MavenRepositoryResolver {
    client: Option<Client>,
    config: MavenResolverConfig,
}

impl MavenRepositoryResolver {
    /// Create a new resolver.
    pub fn new(config: MavenResolverConfig) -> Result<Self> {
        let client = if config.offline {
            None
        } else {
            let client = Client::builder()
                .timeout(config.timeout)
                .user_agent(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
                .build()
                .map_err(|e| EnforcerError::config(format!("Failed to create HTTP client: {e}")))?;
            Some(client)
        };
        Ok(Self { client, config })
    }

    /// Local repository directory
    #[must_use]
    pub fn local_repository(&self) -> &Path {
        &self.config.local_repository
    }

    /// Location of an artifact inside the local repository.
    ///
    /// Coordinates with parts that are not plain path segments are rejected,
    /// so the result never leaves the repository directory.
    fn local_path(&self, artifact: &ArtifactCoordinate) -> std::result::Result<PathBuf, ResolutionError> {
        let invalid = || ResolutionError::InvalidCoordinate {
            coordinate: artifact.to_string(),
        };
        if !artifact.is_layout_safe() {
            return Err(invalid());
        }
        let relative = PathBuf::from(artifact.repository_path());
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(invalid());
        }
        let target = self.config.local_repository.join(relative);
        if !target.starts_with(&self.config.local_repository) {
            return Err(invalid());
        }
        Ok(target)
    }

    fn download(
        &self,
        client: &Client,
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepository,
        target: &Path,
    ) -> std::result::Result<(), ResolutionError> {
        let base = match &self.config.central_mirror {
            Some(mirror) if repository.id() == DEFAULT_REGISTRY_ID => mirror.trim_end_matches('/'),
            _ => repository.url(),
        };
        let url = format!("{base}/{}", artifact.repository_path());
        let transport = |message: String| ResolutionError::Transport {
            coordinate: artifact.to_string(),
            repository: repository.to_string(),
            message,
        };

        let response = client.get(&url).send().map_err(|e| transport(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolutionError::NotFound {
                coordinate: artifact.to_string(),
                repository: repository.to_string(),
            });
        }
        if !status.is_success() {
            return Err(transport(format!("HTTP {}", status.as_u16())));
        }
        let bytes = response.bytes().map_err(|e| transport(e.to_string()))?;

        let storage = |e: std::io::Error| ResolutionError::Io {
            coordinate: artifact.to_string(),
            message: e.to_string(),
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(storage)?;
        }
        // Write next to the target, then move into place
        let partial = target.with_file_name(format!("{}.part", artifact.file_name()));
        fs::write(&partial, &bytes).map_err(storage)?;
        fs::rename(&partial, target).map_err(storage)?;

        tracing::info!("Downloaded {} from {}", artifact, url);
        Ok(())
    }
}

impl ArtifactResolver for MavenRepositoryResolver {
    fn resolve(
        &self,
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepository,
    ) -> std::result::Result<ArtifactCoordinate, ResolutionError> {
        let target = self.local_path(artifact)?;
        if target.is_file() {
            tracing::debug!("Found {} in local repository", artifact);
            return Ok(artifact.with_file(Some(target)));
        }

        match &self.client {
            Some(client) => {
                self.download(client, artifact, repository, &target)?;
                Ok(artifact.with_file(Some(target)))
            }
            None => Err(ResolutionError::NotFound {
                coordinate: artifact.to_string(),
                repository: format!("{} (offline)", self.config.local_repository.display()),
            }),
        }
    }
}
