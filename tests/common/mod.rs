//! Shared fixtures and fakes for the integration tests.

#![allow(dead_code)]

use sbom_enforcer::error::ResolutionError;
use sbom_enforcer::model::ArtifactCoordinate;
use sbom_enforcer::resolver::{ArtifactResolver, RemoteRepository};
use sbom_enforcer::rules::{HttpProber, NetworkError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

pub const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

// ============================================================================
// Artifact resolution
// ============================================================================

/// Resolver serving artifacts from a fixed map, keyed by coordinate.
#[derive(Default)]
pub struct MapResolver {
    artifacts: HashMap<String, PathBuf>,
    broken: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `file` for the coordinate.
    pub fn with_artifact(mut self, coordinate: &str, file: impl Into<PathBuf>) -> Self {
        self.artifacts.insert(coordinate.to_string(), file.into());
        self
    }

    /// Fail with a transport error for the coordinate.
    pub fn with_broken(mut self, coordinate: &str, message: &str) -> Self {
        self.broken.insert(coordinate.to_string(), message.to_string());
        self
    }

    /// Coordinates requested so far, sorted.
    pub fn requests(&self) -> Vec<String> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort();
        requests
    }
}

impl ArtifactResolver for MapResolver {
    fn resolve(
        &self,
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepository,
    ) -> Result<ArtifactCoordinate, ResolutionError> {
        let key = artifact.to_string();
        self.requests.lock().unwrap().push(key.clone());
        if let Some(message) = self.broken.get(&key) {
            return Err(ResolutionError::Transport {
                coordinate: key,
                repository: repository.to_string(),
                message: message.clone(),
            });
        }
        match self.artifacts.get(&key) {
            Some(file) => Ok(artifact.with_file(Some(file.clone()))),
            None => Err(ResolutionError::NotFound {
                coordinate: key,
                repository: repository.to_string(),
            }),
        }
    }
}

// ============================================================================
// HTTP probing
// ============================================================================

/// Prober answering with the status code found in the last path segment.
///
/// A last segment of `exception` simulates a connection failure; any other
/// non-numeric segment answers 404.
#[derive(Default)]
pub struct RecordingProber {
    calls: Mutex<Vec<String>>,
}

impl RecordingProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs probed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl HttpProber for RecordingProber {
    fn head(&self, url: &Url, _timeout: Duration) -> Result<u16, NetworkError> {
        self.calls.lock().unwrap().push(url.to_string());
        let last = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();
        if last == "exception" {
            return Err(NetworkError {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(last.parse().unwrap_or(404))
    }
}
