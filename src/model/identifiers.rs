//! Package identifiers (Package URLs) for BOM components.
//!
//! Parsing and validation are delegated to the `packageurl` crate; the
//! result is stored as an owned, comparable [`PackageIdentifier`] so that
//! components keep value semantics.

use super::coordinate::{ArtifactCoordinate, REPOSITORY_URL};
use packageurl::PackageUrl;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Qualifier holding the artifact type (and therefore its extension).
pub const TYPE_QUALIFIER: &str = "type";

/// Qualifier holding the artifact classifier.
pub const CLASSIFIER_QUALIFIER: &str = "classifier";

/// Extension used when a package identifier carries no `type` qualifier.
pub const DEFAULT_TYPE: &str = "jar";

/// Package type used when deriving identifiers from group/name/version.
pub const MAVEN_TYPE: &str = "maven";

/// A parsed package identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageIdentifier {
    canonical: String,
    ty: String,
    namespace: Option<String>,
    name: String,
    version: Option<String>,
    qualifiers: BTreeMap<String, String>,
}

impl PackageIdentifier {
    /// Parse a `pkg:` identifier string.
    pub fn parse(purl: &str) -> Result<Self, packageurl::Error> {
        let parsed = PackageUrl::from_str(purl)?;
        Ok(Self::from_package_url(&parsed))
    }

    /// Derive a Maven package identifier from its group, name and version.
    pub fn maven(
        group: &str,
        name: &str,
        version: Option<&str>,
    ) -> Result<Self, packageurl::Error> {
        let mut purl = PackageUrl::new(MAVEN_TYPE, name.to_string())?;
        purl.with_namespace(group.to_string());
        if let Some(version) = version {
            purl.with_version(version.to_string());
        }
        Ok(Self::from_package_url(&purl))
    }

    fn from_package_url(purl: &PackageUrl<'_>) -> Self {
        Self {
            canonical: purl.to_string(),
            ty: purl.ty().to_string(),
            namespace: purl.namespace().map(str::to_string),
            name: purl.name().to_string(),
            version: purl.version().map(str::to_string),
            qualifiers: purl
                .qualifiers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Package type, e.g. `maven`
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers.get(key).map(String::as_str)
    }

    /// Converts the identifier into an unresolved artifact coordinate.
    ///
    /// The `type` qualifier (default `jar`) becomes the extension, and the
    /// `classifier` and `repository_url` qualifiers are carried over.
    #[must_use]
    pub fn to_coordinate(&self) -> ArtifactCoordinate {
        let extension = self.qualifier(TYPE_QUALIFIER).unwrap_or(DEFAULT_TYPE);
        let coordinate = ArtifactCoordinate::new(
            self.namespace.clone().unwrap_or_default(),
            self.name.clone(),
            self.version.clone().unwrap_or_default(),
            extension,
        )
        .with_repository_url(self.qualifier(REPOSITORY_URL).map(str::to_string));
        match self.qualifier(CLASSIFIER_QUALIFIER) {
            Some(classifier) => coordinate.with_classifier(classifier),
            None => coordinate,
        }
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
