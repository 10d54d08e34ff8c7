//! Components of a bill of materials.

use super::coordinate::{self, ArtifactCoordinate};
use super::identifiers::PackageIdentifier;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Checksum algorithms that may be declared for a component.
///
/// Each variant maps to the identifier used by CycloneDX documents (if any)
/// and to the name of the digest that computes it. Having a digest name does
/// not mean a digest implementation is available; see
/// [`crate::rules::checksum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecksumAlgorithm {
    Adler32,
    Md2,
    Md4,
    Md5,
    Md6,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b256,
    Blake2b384,
    Blake2b512,
    Blake3,
}

struct AlgorithmNames {
    algorithm: ChecksumAlgorithm,
    cyclonedx: Option<&'static str>,
    digest: &'static str,
}

const ALGORITHMS: &[AlgorithmNames] = &[
    AlgorithmNames { algorithm: ChecksumAlgorithm::Adler32, cyclonedx: None, digest: "ADLER32" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Md2, cyclonedx: None, digest: "MD2" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Md4, cyclonedx: None, digest: "MD4" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Md5, cyclonedx: Some("MD5"), digest: "MD5" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Md6, cyclonedx: None, digest: "MD6" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha1, cyclonedx: Some("SHA-1"), digest: "SHA-1" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha224, cyclonedx: None, digest: "SHA-224" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha256, cyclonedx: Some("SHA-256"), digest: "SHA-256" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha384, cyclonedx: Some("SHA-384"), digest: "SHA-384" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha512, cyclonedx: Some("SHA-512"), digest: "SHA-512" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha3_256, cyclonedx: Some("SHA3-256"), digest: "SHA3-256" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha3_384, cyclonedx: Some("SHA3-384"), digest: "SHA3-384" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Sha3_512, cyclonedx: Some("SHA3-512"), digest: "SHA3-512" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Blake2b256, cyclonedx: Some("BLAKE2b-256"), digest: "BLAKE2b-256" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Blake2b384, cyclonedx: Some("BLAKE2b-384"), digest: "BLAKE2b-384" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Blake2b512, cyclonedx: Some("BLAKE2b-512"), digest: "BLAKE2b-512" },
    AlgorithmNames { algorithm: ChecksumAlgorithm::Blake3, cyclonedx: Some("BLAKE3"), digest: "BLAKE3" },
];

impl ChecksumAlgorithm {
    fn names(self) -> &'static AlgorithmNames {
        // The table has one row per variant, in declaration order
        &ALGORITHMS[self as usize]
    }

    /// Looks up an algorithm by its CycloneDX identifier.
    #[must_use]
    pub fn from_cyclonedx(name: &str) -> Option<Self> {
        ALGORITHMS
            .iter()
            .find(|names| names.cyclonedx == Some(name))
            .map(|names| names.algorithm)
    }

    /// Identifier used in CycloneDX documents, if the standard defines one.
    #[must_use]
    pub fn to_cyclonedx(self) -> Option<&'static str> {
        self.names().cyclonedx
    }

    /// Name of the digest computing this checksum.
    #[must_use]
    pub fn digest_name(self) -> &'static str {
        self.names().digest
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.digest_name())
    }
}

/// A reference from a component to an external resource.
///
/// Ordering is by type, then location, then content type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalReference {
    reference_type: String,
    location: String,
    content_type: Option<String>,
}

impl ExternalReference {
    pub fn new(reference_type: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            reference_type: reference_type.into(),
            location: location.into(),
            content_type: None,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Reference type, using the vocabulary of the source document (e.g. `vcs`, `website`)
    #[must_use]
    pub fn reference_type(&self) -> &str {
        &self.reference_type
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// MIME type of the resource, if known
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// A node of the component graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    artifact: ArtifactCoordinate,
    purl: Option<PackageIdentifier>,
    bills_of_materials: Vec<ArtifactCoordinate>,
    external_references: BTreeSet<ExternalReference>,
    checksums: BTreeMap<ChecksumAlgorithm, String>,
}

impl Component {
    /// Start building a component for the given artifact.
    pub fn builder(artifact: ArtifactCoordinate) -> ComponentBuilder {
        ComponentBuilder {
            artifact,
            purl: None,
            bills_of_materials: Vec::new(),
            external_references: BTreeSet::new(),
            checksums: BTreeMap::new(),
        }
    }

    /// The artifact described by this component, resolved when possible.
    #[must_use]
    pub fn artifact(&self) -> &ArtifactCoordinate {
        &self.artifact
    }

    /// Package identifier as declared in the bill of materials
    #[must_use]
    pub fn purl(&self) -> Option<&PackageIdentifier> {
        self.purl.as_ref()
    }

    /// Every BOM document known to describe this component, in coordinate order.
    #[must_use]
    pub fn bills_of_materials(&self) -> &[ArtifactCoordinate] {
        &self.bills_of_materials
    }

    pub fn external_references(&self) -> impl Iterator<Item = &ExternalReference> {
        self.external_references.iter()
    }

    /// Declared checksums. These can differ from the digests of the artifact file.
    #[must_use]
    pub fn checksums(&self) -> &BTreeMap<ChecksumAlgorithm, String> {
        &self.checksums
    }

    /// Human-readable label: the package identifier, else the coordinate.
    #[must_use]
    pub fn label(&self) -> String {
        self.purl
            .as_ref()
            .map_or_else(|| self.artifact.to_string(), ToString::to_string)
    }
}

/// Accumulates the parts of a [`Component`].
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    artifact: ArtifactCoordinate,
    purl: Option<PackageIdentifier>,
    bills_of_materials: Vec<ArtifactCoordinate>,
    external_references: BTreeSet<ExternalReference>,
    checksums: BTreeMap<ChecksumAlgorithm, String>,
}

impl ComponentBuilder {
    pub fn artifact(&mut self, artifact: ArtifactCoordinate) -> &mut Self {
        self.artifact = artifact;
        self
    }

    pub fn purl(&mut self, purl: PackageIdentifier) -> &mut Self {
        self.purl = Some(purl);
        self
    }

    /// Adds a BOM document; a coordinate already present is ignored.
    pub fn add_bill_of_materials(&mut self, bom: ArtifactCoordinate) -> &mut Self {
        if let Err(pos) = self
            .bills_of_materials
            .binary_search_by(|existing| coordinate::compare(existing, &bom))
        {
            self.bills_of_materials.insert(pos, bom);
        }
        self
    }

    pub fn add_external_reference(&mut self, reference: ExternalReference) -> &mut Self {
        self.external_references.insert(reference);
        self
    }

    pub fn add_checksum(&mut self, algorithm: ChecksumAlgorithm, value: impl Into<String>) -> &mut Self {
        self.checksums.insert(algorithm, value.into());
        self
    }

    #[must_use]
    pub fn build(&self) -> Component {
        Component {
            artifact: self.artifact.clone(),
            purl: self.purl.clone(),
            bills_of_materials: self.bills_of_materials.clone(),
            external_references: self.external_references.clone(),
            checksums: self.checksums.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_table_matches_declaration_order() {
        for (index, names) in ALGORITHMS.iter().enumerate() {
            assert_eq!(names.algorithm as usize, index, "{:?}", names.algorithm);
        }
    }

    #[test]
    fn test_from_cyclonedx() {
        assert_eq!(ChecksumAlgorithm::from_cyclonedx("MD5"), Some(ChecksumAlgorithm::Md5));
        assert_eq!(ChecksumAlgorithm::from_cyclonedx("SHA-1"), Some(ChecksumAlgorithm::Sha1));
        assert_eq!(
            ChecksumAlgorithm::from_cyclonedx("BLAKE2b-256"),
            Some(ChecksumAlgorithm::Blake2b256)
        );
        assert_eq!(ChecksumAlgorithm::from_cyclonedx("SHA1"), None);
        assert_eq!(ChecksumAlgorithm::from_cyclonedx("ADLER32"), None);
    }

    #[test]
    fn test_cyclonedx_round_trip() {
        for names in ALGORITHMS {
            if let Some(name) = names.algorithm.to_cyclonedx() {
                assert_eq!(ChecksumAlgorithm::from_cyclonedx(name), Some(names.algorithm));
            }
        }
    }

    #[test]
    fn test_external_reference_order() {
        let mut refs = BTreeSet::new();
        refs.insert(ExternalReference::new("website", "https://b.example"));
        refs.insert(ExternalReference::new("vcs", "https://z.example"));
        refs.insert(ExternalReference::new("website", "https://a.example").with_content_type("text/html"));
        refs.insert(ExternalReference::new("website", "https://a.example"));

        let ordered: Vec<_> = refs
            .iter()
            .map(|r| (r.reference_type(), r.location(), r.content_type()))
            .collect();
        assert_eq!(
            ordered,
            vec![
                ("vcs", "https://z.example", None),
                ("website", "https://a.example", None),
                ("website", "https://a.example", Some("text/html")),
                ("website", "https://b.example", None),
            ]
        );
    }

    #[test]
    fn test_builder_deduplicates_boms() {
        let artifact = ArtifactCoordinate::new("g", "a", "1", "jar");
        let xml = artifact.with_classifier("cyclonedx").with_extension("xml");
        let json = artifact.with_classifier("cyclonedx").with_extension("json");

        let component = Component::builder(artifact)
            .add_bill_of_materials(xml.clone())
            .add_bill_of_materials(json.clone())
            .add_bill_of_materials(xml.clone())
            .build();
        assert_eq!(component.bills_of_materials(), [json, xml]);
    }

    #[test]
    fn test_value_equality() {
        let artifact = ArtifactCoordinate::new("g", "a", "1", "jar");
        let first = Component::builder(artifact.clone())
            .add_checksum(ChecksumAlgorithm::Md5, "abc")
            .add_external_reference(ExternalReference::new("vcs", "https://example.org"))
            .build();
        let second = Component::builder(artifact.clone())
            .add_external_reference(ExternalReference::new("vcs", "https://example.org"))
            .add_checksum(ChecksumAlgorithm::Md5, "abc")
            .build();
        assert_eq!(first, second);

        let third = Component::builder(artifact)
            .add_checksum(ChecksumAlgorithm::Md5, "abd")
            .build();
        assert_ne!(first, third);
    }

    #[test]
    fn test_label() {
        let artifact = ArtifactCoordinate::new("g", "a", "1", "jar");
        let bare = Component::builder(artifact.clone()).build();
        assert_eq!(bare.label(), "g:a:jar:1");

        let purl = PackageIdentifier::parse("pkg:maven/g/a@1").expect("valid purl");
        let named = Component::builder(artifact).purl(purl).build();
        assert_eq!(named.label(), "pkg:maven/g/a@1");
    }
}
