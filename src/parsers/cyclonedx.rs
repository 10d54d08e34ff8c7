//! CycloneDX document parser.
//!
//! Supports CycloneDX 1.4 to 1.6 in JSON and XML. Only the parts of the
//! document the component graph needs are decoded; unknown elements are
//! ignored.

use crate::error::{EnforcerError, ErrorContext, ParseErrorKind, Result, StructureErrorKind};
use crate::model::ArtifactCoordinate;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Classifier marking an artifact as a CycloneDX document.
pub const CYCLONEDX_CLASSIFIER: &str = "cyclonedx";

/// Serialization of a CycloneDX document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BomFormat {
    Xml,
    Json,
}

impl BomFormat {
    /// Every supported format, in the order dependency BOMs are looked up.
    pub const ALL: [Self; 2] = [Self::Xml, Self::Json];

    /// File extension of the format
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }

    /// Determine the format of a BOM artifact from its classifier and extension.
    pub fn for_artifact(artifact: &ArtifactCoordinate) -> Result<Self> {
        if artifact.classifier() != Some(CYCLONEDX_CLASSIFIER) {
            return Err(EnforcerError::structure(
                format!("artifact {artifact}"),
                StructureErrorKind::NotABom,
            ));
        }
        match artifact.extension() {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(EnforcerError::structure(
                format!("artifact {artifact}"),
                StructureErrorKind::UnsupportedFormat(other.to_string()),
            )),
        }
    }
}

impl fmt::Display for BomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// In-memory CycloneDX document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxDocument {
    pub spec_version: Option<String>,
    pub metadata: Option<CdxMetadata>,
    #[serde(default)]
    pub components: Vec<CdxComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CdxMetadata {
    pub component: Option<CdxComponent>,
}

/// A component description as found in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxComponent {
    #[serde(rename = "type")]
    pub component_type: Option<String>,
    #[serde(rename = "bom-ref")]
    pub bom_ref: Option<String>,
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub purl: Option<String>,
    #[serde(default)]
    pub hashes: Vec<CdxHash>,
    #[serde(default)]
    pub external_references: Vec<CdxExternalReference>,
}

impl fmt::Display for CdxComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.purl, &self.group) {
            (Some(purl), _) => f.write_str(purl),
            (None, Some(group)) => write!(f, "{group}:{}", self.name),
            (None, None) => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CdxHash {
    pub alg: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CdxExternalReference {
    #[serde(rename = "type")]
    pub ref_type: String,
    pub url: String,
}

/// Parser for CycloneDX documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycloneDxParser;

impl CycloneDxParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse the file attached to a BOM artifact.
    ///
    /// The format is chosen from the artifact's extension before anything is read.
    pub fn parse_artifact(&self, artifact: &ArtifactCoordinate) -> Result<CdxDocument> {
        let format = BomFormat::for_artifact(artifact)?;
        let file = artifact.file().ok_or_else(|| {
            EnforcerError::parse(
                format!("BOM artifact {artifact}"),
                ParseErrorKind::Unreadable("artifact has no local file".to_string()),
            )
        })?;
        self.parse_file(file, format)
    }

    /// Parse a document from a file.
    pub fn parse_file(&self, path: &Path, format: BomFormat) -> Result<CdxDocument> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EnforcerError::parse(
                format!("BOM file {}", path.display()),
                ParseErrorKind::Unreadable(e.to_string()),
            )
        })?;
        self.parse_str(&content, format)
            .with_context(|| format!("BOM file {}", path.display()))
    }

    /// Parse a document from its serialized content.
    pub fn parse_str(&self, content: &str, format: BomFormat) -> Result<CdxDocument> {
        match format {
            BomFormat::Json => Self::parse_json(content),
            BomFormat::Xml => Self::parse_xml(content),
        }
    }

    fn parse_json(content: &str) -> Result<CdxDocument> {
        serde_json::from_str(content)
            .map_err(|e| EnforcerError::parse("", ParseErrorKind::InvalidJson(e.to_string())))
    }

    fn parse_xml(content: &str) -> Result<CdxDocument> {
        let bom: CdxBomXml = quick_xml::de::from_str(content)
            .map_err(|e| EnforcerError::parse("", ParseErrorKind::InvalidXml(e.to_string())))?;
        Ok(bom.into())
    }
}

// =============================================================================
// CycloneDX XML structures for deserialization
// XML uses wrapper elements for collections (e.g., <components><component>...)
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename = "bom")]
struct CdxBomXml {
    #[serde(rename = "@version")]
    version: Option<String>,
    metadata: Option<CdxMetadataXml>,
    components: Option<CdxComponentsXml>,
}

#[derive(Debug, Deserialize)]
struct CdxMetadataXml {
    component: Option<CdxComponentXml>,
}

#[derive(Debug, Deserialize)]
struct CdxComponentsXml {
    #[serde(rename = "component", default)]
    component: Vec<CdxComponentXml>,
}

#[derive(Debug, Deserialize)]
struct CdxComponentXml {
    #[serde(rename = "@type")]
    component_type: Option<String>,
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    group: Option<String>,
    name: String,
    version: Option<String>,
    purl: Option<String>,
    hashes: Option<CdxHashesXml>,
    #[serde(rename = "externalReferences")]
    external_references: Option<CdxExternalReferencesXml>,
}

#[derive(Debug, Deserialize)]
struct CdxHashesXml {
    #[serde(rename = "hash", default)]
    hash: Vec<CdxHashXml>,
}

#[derive(Debug, Deserialize)]
struct CdxHashXml {
    #[serde(rename = "@alg")]
    alg: String,
    #[serde(rename = "$text")]
    content: String,
}

#[derive(Debug, Deserialize)]
struct CdxExternalReferencesXml {
    #[serde(rename = "reference", default)]
    reference: Vec<CdxExternalReferenceXml>,
}

#[derive(Debug, Deserialize)]
struct CdxExternalReferenceXml {
    #[serde(rename = "@type")]
    ref_type: String,
    url: String,
}

impl From<CdxBomXml> for CdxDocument {
    fn from(bom: CdxBomXml) -> Self {
        Self {
            spec_version: bom.version,
            metadata: bom.metadata.map(|m| CdxMetadata {
                component: m.component.map(Into::into),
            }),
            components: bom
                .components
                .map(|c| c.component.into_iter().map(Into::into).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<CdxComponentXml> for CdxComponent {
    fn from(c: CdxComponentXml) -> Self {
        Self {
            component_type: c.component_type,
            bom_ref: c.bom_ref,
            group: c.group,
            name: c.name,
            version: c.version,
            purl: c.purl.map(|p| p.trim().to_string()),
            hashes: c
                .hashes
                .map(|h| {
                    h.hash
                        .into_iter()
                        .map(|h| CdxHash {
                            alg: h.alg,
                            content: h.content.trim().to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            external_references: c
                .external_references
                .map(|r| {
                    r.reference
                        .into_iter()
                        .map(|r| CdxExternalReference {
                            ref_type: r.ref_type,
                            url: r.url.trim().to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
