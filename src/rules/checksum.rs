//! Verification of the checksums declared in the BOM.

use super::{rule_options, EnforcerRule};
use crate::error::{Result, VerificationFailure};
use crate::model::{BillOfMaterials, ChecksumAlgorithm, Component};
use serde::Deserialize;
use sha2::digest::DynDigest;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub(crate) const RULE_NAME: &str = "checksum";

/// The checksum rule takes no options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksumConfig {}

pub(crate) fn create(options: &serde_yaml_ng::Value) -> Result<Box<dyn EnforcerRule>> {
    let _: ChecksumConfig = rule_options(RULE_NAME, options)?;
    Ok(Box::new(ChecksumRule::new()))
}

/// Digest implementation computing the given checksum, if one is available.
fn digest_for(algorithm: ChecksumAlgorithm) -> Option<Box<dyn DynDigest>> {
    use ChecksumAlgorithm as A;
    let digest: Box<dyn DynDigest> = match algorithm {
        A::Md5 => Box::new(md5::Md5::default()),
        A::Sha1 => Box::new(sha1::Sha1::default()),
        A::Sha224 => Box::new(sha2::Sha224::default()),
        A::Sha256 => Box::new(sha2::Sha256::default()),
        A::Sha384 => Box::new(sha2::Sha384::default()),
        A::Sha512 => Box::new(sha2::Sha512::default()),
        A::Sha3_256 => Box::new(sha3::Sha3_256::default()),
        A::Sha3_384 => Box::new(sha3::Sha3_384::default()),
        A::Sha3_512 => Box::new(sha3::Sha3_512::default()),
        A::Adler32
        | A::Md2
        | A::Md4
        | A::Md6
        | A::Blake2b256
        | A::Blake2b384
        | A::Blake2b512
        | A::Blake3 => return None,
    };
    Some(digest)
}

/// Returns `true` if checksums of this algorithm can be verified.
#[must_use]
pub fn is_supported(algorithm: ChecksumAlgorithm) -> bool {
    digest_for(algorithm).is_some()
}

/// Hex-encoded digest of a file's content.
///
/// Returns `Ok(None)` if no implementation of the algorithm is available.
pub fn file_digest(algorithm: ChecksumAlgorithm, path: &Path) -> std::io::Result<Option<String>> {
    let Some(mut digest) = digest_for(algorithm) else {
        return Ok(None);
    };
    let mut reader = BufReader::new(File::open(path)?);
    let mut buffer = [0u8; 8192];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        digest.update(&buffer[..read]);
    }
    Ok(Some(hex::encode(digest.finalize())))
}

/// Checks that every declared checksum matches the artifact file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumRule;

impl ChecksumRule {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn validate_checksums(component: &Component) -> Vec<String> {
        if component.checksums().is_empty() {
            return Vec::new();
        }
        let Some(file) = component.artifact().file().filter(|f| f.exists()) else {
            return vec![format!("Missing file for artifact: {}", component.artifact())];
        };
        component
            .checksums()
            .iter()
            .filter_map(|(algorithm, expected)| validate_checksum(*algorithm, expected, file))
            .collect()
    }
}

/// Compare one declared checksum with the file; returns the error message on mismatch.
pub fn validate_checksum(algorithm: ChecksumAlgorithm, expected: &str, file: &Path) -> Option<String> {
    let name = file
        .file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
    match file_digest(algorithm, file) {
        Ok(Some(actual)) if actual == expected => None,
        Ok(Some(actual)) => Some(format!(
            "Invalid {algorithm} checksum for file {name}: expecting `{expected}` but got `{actual}`"
        )),
        Ok(None) => Some(format!(
            "Failed to calculate checksum for file {name}: algorithm {algorithm} is not supported"
        )),
        Err(e) => Some(format!("Failed to calculate checksum for file {name}: {e}")),
    }
}

impl EnforcerRule for ChecksumRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn execute(&self, bom: &BillOfMaterials) -> std::result::Result<(), VerificationFailure> {
        let errors: Vec<String> = bom
            .components()
            .flat_map(Self::validate_checksums)
            .collect();

        if errors.is_empty() {
            tracing::debug!("All checksums of {} are valid", bom.document_label());
            return Ok(());
        }
        Err(VerificationFailure::new(
            format!("SBOM {} contains invalid checksums", bom.document_label()),
            errors,
        ))
    }
}
