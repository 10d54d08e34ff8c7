#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_enforcer::parsers::{BomFormat, CycloneDxParser};

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the CycloneDX XML parser.
///
/// Wraps input in a document with a main component to exercise the
/// metadata and component deserialization paths.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = CycloneDxParser::new();

        let _ = parser.parse_str(s, BomFormat::Xml);

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<bom xmlns="http://cyclonedx.org/schema/bom/1.5" version="1">
  <metadata><component type="library"><name>app</name></component></metadata>
  <components>{s}</components>
</bom>"#,
            );
            let _ = parser.parse_str(&wrapped, BomFormat::Xml);
        }
    }
});
