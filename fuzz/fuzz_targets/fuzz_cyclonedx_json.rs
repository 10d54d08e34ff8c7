#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_enforcer::parsers::{BomFormat, CycloneDxParser};

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the CycloneDX JSON parser directly.
///
/// Also wraps the input as the component list of a minimal document so
/// that component decoding is reached.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = CycloneDxParser::new();

        let _ = parser.parse_str(s, BomFormat::Json);

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"{{"bomFormat":"CycloneDX","specVersion":"1.5","components":[{s}]}}"#,
            );
            let _ = parser.parse_str(&wrapped, BomFormat::Json);
        }
    }
});
