use serde::Serialize;
use std::io::Read;

use crate::config::OrganizerConfig;
use crate::error::ManifestError;
use crate::models::Manifest;

/// Parses a manifest from JSON and enforces the configured nesting limit.
pub fn parse_manifest(json: &str, config: &OrganizerConfig) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = serde_json::from_str(json)?;
    check_nesting(&manifest, config.max_nesting_level)?;
    Ok(manifest)
}

/// Reads a whole manifest from `reader`, e.g. stdin or an open file.
pub fn read_manifest<R: Read>(reader: R, config: &OrganizerConfig) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = serde_json::from_reader(reader)?;
    check_nesting(&manifest, config.max_nesting_level)?;
    Ok(manifest)
}

/// Rejects manifests with an attribute tree deeper than `limit`.
pub fn check_nesting(manifest: &Manifest, limit: usize) -> Result<(), ManifestError> {
    for (name, field) in manifest.fields() {
        let depth = field.depth();
        if depth > limit {
            tracing::warn!("Upload field {} nests {} levels deep (limit {})", name, depth, limit);
            return Err(ManifestError::TooDeep {
                field: name.to_string(),
                depth,
                limit,
            });
        }
    }
    Ok(())
}

/// Serializes organized output (or anything else) as JSON text.
pub fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String, ManifestError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;

    const NESTED: &str = r#"{
        "line_item": {
            "name": {"0": {"attachments": {"0": "a.jpg"}}},
            "size": {"0": {"attachments": {"0": 5}}}
        }
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest(NESTED, &OrganizerConfig::default()).unwrap();
        let field = manifest.field("line_item").unwrap();
        assert_eq!(field.depth(), 3);
        assert!(field.attribute(Attribute::Size).is_some());
        assert!(field.attribute(Attribute::Type).is_none());
    }

    #[test]
    fn test_nesting_limit() {
        let config = OrganizerConfig {
            max_nesting_level: 2,
            ..OrganizerConfig::default()
        };

        match parse_manifest(NESTED, &config) {
            Err(ManifestError::TooDeep {
                field,
                depth,
                limit,
            }) => {
                assert_eq!(field, "line_item");
                assert_eq!(depth, 3);
                assert_eq!(limit, 2);
            }
            other => panic!("expected TooDeep, got {:?}", other),
        }
    }

    fn nested_manifest(depth: usize) -> String {
        format!(
            r#"{{"deep": {{"name": {}"a.jpg"{}}}}}"#,
            "[".repeat(depth),
            "]".repeat(depth)
        )
    }

    #[test]
    fn test_development_limit_is_reachable() {
        let config = OrganizerConfig::development();

        let manifest = parse_manifest(&nested_manifest(config.max_nesting_level), &config).unwrap();
        assert_eq!(
            manifest.field("deep").unwrap().depth(),
            config.max_nesting_level
        );

        let err = parse_manifest(&nested_manifest(config.max_nesting_level + 1), &config)
            .unwrap_err();
        assert!(matches!(err, ManifestError::TooDeep { .. }), "{}", err);
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_manifest("{not json", &OrganizerConfig::default()).unwrap_err();
        assert!(matches!(err, ManifestError::Json(_)));
        assert!(err.to_string().starts_with("Invalid manifest JSON"));
    }

    #[test]
    fn test_read_manifest_from_reader() {
        let manifest = read_manifest(NESTED.as_bytes(), &OrganizerConfig::default()).unwrap();
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_render() {
        let manifest = parse_manifest(r#"{"f": {"name": "a"}}"#, &OrganizerConfig::default()).unwrap();
        assert_eq!(render(&manifest, false).unwrap(), r#"{"f":{"name":"a"}}"#);
        assert!(render(&manifest, true).unwrap().contains('\n'));
    }
}
