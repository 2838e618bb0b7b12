use rust_upload_organizer::config::OrganizerConfig;
use rust_upload_organizer::utils::manifest_json::{parse_manifest, render};
use rust_upload_organizer::{ManifestError, Segment, UploadErrorCode, organize};
use serde_json::{Value, json};

// Shape a form runtime reports for `<input type="file" name="docs[]" multiple>`
// with one failed upload, serialized as JSON arrays.
const MULTIPLE: &str = r#"{
    "docs": {
        "name": ["report.pdf", "notes.txt"],
        "full_path": ["report.pdf", "notes.txt"],
        "type": ["application/pdf", ""],
        "tmp_name": ["/tmp/php8a1", ""],
        "error": [0, 4],
        "size": [5120, 0]
    }
}"#;

#[test]
fn test_multiple_file_input_from_json() {
    let manifest = parse_manifest(MULTIPLE, &OrganizerConfig::default()).unwrap();
    let files = organize(&manifest);

    let report = files.get("docs", &[Segment::Index(0)]).unwrap();
    assert_eq!(report.client_name(), Some("report.pdf"));
    assert_eq!(report.size_bytes(), Some(5120));
    assert_eq!(report.error_code(), Some(UploadErrorCode::Ok));

    let missing = files.get("docs", &[Segment::Index(1)]).unwrap();
    assert_eq!(missing.error_code(), Some(UploadErrorCode::NoFile));

    let rendered: Value = serde_json::from_str(&render(&files, false).unwrap()).unwrap();
    assert_eq!(
        rendered,
        json!({
            "docs": {
                "0": {
                    "name": "report.pdf", "type": "application/pdf", "tmp_name": "/tmp/php8a1",
                    "error": 0, "size": 5120, "full_path": "report.pdf"
                },
                "1": {
                    "name": "notes.txt", "type": "", "tmp_name": "",
                    "error": 4, "size": 0, "full_path": "notes.txt"
                }
            }
        })
    );
}

#[test]
fn test_nesting_limit_rejects_before_organizing() {
    let config = OrganizerConfig {
        max_nesting_level: 0,
        ..OrganizerConfig::default()
    };

    let err = parse_manifest(MULTIPLE, &config).unwrap_err();
    assert!(matches!(err, ManifestError::TooDeep { depth: 1, limit: 0, .. }));
    assert_eq!(
        err.to_string(),
        "Field `docs` nests 1 levels deep, exceeding the limit of 0"
    );
}

#[test]
fn test_scalar_field_is_rejected() {
    let err = parse_manifest(r#"{"avatar": "me.png"}"#, &OrganizerConfig::default()).unwrap_err();
    assert!(matches!(err, ManifestError::Json(_)));
    assert!(err.to_string().contains("avatar"));
}

#[test]
fn test_sizes_beyond_i64_pass_through_exactly() {
    let input = r#"{
        "blob": {
            "name": "disk.img",
            "type": "application/octet-stream",
            "tmp_name": "/tmp/php9z",
            "error": 0,
            "size": 18446744073709551615
        }
    }"#;
    let manifest = parse_manifest(input, &OrganizerConfig::default()).unwrap();
    let files = organize(&manifest);

    let blob = files.get("blob", &[]).unwrap();
    assert_eq!(blob.size_bytes(), Some(u64::MAX));

    let output = render(&files, false).unwrap();
    assert!(output.contains(r#""size":18446744073709551615"#), "{}", output);
}
