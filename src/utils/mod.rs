pub mod manifest_json;
