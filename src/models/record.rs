use serde::{Deserialize, Serialize};
use std::fmt;

/// A terminal attribute value as the form runtime reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`, kept exact.
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer view. Numeric text counts, since some runtimes stringify sizes
    /// and error codes.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            Scalar::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Non-negative integer view, exact across the whole `u64` range.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Int(v) => u64::try_from(*v).ok(),
            Scalar::UInt(v) => Some(*v),
            Scalar::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::UInt(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Scalar::Int(v),
            Err(_) => Scalar::UInt(v),
        }
    }
}

/// The per-file metadata keys of an upload table, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Name,
    Type,
    TmpName,
    Error,
    Size,
    /// Client-relative path of a directory upload. Only newer runtimes send it.
    FullPath,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Name,
        Attribute::Type,
        Attribute::TmpName,
        Attribute::Error,
        Attribute::Size,
        Attribute::FullPath,
    ];

    /// The five attributes every runtime reports for every file.
    pub const REQUIRED: [Attribute; 5] = [
        Attribute::Name,
        Attribute::Type,
        Attribute::TmpName,
        Attribute::Error,
        Attribute::Size,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Type => "type",
            Attribute::TmpName => "tmp_name",
            Attribute::Error => "error",
            Attribute::Size => "size",
            Attribute::FullPath => "full_path",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attribute| attribute.as_str() == key)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All attributes of one uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Scalar>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<Scalar>,
}

impl FileRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FileRecord::set`].
    pub fn with(mut self, attribute: Attribute, value: impl Into<Scalar>) -> Self {
        self.set(attribute, value.into());
        self
    }

    fn slot(&self, attribute: Attribute) -> &Option<Scalar> {
        match attribute {
            Attribute::Name => &self.name,
            Attribute::Type => &self.mime_type,
            Attribute::TmpName => &self.tmp_name,
            Attribute::Error => &self.error,
            Attribute::Size => &self.size,
            Attribute::FullPath => &self.full_path,
        }
    }

    fn slot_mut(&mut self, attribute: Attribute) -> &mut Option<Scalar> {
        match attribute {
            Attribute::Name => &mut self.name,
            Attribute::Type => &mut self.mime_type,
            Attribute::TmpName => &mut self.tmp_name,
            Attribute::Error => &mut self.error,
            Attribute::Size => &mut self.size,
            Attribute::FullPath => &mut self.full_path,
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&Scalar> {
        self.slot(attribute).as_ref()
    }

    /// Sets one attribute, leaving the others untouched. Returns the previous
    /// value, if any.
    pub fn set(&mut self, attribute: Attribute, value: Scalar) -> Option<Scalar> {
        self.slot_mut(attribute).replace(value)
    }

    /// True once all five always-reported attributes are present.
    pub fn is_complete(&self) -> bool {
        Attribute::REQUIRED
            .into_iter()
            .all(|attribute| self.get(attribute).is_some())
    }

    /// Present attributes in processing order.
    pub fn attributes(&self) -> impl Iterator<Item = (Attribute, &Scalar)> + '_ {
        Attribute::ALL
            .into_iter()
            .filter_map(|attribute| self.get(attribute).map(|value| (attribute, value)))
    }

    /// File name as sent by the client. Untrusted.
    pub fn client_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Scalar::as_str)
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_ref().and_then(Scalar::as_u64)
    }

    pub fn error_code(&self) -> Option<UploadErrorCode> {
        self.error
            .as_ref()
            .and_then(Scalar::as_i64)
            .map(UploadErrorCode::from_code)
    }
}

/// Status codes a form runtime stores in the `error` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorCode {
    Ok,
    IniSize,
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
    Unknown(i64),
}

impl UploadErrorCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => UploadErrorCode::Ok,
            1 => UploadErrorCode::IniSize,
            2 => UploadErrorCode::FormSize,
            3 => UploadErrorCode::Partial,
            4 => UploadErrorCode::NoFile,
            6 => UploadErrorCode::NoTmpDir,
            7 => UploadErrorCode::CantWrite,
            8 => UploadErrorCode::Extension,
            other => UploadErrorCode::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            UploadErrorCode::Ok => 0,
            UploadErrorCode::IniSize => 1,
            UploadErrorCode::FormSize => 2,
            UploadErrorCode::Partial => 3,
            UploadErrorCode::NoFile => 4,
            UploadErrorCode::NoTmpDir => 6,
            UploadErrorCode::CantWrite => 7,
            UploadErrorCode::Extension => 8,
            UploadErrorCode::Unknown(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == UploadErrorCode::Ok
    }

    pub fn description(self) -> &'static str {
        match self {
            UploadErrorCode::Ok => "uploaded successfully",
            UploadErrorCode::IniSize => "exceeds the server's maximum upload size",
            UploadErrorCode::FormSize => "exceeds the form's maximum file size",
            UploadErrorCode::Partial => "only partially uploaded",
            UploadErrorCode::NoFile => "no file was uploaded",
            UploadErrorCode::NoTmpDir => "missing a temporary folder",
            UploadErrorCode::CantWrite => "failed to write file to disk",
            UploadErrorCode::Extension => "stopped by a server extension",
            UploadErrorCode::Unknown(_) => "unknown upload error",
        }
    }
}

impl fmt::Display for UploadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_keys() {
        assert_eq!(Attribute::from_key("tmp_name"), Some(Attribute::TmpName));
        assert_eq!(Attribute::from_key("type"), Some(Attribute::Type));
        assert_eq!(Attribute::from_key("full_path"), Some(Attribute::FullPath));
        assert_eq!(Attribute::from_key("checksum"), None);
        assert_eq!(Attribute::Size.to_string(), "size");
    }

    #[test]
    fn test_set_keeps_other_attributes() {
        let mut record = FileRecord::new().with(Attribute::Name, "a.jpg");
        assert_eq!(record.set(Attribute::Size, Scalar::from(10)), None);
        assert_eq!(
            record.set(Attribute::Size, Scalar::from(20)),
            Some(Scalar::Int(10))
        );
        assert_eq!(record.client_name(), Some("a.jpg"));
        assert_eq!(record.size_bytes(), Some(20));
        assert!(!record.is_complete());
    }

    #[test]
    fn test_is_complete_ignores_full_path() {
        let record = FileRecord::new()
            .with(Attribute::Name, "a.jpg")
            .with(Attribute::Type, "image/jpeg")
            .with(Attribute::TmpName, "/tmp/php123")
            .with(Attribute::Error, 0)
            .with(Attribute::Size, 12);
        assert!(record.is_complete());
        assert_eq!(record.attributes().count(), 5);
        assert_eq!(record.full_path, None);
    }

    #[test]
    fn test_serialized_keys() {
        let record = FileRecord::new()
            .with(Attribute::Type, "text/plain")
            .with(Attribute::Error, 0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({"type": "text/plain", "error": 0}));
    }

    #[test]
    fn test_large_sizes_stay_exact() {
        let huge: Scalar = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(huge, Scalar::UInt(u64::MAX));
        assert_eq!(serde_json::to_string(&huge).unwrap(), "18446744073709551615");

        let record = FileRecord::new().with(Attribute::Size, u64::MAX);
        assert_eq!(record.size_bytes(), Some(u64::MAX));
        assert_eq!(Scalar::from(42u64), Scalar::Int(42));
        assert_eq!(Scalar::Int(-1).as_u64(), None);
    }

    #[test]
    fn test_error_codes() {
        let record = FileRecord::new().with(Attribute::Error, 4);
        assert_eq!(record.error_code(), Some(UploadErrorCode::NoFile));
        assert!(!UploadErrorCode::NoFile.is_ok());

        let stringly = FileRecord::new().with(Attribute::Error, "0");
        assert_eq!(stringly.error_code(), Some(UploadErrorCode::Ok));

        assert_eq!(UploadErrorCode::from_code(5), UploadErrorCode::Unknown(5));
        assert_eq!(UploadErrorCode::from_code(7).code(), 7);
        assert_eq!(
            UploadErrorCode::Partial.to_string(),
            "only partially uploaded (3)"
        );
    }
}
