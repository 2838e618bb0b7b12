use thiserror::Error;

/// Failures while reading an upload manifest. Organizing itself never fails.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Field `{field}` nests {depth} levels deep, exceeding the limit of {limit}")]
    TooDeep {
        field: String,
        depth: usize,
        limit: usize,
    },
}
