mod manifest;
mod record;
mod tree;

pub use manifest::{FilePath, Manifest, OrganizedFiles, UploadField};
pub use record::{Attribute, FileRecord, Scalar, UploadErrorCode};
pub use tree::{Branch, Node, Segment};
