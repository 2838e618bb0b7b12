//! Rebuilds the upload table a web form runtime produces for multi-file and
//! nested file inputs.
//!
//! The runtime stores every attribute of the uploaded files (`name`, `type`,
//! `tmp_name`, `error`, `size`) as its own tree keyed by the field path. This
//! crate zips those trees back together so each leaf of the result is one
//! [`FileRecord`] describing one file, at the same path.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::ManifestError;
pub use crate::models::{
    Attribute, Branch, FilePath, FileRecord, Manifest, Node, OrganizedFiles, Scalar, Segment,
    UploadErrorCode, UploadField,
};
pub use crate::services::organizer::{organize, organize_with, try_organize_with};
