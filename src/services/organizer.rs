use std::convert::Infallible;

use tracing::debug;

use crate::models::{Attribute, Branch, FileRecord, Manifest, OrganizedFiles, Segment};
use crate::services::reindex::{Skeleton, reindex};
use crate::services::tracker::AggregateTracker;

/// Turns an attribute-major upload table into a file-major one.
///
/// ```
/// use rust_upload_organizer::{Manifest, organize};
/// use serde_json::json;
///
/// let manifest: Manifest = serde_json::from_value(json!({
///     "docs": {
///         "name": ["a.pdf", "b.pdf"],
///         "type": ["application/pdf", "application/pdf"],
///         "tmp_name": ["/tmp/phpA", "/tmp/phpB"],
///         "error": [0, 0],
///         "size": [100, 200]
///     }
/// }))
/// .unwrap();
///
/// let files = organize(&manifest);
/// assert_eq!(
///     serde_json::to_value(&files).unwrap(),
///     json!({"docs": {
///         "0": {"name": "a.pdf", "type": "application/pdf", "tmp_name": "/tmp/phpA", "error": 0, "size": 100},
///         "1": {"name": "b.pdf", "type": "application/pdf", "tmp_name": "/tmp/phpB", "error": 0, "size": 200}
///     }})
/// );
/// ```
pub fn organize(manifest: &Manifest) -> OrganizedFiles<FileRecord> {
    organize_with(manifest, |record| record)
}

/// Like [`organize`], with every file passed through `transform` exactly
/// once. The returned value takes the file's place in the output.
///
/// Files are handed over fully aggregated, in field order, then attribute
/// order, then depth-first path order.
pub fn organize_with<T, F>(manifest: &Manifest, mut transform: F) -> OrganizedFiles<T>
where
    F: FnMut(FileRecord) -> T,
{
    match try_organize_with(manifest, |record| Ok::<_, Infallible>(transform(record))) {
        Ok(files) => files,
        Err(never) => match never {},
    }
}

/// Fallible [`organize_with`]. The first error returned by `transform` stops
/// the pass and is returned as is.
pub fn try_organize_with<T, E, F>(manifest: &Manifest, transform: F) -> Result<OrganizedFiles<T>, E>
where
    F: FnMut(FileRecord) -> Result<T, E>,
{
    let mut tracker = AggregateTracker::new();
    let mut skeletons: Vec<(Segment, Skeleton)> = Vec::with_capacity(manifest.len());

    for (name, field) in manifest.fields() {
        for key in field.unrecognized_keys() {
            debug!(field = %name, key = %key, "Ignoring unrecognized upload attribute");
        }

        let mut destination = None;
        for attribute in Attribute::ALL {
            if let Some(tree) = field.attribute(attribute) {
                reindex(&mut destination, attribute, tree, &mut Vec::new(), &mut tracker);
            }
        }

        match destination {
            Some(skeleton) => skeletons.push((name.clone(), skeleton)),
            None => debug!(field = %name, "Upload field carries no files"),
        }
    }

    let file_count = tracker.len();
    let mut results = tracker.finish(transform)?;

    let mut fields = Branch::new();
    for (name, skeleton) in skeletons {
        let node = skeleton.filter_map(|id| results.get_mut(id.index()).and_then(Option::take));
        if let Some(node) = node {
            fields.insert(name, node);
        }
    }

    debug!(
        fields = fields.len(),
        files = file_count,
        "Organized upload manifest"
    );

    Ok(OrganizedFiles::new(fields))
}
