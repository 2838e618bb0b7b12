use crate::models::{Attribute, Node, Scalar, Segment};
use crate::services::tracker::{AggregateTracker, RecordId};

/// Destination tree of one field while it is being rebuilt. Leaves are
/// handles into the tracker, so every attribute pass writes into the same
/// record.
pub type Skeleton = Node<RecordId>;

/// Copies one attribute tree into the file-major `destination`.
///
/// Every scalar in `value` is written under `attribute` into the record found
/// at the scalar's path (`path` plus the segments walked below it). Missing
/// containers and records on the way are created; existing ones are reused.
/// The record is registered with `tracker` on first contact.
///
/// A value whose path collides with a differently shaped part of
/// `destination` is skipped.
pub fn reindex(
    destination: &mut Option<Skeleton>,
    attribute: Attribute,
    value: &Node<Scalar>,
    path: &mut Vec<Segment>,
    tracker: &mut AggregateTracker,
) {
    match value {
        Node::Leaf(scalar) => {
            let Some(id) = resolve(destination, path, tracker) else {
                tracing::debug!(
                    attribute = %attribute,
                    path = ?path,
                    "Attribute value does not fit the destination shape, skipping"
                );
                return;
            };

            tracker.register(id);
            if let Some(record) = tracker.record_mut(id) {
                record.set(attribute, scalar.clone());
            }
        }
        Node::Branch(children) => {
            for (segment, child) in children.iter() {
                path.push(segment.clone());
                reindex(destination, attribute, child, path, tracker);
                path.pop();
            }
        }
    }
}

/// Walks `destination` along `path`, creating whatever is missing, and
/// returns the record handle at the end. `None` when an existing node has the
/// wrong shape: a record where a container is needed or the reverse.
fn resolve(
    destination: &mut Option<Skeleton>,
    path: &[Segment],
    tracker: &mut AggregateTracker,
) -> Option<RecordId> {
    let root = destination.get_or_insert_with(|| vacant(path, tracker));
    descend(root, path, tracker)
}

fn descend(node: &mut Skeleton, path: &[Segment], tracker: &mut AggregateTracker) -> Option<RecordId> {
    match (node, path.split_first()) {
        (Node::Leaf(id), None) => Some(*id),
        (Node::Branch(branch), Some((segment, rest))) => {
            let child = branch.get_or_insert_with(segment.clone(), || vacant(rest, tracker));
            descend(child, rest, tracker)
        }
        _ => None,
    }
}

/// A fresh node for a location with `rest` segments still to walk.
fn vacant(rest: &[Segment], tracker: &mut AggregateTracker) -> Skeleton {
    if rest.is_empty() {
        Node::Leaf(tracker.allocate())
    } else {
        Node::Branch(Default::default())
    }
}
