use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;

use super::record::Scalar;

/// One step of a path inside an upload field, e.g. the `0` or `attachments`
/// in `line_item[0][attachments][0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Index(u64),
    Name(String),
}

impl Segment {
    /// Integer-like keys become indexes, the way form runtimes key their
    /// arrays. Leading zeros and signs keep the key a name.
    pub fn parse(key: &str) -> Self {
        let canonical = !key.is_empty()
            && key.bytes().all(|b| b.is_ascii_digit())
            && (key == "0" || !key.starts_with('0'));

        match key.parse::<u64>() {
            Ok(index) if canonical => Segment::Index(index),
            _ => Segment::Name(key.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(index) => write!(f, "{}", index),
            Segment::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for Segment {
    fn from(index: u64) -> Self {
        Segment::Index(index)
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::parse(key)
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::parse(&key)
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Segment::Index(index) => serializer.serialize_u64(*index),
            Segment::Name(name) => serializer.serialize_str(name),
        }
    }
}

/// A position in an upload tree: either a terminal value or a container of
/// further positions. Which one applies is decided by inspection at every
/// level, never declared up front.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T> {
    Leaf(T),
    Branch(Branch<T>),
}

impl<T> Node<T> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch<T>> {
        match self {
            Node::Leaf(_) => None,
            Node::Branch(branch) => Some(branch),
        }
    }

    /// Follows `path` from this node. An empty path returns the node itself.
    pub fn get_path(&self, path: &[Segment]) -> Option<&Node<T>> {
        match path.split_first() {
            None => Some(self),
            Some((segment, rest)) => self.as_branch()?.get(segment)?.get_path(rest),
        }
    }

    /// Number of container levels above the deepest leaf. A leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Branch(branch) => {
                1 + branch
                    .iter()
                    .map(|(_, child)| child.depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(branch) => branch.iter().map(|(_, child)| child.leaf_count()).sum(),
        }
    }

    /// Leaves in depth-first order, each with its path relative to this node.
    pub fn leaves(&self) -> Vec<(Vec<Segment>, &T)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, path: &mut Vec<Segment>, out: &mut Vec<(Vec<Segment>, &'a T)>) {
        match self {
            Node::Leaf(value) => out.push((path.clone(), value)),
            Node::Branch(branch) => {
                for (segment, child) in branch.iter() {
                    path.push(segment.clone());
                    child.collect_leaves(path, out);
                    path.pop();
                }
            }
        }
    }

    /// Replaces every leaf, keeping the shape.
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Node<U> {
        self.map_with(&mut f)
    }

    fn map_with<U, F: FnMut(T) -> U>(self, f: &mut F) -> Node<U> {
        match self {
            Node::Leaf(value) => Node::Leaf(f(value)),
            Node::Branch(branch) => Node::Branch(
                branch
                    .into_iter()
                    .map(|(segment, child)| (segment, child.map_with(f)))
                    .collect(),
            ),
        }
    }

    /// Like [`Node::map`], but leaves mapped to `None` are dropped. Containers
    /// are kept even if they end up empty.
    pub fn filter_map<U, F: FnMut(T) -> Option<U>>(self, mut f: F) -> Option<Node<U>> {
        self.filter_map_with(&mut f)
    }

    fn filter_map_with<U, F: FnMut(T) -> Option<U>>(self, f: &mut F) -> Option<Node<U>> {
        match self {
            Node::Leaf(value) => f(value).map(Node::Leaf),
            Node::Branch(branch) => Some(Node::Branch(
                branch
                    .into_iter()
                    .filter_map(|(segment, child)| {
                        child.filter_map_with(f).map(|child| (segment, child))
                    })
                    .collect(),
            )),
        }
    }
}

impl<T: Serialize> Serialize for Node<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(value) => value.serialize(serializer),
            Node::Branch(branch) => branch.serialize(serializer),
        }
    }
}

/// Insertion-ordered container of child nodes keyed by segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch<T> {
    entries: IndexMap<Segment, Node<T>>,
}

impl<T> Default for Branch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Branch<T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, segment: &Segment) -> Option<&Node<T>> {
        self.entries.get(segment)
    }

    /// Inserts or replaces the child at `segment`. A replaced child keeps its
    /// original position and is returned.
    pub fn insert(&mut self, segment: impl Into<Segment>, node: Node<T>) -> Option<Node<T>> {
        self.entries.insert(segment.into(), node)
    }

    /// Returns the child at `segment`, creating it with `create` if absent.
    /// An existing child is never touched.
    pub fn get_or_insert_with<F>(&mut self, segment: Segment, create: F) -> &mut Node<T>
    where
        F: FnOnce() -> Node<T>,
    {
        self.entries.entry(segment).or_insert_with(create)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Segment, &Node<T>)> + '_ {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.entries.keys()
    }
}

impl<T> IntoIterator for Branch<T> {
    type Item = (Segment, Node<T>);
    type IntoIter = indexmap::map::IntoIter<Segment, Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T> FromIterator<(Segment, Node<T>)> for Branch<T> {
    fn from_iter<I: IntoIterator<Item = (Segment, Node<T>)>>(iter: I) -> Self {
        let mut branch = Branch::new();
        for (segment, node) in iter {
            branch.insert(segment, node);
        }
        branch
    }
}

impl<T: Serialize> Serialize for Branch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter())
    }
}

impl<'de> Deserialize<'de> for Node<Scalar> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node<Scalar>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an upload attribute value or a nested map of them")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::Text(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::Text(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Node::Leaf(Scalar::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut branch = Branch::new();
        let mut index: u64 = 0;
        while let Some(node) = seq.next_element::<Node<Scalar>>()? {
            branch.insert(Segment::Index(index), node);
            index += 1;
        }
        Ok(Node::Branch(branch))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut branch = Branch::new();
        while let Some((key, node)) = map.next_entry::<String, Node<Scalar>>()? {
            branch.insert(Segment::parse(&key), node);
        }
        Ok(Node::Branch(branch))
    }
}
