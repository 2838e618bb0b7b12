use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;

use super::record::{Attribute, FileRecord, Scalar};
use super::tree::{Branch, Node, Segment};

/// The attribute map of one form field, e.g. `$files["line_item"]`: every
/// attribute key holds either a scalar or a tree of scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadField {
    attributes: Branch<Scalar>,
}

impl UploadField {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field carrying exactly one file.
    pub fn single(
        name: impl Into<Scalar>,
        mime_type: impl Into<Scalar>,
        tmp_name: impl Into<Scalar>,
        error: impl Into<Scalar>,
        size: impl Into<Scalar>,
    ) -> Self {
        Self::new()
            .with(Attribute::Name, Node::Leaf(name.into()))
            .with(Attribute::Type, Node::Leaf(mime_type.into()))
            .with(Attribute::TmpName, Node::Leaf(tmp_name.into()))
            .with(Attribute::Error, Node::Leaf(error.into()))
            .with(Attribute::Size, Node::Leaf(size.into()))
    }

    pub fn with(mut self, attribute: Attribute, tree: Node<Scalar>) -> Self {
        self.insert(attribute, tree);
        self
    }

    pub fn insert(&mut self, attribute: Attribute, tree: Node<Scalar>) -> Option<Node<Scalar>> {
        self.attributes.insert(attribute.as_str(), tree)
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<&Node<Scalar>> {
        self.attributes
            .get(&Segment::Name(attribute.as_str().to_string()))
    }

    /// Keys that are not upload attributes. They are carried but never read.
    pub fn unrecognized_keys(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.attributes.keys().filter(|key| match key {
            Segment::Name(name) => Attribute::from_key(name).is_none(),
            Segment::Index(_) => true,
        })
    }

    /// True when every present attribute is a scalar.
    pub fn is_single_file(&self) -> bool {
        self.attributes.iter().all(|(_, tree)| tree.is_leaf())
    }

    /// Deepest attribute tree of the field.
    pub fn depth(&self) -> usize {
        self.attributes
            .iter()
            .map(|(_, tree)| tree.depth())
            .max()
            .unwrap_or(0)
    }
}

impl From<Branch<Scalar>> for UploadField {
    fn from(attributes: Branch<Scalar>) -> Self {
        Self { attributes }
    }
}

impl Serialize for UploadField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

/// Attribute-major upload table: field name → [`UploadField`], in the order
/// the fields were submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    fields: IndexMap<Segment, UploadField>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<Segment>, field: UploadField) -> Self {
        self.insert_field(name, field);
        self
    }

    /// Adds a field, replacing (in place) any field of the same name.
    pub fn insert_field(&mut self, name: impl Into<Segment>, field: UploadField) {
        self.fields.insert(name.into(), field);
    }

    pub fn field(&self, name: &str) -> Option<&UploadField> {
        self.fields.get(&Segment::parse(name))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&Segment, &UploadField)> + '_ {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = match Node::<Scalar>::deserialize(deserializer)? {
            Node::Branch(fields) => fields,
            Node::Leaf(_) => {
                return Err(de::Error::custom(
                    "upload manifest must be a map of field names",
                ));
            }
        };

        let mut manifest = Manifest::new();
        for (name, node) in fields {
            match node {
                Node::Branch(attributes) => manifest.insert_field(name, attributes.into()),
                Node::Leaf(_) => {
                    return Err(de::Error::custom(format!(
                        "upload field `{}` must be a map of file attributes",
                        name
                    )));
                }
            }
        }
        Ok(manifest)
    }
}

/// Location of one file in the organized output, rendered in form notation:
/// `line_item[0][attachments][0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath {
    pub field: Segment,
    pub segments: Vec<Segment>,
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        for segment in &self.segments {
            write!(f, "[{}]", segment)?;
        }
        Ok(())
    }
}

/// File-major upload table: field name → tree whose leaves are one value per
/// uploaded file. Single-file fields map straight to their leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizedFiles<T = FileRecord> {
    fields: Branch<T>,
}

impl<T> Default for OrganizedFiles<T> {
    fn default() -> Self {
        Self {
            fields: Branch::new(),
        }
    }
}

impl<T> OrganizedFiles<T> {
    pub fn new(fields: Branch<T>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Node<T>> {
        self.fields.get(&Segment::parse(name))
    }

    /// The file at `path` under field `name`. An empty path addresses a
    /// single-file field.
    pub fn get(&self, name: &str, path: &[Segment]) -> Option<&T> {
        self.field(name)?.get_path(path)?.as_leaf()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&Segment, &Node<T>)> + '_ {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.fields.iter().map(|(_, node)| node.leaf_count()).sum()
    }

    /// Every file with its location, in field order then depth-first.
    pub fn files(&self) -> Vec<(FilePath, &T)> {
        self.fields
            .iter()
            .flat_map(|(field, node)| {
                node.leaves().into_iter().map(move |(segments, value)| {
                    (
                        FilePath {
                            field: field.clone(),
                            segments,
                        },
                        value,
                    )
                })
            })
            .collect()
    }
}

impl<T: Serialize> Serialize for OrganizedFiles<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
