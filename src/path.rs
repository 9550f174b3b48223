//! Flat key representation for locating values in flattened records.
//!
//! This module provides [`FlatKey`], [`Segment`] and [`Control`]. A flat key
//! is the path of a value inside a nested record, e.g. `resources[0].url`,
//! and is what the validation engine uses as the address of every value.

use std::cmp::Ordering;
use std::fmt::{self, Display};

/// A named control slot of a schema node.
///
/// Control slots hold validator chains that run outside the main phase
/// (`Before`, `After`, `Extras`, `Junk`), and the `Extras`/`Junk` slots also
/// name the buckets that collect input the schema does not describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Control {
    /// Runs before the main phase of its node.
    Before,
    /// Runs after every other phase except junk, deepest nodes first.
    After,
    /// Receives fields present in the input but not named in the schema.
    Extras,
    /// Receives input whose containing path is not valid at all. Root only.
    Junk,
}

impl Control {
    /// The conventional wire name of the slot, e.g. `__extras`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Control::Before => "__before",
            Control::After => "__after",
            Control::Extras => "__extras",
            Control::Junk => "__junk",
        }
    }
}

/// A segment of a flat key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A field name (e.g. `resources`, `url`)
    Field(String),
    /// A list position (e.g. `[0]`, `[42]`)
    Index(usize),
    /// A control slot (e.g. `__extras`)
    Control(Control),
}

impl Segment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        Segment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        Segment::Index(idx)
    }

    /// Returns the field name if this is a field segment.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Segment::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the control slot if this is a control segment.
    pub fn as_control(&self) -> Option<Control> {
        match self {
            Segment::Control(control) => Some(*control),
            _ => None,
        }
    }

    /// The name this segment takes as an object key when unflattened.
    pub fn name(&self) -> String {
        match self {
            Segment::Field(name) => name.clone(),
            Segment::Index(idx) => idx.to_string(),
            Segment::Control(control) => control.as_str().to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Segment::Index(_) => 0,
            Segment::Field(_) => 1,
            Segment::Control(_) => 2,
        }
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Index(a), Segment::Index(b)) => a.cmp(b),
            (Segment::Field(a), Segment::Field(b)) => a.cmp(b),
            (Segment::Control(a), Segment::Control(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The address of a value in a flattened record.
///
/// Keys order by `(length, contents)`, so iterating a sorted collection of
/// keys always visits parents before their children.
///
/// # Example
///
/// ```rust
/// use dictize::FlatKey;
///
/// let key = FlatKey::root()
///     .push_field("resources")
///     .push_index(0)
///     .push_field("url");
///
/// assert_eq!(key.to_string(), "resources[0].url");
/// assert!(FlatKey::from_field("zzz") < key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FlatKey {
    segments: Vec<Segment>,
}

impl FlatKey {
    /// Creates an empty key representing the root record.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a key from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Field(name.into())],
        }
    }

    /// Creates a key from a list of segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Returns a new key with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.push(Segment::Field(name.into()))
    }

    /// Returns a new key with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    /// Returns a new key with a control segment appended.
    pub fn push_control(&self, control: Control) -> Self {
        self.push(Segment::Control(control))
    }

    /// Returns a new key with `segment` appended.
    pub fn push(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns a new key with `other`'s segments appended.
    pub fn join(&self, other: &FlatKey) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns true if this is the root key (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this key.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this key has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the key segments.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Returns the segments as a slice.
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the first `len` segments as a new key.
    ///
    /// `len` larger than the key length returns the whole key.
    pub fn prefix(&self, len: usize) -> Self {
        let end = len.min(self.segments.len());
        Self {
            segments: self.segments[..end].to_vec(),
        }
    }

    /// Returns the key without its last `n` segments, saturating at the root.
    pub fn truncate_end(&self, n: usize) -> Self {
        self.prefix(self.segments.len().saturating_sub(n))
    }

    /// Returns the parent key (all segments except the last), or None if this is root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(self.truncate_end(1))
        }
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the first segment, or None if this is root.
    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Returns the control slot this key ends in, if any.
    pub fn control(&self) -> Option<Control> {
        self.last().and_then(Segment::as_control)
    }

    /// The schema shape of the key: every other segment starting at the first.
    ///
    /// `resources[0].url` has shape `resources.url`.
    pub fn shape(&self) -> Self {
        Self {
            segments: self.segments.iter().step_by(2).cloned().collect(),
        }
    }

    /// The shape of the key's parent: every other segment of all but the last.
    ///
    /// `resources[0].url` has parent shape `resources`.
    pub fn parent_shape(&self) -> Self {
        self.truncate_end(1).shape()
    }

    /// Returns true if `prefix` is a leading run of this key's segments.
    pub fn starts_with(&self, prefix: &FlatKey) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl Ord for FlatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments
            .len()
            .cmp(&other.segments.len())
            .then_with(|| self.segments.cmp(&other.segments))
    }
}

impl PartialOrd for FlatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Vec<Segment>> for FlatKey {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl Display for FlatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
                other => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", other.name())?;
                }
            }
        }
        Ok(())
    }
}

/// Builds a [`FlatKey`] from a mix of field names and list indices.
///
/// ```rust
/// use dictize::flat_key;
///
/// let key = flat_key!["resources", 0, "url"];
/// assert_eq!(key.to_string(), "resources[0].url");
/// ```
#[macro_export]
macro_rules! flat_key {
    () => { $crate::FlatKey::root() };
    ($($seg:expr),+ $(,)?) => {
        $crate::FlatKey::from_segments(vec![$($crate::path::IntoSegment::into_segment($seg)),+])
    };
}

/// Conversion used by [`flat_key!`] to accept names and indices side by side.
pub trait IntoSegment {
    /// Converts the value into a key segment.
    fn into_segment(self) -> Segment;
}

impl IntoSegment for &str {
    fn into_segment(self) -> Segment {
        Segment::Field(self.to_string())
    }
}

impl IntoSegment for String {
    fn into_segment(self) -> Segment {
        Segment::Field(self)
    }
}

impl IntoSegment for usize {
    fn into_segment(self) -> Segment {
        Segment::Index(self)
    }
}

/// Unsuffixed integer literals in [`flat_key!`] land here.
///
/// A negative value is not a list position; it becomes a field named by its
/// signed text so the mistake shows up in the rendered key.
impl IntoSegment for i32 {
    fn into_segment(self) -> Segment {
        debug_assert!(self >= 0, "negative list index {self} in flat key");
        match usize::try_from(self) {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Field(self.to_string()),
        }
    }
}

impl IntoSegment for Control {
    fn into_segment(self) -> Segment {
        Segment::Control(self)
    }
}

impl IntoSegment for Segment {
    fn into_segment(self) -> Segment {
        self
    }
}
