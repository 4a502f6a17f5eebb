//! panel::labels — axis labels and their normalization.
//!
//! Purpose
//! -------
//! Represent the labels of the three panel axes (entities, times,
//! variables) and normalize the many container shapes callers may hold them
//! in into a single validated form, once, at the boundary.
//!
//! Key behaviors
//! -------------
//! - [`Label`] is either an integer or a string (e.g. `"2015M1"`).
//! - [`Labels`] is an ordered, duplicate-free, non-empty sequence of labels
//!   of a single kind, with O(1) position lookup.
//! - [`IntoLabels`] adapts vectors, slices, fixed-size arrays, tuples and
//!   `ndarray` arrays into [`Labels`]. Arrays with at most one non-unit axis
//!   (e.g. shape `(1, n)`) are flattened; anything else is rejected.
//!
//! Invariants & assumptions
//! ------------------------
//! - `Labels` never holds both integer and string labels.
//! - `Labels::len() > 0`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each adapter, flattening, and every rejection branch.

use std::{collections::HashMap, fmt};

use ndarray::{ArrayBase, Data, Dimension};

use crate::panel::errors::{PanelError, PanelResult};

/// One of the three panel axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelAxis {
    Entity,
    Time,
    Variable,
}

impl PanelAxis {
    pub const ALL: [PanelAxis; 3] = [PanelAxis::Entity, PanelAxis::Time, PanelAxis::Variable];

    /// Position of the axis in the `(entity, time, variable)` value array.
    pub fn index(self) -> usize {
        match self {
            PanelAxis::Entity => 0,
            PanelAxis::Time => 1,
            PanelAxis::Variable => 2,
        }
    }

    pub(crate) fn plural(self) -> &'static str {
        match self {
            PanelAxis::Entity => "entities",
            PanelAxis::Time => "times",
            PanelAxis::Variable => "variables",
        }
    }
}

impl fmt::Display for PanelAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelAxis::Entity => write!(f, "entity"),
            PanelAxis::Time => write!(f, "time"),
            PanelAxis::Variable => write!(f, "variable"),
        }
    }
}

/// Label — an integer or string identifier on a panel axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Int(i64),
    Str(String),
}

impl Label {
    fn same_kind(&self, other: &Label) -> bool {
        matches!((self, other), (Label::Int(_), Label::Int(_)) | (Label::Str(_), Label::Str(_)))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{i}"),
            Label::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label::Int(i64::from(value))
    }
}

impl From<u32> for Label {
    fn from(value: u32) -> Self {
        Label::Int(i64::from(value))
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_owned())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

impl From<&String> for Label {
    fn from(value: &String) -> Self {
        Label::Str(value.clone())
    }
}

impl From<&Label> for Label {
    fn from(value: &Label) -> Self {
        value.clone()
    }
}

/// Labels — a validated, ordered sequence of unique labels of one kind.
///
/// Invariants
/// ----------
/// - Non-empty.
/// - Unique: no label appears twice.
/// - Homogeneous: all integer or all string.
/// - `index` maps each label to its position in `items`.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    items: Vec<Label>,
    index: HashMap<Label, usize>,
}

impl Labels {
    /// Validate and wrap a label vector.
    ///
    /// Errors
    /// ------
    /// - `PanelError::EmptyLabels` when `items` is empty.
    /// - `PanelError::MixedLabelKinds` when integers and strings are mixed.
    /// - `PanelError::DuplicateLabel` on the first repeated label.
    pub fn new(items: Vec<Label>) -> PanelResult<Self> {
        let first = items.first().ok_or(PanelError::EmptyLabels)?;
        if let Some(other) = items.iter().find(|label| !label.same_kind(first)) {
            return Err(PanelError::MixedLabelKinds {
                first: first.to_string(),
                other: other.to_string(),
            });
        }

        let mut index = HashMap::with_capacity(items.len());
        for (pos, label) in items.iter().enumerate() {
            if index.insert(label.clone(), pos).is_some() {
                return Err(PanelError::DuplicateLabel { label: label.to_string() });
            }
        }
        Ok(Labels { items, index })
    }

    /// Integer labels `0..n`, used whenever a dimension is inferred.
    ///
    /// `n` must be positive; callers check this before synthesizing.
    pub fn range(n: usize) -> Self {
        let items: Vec<Label> = (0..n as i64).map(Label::Int).collect();
        let index = items.iter().cloned().enumerate().map(|(pos, label)| (label, pos)).collect();
        Labels { items, index }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Label] {
        &self.items
    }

    pub fn get(&self, pos: usize) -> Option<&Label> {
        self.items.get(pos)
    }

    pub fn position(&self, label: &Label) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Position of the label whose printed form is `name`.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        match name.parse::<i64>() {
            Ok(i) if matches!(self.items.first(), Some(Label::Int(_))) => {
                self.position(&Label::Int(i))
            }
            _ => self.position(&Label::Str(name.to_owned())),
        }
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.index.contains_key(label)
    }

    /// Labels rendered as strings, in order.
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(Label::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// IntoLabels — adapter from caller-side containers into [`Labels`].
///
/// Implementations normalize into a flat label vector and then defer to
/// [`Labels::new`] for the uniqueness and homogeneity checks.
pub trait IntoLabels {
    fn into_labels(self) -> PanelResult<Labels>;
}

impl IntoLabels for Labels {
    fn into_labels(self) -> PanelResult<Labels> {
        Ok(self)
    }
}

impl IntoLabels for &Labels {
    fn into_labels(self) -> PanelResult<Labels> {
        Ok(self.clone())
    }
}

impl<L: Into<Label>> IntoLabels for Vec<L> {
    fn into_labels(self) -> PanelResult<Labels> {
        Labels::new(self.into_iter().map(Into::into).collect())
    }
}

impl<L: Clone + Into<Label>> IntoLabels for &[L] {
    fn into_labels(self) -> PanelResult<Labels> {
        Labels::new(self.iter().cloned().map(Into::into).collect())
    }
}

impl<L: Into<Label>, const N: usize> IntoLabels for [L; N] {
    fn into_labels(self) -> PanelResult<Labels> {
        Labels::new(self.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_into_labels_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Label>),+> IntoLabels for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_labels(self) -> PanelResult<Labels> {
                let ($($name,)+) = self;
                Labels::new(vec![$($name.into()),+])
            }
        }
    };
}

impl_into_labels_for_tuple!(A);
impl_into_labels_for_tuple!(A, B);
impl_into_labels_for_tuple!(A, B, C);
impl_into_labels_for_tuple!(A, B, C, D);
impl_into_labels_for_tuple!(A, B, C, D, E);
impl_into_labels_for_tuple!(A, B, C, D, E, F);

impl<S, D> IntoLabels for ArrayBase<S, D>
where
    S: Data,
    S::Elem: Clone + Into<Label>,
    D: Dimension,
{
    fn into_labels(self) -> PanelResult<Labels> {
        let shape = self.shape().to_vec();
        if shape.iter().filter(|&&len| len > 1).count() > 1 {
            return Err(PanelError::NotOneDimensional { shape });
        }
        Labels::new(self.iter().cloned().map(Into::into).collect())
    }
}
