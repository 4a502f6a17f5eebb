//! panel::errors — error types for panel assembly and access.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by label normalization,
//! table adapters, the [`Panel`](crate::panel::data::Panel) container and the
//! [`PanelBuilder`](crate::panel::builder::PanelBuilder).
//!
//! Key behaviors
//! -------------
//! - Separate *type-like* failures (labels that are not a flat sequence of a
//!   single kind) from *shape* failures (slices that do not fit the panel
//!   dimensions) and from *incomplete specification* at build time.
//! - Attach human-readable `Display` messages carrying the offending sizes
//!   or labels.
//! - Map into Python exceptions when the `python-bindings` feature is on:
//!   label-kind failures become `TypeError`, everything else `ValueError`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A relabel call whose length differs from an already-set dimension is
//!   **not** an error; it is reported through
//!   [`Relabel::Rejected`](crate::panel::builder::Relabel) instead.
//!
//! Testing notes
//! -------------
//! - Unit tests check that messages embed their payloads.

use crate::panel::{builder::AccumulationMode, labels::PanelAxis};

#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyTypeError, PyValueError},
};

pub type PanelResult<T> = Result<T, PanelError>;

/// PanelError — failures raised while normalizing inputs or assembling a panel.
///
/// Variants
/// --------
/// - `NotOneDimensional { shape }`
///   A label container had more than one non-unit axis.
/// - `MixedLabelKinds { first, other }`
///   A label sequence mixed integer and string labels.
/// - `DuplicateLabel { label }`
///   A label appeared more than once on one axis.
/// - `EmptyLabels`, `EmptyTable`, `EmptyArray`
///   Zero-length inputs where at least one element is required.
/// - `RaggedTable { row, expected, found }`
///   A nested row sequence did not have a constant row length.
/// - `TableLabelLength { axis, expected, found }`
///   Row or column labels attached to a table do not match its shape.
/// - `ShapeMismatch { expected, found }`
///   A 2D slice did not match the fixed slice dimensions.
/// - `ArrayShapeMismatch { expected, found }`
///   A 3D array did not match already-set dimensions.
/// - `LabelMismatch { axis, label }`
///   A labelled slice carried a label unknown to the established axis.
/// - `TooManySlices { axis, capacity }`
///   More slices were supplied than the explicitly set axis holds.
/// - `MissingSlices { axis, expected, found }`
///   `build` was called with fewer slices than the axis holds.
/// - `ModeConflict { current, requested }`
///   A second accumulation mode was used on one builder.
/// - `IncompleteSpecification { missing }`
///   `build` was called before every dimension and a data source were set.
/// - `PanelShapeMismatch { expected, found }`
///   A panel value array did not match its axis lengths.
/// - `UnknownLabel { axis, label }`
///   An accessor was asked for a label the panel does not carry.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelError {
    // ---- Label normalization ----
    NotOneDimensional { shape: Vec<usize> },
    MixedLabelKinds { first: String, other: String },
    DuplicateLabel { label: String },
    EmptyLabels,

    // ---- Tables and arrays ----
    EmptyTable,
    EmptyArray,
    RaggedTable { row: usize, expected: usize, found: usize },
    TableLabelLength { axis: &'static str, expected: usize, found: usize },

    // ---- Accumulation ----
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    ArrayShapeMismatch { expected: [usize; 3], found: [usize; 3] },
    LabelMismatch { axis: PanelAxis, label: String },
    TooManySlices { axis: PanelAxis, capacity: usize },
    MissingSlices { axis: PanelAxis, expected: usize, found: usize },
    ModeConflict { current: AccumulationMode, requested: AccumulationMode },
    IncompleteSpecification { missing: Vec<&'static str> },

    // ---- Panel container ----
    PanelShapeMismatch { expected: [usize; 3], found: [usize; 3] },
    UnknownLabel { axis: PanelAxis, label: String },
}

impl PanelError {
    /// Whether this error corresponds to a label *type* problem rather than a
    /// shape or completeness problem.
    pub fn is_type_error(&self) -> bool {
        matches!(self, PanelError::NotOneDimensional { .. } | PanelError::MixedLabelKinds { .. })
    }
}

impl std::error::Error for PanelError {}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Label normalization ----
            PanelError::NotOneDimensional { shape } => {
                write!(f, "Panel Error: labels must be a flat 1-D sequence, got shape {shape:?}")
            }
            PanelError::MixedLabelKinds { first, other } => write!(
                f,
                "Panel Error: labels must all be integers or all be strings ({first:?} vs {other:?})"
            ),
            PanelError::DuplicateLabel { label } => {
                write!(f, "Panel Error: duplicate label {label:?}")
            }
            PanelError::EmptyLabels => write!(f, "Panel Error: label sequence is empty"),

            // ---- Tables and arrays ----
            PanelError::EmptyTable => write!(f, "Panel Error: slice has no rows or no columns"),
            PanelError::EmptyArray => write!(f, "Panel Error: array has a zero-length axis"),
            PanelError::RaggedTable { row, expected, found } => write!(
                f,
                "Panel Error: row {row} has {found} values, expected {expected} like the first row"
            ),
            PanelError::TableLabelLength { axis, expected, found } => write!(
                f,
                "Panel Error: {found} {axis} labels supplied for a table with {expected} {axis}s"
            ),

            // ---- Accumulation ----
            PanelError::ShapeMismatch { expected, found } => write!(
                f,
                "Panel Error: slice shape {found:?} does not match expected {expected:?}"
            ),
            PanelError::ArrayShapeMismatch { expected, found } => write!(
                f,
                "Panel Error: array shape {found:?} does not match panel dimensions {expected:?}"
            ),
            PanelError::LabelMismatch { axis, label } => {
                write!(f, "Panel Error: slice label {label:?} is not on the {axis} axis")
            }
            PanelError::TooManySlices { axis, capacity } => write!(
                f,
                "Panel Error: more slices than the {capacity} labels set on the {axis} axis"
            ),
            PanelError::MissingSlices { axis, expected, found } => write!(
                f,
                "Panel Error: {found} slices supplied but the {axis} axis has {expected} labels"
            ),
            PanelError::ModeConflict { current, requested } => write!(
                f,
                "Panel Error: cannot accumulate {requested} after data was supplied {current}"
            ),
            PanelError::IncompleteSpecification { missing } => write!(
                f,
                "Panel Error: incomplete specification, missing {}",
                missing.join(", ")
            ),

            // ---- Panel container ----
            PanelError::PanelShapeMismatch { expected, found } => write!(
                f,
                "Panel Error: values shape {found:?} does not match axis lengths {expected:?}"
            ),
            PanelError::UnknownLabel { axis, label } => {
                write!(f, "Panel Error: unknown {axis} label {label:?}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<PanelError> for PyErr {
    fn from(err: PanelError) -> PyErr {
        if err.is_type_error() {
            PyTypeError::new_err(err.to_string())
        } else {
            PyValueError::new_err(err.to_string())
        }
    }
}
