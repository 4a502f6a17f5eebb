//! panel — labeled three-axis panel data and its builder.
//!
//! Purpose
//! -------
//! Model panel observations indexed by `(entity, time, variable)` and
//! assemble them from heterogeneous inputs: label sequences of several
//! container types, 2D slices keyed by period or by entity, or a ready 3D
//! array.
//!
//! Key behaviors
//! -------------
//! - [`Label`] / [`Labels`] normalize axis labels once at the boundary via
//!   [`IntoLabels`].
//! - [`Table`] normalizes 2D slices via [`IntoTable`].
//! - [`PanelBuilder`] reconciles dimensions across calls and produces an
//!   immutable [`Panel`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every axis of a built panel is non-empty and duplicate-free.
//! - Missing observations are `f64::NAN` and are never zero-filled.
//!
//! Downstream usage
//! ----------------
//! - Build a panel, then hand `&Panel` to `estimators::FirstDiff` or
//!   `estimators::FixedEffects`.
//!
//! Testing notes
//! -------------
//! - Each submodule carries its own unit tests; the end-to-end path is
//!   exercised in `tests/integration_panel_pipeline.rs`.

pub mod builder;
pub mod data;
pub mod errors;
pub mod labels;
pub mod table;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::builder::{AccumulationMode, BuilderDiagnostic, PanelBuilder, Relabel};
pub use self::data::Panel;
pub use self::errors::{PanelError, PanelResult};
pub use self::labels::{IntoLabels, Label, Labels, PanelAxis};
pub use self::table::{IntoTable, Table};
