//! panel::builder — assemble a [`Panel`] from loosely shaped inputs.
//!
//! Purpose
//! -------
//! Accumulate partial specifications of a panel (entity, time and variable
//! labels, plus data supplied as per-period slices, per-entity slices, or a
//! ready 3D array) and reconcile them into one consistent [`Panel`].
//!
//! Key behaviors
//! -------------
//! - Labels may be set in any order through `specify_*`. Relabeling an axis
//!   that already has a length is only applied when the new length matches;
//!   otherwise the call is rejected softly with [`Relabel::Rejected`], a
//!   `warn!` log event and a [`BuilderDiagnostic`] entry.
//! - The first slice fixes any unset slice dimensions from its shape (and
//!   from its labels when `use_index` / `use_columns` are set). Every later
//!   slice must match exactly.
//! - An unset slice-count axis (time for by-time slices, entity for
//!   by-entity slices) is inferred from the number of slices and grows with
//!   each accumulation call until it is relabeled explicitly.
//! - The three accumulation modes are mutually exclusive per builder.
//!
//! Invariants & assumptions
//! ------------------------
//! - A failing accumulation call leaves the builder exactly as it was.
//! - `build` never returns a panel with a zero-length axis and never
//!   zero-fills: missing cells stay `NAN`.
//!
//! Conventions
//! -----------
//! - By-time slices are `(entity × variable)`; by-entity slices are
//!   `(time × variable)`; raw arrays are `(entity × time × variable)`.
//! - Inferred labels are the integers `0..n`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover inference, relabeling, shape and mode conflicts,
//!   label alignment, missing-value preservation and build completeness.

use ndarray::{Array2, Array3, ArrayView3, s};
use slog::{Logger, debug, info, o, warn};

use crate::{
    logging::null_logger,
    panel::{
        data::Panel,
        errors::{PanelError, PanelResult},
        labels::{IntoLabels, Labels, PanelAxis},
        table::IntoTable,
    },
};

/// Which of the three mutually exclusive ways data was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationMode {
    ByTime,
    ByEntity,
    RawArray,
}

/// The two slice-wise accumulation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceOrientation {
    ByTime,
    ByEntity,
}

impl SliceOrientation {
    fn mode(self) -> AccumulationMode {
        match self {
            SliceOrientation::ByTime => AccumulationMode::ByTime,
            SliceOrientation::ByEntity => AccumulationMode::ByEntity,
        }
    }

    /// `(row axis, column axis, slice-count axis)` of one slice.
    fn axes(self) -> (PanelAxis, PanelAxis, PanelAxis) {
        match self {
            SliceOrientation::ByTime => (PanelAxis::Entity, PanelAxis::Variable, PanelAxis::Time),
            SliceOrientation::ByEntity => (PanelAxis::Time, PanelAxis::Variable, PanelAxis::Entity),
        }
    }

    fn wrap(self, slices: Vec<Array2<f64>>) -> Accumulation {
        match self {
            SliceOrientation::ByTime => Accumulation::ByTime(slices),
            SliceOrientation::ByEntity => Accumulation::ByEntity(slices),
        }
    }
}

impl std::fmt::Display for AccumulationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccumulationMode::ByTime => write!(f, "by time"),
            AccumulationMode::ByEntity => write!(f, "by entity"),
            AccumulationMode::RawArray => write!(f, "as a raw array"),
        }
    }
}

/// Accumulated data, tagged by the mode it was supplied in.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Accumulation {
    #[default]
    Empty,
    /// One `(entity × variable)` matrix per period, in period order.
    ByTime(Vec<Array2<f64>>),
    /// One `(time × variable)` matrix per entity, in entity order.
    ByEntity(Vec<Array2<f64>>),
    /// A full `(entity × time × variable)` cube.
    RawArray(Array3<f64>),
}

impl Accumulation {
    pub fn mode(&self) -> Option<AccumulationMode> {
        match self {
            Accumulation::Empty => None,
            Accumulation::ByTime(_) => Some(AccumulationMode::ByTime),
            Accumulation::ByEntity(_) => Some(AccumulationMode::ByEntity),
            Accumulation::RawArray(_) => Some(AccumulationMode::RawArray),
        }
    }

    fn slice_count(&self) -> usize {
        match self {
            Accumulation::ByTime(slices) | Accumulation::ByEntity(slices) => slices.len(),
            Accumulation::Empty | Accumulation::RawArray(_) => 0,
        }
    }
}

/// Outcome of a `specify_*` call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relabel {
    /// The labels were stored (first assignment or same-length relabel).
    Applied,
    /// The axis already had `expected` labels; the `found` new ones were
    /// discarded and the old labels kept.
    Rejected { axis: PanelAxis, expected: usize, found: usize },
}

impl Relabel {
    pub fn is_applied(&self) -> bool {
        matches!(self, Relabel::Applied)
    }
}

/// Non-fatal events recorded while a builder is being filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderDiagnostic {
    /// A relabel call had the wrong length and was ignored.
    RelabelRejected { axis: PanelAxis, expected: usize, found: usize },
    /// An axis was filled with synthesized `0..len` labels.
    AxisInferred { axis: PanelAxis, len: usize },
}

impl std::fmt::Display for BuilderDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderDiagnostic::RelabelRejected { axis, expected, found } => write!(
                f,
                "{axis} labels not changed: {found} labels given, dimension is {expected}"
            ),
            BuilderDiagnostic::AxisInferred { axis, len } => {
                write!(f, "{axis} labels inferred as 0..{len}")
            }
        }
    }
}

/// PanelBuilder — incremental, validating constructor for [`Panel`].
///
/// Lifecycle
/// ---------
/// Constructed empty → labels set in any order → data accumulated in one
/// mode → [`build`](PanelBuilder::build) (repeatable) →
/// [`reset`](PanelBuilder::reset) to start over.
///
/// Fields
/// ------
/// - `entities`, `times`, `variables`: `Option<Labels>`
///   Axis labels, `None` while the dimension is unset.
/// - `growing_axis`: `Option<PanelAxis>`
///   The slice-count axis while its labels are inferred from the number
///   of slices.
/// - `data`: [`Accumulation`]
///   Data supplied so far.
/// - `diagnostics`: `Vec<BuilderDiagnostic>`
///   Soft failures and inferences, in order.
/// - `logger`: `slog::Logger`
///   Destination of structured log events; discards by default.
#[derive(Debug, Clone)]
pub struct PanelBuilder {
    entities: Option<Labels>,
    times: Option<Labels>,
    variables: Option<Labels>,
    growing_axis: Option<PanelAxis>,
    data: Accumulation,
    diagnostics: Vec<BuilderDiagnostic>,
    logger: Logger,
}

impl Default for PanelBuilder {
    fn default() -> Self {
        PanelBuilder::new()
    }
}

impl PanelBuilder {
    pub fn new() -> Self {
        PanelBuilder {
            entities: None,
            times: None,
            variables: None,
            growing_axis: None,
            data: Accumulation::Empty,
            diagnostics: Vec::new(),
            logger: null_logger(),
        }
    }

    /// Route log events to `logger`.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.new(o!("component" => "panel_builder"));
        self
    }

    /// Forget every label, all data and all diagnostics.
    pub fn reset(&mut self) {
        let logger = self.logger.clone();
        *self = PanelBuilder { logger, ..PanelBuilder::new() };
    }

    /// `(n_entities, n_times, n_variables)`, with 0 for unset dimensions.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (
            self.axis_len(PanelAxis::Entity),
            self.axis_len(PanelAxis::Time),
            self.axis_len(PanelAxis::Variable),
        )
    }

    pub fn entities(&self) -> Option<&Labels> {
        self.entities.as_ref()
    }

    pub fn times(&self) -> Option<&Labels> {
        self.times.as_ref()
    }

    pub fn variables(&self) -> Option<&Labels> {
        self.variables.as_ref()
    }

    pub fn mode(&self) -> Option<AccumulationMode> {
        self.data.mode()
    }

    pub fn accumulation(&self) -> &Accumulation {
        &self.data
    }

    pub fn diagnostics(&self) -> &[BuilderDiagnostic] {
        &self.diagnostics
    }

    // ---- Labels ----

    /// Set or relabel the time axis.
    ///
    /// Errors
    /// ------
    /// - Any normalization error from [`IntoLabels`] (not one-dimensional,
    ///   mixed kinds, duplicates, empty).
    ///
    /// A length mismatch with an already-set time axis is **not** an error:
    /// it returns `Ok(Relabel::Rejected { .. })` and keeps the old labels.
    pub fn specify_times(&mut self, times: impl IntoLabels) -> PanelResult<Relabel> {
        self.specify(PanelAxis::Time, times)
    }

    /// Set or relabel the entity axis. See [`specify_times`](Self::specify_times).
    pub fn specify_entities(&mut self, entities: impl IntoLabels) -> PanelResult<Relabel> {
        self.specify(PanelAxis::Entity, entities)
    }

    /// Set or relabel the variable axis. See [`specify_times`](Self::specify_times).
    pub fn specify_variables(&mut self, variables: impl IntoLabels) -> PanelResult<Relabel> {
        self.specify(PanelAxis::Variable, variables)
    }

    fn specify(&mut self, axis: PanelAxis, labels: impl IntoLabels) -> PanelResult<Relabel> {
        let labels = labels.into_labels()?;
        let current = self.axis_len(axis);
        if current > 0 && current != labels.len() {
            warn!(self.logger, "relabel rejected: length differs from existing dimension";
                "axis" => %axis, "expected" => current, "found" => labels.len());
            self.diagnostics.push(BuilderDiagnostic::RelabelRejected {
                axis,
                expected: current,
                found: labels.len(),
            });
            return Ok(Relabel::Rejected { axis, expected: current, found: labels.len() });
        }

        if self.growing_axis == Some(axis) {
            self.growing_axis = None;
        }
        debug!(self.logger, "axis labels set"; "axis" => %axis, "len" => labels.len());
        *self.axis_slot(axis) = Some(labels);
        Ok(Relabel::Applied)
    }

    // ---- Slices ----

    /// Add one `(entity × variable)` slice for the next period.
    ///
    /// Parameters
    /// ----------
    /// - `slice`: `impl IntoTable`
    ///   The period's data. Missing cells are `NAN` (or `None`).
    /// - `use_index`: `bool`
    ///   Take entity labels from the slice's row labels when the entity axis
    ///   is unset, and align rows by label when it is set.
    /// - `use_columns`: `bool`
    ///   Same for variable labels and the slice's column labels.
    ///
    /// Errors
    /// ------
    /// - `PanelError::ModeConflict` if data was supplied in another mode.
    /// - `PanelError::ShapeMismatch` if the slice does not match the fixed
    ///   `(entities, variables)` dimensions.
    /// - `PanelError::LabelMismatch` if aligning by label finds a label
    ///   the axis does not carry.
    /// - `PanelError::TooManySlices` if the time axis was set explicitly and
    ///   is already full.
    pub fn add_slice_by_time(
        &mut self, slice: impl IntoTable, use_index: bool, use_columns: bool,
    ) -> PanelResult<()> {
        self.add_slices(SliceOrientation::ByTime, vec![slice], use_index, use_columns)
    }

    /// Add several period slices in period order. The call is atomic: on
    /// error none of the slices are kept.
    pub fn add_slices_by_time<T, I>(
        &mut self, slices: I, use_index: bool, use_columns: bool,
    ) -> PanelResult<()>
    where
        T: IntoTable,
        I: IntoIterator<Item = T>,
    {
        self.add_slices(SliceOrientation::ByTime, slices, use_index, use_columns)
    }

    /// Add one `(time × variable)` slice for the next entity.
    ///
    /// Symmetric to [`add_slice_by_time`](Self::add_slice_by_time) with
    /// the entity and time roles swapped: `use_index` refers to time labels.
    pub fn add_slice_by_entity(
        &mut self, slice: impl IntoTable, use_index: bool, use_columns: bool,
    ) -> PanelResult<()> {
        self.add_slices(SliceOrientation::ByEntity, vec![slice], use_index, use_columns)
    }

    /// Add several entity slices in entity order, atomically.
    pub fn add_slices_by_entity<T, I>(
        &mut self, slices: I, use_index: bool, use_columns: bool,
    ) -> PanelResult<()>
    where
        T: IntoTable,
        I: IntoIterator<Item = T>,
    {
        self.add_slices(SliceOrientation::ByEntity, slices, use_index, use_columns)
    }

    fn add_slices<T, I>(
        &mut self, orientation: SliceOrientation, slices: I, use_index: bool, use_columns: bool,
    ) -> PanelResult<()>
    where
        T: IntoTable,
        I: IntoIterator<Item = T>,
    {
        let mode = orientation.mode();
        self.check_mode(mode)?;
        let (row_axis, col_axis, count_axis) = orientation.axes();

        let tables =
            slices.into_iter().map(IntoTable::into_table).collect::<PanelResult<Vec<_>>>()?;
        if tables.is_empty() {
            return Ok(());
        }

        // Stage everything; commit only once every slice is accepted.
        let mut rows = self.axis(row_axis).cloned();
        let mut cols = self.axis(col_axis).cloned();
        let mut inferred = Vec::new();
        let mut accepted = Vec::with_capacity(tables.len());

        for table in tables {
            let (values, row_labels, col_labels) = table.into_parts();
            let (nrows, ncols) = values.dim();

            if rows.is_none() && !(use_index && row_labels.is_some()) {
                inferred.push((row_axis, nrows));
            }
            if cols.is_none() && !(use_columns && col_labels.is_some()) {
                inferred.push((col_axis, ncols));
            }
            let row_target =
                &*rows.get_or_insert_with(|| slice_labels(row_labels.as_ref(), use_index, nrows));
            let col_target = &*cols
                .get_or_insert_with(|| slice_labels(col_labels.as_ref(), use_columns, ncols));

            let expected = (row_target.len(), col_target.len());
            if (nrows, ncols) != expected {
                return Err(PanelError::ShapeMismatch { expected, found: (nrows, ncols) });
            }

            let mut values = values;
            if use_index {
                if let Some(labels) = &row_labels {
                    values = align_rows(values, labels, row_target, row_axis)?;
                }
            }
            if use_columns {
                if let Some(labels) = &col_labels {
                    values = align_rows(values.reversed_axes(), labels, col_target, col_axis)?
                        .reversed_axes();
                }
            }
            accepted.push(values.as_standard_layout().into_owned());
        }

        let total = self.data.slice_count() + accepted.len();
        let count_is_growing = self.growing_axis == Some(count_axis);
        let capacity = self.axis_len(count_axis);
        if capacity > 0 && !count_is_growing && total > capacity {
            return Err(PanelError::TooManySlices { axis: count_axis, capacity });
        }

        // ---- Commit ----
        *self.axis_slot(row_axis) = rows;
        *self.axis_slot(col_axis) = cols;
        for (axis, len) in inferred {
            self.record_inferred(axis, len);
        }
        if capacity == 0 || count_is_growing {
            *self.axis_slot(count_axis) = Some(Labels::range(total));
            self.growing_axis = Some(count_axis);
            self.record_inferred(count_axis, total);
        }

        let added = accepted.len();
        match &mut self.data {
            Accumulation::ByTime(existing) | Accumulation::ByEntity(existing) => {
                existing.extend(accepted)
            }
            data => *data = orientation.wrap(accepted),
        }
        debug!(self.logger, "slices accumulated"; "mode" => %mode, "added" => added, "total" => total);
        Ok(())
    }

    // ---- Raw array ----

    /// Supply the whole `(entity × time × variable)` cube at once.
    ///
    /// Errors
    /// ------
    /// - `PanelError::ModeConflict` if any data was already supplied.
    /// - `PanelError::EmptyArray` if an axis of `array` has length zero.
    /// - `PanelError::ArrayShapeMismatch` if a set dimension disagrees with
    ///   the corresponding array axis.
    pub fn set_array(&mut self, array: Array3<f64>) -> PanelResult<()> {
        if let Some(current) = self.data.mode() {
            return Err(PanelError::ModeConflict {
                current,
                requested: AccumulationMode::RawArray,
            });
        }

        let (e, t, v) = array.dim();
        let found = [e, t, v];
        if found.contains(&0) {
            return Err(PanelError::EmptyArray);
        }
        for axis in PanelAxis::ALL {
            let len = self.axis_len(axis);
            if len > 0 && len != found[axis.index()] {
                let (de, dt, dv) = self.dimensions();
                return Err(PanelError::ArrayShapeMismatch { expected: [de, dt, dv], found });
            }
        }

        for axis in PanelAxis::ALL {
            if self.axis_len(axis) == 0 {
                *self.axis_slot(axis) = Some(Labels::range(found[axis.index()]));
                self.record_inferred(axis, found[axis.index()]);
            }
        }
        self.data = Accumulation::RawArray(array);
        Ok(())
    }

    /// Borrowing variant of [`set_array`](Self::set_array).
    pub fn set_array_view(&mut self, array: ArrayView3<'_, f64>) -> PanelResult<()> {
        self.set_array(array.to_owned())
    }

    // ---- Finalize ----

    /// Assemble the accumulated state into a [`Panel`].
    ///
    /// Errors
    /// ------
    /// - `PanelError::IncompleteSpecification { missing }` when any axis is
    ///   unset or no data was supplied.
    /// - `PanelError::MissingSlices` when fewer slices were supplied than
    ///   the slice-count axis holds.
    ///
    /// Notes
    /// -----
    /// - Repeated calls on unchanged state return equal panels.
    pub fn build(&self) -> PanelResult<Panel> {
        let mut missing = Vec::new();
        for axis in PanelAxis::ALL {
            if self.axis_len(axis) == 0 {
                missing.push(axis.plural());
            }
        }
        if matches!(self.data, Accumulation::Empty) {
            missing.push("data");
        }
        let (Some(entities), Some(times), Some(variables), true) =
            (&self.entities, &self.times, &self.variables, missing.is_empty())
        else {
            return Err(PanelError::IncompleteSpecification { missing });
        };

        let shape = (entities.len(), times.len(), variables.len());
        let values = match &self.data {
            Accumulation::ByTime(slices) => {
                check_slice_count(PanelAxis::Time, shape.1, slices.len())?;
                let mut values = Array3::<f64>::from_elem(shape, f64::NAN);
                for (t, slice) in slices.iter().enumerate() {
                    values.slice_mut(s![.., t, ..]).assign(slice);
                }
                values
            }
            Accumulation::ByEntity(slices) => {
                check_slice_count(PanelAxis::Entity, shape.0, slices.len())?;
                let mut values = Array3::<f64>::from_elem(shape, f64::NAN);
                for (e, slice) in slices.iter().enumerate() {
                    values.slice_mut(s![e, .., ..]).assign(slice);
                }
                values
            }
            Accumulation::RawArray(array) => array.clone(),
            Accumulation::Empty => {
                return Err(PanelError::IncompleteSpecification { missing: vec!["data"] });
            }
        };

        let panel = Panel::new(entities.clone(), times.clone(), variables.clone(), values)?;
        info!(self.logger, "panel built";
            "entities" => shape.0, "times" => shape.1, "variables" => shape.2,
            "missing" => panel.n_missing());
        Ok(panel)
    }

    // ---- Helpers ----

    fn check_mode(&self, requested: AccumulationMode) -> PanelResult<()> {
        match self.data.mode() {
            Some(current) if current != requested => {
                Err(PanelError::ModeConflict { current, requested })
            }
            _ => Ok(()),
        }
    }

    fn axis(&self, axis: PanelAxis) -> Option<&Labels> {
        match axis {
            PanelAxis::Entity => self.entities.as_ref(),
            PanelAxis::Time => self.times.as_ref(),
            PanelAxis::Variable => self.variables.as_ref(),
        }
    }

    fn axis_slot(&mut self, axis: PanelAxis) -> &mut Option<Labels> {
        match axis {
            PanelAxis::Entity => &mut self.entities,
            PanelAxis::Time => &mut self.times,
            PanelAxis::Variable => &mut self.variables,
        }
    }

    fn axis_len(&self, axis: PanelAxis) -> usize {
        self.axis(axis).map_or(0, Labels::len)
    }

    fn record_inferred(&mut self, axis: PanelAxis, len: usize) {
        debug!(self.logger, "axis inferred"; "axis" => %axis, "len" => len);
        self.diagnostics.push(BuilderDiagnostic::AxisInferred { axis, len });
    }
}

/// Labels for an axis first seen on a slice: the slice's own labels when
/// requested and present, `0..len` otherwise.
fn slice_labels(labels: Option<&Labels>, use_labels: bool, len: usize) -> Labels {
    match labels {
        Some(labels) if use_labels => labels.clone(),
        _ => Labels::range(len),
    }
}

/// Reorder the rows of `values` (labelled `source`) into the order of
/// `target`. Both label sets must contain the same labels.
fn align_rows(
    values: Array2<f64>, source: &Labels, target: &Labels, axis: PanelAxis,
) -> PanelResult<Array2<f64>> {
    if source == target {
        return Ok(values);
    }
    let mut order = Vec::with_capacity(target.len());
    for label in target {
        let pos = source
            .position(label)
            .ok_or_else(|| PanelError::LabelMismatch { axis, label: label.to_string() })?;
        order.push(pos);
    }
    if let Some(extra) = source.iter().find(|label| !target.contains(label)) {
        return Err(PanelError::LabelMismatch { axis, label: extra.to_string() });
    }
    Ok(values.select(ndarray::Axis(0), &order))
}

fn check_slice_count(axis: PanelAxis, expected: usize, found: usize) -> PanelResult<()> {
    if found < expected {
        return Err(PanelError::MissingSlices { axis, expected, found });
    }
    Ok(())
}
