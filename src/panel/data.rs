//! panel::data — the three-axis labeled panel container.
//!
//! Purpose
//! -------
//! Hold panel observations keyed by `(entity, time, variable)` together with
//! the labels of each axis. This is the product of
//! [`PanelBuilder`](crate::panel::builder::PanelBuilder) and the read-only
//! input of every estimator.
//!
//! Key behaviors
//! -------------
//! - [`Panel::new`] validates that the value array shape equals the axis
//!   lengths.
//! - Accessors return owned copies or views; the panel is never mutated
//!   after construction.
//! - Per-variable `(entity × time)` slices are the unit estimators work on.
//!
//! Invariants & assumptions
//! ------------------------
//! - `values.dim() == (entities.len(), times.len(), variables.len())`, all
//!   strictly positive.
//! - Missing cells are `f64::NAN`; every `(entity, time)` pair has a value
//!   (possibly missing) for every variable.
//!
//! Conventions
//! -----------
//! - Axis 0 is entity, axis 1 is time, axis 2 is variable.
//! - Variables are looked up by their printed name, so synthesized integer
//!   variable labels are addressed as `"0"`, `"1"`, ….

use ndarray::{Array2, Array3, ArrayView2, Axis, s};

use crate::panel::{
    errors::{PanelError, PanelResult},
    labels::{Label, Labels, PanelAxis},
    table::Table,
};

/// Panel — observations indexed by entity, time and variable.
///
/// Fields
/// ------
/// - `entities`, `times`, `variables`: [`Labels`]
///   Ordered, unique labels of each axis.
/// - `values`: `Array3<f64>`
///   Observation cube of shape `(n_entities, n_times, n_variables)`, with
///   `NAN` marking missing observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    entities: Labels,
    times: Labels,
    variables: Labels,
    values: Array3<f64>,
}

impl Panel {
    /// Construct a panel from its axes and value cube.
    ///
    /// Errors
    /// ------
    /// - `PanelError::PanelShapeMismatch` when `values` does not have shape
    ///   `(entities.len(), times.len(), variables.len())`.
    pub fn new(
        entities: Labels, times: Labels, variables: Labels, values: Array3<f64>,
    ) -> PanelResult<Self> {
        let expected = [entities.len(), times.len(), variables.len()];
        let (e, t, v) = values.dim();
        if expected != [e, t, v] {
            return Err(PanelError::PanelShapeMismatch { expected, found: [e, t, v] });
        }
        Ok(Panel { entities, times, variables, values })
    }

    /// `(n_entities, n_times, n_variables)`.
    pub fn dims(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    pub fn entities(&self) -> &Labels {
        &self.entities
    }

    pub fn times(&self) -> &Labels {
        &self.times
    }

    pub fn variables(&self) -> &Labels {
        &self.variables
    }

    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    pub fn axis(&self, axis: PanelAxis) -> &Labels {
        match axis {
            PanelAxis::Entity => &self.entities,
            PanelAxis::Time => &self.times,
            PanelAxis::Variable => &self.variables,
        }
    }

    /// Value at `(entity, time, variable)`.
    ///
    /// Returns `None` when any label is unknown and `Some(NAN)` for a
    /// missing observation.
    pub fn value(&self, entity: &Label, time: &Label, variable: &Label) -> Option<f64> {
        let e = self.entities.position(entity)?;
        let t = self.times.position(time)?;
        let v = self.variables.position(variable)?;
        Some(self.values[[e, t, v]])
    }

    /// Position of a variable on the variable axis by its printed name.
    pub fn variable_index(&self, name: &str) -> PanelResult<usize> {
        self.variables.position_by_name(name).ok_or_else(|| PanelError::UnknownLabel {
            axis: PanelAxis::Variable,
            label: name.to_owned(),
        })
    }

    /// Borrowed `(entity × time)` view of one variable.
    pub fn variable_view(&self, name: &str) -> PanelResult<ArrayView2<'_, f64>> {
        let v = self.variable_index(name)?;
        Ok(self.values.index_axis(Axis(2), v))
    }

    /// Owned `(entity × time)` copy of one variable.
    pub fn variable_slice(&self, name: &str) -> PanelResult<Array2<f64>> {
        self.variable_view(name).map(|view| view.to_owned())
    }

    /// Owned `(entity × time × k)` copy of several variables, in the order
    /// given.
    pub fn variables_slice<S: AsRef<str>>(&self, names: &[S]) -> PanelResult<Array3<f64>> {
        let (n_entities, n_times, _) = self.dims();
        let mut out = Array3::<f64>::zeros((n_entities, n_times, names.len()));
        for (k, name) in names.iter().enumerate() {
            let view = self.variable_view(name.as_ref())?;
            out.slice_mut(s![.., .., k]).assign(&view);
        }
        Ok(out)
    }

    /// The `(time × variable)` table of one entity, labelled on both axes.
    pub fn entity_frame(&self, entity: &Label) -> PanelResult<Table> {
        let e = self.entities.position(entity).ok_or_else(|| PanelError::UnknownLabel {
            axis: PanelAxis::Entity,
            label: entity.to_string(),
        })?;
        let values = self.values.index_axis(Axis(0), e).to_owned();
        Table::new(values)?.with_row_labels(&self.times)?.with_column_labels(&self.variables)
    }

    /// The `(entity × variable)` table of one period, labelled on both axes.
    pub fn time_frame(&self, time: &Label) -> PanelResult<Table> {
        let t = self.times.position(time).ok_or_else(|| PanelError::UnknownLabel {
            axis: PanelAxis::Time,
            label: time.to_string(),
        })?;
        let values = self.values.index_axis(Axis(1), t).to_owned();
        Table::new(values)?.with_row_labels(&self.entities)?.with_column_labels(&self.variables)
    }

    /// Number of missing cells across the whole cube.
    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// True when no cell is missing.
    pub fn is_balanced(&self) -> bool {
        self.n_missing() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Shape validation in `Panel::new`.
    // - Triple lookup, including unknown labels and missing cells.
    // - Variable slicing and by-entity / by-time frames.
    // -------------------------------------------------------------------------

    // Purpose
    // -------
    // Build a small 2 × 3 × 2 panel whose value at (e, t, v) is
    // `100 e + 10 t + v`, with entity labels "A", "B" and variables "y", "x".
    fn make_panel() -> Panel {
        let values = Array3::from_shape_fn((2, 3, 2), |(e, t, v)| {
            100.0 * e as f64 + 10.0 * t as f64 + v as f64
        });
        Panel::new(
            Labels::new(vec!["A".into(), "B".into()]).unwrap(),
            Labels::range(3),
            Labels::new(vec!["y".into(), "x".into()]).unwrap(),
            values,
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A value cube whose shape disagrees with the axes is rejected.
    fn new_rejects_mismatched_values() {
        let err = Panel::new(
            Labels::range(2),
            Labels::range(3),
            Labels::range(1),
            Array3::zeros((2, 2, 1)),
        )
        .unwrap_err();

        assert_eq!(err, PanelError::PanelShapeMismatch { expected: [2, 3, 1], found: [2, 2, 1] });
    }

    #[test]
    // Purpose
    // -------
    // Triple lookup reads the cell addressed by labels and returns `None` for
    // unknown labels.
    fn value_reads_by_labels() {
        let panel = make_panel();

        assert_eq!(panel.value(&"B".into(), &Label::Int(2), &"x".into()), Some(121.0));
        assert_eq!(panel.value(&"C".into(), &Label::Int(0), &"x".into()), None);
    }

    #[test]
    // Purpose
    // -------
    // Variable slices are `(entity × time)` and follow the requested order.
    fn variable_slices_follow_requested_order() {
        let panel = make_panel();

        let y = panel.variable_slice("y").unwrap();
        let both = panel.variables_slice(&["x", "y"]).unwrap();

        assert_eq!(y.dim(), (2, 3));
        assert_eq!(y[[1, 2]], 120.0);
        assert_eq!(both[[1, 2, 0]], 121.0);
        assert_eq!(both[[1, 2, 1]], 120.0);
        assert!(matches!(
            panel.variable_slice("z"),
            Err(PanelError::UnknownLabel { axis: PanelAxis::Variable, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Entity and time frames carry the labels of the remaining axes.
    fn frames_are_labelled() {
        let panel = make_panel();

        let entity = panel.entity_frame(&"A".into()).unwrap();
        let period = panel.time_frame(&Label::Int(1)).unwrap();

        assert_eq!(entity.shape(), (3, 2));
        assert_eq!(entity.row_labels(), Some(panel.times()));
        assert_eq!(period.shape(), (2, 2));
        assert_eq!(period.values()[[1, 0]], 110.0);
        assert!(panel.is_balanced());
    }
}
