//! estimators::design — stacking transformed slices into a regression.
//!
//! Purpose
//! -------
//! Flatten a transformed `(entity × time)` response and `(entity × time × k)`
//! regressor cube into the long format a least-squares solver expects, and
//! drop every row with a missing value.
//!
//! Conventions
//! -----------
//! - Rows are ordered entity-major, time-minor: all periods of the first
//!   entity, then all periods of the second, and so on.
//! - Each kept row is keyed by its `(entity, time)` labels so residuals can
//!   be mapped back onto the panel.

use ndarray::{Array1, Array2, Array3, ArrayView2};

use crate::panel::{data::Panel, labels::Label};

/// StackedDesign — long-format response and design after listwise deletion.
///
/// Fields
/// ------
/// - `response`: `Array1<f64>`
///   Kept response values, length `nobs`.
/// - `design`: `Array2<f64>`
///   Kept regressor rows, shape `(nobs, k)`.
/// - `keys`: `Vec<(Label, Label)>`
///   `(entity, time)` of each kept row, in row order.
/// - `dropped`: `usize`
///   Rows removed because the response or any regressor was `NAN`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedDesign {
    pub response: Array1<f64>,
    pub design: Array2<f64>,
    pub keys: Vec<(Label, Label)>,
    pub dropped: usize,
}

impl StackedDesign {
    /// Stack `y` and `x` over the entity and time axes of `panel`.
    ///
    /// `y` must be `(n_entities × n_times)` and `x` `(n_entities × n_times ×
    /// k)` for the panel's own axes, which is what the estimator transforms
    /// produce.
    pub fn stack(panel: &Panel, y: &ArrayView2<'_, f64>, x: &Array3<f64>) -> Self {
        let (n_entities, n_times) = y.dim();
        let k = x.dim().2;
        let entities = panel.entities().as_slice();
        let times = panel.times().as_slice();

        let kept: Vec<(usize, usize)> = (0..n_entities)
            .flat_map(|e| (0..n_times).map(move |t| (e, t)))
            .filter(|&(e, t)| !y[[e, t]].is_nan() && (0..k).all(|j| !x[[e, t, j]].is_nan()))
            .collect();

        let response = kept.iter().map(|&(e, t)| y[[e, t]]).collect::<Array1<f64>>();
        let design = Array2::from_shape_fn((kept.len(), k), |(row, j)| {
            let (e, t) = kept[row];
            x[[e, t, j]]
        });
        let keys = kept.iter().map(|&(e, t)| (entities[e].clone(), times[t].clone())).collect();

        StackedDesign { response, design, keys, dropped: n_entities * n_times - kept.len() }
    }

    pub fn nobs(&self) -> usize {
        self.response.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::labels::Labels;
    use ndarray::{array, s};

    fn make_panel() -> Panel {
        let mut values = Array3::<f64>::zeros((2, 3, 2));
        values.slice_mut(s![.., .., 0]).assign(&array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        values.slice_mut(s![.., .., 1]).assign(&array![[10.0, 20.0, 30.0], [40.0, 50.0, 60.0]]);
        Panel::new(
            Labels::new(vec!["A".into(), "B".into()]).unwrap(),
            Labels::new(vec![Label::Int(1), Label::Int(2), Label::Int(3)]).unwrap(),
            Labels::new(vec!["y".into(), "x".into()]).unwrap(),
            values,
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Complete data stacks entity-major, time-minor with matching keys.
    fn stacks_entity_major() {
        let panel = make_panel();
        let y = panel.variable_view("y").unwrap();
        let x = panel.variables_slice(&["x"]).unwrap();

        let stacked = StackedDesign::stack(&panel, &y, &x);

        assert_eq!(stacked.response, array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(stacked.design.column(0), array![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        assert_eq!(stacked.keys[3], (Label::from("B"), Label::Int(1)));
        assert_eq!(stacked.dropped, 0);
    }

    #[test]
    // Purpose
    // -------
    // A missing regressor at (A, 2) removes exactly that row.
    //
    // Given
    // -----
    // - 2 entities × 3 periods, `x[A, 2] = NaN`.
    //
    // Expect
    // ------
    // - 5 kept rows, 1 dropped, and no key equal to (A, 2).
    fn missing_regressor_drops_only_its_row() {
        let panel = make_panel();
        let y = panel.variable_view("y").unwrap();
        let mut x = panel.variables_slice(&["x"]).unwrap();
        x[[0, 1, 0]] = f64::NAN;

        let stacked = StackedDesign::stack(&panel, &y, &x);

        assert_eq!((stacked.nobs(), stacked.dropped), (5, 1));
        assert!(!stacked.keys.contains(&(Label::from("A"), Label::Int(2))));
        assert_eq!(stacked.response, array![1.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
