//! estimators::transforms — within-entity transforms of `(entity × time)` slices.
//!
//! Purpose
//! -------
//! Implement the data transforms that remove unobserved entity (and
//! optionally time) effects before least squares:
//! first differences, one-way entity demeaning, and two-way demeaning.
//!
//! Key behaviors
//! -------------
//! - [`first_difference`]: `Δv[e, t] = v[e, t] − v[e, t−1]`; the first
//!   period is `NAN` for every entity. No wraparound, never across
//!   entities.
//! - [`demean_entity`]: subtract each entity's mean over time.
//! - [`demean_two_way`]: `v − entity_mean + grand_mean − time_mean`, where
//!   the grand mean is the mean of the entity means and the time means are
//!   taken from the untransformed slice.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are `(entity × time)`: rows are entities, columns periods.
//! - Means skip `NAN`. An entity or period with no observations has a `NAN`
//!   mean, so its cells stay `NAN`.
//! - `NAN` inputs produce `NAN` outputs in every transform.
//!
//! Notes
//! -----
//! - The two-way order (entity demean, add grand mean, then time demean)
//!   is kept as is. On a balanced panel it yields zero sums within every
//!   entity and every period; on an unbalanced one the residual effects
//!   depend on that order.

use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, Zip, s};

/// Mean along `axis`, skipping `NAN`; `NAN` where a lane has no values.
pub fn nan_mean(a: &ArrayView2<'_, f64>, axis: Axis) -> Array1<f64> {
    a.map_axis(axis, |lane| {
        let (sum, count) = lane
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0_usize), |(sum, count), &v| (sum + v, count + 1));
        if count == 0 { f64::NAN } else { sum / count as f64 }
    })
}

/// First difference along time for every entity row.
pub fn first_difference(a: &ArrayView2<'_, f64>) -> Array2<f64> {
    let (n_entities, n_times) = a.dim();
    let mut out = Array2::<f64>::from_elem((n_entities, n_times), f64::NAN);
    if n_times > 1 {
        let diff = &a.slice(s![.., 1..]) - &a.slice(s![.., ..n_times - 1]);
        out.slice_mut(s![.., 1..]).assign(&diff);
    }
    out
}

/// Subtract each entity's time mean.
pub fn demean_entity(a: &ArrayView2<'_, f64>) -> Array2<f64> {
    let entity_mean = nan_mean(a, Axis(1));
    a - &entity_mean.insert_axis(Axis(1))
}

/// Remove entity and time effects:
/// `v − entity_mean + grand_mean − time_mean`.
pub fn demean_two_way(a: &ArrayView2<'_, f64>) -> Array2<f64> {
    let entity_mean = nan_mean(a, Axis(1));
    let time_mean = nan_mean(a, Axis(0));
    let grand_mean = nan_mean(&entity_mean.view().insert_axis(Axis(0)), Axis(1))[0];

    let mut out = a - &entity_mean.insert_axis(Axis(1));
    out += grand_mean;
    out -= &time_mean.insert_axis(Axis(0));
    out
}

/// Apply a 2D transform to each `(entity × time)` slice of a
/// `(entity × time × k)` cube.
pub fn map_variables<F>(cube: &Array3<f64>, transform: F) -> Array3<f64>
where
    F: Fn(&ArrayView2<'_, f64>) -> Array2<f64>,
{
    let mut out = Array3::<f64>::zeros(cube.dim());
    Zip::from(out.axis_iter_mut(Axis(2)))
        .and(cube.axis_iter(Axis(2)))
        .for_each(|mut dst, src| dst.assign(&transform(&src)));
    out
}
