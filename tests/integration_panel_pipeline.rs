//! Integration tests for panel assembly and panel estimators.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: labeled period slices with missing
//!   country-years, through `PanelBuilder`, to first-difference and one-way
//!   and two-way fixed-effects regressions.
//! - Use data with known slopes and additive effects so estimates can be
//!   checked exactly rather than only for plausibility.
//!
//! Coverage
//! --------
//! - `panel::builder`:
//!   - Label inference from slice index and columns, relabeling of the
//!     inferred time axis, by-time and by-entity layouts agreeing.
//! - `estimators::first_diff` and `estimators::fixed_effects`:
//!   - Slope recovery, listwise deletion counts, specification errors.
//!
//! Exclusions
//! ----------
//! - Transform arithmetic and solver numerics in isolation; those are
//!   covered by unit tests.
//! - Python bindings.
use approx::assert_relative_eq;
use ndarray::Array2;
use panel_reg::{
    estimators::{EstimationError, EstimatorKind, FirstDiff, FixedEffects},
    panel::{BuilderDiagnostic, Label, Panel, PanelAxis, PanelBuilder, Relabel, Table},
};

const COUNTRIES: [&str; 4] = ["USA", "DEU", "JPN", "BRA"];
const YEARS: [i64; 6] = [2000, 2001, 2002, 2003, 2004, 2005];
const VARIABLES: [&str; 3] = ["life_exp", "health_spend", "beds"];
const BETA_SPEND: f64 = 0.8;
const BETA_BEDS: f64 = 2.0;

/// Purpose
/// -------
/// Deterministic observation for country `e` in year `t`.
///
/// Returns
/// -------
/// - `[life_exp, health_spend, beds]` with
///   `life_exp = 0.8 · spend + 2 · beds + α_e (+ γ_t)`, where
///   `α_e = 60 + 4e` and `γ_t = 0.7 t − 0.1 t²` when `time_effects` is on.
fn observation(e: usize, t: usize, time_effects: bool) -> [f64; 3] {
    let spend = 3.0 + e as f64 + 0.5 * t as f64 + ((e * 7 + t * 3) % 5) as f64 * 0.3;
    let beds = 2.0 + ((e * 3 + t * t) % 7) as f64 * 0.4;
    let alpha = 60.0 + 4.0 * e as f64;
    let gamma = if time_effects { 0.7 * t as f64 - 0.1 * (t * t) as f64 } else { 0.0 };
    [BETA_SPEND * spend + BETA_BEDS * beds + alpha + gamma, spend, beds]
}

/// Purpose
/// -------
/// Build a panel from one labeled `(country × variable)` table per year.
///
/// Parameters
/// ----------
/// - `missing`: country-years whose whole row is `NAN`.
/// - `time_effects`: whether `life_exp` carries additive year effects.
///
/// Invariants
/// ----------
/// - Entity and variable labels come from each table's index and columns;
///   time labels are inferred as `0..6` and then relabeled to years.
fn build_by_time(missing: &[(usize, usize)], time_effects: bool) -> Panel {
    let mut builder = PanelBuilder::new();
    let tables: Vec<Table> = (0..YEARS.len())
        .map(|t| {
            let values = Array2::from_shape_fn((COUNTRIES.len(), VARIABLES.len()), |(e, v)| {
                if missing.contains(&(e, t)) {
                    f64::NAN
                } else {
                    observation(e, t, time_effects)[v]
                }
            });
            Table::new(values)
                .unwrap()
                .with_row_labels(COUNTRIES)
                .unwrap()
                .with_column_labels(VARIABLES)
                .unwrap()
        })
        .collect();

    builder.add_slices_by_time(tables, true, true).unwrap();
    assert_eq!(builder.dimensions(), (4, 6, 3));
    assert_eq!(builder.specify_times(YEARS).unwrap(), Relabel::Applied);
    builder.build().unwrap()
}

#[test]
// Purpose
// -------
// Labeled period slices build a panel whose cells read back by label,
// with missing country-years preserved as NaN.
fn builds_labeled_panel_with_missing_country_year() {
    let panel = build_by_time(&[(1, 2)], false);

    assert_eq!(panel.dims(), (4, 6, 3));
    assert_eq!(panel.entities().get(1), Some(&Label::from("DEU")));
    assert_eq!(panel.times().get(0), Some(&Label::Int(2000)));
    assert_eq!(panel.n_missing(), 3);

    let jpn_2004 = panel.value(&"JPN".into(), &Label::Int(2004), &"beds".into()).unwrap();
    assert_relative_eq!(jpn_2004, observation(2, 4, false)[2]);
    let deu_2002 = panel.value(&"DEU".into(), &Label::Int(2002), &"life_exp".into()).unwrap();
    assert!(deu_2002.is_nan());
}

#[test]
// Purpose
// -------
// Period-by-period and country-by-country assembly give the same panel.
fn by_time_and_by_entity_layouts_agree() {
    let by_time = build_by_time(&[], false);

    let mut builder = PanelBuilder::new();
    for e in 0..COUNTRIES.len() {
        let values = Array2::from_shape_fn((YEARS.len(), VARIABLES.len()), |(t, v)| {
            observation(e, t, false)[v]
        });
        let table = Table::new(values).unwrap().with_row_labels(YEARS).unwrap();
        builder.add_slice_by_entity(table, true, false).unwrap();
    }
    assert!(builder.specify_entities(COUNTRIES).unwrap().is_applied());
    assert!(!builder.specify_variables(["life_exp", "health_spend"]).unwrap().is_applied());
    assert!(builder.specify_variables(VARIABLES).unwrap().is_applied());
    let by_entity = builder.build().unwrap();

    assert_eq!(by_entity, by_time);
    assert!(builder.diagnostics().contains(&BuilderDiagnostic::RelabelRejected {
        axis: PanelAxis::Variable,
        expected: 3,
        found: 2,
    }));
}

#[test]
// Purpose
// -------
// First differences recover the slopes despite a missing country-year,
// which costs that year and the following one for that country.
//
// Given
// -----
// - 4 countries × 6 years, DEU 2002 missing, entity effects only.
//
// Expect
// ------
// - 4 leading rows plus DEU 2002 and DEU 2003 dropped: 18 observations.
// - Slopes [0.8, 2.0].
fn first_difference_recovers_slopes() {
    let panel = build_by_time(&[(1, 2)], false);
    let mut fd = FirstDiff::new(&panel, "life_exp", ["health_spend", "beds"]).unwrap();

    let fit = fd.estimate().unwrap();

    assert_eq!(fit.kind, EstimatorKind::FirstDifference);
    assert_eq!((fit.nobs(), fit.dropped), (18, 6));
    assert_relative_eq!(fit.coefficient("health_spend").unwrap(), BETA_SPEND, epsilon = 1e-9);
    assert_relative_eq!(fit.coefficient("beds").unwrap(), BETA_BEDS, epsilon = 1e-9);
    assert!(!fit.keys.contains(&(Label::from("DEU"), Label::Int(2003))));
}

#[test]
// Purpose
// -------
// One-way fixed effects recover the slopes with entity means taken over
// the available years.
fn one_way_fixed_effects_recover_slopes() {
    let panel = build_by_time(&[(1, 2), (3, 5)], false);
    let mut fe = FixedEffects::new(&panel, "life_exp", ["health_spend", "beds"], false).unwrap();

    let fit = fe.estimate().unwrap();

    assert_eq!((fit.nobs(), fit.dropped), (22, 2));
    assert_relative_eq!(fit.coefficient("health_spend").unwrap(), BETA_SPEND, epsilon = 1e-9);
    assert_relative_eq!(fit.coefficient("beds").unwrap(), BETA_BEDS, epsilon = 1e-9);
    assert!(fit.summary().contains("life_exp"));
}

#[test]
// Purpose
// -------
// With year effects in the outcome, only the two-way estimator recovers
// the slopes exactly.
fn two_way_fixed_effects_absorb_year_effects() {
    let panel = build_by_time(&[], true);

    let mut two_way = FixedEffects::new(&panel, "life_exp", ["health_spend", "beds"], true).unwrap();
    let two_way_fit = two_way.estimate().unwrap().clone();
    let mut one_way = FixedEffects::entity(&panel, "life_exp", ["health_spend", "beds"]).unwrap();
    let one_way_fit = one_way.estimate().unwrap();

    assert_relative_eq!(two_way_fit.coefficient("health_spend").unwrap(), BETA_SPEND, epsilon = 1e-9);
    assert_relative_eq!(two_way_fit.coefficient("beds").unwrap(), BETA_BEDS, epsilon = 1e-9);
    assert!((one_way_fit.coefficient("health_spend").unwrap() - BETA_SPEND).abs() > 1e-6);
    assert_eq!(two_way_fit.nobs(), 24);
}

#[test]
// Purpose
// -------
// Bad variable choices are rejected before any estimation.
fn invalid_specifications_are_rejected() {
    let panel = build_by_time(&[], false);

    let unknown = FirstDiff::new(&panel, "gdp", "beds").err().unwrap();
    let dependent = FixedEffects::entity(&panel, "life_exp", ["beds", "life_exp"]).err().unwrap();

    assert_eq!(unknown, EstimationError::UnknownVariable { name: "gdp".into() });
    assert_eq!(dependent, EstimationError::DependentInRegressors { name: "life_exp".into() });
}
