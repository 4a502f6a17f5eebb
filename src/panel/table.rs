//! panel::table — 2D slices with optional labels.
//!
//! Purpose
//! -------
//! Normalize every 2D input shape the builder accepts (labelled frames,
//! `ndarray` matrices, nested row vectors with or without missing cells)
//! into one [`Table`] before any dimension logic runs.
//!
//! Conventions
//! -----------
//! - Missing cells are `f64::NAN`. `Option<f64>` rows map `None` to `NAN`.
//! - Row labels index the first axis, column labels the second.

use ndarray::{Array2, ArrayView2};

use crate::panel::{
    errors::{PanelError, PanelResult},
    labels::{IntoLabels, Labels},
};

/// Table — a non-empty float matrix with optional row and column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    values: Array2<f64>,
    row_labels: Option<Labels>,
    column_labels: Option<Labels>,
}

impl Table {
    /// Wrap a matrix with no labels.
    ///
    /// Errors
    /// ------
    /// - `PanelError::EmptyTable` when either axis has length zero.
    pub fn new(values: Array2<f64>) -> PanelResult<Self> {
        if values.nrows() == 0 || values.ncols() == 0 {
            return Err(PanelError::EmptyTable);
        }
        Ok(Table { values, row_labels: None, column_labels: None })
    }

    /// Attach row labels; their count must equal the number of rows.
    pub fn with_row_labels(mut self, labels: impl IntoLabels) -> PanelResult<Self> {
        let labels = labels.into_labels()?;
        if labels.len() != self.values.nrows() {
            return Err(PanelError::TableLabelLength {
                axis: "row",
                expected: self.values.nrows(),
                found: labels.len(),
            });
        }
        self.row_labels = Some(labels);
        Ok(self)
    }

    /// Attach column labels; their count must equal the number of columns.
    pub fn with_column_labels(mut self, labels: impl IntoLabels) -> PanelResult<Self> {
        let labels = labels.into_labels()?;
        if labels.len() != self.values.ncols() {
            return Err(PanelError::TableLabelLength {
                axis: "column",
                expected: self.values.ncols(),
                found: labels.len(),
            });
        }
        self.column_labels = Some(labels);
        Ok(self)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row_labels(&self) -> Option<&Labels> {
        self.row_labels.as_ref()
    }

    pub fn column_labels(&self) -> Option<&Labels> {
        self.column_labels.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Array2<f64>, Option<Labels>, Option<Labels>) {
        (self.values, self.row_labels, self.column_labels)
    }
}

/// IntoTable — adapter from caller-side 2D data into a [`Table`].
pub trait IntoTable {
    fn into_table(self) -> PanelResult<Table>;
}

impl IntoTable for Table {
    fn into_table(self) -> PanelResult<Table> {
        Ok(self)
    }
}

impl IntoTable for Array2<f64> {
    fn into_table(self) -> PanelResult<Table> {
        Table::new(self)
    }
}

impl IntoTable for &Array2<f64> {
    fn into_table(self) -> PanelResult<Table> {
        Table::new(self.clone())
    }
}

impl IntoTable for ArrayView2<'_, f64> {
    fn into_table(self) -> PanelResult<Table> {
        Table::new(self.to_owned())
    }
}

impl IntoTable for Vec<Vec<f64>> {
    fn into_table(self) -> PanelResult<Table> {
        from_rows(self)
    }
}

impl IntoTable for Vec<Vec<Option<f64>>> {
    fn into_table(self) -> PanelResult<Table> {
        from_rows(
            self.into_iter()
                .map(|row| row.into_iter().map(|cell| cell.unwrap_or(f64::NAN)).collect())
                .collect(),
        )
    }
}

impl<const R: usize, const C: usize> IntoTable for [[f64; C]; R] {
    fn into_table(self) -> PanelResult<Table> {
        from_rows(self.iter().map(|row| row.to_vec()).collect())
    }
}

fn from_rows(rows: Vec<Vec<f64>>) -> PanelResult<Table> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some((row, found)) =
        rows.iter().map(Vec::len).enumerate().find(|&(_, len)| len != ncols)
    {
        return Err(PanelError::RaggedTable { row, expected: ncols, found });
    }
    let nrows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let values = Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|_| PanelError::RaggedTable { row: 0, expected: ncols, found: 0 })?;
    Table::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Nested-row adapters, including `None` → NaN.
    // - Ragged and empty input rejection.
    // - Label length validation on `with_row_labels` / `with_column_labels`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Optional cells become NaN and present cells are kept verbatim.
    //
    // Given
    // -----
    // - `[[Some(1.0), None], [Some(3.0), Some(4.0)]]`.
    //
    // Expect
    // ------
    // - Shape (2, 2) with a NaN at (0, 1).
    fn optional_rows_map_none_to_nan() {
        let rows = vec![vec![Some(1.0), None], vec![Some(3.0), Some(4.0)]];

        let table = rows.into_table().unwrap();

        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.values()[[0, 0]], 1.0);
        assert!(table.values()[[0, 1]].is_nan());
        assert_eq!(table.values()[[1, 1]], 4.0);
    }

    #[test]
    // Purpose
    // -------
    // Nested rows of unequal length are rejected with the offending row.
    //
    // Given
    // -----
    // - Rows of length 2, 2, 1.
    //
    // Expect
    // ------
    // - `RaggedTable { row: 2, expected: 2, found: 1 }`.
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0]];

        let err = rows.into_table().unwrap_err();

        assert_eq!(err, PanelError::RaggedTable { row: 2, expected: 2, found: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Tables with no rows are rejected.
    fn empty_rows_are_rejected() {
        let rows: Vec<Vec<f64>> = Vec::new();

        assert_eq!(rows.into_table().unwrap_err(), PanelError::EmptyTable);
    }

    #[test]
    // Purpose
    // -------
    // Label attachment validates the label count against the table shape.
    fn label_lengths_are_checked() {
        let table = Table::new(array![[1.0, 2.0], [3.0, 4.0]]).unwrap();

        let err = table.clone().with_row_labels(vec!["a", "b", "c"]).unwrap_err();
        assert_eq!(err, PanelError::TableLabelLength { axis: "row", expected: 2, found: 3 });

        let labelled = table.with_row_labels(vec!["a", "b"]).unwrap();
        let labelled = labelled.with_column_labels(vec!["x", "y"]).unwrap();
        assert_eq!(labelled.row_labels().map(Labels::len), Some(2));
        assert_eq!(labelled.column_labels().map(Labels::names), Some(vec!["x".to_string(), "y".to_string()]));
    }
}
