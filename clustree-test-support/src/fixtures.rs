//! The iris membership fixture.
//!
//! 150 samples clustered at `K = 1, 2, 3` with one-based labels:
//!
//! | rows     | K1 | K2 | K3 |
//! |----------|----|----|----|
//! | 0..45    | 1  | 1  | 1  |
//! | 45..70   | 1  | 1  | 2  |
//! | 70..90   | 1  | 2  | 2  |
//! | 90..150  | 1  | 2  | 3  |
//!
//! The `sepal_length` column sums to 876.5 overall; per node the sums are
//! 369.8 and 506.7 at `K = 2` and 225.5, 265.2 and 385.8 at `K = 3`.

use std::fmt::Write as _;

/// Number of samples in the fixture.
pub const IRIS_ROWS: usize = 150;

/// Row blocks of the fixture: `(rows, [K1, K2, K3], bulk value, last value)`.
///
/// Every row in a block carries the bulk `sepal_length` except the last.
const BLOCKS: [(usize, [i64; 3], f64, f64); 4] = [
    (45, [1, 1, 1], 5.0, 5.5),
    (25, [1, 1, 2], 5.8, 5.1),
    (20, [1, 2, 2], 6.0, 6.9),
    (60, [1, 2, 3], 6.4, 8.2),
];

/// Label columns `[K1, K2, K3]`, one-based.
///
/// # Examples
/// ```
/// use clustree_test_support::fixtures::{iris_membership, IRIS_ROWS};
///
/// let columns = iris_membership();
/// assert_eq!(columns.len(), 3);
/// assert!(columns.iter().all(|column| column.len() == IRIS_ROWS));
/// ```
#[must_use]
pub fn iris_membership() -> Vec<Vec<i64>> {
    let mut columns = vec![Vec::with_capacity(IRIS_ROWS); 3];
    for (rows, labels, _, _) in BLOCKS {
        for (column, label) in columns.iter_mut().zip(labels) {
            column.extend(std::iter::repeat_n(label, rows));
        }
    }
    columns
}

/// The `sepal_length` metadata column.
#[must_use]
pub fn iris_sepal_length() -> Vec<f64> {
    let mut values = Vec::with_capacity(IRIS_ROWS);
    for (rows, _, bulk, last) in BLOCKS {
        values.extend(std::iter::repeat_n(bulk, rows - 1));
        values.push(last);
    }
    values
}

/// The fixture as CSV with header `sample,K1,K2,K3,sepal_length`.
#[must_use]
pub fn iris_csv() -> String {
    iris_delimited(',')
}

/// The fixture as delimited text using `delimiter` between fields.
#[must_use]
pub fn iris_delimited(delimiter: char) -> String {
    let mut out = String::new();
    let header = ["sample", "K1", "K2", "K3", "sepal_length"].join(&delimiter.to_string());
    out.push_str(&header);
    out.push('\n');

    let columns = iris_membership();
    for (row, value) in iris_sepal_length().into_iter().enumerate() {
        let _ = write!(out, "s{row}");
        for column in &columns {
            let _ = write!(out, "{delimiter}{}", column[row]);
        }
        let _ = writeln!(out, "{delimiter}{value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_sum(values: &[f64], rows: std::ops::Range<usize>) -> f64 {
        values[rows].iter().sum()
    }

    #[test]
    fn columns_share_length() {
        let columns = iris_membership();
        assert!(columns.iter().all(|column| column.len() == IRIS_ROWS));
        assert_eq!(iris_sepal_length().len(), IRIS_ROWS);
    }

    #[test]
    fn node_sums_match_documented_values() {
        let values = iris_sepal_length();
        let expected = [
            (0..150, 876.5),
            (0..70, 369.8),
            (70..150, 506.7),
            (0..45, 225.5),
            (45..90, 265.2),
            (90..150, 385.8),
        ];
        for (rows, sum) in expected {
            assert!((block_sum(&values, rows.clone()) - sum).abs() < 1e-9, "{rows:?}");
        }
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let csv = iris_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("sample,K1,K2,K3,sepal_length"));
        assert_eq!(lines.next(), Some("s0,1,1,1,5"));
        assert_eq!(csv.lines().count(), IRIS_ROWS + 1);
        assert_eq!(csv.lines().last(), Some("s149,1,2,3,8.2"));
    }
}
