// sluice-core/src/domain/compare.rs

use std::fmt;

/// First differing cell of one row pair. Indices are 1-based positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiff {
    pub row: usize,
    pub column: usize,
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Identical,
    Different(Vec<RowDiff>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub outcome: Outcome,
    pub left_rows: usize,
    pub right_rows: usize,
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        matches!(self.outcome, Outcome::Identical)
    }

    pub fn differences(&self) -> &[RowDiff] {
        match &self.outcome {
            Outcome::Identical => &[],
            Outcome::Different(diffs) => diffs,
        }
    }
}

/// Compares row pairs up to the shorter input. Trailing rows of the longer
/// side are not reported, but the counts are kept on the result.
pub fn compare_rows(left: &[Vec<String>], right: &[Vec<String>]) -> Comparison {
    let outcome = if left == right {
        Outcome::Identical
    } else {
        let diffs = left
            .iter()
            .zip(right.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .filter_map(|(idx, (a, b))| first_difference(idx + 1, a, b))
            .collect();
        Outcome::Different(diffs)
    };

    Comparison {
        outcome,
        left_rows: left.len(),
        right_rows: right.len(),
    }
}

fn first_difference(row: usize, left: &[String], right: &[String]) -> Option<RowDiff> {
    let width = left.len().max(right.len());
    (0..width).find_map(|col| {
        let a = left.get(col).map(String::as_str).unwrap_or_default();
        let b = right.get(col).map(String::as_str).unwrap_or_default();
        let same_presence = left.get(col).is_some() == right.get(col).is_some();
        if a != b || !same_presence {
            Some(RowDiff {
                row,
                column: col + 1,
                left: a.to_string(),
                right: b.to_string(),
            })
        } else {
            None
        }
    })
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Identical => write!(f, "The two CSV files are identical."),
            Outcome::Different(diffs) => {
                writeln!(f, "The two CSV files are not identical.")?;
                write!(f, "Differences:")?;
                for diff in diffs {
                    write!(f, "\nRow {}:", diff.row)?;
                    write!(
                        f,
                        "\n   Column {}: '{}' (file1) != '{}' (file2)",
                        diff.column, diff.left, diff.right
                    )?;
                }
                Ok(())
            }
        }
    }
}
