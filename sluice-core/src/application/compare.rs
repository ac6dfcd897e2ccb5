// sluice-core/src/application/compare.rs
//
// USE CASE: cell-by-cell comparison of two delimited files.

use std::path::Path;
use tracing::{info, instrument};

use crate::domain::compare::{Comparison, compare_rows};
use crate::error::SluiceError;
use crate::infrastructure::delimited::read_records;

/// Loads both files fully and reports the first differing cell per row.
#[instrument(skip_all, fields(left = %left.as_ref().display(), right = %right.as_ref().display()))]
pub fn compare_files(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
) -> Result<Comparison, SluiceError> {
    let load = |path: &Path| {
        read_records(path).map_err(|source| SluiceError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    };
    let left_rows = load(left.as_ref())?;
    let right_rows = load(right.as_ref())?;

    let comparison = compare_rows(&left_rows, &right_rows);
    info!(
        identical = comparison.is_identical(),
        differences = comparison.differences().len(),
        "Comparison finished"
    );
    Ok(comparison)
}
