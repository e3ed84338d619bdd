//! Row de-duplication. The key is the default uniqueness criterion.

use crate::error::Result;
use crate::frame::KeyedFrame;
use polars::prelude::*;
use tracing::debug;

/// Drop repeated rows of `df` judged on `by` (all columns when empty),
/// keeping row order.
pub(crate) fn unique_frame<S: AsRef<str>>(
    df: &DataFrame,
    by: &[S],
    keep: UniqueKeepStrategy,
) -> Result<DataFrame> {
    let subset: Option<Vec<String>> = if by.is_empty() {
        None
    } else {
        Some(by.iter().map(|s| s.as_ref().to_string()).collect())
    };
    let before = df.height();
    let result = df.clone().lazy().unique_stable(subset, keep).collect()?;
    debug!("Unique removed {} of {} rows", before - result.height(), before);
    Ok(result)
}

impl KeyedFrame {
    /// Copy without rows whose key values repeat an earlier row.
    pub fn unique(&self) -> Result<KeyedFrame> {
        self.unique_by(&self.key)
    }

    pub fn unique_by<S: AsRef<str>>(&self, by: &[S]) -> Result<KeyedFrame> {
        self.unique_with(by, UniqueKeepStrategy::First)
    }

    pub fn unique_with<S: AsRef<str>>(
        &self,
        by: &[S],
        keep: UniqueKeepStrategy,
    ) -> Result<KeyedFrame> {
        let df = unique_frame(&self.df, by, keep)?;
        Ok(KeyedFrame::from_parts(df, self.key.clone()))
    }

    pub fn unique_in_place(&mut self) -> Result<&mut Self> {
        let key = self.key.clone();
        self.unique_by_in_place(&key)
    }

    pub fn unique_by_in_place<S: AsRef<str>>(&mut self, by: &[S]) -> Result<&mut Self> {
        self.df = unique_frame(&self.df, by, UniqueKeepStrategy::First)?;
        Ok(self)
    }

    /// One flag per row: true when the row's key values already appeared
    /// in an earlier row.
    pub fn duplicated(&self) -> Result<Vec<bool>> {
        self.duplicated_by(&self.key)
    }

    /// Rows that `unique_by(by)` would drop. Computed by running the same
    /// de-duplication over the row indices, so both agree on what counts as
    /// a repeat (nulls, `-0.0`, NaN).
    pub fn duplicated_by<S: AsRef<str>>(&self, by: &[S]) -> Result<Vec<bool>> {
        let criterion: Vec<String> = if by.is_empty() {
            self.column_names()
        } else {
            by.iter().map(|s| s.as_ref().to_string()).collect()
        };
        let index_name = row_index_name(&self.df);
        let indexed = self.df.with_row_index(&index_name, None)?;
        let firsts = unique_frame(&indexed, &criterion, UniqueKeepStrategy::First)?;

        let mut flags = vec![true; self.df.height()];
        for idx in firsts.column(&index_name)?.idx()?.into_no_null_iter() {
            flags[idx as usize] = false;
        }
        Ok(flags)
    }
}

/// A row index column name not already taken by `df`.
fn row_index_name(df: &DataFrame) -> String {
    let names = df.get_column_names();
    let mut name = String::from("__row_index");
    while names.contains(&name.as_str()) {
        name.push('_');
    }
    name
}
