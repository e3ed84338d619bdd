//! Sorting. Without explicit columns the key gives the column precedence.

use crate::error::Result;
use crate::frame::KeyedFrame;
use polars::prelude::*;
use tracing::debug;

/// Stable sort of `df` by `by`; an empty `by` means every column in table
/// order.
pub(crate) fn sort_frame<S: AsRef<str>>(
    df: &DataFrame,
    by: &[S],
    options: SortMultipleOptions,
) -> Result<DataFrame> {
    let columns: Vec<String> = if by.is_empty() {
        df.get_column_names().iter().map(|s| s.to_string()).collect()
    } else {
        by.iter().map(|s| s.as_ref().to_string()).collect()
    };
    if columns.is_empty() {
        return Ok(df.clone());
    }
    debug!("Sorting {} rows by {:?}", df.height(), columns);

    let exprs: Vec<Expr> = columns.iter().map(|c| col(c)).collect();
    let sorted = df
        .clone()
        .lazy()
        .sort_by_exprs(exprs, options.with_maintain_order(true))
        .collect()?;
    Ok(sorted)
}

impl KeyedFrame {
    /// Sorted copy, ordered by the key columns.
    pub fn sort(&self, options: SortMultipleOptions) -> Result<KeyedFrame> {
        self.sort_by(&self.key, options)
    }

    /// Sorted copy, ordered by `by` for this call only. The key is unchanged.
    pub fn sort_by<S: AsRef<str>>(
        &self,
        by: &[S],
        options: SortMultipleOptions,
    ) -> Result<KeyedFrame> {
        let df = sort_frame(&self.df, by, options)?;
        Ok(KeyedFrame::from_parts(df, self.key.clone()))
    }

    pub fn sort_in_place(&mut self, options: SortMultipleOptions) -> Result<&mut Self> {
        let key = self.key.clone();
        self.sort_by_in_place(&key, options)
    }

    pub fn sort_by_in_place<S: AsRef<str>>(
        &mut self,
        by: &[S],
        options: SortMultipleOptions,
    ) -> Result<&mut Self> {
        self.df = sort_frame(&self.df, by, options)?;
        Ok(self)
    }

    /// Whether the rows are already in key order.
    pub fn is_sorted(&self, options: SortMultipleOptions) -> Result<bool> {
        self.is_sorted_by(&self.key, options)
    }

    pub fn is_sorted_by<S: AsRef<str>>(
        &self,
        by: &[S],
        options: SortMultipleOptions,
    ) -> Result<bool> {
        let sorted = sort_frame(&self.df, by, options)?;
        Ok(sorted.equals_missing(&self.df))
    }
}
