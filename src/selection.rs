//! Indexing into a `KeyedFrame`.
//!
//! Each request variant has a fixed result shape: frame-shaped selections
//! come back keyed (with the key cut down to the surviving columns), a single
//! column comes back as a plain `Series` and a single cell as a value.

use crate::error::Result;
use crate::frame::KeyedFrame;
use polars::prelude::*;
use std::ops::Range;

/// Which rows to take.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelector {
    All,
    Range(Range<usize>),
    Indices(Vec<usize>),
    /// One flag per row; must match the frame height.
    Mask(Vec<bool>),
}

impl RowSelector {
    pub(crate) fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        match self {
            RowSelector::All => Ok(df.clone()),
            RowSelector::Range(range) => take_rows(df, range.clone()),
            RowSelector::Indices(rows) => take_rows(df, rows.iter().copied()),
            RowSelector::Mask(mask) => {
                if mask.len() != df.height() {
                    return Err(PolarsError::ShapeMismatch(
                        format!(
                            "row mask has length {} but frame has {} rows",
                            mask.len(),
                            df.height()
                        )
                        .into(),
                    )
                    .into());
                }
                Ok(df.filter(&BooleanChunked::from_slice("mask", mask))?)
            }
        }
    }
}

fn take_rows<I>(df: &DataFrame, rows: I) -> Result<DataFrame>
where
    I: IntoIterator<Item = usize>,
{
    let indices = rows
        .into_iter()
        .map(|r| {
            IdxSize::try_from(r).map_err(|_| {
                PolarsError::OutOfBounds(format!("row index {} is out of bounds", r).into())
            })
        })
        .collect::<PolarsResult<Vec<IdxSize>>>()?;
    let indices = IdxCa::from_vec("rows", indices);
    Ok(df.take(&indices)?)
}

/// A closed set of indexing requests.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The whole frame.
    All,
    Column(String),
    Columns(Vec<String>),
    Rows(RowSelector),
    RowsColumns(RowSelector, Vec<String>),
    RowsColumn(RowSelector, String),
    Cell(usize, String),
}

/// Result of [`KeyedFrame::get`].
#[derive(Debug, Clone)]
pub enum Selected {
    Frame(KeyedFrame),
    Column(Series),
    Value(AnyValue<'static>),
}

impl Selected {
    pub fn into_frame(self) -> Option<KeyedFrame> {
        match self {
            Selected::Frame(kf) => Some(kf),
            _ => None,
        }
    }

    pub fn into_column(self) -> Option<Series> {
        match self {
            Selected::Column(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<AnyValue<'static>> {
        match self {
            Selected::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl KeyedFrame {
    pub fn get(&self, selection: Selection) -> Result<Selected> {
        match selection {
            Selection::All => Ok(Selected::Frame(self.select_all())),
            Selection::Column(name) => Ok(Selected::Column(self.column(&name)?.clone())),
            Selection::Columns(names) => self.select_columns(&names).map(Selected::Frame),
            Selection::Rows(rows) => self.select_rows(&rows).map(Selected::Frame),
            Selection::RowsColumns(rows, names) => self.select(&rows, &names).map(Selected::Frame),
            Selection::RowsColumn(rows, name) => {
                self.select_rows_column(&rows, &name).map(Selected::Column)
            }
            Selection::Cell(row, name) => self.cell(row, &name).map(Selected::Value),
        }
    }

    pub fn select_all(&self) -> KeyedFrame {
        self.clone()
    }

    pub fn column(&self, name: &str) -> Result<&Series> {
        Ok(self.df.column(name)?)
    }

    /// A frame with only `names`, in that order.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<KeyedFrame> {
        let df = self.df.select(names.iter().map(|n| n.as_ref()))?;
        Ok(KeyedFrame::rewrap(df, &self.key))
    }

    pub fn select_rows(&self, rows: &RowSelector) -> Result<KeyedFrame> {
        let df = rows.apply(&self.df)?;
        Ok(KeyedFrame::rewrap(df, &self.key))
    }

    /// Rows and columns at once.
    pub fn select<S: AsRef<str>>(&self, rows: &RowSelector, names: &[S]) -> Result<KeyedFrame> {
        let df = self.df.select(names.iter().map(|n| n.as_ref()))?;
        let df = rows.apply(&df)?;
        Ok(KeyedFrame::rewrap(df, &self.key))
    }

    pub fn select_rows_column(&self, rows: &RowSelector, name: &str) -> Result<Series> {
        let df = self.df.select([name])?;
        let df = rows.apply(&df)?;
        Ok(df.column(name)?.clone())
    }

    pub fn cell(&self, row: usize, name: &str) -> Result<AnyValue<'static>> {
        let value = self.df.column(name)?.get(row)?;
        Ok(value.into_static()?)
    }
}
