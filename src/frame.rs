//! `KeyedFrame`: a polars `DataFrame` carrying an ordered set of key columns.
//!
//! The key is validated once, when it is supplied from outside. Operations
//! that reshape the frame derive the new key by intersecting candidate names
//! with the columns that actually survived, so a stale name never reaches a
//! result.

use crate::error::{KeyedFrameError, Result};
use crate::key::{self, KeySpec};
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Read access to the underlying table, shared by plain and keyed frames.
pub trait AsDataFrame {
    fn as_data_frame(&self) -> &DataFrame;
}

impl AsDataFrame for DataFrame {
    fn as_data_frame(&self) -> &DataFrame {
        self
    }
}

impl AsDataFrame for KeyedFrame {
    fn as_data_frame(&self) -> &DataFrame {
        &self.df
    }
}

/// Order-sensitive equality, used for hashing and identity checks.
///
/// A keyed frame is never strictly equal to a plain `DataFrame`.
pub trait StrictEq<Rhs: ?Sized = Self> {
    fn strict_eq(&self, other: &Rhs) -> bool;
}

#[derive(Debug, Clone)]
pub struct KeyedFrame {
    pub(crate) df: DataFrame,
    pub(crate) key: Vec<String>,
}

impl KeyedFrame {
    /// Wrap `df` with `key`.
    ///
    /// Duplicate key names collapse to their first occurrence. Every name must
    /// be a column of `df`, otherwise a validation error is returned and `df`
    /// is dropped.
    pub fn new(df: DataFrame, key: impl Into<KeySpec>) -> Result<Self> {
        let spec = key.into();
        let missing = {
            let columns = df.get_column_names();
            spec.missing_from(&columns)
        };
        if !missing.is_empty() {
            return Err(KeyedFrameError::Validation(missing.join(", ")));
        }
        Ok(Self {
            df,
            key: spec.into_names(),
        })
    }

    /// Wrap without validation. Callers guarantee `key` is a de-duplicated
    /// subset of the columns of `df`.
    pub(crate) fn from_parts(df: DataFrame, key: Vec<String>) -> Self {
        Self { df, key }
    }

    /// Wrap a derived table, keeping only the `candidates` that are still
    /// columns of it.
    pub(crate) fn rewrap(df: DataFrame, candidates: &[String]) -> Self {
        let key = {
            let columns = df.get_column_names();
            key::intersect_ordered(candidates, &columns)
        };
        if key.len() != candidates.len() {
            debug!(
                "Dropped key columns absent from result: {:?} -> {:?}",
                candidates, key
            );
        }
        Self { df, key }
    }

    pub fn key(&self) -> &[String] {
        &self.key
    }

    pub fn table(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_inner(self) -> DataFrame {
        self.df
    }

    pub fn into_parts(self) -> (DataFrame, Vec<String>) {
        (self.df, self.key)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.df.shape()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// A new frame over a copy of this table with an externally supplied key.
    pub fn rekey(&self, key: impl Into<KeySpec>) -> Result<KeyedFrame> {
        KeyedFrame::new(self.df.clone(), key)
    }

    /// Independent copy of the table and the key.
    pub fn deep_copy(&self) -> KeyedFrame {
        self.clone()
    }

    /// Borrow this frame under strict equality and hashing.
    pub fn strict(&self) -> Strict<'_> {
        Strict(self)
    }

    /// Feed the table contents and the ordered key into `state`.
    ///
    /// Frames that are [`StrictEq`] produce the same hash.
    pub fn strict_hash<H: Hasher>(&self, state: &mut H) {
        hash_table(&self.df, state);
        self.key.hash(state);
    }

    pub fn head(&self, n: usize) -> KeyedFrame {
        Self::from_parts(self.df.head(Some(n)), self.key.clone())
    }

    pub fn tail(&self, n: usize) -> KeyedFrame {
        Self::from_parts(self.df.tail(Some(n)), self.key.clone())
    }

    /// Append the rows of `other` in place.
    ///
    /// When both frames have the same width, the columns of `other` are
    /// matched by name first; anything else is left to `vstack`.
    pub fn append<T: AsDataFrame + ?Sized>(&mut self, other: &T) -> Result<&mut Self> {
        let other = other.as_data_frame();
        let aligned = if other.width() == self.df.width() {
            other.select(self.df.get_column_names())?
        } else {
            other.clone()
        };
        self.df.vstack_mut(&aligned)?;
        Ok(self)
    }

    /// Append one row given as one value per column, in column order.
    pub fn push_row(&mut self, row: &[AnyValue<'_>]) -> Result<&mut Self> {
        let row_df = self.row_frame(row)?;
        self.df.vstack_mut(&row_df)?;
        Ok(self)
    }

    /// Insert one row so that it ends up at position `at`.
    pub fn insert_row(&mut self, at: usize, row: &[AnyValue<'_>]) -> Result<&mut Self> {
        let height = self.df.height();
        if at > height {
            return Err(KeyedFrameError::RowOutOfBounds { index: at, height });
        }
        let row_df = self.row_frame(row)?;
        let rest = self.df.slice(at as i64, height - at);
        let mut out = self.df.slice(0, at);
        out.vstack_mut(&row_df)?;
        out.vstack_mut(&rest)?;
        self.df = out;
        Ok(self)
    }

    /// Remove the rows at `rows`. Repeated indices are removed once.
    pub fn delete_rows(&mut self, rows: &[usize]) -> Result<&mut Self> {
        let height = self.df.height();
        if let Some(&index) = rows.iter().find(|&&r| r >= height) {
            return Err(KeyedFrameError::RowOutOfBounds { index, height });
        }
        let doomed: HashSet<usize> = rows.iter().copied().collect();
        let keep: Vec<bool> = (0..height).map(|i| !doomed.contains(&i)).collect();
        self.df = self.df.filter(&BooleanChunked::from_slice("keep", &keep))?;
        Ok(self)
    }

    /// Reorder columns so that column `order[i]` lands at position `i`.
    pub fn permute_columns(&mut self, order: &[usize]) -> Result<&mut Self> {
        let width = self.df.width();
        if order.len() != width {
            return Err(KeyedFrameError::InvalidPermutation(format!(
                "expected {} positions, got {}",
                width,
                order.len()
            )));
        }
        let mut seen = vec![false; width];
        for &pos in order {
            if pos >= width || seen[pos] {
                return Err(KeyedFrameError::InvalidPermutation(format!(
                    "position {} is out of range or repeated",
                    pos
                )));
            }
            seen[pos] = true;
        }
        let names = self.column_names();
        self.df = self.df.select(order.iter().map(|&p| names[p].as_str()))?;
        Ok(self)
    }

    /// Rename a column in place. A key entry naming `old` follows the rename.
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<&mut Self> {
        self.df.rename(old, new)?;
        for name in self.key.iter_mut().filter(|n| n.as_str() == old) {
            *name = new.to_string();
        }
        Ok(self)
    }

    /// Add a column, or replace the column of the same name.
    pub fn with_column(&mut self, series: Series) -> Result<&mut Self> {
        self.df.with_column(series)?;
        Ok(self)
    }

    /// A new frame without `names`; key columns among them leave the key.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<KeyedFrame> {
        let mut df = self.df.clone();
        for name in names {
            df = df.drop(name.as_ref())?;
        }
        Ok(Self::rewrap(df, &self.key))
    }

    fn row_frame(&self, row: &[AnyValue<'_>]) -> Result<DataFrame> {
        if row.len() != self.df.width() {
            return Err(PolarsError::ShapeMismatch(
                format!(
                    "row has {} values but frame has {} columns",
                    row.len(),
                    self.df.width()
                )
                .into(),
            )
            .into());
        }
        let columns = self
            .df
            .get_columns()
            .iter()
            .zip(row)
            .map(|(s, value)| {
                Series::from_any_values(s.name(), std::slice::from_ref(value), false)
                    .and_then(|single| single.cast(s.dtype()))
            })
            .collect::<PolarsResult<Vec<_>>>()?;
        Ok(DataFrame::new(columns)?)
    }
}

fn hash_table<H: Hasher>(df: &DataFrame, state: &mut H) {
    df.shape().hash(state);
    for series in df.get_columns() {
        series.name().hash(state);
        for row in 0..series.len() {
            match series.get(row) {
                Ok(value) => hash_value(&value, state),
                Err(_) => 0u8.hash(state),
            }
        }
    }
}

/// Hash a cell so that values polars compares as equal hash alike: numbers
/// go through `f64` with one zero and one NaN.
fn hash_value<H: Hasher>(value: &AnyValue<'_>, state: &mut H) {
    match value {
        AnyValue::Null => 0u8.hash(state),
        AnyValue::Boolean(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        AnyValue::String(s) => {
            2u8.hash(state);
            s.hash(state);
        }
        AnyValue::StringOwned(s) => {
            2u8.hash(state);
            s.as_str().hash(state);
        }
        v if v.dtype().is_numeric() => {
            3u8.hash(state);
            v.extract::<f64>().map(canonical_bits).hash(state);
        }
        other => {
            4u8.hash(state);
            other.to_string().hash(state);
        }
    }
}

fn canonical_bits(x: f64) -> u64 {
    if x.is_nan() {
        f64::NAN.to_bits()
    } else if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

/// Unordered equality: same table and the same key as a set.
impl PartialEq for KeyedFrame {
    fn eq(&self, other: &Self) -> bool {
        key::same_set(&self.key, &other.key) && self.df.equals_missing(&other.df)
    }
}

impl StrictEq for KeyedFrame {
    fn strict_eq(&self, other: &KeyedFrame) -> bool {
        self.key == other.key && self.df.equals_missing(&other.df)
    }
}

impl StrictEq<DataFrame> for KeyedFrame {
    fn strict_eq(&self, _other: &DataFrame) -> bool {
        false
    }
}

impl StrictEq<KeyedFrame> for DataFrame {
    fn strict_eq(&self, _other: &KeyedFrame) -> bool {
        false
    }
}

impl StrictEq for DataFrame {
    fn strict_eq(&self, other: &DataFrame) -> bool {
        self.equals_missing(other)
    }
}

/// A borrowed `KeyedFrame` whose `Eq` and `Hash` follow strict equality,
/// for use as a map or set key.
#[derive(Debug, Clone, Copy)]
pub struct Strict<'a>(pub &'a KeyedFrame);

impl PartialEq for Strict<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.strict_eq(other.0)
    }
}

impl Eq for Strict<'_> {}

impl Hash for Strict<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.strict_hash(state);
    }
}

impl From<KeyedFrame> for DataFrame {
    fn from(kf: KeyedFrame) -> Self {
        kf.df
    }
}

impl fmt::Display for KeyedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "KeyedFrame with key [{}]", self.key.join(", "))?;
        write!(f, "{}", self.df)
    }
}
