//! Joins between keyed and plain frames.
//!
//! The output type always follows the left operand: a keyed left side gives a
//! keyed result, a plain left side gives a plain `DataFrame` even when the
//! right side is keyed.
//!
//! Default join columns come from the keys:
//! - keyed ⋈ keyed: the intersection of both keys,
//! - keyed ⋈ plain: the left key columns present in the right table,
//! - plain ⋈ keyed: the right key columns present in the left table.
//!
//! The result key is cut down to the columns that survive the join, so join
//! columns renamed with a suffix or dropped silently leave the key.

use crate::error::{KeyedFrameError, Result};
use crate::frame::KeyedFrame;
use crate::key;
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Suffix polars appends to clashing right-hand column names.
pub const RIGHT_SUFFIX: &str = "_right";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
    /// Left rows with a match; left columns only.
    Semi,
    /// Left rows without a match; left columns only.
    Anti,
}

impl JoinKind {
    /// Semi and anti joins keep only the left operand's columns.
    pub fn keeps_left_only(self) -> bool {
        matches!(self, JoinKind::Semi | JoinKind::Anti)
    }
}

impl FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "outer" | "full" => Ok(JoinKind::Outer),
            "semi" => Ok(JoinKind::Semi),
            "anti" => Ok(JoinKind::Anti),
            other => Err(format!("unknown join kind: {}", other)),
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Outer => "outer",
            JoinKind::Semi => "semi",
            JoinKind::Anti => "anti",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub kind: JoinKind,
    /// Explicit join columns; `None` derives them from the keys.
    pub on: Option<Vec<String>>,
}

impl JoinOptions {
    pub fn new(kind: JoinKind) -> Self {
        Self { kind, on: None }
    }

    pub fn on<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.on = Some(columns.into_iter().map(|c| c.as_ref().to_string()).collect());
        self
    }
}

pub trait KeyedJoin<Rhs: ?Sized> {
    type Output;

    fn join_with(&self, other: &Rhs, options: JoinOptions) -> Result<Self::Output>;

    /// Join on the columns implied by the keys.
    fn join_by_key(&self, other: &Rhs, kind: JoinKind) -> Result<Self::Output> {
        self.join_with(other, JoinOptions::new(kind))
    }
}

impl KeyedJoin<KeyedFrame> for KeyedFrame {
    type Output = KeyedFrame;

    fn join_with(&self, other: &KeyedFrame, options: JoinOptions) -> Result<KeyedFrame> {
        let on = options
            .on
            .unwrap_or_else(|| key::intersect_sets(&self.key, &other.key));
        let joined = join_frames(&self.df, &other.df, &on, options.kind)?;

        let candidates = if options.kind.keeps_left_only() {
            self.key.clone()
        } else {
            key::union_ordered(&self.key, &other.key)
        };
        let result = KeyedFrame::rewrap(joined, &candidates);
        debug!(
            "{} join on {:?}: keys {:?} + {:?} -> {:?}",
            options.kind, on, self.key, other.key, result.key
        );
        Ok(result)
    }
}

impl KeyedJoin<DataFrame> for KeyedFrame {
    type Output = KeyedFrame;

    fn join_with(&self, other: &DataFrame, options: JoinOptions) -> Result<KeyedFrame> {
        let on = options.on.unwrap_or_else(|| {
            let columns = other.get_column_names();
            key::intersect_ordered(&self.key, &columns)
        });
        let joined = join_frames(&self.df, other, &on, options.kind)?;
        let result = KeyedFrame::rewrap(joined, &self.key);
        debug!(
            "{} join on {:?} with plain frame: key {:?} -> {:?}",
            options.kind, on, self.key, result.key
        );
        Ok(result)
    }
}

impl KeyedJoin<KeyedFrame> for DataFrame {
    type Output = DataFrame;

    fn join_with(&self, other: &KeyedFrame, options: JoinOptions) -> Result<DataFrame> {
        let on = options.on.unwrap_or_else(|| {
            let columns = self.get_column_names();
            key::intersect_ordered(&other.key, &columns)
        });
        debug!(
            "{} join of plain frame on {:?}: right key {:?} not carried over",
            options.kind, on, other.key
        );
        join_frames(self, &other.df, &on, options.kind)
    }
}

/// Run the join through polars.
///
/// Polars has no right join, so a right join runs as a left join with the
/// operands swapped and the columns put back in left-then-right order.
pub(crate) fn join_frames(
    left: &DataFrame,
    right: &DataFrame,
    on: &[String],
    kind: JoinKind,
) -> Result<DataFrame> {
    if on.is_empty() {
        return Err(KeyedFrameError::NoJoinColumns);
    }
    let on_cols: Vec<Expr> = on.iter().map(|c| col(c)).collect();

    let joined = match kind {
        JoinKind::Right => {
            let swapped = lazy_join(right, left, &on_cols, JoinType::Left)?;
            restore_right_join(&swapped, left, right, on)?
        }
        JoinKind::Inner => lazy_join(left, right, &on_cols, JoinType::Inner)?,
        JoinKind::Left => lazy_join(left, right, &on_cols, JoinType::Left)?,
        JoinKind::Outer => lazy_join(left, right, &on_cols, JoinType::Outer)?,
        JoinKind::Semi => lazy_join(left, right, &on_cols, JoinType::Semi)?,
        JoinKind::Anti => lazy_join(left, right, &on_cols, JoinType::Anti)?,
    };
    Ok(joined)
}

fn lazy_join(
    left: &DataFrame,
    right: &DataFrame,
    on_cols: &[Expr],
    join_type: JoinType,
) -> Result<DataFrame> {
    let result = left
        .clone()
        .lazy()
        .join(right.clone().lazy(), on_cols, on_cols, JoinArgs::new(join_type))
        .collect()?;
    Ok(result)
}

/// Undo the operand swap of a right join computed as `right LEFT JOIN left`:
/// left columns first under their own names, then the right non-join
/// columns, with clashing right names suffixed as in the other join kinds.
fn restore_right_join(
    swapped: &DataFrame,
    left: &DataFrame,
    right: &DataFrame,
    on: &[String],
) -> Result<DataFrame> {
    let left_names = left.get_column_names();
    let right_names = right.get_column_names();
    let is_join_col = |name: &str| on.iter().any(|o| o == name);

    let mut columns = Vec::with_capacity(swapped.width());
    for &name in &left_names {
        let source = if !is_join_col(name) && right_names.contains(&name) {
            format!("{}{}", name, RIGHT_SUFFIX)
        } else {
            name.to_string()
        };
        let mut series = swapped.column(&source)?.clone();
        series.rename(name);
        columns.push(series);
    }
    for &name in &right_names {
        if is_join_col(name) {
            continue;
        }
        let mut series = swapped.column(name)?.clone();
        if left_names.contains(&name) {
            series.rename(&format!("{}{}", name, RIGHT_SUFFIX));
        }
        columns.push(series);
    }
    Ok(DataFrame::new(columns)?)
}
