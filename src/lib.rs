//! Polars data frames with a designated key.
//!
//! A [`KeyedFrame`] wraps a `DataFrame` together with an ordered set of key
//! columns. The key is the default for sorting, de-duplication and join
//! column selection, and every operation that produces a new frame works out
//! which key columns the result still carries.

pub mod config;
pub mod error;
pub mod frame;
pub mod join;
pub mod key;
pub mod selection;
pub mod sort;
pub mod unique;

pub use config::FrameConfig;
pub use error::{KeyedFrameError, Result};
pub use frame::{AsDataFrame, KeyedFrame, Strict, StrictEq};
pub use join::{JoinKind, JoinOptions, KeyedJoin};
pub use key::KeySpec;
pub use selection::{RowSelector, Selected, Selection};
