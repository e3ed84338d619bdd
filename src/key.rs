//! Key specifications and the set arithmetic used to propagate keys.
//!
//! A key is an ordered list of column names. Order matters for sorting
//! (first name is the primary sort column) and for strict equality, but the
//! propagation rules below treat it as a set whenever two keys meet.

use itertools::Itertools;
use std::collections::HashSet;

/// Normalized key request: ordered, de-duplicated, not yet validated
/// against any table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySpec {
    names: Vec<String>,
}

impl KeySpec {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: dedup_ordered(names.into_iter().map(|s| s.as_ref().to_string())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in this spec that are not among `columns`, in spec order.
    pub fn missing_from<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        let present: HashSet<&str> = columns.iter().map(|c| c.as_ref()).collect();
        self.names
            .iter()
            .filter(|n| !present.contains(n.as_str()))
            .cloned()
            .collect()
    }
}

impl From<&str> for KeySpec {
    fn from(name: &str) -> Self {
        KeySpec::new([name])
    }
}

impl From<String> for KeySpec {
    fn from(name: String) -> Self {
        KeySpec { names: vec![name] }
    }
}

impl From<&String> for KeySpec {
    fn from(name: &String) -> Self {
        KeySpec::new([name])
    }
}

impl<S: AsRef<str>> From<Vec<S>> for KeySpec {
    fn from(names: Vec<S>) -> Self {
        KeySpec::new(names)
    }
}

impl<S: AsRef<str>> From<&Vec<S>> for KeySpec {
    fn from(names: &Vec<S>) -> Self {
        KeySpec::new(names)
    }
}

impl<S: AsRef<str>> From<&[S]> for KeySpec {
    fn from(names: &[S]) -> Self {
        KeySpec::new(names)
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for KeySpec {
    fn from(names: [S; N]) -> Self {
        KeySpec::new(names)
    }
}

/// Collapse duplicates, keeping the first occurrence of each name.
pub fn dedup_ordered<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().unique().collect()
}

/// Members of `names` that are also in `columns`, in the order of `names`.
pub fn intersect_ordered<S: AsRef<str>>(names: &[String], columns: &[S]) -> Vec<String> {
    let present: HashSet<&str> = columns.iter().map(|c| c.as_ref()).collect();
    names
        .iter()
        .filter(|n| present.contains(n.as_str()))
        .cloned()
        .collect()
}

/// `a` followed by the names of `b` not already in `a`.
pub fn union_ordered(a: &[String], b: &[String]) -> Vec<String> {
    dedup_ordered(a.iter().chain(b.iter()).cloned())
}

/// Set intersection of two keys, reported in the order of `a`.
pub fn intersect_sets(a: &[String], b: &[String]) -> Vec<String> {
    intersect_ordered(a, b)
}

/// True when both keys name the same set of columns.
pub fn same_set(a: &[String], b: &[String]) -> bool {
    let left: HashSet<&str> = a.iter().map(String::as_str).collect();
    let right: HashSet<&str> = b.iter().map(String::as_str).collect();
    left == right
}
