/// Activity sets: which assay columns are active at a peak
///
/// Serialized in the 7th BED column as ascending comma-separated indices,
/// or `.` when no assay is active.
use anyhow::{bail, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Set of assay column indices active at a peak
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySet(BTreeSet<usize>);

impl ActivitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activity set holding a single assay index
    pub fn single(index: usize) -> Self {
        let mut set = BTreeSet::new();
        set.insert(index);
        ActivitySet(set)
    }

    /// Parse a column value: `.` for none, otherwise `i,j,k` with an optional trailing comma
    pub fn parse(act_cs: &str) -> Result<Self> {
        let mut tokens: Vec<&str> = act_cs.trim().split(',').map(str::trim).collect();
        if tokens.len() > 1 && tokens.last() == Some(&"") {
            tokens.pop();
        }

        if tokens == ["."] {
            return Ok(ActivitySet::new());
        }

        let mut set = BTreeSet::new();
        for token in tokens {
            match token.parse::<usize>() {
                Ok(index) => {
                    set.insert(index);
                }
                Err(_) => bail!("Invalid activity index '{}' in '{}'", token, act_cs),
            }
        }
        Ok(ActivitySet(set))
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    /// Add every index of `other` to this set
    pub fn union_with(&mut self, other: &ActivitySet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Largest index, if any
    pub fn max_index(&self) -> Option<usize> {
        self.0.last().copied()
    }
}

impl FromStr for ActivitySet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ActivitySet::parse(s)
    }
}

impl FromIterator<usize> for ActivitySet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        ActivitySet(iter.into_iter().collect())
    }
}

impl fmt::Display for ActivitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}
