use std::fmt;

use comet_core::GeneSet;
use serde::{Deserialize, Serialize};

/// Order-independent identity of a collection of gene sets.
///
/// Genes are sorted within each set and joined with `,`; the per-set strings
/// are then sorted and joined with a single space. The key depends only on
/// content, never on hash seeds or emission order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Builds the key from gene sets.
    pub fn from_sets<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a GeneSet>,
    {
        Self::from_groups(sets.into_iter().map(|set| set.iter()))
    }

    /// Builds the key from arbitrary groups of gene names, in any order.
    pub fn from_groups<I, G, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rendered: Vec<String> = groups
            .into_iter()
            .map(|group| {
                let mut genes: Vec<String> =
                    group.into_iter().map(|gene| gene.as_ref().to_string()).collect();
                genes.sort();
                genes.join(",")
            })
            .collect();
        rendered.sort();
        Self(rendered.join(" "))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
