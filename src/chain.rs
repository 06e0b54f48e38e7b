use std::collections::HashMap;

use crate::{
    subst::{Subst, Substitutable},
    ty::{Ty, TyVar},
};

/// One instance being resolved, with the concepts it was entered to provide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChainEntry {
    pub instance: String,
    pub goal: Vec<Ty>,
}

impl ChainEntry {
    pub fn new(instance: &str, goal: &[Ty]) -> ChainEntry {
        ChainEntry {
            instance: instance.to_string(),
            goal: canonical_goal(goal),
        }
    }
}

impl std::fmt::Display for ChainEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let goal = self
            .goal
            .iter()
            .map(Ty::to_string)
            .collect::<Vec<_>>()
            .join(" + ");
        write!(f, "{}@{}", self.instance, goal)
    }
}

/// The instances currently being resolved, outermost first.
///
/// Each resolution attempt owns its chain: `push` returns an extended copy and
/// leaves the receiver untouched, so sibling candidates never observe each
/// other's entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chain {
    entries: Vec<ChainEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainError {
    /// The instance is already being resolved for the same goal further out.
    Cycle(String),
    /// Nesting would exceed the configured maximum depth.
    TooDeep(usize),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::Cycle(entry) => write!(f, "`{}` is already being resolved", entry),
            ChainError::TooDeep(max) => write!(f, "instance nesting exceeds {} levels", max),
        }
    }
}

// Rename fresh variables by order of first appearance so that two attempts at
// the same goal compare equal regardless of allocator state.
fn canonical_goal(goal: &[Ty]) -> Vec<Ty> {
    let mut names: HashMap<TyVar, Ty> = HashMap::new();
    for ty in goal {
        for var in ty.unique_free_vars() {
            if var.is_fresh() && !names.contains_key(&var) {
                let canon = Ty::var(format!("?{}", names.len()));
                names.insert(var, canon);
            }
        }
    }
    let rename = names.into_iter().collect::<Subst>();
    goal.to_vec().with_subst(&rename)
}

impl Chain {
    pub fn new() -> Chain {
        Chain::default()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Instance names, outermost first.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.instance.clone()).collect()
    }

    pub fn push(&self, instance: &str, goal: &[Ty], max_depth: usize) -> Result<Chain, ChainError> {
        self.push_entry(ChainEntry::new(instance, goal), max_depth)
    }

    pub fn push_entry(&self, entry: ChainEntry, max_depth: usize) -> Result<Chain, ChainError> {
        if self.entries.contains(&entry) {
            return Err(ChainError::Cycle(entry.to_string()));
        }

        if self.depth() >= max_depth {
            return Err(ChainError::TooDeep(max_depth));
        }

        let mut entries = self.entries.clone();
        entries.push(entry);
        Ok(Chain { entries })
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        write!(f, "[{}]", parts)
    }
}
