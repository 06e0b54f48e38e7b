/// Options controlling witness resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum number of instances nested inside one another while checking
    /// that a candidate's own witnesses can be found.
    pub max_depth: usize,
    /// When false, the tie-breaker that prefers instances whose witness
    /// parameters mention more of their type arguments is skipped.
    pub mention_heuristic: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            max_depth: 32,
            mention_heuristic: true,
        }
    }
}
