pub const FRESH_PREFIX: &'static str = "?";

/// Allocator for the fresh variables that stand in for an instance's own
/// type parameters while it is being considered as a candidate.
///
/// Every resolution attempt owns one allocator, so two candidates built from
/// the same generic instance never share parameter names.
#[derive(Debug, Default)]
pub struct FreshVarAllocator {
    next_id: u32,
}

impl FreshVarAllocator {
    pub fn new() -> Self {
        FreshVarAllocator { next_id: 0 }
    }

    /// Mint a fresh variable named after `hint` (e.g. `'t` becomes `?t3`).
    pub fn alloc(&mut self, hint: &TyVar) -> TyVar {
        let base = hint
            .name()
            .trim_start_matches(|c| c == '\'' || c == '?')
            .trim_end_matches(|c: char| c.is_ascii_digit());
        let name = format!("{}{}{}", FRESH_PREFIX, base, self.next_id);
        self.next_id += 1;
        TyVar::new(name)
    }

    pub fn curr_id(&self) -> u32 {
        self.next_id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TyVar(pub String);

impl TyVar {
    pub fn new<S: Into<String>>(name: S) -> TyVar {
        TyVar(name.into())
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns true if this variable was minted by a `FreshVarAllocator`.
    pub fn is_fresh(&self) -> bool {
        self.0.starts_with(FRESH_PREFIX)
    }

    /// Returns true if this is a user-written type variable (e.g. `'a`).
    pub fn is_user_var(&self) -> bool {
        self.0.starts_with('\'')
    }
}

impl std::fmt::Display for TyVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TyVar {
    fn from(value: &str) -> Self {
        TyVar(value.to_string())
    }
}

impl From<String> for TyVar {
    fn from(value: String) -> Self {
        TyVar(value)
    }
}
