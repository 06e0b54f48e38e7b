use crate::{
    concept::{Instance, TyParam},
    diagnostics::Diagnostic,
    subst::Subst,
    ty::Ty,
};

/// An instance whose own parameters have been renamed to fresh variables for
/// one resolution attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instantiated {
    pub source: Instance,
    /// Fresh copies of the instance's parameters. Empty for given witnesses.
    pub params: Vec<TyParam>,
    /// Declared concepts over the fresh parameters (not yet unified).
    pub provides: Vec<Ty>,
    /// The instance as a type over the fresh parameters.
    pub ty: Ty,
}

impl Instantiated {
    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn is_given(&self) -> bool {
        self.source.is_given()
    }
}

/// An instance that survived so far, with the type it stands at and the
/// substitution that made it fit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viable {
    pub instance: Instantiated,
    pub ty: Ty,
    pub subst: Subst,
}

impl Viable {
    pub fn name(&self) -> &str {
        self.instance.name()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidate {
    Viable(Viable),
    Rejected {
        instance: Option<String>,
        diagnostics: Vec<Diagnostic>,
    },
}

impl Candidate {
    pub fn rejected(instance: &str, diagnostics: Vec<Diagnostic>) -> Candidate {
        Candidate::Rejected {
            instance: Some(instance.to_string()),
            diagnostics,
        }
    }

    pub fn is_viable(&self) -> bool {
        matches!(self, Candidate::Viable(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Candidate::Viable(viable) => Some(viable.name()),
            Candidate::Rejected { instance, .. } => instance.as_deref(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Candidate::Viable(_) => &[],
            Candidate::Rejected { diagnostics, .. } => diagnostics,
        }
    }

    pub fn into_result(self) -> Result<Viable, Vec<Diagnostic>> {
        match self {
            Candidate::Viable(viable) => Ok(viable),
            Candidate::Rejected { diagnostics, .. } => Err(diagnostics),
        }
    }
}
