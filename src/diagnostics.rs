use crate::{chain::Chain, ty::Ty};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// No instance satisfies the concept.
    Unsatisfiable(Ty),
    /// More than one instance satisfies the concept and none is preferred.
    Ambiguous(Ty, Vec<String>),
}

/// A resolution failure, reported against a concept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Instances being resolved (outermost first) when this was produced.
    pub chain: Vec<String>,
}

impl Diagnostic {
    pub fn unsatisfiable(concept: Ty, chain: &Chain) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Unsatisfiable(concept),
            chain: chain.names(),
        }
    }

    pub fn ambiguous(concept: Ty, candidates: Vec<String>, chain: &Chain) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Ambiguous(concept, candidates),
            chain: chain.names(),
        }
    }

    pub fn concept(&self) -> &Ty {
        match &self.kind {
            DiagnosticKind::Unsatisfiable(concept) | DiagnosticKind::Ambiguous(concept, _) => {
                concept
            }
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Ambiguous(_, _))
    }

    pub fn message(&self) -> String {
        let msg = match &self.kind {
            DiagnosticKind::Unsatisfiable(concept) => {
                format!("no instance satisfies `{}`", concept)
            }
            DiagnosticKind::Ambiguous(concept, candidates) => {
                let names = candidates
                    .iter()
                    .map(|c| format!("`{}`", c))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("ambiguous instances for `{}`: {}", concept, names)
            }
        };

        match self.chain.last() {
            Some(inner) => format!("{} (required by `{}`)", msg, inner),
            None => msg,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}
