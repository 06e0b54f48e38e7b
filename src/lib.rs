#[macro_use]
mod macros;

pub mod candidate;
pub mod chain;
pub mod cli;
pub mod concept;
pub mod diagnostics;
pub mod dispatch;
pub mod env;
pub mod errors;
pub mod logger;
pub mod options;
pub mod passes;
pub mod pool;
pub mod program;
pub mod required;
pub mod resolver;
pub mod subst;
pub mod ty;
pub mod unify;

pub use candidate::{Candidate, Viable};
pub use chain::Chain;
pub use concept::{ConceptDef, Instance, InstanceDef, Overlap, ParamKind, TyParam};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use env::{ConceptModel, GlobalEnv};
pub use options::ResolveOptions;
pub use pool::InstancePool;
pub use resolver::{interleave, Resolver};
pub use subst::{Subst, Substitutable};
pub use ty::{Ty, TyParser, TyVar};
