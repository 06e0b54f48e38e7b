mod parser;
mod ty;
mod var;

pub use parser::TyParser;
pub use ty::Ty;
pub use var::{FreshVarAllocator, TyVar, FRESH_PREFIX};
