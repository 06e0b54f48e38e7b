//! Deciding how a concept method call on a resolved witness is emitted.
use crate::{env::ConceptModel, ty::Ty, ty::TyVar};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The instance implements the method itself.
    DirectCall { instance: Ty, method: String },
    /// The witness is a parameter of the enclosing scope; call through it.
    ForwardToReceiverMethod { witness: TyVar, method: String },
    /// The instance relies on a default body declared by `concept`.
    ForwardToDefaultStruct {
        concept: Ty,
        witness: Ty,
        method: String,
    },
}

impl std::fmt::Display for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dispatch::DirectCall { instance, method } => write!(f, "{}::{}", instance, method),
            Dispatch::ForwardToReceiverMethod { witness, method } => {
                write!(f, "{}.{}", witness, method)
            }
            Dispatch::ForwardToDefaultStruct {
                concept,
                witness,
                method,
            } => write!(f, "{}::default::{}<{}>", concept, method, witness),
        }
    }
}

/// Plan the call of `method` from `concept` on `witness`.
///
/// Returns `None` when neither the witness nor any concept in the
/// superconcept closure of `concept` supplies the method.
pub fn plan<E: ConceptModel>(env: &E, witness: &Ty, concept: &Ty, method: &str) -> Option<Dispatch> {
    let mut concepts = vec![concept.clone()];
    concepts.extend(env.super_closure(concept));

    let declares = |c: &Ty| {
        c.head()
            .and_then(|name| env.concept_def(name))
            .map(|def| def.methods.iter().any(|m| m == method))
            .unwrap_or(false)
    };

    if let Ty::Var(var) = witness {
        if !concepts.iter().any(declares) {
            log::debug!("[plan] no concept in {} declares `{}`", concept, method);
            return None;
        }
        return Some(Dispatch::ForwardToReceiverMethod {
            witness: var.clone(),
            method: method.to_string(),
        });
    }

    if let Some(def) = witness.head().and_then(|name| env.instance_def(name)) {
        if def.methods.iter().any(|m| m == method) {
            return Some(Dispatch::DirectCall {
                instance: witness.clone(),
                method: method.to_string(),
            });
        }
    }

    let owner = concepts.into_iter().find(|c| {
        c.head()
            .and_then(|name| env.concept_def(name))
            .map(|def| def.defaults.iter().any(|m| m == method))
            .unwrap_or(false)
    })?;

    Some(Dispatch::ForwardToDefaultStruct {
        concept: owner,
        witness: witness.clone(),
        method: method.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{plan, Dispatch};
    use crate::{
        concept::{ConceptDef, InstanceDef},
        env::GlobalEnv,
        ty::{Ty, TyParser, TyVar},
    };

    fn ty(src: &str) -> Ty {
        TyParser::parse(src).unwrap()
    }

    fn env() -> GlobalEnv {
        let mut env = GlobalEnv::new();
        env.add_concept(
            ConceptDef::new("Eq", vec![TyVar::new("'a")]).with_methods(&["eq", "ne"], &["ne"]),
        );
        env.add_concept(
            ConceptDef::new("Ord", vec![TyVar::new("'a")])
                .with_supers(vec![ty("Eq['a]")])
                .with_methods(&["lt"], &[]),
        );
        env.add_instance(
            InstanceDef::new("IntOrd", vec![], vec![ty("Ord[int]")]).with_methods(&["eq", "lt"]),
        );
        env
    }

    #[test]
    fn instance_methods_are_called_directly() {
        let env = env();
        assert_eq!(
            plan(&env, &ty("IntOrd"), &ty("Ord[int]"), "lt"),
            Some(Dispatch::DirectCall {
                instance: ty("IntOrd"),
                method: str!("lt")
            })
        );
    }

    #[test]
    fn defaults_come_from_the_declaring_superconcept() {
        let env = env();
        let dispatch = plan(&env, &ty("IntOrd"), &ty("Ord[int]"), "ne");
        assert_eq!(
            dispatch,
            Some(Dispatch::ForwardToDefaultStruct {
                concept: ty("Eq[int]"),
                witness: ty("IntOrd"),
                method: str!("ne")
            })
        );
        assert_eq!(
            dispatch.map(|d| d.to_string()),
            Some(str!("Eq[int]::default::ne<IntOrd>"))
        );
    }

    #[test]
    fn given_witnesses_forward_to_the_receiver() {
        let env = env();
        assert_eq!(
            plan(&env, &ty("'w"), &ty("Ord['t]"), "eq"),
            Some(Dispatch::ForwardToReceiverMethod {
                witness: TyVar::new("'w"),
                method: str!("eq")
            })
        );
        assert_eq!(plan(&env, &ty("'w"), &ty("Ord['t]"), "hash"), None);
    }

    #[test]
    fn unknown_methods_have_no_plan() {
        let env = env();
        assert_eq!(plan(&env, &ty("IntOrd"), &ty("Ord[int]"), "hash"), None);
    }
}
