// Declarations the resolver consults: concepts, instances and the concepts
// ordinary types declare directly.

use std::collections::HashMap;

use fnv::FnvHashSet;

use crate::{
    concept::{ConceptDef, InstanceDef, TyParam},
    subst::{Subst, Substitutable},
    ty::{Ty, TyVar},
    unify::unify,
};

/// Read-only view of the declarations in a program.
///
/// Only the required methods need to be provided by a host; the super-concept
/// closure and the "which concepts does this type satisfy" queries are derived
/// from them.
pub trait ConceptModel {
    fn concept_def(&self, name: &str) -> Option<&ConceptDef>;

    fn instance_def(&self, name: &str) -> Option<&InstanceDef>;

    /// All named instances, in declaration order.
    fn instances(&self) -> Vec<&InstanceDef>;

    /// Concepts an ordinary (non-instance) type declares it satisfies.
    fn declared_concepts(&self, ty: &Ty) -> Vec<Ty>;

    /// Every superconcept implied by `concept`, transitively, excluding
    /// `concept` itself.
    fn super_closure(&self, concept: &Ty) -> Vec<Ty> {
        let mut out = vec![];
        let mut seen = FnvHashSet::default();
        seen.insert(concept.clone());
        let mut stack = vec![concept.clone()];
        while let Some(curr) = stack.pop() {
            let Some(def) = curr.head().and_then(|name| self.concept_def(name)) else {
                continue;
            };

            for sup in def.supers_of(&curr) {
                if seen.insert(sup.clone()) {
                    out.push(sup.clone());
                    stack.push(sup);
                }
            }
        }
        out
    }

    /// `concepts` together with all of their superconcepts, deduplicated,
    /// first occurrence first.
    fn expand(&self, concepts: &[Ty]) -> Vec<Ty> {
        let mut seen = FnvHashSet::default();
        let mut out = vec![];
        for concept in concepts {
            if seen.insert(concept.clone()) {
                out.push(concept.clone());
            }
            for sup in self.super_closure(concept) {
                if seen.insert(sup.clone()) {
                    out.push(sup);
                }
            }
        }
        out
    }

    /// Returns true if satisfying `sub` already satisfies `sup`.
    fn implies(&self, sub: &Ty, sup: &Ty) -> bool {
        self.super_closure(sub).iter().any(|c| c == sup)
    }

    /// The concepts `ty` is known to satisfy. Witness parameters in `givens`
    /// satisfy their constraints, instance types satisfy what their instance
    /// provides, and any other type satisfies what it declares.
    fn concepts_of(&self, ty: &Ty, givens: &[TyParam]) -> Vec<Ty> {
        if let Ty::Var(var) = ty {
            return givens
                .iter()
                .find(|param| &param.var == var)
                .map(|param| self.expand(&param.constraints))
                .unwrap_or_default();
        }

        if let Some(def) = ty.head().and_then(|name| self.instance_def(name)) {
            return self.expand(&def.provides_at(ty));
        }

        self.expand(&self.declared_concepts(ty))
    }

    fn satisfies(&self, ty: &Ty, concept: &Ty, givens: &[TyParam]) -> bool {
        self.concepts_of(ty, givens).iter().any(|c| c == concept)
    }
}

#[derive(Clone, Debug, Default)]
pub struct GlobalEnv {
    pub concepts: HashMap<String, ConceptDef>,
    pub instances: Vec<InstanceDef>,
    instance_index: HashMap<String, usize>,
    /// `(type pattern, concept)` pairs, e.g. `(list['t], Show[list['t]])`.
    pub type_concepts: Vec<(Ty, Ty)>,
}

impl GlobalEnv {
    pub fn new() -> Self {
        GlobalEnv::default()
    }

    pub fn add_concept(&mut self, concept: ConceptDef) {
        log::debug!("[add_concept] {}", concept.ty());
        self.concepts.insert(concept.name.clone(), concept);
    }

    /// Register an instance. A later instance with the same name replaces the
    /// earlier one in place.
    pub fn add_instance(&mut self, instance: InstanceDef) {
        log::debug!(
            "[add_instance] name = {}, provides = {:?}",
            instance.name,
            instance.provides.iter().map(Ty::to_string).collect::<Vec<_>>()
        );
        if let Some(&idx) = self.instance_index.get(&instance.name) {
            self.instances[idx] = instance;
        } else {
            self.instance_index
                .insert(instance.name.clone(), self.instances.len());
            self.instances.push(instance);
        }
    }

    /// Declare that types matching `pattern` satisfy `concept`.
    pub fn add_type_concept(&mut self, pattern: Ty, concept: Ty) {
        self.type_concepts.push((pattern, concept));
    }
}

impl ConceptModel for GlobalEnv {
    fn concept_def(&self, name: &str) -> Option<&ConceptDef> {
        self.concepts.get(name)
    }

    fn instance_def(&self, name: &str) -> Option<&InstanceDef> {
        self.instance_index
            .get(name)
            .and_then(|&idx| self.instances.get(idx))
    }

    fn instances(&self) -> Vec<&InstanceDef> {
        self.instances.iter().collect()
    }

    fn declared_concepts(&self, ty: &Ty) -> Vec<Ty> {
        let rigid = ty.free_vars().into_iter().cloned().collect::<FnvHashSet<TyVar>>();
        self.type_concepts
            .iter()
            .filter_map(|(pattern, concept)| {
                unify(pattern, ty, &Subst::new(), &rigid)
                    .ok()
                    .map(|subst| concept.clone().with_subst(&subst))
            })
            .collect()
    }
}
