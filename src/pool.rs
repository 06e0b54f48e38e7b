use fnv::FnvHashSet;

use crate::{
    concept::{Instance, TyParam},
    env::ConceptModel,
    ty::TyVar,
};

/// The instances eligible at a use site, plus the type parameters bound there.
///
/// A pool is immutable once built, so a single pool can back any number of
/// concurrent resolutions.
#[derive(Clone, Debug, Default)]
pub struct InstancePool {
    instances: Vec<Instance>,
    givens: Vec<TyParam>,
    bound: FnvHashSet<TyVar>,
}

impl InstancePool {
    pub fn new() -> InstancePool {
        InstancePool::default()
    }

    /// Build the pool for a scope: the witness parameters of `scope` come
    /// first, followed by every named instance of `env`. Every parameter of
    /// `scope` is bound.
    pub fn for_scope<E: ConceptModel>(env: &E, scope: &[TyParam]) -> InstancePool {
        let mut pool = InstancePool::new();
        for param in scope {
            pool.bind(param.var.clone());
            if param.is_witness() {
                pool.push(Instance::Given(param.clone()));
            }
        }

        for def in env.instances() {
            pool.push(Instance::Named(def.clone()));
        }

        log::debug!(
            "[for_scope] {} instance(s), bound = {:?}",
            pool.instances.len(),
            pool.bound
        );
        pool
    }

    /// Add an instance unless one with the same name is already present.
    pub fn push(&mut self, instance: Instance) {
        if self.instances.iter().any(|i| i.name() == instance.name()) {
            log::debug!("[push] skipping duplicate instance `{}`", instance.name());
            return;
        }

        if let Instance::Given(param) = &instance {
            self.givens.push(param.clone());
        }
        self.instances.push(instance);
    }

    pub fn bind(&mut self, var: TyVar) {
        self.bound.insert(var);
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// The explicit witness parameters in scope.
    pub fn givens(&self) -> &[TyParam] {
        &self.givens
    }

    pub fn bound(&self) -> &FnvHashSet<TyVar> {
        &self.bound
    }

    pub fn is_bound(&self, var: &TyVar) -> bool {
        self.bound.contains(var)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::InstancePool;
    use crate::{
        concept::{Instance, InstanceDef, TyParam},
        env::GlobalEnv,
        ty::{Ty, TyParser, TyVar},
    };

    fn ty(src: &str) -> Ty {
        TyParser::parse(src).unwrap()
    }

    #[test]
    fn scope_givens_come_first_and_are_bound() {
        let mut env = GlobalEnv::new();
        env.add_instance(InstanceDef::new("IntEq", vec![], vec![ty("Eq[int]")]));

        let scope = vec![
            TyParam::ordinary("'s"),
            TyParam::witness("'e", vec![ty("Eq['s]")]),
        ];
        let pool = InstancePool::for_scope(&env, &scope);

        let names = pool.instances().iter().map(Instance::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["'e", "IntEq"]);
        assert!(pool.is_bound(&TyVar::new("'s")));
        assert!(pool.is_bound(&TyVar::new("'e")));
        assert_eq!(pool.givens().len(), 1);
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut pool = InstancePool::new();
        let int_eq = InstanceDef::new("IntEq", vec![], vec![ty("Eq[int]")]);
        pool.push(Instance::Named(int_eq.clone()));
        pool.push(Instance::Named(int_eq));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn pools_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InstancePool>();
    }
}
