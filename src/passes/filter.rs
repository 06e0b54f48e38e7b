use crate::{
    candidate::{Instantiated, Viable},
    env::ConceptModel,
    resolver::Resolver,
    subst::{Subst, Substitutable},
    ty::Ty,
    unify::unify,
};

impl<'a, E: ConceptModel> Resolver<'a, E> {
    /// Pass 1: every pool instance that provides (directly or through a
    /// superconcept) something unifying with each required concept.
    ///
    /// The unifier is threaded through the required concepts in order; for
    /// each one the first provided concept that unifies is taken.
    pub fn filter(&mut self, required: &[Ty]) -> Vec<Viable> {
        let pool = self.pool;
        let mut viable = vec![];
        for instance in pool.instances() {
            let instance = self.instantiate(instance);
            let Some(subst) = self.match_required(&instance, required) else {
                continue;
            };

            let ty = instance.ty.clone().with_subst(&subst);
            log::debug!("[filter] `{}` fits as {} with {}", instance.name(), ty, subst);
            viable.push(Viable { instance, ty, subst });
        }
        viable
    }

    fn match_required(&self, instance: &Instantiated, required: &[Ty]) -> Option<Subst> {
        let provided = self.env.expand(&instance.provides);
        let mut subst = Subst::new();
        for concept in required {
            subst = provided
                .iter()
                .find_map(|p| unify(p, concept, &subst, self.pool.bound()).ok())?;
        }
        Some(subst)
    }

    /// The first required concept that no pool instance can provide on its
    /// own, if any.
    pub(crate) fn blame(&mut self, required: &[Ty]) -> Option<Ty> {
        let pool = self.pool;
        for concept in required {
            let mut provided = false;
            for instance in pool.instances() {
                let instance = self.instantiate(instance);
                if self
                    .match_required(&instance, std::slice::from_ref(concept))
                    .is_some()
                {
                    provided = true;
                    break;
                }
            }

            if !provided {
                return Some(concept.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        concept::{ConceptDef, InstanceDef, TyParam},
        env::GlobalEnv,
        pool::InstancePool,
        resolver::Resolver,
        ty::{Ty, TyParser, TyVar},
    };

    fn ty(src: &str) -> Ty {
        TyParser::parse(src).unwrap()
    }

    fn env() -> GlobalEnv {
        let mut env = GlobalEnv::new();
        env.add_concept(ConceptDef::new("Eq", vec![TyVar::new("'a")]));
        env.add_concept(
            ConceptDef::new("Ord", vec![TyVar::new("'a")]).with_supers(vec![ty("Eq['a]")]),
        );
        env.add_instance(InstanceDef::new("IntOrd", vec![], vec![ty("Ord[int]")]));
        env.add_instance(InstanceDef::new("BoolEq", vec![], vec![ty("Eq[bool]")]));
        env.add_instance(InstanceDef::new(
            "ListEq",
            vec![
                TyParam::associated("'t"),
                TyParam::witness("'w", vec![ty("Eq['t]")]),
            ],
            vec![ty("Eq[list['t]]")],
        ));
        env
    }

    #[test]
    fn keeps_instances_providing_every_concept() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);

        let names = |v: Vec<crate::candidate::Viable>| {
            v.iter().map(|c| c.name().to_string()).collect::<Vec<_>>()
        };

        // found through the superconcept of `Ord[int]`
        assert_eq!(names(resolver.filter(&[ty("Eq[int]")])), vec!["IntOrd"]);
        assert_eq!(
            names(resolver.filter(&[ty("Eq[int]"), ty("Ord[int]")])),
            vec!["IntOrd"]
        );
        assert!(resolver.filter(&[ty("Eq[int]"), ty("Eq[bool]")]).is_empty());
    }

    #[test]
    fn unifier_binds_fresh_instance_params() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);

        let found = resolver.filter(&[ty("Eq[list[bool]]")]);
        assert_eq!(found.len(), 1);
        let list_eq = &found[0];
        assert_eq!(list_eq.name(), "ListEq");
        assert_eq!(list_eq.ty.type_arguments()[0], Ty::bool());
        assert!(list_eq.ty.type_arguments()[1].is_tyvar());
    }

    #[test]
    fn blames_the_concept_nobody_provides() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);
        assert_eq!(
            resolver.blame(&[ty("Eq[int]"), ty("Show[int]")]),
            Some(ty("Show[int]"))
        );
        assert_eq!(resolver.blame(&[ty("Eq[int]"), ty("Eq[bool]")]), None);
    }

    #[test]
    fn given_witnesses_match_bound_params() {
        let env = env();
        let scope = vec![
            TyParam::ordinary("'s"),
            TyParam::witness("'e", vec![ty("Ord['s]")]),
        ];
        let pool = InstancePool::for_scope(&env, &scope);
        let mut resolver = Resolver::new(&env, &pool);

        let found = resolver.filter(&[ty("Eq['s]")]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ty, ty("'e"));

        // `'s` is bound, so the given cannot stand in for `Eq[int]`
        let found = resolver.filter(&[ty("Eq[int]")]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "IntOrd");
    }
}
