//! Fixed-point witness inference.
//!
//! `Resolver::infer` fills in the witness (and associated) parameters of a
//! generic call site. Each unresolved witness is solved by running its
//! required concepts through three passes:
//!
//! 1. `filter`: instances whose provided concepts unify with every required
//!    concept.
//! 2. `satisfy`: of those, instances whose own witness parameters can be
//!    resolved in turn (recursively, through `infer`).
//! 3. `tie_break`: overlap-aware preference among the survivors.
//!
//! A witness that cannot be resolved yet is retried after its siblings, whose
//! solutions may fix more of its type arguments.
use fnv::FnvHashMap;

use crate::{
    candidate::{Candidate, Instantiated, Viable},
    chain::{Chain, ChainEntry},
    concept::{Instance, ParamKind, TyParam},
    diagnostics::Diagnostic,
    env::ConceptModel,
    options::ResolveOptions,
    pool::InstancePool,
    required::required_concepts,
    subst::{Subst, Substitutable},
    ty::{FreshVarAllocator, Ty},
};

/// A failed attempt at an instance for one goal, and the chain depth it was
/// made at.
#[derive(Clone, Debug)]
pub(crate) struct FailedGoal {
    pub(crate) depth: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

pub struct Resolver<'a, E: ConceptModel> {
    pub(crate) env: &'a E,
    pub(crate) pool: &'a InstancePool,
    pub(crate) options: ResolveOptions,
    pub(crate) failed: FnvHashMap<ChainEntry, FailedGoal>,
    /// Cycles rejected so far; a failure that saw one is not remembered.
    pub(crate) cycles: usize,
    vars: FreshVarAllocator,
}

impl<'a, E: ConceptModel> Resolver<'a, E> {
    pub fn new(env: &'a E, pool: &'a InstancePool) -> Resolver<'a, E> {
        Resolver::with_options(env, pool, ResolveOptions::default())
    }

    pub fn with_options(
        env: &'a E,
        pool: &'a InstancePool,
        options: ResolveOptions,
    ) -> Resolver<'a, E> {
        Resolver {
            env,
            pool,
            options,
            failed: FnvHashMap::default(),
            cycles: 0,
            vars: FreshVarAllocator::new(),
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// An argument is fixed when it is present and is not a type parameter
    /// that is free at the use site.
    pub(crate) fn is_fixed(&self, arg: Option<&Ty>) -> bool {
        match arg {
            None => false,
            Some(Ty::Var(var)) => self.pool.is_bound(var),
            Some(_) => true,
        }
    }

    /// Rename an instance's parameters to fresh variables.
    pub(crate) fn instantiate(&mut self, instance: &Instance) -> Instantiated {
        match instance {
            Instance::Given(param) => Instantiated {
                source: instance.clone(),
                params: vec![],
                provides: param.constraints.clone(),
                ty: param.ty(),
            },
            Instance::Named(def) => {
                let rename = def
                    .params
                    .iter()
                    .map(|p| (p.var.clone(), Ty::Var(self.vars.alloc(&p.var))))
                    .collect::<Subst>();

                let params = def
                    .params
                    .iter()
                    .map(|p| TyParam {
                        var: p.var.clone().with_subst(&rename),
                        kind: p.kind,
                        constraints: p.constraints.clone().with_subst(&rename),
                    })
                    .collect();

                Instantiated {
                    source: instance.clone(),
                    params,
                    provides: def.provides.clone().with_subst(&rename),
                    ty: def.ty().with_subst(&rename),
                }
            }
        }
    }

    /// Infer the unfixed witness and associated parameters of `params`.
    ///
    /// `args` holds one entry per parameter; `None` (or a free type
    /// parameter) marks an argument to infer. Every ordinary parameter must be
    /// fixed. On success the returned substitution extends `seed` and maps
    /// every witness parameter to an instance type. On failure the
    /// diagnostics of the last round are returned (possibly none).
    pub fn infer(
        &mut self,
        params: &[TyParam],
        args: &[Option<Ty>],
        seed: &Subst,
        chain: &Chain,
    ) -> Result<Subst, Vec<Diagnostic>> {
        if params.len() != args.len() {
            log::debug!(
                "[infer] expected {} argument(s), found {}",
                params.len(),
                args.len()
            );
            return Err(vec![]);
        }

        let mut subst = seed.clone();
        let mut witnesses = vec![];
        let mut associated = vec![];
        for (param, arg) in params.iter().zip(args.iter()) {
            let arg = arg
                .clone()
                .map(|ty| ty.with_subst(&subst))
                .or_else(|| subst.get(&param.var).cloned());

            if self.is_fixed(arg.as_ref()) {
                if let Some(ty) = arg {
                    if subst.get(&param.var) != Some(&ty) {
                        subst = Subst::compose(&Subst::single(param.var.clone(), ty), &subst);
                    }
                }
                continue;
            }

            match param.kind {
                ParamKind::Witness => witnesses.push(param),
                ParamKind::Associated => associated.push(param),
                ParamKind::Ordinary => {
                    log::debug!("[infer] ordinary parameter `{}` is not fixed", param.var);
                    return Err(vec![]);
                }
            }
        }

        log::debug!(
            "[infer] {} witness(es) to resolve, chain = {}, subst = {}",
            witnesses.len(),
            chain,
            subst
        );

        let mut diagnostics = vec![];
        while !witnesses.is_empty() {
            let mut progressed = false;
            let mut pending = vec![];
            diagnostics.clear();

            for param in witnesses {
                // may have been fixed as a side effect of a sibling
                if self.is_fixed(subst.get(&param.var)) {
                    continue;
                }

                let required = required_concepts(self.env, param, &subst);
                if required.is_empty() {
                    pending.push(param);
                    continue;
                }

                match self.resolve(&required, chain) {
                    Ok(viable) => {
                        log::debug!("[infer] {} := {}", param.var, viable.ty);
                        subst = Self::fold(subst, param, viable);
                        progressed = true;
                    }
                    Err(diags) => {
                        diagnostics.extend(diags);
                        pending.push(param);
                    }
                }
            }

            witnesses = pending;
            if !witnesses.is_empty() && !progressed {
                log::debug!(
                    "[infer] no progress, {} witness(es) unresolved",
                    witnesses.len()
                );
                return Err(diagnostics);
            }
        }

        for param in associated {
            if subst.lookup(&param.var) == param.ty() {
                log::debug!("[infer] associated parameter `{}` is undetermined", param.var);
                return Err(diagnostics);
            }
        }

        Ok(subst)
    }

    // subst' = unifier . {W: ty} . subst
    fn fold(subst: Subst, param: &TyParam, viable: Viable) -> Subst {
        let mut binding = Subst::single(param.var.clone(), viable.ty.clone());
        if let Some(Ty::Var(alias)) = subst.get(&param.var) {
            binding.insert(alias.clone(), viable.ty.clone());
        }
        Subst::compose(&viable.subst, &Subst::compose(&binding, &subst))
    }

    /// Resolve a single set of required concepts, returning the chosen
    /// instance with `seed` folded into its substitution.
    pub fn infer_one(&mut self, required: &[Ty], seed: &Subst, chain: &Chain) -> Candidate {
        let required = required.to_vec().with_subst(seed);
        match self.resolve(&required, chain) {
            Ok(mut viable) => {
                viable.subst = Subst::compose(&viable.subst, seed);
                Candidate::Viable(viable)
            }
            Err(diagnostics) => Candidate::Rejected {
                instance: None,
                diagnostics,
            },
        }
    }

    /// Complete a partially supplied argument list: `supplied` gives the
    /// ordinary arguments in order, everything else is inferred.
    ///
    /// When inference fails and `expand_on_associated_failure` is set, a
    /// parameter list with associated but no witness parameters is still
    /// completed, with each associated parameter standing for itself.
    pub fn part_infer(
        &mut self,
        supplied: &[Ty],
        all_params: &[TyParam],
        expand_on_associated_failure: bool,
    ) -> Option<Vec<Ty>> {
        let args = interleave(supplied, all_params)?;
        match self.infer(all_params, &args, &Subst::new(), &Chain::new()) {
            Ok(subst) => Some(
                all_params
                    .iter()
                    .map(|param| subst.lookup(&param.var))
                    .collect(),
            ),
            Err(_) => {
                let has_witness = all_params.iter().any(|p| p.kind == ParamKind::Witness);
                let has_associated = all_params.iter().any(|p| p.kind == ParamKind::Associated);
                if !(expand_on_associated_failure && has_associated && !has_witness) {
                    return None;
                }

                Some(
                    args.into_iter()
                        .zip(all_params.iter())
                        .map(|(arg, param)| arg.unwrap_or_else(|| param.ty()))
                        .collect(),
                )
            }
        }
    }

    /// Run the three passes over `required`.
    pub fn resolve(&mut self, required: &[Ty], chain: &Chain) -> Result<Viable, Vec<Diagnostic>> {
        let Some(concept) = required.first().cloned() else {
            return Err(vec![]);
        };

        let candidates = self.filter(required);
        if candidates.is_empty() {
            let blame = self.blame(required).unwrap_or(concept);
            log::debug!("[resolve] no instance provides `{}`", blame);
            return Err(vec![Diagnostic::unsatisfiable(blame, chain)]);
        }

        let attempted = candidates.len();
        let (viable, rejected): (Vec<_>, Vec<_>) = self
            .satisfy(candidates, chain)
            .into_iter()
            .partition(Candidate::is_viable);
        let viable = viable
            .into_iter()
            .filter_map(|c| c.into_result().ok())
            .collect::<Vec<_>>();

        if viable.is_empty() {
            let mut diagnostics = vec![Diagnostic::unsatisfiable(concept, chain)];
            if attempted == 1 {
                for candidate in rejected {
                    diagnostics.extend(candidate.diagnostics().iter().cloned());
                }
            }
            return Err(diagnostics);
        }

        let mut winners = if viable.len() > 1 {
            self.tie_break(viable)
        } else {
            viable
        };

        if winners.len() > 1 {
            let names = winners.iter().map(|w| w.name().to_string()).collect();
            return Err(vec![Diagnostic::ambiguous(concept, names, chain)]);
        }

        winners.pop().ok_or_else(Vec::new)
    }
}

/// Spread `supplied` over the ordinary slots of `params`, leaving every other
/// slot empty. `None` if the counts disagree.
pub fn interleave(supplied: &[Ty], params: &[TyParam]) -> Option<Vec<Option<Ty>>> {
    let ordinary = params
        .iter()
        .filter(|p| p.kind == ParamKind::Ordinary)
        .count();
    if ordinary != supplied.len() {
        log::debug!(
            "[interleave] expected {} ordinary argument(s), found {}",
            ordinary,
            supplied.len()
        );
        return None;
    }

    let mut supplied = supplied.iter();
    Some(
        params
            .iter()
            .map(|p| match p.kind {
                ParamKind::Ordinary => supplied.next().cloned(),
                ParamKind::Witness | ParamKind::Associated => None,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::{interleave, Resolver};
    use crate::{
        candidate::Candidate,
        chain::Chain,
        concept::{ConceptDef, InstanceDef, TyParam},
        diagnostics::DiagnosticKind,
        env::GlobalEnv,
        pool::InstancePool,
        subst::Subst,
        ty::{Ty, TyParser, TyVar},
    };

    fn ty(src: &str) -> Ty {
        TyParser::parse(src).unwrap()
    }

    fn v(name: &str) -> TyVar {
        TyVar::new(name)
    }

    fn env() -> GlobalEnv {
        let mut env = GlobalEnv::new();
        env.add_concept(ConceptDef::new("Eq", vec![v("'a")]));
        env.add_concept(ConceptDef::new("Show", vec![v("'a")]));
        env.add_concept(ConceptDef::new("Container", vec![v("'c"), v("'e")]));
        env.add_instance(InstanceDef::new("IntEq", vec![], vec![ty("Eq[int]")]));
        env.add_instance(InstanceDef::new("BoolEq", vec![], vec![ty("Eq[bool]")]));
        env.add_instance(InstanceDef::new(
            "IntList",
            vec![],
            vec![ty("Container[list[int], int]")],
        ));
        env
    }

    #[test]
    fn unfixed_ordinary_parameter_fails_without_diagnostics() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);

        let params = vec![
            TyParam::ordinary("'t"),
            TyParam::witness("'w", vec![ty("Eq['t]")]),
        ];
        let result = resolver.infer(&params, &[None, None], &Subst::new(), &Chain::new());
        assert_eq!(result, Err(vec![]));

        // a free type parameter is not fixed either
        let result = resolver.infer(
            &params,
            &[Some(Ty::var("'u")), None],
            &Subst::new(),
            &Chain::new(),
        );
        assert_eq!(result, Err(vec![]));
    }

    #[test]
    fn associated_output_unblocks_a_sibling() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);

        // `'w2` is ambiguous until `'w1` pins `'e`
        let params = vec![
            TyParam::ordinary("'c"),
            TyParam::associated("'e"),
            TyParam::witness("'w2", vec![ty("Eq['e]")]),
            TyParam::witness("'w1", vec![ty("Container['c, 'e]")]),
        ];
        let subst = resolver
            .infer(
                &params,
                &[Some(ty("list[int]")), None, None, None],
                &Subst::new(),
                &Chain::new(),
            )
            .unwrap();
        assert_eq!(subst.lookup(&v("'e")), Ty::int());
        assert_eq!(subst.lookup(&v("'w1")), ty("IntList"));
        assert_eq!(subst.lookup(&v("'w2")), ty("IntEq"));
    }

    #[test]
    fn every_failing_sibling_is_diagnosed() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);

        let params = vec![
            TyParam::witness("'a", vec![ty("Eq[string]")]),
            TyParam::witness("'b", vec![ty("Show[int]")]),
            TyParam::witness("'c", vec![ty("Eq[int]")]),
        ];
        let diagnostics = resolver
            .infer(&params, &[None, None, None], &Subst::new(), &Chain::new())
            .unwrap_err();
        assert_eq!(
            diagnostics.iter().map(|d| d.kind.clone()).collect::<Vec<_>>(),
            vec![
                DiagnosticKind::Unsatisfiable(ty("Eq[string]")),
                DiagnosticKind::Unsatisfiable(ty("Show[int]")),
            ]
        );
    }

    #[test]
    fn part_infer_can_leave_associated_parameters_open() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);

        let params = vec![TyParam::associated("'x")];
        assert_eq!(resolver.part_infer(&[], &params, false), None);
        assert_eq!(
            resolver.part_infer(&[], &params, true),
            Some(vec![Ty::var("'x")])
        );

        // never when a witness is involved
        let params = vec![
            TyParam::associated("'x"),
            TyParam::witness("'w", vec![ty("Eq['x]")]),
        ];
        assert_eq!(resolver.part_infer(&[], &params, true), None);
    }

    #[test]
    fn infer_one_folds_the_seed() {
        let env = env();
        let pool = InstancePool::for_scope(&env, &[]);
        let mut resolver = Resolver::new(&env, &pool);

        let seed = Subst::single(v("'t"), Ty::int());
        match resolver.infer_one(&[ty("Eq['t]")], &seed, &Chain::new()) {
            Candidate::Viable(viable) => {
                assert_eq!(viable.ty, ty("IntEq"));
                assert_eq!(viable.subst.lookup(&v("'t")), Ty::int());
            }
            other => panic!("expected a viable candidate, found {:?}", other),
        }

        let rejected = resolver.infer_one(&[ty("Eq[string]")], &Subst::new(), &Chain::new());
        assert_eq!(rejected.name(), None);
        assert_eq!(rejected.diagnostics().len(), 1);
    }

    #[test]
    fn interleave_fills_ordinary_slots_in_order() {
        let params = vec![
            TyParam::ordinary("'a"),
            TyParam::witness("'w", vec![ty("Eq['a]")]),
            TyParam::ordinary("'b"),
        ];
        assert_eq!(
            interleave(&[Ty::int(), Ty::bool()], &params),
            Some(vec![Some(Ty::int()), None, Some(Ty::bool())])
        );
        assert_eq!(interleave(&[Ty::int()], &params), None);
    }
}
