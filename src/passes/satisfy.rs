use crate::{
    candidate::{Candidate, Viable},
    chain::{Chain, ChainEntry, ChainError},
    diagnostics::Diagnostic,
    env::ConceptModel,
    resolver::{FailedGoal, Resolver},
    subst::Substitutable,
};

impl<'a, E: ConceptModel> Resolver<'a, E> {
    /// Pass 2: keep only candidates whose own parameters can be inferred.
    ///
    /// Given witnesses and instances without parameters pass through. A
    /// generic instance is inferred recursively, seeded with the unifier from
    /// pass 1, and its parameter constraints are re-checked on the result.
    ///
    /// An instance that failed for a goal stays failed for that goal at the
    /// same or greater depth, unless the failure involved a cycle.
    pub fn satisfy(&mut self, candidates: Vec<Viable>, chain: &Chain) -> Vec<Candidate> {
        candidates
            .into_iter()
            .map(|candidate| self.satisfy_one(candidate, chain))
            .collect()
    }

    fn satisfy_one(&mut self, candidate: Viable, chain: &Chain) -> Candidate {
        let Viable {
            instance,
            ty,
            subst,
        } = candidate;

        if instance.is_given() || instance.params.is_empty() {
            return Candidate::Viable(Viable {
                instance,
                ty,
                subst,
            });
        }

        let name = instance.name().to_string();
        let goal = instance.provides.clone().with_subst(&subst);
        let entry = ChainEntry::new(&name, &goal);
        if let Some(failed) = self.failed.get(&entry) {
            if chain.depth() >= failed.depth {
                log::debug!("[satisfy] `{}` already failed", entry);
                return Candidate::rejected(&name, failed.diagnostics.clone());
            }
        }

        let depth = chain.depth();
        let chain = match chain.push_entry(entry.clone(), self.options.max_depth) {
            Ok(chain) => chain,
            Err(err) => {
                log::debug!("[satisfy] dropping `{}`: {}", name, err);
                if let ChainError::Cycle(_) = err {
                    self.cycles += 1;
                }
                return Candidate::rejected(&name, vec![]);
            }
        };

        let cycles = self.cycles;
        let candidate = self.satisfy_params(Viable { instance, ty, subst }, &chain);
        if let Candidate::Rejected { diagnostics, .. } = &candidate {
            if self.cycles == cycles {
                self.failed.insert(
                    entry,
                    FailedGoal {
                        depth,
                        diagnostics: diagnostics.clone(),
                    },
                );
            }
        }
        candidate
    }

    // Infer the candidate's parameters below `chain` and re-check their
    // constraints.
    fn satisfy_params(&mut self, candidate: Viable, chain: &Chain) -> Candidate {
        let Viable { instance, subst, .. } = candidate;
        let name = instance.name().to_string();

        let args = instance
            .params
            .iter()
            .map(|p| subst.get(&p.var).cloned())
            .collect::<Vec<_>>();
        let subst = match self.infer(&instance.params, &args, &subst, chain) {
            Ok(subst) => subst,
            Err(diagnostics) => {
                log::debug!(
                    "[satisfy] dropping `{}`: {} diagnostic(s)",
                    name,
                    diagnostics.len()
                );
                return Candidate::rejected(&name, diagnostics);
            }
        };

        let givens = self.pool.givens();
        for param in instance.params.iter() {
            let arg = subst.lookup(&param.var);
            for constraint in param.constraints.iter() {
                let constraint = constraint.clone().with_subst(&subst);
                if !self.env.satisfies(&arg, &constraint, givens) {
                    log::debug!(
                        "[satisfy] dropping `{}`: `{}` does not satisfy `{}`",
                        name,
                        arg,
                        constraint
                    );
                    return Candidate::rejected(&name, vec![Diagnostic::unsatisfiable(constraint, chain)]);
                }
            }
        }

        let ty = instance.ty.clone().with_subst(&subst);
        log::debug!("[satisfy] `{}` resolved to {}", name, ty);
        Candidate::Viable(Viable {
            instance,
            ty,
            subst,
        })
    }
}
