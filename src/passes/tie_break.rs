use itertools::Itertools;

use crate::{
    candidate::{Instantiated, Viable},
    concept::{Overlap, ParamKind},
    env::ConceptModel,
    resolver::Resolver,
    subst::Substitutable,
    ty::Ty,
};

/// How specific a type argument is: a bare variable says nothing, a
/// constructor applied to arguments says something, a closed name says the
/// most.
pub fn specificity(ty: &Ty) -> u8 {
    match ty {
        Ty::Var(_) => 0,
        Ty::Const(_) => 2,
        Ty::Proj(_, args) | Ty::Tuple(args) if args.is_empty() => 2,
        Ty::Proj(_, _) | Ty::Tuple(_) | Ty::Func(_, _) => 1,
    }
}

/// `lhs` is at least `rhs` everywhere and beats it somewhere.
fn dominates(pairs: &[(usize, usize)]) -> bool {
    pairs.iter().all(|(l, r)| l >= r) && pairs.iter().any(|(l, r)| l > r)
}

impl<'a, E: ConceptModel> Resolver<'a, E> {
    /// Pass 3: drop every candidate some other candidate may eliminate. If
    /// that would drop everything, nothing is dropped.
    pub fn tie_break(&self, candidates: Vec<Viable>) -> Vec<Viable> {
        let eliminated = (0..candidates.len())
            .map(|me| {
                (0..candidates.len())
                    .any(|you| you != me && self.eliminates(&candidates[you], &candidates[me]))
            })
            .collect::<Vec<_>>();

        if eliminated.iter().all(|e| *e) {
            log::debug!("[tie_break] every candidate eliminated, keeping all");
            return candidates;
        }

        candidates
            .into_iter()
            .zip(eliminated)
            .filter_map(|(candidate, eliminated)| {
                if eliminated {
                    log::debug!("[tie_break] eliminated `{}`", candidate.name());
                    None
                } else {
                    Some(candidate)
                }
            })
            .collect()
    }

    fn eliminates(&self, you: &Viable, me: &Viable) -> bool {
        let permitted = you.instance.source.overlap().contains(Overlap::OVERLAPPING)
            || me.instance.source.overlap().contains(Overlap::OVERLAPPABLE);
        if !permitted {
            return false;
        }

        self.more_capable(you, me)
            || self.more_specific(you, me)
            || (self.options.mention_heuristic && self.mentions_more(you, me))
    }

    // Strictly more provided concepts, after unification.
    fn more_capable(&self, you: &Viable, me: &Viable) -> bool {
        let yours = self.env.expand(&you.instance.provides).with_subst(&you.subst);
        let mine = self.env.expand(&me.instance.provides).with_subst(&me.subst);
        mine.iter().all(|c| yours.contains(c)) && !yours.iter().all(|c| mine.contains(c))
    }

    // Shared concepts (same head and arity), as declared.
    fn shared_concepts(&self, you: &Instantiated, me: &Instantiated) -> Vec<(Ty, Ty)> {
        let yours = self.env.expand(&you.provides);
        let mine = self.env.expand(&me.provides);
        yours
            .into_iter()
            .cartesian_product(mine)
            .filter(|(y, m)| y.head() == m.head() && y.arity() == m.arity())
            .collect()
    }

    fn more_specific(&self, you: &Viable, me: &Viable) -> bool {
        let pairs = self
            .shared_concepts(&you.instance, &me.instance)
            .iter()
            .flat_map(|(y, m)| {
                y.type_arguments()
                    .iter()
                    .zip(m.type_arguments())
                    .map(|(a, b)| (specificity(a) as usize, specificity(b) as usize))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        dominates(&pairs)
    }

    fn mentions_more(&self, you: &Viable, me: &Viable) -> bool {
        let pairs = self
            .shared_concepts(&you.instance, &me.instance)
            .iter()
            .flat_map(|(y, m)| {
                y.type_arguments()
                    .iter()
                    .zip(m.type_arguments())
                    .map(|(a, b)| (self.mentions(&you.instance, a), self.mentions(&me.instance, b)))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        dominates(&pairs)
    }

    // How many of the instance's witness parameters constrain the type
    // parameter at this argument position.
    fn mentions(&self, instance: &Instantiated, arg: &Ty) -> usize {
        let Some(var) = arg.as_tyvar() else {
            return 0;
        };

        if !instance.params.iter().any(|p| &p.var == var) {
            return 0;
        }

        instance
            .params
            .iter()
            .filter(|p| p.kind == ParamKind::Witness)
            .filter(|p| self.env.expand(&p.constraints).iter().any(|c| c.mentions(var)))
            .count()
    }
}
