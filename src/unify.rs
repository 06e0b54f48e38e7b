//! Unification of provided and required concept types.
//!
//! Both sides may contain variables. A variable is *bindable* unless it is in
//! the `bound` set (the in-scope type parameters of the caller), in which case
//! it only unifies with itself. Unification is pure: it returns an extension of
//! the incoming substitution and never touches shared state.
use fnv::FnvHashSet;

use crate::{
    subst::{Subst, Substitutable},
    ty::{Ty, TyVar},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnifyError {
    Mismatch(Ty, Ty),
    Arity(Ty, Ty),
    Occurs(TyVar, Ty),
    Rigid(TyVar, Ty),
}

impl std::fmt::Display for UnifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnifyError::Mismatch(lhs, rhs) => write!(f, "`{}` does not unify with `{}`", lhs, rhs),
            UnifyError::Arity(lhs, rhs) => {
                write!(f, "`{}` and `{}` have different numbers of arguments", lhs, rhs)
            }
            UnifyError::Occurs(var, ty) => {
                write!(f, "`{}` occurs in `{}` (infinite type)", var, ty)
            }
            UnifyError::Rigid(var, ty) => {
                write!(f, "bound parameter `{}` cannot be unified with `{}`", var, ty)
            }
        }
    }
}

fn bind_var(
    var: TyVar,
    ty: Ty,
    subst: &mut Subst,
    bound: &FnvHashSet<TyVar>,
) -> Result<(), UnifyError> {
    if let Ty::Var(ref v) = ty {
        if *v == var {
            return Ok(());
        }
    }

    if bound.contains(&var) {
        return Err(UnifyError::Rigid(var, ty));
    }

    if ty.mentions(&var) {
        return Err(UnifyError::Occurs(var, ty));
    }

    *subst = Subst::compose(&Subst::single(var, ty), subst);
    Ok(())
}

/// Unify `provided` (from an instance) with `required` (from the caller),
/// extending `subst`.
///
/// Named types unify only when their heads and arities match; variables bind
/// to anything that does not contain them. When both sides are bindable
/// variables the provided side is bound, so the caller's names survive.
pub fn unify(
    provided: &Ty,
    required: &Ty,
    subst: &Subst,
    bound: &FnvHashSet<TyVar>,
) -> Result<Subst, UnifyError> {
    let mut subst = subst.clone();

    let lhs = provided.clone().with_subst(&subst);
    let rhs = required.clone().with_subst(&subst);

    match (lhs, rhs) {
        (Ty::Var(v1), Ty::Var(v2)) => {
            if v1 == v2 {
                /* ignore */
            } else if !bound.contains(&v1) {
                bind_var(v1, Ty::Var(v2), &mut subst, bound)?;
            } else if !bound.contains(&v2) {
                bind_var(v2, Ty::Var(v1), &mut subst, bound)?;
            } else {
                return Err(UnifyError::Rigid(v1, Ty::Var(v2)));
            }
        }

        (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
            bind_var(v, ty, &mut subst, bound)?;
        }

        (Ty::Const(n1), Ty::Const(n2)) => {
            if n1 != n2 {
                return Err(UnifyError::Mismatch(Ty::Const(n1), Ty::Const(n2)));
            }
        }

        (Ty::Proj(n1, args1), Ty::Proj(n2, args2)) => {
            if n1 != n2 {
                return Err(UnifyError::Mismatch(
                    Ty::Proj(n1, args1),
                    Ty::Proj(n2, args2),
                ));
            }
            if args1.len() != args2.len() {
                return Err(UnifyError::Arity(Ty::Proj(n1, args1), Ty::Proj(n2, args2)));
            }
            for (a, b) in args1.iter().zip(args2.iter()) {
                subst = unify(a, b, &subst, bound)?;
            }
        }

        (Ty::Func(ps1, r1), Ty::Func(ps2, r2)) => {
            if ps1.len() != ps2.len() {
                return Err(UnifyError::Arity(Ty::Func(ps1, r1), Ty::Func(ps2, r2)));
            }
            for (a, b) in ps1.iter().zip(ps2.iter()) {
                subst = unify(a, b, &subst, bound)?;
            }
            subst = unify(&r1, &r2, &subst, bound)?;
        }

        (Ty::Tuple(elems1), Ty::Tuple(elems2)) => {
            if elems1.len() != elems2.len() {
                return Err(UnifyError::Arity(Ty::Tuple(elems1), Ty::Tuple(elems2)));
            }
            for (a, b) in elems1.iter().zip(elems2.iter()) {
                subst = unify(a, b, &subst, bound)?;
            }
        }

        (lhs, rhs) => {
            return Err(UnifyError::Mismatch(lhs, rhs));
        }
    }

    Ok(subst)
}

#[cfg(test)]
mod tests {
    use fnv::FnvHashSet;

    use super::{unify, UnifyError};
    use crate::{
        subst::{Subst, Substitutable},
        ty::{Ty, TyParser, TyVar},
    };

    fn ty(src: &str) -> Ty {
        TyParser::parse(src).unwrap()
    }

    fn bound(vars: &[&str]) -> FnvHashSet<TyVar> {
        vars.iter().map(|v| TyVar::new(*v)).collect()
    }

    #[test]
    fn unify_binds_vars_on_either_side() {
        let s = unify(&ty("Eq[?t0]"), &ty("Eq[int]"), &Subst::new(), &bound(&[])).unwrap();
        assert_eq!(s.get(&TyVar::new("?t0")), Some(&Ty::int()));

        let s = unify(&ty("Eq[int]"), &ty("Eq['a]"), &Subst::new(), &bound(&[])).unwrap();
        assert_eq!(s.get(&TyVar::new("'a")), Some(&Ty::int()));
    }

    #[test]
    fn unify_is_symmetric_up_to_naming() {
        let b = bound(&[]);
        let lhs = ty("Coll[list[?t0], ?t0]");
        let rhs = ty("Coll['c, int]");
        let s1 = unify(&lhs, &rhs, &Subst::new(), &b).unwrap();
        let s2 = unify(&rhs, &lhs, &Subst::new(), &b).unwrap();
        assert_eq!(lhs.clone().with_subst(&s1), rhs.clone().with_subst(&s1));
        assert_eq!(lhs.clone().with_subst(&s2), rhs.with_subst(&s2));
        assert_eq!(lhs.clone().with_subst(&s1), lhs.with_subst(&s2));
    }

    #[test]
    fn bound_vars_only_unify_with_themselves() {
        let b = bound(&["'s"]);
        assert!(unify(&ty("Eq['s]"), &ty("Eq['s]"), &Subst::new(), &b).is_ok());
        assert_eq!(
            unify(&ty("'s"), &ty("int"), &Subst::new(), &b),
            Err(UnifyError::Rigid(TyVar::new("'s"), Ty::int()))
        );

        // a bindable var still binds to a bound one
        let s = unify(&ty("Eq[?t0]"), &ty("Eq['s]"), &Subst::new(), &b).unwrap();
        assert_eq!(s.get(&TyVar::new("?t0")), Some(&Ty::var("'s")));
        assert!(s.get(&TyVar::new("'s")).is_none());
    }

    #[test]
    fn named_types_need_same_head_and_arity() {
        let b = bound(&[]);
        assert!(unify(&ty("Eq[int]"), &ty("Ord[int]"), &Subst::new(), &b).is_err());
        assert!(matches!(
            unify(&ty("Pair[int]"), &ty("Pair[int, int]"), &Subst::new(), &b),
            Err(UnifyError::Arity(_, _))
        ));
        assert!(unify(&ty("int"), &ty("bool"), &Subst::new(), &b).is_err());
        assert!(unify(&ty("int"), &ty("(int)"), &Subst::new(), &b).is_err());
    }

    #[test]
    fn occurs_check_rejects_infinite_types() {
        let err = unify(&ty("?t0"), &ty("list[?t0]"), &Subst::new(), &bound(&[])).unwrap_err();
        assert!(matches!(err, UnifyError::Occurs(_, _)));
    }

    #[test]
    fn unify_respects_incoming_subst() {
        let seed = Subst::single(TyVar::new("?t0"), Ty::bool());
        assert!(unify(&ty("?t0"), &ty("int"), &seed, &bound(&[])).is_err());
        let s = unify(&ty("Pair[?t0, ?u1]"), &ty("Pair[bool, int]"), &seed, &bound(&[])).unwrap();
        assert_eq!(s.get(&TyVar::new("?u1")), Some(&Ty::int()));
    }
}
