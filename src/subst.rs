use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

use crate::ty::{Ty, TyVar};

/// A finite map from type variables to types.
///
/// Substitutions produced by this crate are kept idempotent: no image mentions
/// a variable in the domain. `compose` preserves that, so applying a
/// substitution once is always enough.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Subst(HashMap<TyVar, Ty>);

impl Deref for Subst {
    type Target = HashMap<TyVar, Ty>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Subst {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for Subst {
    type Item = (TyVar, Ty);

    type IntoIter = std::collections::hash_map::IntoIter<TyVar, Ty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(TyVar, Ty)> for Subst {
    fn from_iter<T: IntoIterator<Item = (TyVar, Ty)>>(iter: T) -> Self {
        let mut subst = Subst::new();
        for (k, v) in iter {
            subst.insert(k, v);
        }
        subst
    }
}

impl std::fmt::Display for Subst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }

        if f.alternate() {
            write!(f, "{{\n")?;
        } else {
            write!(f, "{{")?;
        }

        let mut lines = self.iter().collect::<Vec<_>>();
        lines.sort_by_key(|(var, _)| *var);

        let mut i = 0;
        for (var, ty) in lines {
            if f.alternate() {
                write!(f, "  {}: {}\n", var, ty)?;
            } else {
                if i != 0 {
                    write!(f, ",")?;
                }
                write!(f, " {}: {}", var, ty)?;
            }
            i += 1;
        }

        if f.alternate() {
            write!(f, "}}")
        } else {
            write!(f, " }}")
        }
    }
}

impl Subst {
    pub fn new() -> Self {
        Subst(HashMap::new())
    }

    pub fn single(var: TyVar, ty: Ty) -> Self {
        let mut subst = Subst::new();
        subst.insert(var, ty);
        subst
    }

    /// The image of `var`, or the variable itself when it is not in the domain.
    pub fn lookup(&self, var: &TyVar) -> Ty {
        match self.get(var) {
            Some(ty) => ty.clone(),
            None => Ty::Var(var.clone()),
        }
    }

    /// `compose(outer, inner)` behaves like applying `inner` first and then
    /// `outer`: the images of `inner` are rewritten through `outer`, and the
    /// bindings of `outer` are added on top (overwriting `inner` where both
    /// bind the same variable).
    pub fn compose(outer: &Subst, inner: &Subst) -> Subst {
        let mut composed = Subst::new();
        for (var, ty) in inner.iter() {
            composed.insert(var.clone(), ty.clone().with_subst(outer));
        }

        for (var, ty) in outer.iter() {
            composed.insert(var.clone(), ty.clone());
        }

        composed.normalize();
        composed
    }

    // Rewrites images until none mention a bound variable and drops trivial
    // `v: v` bindings. Cyclic maps never come out of `unify` (occurs check),
    // so the pass count is bounded by the size of the map.
    fn normalize(&mut self) {
        self.retain(|var, ty| !matches!(ty, Ty::Var(v) if v == var));
        for _ in 0..self.len() {
            let snapshot = self.clone();
            let mut changed = false;
            for (_, ty) in self.iter_mut() {
                let next = ty.clone().with_subst_once(&snapshot);
                if &next != ty {
                    *ty = next;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }
        self.retain(|var, ty| !matches!(ty, Ty::Var(v) if v == var));
    }
}

/// Trait for values that can have a type substitution applied to them.
pub trait Substitutable {
    fn apply_subst(&mut self, subst: &Subst);

    fn with_subst(mut self, subst: &Subst) -> Self
    where
        Self: Sized,
    {
        self.apply_subst(subst);
        self
    }
}

impl<T> Substitutable for Option<T>
where
    T: Substitutable,
{
    fn apply_subst(&mut self, subst: &Subst) {
        if let Some(inner) = self {
            inner.apply_subst(subst);
        }
    }
}

impl<T> Substitutable for Vec<T>
where
    T: Substitutable,
{
    fn apply_subst(&mut self, subst: &Subst) {
        for ty in self.iter_mut() {
            ty.apply_subst(subst);
        }
    }
}

impl Substitutable for TyVar {
    fn apply_subst(&mut self, subst: &Subst) {
        if let Some(Ty::Var(var)) = subst.get(self) {
            *self = var.clone();
        }
    }
}

impl Substitutable for Ty {
    fn apply_subst(&mut self, subst: &Subst) {
        *self = self.clone().with_subst_once(subst);
    }
}

impl Ty {
    // Single, simultaneous rewrite of every variable in the domain.
    fn with_subst_once(self, subst: &Subst) -> Ty {
        match self {
            Ty::Var(v) => match subst.get(&v) {
                Some(t) => t.clone(),
                None => Ty::Var(v),
            },
            Ty::Const(_) => self,
            Ty::Func(params, ret) => Ty::Func(
                params.into_iter().map(|p| p.with_subst_once(subst)).collect(),
                Box::new(ret.with_subst_once(subst)),
            ),
            Ty::Proj(name, args) => Ty::Proj(
                name,
                args.into_iter().map(|a| a.with_subst_once(subst)).collect(),
            ),
            Ty::Tuple(args) => {
                Ty::Tuple(args.into_iter().map(|a| a.with_subst_once(subst)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        subst::{Subst, Substitutable},
        ty::{Ty, TyVar},
    };

    fn v(name: &str) -> TyVar {
        TyVar::new(name)
    }

    #[test]
    fn apply_replaces_vars_and_leaves_others() {
        let subst = Subst::single(v("'a"), Ty::int());
        let ty = Ty::proj("Pair", vec![Ty::var("'a"), Ty::var("'b")]).with_subst(&subst);
        assert_eq!(ty, Ty::proj("Pair", vec![Ty::int(), Ty::var("'b")]));
        assert_eq!(subst.lookup(&v("'b")), Ty::var("'b"));
    }

    #[test]
    fn compose_applies_inner_then_outer() {
        // inner: T -> U, outer: U -> int
        let inner = Subst::single(v("'t"), Ty::var("'u"));
        let outer = Subst::single(v("'u"), Ty::int());
        let composed = Subst::compose(&outer, &inner);

        for ty in vec![
            Ty::var("'t"),
            Ty::var("'u"),
            Ty::list(Ty::var("'t")),
            Ty::func(vec![Ty::var("'u")], Ty::var("'t")),
        ] {
            let stepwise = ty.clone().with_subst(&inner).with_subst(&outer);
            assert_eq!(ty.with_subst(&composed), stepwise);
        }
        assert_eq!(composed.get(&v("'t")), Some(&Ty::int()));
        assert_eq!(composed.get(&v("'u")), Some(&Ty::int()));
    }

    #[test]
    fn compose_keeps_result_idempotent() {
        // outer mentions a variable that inner binds
        let inner = Subst::single(v("'a"), Ty::int());
        let outer = Subst::single(v("'b"), Ty::list(Ty::var("'a")));
        let composed = Subst::compose(&outer, &inner);
        assert_eq!(composed.get(&v("'b")), Some(&Ty::list(Ty::int())));
    }

    #[test]
    fn compose_drops_trivial_bindings() {
        let inner = Subst::single(v("'a"), Ty::var("'b"));
        let outer = Subst::single(v("'b"), Ty::var("'a"));
        let composed = Subst::compose(&outer, &inner);
        assert!(composed.get(&v("'a")).is_none());
        assert_eq!(composed.get(&v("'b")), Some(&Ty::var("'a")));
    }

    #[test]
    fn displays_sorted() {
        let subst: Subst = vec![(v("'b"), Ty::int()), (v("'a"), Ty::bool())]
            .into_iter()
            .collect();
        assert_eq!(subst.to_string(), "{ 'a: bool, 'b: int }");
    }
}
