use std::collections::HashSet;

use crate::ty::TyVar;

// Types as the resolver sees them. Concepts, instances and ordinary data types
// all share this representation: a concept requirement like `Eq[list['t]]`
// is just a `Proj` whose head names a concept.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ty {
    // Nullary named types (`int`, `IntEq`).
    Const(String),

    // Type parameters and fresh instance variables.
    Var(TyVar),

    // Function types: (T0, T1, ...) -> Tn.
    Func(Vec<Ty>, Box<Ty>),

    // Named type applied to arguments (`list[int]`, `Eq['a]`).
    Proj(String, Vec<Ty>),

    Tuple(Vec<Ty>),
}

impl Default for Ty {
    fn default() -> Self {
        Ty::unit()
    }
}

impl std::fmt::Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Const(name) => write!(f, "{}", name),
            Ty::Var(v) => write!(f, "{}", v.0),
            Ty::Func(params, ret) => {
                let parts = params
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Fn({}) -> {}", parts, ret)
            }
            Ty::Proj(name, args) => {
                if args.is_empty() {
                    write!(f, "{}", name)
                } else {
                    let parts = args
                        .iter()
                        .map(|t| t.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "{}[{}]", name, parts)
                }
            }
            Ty::Tuple(elems) => {
                let parts = elems
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({})", parts)
            }
        }
    }
}

impl Ty {
    /// Unit type `()`, represented as an empty tuple.
    #[inline(always)]
    pub fn unit() -> Self {
        Ty::Tuple(vec![])
    }

    #[inline(always)]
    pub fn bool() -> Self {
        Ty::Const("bool".into())
    }

    #[inline(always)]
    pub fn int() -> Self {
        Ty::Const("int".into())
    }

    #[inline(always)]
    pub fn string() -> Self {
        Ty::Const("string".into())
    }

    pub fn var(var: impl Into<TyVar>) -> Self {
        Ty::Var(var.into())
    }

    pub fn func(params: Vec<Ty>, ret: Ty) -> Self {
        Ty::Func(params, Box::new(ret))
    }

    pub fn tuple(elems: Vec<Ty>) -> Self {
        Ty::Tuple(elems)
    }

    pub fn list(ty: Ty) -> Self {
        Ty::proj("list", vec![ty])
    }

    pub fn con(name: impl Into<String>) -> Self {
        Ty::Const(name.into())
    }

    pub fn proj(name: impl Into<String>, args: Vec<Ty>) -> Self {
        Ty::Proj(name.into(), args)
    }

    /// A named type over its own parameters, collapsing to `Const` when there
    /// are none (e.g. the type of a non-generic instance).
    pub fn with_vars(name: impl Into<String>, vars: &[TyVar]) -> Self {
        Ty::with_tys(name, vars.iter().map(|t| Ty::Var(t.clone())).collect())
    }

    pub fn with_tys(name: impl Into<String>, tys: Vec<Ty>) -> Self {
        if tys.is_empty() {
            Ty::Const(name.into())
        } else {
            Ty::Proj(name.into(), tys)
        }
    }

    /// The head name of a named type. `None` for variables, tuples and functions.
    pub fn head(&self) -> Option<&str> {
        match self {
            Ty::Const(name) | Ty::Proj(name, _) => Some(name.as_str()),
            Ty::Var(_) | Ty::Func(_, _) | Ty::Tuple(_) => None,
        }
    }

    /// Type arguments of a named type (empty for everything else).
    pub fn type_arguments(&self) -> &[Ty] {
        match self {
            Ty::Proj(_, args) => args,
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Ty::Const(_) | Ty::Var(_) => 0,
            Ty::Proj(_, items) | Ty::Tuple(items) => items.len(),
            Ty::Func(items, _) => items.len() + 1,
        }
    }

    #[inline(always)]
    pub fn is_tyvar(&self) -> bool {
        matches!(self, Ty::Var(_))
    }

    pub fn as_tyvar(&self) -> Option<&TyVar> {
        match self {
            Ty::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if `var` occurs anywhere inside this type.
    pub fn mentions(&self, var: &TyVar) -> bool {
        match self {
            Ty::Var(v) => v == var,
            Ty::Const(_) => false,
            Ty::Proj(_, tys) | Ty::Tuple(tys) => tys.iter().any(|t| t.mentions(var)),
            Ty::Func(params, ret) => params.iter().any(|t| t.mentions(var)) || ret.mentions(var),
        }
    }

    pub fn free_vars(&self) -> Vec<&TyVar> {
        match self {
            Ty::Const(_) => vec![],
            Ty::Var(v) => vec![v],
            Ty::Proj(_, tys) | Ty::Tuple(tys) => {
                tys.iter().map(|ty| ty.free_vars()).flatten().collect()
            }
            Ty::Func(param_tys, ret_ty) => {
                let mut vars = param_tys
                    .iter()
                    .map(|ty| ty.free_vars())
                    .flatten()
                    .collect::<Vec<_>>();
                vars.extend(ret_ty.free_vars());
                vars
            }
        }
    }

    /// Collect all unique type variables from this type in left-to-right traversal order.
    pub fn unique_free_vars(&self) -> Vec<TyVar> {
        let mut seen = HashSet::new();
        self.free_vars()
            .into_iter()
            .filter(|tv| seen.insert(*tv))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::ty::{Ty, TyVar};

    #[test]
    fn displays_named_and_structural_types() {
        let ty = Ty::proj("Eq", vec![Ty::list(Ty::var("'t"))]);
        assert_eq!(ty.to_string(), "Eq[list['t]]");

        let ty = Ty::func(vec![Ty::int(), Ty::tuple(vec![])], Ty::bool());
        assert_eq!(ty.to_string(), "Fn(int, ()) -> bool");
    }

    #[test]
    fn with_vars_collapses_to_const() {
        assert_eq!(Ty::with_vars("IntEq", &[]), Ty::con("IntEq"));
        assert_eq!(
            Ty::with_vars("ListEq", &[TyVar::new("'t")]),
            Ty::proj("ListEq", vec![Ty::var("'t")])
        );
    }

    #[test]
    fn collects_unique_free_vars_in_order() {
        let ty = Ty::proj(
            "Map",
            vec![Ty::var("'k"), Ty::list(Ty::var("'v")), Ty::var("'k")],
        );
        assert_eq!(
            ty.unique_free_vars(),
            vec![TyVar::new("'k"), TyVar::new("'v")]
        );
        assert!(ty.mentions(&TyVar::new("'v")));
        assert!(!ty.mentions(&TyVar::new("'x")));
    }
}
