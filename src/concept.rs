use crate::{
    subst::{Subst, Substitutable},
    ty::{Ty, TyVar},
};

bitflags::bitflags! {
    /// Overlap permissions an instance declares.
    pub struct Overlap: u8 {
        /// This instance may shadow other, more general instances.
        const OVERLAPPING  = 1 << 0;
        /// This instance may be shadowed by more specific instances.
        const OVERLAPPABLE = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Stands for an instance; solved by resolution.
    Witness,
    /// Determined by other parameters via unification.
    Associated,
    /// Must be supplied by the caller.
    Ordinary,
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::Witness => write!(f, "witness"),
            ParamKind::Associated => write!(f, "assoc"),
            ParamKind::Ordinary => write!(f, "ordinary"),
        }
    }
}

/// A type parameter together with the concepts its argument must satisfy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TyParam {
    pub var: TyVar,
    pub kind: ParamKind,
    pub constraints: Vec<Ty>,
}

impl TyParam {
    pub fn new(var: impl Into<TyVar>, kind: ParamKind, constraints: Vec<Ty>) -> TyParam {
        TyParam {
            var: var.into(),
            kind,
            constraints,
        }
    }

    pub fn ordinary(var: impl Into<TyVar>) -> TyParam {
        TyParam::new(var, ParamKind::Ordinary, vec![])
    }

    pub fn associated(var: impl Into<TyVar>) -> TyParam {
        TyParam::new(var, ParamKind::Associated, vec![])
    }

    pub fn witness(var: impl Into<TyVar>, constraints: Vec<Ty>) -> TyParam {
        TyParam::new(var, ParamKind::Witness, constraints)
    }

    pub fn is_witness(&self) -> bool {
        self.kind == ParamKind::Witness
    }

    pub fn ty(&self) -> Ty {
        Ty::Var(self.var.clone())
    }
}

impl Substitutable for TyParam {
    // Only the constraints are rewritten; the parameter keeps its own name.
    fn apply_subst(&mut self, subst: &Subst) {
        self.constraints.apply_subst(subst);
    }
}

impl std::fmt::Display for TyParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ParamKind::Witness => write!(f, "witness {}", self.var)?,
            ParamKind::Associated => write!(f, "assoc {}", self.var)?,
            ParamKind::Ordinary => write!(f, "{}", self.var)?,
        }

        if !self.constraints.is_empty() {
            let parts = self
                .constraints
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" + ");
            write!(f, ": {}", parts)?;
        }
        Ok(())
    }
}

/// A named, parameterized interface. Satisfying it implies satisfying every
/// superconcept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptDef {
    pub name: String,
    pub params: Vec<TyVar>,
    /// Superconcepts over `params`.
    pub supers: Vec<Ty>,
    pub methods: Vec<String>,
    /// Methods with a default body.
    pub defaults: Vec<String>,
}

impl ConceptDef {
    pub fn new(name: impl Into<String>, params: Vec<TyVar>) -> ConceptDef {
        ConceptDef {
            name: name.into(),
            params,
            supers: vec![],
            methods: vec![],
            defaults: vec![],
        }
    }

    pub fn with_supers(mut self, supers: Vec<Ty>) -> ConceptDef {
        self.supers = supers;
        self
    }

    pub fn with_methods(mut self, methods: &[&str], defaults: &[&str]) -> ConceptDef {
        self.methods = methods.iter().map(|m| m.to_string()).collect();
        self.defaults = defaults.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn ty(&self) -> Ty {
        Ty::with_vars(self.name.clone(), &self.params)
    }

    /// The superconcepts of the concept `applied`, an application of this
    /// concept to concrete arguments.
    pub fn supers_of(&self, applied: &Ty) -> Vec<Ty> {
        let subst = self
            .params
            .iter()
            .cloned()
            .zip(applied.type_arguments().iter().cloned())
            .collect::<Subst>();
        self.supers.clone().with_subst(&subst)
    }
}

/// A named declaration that some types satisfy some concepts. Instances are
/// themselves types: a generic instance `ListEq['t, 'w]` is a `Proj` over its
/// parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceDef {
    pub name: String,
    pub params: Vec<TyParam>,
    pub provides: Vec<Ty>,
    pub overlap: Overlap,
    /// Methods this instance implements directly.
    pub methods: Vec<String>,
}

impl InstanceDef {
    pub fn new(name: impl Into<String>, params: Vec<TyParam>, provides: Vec<Ty>) -> InstanceDef {
        InstanceDef {
            name: name.into(),
            params,
            provides,
            overlap: Overlap::empty(),
            methods: vec![],
        }
    }

    pub fn with_overlap(mut self, overlap: Overlap) -> InstanceDef {
        self.overlap = overlap;
        self
    }

    pub fn with_methods(mut self, methods: &[&str]) -> InstanceDef {
        self.methods = methods.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn ty(&self) -> Ty {
        let vars = self.params.iter().map(|p| p.var.clone()).collect::<Vec<_>>();
        Ty::with_vars(self.name.clone(), &vars)
    }

    /// Concepts provided by this instance at the type `applied`
    /// (e.g. `ListEq[int, IntEq]`).
    pub fn provides_at(&self, applied: &Ty) -> Vec<Ty> {
        let subst = self
            .params
            .iter()
            .map(|p| p.var.clone())
            .zip(applied.type_arguments().iter().cloned())
            .collect::<Subst>();
        self.provides.clone().with_subst(&subst)
    }
}

/// Anything the resolver may pick as a witness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instance {
    /// A witness parameter of an enclosing scope, used as-is.
    Given(TyParam),
    Named(InstanceDef),
}

impl Instance {
    pub fn name(&self) -> &str {
        match self {
            Instance::Given(param) => param.var.name(),
            Instance::Named(def) => &def.name,
        }
    }

    pub fn overlap(&self) -> Overlap {
        match self {
            Instance::Given(_) => Overlap::empty(),
            Instance::Named(def) => def.overlap,
        }
    }

    pub fn is_given(&self) -> bool {
        matches!(self, Instance::Given(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConceptDef, InstanceDef, Overlap, TyParam};
    use crate::ty::{Ty, TyParser, TyVar};

    fn ty(src: &str) -> Ty {
        TyParser::parse(src).unwrap()
    }

    #[test]
    fn instance_types_follow_their_params() {
        let int_eq = InstanceDef::new("IntEq", vec![], vec![ty("Eq[int]")]);
        assert_eq!(int_eq.ty(), Ty::con("IntEq"));

        let list_eq = InstanceDef::new(
            "ListEq",
            vec![
                TyParam::associated("'t"),
                TyParam::witness("'w", vec![ty("Eq['t]")]),
            ],
            vec![ty("Eq[list['t]]")],
        )
        .with_overlap(Overlap::OVERLAPPABLE);
        assert_eq!(list_eq.ty(), ty("ListEq['t, 'w]"));
        assert_eq!(
            list_eq.provides_at(&ty("ListEq[int, IntEq]")),
            vec![ty("Eq[list[int]]")]
        );
        assert!(list_eq.overlap.contains(Overlap::OVERLAPPABLE));
        assert!(!list_eq.overlap.contains(Overlap::OVERLAPPING));
    }

    #[test]
    fn concept_supers_are_instantiated() {
        let ord = ConceptDef::new("Ord", vec![TyVar::new("'a")]).with_supers(vec![ty("Eq['a]")]);
        assert_eq!(ord.ty(), ty("Ord['a]"));
        assert_eq!(ord.supers_of(&ty("Ord[list[int]]")), vec![ty("Eq[list[int]]")]);
    }

    #[test]
    fn displays_params() {
        let w = TyParam::witness("'w", vec![ty("Eq['t]"), ty("Show['t]")]);
        assert_eq!(w.to_string(), "witness 'w: Eq['t] + Show['t]");
        assert_eq!(TyParam::associated("'e").to_string(), "assoc 'e");
        assert_eq!(TyParam::ordinary("'t").to_string(), "'t");
    }
}
