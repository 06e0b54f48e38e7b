use crate::{
    concept::TyParam,
    env::ConceptModel,
    subst::{Subst, Substitutable},
    ty::Ty,
};

/// The concepts a witness parameter's instance must satisfy under `subst`.
///
/// Constraints are substituted and deduplicated, then any constraint already
/// implied by a sibling's superconcepts is dropped: a witness for `Ord[t]`
/// needs no separate search for `Eq[t]`.
pub fn required_concepts<E: ConceptModel>(env: &E, param: &TyParam, subst: &Subst) -> Vec<Ty> {
    let mut concepts: Vec<Ty> = vec![];
    for constraint in param.constraints.iter() {
        let concept = constraint.clone().with_subst(subst);
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    let required = concepts
        .iter()
        .enumerate()
        .filter(|(i, concept)| {
            !concepts
                .iter()
                .enumerate()
                .any(|(j, other)| {
                    // mutually implying constraints keep the first one
                    *i != j && env.implies(other, concept) && !(j > *i && env.implies(concept, other))
                })
        })
        .map(|(_, concept)| concept.clone())
        .collect::<Vec<_>>();

    log::debug!(
        "[required_concepts] {} => [{}]",
        param,
        required.iter().map(Ty::to_string).collect::<Vec<_>>().join(", ")
    );
    required
}
