use std::path::PathBuf;
use std::time::Instant;

use structopt::StructOpt;

use crate::{
    candidate::Candidate,
    chain::Chain,
    concept::{ParamKind, TyParam},
    dispatch,
    env::ConceptModel,
    errors::{Source, WitnessError, WitnessErrorKind, WitnessResult},
    options::ResolveOptions,
    pool::InstancePool,
    program::{Program, Query, QueryKind},
    resolver::{interleave, Resolver},
    subst::Subst,
    ty::Ty,
};

#[derive(Debug, StructOpt)]
pub struct ResolveCmd {
    #[structopt(name = "INPUT", parse(from_os_str), help = "declaration file")]
    pub input_path: PathBuf,

    #[structopt(long, default_value = "32", help = "maximum instance nesting depth")]
    pub max_depth: usize,

    #[structopt(long, help = "disables the witness-mention tie-breaker")]
    pub no_mention_heuristic: bool,
}

impl ResolveCmd {
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            max_depth: self.max_depth,
            mention_heuristic: !self.no_mention_heuristic,
        }
    }
}

pub(super) fn action(cmd: ResolveCmd) -> WitnessResult {
    let start_time = Instant::now();
    let program = Program::load(&cmd.input_path)?;
    let pool = program.pool();
    let options = cmd.options();

    let mut failures = 0;
    for query in program.queries.iter() {
        match run_query(&program, &pool, &options, query) {
            Ok(line) => println!("{} => {}", query.src.line.trim(), line),
            Err(err) => {
                err.emit();
                failures += 1;
            }
        }
    }

    log::info!(
        "Resolved {} of {} queries in {:?}",
        program.queries.len() - failures,
        program.queries.len(),
        start_time.elapsed()
    );

    if failures != 0 {
        return Err(WitnessError {
            msg: format!("{} quer(ies) failed", failures),
            src: None,
            kind: WitnessErrorKind::Resolve,
        });
    }
    Ok(())
}

/// Run one query with a fresh resolver, rendering the answer.
pub fn run_query(
    program: &Program,
    pool: &InstancePool,
    options: &ResolveOptions,
    query: &Query,
) -> WitnessResult<String> {
    let mut resolver = Resolver::with_options(&program.env, pool, options.clone());
    match &query.kind {
        QueryKind::Resolve { params, supplied } => {
            match resolver.part_infer(supplied, params, true) {
                Some(args) => Ok(render_args(&args)),
                None => Err(explain_failure(&mut resolver, params, supplied, &query.src)),
            }
        }
        QueryKind::Call { method, concept } => {
            let viable = match resolver.infer_one(&[concept.clone()], &Subst::new(), &Chain::new()) {
                Candidate::Viable(viable) => viable,
                Candidate::Rejected { diagnostics, .. } => {
                    return Err(WitnessError::resolve(&diagnostics, Some(query.src.clone())));
                }
            };

            dispatch::plan(&program.env, &viable.ty, concept, method)
                .map(|plan| plan.to_string())
                .ok_or_else(|| WitnessError {
                    msg: format!("`{}` has no method `{}` for `{}`", viable.ty, method, concept),
                    src: Some(query.src.clone()),
                    kind: WitnessErrorKind::Resolve,
                })
        }
    }
}

fn render_args(args: &[Ty]) -> String {
    let parts = args.iter().map(Ty::to_string).collect::<Vec<_>>().join(", ");
    format!("[{}]", parts)
}

// Re-run plain inference to recover the diagnostics `part_infer` discards.
fn explain_failure<E: ConceptModel>(
    resolver: &mut Resolver<E>,
    params: &[TyParam],
    supplied: &[Ty],
    src: &Source,
) -> WitnessError {
    let Some(args) = interleave(supplied, params) else {
        return WitnessError {
            msg: format!(
                "expected {} ordinary argument(s), found {}",
                params.iter().filter(|p| p.kind == ParamKind::Ordinary).count(),
                supplied.len()
            ),
            src: Some(src.clone()),
            kind: WitnessErrorKind::Resolve,
        };
    };

    match resolver.infer(params, &args, &Subst::new(), &Chain::new()) {
        Ok(_) => WitnessError::resolve(&[], Some(src.clone())),
        Err(diagnostics) => WitnessError::resolve(&diagnostics, Some(src.clone())),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::run_query;
    use crate::{options::ResolveOptions, program::Program};

    const DECLS: &str = "
concept Eq['a] { eq, default ne }
instance IntEq : Eq[int] { eq }
instance ListEq[assoc 't, witness 'w: Eq['t]] : Eq[list['t]] { eq }
resolve ['t, witness 'w: Eq['t]] (list[int])
resolve ['t, witness 'w: Eq['t]] (bool)
call ne : Eq[list[int]]
call eq : Eq[int]
";

    fn answers() -> Vec<Result<String, String>> {
        let program = Program::parse(DECLS, Path::new("decls.wit")).unwrap();
        let pool = program.pool();
        let options = ResolveOptions::default();
        program
            .queries
            .iter()
            .map(|q| run_query(&program, &pool, &options, q).map_err(|e| e.msg))
            .collect()
    }

    #[test]
    fn answers_every_query() {
        let answers = answers();
        assert_eq!(
            answers[0],
            Ok("[list[int], ListEq[int, IntEq]]".to_string())
        );
        assert_eq!(
            answers[1],
            Err("no instance satisfies `Eq[bool]`".to_string())
        );
        assert_eq!(
            answers[2],
            Ok("Eq[list[int]]::default::ne<ListEq[int, IntEq]>".to_string())
        );
        assert_eq!(answers[3], Ok("IntEq::eq".to_string()));
    }
}
