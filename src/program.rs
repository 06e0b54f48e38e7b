//! Line-oriented declaration files.
//!
//! ```text
//! # comment
//! concept Eq['a] { eq, default ne }
//! concept Ord['a] : Eq['a]
//! type string : Eq[string]
//! instance IntEq : Eq[int] { eq }
//! overlappable instance ListEq[assoc 't, witness 'w: Eq['t]] : Eq[list['t]]
//! given 's, witness 'e: Eq['s]
//! resolve ['t, witness 'w: Eq['t]] (int)
//! call ne : Eq[list[int]]
//! ```
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    concept::{ConceptDef, InstanceDef, Overlap, ParamKind, TyParam},
    env::GlobalEnv,
    errors::{Source, WitnessError, WitnessResult},
    pool::InstancePool,
    ty::{Ty, TyParser, TyVar},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// Complete `params` given the ordinary arguments in `supplied`.
    Resolve {
        params: Vec<TyParam>,
        supplied: Vec<Ty>,
    },
    /// Resolve a witness for `concept` and plan a call of `method` on it.
    Call { method: String, concept: Ty },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub kind: QueryKind,
    pub src: Source,
}

#[derive(Clone, Debug, Default)]
pub struct Program {
    pub env: GlobalEnv,
    /// Parameters in scope at every query.
    pub givens: Vec<TyParam>,
    pub queries: Vec<Query>,
}

impl Program {
    pub fn load(filepath: &Path) -> WitnessResult<Program> {
        let src = fs::read_to_string(filepath)?;
        Program::parse(&src, filepath)
    }

    pub fn parse(src: &str, filepath: &Path) -> WitnessResult<Program> {
        let mut program = Program::default();
        for (lineno, line) in src.lines().enumerate() {
            let source = Source {
                filepath: PathBuf::from(filepath),
                lineno,
                line: line.to_string(),
            };

            let text = line.split('#').next().unwrap_or_default();
            if text.trim().is_empty() {
                continue;
            }

            program
                .parse_line(text, &source)
                .map_err(|msg| WitnessError::parse(msg, source))?;
        }

        log::debug!(
            "[parse] {} concept(s), {} instance(s), {} quer(ies)",
            program.env.concepts.len(),
            program.env.instances.len(),
            program.queries.len()
        );
        Ok(program)
    }

    /// The pool every query in this program resolves against.
    pub fn pool(&self) -> InstancePool {
        InstancePool::for_scope(&self.env, &self.givens)
    }

    fn parse_line(&mut self, text: &str, source: &Source) -> Result<(), String> {
        let mut p = TyParser::new(text);

        let mut overlap = Overlap::empty();
        loop {
            if p.eat_keyword("overlapping") {
                overlap |= Overlap::OVERLAPPING;
            } else if p.eat_keyword("overlappable") {
                overlap |= Overlap::OVERLAPPABLE;
            } else {
                break;
            }
        }

        if !overlap.is_empty() {
            if !p.eat_keyword("instance") {
                return Err(str!("overlap modifiers only apply to `instance`"));
            }
            let instance = parse_instance(&mut p)?.with_overlap(overlap);
            self.env.add_instance(instance);
        } else if p.eat_keyword("instance") {
            let instance = parse_instance(&mut p)?;
            self.env.add_instance(instance);
        } else if p.eat_keyword("concept") {
            let concept = parse_concept(&mut p)?;
            self.env.add_concept(concept);
        } else if p.eat_keyword("type") {
            let ty = p.parse_ty()?;
            p.expect(":")?;
            for concept in p.parse_ty_sum()? {
                self.env.add_type_concept(ty.clone(), concept);
            }
        } else if p.eat_keyword("given") {
            self.givens.extend(parse_param_list(&mut p)?);
        } else if p.eat_keyword("resolve") {
            let params = parse_bracketed_params(&mut p)?;
            let supplied = match p.parse_tuple_ty()? {
                Ty::Tuple(tys) => tys,
                ty => vec![ty],
            };
            self.queries.push(Query {
                kind: QueryKind::Resolve { params, supplied },
                src: source.clone(),
            });
        } else if p.eat_keyword("call") {
            let method = p.parse_id();
            if method.is_empty() {
                return Err(str!("expected a method name after `call`"));
            }
            p.expect(":")?;
            let concept = p.parse_ty()?;
            self.queries.push(Query {
                kind: QueryKind::Call { method, concept },
                src: source.clone(),
            });
        } else {
            return Err(format!("unknown declaration `{}`", text.trim()));
        }

        p.expect_end()
    }
}

fn parse_var(p: &mut TyParser) -> Result<TyVar, String> {
    match p.parse_ty()? {
        Ty::Var(var) if var.is_user_var() => Ok(var),
        ty => Err(format!("expected a type parameter like `'t`, found `{}`", ty)),
    }
}

// `'x` | `assoc 'x` | `witness 'x: C + D` | `'x: C + D`
fn parse_param(p: &mut TyParser) -> Result<TyParam, String> {
    let kind = if p.eat_keyword("witness") {
        ParamKind::Witness
    } else if p.eat_keyword("assoc") {
        ParamKind::Associated
    } else {
        ParamKind::Ordinary
    };

    let var = parse_var(p)?;
    let constraints = if p.eat(":") { p.parse_ty_sum()? } else { vec![] };
    if kind == ParamKind::Witness && constraints.is_empty() {
        return Err(format!("witness parameter `{}` needs at least one concept", var));
    }
    Ok(TyParam::new(var, kind, constraints))
}

fn parse_param_list(p: &mut TyParser) -> Result<Vec<TyParam>, String> {
    let mut params = vec![parse_param(p)?];
    while p.eat(",") {
        params.push(parse_param(p)?);
    }
    Ok(params)
}

fn parse_bracketed_params(p: &mut TyParser) -> Result<Vec<TyParam>, String> {
    p.expect("[")?;
    if p.eat("]") {
        return Ok(vec![]);
    }
    let params = parse_param_list(p)?;
    p.expect("]")?;
    Ok(params)
}

// `{ a, default b }`; returns (methods, defaults)
fn parse_methods(p: &mut TyParser) -> Result<(Vec<String>, Vec<String>), String> {
    let mut methods = vec![];
    let mut defaults = vec![];
    if !p.eat("{") {
        return Ok((methods, defaults));
    }

    loop {
        if p.eat("}") {
            break;
        }

        let is_default = p.eat_keyword("default");
        let name = p.parse_id();
        if name.is_empty() {
            return Err(str!("expected a method name"));
        }
        if is_default {
            defaults.push(name.clone());
        }
        methods.push(name);

        if !p.eat(",") {
            p.expect("}")?;
            break;
        }
    }
    Ok((methods, defaults))
}

fn parse_concept(p: &mut TyParser) -> Result<ConceptDef, String> {
    let head = p.parse_ty()?;
    let name = head
        .head()
        .ok_or_else(|| format!("expected a concept name, found `{}`", head))?
        .to_string();
    let params = head
        .type_arguments()
        .iter()
        .map(|arg| match arg {
            Ty::Var(var) => Ok(var.clone()),
            ty => Err(format!("concept parameters must be variables, found `{}`", ty)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let supers = if p.eat(":") { p.parse_ty_sum()? } else { vec![] };
    let (methods, defaults) = parse_methods(p)?;
    let mut concept = ConceptDef::new(name, params).with_supers(supers);
    concept.methods = methods;
    concept.defaults = defaults;
    Ok(concept)
}

fn parse_instance(p: &mut TyParser) -> Result<InstanceDef, String> {
    let name = p.parse_id();
    if name.is_empty() {
        return Err(str!("expected an instance name"));
    }

    let params = if let Some('[') = p.peek() {
        parse_bracketed_params(p)?
    } else {
        vec![]
    };
    p.expect(":")?;
    let provides = p.parse_ty_sum()?;
    let (methods, _) = parse_methods(p)?;

    let mut instance = InstanceDef::new(name, params, provides);
    instance.methods = methods;
    Ok(instance)
}
