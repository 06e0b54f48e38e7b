use colored::*;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::diagnostics::Diagnostic;

pub type WitnessResult<T = ()> = Result<T, WitnessError>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WitnessErrorKind {
    Parse,
    Resolve,
    IO,
}

impl fmt::Display for WitnessErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WitnessErrorKind::Parse => "parse error",
                WitnessErrorKind::Resolve => "resolution error",
                WitnessErrorKind::IO => "i/o error",
            }
        )
    }
}

/// A line of a declaration file an error points at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Source {
    pub filepath: PathBuf,
    /// Zero-based line number.
    pub lineno: usize,
    pub line: String,
}

#[derive(Debug)]
pub struct WitnessError {
    pub msg: String,
    pub src: Option<Source>,
    pub kind: WitnessErrorKind,
}

impl fmt::Display for WitnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.src {
            Some(src) => write!(
                f,
                "{}: {} ({}:{})",
                self.kind,
                self.msg,
                src.filepath.display(),
                src.lineno + 1
            ),
            None => write!(f, "{}: {}", self.kind, self.msg),
        }
    }
}

impl std::error::Error for WitnessError {}

impl WitnessError {
    pub fn parse<S: Into<String>>(msg: S, src: Source) -> WitnessError {
        WitnessError {
            msg: msg.into(),
            src: Some(src),
            kind: WitnessErrorKind::Parse,
        }
    }

    /// Summarize the diagnostics of a failed resolution, one per line.
    pub fn resolve(diagnostics: &[Diagnostic], src: Option<Source>) -> WitnessError {
        let msg = if diagnostics.is_empty() {
            str!("could not infer the witness arguments")
        } else {
            diagnostics
                .iter()
                .map(Diagnostic::message)
                .collect::<Vec<_>>()
                .join("\n")
        };

        WitnessError {
            msg,
            src,
            kind: WitnessErrorKind::Resolve,
        }
    }

    pub fn emit(self) {
        let kind = format!("{}:", self.kind);
        let mut msg_lines = self.msg.lines().collect::<Vec<_>>();
        msg_lines.dedup();
        let indent = " ".repeat(kind.len() + 1);
        let msg = msg_lines
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if i == 0 {
                    s.to_string()
                } else {
                    format!("{}{}", indent, s)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        eprintln!("{} {}", kind.bold().red(), msg.bold());

        if let Some(src) = self.src {
            let arrow = "-->".bold();
            let lineno_str = (src.lineno + 1).to_string();
            let max_num_width = lineno_str.len() + 1;
            let full_spacing = " ".repeat(max_num_width);
            let pipe = "|".bold();

            eprintln!(
                "{}{} {}:{}",
                " ".repeat(max_num_width - 1),
                arrow,
                src.filepath.display(),
                lineno_str
            );
            eprintln!("{}{}", full_spacing, pipe);

            let spacing = " ".repeat(max_num_width - lineno_str.len());
            eprintln!("{}{}{} {}", lineno_str.bold(), spacing, pipe, src.line);

            let trimmed = src.line.trim_start();
            let indent = " ".repeat(src.line.len() - trimmed.len());
            let indicator = "^".repeat(trimmed.trim_end().len().max(1)).bold().red();
            eprintln!("{}{} {}{}", full_spacing, pipe, indent, indicator);
        }
        eprintln!()
    }
}

impl From<io::Error> for WitnessError {
    fn from(err: io::Error) -> WitnessError {
        WitnessError {
            msg: err.to_string(),
            src: None,
            kind: WitnessErrorKind::IO,
        }
    }
}
