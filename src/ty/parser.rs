use crate::ty::Ty;

/// A small recursive-descent reader for the textual type syntax:
///
/// - `int`, `IntEq`: nullary named types
/// - `list['t]`, `Eq[list[int]]`: named types applied to arguments
/// - `'t`: a type parameter, `?t0`: a fresh variable
/// - `(A, B)`, `()`: tuples
/// - `Fn(A, B) -> C`: functions
///
/// The helpers are public so that line-oriented declaration readers can
/// drive the parser over a larger input.
pub struct TyParser<'a> {
    src: &'a str,
    index: usize,
}

impl<'a> TyParser<'a> {
    pub fn new(src: &'a str) -> TyParser<'a> {
        Self { src, index: 0 }
    }

    /// Parse a complete type, rejecting trailing input.
    pub fn parse(src: &'a str) -> Result<Ty, String> {
        let mut p = TyParser::new(src);
        let ty = p.parse_ty()?;
        p.expect_end()?;
        Ok(ty)
    }

    pub fn peek(&mut self) -> Option<char> {
        self.consume_whitespace();
        self.src[self.index..].chars().next()
    }

    pub fn peek_n(&mut self, count: usize) -> Option<&str> {
        self.consume_whitespace();
        self.src.get(self.index..self.index + count)
    }

    pub fn next(&mut self) -> Option<char> {
        self.consume_whitespace();
        let ch = self.src[self.index..].chars().next()?;
        self.index += ch.len_utf8();
        Some(ch)
    }

    pub fn expect(&mut self, s: &str) -> Result<(), String> {
        self.consume_whitespace();
        match self.src.get(self.index..self.index + s.len()) {
            Some(next) if next == s => {
                self.index += s.len();
                Ok(())
            }
            Some(_) | None => Err(format!("expected `{}`, found {}", s, self.describe_next())),
        }
    }

    /// Consume `s` if it is next in the input.
    pub fn eat(&mut self, s: &str) -> bool {
        if let Some(next) = self.peek_n(s.len()) {
            if next == s {
                self.index += s.len();
                return true;
            }
        }
        false
    }

    /// Consume the keyword `kw` if the next identifier is exactly `kw`.
    pub fn eat_keyword(&mut self, kw: &str) -> bool {
        let start = self.index;
        if self.parse_id() == kw {
            return true;
        }
        self.index = start;
        false
    }

    pub fn expect_end(&mut self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(format!("unexpected trailing input {}", self.describe_next())),
        }
    }

    pub fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    fn advance(&mut self, count: usize) {
        self.index += count;
    }

    fn consume_whitespace(&mut self) {
        while let Some(ch) = self.src[self.index..].chars().next() {
            if !ch.is_whitespace() {
                break;
            }

            self.index += ch.len_utf8();
        }
    }

    fn describe_next(&mut self) -> String {
        let rest = self.src[self.index..].trim();
        if rest.is_empty() {
            str!("end of input")
        } else {
            let snippet = rest.chars().take(12).collect::<String>();
            format!("`{}`", snippet)
        }
    }

    pub fn parse_id(&mut self) -> String {
        let mut s = String::new();
        while matches!(self.peek(), Some(p) if p.is_ascii_alphanumeric() || p == '_') {
            let Some(ch) = self.next() else {
                break;
            };

            s.push(ch);

            // identifiers never span whitespace
            if matches!(self.src[self.index..].chars().next(), Some(c) if c.is_whitespace()) {
                break;
            }
        }
        s
    }

    pub fn parse_ty(&mut self) -> Result<Ty, String> {
        if let Some(t) = self.parse_ty_complex()? {
            return Ok(t);
        }

        let name = self.parse_id();
        if name.is_empty() {
            return Err(format!("expected a type, found {}", self.describe_next()));
        }

        let ty_params = self.parse_ty_params()?;
        Ok(Ty::with_tys(name, ty_params.unwrap_or_default()))
    }

    /// Parse a `+` separated list of types (e.g. `Eq['a] + Show['a]`).
    pub fn parse_ty_sum(&mut self) -> Result<Vec<Ty>, String> {
        let mut tys = vec![self.parse_ty()?];
        while self.eat("+") {
            tys.push(self.parse_ty()?);
        }
        Ok(tys)
    }

    fn parse_ty_params(&mut self) -> Result<Option<Vec<Ty>>, String> {
        let Some('[') = self.peek() else {
            return Ok(None);
        };

        self.expect("[")?;
        let mut tys = vec![];
        loop {
            let ty = self.parse_ty()?;
            tys.push(ty);
            if let Some(']') = self.peek() {
                break;
            }
            self.expect(",")?;
        }

        self.expect("]")?;

        Ok(Some(tys))
    }

    fn parse_ty_complex(&mut self) -> Result<Option<Ty>, String> {
        Ok(if let Some("Fn(") = self.peek_n(3) {
            Some(self.parse_fn_ty()?)
        } else if let Some('\'') = self.peek() {
            Some(self.parse_generic_ty()?)
        } else if let Some('?') = self.peek() {
            Some(self.parse_ty_var()?)
        } else if let Some('(') = self.peek() {
            Some(self.parse_tuple_ty()?)
        } else {
            None
        })
    }

    fn parse_generic_ty(&mut self) -> Result<Ty, String> {
        self.expect("'")?;
        let name = self.parse_id();
        if name.is_empty() {
            return Err(str!("expected a type parameter name after `'`"));
        }
        Ok(Ty::var(format!("'{}", name)))
    }

    fn parse_ty_var(&mut self) -> Result<Ty, String> {
        self.expect("?")?;
        let mut name = "?".to_string();
        name.push_str(&self.parse_id());
        Ok(Ty::var(name))
    }

    fn parse_fn_ty(&mut self) -> Result<Ty, String> {
        // Fn(<params>) -> <ret_ty>
        self.expect("Fn")?;
        let params_ty = self.parse_tuple_ty()?;
        let ret_ty = if let Some("->") = self.peek_n(2) {
            self.advance(2);
            self.parse_ty()?
        } else {
            Ty::unit()
        };

        let param_tys = match params_ty {
            Ty::Tuple(tys) => tys,
            ty => vec![ty],
        };
        Ok(Ty::func(param_tys, ret_ty))
    }

    pub fn parse_tuple_ty(&mut self) -> Result<Ty, String> {
        let mut tys = vec![];
        self.expect("(")?;

        loop {
            if let Some(')') = self.peek() {
                break;
            }

            let ty = self.parse_ty()?;
            tys.push(ty);

            if let Some(')') = self.peek() {
                break;
            }

            self.expect(",")?;
        }

        self.expect(")")?;
        Ok(Ty::tuple(tys))
    }
}

#[cfg(test)]
mod tests {
    use crate::ty::{Ty, TyParser};

    #[test]
    fn parses_basic_ty() {
        let ty = TyParser::parse("int").expect("could not parse `int`");
        assert_eq!(ty, Ty::int());
        let ty = TyParser::parse("IntEq").expect("could not parse `IntEq`");
        assert_eq!(ty, Ty::con("IntEq"));
    }

    #[test]
    fn parses_vars() {
        let ty = TyParser::parse("'t").expect("could not parse `'t`");
        assert_eq!(ty, Ty::var("'t"));
        let ty = TyParser::parse("?t0").expect("could not parse `?t0`");
        assert_eq!(ty, Ty::var("?t0"));
    }

    #[test]
    fn parses_tuple_ty() {
        let ty = TyParser::parse("()").expect("could not parse `()`");
        assert_eq!(ty, Ty::unit());

        let ty = TyParser::parse("(A, B)").expect("could not parse `(A, B)`");
        assert_eq!(ty, Ty::tuple(vec![Ty::con("A"), Ty::con("B")]));
    }

    #[test]
    fn parses_ty_with_params() {
        let ty = TyParser::parse("Eq[list['t]]").expect("could not parse `Eq[list['t]]`");
        assert_eq!(ty, Ty::proj("Eq", vec![Ty::list(Ty::var("'t"))]));

        let ty = TyParser::parse("Coll['c, 'e]").expect("could not parse `Coll['c, 'e]`");
        assert_eq!(ty, Ty::proj("Coll", vec![Ty::var("'c"), Ty::var("'e")]));
    }

    #[test]
    fn parses_fn_ty() {
        let ty = TyParser::parse("Fn(int, 'a) -> string")
            .expect("could not parse `Fn(int, 'a) -> string`");
        assert_eq!(ty, Ty::func(vec![Ty::int(), Ty::var("'a")], Ty::string()));
    }

    #[test]
    fn parses_sums_within_a_line() {
        let mut parser = TyParser::new("Eq['a] + Show['a] : rest");
        let tys = parser.parse_ty_sum().expect("could not parse sum");
        assert_eq!(
            tys,
            vec![
                Ty::proj("Eq", vec![Ty::var("'a")]),
                Ty::proj("Show", vec![Ty::var("'a")])
            ]
        );
        parser.expect(":").expect("expected `:`");
        assert!(parser.eat_keyword("rest"));
        assert!(parser.is_at_end());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(TyParser::parse("list[int").is_err());
        assert!(TyParser::parse("int int").is_err());
        assert!(TyParser::parse("").is_err());
        assert!(TyParser::parse("'").is_err());
    }
}
