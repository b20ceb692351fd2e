//! SQL identifier handling and dialect quoting.
//!
//! [`Ident`] represents a dotted identifier (`schema.table.column`). Grammars use
//! [`wrap`] to quote anything that parses as an identifier and to pass every other
//! fragment (function calls, raw expressions, deferred output) through untouched.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts (`"..."`) allow any characters except NUL and escape `"` as `""`
//! - A trailing `*` part is allowed (`users.*`)

use crate::error::{OrmError, OrmResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
    /// The `*` wildcard; only valid as the last part.
    Star,
}

/// Identifier quote characters for one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub open: char,
    pub close: char,
}

impl Quote {
    pub const DOUBLE: Quote = Quote {
        open: '"',
        close: '"',
    };
    pub const BACKTICK: Quote = Quote {
        open: '`',
        close: '`',
    };
    pub const BRACKET: Quote = Quote {
        open: '[',
        close: ']',
    };
}

/// A SQL identifier (column, table, or schema name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Wildcard: `users.*` or `*`
    pub fn parse(s: &str) -> OrmResult<Self> {
        if s.is_empty() {
            return Err(OrmError::invalid_argument("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(OrmError::invalid_argument(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                if matches!(parts.last(), Some(IdentPart::Star)) {
                    return Err(OrmError::invalid_argument("'*' must be the last part"));
                }
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(OrmError::invalid_argument("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(OrmError::invalid_argument(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'*') {
                chars.next();
                parts.push(IdentPart::Star);
                continue;
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(OrmError::invalid_argument("Unclosed quoted identifier"));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(OrmError::invalid_argument("Empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let ok = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !ok {
                    return Err(OrmError::invalid_argument(format!(
                        "Invalid character in identifier: '{c}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(OrmError::invalid_argument("Empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        Ok(Self { parts })
    }

    /// Render the identifier with the given quote characters.
    pub fn to_sql(&self, quote: Quote) -> String {
        let mut out = String::new();
        self.write_sql(quote, &mut out);
        out
    }

    pub(crate) fn write_sql(&self, quote: Quote, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            let name = match part {
                IdentPart::Star => {
                    out.push('*');
                    continue;
                }
                IdentPart::Unquoted(s) | IdentPart::Quoted(s) => s,
            };
            out.push(quote.open);
            for ch in name.chars() {
                if ch == quote.close {
                    out.push(ch);
                }
                out.push(ch);
            }
            out.push(quote.close);
        }
    }
}

/// Quote `expr` if it is an identifier, optionally with an `AS` alias; otherwise
/// return it verbatim.
pub fn wrap(expr: &str, quote: Quote) -> String {
    let trimmed = expr.trim();
    if let Some((left, right)) = split_alias(trimmed) {
        if let (Ok(l), Ok(r)) = (Ident::parse(left), Ident::parse(right)) {
            if r.parts.len() == 1 && !matches!(r.parts[0], IdentPart::Star) {
                return format!("{} AS {}", l.to_sql(quote), r.to_sql(quote));
            }
        }
        return trimmed.to_string();
    }
    match Ident::parse(trimmed) {
        Ok(ident) => ident.to_sql(quote),
        Err(_) => trimmed.to_string(),
    }
}

fn split_alias(expr: &str) -> Option<(&str, &str)> {
    let lower = expr.to_ascii_lowercase();
    let idx = lower.rfind(" as ")?;
    Some((expr[..idx].trim(), expr[idx + 4..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.to_sql(Quote::DOUBLE), r#""users""#);
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("public.users").unwrap();
        assert_eq!(ident.to_sql(Quote::BACKTICK), "`public`.`users`");
    }

    #[test]
    fn ident_quoted_with_escape() {
        let ident = Ident::parse(r#""has""quote""#).unwrap();
        assert_eq!(ident.to_sql(Quote::DOUBLE), r#""has""quote""#);
    }

    #[test]
    fn ident_bracket_escapes_close() {
        let ident = Ident::parse(r#""odd]name""#).unwrap();
        assert_eq!(ident.to_sql(Quote::BRACKET), "[odd]]name]");
    }

    #[test]
    fn ident_star() {
        assert_eq!(Ident::parse("u.*").unwrap().to_sql(Quote::DOUBLE), r#""u".*"#);
        assert!(Ident::parse("*.id").is_err());
    }

    #[test]
    fn ident_rejects() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1table").is_err());
        assert!(Ident::parse("my table").is_err());
        assert!(Ident::parse("schema..table").is_err());
        assert!(Ident::parse("schema.").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
    }

    #[test]
    fn wrap_aliases_and_passthrough() {
        assert_eq!(wrap("u.name as n", Quote::DOUBLE), r#""u"."name" AS "n""#);
        assert_eq!(wrap("*", Quote::BACKTICK), "*");
        assert_eq!(wrap("COUNT(*)", Quote::DOUBLE), "COUNT(*)");
        assert_eq!(wrap("COUNT(id) AS total", Quote::DOUBLE), "COUNT(id) AS total");
    }
}
