//! Operator catalog and the small enumerations shared by the builder and grammars.
//!
//! The operator set is closed: every predicate-building call parses its operator
//! through [`Operator::parse`], so nothing outside the catalog ever reaches a grammar.

use std::fmt;
use std::str::FromStr;

use crate::error::{OrmError, OrmResult};

/// Comparison and pattern operators accepted by `where`/`on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Lt,
    Gt,
    Lte,
    Gte,
    /// `<>`
    NotEqAnsi,
    /// `!=`
    NotEq,
    Like,
    LikeBinary,
    NotLike,
    Between,
    Ilike,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Rlike,
    Regexp,
    NotRegexp,
    /// `~`
    Match,
    /// `~*`
    MatchInsensitive,
    /// `!~`
    NotMatch,
    /// `!~*`
    NotMatchInsensitive,
    SimilarTo,
    NotSimilarTo,
    In,
}

const CATALOG: &[(&str, Operator)] = &[
    ("=", Operator::Eq),
    ("<", Operator::Lt),
    (">", Operator::Gt),
    ("<=", Operator::Lte),
    (">=", Operator::Gte),
    ("<>", Operator::NotEqAnsi),
    ("!=", Operator::NotEq),
    ("like", Operator::Like),
    ("like binary", Operator::LikeBinary),
    ("not like", Operator::NotLike),
    ("between", Operator::Between),
    ("ilike", Operator::Ilike),
    ("&", Operator::BitAnd),
    ("|", Operator::BitOr),
    ("^", Operator::BitXor),
    ("<<", Operator::ShiftLeft),
    (">>", Operator::ShiftRight),
    ("rlike", Operator::Rlike),
    ("regexp", Operator::Regexp),
    ("not regexp", Operator::NotRegexp),
    ("~", Operator::Match),
    ("~*", Operator::MatchInsensitive),
    ("!~", Operator::NotMatch),
    ("!~*", Operator::NotMatchInsensitive),
    ("similar to", Operator::SimilarTo),
    ("not similar to", Operator::NotSimilarTo),
    ("in", Operator::In),
];

impl Operator {
    /// Parse an operator, case-insensitively, against the catalog.
    pub fn parse(op: &str) -> OrmResult<Self> {
        let needle = op.trim();
        CATALOG
            .iter()
            .find(|(token, _)| token.eq_ignore_ascii_case(needle))
            .map(|(_, op)| *op)
            .ok_or_else(|| OrmError::InvalidOperator(op.to_string()))
    }

    /// The SQL token for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::NotEqAnsi => "<>",
            Operator::NotEq => "!=",
            Operator::Like => "LIKE",
            Operator::LikeBinary => "LIKE BINARY",
            Operator::NotLike => "NOT LIKE",
            Operator::Between => "BETWEEN",
            Operator::Ilike => "ILIKE",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::ShiftLeft => "<<",
            Operator::ShiftRight => ">>",
            Operator::Rlike => "RLIKE",
            Operator::Regexp => "REGEXP",
            Operator::NotRegexp => "NOT REGEXP",
            Operator::Match => "~",
            Operator::MatchInsensitive => "~*",
            Operator::NotMatch => "!~",
            Operator::NotMatchInsensitive => "!~*",
            Operator::SimilarTo => "SIMILAR TO",
            Operator::NotSimilarTo => "NOT SIMILAR TO",
            Operator::In => "IN",
        }
    }

    /// Whether comparing against NULL with this operator means "is not null".
    pub(crate) fn is_negated_equality(self) -> bool {
        matches!(self, Operator::NotEq | Operator::NotEqAnsi)
    }
}

impl FromStr for Operator {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Case-insensitive membership test against the operator catalog.
pub fn is_valid_operator(op: &str) -> bool {
    Operator::parse(op).is_ok()
}

/// Boolean connective joining a predicate to the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boolean {
    #[default]
    And,
    Or,
}

impl Boolean {
    pub fn as_sql(self) -> &'static str {
        match self {
            Boolean::And => "AND",
            Boolean::Or => "OR",
        }
    }
}

/// Join flavours understood by the grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Join,
    Left,
    LeftOuter,
    LeftInner,
    Right,
    RightOuter,
    RightInner,
    Outer,
    Inner,
    Cross,
    Full,
    FullOuter,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Join => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::LeftOuter => "LEFT OUTER JOIN",
            JoinType::LeftInner => "LEFT INNER JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::RightOuter => "RIGHT OUTER JOIN",
            JoinType::RightInner => "RIGHT INNER JOIN",
            JoinType::Outer => "OUTER JOIN",
            JoinType::Inner => "INNER JOIN",
            JoinType::Cross => "CROSS JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::FullOuter => "FULL OUTER JOIN",
        }
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Parse `asc`/`desc` in any case.
    pub fn parse(s: &str) -> OrmResult<Self> {
        match s.trim() {
            d if d.eq_ignore_ascii_case("asc") => Ok(Direction::Asc),
            d if d.eq_ignore_ascii_case("desc") => Ok(Direction::Desc),
            other => Err(OrmError::invalid_argument(format!(
                "order direction must be ASC or DESC, got '{other}'"
            ))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// What kind of statement a builder produces.
///
/// A builder starts as `None` and takes its kind from the first intent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Random,
    Raw,
    #[default]
    None,
}
