use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Operators of the NXQL predicate language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Sum,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    NotEq,
    LtEq,
    GtEq,
    And,
    Not,
    Or,
    Like,
    ILike,
    In,
    Between,
    NotLike,
    NotILike,
    NotIn,
    NotBetween,
    IsNull,
    IsNotNull,
    StartsWith,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Sum => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::LtEq => "<=",
            Operator::GtEq => ">=",
            Operator::And => "AND",
            Operator::Not => "NOT",
            Operator::Or => "OR",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::NotLike => "NOT LIKE",
            Operator::NotILike => "NOT ILIKE",
            Operator::NotIn => "NOT IN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::StartsWith => "STARTSWITH",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Operator::Sum | Operator::Sub | Operator::Mul | Operator::Div)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::NotEq | Operator::Lt | Operator::Gt | Operator::LtEq | Operator::GtEq
        )
    }
}

/// A date or timestamp literal. `only_date` is set for `DATE '2024-01-31'`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateLiteral {
    pub value: DateTime<Utc>,
    pub only_date: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Date(DateLiteral),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cast {
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub cast: Option<Cast>,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Reference {
            name: name.into(),
            cast: None,
        }
    }

    pub fn with_cast(name: impl Into<String>, cast: Cast) -> Self {
        Reference {
            name: name.into(),
            cast: Some(cast),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub args: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Reference(Reference),
    Literal(Literal),
    LiteralList(Vec<Literal>),
    Expression(Box<Expression>),
    MultiExpression(MultiExpression),
    Function(Function),
}

impl Operand {
    pub fn reference(name: impl Into<String>) -> Self {
        Operand::Reference(Reference::new(name))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Operand::Literal(Literal::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Operand::Literal(Literal::Integer(value))
    }

    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Operand::LiteralList(values.into_iter().map(|v| Literal::String(v.into())).collect())
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Operand::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Operand::Literal(l) => Some(l),
            _ => None,
        }
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Operand::Expression(Box::new(expr))
    }
}

impl From<MultiExpression> for Operand {
    fn from(expr: MultiExpression) -> Self {
        Operand::MultiExpression(expr)
    }
}

/// Binary or unary expression. Unary operators (`NOT`, `IS NULL`,
/// `IS NOT NULL`) keep their operand in `lvalue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub operator: Operator,
    pub lvalue: Operand,
    pub rvalue: Option<Operand>,
}

impl Expression {
    pub fn new(lvalue: Operand, operator: Operator, rvalue: Operand) -> Self {
        Expression {
            operator,
            lvalue,
            rvalue: Some(rvalue),
        }
    }

    pub fn unary(operator: Operator, operand: Operand) -> Self {
        Expression {
            operator,
            lvalue: operand,
            rvalue: None,
        }
    }

    pub fn and(lvalue: impl Into<Operand>, rvalue: impl Into<Operand>) -> Self {
        Expression::new(lvalue.into(), Operator::And, rvalue.into())
    }

    pub fn or(lvalue: impl Into<Operand>, rvalue: impl Into<Operand>) -> Self {
        Expression::new(lvalue.into(), Operator::Or, rvalue.into())
    }

    pub fn not(operand: impl Into<Operand>) -> Self {
        Expression::unary(Operator::Not, operand.into())
    }

    /// Name of the left-hand reference, if the left side is one.
    pub fn reference_name(&self) -> Option<&str> {
        self.lvalue.as_reference().map(|r| r.name.as_str())
    }
}

/// N-ary `AND` or `OR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiExpression {
    pub operator: Operator,
    pub operands: Vec<Operand>,
}

impl MultiExpression {
    pub fn and(operands: Vec<Operand>) -> Self {
        MultiExpression {
            operator: Operator::And,
            operands,
        }
    }

    pub fn or(operands: Vec<Operand>) -> Self {
        MultiExpression {
            operator: Operator::Or,
            operands,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Literal::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Double(v) => write!(f, "{:?}", v),
            Literal::Date(d) if d.only_date => write!(f, "DATE '{}'", d.value.format("%Y-%m-%d")),
            Literal::Date(d) => write!(f, "TIMESTAMP '{}'", d.value.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cast {
            Some(Cast::Date) => write!(f, "DATE({})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reference(r) => r.fmt(f),
            Operand::Literal(l) => l.fmt(f),
            Operand::LiteralList(list) => {
                f.write_str("(")?;
                for (i, l) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    l.fmt(f)?;
                }
                f.write_str(")")
            }
            Operand::Expression(e) => write!(f, "({})", e),
            Operand::MultiExpression(m) => write!(f, "({})", m),
            Operand::Function(func) => {
                write!(f, "{}(", func.name)?;
                for (i, arg) in func.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.operator, &self.rvalue) {
            (Operator::Not, _) => write!(f, "NOT {}", self.lvalue),
            (Operator::IsNull | Operator::IsNotNull, _) => {
                write!(f, "{} {}", self.lvalue, self.operator.symbol())
            }
            (Operator::Between | Operator::NotBetween, Some(Operand::LiteralList(range)))
                if range.len() == 2 =>
            {
                write!(f, "{} {} {} AND {}", self.lvalue, self.operator.symbol(), range[0], range[1])
            }
            (op, Some(rvalue)) => write!(f, "{} {} {}", self.lvalue, op.symbol(), rvalue),
            (op, None) => write!(f, "{} {}", op.symbol(), self.lvalue),
        }
    }
}

impl fmt::Display for MultiExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!(" {} ", self.operator.symbol());
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                f.write_str(&separator)?;
            }
            operand.fmt(f)?;
        }
        Ok(())
    }
}
