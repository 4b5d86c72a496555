use super::number::Number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena index of a value within its transformation. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl ValueId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// Arena index of an operation within its transformation. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct OperationId(pub u32);

impl OperationId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// A single datum flowing through the graph: a literal or an operation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    Number(Number),
    Text(String),
    Bool(bool),
    List(Vec<Datum>),
}

impl Datum {
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Datum]> {
        match self {
            Datum::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Datum::Number(_) => ValueType::Number,
            Datum::Text(_) => ValueType::Text,
            Datum::Bool(_) => ValueType::Bool,
            Datum::List(_) => ValueType::List,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Number(n) => write!(f, "{}", n),
            Datum::Text(s) => write!(f, "\"{}\"", s),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<Number> for Datum {
    fn from(n: Number) -> Self {
        Datum::Number(n)
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Datum::Number(Number::Int(i))
    }
}

impl From<i32> for Datum {
    fn from(i: i32) -> Self {
        Datum::Number(Number::Int(i as i64))
    }
}

impl From<f64> for Datum {
    fn from(f: f64) -> Self {
        Datum::Number(Number::Float(f))
    }
}

impl From<rust_decimal::Decimal> for Datum {
    fn from(d: rust_decimal::Decimal) -> Self {
        Datum::Number(Number::Decimal(d))
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

/// The closed set of type tags a descriptor can demand of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Any,
    Number,
    Text,
    Bool,
    List,
}

impl ValueType {
    /// Runtime "instance of" check.
    pub fn accepts(&self, datum: &Datum) -> bool {
        match self {
            ValueType::Any => true,
            other => *other == datum.value_type(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Any => "Any",
            ValueType::Number => "Number",
            ValueType::Text => "Text",
            ValueType::Bool => "Bool",
            ValueType::List => "List",
        }
    }
}

/// Where a value's datum comes from when it is fetched.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    Literal(Datum),
    /// Proxies the live result of another operation.
    Output(OperationId),
}

/// A named term that operations consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub id: ValueId,
    pub name: String,
    pub value_type: ValueType,
    pub source: ValueSource,
}

impl Value {
    pub fn is_literal(&self) -> bool {
        matches!(self.source, ValueSource::Literal(_))
    }

    /// The producing operation, for exposed outputs.
    pub fn upstream(&self) -> Option<OperationId> {
        match self.source {
            ValueSource::Output(op) => Some(op),
            ValueSource::Literal(_) => None,
        }
    }
}
