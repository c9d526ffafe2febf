//! Runtime value representation for the IPPcode23 VM.
//!
//! Values are what live in variables and on the operand stack. Two extra
//! variants, [`Value::TypeName`] and [`Value::Label`], only ever appear as
//! instruction operands and are never stored.

use std::cmp::Ordering;
use std::fmt;

use crate::type_tag::TypeTag;

/// Runtime value representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Character string. Listing escapes are already decoded.
    Str(String),
    /// The `nil` value.
    Nil,
    /// A `type` operand, e.g. the target type of `READ`.
    TypeName(TypeTag),
    /// A `label` operand, i.e. a jump target name.
    Label(String),
}

impl Value {
    /// Dynamic type of a storable value. `None` for operand-only descriptors.
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Int(_) => Some(TypeTag::Int),
            Value::Bool(_) => Some(TypeTag::Bool),
            Value::Str(_) => Some(TypeTag::String),
            Value::Nil => Some(TypeTag::Nil),
            Value::TypeName(_) | Value::Label(_) => None,
        }
    }

    /// Whether this value may be held in a variable or on the operand stack.
    pub fn is_storable(&self) -> bool {
        self.type_tag().is_some()
    }

    /// Source-level kind name, as used in listings and BREAK dumps.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::TypeName(_) => "type",
            Value::Label(_) => "label",
            other => other.type_tag().map(|tt| tt.name()).unwrap_or_default(),
        }
    }

    /// Equality under the `EQ` rule.
    ///
    /// `nil` compares with anything (equal only to `nil`); otherwise both
    /// sides must have the same storable type. Returns `None` when the
    /// operands are not comparable.
    pub fn equals(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Nil, Value::Nil) => Some(true),
            (Value::Nil, v) | (v, Value::Nil) => v.is_storable().then_some(false),
            _ => self.compare(other).map(|ord| ord == Ordering::Equal),
        }
    }

    /// Ordering under the `LT`/`GT` rule.
    ///
    /// Both sides must be the same non-nil type: integers compare
    /// numerically, booleans with `false < true`, strings by code point.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.chars().cmp(b.chars())),
            _ => None,
        }
    }

    /// The text `WRITE` prints for this value.
    ///
    /// Strings print verbatim, `nil` prints as nothing, booleans as
    /// `true`/`false`.
    pub fn render(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.clone(),
            Value::Nil => String::new(),
            Value::TypeName(tt) => tt.name().to_string(),
            Value::Label(name) => name.clone(),
        }
    }
}

/// `type@literal` form, e.g. `int@42` or `string@abc`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "int@{n}"),
            Value::Bool(b) => write!(f, "bool@{b}"),
            Value::Str(s) => write!(f, "string@{s}"),
            Value::Nil => f.write_str("nil@nil"),
            Value::TypeName(tt) => write!(f, "type@{tt}"),
            Value::Label(name) => write!(f, "label@{name}"),
        }
    }
}

/// Decode `\ddd` escapes (a backslash followed by exactly three decimal
/// digits) into the character with that code point.
///
/// A backslash not followed by three digits is kept as-is.
pub fn decode_escapes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\\' {
            if let Some(decoded) = escape_at(&chars[i + 1..]) {
                out.push(decoded);
                i += 4;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn escape_at(rest: &[char]) -> Option<char> {
    let digits = rest.get(..3)?;
    let mut code = 0u32;
    for d in digits {
        code = code * 10 + d.to_digit(10)?;
    }
    char::from_u32(code)
}
