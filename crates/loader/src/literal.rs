//! Argument literal decoding: `type` attribute + element text → [`Argument`].

use crate::error::LoadError;
use ippcode_common::value::decode_escapes;
use ippcode_common::{Argument, TypeTag, Value, Variable};

/// Decode one argument. `text` is already trimmed.
pub(crate) fn parse_argument(order: u64, kind: &str, text: &str) -> Result<Argument, LoadError> {
    let invalid = |kind: &'static str| LoadError::InvalidLiteral {
        order,
        kind,
        text: text.to_string(),
    };

    let value = match kind {
        "var" => {
            return Variable::parse(text)
                .map(Argument::Var)
                .ok_or_else(|| invalid("var"));
        }
        "int" => text.parse::<i64>().map(Value::Int).map_err(|_| invalid("int"))?,
        "bool" => match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(invalid("bool")),
        },
        "string" => Value::Str(decode_escapes(text)),
        "nil" if text == "nil" => Value::Nil,
        "nil" => return Err(invalid("nil")),
        "type" => TypeTag::from_name(text)
            .map(Value::TypeName)
            .ok_or_else(|| invalid("type"))?,
        "label" if !text.is_empty() => Value::Label(text.to_string()),
        "label" => return Err(invalid("label")),
        other => {
            return Err(LoadError::UnknownArgumentType {
                order,
                kind: other.to_string(),
            })
        }
    };

    Ok(Argument::Const(value))
}
