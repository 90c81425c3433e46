use std::fmt;

/// Static type of an expression or runtime value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// The `null` value.
    Null,
    /// IEEE-754 double.
    Number,
    /// UTF-8 string.
    String,
    /// `true` / `false`.
    Boolean,
    /// Premultiplied RGBA color.
    Color,
    /// String-keyed map of values.
    Object,
    /// Top type: any concrete kind.
    Value,
    /// Array of `item`, optionally of a fixed length.
    Array {
        /// Element type.
        item: Box<Type>,
        /// Fixed length, when known.
        len: Option<usize>,
    },
    /// Bottom type, produced by `["error", ..]`.
    Error,
}

impl Type {
    /// `array<item>` or `array<item, len>`.
    pub fn array(item: Type, len: Option<usize>) -> Self {
        Self::Array {
            item: Box::new(item),
            len,
        }
    }

    /// Lowercase kind name (`"array"` for every array type).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::Object => "object",
            Self::Value => "value",
            Self::Array { .. } => "array",
            Self::Error => "error",
        }
    }

    /// Concrete kinds that `value` is a supertype of.
    fn value_members() -> [Type; 7] {
        [
            Self::Null,
            Self::Number,
            Self::String,
            Self::Boolean,
            Self::Color,
            Self::Object,
            Self::array(Self::Value, None),
        ]
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array {
                item,
                len: Some(n),
            } => write!(f, "array<{item}, {n}>"),
            Self::Array { item, len: None } if **item == Self::Value => f.write_str("array"),
            Self::Array { item, len: None } => write!(f, "array<{item}>"),
            other => f.write_str(other.kind()),
        }
    }
}

/// `Ok(())` when `actual` may be used where `expected` is required, otherwise the mismatch
/// message.
pub fn check_subtype(expected: &Type, actual: &Type) -> Result<(), String> {
    let ok = match (expected, actual) {
        (_, Type::Error) => true,
        (
            Type::Array {
                item: expected_item,
                len: expected_len,
            },
            Type::Array {
                item: actual_item,
                len: actual_len,
            },
        ) => {
            check_subtype(expected_item, actual_item).is_ok()
                && (expected_len.is_none() || expected_len == actual_len)
        }
        (Type::Array { .. }, _) => false,
        (e, a) if e.kind() == a.kind() => true,
        (Type::Value, t) => Type::value_members()
            .iter()
            .any(|member| check_subtype(member, t).is_ok()),
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(format!("Expected {expected} but found {actual} instead."))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/types.rs"]
mod tests;
