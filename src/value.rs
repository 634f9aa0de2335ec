//! Typed operand values and literal coercion
//!
//! Rule operands arrive as raw literals (`min=1`, `between=0.5,2.5`). They are
//! coerced against a [`TypeClass`] before code generation so the emitted
//! constructor can write a correctly typed Rust literal.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Type classification of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    SignedInteger,
    UnsignedInteger,
    Float,
    String,
    Boolean,
}

impl TypeClass {
    /// Classify a host type name (`u32`, `&str`, `f64`, ...)
    ///
    /// Returns `None` for anything outside the five supported classes.
    pub fn from_host_type(ty: &str) -> Option<Self> {
        match ty.trim() {
            "i8" | "i16" | "i32" | "i64" | "isize" | "int" => Some(Self::SignedInteger),
            "u8" | "u16" | "u32" | "u64" | "usize" | "uint" => Some(Self::UnsignedInteger),
            "f32" | "f64" | "float" => Some(Self::Float),
            "String" | "str" | "&str" | "&'static str" | "string" => Some(Self::String),
            "bool" | "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Canonical Rust type the generated validators operate on
    pub fn rust_type(&self) -> &'static str {
        match self {
            Self::SignedInteger => "i64",
            Self::UnsignedInteger => "u64",
            Self::Float => "f64",
            Self::String => "String",
            Self::Boolean => "bool",
        }
    }

    /// Lower-case fragment used in validator function names
    pub fn ident_fragment(&self) -> &'static str {
        match self {
            Self::String => "string",
            other => other.rust_type(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::SignedInteger | Self::UnsignedInteger | Self::Float)
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SignedInteger => "signed-integer",
            Self::UnsignedInteger => "unsigned-integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Parsed payload of a [`Value`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// A typed operand: classification, raw literal and parsed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub class: TypeClass,
    pub raw: String,
    pub literal: Literal,
}

/// Failure to coerce a literal into a numeric or boolean class
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{literal}` is not a valid {class} literal")]
pub struct CoercionError {
    pub class: TypeClass,
    pub literal: String,
}

impl Value {
    /// The zero value of a class (`0`, `0.0`, `""`, `false`)
    pub fn zero(class: TypeClass) -> Self {
        let literal = match class {
            TypeClass::SignedInteger => Literal::Signed(0),
            TypeClass::UnsignedInteger => Literal::Unsigned(0),
            TypeClass::Float => Literal::Float(0.0),
            TypeClass::String => Literal::Str(String::new()),
            TypeClass::Boolean => Literal::Bool(false),
        };
        Self {
            class,
            raw: String::new(),
            literal,
        }
    }

    /// A string-class value holding `raw` verbatim
    pub fn string(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            class: TypeClass::String,
            literal: Literal::Str(raw.clone()),
            raw,
        }
    }

    /// Render as a Rust expression of the class's canonical type
    pub fn to_rust_literal(&self) -> String {
        match &self.literal {
            Literal::Signed(v) => v.to_string(),
            Literal::Unsigned(v) => v.to_string(),
            // Debug keeps the fractional part (`1.0`), which a float context requires
            Literal::Float(v) => format!("{:?}", v),
            Literal::Bool(v) => v.to_string(),
            Literal::Str(v) => format!("{:?}.to_string()", v),
        }
    }
}

/// Stringification used in messages and conditional comparisons.
///
/// Whole floats print without a fractional part (`0`, not `0.0`), matching
/// `f64::to_string` in the generated code.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Literal::Signed(v) => write!(f, "{}", v),
            Literal::Unsigned(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Str(v) => f.write_str(v),
        }
    }
}

/// Coerce a raw operand literal into a value of `class`.
///
/// Strings pass through unchanged. Numeric and boolean classes must parse;
/// non-finite floats are rejected since they have no Rust literal form.
pub fn coerce(class: TypeClass, raw: &str) -> Result<Value, CoercionError> {
    let fail = || CoercionError {
        class,
        literal: raw.to_string(),
    };
    let literal = match class {
        TypeClass::SignedInteger => Literal::Signed(raw.parse().map_err(|_| fail())?),
        TypeClass::UnsignedInteger => Literal::Unsigned(raw.parse().map_err(|_| fail())?),
        TypeClass::Float => {
            let v: f64 = raw.parse().map_err(|_| fail())?;
            if !v.is_finite() {
                return Err(fail());
            }
            Literal::Float(v)
        }
        TypeClass::Boolean => match raw {
            "true" | "1" => Literal::Bool(true),
            "false" | "0" => Literal::Bool(false),
            _ => return Err(fail()),
        },
        TypeClass::String => Literal::Str(raw.to_string()),
    };
    Ok(Value {
        class,
        raw: raw.to_string(),
        literal,
    })
}

/// Coerce, falling back to the class's zero value on a parse failure.
///
/// This reproduces the historical lenient behaviour where a malformed numeric
/// operand silently became a zero threshold.
pub fn coerce_lenient(class: TypeClass, raw: &str) -> Value {
    match coerce(class, raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "operand defaulted to zero");
            Value {
                raw: raw.to_string(),
                ..Value::zero(class)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_host_types() {
        assert_eq!(TypeClass::from_host_type("i32"), Some(TypeClass::SignedInteger));
        assert_eq!(TypeClass::from_host_type("usize"), Some(TypeClass::UnsignedInteger));
        assert_eq!(TypeClass::from_host_type("f32"), Some(TypeClass::Float));
        assert_eq!(TypeClass::from_host_type("&str"), Some(TypeClass::String));
        assert_eq!(TypeClass::from_host_type("bool"), Some(TypeClass::Boolean));
        assert_eq!(TypeClass::from_host_type("Vec<u8>"), None);
        assert_eq!(TypeClass::from_host_type("i128"), None);
    }

    #[test]
    fn test_coerce_numeric() {
        let v = coerce(TypeClass::SignedInteger, "-12").unwrap();
        assert_eq!(v.literal, Literal::Signed(-12));
        assert_eq!(v.raw, "-12");

        let v = coerce(TypeClass::UnsignedInteger, "1000").unwrap();
        assert_eq!(v.literal, Literal::Unsigned(1000));

        let v = coerce(TypeClass::Float, "2.5").unwrap();
        assert_eq!(v.literal, Literal::Float(2.5));
    }

    #[test]
    fn test_coerce_rejects_garbage() {
        assert!(coerce(TypeClass::SignedInteger, "ten").is_err());
        assert!(coerce(TypeClass::UnsignedInteger, "-1").is_err());
        assert!(coerce(TypeClass::Float, "inf").is_err());
        assert!(coerce(TypeClass::Boolean, "yes").is_err());
    }

    #[test]
    fn test_coerce_string_passthrough() {
        let v = coerce(TypeClass::String, "42").unwrap();
        assert_eq!(v.literal, Literal::Str("42".to_string()));
    }

    #[test]
    fn test_lenient_falls_back_to_zero() {
        let v = coerce_lenient(TypeClass::SignedInteger, "abc");
        assert_eq!(v.literal, Literal::Signed(0));
        assert_eq!(v.raw, "abc");
    }

    #[test]
    fn test_float_stringification() {
        assert_eq!(coerce(TypeClass::Float, "0.0").unwrap().to_string(), "0");
        assert_eq!(coerce(TypeClass::Float, "1000").unwrap().to_string(), "1000");
        assert_eq!(coerce(TypeClass::Float, "1.50").unwrap().to_string(), "1.5");
    }

    #[test]
    fn test_rust_literals() {
        assert_eq!(coerce(TypeClass::Float, "1").unwrap().to_rust_literal(), "1.0");
        assert_eq!(coerce(TypeClass::SignedInteger, "-3").unwrap().to_rust_literal(), "-3");
        assert_eq!(
            Value::string("a\"b").to_rust_literal(),
            "\"a\\\"b\".to_string()"
        );
    }
}
