//! Argument and return values.
//!
//! [`Value`] is the in-memory form of a single message parameter. Encoding it
//! on the wire is the transport's business; this crate only moves values
//! between messages and handlers.

use crate::{error::BoxError, name::ObjectPath};
use thiserror::Error;

/// A single message parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `y`
    Byte(u8),
    /// `b`
    Bool(bool),
    /// `n`
    Int16(i16),
    /// `q`
    UInt16(u16),
    /// `i`
    Int32(i32),
    /// `u`
    UInt32(u32),
    /// `x`
    Int64(i64),
    /// `t`
    UInt64(u64),
    /// `d`
    Double(f64),
    /// `s`
    Str(String),
    /// `o`
    ObjectPath(ObjectPath),
    /// `g`
    Signature(String),
    /// `a…`
    Array(Vec<Value>),
    /// `(…)`
    Struct(Vec<Value>),
    /// `a{…}`
    Dict(Vec<(Value, Value)>),
    /// `v`
    Variant(Box<Value>),
}

impl Value {
    /// Short human-readable name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Byte(_) => "byte",
            Value::Bool(_) => "bool",
            Value::Int16(_) => "int16",
            Value::UInt16(_) => "uint16",
            Value::Int32(_) => "int32",
            Value::UInt32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::ObjectPath(_) => "object path",
            Value::Signature(_) => "signature",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Dict(_) => "dict",
            Value::Variant(_) => "variant",
        }
    }

    /// Wrap the value in a variant.
    pub fn into_variant(self) -> Value {
        Value::Variant(Box::new(self))
    }

    /// Strip any number of variant layers.
    pub fn unwrap_variant(self) -> Value {
        match self {
            Value::Variant(inner) => inner.unwrap_variant(),
            other => other,
        }
    }

    /// The string payload of `Str`, `ObjectPath` and `Signature` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Signature(s) => Some(s),
            Value::ObjectPath(p) => Some(p.as_str()),
            _ => None,
        }
    }
}

macro_rules! scalar_value {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl IntoReturn for $ty {
                fn into_return(self) -> Result<Vec<Value>, BoxError> {
                    Ok(vec![self.into()])
                }
            }
        )*
    };
}

scalar_value! {
    u8 => Byte, "byte";
    bool => Bool, "bool";
    i16 => Int16, "int16";
    u16 => UInt16, "uint16";
    i32 => Int32, "int32";
    u32 => UInt32, "uint32";
    i64 => Int64, "int64";
    u64 => UInt64, "uint64";
    f64 => Double, "double";
    String => Str, "string";
    ObjectPath => ObjectPath, "object path";
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

// ============================================================================
// Handler arguments
// ============================================================================

/// Conversion from a borrowed [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    /// Name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Convert, or `None` when the value has another shape.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE_NAME: &'static str = "array";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

/// An argument could not be extracted from a call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// Fewer arguments than requested.
    #[error("missing argument {index}")]
    Missing {
        /// Position of the argument.
        index: usize,
    },

    /// The argument has another type.
    #[error("argument {index}: expected {expected}, found {found}")]
    Type {
        /// Position of the argument.
        index: usize,
        /// Requested type.
        expected: &'static str,
        /// Actual type.
        found: &'static str,
    },
}

/// Ordered positional arguments of a call or signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    /// Wrap positional values.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extract the argument at `index` as `T`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T, ArgError> {
        let value = self.0.get(index).ok_or(ArgError::Missing { index })?;
        T::from_value(value).ok_or(ArgError::Type {
            index,
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    /// The raw values.
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Consume into the raw values.
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ============================================================================
// Handler return values
// ============================================================================

/// Conversion of a handler's output into the ordered return values of a reply.
///
/// # Default Implementations
///
/// - `()` → no values
/// - scalars, `&'static str` and [`Value`] → one value
/// - `Vec<Value>` → the values in order
/// - tuples of up to four `Into<Value>` items → one value per item
/// - `Result<T, E>` → delegates to `T` or propagates the error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a method return",
    label = "missing `IntoReturn` implementation",
    note = "Return a scalar, a `Value`, a `Vec<Value>`, a tuple, or a `Result` of one of these."
)]
pub trait IntoReturn {
    /// Normalize into an ordered sequence of values.
    fn into_return(self) -> Result<Vec<Value>, BoxError>;
}

impl IntoReturn for () {
    fn into_return(self) -> Result<Vec<Value>, BoxError> {
        Ok(Vec::new())
    }
}

impl IntoReturn for Value {
    fn into_return(self) -> Result<Vec<Value>, BoxError> {
        Ok(vec![self])
    }
}

impl IntoReturn for &'static str {
    fn into_return(self) -> Result<Vec<Value>, BoxError> {
        Ok(vec![self.into()])
    }
}

impl IntoReturn for Vec<Value> {
    fn into_return(self) -> Result<Vec<Value>, BoxError> {
        Ok(self)
    }
}

macro_rules! tuple_return {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoReturn for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_return(self) -> Result<Vec<Value>, BoxError> {
                let ($($name,)+) = self;
                Ok(vec![$($name.into()),+])
            }
        }
    };
}

tuple_return!(A);
tuple_return!(A, B);
tuple_return!(A, B, C);
tuple_return!(A, B, C, D);

impl<T, E> IntoReturn for Result<T, E>
where
    T: IntoReturn,
    E: Into<BoxError>,
{
    fn into_return(self) -> Result<Vec<Value>, BoxError> {
        match self {
            Ok(t) => t.into_return(),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_get() {
        let args = Args::new(vec![Value::from("hi"), Value::from(7u32)]);
        assert_eq!(args.get::<String>(0), Ok("hi".to_string()));
        assert_eq!(args.get::<u32>(1), Ok(7));
        assert_eq!(args.get::<u32>(2), Err(ArgError::Missing { index: 2 }));
        assert_eq!(
            args.get::<bool>(0),
            Err(ArgError::Type {
                index: 0,
                expected: "bool",
                found: "string",
            })
        );
    }

    #[test]
    fn test_args_get_array() {
        let args = Args::new(vec![Value::Array(vec![1i32.into(), 2i32.into()])]);
        assert_eq!(args.get::<Vec<i32>>(0), Ok(vec![1, 2]));
        assert!(args.get::<Vec<String>>(0).is_err());
    }

    #[test]
    fn test_into_return_scalar_is_single_value() {
        assert_eq!(42u32.into_return().unwrap(), vec![Value::UInt32(42)]);
        assert_eq!("x".into_return().unwrap(), vec![Value::from("x")]);
        assert!(().into_return().unwrap().is_empty());
    }

    #[test]
    fn test_into_return_tuple_and_result() {
        let values = (1i32, "two", true).into_return().unwrap();
        assert_eq!(
            values,
            vec![Value::Int32(1), Value::from("two"), Value::Bool(true)]
        );

        let failed: Result<u32, BoxError> = Err("nope".into());
        assert_eq!(failed.into_return().unwrap_err().to_string(), "nope");
    }

    #[test]
    fn test_unwrap_variant() {
        let v = Value::from(3u8).into_variant().into_variant();
        assert_eq!(v.unwrap_variant(), Value::Byte(3));
    }
}
