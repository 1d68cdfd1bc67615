//! Return-value shaping for proxy calls.

use busk_core::Value;

/// How proxy calls present their return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiOptions {
    /// Always return every value as [`Output::Multiple`], even zero or one.
    pub proxy_method_returns_array: bool,
}

impl ApiOptions {
    /// Every call returns [`Output::Multiple`].
    pub const A0: Self = Self {
        proxy_method_returns_array: true,
    };

    /// Zero values return [`Output::Unit`], one value [`Output::Single`].
    pub const A1: Self = Self {
        proxy_method_returns_array: false,
    };

    /// Shape the values of one reply.
    pub fn shape(&self, mut values: Vec<Value>) -> Output {
        if self.proxy_method_returns_array {
            return Output::Multiple(values);
        }
        match values.len() {
            0 => Output::Unit,
            1 => Output::Single(values.remove(0)),
            _ => Output::Multiple(values),
        }
    }
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self::A1
    }
}

/// Return values of a proxy call.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// No value.
    Unit,
    /// Exactly one value.
    Single(Value),
    /// The values in order.
    Multiple(Vec<Value>),
}

impl Output {
    /// The values in order, whatever the shape.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Output::Unit => Vec::new(),
            Output::Single(value) => vec![value],
            Output::Multiple(values) => values,
        }
    }

    /// The single value, if the output has that shape.
    pub fn single(self) -> Option<Value> {
        match self {
            Output::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Whether there is no value.
    pub fn is_unit(&self) -> bool {
        matches!(self, Output::Unit)
    }
}
