//!
//! Typed Value Representation
//!
//! A `TypedValue` is one of three numeric kinds. The kinds are ordered
//! `Integer < Float < Complex`; promotion only ever moves a value up that
//! order, never down.
//!

use std::fmt;

use crate::complex::Complex;

/// Kind tag of a `TypedValue`, ordered by width
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Integer,
    Float,
    Complex,
}

impl ValueKind {
    pub const ALL: [ValueKind; 3] = [ValueKind::Integer, ValueKind::Float, ValueKind::Complex];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Complex(Complex),
}

impl TypedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::Integer(_) => ValueKind::Integer,
            TypedValue::Float(_) => ValueKind::Float,
            TypedValue::Complex(_) => ValueKind::Complex,
        }
    }

    /// Widen to `kind`. Asking for a narrower kind returns the value unchanged.
    pub fn promote(self, kind: ValueKind) -> TypedValue {
        if kind <= self.kind() {
            return self;
        }
        match (self, kind) {
            (TypedValue::Integer(i), ValueKind::Float) => TypedValue::Float(i as f64),
            (TypedValue::Integer(i), ValueKind::Complex) => {
                TypedValue::Complex(Complex::from(i as f64))
            }
            (TypedValue::Float(x), ValueKind::Complex) => TypedValue::Complex(Complex::from(x)),
            (value, _) => value,
        }
    }

    /// Absolute value for reals, modulus for complex numbers
    pub fn magnitude(&self) -> f64 {
        match self {
            TypedValue::Integer(i) => (*i as f64).abs(),
            TypedValue::Float(x) => x.abs(),
            TypedValue::Complex(z) => z.norm(),
        }
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Integer(value)
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        TypedValue::Float(value)
    }
}

impl From<Complex> for TypedValue {
    fn from(value: Complex) -> Self {
        TypedValue::Complex(value)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Float(x) => write!(f, "{:.2}", x),
            TypedValue::Complex(z) => write!(f, "{}", z),
        }
    }
}
