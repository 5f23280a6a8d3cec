///
/// Arithmetic evaluation over typed values.
///
/// Both operands are widened to the larger of their two kinds, then the
/// operation runs in that kind. Integer arithmetic is checked; division
/// fails when the divisor's magnitude is below `DIVISION_EPSILON`.
///

use thiserror::Error;

use crate::complex::Complex;
use crate::function::Operation;
use crate::value::TypedValue;

/// Divisors with a smaller magnitude are treated as zero
pub const DIVISION_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow evaluating '{symbol}'")]
    Overflow { symbol: &'static str },

    #[error("Function expects {expected} argument(s), got {got}")]
    ArgumentCount { expected: usize, got: usize },
}

enum Promoted {
    Integer(i64, i64),
    Float(f64, f64),
    Complex(Complex, Complex),
}

fn promote_pair(left: TypedValue, right: TypedValue) -> Promoted {
    let kind = left.kind().max(right.kind());
    match (left.promote(kind), right.promote(kind)) {
        (TypedValue::Integer(a), TypedValue::Integer(b)) => Promoted::Integer(a, b),
        (TypedValue::Float(a), TypedValue::Float(b)) => Promoted::Float(a, b),
        (TypedValue::Complex(a), TypedValue::Complex(b)) => Promoted::Complex(a, b),
        // Unreachable once both sides share a kind
        (a, b) => Promoted::Complex(to_complex(a), to_complex(b)),
    }
}

fn to_complex(value: TypedValue) -> Complex {
    match value {
        TypedValue::Integer(i) => Complex::from(i as f64),
        TypedValue::Float(x) => Complex::from(x),
        TypedValue::Complex(z) => z,
    }
}

/// Apply `op` to `left` and `right`
pub fn evaluate(
    op: Operation,
    left: TypedValue,
    right: TypedValue,
) -> Result<TypedValue, ArithmeticError> {
    if op == Operation::Divide && right.magnitude() < DIVISION_EPSILON {
        return Err(ArithmeticError::DivisionByZero);
    }
    match promote_pair(left, right) {
        Promoted::Integer(a, b) => evaluate_integer(op, a, b).map(TypedValue::Integer),
        Promoted::Float(a, b) => evaluate_float(op, a, b).map(TypedValue::Float),
        Promoted::Complex(a, b) => evaluate_complex(op, a, b).map(TypedValue::Complex),
    }
}

fn evaluate_integer(op: Operation, a: i64, b: i64) -> Result<i64, ArithmeticError> {
    let overflow = ArithmeticError::Overflow { symbol: op.symbol() };
    match op {
        Operation::Add => a.checked_add(b).ok_or(overflow),
        Operation::Subtract => a.checked_sub(b).ok_or(overflow),
        Operation::Multiply => a.checked_mul(b).ok_or(overflow),
        Operation::Divide => a.checked_div(b).ok_or(overflow),
    }
}

fn evaluate_float(op: Operation, a: f64, b: f64) -> Result<f64, ArithmeticError> {
    match op {
        Operation::Add => Ok(a + b),
        Operation::Subtract => Ok(a - b),
        Operation::Multiply => Ok(a * b),
        Operation::Divide => Ok(a / b),
    }
}

fn evaluate_complex(op: Operation, a: Complex, b: Complex) -> Result<Complex, ArithmeticError> {
    match op {
        Operation::Add => Ok(a + b),
        Operation::Subtract => Ok(a - b),
        Operation::Multiply => Ok(a * b),
        Operation::Divide => Ok(a / b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn test_integer_operations() {
        let a = TypedValue::Integer(7);
        let b = TypedValue::Integer(2);
        assert_eq!(evaluate(Operation::Add, a, b), Ok(TypedValue::Integer(9)));
        assert_eq!(evaluate(Operation::Subtract, a, b), Ok(TypedValue::Integer(5)));
        assert_eq!(evaluate(Operation::Multiply, a, b), Ok(TypedValue::Integer(14)));
        assert_eq!(evaluate(Operation::Divide, a, b), Ok(TypedValue::Integer(3)));
    }

    #[test]
    fn test_result_takes_widest_kind() {
        let int = TypedValue::Integer(2);
        let float = TypedValue::Float(0.5);
        let complex = TypedValue::Complex(Complex::new(1.0, 1.0));

        assert_eq!(
            evaluate(Operation::Add, int, float).map(|v| v.kind()),
            Ok(ValueKind::Float)
        );
        assert_eq!(
            evaluate(Operation::Multiply, int, complex),
            Ok(TypedValue::Complex(Complex::new(2.0, 2.0)))
        );
        assert_eq!(
            evaluate(Operation::Subtract, complex, float),
            Ok(TypedValue::Complex(Complex::new(0.5, 1.0)))
        );
    }

    #[test]
    fn test_division_by_zero_each_kind() {
        let ten = TypedValue::Integer(10);
        assert_eq!(
            evaluate(Operation::Divide, ten, TypedValue::Integer(0)),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            evaluate(Operation::Divide, ten, TypedValue::Float(1e-12)),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            evaluate(Operation::Divide, ten, TypedValue::Complex(Complex::new(0.0, 1e-11))),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn test_zero_divisor_rejected_before_promotion() {
        assert_eq!(
            evaluate(Operation::Divide, TypedValue::Float(5.0), TypedValue::Integer(0)),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            evaluate(Operation::Divide, TypedValue::Complex(Complex::new(1.0, 1.0)), TypedValue::Float(-1e-11)),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            evaluate(Operation::Multiply, TypedValue::Integer(5), TypedValue::Integer(0)),
            Ok(TypedValue::Integer(0))
        );
    }

    #[test]
    fn test_small_but_valid_divisor() {
        let result = evaluate(Operation::Divide, TypedValue::Float(1.0), TypedValue::Float(1e-9));
        assert!(result.is_ok());
    }

    #[test]
    fn test_integer_overflow_is_reported() {
        assert_eq!(
            evaluate(Operation::Add, TypedValue::Integer(i64::MAX), TypedValue::Integer(1)),
            Err(ArithmeticError::Overflow { symbol: "+" })
        );
        assert_eq!(
            evaluate(Operation::Divide, TypedValue::Integer(i64::MIN), TypedValue::Integer(-1)),
            Err(ArithmeticError::Overflow { symbol: "/" })
        );
    }

    #[test]
    fn test_error_display_messages() {
        assert_eq!(ArithmeticError::DivisionByZero.to_string(), "Division by zero");
        let err = ArithmeticError::ArgumentCount { expected: 2, got: 1 };
        assert!(err.to_string().contains("expects 2"));
        assert!(err.to_string().contains("got 1"));
    }
}
