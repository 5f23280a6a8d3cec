///
/// Arithmetic function descriptors.
///
/// A descriptor is an operation with optional fixed operands. Each unset
/// operand is a slot filled from a data queue at application time, so
/// `required_args()` is the number of `None` operands. When both are unset
/// the first argument becomes the left operand.
///

use std::fmt;

use crate::arith::{evaluate, ArithmeticError};
use crate::value::TypedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDescriptor {
    pub operation: Operation,
    pub left: Option<TypedValue>,
    pub right: Option<TypedValue>,
}

impl FunctionDescriptor {
    pub fn new(operation: Operation, left: Option<TypedValue>, right: Option<TypedValue>) -> Self {
        Self { operation, left, right }
    }

    /// Number of values this descriptor consumes from a data queue
    pub fn required_args(&self) -> usize {
        self.left.is_none() as usize + self.right.is_none() as usize
    }

    /// Fill the unset operands from `args` (left first) and evaluate.
    ///
    /// `args.len()` must equal `required_args()`.
    pub fn apply(&self, args: &[TypedValue]) -> Result<TypedValue, ArithmeticError> {
        let expected = self.required_args();
        if args.len() != expected {
            return Err(ArithmeticError::ArgumentCount { expected, got: args.len() });
        }

        let mut pending = args.iter().copied();
        let left = self.left.or_else(|| pending.next());
        let right = self.right.or_else(|| pending.next());

        match (left, right) {
            (Some(l), Some(r)) => evaluate(self.operation, l, r),
            _ => Err(ArithmeticError::ArgumentCount { expected, got: args.len() }),
        }
    }
}

fn operand(value: &TypedValue) -> String {
    let text = value.to_string();
    if text.contains(' ') || text.starts_with('-') {
        format!("({})", text)
    } else {
        text
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.operation.symbol();
        match (&self.left, &self.right) {
            (Some(l), Some(r)) => write!(f, "{} {} {}", operand(l), op, operand(r)),
            (Some(l), None) => write!(f, "{} {} x", operand(l), op),
            (None, Some(r)) => write!(f, "x {} {}", op, operand(r)),
            (None, None) => write!(f, "x {} y", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Complex;

    fn int(i: i64) -> TypedValue {
        TypedValue::Integer(i)
    }

    #[test]
    fn test_required_args() {
        let op = Operation::Add;
        assert_eq!(FunctionDescriptor::new(op, Some(int(1)), Some(int(2))).required_args(), 0);
        assert_eq!(FunctionDescriptor::new(op, Some(int(1)), None).required_args(), 1);
        assert_eq!(FunctionDescriptor::new(op, None, Some(int(2))).required_args(), 1);
        assert_eq!(FunctionDescriptor::new(op, None, None).required_args(), 2);
    }

    #[test]
    fn test_apply_fills_left_before_right() {
        let f = FunctionDescriptor::new(Operation::Subtract, None, None);
        assert_eq!(f.apply(&[int(10), int(3)]), Ok(int(7)));

        let f = FunctionDescriptor::new(Operation::Subtract, Some(int(10)), None);
        assert_eq!(f.apply(&[int(3)]), Ok(int(7)));

        let f = FunctionDescriptor::new(Operation::Subtract, None, Some(int(3)));
        assert_eq!(f.apply(&[int(10)]), Ok(int(7)));

        let f = FunctionDescriptor::new(Operation::Subtract, Some(int(10)), Some(int(3)));
        assert_eq!(f.apply(&[]), Ok(int(7)));
    }

    #[test]
    fn test_apply_multiply_by_fixed_right() {
        let f = FunctionDescriptor::new(Operation::Multiply, None, Some(int(5)));
        assert_eq!(f.apply(&[int(3)]), Ok(int(15)));
    }

    #[test]
    fn test_apply_divide_by_fixed_zero() {
        let f = FunctionDescriptor::new(Operation::Divide, None, Some(TypedValue::Float(0.0)));
        assert_eq!(f.apply(&[int(10)]), Err(ArithmeticError::DivisionByZero));
    }

    #[test]
    fn test_apply_rejects_wrong_arity() {
        let f = FunctionDescriptor::new(Operation::Add, None, None);
        assert_eq!(
            f.apply(&[int(1)]),
            Err(ArithmeticError::ArgumentCount { expected: 2, got: 1 })
        );
    }

    #[test]
    fn test_description_patterns() {
        let mul = Operation::Multiply;
        insta::assert_snapshot!(FunctionDescriptor::new(mul, None, None).to_string(), @"x * y");
        insta::assert_snapshot!(FunctionDescriptor::new(mul, None, Some(int(5))).to_string(), @"x * 5");
        insta::assert_snapshot!(FunctionDescriptor::new(mul, Some(int(-3)), None).to_string(), @"(-3) * x");
        insta::assert_snapshot!(
            FunctionDescriptor::new(
                Operation::Divide,
                Some(TypedValue::Float(2.5)),
                Some(TypedValue::Complex(Complex::new(1.0, 2.0)))
            )
            .to_string(),
            @"2.50 / (1.00 + 2.00i)"
        );
    }
}
