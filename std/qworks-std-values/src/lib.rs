//!
//! qworks-std-values - Typed Values and Arithmetic Functions
//!
//! Everything that travels through a qworks queue is defined here.
//!
//! ## Values
//!
//! - `TypedValue::Integer(i64)`
//! - `TypedValue::Float(f64)`
//! - `TypedValue::Complex(Complex)`
//!
//! Values are `Copy` and carry no identity beyond their contents.
//!
//! ## Functions
//!
//! A `FunctionDescriptor` pairs an `Operation` with up to two fixed operands.
//! Operands left unset are taken from a data queue when the function is
//! applied, left before right:
//!
//! ```rust
//! use qworks_std_values::{FunctionDescriptor, Operation, TypedValue};
//!
//! let f = FunctionDescriptor::new(Operation::Multiply, None, Some(TypedValue::Integer(5)));
//! assert_eq!(f.required_args(), 1);
//! assert_eq!(f.apply(&[TypedValue::Integer(3)]), Ok(TypedValue::Integer(15)));
//! ```
//!
//! ## Promotion
//!
//! Mixed operands are widened to the larger kind under
//! `Integer < Float < Complex` before the operation runs.
//!

pub mod arith;
pub mod complex;
pub mod function;
pub mod value;

pub use arith::{evaluate, ArithmeticError, DIVISION_EPSILON};
pub use complex::Complex;
pub use function::{FunctionDescriptor, Operation};
pub use value::{TypedValue, ValueKind};
