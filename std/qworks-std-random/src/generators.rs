///
/// Value and function generators.
///
/// Both generators are plain configuration; the RNG is passed in on every
/// call so each worker thread drives its own stream.
///

use std::ops::RangeInclusive;

use rand::Rng;

use qworks_std_values::{Complex, FunctionDescriptor, Operation, TypedValue, ValueKind};

/// Bounds for generated data values
pub const DATA_MIN_VALUE: i64 = -100;
pub const DATA_MAX_VALUE: i64 = 100;

/// Bounds for fixed operands of generated functions
pub const CONST_INT_MIN: i64 = -20;
pub const CONST_INT_MAX: i64 = 20;
pub const CONST_FLOAT_MIN: f64 = -10.0;
pub const CONST_FLOAT_MAX: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct ValueGenerator {
    ints: RangeInclusive<i64>,
    floats: RangeInclusive<f64>,
    integral_complex: bool,
}

impl ValueGenerator {
    /// Generator for data producers: every kind drawn from [-100, 100]
    pub fn data() -> Self {
        Self {
            ints: DATA_MIN_VALUE..=DATA_MAX_VALUE,
            floats: DATA_MIN_VALUE as f64..=DATA_MAX_VALUE as f64,
            integral_complex: false,
        }
    }

    /// Narrower generator for fixed function operands. Complex constants
    /// have integer-valued parts.
    pub fn constants() -> Self {
        Self {
            ints: CONST_INT_MIN..=CONST_INT_MAX,
            floats: CONST_FLOAT_MIN..=CONST_FLOAT_MAX,
            integral_complex: true,
        }
    }

    pub fn generate_value<R: Rng + ?Sized>(&self, rng: &mut R) -> TypedValue {
        match ValueKind::ALL[rng.gen_range(0..ValueKind::ALL.len())] {
            ValueKind::Integer => TypedValue::Integer(rng.gen_range(self.ints.clone())),
            ValueKind::Float => TypedValue::Float(rng.gen_range(self.floats.clone())),
            ValueKind::Complex => TypedValue::Complex(self.complex_part_pair(rng)),
        }
    }

    fn complex_part_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Complex {
        if self.integral_complex {
            let re = rng.gen_range(self.ints.clone()) as f64;
            let im = rng.gen_range(self.ints.clone()) as f64;
            Complex::new(re, im)
        } else {
            let re = rng.gen_range(self.floats.clone());
            let im = rng.gen_range(self.floats.clone());
            Complex::new(re, im)
        }
    }
}

impl Default for ValueGenerator {
    fn default() -> Self {
        Self::data()
    }
}

/// Which operands of a generated function are fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandPattern {
    Unbound,
    RightFixed,
    LeftFixed,
    BothFixed,
}

impl OperandPattern {
    pub const ALL: [OperandPattern; 4] = [
        OperandPattern::Unbound,
        OperandPattern::RightFixed,
        OperandPattern::LeftFixed,
        OperandPattern::BothFixed,
    ];
}

#[derive(Debug, Clone)]
pub struct FunctionGenerator {
    constants: ValueGenerator,
}

impl FunctionGenerator {
    pub fn new() -> Self {
        Self { constants: ValueGenerator::constants() }
    }

    pub fn generate_function<R: Rng + ?Sized>(&self, rng: &mut R) -> FunctionDescriptor {
        let operation = Operation::ALL[rng.gen_range(0..Operation::ALL.len())];
        let pattern = OperandPattern::ALL[rng.gen_range(0..OperandPattern::ALL.len())];
        self.with_pattern(rng, operation, pattern)
    }

    pub fn with_pattern<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        operation: Operation,
        pattern: OperandPattern,
    ) -> FunctionDescriptor {
        let (left, right) = match pattern {
            OperandPattern::Unbound => (None, None),
            OperandPattern::RightFixed => (None, Some(self.constants.generate_value(rng))),
            OperandPattern::LeftFixed => (Some(self.constants.generate_value(rng)), None),
            OperandPattern::BothFixed => (
                Some(self.constants.generate_value(rng)),
                Some(self.constants.generate_value(rng)),
            ),
        };
        FunctionDescriptor::new(operation, left, right)
    }
}

impl Default for FunctionGenerator {
    fn default() -> Self {
        Self::new()
    }
}
