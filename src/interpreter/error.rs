use thiserror::Error;

/// Failure produced while evaluating an expression or applying an
/// operator, before it has been tied to a source statement.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("Operation {operation} is not supported for types {left} and {right}")]
    UnsupportedOperands {
        operation: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("Operation {operation} is not supported for type {operand}")]
    UnsupportedOperand {
        operation: &'static str,
        operand: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Value of type {actual} cannot be indexed")]
    IndexedNonArray { actual: &'static str },
    #[error("Array index must be an integer, got {actual}")]
    NonIntegerIndex { actual: &'static str },
    #[error("Array index is negative: {index}")]
    NegativeIndex { index: i64 },
    #[error("Array index {index} is out of bounds (length {length})")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("Unknown function {name}")]
    UnknownFunction { name: String },
    #[error("len expects an array, got {actual}")]
    LenExpectsArray { actual: &'static str },
    #[error("Cannot assign to this target")]
    UnsupportedAssignmentTarget,
    #[error("Invalid numeric literal: {literal}")]
    InvalidNumericLiteral { literal: String },
    #[error("Loop variable must be a name")]
    ForVariableNotAName,
    #[error("For loop expects a range, got {actual}")]
    ForExpectsRange { actual: &'static str },
    #[error("Missing argument in call to {name}")]
    MissingArgument { name: &'static str },
    #[error("Call target is not a function name")]
    UnsupportedCallTarget,
}

/// An `EvalError` tied to the statement that was executing when it arose.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{source} in line {line} ({statement})")]
pub struct RuntimeError {
    pub line: usize,
    pub statement: &'static str,
    #[source]
    pub source: EvalError,
}
