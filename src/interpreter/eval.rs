//! Operator coercion tables. Each function implements one operator over
//! every supported type pairing and reports everything else as an
//! unsupported-operand failure.

use super::error::EvalError;
use super::value::Value;
use crate::ast::BinaryOp;

fn unsupported(operation: &'static str, left: &Value, right: &Value) -> EvalError {
    EvalError::UnsupportedOperands {
        operation,
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(value) => Some(*value as f64),
        Value::Real(value) => Some(*value),
        _ => None,
    }
}

/// `+` also covers string concatenation (left string, any right) and
/// array concatenation/append. Array results are always freshly
/// allocated, never aliases of an operand.
pub fn add(left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a + b)),
        (Value::Integer(a), Value::Real(b)) => Ok(Value::Real(a as f64 + b)),
        (Value::Real(a), Value::Integer(b)) => Ok(Value::Real(a + b as f64)),
        (Value::Str(a), right) => Ok(Value::Str(a + &right.to_output())),
        (Value::Array(a), Value::Array(b)) => {
            let mut elements = a.borrow().clone();
            elements.extend(b.borrow().iter().cloned());
            Ok(Value::array(elements))
        }
        (Value::Array(a), right) => {
            let mut elements = a.borrow().clone();
            elements.push(right);
            Ok(Value::array(elements))
        }
        (left, right) => Err(unsupported("+", &left, &right)),
    }
}

pub fn sub(left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a - b)),
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a - b)),
        (Value::Integer(a), Value::Real(b)) => Ok(Value::Real(a as f64 - b)),
        (Value::Real(a), Value::Integer(b)) => Ok(Value::Real(a - b as f64)),
        (left, right) => Err(unsupported("-", &left, &right)),
    }
}

pub fn mul(left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a * b)),
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a * b)),
        (Value::Integer(a), Value::Real(b)) => Ok(Value::Real(a as f64 * b)),
        (Value::Real(a), Value::Integer(b)) => Ok(Value::Real(a * b as f64)),
        (left, right) => Err(unsupported("*", &left, &right)),
    }
}

/// Integer division for two integers, floating-point otherwise.
pub fn div(left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(_), Value::Integer(0)) => Err(EvalError::DivisionByZero),
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a / b)),
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a / b)),
        (Value::Integer(a), Value::Real(b)) => Ok(Value::Real(a as f64 / b)),
        (Value::Real(a), Value::Integer(b)) => Ok(Value::Real(a / b as f64)),
        (left, right) => Err(unsupported("/", &left, &right)),
    }
}

/// Ordering and equality over numeric operands only.
pub fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Some(a), Some(b)) = (numeric(left), numeric(right)) else {
        return Err(unsupported(op.symbol(), left, right));
    };
    let result = match op {
        BinaryOp::Less => a < b,
        BinaryOp::LessEq => a <= b,
        BinaryOp::Greater => a > b,
        BinaryOp::GreaterEq => a >= b,
        BinaryOp::Equals => a == b,
        _ => return Err(unsupported(op.symbol(), left, right)),
    };
    Ok(Value::Bool(result))
}

pub fn logical(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Value::Bool(a), Value::Bool(b)) = (left, right) else {
        return Err(unsupported(op.symbol(), left, right));
    };
    let result = match op {
        BinaryOp::Or => *a || *b,
        BinaryOp::And => *a && *b,
        BinaryOp::Xor => *a != *b,
        _ => return Err(unsupported(op.symbol(), left, right)),
    };
    Ok(Value::Bool(result))
}

pub fn not(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Bool(value) => Ok(Value::Bool(!value)),
        _ => Err(EvalError::UnsupportedOperand {
            operation: "!",
            operand: value.type_name(),
        }),
    }
}

fn array_position(index: &Value) -> Result<usize, EvalError> {
    let Value::Integer(index) = index else {
        return Err(EvalError::NonIntegerIndex {
            actual: index.type_name(),
        });
    };
    if *index < 0 {
        return Err(EvalError::NegativeIndex { index: *index });
    }
    Ok(*index as usize)
}

pub fn index_get(target: &Value, index: &Value) -> Result<Value, EvalError> {
    let Value::Array(elements) = target else {
        return Err(EvalError::IndexedNonArray {
            actual: target.type_name(),
        });
    };
    let position = array_position(index)?;
    let elements = elements.borrow();
    if position >= elements.len() {
        return Err(EvalError::IndexOutOfBounds {
            index: position as i64,
            length: elements.len(),
        });
    }
    Ok(elements[position].clone())
}

/// Writing past the end grows the array, padding the gap with `None`.
pub fn index_set(target: &Value, index: &Value, value: Value) -> Result<(), EvalError> {
    let Value::Array(elements) = target else {
        return Err(EvalError::IndexedNonArray {
            actual: target.type_name(),
        });
    };
    let position = array_position(index)?;
    let mut elements = elements.borrow_mut();
    while elements.len() <= position {
        elements.push(Value::None);
    }
    elements[position] = value;
    Ok(())
}

/// Literal text is kept verbatim in the AST and turned into a value only
/// here, at evaluation time.
pub fn parse_number(text: &str) -> Result<Value, EvalError> {
    if let Ok(value) = text.parse::<i64>() {
        return Ok(Value::Integer(value));
    }
    if let Ok(value) = text.parse::<f64>() {
        return Ok(Value::Real(value));
    }
    Err(EvalError::InvalidNumericLiteral {
        literal: text.to_string(),
    })
}
