use std::cell::RefCell;
use std::rc::Rc;

/// Dynamically tagged runtime value. Arrays are shared by handle, so
/// assigning one variable to another aliases the same storage; every other
/// variant copies on assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Range(Box<RangeValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue {
    pub start: Value,
    pub end: Value,
    pub step: Value,
}

impl Value {
    pub fn array(elements: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "int",
            Self::Real(_) => "real",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Range(_) => "range",
        }
    }

    /// Truthiness: positive numbers, non-empty strings and non-empty
    /// arrays are true; ranges are always true.
    pub fn is_true(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(value) => *value,
            Self::Integer(value) => *value > 0,
            Self::Real(value) => *value > 0.0,
            Self::Str(text) => !text.is_empty(),
            Self::Array(elements) => !elements.borrow().is_empty(),
            Self::Range(_) => true,
        }
    }

    /// Text form used by `print` and string concatenation. `None` renders
    /// as the empty string and booleans render lowercase.
    pub fn to_output(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Real(value) => value.to_string(),
            Self::Str(text) => text.clone(),
            Self::Array(elements) => {
                let parts: Vec<String> = elements
                    .borrow()
                    .iter()
                    .map(Value::to_output)
                    .collect();
                format!("[{}]", parts.join(", "))
            }
            Self::Range(range) => format!(
                "range({}-{}:{})",
                range.start.to_output(),
                range.end.to_output(),
                range.step.to_output()
            ),
        }
    }
}
