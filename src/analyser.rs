use thiserror::Error;

use crate::ast::{BinaryOp, Expression, ExpressionKind, Program, StatementKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Unexpected indentation in line {line}, expected {expected}")]
    IndentationNotIncreased { line: usize, expected: usize },
    #[error("Unexpected indentation in line {line}, expected {expected} or less")]
    IndentationTooDeep { line: usize, expected: usize },
    #[error("Unexpected callee shape in function call in line {line}")]
    UnsupportedCallee { line: usize },
    #[error("Function {name} was not found in line {line}")]
    UnknownFunction { name: String, line: usize },
    #[error("Method {object}.{name} was not found in line {line}")]
    UnknownMethod {
        object: String,
        name: String,
        line: usize,
    },
    #[error(
        "Parameter count in function {name} does not match \
         ({expected} expected, {provided} provided) in line {line}"
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        provided: usize,
        line: usize,
    },
}

struct Signature {
    name: &'static str,
    arg_count: usize,
}

/// Every callable the language knows about. Lookup is by function name
/// only; the receiver of a dotted call (`array.append`) is not consulted.
const SIGNATURES: &[Signature] = &[
    Signature {
        name: "randint",
        arg_count: 2,
    },
    Signature {
        name: "append",
        arg_count: 1,
    },
    Signature {
        name: "print",
        arg_count: 1,
    },
    Signature {
        name: "len",
        arg_count: 1,
    },
];

/// Single pass over the flat statement list: indentation discipline plus
/// call-signature checks for statement-level calls. Calls nested inside
/// expressions are left to the interpreter.
pub fn analyse(program: &Program) -> Result<(), SemanticError> {
    let mut previous_indentation = 0;
    let mut expect_indent = false;

    for statement in &program.statements {
        if expect_indent {
            if statement.indentation != previous_indentation + 1 {
                return Err(SemanticError::IndentationNotIncreased {
                    line: statement.line,
                    expected: previous_indentation + 1,
                });
            }
        } else if statement.indentation > previous_indentation {
            return Err(SemanticError::IndentationTooDeep {
                line: statement.line,
                expected: previous_indentation,
            });
        }
        expect_indent = statement.kind.opens_block();

        if let StatementKind::Call { callee, args } = &statement.kind {
            check_call(callee, args, statement.line)?;
        }

        previous_indentation = statement.indentation;
    }
    Ok(())
}

fn check_call(callee: &Expression, args: &[Expression], line: usize) -> Result<(), SemanticError> {
    let (object, name) = resolve_callee(callee)
        .ok_or(SemanticError::UnsupportedCallee { line })?;

    let Some(signature) = SIGNATURES.iter().find(|signature| signature.name == name) else {
        return Err(match object {
            Some(object) => SemanticError::UnknownMethod {
                object: object.to_string(),
                name: name.to_string(),
                line,
            },
            None => SemanticError::UnknownFunction {
                name: name.to_string(),
                line,
            },
        });
    };
    if signature.arg_count != args.len() {
        return Err(SemanticError::ArityMismatch {
            name: name.to_string(),
            expected: signature.arg_count,
            provided: args.len(),
            line,
        });
    }
    Ok(())
}

fn resolve_callee(callee: &Expression) -> Option<(Option<&str>, &str)> {
    match &callee.kind {
        ExpressionKind::Name(name) => Some((None, name)),
        ExpressionKind::Binary {
            op: BinaryOp::Dot,
            left,
            right,
        } => match (&left.kind, &right.kind) {
            (ExpressionKind::Name(object), ExpressionKind::Name(name)) => {
                Some((Some(object), name))
            }
            _ => None,
        },
        _ => None,
    }
}
