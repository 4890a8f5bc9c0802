use std::fmt;

/// Flat statement list. Nesting is not encoded structurally; each
/// statement carries the indentation depth of its source line and the
/// interpreter derives block extents from consecutive depths.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// 1-based source line.
    pub line: usize,
    /// 0-based column of the first token.
    pub column: usize,
    /// Block depth, first non-space column divided by four.
    pub indentation: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Import {
        library: String,
        name: String,
    },
    Assignment {
        op: AssignOp,
        target: Expression,
        value: Expression,
    },
    If {
        condition: Expression,
        is_elif: bool,
    },
    Else,
    For {
        variable: Expression,
        range: Expression,
    },
    While {
        condition: Expression,
    },
    Call {
        callee: Expression,
        args: Vec<Expression>,
    },
}

impl StatementKind {
    /// Short noun used in runtime diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Import { .. } => "import",
            Self::Assignment { .. } => "assignment",
            Self::If { .. } => "if",
            Self::Else => "else",
            Self::For { .. } => "for",
            Self::While { .. } => "while",
            Self::Call { .. } => "function call",
        }
    }

    /// Whether the following statement must be indented one level deeper.
    pub fn opens_block(&self) -> bool {
        matches!(
            self,
            Self::If { .. } | Self::Else | Self::For { .. } | Self::While { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub line: usize,
    pub column: usize,
    pub kind: ExpressionKind,
}

/// Binary nodes are built right-recursively by the parser, so chains like
/// `1 - 2 - 3` group as `1 - (2 - 3)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Name(String),
    /// Numeric literal text, parsed to a value only at evaluation time.
    Number(String),
    Str(String),
    Range(Box<Expression>),
    EmptyArray,
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Dot,
    Index,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Equals,
    Or,
    And,
    Xor,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Dot => ".",
            Self::Index => "[]",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Equals => "==",
            Self::Or => "|",
            Self::And => "&",
            Self::Xor => "^",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.indentation {
            f.write_str("    ")?;
        }
        match &self.kind {
            StatementKind::Import { library, name } => {
                write!(f, "from {library} import {name}")
            }
            StatementKind::Assignment { op, target, value } => {
                write!(f, "{target} {} {value}", op.symbol())
            }
            StatementKind::If { condition, is_elif } => {
                let keyword = if *is_elif { "elif" } else { "if" };
                write!(f, "{keyword} {condition}:")
            }
            StatementKind::Else => f.write_str("else:"),
            StatementKind::For { variable, range } => {
                write!(f, "for {variable} in {range}:")
            }
            StatementKind::While { condition } => write!(f, "while {condition}:"),
            StatementKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Name(name) => f.write_str(name),
            ExpressionKind::Number(text) => f.write_str(text),
            ExpressionKind::Str(text) => write!(f, "\"{text}\""),
            ExpressionKind::Range(end) => write!(f, "range({end})"),
            ExpressionKind::EmptyArray => f.write_str("[]"),
            ExpressionKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            ExpressionKind::Binary { op, left, right } => match op {
                BinaryOp::Index => write!(f, "{left}[{right}]"),
                BinaryOp::Dot => write!(f, "{left}.{right}"),
                _ => write!(f, "{left} {} {right}", op.symbol()),
            },
            ExpressionKind::Not(operand) => write!(f, "!{operand}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(kind: ExpressionKind) -> Expression {
        Expression {
            line: 1,
            column: 0,
            kind,
        }
    }

    #[test]
    fn displays_nested_binary_expressions() {
        let inner = expr(ExpressionKind::Binary {
            op: BinaryOp::Sub,
            left: Box::new(expr(ExpressionKind::Number("2".into()))),
            right: Box::new(expr(ExpressionKind::Number("3".into()))),
        });
        let outer = expr(ExpressionKind::Binary {
            op: BinaryOp::Sub,
            left: Box::new(expr(ExpressionKind::Number("1".into()))),
            right: Box::new(inner),
        });
        assert_eq!(outer.to_string(), "1 - 2 - 3");
    }

    #[test]
    fn displays_index_and_dot_without_spaces() {
        let index = expr(ExpressionKind::Binary {
            op: BinaryOp::Index,
            left: Box::new(expr(ExpressionKind::Name("a".into()))),
            right: Box::new(expr(ExpressionKind::Number("0".into()))),
        });
        assert_eq!(index.to_string(), "a[0]");

        let dot = expr(ExpressionKind::Binary {
            op: BinaryOp::Dot,
            left: Box::new(expr(ExpressionKind::Name("data".into()))),
            right: Box::new(expr(ExpressionKind::Name("append".into()))),
        });
        assert_eq!(dot.to_string(), "data.append");
    }

    #[test]
    fn displays_statements_with_indentation() {
        let statement = Statement {
            line: 2,
            column: 4,
            indentation: 1,
            kind: StatementKind::Assignment {
                op: AssignOp::Add,
                target: expr(ExpressionKind::Name("x".into())),
                value: expr(ExpressionKind::Number("1".into())),
            },
        };
        assert_eq!(statement.to_string(), "    x += 1");
    }
}
