use thiserror::Error;

use crate::ast::{AssignOp, BinaryOp, Expression, ExpressionKind, Program, Statement, StatementKind};
use crate::token::{Keyword, StringTable, Token, TokenKind, TokenStream};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} in line {line}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
}

/// Rule result: `Ok(None)` is a soft no-match (the caller rolls the cursor
/// back and tries the next alternative), `Err` aborts the whole parse.
type Parsed<T> = Result<Option<T>, SyntaxError>;

/// Backtracking ordered-choice recursive descent over the token stream.
/// Alternatives are tried in a fixed order; the first rule that matches
/// wins, so binary chains associate to the right by construction.
pub fn parse(stream: &TokenStream) -> Result<Program, SyntaxError> {
    let mut parser = Parser {
        tokens: &stream.tokens,
        names: &stream.names,
        consts: &stream.consts,
        position: 0,
    };
    let mut statements = Vec::new();
    while parser.current().kind != TokenKind::End {
        statements.push(parser.parse_statement()?);
    }
    Ok(Program { statements })
}

struct Parser<'a> {
    tokens: &'a [Token],
    names: &'a StringTable,
    consts: &'a StringTable,
    position: usize,
}

impl Parser<'_> {
    // The stream always ends with an `End` token that no rule consumes,
    // so the cursor stays in bounds.
    fn current(&self) -> Token {
        self.tokens[self.position]
    }

    fn fail<T>(&self, line: usize, message: &str) -> Parsed<T> {
        Err(SyntaxError {
            message: message.to_string(),
            line,
        })
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.current().kind == TokenKind::Special(symbol) {
            self.position += 1;
            return true;
        }
        false
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.current().kind == TokenKind::Keyword(keyword) {
            self.position += 1;
            return true;
        }
        false
    }

    fn eat_name(&mut self) -> Option<String> {
        if let TokenKind::Name(index) = self.current().kind {
            self.position += 1;
            return Some(self.names.get(index).to_string());
        }
        None
    }

    fn expression(&self, token: Token, kind: ExpressionKind) -> Expression {
        Expression {
            line: token.line,
            column: token.column,
            kind,
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let token = self.current();
        let saved = self.position;
        let rules: [fn(&mut Self) -> Parsed<StatementKind>; 9] = [
            Self::try_import,
            Self::try_assignment,
            Self::try_compound_assignment,
            Self::try_call_statement,
            |parser| parser.try_if(false),
            Self::try_else,
            |parser| parser.try_if(true),
            Self::try_for,
            Self::try_while,
        ];
        for rule in rules {
            if let Some(kind) = rule(self)? {
                return Ok(Statement {
                    line: token.line,
                    column: token.column,
                    indentation: token.indentation,
                    kind,
                });
            }
            self.position = saved;
        }
        Err(SyntaxError {
            message: "Statement expected".to_string(),
            line: token.line,
        })
    }

    fn try_import(&mut self) -> Parsed<StatementKind> {
        let token = self.current();
        if !self.eat_keyword(Keyword::From) {
            return Ok(None);
        }
        let Some(library) = self.eat_name() else {
            return self.fail(token.line, "Library name expected in import statement");
        };
        if !self.eat_keyword(Keyword::Import) {
            return Ok(None);
        }
        let Some(name) = self.eat_name() else {
            return self.fail(token.line, "Function name expected in import statement");
        };
        Ok(Some(StatementKind::Import { library, name }))
    }

    fn try_assignment(&mut self) -> Parsed<StatementKind> {
        let token = self.current();
        let Some(target) = self.try_expression()? else {
            return Ok(None);
        };
        if !self.eat_symbol('=') {
            return Ok(None);
        }
        let Some(value) = self.try_expression()? else {
            return self.fail(token.line, "Expression expected after '='");
        };
        Ok(Some(StatementKind::Assignment {
            op: AssignOp::Assign,
            target,
            value,
        }))
    }

    fn try_compound_assignment(&mut self) -> Parsed<StatementKind> {
        let token = self.current();
        let Some(target) = self.try_qualified_atom()? else {
            return Ok(None);
        };
        let Some(op) = self.try_compound_op() else {
            return Ok(None);
        };
        if !self.eat_symbol('=') {
            return Ok(None);
        }
        let Some(value) = self.try_expression()? else {
            return self.fail(token.line, "Expression expected after '='");
        };
        Ok(Some(StatementKind::Assignment { op, target, value }))
    }

    fn try_compound_op(&mut self) -> Option<AssignOp> {
        for (symbol, op) in [
            ('-', AssignOp::Sub),
            ('+', AssignOp::Add),
            ('/', AssignOp::Div),
            ('*', AssignOp::Mul),
        ] {
            if self.eat_symbol(symbol) {
                return Some(op);
            }
        }
        None
    }

    fn try_call_statement(&mut self) -> Parsed<StatementKind> {
        let Some((callee, args)) = self.try_call_parts()? else {
            return Ok(None);
        };
        Ok(Some(StatementKind::Call { callee, args }))
    }

    fn try_if(&mut self, is_elif: bool) -> Parsed<StatementKind> {
        let token = self.current();
        let keyword = if is_elif { Keyword::Elif } else { Keyword::If };
        if !self.eat_keyword(keyword) {
            return Ok(None);
        }
        let Some(condition) = self.try_expression()? else {
            let message = if is_elif {
                "Condition expected after \"elif\""
            } else {
                "Condition expected after \"if\""
            };
            return self.fail(token.line, message);
        };
        if !self.eat_symbol(':') {
            return self.fail(token.line, "Colon expected after condition");
        }
        Ok(Some(StatementKind::If { condition, is_elif }))
    }

    fn try_else(&mut self) -> Parsed<StatementKind> {
        let token = self.current();
        if !self.eat_keyword(Keyword::Else) {
            return Ok(None);
        }
        if !self.eat_symbol(':') {
            return self.fail(token.line, "Colon expected in else branch");
        }
        Ok(Some(StatementKind::Else))
    }

    fn try_for(&mut self) -> Parsed<StatementKind> {
        let token = self.current();
        if !self.eat_keyword(Keyword::For) {
            return Ok(None);
        }
        let Some(variable) = self.try_expression()? else {
            return self.fail(token.line, "Variable expected after \"for\"");
        };
        if !self.eat_keyword(Keyword::In) {
            return Ok(None);
        }
        let Some(range) = self.try_expression()? else {
            return self.fail(token.line, "Range expected after variable");
        };
        if !self.eat_symbol(':') {
            return self.fail(token.line, "Colon expected after condition");
        }
        Ok(Some(StatementKind::For { variable, range }))
    }

    fn try_while(&mut self) -> Parsed<StatementKind> {
        let token = self.current();
        if !self.eat_keyword(Keyword::While) {
            return Ok(None);
        }
        let Some(condition) = self.try_expression()? else {
            return self.fail(token.line, "Condition expected after \"while\"");
        };
        if !self.eat_symbol(':') {
            return self.fail(token.line, "Colon expected after condition");
        }
        Ok(Some(StatementKind::While { condition }))
    }

    /// Alternatives in fixed order: parenthesized, call, binary, range,
    /// qualified atom. The cursor is restored between tries, and is back at
    /// the entry position whenever this returns `Ok(None)`.
    fn try_expression(&mut self) -> Parsed<Expression> {
        let saved = self.position;
        if let Some(inner) = self.try_parenthesized()? {
            return Ok(Some(inner));
        }
        self.position = saved;
        if let Some(call) = self.try_call_expression()? {
            return Ok(Some(call));
        }
        self.position = saved;
        if let Some(binary) = self.try_binary()? {
            return Ok(Some(binary));
        }
        self.position = saved;
        if let Some(range) = self.try_range()? {
            return Ok(Some(range));
        }
        self.position = saved;
        if let Some(atom) = self.try_qualified_atom()? {
            return Ok(Some(atom));
        }
        self.position = saved;
        Ok(None)
    }

    fn try_parenthesized(&mut self) -> Parsed<Expression> {
        let token = self.current();
        if !self.eat_symbol('(') {
            return Ok(None);
        }
        let Some(inner) = self.try_expression()? else {
            return Ok(None);
        };
        if !self.eat_symbol(')') {
            return self.fail(token.line, "')' expected after expression");
        }
        Ok(Some(inner))
    }

    fn try_call_expression(&mut self) -> Parsed<Expression> {
        let token = self.current();
        let Some((callee, args)) = self.try_call_parts()? else {
            return Ok(None);
        };
        Ok(Some(self.expression(
            token,
            ExpressionKind::Call {
                callee: Box::new(callee),
                args,
            },
        )))
    }

    fn try_call_parts(&mut self) -> Parsed<(Expression, Vec<Expression>)> {
        let token = self.current();
        let Some(callee) = self.try_callee() else {
            return Ok(None);
        };
        if !self.eat_symbol('(') {
            return Ok(None);
        }
        let Some(args) = self.try_arguments()? else {
            return Ok(None);
        };
        if !self.eat_symbol(')') {
            return self.fail(token.line, "')' expected after parameter list");
        }
        Ok(Some((callee, args)))
    }

    /// A bare name or an object-qualified `name.name` pair.
    fn try_callee(&mut self) -> Option<Expression> {
        let token = self.current();
        let object = self.eat_name()?;
        let object = self.expression(token, ExpressionKind::Name(object));
        let saved = self.position;
        if self.eat_symbol('.') {
            let method_token = self.current();
            if let Some(method) = self.eat_name() {
                let method = self.expression(method_token, ExpressionKind::Name(method));
                return Some(self.expression(
                    token,
                    ExpressionKind::Binary {
                        op: BinaryOp::Dot,
                        left: Box::new(object),
                        right: Box::new(method),
                    },
                ));
            }
            self.position = saved;
        }
        Some(object)
    }

    /// At least one argument is required for a match; an empty parameter
    /// list makes the whole call rule a no-match.
    fn try_arguments(&mut self) -> Parsed<Vec<Expression>> {
        let token = self.current();
        let Some(first) = self.try_expression()? else {
            return Ok(None);
        };
        let mut args = vec![first];
        loop {
            // Stop at `)` or end of input; the caller reports the
            // missing parenthesis.
            if matches!(
                self.current().kind,
                TokenKind::Special(')') | TokenKind::End
            ) {
                break;
            }
            if !self.eat_symbol(',') {
                return self.fail(token.line, "',' expected in parameter list");
            }
            let Some(following) = self.try_expression()? else {
                return self.fail(token.line, "Expression expected in parameter list");
            };
            args.push(following);
        }
        Ok(Some(args))
    }

    fn try_binary(&mut self) -> Parsed<Expression> {
        let Some(left) = self.try_qualified_atom()? else {
            return Ok(None);
        };
        let Some(op) = self.try_binary_op() else {
            return Ok(None);
        };
        let Some(right) = self.try_expression()? else {
            return Ok(None);
        };
        Ok(Some(Expression {
            line: left.line,
            column: left.column,
            kind: ExpressionKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        }))
    }

    /// Two-character operators are reassembled from adjacent specials and
    /// tried before the single characters that prefix them.
    fn try_binary_op(&mut self) -> Option<BinaryOp> {
        for (symbol, op) in [
            ('-', BinaryOp::Sub),
            ('+', BinaryOp::Add),
            ('/', BinaryOp::Div),
            ('*', BinaryOp::Mul),
        ] {
            if self.eat_symbol(symbol) {
                return Some(op);
            }
        }
        let saved = self.position;
        if self.eat_symbol('<') && self.eat_symbol('=') {
            return Some(BinaryOp::LessEq);
        }
        self.position = saved;
        if self.eat_symbol('>') && self.eat_symbol('=') {
            return Some(BinaryOp::GreaterEq);
        }
        self.position = saved;
        if self.eat_symbol('=') && self.eat_symbol('=') {
            return Some(BinaryOp::Equals);
        }
        self.position = saved;
        for (symbol, op) in [
            ('<', BinaryOp::Less),
            ('>', BinaryOp::Greater),
            ('|', BinaryOp::Or),
            ('&', BinaryOp::And),
            ('^', BinaryOp::Xor),
        ] {
            if self.eat_symbol(symbol) {
                return Some(op);
            }
        }
        None
    }

    fn try_range(&mut self) -> Parsed<Expression> {
        let token = self.current();
        if !self.eat_keyword(Keyword::Range) {
            return Ok(None);
        }
        if !self.eat_symbol('(') {
            return Ok(None);
        }
        let Some(end) = self.try_expression()? else {
            return Ok(None);
        };
        if !self.eat_symbol(')') {
            return self.fail(token.line, "')' expected after expression");
        }
        Ok(Some(self.expression(token, ExpressionKind::Range(Box::new(end)))))
    }

    /// Dotted access, indexing, a plain name, a literal constant, or the
    /// empty array literal.
    fn try_qualified_atom(&mut self) -> Parsed<Expression> {
        let saved = self.position;
        if let Some(dot) = self.try_dot()? {
            return Ok(Some(dot));
        }
        self.position = saved;
        if let Some(index) = self.try_index()? {
            return Ok(Some(index));
        }
        self.position = saved;
        let token = self.current();
        if let Some(name) = self.eat_name() {
            return Ok(Some(self.expression(token, ExpressionKind::Name(name))));
        }
        self.position = saved;
        if let Some(constant) = self.try_const() {
            return Ok(Some(constant));
        }
        self.position = saved;
        if let Some(array) = self.try_empty_array()? {
            return Ok(Some(array));
        }
        self.position = saved;
        Ok(None)
    }

    fn try_dot(&mut self) -> Parsed<Expression> {
        let Some(left) = self.try_name_or_index()? else {
            return Ok(None);
        };
        if !self.eat_symbol('.') {
            return Ok(None);
        }
        let Some(right) = self.try_qualified_atom()? else {
            return Ok(None);
        };
        Ok(Some(Expression {
            line: left.line,
            column: left.column,
            kind: ExpressionKind::Binary {
                op: BinaryOp::Dot,
                left: Box::new(left),
                right: Box::new(right),
            },
        }))
    }

    fn try_name_or_index(&mut self) -> Parsed<Expression> {
        let saved = self.position;
        if let Some(index) = self.try_index()? {
            return Ok(Some(index));
        }
        self.position = saved;
        let token = self.current();
        if let Some(name) = self.eat_name() {
            return Ok(Some(self.expression(token, ExpressionKind::Name(name))));
        }
        self.position = saved;
        Ok(None)
    }

    fn try_index(&mut self) -> Parsed<Expression> {
        let token = self.current();
        let Some(name) = self.eat_name() else {
            return Ok(None);
        };
        if !self.eat_symbol('[') {
            return Ok(None);
        }
        let Some(index) = self.try_expression()? else {
            return Ok(None);
        };
        if !self.eat_symbol(']') {
            return self.fail(token.line, "']' expected after expression");
        }
        let name = self.expression(token, ExpressionKind::Name(name));
        Ok(Some(self.expression(
            token,
            ExpressionKind::Binary {
                op: BinaryOp::Index,
                left: Box::new(name),
                right: Box::new(index),
            },
        )))
    }

    fn try_const(&mut self) -> Option<Expression> {
        let token = self.current();
        let kind = match token.kind {
            TokenKind::Number(index) => ExpressionKind::Number(self.consts.get(index).to_string()),
            TokenKind::Str(index) => ExpressionKind::Str(self.consts.get(index).to_string()),
            _ => return None,
        };
        self.position += 1;
        Some(self.expression(token, kind))
    }

    fn try_empty_array(&mut self) -> Parsed<Expression> {
        let token = self.current();
        if !self.eat_symbol('[') {
            return Ok(None);
        }
        if !self.eat_symbol(']') {
            return self.fail(token.line, "']' expected after expression");
        }
        Ok(Some(self.expression(token, ExpressionKind::EmptyArray)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse_source(source: &str) -> Program {
        let stream = tokenize(source).expect("tokenize failed");
        parse(&stream).expect("parse failed")
    }

    fn parse_error(source: &str) -> SyntaxError {
        let stream = tokenize(source).expect("tokenize failed");
        parse(&stream).expect_err("expected syntax error")
    }

    #[test]
    fn parses_simple_assignment() {
        let program = parse_source("x = 1 + 2");
        assert_eq!(program.statements.len(), 1);
        let StatementKind::Assignment { op, target, value } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(*op, AssignOp::Assign);
        assert_eq!(target.kind, ExpressionKind::Name("x".into()));
        let ExpressionKind::Binary { op, left, right } = &value.kind else {
            panic!("expected binary value");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert_eq!(left.kind, ExpressionKind::Number("1".into()));
        assert_eq!(right.kind, ExpressionKind::Number("2".into()));
    }

    #[test]
    fn parses_compound_assignment() {
        let program = parse_source("x += 1");
        let StatementKind::Assignment { op, .. } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(*op, AssignOp::Add);
    }

    #[test]
    fn binary_chains_associate_to_the_right() {
        let program = parse_source("x = 1 - 2 - 3");
        let StatementKind::Assignment { value, .. } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(value.to_string(), "1 - 2 - 3");
        let ExpressionKind::Binary { op, left, right } = &value.kind else {
            panic!("expected binary value");
        };
        assert_eq!(*op, BinaryOp::Sub);
        assert_eq!(left.kind, ExpressionKind::Number("1".into()));
        assert!(matches!(
            right.kind,
            ExpressionKind::Binary {
                op: BinaryOp::Sub,
                ..
            }
        ));
    }

    #[test]
    fn parses_two_character_comparisons() {
        let program = parse_source("x = a <= b");
        let StatementKind::Assignment { value, .. } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(
            value.kind,
            ExpressionKind::Binary {
                op: BinaryOp::LessEq,
                ..
            }
        ));

        let program = parse_source("x = a == b");
        let StatementKind::Assignment { value, .. } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(
            value.kind,
            ExpressionKind::Binary {
                op: BinaryOp::Equals,
                ..
            }
        ));
    }

    #[test]
    fn parses_method_call_statement() {
        let program = parse_source("data.append(1)");
        let StatementKind::Call { callee, args } = &program.statements[0].kind else {
            panic!("expected call statement");
        };
        assert_eq!(callee.to_string(), "data.append");
        assert!(matches!(
            callee.kind,
            ExpressionKind::Binary {
                op: BinaryOp::Dot,
                ..
            }
        ));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn parses_control_flow_with_indentation() {
        let program = parse_source(indoc! {"
            if x == 1:
                print(x)
            elif x == 2:
                print(0)
            else:
                print(1)
        "});
        assert_eq!(program.statements.len(), 6);
        assert!(matches!(
            program.statements[0].kind,
            StatementKind::If { is_elif: false, .. }
        ));
        assert_eq!(program.statements[1].indentation, 1);
        assert!(matches!(
            program.statements[2].kind,
            StatementKind::If { is_elif: true, .. }
        ));
        assert!(matches!(program.statements[4].kind, StatementKind::Else));
    }

    #[test]
    fn parses_for_over_range() {
        let program = parse_source("for i in range(3):\n    print(i)");
        let StatementKind::For { variable, range } = &program.statements[0].kind else {
            panic!("expected for statement");
        };
        assert_eq!(variable.kind, ExpressionKind::Name("i".into()));
        assert!(matches!(range.kind, ExpressionKind::Range(_)));
    }

    #[test]
    fn parses_import_statement() {
        let program = parse_source("from random import randint");
        assert_eq!(
            program.statements[0].kind,
            StatementKind::Import {
                library: "random".into(),
                name: "randint".into(),
            }
        );
    }

    #[test]
    fn parses_index_assignment_and_empty_array() {
        let program = parse_source("a = []\na[0] = 1");
        assert_eq!(
            program.statements[0].to_string(),
            "a = []"
        );
        let StatementKind::Assignment { target, .. } = &program.statements[1].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(
            target.kind,
            ExpressionKind::Binary {
                op: BinaryOp::Index,
                ..
            }
        ));
    }

    #[test]
    fn rejects_statement_garbage() {
        let error = parse_error("x = 1\n= 2");
        assert_eq!(error.to_string(), "Statement expected in line 2");
    }

    #[test]
    fn rejects_if_without_colon() {
        let error = parse_error("if x == 1\n    print(x)");
        assert_eq!(error.to_string(), "Colon expected after condition in line 1");
    }

    #[test]
    fn rejects_assignment_without_value() {
        let error = parse_error("x =");
        assert_eq!(error.to_string(), "Expression expected after '=' in line 1");
    }

    #[test]
    fn rejects_unclosed_parameter_list() {
        let error = parse_error("print(1");
        assert_eq!(
            error.to_string(),
            "')' expected after parameter list in line 1"
        );
    }

    #[test]
    fn rejects_arguments_without_separator() {
        let error = parse_error("print(1 2)");
        assert_eq!(
            error.to_string(),
            "',' expected in parameter list in line 1"
        );
    }
}
