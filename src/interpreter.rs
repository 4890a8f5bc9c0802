pub mod error;
pub mod eval;
pub mod value;

pub use error::{EvalError, RuntimeError};
pub use value::{RangeValue, Value};

use rustc_hash::FxHashMap;

use crate::ast::{
    AssignOp, BinaryOp, Expression, ExpressionKind, Program, Statement, StatementKind,
};

/// Program-counter execution over the flat statement list. Block extents
/// are not stored in the AST; they are rediscovered on every dispatch by
/// scanning forward for the first statement at or below the opener's
/// indentation.
pub struct Interpreter<'a> {
    program: &'a Program,
    pc: usize,
    variables: FxHashMap<String, Value>,
    imported_modules: Vec<String>,
    output: Vec<String>,
}

fn runtime_error(statement: &Statement, source: EvalError) -> RuntimeError {
    RuntimeError {
        line: statement.line,
        statement: statement.kind.describe(),
        source,
    }
}

fn callee_name(callee: &Expression) -> Option<&str> {
    match &callee.kind {
        ExpressionKind::Name(name) => Some(name),
        ExpressionKind::Binary {
            op: BinaryOp::Dot,
            right,
            ..
        } => match &right.kind {
            ExpressionKind::Name(name) => Some(name),
            _ => None,
        },
        _ => None,
    }
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            pc: 0,
            variables: FxHashMap::default(),
            imported_modules: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while self.pc < self.program.statements.len() {
            self.interpret_statement()?;
        }
        Ok(())
    }

    /// Lines captured from `print` calls, in execution order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn imported_modules(&self) -> &[String] {
        &self.imported_modules
    }

    fn statement_at(&self, index: usize) -> &'a Statement {
        &self.program.statements[index]
    }

    /// Index of the first statement at or after `from` whose indentation
    /// does not exceed `indentation`; the end of the program otherwise.
    fn next_at_or_below(&self, from: usize, indentation: usize) -> usize {
        let statements = &self.program.statements;
        let mut index = from;
        while index < statements.len() && statements[index].indentation > indentation {
            index += 1;
        }
        index
    }

    /// After a taken branch, steps over every `elif` and `else` continuation
    /// at the same depth so the whole chain executes at most one block.
    fn skip_chain(&self, mut boundary: usize, indentation: usize) -> usize {
        let statements = &self.program.statements;
        while boundary < statements.len() {
            let statement = &statements[boundary];
            if statement.indentation != indentation {
                break;
            }
            match statement.kind {
                StatementKind::If { is_elif: true, .. } | StatementKind::Else => {
                    boundary = self.next_at_or_below(boundary + 1, indentation);
                }
                _ => break,
            }
        }
        boundary
    }

    /// A condition that fails to evaluate counts as satisfied.
    fn condition_holds(&mut self, condition: &'a Expression) -> bool {
        match self.eval(condition) {
            Ok(value) => value.is_true(),
            Err(_) => true,
        }
    }

    fn interpret_statement(&mut self) -> Result<(), RuntimeError> {
        let statement = self.statement_at(self.pc);
        self.pc += 1;
        match &statement.kind {
            StatementKind::Import { library, .. } => {
                if !self.imported_modules.iter().any(|module| module == library) {
                    self.imported_modules.push(library.clone());
                }
                Ok(())
            }
            StatementKind::Assignment { op, target, value } => self
                .assign(*op, target, value)
                .map_err(|error| runtime_error(statement, error)),
            StatementKind::If { condition, .. } => self.interpret_if(statement, condition),
            StatementKind::Else => self.interpret_else(statement),
            StatementKind::While { condition } => self.interpret_while(statement, condition),
            StatementKind::For { variable, range } => {
                self.interpret_for(statement, variable, range)
            }
            StatementKind::Call { callee, args } => self
                .call_function(callee, args)
                .map(|_| ())
                .map_err(|error| runtime_error(statement, error)),
        }
    }

    fn interpret_if(
        &mut self,
        statement: &'a Statement,
        condition: &'a Expression,
    ) -> Result<(), RuntimeError> {
        let boundary = self.next_at_or_below(self.pc, statement.indentation);
        if self.condition_holds(condition) {
            while self.pc < boundary {
                self.interpret_statement()?;
            }
            self.pc = self.skip_chain(boundary, statement.indentation);
        } else {
            self.pc = boundary;
        }
        Ok(())
    }

    // Reached only when no earlier branch of the chain was taken.
    fn interpret_else(&mut self, statement: &'a Statement) -> Result<(), RuntimeError> {
        let boundary = self.next_at_or_below(self.pc, statement.indentation);
        while self.pc < boundary {
            self.interpret_statement()?;
        }
        Ok(())
    }

    fn interpret_while(
        &mut self,
        statement: &'a Statement,
        condition: &'a Expression,
    ) -> Result<(), RuntimeError> {
        let body_start = self.pc;
        let body_end = self.next_at_or_below(self.pc, statement.indentation);
        while self.condition_holds(condition) {
            self.pc = body_start;
            while self.pc < body_end {
                self.interpret_statement()?;
            }
        }
        self.pc = body_end;
        Ok(())
    }

    /// Ranges run from start to end inclusive, ascending.
    fn interpret_for(
        &mut self,
        statement: &'a Statement,
        variable: &'a Expression,
        range: &'a Expression,
    ) -> Result<(), RuntimeError> {
        let body_start = self.pc;
        let body_end = self.next_at_or_below(self.pc, statement.indentation);

        let ExpressionKind::Name(name) = &variable.kind else {
            return Err(runtime_error(statement, EvalError::ForVariableNotAName));
        };
        let range_value = self
            .eval(range)
            .map_err(|error| runtime_error(statement, error))?;
        let Value::Range(range_value) = range_value else {
            return Err(runtime_error(
                statement,
                EvalError::ForExpectsRange {
                    actual: range_value.type_name(),
                },
            ));
        };

        let mut iterator = range_value.start.clone();
        self.variables.insert(name.clone(), iterator.clone());
        loop {
            let in_range = match eval::compare(BinaryOp::LessEq, &iterator, &range_value.end) {
                Ok(value) => value.is_true(),
                Err(_) => true,
            };
            if !in_range {
                break;
            }
            self.pc = body_start;
            while self.pc < body_end {
                self.interpret_statement()?;
            }
            iterator = eval::add(iterator, range_value.step.clone())
                .map_err(|error| runtime_error(statement, error))?;
            self.variables.insert(name.clone(), iterator.clone());
        }
        self.pc = body_end;
        Ok(())
    }

    fn assign(
        &mut self,
        op: AssignOp,
        target: &'a Expression,
        value: &'a Expression,
    ) -> Result<(), EvalError> {
        let computed = match op {
            AssignOp::Assign => self.eval(value)?,
            AssignOp::Add => eval::add(self.eval(target)?, self.eval(value)?)?,
            AssignOp::Sub => eval::sub(self.eval(target)?, self.eval(value)?)?,
            AssignOp::Mul => eval::mul(self.eval(target)?, self.eval(value)?)?,
            AssignOp::Div => eval::div(self.eval(target)?, self.eval(value)?)?,
        };
        self.store(target, computed)
    }

    fn store(&mut self, target: &Expression, value: Value) -> Result<(), EvalError> {
        match &target.kind {
            ExpressionKind::Name(name) => {
                self.variables.insert(name.clone(), value);
                Ok(())
            }
            ExpressionKind::Binary {
                op: BinaryOp::Index,
                left,
                right,
            } => {
                let array = self.eval(left)?;
                let index = self.eval(right)?;
                eval::index_set(&array, &index, value)
            }
            _ => Err(EvalError::UnsupportedAssignmentTarget),
        }
    }

    fn eval(&mut self, expression: &Expression) -> Result<Value, EvalError> {
        match &expression.kind {
            // Reading an unknown name creates it as none.
            ExpressionKind::Name(name) => Ok(self
                .variables
                .entry(name.clone())
                .or_insert(Value::None)
                .clone()),
            ExpressionKind::Number(text) => eval::parse_number(text),
            ExpressionKind::Str(text) => Ok(Value::Str(text.clone())),
            ExpressionKind::Range(end) => {
                let end = self.eval(end)?;
                Ok(Value::Range(Box::new(RangeValue {
                    start: Value::Integer(0),
                    end,
                    step: Value::Integer(1),
                })))
            }
            ExpressionKind::EmptyArray => Ok(Value::array(Vec::new())),
            ExpressionKind::Call { callee, args } => self.call_function(callee, args),
            ExpressionKind::Not(operand) => {
                let value = self.eval(operand)?;
                eval::not(&value)
            }
            ExpressionKind::Binary { op, left, right } => self.eval_binary(*op, left, right),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
    ) -> Result<Value, EvalError> {
        match op {
            BinaryOp::Add => eval::add(self.eval(left)?, self.eval(right)?),
            BinaryOp::Sub => eval::sub(self.eval(left)?, self.eval(right)?),
            BinaryOp::Mul => eval::mul(self.eval(left)?, self.eval(right)?),
            BinaryOp::Div => eval::div(self.eval(left)?, self.eval(right)?),
            BinaryOp::Index => {
                let target = self.eval(left)?;
                let index = self.eval(right)?;
                eval::index_get(&target, &index)
            }
            BinaryOp::Dot => {
                let target = self.eval(left)?;
                Err(EvalError::UnsupportedOperand {
                    operation: ".",
                    operand: target.type_name(),
                })
            }
            BinaryOp::Less
            | BinaryOp::LessEq
            | BinaryOp::Greater
            | BinaryOp::GreaterEq
            | BinaryOp::Equals => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                eval::compare(op, &left, &right)
            }
            BinaryOp::Or | BinaryOp::And | BinaryOp::Xor => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                eval::logical(op, &left, &right)
            }
        }
    }

    fn call_function(
        &mut self,
        callee: &Expression,
        args: &[Expression],
    ) -> Result<Value, EvalError> {
        let name = callee_name(callee).ok_or(EvalError::UnsupportedCallTarget)?;
        match name {
            "print" => {
                let argument = args
                    .first()
                    .ok_or(EvalError::MissingArgument { name: "print" })?;
                let value = self.eval(argument)?;
                self.output.push(value.to_output());
                Ok(Value::None)
            }
            "len" => {
                let argument = args
                    .first()
                    .ok_or(EvalError::MissingArgument { name: "len" })?;
                let value = self.eval(argument)?;
                match value {
                    Value::Array(elements) => Ok(Value::Integer(elements.borrow().len() as i64)),
                    other => Err(EvalError::LenExpectsArray {
                        actual: other.type_name(),
                    }),
                }
            }
            // Recognised but unimplemented; both evaluate to none.
            "randint" | "append" => Ok(Value::None),
            other => Err(EvalError::UnknownFunction {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use indoc::indoc;

    fn build(source: &str) -> Program {
        let stream = tokenize(source).expect("tokenize failed");
        parse(&stream).expect("parse failed")
    }

    fn run(source: &str) -> Vec<String> {
        let program = build(source);
        let mut interpreter = Interpreter::new(&program);
        interpreter.run().expect("run failed");
        interpreter.output().to_vec()
    }

    fn run_error(source: &str) -> RuntimeError {
        let program = build(source);
        let mut interpreter = Interpreter::new(&program);
        interpreter.run().expect_err("expected runtime error")
    }

    #[test]
    fn assigns_and_reads_back() {
        let output = run(indoc! {"
            x = 1
            y = x + 2
            print(y)
        "});
        assert_eq!(output, ["3"]);
    }

    #[test]
    fn promotes_mixed_arithmetic() {
        assert_eq!(run("z = 1.5 + 2\nprint(z)"), ["3.5"]);
        assert_eq!(run("print(7 / 2)"), ["3"]);
        assert_eq!(run("print(7.0 / 2)"), ["3.5"]);
    }

    #[test]
    fn compound_assignment_reads_target_first() {
        assert_eq!(run("x = 10\nx -= 4\nx /= 2\nprint(x)"), ["3"]);
    }

    #[test]
    fn concatenates_strings_with_any_right_operand() {
        assert_eq!(run("print(\"n = \" + 7)"), ["n = 7"]);
    }

    #[test]
    fn string_subtraction_is_a_runtime_error() {
        let error = run_error("x = \"abc\" - \"def\"");
        assert_eq!(
            error.to_string(),
            "Operation - is not supported for types string and string in line 1 (assignment)"
        );
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let error = run_error("x = 1 / 0");
        assert_eq!(error.to_string(), "Division by zero in line 1 (assignment)");
    }

    #[test]
    fn if_chain_executes_first_matching_branch_only() {
        let source = indoc! {"
            x = 2
            if x == 1:
                print(\"one\")
            elif x == 2:
                print(\"two\")
            else:
                print(\"other\")
        "};
        assert_eq!(run(source), ["two"]);
    }

    #[test]
    fn taken_if_skips_the_whole_chain() {
        let source = indoc! {"
            x = 1
            if x == 1:
                print(\"one\")
            else:
                print(\"other\")
            print(\"after\")
        "};
        assert_eq!(run(source), ["one", "after"]);
    }

    #[test]
    fn else_runs_when_no_branch_matched() {
        let source = indoc! {"
            x = 9
            if x == 1:
                print(\"one\")
            elif x == 2:
                print(\"two\")
            else:
                print(\"other\")
        "};
        assert_eq!(run(source), ["other"]);
    }

    #[test]
    fn failing_condition_counts_as_true() {
        let source = indoc! {"
            if \"a\" - \"b\":
                print(\"reached\")
        "};
        assert_eq!(run(source), ["reached"]);
    }

    #[test]
    fn while_loop_reevaluates_condition() {
        let source = indoc! {"
            n = 0
            while n < 3:
                n += 1
            print(n)
        "};
        assert_eq!(run(source), ["3"]);
    }

    #[test]
    fn for_range_is_inclusive() {
        let source = indoc! {"
            for i in range(3):
                print(i)
        "};
        assert_eq!(run(source), ["0", "1", "2", "3"]);
    }

    #[test]
    fn nested_blocks_execute_in_order() {
        let source = indoc! {"
            total = 0
            for i in range(2):
                if i == 1:
                    total += 10
                total += 1
            print(total)
        "};
        assert_eq!(run(source), ["13"]);
    }

    #[test]
    fn for_over_non_range_fails() {
        let error = run_error("for i in 3:\n    print(i)");
        assert_eq!(error.to_string(), "For loop expects a range, got int in line 1 (for)");
    }

    #[test]
    fn range_values_print_their_bounds() {
        assert_eq!(run("r = range(3)\nprint(r)"), ["range(0-3:1)"]);
    }

    #[test]
    fn arrays_alias_on_assignment_but_not_on_concat() {
        let source = indoc! {"
            a = []
            a[0] = 1
            b = a
            b[1] = 5
            print(a)
            c = a + b
            print(len(c))
            print(a + 9)
            print(a)
        "};
        assert_eq!(run(source), ["[1, 5]", "4", "[1, 5, 9]", "[1, 5]"]);
    }

    #[test]
    fn index_write_past_end_pads_with_none() {
        assert_eq!(run("a = []\na[3] = 1\nprint(a)"), ["[, , , 1]"]);
    }

    #[test]
    fn compound_assignment_through_index() {
        assert_eq!(run("a = []\na[0] = 1\na[0] += 2\nprint(a[0])"), ["3"]);
    }

    #[test]
    fn index_errors_carry_statement_context() {
        let error = run_error("a = []\na[0] = 1\nx = a[5]");
        assert_eq!(
            error.to_string(),
            "Array index 5 is out of bounds (length 1) in line 3 (assignment)"
        );

        let error = run_error("a = []\nx = a[0 - 1]");
        assert!(matches!(error.source, EvalError::NegativeIndex { index: -1 }));

        let error = run_error("x = 1\ny = x[0]");
        assert!(matches!(
            error.source,
            EvalError::IndexedNonArray { actual: "int" }
        ));
    }

    #[test]
    fn len_requires_an_array() {
        let error = run_error("x = len(3)");
        assert_eq!(
            error.to_string(),
            "len expects an array, got int in line 1 (assignment)"
        );
    }

    #[test]
    fn randint_and_append_are_recognised_noops() {
        assert_eq!(run("x = randint(1, 10)\nprint(x)"), [""]);
        assert_eq!(run("a = []\na[0] = 1\na.append(2)\nprint(a)"), ["[1]"]);
    }

    #[test]
    fn unknown_function_is_a_runtime_error() {
        let error = run_error("x = mystery(1)");
        assert_eq!(
            error.to_string(),
            "Unknown function mystery in line 1 (assignment)"
        );
    }

    #[test]
    fn output_is_retained_after_a_runtime_failure() {
        let source = indoc! {"
            print(\"before\")
            x = \"a\" - \"b\"
            print(\"after\")
        "};
        let program = build(source);
        let mut interpreter = Interpreter::new(&program);
        interpreter.run().expect_err("expected runtime error");
        assert_eq!(interpreter.output(), ["before"]);
    }

    #[test]
    fn reading_an_unset_name_yields_none() {
        assert_eq!(run("print(missing)"), [""]);
    }

    #[test]
    fn imports_are_recorded_once() {
        let source = indoc! {"
            from random import randint
            from random import randint
            from os import path
        "};
        let program = build(source);
        let mut interpreter = Interpreter::new(&program);
        interpreter.run().expect("run failed");
        assert_eq!(interpreter.imported_modules(), ["random", "os"]);
    }

    #[test]
    fn dotted_assignment_target_is_rejected() {
        let error = run_error("a.b = 1");
        assert_eq!(
            error.to_string(),
            "Cannot assign to this target in line 1 (assignment)"
        );
    }

    #[test]
    fn not_inverts_booleans() {
        // The surface grammar never produces `Not`; build it directly.
        let number = |text: &str| Expression {
            line: 1,
            column: 0,
            kind: ExpressionKind::Number(text.into()),
        };
        let comparison = Expression {
            line: 1,
            column: 4,
            kind: ExpressionKind::Binary {
                op: BinaryOp::Less,
                left: Box::new(number("1")),
                right: Box::new(number("2")),
            },
        };
        let program = Program {
            statements: vec![Statement {
                line: 1,
                column: 0,
                indentation: 0,
                kind: StatementKind::Assignment {
                    op: AssignOp::Assign,
                    target: Expression {
                        line: 1,
                        column: 0,
                        kind: ExpressionKind::Name("x".into()),
                    },
                    value: Expression {
                        line: 1,
                        column: 4,
                        kind: ExpressionKind::Not(Box::new(comparison)),
                    },
                },
            }],
        };
        let mut interpreter = Interpreter::new(&program);
        interpreter.run().expect("run failed");
        assert_eq!(interpreter.variable("x"), Some(&Value::Bool(false)));
    }
}
