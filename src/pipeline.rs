use thiserror::Error;

use crate::analyser::{self, SemanticError};
use crate::interpreter::{Interpreter, RuntimeError};
use crate::lexer::{self, LexError};
use crate::parser::{self, SyntaxError};

/// Stage-tagged failure. The `Display` form is the single diagnostic line
/// shown to the user: `"<Stage> error: <message> in line <N>[:<col>]"`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Lexic error: {0}")]
    Lex(#[from] LexError),
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),
    #[error("Interpreter error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Lex(_) => "lexical analysis",
            Self::Syntax(_) => "parsing",
            Self::Semantic(_) => "semantic analysis",
            Self::Runtime(_) => "interpretation",
        }
    }
}

/// Runs all four stages over one source text and returns the program's
/// captured output, newline-joined. The first failing stage aborts the
/// rest of the pipeline.
pub fn run_source(source: &str) -> Result<String, PipelineError> {
    let stream = lexer::tokenize(source)?;
    let program = parser::parse(&stream)?;
    analyser::analyse(&program)?;
    let mut interpreter = Interpreter::new(&program);
    interpreter.run()?;
    Ok(interpreter.output().join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn runs_a_whole_program() {
        let source = indoc! {"
            total = 0
            for i in range(3):
                total += i
            print(total)
        "};
        assert_eq!(run_source(source).expect("pipeline failed"), "6");
    }

    #[test]
    fn tags_each_stage_in_the_diagnostic() {
        let error = run_source("x = 1 ~ 2").expect_err("expected lex error");
        assert_eq!(
            error.to_string(),
            "Lexic error: Invalid symbol used: ~ in line 1:6"
        );
        assert_eq!(error.stage(), "lexical analysis");

        let error = run_source("x =").expect_err("expected syntax error");
        assert_eq!(
            error.to_string(),
            "Syntax error: Expression expected after '=' in line 1"
        );

        let error = run_source("x = 1\n    y = 2").expect_err("expected semantic error");
        assert_eq!(
            error.to_string(),
            "Semantic error: Unexpected indentation in line 2, expected 0 or less"
        );

        let error = run_source("x = 1 / 0").expect_err("expected runtime error");
        assert_eq!(
            error.to_string(),
            "Interpreter error: Division by zero in line 1 (assignment)"
        );
    }

    #[test]
    fn semantic_failure_stops_before_interpretation() {
        // The print would otherwise run; the arity error must come first.
        let error = run_source("print(1, 2)").expect_err("expected semantic error");
        assert!(matches!(error, PipelineError::Semantic(_)));
    }
}
