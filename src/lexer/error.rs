use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Invalid symbol used: {symbol} in line {line}:{column}")]
    InvalidSymbol {
        symbol: char,
        line: usize,
        column: usize,
    },
    #[error("String quotes are inconsistent: {opening} and {closing} in line {line}:{column}")]
    InconsistentQuotes {
        opening: char,
        closing: char,
        line: usize,
        column: usize,
    },
    #[error("String literal end ({quote}) expected but code line ended in line {line}:{column}")]
    UnterminatedString {
        quote: char,
        line: usize,
        column: usize,
    },
    #[error("String did not end: {literal} in line {line}:{column}")]
    StringRunsToEndOfInput {
        literal: String,
        line: usize,
        column: usize,
    },
    #[error("Invalid numeric value: {literal} in line {line}:{column}")]
    InvalidNumber {
        literal: String,
        line: usize,
        column: usize,
    },
}
