pub mod analyser;
pub mod ast;
pub mod fixtures;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod token;
