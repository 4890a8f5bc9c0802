use crate::token::{Keyword, StringTable, Token, TokenKind, TokenStream};

mod error;

pub use error::LexError;

const SPECIAL_SYMBOLS: &str = "(){}[]<>,.:;!@%|&^*-+=/?";
const INDENT_WIDTH: usize = 4;

/// Class of the lexeme currently being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexemeClass {
    None,
    Name,
    Number,
    Str,
}

/// Character-class state machine over the source text. Lexemes are flushed
/// whenever the class of the next character differs from the one in
/// progress; special symbols are emitted immediately, one token per
/// character (`<=`, `>=` and `==` are reassembled later by the parser).
struct Lexer {
    tokens: Vec<Token>,
    names: StringTable,
    consts: StringTable,
    line: usize,
    column: usize,
    /// Block depth of the current line, unknown until its first
    /// non-space character.
    indentation: Option<usize>,
    state: LexemeClass,
    buffer: String,
    /// Position and depth where the buffered lexeme started.
    mark: (usize, usize, usize),
    quote: char,
    in_comment: bool,
}

/// Converts source text into a classified token sequence, interning names
/// and literal constants along the way.
pub fn tokenize(text: &str) -> Result<TokenStream, LexError> {
    let mut lexer = Lexer::new();
    lexer.run(text)?;
    Ok(TokenStream {
        tokens: lexer.tokens,
        names: lexer.names,
        consts: lexer.consts,
    })
}

impl Lexer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            names: StringTable::new(),
            consts: StringTable::new(),
            line: 1,
            column: 0,
            indentation: None,
            state: LexemeClass::None,
            buffer: String::new(),
            mark: (1, 0, 0),
            quote: '"',
            in_comment: false,
        }
    }

    fn run(&mut self, text: &str) -> Result<(), LexError> {
        for symbol in text.chars() {
            if symbol == '\n' {
                if self.state == LexemeClass::Str {
                    return Err(LexError::UnterminatedString {
                        quote: self.quote,
                        line: self.line,
                        column: self.column,
                    });
                }
                self.flush()?;
                self.in_comment = false;
                self.line += 1;
                self.column = 0;
                self.indentation = None;
                continue;
            }

            let column = self.column;
            self.column += 1;
            if self.in_comment {
                continue;
            }
            if self.indentation.is_none() && symbol != ' ' {
                self.indentation = Some(column / INDENT_WIDTH);
            }

            if self.state == LexemeClass::Str {
                if symbol == '"' || symbol == '\'' {
                    if symbol != self.quote {
                        return Err(LexError::InconsistentQuotes {
                            opening: self.quote,
                            closing: symbol,
                            line: self.line,
                            column,
                        });
                    }
                    let index = self.consts.intern(&self.buffer);
                    self.push_marked(TokenKind::Str(index));
                    self.buffer.clear();
                    self.state = LexemeClass::None;
                } else {
                    self.buffer.push(symbol);
                }
                continue;
            }

            if symbol == '#' {
                self.flush()?;
                self.in_comment = true;
                continue;
            }

            if symbol == '"' || symbol == '\'' {
                self.flush()?;
                self.state = LexemeClass::Str;
                self.quote = symbol;
                self.set_mark(column);
                continue;
            }
            if symbol.is_alphabetic() || symbol == '_' {
                if self.state != LexemeClass::Name {
                    self.flush()?;
                    self.state = LexemeClass::Name;
                    self.set_mark(column);
                }
                self.buffer.push(symbol);
                continue;
            }
            // A digit always opens a number lexeme; names cannot contain
            // digits. '.' continues a number already in progress.
            if symbol.is_ascii_digit() || (self.state == LexemeClass::Number && symbol == '.') {
                if self.state != LexemeClass::Number {
                    self.flush()?;
                    self.state = LexemeClass::Number;
                    self.set_mark(column);
                }
                self.buffer.push(symbol);
                continue;
            }
            if symbol.is_whitespace() {
                self.flush()?;
                continue;
            }
            if SPECIAL_SYMBOLS.contains(symbol) {
                self.flush()?;
                let token = Token::new(
                    TokenKind::Special(symbol),
                    self.line,
                    column,
                    self.indentation.unwrap_or(0),
                );
                self.tokens.push(token);
                continue;
            }
            return Err(LexError::InvalidSymbol {
                symbol,
                line: self.line,
                column,
            });
        }

        if self.state == LexemeClass::Str {
            return Err(LexError::StringRunsToEndOfInput {
                literal: self.buffer.clone(),
                line: self.line,
                column: self.column,
            });
        }
        self.flush()?;
        self.tokens
            .push(Token::new(TokenKind::End, self.line, self.column, 0));
        Ok(())
    }

    fn set_mark(&mut self, column: usize) {
        self.mark = (self.line, column, self.indentation.unwrap_or(0));
    }

    /// Emits the buffered lexeme, if any, at the position where it started.
    fn flush(&mut self) -> Result<(), LexError> {
        match self.state {
            LexemeClass::Name => {
                let kind = match Keyword::from_text(&self.buffer) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Name(self.names.intern(&self.buffer)),
                };
                self.push_marked(kind);
            }
            LexemeClass::Number => {
                if self.buffer.parse::<i64>().is_err() && self.buffer.parse::<f64>().is_err() {
                    return Err(LexError::InvalidNumber {
                        literal: self.buffer.clone(),
                        line: self.mark.0,
                        column: self.mark.1,
                    });
                }
                let index = self.consts.intern(&self.buffer);
                self.push_marked(TokenKind::Number(index));
            }
            LexemeClass::Str | LexemeClass::None => {}
        }
        self.state = LexemeClass::None;
        self.buffer.clear();
        Ok(())
    }

    fn push_marked(&mut self, kind: TokenKind) {
        let (line, column, indentation) = self.mark;
        self.tokens.push(Token::new(kind, line, column, indentation));
    }
}
