use std::fmt::Write;

use rustc_hash::FxHashMap;

/// The fixed keyword table of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Range,
    Import,
    From,
}

impl Keyword {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "if" => Some(Self::If),
            "elif" => Some(Self::Elif),
            "else" => Some(Self::Else),
            "while" => Some(Self::While),
            "for" => Some(Self::For),
            "in" => Some(Self::In),
            "range" => Some(Self::Range),
            "import" => Some(Self::Import),
            "from" => Some(Self::From),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::In => "in",
            Self::Range => "range",
            Self::Import => "import",
            Self::From => "from",
        }
    }
}

/// Classified lexeme. `Name`, `Number` and `Str` carry indices into the
/// intern tables of the stream that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name(usize),
    Number(usize),
    Str(usize),
    Keyword(Keyword),
    Special(char),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based source line.
    pub line: usize,
    /// 0-based column of the first character of the lexeme.
    pub column: usize,
    /// Block depth of the line this token appeared on.
    pub indentation: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize, indentation: usize) -> Self {
        Self {
            kind,
            line,
            column,
            indentation,
        }
    }
}

/// Append-only intern table mapping first-seen text to a stable index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringTable {
    entries: Vec<String>,
    lookup: FxHashMap<String, usize>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing index for `text` or appends a new entry.
    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(&index) = self.lookup.get(text) {
            return index;
        }
        let index = self.entries.len();
        self.entries.push(text.to_string());
        self.lookup.insert(text.to_string(), index);
        index
    }

    pub fn get(&self, index: usize) -> &str {
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Output of the tokenizer: the token sequence plus the two intern tables
/// shared read-only with the parser and the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub names: StringTable,
    pub consts: StringTable,
}

impl TokenStream {
    /// Human-readable listing of the intern tables, for the driver's
    /// `--dump-tokens` flag.
    pub fn table_summary(&self) -> String {
        let mut text = String::new();
        text.push_str("Names:\n");
        for (index, name) in self.names.iter().enumerate() {
            let _ = writeln!(text, "  {index}: {name}");
        }
        text.push_str("Consts:\n");
        for (index, value) in self.consts.iter().enumerate() {
            let _ = writeln!(text, "  {index}: {value}");
        }
        text
    }
}
