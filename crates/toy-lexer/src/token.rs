use std::fmt;
use std::rc::Rc;

/// A position in source text, tracking line and column for diagnostics.
///
/// Lines and columns are 0-based. The source name is shared by every location
/// a lexer produces, so cloning a `Location` never copies the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub source_name: Rc<str>,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(source_name: Rc<str>, line: usize, column: usize) -> Self {
        Self {
            source_name,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_name, self.line, self.column)
    }
}

/// Token classification for Toy source.
///
/// Identifier text and number values are not embedded here; the lexer holds
/// the payload of its current token (see [`crate::Lexer::identifier_text`]).
/// [`Lexeme`] carries a token together with its payload once detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Punctuation
    Semicolon,
    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,
    /// Any other single character, such as `=` or `+`.
    ///
    /// Never holds one of the characters above; build punctuation with
    /// [`Token::from_char`] so `;` is always [`Token::Semicolon`].
    Char(char),

    // End of input
    Eof,

    // Keywords
    Return,
    Var,
    Def,

    // Primary
    Identifier,
    Number,
}

impl Token {
    /// Map a character to its punctuation token.
    pub fn from_char(c: char) -> Self {
        match c {
            ';' => Token::Semicolon,
            '(' => Token::ParenOpen,
            ')' => Token::ParenClose,
            '{' => Token::BraceOpen,
            '}' => Token::BraceClose,
            '[' => Token::BracketOpen,
            ']' => Token::BracketClose,
            c => Token::Char(c),
        }
    }

    /// The literal character of a punctuation token, `None` for everything else.
    pub fn as_char(self) -> Option<char> {
        match self {
            Token::Semicolon => Some(';'),
            Token::ParenOpen => Some('('),
            Token::ParenClose => Some(')'),
            Token::BraceOpen => Some('{'),
            Token::BraceClose => Some('}'),
            Token::BracketOpen => Some('['),
            Token::BracketClose => Some(']'),
            Token::Char(c) => Some(c),
            _ => None,
        }
    }

    /// Determine if an identifier is a keyword.
    pub fn keyword(ident: &str) -> Option<Self> {
        match ident {
            "return" => Some(Token::Return),
            "def" => Some(Token::Def),
            "var" => Some(Token::Var),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => f.write_str("eof"),
            Token::Return => f.write_str("return"),
            Token::Var => f.write_str("var"),
            Token::Def => f.write_str("def"),
            Token::Identifier => f.write_str("identifier"),
            Token::Number => f.write_str("number"),
            punct => match punct.as_char() {
                Some(c) => write!(f, "'{c}'"),
                None => unreachable!("every remaining token is punctuation"),
            },
        }
    }
}

/// Data carried by an identifier or number token.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Identifier(String),
    Number(f64),
}

/// A token detached from the lexer, with its payload and start location.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub payload: Payload,
    pub location: Location,
}

impl Lexeme {
    pub fn new(token: Token, payload: Payload, location: Location) -> Self {
        Self {
            token,
            payload,
            location,
        }
    }
}
