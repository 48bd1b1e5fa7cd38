use std::borrow::Cow;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::source::{LineSource, MemorySource};
use crate::token::{Lexeme, Location, Payload, Token};

/// Toy source lexer.
///
/// Pulls lines from a [`LineSource`] on demand and classifies them into tokens
/// with a single character of lookahead. The lexer always holds one current
/// token; the parser inspects it with [`Lexer::current_token`] and moves on with
/// [`Lexer::advance`] or [`Lexer::consume`].
///
/// ```
/// use toy_lexer::{Lexer, MemorySource, Token};
///
/// let mut lexer = Lexer::new("inline", MemorySource::new("var answer = 42;"));
/// assert_eq!(lexer.advance(), Token::Var);
/// assert_eq!(lexer.advance(), Token::Identifier);
/// assert_eq!(lexer.identifier_text(), "answer");
/// lexer.consume(Token::Identifier);
/// lexer.consume(Token::Char('='));
/// assert_eq!(lexer.numeric_value(), 42.0);
/// ```
pub struct Lexer<'a, S> {
    source: S,
    source_name: Rc<str>,

    current: Token,
    last_location: Location,
    identifier_text: String,
    numeric_value: f64,

    /// The last character returned by `next_char`. Token ends are only known
    /// after reading one past them, so this slot carries that character into
    /// the next token. `None` marks end of input.
    lookahead: Option<char>,
    lookahead_line: usize,
    lookahead_column: usize,

    line: usize,
    column: usize,

    /// Current line from the source; `line_buffer[buffer_pos..]` is unconsumed.
    line_buffer: Cow<'a, str>,
    buffer_pos: usize,

    iter_done: bool,
}

impl<'a> Lexer<'a, MemorySource<'a>> {
    /// Tokenize an in-memory source, up to and including the end-of-file token.
    pub fn tokenize(source_name: &str, text: &'a str) -> Vec<Lexeme> {
        Lexer::new(source_name, MemorySource::new(text)).collect()
    }
}

impl<'a, S: LineSource<'a>> Lexer<'a, S> {
    /// Create a lexer reading from `source`. The name only labels locations.
    ///
    /// The first line is pulled from the source immediately.
    pub fn new(source_name: impl Into<Rc<str>>, mut source: S) -> Self {
        let source_name = source_name.into();
        trace!(target: "toy::lexer", source = %source_name, "Creating lexer");
        let line_buffer = source.read_next_line();
        Self {
            source,
            last_location: Location::new(Rc::clone(&source_name), 0, 0),
            source_name,
            current: Token::Eof,
            identifier_text: String::new(),
            numeric_value: 0.0,
            lookahead: Some(' '),
            lookahead_line: 0,
            lookahead_column: 0,
            line: 0,
            column: 0,
            line_buffer,
            buffer_pos: 0,
            iter_done: false,
        }
    }

    /// The current token, without moving.
    pub fn current_token(&self) -> Token {
        self.current
    }

    /// Move to the next token and return it.
    pub fn advance(&mut self) -> Token {
        self.current = self.scan_token();
        trace!(
            target: "toy::lexer",
            token = %self.current,
            line = self.last_location.line,
            column = self.last_location.column,
            "Produced token"
        );
        self.current
    }

    /// Move to the next token, asserting that the current one is `expected`.
    ///
    /// # Panics
    ///
    /// Panics when the current token differs; the caller's grammar is wrong.
    /// Punctuation is compared by character, so `Token::Char(';')` matches
    /// [`Token::Semicolon`].
    #[track_caller]
    pub fn consume(&mut self, expected: Token) {
        let expected = expected.as_char().map_or(expected, Token::from_char);
        assert_eq!(
            self.current, expected,
            "consume: expected {expected} at {}, found {}",
            self.last_location, self.current
        );
        self.advance();
    }

    /// Text of the current identifier.
    ///
    /// # Panics
    ///
    /// Panics unless the current token is [`Token::Identifier`].
    #[track_caller]
    pub fn identifier_text(&self) -> &str {
        assert_eq!(
            self.current,
            Token::Identifier,
            "identifier text read while the current token is {}",
            self.current
        );
        &self.identifier_text
    }

    /// Value of the current number.
    ///
    /// # Panics
    ///
    /// Panics unless the current token is [`Token::Number`].
    #[track_caller]
    pub fn numeric_value(&self) -> f64 {
        assert_eq!(
            self.current,
            Token::Number,
            "numeric value read while the current token is {}",
            self.current
        );
        self.numeric_value
    }

    /// Where the current token began.
    pub fn last_token_location(&self) -> Location {
        self.last_location.clone()
    }

    /// Cursor line, 0-based.
    pub fn current_line(&self) -> usize {
        self.line
    }

    /// Cursor column, 0-based.
    pub fn current_column(&self) -> usize {
        self.column
    }

    /// Name given at construction, shared by every location.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Snapshot of the current token with its payload and location.
    pub fn lexeme(&self) -> Lexeme {
        let payload = match self.current {
            Token::Identifier => Payload::Identifier(self.identifier_text.clone()),
            Token::Number => Payload::Number(self.numeric_value),
            _ => Payload::None,
        };
        Lexeme::new(self.current, payload, self.last_location.clone())
    }

    // --- Character cursor ---

    /// Pop the next character off the line buffer, pulling the following line
    /// as soon as the buffer runs dry. An empty buffer only happens at the end
    /// of input.
    fn next_char(&mut self) -> Option<char> {
        let c = self.line_buffer[self.buffer_pos..].chars().next()?;

        self.lookahead_line = self.line;
        self.lookahead_column = self.column;
        self.buffer_pos += c.len_utf8();
        self.column += 1;

        let refill = self.buffer_pos >= self.line_buffer.len();
        if refill {
            self.line_buffer = self.source.read_next_line();
            self.buffer_pos = 0;
        }

        if c == '\n' {
            self.line += 1;
            self.column = 0;
        }

        if refill {
            if self.line_buffer.is_empty() {
                debug!(target: "toy::lexer", line = self.line, "Reached end of input");
            } else {
                debug!(
                    target: "toy::lexer",
                    line = self.line,
                    len = self.line_buffer.len(),
                    "Pulled next line"
                );
            }
        }
        Some(c)
    }

    fn bump(&mut self) {
        self.lookahead = self.next_char();
    }

    // --- Scanners ---

    fn scan_token(&mut self) -> Token {
        loop {
            while self.lookahead.is_some_and(is_whitespace) {
                self.bump();
            }

            self.last_location = self.lookahead_location();

            let Some(c) = self.lookahead else {
                return Token::Eof;
            };

            match c {
                c if c.is_ascii_alphabetic() => return self.scan_identifier(c),
                c if c.is_ascii_digit() || c == '.' => return self.scan_number(c),
                '#' => {
                    self.skip_comment();
                    if self.lookahead.is_none() {
                        return Token::Eof;
                    }
                }
                c => {
                    self.bump();
                    return Token::from_char(c);
                }
            }
        }
    }

    /// Identifier: `[a-zA-Z][a-zA-Z0-9_]*`, or one of the keywords.
    fn scan_identifier(&mut self, first: char) -> Token {
        self.identifier_text.clear();
        self.identifier_text.push(first);
        loop {
            self.bump();
            match self.lookahead {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => self.identifier_text.push(c),
                _ => break,
            }
        }
        Token::keyword(&self.identifier_text).unwrap_or(Token::Identifier)
    }

    /// Number: `[0-9.]+`.
    fn scan_number(&mut self, first: char) -> Token {
        let mut text = String::new();
        text.push(first);
        loop {
            self.bump();
            match self.lookahead {
                Some(c) if c.is_ascii_digit() || c == '.' => text.push(c),
                _ => break,
            }
        }
        self.numeric_value = parse_number(&text);
        Token::Number
    }

    /// Skip a `#` comment up to the end of its line.
    fn skip_comment(&mut self) {
        loop {
            self.bump();
            if matches!(self.lookahead, None | Some('\n') | Some('\r')) {
                break;
            }
        }
    }

    fn lookahead_location(&self) -> Location {
        let (line, column) = match self.lookahead {
            Some(_) => (self.lookahead_line, self.lookahead_column),
            None => (self.line, self.column),
        };
        Location::new(Rc::clone(&self.source_name), line, column)
    }
}

impl<'a, S: LineSource<'a>> Iterator for Lexer<'a, S> {
    type Item = Lexeme;

    /// Advance and yield the new token, up to and including the next end of file.
    fn next(&mut self) -> Option<Lexeme> {
        if self.iter_done {
            return None;
        }
        self.iter_done = self.advance() == Token::Eof;
        Some(self.lexeme())
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Convert the longest prefix of `text` that reads as a decimal number.
///
/// Scanned text is only digits and dots, so this stops at the second dot:
/// `"1.2.3"` is `1.2`. Text with no number in it (`"."`) is `0.0`.
fn parse_number(text: &str) -> f64 {
    let end = text
        .match_indices('.')
        .nth(1)
        .map_or(text.len(), |(second_dot, _)| second_dot);
    text[..end].parse().unwrap_or(0.0)
}
