//! Toy Lexer
//!
//! Tokenizes Toy source text pulled line by line from a [`LineSource`].
//! Handles keywords (`def` `var` `return`), identifiers, numbers, `#` comments,
//! and single-character punctuation, attaching a [`Location`] to every token.
//!
//! # Example
//!
//! ```
//! use toy_lexer::{Lexer, Token};
//!
//! let tokens = Lexer::tokenize("empty.toy", "");
//! assert_eq!(tokens.len(), 1); // Just EOF
//! assert_eq!(tokens[0].token, Token::Eof);
//! ```

pub mod lexer;
pub mod source;
pub mod token;

pub use lexer::Lexer;
pub use source::{LineSource, MemorySource, ReaderSource, SourceError};
pub use token::{Lexeme, Location, Payload, Token};
