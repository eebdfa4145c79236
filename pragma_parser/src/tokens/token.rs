//! Token kinds for host source text and pragma runs
//!
//! A directive run is bracketed by two annotation tokens: `PragmaStart`
//! (produced for `#pragma omp`) and `PragmaEnd` (the end of the logical
//! line). Everything in between is ordinary host-language tokens.
use crate::grammar::keywords::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    // === ANNOTATIONS ===
    /// `#pragma <namespace>` introducing a directive run
    PragmaStart,
    /// Synthetic terminator closing a directive run
    PragmaEnd,

    // === WORDS ===
    /// Reserved host-language word
    Keyword(Keyword),
    Identifier(String),

    // === LITERALS ===
    Integer(i64),
    Float(f64),
    StringLiteral(String),
    CharLiteral(String),

    // === PUNCTUATION ===
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }
    Comma,        // ,
    Colon,        // :
    ColonColon,   // ::
    Semicolon,    // ;
    Question,     // ?
    Dot,          // .
    Arrow,        // ->

    // === OPERATORS ===
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    Amp,          // &
    AmpAmp,       // &&
    Pipe,         // |
    PipePipe,     // ||
    Caret,        // ^
    Tilde,        // ~
    Bang,         // !
    Assign,       // =
    EqualEqual,   // ==
    NotEqual,     // !=
    Less,         // <
    Greater,      // >
    LessEqual,    // <=
    GreaterEqual, // >=
    ShiftLeft,    // <<
    ShiftRight,   // >>
    PlusPlus,     // ++
    MinusMinus,   // --

    // === WHITESPACE AND STRUCTURE ===
    Space,
    Tab,
    Newline,
    /// Comment text or a non-pragma preprocessor line
    Comment(String),
    Eof,
}

/// Token classification mirroring the shapes the parser distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Keyword,
    Identifier,
    Punctuation,
    Operator,
    Literal,
    Annotation,
    Whitespace,
    Special,
}

impl Token {
    /// Spelling of a word token (keyword or identifier)
    pub fn spelling(&self) -> Option<&str> {
        match self {
            Self::Keyword(keyword) => Some(keyword.as_str()),
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// True for a word token with exactly this spelling
    pub fn is_word(&self, word: &str) -> bool {
        self.spelling() == Some(word)
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self, Self::PragmaStart | Self::PragmaEnd)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Integer(_) | Self::Float(_) | Self::StringLiteral(_) | Self::CharLiteral(_)
        )
    }

    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Self::Space | Self::Tab | Self::Newline | Self::Comment(_)
        )
    }

    pub fn is_significant(&self) -> bool {
        !self.is_ignorable()
    }

    /// Tokens a directive run may never be read past
    pub fn is_run_boundary(&self) -> bool {
        matches!(self, Self::PragmaEnd | Self::Eof)
    }

    pub fn is_open_delimiter(&self) -> bool {
        matches!(self, Self::LeftParen | Self::LeftBracket | Self::LeftBrace)
    }

    pub fn is_close_delimiter(&self) -> bool {
        matches!(
            self,
            Self::RightParen | Self::RightBracket | Self::RightBrace
        )
    }

    /// Matching close delimiter for an open delimiter
    pub fn closing_delimiter(&self) -> Option<Token> {
        match self {
            Self::LeftParen => Some(Self::RightParen),
            Self::LeftBracket => Some(Self::RightBracket),
            Self::LeftBrace => Some(Self::RightBrace),
            _ => None,
        }
    }

    /// Token text as it appears in source
    pub fn as_source_string(&self) -> String {
        match self {
            Self::PragmaStart => "#pragma".to_string(),
            Self::PragmaEnd => "<end of pragma>".to_string(),
            Self::Keyword(keyword) => keyword.as_str().to_string(),
            Self::Identifier(name) => name.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::StringLiteral(text) => format!("\"{}\"", text),
            Self::CharLiteral(text) => format!("'{}'", text),
            Self::Comment(text) => text.clone(),
            Self::Eof => "<EOF>".to_string(),
            other => other.punctuation_str().unwrap_or_default().to_string(),
        }
    }

    fn punctuation_str(&self) -> Option<&'static str> {
        let text = match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::ColonColon => "::",
            Self::Semicolon => ";",
            Self::Question => "?",
            Self::Dot => ".",
            Self::Arrow => "->",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Amp => "&",
            Self::AmpAmp => "&&",
            Self::Pipe => "|",
            Self::PipePipe => "||",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Bang => "!",
            Self::Assign => "=",
            Self::EqualEqual => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            Self::Space => " ",
            Self::Tab => "\t",
            Self::Newline => "\n",
            _ => return None,
        };
        Some(text)
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::PragmaStart | Self::PragmaEnd => TokenClass::Annotation,
            Self::Keyword(_) => TokenClass::Keyword,
            Self::Identifier(_) => TokenClass::Identifier,
            Self::Integer(_) | Self::Float(_) | Self::StringLiteral(_) | Self::CharLiteral(_) => {
                TokenClass::Literal
            }
            Self::LeftParen
            | Self::RightParen
            | Self::LeftBracket
            | Self::RightBracket
            | Self::LeftBrace
            | Self::RightBrace
            | Self::Comma
            | Self::Colon
            | Self::ColonColon
            | Self::Semicolon
            | Self::Question
            | Self::Dot
            | Self::Arrow => TokenClass::Punctuation,
            Self::Space | Self::Tab | Self::Newline => TokenClass::Whitespace,
            Self::Comment(_) | Self::Eof => TokenClass::Special,
            _ => TokenClass::Operator,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_source_string())
    }
}

/// Classify a word as keyword or identifier
pub fn classify_word(word: &str) -> Token {
    match Keyword::from_str(word) {
        Some(keyword) => Token::Keyword(keyword),
        None => Token::Identifier(word.to_string()),
    }
}

/// Map an operator or punctuation symbol to its token
pub fn classify_symbol(symbol: &str) -> Option<Token> {
    let token = match symbol {
        "(" => Token::LeftParen,
        ")" => Token::RightParen,
        "[" => Token::LeftBracket,
        "]" => Token::RightBracket,
        "{" => Token::LeftBrace,
        "}" => Token::RightBrace,
        "," => Token::Comma,
        ":" => Token::Colon,
        "::" => Token::ColonColon,
        ";" => Token::Semicolon,
        "?" => Token::Question,
        "." => Token::Dot,
        "->" => Token::Arrow,
        "+" => Token::Plus,
        "-" => Token::Minus,
        "*" => Token::Star,
        "/" => Token::Slash,
        "%" => Token::Percent,
        "&" => Token::Amp,
        "&&" => Token::AmpAmp,
        "|" => Token::Pipe,
        "||" => Token::PipePipe,
        "^" => Token::Caret,
        "~" => Token::Tilde,
        "!" => Token::Bang,
        "=" => Token::Assign,
        "==" => Token::EqualEqual,
        "!=" => Token::NotEqual,
        "<" => Token::Less,
        ">" => Token::Greater,
        "<=" => Token::LessEqual,
        ">=" => Token::GreaterEqual,
        "<<" => Token::ShiftLeft,
        ">>" => Token::ShiftRight,
        "++" => Token::PlusPlus,
        "--" => Token::MinusMinus,
        _ => return None,
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelling_covers_keywords_and_identifiers() {
        assert_eq!(classify_word("for").spelling(), Some("for"));
        assert_eq!(classify_word("parallel").spelling(), Some("parallel"));
        assert!(classify_word("if").is_word("if"));
        assert_eq!(Token::Comma.spelling(), None);
    }

    #[test]
    fn test_symbol_classification() {
        assert_eq!(classify_symbol("&&"), Some(Token::AmpAmp));
        assert_eq!(classify_symbol("::"), Some(Token::ColonColon));
        assert_eq!(classify_symbol("@"), None);
        assert_eq!(Token::PipePipe.as_source_string(), "||");
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(Token::PragmaEnd.token_class(), TokenClass::Annotation);
        assert_eq!(Token::Caret.token_class(), TokenClass::Operator);
        assert_eq!(Token::Colon.token_class(), TokenClass::Punctuation);
        assert_eq!(Token::Integer(4).token_class(), TokenClass::Literal);
        assert!(Token::Eof.is_run_boundary());
        assert!(!Token::Comment("// x".into()).is_significant());
    }

    #[test]
    fn test_delimiter_pairs() {
        assert_eq!(
            Token::LeftParen.closing_delimiter(),
            Some(Token::RightParen)
        );
        assert_eq!(Token::Comma.closing_delimiter(), None);
    }
}
