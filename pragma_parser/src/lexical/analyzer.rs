//! Core lexical analyzer
//!
//! Tokenizes C-family source with the pragma annotations the directive parser
//! needs: a `#pragma <namespace>` line becomes `PragmaStart`, its words and
//! punctuation, and a `PragmaEnd` at the end of the logical line. Other
//! preprocessor lines are kept whole as comments so host code never sees a
//! stray `#`.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{classify_symbol, classify_word, SpannedToken, Token, TokenStream};
use crate::utils::{Position, SourceMap, Span, Spanned};
use crate::{log_debug, log_error, log_success};

/// Lexical analysis errors with compile-time limits
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character: '{character}' at line {line}, column {column}")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Unterminated literal starting at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("Unterminated block comment starting at line {line}, column {column}")]
    UnterminatedComment { line: u32, column: u32 },

    #[error("Line continuation at end of input on line {line}")]
    UnterminatedContinuation { line: u32 },

    #[error("Invalid number format: '{text}'")]
    InvalidNumber { text: String },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    #[error("Comment too long: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::UnterminatedContinuation { .. } => {
                codes::lexical::UNTERMINATED_CONTINUATION
            }
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Tokenization counters for one source
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub pragma_runs: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub comment_count: usize,
    pub preprocessor_lines: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;

        match token {
            Token::PragmaStart => self.pragma_runs += 1,
            Token::Keyword(_) => self.keyword_tokens += 1,
            Token::Identifier(_) => self.identifier_tokens += 1,
            Token::Comment(text) => {
                self.comment_count += 1;
                self.max_comment_length = self.max_comment_length.max(text.len());
            }
            Token::StringLiteral(text) | Token::CharLiteral(text) => {
                self.literal_tokens += 1;
                self.max_string_length = self.max_string_length.max(text.len());
            }
            Token::Integer(_) | Token::Float(_) => self.literal_tokens += 1,
            _ => {}
        }
    }
}

/// Character cursor tracking byte offset and line/column
struct Cursor<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.pos.offset..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos.offset >= self.source.len()
    }

    fn slice_from(&self, start: Position) -> &'a str {
        self.source
            .get(start.offset..self.pos.offset)
            .unwrap_or_default()
    }

    /// Length of a line continuation (`\` + newline) at the cursor, if any
    fn continuation_len(&self) -> Option<usize> {
        if self.peek() != Some('\\') {
            return None;
        }
        match (self.peek_nth(1), self.peek_nth(2)) {
            (Some('\n'), _) => Some(2),
            (Some('\r'), Some('\n')) => Some(3),
            _ => None,
        }
    }

    fn skip_continuation(&mut self) -> bool {
        match self.continuation_len() {
            Some(len) => {
                for _ in 0..len {
                    self.bump();
                }
                true
            }
            None => false,
        }
    }
}

/// Core lexical analyzer with global logging integration and compile-time limits
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }

    /// Tokenize a whole source. The stream always ends with `Eof`, and every
    /// `PragmaStart` is matched by a `PragmaEnd`.
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis",
            "byte_count" => source.len(),
            "namespace" => self.preferences.pragma_namespace.as_str(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let mut tokens: Vec<SpannedToken> = Vec::new();
        let mut cursor = Cursor::new(source);
        let mut at_line_start = true;
        let mut in_pragma = false;

        while !cursor.is_at_end() {
            if tokens.len() >= MAX_TOKEN_COUNT {
                return Err(self.fail(
                    LexerError::TooManyTokens {
                        count: tokens.len(),
                    },
                    cursor.pos,
                ));
            }

            let start = cursor.pos;

            if cursor.continuation_len().is_some() {
                cursor.skip_continuation();
                if cursor.is_at_end() {
                    return Err(self.fail(
                        LexerError::UnterminatedContinuation { line: start.line },
                        start,
                    ));
                }
                continue;
            }
            if cursor.peek() == Some('\\') && cursor.peek_nth(1).is_none() {
                return Err(self.fail(
                    LexerError::UnterminatedContinuation { line: start.line },
                    start,
                ));
            }

            let Some(ch) = cursor.peek() else {
                break;
            };

            let token = match ch {
                '\n' | '\r' => {
                    cursor.bump();
                    if ch == '\r' {
                        cursor.eat('\n');
                    }
                    at_line_start = true;
                    if in_pragma {
                        in_pragma = false;
                        Token::PragmaEnd
                    } else {
                        Token::Newline
                    }
                }
                ' ' => {
                    cursor.bump();
                    Token::Space
                }
                '\t' | '\x0b' | '\x0c' => {
                    cursor.bump();
                    Token::Tab
                }
                '#' if at_line_start && !in_pragma => {
                    match self.lex_preprocessor_line(&mut cursor) {
                        Ok(Token::PragmaStart) => {
                            in_pragma = true;
                            at_line_start = false;
                            Token::PragmaStart
                        }
                        Ok(token) => {
                            self.metrics.preprocessor_lines += 1;
                            token
                        }
                        Err(error) => return Err(self.fail(error, start)),
                    }
                }
                '/' if cursor.peek_nth(1) == Some('/') => {
                    match self.lex_line_comment(&mut cursor) {
                        Ok(token) => token,
                        Err(error) => return Err(self.fail(error, start)),
                    }
                }
                '/' if cursor.peek_nth(1) == Some('*') => {
                    match self.lex_block_comment(&mut cursor) {
                        Ok(token) => token,
                        Err(error) => return Err(self.fail(error, start)),
                    }
                }
                '"' | '\'' => match self.lex_quoted(&mut cursor, ch) {
                    Ok(token) => {
                        at_line_start = false;
                        token
                    }
                    Err(error) => return Err(self.fail(error, start)),
                },
                c if c.is_ascii_digit()
                    || (c == '.' && cursor.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    match self.lex_number(&mut cursor) {
                        Ok(token) => {
                            at_line_start = false;
                            token
                        }
                        Err(error) => return Err(self.fail(error, start)),
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    match self.lex_word(&mut cursor) {
                        Ok(token) => {
                            at_line_start = false;
                            token
                        }
                        Err(error) => return Err(self.fail(error, start)),
                    }
                }
                _ => match self.lex_symbol(&mut cursor) {
                    Some(token) => {
                        at_line_start = false;
                        token
                    }
                    None => {
                        return Err(self.fail(
                            LexerError::InvalidCharacter {
                                character: ch,
                                line: start.line,
                                column: start.column,
                            },
                            start,
                        ))
                    }
                },
            };

            self.push(&mut tokens, token, Span::new(start, cursor.pos));
        }

        if in_pragma {
            self.push(&mut tokens, Token::PragmaEnd, Span::empty_at(cursor.pos));
        }
        self.push(&mut tokens, Token::Eof, Span::empty_at(cursor.pos));

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed successfully",
            "token_count" => tokens.len(),
            "pragma_runs" => self.metrics.pragma_runs,
            "identifiers" => self.metrics.identifier_tokens,
            "comments" => self.metrics.comment_count,
            "preprocessor_lines" => self.metrics.preprocessor_lines
        );

        Ok(TokenStream::with_source_map(
            tokens,
            SourceMap::new(source.to_string()),
        ))
    }

    // ========================================================================
    // Private scanning methods
    // ========================================================================

    fn push(&mut self, tokens: &mut Vec<SpannedToken>, token: Token, span: Span) {
        self.metrics.record_token(&token);
        tokens.push(Spanned::new(token, span));
    }

    fn fail(&self, error: LexerError, at: Position) -> LexerError {
        let message = if self.preferences.include_position_in_errors {
            format!(
                "Lexical analysis failed at line {}, column {}: {}",
                at.line, at.column, error
            )
        } else {
            format!("Lexical analysis failed: {}", error)
        };
        log_error!(error.error_code(), &message,
            span = Span::empty_at(at),
            "line" => at.line,
            "column" => at.column,
            "tokens_processed" => self.metrics.total_tokens
        );
        error
    }

    fn skip_horizontal_space(cursor: &mut Cursor<'_>) {
        loop {
            match cursor.peek() {
                Some(' ' | '\t') => {
                    cursor.bump();
                }
                Some('\\') if cursor.skip_continuation() => {}
                _ => break,
            }
        }
    }

    fn scan_ident(cursor: &mut Cursor<'_>) -> String {
        let mut word = String::new();
        while let Some(ch) = cursor.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                cursor.bump();
            } else {
                break;
            }
        }
        word
    }

    /// `#` at the start of a line: a pragma run opener, or a whole
    /// preprocessor line returned as a comment
    fn lex_preprocessor_line(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let line_start = cursor.pos;
        cursor.bump();
        Self::skip_horizontal_space(cursor);

        let directive = Self::scan_ident(cursor);
        if directive == "pragma" {
            let before_namespace = cursor.pos;
            Self::skip_horizontal_space(cursor);
            let namespace = Self::scan_ident(cursor);
            if namespace == self.preferences.pragma_namespace {
                return Ok(Token::PragmaStart);
            }
            if namespace.is_empty() {
                cursor.pos = before_namespace;
            }
        }

        // Rest of the logical line, continuations included
        while let Some(ch) = cursor.peek() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            if cursor.skip_continuation() {
                continue;
            }
            cursor.bump();
        }

        let text = cursor.slice_from(line_start).to_string();
        if text.len() > MAX_COMMENT_LENGTH {
            return Err(LexerError::CommentTooLong { length: text.len() });
        }
        Ok(Token::Comment(text))
    }

    fn lex_line_comment(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        while let Some(ch) = cursor.peek() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            cursor.bump();
        }
        let text = cursor.slice_from(start).to_string();
        if text.len() > MAX_COMMENT_LENGTH {
            return Err(LexerError::CommentTooLong { length: text.len() });
        }
        Ok(Token::Comment(text))
    }

    fn lex_block_comment(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        cursor.bump();
        cursor.bump();
        loop {
            match cursor.bump() {
                Some('*') if cursor.peek() == Some('/') => {
                    cursor.bump();
                    break;
                }
                Some(_) => {
                    if cursor.pos.offset - start.offset > MAX_COMMENT_LENGTH {
                        return Err(LexerError::CommentTooLong {
                            length: cursor.pos.offset - start.offset,
                        });
                    }
                }
                None => {
                    return Err(LexerError::UnterminatedComment {
                        line: start.line,
                        column: start.column,
                    })
                }
            }
        }
        Ok(Token::Comment(cursor.slice_from(start).to_string()))
    }

    /// String or character literal; the content keeps escapes as written
    fn lex_quoted(&mut self, cursor: &mut Cursor<'_>, quote: char) -> Result<Token, LexerError> {
        let start = cursor.pos;
        cursor.bump();
        let mut content = String::new();
        loop {
            match cursor.peek() {
                Some(ch) if ch == quote => {
                    cursor.bump();
                    break;
                }
                Some('\\') => {
                    if cursor.skip_continuation() {
                        continue;
                    }
                    cursor.bump();
                    content.push('\\');
                    if let Some(escaped) = cursor.bump() {
                        content.push(escaped);
                    }
                }
                Some('\n') | Some('\r') | None => {
                    return Err(LexerError::UnterminatedString {
                        line: start.line,
                        column: start.column,
                    })
                }
                Some(ch) => {
                    cursor.bump();
                    content.push(ch);
                }
            }
            if content.len() > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge {
                    size: content.len(),
                });
            }
        }

        Ok(if quote == '"' {
            Token::StringLiteral(content)
        } else {
            Token::CharLiteral(content)
        })
    }

    fn lex_number(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.pos;
        let mut is_float = false;

        let is_hex = cursor.peek() == Some('0') && matches!(cursor.peek_nth(1), Some('x' | 'X'));
        if is_hex {
            cursor.bump();
            cursor.bump();
            while cursor.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                cursor.bump();
            }
        } else {
            while let Some(ch) = cursor.peek() {
                match ch {
                    '0'..='9' => {}
                    '.' => is_float = true,
                    'e' | 'E' => {
                        is_float = true;
                        cursor.bump();
                        if matches!(cursor.peek(), Some('+' | '-')) {
                            cursor.bump();
                        }
                        continue;
                    }
                    _ => break,
                }
                cursor.bump();
            }
        }

        let digits_end = cursor.pos;
        while cursor
            .peek()
            .is_some_and(|c| matches!(c, 'u' | 'U' | 'l' | 'L' | 'f' | 'F'))
        {
            cursor.bump();
        }
        if cursor
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            Self::scan_ident(cursor);
            return Err(LexerError::InvalidNumber {
                text: cursor.slice_from(start).to_string(),
            });
        }

        let text = cursor.source.get(start.offset..digits_end.offset).unwrap_or_default();
        let invalid = || LexerError::InvalidNumber {
            text: cursor.slice_from(start).to_string(),
        };

        if is_float {
            text.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else if is_hex {
            i64::from_str_radix(&text[2..], 16)
                .map(Token::Integer)
                .map_err(|_| invalid())
        } else if text.len() > 1 && text.starts_with('0') {
            i64::from_str_radix(&text[1..], 8)
                .map(Token::Integer)
                .map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(Token::Integer).map_err(|_| invalid())
        }
    }

    fn lex_word(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let word = Self::scan_ident(cursor);
        if word.len() > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong { length: word.len() });
        }
        Ok(classify_word(&word))
    }

    /// Longest-match punctuation and operators
    fn lex_symbol(&mut self, cursor: &mut Cursor<'_>) -> Option<Token> {
        let first = cursor.peek()?;
        if let Some(second) = cursor.peek_nth(1) {
            let pair: String = [first, second].iter().collect();
            if let Some(token) = classify_symbol(&pair) {
                cursor.bump();
                cursor.bump();
                return Some(token);
            }
        }
        let token = classify_symbol(first.encode_utf8(&mut [0; 4]))?;
        cursor.bump();
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn significant(source: &str) -> Vec<Token> {
        let stream = LexicalAnalyzer::new().tokenize(source).unwrap();
        stream.iter_significant().map(|t| t.value.clone()).collect()
    }

    fn omp_preferences() -> LexicalPreferences {
        LexicalPreferences {
            pragma_namespace: "omp".to_string(),
            include_position_in_errors: true,
        }
    }

    #[test]
    fn test_pragma_run_is_bracketed() {
        let tokens = LexicalAnalyzer::with_preferences(omp_preferences())
            .tokenize("#pragma omp parallel for num_threads(4)\nx = 1;\n")
            .unwrap();
        let values: Vec<Token> = tokens.iter_significant().map(|t| t.value.clone()).collect();

        assert_eq!(values[0], Token::PragmaStart);
        assert!(values[1].is_word("parallel"));
        assert!(values[2].is_word("for"));
        assert!(values[3].is_word("num_threads"));
        assert_eq!(values[4], Token::LeftParen);
        assert_eq!(values[5], Token::Integer(4));
        assert_eq!(values[6], Token::RightParen);
        assert_eq!(values[7], Token::PragmaEnd);
        assert!(values[8].is_word("x"));
        assert_eq!(values.last(), Some(&Token::Eof));
    }

    #[test]
    fn test_continuation_extends_pragma() {
        let mut analyzer = LexicalAnalyzer::with_preferences(omp_preferences());
        let stream = analyzer
            .tokenize("#pragma omp parallel \\\n  private(a)\nint b;")
            .unwrap();
        let values: Vec<Token> = stream.iter_significant().map(|t| t.value.clone()).collect();

        let end = values.iter().position(|t| *t == Token::PragmaEnd).unwrap();
        assert!(values[..end].iter().any(|t| t.is_word("private")));
        assert!(values[end + 1].is_word("int"));
    }

    #[test]
    fn test_pragma_at_end_of_input_is_closed() {
        let values = significant("  #  pragma   omp barrier");
        assert_eq!(
            &values[values.len() - 2..],
            &[Token::PragmaEnd, Token::Eof]
        );
    }

    #[test]
    fn test_other_preprocessor_lines_are_comments() {
        let mut analyzer = LexicalAnalyzer::with_preferences(omp_preferences());
        let stream = analyzer
            .tokenize("#include <stdio.h>\n#pragma once\n#define N \\\n 10\nint x;")
            .unwrap();
        let comments: Vec<&Token> = stream
            .all_tokens()
            .iter()
            .map(|t| &t.value)
            .filter(|t| matches!(t, Token::Comment(_)))
            .collect();

        assert_eq!(comments.len(), 3);
        assert_eq!(analyzer.metrics().preprocessor_lines, 3);
        assert_eq!(analyzer.metrics().pragma_runs, 0);
        assert!(!stream.iter_significant().any(|t| t.value == Token::PragmaStart));
    }

    #[test]
    fn test_namespace_preference() {
        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences {
            pragma_namespace: "acc".to_string(),
            include_position_in_errors: false,
        });
        let stream = analyzer.tokenize("#pragma acc parallel\n#pragma omp parallel\n").unwrap();
        assert_eq!(analyzer.metrics().pragma_runs, 1);
        assert_eq!(
            stream
                .iter_significant()
                .filter(|t| t.value == Token::PragmaEnd)
                .count(),
            1
        );
    }

    #[test]
    fn test_hash_inside_pragma_line_is_not_a_new_run() {
        let values = significant("#pragma omp critical (lock)\n");
        assert_eq!(
            values.iter().filter(|t| **t == Token::PragmaStart).count(),
            1
        );
        assert!(values.contains(&Token::Identifier("lock".to_string())));
    }

    #[test]
    fn test_operators_use_longest_match() {
        let values = significant("a::b && c || d -> e");
        assert_eq!(values[1], Token::ColonColon);
        assert_eq!(values[3], Token::AmpAmp);
        assert_eq!(values[5], Token::PipePipe);
        assert_eq!(values[7], Token::Arrow);
    }

    #[test]
    fn test_numbers() {
        let values = significant("42 0x1F 010 1.5e3 7u .25");
        assert_eq!(values[0], Token::Integer(42));
        assert_eq!(values[1], Token::Integer(31));
        assert_eq!(values[2], Token::Integer(8));
        assert_eq!(values[3], Token::Float(1500.0));
        assert_eq!(values[4], Token::Integer(7));
        assert_eq!(values[5], Token::Float(0.25));
    }

    #[test]
    fn test_literals_and_comments() {
        let stream = LexicalAnalyzer::new()
            .tokenize("s = \"a\\\"b\"; c = 'x'; /* block */ // line")
            .unwrap();
        let all: Vec<&Token> = stream.all_tokens().iter().map(|t| &t.value).collect();
        assert!(all.contains(&&Token::StringLiteral("a\\\"b".to_string())));
        assert!(all.contains(&&Token::CharLiteral("x".to_string())));
        assert!(all.contains(&&Token::Comment("/* block */".to_string())));
        assert!(all.contains(&&Token::Comment("// line".to_string())));
    }

    #[test]
    fn test_errors() {
        let mut analyzer = LexicalAnalyzer::new();
        assert_matches!(
            analyzer.tokenize("int x = @;"),
            Err(LexerError::InvalidCharacter { character: '@', line: 1, column: 9 })
        );
        assert_matches!(
            analyzer.tokenize("\"open"),
            Err(LexerError::UnterminatedString { .. })
        );
        assert_matches!(
            analyzer.tokenize("/* never closed"),
            Err(LexerError::UnterminatedComment { .. })
        );
        assert_matches!(analyzer.tokenize("12abc"), Err(LexerError::InvalidNumber { .. }));
        assert_matches!(
            analyzer.tokenize("#pragma omp parallel \\"),
            Err(LexerError::UnterminatedContinuation { line: 1 })
        );
        assert_eq!(
            LexerError::UnterminatedComment { line: 1, column: 1 }.error_code(),
            codes::lexical::UNTERMINATED_COMMENT
        );
    }

    #[test]
    fn test_spans_point_into_source() {
        let source = "x;\n#pragma omp flush (a)\n";
        let stream = LexicalAnalyzer::new().tokenize(source).unwrap();
        let flush = stream
            .iter_significant()
            .find(|t| t.value.is_word("flush"))
            .unwrap();
        assert_eq!(flush.span.start().line, 2);
        assert_eq!(flush.span.slice(source), "flush");
    }
}
