//! Token cursor over a lexed source
//!
//! Whitespace and comments are kept for span accuracy but skipped during
//! navigation. The cursor also owns a single pushback slot: a token pushed
//! back becomes the current token until it is consumed again.

use crate::{
    tokens::token::*,
    utils::{Position, SourceMap, Span, Spanned},
};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens (including whitespace and comments) with original spans
    all_tokens: Vec<SpannedToken>,
    /// Indices into all_tokens for significant tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
    /// One-token pushback slot, read before `position`
    pushed_back: Option<SpannedToken>,
    /// Span of the most recently consumed token
    previous_span: Option<Span>,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, spanned)| spanned.value.is_significant())
            .map(|(index, _)| index)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
            pushed_back: None,
            previous_span: None,
            source_map: None,
        }
    }

    /// Create stream with source map for enhanced error reporting
    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    // === CORE NAVIGATION ===

    pub fn current(&self) -> Option<&SpannedToken> {
        self.peek_ahead(0)
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|spanned| spanned.span)
    }

    /// Peek at the next significant token without advancing
    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    /// Peek ahead by n significant tokens; 0 is the current token
    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        let index = match (&self.pushed_back, n) {
            (Some(pushed), 0) => return Some(pushed),
            (Some(_), n) => self.position + n - 1,
            (None, n) => self.position + n,
        };

        self.significant_indices
            .get(index)
            .and_then(|&original_index| self.all_tokens.get(original_index))
    }

    /// Token value n positions ahead
    pub fn peek_token(&self, n: usize) -> Option<&Token> {
        self.peek_ahead(n).map(|spanned| &spanned.value)
    }

    /// Consume the current token and return the new current token
    pub fn advance(&mut self) -> Option<&SpannedToken> {
        if let Some(pushed) = self.pushed_back.take() {
            self.previous_span = Some(pushed.span);
        } else if self.position < self.significant_indices.len() {
            self.previous_span = self.current_span();
            self.position += 1;
        }
        self.current()
    }

    /// Make `token` the current token; the slot holds one token at a time
    pub fn push_back(&mut self, token: SpannedToken) -> Result<(), TokenStreamError> {
        if let Some(occupied) = &self.pushed_back {
            return Err(TokenStreamError::PushbackOccupied {
                held: occupied.value.as_source_string(),
                span: occupied.span,
            });
        }
        self.pushed_back = Some(token);
        Ok(())
    }

    /// Reposition the cursor at a significant-token index, dropping any pushback
    pub fn seek(&mut self, position: usize) {
        self.pushed_back = None;
        self.position = position.min(self.significant_indices.len());
        self.previous_span = None;
    }

    /// Significant-token indices of every token matching `predicate`
    pub fn positions_where<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(&Token) -> bool,
    {
        self.iter_significant()
            .enumerate()
            .filter(|(_, spanned)| predicate(&spanned.value))
            .map(|(position, _)| position)
            .collect()
    }

    pub fn has_pushed_back(&self) -> bool {
        self.pushed_back.is_some()
    }

    pub fn is_at_end(&self) -> bool {
        self.pushed_back.is_none() && self.position >= self.significant_indices.len()
    }

    /// Number of significant tokens
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    // === SPANS ===

    /// Span of the most recently consumed token
    pub fn previous_span(&self) -> Option<Span> {
        self.previous_span
    }

    /// Span from `start` through the most recently consumed token
    pub fn span_since(&self, start: Span) -> Span {
        match self.previous_span {
            Some(previous) if previous.end.offset >= start.start.offset => start.merge(previous),
            _ => start,
        }
    }

    /// Best-effort location for diagnostics at the current position
    pub fn location(&self) -> Span {
        self.current_span()
            .or(self.previous_span)
            .unwrap_or_else(Span::dummy)
    }

    pub fn source_text(&self, span: &Span) -> Option<&str> {
        self.source_map.as_ref().map(|sm| sm.span_text(span))
    }

    // === PARSER INTEGRATION ===

    /// Check the current token's kind, ignoring any payload
    pub fn check_token(&self, expected: &Token) -> bool {
        self.current_token()
            .map(|token| std::mem::discriminant(token) == std::mem::discriminant(expected))
            .unwrap_or(false)
    }

    /// Check the current token for a word with exactly this spelling
    pub fn check_word(&self, word: &str) -> bool {
        self.current_token()
            .map(|token| token.is_word(word))
            .unwrap_or(false)
    }

    /// Consume the current token if it matches predicate
    pub fn consume_if<F>(&mut self, predicate: F) -> Option<SpannedToken>
    where
        F: FnOnce(&Token) -> bool,
    {
        if let Some(token) = self.current_token() {
            if predicate(token) {
                let result = self.current().cloned();
                self.advance();
                return result;
            }
        }
        None
    }

    /// Advance if the current token has the expected kind
    pub fn advance_if_matches(&mut self, expected: &Token) -> bool {
        if self.check_token(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, TokenStreamError> {
        if let Some(current) = self.current() {
            if std::mem::discriminant(&current.value) == std::mem::discriminant(&expected) {
                let result = current.clone();
                self.advance();
                Ok(result)
            } else {
                Err(TokenStreamError::UnexpectedToken {
                    expected: expected.as_source_string(),
                    found: current.value.as_source_string(),
                    span: current.span,
                })
            }
        } else {
            Err(TokenStreamError::UnexpectedEndOfStream {
                expected: expected.as_source_string(),
            })
        }
    }

    // === DEBUGGING AND DIAGNOSTICS ===

    /// Index of the current significant token; a pushed-back token does not move it
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.significant_indices.len().saturating_sub(self.position)
            + usize::from(self.pushed_back.is_some())
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &SpannedToken> {
        self.significant_indices
            .iter()
            .filter_map(|&i| self.all_tokens.get(i))
    }

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn diagnostic(&self) -> String {
        let current_info = if let Some(current) = self.current() {
            format!("'{}' at {}", current.value.as_source_string(), current.span)
        } else {
            "<EOF>".to_string()
        };

        format!(
            "TokenStream(pos: {}/{}, current: {}{})",
            self.position,
            self.significant_indices.len(),
            current_info,
            if self.pushed_back.is_some() {
                ", pushback held"
            } else {
                ""
            }
        )
    }

    /// Significant tokens around the current position
    pub fn context_snippet(&self, radius: usize) -> Vec<&SpannedToken> {
        let start = self.position.saturating_sub(radius);
        let end = (self.position + radius + 1).min(self.significant_indices.len());

        (start..end)
            .filter_map(|pos| {
                self.significant_indices
                    .get(pos)
                    .and_then(|&idx| self.all_tokens.get(idx))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenStreamError {
    #[error("Expected '{expected}', found '{found}' at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Expected '{expected}', but reached end of input")]
    UnexpectedEndOfStream { expected: String },

    #[error("Pushback slot already holds '{held}' from {span}")]
    PushbackOccupied { held: String, span: Span },
}

/// Builds token streams with contiguous spans, mostly for tests
#[derive(Debug)]
pub struct TokenStreamBuilder {
    tokens: Vec<SpannedToken>,
    current_position: Position,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current_position: Position::start(),
        }
    }

    /// Add a token whose span covers `text`
    pub fn push_token(mut self, token: Token, text: &str) -> Self {
        let start = self.current_position;
        let end = start.advance_str(text);
        self.tokens.push(SpannedToken::new(token, Span::new(start, end)));
        self.current_position = end;
        self
    }

    /// Add a keyword or identifier followed by a space
    pub fn push_word(self, word: &str) -> Self {
        self.push_token(classify_word(word), word)
            .push_token(Token::Space, " ")
    }

    /// Add a punctuation or operator token
    pub fn push_symbol(self, symbol: &str) -> Self {
        match classify_symbol(symbol) {
            Some(token) => self.push_token(token, symbol),
            None => self,
        }
    }

    pub fn push_tokens_from_text(mut self, tokens_with_text: Vec<(Token, &str)>) -> Self {
        for (token, text) in tokens_with_text {
            self = self.push_token(token, text);
        }
        self
    }

    pub fn build(self) -> TokenStream {
        TokenStream::new(self.tokens)
    }

    pub fn build_with_source(self, source: String) -> TokenStream {
        TokenStream::with_source_map(self.tokens, SourceMap::new(source))
    }
}

impl Default for TokenStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}
