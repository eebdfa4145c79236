//! Pragma parser state and cursor helpers
//!
//! [`PragmaParser`] owns the token cursor and the collaborators. The grammar
//! itself lives in `directive.rs`, `clauses.rs` and `var_list.rs` as further
//! `impl PragmaParser` blocks; this file holds the plumbing they share:
//! diagnostics reporting, context tracking, bounded lookahead and balanced
//! recovery that never reads past the end of a pragma run.

use crate::config::compile_time::syntax::*;
use crate::config::runtime::ParserPreferences;
use crate::grammar::ast::Directive;
use crate::logging::codes;
use crate::syntax::actions::{
    DefaultActions, DiagnosticsSink, ExpressionParser, MemoryDiagnostics, SemanticActions,
    StatementParser, TokenExpressionParser, TokenStatementParser,
};
use crate::syntax::error::{ContextualSyntaxError, ErrorContext, SyntaxError};
use crate::tokens::{Token, TokenStream};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success, log_warning};
use std::collections::VecDeque;
use std::sync::Arc;

pub struct PragmaParser {
    pub(crate) tokens: TokenStream,
    pub(crate) expressions: Box<dyn ExpressionParser>,
    pub(crate) statements: Box<dyn StatementParser>,
    pub(crate) actions: Box<dyn SemanticActions>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    pub(crate) preferences: ParserPreferences,
    context_stack: Vec<String>,
    error_history: VecDeque<SyntaxError>,
    diagnostics_reported: usize,
    directives_parsed: usize,
}

impl PragmaParser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_preferences(tokens, ParserPreferences::default())
    }

    pub fn with_preferences(tokens: TokenStream, preferences: ParserPreferences) -> Self {
        log_debug!("Creating pragma parser", "tokens" => tokens.len());

        Self {
            tokens,
            expressions: Box::new(TokenExpressionParser),
            statements: Box::new(TokenStatementParser::new(
                preferences.capture_statement_text,
            )),
            actions: Box::new(DefaultActions::new()),
            diagnostics: Arc::new(MemoryDiagnostics::new()),
            preferences,
            context_stack: Vec::new(),
            error_history: VecDeque::new(),
            diagnostics_reported: 0,
            directives_parsed: 0,
        }
    }

    pub fn with_expression_parser(mut self, parser: Box<dyn ExpressionParser>) -> Self {
        self.expressions = parser;
        self
    }

    pub fn with_statement_parser(mut self, parser: Box<dyn StatementParser>) -> Self {
        self.statements = parser;
        self
    }

    pub fn with_actions(mut self, actions: Box<dyn SemanticActions>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn into_tokens(self) -> TokenStream {
        self.tokens
    }

    pub fn preferences(&self) -> &ParserPreferences {
        &self.preferences
    }

    pub fn diagnostics_reported(&self) -> usize {
        self.diagnostics_reported
    }

    pub fn directives_parsed(&self) -> usize {
        self.directives_parsed
    }

    pub(crate) fn record_directive(&mut self) {
        self.directives_parsed += 1;
    }

    /// Parse every pragma run in the stream, nested ones included, in source order
    pub fn parse_all(&mut self) -> Vec<Directive> {
        let starts = self
            .tokens
            .positions_where(|token| matches!(token, Token::PragmaStart));

        log_debug!("Scanning token stream for pragma runs", "runs" => starts.len());

        let mut directives = Vec::new();
        for start in starts {
            self.tokens.seek(start);
            if let Some(directive) = self.parse_directive() {
                directives.push(directive);
            }
        }

        let end = self
            .tokens
            .positions_where(|token| matches!(token, Token::Eof))
            .first()
            .copied()
            .unwrap_or(self.tokens.len());
        self.tokens.seek(end);

        log_success!(codes::success::PRAGMA_SCAN_COMPLETE,
            "Pragma scan complete",
            "directives" => directives.len(),
            "diagnostics" => self.diagnostics_reported
        );

        directives
    }

    // === DIAGNOSTICS ===

    /// Deliver a diagnostic: log it, keep it in history, hand it to the sink
    pub fn report(&mut self, error: SyntaxError) {
        let context = self.current_context();

        if error.is_warning() {
            log_warning!(code = error.error_code(), &error.to_string(),
                span = error.span(),
                "context" => context
            );
        } else {
            log_error!(error.error_code(), &error.to_string(),
                span = error.span(),
                "context" => context
            );
        }

        self.diagnostics.emit(&error);
        self.diagnostics_reported += 1;
        self.record_error(error);
    }

    fn record_error(&mut self, error: SyntaxError) {
        if self.error_history.len() >= MAX_ERROR_HISTORY {
            self.error_history.pop_front();
        }
        self.error_history.push_back(error);
    }

    /// Most recent diagnostics, oldest first
    pub fn error_history(&self) -> Vec<&SyntaxError> {
        self.error_history.iter().collect()
    }

    pub fn create_contextual_error(&self, error: SyntaxError) -> ContextualSyntaxError {
        let position = error.span().start();
        let mut context = ErrorContext::new().with_tokens(self.surrounding_tokens());
        for entry in &self.context_stack {
            context = context.with_context(entry.clone());
        }
        if position.line > 0 {
            context = context.with_position(position.line, position.column);
        }

        ContextualSyntaxError::new(error).with_context(context)
    }

    fn surrounding_tokens(&self) -> Vec<String> {
        self.tokens
            .context_snippet(3)
            .iter()
            .map(|t| t.value.as_source_string())
            .collect()
    }

    // === CONTEXT TRACKING ===

    pub fn push_context(&mut self, context: &str) {
        if self.context_stack.len() >= MAX_CONTEXT_STACK_DEPTH {
            log_warning!("Context stack depth limit reached, dropping oldest context");
            self.context_stack.remove(0);
        }
        self.context_stack.push(context.to_string());
    }

    pub fn pop_context(&mut self) {
        self.context_stack.pop();
    }

    pub fn current_context(&self) -> String {
        self.context_stack.join(" -> ")
    }

    // === CURSOR ===

    pub(crate) fn current(&self) -> Option<&Token> {
        self.tokens.current_token()
    }

    /// Token `n` places ahead, bounded by the lookahead limit
    pub(crate) fn peek(&self, n: usize) -> Option<&Token> {
        if n > MAX_LOOKAHEAD_TOKENS {
            return None;
        }
        self.tokens.peek_token(n)
    }

    pub(crate) fn advance(&mut self) {
        self.tokens.advance();
    }

    pub(crate) fn check(&self, expected: &Token) -> bool {
        self.tokens.check_token(expected)
    }

    pub(crate) fn location(&self) -> Span {
        self.tokens.location()
    }

    /// End of the pragma run (or of input)
    pub(crate) fn at_terminator(&self) -> bool {
        self.current().map(Token::is_run_boundary).unwrap_or(true)
    }

    /// Text of the current token for diagnostics
    pub(crate) fn found(&self) -> String {
        self.current()
            .map(Token::as_source_string)
            .unwrap_or_else(|| "<EOF>".to_string())
    }

    /// Current identifier, consumed
    pub(crate) fn take_identifier(&mut self) -> Option<(String, Span)> {
        let name = self.current()?.as_identifier()?.to_string();
        let span = self.location();
        self.advance();
        Some((name, span))
    }

    /// Consume `expected` or report it missing; nothing is consumed on failure
    pub(crate) fn expect(&mut self, expected: Token, context: &str) -> Option<Span> {
        if self.check(&expected) {
            let span = self.location();
            self.advance();
            return Some(span);
        }
        let error = SyntaxError::expected_token(
            &expected.as_source_string(),
            context,
            &self.found(),
            self.location(),
        );
        self.report(error);
        None
    }

    /// Consume the `)` closing a clause or report it and resynchronise past it
    pub(crate) fn expect_close(&mut self, context: &str) -> bool {
        if self.expect(Token::RightParen, context).is_some() {
            return true;
        }
        self.skip_past_close();
        false
    }

    // === RECOVERY ===

    /// Skip balanced tokens until `stop` matches at nesting depth zero.
    /// The stopping token is not consumed and the run terminator is never
    /// crossed. Returns true when a stop token was reached.
    pub(crate) fn skip_until<F>(&mut self, stop: F) -> bool
    where
        F: Fn(&Token) -> bool,
    {
        let mut depth = 0usize;
        let mut scanned = 0usize;

        while let Some(token) = self.current() {
            if token.is_run_boundary() {
                return false;
            }
            if depth == 0 && stop(token) {
                return true;
            }
            let (opens, closes) = (token.is_open_delimiter(), token.is_close_delimiter());
            if scanned >= MAX_RECOVERY_SCAN_TOKENS {
                log_warning!("Recovery scan limit reached", "tokens_scanned" => scanned);
                return false;
            }

            if opens {
                depth += 1;
            } else if closes {
                depth = depth.saturating_sub(1);
            }
            self.advance();
            scanned += 1;
        }
        false
    }

    /// Skip to the `)` closing the current clause and consume it
    pub(crate) fn skip_past_close(&mut self) {
        if self.skip_until(|token| matches!(token, Token::RightParen)) {
            self.advance();
        }
    }

    /// Skip to the terminator, consuming it when `consume` is set. `Eof` is
    /// never consumed.
    pub(crate) fn skip_to_terminator(&mut self, consume: bool) {
        while !self.at_terminator() {
            self.advance();
        }
        if consume && self.check(&Token::PragmaEnd) {
            self.advance();
        }
    }

    // === DIAGNOSTIC METHODS ===

    pub fn diagnostic_info(&self) -> String {
        format!(
            "Parser State:\n{}\nContext: {}\nError History: {}/{}\nDirectives: {}",
            self.tokens.diagnostic(),
            self.current_context(),
            self.error_history.len(),
            MAX_ERROR_HISTORY,
            self.directives_parsed
        )
    }

    pub fn validate_state(&self) -> Result<(), String> {
        if self.context_stack.len() > MAX_CONTEXT_STACK_DEPTH {
            return Err(format!(
                "Context stack depth {} exceeds maximum {}",
                self.context_stack.len(),
                MAX_CONTEXT_STACK_DEPTH
            ));
        }

        if self.error_history.len() > MAX_ERROR_HISTORY {
            return Err(format!(
                "Error history size {} exceeds maximum {}",
                self.error_history.len(),
                MAX_ERROR_HISTORY
            ));
        }

        if self.tokens.has_pushed_back() {
            return Err("Pushback slot still occupied between directives".to_string());
        }

        Ok(())
    }
}

pub fn create_parser(tokens: TokenStream) -> PragmaParser {
    PragmaParser::new(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ClauseKind;
    use crate::lexical::tokenize;
    use crate::utils::Span;

    fn run(text: &str) -> TokenStream {
        tokenize(&format!("#pragma omp {}\n", text)).unwrap()
    }

    #[test]
    fn test_context_management() {
        let mut parser = create_parser(run(""));
        assert_eq!(parser.current_context(), "");

        parser.push_context("parallel");
        parser.push_context("private");
        assert_eq!(parser.current_context(), "parallel -> private");

        parser.pop_context();
        assert_eq!(parser.current_context(), "parallel");
    }

    #[test]
    fn test_context_depth_limiting() {
        let mut parser = create_parser(run(""));
        for i in 0..(MAX_CONTEXT_STACK_DEPTH + 5) {
            parser.push_context(&format!("context_{}", i));
        }
        assert!(parser.context_stack.len() <= MAX_CONTEXT_STACK_DEPTH);
        assert!(parser.validate_state().is_ok());
    }

    #[test]
    fn test_error_history_limiting() {
        let sink = Arc::new(MemoryDiagnostics::new());
        let mut parser = create_parser(run("")).with_diagnostics(sink.clone());

        for _ in 0..(MAX_ERROR_HISTORY + 5) {
            parser.report(SyntaxError::EmptyVariableList {
                clause: ClauseKind::Private,
                span: Span::dummy(),
            });
        }

        assert_eq!(parser.error_history().len(), MAX_ERROR_HISTORY);
        assert_eq!(parser.diagnostics_reported(), MAX_ERROR_HISTORY + 5);
        assert_eq!(sink.len(), MAX_ERROR_HISTORY + 5);
    }

    #[test]
    fn test_lookahead_is_bounded() {
        let parser = create_parser(run("a b c"));
        assert_eq!(parser.peek(1), Some(&Token::Identifier("a".into())));
        assert_eq!(parser.peek(MAX_LOOKAHEAD_TOKENS + 1), None);
    }

    #[test]
    fn test_skip_until_is_balanced_and_stops_at_terminator() {
        let mut parser = create_parser(run("foo(a, b), c"));
        parser.advance();
        assert!(parser.skip_until(|token| matches!(token, Token::Comma)));
        assert!(parser.check(&Token::Comma));
        assert_eq!(parser.tokens.position(), 7);

        parser.advance();
        assert!(!parser.skip_until(|token| matches!(token, Token::Comma)));
        assert!(parser.check(&Token::PragmaEnd));
    }

    #[test]
    fn test_skip_to_terminator_never_consumes_eof() {
        let mut parser = create_parser(run("x y"));
        parser.skip_to_terminator(true);
        assert!(parser.check(&Token::Eof));

        parser.skip_to_terminator(true);
        assert!(parser.check(&Token::Eof));
    }

    #[test]
    fn test_expect_reports_and_keeps_position() {
        let sink = Arc::new(MemoryDiagnostics::new());
        let mut parser = create_parser(run("num_threads 4")).with_diagnostics(sink.clone());
        parser.advance();
        parser.advance();

        assert!(parser.expect(Token::LeftParen, "after 'num_threads'").is_none());
        assert_eq!(parser.current(), Some(&Token::Integer(4)));
        assert!(sink.has_code(codes::clause::EXPECTED_TOKEN));
    }

    #[test]
    fn test_contextual_error_includes_stack() {
        let mut parser = create_parser(run("parallel private()"));
        parser.push_context("parallel");
        let error = SyntaxError::EmptyVariableList {
            clause: ClauseKind::Private,
            span: parser.location(),
        };
        let formatted = parser.create_contextual_error(error).format_full_error();
        assert!(formatted.contains("Context: parallel"));
        assert!(formatted.contains("Near:"));
        assert!(formatted.contains("Help:"));
    }

    #[test]
    fn test_diagnostic_info() {
        let parser = create_parser(run(""));
        let info = parser.diagnostic_info();
        assert!(info.contains("Parser State:"));
        assert!(info.contains("Error History:"));
        assert!(info.contains("Directives: 0"));
    }
}
