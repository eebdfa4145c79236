//! Collaborators the directive parser calls out to
//!
//! - [`ExpressionParser`] parses one scalar clause argument or list item
//! - [`StatementParser`] parses the statement attached to an executable directive
//! - [`SemanticActions`] builds and accepts clauses and directives, and tracks
//!   directive scopes
//! - [`DiagnosticsSink`] receives every diagnostic the parser reports
//!
//! Token-level defaults are provided for each so the parser can run on its own.

use crate::config::compile_time::syntax::MAX_STATEMENT_NESTING_DEPTH;
use crate::grammar::ast::{
    Clause, Directive, Expr, ExprKind, QualifiedName, ReductionIdentifier, Statement,
};
use crate::grammar::{ClauseKind, DirectiveKind, Keyword};
use crate::log_warning;
use crate::logging::Code;
use crate::syntax::error::SyntaxError;
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::Span;
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Binding strength of the expression a clause asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionPrecedence {
    /// Full assignment expression (list items, chunk sizes, tails)
    Assignment,
    /// Conditional expression; a top-level `=` ends it
    Conditional,
}

pub trait ExpressionParser {
    /// Parse one expression at the cursor. Returns `None` without consuming
    /// anything when no expression starts here.
    fn parse_expression(
        &self,
        tokens: &mut TokenStream,
        precedence: ExpressionPrecedence,
    ) -> Option<Expr>;
}

/// Balanced token scanner standing in for a full expression grammar.
///
/// An expression runs until a top-level `,` `)` `]` `}` `;`, a `:` that does
/// not close a pending `?`, two adjacent operands, or the end of the pragma run.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenExpressionParser;

impl TokenExpressionParser {
    fn ends_expression(token: &Token, precedence: ExpressionPrecedence, pending: usize) -> bool {
        match token {
            Token::Comma
            | Token::RightParen
            | Token::RightBracket
            | Token::RightBrace
            | Token::Semicolon => true,
            Token::Colon => pending == 0,
            Token::Assign => precedence == ExpressionPrecedence::Conditional,
            _ => false,
        }
    }

    fn ends_operand(token: &Token) -> bool {
        token.is_identifier() || token.is_literal() || matches!(token, Token::RightBracket)
    }

    fn starts_operand(token: &Token) -> bool {
        token.is_identifier() || token.is_literal()
    }

    fn classify(collected: &[SpannedToken]) -> Option<ExprKind> {
        if let [single] = collected {
            if let Token::Integer(value) = single.value {
                return Some(ExprKind::Integer(value));
            }
        }

        let mut segments = Vec::new();
        for (index, spanned) in collected.iter().enumerate() {
            match (&spanned.value, index % 2) {
                (Token::Identifier(name), 0) => segments.push(name.clone()),
                (Token::ColonColon, 1) => {}
                _ => return None,
            }
        }
        if collected.len() % 2 == 1 {
            Some(ExprKind::Name(QualifiedName { segments }))
        } else {
            None
        }
    }
}

impl ExpressionParser for TokenExpressionParser {
    fn parse_expression(
        &self,
        tokens: &mut TokenStream,
        precedence: ExpressionPrecedence,
    ) -> Option<Expr> {
        let mut depth = 0usize;
        let mut pending_conditionals = 0usize;
        let mut collected: Vec<SpannedToken> = Vec::new();

        while let Some(spanned) = tokens.current().cloned() {
            let token = &spanned.value;
            if token.is_annotation() || matches!(token, Token::Eof) {
                break;
            }

            if depth == 0 {
                if Self::ends_expression(token, precedence, pending_conditionals) {
                    break;
                }
                if let Some(previous) = collected.last() {
                    if Self::ends_operand(&previous.value) && Self::starts_operand(token) {
                        break;
                    }
                }
                match token {
                    Token::Question => pending_conditionals += 1,
                    Token::Colon => pending_conditionals -= 1,
                    _ => {}
                }
            }

            if token.is_open_delimiter() {
                depth += 1;
            } else if token.is_close_delimiter() {
                depth -= 1;
            }

            collected.push(spanned);
            tokens.advance();
        }

        let first = collected.first()?;
        let last = collected.last()?;
        let span = first.span.merge(last.span);

        let kind = Self::classify(&collected).unwrap_or_else(|| {
            ExprKind::Compound(token_text(tokens, &collected, span))
        });

        Some(Expr::new(kind, span))
    }
}

/// Source text of a token run, or its tokens joined by spaces without a source map
fn token_text(tokens: &TokenStream, collected: &[SpannedToken], span: Span) -> String {
    match tokens.source_text(&span) {
        Some(text) => text.trim().to_string(),
        None => collected
            .iter()
            .map(|spanned| spanned.value.as_source_string())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

pub trait StatementParser {
    /// Parse the statement following a directive. Returns `None` without
    /// consuming anything when no statement starts here.
    fn parse_statement(&self, tokens: &mut TokenStream) -> Option<Statement>;
}

/// Consumes one host statement: a `{}` block, a control header with its
/// body, or anything up to a top-level `;`. Nested pragma runs are swallowed
/// as part of the statement.
#[derive(Debug, Clone, Copy)]
pub struct TokenStatementParser {
    capture_text: bool,
}

impl TokenStatementParser {
    pub fn new(capture_text: bool) -> Self {
        Self { capture_text }
    }
}

impl Default for TokenStatementParser {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StatementParser for TokenStatementParser {
    fn parse_statement(&self, tokens: &mut TokenStream) -> Option<Statement> {
        let mut scan = StatementScan {
            tokens,
            consumed: Vec::new(),
            nested_pragmas: 0,
            depth: 0,
        };
        scan.statement();

        let StatementScan {
            tokens,
            consumed,
            nested_pragmas,
            ..
        } = scan;

        let first = consumed.first()?;
        let last = consumed.last()?;
        let span = first.span.merge(last.span);
        let text = self
            .capture_text
            .then(|| token_text(tokens, &consumed, span));

        Some(Statement {
            text,
            token_count: consumed.len(),
            nested_pragmas,
            span,
        })
    }
}

struct StatementScan<'a> {
    tokens: &'a mut TokenStream,
    consumed: Vec<SpannedToken>,
    nested_pragmas: usize,
    depth: usize,
}

impl StatementScan<'_> {
    fn current(&self) -> Option<&Token> {
        self.tokens.current_token()
    }

    fn at_eof(&self) -> bool {
        matches!(self.current(), None | Some(Token::Eof))
    }

    fn check(&self, expected: &Token) -> bool {
        self.current() == Some(expected)
    }

    fn bump(&mut self) {
        if let Some(spanned) = self.tokens.current().cloned() {
            self.consumed.push(spanned);
            self.tokens.advance();
        }
    }

    /// Past the nesting limit the rest of the statement is taken flat, up to
    /// its `;`
    fn statement(&mut self) {
        if self.depth >= MAX_STATEMENT_NESTING_DEPTH {
            log_warning!("Statement nesting limit reached",
                "limit" => MAX_STATEMENT_NESTING_DEPTH
            );
            self.until_semicolon();
            return;
        }
        self.depth += 1;
        self.nested_statement();
        self.depth -= 1;
    }

    fn nested_statement(&mut self) {
        let Some(token) = self.current().cloned() else {
            return;
        };
        match token {
            Token::Eof | Token::RightBrace => {}
            Token::PragmaStart => {
                if self.pragma_run() {
                    self.statement();
                }
            }
            Token::LeftBrace => self.balanced_group(),
            Token::Keyword(Keyword::Do) => {
                self.bump();
                self.statement();
                if self.check(&Token::Keyword(Keyword::While)) {
                    self.bump();
                    if self.check(&Token::LeftParen) {
                        self.balanced_group();
                    }
                    if self.check(&Token::Semicolon) {
                        self.bump();
                    }
                }
            }
            Token::Keyword(keyword) if keyword.starts_control_header() => {
                self.bump();
                if self.check(&Token::LeftParen) {
                    self.balanced_group();
                }
                self.statement();
                if keyword == Keyword::If && self.check(&Token::Keyword(Keyword::Else)) {
                    self.bump();
                    self.statement();
                }
            }
            _ => self.until_semicolon(),
        }
    }

    /// Open delimiter through its matching close, or to end of input
    fn balanced_group(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.current().cloned() {
            if matches!(token, Token::Eof) {
                break;
            }
            if token.is_open_delimiter() {
                depth += 1;
            } else if token.is_close_delimiter() {
                depth = depth.saturating_sub(1);
            } else if matches!(token, Token::PragmaStart) {
                self.nested_pragmas += 1;
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
    }

    fn until_semicolon(&mut self) {
        while let Some(token) = self.current().cloned() {
            match token {
                Token::Eof | Token::RightBrace => break,
                Token::Semicolon => {
                    self.bump();
                    break;
                }
                Token::PragmaStart => {
                    self.pragma_run();
                }
                open if open.is_open_delimiter() => self.balanced_group(),
                _ => self.bump(),
            }
        }
    }

    /// Consume a nested run; true when its directive takes a statement
    fn pragma_run(&mut self) -> bool {
        self.nested_pragmas += 1;
        self.bump();

        let kind = self
            .current()
            .and_then(Token::spelling)
            .map(DirectiveKind::from_spelling)
            .unwrap_or(DirectiveKind::Unknown);

        while !self.at_eof() {
            let at_end = self.check(&Token::PragmaEnd);
            self.bump();
            if at_end {
                break;
            }
        }

        kind != DirectiveKind::Unknown
            && kind != DirectiveKind::Threadprivate
            && !kind.is_standalone()
    }
}

// ============================================================================
// SEMANTIC ACTIONS
// ============================================================================

/// Hooks invoked while a directive is assembled. Every method has a
/// pass-through default.
pub trait SemanticActions {
    fn start_directive_scope(&mut self, _kind: DirectiveKind, _span: Span) {}

    fn end_directive_scope(&mut self) {}

    fn start_clause(&mut self, _kind: ClauseKind) {}

    fn end_clause(&mut self, _kind: ClauseKind) {}

    /// Build a list item; `None` drops the item
    fn act_on_id_expression(&mut self, expr: Expr) -> Option<Expr> {
        Some(expr)
    }

    /// Build a reduction identifier; `None` makes it invalid
    fn act_on_reduction_id(
        &mut self,
        id: ReductionIdentifier,
        _span: Span,
    ) -> Option<ReductionIdentifier> {
        Some(id)
    }

    /// Final accept/reject of a parsed clause
    fn act_on_clause(&mut self, clause: Clause, _directive: DirectiveKind) -> Option<Clause> {
        Some(clause)
    }

    fn act_on_directive(&mut self, directive: Directive) -> Directive {
        directive
    }
}

/// Accepts everything and keeps scope bookkeeping
#[derive(Debug, Default, Clone)]
pub struct DefaultActions {
    scope_depth: usize,
    max_scope_depth: usize,
    clauses_accepted: usize,
    directives_completed: usize,
}

impl DefaultActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope_depth(&self) -> usize {
        self.scope_depth
    }

    pub fn max_scope_depth(&self) -> usize {
        self.max_scope_depth
    }

    pub fn clauses_accepted(&self) -> usize {
        self.clauses_accepted
    }

    pub fn directives_completed(&self) -> usize {
        self.directives_completed
    }
}

impl SemanticActions for DefaultActions {
    fn start_directive_scope(&mut self, _kind: DirectiveKind, _span: Span) {
        self.scope_depth += 1;
        self.max_scope_depth = self.max_scope_depth.max(self.scope_depth);
    }

    fn end_directive_scope(&mut self) {
        self.scope_depth = self.scope_depth.saturating_sub(1);
    }

    fn act_on_clause(&mut self, clause: Clause, _directive: DirectiveKind) -> Option<Clause> {
        self.clauses_accepted += 1;
        Some(clause)
    }

    fn act_on_directive(&mut self, directive: Directive) -> Directive {
        self.directives_completed += 1;
        directive
    }
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

pub trait DiagnosticsSink: Send + Sync {
    fn emit(&self, diagnostic: &SyntaxError);
}

/// Thread-safe sink that keeps every diagnostic, for tests and reports
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    diagnostics: Mutex<Vec<SyntaxError>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SyntaxError>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn diagnostics(&self) -> Vec<SyntaxError> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn errors(&self) -> Vec<SyntaxError> {
        self.lock()
            .iter()
            .filter(|diagnostic| !diagnostic.is_warning())
            .cloned()
            .collect()
    }

    pub fn warnings(&self) -> Vec<SyntaxError> {
        self.lock()
            .iter()
            .filter(|diagnostic| diagnostic.is_warning())
            .cloned()
            .collect()
    }

    pub fn count_with_code(&self, code: Code) -> usize {
        self.lock()
            .iter()
            .filter(|diagnostic| diagnostic.error_code() == code)
            .count()
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.count_with_code(code) > 0
    }

    /// Remove and return everything collected so far
    pub fn take(&self) -> Vec<SyntaxError> {
        std::mem::take(&mut *self.lock())
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn emit(&self, diagnostic: &SyntaxError) {
        self.lock().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::logging::codes;
    use assert_matches::assert_matches;

    fn host(source: &str) -> TokenStream {
        tokenize(source).unwrap()
    }

    #[test]
    fn test_expression_kinds() {
        let parser = TokenExpressionParser;

        let mut tokens = host("4)");
        let expr = parser
            .parse_expression(&mut tokens, ExpressionPrecedence::Conditional)
            .unwrap();
        assert_eq!(expr.as_integer(), Some(4));
        assert_eq!(tokens.current_token(), Some(&Token::RightParen));

        let mut tokens = host("ns::total, b");
        let expr = parser
            .parse_expression(&mut tokens, ExpressionPrecedence::Assignment)
            .unwrap();
        assert_eq!(expr.as_name().map(|n| n.to_string()), Some("ns::total".into()));
        assert_eq!(tokens.current_token(), Some(&Token::Comma));

        let mut tokens = host("n * (m + 1))");
        let expr = parser
            .parse_expression(&mut tokens, ExpressionPrecedence::Assignment)
            .unwrap();
        assert_matches!(expr.kind, ExprKind::Compound(ref text) if text == "n * (m + 1)");
    }

    #[test]
    fn test_expression_stops_at_boundaries() {
        let parser = TokenExpressionParser;

        let mut tokens = host("a ? b : c : d");
        let expr = parser
            .parse_expression(&mut tokens, ExpressionPrecedence::Assignment)
            .unwrap();
        assert_eq!(expr.to_string(), "a ? b : c");
        assert_eq!(tokens.current_token(), Some(&Token::Colon));

        let mut tokens = host("x = 3");
        let expr = parser
            .parse_expression(&mut tokens, ExpressionPrecedence::Conditional)
            .unwrap();
        assert_eq!(expr.to_string(), "x");

        let mut tokens = host("a b");
        let expr = parser
            .parse_expression(&mut tokens, ExpressionPrecedence::Assignment)
            .unwrap();
        assert_eq!(expr.to_string(), "a");

        let mut tokens = host(")");
        assert!(parser
            .parse_expression(&mut tokens, ExpressionPrecedence::Assignment)
            .is_none());
        assert_eq!(tokens.position(), 0);
    }

    #[test]
    fn test_expression_never_crosses_terminator() {
        let mut tokens = host("#pragma omp parallel num_threads(n +\nint x;\n");
        while !tokens.check_token(&Token::Plus) {
            tokens.advance();
        }
        let expr = TokenExpressionParser
            .parse_expression(&mut tokens, ExpressionPrecedence::Conditional)
            .unwrap();
        assert_eq!(expr.to_string(), "+");
        assert_eq!(tokens.current_token(), Some(&Token::PragmaEnd));
    }

    #[test]
    fn test_statement_shapes() {
        let parser = TokenStatementParser::default();

        let mut tokens = host("{ a++; b++; } c++;");
        let statement = parser.parse_statement(&mut tokens).unwrap();
        assert_eq!(statement.text.as_deref(), Some("{ a++; b++; }"));
        assert!(tokens.check_word("c"));

        let mut tokens = host("for (i = 0; i < n; i++) sum += a[i];\nreturn sum;");
        let statement = parser.parse_statement(&mut tokens).unwrap();
        assert_eq!(
            statement.text.as_deref(),
            Some("for (i = 0; i < n; i++) sum += a[i];")
        );
        assert_eq!(tokens.current_token(), Some(&Token::Keyword(Keyword::Return)));

        let mut tokens = host("if (x) y(); else z(); w();");
        parser.parse_statement(&mut tokens).unwrap();
        assert!(tokens.check_word("w"));
    }

    #[test]
    fn test_statement_with_nested_pragmas() {
        let parser = TokenStatementParser::new(false);
        let source = "#pragma omp for\nfor (i = 0; i < n; i++) { f(i); }\nafter();";
        let mut tokens = host(source);
        let statement = parser.parse_statement(&mut tokens).unwrap();
        assert_eq!(statement.nested_pragmas, 1);
        assert_eq!(statement.text, None);
        assert!(tokens.check_word("after"));

        let mut tokens = host("#pragma omp barrier\nafter();");
        let statement = parser.parse_statement(&mut tokens).unwrap();
        assert_eq!(statement.nested_pragmas, 1);
        assert!(tokens.check_word("after"));
    }

    #[test]
    fn test_deeply_nested_headers_are_bounded() {
        let source = format!(
            "{}y();\nafter();",
            "if (x) ".repeat(MAX_STATEMENT_NESTING_DEPTH + 10)
        );
        let mut tokens = host(&source);
        let statement = TokenStatementParser::new(false)
            .parse_statement(&mut tokens)
            .unwrap();

        assert!(statement.token_count > MAX_STATEMENT_NESTING_DEPTH * 4);
        assert!(tokens.check_word("after"));
    }

    #[test]
    fn test_no_statement_before_close_brace() {
        let mut tokens = host("}");
        assert!(TokenStatementParser::default()
            .parse_statement(&mut tokens)
            .is_none());
        assert_eq!(tokens.current_token(), Some(&Token::RightBrace));
    }

    #[test]
    fn test_default_actions_bookkeeping() {
        let mut actions = DefaultActions::new();
        actions.start_directive_scope(DirectiveKind::Parallel, Span::dummy());
        actions.start_directive_scope(DirectiveKind::For, Span::dummy());
        actions.end_directive_scope();
        assert_eq!(actions.scope_depth(), 1);
        assert_eq!(actions.max_scope_depth(), 2);

        let clause = Clause::Flag {
            kind: ClauseKind::Nowait,
            span: Span::dummy(),
        };
        assert!(actions.act_on_clause(clause, DirectiveKind::For).is_some());
        assert_eq!(actions.clauses_accepted(), 1);
    }

    #[test]
    fn test_memory_diagnostics() {
        let sink = MemoryDiagnostics::new();
        sink.emit(&SyntaxError::expected_colon("map type", Span::dummy()));
        sink.emit(&SyntaxError::EmptyVariableList {
            clause: ClauseKind::Shared,
            span: Span::dummy(),
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.warnings().len(), 1);
        assert_eq!(sink.errors().len(), 1);
        assert!(sink.has_code(codes::clause::EMPTY_VARIABLE_LIST));
        assert_eq!(sink.take().len(), 2);
        assert!(sink.is_empty());
    }
}
