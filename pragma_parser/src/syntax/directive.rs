//! Directive assembly
//!
//! Entry point for one pragma run: resolves the directive keyword, runs the
//! clause loop with per-directive uniqueness tracking and requests the
//! associated statement. The cursor always finishes past the run terminator.

use crate::config::compile_time::syntax::{MAX_CLAUSES_PER_DIRECTIVE, MAX_LIST_ITEMS};
use crate::grammar::ast::{Clause, Directive, Expr, VarListClause};
use crate::grammar::{
    is_allowed_clause, resolve_directive_kind, ClauseKind, DependKind, DirectiveKind,
};
use crate::syntax::error::SyntaxError;
use crate::syntax::parser::PragmaParser;
use crate::syntax::var_list::is_list_stop;
use crate::tokens::Token;
use crate::{log_debug, log_warning};
use std::collections::HashSet;

impl PragmaParser {
    /// Parse the pragma run starting at the cursor.
    ///
    /// Returns `None` without consuming anything when the cursor is not at a
    /// run, and `None` after skipping the run when the directive keyword is
    /// not recognised.
    pub fn parse_directive(&mut self) -> Option<Directive> {
        if !self.check(&Token::PragmaStart) {
            return None;
        }
        let start = self.location();
        self.advance();

        let keyword_span = self.location();
        let kind = resolve_directive_kind(&mut self.tokens);
        if kind == DirectiveKind::Unknown {
            let error = SyntaxError::UnknownDirective {
                found: self.found(),
                span: keyword_span,
            };
            self.report(error);
            self.skip_to_terminator(true);
            return None;
        }
        self.advance();

        self.actions.start_directive_scope(kind, start);
        self.push_context(kind.as_str());

        let mut directive = Directive::new(kind, start);
        match kind {
            DirectiveKind::Threadprivate => self.parse_threadprivate_list(&mut directive),
            DirectiveKind::Cancel | DirectiveKind::CancellationPoint => {
                self.parse_cancel_region(&mut directive);
                self.parse_clause_loop(&mut directive);
            }
            DirectiveKind::Critical => {
                self.parse_critical_name(&mut directive);
                self.parse_clause_loop(&mut directive);
            }
            _ => self.parse_clause_loop(&mut directive),
        }

        self.skip_to_terminator(true);
        directive.span = self.tokens.span_since(start);

        if directive.has_associated_statement {
            match self.statements.parse_statement(&mut self.tokens) {
                Some(statement) => directive.associated_statement = Some(statement),
                None => {
                    let error = SyntaxError::expected_token(
                        "statement",
                        &format!("after '{}' directive", kind),
                        &self.found(),
                        self.location(),
                    );
                    self.report(error);
                }
            }
        }

        self.actions.end_directive_scope();
        self.pop_context();
        self.record_directive();

        if self.preferences.log_directive_summaries {
            log_debug!("Directive parsed",
                "summary" => directive.summary(),
                "line" => directive.span.start().line
            );
        }

        Some(self.actions.act_on_directive(directive))
    }

    fn parse_clause_loop(&mut self, directive: &mut Directive) {
        let kind = directive.kind;
        let mut first_seen: HashSet<ClauseKind> = HashSet::new();
        let mut clauses_read = 0usize;

        while !self.at_terminator() {
            if clauses_read >= MAX_CLAUSES_PER_DIRECTIVE {
                let error = SyntaxError::TooManyClauses {
                    directive: kind,
                    limit: MAX_CLAUSES_PER_DIRECTIVE,
                    span: self.location(),
                };
                self.report(error);
                self.skip_to_terminator(false);
                break;
            }

            let clause_span = self.location();
            let clause_kind = match self.resolve_clause_kind(kind, clauses_read == 0) {
                Ok(clause_kind) => clause_kind,
                Err(error) => {
                    self.report(error);
                    self.skip_to_terminator(false);
                    break;
                }
            };
            clauses_read += 1;

            if clause_kind == ClauseKind::Unknown {
                let error = SyntaxError::UnknownClause {
                    found: self.found(),
                    directive: kind,
                    span: clause_span,
                };
                self.report(error);
                self.skip_unknown_clause();
            } else {
                let duplicate = clause_kind.is_unique() && !first_seen.insert(clause_kind);
                let allowed = is_allowed_clause(kind, clause_kind);
                if !allowed {
                    self.report(SyntaxError::ClauseNotAllowed {
                        clause: clause_kind,
                        directive: kind,
                        span: clause_span,
                    });
                }
                if duplicate {
                    self.report(SyntaxError::DuplicateClause {
                        clause: clause_kind,
                        directive: kind,
                        span: clause_span,
                    });
                }
                let keep = allowed && !duplicate;

                self.actions.start_clause(clause_kind);
                let parsed = self.parse_clause(kind, clause_kind);
                self.actions.end_clause(clause_kind);

                if keep {
                    if let Some(clause) =
                        parsed.and_then(|clause| self.actions.act_on_clause(clause, kind))
                    {
                        if makes_standalone(kind, &clause) {
                            directive.has_associated_statement = false;
                        }
                        directive.clauses.push(clause);
                    }
                }
            }

            if self.check(&Token::Comma) {
                self.advance();
            }
        }
    }

    /// Skip an unrecognised clause: its keyword and a parenthesised argument
    /// that directly follows it. A bare `(` is skipped as an argument.
    fn skip_unknown_clause(&mut self) {
        if !self.check(&Token::LeftParen) {
            self.advance();
        }
        if self.check(&Token::LeftParen) {
            self.advance();
            self.skip_past_close();
        }
    }

    /// `threadprivate ( name [, name]* )`
    fn parse_threadprivate_list(&mut self, directive: &mut Directive) {
        let kind = ClauseKind::Threadprivate;
        let Some(open) = self.expect(Token::LeftParen, "after 'threadprivate'") else {
            self.skip_to_terminator(false);
            return;
        };

        let mut list = VarListClause::new(kind, open);
        while !self.at_terminator() && !self.check(&Token::RightParen) {
            if list.vars.len() >= MAX_LIST_ITEMS {
                log_warning!("Variable list truncated",
                    "clause" => kind.as_str(),
                    "limit" => MAX_LIST_ITEMS
                );
                self.skip_until(|token| matches!(token, Token::RightParen));
                break;
            }

            let item_span = self.location();
            match self.parse_qualified_name() {
                Some(name) => {
                    let expr = Expr::name(name, self.tokens.span_since(item_span));
                    if let Some(expr) = self.actions.act_on_id_expression(expr) {
                        list.vars.push(expr);
                    }
                }
                None => {
                    let error = SyntaxError::ExpectedIdentifier {
                        clause: kind,
                        found: self.found(),
                        span: item_span,
                    };
                    self.report(error);
                    self.skip_until(is_list_stop);
                }
            }

            if self.check(&Token::Comma) {
                self.advance();
                continue;
            }
            if self.at_terminator() || self.check(&Token::RightParen) {
                break;
            }
            let error = SyntaxError::ExpectedSeparator {
                clause: kind,
                found: self.found(),
                span: self.location(),
            };
            self.report(error);
            self.skip_until(is_list_stop);
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect_close("to close 'threadprivate'");
        list.span = self.tokens.span_since(open);

        if list.vars.is_empty() {
            self.report(SyntaxError::EmptyVariableList {
                clause: kind,
                span: list.span,
            });
        } else {
            directive.clauses.push(Clause::VarList(list));
        }

        if !self.at_terminator() {
            self.report(SyntaxError::ExtraTokens {
                directive: directive.kind,
                span: self.location(),
            });
            self.skip_to_terminator(false);
        }
    }

    /// Region keyword after `cancel` or `cancellation point`
    fn parse_cancel_region(&mut self, directive: &mut Directive) {
        let span = self.location();
        let region = resolve_directive_kind(&mut self.tokens);

        if region.is_cancellation_region() {
            directive.cancel_region = Some(region);
        } else {
            let error = SyntaxError::InvalidCancelRegion {
                found: self.found(),
                directive: directive.kind,
                span,
            };
            self.report(error);
        }

        if !self.at_terminator() {
            self.advance();
        }
    }

    /// Optional `( name )` after `critical`
    fn parse_critical_name(&mut self, directive: &mut Directive) {
        if !self.check(&Token::LeftParen) {
            return;
        }
        self.advance();

        match self.take_identifier() {
            Some((name, _)) => directive.name = Some(name),
            None => {
                let error = SyntaxError::ExpectedCriticalName {
                    found: self.found(),
                    span: self.location(),
                };
                self.report(error);
                self.skip_until(|token| matches!(token, Token::RightParen));
            }
        }
        self.expect_close("to close critical name");
    }
}

/// `ordered depend(source)` has no body
fn makes_standalone(directive: DirectiveKind, clause: &Clause) -> bool {
    directive == DirectiveKind::Ordered
        && clause
            .as_var_list()
            .map(|list| list.dependence_kind == Some(DependKind::Source))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use crate::grammar::ast::{Clause, Statement};
    use crate::grammar::{ClauseKind, DirectiveKind};
    use crate::lexical::tokenize;
    use crate::logging::codes;
    use crate::syntax::actions::{
        DefaultActions, MemoryDiagnostics, SemanticActions, StatementParser,
    };
    use crate::syntax::parser::PragmaParser;
    use crate::syntax::test_support::{parse_one, test_preferences};
    use crate::tokens::{Token, TokenStream};
    use crate::utils::Span;
    use assert_matches::assert_matches;
    use std::sync::{Arc, Mutex};

    /// Leaves the cursor where the statement would start
    struct NoConsume;

    impl StatementParser for NoConsume {
        fn parse_statement(&self, _tokens: &mut TokenStream) -> Option<Statement> {
            Some(Statement {
                text: None,
                token_count: 0,
                nested_pragmas: 0,
                span: Span::dummy(),
            })
        }
    }

    /// Parses the first run and returns the cursor position next to the
    /// position just past the first terminator
    fn cursor_after(text: &str) -> (usize, usize) {
        let tokens = tokenize(&format!("#pragma omp {}\nint after;\n", text)).unwrap();
        let end = tokens.positions_where(|token| matches!(token, Token::PragmaEnd))[0];
        let mut parser = PragmaParser::with_preferences(tokens, test_preferences())
            .with_statement_parser(Box::new(NoConsume));
        parser.parse_directive();
        (parser.tokens().position(), end + 1)
    }

    #[test]
    fn test_fold_chains_resolve_combined_kinds() {
        let cases = [
            ("parallel for", DirectiveKind::ParallelFor),
            ("parallel for simd", DirectiveKind::ParallelForSimd),
            ("parallel sections", DirectiveKind::ParallelSections),
            ("for simd", DirectiveKind::ForSimd),
            ("taskloop simd", DirectiveKind::TaskloopSimd),
            ("target data map(a)", DirectiveKind::TargetData),
            ("cancellation point for", DirectiveKind::CancellationPoint),
        ];
        for (text, expected) in cases {
            let (directive, diagnostics) = parse_one(text);
            assert_eq!(directive.map(|d| d.kind), Some(expected), "{}", text);
            assert!(diagnostics.is_empty(), "{}: {:?}", text, diagnostics.diagnostics());
        }
    }

    #[test]
    fn test_cursor_ends_past_terminator() {
        let inputs = [
            "parallel private(a) num_threads(4)",
            "parallel private(a num_threads(4",
            "for schedule(static, ) collapse(",
            "barrier nowait",
            "bogus tokens ( here",
            "threadprivate(a, b) extra",
            "critical(name",
            "cancel sideways",
            "flush(a, b",
            "target map(never, to: a)",
            "task depend(inout a",
        ];
        for text in inputs {
            let (position, expected) = cursor_after(text);
            assert_eq!(position, expected, "{}", text);
        }
    }

    #[test]
    fn test_duplicate_unique_clause_keeps_first() {
        let (directive, diagnostics) = parse_one("parallel num_threads(2) num_threads(4)");
        let directive = directive.unwrap();

        assert_eq!(diagnostics.count_with_code(codes::clause::DUPLICATE_CLAUSE), 1);
        assert_eq!(directive.clauses_of(ClauseKind::NumThreads).count(), 1);
        assert_eq!(
            directive
                .clause(ClauseKind::NumThreads)
                .and_then(Clause::single_expr)
                .and_then(|e| e.as_integer()),
            Some(2)
        );
    }

    #[test]
    fn test_repeatable_clauses_accumulate() {
        let (directive, diagnostics) = parse_one("parallel private(a) private(b), shared(c)");
        assert!(diagnostics.is_empty());
        assert_eq!(directive.unwrap().clauses_of(ClauseKind::Private).count(), 2);
    }

    #[test]
    fn test_ordered_body_rules() {
        let (directive, _) = parse_one("ordered depend(source)");
        assert!(!directive.unwrap().has_associated_statement);

        let (directive, diagnostics) = parse_one("ordered");
        let directive = directive.unwrap();
        assert!(diagnostics.is_empty());
        assert!(directive.has_associated_statement);
        assert!(directive.associated_statement.is_some());
    }

    #[test]
    fn test_unknown_directive_recovery() {
        let tokens = tokenize("#pragma omp frobnicate a(b) c\nint x;\n").unwrap();
        let end = tokens.positions_where(|token| matches!(token, Token::PragmaEnd))[0];
        let sink = Arc::new(MemoryDiagnostics::new());
        let mut parser =
            PragmaParser::with_preferences(tokens, test_preferences()).with_diagnostics(sink.clone());

        assert!(parser.parse_directive().is_none());
        assert_eq!(sink.len(), 1);
        assert!(sink.has_code(codes::directive::UNKNOWN_DIRECTIVE));
        assert_eq!(parser.tokens().position(), end + 1);
    }

    #[test]
    fn test_disallowed_clause_is_parsed_and_dropped() {
        let (directive, diagnostics) = parse_one("taskyield collapse(2)");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.has_code(codes::clause::CLAUSE_NOT_ALLOWED));
        assert!(directive.unwrap().clauses.is_empty());

        let (directive, diagnostics) = parse_one("single collapse(2) private(a) nowait");
        let directive = directive.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(directive.clauses.len(), 2);
        assert!(directive.clause(ClauseKind::Private).is_some());
        assert!(directive.clause(ClauseKind::Nowait).is_some());
    }

    #[test]
    fn test_disallowed_duplicates_are_also_reported() {
        let (directive, diagnostics) = parse_one("taskyield collapse(2) collapse(3)");
        assert_eq!(diagnostics.count_with_code(codes::clause::CLAUSE_NOT_ALLOWED), 2);
        assert_eq!(diagnostics.count_with_code(codes::clause::DUPLICATE_CLAUSE), 1);
        assert!(directive.unwrap().clauses.is_empty());
    }

    #[test]
    fn test_unknown_clause_skips_only_its_argument() {
        let (directive, diagnostics) = parse_one("parallel bogus(1, 2), shared(a)");
        let directive = directive.unwrap();
        assert_eq!(diagnostics.count_with_code(codes::clause::UNKNOWN_CLAUSE), 1);
        assert!(directive.clause(ClauseKind::Shared).is_some());

        let (directive, diagnostics) = parse_one("parallel bogus(1) shared(a) nosuch private(b)");
        let directive = directive.unwrap();
        assert_eq!(diagnostics.count_with_code(codes::clause::UNKNOWN_CLAUSE), 2);
        assert_eq!(diagnostics.len(), 2);
        assert!(directive.clause(ClauseKind::Shared).is_some());
        assert!(directive.clause(ClauseKind::Private).is_some());
    }

    #[test]
    fn test_cancel_regions() {
        let (directive, diagnostics) = parse_one("cancel taskgroup if(cond)");
        let directive = directive.unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(directive.cancel_region, Some(DirectiveKind::Taskgroup));
        assert!(!directive.has_associated_statement);
        assert!(directive.clause(ClauseKind::If).is_some());

        let (directive, diagnostics) = parse_one("cancellation point single");
        assert!(diagnostics.has_code(codes::directive::INVALID_CANCEL_REGION));
        let directive = directive.unwrap();
        assert_eq!(directive.kind, DirectiveKind::CancellationPoint);
        assert_eq!(directive.cancel_region, None);
    }

    #[test]
    fn test_critical_name() {
        let (directive, diagnostics) = parse_one("critical(update_lock) hint(1)");
        let directive = directive.unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(directive.name.as_deref(), Some("update_lock"));
        assert!(directive.clause(ClauseKind::Hint).is_some());

        let (directive, diagnostics) = parse_one("critical(42)");
        assert!(diagnostics.has_code(codes::directive::EXPECTED_CRITICAL_NAME));
        assert_eq!(directive.unwrap().name, None);
    }

    #[test]
    fn test_threadprivate_list() {
        let (directive, diagnostics) = parse_one("threadprivate(counter, ns::state)");
        let directive = directive.unwrap();
        assert!(diagnostics.is_empty());
        assert!(!directive.has_associated_statement);
        assert!(directive.associated_statement.is_none());

        let list = directive.clauses[0].as_var_list().unwrap();
        assert_eq!(list.kind, ClauseKind::Threadprivate);
        assert_eq!(list.vars.len(), 2);

        let (directive, diagnostics) = parse_one("threadprivate(a) private(b)");
        assert!(diagnostics.has_code(codes::directive::EXTRA_TOKENS));
        assert_eq!(directive.unwrap().clauses.len(), 1);

        let (directive, diagnostics) = parse_one("threadprivate(1)");
        assert!(diagnostics.has_code(codes::clause::EXPECTED_IDENTIFIER));
        assert!(directive.unwrap().clauses.is_empty());
    }

    #[test]
    fn test_flush_without_list() {
        let (directive, diagnostics) = parse_one("flush");
        let directive = directive.unwrap();
        assert!(diagnostics.is_empty());
        assert!(directive.clauses.is_empty());
        assert!(!directive.has_associated_statement);
    }

    #[test]
    fn test_flush_takes_a_single_list() {
        let (directive, diagnostics) = parse_one("flush(a) (b)");
        let directive = directive.unwrap();
        assert_eq!(diagnostics.count_with_code(codes::clause::UNKNOWN_CLAUSE), 1);
        assert_eq!(directive.clauses.len(), 1);
        assert_matches!(
            &directive.clauses[0],
            Clause::VarList(list) if list.kind == ClauseKind::Flush && list.vars.len() == 1
        );
        let (at, expected) = cursor_after("flush(a) (b)");
        assert_eq!(at, expected);
    }

    #[test]
    fn test_missing_statement_is_reported() {
        let tokens = tokenize("#pragma omp parallel\n").unwrap();
        let sink = Arc::new(MemoryDiagnostics::new());
        let mut parser =
            PragmaParser::with_preferences(tokens, test_preferences()).with_diagnostics(sink.clone());

        let directive = parser.parse_directive().unwrap();
        assert!(directive.associated_statement.is_none());
        assert_matches!(
            sink.diagnostics().as_slice(),
            [crate::syntax::SyntaxError::ExpectedToken { expected, .. }] if expected == "statement"
        );
    }

    #[derive(Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
        inner: DefaultActions,
    }

    impl SemanticActions for Recorder {
        fn start_directive_scope(&mut self, kind: DirectiveKind, span: Span) {
            self.inner.start_directive_scope(kind, span);
            self.push(format!("start {}", kind));
        }

        fn end_directive_scope(&mut self) {
            self.push("end".to_string());
        }

        fn act_on_clause(&mut self, clause: Clause, directive: DirectiveKind) -> Option<Clause> {
            self.push(format!("clause {}", clause.kind()));
            (clause.kind() != ClauseKind::Shared)
                .then_some(clause)
                .and_then(|clause| self.inner.act_on_clause(clause, directive))
        }
    }

    impl Recorder {
        fn push(&self, event: String) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }

    #[test]
    fn test_actions_see_scope_and_can_reject_clauses() {
        let recorder = Recorder::default();
        let events = recorder.events.clone();
        let tokens = tokenize("#pragma omp parallel private(a) shared(b)\n{}\n").unwrap();
        let mut parser = PragmaParser::with_preferences(tokens, test_preferences())
            .with_actions(Box::new(recorder));

        let directive = parser.parse_directive().unwrap();
        assert_eq!(directive.clauses.len(), 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["start parallel", "clause private", "clause shared", "end"]
        );
    }

    #[test]
    fn test_parse_all_reports_nested_directives() {
        let source = "\
#pragma omp parallel shared(v)
{
#pragma omp for schedule(static)
    for (i = 0; i < n; i++) { v[i] = i; }
}
#pragma omp barrier
";
        let mut parser = PragmaParser::with_preferences(tokenize(source).unwrap(), test_preferences());
        let directives = parser.parse_all();

        let kinds: Vec<_> = directives.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DirectiveKind::Parallel, DirectiveKind::For, DirectiveKind::Barrier]
        );
        assert_eq!(
            directives[0].associated_statement.as_ref().map(|s| s.nested_pragmas),
            Some(1)
        );
        assert_eq!(parser.directives_parsed(), 3);
        assert!(parser.validate_state().is_ok());
    }
}
