//! Clause kind resolution and the scalar clause grammars
//!
//! Variable-list clauses live in `var_list.rs`. Every parser here starts with
//! the clause keyword as the current token and returns `None` after reporting
//! when the clause has to be dropped.

use crate::grammar::ast::{Clause, ClauseArgument, SimpleValue};
use crate::grammar::{
    resolve_directive_kind, ClauseKind, ClauseShape, DefaultKind, DirectiveKind, ProcBindKind,
    ScheduleKind, ScheduleModifier,
};
use crate::syntax::actions::ExpressionPrecedence;
use crate::syntax::error::SyntaxError;
use crate::syntax::parser::PragmaParser;
use crate::tokens::{SpannedToken, Token};
use crate::utils::Span;

/// Tokens after which an enumerator slot is left empty rather than consumed
fn ends_enumerator_slot(token: Option<&Token>) -> bool {
    match token {
        Some(token) => matches!(token, Token::RightParen | Token::Comma) || token.is_run_boundary(),
        None => true,
    }
}

impl PragmaParser {
    /// Resolve the clause at the cursor.
    ///
    /// On `flush` a `(` in the first clause slot is the flush list: a `flush`
    /// keyword token is pushed back in front of it so the list parser sees
    /// the same input as for any other clause. A `(` in any later slot has no
    /// keyword and resolves to `Unknown`.
    pub(crate) fn resolve_clause_kind(
        &mut self,
        directive: DirectiveKind,
        first_slot: bool,
    ) -> Result<ClauseKind, SyntaxError> {
        if first_slot && directive == DirectiveKind::Flush && self.check(&Token::LeftParen) {
            let at = Span::empty_at(self.location().start());
            self.tokens.push_back(SpannedToken::new(
                Token::Identifier(ClauseKind::Flush.as_str().to_string()),
                at,
            ))?;
            return Ok(ClauseKind::Flush);
        }

        Ok(self
            .current()
            .and_then(Token::spelling)
            .map(ClauseKind::from_spelling)
            .unwrap_or(ClauseKind::Unknown))
    }

    /// Parse one clause of a known kind, keyword included
    pub(crate) fn parse_clause(
        &mut self,
        directive: DirectiveKind,
        kind: ClauseKind,
    ) -> Option<Clause> {
        self.push_context(kind.as_str());
        let clause = match kind.shape() {
            ClauseShape::Flag if kind == ClauseKind::Ordered && self.peek(1) == Some(&Token::LeftParen) => {
                self.parse_single_expr_clause(kind)
            }
            ClauseShape::SingleExpr => self.parse_single_expr_clause(kind),
            ClauseShape::Simple => self.parse_simple_clause(kind),
            ClauseShape::SingleExprWithArg if kind == ClauseKind::Schedule => {
                self.parse_schedule_clause()
            }
            ClauseShape::SingleExprWithArg => self.parse_if_clause(),
            ClauseShape::VarList => self.parse_var_list_clause(directive, kind),
            ClauseShape::Flag => {
                let span = self.location();
                self.advance();
                Some(Clause::Flag { kind, span })
            }
            ClauseShape::None => {
                self.advance();
                None
            }
        };
        self.pop_context();
        clause
    }

    /// Consume the clause keyword and its `(`; returns the keyword span
    pub(crate) fn open_clause(&mut self, kind: ClauseKind) -> Option<Span> {
        let start = self.location();
        self.advance();
        self.expect(Token::LeftParen, &format!("after '{}'", kind))?;
        Some(start)
    }

    pub(crate) fn close_clause(&mut self, kind: ClauseKind) -> bool {
        self.expect_close(&format!("to close '{}'", kind))
    }

    fn required_expression(
        &mut self,
        kind: ClauseKind,
        precedence: ExpressionPrecedence,
    ) -> Option<crate::grammar::ast::Expr> {
        let expr = self.expressions.parse_expression(&mut self.tokens, precedence);
        if expr.is_none() {
            let span = self.location();
            self.report(SyntaxError::ExpectedExpression { clause: kind, span });
            self.skip_past_close();
        }
        expr
    }

    /// `kind ( expression )`
    fn parse_single_expr_clause(&mut self, kind: ClauseKind) -> Option<Clause> {
        let start = self.open_clause(kind)?;
        let expr = self.required_expression(kind, ExpressionPrecedence::Conditional)?;
        if !self.close_clause(kind) {
            return None;
        }

        Some(Clause::SingleExpr {
            kind,
            expr,
            span: self.tokens.span_since(start),
        })
    }

    /// `kind ( enumerator )`; an unmapped spelling is kept as `Unknown`
    fn parse_simple_clause(&mut self, kind: ClauseKind) -> Option<Clause> {
        let start = self.open_clause(kind)?;
        let value_span = self.location();
        let word = self.current().and_then(Token::spelling).unwrap_or_default();

        let value = match kind {
            ClauseKind::Default => SimpleValue::Default(DefaultKind::from_spelling(word)),
            _ => SimpleValue::ProcBind(ProcBindKind::from_spelling(word)),
        };
        if !ends_enumerator_slot(self.current()) {
            self.advance();
        }
        if !self.close_clause(kind) {
            return None;
        }

        Some(Clause::Simple {
            kind,
            value,
            value_span,
            span: self.tokens.span_since(start),
        })
    }

    /// `schedule ( [modifier [, modifier] :] kind [, chunk] )`
    fn parse_schedule_clause(&mut self) -> Option<Clause> {
        let kind = ClauseKind::Schedule;
        let start = self.open_clause(kind)?;

        let mut modifiers = [None; 2];
        let mut modifier_spans = [None; 2];

        let first = self.current_schedule_modifier();
        if first != ScheduleModifier::Unknown {
            modifiers[0] = Some(first);
            modifier_spans[0] = Some(self.location());
            self.advance();

            if self.check(&Token::Comma) {
                self.advance();
                let second = self.current_schedule_modifier();
                if second == ScheduleModifier::Unknown {
                    self.warn_unknown_schedule_modifier();
                }
                modifiers[1] = Some(second);
                modifier_spans[1] = Some(self.location());
                if !ends_enumerator_slot(self.current()) {
                    self.advance();
                }
            }

            if self.check(&Token::Colon) {
                self.advance();
            } else {
                let span = self.location();
                self.report(SyntaxError::expected_colon("schedule modifier", span));
            }
        } else if matches!(self.peek(1), Some(Token::Colon) | Some(Token::Comma))
            && self.current_schedule_kind() == ScheduleKind::Unknown
        {
            self.warn_unknown_schedule_modifier();
        }

        let schedule = self.current_schedule_kind();
        let arg_span = Some(self.location());
        if !ends_enumerator_slot(self.current()) {
            self.advance();
        }

        let mut expr = None;
        if schedule.takes_chunk() && self.check(&Token::Comma) {
            self.advance();
            expr = Some(self.required_expression(kind, ExpressionPrecedence::Assignment)?);
        }
        if !self.close_clause(kind) {
            return None;
        }

        Some(Clause::SingleExprWithArg {
            kind,
            modifiers,
            modifier_spans,
            arg: ClauseArgument::Schedule(schedule),
            arg_span,
            expr,
            span: self.tokens.span_since(start),
        })
    }

    fn current_schedule_modifier(&self) -> ScheduleModifier {
        self.current()
            .and_then(Token::spelling)
            .map(ScheduleModifier::from_spelling)
            .unwrap_or(ScheduleModifier::Unknown)
    }

    fn current_schedule_kind(&self) -> ScheduleKind {
        self.current()
            .and_then(Token::spelling)
            .map(ScheduleKind::from_spelling)
            .unwrap_or(ScheduleKind::Unknown)
    }

    /// Only reported in strict mode; the lenient grammar accepts the slot as is
    fn warn_unknown_schedule_modifier(&mut self) {
        if !self.preferences.strict_schedule_modifiers {
            return;
        }
        let error = SyntaxError::UnknownScheduleModifier {
            found: self.found(),
            span: self.location(),
        };
        self.report(error);
    }

    /// `if ( [directive-name :] expression )`
    fn parse_if_clause(&mut self) -> Option<Clause> {
        let kind = ClauseKind::If;
        let start = self.open_clause(kind)?;

        let arg_span = self.location();
        let name = resolve_directive_kind(&mut self.tokens);
        let modifier = if name == DirectiveKind::Unknown {
            None
        } else {
            self.advance();
            if self.check(&Token::Colon) {
                self.advance();
            } else {
                let span = self.location();
                self.report(SyntaxError::expected_colon("directive name modifier", span));
            }
            Some(name)
        };

        let expr = self.required_expression(kind, ExpressionPrecedence::Assignment)?;
        if !self.close_clause(kind) {
            return None;
        }

        Some(Clause::SingleExprWithArg {
            kind,
            modifiers: [None; 2],
            modifier_spans: [None; 2],
            arg: ClauseArgument::NameModifier(modifier),
            arg_span: modifier.map(|_| arg_span),
            expr: Some(expr),
            span: self.tokens.span_since(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::ast::{Clause, ClauseArgument, SimpleValue};
    use crate::grammar::{
        ClauseKind, DefaultKind, DirectiveKind, ProcBindKind, ScheduleKind, ScheduleModifier,
    };
    use crate::logging::codes;
    use crate::syntax::test_support::{parse_one, parse_one_with};
    use assert_matches::assert_matches;

    #[test]
    fn test_single_expression_clauses() {
        let (directive, diagnostics) = parse_one("parallel num_threads(n * 2) if(ok)");
        let directive = directive.unwrap();
        assert!(diagnostics.is_empty());

        let num_threads = directive.clause(ClauseKind::NumThreads).unwrap();
        assert_eq!(num_threads.single_expr().map(|e| e.to_string()), Some("n * 2".into()));

        assert_matches!(
            directive.clause(ClauseKind::If),
            Some(Clause::SingleExprWithArg {
                arg: ClauseArgument::NameModifier(None),
                expr: Some(_),
                ..
            })
        );
    }

    #[test]
    fn test_missing_open_paren_keeps_following_clauses() {
        let (directive, diagnostics) = parse_one("for collapse, nowait");
        let directive = directive.unwrap();

        assert_eq!(diagnostics.count_with_code(codes::clause::EXPECTED_TOKEN), 1);
        assert!(directive.clause(ClauseKind::Collapse).is_none());
        assert!(directive.clause(ClauseKind::Nowait).is_some());
    }

    #[test]
    fn test_missing_expression_drops_clause() {
        let (directive, diagnostics) = parse_one("simd safelen() simdlen(4)");
        let directive = directive.unwrap();

        assert!(diagnostics.has_code(codes::clause::EXPECTED_EXPRESSION));
        assert!(directive.clause(ClauseKind::Safelen).is_none());
        assert_eq!(
            directive
                .clause(ClauseKind::Simdlen)
                .and_then(Clause::single_expr)
                .and_then(|e| e.as_integer()),
            Some(4)
        );
    }

    #[test]
    fn test_simple_clauses() {
        let (directive, diagnostics) = parse_one("parallel default(none) proc_bind(far)");
        let directive = directive.unwrap();
        assert!(diagnostics.is_empty());

        assert_matches!(
            directive.clause(ClauseKind::Default),
            Some(Clause::Simple {
                value: SimpleValue::Default(DefaultKind::None),
                ..
            })
        );
        assert_matches!(
            directive.clause(ClauseKind::ProcBind),
            Some(Clause::Simple {
                value: SimpleValue::ProcBind(ProcBindKind::Unknown),
                ..
            })
        );
    }

    #[test]
    fn test_schedule_forms() {
        let (directive, diagnostics) =
            parse_one("for schedule(monotonic, simd: dynamic, chunk + 1)");
        assert!(diagnostics.is_empty());
        let directive = directive.unwrap();
        assert_matches!(
            directive.clause(ClauseKind::Schedule),
            Some(Clause::SingleExprWithArg {
                modifiers: [Some(ScheduleModifier::Monotonic), Some(ScheduleModifier::Simd)],
                arg: ClauseArgument::Schedule(ScheduleKind::Dynamic),
                expr: Some(_),
                ..
            })
        );

        let (directive, _) = parse_one("for schedule(runtime)");
        assert_matches!(
            directive.unwrap().clause(ClauseKind::Schedule),
            Some(Clause::SingleExprWithArg {
                modifiers: [None, None],
                arg: ClauseArgument::Schedule(ScheduleKind::Runtime),
                expr: None,
                ..
            })
        );
    }

    #[test]
    fn test_schedule_missing_colon_is_warning() {
        let (directive, diagnostics) = parse_one("for schedule(nonmonotonic static)");
        assert_eq!(diagnostics.warnings().len(), 1);
        assert!(diagnostics.has_code(codes::clause::EXPECTED_COLON));
        assert_matches!(
            directive.unwrap().clause(ClauseKind::Schedule),
            Some(Clause::SingleExprWithArg {
                arg: ClauseArgument::Schedule(ScheduleKind::Static),
                ..
            })
        );
    }

    #[test]
    fn test_schedule_chunk_requires_expression() {
        let (directive, diagnostics) = parse_one("for schedule(static, ) nowait");
        let directive = directive.unwrap();
        assert!(diagnostics.has_code(codes::clause::EXPECTED_EXPRESSION));
        assert!(directive.clause(ClauseKind::Schedule).is_none());
        assert!(directive.clause(ClauseKind::Nowait).is_some());
    }

    #[test]
    fn test_schedule_modifier_leniency_and_strict_mode() {
        let (_, lenient) = parse_one("for schedule(bogus: static)");
        assert!(!lenient.has_code(codes::clause::UNKNOWN_SCHEDULE_MODIFIER));

        let (_, strict) = parse_one_with("for schedule(bogus: static)", |prefs| {
            prefs.strict_schedule_modifiers = true;
        });
        assert_eq!(strict.count_with_code(codes::clause::UNKNOWN_SCHEDULE_MODIFIER), 1);
    }

    #[test]
    fn test_if_with_directive_name_modifier() {
        let (directive, diagnostics) = parse_one("target data if(target data: n > 4) map(a)");
        assert!(diagnostics.is_empty());
        let directive = directive.unwrap();
        assert_eq!(directive.kind, DirectiveKind::TargetData);
        assert_matches!(
            directive.clause(ClauseKind::If),
            Some(Clause::SingleExprWithArg {
                arg: ClauseArgument::NameModifier(Some(DirectiveKind::TargetData)),
                expr: Some(_),
                ..
            })
        );

        let (directive, diagnostics) = parse_one("parallel if(parallel cond)");
        assert!(diagnostics.has_code(codes::clause::EXPECTED_COLON));
        assert!(directive.unwrap().clause(ClauseKind::If).is_some());
    }

    #[test]
    fn test_ordered_clause_with_and_without_argument() {
        let (directive, _) = parse_one("for ordered");
        assert_matches!(
            directive.unwrap().clause(ClauseKind::Ordered),
            Some(Clause::Flag { .. })
        );

        let (directive, _) = parse_one("for ordered(2)");
        assert_eq!(
            directive
                .unwrap()
                .clause(ClauseKind::Ordered)
                .and_then(Clause::single_expr)
                .and_then(|e| e.as_integer()),
            Some(2)
        );
    }

    #[test]
    fn test_missing_close_paren_drops_clause() {
        let (directive, diagnostics) = parse_one("parallel num_threads(4 default(none)");
        let directive = directive.unwrap();
        assert_eq!(diagnostics.count_with_code(codes::clause::EXPECTED_TOKEN), 1);
        assert!(directive.clause(ClauseKind::NumThreads).is_none());

        let (directive, diagnostics) = parse_one("parallel proc_bind(close");
        assert!(diagnostics.has_code(codes::clause::EXPECTED_TOKEN));
        assert!(directive.unwrap().clauses.is_empty());

        let (directive, _) = parse_one("for schedule(static, 4");
        assert!(directive.unwrap().clause(ClauseKind::Schedule).is_none());

        let (directive, _) = parse_one("parallel if(cond");
        assert!(directive.unwrap().clause(ClauseKind::If).is_none());
    }
}
