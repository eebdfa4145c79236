//! Variable-list clauses
//!
//! `kind ( [prefix] list [: tail] )`. The prefix depends on the kind:
//! a reduction identifier, a dependence type, a linear modifier wrapping the
//! list in its own parentheses, or a map type with its optional `always`
//! modifier. Only `linear` and `aligned` take a tail expression.

use crate::config::compile_time::syntax::MAX_LIST_ITEMS;
use crate::grammar::ast::{Clause, Expr, QualifiedName, ReductionIdentifier, ReductionOperator, VarListClause};
use crate::grammar::{ClauseKind, DependKind, DirectiveKind, LinearModifier, MapType};
use crate::log_warning;
use crate::syntax::actions::ExpressionPrecedence;
use crate::syntax::error::SyntaxError;
use crate::syntax::parser::PragmaParser;
use crate::tokens::Token;

/// Outcome of the `depend` prefix
enum DependPrefix {
    Parsed,
    /// `ordered depend(source)`: no list follows
    SourceOnly,
    Invalid,
}

pub(super) fn is_list_stop(token: &Token) -> bool {
    matches!(token, Token::Comma | Token::RightParen)
}

fn is_prefix_stop(token: &Token) -> bool {
    matches!(token, Token::Colon | Token::RightParen)
}

impl PragmaParser {
    pub(crate) fn parse_var_list_clause(
        &mut self,
        directive: DirectiveKind,
        kind: ClauseKind,
    ) -> Option<Clause> {
        let start = self.open_clause(kind)?;
        let mut clause = VarListClause::new(kind, start);
        let mut prefix_valid = true;
        let mut need_linear_close = false;

        match kind {
            ClauseKind::Reduction => prefix_valid = self.parse_reduction_prefix(&mut clause),
            ClauseKind::Depend => match self.parse_depend_prefix(directive, &mut clause) {
                DependPrefix::Parsed => {}
                DependPrefix::Invalid => prefix_valid = false,
                DependPrefix::SourceOnly => {
                    if !self.close_clause(kind) {
                        return None;
                    }
                    clause.span = self.tokens.span_since(start);
                    return Some(Clause::VarList(clause));
                }
            },
            ClauseKind::Linear => need_linear_close = self.parse_linear_modifier(&mut clause),
            ClauseKind::Map => prefix_valid = self.parse_map_prefix(&mut clause),
            _ => {}
        }

        let allows_tail = matches!(kind, ClauseKind::Linear | ClauseKind::Aligned);
        self.parse_list_items(kind, allows_tail, &mut clause.vars);

        if need_linear_close && !self.expect_close("to close linear modifier") {
            return None;
        }

        let mut tail_valid = true;
        if allows_tail && self.check(&Token::Colon) {
            let colon = self.location();
            self.advance();
            match self
                .expressions
                .parse_expression(&mut self.tokens, ExpressionPrecedence::Assignment)
            {
                Some(expr) => clause.tail_expr = Some(expr),
                None => {
                    self.report(SyntaxError::MissingTailExpression { clause: kind, span: colon });
                    self.skip_until(is_list_stop);
                    tail_valid = false;
                }
            }
        }

        let closed = self.close_clause(kind);
        clause.span = self.tokens.span_since(start);

        if clause.vars.is_empty() {
            if prefix_valid {
                self.report(SyntaxError::EmptyVariableList {
                    clause: kind,
                    span: clause.span,
                });
            }
            return None;
        }
        if !prefix_valid || !tail_valid || !closed {
            return None;
        }
        Some(Clause::VarList(clause))
    }

    fn list_ends(&self, allows_tail: bool) -> bool {
        self.at_terminator()
            || self.check(&Token::RightParen)
            || (allows_tail && self.check(&Token::Colon))
    }

    /// Comma-separated list items up to `)`, the terminator, or a tail `:`
    fn parse_list_items(&mut self, kind: ClauseKind, allows_tail: bool, vars: &mut Vec<Expr>) {
        while !self.list_ends(allows_tail) {
            if vars.len() >= MAX_LIST_ITEMS {
                log_warning!("Variable list truncated",
                    "clause" => kind.as_str(),
                    "limit" => MAX_LIST_ITEMS
                );
                self.skip_until(|token| matches!(token, Token::RightParen));
                break;
            }

            let item_span = self.location();
            match self
                .expressions
                .parse_expression(&mut self.tokens, ExpressionPrecedence::Assignment)
            {
                Some(expr) => {
                    if let Some(expr) = self.actions.act_on_id_expression(expr) {
                        vars.push(expr);
                    }
                }
                None => {
                    self.report(SyntaxError::ExpectedExpression {
                        clause: kind,
                        span: item_span,
                    });
                    self.skip_until(is_list_stop);
                }
            }

            if self.check(&Token::Comma) {
                let comma = self.location();
                self.advance();
                if self.list_ends(allows_tail) && !vars.is_empty() {
                    self.report(SyntaxError::ExpectedExpression {
                        clause: kind,
                        span: comma,
                    });
                }
                continue;
            }
            if self.list_ends(allows_tail) {
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
    }

    /// `a` or `ns::a`
    pub(crate) fn parse_qualified_name(&mut self) -> Option<QualifiedName> {
        let (first, _) = self.take_identifier()?;
        let mut segments = vec![first];

        while self.check(&Token::ColonColon)
            && self.peek(1).map(Token::is_identifier).unwrap_or(false)
        {
            self.advance();
            if let Some((segment, _)) = self.take_identifier() {
                segments.push(segment);
            }
        }
        Some(QualifiedName { segments })
    }

    /// `operator :` or `name :`; returns false when the identifier is unusable
    fn parse_reduction_prefix(&mut self, clause: &mut VarListClause) -> bool {
        let span = self.location();
        let operator = self.current().and_then(ReductionOperator::from_token);

        let id = match operator {
            Some(operator) => {
                self.advance();
                Some(ReductionIdentifier::Operator(operator))
            }
            None => self.parse_qualified_name().map(ReductionIdentifier::Name),
        };

        let Some(id) = id else {
            let error = SyntaxError::InvalidReductionIdentifier {
                found: self.found(),
                span,
            };
            self.report(error);
            self.skip_until(is_prefix_stop);
            if self.check(&Token::Colon) {
                self.advance();
            }
            return false;
        };

        self.expect_prefix_colon("reduction identifier");

        match self.actions.act_on_reduction_id(id, self.tokens.span_since(span)) {
            Some(id) => {
                clause.reduction_id = Some(id);
                true
            }
            None => false,
        }
    }

    fn parse_depend_prefix(
        &mut self,
        directive: DirectiveKind,
        clause: &mut VarListClause,
    ) -> DependPrefix {
        let span = self.location();
        let kind = self
            .current()
            .and_then(Token::spelling)
            .map(DependKind::from_spelling)
            .unwrap_or(DependKind::Unknown);

        if kind == DependKind::Unknown {
            let error = SyntaxError::InvalidDependKind {
                found: self.found(),
                span,
            };
            self.report(error);
            self.skip_until(is_prefix_stop);
            if self.check(&Token::Colon) {
                self.advance();
            }
            return DependPrefix::Invalid;
        }

        self.advance();
        clause.dependence_kind = Some(kind);

        if directive == DirectiveKind::Ordered && kind == DependKind::Source {
            return DependPrefix::SourceOnly;
        }

        self.expect_prefix_colon("dependency type");
        DependPrefix::Parsed
    }

    /// `modifier (` opening a wrapped list; returns true when one was consumed
    fn parse_linear_modifier(&mut self, clause: &mut VarListClause) -> bool {
        let modifier = match self.current().and_then(Token::as_identifier) {
            Some(word) if self.peek(1) == Some(&Token::LeftParen) => {
                LinearModifier::from_spelling(word)
            }
            _ => return false,
        };

        clause.linear_modifier = Some(modifier);
        self.advance();
        self.advance();
        true
    }

    /// `[always ,] map-type :`; without a written type the clause maps `tofrom`
    fn parse_map_prefix(&mut self, clause: &mut VarListClause) -> bool {
        let word = |token: Option<&Token>| token.and_then(Token::spelling).map(MapType::from_spelling);

        let first = word(self.current());
        let next = self.peek(1).cloned();
        let typed_after_comma =
            word(self.peek(2)).is_some() && self.peek(3) == Some(&Token::Colon);
        let mut colon_expected = false;
        let mut valid = true;

        match (first, next) {
            (Some(map_type), Some(Token::Colon)) => {
                colon_expected = true;
                let span = self.location();
                match map_type {
                    MapType::Unknown => {
                        let error = SyntaxError::UnknownMapType {
                            found: self.found(),
                            span,
                        };
                        self.report(error);
                        valid = false;
                    }
                    MapType::Always => {
                        self.report(SyntaxError::MissingMapType {
                            modifier: self.found(),
                            span,
                        });
                        valid = false;
                    }
                    _ => clause.map_type = Some(map_type),
                }
                self.advance();
            }
            (Some(modifier), Some(Token::Comma)) if typed_after_comma => {
                colon_expected = true;
                if modifier == MapType::Always {
                    clause.map_type_modifier = Some(modifier);
                } else {
                    let error = SyntaxError::UnknownMapTypeModifier {
                        found: self.found(),
                        span: self.location(),
                    };
                    self.report(error);
                    valid = false;
                }
                self.advance();
                self.advance();

                let map_type = word(self.current()).unwrap_or(MapType::Unknown);
                if map_type.is_type() {
                    clause.map_type = Some(map_type);
                } else {
                    let error = SyntaxError::UnknownMapType {
                        found: self.found(),
                        span: self.location(),
                    };
                    self.report(error);
                    valid = false;
                }
                self.advance();
            }
            _ => clause.map_type = Some(MapType::Tofrom),
        }

        if self.check(&Token::Colon) {
            self.advance();
        } else if colon_expected {
            let span = self.location();
            self.report(SyntaxError::expected_colon("map type", span));
        }
        valid
    }

    fn expect_prefix_colon(&mut self, context: &str) {
        if self.check(&Token::Colon) {
            self.advance();
        } else {
            let span = self.location();
            self.report(SyntaxError::expected_colon(context, span));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::ast::{ExprKind, ReductionIdentifier, ReductionOperator};
    use crate::grammar::{ClauseKind, DependKind, DirectiveKind, LinearModifier, MapType};
    use crate::logging::codes;
    use crate::syntax::test_support::parse_one;
    use assert_matches::assert_matches;

    fn var_names(directive: &crate::grammar::ast::Directive, kind: ClauseKind) -> Vec<String> {
        directive
            .clause(kind)
            .and_then(|clause| clause.as_var_list())
            .map(|list| list.vars.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_plain_lists() {
        let (directive, diagnostics) =
            parse_one("parallel private(a, b) firstprivate(ns::c) shared(arr[i], *p)");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
        let directive = directive.unwrap();

        assert_eq!(var_names(&directive, ClauseKind::Private), ["a", "b"]);
        assert_eq!(var_names(&directive, ClauseKind::Firstprivate), ["ns::c"]);
        assert_eq!(var_names(&directive, ClauseKind::Shared).len(), 2);

        let first = &directive.clause(ClauseKind::Firstprivate).unwrap().as_var_list().unwrap().vars[0];
        assert_matches!(&first.kind, ExprKind::Name(name) if name.is_qualified());
    }

    #[test]
    fn test_empty_list_drops_clause() {
        let (directive, diagnostics) = parse_one("parallel private() shared(x)");
        let directive = directive.unwrap();
        assert_eq!(diagnostics.count_with_code(codes::clause::EMPTY_VARIABLE_LIST), 1);
        assert!(directive.clause(ClauseKind::Private).is_none());
        assert!(directive.clause(ClauseKind::Shared).is_some());
    }

    #[test]
    fn test_missing_separator_recovers() {
        let (directive, diagnostics) = parse_one("parallel private(a b, c)");
        assert!(diagnostics.has_code(codes::clause::EXPECTED_SEPARATOR));
        assert_eq!(var_names(&directive.unwrap(), ClauseKind::Private), ["a", "c"]);
    }

    #[test]
    fn test_unclosed_list_is_dropped() {
        let (directive, diagnostics) = parse_one("parallel private(a");
        assert_eq!(diagnostics.count_with_code(codes::clause::EXPECTED_TOKEN), 1);
        assert!(directive.unwrap().clause(ClauseKind::Private).is_none());

        let (directive, diagnostics) = parse_one("simd linear(val(a : 2)");
        assert!(diagnostics.has_code(codes::clause::EXPECTED_TOKEN));
        assert!(directive.unwrap().clause(ClauseKind::Linear).is_none());
    }

    #[test]
    fn test_trailing_comma_is_reported() {
        let (directive, diagnostics) = parse_one("parallel shared(a,)");
        assert!(diagnostics.has_code(codes::clause::EXPECTED_EXPRESSION));
        assert_eq!(var_names(&directive.unwrap(), ClauseKind::Shared), ["a"]);
    }

    #[test]
    fn test_reduction_identifiers() {
        let (directive, diagnostics) = parse_one("parallel reduction(+: sum) reduction(max: hi, lo)");
        assert!(diagnostics.is_empty());
        let directive = directive.unwrap();
        let ids: Vec<_> = directive
            .clauses_of(ClauseKind::Reduction)
            .filter_map(|c| c.as_var_list())
            .map(|list| list.reduction_id.clone())
            .collect();

        assert_matches!(ids[0], Some(ReductionIdentifier::Operator(ReductionOperator::Add)));
        assert_matches!(&ids[1], Some(ReductionIdentifier::Name(name)) if name.base_name() == "max");
    }

    #[test]
    fn test_invalid_reduction_identifier_drops_clause() {
        let (directive, diagnostics) = parse_one("parallel reduction(/: x) private(y)");
        let directive = directive.unwrap();
        assert_eq!(diagnostics.count_with_code(codes::clause::INVALID_REDUCTION_ID), 1);
        assert!(!diagnostics.has_code(codes::clause::EMPTY_VARIABLE_LIST));
        assert!(directive.clause(ClauseKind::Reduction).is_none());
        assert!(directive.clause(ClauseKind::Private).is_some());
    }

    #[test]
    fn test_reduction_missing_colon_warns() {
        let (directive, diagnostics) = parse_one("parallel reduction(+ sum)");
        assert!(diagnostics.has_code(codes::clause::EXPECTED_COLON));
        assert!(diagnostics.errors().is_empty());
        assert_eq!(var_names(&directive.unwrap(), ClauseKind::Reduction), ["sum"]);
    }

    #[test]
    fn test_depend_kinds() {
        let (directive, diagnostics) = parse_one("task depend(inout: a, b[0])");
        assert!(diagnostics.is_empty());
        let list = directive
            .as_ref()
            .and_then(|d| d.clause(ClauseKind::Depend))
            .and_then(|c| c.as_var_list())
            .cloned()
            .unwrap();
        assert_eq!(list.dependence_kind, Some(DependKind::Inout));
        assert_eq!(list.vars.len(), 2);

        let (directive, diagnostics) = parse_one("task depend(sideways: a)");
        assert!(diagnostics.has_code(codes::clause::INVALID_DEPEND_KIND));
        assert!(directive.unwrap().clause(ClauseKind::Depend).is_none());
    }

    #[test]
    fn test_ordered_depend_source_is_standalone() {
        let (directive, diagnostics) = parse_one("ordered depend(source)");
        assert!(diagnostics.is_empty());
        let directive = directive.unwrap();
        assert_eq!(directive.kind, DirectiveKind::Ordered);
        assert!(!directive.has_associated_statement);

        let list = directive.clause(ClauseKind::Depend).and_then(|c| c.as_var_list()).unwrap();
        assert!(list.vars.is_empty());
        assert_eq!(list.dependence_kind, Some(DependKind::Source));
    }

    #[test]
    fn test_linear_with_modifier_and_step() {
        let (directive, diagnostics) = parse_one("simd linear(ref(a, b): 2) aligned(p: 64)");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
        let directive = directive.unwrap();

        let linear = directive.clause(ClauseKind::Linear).and_then(|c| c.as_var_list()).unwrap();
        assert_eq!(linear.linear_modifier, Some(LinearModifier::Ref));
        assert_eq!(linear.vars.len(), 2);
        assert_eq!(linear.tail_expr.as_ref().and_then(|e| e.as_integer()), Some(2));

        let aligned = directive.clause(ClauseKind::Aligned).and_then(|c| c.as_var_list()).unwrap();
        assert_eq!(aligned.tail_expr.as_ref().and_then(|e| e.as_integer()), Some(64));
    }

    #[test]
    fn test_linear_defaults_to_val() {
        let (directive, _) = parse_one("simd linear(i)");
        let linear = directive
            .as_ref()
            .and_then(|d| d.clause(ClauseKind::Linear))
            .and_then(|c| c.as_var_list())
            .unwrap();
        assert_eq!(linear.linear_modifier, Some(LinearModifier::Val));
    }

    #[test]
    fn test_missing_tail_drops_clause() {
        let (directive, diagnostics) = parse_one("simd aligned(p:) safelen(8)");
        let directive = directive.unwrap();
        assert!(diagnostics.has_code(codes::clause::MISSING_TAIL_EXPRESSION));
        assert!(directive.clause(ClauseKind::Aligned).is_none());
        assert!(directive.clause(ClauseKind::Safelen).is_some());
    }

    #[test]
    fn test_map_types() {
        let (directive, diagnostics) = parse_one("target map(to: a) map(always, from: b) map(c)");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
        let directive = directive.unwrap();
        let maps: Vec<_> = directive
            .clauses_of(ClauseKind::Map)
            .filter_map(|c| c.as_var_list())
            .map(|list| (list.map_type_modifier, list.map_type))
            .collect();

        assert_eq!(
            maps,
            vec![
                (None, Some(MapType::To)),
                (Some(MapType::Always), Some(MapType::From)),
                (None, Some(MapType::Tofrom)),
            ]
        );
    }

    #[test]
    fn test_map_errors() {
        let (_, diagnostics) = parse_one("target map(sideways: a)");
        assert!(diagnostics.has_code(codes::clause::UNKNOWN_MAP_TYPE));

        let (_, diagnostics) = parse_one("target map(always: a)");
        assert!(diagnostics.has_code(codes::clause::MISSING_MAP_TYPE));

        let (directive, diagnostics) = parse_one("target map(never, to: a)");
        assert!(diagnostics.has_code(codes::clause::UNKNOWN_MAP_TYPE_MODIFIER));
        assert!(directive.unwrap().clause(ClauseKind::Map).is_none());
    }

    #[test]
    fn test_map_list_item_named_like_type() {
        let (directive, diagnostics) = parse_one("target map(to, from)");
        assert!(diagnostics.is_empty());
        let directive = directive.unwrap();
        let list = directive.clause(ClauseKind::Map).and_then(|c| c.as_var_list()).unwrap();
        assert_eq!(list.map_type, Some(MapType::Tofrom));
        assert_eq!(list.vars.len(), 2);
    }

    #[test]
    fn test_flush_list() {
        let (directive, diagnostics) = parse_one("flush(a, b)");
        assert!(diagnostics.is_empty());
        let directive = directive.unwrap();
        assert_eq!(directive.kind, DirectiveKind::Flush);
        assert_eq!(var_names(&directive, ClauseKind::Flush), ["a", "b"]);
    }
}
