//! Syntax analysis module - pragma runs to directives
//!
//! The parser walks a [`TokenStream`] produced by the lexer and turns every
//! `#pragma omp` run into a [`Directive`]. Malformed input never aborts the
//! walk: diagnostics go to a [`DiagnosticsSink`] and the offending clause or
//! directive is dropped.

pub mod actions;
mod clauses;
mod directive;
mod error;
mod parser;
mod var_list;

pub use crate::grammar::ast::Directive;
pub use actions::{
    DefaultActions, DiagnosticsSink, ExpressionParser, ExpressionPrecedence, MemoryDiagnostics,
    SemanticActions, StatementParser, TokenExpressionParser, TokenStatementParser,
};
pub use error::{ContextualSyntaxError, ErrorContext, SyntaxError, SyntaxResult};
pub use parser::{create_parser, PragmaParser};

use crate::config::runtime::ParserPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_info, log_success};
use std::sync::Arc;

/// Directives of one source together with every diagnostic raised for it
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub directives: Vec<Directive>,
    pub diagnostics: Vec<SyntaxError>,
}

impl ParseOutcome {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_warning()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Parse every pragma run with default preferences
pub fn parse_pragmas(token_stream: TokenStream) -> ParseOutcome {
    parse_pragmas_with_preferences(token_stream, ParserPreferences::default())
}

pub fn parse_pragmas_with_preferences(
    token_stream: TokenStream,
    preferences: ParserPreferences,
) -> ParseOutcome {
    log_debug!("Starting syntax analysis", "tokens" => token_stream.len());

    let sink = Arc::new(MemoryDiagnostics::new());
    let mut parser =
        PragmaParser::with_preferences(token_stream, preferences).with_diagnostics(sink.clone());
    let directives = parser.parse_all();
    let diagnostics = sink.take();

    if diagnostics.is_empty() {
        log_success!(
            codes::success::DIRECTIVE_PARSED,
            "Syntax analysis completed without diagnostics",
            "directives" => directives.len()
        );
    } else {
        log_info!("Syntax analysis completed with diagnostics",
            "directives" => directives.len(),
            "diagnostics" => diagnostics.len()
        );
    }

    ParseOutcome {
        directives,
        diagnostics,
    }
}

/// Module version
pub const VERSION: &str = "1.0.0";

/// Check that every code the parser reports is registered
pub fn init_syntax_logging() -> Result<(), String> {
    let parser_codes = [
        codes::directive::UNKNOWN_DIRECTIVE,
        codes::directive::INVALID_CANCEL_REGION,
        codes::directive::EXPECTED_CRITICAL_NAME,
        codes::directive::EXTRA_TOKENS,
        codes::directive::TOO_MANY_CLAUSES,
        codes::clause::UNKNOWN_CLAUSE,
        codes::clause::CLAUSE_NOT_ALLOWED,
        codes::clause::DUPLICATE_CLAUSE,
        codes::clause::EXPECTED_TOKEN,
        codes::clause::EXPECTED_EXPRESSION,
        codes::clause::EXPECTED_IDENTIFIER,
        codes::clause::EMPTY_VARIABLE_LIST,
        codes::clause::MISSING_TAIL_EXPRESSION,
        codes::clause::INVALID_REDUCTION_ID,
        codes::clause::INVALID_DEPEND_KIND,
        codes::clause::UNKNOWN_MAP_TYPE,
        codes::clause::UNKNOWN_MAP_TYPE_MODIFIER,
        codes::clause::MISSING_MAP_TYPE,
        codes::clause::EXPECTED_SEPARATOR,
        codes::clause::EXPECTED_COLON,
        codes::clause::UNKNOWN_SCHEDULE_MODIFIER,
        codes::syntax::INTERNAL_PARSER_ERROR,
    ];

    for code in &parser_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_info!("Syntax module logging validation completed");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::lexical::tokenize;

    pub fn test_preferences() -> ParserPreferences {
        ParserPreferences {
            strict_schedule_modifiers: false,
            capture_statement_text: true,
            log_directive_summaries: false,
        }
    }

    /// First directive of `#pragma omp <text>` followed by a block
    pub fn parse_one(text: &str) -> (Option<Directive>, Arc<MemoryDiagnostics>) {
        parse_one_with(text, |_| {})
    }

    pub fn parse_one_with<F>(text: &str, adjust: F) -> (Option<Directive>, Arc<MemoryDiagnostics>)
    where
        F: FnOnce(&mut ParserPreferences),
    {
        let mut preferences = test_preferences();
        adjust(&mut preferences);

        let source = format!("#pragma omp {}\n{{ work(); }}\n", text);
        let tokens = tokenize(&source).expect("test source should tokenize");
        let sink = Arc::new(MemoryDiagnostics::new());
        let mut parser =
            PragmaParser::with_preferences(tokens, preferences).with_diagnostics(sink.clone());
        (parser.parse_directive(), sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    #[test]
    fn test_all_parser_codes_registered() {
        assert!(init_syntax_logging().is_ok());
    }

    #[test]
    fn test_parse_pragmas_collects_diagnostics() {
        let source = "\
int main() {
#pragma omp parallel num_threads(2) num_threads(3)
    { run(); }
#pragma omp bogus
#pragma omp barrier
}
";
        let outcome = parse_pragmas_with_preferences(
            tokenize(source).unwrap(),
            test_support::test_preferences(),
        );

        assert_eq!(outcome.directives.len(), 2);
        assert_eq!(outcome.error_count(), 2);
        assert_eq!(outcome.warning_count(), 0);
        assert!(outcome.has_errors());
    }
}
