//! Directive and clause diagnostics
//!
//! Every variant is one diagnostic kind delivered to the diagnostics sink. The
//! parser never propagates these as `Err`: a diagnostic is reported, the
//! offending clause or directive is dropped, and parsing resumes.

use crate::grammar::{ClauseKind, DirectiveKind};
use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown directive '{found}' at {span}")]
    UnknownDirective { found: String, span: Span },

    #[error("Unknown clause '{found}' on '{directive}' at {span}")]
    UnknownClause {
        found: String,
        directive: DirectiveKind,
        span: Span,
    },

    #[error("Clause '{clause}' is not allowed on '{directive}' at {span}")]
    ClauseNotAllowed {
        clause: ClauseKind,
        directive: DirectiveKind,
        span: Span,
    },

    #[error("More than one '{clause}' clause on '{directive}' at {span}")]
    DuplicateClause {
        clause: ClauseKind,
        directive: DirectiveKind,
        span: Span,
    },

    #[error("Expected '{expected}' {context}, found '{found}' at {span}")]
    ExpectedToken {
        expected: String,
        context: String,
        found: String,
        span: Span,
    },

    #[error("Expected expression in '{clause}' at {span}")]
    ExpectedExpression { clause: ClauseKind, span: Span },

    #[error("Expected identifier in '{clause}', found '{found}' at {span}")]
    ExpectedIdentifier {
        clause: ClauseKind,
        found: String,
        span: Span,
    },

    #[error("Expected identifier naming the critical region, found '{found}' at {span}")]
    ExpectedCriticalName { found: String, span: Span },

    #[error("'{found}' is not a valid region for '{directive}' at {span}")]
    InvalidCancelRegion {
        found: String,
        directive: DirectiveKind,
        span: Span,
    },

    #[error("'{clause}' clause requires at least one list item at {span}")]
    EmptyVariableList { clause: ClauseKind, span: Span },

    #[error("Expected expression after ':' in '{clause}' at {span}")]
    MissingTailExpression { clause: ClauseKind, span: Span },

    #[error("Invalid reduction identifier '{found}' at {span}")]
    InvalidReductionIdentifier { found: String, span: Span },

    #[error("Invalid dependence kind '{found}' at {span}")]
    InvalidDependKind { found: String, span: Span },

    #[error("Unknown map type '{found}' at {span}")]
    UnknownMapType { found: String, span: Span },

    #[error("Missing map type after '{modifier}' at {span}")]
    MissingMapType { modifier: String, span: Span },

    #[error("Unknown map type modifier '{found}' at {span}")]
    UnknownMapTypeModifier { found: String, span: Span },

    #[error("Expected ',' or ')' in '{clause}' list, found '{found}' at {span}")]
    ExpectedSeparator {
        clause: ClauseKind,
        found: String,
        span: Span,
    },

    #[error("Expected ':' after {context} at {span}")]
    ExpectedColon { context: String, span: Span },

    #[error("Extra tokens at end of '{directive}' directive at {span}")]
    ExtraTokens { directive: DirectiveKind, span: Span },

    #[error("Unknown schedule modifier '{found}' at {span}")]
    UnknownScheduleModifier { found: String, span: Span },

    #[error("Directive '{directive}' has more than {limit} clauses at {span}")]
    TooManyClauses {
        directive: DirectiveKind,
        limit: usize,
        span: Span,
    },

    #[error("Pushback slot already holds '{held}' at {span}")]
    PushbackOccupied { held: String, span: Span },
}

impl SyntaxError {
    pub fn expected_token(expected: &str, context: &str, found: &str, span: Span) -> Self {
        Self::ExpectedToken {
            expected: expected.to_string(),
            context: context.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn expected_colon(context: &str, span: Span) -> Self {
        Self::ExpectedColon {
            context: context.to_string(),
            span,
        }
    }

    /// Error code for the global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownDirective { .. } => codes::directive::UNKNOWN_DIRECTIVE,
            Self::InvalidCancelRegion { .. } => codes::directive::INVALID_CANCEL_REGION,
            Self::ExpectedCriticalName { .. } => codes::directive::EXPECTED_CRITICAL_NAME,
            Self::ExtraTokens { .. } => codes::directive::EXTRA_TOKENS,
            Self::TooManyClauses { .. } => codes::directive::TOO_MANY_CLAUSES,
            Self::UnknownClause { .. } => codes::clause::UNKNOWN_CLAUSE,
            Self::ClauseNotAllowed { .. } => codes::clause::CLAUSE_NOT_ALLOWED,
            Self::DuplicateClause { .. } => codes::clause::DUPLICATE_CLAUSE,
            Self::ExpectedToken { .. } => codes::clause::EXPECTED_TOKEN,
            Self::ExpectedExpression { .. } => codes::clause::EXPECTED_EXPRESSION,
            Self::ExpectedIdentifier { .. } => codes::clause::EXPECTED_IDENTIFIER,
            Self::EmptyVariableList { .. } => codes::clause::EMPTY_VARIABLE_LIST,
            Self::MissingTailExpression { .. } => codes::clause::MISSING_TAIL_EXPRESSION,
            Self::InvalidReductionIdentifier { .. } => codes::clause::INVALID_REDUCTION_ID,
            Self::InvalidDependKind { .. } => codes::clause::INVALID_DEPEND_KIND,
            Self::UnknownMapType { .. } => codes::clause::UNKNOWN_MAP_TYPE,
            Self::MissingMapType { .. } => codes::clause::MISSING_MAP_TYPE,
            Self::UnknownMapTypeModifier { .. } => codes::clause::UNKNOWN_MAP_TYPE_MODIFIER,
            Self::ExpectedSeparator { .. } => codes::clause::EXPECTED_SEPARATOR,
            Self::ExpectedColon { .. } => codes::clause::EXPECTED_COLON,
            Self::UnknownScheduleModifier { .. } => codes::clause::UNKNOWN_SCHEDULE_MODIFIER,
            Self::PushbackOccupied { .. } => codes::syntax::INTERNAL_PARSER_ERROR,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnknownDirective { span, .. }
            | Self::UnknownClause { span, .. }
            | Self::ClauseNotAllowed { span, .. }
            | Self::DuplicateClause { span, .. }
            | Self::ExpectedToken { span, .. }
            | Self::ExpectedExpression { span, .. }
            | Self::ExpectedIdentifier { span, .. }
            | Self::ExpectedCriticalName { span, .. }
            | Self::InvalidCancelRegion { span, .. }
            | Self::EmptyVariableList { span, .. }
            | Self::MissingTailExpression { span, .. }
            | Self::InvalidReductionIdentifier { span, .. }
            | Self::InvalidDependKind { span, .. }
            | Self::UnknownMapType { span, .. }
            | Self::MissingMapType { span, .. }
            | Self::UnknownMapTypeModifier { span, .. }
            | Self::ExpectedSeparator { span, .. }
            | Self::ExpectedColon { span, .. }
            | Self::ExtraTokens { span, .. }
            | Self::UnknownScheduleModifier { span, .. }
            | Self::TooManyClauses { span, .. }
            | Self::PushbackOccupied { span, .. } => *span,
        }
    }

    /// Diagnostics that never drop a clause or directive
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::ExpectedColon { .. }
                | Self::ExtraTokens { .. }
                | Self::UnknownScheduleModifier { .. }
        )
    }

    pub fn requires_halt(&self) -> bool {
        matches!(self, Self::PushbackOccupied { .. })
    }

    pub fn is_recoverable(&self) -> bool {
        !self.requires_halt()
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    /// Message with the registry's recommended action appended
    pub fn enhanced_message(&self) -> String {
        match self {
            Self::ExpectedToken {
                expected,
                context,
                found,
                ..
            } => format!(
                "Expected '{}' {} but found '{}'. {}",
                expected,
                context,
                found,
                self.recommended_action()
            ),
            Self::ClauseNotAllowed {
                clause, directive, ..
            } => format!(
                "'{}' cannot be used on '{}'. {}",
                clause,
                directive,
                self.recommended_action()
            ),
            Self::DuplicateClause { clause, .. } => format!(
                "'{}' may appear only once; the first occurrence is kept. {}",
                clause,
                self.recommended_action()
            ),
            _ => format!("{} ({})", self, self.recommended_action()),
        }
    }
}

impl From<crate::tokens::TokenStreamError> for SyntaxError {
    fn from(error: crate::tokens::TokenStreamError) -> Self {
        use crate::tokens::TokenStreamError;
        match error {
            TokenStreamError::UnexpectedToken {
                expected,
                found,
                span,
            } => Self::ExpectedToken {
                expected,
                context: String::new(),
                found,
                span,
            },
            TokenStreamError::UnexpectedEndOfStream { expected } => Self::ExpectedToken {
                expected,
                context: String::new(),
                found: "<EOF>".to_string(),
                span: Span::dummy(),
            },
            TokenStreamError::PushbackOccupied { held, span } => {
                Self::PushbackOccupied { held, span }
            }
        }
    }
}

/// Error context for enhanced error reporting
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub parsing_context: Vec<String>,
    pub surrounding_tokens: Vec<String>,
    pub file_position: Option<(u32, u32)>, // line, column
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            parsing_context: Vec::new(),
            surrounding_tokens: Vec::new(),
            file_position: None,
        }
    }

    pub fn with_context(mut self, context: String) -> Self {
        self.parsing_context.push(context);
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<String>) -> Self {
        self.surrounding_tokens = tokens;
        self
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.file_position = Some((line, column));
        self
    }

    pub fn format_context(&self) -> String {
        let mut context = String::new();

        if !self.parsing_context.is_empty() {
            context.push_str(&format!("Context: {}\n", self.parsing_context.join(" -> ")));
        }

        if !self.surrounding_tokens.is_empty() {
            context.push_str(&format!("Near: {}\n", self.surrounding_tokens.join(" ")));
        }

        if let Some((line, column)) = self.file_position {
            context.push_str(&format!("Position: line {}, column {}\n", line, column));
        }

        context
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostic with the parser state it was raised in
#[derive(Debug, Clone)]
pub struct ContextualSyntaxError {
    pub error: SyntaxError,
    pub context: ErrorContext,
}

impl ContextualSyntaxError {
    pub fn new(error: SyntaxError) -> Self {
        Self {
            error,
            context: ErrorContext::new(),
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    pub fn format_full_error(&self) -> String {
        format!(
            "{}\n{}Help: {} (Severity: {})",
            self.error.enhanced_message(),
            self.context.format_context(),
            self.error.recommended_action(),
            self.error.severity()
        )
    }
}

impl std::fmt::Display for ContextualSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_full_error())
    }
}

impl std::error::Error for ContextualSyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
