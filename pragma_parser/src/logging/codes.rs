//! Consolidated error codes and classification system
//!
//! Single source of truth for all diagnostic codes, their metadata, and
//! classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for a diagnostic code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E025");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const UNTERMINATED_CONTINUATION: Code = Code::new("E028");
}

/// Directive-level parse codes
pub mod directive {
    use super::Code;

    pub const UNKNOWN_DIRECTIVE: Code = Code::new("E060");
    pub const INVALID_CANCEL_REGION: Code = Code::new("E061");
    pub const EXPECTED_CRITICAL_NAME: Code = Code::new("E062");
    /// Warning
    pub const EXTRA_TOKENS: Code = Code::new("E063");
    pub const TOO_MANY_CLAUSES: Code = Code::new("E064");
}

/// Clause-level parse codes
pub mod clause {
    use super::Code;

    pub const UNKNOWN_CLAUSE: Code = Code::new("E070");
    pub const CLAUSE_NOT_ALLOWED: Code = Code::new("E071");
    pub const DUPLICATE_CLAUSE: Code = Code::new("E072");
    pub const EXPECTED_TOKEN: Code = Code::new("E073");
    pub const EXPECTED_EXPRESSION: Code = Code::new("E074");
    pub const EXPECTED_IDENTIFIER: Code = Code::new("E075");
    pub const EMPTY_VARIABLE_LIST: Code = Code::new("E076");
    pub const MISSING_TAIL_EXPRESSION: Code = Code::new("E077");
    pub const INVALID_REDUCTION_ID: Code = Code::new("E078");
    pub const INVALID_DEPEND_KIND: Code = Code::new("E079");
    pub const UNKNOWN_MAP_TYPE: Code = Code::new("E080");
    pub const UNKNOWN_MAP_TYPE_MODIFIER: Code = Code::new("E081");
    pub const MISSING_MAP_TYPE: Code = Code::new("E082");
    pub const EXPECTED_SEPARATOR: Code = Code::new("E083");
    /// Warning
    pub const EXPECTED_COLON: Code = Code::new("E084");
    /// Warning, strict schedule mode only
    pub const UNKNOWN_SCHEDULE_MODIFIER: Code = Code::new("E085");
}

/// Parser machinery codes
pub mod syntax {
    use super::Code;

    pub const INTERNAL_PARSER_ERROR: Code = Code::new("E089");
}

/// Source pipeline codes
pub mod pipeline {
    use super::Code;

    pub const SOURCE_TOO_LARGE: Code = Code::new("E007");
    pub const IO_ERROR: Code = Code::new("E011");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const SOURCE_PROCESSED: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const DIRECTIVE_PARSED: Code = Code::new("I040");
    pub const PRAGMA_SCAN_COMPLETE: Code = Code::new("I041");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check logging configuration and environment overrides",
            ),
            // Pipeline errors
            ErrorMetadata::new(
                "E007",
                "Pipeline",
                Severity::High,
                false,
                false,
                "Source exceeds the configured size limit",
                "Split the translation unit or raise pipeline.max_source_size",
            ),
            ErrorMetadata::new(
                "E011",
                "Pipeline",
                Severity::High,
                false,
                false,
                "I/O error while reading source",
                "Check the path and read permissions",
            ),
            // Lexical errors
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::High,
                true,
                false,
                "Invalid character in source",
                "Remove or escape the character",
            ),
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::High,
                true,
                false,
                "Unterminated string or character literal",
                "Add the closing quote",
            ),
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Malformed numeric literal",
                "Check the literal's digits and suffix",
            ),
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Identifier exceeds maximum length",
                "Use a shorter identifier",
            ),
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "String literal exceeds maximum size",
                "Shorten the literal",
            ),
            ErrorMetadata::new(
                "E025",
                "Lexical",
                Severity::High,
                true,
                false,
                "Unterminated block comment",
                "Close the comment with */",
            ),
            ErrorMetadata::new(
                "E026",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Comment exceeds maximum length",
                "Shorten the comment",
            ),
            ErrorMetadata::new(
                "E027",
                "Lexical",
                Severity::High,
                false,
                true,
                "Token count exceeds configured limit",
                "Split the source or raise lexical.max_token_count",
            ),
            ErrorMetadata::new(
                "E028",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Line continuation at end of input",
                "Remove the trailing backslash",
            ),
            // Directive errors
            ErrorMetadata::new(
                "E060",
                "Directive",
                Severity::Medium,
                true,
                false,
                "Unknown directive after '#pragma omp'",
                "Check the directive spelling",
            ),
            ErrorMetadata::new(
                "E061",
                "Directive",
                Severity::Medium,
                true,
                false,
                "Cancellation construct names an invalid region",
                "Use parallel, for, sections or taskgroup",
            ),
            ErrorMetadata::new(
                "E062",
                "Directive",
                Severity::Medium,
                true,
                false,
                "Expected identifier for critical section name",
                "Write 'critical (name)'",
            ),
            ErrorMetadata::new(
                "E063",
                "Directive",
                Severity::Low,
                true,
                false,
                "Extra tokens at end of directive",
                "Remove the trailing tokens",
            ),
            ErrorMetadata::new(
                "E064",
                "Directive",
                Severity::High,
                true,
                false,
                "Too many clauses on one directive",
                "Split the directive or raise syntax.max_clauses_per_directive",
            ),
            // Clause errors
            ErrorMetadata::new(
                "E070",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Unknown clause",
                "Check the clause spelling",
            ),
            ErrorMetadata::new(
                "E071",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Clause not allowed on this directive",
                "Remove the clause or use a directive that accepts it",
            ),
            ErrorMetadata::new(
                "E072",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Clause may appear only once",
                "Remove the repeated clause",
            ),
            ErrorMetadata::new(
                "E073",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Expected token",
                "Insert the missing punctuation",
            ),
            ErrorMetadata::new(
                "E074",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Expected expression",
                "Provide an expression",
            ),
            ErrorMetadata::new(
                "E075",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Expected identifier",
                "Provide an identifier",
            ),
            ErrorMetadata::new(
                "E076",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Variable list is empty",
                "List at least one variable",
            ),
            ErrorMetadata::new(
                "E077",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Expected expression after ':'",
                "Provide the step or alignment expression",
            ),
            ErrorMetadata::new(
                "E078",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Invalid reduction identifier",
                "Use an operator or a declared reduction name",
            ),
            ErrorMetadata::new(
                "E079",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Invalid dependence type",
                "Use in, out, inout or source",
            ),
            ErrorMetadata::new(
                "E080",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Unknown map type",
                "Use alloc, to, from, tofrom, delete or release",
            ),
            ErrorMetadata::new(
                "E081",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Unknown map type modifier",
                "Only 'always' may precede the map type",
            ),
            ErrorMetadata::new(
                "E082",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Map type modifier without map type",
                "Add a map type after the modifier",
            ),
            ErrorMetadata::new(
                "E083",
                "Clause",
                Severity::Medium,
                true,
                false,
                "Expected ',' or ')' in list",
                "Separate list items with commas",
            ),
            ErrorMetadata::new(
                "E084",
                "Clause",
                Severity::Low,
                true,
                false,
                "Expected ':'",
                "Insert the missing colon",
            ),
            ErrorMetadata::new(
                "E085",
                "Clause",
                Severity::Low,
                true,
                false,
                "Unknown schedule modifier",
                "Use monotonic, nonmonotonic or simd",
            ),
            ErrorMetadata::new(
                "E089",
                "Syntax",
                Severity::Critical,
                false,
                true,
                "Internal parser error",
                "File a bug report with the input that triggered it",
            ),
            // Success codes
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "Logging system initialized",
                "Continue",
            ),
            ErrorMetadata::new(
                "I006",
                "Pipeline",
                Severity::Low,
                true,
                false,
                "Source processed",
                "Continue",
            ),
            ErrorMetadata::new(
                "I020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Tokenization complete",
                "Continue to directive parsing",
            ),
            ErrorMetadata::new(
                "I040",
                "Directive",
                Severity::Low,
                true,
                false,
                "Directive parsed",
                "Continue",
            ),
            ErrorMetadata::new(
                "I041",
                "Directive",
                Severity::Low,
                true,
                false,
                "Pragma scan complete",
                "Continue",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

/// Every registered code, used by initialization to verify the registry
pub fn all_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = get_error_registry().keys().copied().collect();
    codes.sort_unstable();
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_codes_are_registered() {
        let declared = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            lexical::INVALID_CHARACTER,
            lexical::TOO_MANY_TOKENS,
            directive::UNKNOWN_DIRECTIVE,
            directive::TOO_MANY_CLAUSES,
            clause::UNKNOWN_CLAUSE,
            clause::CLAUSE_NOT_ALLOWED,
            clause::EXPECTED_COLON,
            clause::UNKNOWN_SCHEDULE_MODIFIER,
            syntax::INTERNAL_PARSER_ERROR,
            pipeline::SOURCE_TOO_LARGE,
            success::DIRECTIVE_PARSED,
        ];
        for code in declared {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "{} missing from registry",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E071"), "Clause");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("E089"));
        assert!(is_recoverable("E060"));
        assert_eq!(get_severity("E084"), Severity::Low);
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert!(is_recoverable("Z999"));
        assert!(!requires_halt("Z999"));
    }

    #[test]
    fn test_severity_round_trip_names() {
        assert_eq!(Severity::from_str("High"), Some(Severity::High));
        assert_eq!(Severity::from_str("bogus"), None);
    }
}
