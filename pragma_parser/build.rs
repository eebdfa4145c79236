// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    logging: LoggingLimits,
    pipeline: PipelineLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_string_size: usize,
    max_identifier_length: usize,
    max_comment_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_error_history: usize,
    max_context_stack_depth: usize,
    max_recovery_scan_tokens: usize,
    max_lookahead_tokens: usize,
    max_clauses_per_directive: usize,
    max_list_items: usize,
    max_statement_nesting_depth: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_source: usize,
    security_min_log_level: u8,
}

#[derive(serde::Deserialize)]
struct PipelineLimits {
    max_source_size: u64,
    max_directives_per_source: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PRAGMA_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=PRAGMA_CONFIG_DIR");

    let profile = env::var("PRAGMA_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("PRAGMA_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of pragma_parser directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_security_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_security_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_SOURCE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_RECOVERY_SCAN: usize = 1_000_000;
    const ABSOLUTE_MAX_STATEMENT_NESTING: usize = 4096;

    if config.pipeline.max_source_size > ABSOLUTE_MAX_SOURCE_SIZE {
        panic!("SECURITY: max_source_size exceeds absolute maximum");
    }

    if config.syntax.max_recovery_scan_tokens > ABSOLUTE_MAX_RECOVERY_SCAN {
        panic!("SECURITY: max_recovery_scan_tokens exceeds absolute maximum");
    }

    // map(always, to: x) needs three tokens of lookahead past the current one
    if config.syntax.max_lookahead_tokens < 3 {
        panic!("SYNTAX: max_lookahead_tokens must be at least 3");
    }

    if config.syntax.max_clauses_per_directive == 0 || config.syntax.max_list_items == 0 {
        panic!("SYNTAX: clause and list limits must be non-zero");
    }

    if config.syntax.max_statement_nesting_depth == 0
        || config.syntax.max_statement_nesting_depth > ABSOLUTE_MAX_STATEMENT_NESTING
    {
        panic!("SECURITY: max_statement_nesting_depth must be between 1 and 4096");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" {
        if config.pipeline.max_source_size > 50_000_000 {
            panic!("PRODUCTION: max_source_size too high for production");
        }
        if config.lexical.max_token_count > 5_000_000 {
            panic!("PRODUCTION: max_token_count too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_COMMENT_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_ERROR_HISTORY: usize = {};
        pub const MAX_CONTEXT_STACK_DEPTH: usize = {};
        pub const MAX_RECOVERY_SCAN_TOKENS: usize = {};
        pub const MAX_LOOKAHEAD_TOKENS: usize = {};
        pub const MAX_CLAUSES_PER_DIRECTIVE: usize = {};
        pub const MAX_LIST_ITEMS: usize = {};
        pub const MAX_STATEMENT_NESTING_DEPTH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_SOURCE: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}

    pub mod pipeline {{
        pub const MAX_SOURCE_SIZE: u64 = {};
        pub const MAX_DIRECTIVES_PER_SOURCE: usize = {};
    }}
}}
"#,
        profile,
        // Lexical
        config.lexical.max_string_size,
        config.lexical.max_identifier_length,
        config.lexical.max_comment_length,
        config.lexical.max_token_count,
        // Syntax
        config.syntax.max_error_history,
        config.syntax.max_context_stack_depth,
        config.syntax.max_recovery_scan_tokens,
        config.syntax.max_lookahead_tokens,
        config.syntax.max_clauses_per_directive,
        config.syntax.max_list_items,
        config.syntax.max_statement_nesting_depth,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_source,
        config.logging.security_min_log_level,
        // Pipeline
        config.pipeline.max_source_size,
        config.pipeline.max_directives_per_source,
    );

    fs::write(output_path, constants_code).unwrap();
}
