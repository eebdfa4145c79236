//! Parser for `#pragma omp` directives and their clauses
//!
//! Source text is lexed into a token stream in which every pragma line is an
//! annotated run; the syntax layer turns each run into a [`Directive`] and
//! reports malformed input through a diagnostics sink without stopping.

pub mod config;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use grammar::ast::{Clause, Directive};
pub use grammar::{ClauseKind, DirectiveKind};
pub use pipeline::{PipelineError, PragmaReport};
pub use syntax::{parse_pragmas, ParseOutcome, PragmaParser, SyntaxError};
