//! Grammar tables and syntax tree for pragma directives

pub mod ast;
pub mod clauses;
pub mod directives;
pub mod keywords;

pub use ast::*;
pub use clauses::{
    allowed_clauses, is_allowed_clause, ClauseKind, ClauseShape, DefaultKind, DependKind,
    LinearModifier, MapType, ProcBindKind, ScheduleKind, ScheduleModifier,
};
pub use directives::{resolve_directive_kind, DirectiveKind, FoldRule, FoldWord, FOLD_TABLE};
pub use keywords::Keyword;
