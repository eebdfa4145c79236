//! Directive keywords and keyword folding
//!
//! Most directives are a single word. Two-word directives (`cancellation
//! point`, `target data`) and combined constructs (`parallel for`, `for simd`,
//! ...) are produced by folding adjacent words through [`FOLD_TABLE`].
use crate::log_debug;
use crate::tokens::{Token, TokenStream};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    Parallel,
    Simd,
    For,
    Sections,
    Section,
    Single,
    Master,
    Critical,
    Task,
    Taskyield,
    Barrier,
    Taskwait,
    Taskgroup,
    Flush,
    Ordered,
    Atomic,
    Target,
    Teams,
    CancellationPoint,
    Cancel,
    TargetData,
    Taskloop,
    Distribute,
    Threadprivate,
    // Combined constructs, only reachable through folding
    ForSimd,
    ParallelFor,
    ParallelForSimd,
    ParallelSections,
    TaskloopSimd,
    Unknown,
}

impl DirectiveKind {
    /// Name as written in source, words separated by a space
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Simd => "simd",
            Self::For => "for",
            Self::Sections => "sections",
            Self::Section => "section",
            Self::Single => "single",
            Self::Master => "master",
            Self::Critical => "critical",
            Self::Task => "task",
            Self::Taskyield => "taskyield",
            Self::Barrier => "barrier",
            Self::Taskwait => "taskwait",
            Self::Taskgroup => "taskgroup",
            Self::Flush => "flush",
            Self::Ordered => "ordered",
            Self::Atomic => "atomic",
            Self::Target => "target",
            Self::Teams => "teams",
            Self::CancellationPoint => "cancellation point",
            Self::Cancel => "cancel",
            Self::TargetData => "target data",
            Self::Taskloop => "taskloop",
            Self::Distribute => "distribute",
            Self::Threadprivate => "threadprivate",
            Self::ForSimd => "for simd",
            Self::ParallelFor => "parallel for",
            Self::ParallelForSimd => "parallel for simd",
            Self::ParallelSections => "parallel sections",
            Self::TaskloopSimd => "taskloop simd",
            Self::Unknown => "unknown",
        }
    }

    /// Single-word lookup; multi-word and combined kinds never match a spelling
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "parallel" => Self::Parallel,
            "simd" => Self::Simd,
            "for" => Self::For,
            "sections" => Self::Sections,
            "section" => Self::Section,
            "single" => Self::Single,
            "master" => Self::Master,
            "critical" => Self::Critical,
            "task" => Self::Task,
            "taskyield" => Self::Taskyield,
            "barrier" => Self::Barrier,
            "taskwait" => Self::Taskwait,
            "taskgroup" => Self::Taskgroup,
            "flush" => Self::Flush,
            "ordered" => Self::Ordered,
            "atomic" => Self::Atomic,
            "target" => Self::Target,
            "teams" => Self::Teams,
            "cancel" => Self::Cancel,
            "taskloop" => Self::Taskloop,
            "distribute" => Self::Distribute,
            "threadprivate" => Self::Threadprivate,
            _ => Self::Unknown,
        }
    }

    /// Directives that never take an associated statement
    pub const fn is_standalone(self) -> bool {
        matches!(
            self,
            Self::Barrier
                | Self::Taskyield
                | Self::Taskwait
                | Self::CancellationPoint
                | Self::Cancel
                | Self::Flush
        )
    }

    pub const fn is_combined(self) -> bool {
        matches!(
            self,
            Self::ForSimd
                | Self::ParallelFor
                | Self::ParallelForSimd
                | Self::ParallelSections
                | Self::TaskloopSimd
        )
    }

    /// Constructs that `cancel` and `cancellation point` may name
    pub const fn is_cancellation_region(self) -> bool {
        matches!(
            self,
            Self::Parallel | Self::For | Self::Sections | Self::Taskgroup
        )
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a fold rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldWord {
    /// Matches a token that resolves to this kind
    Kind(DirectiveKind),
    /// Matches a word that is not itself a directive, by spelling
    Spelling(&'static str),
}

impl FoldWord {
    fn matches(self, token: &Token, resolved: DirectiveKind) -> bool {
        match self {
            Self::Kind(kind) => resolved != DirectiveKind::Unknown && resolved == kind,
            Self::Spelling(word) => resolved == DirectiveKind::Unknown && token.is_word(word),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldRule {
    pub first: FoldWord,
    pub second: FoldWord,
    pub combined: DirectiveKind,
}

const fn rule(first: FoldWord, second: FoldWord, combined: DirectiveKind) -> FoldRule {
    FoldRule {
        first,
        second,
        combined,
    }
}

/// Rules are tried once each, in order; a rule may take the result of an
/// earlier rule as its first word.
pub const FOLD_TABLE: [FoldRule; 7] = [
    rule(
        FoldWord::Spelling("cancellation"),
        FoldWord::Spelling("point"),
        DirectiveKind::CancellationPoint,
    ),
    rule(
        FoldWord::Kind(DirectiveKind::Target),
        FoldWord::Spelling("data"),
        DirectiveKind::TargetData,
    ),
    rule(
        FoldWord::Kind(DirectiveKind::For),
        FoldWord::Kind(DirectiveKind::Simd),
        DirectiveKind::ForSimd,
    ),
    rule(
        FoldWord::Kind(DirectiveKind::Parallel),
        FoldWord::Kind(DirectiveKind::For),
        DirectiveKind::ParallelFor,
    ),
    rule(
        FoldWord::Kind(DirectiveKind::ParallelFor),
        FoldWord::Kind(DirectiveKind::Simd),
        DirectiveKind::ParallelForSimd,
    ),
    rule(
        FoldWord::Kind(DirectiveKind::Parallel),
        FoldWord::Kind(DirectiveKind::Sections),
        DirectiveKind::ParallelSections,
    ),
    rule(
        FoldWord::Kind(DirectiveKind::Taskloop),
        FoldWord::Kind(DirectiveKind::Simd),
        DirectiveKind::TaskloopSimd,
    ),
];

fn resolve_token(token: &Token) -> DirectiveKind {
    if token.is_annotation() {
        return DirectiveKind::Unknown;
    }
    token
        .spelling()
        .map(DirectiveKind::from_spelling)
        .unwrap_or(DirectiveKind::Unknown)
}

/// Resolve the directive keyword at the cursor.
///
/// Every folded word except the last is consumed; the last keyword of the
/// directive name stays current so the caller consumes it. A following word
/// that does not fold is left untouched.
pub fn resolve_directive_kind(tokens: &mut TokenStream) -> DirectiveKind {
    let Some(first) = tokens.current_token().cloned() else {
        return DirectiveKind::Unknown;
    };

    let mut kind = resolve_token(&first);
    let mut current = first;

    for fold in FOLD_TABLE.iter() {
        if !fold.first.matches(&current, kind) {
            continue;
        }

        let Some(next) = tokens.peek_token(1).cloned() else {
            continue;
        };
        let next_kind = resolve_token(&next);

        if fold.second.matches(&next, next_kind) {
            tokens.advance();
            log_debug!("Folded directive keywords",
                "first" => kind.as_str(),
                "combined" => fold.combined.as_str()
            );
            kind = fold.combined;
            current = next;
        }
    }

    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenStreamBuilder;

    fn words(list: &[&str]) -> TokenStream {
        let mut builder = TokenStreamBuilder::new();
        for word in list {
            builder = builder.push_word(word);
        }
        builder.push_token(Token::PragmaEnd, "\n").build()
    }

    #[test]
    fn test_single_keyword() {
        let mut tokens = words(&["parallel", "num_threads"]);
        assert_eq!(resolve_directive_kind(&mut tokens), DirectiveKind::Parallel);
        assert!(tokens.check_word("parallel"));
    }

    #[test]
    fn test_fold_chain_parallel_for_simd() {
        let mut tokens = words(&["parallel", "for", "simd", "private"]);
        assert_eq!(
            resolve_directive_kind(&mut tokens),
            DirectiveKind::ParallelForSimd
        );
        assert!(tokens.check_word("simd"));
        assert_eq!(tokens.position(), 2);
    }

    #[test]
    fn test_all_two_word_folds() {
        let cases = [
            (["parallel", "for"], DirectiveKind::ParallelFor),
            (["parallel", "sections"], DirectiveKind::ParallelSections),
            (["for", "simd"], DirectiveKind::ForSimd),
            (["taskloop", "simd"], DirectiveKind::TaskloopSimd),
            (["target", "data"], DirectiveKind::TargetData),
            (["cancellation", "point"], DirectiveKind::CancellationPoint),
        ];
        for (input, expected) in cases {
            let mut tokens = words(&input);
            assert_eq!(resolve_directive_kind(&mut tokens), expected);
            assert!(tokens.check_word(input[1]));
        }
    }

    #[test]
    fn test_unfolded_second_word_is_left() {
        let mut tokens = words(&["target", "map"]);
        assert_eq!(resolve_directive_kind(&mut tokens), DirectiveKind::Target);
        assert!(tokens.check_word("target"));

        let mut tokens = words(&["parallel", "simd"]);
        assert_eq!(resolve_directive_kind(&mut tokens), DirectiveKind::Parallel);
        assert_eq!(tokens.position(), 0);
    }

    #[test]
    fn test_cancellation_alone_is_unknown() {
        let mut tokens = words(&["cancellation", "parallel"]);
        assert_eq!(resolve_directive_kind(&mut tokens), DirectiveKind::Unknown);
        assert_eq!(tokens.position(), 0);
    }

    #[test]
    fn test_combined_kinds_have_no_spelling() {
        assert_eq!(
            DirectiveKind::from_spelling("parallel_for"),
            DirectiveKind::Unknown
        );
        assert_eq!(
            DirectiveKind::from_spelling("cancellation"),
            DirectiveKind::Unknown
        );
        assert!(DirectiveKind::ParallelFor.is_combined());
        assert!(DirectiveKind::Flush.is_standalone());
        assert!(!DirectiveKind::Ordered.is_standalone());
    }

    #[test]
    fn test_annotation_is_unknown() {
        let mut tokens = TokenStreamBuilder::new()
            .push_token(Token::PragmaEnd, "\n")
            .build();
        assert_eq!(resolve_directive_kind(&mut tokens), DirectiveKind::Unknown);
    }
}
