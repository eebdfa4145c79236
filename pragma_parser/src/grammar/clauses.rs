//! Clause kinds, per-directive legality and enumerator tables
use super::directives::DirectiveKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    If,
    Final,
    NumThreads,
    Safelen,
    Simdlen,
    Collapse,
    Ordered,
    Device,
    NumTeams,
    ThreadLimit,
    Priority,
    Grainsize,
    NumTasks,
    Hint,
    Default,
    ProcBind,
    Schedule,
    Nowait,
    Untied,
    Mergeable,
    Read,
    Write,
    Update,
    Capture,
    SeqCst,
    Threads,
    Simd,
    Nogroup,
    Private,
    Firstprivate,
    Lastprivate,
    Shared,
    Linear,
    Aligned,
    Copyin,
    Copyprivate,
    Flush,
    Reduction,
    Depend,
    Map,
    Threadprivate,
    Unknown,
}

/// Argument grammar a clause kind is parsed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseShape {
    /// `( expression )`
    SingleExpr,
    /// `( enumerator )`
    Simple,
    /// `schedule(...)` and `if(...)`
    SingleExprWithArg,
    /// `( list )` with optional prefix and tail
    VarList,
    /// No argument
    Flag,
    /// Not spellable as a clause
    None,
}

impl ClauseKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Final => "final",
            Self::NumThreads => "num_threads",
            Self::Safelen => "safelen",
            Self::Simdlen => "simdlen",
            Self::Collapse => "collapse",
            Self::Ordered => "ordered",
            Self::Device => "device",
            Self::NumTeams => "num_teams",
            Self::ThreadLimit => "thread_limit",
            Self::Priority => "priority",
            Self::Grainsize => "grainsize",
            Self::NumTasks => "num_tasks",
            Self::Hint => "hint",
            Self::Default => "default",
            Self::ProcBind => "proc_bind",
            Self::Schedule => "schedule",
            Self::Nowait => "nowait",
            Self::Untied => "untied",
            Self::Mergeable => "mergeable",
            Self::Read => "read",
            Self::Write => "write",
            Self::Update => "update",
            Self::Capture => "capture",
            Self::SeqCst => "seq_cst",
            Self::Threads => "threads",
            Self::Simd => "simd",
            Self::Nogroup => "nogroup",
            Self::Private => "private",
            Self::Firstprivate => "firstprivate",
            Self::Lastprivate => "lastprivate",
            Self::Shared => "shared",
            Self::Linear => "linear",
            Self::Aligned => "aligned",
            Self::Copyin => "copyin",
            Self::Copyprivate => "copyprivate",
            Self::Flush => "flush",
            Self::Reduction => "reduction",
            Self::Depend => "depend",
            Self::Map => "map",
            Self::Threadprivate => "threadprivate",
            Self::Unknown => "unknown",
        }
    }

    /// Spelling lookup. `flush` and `threadprivate` are pseudo-clauses and
    /// never resolve from a spelling.
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "if" => Self::If,
            "final" => Self::Final,
            "num_threads" => Self::NumThreads,
            "safelen" => Self::Safelen,
            "simdlen" => Self::Simdlen,
            "collapse" => Self::Collapse,
            "ordered" => Self::Ordered,
            "device" => Self::Device,
            "num_teams" => Self::NumTeams,
            "thread_limit" => Self::ThreadLimit,
            "priority" => Self::Priority,
            "grainsize" => Self::Grainsize,
            "num_tasks" => Self::NumTasks,
            "hint" => Self::Hint,
            "default" => Self::Default,
            "proc_bind" => Self::ProcBind,
            "schedule" => Self::Schedule,
            "nowait" => Self::Nowait,
            "untied" => Self::Untied,
            "mergeable" => Self::Mergeable,
            "read" => Self::Read,
            "write" => Self::Write,
            "update" => Self::Update,
            "capture" => Self::Capture,
            "seq_cst" => Self::SeqCst,
            "threads" => Self::Threads,
            "simd" => Self::Simd,
            "nogroup" => Self::Nogroup,
            "private" => Self::Private,
            "firstprivate" => Self::Firstprivate,
            "lastprivate" => Self::Lastprivate,
            "shared" => Self::Shared,
            "linear" => Self::Linear,
            "aligned" => Self::Aligned,
            "copyin" => Self::Copyin,
            "copyprivate" => Self::Copyprivate,
            "reduction" => Self::Reduction,
            "depend" => Self::Depend,
            "map" => Self::Map,
            _ => Self::Unknown,
        }
    }

    /// Argument grammar; `ordered` is SingleExpr only when `(` follows
    pub const fn shape(self) -> ClauseShape {
        match self {
            Self::Final
            | Self::NumThreads
            | Self::Safelen
            | Self::Simdlen
            | Self::Collapse
            | Self::Device
            | Self::NumTeams
            | Self::ThreadLimit
            | Self::Priority
            | Self::Grainsize
            | Self::NumTasks
            | Self::Hint => ClauseShape::SingleExpr,
            Self::Default | Self::ProcBind => ClauseShape::Simple,
            Self::Schedule | Self::If => ClauseShape::SingleExprWithArg,
            Self::Private
            | Self::Firstprivate
            | Self::Lastprivate
            | Self::Shared
            | Self::Linear
            | Self::Aligned
            | Self::Copyin
            | Self::Copyprivate
            | Self::Flush
            | Self::Reduction
            | Self::Depend
            | Self::Map => ClauseShape::VarList,
            Self::Ordered
            | Self::Nowait
            | Self::Untied
            | Self::Mergeable
            | Self::Read
            | Self::Write
            | Self::Update
            | Self::Capture
            | Self::SeqCst
            | Self::Threads
            | Self::Simd
            | Self::Nogroup => ClauseShape::Flag,
            Self::Threadprivate | Self::Unknown => ClauseShape::None,
        }
    }

    /// Kinds that may appear at most once per directive
    pub const fn is_unique(self) -> bool {
        matches!(
            self,
            Self::Final
                | Self::NumThreads
                | Self::Safelen
                | Self::Simdlen
                | Self::Collapse
                | Self::Ordered
                | Self::Device
                | Self::NumTeams
                | Self::ThreadLimit
                | Self::Priority
                | Self::Grainsize
                | Self::NumTasks
                | Self::Hint
                | Self::Default
                | Self::ProcBind
                | Self::Schedule
                | Self::Nowait
                | Self::Untied
                | Self::Mergeable
                | Self::Read
                | Self::Write
                | Self::Update
                | Self::Capture
                | Self::SeqCst
                | Self::Threads
                | Self::Simd
                | Self::Nogroup
        )
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use ClauseKind as C;

const PARALLEL: &[ClauseKind] = &[
    C::If,
    C::NumThreads,
    C::Default,
    C::ProcBind,
    C::Private,
    C::Firstprivate,
    C::Shared,
    C::Reduction,
    C::Copyin,
];
const SIMD: &[ClauseKind] = &[
    C::Private,
    C::Lastprivate,
    C::Linear,
    C::Aligned,
    C::Safelen,
    C::Simdlen,
    C::Collapse,
    C::Reduction,
];
const FOR: &[ClauseKind] = &[
    C::Private,
    C::Lastprivate,
    C::Firstprivate,
    C::Reduction,
    C::Collapse,
    C::Schedule,
    C::Ordered,
    C::Nowait,
    C::Linear,
];
const FOR_SIMD: &[ClauseKind] = &[
    C::Private,
    C::Firstprivate,
    C::Lastprivate,
    C::Reduction,
    C::Schedule,
    C::Collapse,
    C::Nowait,
    C::Safelen,
    C::Simdlen,
    C::Linear,
    C::Aligned,
];
const SECTIONS: &[ClauseKind] = &[
    C::Private,
    C::Lastprivate,
    C::Firstprivate,
    C::Reduction,
    C::Nowait,
];
const SINGLE: &[ClauseKind] = &[C::Private, C::Firstprivate, C::Copyprivate, C::Nowait];
const PARALLEL_FOR: &[ClauseKind] = &[
    C::If,
    C::NumThreads,
    C::Default,
    C::ProcBind,
    C::Private,
    C::Firstprivate,
    C::Shared,
    C::Reduction,
    C::Copyin,
    C::Lastprivate,
    C::Collapse,
    C::Schedule,
    C::Ordered,
    C::Linear,
];
const PARALLEL_FOR_SIMD: &[ClauseKind] = &[
    C::If,
    C::NumThreads,
    C::Default,
    C::ProcBind,
    C::Private,
    C::Firstprivate,
    C::Shared,
    C::Reduction,
    C::Copyin,
    C::Lastprivate,
    C::Collapse,
    C::Schedule,
    C::Safelen,
    C::Simdlen,
    C::Linear,
    C::Aligned,
];
const PARALLEL_SECTIONS: &[ClauseKind] = &[
    C::If,
    C::NumThreads,
    C::Default,
    C::ProcBind,
    C::Private,
    C::Firstprivate,
    C::Shared,
    C::Reduction,
    C::Copyin,
    C::Lastprivate,
];
const TASK: &[ClauseKind] = &[
    C::If,
    C::Final,
    C::Default,
    C::Private,
    C::Firstprivate,
    C::Shared,
    C::Untied,
    C::Mergeable,
    C::Depend,
    C::Priority,
];
const ATOMIC: &[ClauseKind] = &[C::Read, C::Write, C::Update, C::Capture, C::SeqCst];
const TARGET: &[ClauseKind] = &[C::If, C::Device, C::Map];
const TEAMS: &[ClauseKind] = &[
    C::Default,
    C::Private,
    C::Firstprivate,
    C::Shared,
    C::Reduction,
    C::NumTeams,
    C::ThreadLimit,
];
const ORDERED: &[ClauseKind] = &[C::Threads, C::Simd, C::Depend];
const TASKLOOP: &[ClauseKind] = &[
    C::If,
    C::Shared,
    C::Private,
    C::Firstprivate,
    C::Lastprivate,
    C::Default,
    C::Collapse,
    C::Final,
    C::Untied,
    C::Mergeable,
    C::Priority,
    C::Grainsize,
    C::Nogroup,
    C::NumTasks,
];
const TASKLOOP_SIMD: &[ClauseKind] = &[
    C::If,
    C::Shared,
    C::Private,
    C::Firstprivate,
    C::Lastprivate,
    C::Default,
    C::Collapse,
    C::Final,
    C::Untied,
    C::Mergeable,
    C::Priority,
    C::Linear,
    C::Aligned,
    C::Safelen,
    C::Simdlen,
    C::Grainsize,
    C::Nogroup,
    C::NumTasks,
];
const DISTRIBUTE: &[ClauseKind] = &[C::Private, C::Firstprivate, C::Lastprivate, C::Collapse];
const CRITICAL: &[ClauseKind] = &[C::Hint];
const FLUSH: &[ClauseKind] = &[C::Flush];
const CANCEL: &[ClauseKind] = &[C::If];
const NONE: &[ClauseKind] = &[];

/// Clause kinds legal on a directive
pub fn allowed_clauses(directive: DirectiveKind) -> &'static [ClauseKind] {
    match directive {
        DirectiveKind::Parallel => PARALLEL,
        DirectiveKind::Simd => SIMD,
        DirectiveKind::For => FOR,
        DirectiveKind::ForSimd => FOR_SIMD,
        DirectiveKind::Sections => SECTIONS,
        DirectiveKind::Single => SINGLE,
        DirectiveKind::ParallelFor => PARALLEL_FOR,
        DirectiveKind::ParallelForSimd => PARALLEL_FOR_SIMD,
        DirectiveKind::ParallelSections => PARALLEL_SECTIONS,
        DirectiveKind::Task => TASK,
        DirectiveKind::Atomic => ATOMIC,
        DirectiveKind::Target | DirectiveKind::TargetData => TARGET,
        DirectiveKind::Teams => TEAMS,
        DirectiveKind::Ordered => ORDERED,
        DirectiveKind::Taskloop => TASKLOOP,
        DirectiveKind::TaskloopSimd => TASKLOOP_SIMD,
        DirectiveKind::Distribute => DISTRIBUTE,
        DirectiveKind::Critical => CRITICAL,
        DirectiveKind::Flush => FLUSH,
        DirectiveKind::Cancel => CANCEL,
        DirectiveKind::Section
        | DirectiveKind::Master
        | DirectiveKind::Taskyield
        | DirectiveKind::Barrier
        | DirectiveKind::Taskwait
        | DirectiveKind::Taskgroup
        | DirectiveKind::CancellationPoint
        | DirectiveKind::Threadprivate
        | DirectiveKind::Unknown => NONE,
    }
}

pub fn is_allowed_clause(directive: DirectiveKind, clause: ClauseKind) -> bool {
    allowed_clauses(directive).contains(&clause)
}

// === ENUMERATOR TABLES ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultKind {
    None,
    Shared,
    Unknown,
}

impl DefaultKind {
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "none" => Self::None,
            "shared" => Self::Shared,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcBindKind {
    Master,
    Close,
    Spread,
    Unknown,
}

impl ProcBindKind {
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "master" => Self::Master,
            "close" => Self::Close,
            "spread" => Self::Spread,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Static,
    Dynamic,
    Guided,
    Auto,
    Runtime,
    Unknown,
}

impl ScheduleKind {
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "static" => Self::Static,
            "dynamic" => Self::Dynamic,
            "guided" => Self::Guided,
            "auto" => Self::Auto,
            "runtime" => Self::Runtime,
            _ => Self::Unknown,
        }
    }

    /// Kinds that accept a `, chunk` expression
    pub const fn takes_chunk(self) -> bool {
        matches!(self, Self::Static | Self::Dynamic | Self::Guided)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleModifier {
    Monotonic,
    Nonmonotonic,
    Simd,
    Unknown,
}

impl ScheduleModifier {
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "monotonic" => Self::Monotonic,
            "nonmonotonic" => Self::Nonmonotonic,
            "simd" => Self::Simd,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependKind {
    In,
    Out,
    Inout,
    Source,
    Unknown,
}

impl DependKind {
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "in" => Self::In,
            "out" => Self::Out,
            "inout" => Self::Inout,
            "source" => Self::Source,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearModifier {
    Val,
    Ref,
    Uval,
    Unknown,
}

impl LinearModifier {
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "val" => Self::Val,
            "ref" => Self::Ref,
            "uval" => Self::Uval,
            _ => Self::Unknown,
        }
    }
}

/// Map types; `always` shares the table because it is spelled in the same slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    Alloc,
    To,
    From,
    Tofrom,
    Delete,
    Release,
    Always,
    Unknown,
}

impl MapType {
    pub fn from_spelling(word: &str) -> Self {
        match word {
            "alloc" => Self::Alloc,
            "to" => Self::To,
            "from" => Self::From,
            "tofrom" => Self::Tofrom,
            "delete" => Self::Delete,
            "release" => Self::Release,
            "always" => Self::Always,
            _ => Self::Unknown,
        }
    }

    /// A resolved map type usable in the type slot
    pub const fn is_type(self) -> bool {
        !matches!(self, Self::Always | Self::Unknown)
    }
}
