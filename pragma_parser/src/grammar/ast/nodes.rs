//! Parsed directive nodes
//!
//! A [`Directive`] is built fresh for each pragma run and filled left to
//! right. Expressions and statements are produced by the expression and
//! statement collaborators and are opaque to the directive grammar beyond the
//! small classification in [`ExprKind`].

use crate::grammar::clauses::{
    ClauseKind, DefaultKind, DependKind, LinearModifier, MapType, ProcBindKind, ScheduleKind,
    ScheduleModifier,
};
use crate::grammar::directives::DirectiveKind;
use crate::tokens::Token;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Identifier = String;

/// Possibly qualified name, `a` or `ns::a`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    pub segments: Vec<Identifier>,
}

impl QualifiedName {
    pub fn simple(name: impl Into<Identifier>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }

    /// Last segment
    pub fn base_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("::"))
    }
}

// === EXPRESSIONS AND STATEMENTS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ExprKind {
    Integer(i64),
    Name(QualifiedName),
    /// Any other expression, kept as normalised source text
    Compound(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn name(name: QualifiedName, span: Span) -> Self {
        Self::new(ExprKind::Name(name), span)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.kind {
            ExprKind::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&QualifiedName> {
        match &self.kind {
            ExprKind::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Integer(value) => write!(f, "{}", value),
            ExprKind::Name(name) => write!(f, "{}", name),
            ExprKind::Compound(text) => f.write_str(text),
        }
    }
}

/// Statement associated with a directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Reconstructed source text, when capture is enabled
    pub text: Option<String>,
    pub token_count: usize,
    /// Pragma runs nested inside the statement
    pub nested_pragmas: usize,
    pub span: Span,
}

// === CLAUSE ARGUMENTS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionOperator {
    Add,
    Subtract,
    Multiply,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
}

impl ReductionOperator {
    pub fn from_token(token: &Token) -> Option<Self> {
        let op = match token {
            Token::Plus => Self::Add,
            Token::Minus => Self::Subtract,
            Token::Star => Self::Multiply,
            Token::Amp => Self::BitAnd,
            Token::Pipe => Self::BitOr,
            Token::Caret => Self::BitXor,
            Token::AmpAmp => Self::LogicalAnd,
            Token::PipePipe => Self::LogicalOr,
            _ => return None,
        };
        Some(op)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ReductionIdentifier {
    Operator(ReductionOperator),
    Name(QualifiedName),
}

impl fmt::Display for ReductionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator(op) => f.write_str(op.as_str()),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SimpleValue {
    Default(DefaultKind),
    ProcBind(ProcBindKind),
}

/// Leading argument of a `schedule` or `if` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClauseArgument {
    Schedule(ScheduleKind),
    /// Directive named before `:` in `if`, absent when not written
    NameModifier(Option<DirectiveKind>),
}

// === CLAUSES ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarListClause {
    pub kind: ClauseKind,
    pub vars: Vec<Expr>,
    /// Linear step or alignment after `:`
    pub tail_expr: Option<Expr>,
    pub reduction_id: Option<ReductionIdentifier>,
    pub dependence_kind: Option<DependKind>,
    pub linear_modifier: Option<LinearModifier>,
    pub map_type: Option<MapType>,
    pub map_type_modifier: Option<MapType>,
    pub span: Span,
}

impl VarListClause {
    pub fn new(kind: ClauseKind, span: Span) -> Self {
        Self {
            kind,
            vars: Vec::new(),
            tail_expr: None,
            reduction_id: None,
            dependence_kind: None,
            linear_modifier: (kind == ClauseKind::Linear).then_some(LinearModifier::Val),
            map_type: None,
            map_type_modifier: None,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Clause {
    SingleExpr {
        kind: ClauseKind,
        expr: Expr,
        span: Span,
    },
    Simple {
        kind: ClauseKind,
        value: SimpleValue,
        value_span: Span,
        span: Span,
    },
    SingleExprWithArg {
        kind: ClauseKind,
        modifiers: [Option<ScheduleModifier>; 2],
        modifier_spans: [Option<Span>; 2],
        arg: ClauseArgument,
        arg_span: Option<Span>,
        /// Chunk size for schedule, condition for if
        expr: Option<Expr>,
        span: Span,
    },
    VarList(VarListClause),
    Flag {
        kind: ClauseKind,
        span: Span,
    },
}

impl Clause {
    pub fn kind(&self) -> ClauseKind {
        match self {
            Self::SingleExpr { kind, .. }
            | Self::Simple { kind, .. }
            | Self::SingleExprWithArg { kind, .. }
            | Self::Flag { kind, .. } => *kind,
            Self::VarList(list) => list.kind,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::SingleExpr { span, .. }
            | Self::Simple { span, .. }
            | Self::SingleExprWithArg { span, .. }
            | Self::Flag { span, .. } => *span,
            Self::VarList(list) => list.span,
        }
    }

    pub fn as_var_list(&self) -> Option<&VarListClause> {
        match self {
            Self::VarList(list) => Some(list),
            _ => None,
        }
    }

    /// Expression of a single-expression clause
    pub fn single_expr(&self) -> Option<&Expr> {
        match self {
            Self::SingleExpr { expr, .. } => Some(expr),
            _ => None,
        }
    }
}

// === DIRECTIVE ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// `critical (name)` only
    pub name: Option<Identifier>,
    /// Region named by `cancel` and `cancellation point`
    pub cancel_region: Option<DirectiveKind>,
    pub clauses: Vec<Clause>,
    pub has_associated_statement: bool,
    pub associated_statement: Option<Statement>,
    pub span: Span,
}

impl Directive {
    pub fn new(kind: DirectiveKind, span: Span) -> Self {
        Self {
            kind,
            name: None,
            cancel_region: None,
            clauses: Vec::new(),
            has_associated_statement: !kind.is_standalone() && kind != DirectiveKind::Threadprivate,
            associated_statement: None,
            span,
        }
    }

    /// First clause of a kind
    pub fn clause(&self, kind: ClauseKind) -> Option<&Clause> {
        self.clauses.iter().find(|clause| clause.kind() == kind)
    }

    pub fn clauses_of(&self, kind: ClauseKind) -> impl Iterator<Item = &Clause> {
        self.clauses
            .iter()
            .filter(move |clause| clause.kind() == kind)
    }

    /// One-line description used in logs and CLI output
    pub fn summary(&self) -> String {
        let clauses: Vec<&str> = self.clauses.iter().map(|c| c.kind().as_str()).collect();
        let mut summary = self.kind.as_str().to_string();
        if let Some(name) = &self.name {
            summary.push_str(&format!(" ({})", name));
        }
        if let Some(region) = self.cancel_region {
            summary.push_str(&format!(" {}", region));
        }
        if !clauses.is_empty() {
            summary.push_str(&format!(" [{}]", clauses.join(", ")));
        }
        summary
    }
}
