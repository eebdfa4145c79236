//! Host-language keywords
//!
//! Words reserved by the host language that can appear inside a pragma run
//! (`for`, `if`, `default`, `static`, `auto`, ...). The lexer classifies them
//! as keywords; the directive and clause resolvers only ever look at their
//! spelling, so `for` folds exactly like an identifier would.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Int,
    Long,
    Register,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
}

impl Keyword {
    /// Exact spelling as it appears in source
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Break => "break",
            Self::Case => "case",
            Self::Char => "char",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Default => "default",
            Self::Do => "do",
            Self::Double => "double",
            Self::Else => "else",
            Self::Enum => "enum",
            Self::Extern => "extern",
            Self::Float => "float",
            Self::For => "for",
            Self::Goto => "goto",
            Self::If => "if",
            Self::Int => "int",
            Self::Long => "long",
            Self::Register => "register",
            Self::Return => "return",
            Self::Short => "short",
            Self::Signed => "signed",
            Self::Sizeof => "sizeof",
            Self::Static => "static",
            Self::Struct => "struct",
            Self::Switch => "switch",
            Self::Typedef => "typedef",
            Self::Union => "union",
            Self::Unsigned => "unsigned",
            Self::Void => "void",
            Self::Volatile => "volatile",
            Self::While => "while",
        }
    }

    pub fn from_str(word: &str) -> Option<Self> {
        let keyword = match word {
            "auto" => Self::Auto,
            "break" => Self::Break,
            "case" => Self::Case,
            "char" => Self::Char,
            "const" => Self::Const,
            "continue" => Self::Continue,
            "default" => Self::Default,
            "do" => Self::Do,
            "double" => Self::Double,
            "else" => Self::Else,
            "enum" => Self::Enum,
            "extern" => Self::Extern,
            "float" => Self::Float,
            "for" => Self::For,
            "goto" => Self::Goto,
            "if" => Self::If,
            "int" => Self::Int,
            "long" => Self::Long,
            "register" => Self::Register,
            "return" => Self::Return,
            "short" => Self::Short,
            "signed" => Self::Signed,
            "sizeof" => Self::Sizeof,
            "static" => Self::Static,
            "struct" => Self::Struct,
            "switch" => Self::Switch,
            "typedef" => Self::Typedef,
            "union" => Self::Union,
            "unsigned" => Self::Unsigned,
            "void" => Self::Void,
            "volatile" => Self::Volatile,
            "while" => Self::While,
            _ => return None,
        };
        Some(keyword)
    }

    /// Keywords that introduce a statement with a parenthesised header and a body
    pub const fn starts_control_header(self) -> bool {
        matches!(self, Self::For | Self::If | Self::While | Self::Switch)
    }
}
