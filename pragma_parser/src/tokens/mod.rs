//! Token system
//!
//! - **[`Token`]** - host-language tokens plus the two pragma annotations
//! - **[`TokenStream`]** - cursor with bounded lookahead and one-token pushback
//! - **[`SpannedToken`]** - tokens with source location information
//!
//! A directive run always looks like
//! `PragmaStart <words, punctuation, literals...> PragmaEnd`; the parser treats
//! `PragmaEnd` as a sentinel it never reads past.

pub mod token;
pub mod token_stream;

pub use token::{classify_symbol, classify_word, Token, TokenClass};
pub use token_stream::{SpannedToken, TokenStream, TokenStreamBuilder, TokenStreamError};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
