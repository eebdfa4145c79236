//! Abstract syntax for parsed pragma directives

pub mod nodes;

pub use nodes::*;
