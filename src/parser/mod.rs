//! Parser for engine command scripts

mod grammar;
pub mod lexer;

pub use grammar::parse;
pub use lexer::Span;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}
