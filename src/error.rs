//! Error types for parsing command scripts

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::{Span, Token};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);

                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::Custom(msg) => msg.to_string(),
            _ => match err.found() {
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of input".to_string(),
            },
        };

        // Format expected tokens nicely
        let mut expected: Vec<String> = err
            .expected()
            .filter_map(|e| {
                #[allow(unreachable_patterns)]
                match e {
                    RichPattern::Token(tok) => Some(format_token(tok)),
                    RichPattern::Label(label) => Some(label.to_string()),
                    RichPattern::EndOfInput => Some("end of input".to_string()),
                    _ => None,
                }
            })
            .collect();
        expected.dedup();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Word(s) => format!("word '{}'", s),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::Hide => "command 'hide'".to_string(),
        Token::Show => "command 'show'".to_string(),
        Token::SetColor => "command 'set_color'".to_string(),
        Token::Color => "command 'color'".to_string(),
        Token::Set => "command 'set'".to_string(),
        Token::BgColor => "command 'bg_color'".to_string(),
        Token::Ray => "command 'ray'".to_string(),
        Token::Png => "command 'png'".to_string(),
        Token::Newline => "newline".to_string(),
        Token::Semicolon => "';'".to_string(),
        Token::Less => "'<'".to_string(),
        Token::LessOrEqual => "'<='".to_string(),
        Token::Greater => "'>'".to_string(),
        Token::GreaterOrEqual => "'>='".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Error => "invalid input".to_string(),
    }
}
