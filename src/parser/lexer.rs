//! Lexer for command scripts using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+|#[^\n]*")]
pub enum Token {
    // Commands
    #[token("hide")]
    Hide,
    #[token("show")]
    Show,
    #[token("set_color")]
    SetColor,
    #[token("color")]
    Color,
    #[token("set")]
    Set,
    #[token("bg_color")]
    BgColor,
    #[token("ray")]
    Ray,
    #[token("png")]
    Png,

    // Statement separators
    #[token("\n")]
    Newline,
    #[token(";")]
    Semicolon,

    // Comparison operators (longer first)
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Delimiters
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,

    // Literals - words must come after commands. A word needs at least one
    // letter so plain numbers lex as numbers, while file names such as
    // 1abc.png stay in one piece.
    #[regex(r"[A-Za-z0-9_./\-]*[A-Za-z_][A-Za-z0-9_./\-]*", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),

    #[regex(r#""([^"\\]|\\.)*""#, unescape)]
    String(String),

    #[regex(r"-?([0-9]+(\.[0-9]+)?|\.[0-9]+)", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// Input the lexer could not match
    Error,
}

/// Strip the quotes of a string literal and resolve `\"` and `\\` escapes
fn unescape(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let mut out = String::with_capacity(slice.len());
    let mut chars = slice[1..slice.len() - 1].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Lex input string into tokens with spans
///
/// Unrecognized input becomes [`Token::Error`] so the parser reports it
/// instead of silently dropping it.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Error), span))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_command_keywords() {
        assert_eq!(
            tokens("hide show set_color color set bg_color ray png"),
            vec![
                Token::Hide,
                Token::Show,
                Token::SetColor,
                Token::Color,
                Token::Set,
                Token::BgColor,
                Token::Ray,
                Token::Png
            ]
        );
    }

    #[test]
    fn test_color_rule() {
        assert_eq!(
            tokens("color n0, b < 100; color n1, b <= 90"),
            vec![
                Token::Color,
                Token::Word("n0".to_string()),
                Token::Comma,
                Token::Word("b".to_string()),
                Token::Less,
                Token::Number(100.0),
                Token::Semicolon,
                Token::Color,
                Token::Word("n1".to_string()),
                Token::Comma,
                Token::Word("b".to_string()),
                Token::LessOrEqual,
                Token::Number(90.0),
            ]
        );
    }

    #[test]
    fn test_file_names_stay_whole() {
        assert_eq!(
            tokens("png FOXG_07142.png, dpi=300"),
            vec![
                Token::Png,
                Token::Word("FOXG_07142.png".to_string()),
                Token::Comma,
                Token::Word("dpi".to_string()),
                Token::Equals,
                Token::Number(300.0),
            ]
        );
        assert_eq!(tokens("1sj1.png"), vec![Token::Word("1sj1.png".to_string())]);
    }

    #[test]
    fn test_numbers_and_vectors() {
        assert_eq!(
            tokens("[0.051, -0.5, .25]"),
            vec![
                Token::BracketOpen,
                Token::Number(0.051),
                Token::Comma,
                Token::Number(-0.5),
                Token::Comma,
                Token::Number(0.25),
                Token::BracketClose,
            ]
        );
    }

    #[test]
    fn test_comments_skipped_newlines_kept() {
        assert_eq!(
            tokens("ray 900, 900 # render\n#png 1sj1.png, dpi=1000"),
            vec![
                Token::Ray,
                Token::Number(900.0),
                Token::Comma,
                Token::Number(900.0),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_words_with_keyword_prefix() {
        assert_eq!(
            tokens("settings colors"),
            vec![
                Token::Word("settings".to_string()),
                Token::Word("colors".to_string())
            ]
        );
    }

    #[test]
    fn test_quoted_strings_unescaped() {
        assert_eq!(
            tokens(r#""my scène+v2.png" "a\"b" "C:\\out""#),
            vec![
                Token::String("my scène+v2.png".to_string()),
                Token::String("a\"b".to_string()),
                Token::String(r"C:\out".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_input_becomes_error() {
        assert_eq!(tokens("@"), vec![Token::Error]);
    }
}
