//! Parser implementation using chumsky

use std::path::PathBuf;

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::color::Rgb;
use crate::directive::{Directive, RenderOption, SettingValue};
use crate::parser::lexer::Token;
use crate::parser::Spanned;
use crate::scene::{Attribute, Comparison, ImageFormat, Representation, Selection};

/// Parse a command script into directives
///
/// Commands are separated by newlines or `;`. Empty statements and `#`
/// comments are allowed anywhere.
pub fn parse(input: &str) -> Result<Vec<Spanned<Directive>>, Vec<crate::ParseError>> {
    let len = input.len();

    // Create a logos lexer and convert to token stream
    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    script_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn script_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<Directive>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Basic token parsers
    let word = select! {
        Token::Word(s) => s,
    };

    // Paths and setting values may be quoted
    let text = select! {
        Token::Word(s) => s,
        Token::String(s) => s,
    };

    let number = select! {
        Token::Number(n) => n,
    };

    let comma = just(Token::Comma);

    let count = number.clone().try_map(|n: f64, span: SimpleSpan| {
        if n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 {
            Ok(n as u32)
        } else {
            Err(Rich::custom(
                span,
                format!("expected a non-negative integer, found {}", n),
            ))
        }
    });

    let representation = word.clone().try_map(|w: String, span: SimpleSpan| {
        w.parse::<Representation>()
            .map_err(|e| Rich::custom(span, e))
    });

    // Selections: `all` or `<attribute> <op> <number>`
    let comparison = select! {
        Token::Less => Comparison::Less,
        Token::LessOrEqual => Comparison::LessOrEqual,
        Token::Greater => Comparison::Greater,
        Token::GreaterOrEqual => Comparison::GreaterOrEqual,
    };

    let attribute = word.clone().try_map(|w: String, span: SimpleSpan| {
        w.parse::<Attribute>().map_err(|e| Rich::custom(span, e))
    });

    let predicate = attribute
        .then(comparison)
        .then(number.clone())
        .map(|((attribute, comparison), value)| Selection::Attribute {
            attribute,
            comparison,
            value,
        });

    let all = word.clone().try_map(|w: String, span: SimpleSpan| {
        if w == "all" {
            Ok(Selection::All)
        } else {
            Err(Rich::custom(span, format!("unknown selection '{}'", w)))
        }
    });

    let selection = choice((predicate, all));

    // A missing selection means every element
    let optional_selection = comma
        .clone()
        .ignore_then(selection)
        .or_not()
        .map(|selection| selection.unwrap_or(Selection::All));

    let rgb = number
        .clone()
        .then_ignore(comma.clone())
        .then(number.clone())
        .then_ignore(comma.clone())
        .then(number.clone())
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
        .map(|((r, g), b)| Rgb::new(r, g, b));

    // hide <representation>[, <selection>]
    let hide = just(Token::Hide)
        .ignore_then(representation.clone())
        .then(optional_selection.clone())
        .map(|(representation, selection)| Directive::Hide {
            representation,
            selection,
        });

    // show <representation>[, <selection>]
    let show = just(Token::Show)
        .ignore_then(representation)
        .then(optional_selection.clone())
        .map(|(representation, selection)| Directive::Show {
            representation,
            selection,
        });

    // set_color <name>, [r, g, b]
    let set_color = just(Token::SetColor)
        .ignore_then(word.clone())
        .then_ignore(comma.clone())
        .then(rgb)
        .map(|(name, rgb)| Directive::SetColor { name, rgb });

    // color <name>[, <selection>]
    let color = just(Token::Color)
        .ignore_then(word.clone())
        .then(optional_selection)
        .map(|(name, selection)| Directive::Color { name, selection });

    // set <key>, <value>; `bg_color` lexes as a command keyword
    let setting_key = choice((
        word.clone(),
        just(Token::BgColor).to("bg_color".to_string()),
    ));

    let setting_value = choice((
        number.map(SettingValue::Number),
        text.clone().map(SettingValue::Text),
    ));

    let set = just(Token::Set)
        .ignore_then(setting_key)
        .then_ignore(comma.clone())
        .then(setting_value)
        .try_map(|(key, value), span: SimpleSpan| {
            RenderOption::from_setting(&key, value)
                .map(Directive::Set)
                .map_err(|e| Rich::custom(span, e))
        });

    // bg_color <name>
    let bg_color = just(Token::BgColor)
        .ignore_then(word.clone())
        .map(|name| Directive::Set(RenderOption::Background(name)));

    // ray <width>, <height>
    let ray = just(Token::Ray)
        .ignore_then(count.clone())
        .then_ignore(comma.clone())
        .then(count.clone())
        .map(|(width, height)| Directive::Ray { width, height });

    // png <path>, dpi=<n>
    let dpi_key = word.try_map(|w: String, span: SimpleSpan| {
        if w == "dpi" {
            Ok(())
        } else {
            Err(Rich::custom(span, format!("unsupported png option '{}'", w)))
        }
    });

    let png = just(Token::Png)
        .ignore_then(text)
        .then_ignore(comma)
        .then_ignore(dpi_key)
        .then_ignore(just(Token::Equals))
        .then(count)
        .try_map(|(path, dpi), span: SimpleSpan| {
            let path = PathBuf::from(path);
            match ImageFormat::from_path(&path) {
                Some(format) => Ok(Directive::Png { path, format, dpi }),
                None => Err(Rich::custom(
                    span,
                    format!("'{}' is not a .png file", path.display()),
                )),
            }
        });

    let statement = choice((hide, show, set_color, color, set, bg_color, ray, png))
        .map_with(|d, e| Spanned::new(d, span_range(&e.span())))
        .boxed();

    let separator = choice((just(Token::Newline), just(Token::Semicolon)));

    // Script is a list of possibly empty statements
    statement
        .or_not()
        .separated_by(separator)
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|statements| statements.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(input: &str) -> Vec<Directive> {
        parse(input)
            .expect("Should parse")
            .into_iter()
            .map(|s| s.node)
            .collect()
    }

    #[test]
    fn test_parse_hide_and_show() {
        assert_eq!(
            directives("hide lines, all\nshow cartoon"),
            vec![
                Directive::Hide {
                    representation: Representation::Lines,
                    selection: Selection::All,
                },
                Directive::Show {
                    representation: Representation::Cartoon,
                    selection: Selection::All,
                },
            ]
        );
    }

    #[test]
    fn test_parse_set_color() {
        assert_eq!(
            directives("set_color n0, [0.051, 0.341, 0.827]"),
            vec![Directive::SetColor {
                name: "n0".to_string(),
                rgb: Rgb::new(0.051, 0.341, 0.827),
            }]
        );
    }

    #[test]
    fn test_parse_color_rules_on_one_line() {
        assert_eq!(
            directives("color n0, b < 100; color n1, q >= 0.5"),
            vec![
                Directive::Color {
                    name: "n0".to_string(),
                    selection: Selection::below(Attribute::B, 100.0),
                },
                Directive::Color {
                    name: "n1".to_string(),
                    selection: Selection::Attribute {
                        attribute: Attribute::Q,
                        comparison: Comparison::GreaterOrEqual,
                        value: 0.5,
                    },
                },
            ]
        );
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(
            directives("set ray_trace_mode, 1; bg_color white; set antialias,3\nset specular, off"),
            vec![
                Directive::Set(RenderOption::RayTraceMode(1)),
                Directive::Set(RenderOption::Background("white".to_string())),
                Directive::Set(RenderOption::Antialias(3)),
                Directive::Set(RenderOption::Other {
                    key: "specular".to_string(),
                    value: SettingValue::Text("off".to_string()),
                }),
            ]
        );
    }

    #[test]
    fn test_parse_set_bg_color_key() {
        assert_eq!(
            directives("set bg_color, white"),
            vec![Directive::Set(RenderOption::Background("white".to_string()))]
        );
    }

    #[test]
    fn test_parse_ray_and_png() {
        assert_eq!(
            directives("ray 900, 900\npng FOXG_07142.png, dpi=300"),
            vec![
                Directive::Ray {
                    width: 900,
                    height: 900,
                },
                Directive::Png {
                    path: PathBuf::from("FOXG_07142.png"),
                    format: ImageFormat::Png,
                    dpi: 300,
                },
            ]
        );
    }

    #[test]
    fn test_parse_quoted_png_path() {
        assert_eq!(
            directives(r#"png "my scene.png", dpi=150"#),
            vec![Directive::Png {
                path: PathBuf::from("my scene.png"),
                format: ImageFormat::Png,
                dpi: 150,
            }]
        );
    }

    #[test]
    fn test_blank_lines_and_comments() {
        let parsed = directives("\n\n# header\nshow cartoon\n\n;;\n#png 1sj1.png, dpi=1000, ray=1\n");
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_empty_script() {
        assert!(directives("").is_empty());
    }

    #[test]
    fn test_spans_cover_statements() {
        let parsed = parse("show cartoon\nray 10, 10").expect("Should parse");
        assert_eq!(parsed[0].span, 0..12);
        assert_eq!(parsed[1].span, 13..23);
    }

    #[test]
    fn test_unknown_representation_rejected() {
        assert!(parse("show licorice").is_err());
    }

    #[test]
    fn test_fractional_ray_size_rejected() {
        assert!(parse("ray 900.5, 900").is_err());
    }

    #[test]
    fn test_invalid_setting_value_rejected() {
        assert!(parse("set antialias, high").is_err());
    }

    #[test]
    fn test_png_requires_png_extension() {
        assert!(parse("png scene.jpg, dpi=300").is_err());
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert!(parse("show cartoon ray 900, 900").is_err());
    }

    #[test]
    fn test_unknown_command_rejected() {
        let errs = parse("zoom all").unwrap_err();
        assert!(!errs.is_empty());
    }
}
