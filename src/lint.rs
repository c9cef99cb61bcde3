//! Lint checks for command scripts.
//!
//! Works on parsed directives without running an engine: colors used before
//! they exist, attribute ranges no color rule reaches, rules completely
//! overwritten by later ones, representations hidden after being shown,
//! images written before rendering, and ray tracing on a dark background.

use std::collections::HashSet;
use std::fmt;

use crate::color::builtin_color;
use crate::directive::{Directive, RenderOption};
use crate::parser::{Span, Spanned};
use crate::scene::{Representation, Selection};

/// A lint warning about a script defect
#[derive(Debug)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
    pub span: Span,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    UndefinedColor,
    UncoveredRange,
    ShadowedRule,
    HiddenRepresentation,
    ImageBeforeRender,
    Background,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::UndefinedColor => write!(f, "undefined-color"),
            LintCategory::UncoveredRange => write!(f, "uncovered-range"),
            LintCategory::ShadowedRule => write!(f, "shadowed-rule"),
            LintCategory::HiddenRepresentation => write!(f, "hidden-representation"),
            LintCategory::ImageBeforeRender => write!(f, "image-before-render"),
            LintCategory::Background => write!(f, "background"),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Run all lint checks on a parsed script.
pub fn check(directives: &[Spanned<Directive>]) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_colors_defined(directives, &mut warnings);
    check_rule_coverage(directives, &mut warnings);
    check_shadowed_rules(directives, &mut warnings);
    check_hidden_representations(directives, &mut warnings);
    check_render_order(directives, &mut warnings);
    check_background(directives, &mut warnings);
    warnings
}

fn warn(warnings: &mut Vec<LintWarning>, category: LintCategory, span: &Span, message: String) {
    warnings.push(LintWarning {
        category,
        message,
        span: span.clone(),
    });
}

// ── Colors ────────────────────────────────────────────────────────

fn check_colors_defined(directives: &[Spanned<Directive>], warnings: &mut Vec<LintWarning>) {
    let mut defined: HashSet<&str> = HashSet::new();
    for d in directives {
        let used = match &d.node {
            Directive::SetColor { name, .. } => {
                defined.insert(name);
                continue;
            }
            Directive::Color { name, .. } => name,
            Directive::Set(RenderOption::Background(name)) => name,
            _ => continue,
        };
        if !defined.contains(used.as_str()) && builtin_color(used).is_none() {
            warn(
                warnings,
                LintCategory::UndefinedColor,
                &d.span,
                format!("color '{}' is used before any set_color defines it", used),
            );
        }
    }
}

/// Color rules in script order
fn color_rules(directives: &[Spanned<Directive>]) -> Vec<(&Spanned<Directive>, &Selection)> {
    directives
        .iter()
        .filter_map(|d| match &d.node {
            Directive::Color { selection, .. } => Some((d, selection)),
            _ => None,
        })
        .collect()
}

fn check_rule_coverage(directives: &[Spanned<Directive>], warnings: &mut Vec<LintWarning>) {
    let rules = color_rules(directives);
    if rules.iter().any(|(_, selection)| **selection == Selection::All) {
        return;
    }

    let mut widest: Option<(&Spanned<Directive>, &Selection, f64)> = None;
    for &(rule, selection) in &rules {
        // Only one-sided upper-bound rules are analysed
        let Some(bound) = selection.upper_bound() else {
            return;
        };
        if widest.map_or(true, |(_, _, max)| bound > max) {
            widest = Some((rule, selection, bound));
        }
    }

    if let Some((rule, Selection::Attribute { attribute, .. }, bound)) = widest {
        warn(
            warnings,
            LintCategory::UncoveredRange,
            &rule.span,
            format!(
                "elements with {} at or above {} match no color rule and keep their previous color",
                attribute, bound
            ),
        );
    }
}

fn check_shadowed_rules(directives: &[Spanned<Directive>], warnings: &mut Vec<LintWarning>) {
    let rules = color_rules(directives);
    for (i, (earlier, selection)) in rules.iter().enumerate() {
        let overwritten_by = rules[i + 1..]
            .iter()
            .map(|(_, later)| *later)
            .find(|later| later.contains(selection));
        if let Some(later) = overwritten_by {
            warn(
                warnings,
                LintCategory::ShadowedRule,
                &earlier.span,
                format!(
                    "'{}' never takes effect: a later rule on '{}' recolors every element it selects",
                    earlier.node, later
                ),
            );
        }
    }
}

// ── Representations ───────────────────────────────────────────────

fn check_hidden_representations(
    directives: &[Spanned<Directive>],
    warnings: &mut Vec<LintWarning>,
) {
    let mut shown: Vec<Representation> = Vec::new();
    for d in directives {
        match &d.node {
            Directive::Show { representation, .. } => shown.push(*representation),
            Directive::Hide { representation, .. } => {
                let hidden: Vec<_> = shown
                    .iter()
                    .filter(|s| {
                        *representation == Representation::Everything || *s == representation
                    })
                    .copied()
                    .collect();
                if !hidden.is_empty() {
                    let names: Vec<String> = hidden.iter().map(|r| r.to_string()).collect();
                    warn(
                        warnings,
                        LintCategory::HiddenRepresentation,
                        &d.span,
                        format!("hides '{}' shown earlier in the script", names.join(", ")),
                    );
                    shown.retain(|s| !hidden.contains(s));
                }
            }
            _ => {}
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────

fn check_render_order(directives: &[Spanned<Directive>], warnings: &mut Vec<LintWarning>) {
    let mut rendered = false;
    for d in directives {
        match &d.node {
            Directive::Ray { .. } => rendered = true,
            Directive::Png { path, .. } if !rendered => warn(
                warnings,
                LintCategory::ImageBeforeRender,
                &d.span,
                format!("'{}' is written before any ray command", path.display()),
            ),
            _ => {}
        }
    }
}

fn check_background(directives: &[Spanned<Directive>], warnings: &mut Vec<LintWarning>) {
    let mut ray_trace_mode: Option<(&Span, u32)> = None;
    let mut background: Option<(&Span, &str)> = None;
    for d in directives {
        match &d.node {
            Directive::Set(RenderOption::RayTraceMode(mode)) => {
                ray_trace_mode = Some((&d.span, *mode))
            }
            Directive::Set(RenderOption::Background(name)) => {
                background = Some((&d.span, name.as_str()))
            }
            _ => {}
        }
    }
    if let Some((mode_span, mode)) = ray_trace_mode {
        if mode == 0 {
            return;
        }
        match background {
            Some((_, name)) if name.eq_ignore_ascii_case("white") => {}
            Some((span, name)) => warn(
                warnings,
                LintCategory::Background,
                span,
                format!("ray trace mode {} is used with a '{}' background", mode, name),
            ),
            None => warn(
                warnings,
                LintCategory::Background,
                mode_span,
                format!("ray trace mode {} is used without setting a white background", mode),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lint(source: &str) -> Vec<LintWarning> {
        check(&parse(source).expect("Should parse"))
    }

    fn categories(warnings: &[LintWarning]) -> Vec<LintCategory> {
        warnings.iter().map(|w| w.category).collect()
    }

    #[test]
    fn test_undefined_color_detected() {
        let warnings = lint("color n0, b < 100");
        assert_eq!(categories(&warnings), vec![
            LintCategory::UndefinedColor,
            LintCategory::UncoveredRange,
        ]);
    }

    #[test]
    fn test_builtin_and_defined_colors_accepted() {
        let warnings = lint("set_color n0, [0, 0, 1]\ncolor n0, all\ncolor red, b < 10");
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_color_defined_too_late() {
        let warnings = lint("color n0, all\nset_color n0, [0, 0, 1]");
        assert_eq!(categories(&warnings), vec![LintCategory::UndefinedColor]);
    }

    #[test]
    fn test_uncovered_range_reports_largest_bound() {
        let warnings = lint("color red, b < 90\ncolor blue, b < 100\ncolor green, b < 50");
        let uncovered: Vec<_> = warnings
            .iter()
            .filter(|w| w.category == LintCategory::UncoveredRange)
            .collect();
        assert_eq!(uncovered.len(), 1);
        assert!(uncovered[0].message.contains("b at or above 100"));
    }

    #[test]
    fn test_mixed_direction_rules_not_analysed() {
        let warnings = lint("color red, b < 50\ncolor blue, b > 50");
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_shadowed_rule_detected() {
        let warnings = lint("color red, all\ncolor blue, b < 50\ncolor green, b < 90");
        assert_eq!(categories(&warnings), vec![LintCategory::ShadowedRule]);
        assert!(warnings[0].message.contains("color blue, b < 50"));
    }

    #[test]
    fn test_hidden_after_show() {
        let warnings = lint("show cartoon\nshow sticks\nhide sticks\nhide everything");
        assert_eq!(
            categories(&warnings),
            vec![
                LintCategory::HiddenRepresentation,
                LintCategory::HiddenRepresentation
            ]
        );
        assert!(warnings[1].message.contains("cartoon"));
    }

    #[test]
    fn test_hide_before_show_is_fine() {
        assert!(lint("hide everything\nshow cartoon").is_empty());
    }

    #[test]
    fn test_image_before_render() {
        let warnings = lint("png a.png, dpi=300\nray 10, 10\npng b.png, dpi=300");
        assert_eq!(categories(&warnings), vec![LintCategory::ImageBeforeRender]);
        assert!(warnings[0].message.contains("a.png"));
    }

    #[test]
    fn test_ray_trace_background() {
        let warnings = lint("set ray_trace_mode, 1\nbg_color black");
        assert_eq!(categories(&warnings), vec![LintCategory::Background]);

        let warnings = lint("set ray_trace_mode, 1");
        assert_eq!(categories(&warnings), vec![LintCategory::Background]);

        assert!(lint("set ray_trace_mode, 0\nbg_color black").is_empty());
        assert!(lint("set ray_trace_mode, 1; bg_color white").is_empty());
    }

    #[test]
    fn test_warning_spans_point_at_statement() {
        let source = "show cartoon\ncolor n9, all";
        let warnings = lint(source);
        assert_eq!(&source[warnings[0].span.clone()], "color n9, all");
    }
}
