//! Precompiled patterns and the three extraction passes.
//!
//! Patterns are compiled once per process on first use.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Substrings that mark a double-quoted literal as a likely class list.
pub const CLASS_MARKERS: &[&str] = &[
    "bg-", "text-", "border-", "p-", "m-", "w-", "h-", "flex", "grid", "rounded", "shadow",
    "hover:", "focus:", "active:",
];

/// `class="..."` or `className='...'` in component source.
static CLASS_LIKE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"class(?:Name)?=["']([^"']+)["']"#));

/// Plain `class="..."` in markup.
static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| compile(r#"class=["']([^"']+)["']"#));

/// ``className={`...`}`` template attribute.
static TEMPLATE_ATTR: LazyLock<Regex> = LazyLock::new(|| compile(r"className=\{`([^`]+)`\}"));

/// `${...}` interpolation span.
static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| compile(r"\$\{[^}]+\}"));

/// Double-quoted literal containing at least one class marker.
static MARKED_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    let markers = CLASS_MARKERS
        .iter()
        .map(|m| regex::escape(m))
        .collect::<Vec<_>>()
        .join("|");
    compile(&format!(r#""([^"]*(?:{markers})[^"]*)""#))
});

/// Shape of an acceptable class token.
static CLASS_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z][A-Za-z0-9\-_:]*$"));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in scanner pattern must compile")
}

/// Which attribute the quoted-attribute pass looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// `class` or `className`, as written in component source.
    ClassLike,
    /// `class` only, as written in markup.
    Class,
}

impl Attribute {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::ClassLike => &*CLASS_LIKE_ATTR,
            Self::Class => &*CLASS_ATTR,
        }
    }
}

/// Whether a token has the shape of a class name.
#[must_use]
pub fn is_class_token(token: &str) -> bool {
    token.len() > 1 && CLASS_TOKEN.is_match(token)
}

/// Pass 1: every whitespace-separated token of a quoted attribute, verbatim.
///
/// Returns how many attribute matches were found.
pub fn quoted_attribute(text: &str, attribute: Attribute, out: &mut BTreeSet<String>) -> usize {
    let mut matched = 0;
    for caps in attribute.pattern().captures_iter(text) {
        let Some(list) = caps.get(1) else {
            continue;
        };
        matched += 1;
        out.extend(list.as_str().split_whitespace().map(str::to_string));
    }
    matched
}

/// Pass 2: template attribute with interpolations blanked out.
///
/// Leftover expression fragments (anything containing `$`, `?` or `:`) and
/// single characters are dropped.
pub fn template_attribute(text: &str, out: &mut BTreeSet<String>) -> usize {
    let mut matched = 0;
    for caps in TEMPLATE_ATTR.captures_iter(text) {
        let Some(template) = caps.get(1) else {
            continue;
        };
        matched += 1;
        let cleaned = INTERPOLATION.replace_all(template.as_str(), " ");
        out.extend(
            cleaned
                .split_whitespace()
                .filter(|t| t.len() > 1 && !t.contains(['$', '?', ':']))
                .map(str::to_string),
        );
    }
    matched
}

/// Pass 3: double-quoted literals carrying a class marker.
///
/// Template attributes are blanked first so literals inside their
/// interpolations are not picked up.
pub fn marked_literals(text: &str, out: &mut BTreeSet<String>) -> usize {
    let outside_templates = TEMPLATE_ATTR.replace_all(text, " ");
    let mut matched = 0;
    for caps in MARKED_LITERAL.captures_iter(&outside_templates) {
        let Some(literal) = caps.get(1) else {
            continue;
        };
        matched += 1;
        out.extend(
            literal
                .as_str()
                .split_whitespace()
                .filter(|t| is_class_token(t))
                .map(str::to_string),
        );
    }
    matched
}

// =============================================================================
// TESTS
// =============================================================================
