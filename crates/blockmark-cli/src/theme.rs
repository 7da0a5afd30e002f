use std::collections::BTreeSet;

use ratatui::style::{Color, Modifier, Style};

/// Token kinds with a colour, most specific first. A run carrying several
/// tags takes the first one listed here.
const PALETTE: &[(&str, Color)] = &[
    ("comment", Color::DarkGray),
    ("shebang", Color::DarkGray),
    ("template-punctuation", Color::Yellow),
    ("interpolation-punctuation", Color::Yellow),
    ("string", Color::Green),
    ("char", Color::Green),
    ("url", Color::Green),
    ("keyword", Color::Magenta),
    ("boolean", Color::LightRed),
    ("number", Color::LightRed),
    ("hexcode", Color::LightRed),
    ("color", Color::LightRed),
    ("function", Color::Blue),
    ("function-definition", Color::Blue),
    ("class-name", Color::Yellow),
    ("builtin", Color::Cyan),
    ("property", Color::Cyan),
    ("selector", Color::Yellow),
    ("variable", Color::LightCyan),
    ("lifetime-annotation", Color::LightMagenta),
    ("operator", Color::White),
    ("punctuation", Color::Gray),
];

/// Terminal style for a run of code carrying `tags`.
pub fn style_for(tags: &BTreeSet<String>) -> Style {
    let mut style = Style::default();
    if let Some((_, color)) = PALETTE.iter().find(|(tag, _)| tags.contains(*tag)) {
        style = style.fg(*color);
    }
    if tags.contains("comment") {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if tags.contains("important") || tags.contains("bold") {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}
