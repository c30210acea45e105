//! CLI output formatting utilities.
//!
//! Tables are built with `tabled` at the call sites; this module holds the
//! shared pieces: JSON highlighting and cell formatting.

use colored::Colorize;

/// Prints pretty JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    println!("{}", highlight_json(&json));
}

/// Colors a pretty-printed JSON document.
///
/// Works line by line: `serde_json` puts every key and scalar on its own
/// line, so a key is always the first string on a line followed by `:`.
#[must_use]
pub fn highlight_json(json: &str) -> String {
    json.lines().map(highlight_line).collect::<Vec<_>>().join("\n")
}

fn highlight_line(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    if let Some((key, rest)) = split_key(body) {
        let rest = rest.trim_start();
        return format!("{indent}{}{} {}", key.cyan(), ":".white(), highlight_value(rest));
    }

    format!("{indent}{}", highlight_value(body))
}

/// Splits `"key": rest` into the quoted key and `rest`.
fn split_key(body: &str) -> Option<(&str, &str)> {
    if !body.starts_with('"') {
        return None;
    }
    let end = closing_quote(body)?;
    let rest = body[end + 1..].strip_prefix(':')?;
    Some((&body[..=end], rest))
}

/// Byte index of the quote closing the string that starts at index 0.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, ch) in s.char_indices().skip(1) {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(index),
            _ => {}
        }
    }
    None
}

fn highlight_value(value: &str) -> String {
    let (token, comma) = value.strip_suffix(',').map_or((value, ""), |token| (token, ","));

    let colored = match token {
        "{" | "}" | "[" | "]" | "{}" | "[]" => token.white().bold().to_string(),
        "true" | "false" | "null" => token.magenta().to_string(),
        _ if token.starts_with('"') => token.green().to_string(),
        _ if token.parse::<f64>().is_ok() => token.yellow().to_string(),
        _ => token.to_string(),
    };

    format!("{colored}{}", comma.white())
}

/// Truncates a string to a maximum number of characters, adding an ellipsis
/// if needed. Counts characters, not bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let cut = s.char_indices().nth(max_chars - 1).map_or(s.len(), |(idx, _)| idx);
    format!("{}…", &s[..cut])
}

/// Formats a boolean as a colored check mark or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}
