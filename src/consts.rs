//! Project-wide constants.

use std::path::PathBuf;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default database path: `~/.larek/larek.db`.
/// `None` when the home directory cannot be determined.
pub fn default_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".larek").join("larek.db"))
}

/// Short tag for a product category, used to label cards.
/// Unrecognised categories fall back to `"other"`.
pub fn category_class(category: &str) -> &'static str {
    match category {
        "софт-скил" => "soft",
        "хард-скил" => "hard",
        "дополнительное" => "additional",
        "кнопка" => "button",
        _ => "other",
    }
}

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
