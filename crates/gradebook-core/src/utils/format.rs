use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a string to its base letters: decompose, drop accents, lowercase.
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Compare two strings by base letters only, so "Álvaro", "alvaro" and
/// "ALVARO" are equal. Matches the pt-BR collation used for display lists.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    base_letters(a).cmp(base_letters(b))
}

/// Case and accent insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle: String = base_letters(needle).collect();
    if needle.is_empty() {
        return true;
    }
    let haystack: String = base_letters(haystack).collect();
    haystack.contains(&needle)
}

/// Shorten `s` to at most `width` characters, marking the cut with `…`.
pub fn clip(s: &str, width: usize) -> Cow<'_, str> {
    if s.chars().nth(width).is_none() {
        return Cow::Borrowed(s);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }
    let cut = s.char_indices().nth(width - 1).map_or(s.len(), |(i, _)| i);
    Cow::Owned(format!("{}…", &s[..cut]))
}

/// Text of an optional field, or `placeholder` when it is unset or empty.
pub fn text_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(placeholder)
}

/// Human-readable age of a timestamp relative to now ("5m ago", "2h ago").
pub fn age_display(since: DateTime<Utc>) -> String {
    age_display_minutes((Utc::now() - since).num_minutes())
}

fn age_display_minutes(minutes: i64) -> String {
    if minutes < 1 {
        // Negative ages come from clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
