//! Picking a query out of editor text.

/// Characters that end a word under the caret
const STOP_CHARS: &[char] = &[',', ' ', '"', '\'', '\n', '\t', '\r', '=', '(', ')'];

/// Shorter strings are mostly punctuation and never worth a round trip
pub const MIN_QUERY_LENGTH: usize = 3;

/// Longest query shown untruncated in titles and menus
pub const DISPLAY_LENGTH: usize = 20;

const ELLIPSIS: char = '…';

fn is_stop(c: char) -> bool {
    STOP_CHARS.contains(&c)
}

/// The word around `offset` (a char index) in `text`.
///
/// A caret right after a word still picks that word. `None` when the caret sits between
/// two stop characters or past the end of the text.
pub fn word_at_offset(text: &str, offset: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if offset > chars.len() {
        return None;
    }

    let mut start = offset;
    while start > 0 && !is_stop(chars[start - 1]) {
        start -= 1;
    }
    let mut end = offset;
    while end < chars.len() && !is_stop(chars[end]) {
        end += 1;
    }

    (start < end).then(|| chars[start..end].iter().collect())
}

/// Query for a search started from the editor.
///
/// An explicit selection always wins. Otherwise the word under the caret is used if it
/// is at least [`MIN_QUERY_LENGTH`] characters long.
pub fn search_string(selection: Option<&str>, text: &str, offset: usize) -> Option<String> {
    if let Some(selection) = selection {
        return Some(selection.to_string());
    }
    word_at_offset(text, offset).filter(|word| word.chars().count() >= MIN_QUERY_LENGTH)
}

/// Shorten `query` for display.
pub fn display_string(query: &str) -> String {
    if query.chars().count() <= DISPLAY_LENGTH {
        return query.to_string();
    }
    let mut shown: String = query.chars().take(DISPLAY_LENGTH).collect();
    shown.push(ELLIPSIS);
    shown
}
