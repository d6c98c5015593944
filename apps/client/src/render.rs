//! Plain text rendering of the views.

use search_core::{FacetsView, ResultsView, SearchResult, TreeModel, query_text};
use std::fmt::Write;

/// Lines of context printed around each highlighted line
const CONTEXT_LINES: usize = 1;

pub fn facets(view: &FacetsView) -> String {
    let mut out = format!("{}\n", view.tree().label());
    for (index, facet) in view.facets().enumerate() {
        let _ = writeln!(out, "  [{index}] {facet}");
    }
    out
}

pub fn results(view: &ResultsView) -> String {
    let tree = view.tree();
    let mut out = format!("{}\n", tree.model().label());
    for (index, (node, result)) in view.visible_results().into_iter().enumerate() {
        let marker = if view.selected() == Some(node) { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} [{index}] {result}");
    }
    if tree.model().has_load_more() && tree.child_count(tree.root()) > 0 {
        let _ = writeln!(out, "  [+] Load more results...");
    }
    let filters: Vec<_> = tree.filters().collect();
    if !filters.is_empty() {
        let _ = writeln!(out, "  (showing only: {})", filters.join(", "));
    }
    out
}

/// Matched lines of a result with a little surrounding context.
pub fn result_detail(result: &SearchResult) -> String {
    let mut out = format!("== {} ==\n", result.file_path());
    if let Some(link) = result.external_link() {
        let _ = writeln!(out, "   {link}");
    }

    let highlights = result.highlights().unwrap_or_default();
    match result.content() {
        Some(content) => {
            let lines: Vec<&str> = content.lines().collect();
            let matched: Vec<usize> = highlights.iter().map(|h| h.line_number).collect();
            let mut last_printed = None;
            for highlight in highlights {
                let from = highlight.line_number.saturating_sub(CONTEXT_LINES);
                let to = (highlight.line_number + CONTEXT_LINES).min(lines.len().saturating_sub(1));
                for line in from..=to {
                    if last_printed.is_some_and(|last| line <= last) || line >= lines.len() {
                        continue;
                    }
                    let marker = if matched.contains(&line) { '*' } else { ' ' };
                    let _ = writeln!(out, "{marker}{:>6} | {}", line + 1, lines[line]);
                    last_printed = Some(line);
                }
            }
            if highlights.is_empty() {
                for (line, text) in lines.iter().take(10).enumerate() {
                    let _ = writeln!(out, " {:>6} | {text}", line + 1);
                }
            }
        }
        None => {
            for highlight in highlights {
                let _ = writeln!(out, "*{:>6} | {}", highlight.line_number + 1, highlight.matched);
            }
        }
    }
    out
}

pub fn title(query: &str) -> String {
    format!("Searching for '{}'", query_text::display_string(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_core::HighlightEntry;

    #[test]
    fn test_detail_marks_matched_lines() {
        let result = SearchResult::new("Pool.java", "Pool.java in commons")
            .with_content("a\nb\nc\nd\ne")
            .with_highlights(vec![HighlightEntry::new(1, "b"), HighlightEntry::new(2, "c")]);

        let text = result_detail(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== Pool.java in commons ==");
        assert_eq!(lines[1], "      1 | a");
        assert_eq!(lines[2], "*     2 | b");
        assert_eq!(lines[3], "*     3 | c");
        assert_eq!(lines[4], "      4 | d");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_detail_without_content() {
        let result = SearchResult::new("a.c", "a.c in linux")
            .with_highlights(vec![HighlightEntry::new(9, "lock")]);
        assert!(result_detail(&result).contains("*    10 | lock"));
    }

    #[test]
    fn test_long_title_is_shortened() {
        assert_eq!(
            title("AbstractSingletonProxyFactoryBean"),
            "Searching for 'AbstractSingletonPro…'"
        );
    }
}
