//! Citation extraction and linking

use once_cell::sync::Lazy;
use regex::Regex;

use crate::providers::RankedResult;
use crate::types::Citation;

static CITATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("citation pattern is valid"));

/// Distinct `[n]` markers in `answer` with `1 <= n <= available`, in order
/// of first appearance. Out-of-range or unparsable markers are skipped.
pub fn extract_citation_indices(answer: &str, available: usize) -> Vec<usize> {
    let mut indices = Vec::new();

    for cap in CITATION_MARKER.captures_iter(answer) {
        let Ok(n) = cap[1].parse::<usize>() else {
            continue;
        };
        if (1..=available).contains(&n) && !indices.contains(&n) {
            indices.push(n);
        }
    }

    indices
}

/// Link the markers used in `answer` to their ranked results, ascending by index
pub fn resolve_citations(answer: &str, ranked: &[RankedResult], snippet_chars: usize) -> Vec<Citation> {
    let mut indices = extract_citation_indices(answer, ranked.len());
    indices.sort_unstable();

    indices
        .into_iter()
        .map(|index| {
            let chunk = &ranked[index - 1].candidate.chunk;
            Citation {
                index,
                source: chunk.metadata.source.clone(),
                title: chunk.metadata.title.clone(),
                snippet: truncate_snippet(&chunk.content, snippet_chars),
            }
        })
        .collect()
}

/// First `max_chars` characters of `content`, with `...` appended if cut
pub fn truncate_snippet(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_end, _)) => format!("{}...", &content[..byte_end]),
        None => content.to_string(),
    }
}
