use crate::config::ChunkingConfig;

/// A passage-sized slice of the knowledge text
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub position: usize,
    pub text: String,
    pub tokens: usize,
}

/// Split the knowledge text into overlapping passages.
///
/// Blank-line separated paragraphs are packed together until the token budget
/// is reached; a paragraph larger than the budget is split on its own with
/// overlap between consecutive pieces.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let budget_chars = config.chunk_size_tokens * 4;
    let overlap_chars = config.chunk_overlap_tokens * 4;

    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        if paragraph.len() > budget_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.extend(split_with_overlap(paragraph, budget_chars, overlap_chars));
            continue;
        }

        if !current.is_empty() && current.len() + 2 + paragraph.len() > budget_chars {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .enumerate()
        .map(|(position, text)| Chunk {
            position,
            tokens: estimate_tokens(&text),
            text,
        })
        .collect()
}

/// Largest char boundary at or before `byte_pos`
fn floor_char_boundary(text: &str, byte_pos: usize) -> usize {
    if byte_pos >= text.len() {
        return text.len();
    }
    (0..=byte_pos).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0)
}

/// Split one oversized paragraph into `size`-byte windows, preferring to end
/// each window on whitespace or sentence punctuation within its last fifth.
///
/// All slicing happens on char boundaries, so multi-byte text is safe.
fn split_with_overlap(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let hard_end = floor_char_boundary(text, start + size);

        let end = if hard_end < text.len() {
            let search_start = floor_char_boundary(text, hard_end.saturating_sub(size / 5).max(start));
            text[search_start..hard_end]
                .char_indices()
                .rev()
                .find(|(_, c)| c.is_whitespace() || matches!(c, '.' | '!' | '?'))
                .map(|(offset, c)| search_start + offset + c.len_utf8())
                .filter(|&e| e > start)
                .unwrap_or(hard_end)
        } else {
            hard_end
        };

        // a window narrower than one char would never advance
        let end = if end <= start {
            start + text[start..].chars().next().map(char::len_utf8).unwrap_or(1)
        } else {
            end
        };

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }

        if end >= text.len() {
            break;
        }

        let next = floor_char_boundary(text, end.saturating_sub(overlap));
        start = if next > start { next } else { end };
    }

    pieces
}

/// Estimate token count from text
///
/// Uses approximation: 1 token ≈ 4 characters
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() + 3) / 4
}
