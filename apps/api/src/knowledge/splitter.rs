//! Recursive character splitter for chunking company descriptions.
//!
//! Text is split on the coarsest separator present (paragraphs, lines,
//! sentences, words, then characters). Pieces that still exceed the chunk
//! size are split again with the finer separators. Small pieces are merged
//! back into chunks of at most `chunk_size` characters, carrying up to
//! `chunk_overlap` characters of trailing context into the next chunk.

use std::collections::VecDeque;

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

const SEPARATORS: &[&str] = &["\n\n", "\n", ".", " ", ""];

pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    split_recursive(text, SEPARATORS, chunk_size.max(1), chunk_overlap)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(text: &str, separators: &[&str], size: usize, overlap: usize) -> Vec<String> {
    let (index, separator) = separators
        .iter()
        .enumerate()
        .find(|(_, s)| s.is_empty() || text.contains(**s))
        .map(|(i, s)| (i, *s))
        .unwrap_or((separators.len().saturating_sub(1), ""));
    let finer = &separators[(index + 1).min(separators.len())..];

    // Sentence pieces keep their full stop; whitespace separators are rejoined on merge.
    let (pieces, joiner): (Vec<String>, &str) = match separator {
        "" => (text.chars().map(String::from).collect(), ""),
        "." => (text.split_inclusive('.').map(str::to_string).collect(), ""),
        sep => (
            text.split(sep)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            sep,
        ),
    };

    let mut chunks = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for piece in pieces {
        if char_len(&piece) < size {
            pending.push(piece);
            continue;
        }
        if !pending.is_empty() {
            chunks.extend(merge_pieces(&pending, joiner, size, overlap));
            pending.clear();
        }
        if finer.is_empty() {
            chunks.push(piece);
        } else {
            chunks.extend(split_recursive(&piece, finer, size, overlap));
        }
    }

    if !pending.is_empty() {
        chunks.extend(merge_pieces(&pending, joiner, size, overlap));
    }
    chunks
}

fn merge_pieces(pieces: &[String], separator: &str, size: usize, overlap: usize) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);
        let joined_len = |total: usize, current: &VecDeque<&str>| {
            total + len + if current.is_empty() { 0 } else { sep_len }
        };

        if joined_len(total, &current) > size {
            if let Some(chunk) = join_chunk(&current, separator) {
                chunks.push(chunk);
            }
            while total > overlap || (joined_len(total, &current) > size && total > 0) {
                let Some(front) = current.front() else {
                    break;
                };
                total -= char_len(front) + if current.len() > 1 { sep_len } else { 0 };
                current.pop_front();
            }
        }

        current.push_back(piece);
        total += len + if current.len() > 1 { sep_len } else { 0 };
    }

    if let Some(chunk) = join_chunk(&current, separator) {
        chunks.push(chunk);
    }
    chunks
}

fn join_chunk(current: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = current.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(
            split_text("Syscraft builds web apps.", 500, 50),
            vec!["Syscraft builds web apps."]
        );
    }

    #[test]
    fn test_words_merge_with_overlap() {
        assert_eq!(
            split_text("aaa bbb ccc ddd", 7, 3),
            vec!["aaa bbb", "bbb ccc", "ccc ddd"]
        );
    }

    #[test]
    fn test_paragraphs_are_preferred_boundaries() {
        let text = format!("{}\n\n{}", "a".repeat(30), "b".repeat(30));
        assert_eq!(split_text(&text, 40, 0), vec!["a".repeat(30), "b".repeat(30)]);
    }

    #[test]
    fn test_long_text_chunks_respect_size() {
        let sentence = "We deliver secure and scalable software for clients worldwide";
        let text = vec![sentence; 40].join(". ");
        let chunks = split_text(&text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= DEFAULT_CHUNK_SIZE));
    }

    #[test]
    fn test_unbroken_run_falls_back_to_characters() {
        let chunks = split_text(&"x".repeat(25), 10, 0);
        assert_eq!(chunks, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_text("", 500, 50).is_empty());
        assert!(split_text("   ", 500, 50).is_empty());
    }
}
