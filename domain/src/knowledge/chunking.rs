//! Separator-aware text chunking for indexing.
//!
//! Text is split on the coarsest separator that appears (paragraphs, lines,
//! sentences, words, then characters), pieces that are still too long are
//! split again with the next separator, and the pieces are packed into
//! chunks of at most `chunk_size` characters. Consecutive chunks share up to
//! `overlap` trailing characters when that still fits.

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Split `text` into chunks; blank input yields no chunks.
pub fn chunk_text(text: &str, options: ChunkingOptions) -> Vec<String> {
    let chunk_size = options.chunk_size.max(1);
    let overlap = options.overlap.min(chunk_size / 2);

    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let pieces = split_recursive(text, chunk_size, SEPARATORS);
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        if char_len(&current) + char_len(&piece) <= chunk_size {
            current.push_str(&piece);
            continue;
        }
        if !current.trim().is_empty() {
            let tail = tail_chars(&current, overlap);
            chunks.push(current.trim().to_string());
            current = if char_len(&tail) + char_len(&piece) <= chunk_size {
                tail
            } else {
                String::new()
            };
        } else {
            current.clear();
        }
        current.push_str(&piece);
    }
    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

fn split_recursive(text: &str, chunk_size: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((index, sep)) = separators
        .iter()
        .enumerate()
        .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
    else {
        return vec![text.to_string()];
    };

    if sep.is_empty() {
        let chars: Vec<char> = text.chars().collect();
        return chars
            .chunks(chunk_size)
            .map(|c| c.iter().collect())
            .collect();
    }

    let rest = &separators[index + 1..];
    text.split_inclusive(*sep)
        .flat_map(|piece| {
            if char_len(piece) > chunk_size {
                split_recursive(piece, chunk_size, rest)
            } else {
                vec![piece.to_string()]
            }
        })
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    s.chars().skip(len.saturating_sub(n)).collect()
}
