use crate::models::{PageUnit, Passage};

pub const DEFAULT_CHUNK_SIZE: usize = 600;
pub const DEFAULT_CHUNK_OVERLAP: usize = 120;

/// Separator priority: paragraph breaks, line breaks, sentence ends, spaces.
/// A later separator is tried only for regions the earlier ones could not
/// bring under `chunk_size`.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ".", " "];

#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Collapses every whitespace run (spaces, tabs, newlines) to a single
/// ASCII space and trims the ends. Idempotent.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text into chunks of at most `chunk_size` characters, overlapping
/// adjacent chunks by up to `chunk_overlap`. Separators are kept attached
/// to the text that precedes them, so concatenating the chunks (minus
/// overlap) reproduces the input. A segment with no remaining separator is
/// emitted whole even when it exceeds `chunk_size`.
pub fn split_text(text: &str, config: &ChunkerConfig) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.len() <= config.chunk_size {
        return vec![trimmed.to_string()];
    }

    split_region(trimmed, &SEPARATORS, config)
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

fn split_region(text: &str, separators: &[&str], config: &ChunkerConfig) -> Vec<String> {
    let Some((position, separator)) = separators
        .iter()
        .enumerate()
        .find(|(_, separator)| text.contains(**separator))
        .map(|(position, separator)| (position, *separator))
    else {
        return vec![text.to_string()];
    };
    let deeper = &separators[position + 1..];

    let mut chunks = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for piece in text.split_inclusive(separator) {
        if piece.len() <= config.chunk_size {
            pending.push(piece.to_string());
        } else {
            if !pending.is_empty() {
                chunks.append(&mut merge_pieces(std::mem::take(&mut pending), config));
            }
            chunks.extend(split_region(piece, deeper, config));
        }
    }

    if !pending.is_empty() {
        chunks.append(&mut merge_pieces(pending, config));
    }

    chunks
}

/// Greedily packs adjacent pieces into chunks of at most `chunk_size`,
/// carrying a tail of at most `chunk_overlap` characters into the next
/// chunk.
fn merge_pieces(pieces: Vec<String>, config: &ChunkerConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: Vec<String> = Vec::new();

    for piece in pieces {
        if !window.is_empty() && total_len(&window) + piece.len() > config.chunk_size {
            chunks.push(window.concat());
            while !window.is_empty()
                && (total_len(&window) > config.chunk_overlap
                    || total_len(&window) + piece.len() > config.chunk_size)
            {
                window.remove(0);
            }
        }
        window.push(piece);
    }

    if !window.is_empty() {
        chunks.push(window.concat());
    }

    chunks
}

fn total_len(pieces: &[String]) -> usize {
    pieces.iter().map(String::len).sum()
}

/// Splits one page into passages. Every passage inherits the page's
/// metadata verbatim; content is never merged across pages.
pub fn chunk_page(page: &PageUnit, config: &ChunkerConfig) -> Vec<Passage> {
    split_text(&page.text, config)
        .into_iter()
        .map(|text| Passage {
            text,
            page_number: page.page_number,
            source_id: page.source_id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> PageUnit {
        PageUnit {
            text: text.to_string(),
            page_number: 4,
            source_id: "manual.pdf".to_string(),
        }
    }

    #[test]
    fn whitespace_is_normalized() {
        let input = "A  \t  lot\nof   spacing";
        assert_eq!(normalize_whitespace(input), "A lot of spacing");
    }

    #[test]
    fn normalization_is_idempotent() {
        let input = "  mixed \n\n whitespace\teverywhere  ";
        let once = normalize_whitespace(input);
        assert_eq!(normalize_whitespace(&once), once);
    }

    #[test]
    fn short_text_yields_exactly_one_chunk() {
        let config = ChunkerConfig::default();
        let chunks = split_text("a short paragraph", &config);
        assert_eq!(chunks, vec!["a short paragraph".to_string()]);
    }

    #[test]
    fn chunks_respect_the_size_limit() {
        let config = ChunkerConfig {
            chunk_size: 40,
            chunk_overlap: 10,
        };
        let text = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen";
        let chunks = split_text(text, &config);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 40, "chunk too large: {chunk:?}");
        }
    }

    #[test]
    fn adjacent_chunks_share_overlapping_text() {
        let config = ChunkerConfig {
            chunk_size: 40,
            chunk_overlap: 15,
        };
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let chunks = split_text(text, &config);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(tail_word),
                "expected {:?} to carry over into {:?}",
                tail_word,
                pair[1]
            );
        }
    }

    #[test]
    fn chunk_concatenation_covers_the_source() {
        let config = ChunkerConfig {
            chunk_size: 30,
            chunk_overlap: 0,
        };
        let text = "the quick brown fox jumps over the lazy dog again and again and again";
        let chunks = split_text(text, &config);
        let rebuilt = chunks.join(" ");
        for word in text.split_whitespace() {
            assert!(rebuilt.contains(word), "lost {word:?}");
        }
    }

    #[test]
    fn paragraph_breaks_win_over_spaces() {
        let config = ChunkerConfig {
            chunk_size: 30,
            chunk_overlap: 0,
        };
        let text = "first paragraph here\n\nsecond paragraph over there";
        let chunks = split_text(text, &config);
        assert_eq!(chunks[0], "first paragraph here");
        assert_eq!(chunks[1], "second paragraph over there");
    }

    #[test]
    fn unsplittable_token_may_exceed_chunk_size() {
        let config = ChunkerConfig {
            chunk_size: 10,
            chunk_overlap: 0,
        };
        let token = "abcdefghijklmnopqrstuvwxyz";
        let chunks = split_text(token, &config);
        assert_eq!(chunks, vec![token.to_string()]);
    }

    #[test]
    fn passages_inherit_page_metadata() {
        let config = ChunkerConfig {
            chunk_size: 20,
            chunk_overlap: 5,
        };
        let unit = page("a b c d e f g h i j k l m n o p q r s t u v w x y z a b c d");
        let passages = chunk_page(&unit, &config);
        assert!(passages.len() > 1);
        for passage in passages {
            assert_eq!(passage.page_number, 4);
            assert_eq!(passage.source_id, "manual.pdf");
        }
    }

    #[test]
    fn short_page_yields_a_single_passage() {
        let unit = page("just one small page");
        let passages = chunk_page(&unit, &ChunkerConfig::default());
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "just one small page");
    }
}
