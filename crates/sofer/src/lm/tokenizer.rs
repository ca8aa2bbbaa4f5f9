//! WordPiece tokenization with masking support.

use super::vocab::Vocabulary;
use std::sync::Arc;

/// Words longer than this never match the vocabulary and encode as `[UNK]`.
const MAX_WORD_CHARS: usize = 100;

/// Encoder output: three equal-length integer sequences plus the positions
/// of any `[MASK]` tokens in the padded arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInput {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
    pub mask_positions: Vec<usize>,
}

/// Greedy longest-match WordPiece tokenizer over a shared vocabulary.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    vocab: Arc<Vocabulary>,
}

impl WordPieceTokenizer {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Case-insensitive whole-word vocabulary membership.
    pub fn is_in_vocab(&self, word: &str) -> bool {
        self.vocab.contains_word(word)
    }

    /// Token ids for whitespace-split text.
    pub fn tokenize(&self, text: &str) -> Vec<u32> {
        text.split_whitespace().flat_map(|word| self.word_to_ids(word)).collect()
    }

    /// Encode text as `[CLS] … [SEP]` padded to exactly `max_len`.
    pub fn encode(&self, text: &str, max_len: usize) -> EncodedInput {
        self.encode_inner(text, None, max_len)
    }

    /// Encode text, replacing the tokens of the first (case-insensitive)
    /// occurrence of `word_to_mask` with `[MASK]`.
    pub fn encode_with_mask(&self, text: &str, word_to_mask: &str, max_len: usize) -> EncodedInput {
        self.encode_inner(text, Some(word_to_mask), max_len)
    }

    fn encode_inner(&self, text: &str, word_to_mask: Option<&str>, max_len: usize) -> EncodedInput {
        let specials = self.vocab.specials();
        let mask_lower = word_to_mask.map(str::to_lowercase);

        let mut ids: Vec<u32> = vec![specials.cls];
        let mut mask_positions = Vec::new();
        let mut masked = false;

        for word in text.split_whitespace() {
            let word_ids = self.word_to_ids(word);
            if !masked
                && let Some(target) = &mask_lower
                && word.to_lowercase() == *target
            {
                // All of the word's tokens become [MASK]; later identical
                // words are left alone.
                for _ in &word_ids {
                    if ids.len() < max_len.saturating_sub(1) {
                        mask_positions.push(ids.len());
                    }
                    ids.push(specials.mask);
                }
                masked = true;
            } else {
                ids.extend(word_ids);
            }
        }

        // Truncate so the total including the final [SEP] fits max_len.
        ids.truncate(max_len.saturating_sub(1));
        ids.push(specials.sep);

        let real_len = ids.len();
        let mut input_ids: Vec<i64> = ids.into_iter().map(i64::from).collect();
        input_ids.resize(max_len, i64::from(specials.pad));

        let mut attention_mask = vec![1i64; real_len];
        attention_mask.resize(max_len, 0);

        EncodedInput {
            input_ids,
            attention_mask,
            token_type_ids: vec![0i64; max_len],
            mask_positions,
        }
    }

    /// WordPiece ids for a single word (lowercased): whole-word match first,
    /// then greedy longest-prefix with `##` continuations, `[UNK]` when
    /// nothing matches.
    fn word_to_ids(&self, word: &str) -> Vec<u32> {
        let specials = self.vocab.specials();
        let word = word.to_lowercase();
        let chars: Vec<char> = word.chars().collect();

        if chars.len() > MAX_WORD_CHARS {
            return vec![specials.unk];
        }
        if let Some(id) = self.vocab.id_of(&word) {
            return vec![id];
        }

        let mut ids = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut matched = None;
            for end in (start + 1..=chars.len()).rev() {
                let piece: String = chars[start..end].iter().collect();
                let candidate = if start == 0 { piece } else { format!("##{}", piece) };
                if let Some(id) = self.vocab.id_of(&candidate) {
                    matched = Some((id, end));
                    break;
                }
            }
            match matched {
                Some((id, end)) => {
                    ids.push(id);
                    start = end;
                }
                None => return vec![specials.unk],
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> WordPieceTokenizer {
        let tokens = [
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", // 0-4
            "שלום",   // 5
            "של",     // 6
            "##ום",   // 7
            "##ו",    // 8
            "עולם",   // 9
            "hello",  // 10
        ];
        let vocab = Vocabulary::from_tokens(tokens.iter().map(|t| t.to_string()).collect()).unwrap();
        WordPieceTokenizer::new(Arc::new(vocab))
    }

    #[test]
    fn test_whole_word_single_id() {
        // A vocabulary word must tokenize to exactly its own id.
        assert_eq!(tokenizer().tokenize("שלום"), vec![5]);
    }

    #[test]
    fn test_greedy_longest_match() {
        // "שלוםם" is not in the vocabulary; the greedy walk picks the
        // longest prefixes: "של" + "##ום" fails at the trailing "ם".
        // "שלו" -> "של" + "##ו", then nothing matches the rest -> [UNK].
        assert_eq!(tokenizer().tokenize("שלוℵ"), vec![1]);
        assert_eq!(tokenizer().tokenize("שלו"), vec![6, 8]);
    }

    #[test]
    fn test_unknown_word_is_unk() {
        assert_eq!(tokenizer().tokenize("קקק"), vec![1]);
    }

    #[test]
    fn test_overlong_word_is_unk() {
        let long: String = std::iter::repeat_n('א', 101).collect();
        assert_eq!(tokenizer().tokenize(&long), vec![1]);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(tokenizer().tokenize("HELLO"), vec![10]);
    }

    #[test]
    fn test_multi_word_concatenation() {
        assert_eq!(tokenizer().tokenize("שלום עולם"), vec![5, 9]);
    }

    #[test]
    fn test_encode_layout() {
        let encoded = tokenizer().encode("שלום עולם", 8);
        assert_eq!(encoded.input_ids, vec![2, 5, 9, 3, 0, 0, 0, 0]);
        assert_eq!(encoded.attention_mask, vec![1, 1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(encoded.token_type_ids, vec![0; 8]);
        assert!(encoded.mask_positions.is_empty());
    }

    #[test]
    fn test_encode_truncates_to_max_len() {
        let encoded = tokenizer().encode("שלום עולם שלום עולם שלום", 4);
        assert_eq!(encoded.input_ids.len(), 4);
        assert_eq!(encoded.input_ids, vec![2, 5, 9, 3]);
    }

    #[test]
    fn test_encode_with_mask_marks_first_occurrence() {
        let encoded = tokenizer().encode_with_mask("שלום עולם שלום", "שלום", 8);
        // [CLS] [MASK] עולם שלום [SEP]: only the first שלום is masked.
        assert_eq!(encoded.input_ids, vec![2, 4, 9, 5, 3, 0, 0, 0]);
        assert_eq!(encoded.mask_positions, vec![1]);
    }

    #[test]
    fn test_encode_with_mask_case_insensitive() {
        let encoded = tokenizer().encode_with_mask("HELLO עולם", "hello", 8);
        assert_eq!(encoded.input_ids[1], 4);
        assert_eq!(encoded.mask_positions, vec![1]);
    }

    #[test]
    fn test_encode_with_mask_multi_token_word() {
        // "שלו" tokenizes to two pieces; both become [MASK].
        let encoded = tokenizer().encode_with_mask("שלו עולם", "שלו", 8);
        assert_eq!(encoded.input_ids, vec![2, 4, 4, 9, 3, 0, 0, 0]);
        assert_eq!(encoded.mask_positions, vec![1, 2]);
    }

    #[test]
    fn test_encode_with_mask_absent_word() {
        let encoded = tokenizer().encode_with_mask("שלום עולם", "חסר", 8);
        assert!(encoded.mask_positions.is_empty());
    }

    #[test]
    fn test_is_in_vocab() {
        let t = tokenizer();
        assert!(t.is_in_vocab("שלום"));
        assert!(t.is_in_vocab("Hello"));
        assert!(!t.is_in_vocab("חסר"));
    }
}
