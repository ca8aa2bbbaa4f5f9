//! WordPiece vocabulary.

use crate::{Result, SoferError};
use ahash::{AHashMap, AHashSet};
use std::io::BufRead;
use std::path::Path;

/// Well-known special token literals.
pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const MASK_TOKEN: &str = "[MASK]";

/// Ids of the five special tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub pad: u32,
    pub unk: u32,
    pub cls: u32,
    pub sep: u32,
    pub mask: u32,
}

/// A fixed vocabulary loaded from a one-token-per-line file. The line
/// number (0-based) is the token id.
#[derive(Debug)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: AHashMap<String, u32>,
    lowercase: AHashSet<String>,
    specials: SpecialTokens,
}

impl Vocabulary {
    /// Load the vocabulary from a UTF-8 text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Load the vocabulary from any line-oriented reader.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut tokens = Vec::new();
        for line in reader.lines() {
            let line = line?;
            tokens.push(line.trim_end_matches(['\r', '\n']).to_string());
        }
        Self::from_tokens(tokens)
    }

    /// Build the vocabulary from an ordered token list. Empty entries keep
    /// their id slot but are not resolvable.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self> {
        if tokens.iter().all(|t| t.is_empty()) {
            return Err(SoferError::vocabulary("vocabulary is empty"));
        }

        let mut ids = AHashMap::with_capacity(tokens.len());
        let mut lowercase = AHashSet::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                continue;
            }
            ids.entry(token.clone()).or_insert(id as u32);
            lowercase.insert(token.to_lowercase());
        }

        let special = |literal: &str, fallback: u32| ids.get(literal).copied().unwrap_or(fallback);
        let specials = SpecialTokens {
            pad: special(PAD_TOKEN, 0),
            unk: special(UNK_TOKEN, 1),
            cls: special(CLS_TOKEN, 2),
            sep: special(SEP_TOKEN, 3),
            mask: special(MASK_TOKEN, 4),
        };

        Ok(Self { tokens, ids, lowercase, specials })
    }

    pub fn specials(&self) -> SpecialTokens {
        self.specials
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Exact-token id lookup.
    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    /// Token string for an id, when the id has a (non-empty) entry.
    pub fn token_at(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str).filter(|t| !t.is_empty())
    }

    /// Case-insensitive whole-word membership test.
    pub fn contains_word(&self, word: &str) -> bool {
        self.lowercase.contains(&word.to_lowercase())
    }
}
