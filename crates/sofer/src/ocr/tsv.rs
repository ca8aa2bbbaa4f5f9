//! Tesseract-style TSV parsing.

use super::{TSV_MIN_FIELDS, TSV_WORD_LEVEL};

/// One word-level row of the OCR TSV output.
///
/// Columns: `level, page, block, par, line, word, left, top, width, height,
/// confidence, text`. Only `level == 5` rows become `TsvWord`s.
#[derive(Debug, Clone, PartialEq)]
pub struct TsvWord {
    pub block: u32,
    pub par: u32,
    pub line: u32,
    pub word: u32,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    pub text: String,
}

/// Parse word-level rows out of an OCR TSV page dump.
///
/// Malformed rows (wrong column count, non-numeric fields) and non-word
/// levels are silently skipped; a bad row never fails the page. The header
/// row is skipped the same way because its `level` column is not numeric.
pub fn parse_tsv_words(tsv_data: &str) -> Vec<TsvWord> {
    tsv_data.lines().filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<TsvWord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < TSV_MIN_FIELDS {
        return None;
    }

    let level = fields[0].parse::<u32>().ok()?;
    if level != TSV_WORD_LEVEL {
        return None;
    }

    let text = fields[11].trim();
    if text.is_empty() {
        return None;
    }

    Some(TsvWord {
        block: fields[2].parse().ok()?,
        par: fields[3].parse().ok()?,
        line: fields[4].parse().ok()?,
        word: fields[5].parse().ok()?,
        left: fields[6].parse().ok()?,
        top: fields[7].parse().ok()?,
        width: fields[8].parse().ok()?,
        height: fields[9].parse().ok()?,
        confidence: fields[10].parse().ok()?,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn test_parse_basic() {
        let tsv = format!("{HEADER}\n5\t1\t1\t0\t0\t0\t100\t50\t80\t30\t95.5\tשלום\n5\t1\t1\t0\t0\t1\t190\t50\t70\t30\t92\tעולם");
        let words = parse_tsv_words(&tsv);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "שלום");
        assert_eq!(words[0].left, 100.0);
        assert_eq!(words[0].confidence, 95.5);
        assert_eq!(words[1].word, 1);
    }

    #[test]
    fn test_non_word_levels_skipped() {
        let tsv = "1\t1\t0\t0\t0\t0\t0\t0\t2000\t3000\t-1\t\n4\t1\t1\t0\t0\t0\t90\t40\t500\t40\t-1\t\n5\t1\t1\t0\t0\t0\t100\t50\t80\t30\t91\tמילה";
        let words = parse_tsv_words(tsv);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "מילה");
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let tsv = "garbage line\n5\t1\t1\t0\t0\t0\t100\tx\t80\t30\t91\tמילה\n5\t1\t1\t0\t0\t0\t100\t50\t80\t30\t91\tטובה";
        let words = parse_tsv_words(tsv);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "טובה");
    }

    #[test]
    fn test_empty_text_skipped() {
        let tsv = "5\t1\t1\t0\t0\t0\t100\t50\t80\t30\t91\t   ";
        assert!(parse_tsv_words(tsv).is_empty());
    }

    #[test]
    fn test_text_trimmed() {
        let tsv = "5\t1\t1\t0\t0\t0\t100\t50\t80\t30\t91\t  שלום ";
        let words = parse_tsv_words(tsv);
        assert_eq!(words[0].text, "שלום");
    }

    #[test]
    fn test_ordinals_parsed() {
        let tsv = "5\t1\t2\t3\t7\t4\t100\t50\t80\t30\t91\tמילה";
        let words = parse_tsv_words(tsv);
        assert_eq!((words[0].block, words[0].par, words[0].line, words[0].word), (2, 3, 7, 4));
    }
}
