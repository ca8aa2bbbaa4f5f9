//! Page structure analysis.
//!
//! Purely geometric: from the non-margin word boxes it recovers headers and
//! footers (large vertical gaps, plus a content-based footer extension),
//! paragraph breaks (short lines and over-sized gaps), section headings and
//! centered paragraphs. All gap thresholds scale with the median inter-line
//! gap so the analysis is resolution-independent.

pub mod metrics;
pub mod section;

pub use metrics::{LineMetrics, collect_line_metrics};
pub use section::detect_section_number;

use crate::config::LayoutConfig;
use crate::types::{DetectedParagraph, PageStructure, ParagraphRole, WordBox};
use std::collections::BTreeSet;

/// Analyze one page's boxes into an ordered paragraph structure.
pub fn analyze_page(boxes: &[WordBox], config: &LayoutConfig) -> PageStructure {
    let lines = collect_line_metrics(boxes);
    if lines.is_empty() {
        return PageStructure::default();
    }
    if lines.len() < 2 {
        return PageStructure {
            paragraphs: vec![DetectedParagraph {
                line_ids: lines.iter().map(|l| l.line_id).collect(),
                role: ParagraphRole::Body,
                section_number: None,
                is_centered: false,
            }],
            header_lines: BTreeSet::new(),
            footer_lines: BTreeSet::new(),
        };
    }

    let median_gap = median_line_gap(&lines);
    let gap_threshold = config.header_gap_factor * median_gap;

    let header_lines = detect_header(&lines, gap_threshold, config.max_header_lines);
    let mut footer_lines = detect_footer(&lines, gap_threshold, config.max_header_lines);
    extend_footer_by_content(&lines, &header_lines, &mut footer_lines, config.footer_scan_lines);

    let body: Vec<&LineMetrics> = lines
        .iter()
        .filter(|l| !header_lines.contains(&l.line_id) && !footer_lines.contains(&l.line_id))
        .collect();

    let reference_width = percentile_width(&body, config.width_percentile);
    let paragraph_runs = split_paragraphs(&body, median_gap, reference_width, config);

    // Centering is judged against the full page extent, headers included.
    let page_min = lines.iter().map(|l| l.min_x).fold(f32::MAX, f32::min);
    let page_max = lines.iter().map(|l| l.max_x).fold(f32::MIN, f32::max);
    let page_center = (page_min + page_max) / 2.0;

    let mut paragraphs = Vec::new();
    if !header_lines.is_empty() {
        paragraphs.push(DetectedParagraph {
            line_ids: lines
                .iter()
                .filter(|l| header_lines.contains(&l.line_id))
                .map(|l| l.line_id)
                .collect(),
            role: ParagraphRole::Header,
            section_number: None,
            is_centered: false,
        });
    }
    for run in paragraph_runs {
        let first = run[0];
        let section_number = detect_section_number(&first.first_word, first.second_word.as_deref());
        let is_centered = is_centered(&run, page_center, reference_width, config);
        paragraphs.push(DetectedParagraph {
            line_ids: run.iter().map(|l| l.line_id).collect(),
            role: if section_number.is_some() {
                ParagraphRole::SectionHeading
            } else {
                ParagraphRole::Body
            },
            section_number,
            is_centered,
        });
    }
    if !footer_lines.is_empty() {
        paragraphs.push(DetectedParagraph {
            line_ids: lines
                .iter()
                .filter(|l| footer_lines.contains(&l.line_id))
                .map(|l| l.line_id)
                .collect(),
            role: ParagraphRole::Footer,
            section_number: None,
            is_centered: false,
        });
    }

    PageStructure { paragraphs, header_lines, footer_lines }
}

/// Median of the positive vertical gaps between adjacent lines.
fn median_line_gap(lines: &[LineMetrics]) -> f32 {
    let mut gaps: Vec<f32> = lines
        .windows(2)
        .map(|pair| pair[1].min_y - pair[0].max_y)
        .filter(|gap| *gap > 0.0)
        .collect();
    if gaps.is_empty() {
        return 0.0;
    }
    gaps.sort_by(|a, b| a.total_cmp(b));
    gaps[gaps.len() / 2]
}

/// Scan from the top: a gap larger than the threshold within the first few
/// lines separates a header block from the body.
fn detect_header(lines: &[LineMetrics], gap_threshold: f32, max_lines: usize) -> BTreeSet<i64> {
    let mut header = BTreeSet::new();
    if gap_threshold <= 0.0 {
        return header;
    }
    for i in 0..max_lines.min(lines.len() - 1) {
        header.insert(lines[i].line_id);
        let gap = lines[i + 1].min_y - lines[i].max_y;
        if gap > gap_threshold {
            return header;
        }
    }
    BTreeSet::new()
}

/// Mirror of `detect_header`, scanning upward from the bottom.
fn detect_footer(lines: &[LineMetrics], gap_threshold: f32, max_lines: usize) -> BTreeSet<i64> {
    let mut footer = BTreeSet::new();
    if gap_threshold <= 0.0 {
        return footer;
    }
    for i in 0..max_lines.min(lines.len() - 1) {
        let index = lines.len() - 1 - i;
        footer.insert(lines[index].line_id);
        let gap = lines[index].min_y - lines[index - 1].max_y;
        if gap > gap_threshold {
            return footer;
        }
    }
    BTreeSet::new()
}

/// Append trailing non-content lines (page numbers, stamps, Latin noise) to
/// the footer, stopping at the first real content line.
fn extend_footer_by_content(
    lines: &[LineMetrics],
    header: &BTreeSet<i64>,
    footer: &mut BTreeSet<i64>,
    scan_limit: usize,
) {
    let mut scanned = 0usize;
    for line in lines.iter().rev() {
        if footer.contains(&line.line_id) {
            continue;
        }
        if scanned >= scan_limit || header.contains(&line.line_id) {
            break;
        }
        scanned += 1;

        let sparse_non_hebrew = line.content_words <= 3 && line.hebrew_words == 0;
        let latin_noise = line.latin_words >= 3 && line.hebrew_words <= 1;
        if sparse_non_hebrew || latin_noise {
            footer.insert(line.line_id);
        } else {
            break;
        }
    }
}

/// Width below which a body line is considered "short" at the given
/// percentile reference.
fn percentile_width(body: &[&LineMetrics], percentile: f32) -> f32 {
    if body.is_empty() {
        return 0.0;
    }
    let mut widths: Vec<f32> = body.iter().map(|l| l.width()).collect();
    widths.sort_by(|a, b| a.total_cmp(b));
    let index = ((widths.len() - 1) as f32 * percentile).round() as usize;
    widths[index.min(widths.len() - 1)]
}

/// Walk body lines in Y order and split them into paragraphs. A short line
/// ends its paragraph; so does a paragraph-number change combined with an
/// over-sized gap to the next line.
fn split_paragraphs<'a>(
    body: &[&'a LineMetrics],
    median_gap: f32,
    reference_width: f32,
    config: &LayoutConfig,
) -> Vec<Vec<&'a LineMetrics>> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&LineMetrics> = Vec::new();

    for (i, line) in body.iter().enumerate() {
        current.push(*line);

        let is_short = line.width() < config.short_line_ratio * reference_width;
        let breaks_to_next = body.get(i + 1).is_some_and(|next| {
            next.paragraph_number() != line.paragraph_number()
                && next.min_y - line.max_y > config.paragraph_gap_factor * median_gap
        });

        if is_short || breaks_to_next {
            paragraphs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

fn is_centered(run: &[&LineMetrics], page_center: f32, reference_width: f32, config: &LayoutConfig) -> bool {
    if reference_width <= 0.0 {
        return false;
    }
    run.iter().all(|line| {
        line.width() < config.short_line_ratio * reference_width
            && (line.midpoint() - page_center).abs() < config.centering_ratio * reference_width
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoxFrame;

    fn word(text: &str, line_id: i64, word_num: u32, x: f32, y: f32, width: f32) -> WordBox {
        WordBox {
            id: line_id as u64 * 100 + u64::from(word_num),
            text: text.to_string(),
            frame: BoxFrame::new(x, y, width, 20.0),
            line_id,
            word_num,
            confidence: 90.0,
            is_margin: false,
            is_placeholder: false,
        }
    }

    /// A full line of Hebrew words at the given Y.
    fn full_line(line_id: i64, y: f32) -> Vec<WordBox> {
        (0..6)
            .map(|i| word("מילים", line_id, i, 100.0 + 150.0 * i as f32, y, 140.0))
            .collect()
    }

    /// A short line (about a third of the full width).
    fn short_line(line_id: i64, y: f32, x: f32) -> Vec<WordBox> {
        (0..2).map(|i| word("קצר", line_id, i, x + 150.0 * i as f32, y, 140.0)).collect()
    }

    #[test]
    fn test_empty_page() {
        let structure = analyze_page(&[], &LayoutConfig::default());
        assert!(structure.paragraphs.is_empty());
        assert!(structure.header_lines.is_empty());
    }

    #[test]
    fn test_single_line_page_is_one_body_paragraph() {
        let boxes = full_line(1, 100.0);
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        assert_eq!(structure.paragraphs.len(), 1);
        assert_eq!(structure.paragraphs[0].role, ParagraphRole::Body);
        assert_eq!(structure.paragraphs[0].line_ids, vec![1]);
    }

    #[test]
    fn test_header_split_on_large_gap() {
        // Lines at Y = 10, 200, 230, 260, 290: median gap 10, first gap 170.
        let mut boxes = full_line(1, 10.0);
        for (i, y) in [200.0, 230.0, 260.0, 290.0].iter().enumerate() {
            boxes.extend(full_line(2 + i as i64, *y));
        }
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        assert_eq!(structure.header_lines, BTreeSet::from([1]));
        assert_eq!(structure.paragraphs[0].role, ParagraphRole::Header);
        let body_lines: Vec<i64> = structure
            .paragraphs
            .iter()
            .filter(|p| p.role == ParagraphRole::Body)
            .flat_map(|p| p.line_ids.clone())
            .collect();
        assert_eq!(body_lines, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_no_header_without_gap() {
        let mut boxes = Vec::new();
        for i in 0..6 {
            boxes.extend(full_line(1 + i, 100.0 + 30.0 * i as f32));
        }
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        assert!(structure.header_lines.is_empty());
        assert!(structure.footer_lines.is_empty());
    }

    #[test]
    fn test_footer_split_on_large_gap() {
        let mut boxes = Vec::new();
        for i in 0..4 {
            boxes.extend(full_line(1 + i, 100.0 + 30.0 * i as f32));
        }
        boxes.extend(full_line(9, 600.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        assert_eq!(structure.footer_lines, BTreeSet::from([9]));
        assert_eq!(structure.paragraphs.last().unwrap().role, ParagraphRole::Footer);
    }

    #[test]
    fn test_content_footer_extension_catches_latin_noise() {
        let mut boxes = Vec::new();
        for i in 0..4 {
            boxes.extend(full_line(1 + i, 100.0 + 30.0 * i as f32));
        }
        // Bottom line: three Latin words, no Hebrew.
        boxes.extend(
            ["scan", "noise", "ergo"]
                .iter()
                .enumerate()
                .map(|(i, t)| word(t, 8, i as u32, 100.0 + 150.0 * i as f32, 220.0, 140.0)),
        );
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        assert!(structure.footer_lines.contains(&8));
    }

    #[test]
    fn test_paragraph_break_on_short_line() {
        let mut boxes = Vec::new();
        boxes.extend(full_line(1, 100.0));
        boxes.extend(full_line(2, 130.0));
        boxes.extend(short_line(3, 160.0, 100.0));
        boxes.extend(full_line(4, 190.0));
        boxes.extend(full_line(5, 220.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        let bodies: Vec<Vec<i64>> = structure
            .paragraphs
            .iter()
            .filter(|p| p.role == ParagraphRole::Body)
            .map(|p| p.line_ids.clone())
            .collect();
        assert_eq!(bodies, vec![vec![1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_paragraph_break_on_block_change_with_gap() {
        let mut boxes = Vec::new();
        boxes.extend(full_line(1_000_001, 100.0));
        boxes.extend(full_line(1_000_002, 140.0));
        boxes.extend(full_line(1_000_003, 180.0));
        // New OCR paragraph and a gap of 1.75x the median: a paragraph
        // break, but not large enough for header/footer detection.
        boxes.extend(full_line(2_000_001, 235.0));
        boxes.extend(full_line(2_000_002, 275.0));
        boxes.extend(full_line(2_000_003, 315.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        let bodies: Vec<Vec<i64>> = structure
            .paragraphs
            .iter()
            .filter(|p| p.role == ParagraphRole::Body)
            .map(|p| p.line_ids.clone())
            .collect();
        assert_eq!(
            bodies,
            vec![
                vec![1_000_001, 1_000_002, 1_000_003],
                vec![2_000_001, 2_000_002, 2_000_003]
            ]
        );
    }

    #[test]
    fn test_same_block_gap_does_not_break() {
        let mut boxes = Vec::new();
        boxes.extend(full_line(1_000_001, 100.0));
        boxes.extend(full_line(1_000_002, 140.0));
        boxes.extend(full_line(1_000_003, 180.0));
        boxes.extend(full_line(1_000_004, 235.0));
        boxes.extend(full_line(1_000_005, 275.0));
        boxes.extend(full_line(1_000_006, 315.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        let bodies: Vec<Vec<i64>> = structure
            .paragraphs
            .iter()
            .filter(|p| p.role == ParagraphRole::Body)
            .map(|p| p.line_ids.clone())
            .collect();
        assert_eq!(bodies.len(), 1);
    }

    #[test]
    fn test_section_heading_role() {
        let mut boxes = Vec::new();
        let mut heading = vec![word("א.", 1, 0, 850.0, 100.0, 40.0)];
        heading.push(word("הגדרות", 1, 1, 650.0, 100.0, 180.0));
        boxes.extend(heading);
        boxes.extend(full_line(2, 130.0));
        boxes.extend(full_line(3, 160.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        let heading = structure
            .paragraphs
            .iter()
            .find(|p| p.role == ParagraphRole::SectionHeading)
            .expect("section heading paragraph");
        assert_eq!(heading.section_number.as_deref(), Some("א."));
        assert!(heading.line_ids.contains(&1));
    }

    #[test]
    fn test_split_section_marker_detected() {
        let mut boxes = vec![
            word("1", 1, 0, 900.0, 100.0, 20.0),
            word(".", 1, 1, 870.0, 100.0, 10.0),
            word("מבוא", 1, 2, 700.0, 100.0, 150.0),
        ];
        boxes.extend(full_line(2, 130.0));
        boxes.extend(full_line(3, 160.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        let heading = structure
            .paragraphs
            .iter()
            .find(|p| p.role == ParagraphRole::SectionHeading)
            .expect("section heading paragraph");
        assert_eq!(heading.section_number.as_deref(), Some("1."));
    }

    #[test]
    fn test_centered_paragraph() {
        let mut boxes = Vec::new();
        boxes.extend(full_line(1, 100.0));
        // A short line closes the first paragraph, so the centered line
        // below forms a paragraph of its own.
        boxes.extend(short_line(2, 130.0, 100.0));
        // Page spans 100..990; this short line is centered around 545.
        boxes.extend(short_line(3, 160.0, 400.0));
        boxes.extend(full_line(4, 190.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        let centered: Vec<&DetectedParagraph> =
            structure.paragraphs.iter().filter(|p| p.is_centered).collect();
        assert_eq!(centered.len(), 1);
        assert_eq!(centered[0].line_ids, vec![3]);
    }

    #[test]
    fn test_left_aligned_short_line_not_centered() {
        let mut boxes = Vec::new();
        boxes.extend(full_line(1, 100.0));
        boxes.extend(short_line(2, 130.0, 100.0));
        // Short but hugging the right edge of the column.
        boxes.extend(short_line(3, 160.0, 700.0));
        boxes.extend(full_line(4, 190.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());
        assert!(structure.paragraphs.iter().all(|p| !p.is_centered));
    }

    #[test]
    fn test_paragraph_line_ids_disjoint_and_cover() {
        let mut boxes = full_line(1, 10.0);
        for i in 0..5 {
            boxes.extend(full_line(2 + i, 200.0 + 30.0 * i as f32));
        }
        boxes.extend(full_line(9, 600.0));
        let structure = analyze_page(&boxes, &LayoutConfig::default());

        let mut seen = BTreeSet::new();
        for paragraph in &structure.paragraphs {
            for id in &paragraph.line_ids {
                assert!(seen.insert(*id), "line {} appears twice", id);
            }
        }
        let all_ids: BTreeSet<i64> = collect_line_metrics(&boxes).iter().map(|l| l.line_id).collect();
        assert_eq!(seen, all_ids);
    }
}
