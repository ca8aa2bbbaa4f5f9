//! Left margin column detection.

use crate::config::MarginConfig;
use crate::types::WordBox;

/// Find the vertical gap separating the main text from a left-side margin
/// column and flag every box left of it.
///
/// The page width is not known at this point, so it is derived from the
/// rightmost box left edge with 10% slack. The margin boundary is searched
/// as the largest gap between adjacent left edges whose midpoint falls in
/// the configured band; narrow gaps are rejected. Returns the boundary X
/// when a margin column was found.
pub fn tag_margin_boxes(boxes: &mut [WordBox], config: &MarginConfig) -> Option<f32> {
    if boxes.len() < config.min_boxes {
        return None;
    }

    let max_x = boxes.iter().map(|b| b.frame.x).fold(f32::MIN, f32::max);
    if max_x <= 0.0 {
        return None;
    }
    let tsv_width = max_x * 1.1;
    let band = (config.band_start * tsv_width, config.band_end * tsv_width);

    let mut edges: Vec<f32> = boxes.iter().map(|b| b.frame.x).collect();
    edges.sort_by(|a, b| a.total_cmp(b));

    let mut best_gap = 0.0f32;
    let mut boundary = None;
    for pair in edges.windows(2) {
        let gap = pair[1] - pair[0];
        let midpoint = (pair[0] + pair[1]) / 2.0;
        if midpoint >= band.0 && midpoint <= band.1 && gap > best_gap {
            best_gap = gap;
            boundary = Some(midpoint);
        }
    }

    let boundary = boundary?;
    if best_gap <= config.min_gap_ratio * tsv_width {
        return None;
    }

    for word in boxes.iter_mut() {
        if word.frame.x < boundary {
            word.is_margin = true;
        }
    }
    tracing::debug!(boundary, best_gap, "margin column detected");
    Some(boundary)
}
