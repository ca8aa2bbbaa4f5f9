//! Page reconstruction orchestration.
//!
//! Per page the stages run sequentially: ingest → margin tagging → LM
//! correction → layout analysis → text rendering. Across pages, a bounded
//! number of reconstructions run concurrently sharing one LM handle;
//! results are re-ordered to match the input regardless of completion
//! order. Dropping the returned future aborts the in-flight page tasks.

use crate::config::ReconstructionConfig;
use crate::correct::LmPostProcessor;
use crate::emit;
use crate::error::{Result, SoferError};
use crate::layout::analyze_page;
use crate::lm::MaskedLm;
use crate::ocr::{build_word_boxes, parse_tsv_words};
use crate::types::{Document, DocumentPage, PageOutput};
use crate::watermark::WatermarkFilter;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Reconstruct one page from its OCR TSV dump.
///
/// Never fails: malformed rows are skipped and an empty page yields an
/// empty structure and empty text.
pub async fn process_page(tsv: &str, lm: &MaskedLm, config: &ReconstructionConfig) -> PageOutput {
    let rows = parse_tsv_words(tsv);
    let mut boxes = build_word_boxes(rows, &config.filter);

    LmPostProcessor::new(lm, &config.lm).run(&mut boxes).await;

    let structure = analyze_page(&boxes, &config.layout);
    let main_text = emit::page_text(&boxes, &structure);
    let margin_text = emit::margin_text(&boxes);

    PageOutput { boxes, structure, main_text, margin_text }
}

/// Reconstruct a multi-page export.
///
/// Up to `config.lm.max_concurrent_pages` pages run at once, sharing the
/// LM adapter; output order always matches input order. After all pages
/// complete, repeating watermark paragraphs are removed.
pub async fn process_pages(
    pages: Vec<String>,
    lm: Arc<MaskedLm>,
    config: &ReconstructionConfig,
) -> Result<Vec<PageOutput>> {
    if pages.is_empty() {
        return Ok(vec![]);
    }

    let config = Arc::new(config.clone());
    let semaphore = Arc::new(Semaphore::new(config.lm.max_concurrent_pages.max(1)));

    let mut tasks = JoinSet::new();
    for (index, tsv) in pages.into_iter().enumerate() {
        let lm = Arc::clone(&lm);
        let config = Arc::clone(&config);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("page semaphore is never closed");
            let output = process_page(&tsv, &lm, &config).await;
            (index, output)
        });
    }

    let mut results: Vec<Option<PageOutput>> = std::iter::repeat_with(|| None).take(tasks.len()).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, output)) => results[index] = Some(output),
            Err(join_err) => {
                return Err(SoferError::Other(format!("page task panicked: {}", join_err)));
            }
        }
    }

    let mut outputs: Vec<PageOutput> = results
        .into_iter()
        .map(|r| r.expect("every spawned page task reports exactly once"))
        .collect();

    let filter = WatermarkFilter::detect(&outputs);
    if !filter.is_empty() {
        for page in &mut outputs {
            filter.strip(page);
        }
    }

    Ok(outputs)
}

/// Assemble reconstructed pages into an exportable document.
pub fn build_document(pages: &[PageOutput], config: &ReconstructionConfig) -> Document {
    let title = config
        .export
        .document_title
        .clone()
        .unwrap_or_else(|| "מסמך סרוק".to_string());
    Document {
        title,
        pages: pages.iter().map(DocumentPage::from).collect(),
    }
}
