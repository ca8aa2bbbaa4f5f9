//! HTML export.
//!
//! A single self-contained RTL page mirroring the DOCX role styling.

use crate::text::PLACEHOLDER;
use crate::types::{Document, ParagraphRole};
use quick_xml::escape::escape;

const STYLE_BLOCK: &str = r#"<style>
body { direction: rtl; font-family: "David", "Times New Roman", serif; margin: 2em auto; max-width: 48em; }
h1.title { text-align: center; border: 1px solid #444; padding: 0.4em; }
p.body { text-align: justify; }
p.heading { font-weight: bold; }
p.heading .secnum { font-weight: bold; }
p.pageheader { color: #808080; font-size: 0.8em; border-bottom: 1px solid #808080; }
p.pagefooter { color: #808080; font-size: 0.8em; border-top: 1px solid #808080; }
p.centered { text-align: center; }
span.placeholder { font-style: italic; color: #999999; }
aside.margin { float: left; width: 12em; font-size: 0.85em; color: #555; border-inline-end: 1px solid #ccc; padding-inline-end: 0.5em; }
hr.pagebreak { border: none; border-top: 1px dashed #999; margin: 2em 0; }
</style>"#;

/// Render the document as a standalone RTL HTML page.
pub fn render_html(document: &Document) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html dir=\"rtl\" lang=\"he\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&document.title)));
    html.push_str(STYLE_BLOCK);
    html.push_str("\n</head>\n<body>\n");
    html.push_str(&format!("<h1 class=\"title\">{}</h1>\n", escape(&document.title)));

    for (index, page) in document.pages.iter().enumerate() {
        if index > 0 {
            html.push_str("<hr class=\"pagebreak\">\n");
        }

        if !page.margin_text.is_empty() {
            html.push_str("<aside class=\"margin\">\n");
            for paragraph in page.margin_text.split("\n\n").filter(|p| !p.trim().is_empty()) {
                html.push_str(&format!("<p>{}</p>\n", render_inline(paragraph)));
            }
            html.push_str("</aside>\n");
        }

        let mut body_roles = page
            .structure
            .paragraphs
            .iter()
            .filter(|p| matches!(p.role, ParagraphRole::Body | ParagraphRole::SectionHeading));

        for chunk in page.main_text.split("\n\n").map(str::trim).filter(|c| !c.is_empty()) {
            if let Some(text) = chunk.strip_prefix("[header] ") {
                html.push_str(&format!("<p class=\"pageheader\">{}</p>\n", render_inline(text)));
                continue;
            }
            if let Some(text) = chunk.strip_prefix("[footer] ") {
                html.push_str(&format!("<p class=\"pagefooter\">{}</p>\n", render_inline(text)));
                continue;
            }

            let entry = body_roles.next();
            let is_heading = entry.is_some_and(|e| e.role == ParagraphRole::SectionHeading);
            let is_centered = entry.is_some_and(|e| e.is_centered);
            let class = match (is_heading, is_centered) {
                (true, _) => "heading",
                (false, true) => "body centered",
                (false, false) => "body",
            };

            let inline = match entry.and_then(|e| e.section_number.as_deref()) {
                Some(number) if chunk.starts_with(number) => {
                    let rest = chunk[number.len()..].trim_start();
                    format!("<span class=\"secnum\">{}</span> {}", escape(number), render_inline(rest))
                }
                _ => render_inline(chunk),
            };
            html.push_str(&format!("<p class=\"{}\">{}</p>\n", class, inline));
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text and wrap `[...]` markers in their placeholder span.
fn render_inline(text: &str) -> String {
    text.split(' ')
        .map(|token| {
            if token == PLACEHOLDER {
                format!("<span class=\"placeholder\">{}</span>", escape(token))
            } else {
                escape(token).into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectedParagraph, DocumentPage, PageStructure};

    fn page(main_text: &str, structure: PageStructure) -> DocumentPage {
        DocumentPage {
            main_text: main_text.to_string(),
            margin_text: String::new(),
            structure,
        }
    }

    #[test]
    fn test_rtl_document() {
        let document = Document { title: "מסמך".to_string(), pages: vec![] };
        let html = render_html(&document);
        assert!(html.contains("<html dir=\"rtl\""));
        assert!(html.contains("<h1 class=\"title\">מסמך</h1>"));
    }

    #[test]
    fn test_escaping() {
        let document = Document {
            title: "a & b".to_string(),
            pages: vec![page("x < y", PageStructure::default())],
        };
        let html = render_html(&document);
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("x &lt; y"));
    }

    #[test]
    fn test_header_footer_classes() {
        let document = Document {
            title: "מסמך".to_string(),
            pages: vec![page("[header] עליון\n\nגוף\n\n[footer] תחתון", PageStructure::default())],
        };
        let html = render_html(&document);
        assert!(html.contains("<p class=\"pageheader\">עליון</p>"));
        assert!(html.contains("<p class=\"body\">גוף</p>"));
        assert!(html.contains("<p class=\"pagefooter\">תחתון</p>"));
    }

    #[test]
    fn test_section_heading_span() {
        let structure = PageStructure {
            paragraphs: vec![DetectedParagraph {
                line_ids: vec![1],
                role: crate::types::ParagraphRole::SectionHeading,
                section_number: Some("1.".to_string()),
                is_centered: false,
            }],
            ..Default::default()
        };
        let document = Document {
            title: "מסמך".to_string(),
            pages: vec![page("1. מבוא", structure)],
        };
        let html = render_html(&document);
        assert!(html.contains("<span class=\"secnum\">1.</span>"));
        assert!(html.contains("class=\"heading\""));
    }

    #[test]
    fn test_placeholder_span() {
        let document = Document {
            title: "מסמך".to_string(),
            pages: vec![page("שלום [...] עולם", PageStructure::default())],
        };
        let html = render_html(&document);
        assert!(html.contains("<span class=\"placeholder\">[...]</span>"));
    }

    #[test]
    fn test_page_break_between_pages() {
        let document = Document {
            title: "מסמך".to_string(),
            pages: vec![
                page("ראשון", PageStructure::default()),
                page("שני", PageStructure::default()),
            ],
        };
        let html = render_html(&document);
        assert_eq!(html.matches("hr class=\"pagebreak\"").count(), 1);
    }
}
