//! Office Open XML (DOCX) serialization.
//!
//! Produces a minimal right-to-left WordprocessingML package: content
//! types, package relationships, a style sheet and the document part, all
//! zipped. Styling follows the reconstructed roles: a large bordered
//! centered title, justified RTL body text, bold section headings with the
//! section number as its own run, small gray ruled header/footer lines,
//! and italic gray `[...]` placeholder runs. Margin paragraphs render in a
//! narrow text frame anchored to the outer page edge.

use crate::error::Result;
use crate::text::PLACEHOLDER;
use crate::types::{Document, DocumentPage, ParagraphRole};
use quick_xml::escape::escape;
use std::io::Write;
use std::path::Path;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles.xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults>
<w:rPrDefault><w:rPr><w:rFonts w:ascii="David" w:hAnsi="David" w:cs="David"/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:rPrDefault>
<w:pPrDefault><w:pPr><w:bidi/></w:pPr></w:pPrDefault>
</w:docDefaults>
<w:style w:type="paragraph" w:styleId="Normal" w:default="1">
<w:name w:val="Normal"/>
<w:pPr><w:bidi/><w:jc w:val="both"/></w:pPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Title">
<w:name w:val="Title"/>
<w:basedOn w:val="Normal"/>
<w:pPr><w:bidi/><w:jc w:val="center"/><w:pBdr><w:top w:val="single" w:sz="8" w:space="4" w:color="auto"/><w:bottom w:val="single" w:sz="8" w:space="4" w:color="auto"/><w:left w:val="single" w:sz="8" w:space="4" w:color="auto"/><w:right w:val="single" w:sz="8" w:space="4" w:color="auto"/></w:pBdr><w:spacing w:after="240"/></w:pPr>
<w:rPr><w:b/><w:bCs/><w:sz w:val="40"/><w:szCs w:val="40"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading1">
<w:name w:val="heading 1"/>
<w:basedOn w:val="Normal"/>
<w:pPr><w:bidi/><w:spacing w:before="240" w:after="120"/></w:pPr>
<w:rPr><w:b/><w:bCs/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Header">
<w:name w:val="header"/>
<w:basedOn w:val="Normal"/>
<w:pPr><w:bidi/><w:pBdr><w:bottom w:val="single" w:sz="4" w:space="2" w:color="808080"/></w:pBdr></w:pPr>
<w:rPr><w:color w:val="808080"/><w:sz w:val="18"/><w:szCs w:val="18"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Footer">
<w:name w:val="footer"/>
<w:basedOn w:val="Normal"/>
<w:pPr><w:bidi/><w:pBdr><w:top w:val="single" w:sz="4" w:space="2" w:color="808080"/></w:pBdr></w:pPr>
<w:rPr><w:color w:val="808080"/><w:sz w:val="18"/><w:szCs w:val="18"/></w:rPr>
</w:style>
</w:styles>"#;

/// Serialize the document and write it to `path`.
///
/// The package is assembled fully in memory first; a failing serialization
/// leaves no partial file behind.
pub fn write_docx(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let bytes = docx_bytes(document)?;
    std::fs::write(path.as_ref(), bytes)?;
    Ok(())
}

/// Serialize the document into DOCX (ZIP) bytes.
pub fn docx_bytes(document: &Document) -> Result<Vec<u8>> {
    let document_xml = render_document_xml(document);

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
        ("word/styles.xml", STYLES_XML),
        ("word/document.xml", document_xml.as_str()),
    ] {
        writer.start_file(name, options)?;
        writer.write_all(content.as_bytes())?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Role and annotations resolved for one rendered text paragraph.
struct ResolvedParagraph<'a> {
    text: &'a str,
    role: ParagraphRole,
    section_number: Option<&'a str>,
    is_centered: bool,
}

/// Re-align the page's text paragraphs with its structure.
///
/// The main text carries `[header]`/`[footer]` labels; body paragraphs are
/// matched against the structure's body entries in order. When the counts
/// drift (placeholder collapsing can merge neighbors), remaining paragraphs
/// fall back to plain body styling.
fn resolve_paragraphs(page: &DocumentPage) -> Vec<ResolvedParagraph<'_>> {
    let mut body_entries = page
        .structure
        .paragraphs
        .iter()
        .filter(|p| matches!(p.role, ParagraphRole::Body | ParagraphRole::SectionHeading));

    page.main_text
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            if let Some(text) = chunk.strip_prefix("[header] ") {
                return ResolvedParagraph {
                    text,
                    role: ParagraphRole::Header,
                    section_number: None,
                    is_centered: false,
                };
            }
            if let Some(text) = chunk.strip_prefix("[footer] ") {
                return ResolvedParagraph {
                    text,
                    role: ParagraphRole::Footer,
                    section_number: None,
                    is_centered: false,
                };
            }
            match body_entries.next() {
                Some(entry) => ResolvedParagraph {
                    text: chunk,
                    role: entry.role,
                    section_number: entry.section_number.as_deref(),
                    is_centered: entry.is_centered,
                },
                None => ResolvedParagraph {
                    text: chunk,
                    role: ParagraphRole::Body,
                    section_number: None,
                    is_centered: false,
                },
            }
        })
        .collect()
}

fn render_document_xml(document: &Document) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);
    xml.push_str("<w:body>");

    push_paragraph(&mut xml, &document.title, "Title", false, None, false);

    for (index, page) in document.pages.iter().enumerate() {
        if index > 0 {
            xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        }
        render_page(&mut xml, page);
    }

    xml.push_str(
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/><w:bidi/></w:sectPr>"#,
    );
    xml.push_str("</w:body></w:document>");
    xml
}

fn render_page(xml: &mut String, page: &DocumentPage) {
    // Margin annotations lead the page so their frames anchor alongside
    // the following body text.
    for paragraph in page.margin_text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        push_paragraph(xml, paragraph, "Normal", true, None, false);
    }

    for paragraph in resolve_paragraphs(page) {
        let style = match paragraph.role {
            ParagraphRole::Header => "Header",
            ParagraphRole::Footer => "Footer",
            ParagraphRole::SectionHeading => "Heading1",
            ParagraphRole::Body => "Normal",
        };
        push_paragraph(
            xml,
            paragraph.text,
            style,
            false,
            paragraph.section_number,
            paragraph.is_centered,
        );
    }
}

fn push_paragraph(
    xml: &mut String,
    text: &str,
    style: &str,
    in_margin_frame: bool,
    section_number: Option<&str>,
    is_centered: bool,
) {
    xml.push_str("<w:p><w:pPr>");
    xml.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, style));
    if in_margin_frame {
        xml.push_str(
            r#"<w:framePr w:w="2400" w:hSpace="240" w:wrap="around" w:vAnchor="text" w:hAnchor="page" w:xAlign="left"/>"#,
        );
    }
    xml.push_str("<w:bidi/>");
    if is_centered {
        xml.push_str(r#"<w:jc w:val="center"/>"#);
    }
    xml.push_str("</w:pPr>");

    let mut body = text;
    if let Some(number) = section_number {
        if let Some(rest) = text.strip_prefix(number) {
            push_run(xml, number, RunStyle::SectionNumber);
            body = rest.trim_start();
            if !body.is_empty() {
                push_run(xml, " ", RunStyle::Plain);
            }
        }
    }
    push_text_runs(xml, body);

    xml.push_str("</w:p>");
}

#[derive(Clone, Copy, PartialEq)]
enum RunStyle {
    Plain,
    SectionNumber,
    Placeholder,
}

/// Emit the paragraph text as runs, giving `[...]` markers their italic
/// gray styling.
fn push_text_runs(xml: &mut String, text: &str) {
    let mut segments: Vec<(String, RunStyle)> = Vec::new();
    for token in text.split(' ') {
        if token == PLACEHOLDER {
            segments.push((token.to_string(), RunStyle::Placeholder));
        } else {
            match segments.last_mut() {
                Some((buffer, RunStyle::Plain)) => {
                    buffer.push(' ');
                    buffer.push_str(token);
                }
                _ => segments.push((token.to_string(), RunStyle::Plain)),
            }
        }
    }

    let count = segments.len();
    for (index, (segment, style)) in segments.into_iter().enumerate() {
        let mut content = segment;
        if index + 1 < count {
            content.push(' ');
        }
        push_run(xml, &content, style);
    }
}

fn push_run(xml: &mut String, text: &str, style: RunStyle) {
    if text.is_empty() {
        return;
    }
    xml.push_str("<w:r>");
    match style {
        RunStyle::Plain => {}
        RunStyle::SectionNumber => xml.push_str("<w:rPr><w:b/><w:bCs/></w:rPr>"),
        RunStyle::Placeholder => {
            xml.push_str(r#"<w:rPr><w:i/><w:iCs/><w:color w:val="999999"/></w:rPr>"#)
        }
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&escape(text));
    xml.push_str("</w:t></w:r>");
}
