//! Plain-text extraction from uploaded resumes (PDF, DOCX, TXT).

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::patterns::{self, PatternSet};

/// Extracted text longer than this is cut and suffixed with "...".
pub const MAX_EXTRACTED_CHARS: usize = 5000;

/// Every variant renders with a leading "Error" so it can be shown to users verbatim.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error: unsupported file type '{0}'. Only PDF, DOCX and TXT are accepted.")]
    Unsupported(String),

    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),

    #[error("Error: No readable text found in PDF. The PDF might be image-based or corrupted.")]
    EmptyPdf,

    #[error("Error extracting text from DOCX: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if lower.ends_with(".txt") {
            Some(DocumentKind::Txt)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Docx => ".docx",
            DocumentKind::Txt => ".txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Txt => "text/plain",
        }
    }
}

/// Extracts text from a document, dispatching on the filename extension.
/// CPU-bound; call from `spawn_blocking` in async contexts.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_filename(filename)
        .ok_or_else(|| ExtractError::Unsupported(filename.to_string()))?;

    match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes).map(|t| clean_text(&t)),
        DocumentKind::Txt => Ok(clean_text(&String::from_utf8_lossy(bytes))),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        return Err(ExtractError::EmptyPdf);
    }
    Ok(truncate_chars(&collapsed, MAX_EXTRACTED_CHARS))
}

static DOCX_PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    patterns::compile_all(&[
        r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:(tab|br|cr)\b[^>]*/?>",
        r"&#(?:x([0-9a-fA-F]+)|([0-9]+));",
    ])
});

/// Pulls paragraph text out of `word/document.xml`. Tabs become spaces and
/// breaks become newlines.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let docx = patterns::get(&DOCX_PATTERNS).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let (run, char_ref) = (&docx[0], &docx[1]);

    let paragraphs: Vec<String> = xml
        .split("</w:p>")
        .map(|p| {
            run.captures_iter(p)
                .map(|c| match (c.get(1), c.get(2).map(|m| m.as_str())) {
                    (Some(text), _) => unescape_xml(text.as_str(), char_ref),
                    (None, Some("tab")) => " ".to_string(),
                    (None, _) => "\n".to_string(),
                })
                .collect::<String>()
        })
        .filter(|p| !p.trim().is_empty())
        .collect();

    Ok(paragraphs.join("\n"))
}

fn unescape_xml(text: &str, char_ref: &Regex) -> String {
    let decoded = char_ref.replace_all(text, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Collapses repeated spaces, trims each line, and keeps at most one blank line in a row.
pub fn clean_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" ");
        let line = line.trim().to_string();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

/// Cuts `text` to `max` characters, appending "..." when anything was removed.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_kind_from_filename_is_case_insensitive() {
        assert_eq!(DocumentKind::from_filename("CV.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("cv.docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_filename("cv.txt"), Some(DocumentKind::Txt));
        assert_eq!(DocumentKind::from_filename("cv.odt"), None);
    }

    #[test]
    fn test_unsupported_error_starts_with_error() {
        let err = extract_text("photo.png", b"..").unwrap_err();
        assert!(err.to_string().starts_with("Error"));
    }

    #[test]
    fn test_txt_is_cleaned() {
        let text = extract_text("cv.txt", b"  Jane   Doe  \n\n\n\nPython  developer\n").unwrap();
        assert_eq!(text, "Jane Doe\n\nPython developer");
    }

    #[test]
    fn test_docx_paragraphs_and_entities() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve"> Doe</w:t></w:r></w:p>
            <w:p><w:r><w:t>R&amp;D, Python &lt;3</w:t></w:r></w:p>
            <w:p></w:p>
        </w:body></w:document>"#;
        let text = extract_text("cv.docx", &build_docx(xml)).unwrap();
        assert_eq!(text, "Jane Doe\nR&D, Python <3");
    }

    #[test]
    fn test_docx_tabs_breaks_and_character_references() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Skills:</w:t><w:tab/><w:t>Rust</w:t><w:br/><w:t>Go</w:t></w:r></w:p>
            <w:p><w:r><w:t>Jane&#8217;s caf&#xE9; &amp;#38;</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let text = extract_text("cv.docx", &build_docx(xml)).unwrap();
        assert_eq!(text, "Skills: Rust\nGo\nJane\u{2019}s caf\u{e9} &#38;");
    }

    #[test]
    fn test_docx_without_document_part_fails() {
        let err = extract_text("cv.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
        assert!(err.to_string().starts_with("Error"));
    }

    #[test]
    fn test_invalid_pdf_is_reported() {
        let err = extract_text("cv.pdf", b"definitely not a pdf").unwrap_err();
        assert!(err.to_string().starts_with("Error"));
    }

    #[test]
    fn test_truncate_chars_appends_ellipsis() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ééé", 2), "éé...");
    }
}
