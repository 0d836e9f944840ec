//! Resume data attached to a chat message, in either of the shapes clients send.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::resume::extract::{extract_text, ExtractError};

/// Filename assumed for resumes sent as bare text.
pub const RAW_TEXT_FILENAME: &str = "resume.txt";

/// Wire shape of `resume_data`. Either a bare string of resume text or an
/// object describing an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumePayload {
    RawText(String),
    Structured {
        filename: String,
        #[serde(default)]
        extracted_text: Option<String>,
        #[serde(default)]
        base64_content: Option<String>,
        #[serde(default, alias = "filepath")]
        file_path: Option<String>,
    },
}

/// A resume normalized once at the chat boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeAttachment {
    pub filename: String,
    pub text: String,
    pub file_path: Option<String>,
}

impl ResumePayload {
    /// Resolves the payload to plain text. Returns `Ok(None)` when the payload
    /// carries no usable content. May run document extraction, so callers on
    /// the async path should use `spawn_blocking`.
    pub fn normalize(self) -> Result<Option<ResumeAttachment>, ExtractError> {
        match self {
            ResumePayload::RawText(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(ResumeAttachment {
                    filename: RAW_TEXT_FILENAME.to_string(),
                    text,
                    file_path: None,
                }))
            }
            ResumePayload::Structured {
                filename,
                extracted_text,
                base64_content,
                file_path,
            } => {
                let text = match extracted_text.filter(|t| !t.trim().is_empty()) {
                    Some(text) => text.trim().to_string(),
                    None => match base64_content.filter(|c| !c.trim().is_empty()) {
                        Some(encoded) => text_from_base64(&filename, &encoded)?,
                        None => return Ok(None),
                    },
                };
                if filename.trim().is_empty() || text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(ResumeAttachment {
                    filename,
                    text,
                    file_path: file_path.filter(|p| !p.trim().is_empty()),
                }))
            }
        }
    }
}

fn text_from_base64(filename: &str, encoded: &str) -> Result<String, ExtractError> {
    match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => extract_text(filename, &bytes).map(|t| t.trim().to_string()),
        // Not base64 after all; treat it as the resume body.
        Err(_) => Ok(encoded.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_string_deserializes_as_raw_text() {
        let payload: ResumePayload = serde_json::from_str(r#""Python developer""#).unwrap();
        let attachment = payload.normalize().unwrap().unwrap();
        assert_eq!(attachment.filename, RAW_TEXT_FILENAME);
        assert_eq!(attachment.text, "Python developer");
    }

    #[test]
    fn test_structured_prefers_extracted_text() {
        let payload: ResumePayload = serde_json::from_str(
            r#"{"filename":"s1_resume.pdf","extracted_text":" Rust engineer ","filepath":"resumes/s1_resume.pdf"}"#,
        )
        .unwrap();
        let attachment = payload.normalize().unwrap().unwrap();
        assert_eq!(attachment.text, "Rust engineer");
        assert_eq!(attachment.file_path.as_deref(), Some("resumes/s1_resume.pdf"));
    }

    #[test]
    fn test_structured_decodes_base64_text_file() {
        let encoded = STANDARD.encode("Figma and Sketch designer");
        let payload = ResumePayload::Structured {
            filename: "cv.txt".to_string(),
            extracted_text: None,
            base64_content: Some(encoded),
            file_path: None,
        };
        let attachment = payload.normalize().unwrap().unwrap();
        assert_eq!(attachment.text, "Figma and Sketch designer");
    }

    #[test]
    fn test_structured_without_content_is_none() {
        let payload: ResumePayload = serde_json::from_str(r#"{"filename":"cv.pdf"}"#).unwrap();
        assert_eq!(payload.normalize().unwrap(), None);
        let blank = ResumePayload::RawText("   ".to_string());
        assert_eq!(blank.normalize().unwrap(), None);
    }

    #[test]
    fn test_unsupported_base64_file_reports_error() {
        let payload = ResumePayload::Structured {
            filename: "cv.png".to_string(),
            extracted_text: None,
            base64_content: Some(STANDARD.encode([0u8, 1, 2, 3])),
            file_path: None,
        };
        assert!(payload.normalize().unwrap_err().to_string().starts_with("Error"));
    }
}
