//! Résumé text extraction for uploaded files.

use tracing::{debug, warn};

use crate::errors::AppError;

/// An uploaded résumé as received from the multipart form.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some("application/pdf")
            || self.bytes.starts_with(b"%PDF")
            || self
                .file_name
                .as_deref()
                .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"))
    }

    fn is_plain_text(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|t| t.starts_with("text/plain"))
            || self
                .file_name
                .as_deref()
                .is_some_and(|n| n.to_ascii_lowercase().ends_with(".txt"))
    }
}

/// Extracts the résumé text. PDFs are parsed on a blocking worker.
/// Scanned PDFs without a text layer come back empty and are rejected.
pub async fn extract_resume_text(upload: ResumeUpload) -> Result<String, AppError> {
    let text = if upload.is_pdf() {
        let bytes = upload.bytes;
        match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("PDF text extraction failed: {e}");
                String::new()
            }
            // pdf-extract panics on some malformed files
            Err(e) => {
                warn!("PDF text extraction aborted: {e}");
                String::new()
            }
        }
    } else if upload.is_plain_text() {
        String::from_utf8(upload.bytes)
            .map_err(|_| AppError::Validation("Résumé text file is not valid UTF-8.".to_string()))?
    } else {
        return Err(AppError::Validation(
            "Unsupported résumé format. Upload a PDF or plain-text file.".to_string(),
        ));
    };

    let text = normalize_resume_text(&text);
    if text.is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from PDF. Please ensure it's a text-based PDF.".to_string(),
        ));
    }
    debug!("Extracted {} characters of résumé text", text.len());
    Ok(text)
}

/// Trims every line and collapses runs of blank lines.
pub fn normalize_resume_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run {
                out.push('\n');
            }
        }
        blank_run = false;
        out.push_str(line.trim_start());
    }
    out
}
