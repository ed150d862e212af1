use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Classifies by filename suffix only, ignoring case.
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "PDF"),
            DocumentKind::Docx => write!(f, "DOCX"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub size: usize,
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadedDocument {
    pub fn new(name: String, content: Vec<u8>) -> Self {
        let size = content.len();
        Self {
            name,
            size,
            content,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: String) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_filename(&self.name)
    }
}
