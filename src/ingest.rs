use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// File contents ready for the summarizer: UTF-8 text, or base64 for images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContent {
    pub name: String,
    pub kind: ContentKind,
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8 text")]
    NotUtf8 { path: PathBuf },
    #[error("{path} is empty")]
    Empty { path: PathBuf },
}

impl SourceContent {
    pub fn text(name: impl Into<String>, mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ContentKind::Text,
            mime_type: mime_type.into(),
            data: text.into(),
        }
    }

    pub fn image(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            kind: ContentKind::Image,
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }
}

pub fn load_source(path: &Path) -> Result<SourceContent, IngestError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("input")
        .to_string();
    let bytes = std::fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(IngestError::Empty {
            path: path.to_path_buf(),
        });
    }

    let (kind, mime_type) = detect_mime(path);
    let content = match kind {
        ContentKind::Image => SourceContent::image(name, mime_type, &bytes),
        ContentKind::Text => {
            let text = String::from_utf8(bytes).map_err(|_| IngestError::NotUtf8 {
                path: path.to_path_buf(),
            })?;
            SourceContent::text(name, mime_type, text)
        }
    };
    debug!(
        name = %content.name,
        kind = content.kind.as_str(),
        mime = %content.mime_type,
        bytes = content.data.len(),
        "loaded source file"
    );
    Ok(content)
}

pub fn detect_mime(path: &Path) -> (ContentKind, &'static str) {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => (ContentKind::Image, "image/png"),
        "jpg" | "jpeg" => (ContentKind::Image, "image/jpeg"),
        "webp" => (ContentKind::Image, "image/webp"),
        "gif" => (ContentKind::Image, "image/gif"),
        "md" | "markdown" => (ContentKind::Text, "text/markdown"),
        "json" => (ContentKind::Text, "application/json"),
        "csv" => (ContentKind::Text, "text/csv"),
        "html" | "htm" => (ContentKind::Text, "text/html"),
        _ => (ContentKind::Text, "text/plain"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_images_by_extension() {
        assert_eq!(
            detect_mime(Path::new("board.JPG")),
            (ContentKind::Image, "image/jpeg")
        );
        assert_eq!(
            detect_mime(Path::new("notes.md")),
            (ContentKind::Text, "text/markdown")
        );
        assert_eq!(
            detect_mime(Path::new("main.rs")),
            (ContentKind::Text, "text/plain")
        );
        assert_eq!(detect_mime(Path::new("README")), (ContentKind::Text, "text/plain"));
    }

    #[test]
    fn images_are_base64_encoded() {
        let content = SourceContent::image("dot.png", "image/png", &[0x89, b'P', b'N', b'G']);
        assert_eq!(content.kind, ContentKind::Image);
        assert_eq!(content.data, "iVBORw==");
    }

    #[test]
    fn reads_text_and_rejects_binary() {
        let dir = std::env::temp_dir().join(format!("mmap-ingest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let notes = dir.join("notes.txt");
        std::fs::write(&notes, "Rust\n- ownership\n- traits\n").unwrap();
        let content = load_source(&notes).unwrap();
        assert_eq!(content.kind, ContentKind::Text);
        assert_eq!(content.name, "notes.txt");
        assert!(content.data.contains("ownership"));

        let binary = dir.join("blob.txt");
        std::fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(load_source(&binary), Err(IngestError::NotUtf8 { .. })));

        let empty = dir.join("empty.txt");
        std::fs::write(&empty, "").unwrap();
        assert!(matches!(load_source(&empty), Err(IngestError::Empty { .. })));

        assert!(matches!(
            load_source(&dir.join("missing.txt")),
            Err(IngestError::Read { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
