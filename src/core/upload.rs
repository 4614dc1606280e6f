//! Single-file attachment handling.
//!
//! At most one file is attached at a time. Attaching runs in two phases so
//! the read can happen off the UI task: [`FileUploadManager::begin`] checks
//! the size and marks the attachment pending, the returned [`PendingRead`]
//! does the I/O, and [`FileUploadManager::complete`] applies the outcome.
//! While a read is pending there is no content to send.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;
use tracing::debug;

/// Hard ceiling on attachment size, in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024;

/// Extensions the file picker suggests. Not enforced.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["js", "ts", "tsx", "jsx", "css", "scss", "html"];

pub const TOO_LARGE_MESSAGE: &str = "File exceeds 5KB.";
pub const UNREADABLE_MESSAGE: &str = "Could not read file. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub text_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttachmentState {
    #[default]
    Empty,
    Pending {
        name: String,
        size_bytes: u64,
    },
    Ready(UploadedFile),
}

/// Why a file was not attached. Receiving one means the caller should reset
/// whatever input control named the file.
#[derive(Debug)]
pub enum UploadRejection {
    TooLarge { name: String, size_bytes: u64 },
    Unreadable { name: String, source: std::io::Error },
}

impl UploadRejection {
    /// Message shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            UploadRejection::TooLarge { .. } => TOO_LARGE_MESSAGE,
            UploadRejection::Unreadable { .. } => UNREADABLE_MESSAGE,
        }
    }
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadRejection::TooLarge { name, size_bytes } => write!(
                f,
                "{name} is {size_bytes} bytes (limit {MAX_UPLOAD_BYTES})"
            ),
            UploadRejection::Unreadable { name, source } => {
                write!(f, "could not read {name}: {source}")
            }
        }
    }
}

impl StdError for UploadRejection {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            UploadRejection::TooLarge { .. } => None,
            UploadRejection::Unreadable { source, .. } => Some(source),
        }
    }
}

/// An accepted file whose contents have not been read yet.
#[derive(Debug)]
pub struct PendingRead {
    ticket: u64,
    path: PathBuf,
    name: String,
}

/// Result of a [`PendingRead`], to be handed back to the manager.
#[derive(Debug)]
pub struct ReadOutcome {
    ticket: u64,
    name: String,
    result: std::io::Result<Vec<u8>>,
}

impl PendingRead {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read at most one byte past the limit, so files whose metadata
    /// understates their length (pipes, device and proc files) still stop.
    pub async fn read(self) -> ReadOutcome {
        let result = read_bounded(&self.path, MAX_UPLOAD_BYTES + 1).await;
        ReadOutcome {
            ticket: self.ticket,
            name: self.name,
            result,
        }
    }
}

async fn read_bounded(path: &Path, limit: u64) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    file.take(limit).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

#[derive(Debug, Default)]
pub struct FileUploadManager {
    state: AttachmentState,
    error: Option<String>,
    ticket: u64,
}

pub fn is_recognized_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            RECOGNIZED_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl FileUploadManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `path` and read it. Resolves once the content is available.
    pub async fn attach(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<&UploadedFile, UploadRejection> {
        let pending = self.begin(path).await?;
        let name = pending.name().to_string();
        let outcome = pending.read().await;
        self.complete(outcome)?;
        self.file().ok_or_else(|| UploadRejection::Unreadable {
            name,
            source: std::io::Error::other("attachment was superseded"),
        })
    }

    /// First phase of attaching: size check against file metadata.
    ///
    /// On success the attachment is pending and any previous file is gone.
    pub async fn begin(&mut self, path: impl AsRef<Path>) -> Result<PendingRead, UploadRejection> {
        let path = path.as_ref();
        let name = display_name(path);
        self.error = None;
        self.ticket += 1;

        let size_bytes = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(source) => return Err(self.reject(UploadRejection::Unreadable { name, source })),
        };

        if size_bytes > MAX_UPLOAD_BYTES {
            return Err(self.reject(UploadRejection::TooLarge { name, size_bytes }));
        }

        if !is_recognized_extension(&name) {
            debug!(file = %name, "attaching file with unrecognized extension");
        }

        self.state = AttachmentState::Pending {
            name: name.clone(),
            size_bytes,
        };

        Ok(PendingRead {
            ticket: self.ticket,
            path: path.to_path_buf(),
            name,
        })
    }

    /// Second phase: apply a finished read.
    ///
    /// Outcomes for a file that was since removed or replaced are dropped
    /// and reported as `Ok`.
    pub fn complete(&mut self, outcome: ReadOutcome) -> Result<(), UploadRejection> {
        if outcome.ticket != self.ticket || !self.is_pending() {
            debug!(file = %outcome.name, "ignoring stale attachment read");
            return Ok(());
        }

        let ReadOutcome { name, result, .. } = outcome;
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(source) => return Err(self.reject(UploadRejection::Unreadable { name, source })),
        };

        let size_bytes = bytes.len() as u64;
        if size_bytes > MAX_UPLOAD_BYTES {
            return Err(self.reject(UploadRejection::TooLarge { name, size_bytes }));
        }

        let text_content = String::from_utf8_lossy(&bytes).into_owned();
        debug!(file = %name, size_bytes, "attachment ready");
        self.state = AttachmentState::Ready(UploadedFile {
            name,
            size_bytes,
            text_content,
        });
        Ok(())
    }

    /// Drop the attachment and any upload error.
    pub fn remove(&mut self) {
        self.ticket += 1;
        self.state = AttachmentState::Empty;
        self.error = None;
    }

    pub fn state(&self) -> &AttachmentState {
        &self.state
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        match &self.state {
            AttachmentState::Ready(file) => Some(file),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.file().map(|file| file.text_content.as_str())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, AttachmentState::Pending { .. })
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn reject(&mut self, rejection: UploadRejection) -> UploadRejection {
        debug!(error = %rejection, "attachment rejected");
        self.state = AttachmentState::Empty;
        self.error = Some(rejection.message().to_string());
        rejection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(contents).expect("write file");
        path
    }

    #[tokio::test]
    async fn accepts_small_file_and_exposes_its_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.tsx", b"export const x = 1;\n");
        let mut uploads = FileUploadManager::new();

        let file = uploads.attach(&path).await.expect("accepted");
        assert_eq!(file.name, "app.tsx");
        assert_eq!(file.text_content, "export const x = 1;\n");
        assert_eq!(uploads.content(), Some("export const x = 1;\n"));
        assert!(uploads.error().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn endless_file_with_zero_length_metadata_is_rejected() {
        let mut uploads = FileUploadManager::new();
        let err = uploads.attach("/dev/zero").await.unwrap_err();
        match err {
            UploadRejection::TooLarge { size_bytes, .. } => {
                assert_eq!(size_bytes, MAX_UPLOAD_BYTES + 1)
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
        assert_eq!(uploads.error(), Some(TOO_LARGE_MESSAGE));
        assert!(uploads.file().is_none());
    }

    #[tokio::test]
    async fn file_at_exact_limit_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "limit.css", &vec![b'a'; MAX_UPLOAD_BYTES as usize]);
        let mut uploads = FileUploadManager::new();
        assert!(uploads.attach(&path).await.is_ok());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_and_clears_previous_attachment() {
        let dir = TempDir::new().unwrap();
        let small = write_file(&dir, "small.js", b"let a;");
        let big = write_file(&dir, "big.js", &vec![b'x'; 6 * 1024]);
        let mut uploads = FileUploadManager::new();
        uploads.attach(&small).await.unwrap();

        let err = uploads.attach(&big).await.unwrap_err();
        assert!(matches!(err, UploadRejection::TooLarge { size_bytes: 6144, .. }));
        assert_eq!(uploads.error(), Some(TOO_LARGE_MESSAGE));
        assert_eq!(uploads.state(), &AttachmentState::Empty);
        assert!(uploads.content().is_none());
    }

    #[tokio::test]
    async fn file_vanishing_mid_read_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "gone.ts", b"const y = 2;");
        let mut uploads = FileUploadManager::new();

        let pending = uploads.begin(&path).await.unwrap();
        assert!(uploads.is_pending());
        std::fs::remove_file(&path).unwrap();

        let err = uploads.complete(pending.read().await).unwrap_err();
        assert!(matches!(err, UploadRejection::Unreadable { .. }));
        assert_eq!(uploads.error(), Some(UNREADABLE_MESSAGE));
        assert!(uploads.file().is_none());
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let mut uploads = FileUploadManager::new();
        let err = uploads
            .attach(dir.path().join("nope.html"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), UNREADABLE_MESSAGE);
    }

    #[tokio::test]
    async fn stale_read_after_remove_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.jsx", b"<div/>");
        let mut uploads = FileUploadManager::new();

        let pending = uploads.begin(&path).await.unwrap();
        uploads.remove();
        uploads.complete(pending.read().await).unwrap();
        assert_eq!(uploads.state(), &AttachmentState::Empty);
    }

    #[tokio::test]
    async fn remove_clears_file_and_error() {
        let dir = TempDir::new().unwrap();
        let big = write_file(&dir, "big.scss", &vec![b'x'; 8000]);
        let mut uploads = FileUploadManager::new();
        let _ = uploads.attach(&big).await;
        assert!(uploads.error().is_some());

        uploads.remove();
        assert!(uploads.error().is_none());
        assert_eq!(uploads.state(), &AttachmentState::Empty);
    }

    #[tokio::test]
    async fn unlisted_extension_is_still_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.md", b"# hi");
        let mut uploads = FileUploadManager::new();
        assert!(!is_recognized_extension("notes.md"));
        assert!(uploads.attach(&path).await.is_ok());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_recognized_extension("Index.HTML"));
        assert!(!is_recognized_extension("Makefile"));
    }
}
