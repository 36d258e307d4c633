use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, warn};

const MAX_PREFIX_LEN: usize = 64;

/// A downloaded PDF living in local scratch space for the duration of one request.
///
/// The file is removed on every exit path: explicitly through [`ScratchFile::release`]
/// once the pipeline finishes, or by `Drop` when a stage bails out early.
/// Removal failures are logged and swallowed.
pub struct ScratchFile {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ScratchFile {
    /// Creates an empty, uniquely named `.pdf` file in `dir`, prefixed with the
    /// (sanitized) correlation id so stray files can be traced back to a request.
    pub fn create(dir: &Path, request_id: &str) -> io::Result<Self> {
        let prefix = format!("{}-", sanitize_prefix(request_id));
        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".pdf")
            .tempfile_in(dir)?
            .into_temp_path();

        Ok(Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };
        match temp.close() {
            Ok(()) => debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Cleanup failed for scratch file {}: {e}",
                self.path.display()
            ),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Keeps ASCII alphanumerics, `-` and `_`; the id is caller-supplied and ends up in a path.
fn sanitize_prefix(request_id: &str) -> String {
    let sanitized: String = request_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_PREFIX_LEN)
        .collect();

    if sanitized.is_empty() {
        "request".to_string()
    } else {
        sanitized
    }
}
