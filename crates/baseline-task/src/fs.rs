use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tracing::debug;

/// Remove `path` if it exists.
///
/// Succeeds whether or not the file was there; only errors other than
/// "not found" are returned.
pub async fn ensure_absent(path: impl AsRef<Path>) -> std::io::Result<()> {
  let path = path.as_ref();
  match fs::remove_file(path).await {
    Ok(()) => {
      debug!(path = %path.display(), "removed");
      Ok(())
    }
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}
