use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Okify log path for a parameter file: same name, `.okify` extension.
pub fn okify_path(parfile: &Path) -> PathBuf {
  parfile.with_extension("okify")
}

/// Append-only log of okify directives.
pub struct OkifyLog {
  path: PathBuf,
  writer: BufWriter<File>,
  entries: usize,
}

impl OkifyLog {
  /// Open `path` for appending, creating it if needed.
  pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
    let path = path.into();
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok(Self {
      path,
      writer: BufWriter::new(file),
      entries: 0,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Directives appended through this handle.
  pub fn entries(&self) -> usize {
    self.entries
  }

  /// Append one directive as a single line.
  pub fn append(&mut self, directive: &str) -> std::io::Result<()> {
    writeln!(self.writer, "{}", directive.trim_end())?;
    self.entries += 1;
    Ok(())
  }

  /// Flush and close, returning the number of directives written.
  pub fn close(mut self) -> std::io::Result<usize> {
    self.writer.flush()?;
    Ok(self.entries)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_okify_path() {
    assert_eq!(
      okify_path(Path::new("tests/calcspec1.par")),
      PathBuf::from("tests/calcspec1.okify")
    );
  }

  #[test]
  fn test_appends_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.okify");

    let mut log = OkifyLog::open(&path).unwrap();
    log.append("okify binary a ref/a\n").unwrap();
    assert_eq!(log.close().unwrap(), 1);

    let mut log = OkifyLog::open(&path).unwrap();
    log.append("okify text b ref/b").unwrap();
    log.close().unwrap();

    assert_eq!(
      std::fs::read_to_string(&path).unwrap(),
      "okify binary a ref/a\nokify text b ref/b\n"
    );
  }
}
