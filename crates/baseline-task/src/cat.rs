use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Read size used by [`cat`].
pub const CHUNK_SIZE: usize = 1_048_576;

/// Copy the raw bytes of each file, in order, to `out`.
pub fn cat<P: AsRef<Path>, W: Write>(paths: &[P], out: &mut W) -> io::Result<()> {
  let mut buf = vec![0u8; CHUNK_SIZE];
  for path in paths {
    let mut file = File::open(path)?;
    loop {
      let n = file.read(&mut buf)?;
      if n == 0 {
        break;
      }
      out.write_all(&buf[..n])?;
    }
  }
  Ok(())
}

/// [`cat`] to the process's standard output.
pub fn cat_to_stdout<P: AsRef<Path>>(paths: &[P]) -> io::Result<()> {
  let stdout = io::stdout();
  let mut lock = stdout.lock();
  cat(paths, &mut lock)?;
  lock.flush()
}
