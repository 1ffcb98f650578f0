use std::path::{Path, PathBuf};

use crate::error::DescriptorError;
use crate::source::{Parameter, ParameterSource};
use crate::value::Value;

/// A comma-separated parameter file.
///
/// Each non-comment line declares one parameter:
/// ```text
/// name,type,mode,value,min,max,prompt
/// ```
/// Only `name`, `type` and `value` are read. Fields may be double-quoted to
/// carry commas.
#[derive(Debug, Clone)]
pub struct ParFile {
  path: PathBuf,
}

impl ParFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Parse parameter file content.
  pub fn parse(source_id: &str, content: &str) -> Result<Vec<Parameter>, DescriptorError> {
    let mut parameters = Vec::new();

    for (index, raw) in content.lines().enumerate() {
      let line = raw.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }

      let fields = split_fields(line).map_err(|message| DescriptorError::Malformed {
        source_id: source_id.to_string(),
        line: index + 1,
        message,
      })?;

      if fields.len() < 4 {
        return Err(DescriptorError::Malformed {
          source_id: source_id.to_string(),
          line: index + 1,
          message: format!("expected at least 4 fields, found {}", fields.len()),
        });
      }

      let name = fields[0].trim();
      if name.is_empty() {
        return Err(DescriptorError::Malformed {
          source_id: source_id.to_string(),
          line: index + 1,
          message: "empty parameter name".to_string(),
        });
      }

      parameters.push(Parameter {
        name: name.to_string(),
        value: typed_value(fields[1].trim(), &fields[3]),
      });
    }

    Ok(parameters)
  }
}

impl ParameterSource for ParFile {
  fn source_id(&self) -> String {
    self.path.display().to_string()
  }

  fn parameters(&self) -> Result<Vec<Parameter>, DescriptorError> {
    let content = std::fs::read_to_string(&self.path).map_err(|source| DescriptorError::Read {
      path: self.path.clone(),
      source,
    })?;
    Self::parse(&self.source_id(), &content)
  }
}

/// Convert a raw value according to its declared type.
///
/// Values that do not parse as their type (e.g. `INDEF` for a real) stay
/// strings so the ignore-value filter still sees them.
fn typed_value(kind: &str, raw: &str) -> Value {
  let kind = kind.trim_start_matches('*');
  let trimmed = raw.trim();
  match kind {
    "i" | "r" => trimmed
      .parse::<f64>()
      .map(Value::Number)
      .unwrap_or_else(|_| Value::String(raw.to_string())),
    "b" => match trimmed.to_lowercase().as_str() {
      "yes" | "y" | "true" => Value::Bool(true),
      "no" | "n" | "false" => Value::Bool(false),
      _ => Value::String(raw.to_string()),
    },
    _ => Value::String(raw.to_string()),
  }
}

fn split_fields(line: &str) -> Result<Vec<String>, String> {
  let mut fields = Vec::new();
  let mut current = String::new();
  let mut in_quotes = false;
  let mut chars = line.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '"' if in_quotes && chars.peek() == Some(&'"') => {
        current.push('"');
        chars.next();
      }
      '"' => in_quotes = !in_quotes,
      ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
      _ => current.push(c),
    }
  }

  if in_quotes {
    return Err("unterminated quoted field".to_string());
  }
  fields.push(current);
  Ok(fields)
}

#[cfg(test)]
mod tests {
  use super::*;

  const CALCSPEC: &str = r#"# calcspec parameters
spectrum,s,a,"rn(bb(5000),band(v),10,vegamag)",,,"Spectrum to calculate"
output,s,a,"calcspec1.fits",,,"Output file"
form,s,h,"flam",,,"Form of output"
redshift,r,h,0.25,,,
wavetab,s,h,"none",,,
refwave,r,h,INDEF,,,
verbose,b,h,no,,,
clobber,b,h,yes,,,
$nargs,i,h,0
mode,s,h,"al"
"#;

  #[test]
  fn test_parse_types() {
    let params = ParFile::parse("calcspec1.par", CALCSPEC).unwrap();
    assert_eq!(params.len(), 10);

    assert_eq!(params[0].name, "spectrum");
    assert_eq!(
      params[0].value,
      Value::from("rn(bb(5000),band(v),10,vegamag)")
    );
    assert_eq!(params[3].value, Value::Number(0.25));
    assert_eq!(params[5].value, Value::from("INDEF"));
    assert_eq!(params[6].value, Value::Bool(false));
    assert_eq!(params[7].value, Value::Bool(true));
    assert_eq!(params[8].value, Value::Number(0.0));
  }

  #[test]
  fn test_descriptor_from_par_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calcspec1.par");
    std::fs::write(&path, CALCSPEC).unwrap();

    let descriptor = crate::extract("calcspec", &ParFile::new(&path)).unwrap();

    let names: Vec<&str> = descriptor.iter().map(|(k, _)| k).collect();
    assert_eq!(
      names,
      vec![
        "clobber",
        "form",
        "output",
        "parameter-source-id",
        "redshift",
        "spectrum",
        "taskname",
      ]
    );
  }

  #[test]
  fn test_too_few_fields() {
    let err = ParFile::parse("bad.par", "# header\nname,s\n").unwrap_err();
    match err {
      DescriptorError::Malformed { line, .. } => assert_eq!(line, 2),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn test_unterminated_quote() {
    assert!(matches!(
      ParFile::parse("bad.par", "a,s,h,\"open\n"),
      Err(DescriptorError::Malformed { .. })
    ));
  }

  #[test]
  fn test_missing_file() {
    let err = ParFile::new("/nonexistent/dir/x.par").parameters().unwrap_err();
    assert!(matches!(err, DescriptorError::Read { .. }));
  }
}
