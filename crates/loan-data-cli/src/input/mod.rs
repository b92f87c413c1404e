pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Load a JSON document from `--input`, falling back to piped stdin.
pub fn load_value(path: Option<&str>, what: &str) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json_value(path);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(value),
        None => Err(format!("{what} required: pass --input <file.json> or pipe JSON on stdin").into()),
    }
}

/// Typed variant of [`load_value`].
pub fn load<T: DeserializeOwned>(path: Option<&str>, what: &str) -> Result<T, Box<dyn std::error::Error>> {
    let value = load_value(path, what)?;
    serde_json::from_value(value).map_err(|e| format!("Invalid {what}: {e}").into())
}
