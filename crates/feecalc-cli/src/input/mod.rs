pub mod file;
pub mod stdin;

use serde_json::Value;

/// The input document from `--input`, else from piped stdin, else `None`.
pub fn read_document(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Some(file::read_value(path)?)),
        None => stdin::read_stdin(),
    }
}
