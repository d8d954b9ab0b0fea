//! Text resources decoded as UTF-8, never with the platform default.

use crate::error::{Result, TzatzikiError};
use std::path::Path;

/// Read a file as UTF-8 text
pub fn read_utf8(path: &Path) -> Result<String> {
    let resource = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TzatzikiError::not_found(resource.clone()),
        _ => TzatzikiError::Io(e),
    })?;
    String::from_utf8(bytes).map_err(|e| TzatzikiError::Encoding {
        resource,
        source: e.utf8_error(),
    })
}

/// Decode bytes as UTF-8; `resource` names the source in errors
pub fn decode_utf8<'b>(resource: &str, bytes: &'b [u8]) -> Result<&'b str> {
    std::str::from_utf8(bytes).map_err(|source| TzatzikiError::Encoding {
        resource: resource.to_string(),
        source,
    })
}
