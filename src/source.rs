//! Loading payload content from filesystem paths.
//!
//! A thin convenience over `std::fs` for callers whose payloads live on
//! disk rather than in memory. The file handle is owned by the read call
//! and released on every exit path.

use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{Result, UserDataError};

/// Read a payload file and decode it under `encoding`.
///
/// Fails with [`UserDataError::ResourceNotFound`] when the path does not
/// exist, and [`UserDataError::PayloadDecode`] when the bytes are not
/// valid under the encoding.
pub fn read_payload(path: &Path, encoding: &'static Encoding) -> Result<String> {
    // Classify from the read itself rather than a pre-check:
    // `Path::exists` also answers false on permission errors.
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => UserDataError::ResourceNotFound(path.to_path_buf()),
        _ => UserDataError::io(path, e),
    })?;

    let (text, _, malformed) = encoding.decode(&bytes);
    if malformed {
        return Err(UserDataError::PayloadDecode {
            path: path.to_path_buf(),
            charset: encoding.name().to_string(),
        });
    }

    Ok(text.into_owned())
}
