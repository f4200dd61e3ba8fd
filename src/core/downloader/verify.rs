use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;
use tracing::debug;

const READ_BUFFER: usize = 64 * 1024;

/// Whether the file at `path` hashes to `expected_sha1`.
///
/// Never fails: a missing or unreadable file is simply "not valid", so the
/// caller re-fetches. An empty `expected_sha1` cannot be verified and is
/// always reported as not valid.
pub async fn is_valid(path: &Path, expected_sha1: &str) -> bool {
    if expected_sha1.is_empty() {
        return false;
    }

    match sha1_file(path).await {
        Ok(actual) => actual.eq_ignore_ascii_case(expected_sha1),
        Err(e) => {
            debug!("Cannot verify {:?}: {}", path, e);
            false
        }
    }
}

/// Stream a file through SHA-1 and return the lowercase hex digest.
pub async fn sha1_file(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; READ_BUFFER];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
