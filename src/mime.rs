//! MIME multipart serialization: transfer-encoding selection, boundary
//! choice, and document assembly.
//!
//! The output targets cloud-init's consumer, whose reference writer
//! (`write-mime-multipart`) emits LF line endings; every known boot agent
//! accepts them and they keep 7bit bodies byte-identical to the caller's
//! content.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use encoding_rs::Encoding;

use crate::error::{Result, UserDataError};
use crate::filetype::FileType;

/// Longest line a `7bit` body may carry (RFC 2045 §2.7).
const MAX_SEVEN_BIT_LINE: usize = 998;

/// Wrap column for `base64` transfer-encoded bodies.
const BASE64_WRAP: usize = 76;

/// One body part, already charset-encoded and transfer-encoded.
#[derive(Debug, Clone)]
pub struct RenderedPart {
    /// The category this part belongs to.
    pub file_type: FileType,
    /// `7bit` or `base64`.
    pub transfer_encoding: &'static str,
    /// The transfer-encoded body text.
    pub body: String,
}

/// Encode one part's content under `encoding` and select its transfer
/// encoding: `7bit` when the encoded bytes are plain ASCII lines,
/// `base64` otherwise.
///
/// Undoing the transfer encoding always recovers the exact content bytes
/// under `encoding`.
pub fn render_part(
    file_type: FileType,
    content: &str,
    encoding: &'static Encoding,
) -> Result<RenderedPart> {
    let (bytes, used, unmappable) = encoding.encode(content);
    // Decode-only encodings (UTF-16, replacement) encode via UTF-8;
    // emitting those bytes under the declared charset would break the
    // consumer's round-trip.
    if used != encoding {
        return Err(UserDataError::Serialization {
            category: file_type,
            reason: format!(
                "{} has no encoder; content would be written as {}",
                encoding.name(),
                used.name()
            ),
        });
    }
    if unmappable {
        return Err(UserDataError::Serialization {
            category: file_type,
            reason: format!(
                "{}: content contains characters outside the charset",
                encoding.name()
            ),
        });
    }

    if is_seven_bit_safe(&bytes) {
        // All-ASCII, so the bytes round-trip through UTF-8 unchanged.
        let body = String::from_utf8(bytes.into_owned()).map_err(|e| {
            UserDataError::Serialization {
                category: file_type,
                reason: e.to_string(),
            }
        })?;
        Ok(RenderedPart {
            file_type,
            transfer_encoding: "7bit",
            body,
        })
    } else {
        Ok(RenderedPart {
            file_type,
            transfer_encoding: "base64",
            body: wrap_base64(&BASE64.encode(&bytes)),
        })
    }
}

/// Whether `bytes` may travel as a `7bit` body: ASCII only, no NUL, and
/// no line longer than [`MAX_SEVEN_BIT_LINE`].
fn is_seven_bit_safe(bytes: &[u8]) -> bool {
    let mut line_len = 0usize;
    for &b in bytes {
        if b == 0 || b >= 0x80 {
            return false;
        }
        if b == b'\n' {
            line_len = 0;
        } else {
            line_len += 1;
            if line_len > MAX_SEVEN_BIT_LINE {
                return false;
            }
        }
    }
    true
}

/// Insert a newline every [`BASE64_WRAP`] characters.
fn wrap_base64(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_WRAP + 1);
    for (i, ch) in encoded.chars().enumerate() {
        if i > 0 && i % BASE64_WRAP == 0 {
            out.push('\n');
        }
        out.push(ch);
    }
    out
}

/// Pick a boundary token that appears in no rendered part body.
///
/// The choice is deterministic: a fixed stem with a counter, advanced
/// past any collision. The same parts always yield the same boundary,
/// so rebuilding an unmutated document is byte-identical.
pub fn choose_boundary(parts: &[RenderedPart]) -> String {
    let mut n = 0u32;
    loop {
        let candidate = format!("===============cloudseed-{n:04}==");
        if parts.iter().all(|p| !p.body.contains(&candidate)) {
            return candidate;
        }
        n += 1;
    }
}

/// Assemble the complete multipart document.
///
/// `charset` is the label written into every part's `Content-Type`
/// header. The newline before each boundary delimiter belongs to the
/// delimiter, not the body, so bodies round-trip exactly.
pub fn render_document(parts: &[RenderedPart], boundary: &str, charset: &str) -> String {
    let mut doc = String::new();
    doc.push_str("MIME-Version: 1.0\n");
    doc.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\n"
    ));
    doc.push('\n');

    for part in parts {
        let ft = part.file_type;
        doc.push_str(&format!("--{boundary}\n"));
        doc.push_str(&format!(
            "Content-Type: {}; charset=\"{}\"; name=\"{}\"\n",
            ft.mime_type(),
            charset,
            ft.file_name()
        ));
        doc.push_str(&format!(
            "Content-Transfer-Encoding: {}\n",
            part.transfer_encoding
        ));
        doc.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\n",
            ft.file_name()
        ));
        doc.push('\n');
        doc.push_str(&part.body);
        doc.push('\n');
    }

    doc.push_str(&format!("--{boundary}--\n"));
    doc
}
