//! Content sniffing by leading byte signature.

use crate::Blob;

/// Number of leading bytes that make up a signature.
pub const SIGNATURE_BYTES: usize = 4;

const JPEG_SIGNATURES: [&str; 3] = ["ffd8ffe0", "ffd8ffe1", "ffd8ffe2"];
const PNG_SIGNATURE: &str = "89504e47";

/// Hex signature of the first four bytes of a blob.
///
/// Shorter blobs yield the hex of whatever bytes are present.
pub fn signature(blob: &Blob) -> String {
    let mut sig = String::with_capacity(SIGNATURE_BYTES * 2);
    for byte in blob.as_bytes().iter().take(SIGNATURE_BYTES) {
        sig.push_str(&format!("{byte:02x}"));
    }
    sig
}

/// True when the signature belongs to a JPEG payload
pub fn is_jpeg(signature: &str) -> bool {
    JPEG_SIGNATURES.contains(&signature)
}

/// True when the signature belongs to a PNG payload
pub fn is_png(signature: &str) -> bool {
    signature == PNG_SIGNATURE
}
