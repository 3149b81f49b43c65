//! Evidence storage collaborator.
//!
//! Accepts an uploaded payment-proof binary and returns an opaque reference
//! string stored on the slip. The engine never interprets the blob. The
//! shipped implementation keeps the original inline data-URL behavior; an
//! object store can replace it behind the same trait.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Uploads are bounded to keep rows and responses sane.
pub const MAX_EVIDENCE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "application/pdf"];

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("Payment slip file is required")]
    Empty,

    #[error("Payment slip exceeds the {MAX_EVIDENCE_BYTES} byte limit")]
    TooLarge,

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Invalid base64 payload")]
    InvalidPayload,
}

#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Store a proof blob and return its opaque reference.
    async fn store(&self, content_type: &str, bytes: &[u8]) -> Result<String, EvidenceError>;
}

/// Inline storage: the reference IS the payload, as a data URL.
pub struct DataUrlEvidenceStore;

#[async_trait]
impl EvidenceStore for DataUrlEvidenceStore {
    async fn store(&self, content_type: &str, bytes: &[u8]) -> Result<String, EvidenceError> {
        if bytes.is_empty() {
            return Err(EvidenceError::Empty);
        }
        if bytes.len() > MAX_EVIDENCE_BYTES {
            return Err(EvidenceError::TooLarge);
        }
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(EvidenceError::UnsupportedContentType(
                content_type.to_string(),
            ));
        }

        Ok(format!(
            "data:{};base64,{}",
            content_type,
            BASE64.encode(bytes)
        ))
    }
}

/// Decode a client-supplied base64 body into raw bytes.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, EvidenceError> {
    BASE64
        .decode(encoded.trim())
        .map_err(|_| EvidenceError::InvalidPayload)
}
