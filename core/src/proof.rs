//! Payment proof image encoding.
//!
//! Proof images travel inside the JSON payment body as standard base64
//! without a `data:` URI prefix. Encoding a photo is CPU-bound, so async
//! callers go through `encode_image_off_thread`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;

pub fn encode_image(bytes: &[u8]) -> Result<String, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::Unknown("payment proof image is empty".to_string()));
    }
    Ok(STANDARD.encode(bytes))
}

/// Encode on the blocking pool so the async executor stays free.
pub async fn encode_image_off_thread(bytes: Vec<u8>) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || encode_image(&bytes))
        .await
        .map_err(|e| ApiError::Unknown(format!("image encoding task failed: {e}")))?
}
