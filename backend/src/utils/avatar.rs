use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AvatarError {
    #[error("No file was selected")]
    Empty,
    #[error("File is too large ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },
    #[error("Unsupported file type: {0}")]
    NotAnImage(String),
}

/// Encodes an uploaded image as a `data:` URL suitable for an avatar preview.
///
/// The declared content type wins; when it is missing or generic the type is
/// guessed from the file name.
pub fn encode_data_url(
    bytes: &[u8],
    content_type: Option<&str>,
    file_name: Option<&str>,
    max_bytes: usize,
) -> Result<String, AvatarError> {
    if bytes.is_empty() {
        return Err(AvatarError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(AvatarError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let declared = content_type
        .map(|ct| ct.trim().to_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
    let mime = match declared {
        Some(ct) => ct,
        None => file_name
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    };
    if !mime.starts_with("image/") {
        return Err(AvatarError::NotAnImage(mime));
    }

    Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}
