//! Loading creatives from disk

use std::path::Path;

use adsboot_gateway::Attachment;
use anyhow::{anyhow, Context, Result};

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "mp4" | "m4v" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        "avi" => Some("video/x-msvideo"),
        "mpeg" | "mpg" => Some("video/mpeg"),
        _ => None,
    }
}

/// Read a creative into an attachment; size and type checks happen in the gateway
pub async fn load_attachment(path: &Path) -> Result<Attachment> {
    let mime = mime_for_path(path)
        .ok_or_else(|| anyhow!("Unrecognized media extension: {}", path.display()))?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    log::debug!("Loaded {} ({} bytes, {})", path.display(), data.len(), mime);
    Ok(Attachment::new(mime, data))
}
