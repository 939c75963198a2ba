use super::PayloadKind;

/// Map a declared media type onto a payload kind.
///
/// `image/*`, `video/*` and `application/*` are shareable; everything else
/// (audio, fonts, unknown or empty types) is not.
pub fn classify_media(mime: &str) -> Option<PayloadKind> {
    let mime = mime.trim().to_ascii_lowercase();
    if mime.starts_with("image/") {
        Some(PayloadKind::Image)
    } else if mime.starts_with("video/") {
        Some(PayloadKind::Video)
    } else if mime.starts_with("application/") {
        Some(PayloadKind::Doc)
    } else {
        None
    }
}
