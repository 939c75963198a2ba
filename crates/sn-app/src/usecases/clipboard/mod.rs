mod capture;

pub use capture::{CaptureError, ClipboardCapture};
