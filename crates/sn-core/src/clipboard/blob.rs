/// Raw file selected for sharing, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    /// Declared media type; empty when the source declared none.
    pub mime: String,
    pub bytes: Vec<u8>,
}
