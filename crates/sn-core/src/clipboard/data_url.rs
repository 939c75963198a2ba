use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUrlError {
    #[error("missing `data:` scheme")]
    MissingScheme,

    #[error("missing `,` separating header and payload")]
    MissingPayload,

    #[error("only base64 data urls are supported")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// `data:<mime>;base64,<payload>` encoded binary blob.
///
/// Parsing only checks the header shape; the payload is decoded lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl {
    mime: String,
    payload: String,
}

impl DataUrl {
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: mime.to_string(),
            payload: STANDARD.encode(bytes),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DataUrlError> {
        let rest = raw.strip_prefix("data:").ok_or(DataUrlError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotBase64)?;
        Ok(Self {
            mime: mime.to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Length of the encoded payload, not of the decoded bytes.
    pub fn encoded_len(&self) -> usize {
        self.payload.len()
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUrlError> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| DataUrlError::InvalidBase64(e.to_string()))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

impl FromStr for DataUrl {
    type Err = DataUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataUrl {
    type Error = DataUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataUrl> for String {
    fn from(url: DataUrl) -> Self {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_display_produces_browser_style_data_url() {
        let url = DataUrl::encode("image/png", b"\x89PNG");
        assert_eq!(url.to_string(), "data:image/png;base64,iVBORw==");
        assert_eq!(url.decode().unwrap(), b"\x89PNG");
    }

    #[test]
    fn parse_accepts_empty_mime() {
        let url = DataUrl::parse("data:;base64,AA==").unwrap();
        assert_eq!(url.mime(), "");
    }

    #[test]
    fn parse_rejects_non_base64_and_missing_scheme() {
        assert_eq!(
            DataUrl::parse("data:text/plain,hello"),
            Err(DataUrlError::NotBase64)
        );
        assert_eq!(
            DataUrl::parse("https://example.com"),
            Err(DataUrlError::MissingScheme)
        );
        assert_eq!(
            DataUrl::parse("data:image/png;base64"),
            Err(DataUrlError::MissingPayload)
        );
    }

    #[test]
    fn decode_reports_corrupt_payload() {
        let url = DataUrl::parse("data:image/png;base64,***").unwrap();
        assert!(matches!(url.decode(), Err(DataUrlError::InvalidBase64(_))));
    }
}
