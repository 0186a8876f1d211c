//! Error handling

use std::path::PathBuf;

/// Errors for the sprite generator.
///
/// The first group is fatal at startup; the rest are reported against a
/// single expression and the batch carries on.
#[derive(Debug)]
pub enum SpriteError {
    /// The prompt configuration file doesn't exist
    ConfigNotFound(PathBuf),
    /// The prompt configuration file isn't valid JSON or is missing fields
    ConfigMalformed(PathBuf, String),
    /// None of the requested expressions exist in the configuration
    NoMatchingExpressions(String),
    /// The output folder couldn't be created or accessed
    OutputFolder(PathBuf, std::io::Error),

    /// The API URL couldn't be parsed
    InvalidApiUrl(String, url::ParseError),
    /// The request body couldn't be serialized
    Encode(serde_json::Error),
    /// Transport failure, timeout or non-success status from the API
    Http(String),
    /// The API answered, but not with a usable image list
    BadResponse(String),
    /// The image wasn't valid base64
    Decode(base64::DecodeError),
    /// Filesystem errors while writing images
    Io(std::io::Error),
}

impl std::fmt::Display for SpriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigNotFound(path) => {
                write!(f, "The file {} was not found.", path.display())
            }
            Self::ConfigMalformed(path, err) => write!(
                f,
                "Failed to parse {}. Ensure it's valid JSON: {err}",
                path.display()
            ),
            Self::NoMatchingExpressions(requested) => write!(
                f,
                "None of the requested expressions match available expressions: {requested}"
            ),
            Self::OutputFolder(path, err) => write!(
                f,
                "Unable to create or access output folder {}: {err}",
                path.display()
            ),
            Self::InvalidApiUrl(url, err) => write!(f, "Invalid API URL {url:?}: {err}"),
            Self::Encode(err) => write!(f, "Failed to serialize request: {err}"),
            Self::Http(message) => write!(f, "HTTP error: {message}"),
            Self::BadResponse(message) => write!(f, "Unexpected API response: {message}"),
            Self::Decode(err) => write!(f, "Failed to base64-decode image: {err}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for SpriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OutputFolder(_, err) | Self::Io(err) => Some(err),
            Self::InvalidApiUrl(_, err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SpriteError {
    fn from(err: std::io::Error) -> Self {
        SpriteError::Io(err)
    }
}

impl From<ureq::Error> for SpriteError {
    fn from(err: ureq::Error) -> Self {
        SpriteError::Http(err.to_string())
    }
}

impl From<base64::DecodeError> for SpriteError {
    fn from(err: base64::DecodeError) -> Self {
        SpriteError::Decode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_messages_name_the_culprit() {
        let err = SpriteError::ConfigNotFound(PathBuf::from("missing.json"));
        assert_eq!(err.to_string(), "The file missing.json was not found.");

        let err = SpriteError::NoMatchingExpressions("grumpy,sleepy".to_string());
        assert!(err.to_string().contains("grumpy,sleepy"));
    }

    #[test]
    fn encode_errors_are_not_transport_errors() {
        use std::error::Error;
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = SpriteError::Encode(json_err);
        assert!(!matches!(err, SpriteError::Http(_)));
        assert!(err.to_string().starts_with("Failed to serialize request: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let err = SpriteError::from(std::io::Error::other("disk full"));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "IO error: disk full");
    }
}
