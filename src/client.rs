//! Blocking client for the WebUI txt2img API

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::{API_TIMEOUT_SECS, MAX_RESPONSE_BYTES};
use crate::error::SpriteError;
use crate::request::GenerationRequest;

/// How much of an unexpected response body ends up in an error message.
const RESPONSE_EXCERPT_CHARS: usize = 200;

/// Something that turns a txt2img request into image bytes.
pub trait ImageApi {
    /// Generates one image and returns its decoded bytes.
    fn txt2img(&self, request: &GenerationRequest<'_>) -> Result<Vec<u8>, SpriteError>;
}

#[derive(Debug, Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Option<Vec<String>>,
}

/// Talks to a Stable Diffusion WebUI compatible endpoint.
///
/// An unparseable URL doesn't stop construction; every request then fails
/// with [`SpriteError::InvalidApiUrl`] so the batch still runs to the end.
#[derive(Clone)]
pub struct SdClient {
    agent: ureq::Agent,
    api_url: String,
    endpoint: Result<url::Url, url::ParseError>,
}

impl SdClient {
    /// Client for `api_url` with the standard request timeout.
    pub fn new(api_url: &str) -> Self {
        Self::with_timeout(api_url, Duration::from_secs(API_TIMEOUT_SECS))
    }

    /// Client for `api_url` that gives up on a request after `timeout`.
    pub fn with_timeout(api_url: &str, timeout: Duration) -> Self {
        let endpoint = url::Url::parse(api_url);
        if let Err(err) = &endpoint {
            warn!("API URL {api_url:?} is invalid ({err}), every request will fail");
        }

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            api_url: api_url.to_string(),
            endpoint,
        }
    }

    /// The endpoint requests go to, as configured.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The parsed endpoint, or why it couldn't be parsed.
    pub fn endpoint(&self) -> Result<&url::Url, SpriteError> {
        self.endpoint
            .as_ref()
            .map_err(|err| SpriteError::InvalidApiUrl(self.api_url.clone(), *err))
    }
}

impl ImageApi for SdClient {
    fn txt2img(&self, request: &GenerationRequest<'_>) -> Result<Vec<u8>, SpriteError> {
        let endpoint = self.endpoint()?;
        let body = request.to_json_bytes()?;
        debug!("POST {endpoint} payload: {}", String::from_utf8_lossy(&body));

        let mut response = self
            .agent
            .post(endpoint.as_str())
            .header("Content-Type", "application/json")
            .send(body.as_slice())?;

        let status = response.status();
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()?;

        if !status.is_success() {
            return Err(SpriteError::Http(format!(
                "API error {status}: {}",
                excerpt(&bytes)
            )));
        }

        let encoded = first_image(&bytes)?;
        let image = general_purpose::STANDARD.decode(encoded.trim())?;
        if !looks_like_png(&image) {
            warn!(
                "Image returned by {} doesn't look like a PNG, saving it anyway",
                self.api_url
            );
        }
        Ok(image)
    }
}

/// Pulls the first base64 image out of a txt2img response body.
pub fn first_image(body: &[u8]) -> Result<String, SpriteError> {
    let parsed: Txt2ImgResponse = serde_json::from_slice(body).map_err(|err| {
        SpriteError::BadResponse(format!("invalid JSON ({err}): {}", excerpt(body)))
    })?;

    parsed
        .images
        .and_then(|images| images.into_iter().next())
        .ok_or_else(|| {
            SpriteError::BadResponse(format!(
                "unexpected API response format or empty 'images' field: {}",
                excerpt(body)
            ))
        })
}

/// True when the bytes sniff as a PNG.
pub fn looks_like_png(bytes: &[u8]) -> bool {
    matches!(image::guess_format(bytes), Ok(image::ImageFormat::Png))
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() > RESPONSE_EXCERPT_CHARS {
        let cut: String = text.chars().take(RESPONSE_EXCERPT_CHARS).collect();
        format!("{cut}...")
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_image_takes_the_first_entry() {
        let body = br#"{"images": ["aGVsbG8=", "d29ybGQ="], "info": "{}"}"#;
        assert_eq!(first_image(body).expect("image"), "aGVsbG8=");
    }

    #[test]
    fn missing_or_empty_images_is_a_bad_response() {
        for body in [
            &br#"{"info": "nothing here"}"#[..],
            &br#"{"images": []}"#[..],
            &br#"{"images": null}"#[..],
            &b"<html>502 Bad Gateway</html>"[..],
        ] {
            let err = first_image(body).unwrap_err();
            assert!(
                matches!(err, SpriteError::BadResponse(_)),
                "unexpected error for {:?}: {err:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn long_bodies_are_cut_down() {
        let body = "x".repeat(1000);
        let short = excerpt(body.as_bytes());
        assert_eq!(short.len(), RESPONSE_EXCERPT_CHARS + 3);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn png_sniffing() {
        assert!(looks_like_png(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"));
        assert!(!looks_like_png(b"GIF89a"));
        assert!(!looks_like_png(b""));
    }

    #[test]
    fn bad_urls_fail_each_request() {
        let client = SdClient::new("127.0.0.1:7860/sdapi/v1/txt2img");
        assert!(matches!(
            client.endpoint(),
            Err(SpriteError::InvalidApiUrl(_, _))
        ));

        let config = crate::prompts::PromptConfig::from_json(
            r#"{"base_prompt": "a", "negative_prompt": "b", "character_details": "c",
                "expressions": {"happy": "smile"}}"#,
        )
        .expect("parse config");
        let params = crate::request::GenerationParams::default();
        let request = crate::request::build_request(&config, "smile", &params);
        for _ in 0..2 {
            assert!(matches!(
                client.txt2img(&request),
                Err(SpriteError::InvalidApiUrl(_, _))
            ));
        }

        let client = SdClient::new("http://127.0.0.1:7860/sdapi/v1/txt2img");
        assert_eq!(
            client.endpoint().expect("valid url").as_str(),
            "http://127.0.0.1:7860/sdapi/v1/txt2img"
        );
    }
}
