//! txt2img request payloads.

use serde::Serialize;

use crate::constants::{
    DEFAULT_CFG_SCALE, DEFAULT_HEIGHT, DEFAULT_SAMPLER, DEFAULT_SEED, DEFAULT_STEPS,
    DEFAULT_WIDTH, SUBSEED, SUBSEED_STRENGTH,
};
use crate::error::SpriteError;
use crate::prompts::PromptConfig;

/// Generation settings shared by every request in a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Sampling steps
    pub steps: u32,
    /// CFG scale
    pub cfg_scale: f64,
    /// Seed, `-1` for random
    pub seed: i64,
    /// Sampler name as the WebUI knows it, eg `SA Solver`
    pub sampler: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            steps: DEFAULT_STEPS,
            cfg_scale: DEFAULT_CFG_SCALE,
            seed: DEFAULT_SEED,
            sampler: DEFAULT_SAMPLER.to_string(),
        }
    }
}

/// Request body for POST /sdapi/v1/txt2img
///
/// Field order is the serialized order, so the same inputs always produce the
/// same bytes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationRequest<'a> {
    /// Full positive prompt
    pub prompt: String,
    /// Negative prompt
    pub negative_prompt: &'a str,
    /// Sampling steps
    pub steps: u32,
    /// CFG scale
    pub cfg_scale: f64,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Seed
    pub seed: i64,
    /// Sampler name
    pub sampler_name: &'a str,
    /// Variation subseed
    pub subseed: i64,
    /// Variation strength
    pub subseed_strength: f64,

    // The WebUI has always been sent these as strings.
    /// Ask the server to keep its own copy
    pub save_images: &'static str,
    /// Ask the server to return the images
    pub send_images: &'static str,
    /// Server-side grid saving toggle
    pub do_not_save_grid: &'static str,
    /// Server-side sample saving toggle
    pub do_not_save_samples: &'static str,
}

impl GenerationRequest<'_> {
    /// Serializes the request to its JSON wire form.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, SpriteError> {
        serde_json::to_vec(self).map_err(SpriteError::Encode)
    }
}

/// Joins the shared prompt pieces around an expression description.
pub fn compose_prompt(config: &PromptConfig, description: &str) -> String {
    format!(
        "{}, {}, {}",
        config.base_prompt, description, config.character_details
    )
}

/// Builds the request for one expression.
pub fn build_request<'a>(
    config: &'a PromptConfig,
    description: &str,
    params: &'a GenerationParams,
) -> GenerationRequest<'a> {
    GenerationRequest {
        prompt: compose_prompt(config, description),
        negative_prompt: &config.negative_prompt,
        steps: params.steps,
        cfg_scale: params.cfg_scale,
        width: params.width,
        height: params.height,
        seed: params.seed,
        sampler_name: &params.sampler,
        subseed: SUBSEED,
        subseed_strength: SUBSEED_STRENGTH,
        save_images: "true",
        send_images: "true",
        do_not_save_grid: "false",
        do_not_save_samples: "false",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn config() -> PromptConfig {
        let mut expressions = IndexMap::new();
        expressions.insert("happy".to_string(), "big smile".to_string());
        PromptConfig {
            base_prompt: "pixel art bust".to_string(),
            negative_prompt: "lowres".to_string(),
            character_details: "silver hair".to_string(),
            expressions,
        }
    }

    #[test]
    fn prompt_is_base_description_details() {
        let config = config();
        let params = GenerationParams::default();
        let request = build_request(&config, "big smile", &params);
        assert_eq!(request.prompt, "pixel art bust, big smile, silver hair");
        assert_eq!(request.negative_prompt, "lowres");
        assert_eq!(request.sampler_name, "SA Solver");
        assert_eq!(request.seed, 2_472_820_057);
    }

    #[test]
    fn payload_has_the_expected_wire_shape() {
        let config = config();
        let params = GenerationParams {
            width: 512,
            height: 768,
            steps: 20,
            cfg_scale: 6.0,
            seed: 42,
            sampler: "Euler a".to_string(),
        };
        let request = build_request(&config, "big smile", &params);
        let value = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(
            value,
            serde_json::json!({
                "prompt": "pixel art bust, big smile, silver hair",
                "negative_prompt": "lowres",
                "steps": 20,
                "cfg_scale": 6.0,
                "width": 512,
                "height": 768,
                "seed": 42,
                "sampler_name": "Euler a",
                "subseed": -1,
                "subseed_strength": 0.1,
                "save_images": "true",
                "send_images": "true",
                "do_not_save_grid": "false",
                "do_not_save_samples": "false"
            })
        );
    }

    #[test]
    fn payload_bytes_are_deterministic() {
        let config = config();
        let params = GenerationParams::default();
        let first = build_request(&config, "big smile", &params)
            .to_json_bytes()
            .expect("first");
        let second = build_request(&config.clone(), "big smile", &params.clone())
            .to_json_bytes()
            .expect("second");
        assert_eq!(first, second);
        assert!(first.starts_with(br#"{"prompt":"pixel art bust, big smile, silver hair","#));
    }
}
