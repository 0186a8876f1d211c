//! Shared constants/defaults for things
//!

/// Where we send txt2img requests unless `SD_API_URL` says otherwise
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:7860/sdapi/v1/txt2img";

/// The default place we put images
pub const DEFAULT_OUTPUT_FOLDER: &str = "generated_sprites";

/// Prompt configuration file read when `--prompt_file` isn't given
pub const DEFAULT_PROMPT_FILE: &str = "prompts.json";

/// Default image width in pixels.
pub const DEFAULT_WIDTH: u32 = 1024;

/// Default image height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1024;

/// Default number of sampling steps.
pub const DEFAULT_STEPS: u32 = 30;

/// Default classifier-free guidance scale.
pub const DEFAULT_CFG_SCALE: f64 = 7.5;

/// Default sampler name.
pub const DEFAULT_SAMPLER: &str = "SA Solver";

/// Fixed seed so every expression of a character comes out of the same noise.
pub const DEFAULT_SEED: i64 = 2_472_820_057;

/// Subseed sent with every request, `-1` lets the server pick one.
pub const SUBSEED: i64 = -1;

/// Variation strength applied with the subseed.
pub const SUBSEED_STRENGTH: f64 = 0.1;

/// Timeout (in seconds) for a single txt2img round-trip.
pub const API_TIMEOUT_SECS: u64 = 20;

/// Upper bound on the size of a txt2img response body.
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// Extension of every saved sprite.
pub const IMAGE_EXTENSION: &str = "png";
