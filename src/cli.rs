//! CLI parser
use clap::Parser;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_CFG_SCALE, DEFAULT_HEIGHT, DEFAULT_OUTPUT_FOLDER,
    DEFAULT_PROMPT_FILE, DEFAULT_SAMPLER, DEFAULT_SEED, DEFAULT_STEPS, DEFAULT_WIDTH,
};
use crate::request::GenerationParams;

#[derive(Parser, Debug)]
#[command(name = "spritegen")]
#[command(about = "Generate character expression sprites using the SD WebUI API")]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "SPRITEGEN_DEBUG")]
    /// Enable debug logging. Env: SPRITEGEN_DEBUG
    pub debug: bool,

    #[clap(
        long = "prompt_file",
        alias = "prompt-file",
        default_value = DEFAULT_PROMPT_FILE
    )]
    /// Path to the prompt file, defaults to `prompts.json`
    pub prompt_file: PathBuf,

    #[clap(
        long = "api_url",
        alias = "api-url",
        default_value = DEFAULT_API_URL,
        env = "SD_API_URL"
    )]
    /// txt2img endpoint.
    /// Env: SD_API_URL
    pub api_url: String,

    #[clap(
        long = "output_folder",
        alias = "output-folder",
        default_value = DEFAULT_OUTPUT_FOLDER,
        env = "OUTPUT_FOLDER"
    )]
    /// Where sprites are written, defaults to `generated_sprites`.
    /// Env: OUTPUT_FOLDER
    pub output_folder: PathBuf,

    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    /// Image width
    pub width: u32,

    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    /// Image height
    pub height: u32,

    #[clap(long, default_value_t = DEFAULT_STEPS)]
    /// Number of steps
    pub steps: u32,

    #[clap(
        long = "cfg_scale",
        alias = "cfg-scale",
        default_value_t = DEFAULT_CFG_SCALE,
        value_parser = parse_cfg_scale
    )]
    /// CFG scale
    pub cfg_scale: f64,

    #[clap(long, default_value = DEFAULT_SAMPLER)]
    /// Sampling method
    pub sampler: String,

    #[clap(long, default_value_t = DEFAULT_SEED, allow_negative_numbers = true)]
    /// Seed for consistent generation, `-1` for random
    pub seed: i64,

    #[clap(long)]
    /// Comma-separated list of expressions to generate, defaults to all of them
    pub expressions: Option<String>,
}

/// CFG scale has to survive the trip through JSON, which has no NaN or infinity.
fn parse_cfg_scale(value: &str) -> Result<f64, String> {
    let scale: f64 = value
        .trim()
        .parse()
        .map_err(|err| format!("{value:?} isn't a number: {err}"))?;
    if !scale.is_finite() {
        return Err(format!("{value:?} must be a finite number"));
    }
    Ok(scale)
}

impl CliOptions {
    /// The generation settings every request in the batch uses.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            width: self.width,
            height: self.height,
            steps: self.steps,
            cfg_scale: self.cfg_scale,
            seed: self.seed,
            sampler: self.sampler.clone(),
        }
    }
}
