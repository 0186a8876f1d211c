//! Sequential batch generation

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{error, info};

use crate::cli::CliOptions;
use crate::client::{ImageApi, SdClient};
use crate::error::SpriteError;
use crate::output::{save_image, setup_output_folder};
use crate::prompts::{PromptConfig, filter_expressions};
use crate::request::{GenerationParams, build_request};

/// What happened to one expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The image was written here
    Saved(PathBuf),
    /// Generation failed, with the reason
    Failed(String),
}

/// Tally of a finished batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of expressions attempted
    pub total: usize,
    /// Images saved
    pub succeeded: usize,
    /// Expressions that failed
    pub failed: usize,
    /// Per-expression results, in the order they ran
    pub outcomes: Vec<(String, ItemOutcome)>,
}

impl BatchSummary {
    fn record(&mut self, expression: &str, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Saved(_) => self.succeeded += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push((expression.to_string(), outcome));
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Batch processing complete: {} succeeded, {} failed.",
            self.succeeded, self.failed
        )
    }
}

/// Generates and saves a single expression.
pub fn generate_expression<A: ImageApi + ?Sized>(
    api: &A,
    config: &PromptConfig,
    expression: &str,
    description: &str,
    params: &GenerationParams,
    output_folder: &Path,
) -> Result<PathBuf, SpriteError> {
    let request = build_request(config, description, params);
    let image = api.txt2img(&request)?;
    save_image(output_folder, expression, &image)
}

/// Runs every expression in order. Failures are logged and counted, they
/// never stop the batch.
pub fn run_batch<A: ImageApi + ?Sized>(
    api: &A,
    config: &PromptConfig,
    expressions: &IndexMap<String, String>,
    params: &GenerationParams,
    output_folder: &Path,
) -> BatchSummary {
    let mut summary = BatchSummary {
        total: expressions.len(),
        ..Default::default()
    };

    for (idx, (expression, description)) in expressions.iter().enumerate() {
        info!("[{}/{}] Generating: {expression}...", idx + 1, summary.total);

        let outcome = match generate_expression(
            api,
            config,
            expression,
            description,
            params,
            output_folder,
        ) {
            Ok(path) => {
                info!("Saved: {}", path.display());
                ItemOutcome::Saved(path)
            }
            Err(err) => {
                error!("Error generating image for {expression}: {err}");
                ItemOutcome::Failed(err.to_string())
            }
        };
        summary.record(expression, outcome);
    }

    summary
}

/// Startup checks followed by the batch. Any error returned here is fatal.
pub fn run(cli: &CliOptions) -> Result<BatchSummary, SpriteError> {
    let output_folder = setup_output_folder(&cli.output_folder)?;
    let client = SdClient::new(&cli.api_url);
    let prompts = PromptConfig::load(&cli.prompt_file)?;
    let expressions = filter_expressions(&prompts.expressions, cli.expressions.as_deref())?;

    info!(
        "Generating {} expression(s) via {} into {}",
        expressions.len(),
        client.api_url(),
        output_folder.display()
    );

    let params = cli.generation_params();
    Ok(run_batch(
        &client,
        &prompts,
        &expressions,
        &params,
        &output_folder,
    ))
}
