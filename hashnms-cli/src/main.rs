use clap::Parser;
use hashnms::{greedy_nms, hashed_nms, BoxesView, HashParams, KeyMode, MultiHashNms};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "hashnms CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum MethodConfig {
    #[default]
    Greedy,
    Hashed,
    MultiHash,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KeyModeConfig {
    Exact,
    LegacyPacked,
}

impl From<KeyModeConfig> for KeyMode {
    fn from(value: KeyModeConfig) -> Self {
        match value {
            KeyModeConfig::Exact => KeyMode::Exact,
            KeyModeConfig::LegacyPacked => KeyMode::LegacyPacked,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GreedyConfigJson {
    iou_threshold: f32,
}

impl Default for GreedyConfigJson {
    fn default() -> Self {
        Self { iou_threshold: 0.5 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct HashedConfigJson {
    w0: f32,
    h0: f32,
    alpha: f32,
    bx: f32,
    by: f32,
    key_mode: KeyModeConfig,
    parallel: bool,
}

impl Default for HashedConfigJson {
    fn default() -> Self {
        let params = HashParams::default();
        Self {
            w0: params.w0,
            h0: params.h0,
            alpha: params.alpha,
            bx: params.bx,
            by: params.by,
            key_mode: KeyModeConfig::Exact,
            parallel: params.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MultiHashConfigJson {
    passes: usize,
    alpha: f32,
    parallel: bool,
}

impl Default for MultiHashConfigJson {
    fn default() -> Self {
        Self {
            passes: 2,
            alpha: HashParams::default().alpha,
            parallel: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    detections_path: String,
    output_path: Option<String>,
    method: MethodConfig,
    greedy: GreedyConfigJson,
    hashed: HashedConfigJson,
    multi_hash: MultiHashConfigJson,
}

#[derive(Debug, Deserialize)]
struct Detections {
    boxes: Vec<[f32; 4]>,
    scores: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct Output {
    method: MethodConfig,
    num_input: usize,
    num_kept: usize,
    kept: Vec<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("hashnms=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.detections_path.is_empty() {
        return Err("detections_path must be set in the config".into());
    }

    let detections_text = fs::read_to_string(&config.detections_path)?;
    let detections: Detections = serde_json::from_str(&detections_text)?;
    tracing::info!(
        boxes = detections.boxes.len(),
        method = ?config.method,
        "loaded detections"
    );

    let boxes = BoxesView::from_rows(&detections.boxes);
    let scores = detections.scores.as_slice();
    let kept = match config.method {
        MethodConfig::Greedy => greedy_nms(boxes, scores, config.greedy.iou_threshold)?,
        MethodConfig::Hashed => {
            let h = config.hashed;
            let params = HashParams::new(h.w0, h.h0, h.alpha, h.bx, h.by)
                .with_key_mode(h.key_mode.into())
                .with_parallel(h.parallel);
            hashed_nms(boxes, scores, &params)?
        }
        MethodConfig::MultiHash => {
            let m = config.multi_hash;
            MultiHashNms::new(m.passes, m.alpha)?
                .with_parallel(m.parallel)
                .apply(boxes, scores)?
        }
    };

    let output = Output {
        method: config.method,
        num_input: boxes.len(),
        num_kept: kept.len(),
        kept,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
