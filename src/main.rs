//! Drives a synthetic training run through the epoch logger.
//!
//! Run with:
//!   cargo run --release -- --epochs 40 --patience 5
//! or point `--config` at a JSON logger config. `RUST_LOG=ferrite_logger=debug`
//! shows what the aggregator does at every epoch boundary.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ferrite_logger::{LoggerBuilder, LoggerConfig, TextCanvas};

const DEFAULT_CONFIG: &str = r#"{
    "trackable": "val_loss",
    "tracking_mode": "min",
    "prints": ["train_loss", ["val_loss", "min"], ["val_acc", "max"]],
    "progressbar": "epochs",
    "plots": [
        {"kind": "plot", "params": ["train_loss", "val_loss"]},
        {"kind": "summary"}
    ]
}"#;

#[derive(Parser)]
#[command(name = "ferrite-logger", about = "Synthetic training run with per-epoch aggregation and early stopping")]
struct Args {
    /// JSON logger config; a built-in one tracking val_loss is used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 40)]
    epochs: usize,

    /// Training steps per epoch
    #[arg(long, default_value_t = 50)]
    steps: usize,

    /// Epochs without a new best before stopping
    #[arg(long, default_value_t = 5)]
    patience: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LoggerConfig::load_json(path)?,
        None => LoggerConfig::from_json_str(DEFAULT_CONFIG)?,
    };

    let mut logger = LoggerBuilder::from_config(&config)?
        .derive(["correct", "seen"], "acc", |a| a[0].sum() / a[1].sum())
        .total_epochs(args.epochs as u64)
        .build();

    let tracking = logger.tracker().is_configured();
    if !tracking {
        warn!("config has no trackable/tracking_mode, early stopping is disabled");
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let val_batches = (args.steps / 5).max(1);

    for epoch in 0..args.epochs {
        // Training loss decays to a floor; validation loss turns back up once
        // the model starts to overfit.
        let train_base = 0.1 + 2.0 * (-0.15 * epoch as f64).exp();
        let val_base = train_base + 0.0004 * (epoch as f64).powi(2);

        for _ in 0..args.steps {
            let loss = train_base + rng.gen_range(-0.05..0.05);
            logger.log_step("train", [("loss", loss)]);
        }

        let hit_rate = (1.0 - val_base / 2.5).clamp(0.0, 1.0);
        for _ in 0..val_batches {
            let seen = 32;
            let correct = (0..seen).filter(|_| rng.gen_bool(hit_rate)).count();
            logger.log_step(
                "val",
                [
                    ("loss", val_base + rng.gen_range(-0.05..0.05)),
                    ("correct", correct as f64),
                    ("seen", seen as f64),
                ],
            );
        }

        logger.log_epoch([("lr", 0.01 * 0.95_f64.powi(epoch as i32))])?;
        logger.print()?;

        if !tracking {
            continue;
        }
        if logger.is_best(None, None)? {
            info!(epoch, "new best, checkpoint would be written here");
        }
        if logger.should_stop(args.patience, None, None)? {
            info!(epoch, patience = args.patience, "no improvement, stopping early");
            break;
        }
    }
    logger.finish();

    if tracking {
        if let Some((step, value)) = logger.best(None, None)? {
            info!(step, value, "best epoch");
        }
    }

    let mut canvas = TextCanvas::new(std::io::stdout().lock(), 40);
    logger.plot(&mut canvas)?;
    Ok(())
}
