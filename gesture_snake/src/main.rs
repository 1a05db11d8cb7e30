//! gesture_snake — interactive entry point.

use std::time::Duration;

use clap::Parser;

use gesture_snake::app::{run, AppConfig};
use grid_snake::{Boundary, GridConfig};
use swipe_gesture::{PipelineConfig, SwipeConfig};

#[derive(Debug, Parser)]
#[command(name = "gesture_snake")]
#[command(about = "Grid snake steered by keyboard or hand swipes")]
struct Cli {
    /// Grid width in cells
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(i32).range(2..=64))]
    width: i32,
    /// Grid height in cells
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(i32).range(2..=48))]
    height: i32,
    /// Wrap around the edges instead of dying on them
    #[arg(long)]
    wrap: bool,
    /// Time between moves at the start of a run
    #[arg(long = "base-delay-ms", default_value_t = 100)]
    base_delay_ms: u64,
    /// Fastest the snake ever gets
    #[arg(long = "min-delay-ms", default_value_t = 40)]
    min_delay_ms: u64,
    /// Speed-up per food eaten
    #[arg(long = "delay-step-ms", default_value_t = 5)]
    delay_step_ms: u64,
    /// Swipe threshold in camera pixels
    #[arg(long, default_value_t = 60.0)]
    threshold: f32,
    /// Quiet period after each recognised swipe
    #[arg(long = "cooldown-ms", default_value_t = 1000)]
    cooldown_ms: u64,
    /// Turn gesture tracking on at launch
    #[arg(long)]
    gestures: bool,
    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn into_config(self) -> AppConfig {
        let base_delay = Duration::from_millis(self.base_delay_ms.max(1));
        let grid = GridConfig {
            width:      self.width,
            height:     self.height,
            boundary:   if self.wrap { Boundary::Wrap } else { Boundary::Wall },
            base_delay,
            min_delay:  Duration::from_millis(self.min_delay_ms).min(base_delay),
            delay_step: Duration::from_millis(self.delay_step_ms),
        };
        let pipeline = PipelineConfig {
            swipe: SwipeConfig {
                threshold_px: self.threshold.max(0.0),
                cooldown:     Duration::from_millis(self.cooldown_ms),
            },
            ..PipelineConfig::default()
        };
        AppConfig { grid, pipeline, gestures: self.gestures, seed: self.seed }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Cli::parse().into_config();

    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║          Gesture Snake: swipe or type to steer       ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Camera: simulated (mouse pointer over the playfield)");
    println!("  G toggles gestures, Q quits.");
    println!();

    if let Err(e) = run(cfg) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
