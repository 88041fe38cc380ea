//! cdrscroll - Entry Point
//!
//! Drives a virtual scroller over an in-memory table through a simulated
//! scroll session and prints what each frame rendered as JSON.

use cdrscroll::config::{ConfigError, ResolvedConfig, ScrollerConfig};
use cdrscroll::dom::{Dom, MemoryDom};
use cdrscroll::model::{sample_hierarchy, CdrRow};
use cdrscroll::scroller::{RenderOutcome, ScrollerStatus};
use cdrscroll::{ScrollerOptions, VirtualScroller};
use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

/// Simulated frame interval between scroll steps, in milliseconds.
const FRAME_MS: f64 = 16.0;

/// cdrscroll - windowed rendering of hierarchical CDR tables
#[derive(Parser, Debug)]
#[command(name = "cdrscroll")]
#[command(version)]
#[command(about = "Simulate virtual scrolling over a CDR metrics table")]
pub struct Args {
    /// Number of synthetic main/peer/hourly rows
    #[arg(short, long, default_value = "1000")]
    pub rows: usize,

    /// JSON file holding an array of CDR rows (replaces --rows)
    #[arg(short, long, conflicts_with = "rows")]
    pub input: Option<PathBuf>,

    /// Height of the simulated scroll container, in pixels
    #[arg(long, default_value = "600")]
    pub viewport_height: f64,

    /// Width of the simulated viewport; 768 or less selects the compact profile
    #[arg(long)]
    pub viewport_width: Option<f64>,

    /// Number of scroll steps to simulate
    #[arg(long, default_value = "20")]
    pub steps: usize,

    /// Pixels scrolled per step
    #[arg(long, default_value = "400", allow_negative_numbers = true)]
    pub step_px: f64,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the assumed row height, in pixels
    #[arg(long)]
    pub row_height: Option<f64>,

    /// Enable render diagnostics in the log
    #[arg(long)]
    pub debug: bool,

    /// Write the log here instead of the default state directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// What one simulated frame rendered.
#[derive(Debug, Serialize)]
struct StepReport {
    step: usize,
    scroll_top: f64,
    #[serde(flatten)]
    outcome: RenderOutcome,
}

/// Full session report printed to stdout.
#[derive(Debug, Serialize)]
struct SessionReport {
    initial: RenderOutcome,
    steps: Vec<StepReport>,
    status: ScrollerStatus,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = resolve_config(&args)?;

    cdrscroll::logging::init(&config.log_file_path, config.scroller.debug)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let rows = load_rows(&args)?;
    let report = simulate(&args, config.scroller, rows)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Defaults (or compact profile) → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, ConfigError> {
    // The compact profile is the base, so explicit values still win over it.
    let base = match args.viewport_width {
        Some(width) => ScrollerConfig::default().for_viewport_width(width),
        None => ScrollerConfig::default(),
    };

    let config_file = cdrscroll::config::load_config_with_precedence(args.config.clone())?;
    let merged = cdrscroll::config::merge_config_onto(base, config_file);
    let with_env = cdrscroll::config::apply_env_overrides(merged);

    let debug_override = if args.debug { Some(true) } else { None };
    Ok(cdrscroll::config::apply_cli_overrides(
        with_env,
        args.row_height,
        debug_override,
        args.log_file.clone(),
    ))
}

fn load_rows(args: &Args) -> Result<Vec<CdrRow>, Box<dyn Error>> {
    match &args.input {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            let rows: Vec<CdrRow> = serde_json::from_str(&raw)
                .map_err(|e| format!("cannot parse {}: {}", path.display(), e))?;
            info!(path = %path.display(), rows = rows.len(), "Loaded rows from file");
            Ok(rows)
        }
        None => Ok(sample_hierarchy(args.rows)),
    }
}

/// Initialise a scroller over `rows`, then scroll it `args.steps` times.
fn simulate(
    args: &Args,
    config: ScrollerConfig,
    rows: Vec<CdrRow>,
) -> Result<SessionReport, Box<dyn Error>> {
    let (dom, handles) = MemoryDom::table_fixture(args.viewport_height);
    let Some(container) = handles.container else {
        return Err("table fixture has no scroll container".into());
    };

    let options = ScrollerOptions::for_cdr_rows(handles).with_config(config);
    let mut scroller = VirtualScroller::new(dom, options)?;
    scroller.initialize()?;
    let initial = scroller.set_data(rows);

    let mut steps = Vec::with_capacity(args.steps);
    for step in 1..=args.steps {
        let dom = scroller.dom_mut();
        dom.advance_clock(FRAME_MS);
        let scroll_top = (dom.scroll_top(&container) + args.step_px).max(0.0);
        dom.set_scroll_top(&container, scroll_top);

        scroller.on_scroll_event();
        scroller.dom_mut().take_frame_request();
        let outcome = scroller.on_animation_frame();
        steps.push(StepReport {
            step,
            scroll_top,
            outcome,
        });
    }

    let status = scroller.status();
    info!(
        renders = status.render_count,
        pool = status.pool_size,
        "Simulation finished"
    );
    Ok(SessionReport {
        initial,
        steps,
        status,
    })
}
