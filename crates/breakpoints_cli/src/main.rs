//! Replays a sequence of viewport widths against a breakpoint payload.
//!
//! ```text
//! RUST_LOG=info breakpoints [payload-file]
//! ```
//!
//! The payload file holds either the raw JSON object or the computed
//! `content` string exactly as a browser reports it. Without a file a
//! built-in sm/md/lg/xl payload is used.

use anyhow::{Context as _, Error};
use breakpoints::headless::{HeadlessPage, css_string};
use breakpoints::{BreakpointConfig, Breakpoints, EnterLeave};
use css_media_queries::MediaEnvironment;
use log::{error, info, warn};
use std::process::ExitCode;
use std::{env, fs};

const BUILTIN_PAYLOAD: &str = r#"{"sm":"(min-width: 0em)","md":"(min-width: 48em)","lg":"(min-width: 80em)","xl":"(min-width: 90em)"}"#;

/// Replay settings read from the environment.
#[derive(Clone, Debug)]
struct ReplayConfig {
    /// Viewport widths to visit, in order
    widths: Vec<f32>,
    /// Viewport height used for every step
    height_px: f32,
    /// Root font size used to resolve `em` thresholds
    root_font_size_px: f32,
}

impl ReplayConfig {
    /// Reads `BREAKPOINTS_WIDTHS` (comma separated, default `320,800,1300,800,320`),
    /// `BREAKPOINTS_HEIGHT` (default 800) and `BREAKPOINTS_ROOT_FONT_PX` (default 16).
    fn from_env() -> Self {
        let widths = env::var("BREAKPOINTS_WIDTHS")
            .ok()
            .map(|val| {
                val.split(',')
                    .filter_map(|part| part.trim().parse::<f32>().ok())
                    .collect::<Vec<_>>()
            })
            .filter(|widths| !widths.is_empty())
            .unwrap_or_else(|| vec![320.0, 800.0, 1300.0, 800.0, 320.0]);
        let height_px = env::var("BREAKPOINTS_HEIGHT")
            .ok()
            .and_then(|val| val.parse::<f32>().ok())
            .unwrap_or(800.0);
        let root_font_size_px = env::var("BREAKPOINTS_ROOT_FONT_PX")
            .ok()
            .and_then(|val| val.parse::<f32>().ok())
            .filter(|size| *size > 0.0)
            .unwrap_or(16.0);
        Self {
            widths,
            height_px,
            root_font_size_px,
        }
    }
}

/// Read the payload as the generated-content string a page would report.
fn load_content() -> Result<String, Error> {
    let Some(path) = env::args().nth(1) else {
        return Ok(css_string(BUILTIN_PAYLOAD));
    };
    let text = fs::read_to_string(&path).with_context(|| format!("reading payload {path}"))?;
    let trimmed = text.trim();
    if trimmed.starts_with('"') || trimmed.starts_with('\'') {
        Ok(trimmed.to_owned())
    } else {
        Ok(css_string(trimmed))
    }
}

fn run() -> Result<(), Error> {
    let config = BreakpointConfig::from_env();
    let replay = ReplayConfig::from_env();

    let first_width = replay.widths.first().copied().unwrap_or(320.0);
    let environment = MediaEnvironment::new(first_width, replay.height_px)
        .with_root_font_size(replay.root_font_size_px);
    let page = HeadlessPage::new(environment);
    page.set_generated_content(&config.selector, &config.pseudo, &load_content()?);

    let Some(runtime) = Breakpoints::init(&page, &config).context("initializing breakpoints")?
    else {
        warn!("Host does not support breakpoints; nothing to do");
        return Ok(());
    };

    runtime.on_change(|notification| info!("change {}", notification.to_json()));
    if let Some(widest) = runtime.names().last() {
        runtime.on_enter_leave(
            widest,
            EnterLeave::new()
                .on_enter(|notification| info!("entered {}", notification.breakpoint()))
                .on_leave(|notification| info!("left {}", notification.breakpoint())),
        )?;
    }

    info!(
        "{} breakpoint(s): {}; starting at {first_width}px in {:?}",
        runtime.count(),
        runtime.names().join(", "),
        runtime.current_breakpoint()
    );
    for width in replay.widths.iter().skip(1) {
        page.resize(*width, replay.height_px);
        info!("{width}px -> {:?}", runtime.current_breakpoint());
    }
    info!(
        "{} transition event(s) dispatched",
        page.events().dispatched_events().len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
