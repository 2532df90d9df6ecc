//! # lottie-play
//!
//! Headless driver for Lottie compositions.
//!
//! ## Commands
//! - `info`: Print composition metadata
//! - `play`: Simulate the display refresh loop and report what was painted

mod trace_renderer;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use lottie_core::{
    ClipSpec, Composition, CompositionLoader, CompositionResult, CompositionSpec,
    CompositionTask, FrameOutcome, LoaderConfig, LottieAnimation, PlaybackConfig,
    PolledScheduler,
};
use std::path::PathBuf;
use std::sync::Arc;
use trace_renderer::TraceRenderer;

#[derive(Parser)]
#[command(name = "lottie-play")]
#[command(about = "Inspect and simulate Lottie animations")]
#[command(version)]
struct Cli {
    /// Directory for `asset:` inputs
    #[arg(long, global = true, default_value = "assets")]
    assets_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print composition metadata
    Info {
        /// File path, `asset:<name>`, `res:<id>` or an http(s) URL
        input: CompositionSpec,
    },

    /// Simulate playback at a fixed refresh rate
    Play {
        input: CompositionSpec,

        /// Refresh rate; defaults to the config's `refresh_rate`
        #[arg(long)]
        fps: Option<f32>,

        /// Simulated wall-clock time
        #[arg(long, default_value = "3.0")]
        seconds: f32,

        #[arg(long)]
        speed: Option<f32>,

        /// Extra plays after the first; -1 loops forever
        #[arg(long, allow_hyphen_values = true)]
        repeat: Option<i32>,

        #[arg(long, conflicts_with = "marker")]
        clip_min: Option<f32>,

        #[arg(long, conflicts_with = "marker")]
        clip_max: Option<f32>,

        /// Restrict playback to a named marker
        #[arg(long)]
        marker: Option<String>,

        /// Surface width; defaults to the composition width
        #[arg(long)]
        width: Option<f32>,

        /// Surface height; defaults to the composition height
        #[arg(long)]
        height: Option<f32>,

        /// Playback config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("lottie_play=info,lottie_core=info")
                }),
        )
        .init();

    let cli = Cli::parse();
    let loader = Arc::new(CompositionLoader::new(LoaderConfig {
        assets_dir: cli.assets_dir,
        ..LoaderConfig::default()
    }));

    match cli.command {
        Commands::Info { input } => cmd_info(&loader, input),
        Commands::Play {
            input,
            fps,
            seconds,
            speed,
            repeat,
            clip_min,
            clip_max,
            marker,
            width,
            height,
            config,
        } => {
            let mut playback = match config {
                Some(path) => PlaybackConfig::load(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => PlaybackConfig::default(),
            };
            if let Some(speed) = speed {
                playback.speed = speed;
            }
            if let Some(repeat) = repeat {
                playback.repeat_count = repeat;
            }
            if let Some(name) = marker {
                playback.clip = Some(ClipSpec::Marker { name });
            } else if clip_min.is_some() || clip_max.is_some() {
                playback.clip = Some(ClipSpec::Progress {
                    min: clip_min.unwrap_or(0.0),
                    max: clip_max.unwrap_or(1.0),
                });
            }
            let fps = fps.unwrap_or(playback.refresh_rate);
            cmd_play(&loader, input, &playback, fps, seconds, (width, height))
        }
    }
}

fn load(loader: &Arc<CompositionLoader>, input: CompositionSpec) -> Result<Arc<Composition>> {
    let mut task = CompositionTask::spawn(loader.clone(), input.clone());
    match task.wait() {
        CompositionResult::Success(comp) => Ok(comp.clone()),
        CompositionResult::Fail(err) => {
            Err(anyhow::anyhow!(err.clone())).with_context(|| format!("loading {input}"))
        }
        CompositionResult::Loading => bail!("loading {input} was abandoned"),
    }
}

fn cmd_info(loader: &Arc<CompositionLoader>, input: CompositionSpec) -> Result<()> {
    let comp = load(loader, input)?;
    let bounds = comp.bounds();

    println!("Composition");
    println!("===========");
    println!("  Name:      {}", comp.name().unwrap_or("-"));
    println!("  Version:   {}", comp.version().unwrap_or("-"));
    println!("  Size:      {}x{}", bounds.width, bounds.height);
    println!(
        "  Frames:    {} to {} at {} fps",
        comp.start_frame(),
        comp.end_frame(),
        comp.frame_rate()
    );
    println!("  Duration:  {:.0} ms", comp.duration_ms());
    println!("  Layers:    {}", comp.layer_count());
    println!("  Images:    {}", comp.images().len());
    for image in comp.images() {
        let source = if image.embedded.is_some() {
            "embedded".to_string()
        } else {
            image.relative_path()
        };
        println!("    {} {}x{} ({source})", image.id, image.width, image.height);
    }
    println!("  Markers:   {}", comp.markers().len());
    for marker in comp.markers() {
        println!(
            "    {} [{}, {}]",
            marker.name,
            marker.start_frame,
            marker.end_frame()
        );
    }
    Ok(())
}

/// What a simulated run did.
#[derive(Debug, Default, PartialEq)]
struct Summary {
    ticks: usize,
    advanced: usize,
    wraps: usize,
    paints: usize,
    frames_pushed: usize,
    distinct_frames: usize,
    finished_at: Option<f32>,
    final_progress: f32,
    final_frame: i32,
}

fn cmd_play(
    loader: &Arc<CompositionLoader>,
    input: CompositionSpec,
    config: &PlaybackConfig,
    fps: f32,
    seconds: f32,
    surface: (Option<f32>, Option<f32>),
) -> Result<()> {
    let comp = load(loader, input)?;
    let mut anim = LottieAnimation::with_config(
        TraceRenderer::default(),
        Box::new(PolledScheduler),
        config,
    )
    .context("invalid playback config")?;
    anim.set_composition(Some(comp.clone()));
    if comp.has_images() {
        anim.wait_for_image_assets();
    }

    let bounds = comp.bounds();
    let available = Vec2::new(
        surface.0.unwrap_or(bounds.width as f32),
        surface.1.unwrap_or(bounds.height as f32),
    );
    let surface = anim.constrain_surface(available);
    tracing::info!(width = surface.x, height = surface.y, fps, seconds, "simulating");

    let summary = simulate(&mut anim, fps, seconds, surface)?;

    println!("Ticks:           {}", summary.ticks);
    println!("Advanced:        {}", summary.advanced);
    println!("Wraps:           {}", summary.wraps);
    println!("Paints:          {}", summary.paints);
    println!("Frames pushed:   {}", summary.frames_pushed);
    println!("Distinct frames: {}", summary.distinct_frames);
    match summary.finished_at {
        Some(t) => println!("Finished at:     {t:.3} s"),
        None => println!("Finished at:     still playing"),
    }
    println!("Final progress:  {:.3}", summary.final_progress);
    println!("Final frame:     {}", summary.final_frame);
    Ok(())
}

/// Drives `anim` with evenly spaced timestamps, painting after every tick.
fn simulate(
    anim: &mut LottieAnimation<TraceRenderer>,
    fps: f32,
    seconds: f32,
    surface: Vec2,
) -> Result<Summary> {
    if !fps.is_finite() || fps <= 0.0 {
        bail!("refresh rate must be positive, got {fps}");
    }
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("duration must not be negative, got {seconds}");
    }

    let ticks = (seconds * fps).round() as usize;
    let interval = 1_000_000_000f64 / fps as f64;
    let mut summary = Summary {
        ticks,
        ..Summary::default()
    };

    for tick in 0..ticks {
        let now = (tick as f64 * interval) as u64;
        if anim.wants_frame() {
            match anim.on_frame(now) {
                FrameOutcome::Advanced { wrapped, .. } => {
                    summary.advanced += 1;
                    if wrapped {
                        summary.wraps += 1;
                    }
                }
                FrameOutcome::Finished { frame } => {
                    summary.advanced += 1;
                    summary.finished_at = Some(now as f32 / 1e9);
                    tracing::info!(frame, "playback finished");
                }
                FrameOutcome::Baseline | FrameOutcome::Ignored => {}
            }
        }
        anim.render(surface);
    }

    summary.final_progress = anim.state().progress();
    summary.final_frame = anim.state().current_frame();
    let renderer = anim.renderer();
    summary.paints = renderer.paints;
    summary.frames_pushed = renderer.frames_pushed;
    summary.distinct_frames = renderer.distinct_frames.len();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse() -> Arc<Composition> {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../lottie-core/tests/fixtures/pulse.json");
        let bytes = std::fs::read(path).unwrap();
        Arc::new(Composition::from_json_slice(&bytes).unwrap())
    }

    fn animation(config: &PlaybackConfig) -> LottieAnimation<TraceRenderer> {
        let mut anim = LottieAnimation::with_config(
            TraceRenderer::default(),
            Box::new(PolledScheduler),
            config,
        )
        .unwrap();
        anim.set_composition(Some(pulse()));
        anim
    }

    #[test]
    fn looping_run_wraps_and_keeps_playing() {
        let mut anim = animation(&PlaybackConfig::default());
        // 2 s composition, 125 ms ticks: a sixteenth per tick.
        let summary = simulate(&mut anim, 8.0, 5.0, Vec2::new(200.0, 100.0)).unwrap();
        assert_eq!(summary.ticks, 40);
        assert_eq!(summary.paints, 40);
        assert_eq!(summary.advanced, 39);
        assert_eq!(summary.wraps, 2);
        assert!(summary.finished_at.is_none());
        assert_eq!(summary.final_progress, 0.4375);
        // The driver and the render pass both push frames.
        assert_eq!(summary.frames_pushed, 79);
    }

    #[test]
    fn single_play_finishes_at_the_end() {
        let config = PlaybackConfig {
            repeat_count: 0,
            ..PlaybackConfig::default()
        };
        let mut anim = animation(&config);
        let summary = simulate(&mut anim, 8.0, 3.0, Vec2::new(200.0, 100.0)).unwrap();
        assert_eq!(summary.finished_at, Some(2.0));
        assert_eq!(summary.final_progress, 1.0);
        assert_eq!(summary.final_frame, 60);
        assert!(!anim.state().is_playing());
    }

    #[test]
    fn rejects_bad_refresh_rate() {
        let mut anim = animation(&PlaybackConfig::default());
        assert!(simulate(&mut anim, 0.0, 1.0, Vec2::ONE).is_err());
        assert!(simulate(&mut anim, f32::NAN, 1.0, Vec2::ONE).is_err());
    }

    #[test]
    fn parses_play_flags() {
        let cli = Cli::try_parse_from([
            "lottie-play",
            "play",
            "asset:pulse.json",
            "--repeat",
            "-1",
            "--marker",
            "grow",
        ])
        .unwrap();
        match cli.command {
            Commands::Play {
                input,
                repeat,
                marker,
                ..
            } => {
                assert_eq!(input, CompositionSpec::Asset("pulse.json".into()));
                assert_eq!(repeat, Some(-1));
                assert_eq!(marker.as_deref(), Some("grow"));
            }
            Commands::Info { .. } => panic!("expected play"),
        }
    }
}
