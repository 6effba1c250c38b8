//! Binary entrypoint for wallpaper-slideshow.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use clap::{ArgAction, Parser, Subcommand};
use image::RgbaImage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use wallpaper_slideshow::config::Configuration;
use wallpaper_slideshow::events::SlideshowEvent;
use wallpaper_slideshow::finder::{find_images, find_packages, find_wallpaper_lists};
use wallpaper_slideshow::frame::render_frame;
use wallpaper_slideshow::interval::next_wake;
use wallpaper_slideshow::playlist::Playlist;
use wallpaper_slideshow::preview::{render_preview, render_single_preview};
use wallpaper_slideshow::resolution::{DEFAULT_TARGET, Dimension};
use wallpaper_slideshow::scheduler::{effective_start, evaluate, wall_clock};
use wallpaper_slideshow::slideshow_xml::{parse_slideshow, parse_slideshow_in};
use wallpaper_slideshow::tasks::{slideshow, xml_timer};
use wallpaper_slideshow::timeline::TimelineEntry;
use wallpaper_slideshow::wallpaper_list::{WallpaperItem, is_xml, parse_wallpaper_list};

#[derive(Debug, Parser)]
#[command(
    name = "wallpaper-slideshow",
    version,
    about = "Time-driven wallpaper slideshows"
)]
struct Cli {
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a slideshow's timeline, current state and next wake-up
    Inspect {
        #[arg(value_name = "XML")]
        descriptor: PathBuf,
        /// Screen size used to choose among resolution variants
        #[arg(long, value_name = "WxH", default_value_t = DEFAULT_TARGET)]
        resolution: Dimension,
        /// Evaluate in this IANA zone instead of local time
        #[arg(long, value_name = "ZONE")]
        timezone: Option<Tz>,
    },
    /// Render a thumbnail for a wallpaper list, slideshow or image
    Preview {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(long, value_name = "PNG")]
        out: PathBuf,
        #[arg(long, value_name = "WxH", default_value = "320x180")]
        size: Dimension,
    },
    /// Render what a slideshow shows right now
    Frame {
        #[arg(value_name = "XML")]
        descriptor: PathBuf,
        #[arg(long, value_name = "PNG")]
        out: PathBuf,
        #[arg(long, value_name = "WxH")]
        size: Option<Dimension>,
        #[arg(long, value_name = "ZONE")]
        timezone: Option<Tz>,
    },
    /// Discover wallpapers and run the slideshow until Ctrl-C
    Run {
        #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
        config: PathBuf,
    },
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let directive = format!("wallpaper_slideshow={level}")
        .parse()
        .context("invalid log directive")?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Inspect {
            descriptor,
            resolution,
            timezone,
        } => inspect(&descriptor, resolution, timezone),
        Command::Preview { input, out, size } => preview(&input, &out, size),
        Command::Frame {
            descriptor,
            out,
            size,
            timezone,
        } => frame(&descriptor, &out, size, timezone),
        Command::Run { config } => run(&config).await,
    }
}

fn inspect(descriptor: &Path, resolution: Dimension, tz: Option<Tz>) -> Result<()> {
    let timeline = parse_slideshow_in(descriptor, resolution, tz);
    let now = wall_clock(tz);

    println!("entries: {}", timeline.len());
    println!("cycle:   {}s", timeline.total_duration());
    println!("anchor:  {}", effective_start(&timeline, now));
    for (i, entry) in timeline.entries().iter().enumerate() {
        match entry {
            TimelineEntry::Static { path, duration } => {
                println!("  {i:>3} static     {duration:>8}s  {}", path.display());
            }
            TimelineEntry::Transition {
                from,
                to,
                duration,
                kind,
            } => {
                println!(
                    "  {i:>3} transition {duration:>8}s  {} -> {} {kind}",
                    from.display(),
                    to.display()
                );
            }
        }
    }
    println!("now:     {now}");
    println!("state:   {:?}", evaluate(&timeline, now));
    match next_wake(&timeline, now) {
        Some(wake) => println!(
            "wake in: {}{}",
            humantime::format_duration(wake.delay),
            if wake.in_transition { " (transition)" } else { "" }
        ),
        None => println!("wake in: never"),
    }
    Ok(())
}

fn preview(input: &Path, out: &Path, size: Dimension) -> Result<()> {
    let img = if is_xml(input) {
        let item = preview_item(input, size)
            .with_context(|| format!("{} holds no wallpapers", input.display()))?;
        render_preview(&item, size)
    } else {
        render_single_preview(input, size)
    };
    let Some(img) = img else {
        bail!("no preview could be rendered for {}", input.display());
    };
    save_png(&img, out)
}

/// First entry of a wallpaper list, or the descriptor itself when `input` is
/// a slideshow.
fn preview_item(input: &Path, size: Dimension) -> Option<WallpaperItem> {
    if let Some(item) = parse_wallpaper_list(input, size).into_iter().next() {
        return Some(item);
    }
    let slideshow = parse_slideshow(input, size);
    (!slideshow.is_empty()).then(|| WallpaperItem {
        filename: input.to_path_buf(),
        root: input.to_path_buf(),
        slideshow,
        ..WallpaperItem::default()
    })
}

fn frame(descriptor: &Path, out: &Path, size: Option<Dimension>, tz: Option<Tz>) -> Result<()> {
    let timeline = parse_slideshow_in(descriptor, size.unwrap_or(DEFAULT_TARGET), tz);
    let Some(img) = render_frame(&timeline, wall_clock(tz), size) else {
        bail!("no frame could be rendered for {}", descriptor.display());
    };
    save_png(&img, out)
}

fn save_png(img: &RgbaImage, out: &Path) -> Result<()> {
    img.save(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), width = img.width(), height = img.height(), "image written");
    Ok(())
}

/// Every slide under the configured paths, wallpaper list entries and
/// packages included.
fn discover(cfg: &Configuration) -> Vec<PathBuf> {
    let mut slides = find_images(&cfg.wallpaper_paths);
    slides.extend(
        find_wallpaper_lists(&cfg.wallpaper_paths, cfg.target_resolution)
            .iter()
            .map(|item| item.source_for(cfg.appearance).to_path_buf()),
    );
    slides.extend(
        find_packages(&cfg.wallpaper_paths, cfg.target_resolution)
            .into_iter()
            .map(|package| package.preferred),
    );
    slides
}

async fn run(config: &Path) -> Result<()> {
    let cfg = Configuration::from_yaml_file(config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    info!(?cfg, "loaded configuration");

    let slides = discover(&cfg);
    info!(count = slides.len(), "discovered wallpapers");
    let playlist = Playlist::with_options(slides, &cfg.playlist_options())?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let (tx, mut rx) = mpsc::channel::<SlideshowEvent>(16);
    let driver = tokio::spawn(slideshow::run(
        playlist,
        cfg.slide_interval,
        tx.clone(),
        cancel.clone(),
    ));

    let mut timer: Option<(CancellationToken, JoinHandle<Result<()>>)> = None;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    SlideshowEvent::Image(path) => {
                        info!(path = %path.display(), "slide");
                        if let Some((stop, handle)) = timer.take() {
                            stop.cancel();
                            let _ = handle.await;
                        }
                        if is_xml(&path) {
                            let timeline =
                                parse_slideshow_in(&path, cfg.target_resolution, cfg.timezone);
                            let stop = cancel.child_token();
                            let handle = tokio::spawn(xml_timer::run(
                                timeline,
                                cfg.timezone,
                                tx.clone(),
                                stop.clone(),
                            ));
                            timer = Some((stop, handle));
                        }
                    }
                    SlideshowEvent::Frame(state) => info!(?state, "slideshow frame"),
                }
            }
        }
    }

    cancel.cancel();
    if let Some((_, handle)) = timer {
        handle.await.context("slideshow timer panicked")??;
    }
    driver.await.context("slideshow task panicked")??;
    Ok(())
}
