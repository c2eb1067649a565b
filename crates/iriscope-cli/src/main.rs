//! iriscope CLI — locate pupil/iris circles in eye photographs and align
//! reference charts to the detected proportions.

mod diagram;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use image::Rgba;
use iriscope::{extract, locate_image, warp, EyeCircles, EyeSide, LocateConfig, RadialMapping};

pub(crate) type CliError = Box<dyn std::error::Error>;
pub(crate) type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "iriscope")]
#[command(about = "Locate pupil/iris circles in eye photographs and warp reference charts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate pupil, iris, and middle circle in an eye image.
    Detect(CliDetectArgs),

    /// Warp a square reference diagram to new radial breakpoints.
    Warp(CliWarpArgs),

    /// Full flow: detect, extract the iris disc, overlay the warped chart.
    Analyze(CliAnalyzeArgs),

    /// Look up the chart region for an image point, given detection results.
    Region(CliRegionArgs),

    /// Print the embedded radial zone and sector tables.
    Zones {
        /// Eye side for the sector table.
        #[arg(long, value_enum, default_value = "right")]
        side: SideArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for EyeSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Left => EyeSide::Left,
            SideArg::Right => EyeSide::Right,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Path to the input eye image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write detection results (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Optional path to write the input with the three circles drawn.
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// Optional path to write the extracted iris disc.
    #[arg(long)]
    extracted: Option<PathBuf>,

    /// Middle-circle interpolation weight between pupil and iris radii.
    #[arg(long, default_value = "0.3")]
    middle_ratio: f32,
}

#[derive(Debug, Clone, Args)]
struct CliWarpArgs {
    /// Path to the square reference diagram.
    #[arg(long)]
    diagram: PathBuf,

    /// Path to write the warped diagram.
    #[arg(long)]
    out: PathBuf,

    /// Destination inner (pupil) breakpoint ratio.
    #[arg(long)]
    dst_inner: f32,

    /// Destination middle breakpoint ratio.
    #[arg(long)]
    dst_middle: f32,

    /// Source inner breakpoint ratio of the diagram.
    #[arg(long, default_value = "0.19")]
    src_inner: f32,

    /// Source middle breakpoint ratio of the diagram.
    #[arg(long, default_value = "0.45")]
    src_middle: f32,
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    /// Path to the input eye image.
    #[arg(long)]
    image: PathBuf,

    /// Path to the square reference diagram.
    #[arg(long)]
    diagram: PathBuf,

    /// Path to write the composited result.
    #[arg(long)]
    out: PathBuf,

    /// Optional path to write detection results (JSON).
    #[arg(long)]
    results: Option<PathBuf>,

    /// Chart overlay opacity in [0, 1].
    #[arg(long, default_value = "0.55")]
    opacity: f32,

    /// Middle-circle interpolation weight between pupil and iris radii.
    #[arg(long, default_value = "0.3")]
    middle_ratio: f32,
}

#[derive(Debug, Clone, Args)]
struct CliRegionArgs {
    /// Path to detection results written by `detect` (JSON).
    #[arg(long)]
    results: PathBuf,

    /// Image x coordinate.
    #[arg(long)]
    x: f32,

    /// Image y coordinate.
    #[arg(long)]
    y: f32,

    /// Eye side for the sector table.
    #[arg(long, value_enum, default_value = "right")]
    side: SideArg,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Warp(args) => run_warp(&args),
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Region(args) => run_region(&args),
        Commands::Zones { side } => run_zones(side.into()),
    }
}

fn open_image(path: &Path) -> CliResult<image::DynamicImage> {
    image::open(path)
        .map_err(|e| -> CliError { format!("Failed to open image {}: {}", path.display(), e).into() })
}

fn detect_circles(img: &image::DynamicImage, middle_ratio: f32) -> CliResult<EyeCircles> {
    let config = LocateConfig {
        middle_ratio,
        ..LocateConfig::default()
    };
    let result = locate_image(img, &config)
        .map_err(|e| -> CliError { format!("Detection failed: {}", e).into() })?;
    tracing::info!(
        "pupil r={} ({:?}), iris r={} ({:?}), middle r={}",
        result.pupil.r,
        result.pupil_source,
        result.iris.r,
        result.iris_source,
        result.middle_circle.r,
    );
    if result.iris_source.is_estimated() {
        tracing::warn!("iris was synthesized from the pupil, not detected");
    }
    Ok(result)
}

// ── detect ────────────────────────────────────────────────────────────

fn run_detect(args: &CliDetectArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());
    let img = open_image(&args.image)?;
    let (w, h) = (img.width(), img.height());
    tracing::info!("Image size: {}x{}", w, h);

    let result = detect_circles(&img, args.middle_ratio)?;

    let json = serde_json::to_string_pretty(&result)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());

    if let Some(ref path) = args.annotated {
        let annotated = draw_circles(&img.to_rgba8(), &result);
        annotated.save(path)?;
        tracing::info!("Annotated image written to {}", path.display());
    }

    if let Some(ref path) = args.extracted {
        let disc = extract(&img.to_rgba8(), &result.iris, &result.pupil)?;
        disc.save(path)?;
        tracing::info!("Extracted disc written to {}", path.display());
    }

    Ok(())
}

fn draw_circles(src: &image::RgbaImage, circles: &EyeCircles) -> image::RgbaImage {
    let mut out = src.clone();
    let draw = |img: &mut image::RgbaImage, c: &iriscope::Circle, color: Rgba<u8>| {
        imageproc::drawing::draw_hollow_circle_mut(
            img,
            (c.cx.round() as i32, c.cy.round() as i32),
            c.r.round() as i32,
            color,
        );
    };
    draw(&mut out, &circles.pupil, Rgba([220, 20, 60, 255]));
    draw(&mut out, &circles.iris, Rgba([6, 95, 70, 255]));
    draw(&mut out, &circles.middle_circle, Rgba([30, 144, 255, 255]));
    out
}

// ── warp ──────────────────────────────────────────────────────────────

fn run_warp(args: &CliWarpArgs) -> CliResult<()> {
    let mut cache = diagram::DiagramCache::new();
    let src = cache.load(&args.diagram)?;

    let mapping =
        RadialMapping::new(args.dst_inner, args.dst_middle).with_source(args.src_inner, args.src_middle);
    let warped = warp(src, &mapping)
        .map_err(|e| -> CliError { format!("Warp rejected parameters: {}", e).into() })?;

    warped.save(&args.out)?;
    tracing::info!("Warped diagram written to {}", args.out.display());
    Ok(())
}

// ── analyze ───────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());
    let img = open_image(&args.image)?;
    let result = detect_circles(&img, args.middle_ratio)?;

    let rgba = img.to_rgba8();
    let mut canvas = extract(&rgba, &result.iris, &result.pupil)?;

    // Scale the chart to the iris diameter, then warp its fixed breakpoints
    // onto the detected proportions.
    let mut cache = diagram::DiagramCache::new();
    let chart = cache.load(&args.diagram)?;
    let iris_diameter = (result.iris.r * 2.0).round() as u32;
    let scaled = image::imageops::resize(
        chart,
        iris_diameter,
        iris_diameter,
        image::imageops::FilterType::Triangle,
    );

    let mapping = RadialMapping::new(
        result.pupil.r / result.iris.r,
        result.middle_circle.r / result.iris.r,
    );
    let mut warped = warp(&scaled, &mapping)
        .map_err(|e| -> CliError { format!("Warp rejected parameters: {}", e).into() })?;

    let opacity = args.opacity.clamp(0.0, 1.0);
    if opacity < 1.0 {
        for px in warped.pixels_mut() {
            px.0[3] = (px.0[3] as f32 * opacity).round() as u8;
        }
    }

    // Center the warped chart on the extracted disc.
    let offset = (canvas.width() as i64 - iris_diameter as i64) / 2;
    image::imageops::overlay(&mut canvas, &warped, offset, offset);

    canvas.save(&args.out)?;
    tracing::info!("Composite written to {}", args.out.display());

    if let Some(ref path) = args.results {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, &json)?;
        tracing::info!("Results written to {}", path.display());
    }

    Ok(())
}

// ── region ────────────────────────────────────────────────────────────

fn run_region(args: &CliRegionArgs) -> CliResult<()> {
    let json = std::fs::read_to_string(&args.results)?;
    let circles: EyeCircles = serde_json::from_str(&json)?;

    match iriscope::chart::region_at(&circles.pupil, &circles.iris, args.x, args.y, args.side.into())
    {
        Some(region) => {
            println!("clock position: {:.1}", region.clock);
            println!("band ratio:     {:.2}", region.band_ratio);
            if let Some(sector) = region.sector {
                println!("sector:         {}", sector.name);
            }
            if let Some(zone) = region.zone {
                println!("radial zone:    {}", zone.name);
            }
        }
        None => println!("point is outside the iris annulus"),
    }
    Ok(())
}

// ── zones ─────────────────────────────────────────────────────────────

fn run_zones(side: EyeSide) -> CliResult<()> {
    println!("iriscope embedded chart ({side} eye)");
    println!();
    println!("radial zones (fractions of the pupil-to-iris band):");
    for zone in &iriscope::chart::RADIAL_ZONES {
        println!(
            "  {:<20} {:.2} - {:.2}",
            zone.name, zone.inner_ratio, zone.outer_ratio
        );
    }
    println!();
    println!("sectors (clock units, 60 per turn):");
    for sector in iriscope::chart::sectors(side) {
        println!(
            "  {:<20} {:>4.0} - {:>4.0}",
            sector.name, sector.start_clock, sector.end_clock
        );
    }
    Ok(())
}
