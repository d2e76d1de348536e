use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planimeter_core::{
    measure, read_image_info, Canvas, ClosedPolygon, ImageInfo, ImageLoader, ImagePoint,
    ImageSource, LayerKind, MeasureSession, Phase, PlanimeterConfig, RecordingCanvas,
    SessionEvent, TextPanel, ViewState,
};
use planimeter_render::RasterCanvas;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "planimeter")]
#[command(about = "Measure polygon areas on a floor plan or map image")]
pub struct Cli {
    /// JSON configuration file (defaults to the platform config directory).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print image dimensions and overlay bounds.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Compute the area enclosed by a list of vertices.
    Area {
        #[arg(
            long = "point",
            value_name = "X,Y",
            required = true,
            allow_hyphen_values = true,
            value_parser = parse_point
        )]
        points: Vec<ImagePoint>,
    },
    /// Run a scripted sequence of clicks, closes and resets.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Reference image loaded before the script runs.
        #[arg(long)]
        image: Option<PathBuf>,
        /// Write the final overlay as a PNG.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Draw a measured polygon onto an image.
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(
            long = "point",
            value_name = "X,Y",
            allow_hyphen_values = true,
            value_parser = parse_point
        )]
        points: Vec<ImagePoint>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    width: u32,
    height: u32,
    bounds: [[f64; 2]; 2],
    view: ViewState,
}

#[derive(Debug, Serialize)]
struct AreaOutput {
    vertices: usize,
    area: f64,
    formatted: String,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    phase: Phase,
    vertex_count: usize,
    vertex_text: String,
    area_text: String,
    closed: Option<ClosedPolygon>,
    label: Option<String>,
    layers: BTreeMap<LayerKind, usize>,
    alerts: Vec<String>,
    image: Option<ImageInfo>,
    view: Option<ViewState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config = || {
        PlanimeterConfig::load(cli.config.as_deref()).context("failed to load configuration")
    };

    match cli.command {
        Commands::Info { file } => run_info(&config()?, &file),
        Commands::Area { points } => run_area(&config()?, &points),
        Commands::Replay { script, image, output } => {
            run_replay(&config()?, &script, image.as_deref(), output.as_deref())
        }
        Commands::Render { file, points, output } => {
            run_render(&config()?, &file, &points, output.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_info(config: &PlanimeterConfig, file: &Path) -> Result<()> {
    let info =
        read_image_info(&ImageSource::from(file.to_path_buf())).context("failed to read image")?;
    let bounds = info.bounds();

    let payload = InfoOutput {
        path: file.display().to_string(),
        width: info.width,
        height: info.height,
        bounds: bounds.corners(),
        view: fit_view(config, &info),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_area(config: &PlanimeterConfig, points: &[ImagePoint]) -> Result<()> {
    let measurement = measure(points)?;

    let payload = AreaOutput {
        vertices: measurement.vertices,
        area: measurement.area,
        formatted: measurement.formatted(config.area_decimals),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_replay(
    config: &PlanimeterConfig,
    script: &Path,
    image: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let bytes = fs::read(script)
        .with_context(|| format!("failed to read replay script {}", script.display()))?;
    let events: Vec<SessionEvent> =
        serde_json::from_slice(&bytes).context("failed to parse replay script")?;

    let image = image.map(Path::to_path_buf).or_else(|| config.default_image.clone());
    let info = match &image {
        Some(path) => Some(load_image(path)?),
        None => None,
    };

    let payload = match output {
        Some(output) => {
            let mut canvas = match &image {
                Some(path) => RasterCanvas::with_pixels(decode_image(path)?),
                None => RasterCanvas::new(),
            };
            let mut payload = replay(config, &mut canvas, info, events);

            let composed = canvas.compose().context("failed to render overlay")?;
            save_png(&composed, output)?;
            payload.output = Some(output.display().to_string());
            payload
        }
        None => replay(config, &mut RecordingCanvas::new(), info, events),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn replay(
    config: &PlanimeterConfig,
    canvas: &mut dyn Canvas,
    info: Option<ImageInfo>,
    events: Vec<SessionEvent>,
) -> ReplayOutput {
    let mut session = MeasureSession::with_style(config.overlay_style(), config.area_decimals);
    let mut panel = TextPanel::with_decimals(config.area_decimals);

    if let Some(info) = info {
        session.load_image(info, canvas, &mut panel);
    }

    for (index, event) in events.into_iter().enumerate() {
        if let Err(err) = session.apply(event, canvas, &mut panel) {
            log::info!("event {index} rejected: {err}");
        }
    }

    ReplayOutput {
        phase: session.phase(),
        vertex_count: session.vertex_count(),
        vertex_text: panel.vertex_text().to_owned(),
        area_text: panel.area_text().to_owned(),
        closed: session.closed().cloned(),
        label: session.closed().map(|closed| closed.label().to_owned()),
        layers: session.layers().kind_counts(),
        alerts: panel.alerts().to_vec(),
        view: session.image().map(|info| fit_view(config, info)),
        image: session.image().cloned(),
        output: None,
    }
}

fn run_render(
    config: &PlanimeterConfig,
    file: &Path,
    points: &[ImagePoint],
    output: Option<&Path>,
) -> Result<()> {
    let info = load_image(file)?;
    let mut canvas = RasterCanvas::with_pixels(decode_image(file)?);
    let mut panel = TextPanel::with_decimals(config.area_decimals);
    let mut session = MeasureSession::with_style(config.overlay_style(), config.area_decimals);

    session.load_image(info, &mut canvas, &mut panel);
    for point in points {
        session.click(*point, &mut canvas, &mut panel);
    }
    session.close(&mut canvas, &mut panel)?;

    let output = output.map(ToOwned::to_owned).unwrap_or_else(|| default_render_output(file));
    let composed = canvas.compose().context("failed to render overlay")?;
    save_png(&composed, &output)?;

    println!("{}", output.display());
    Ok(())
}

fn load_image(path: &Path) -> Result<ImageInfo> {
    ImageLoader::new()
        .spawn(ImageSource::from(path.to_path_buf()))
        .wait()
        .context("failed to read image")
}

fn decode_image(path: &Path) -> Result<image::RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?;
    Ok(img.to_rgba8())
}

fn save_png(img: &image::RgbaImage, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    img.save_with_format(output, image::ImageFormat::Png)
        .with_context(|| format!("failed to write image to {}", output.display()))
}

fn fit_view(config: &PlanimeterConfig, info: &ImageInfo) -> ViewState {
    ViewState::fit(
        info.bounds(),
        config.viewport_width,
        config.viewport_height,
        config.min_zoom,
        config.max_zoom,
    )
}

fn parse_point(value: &str) -> Result<ImagePoint, String> {
    let (x, y) = value.split_once(',').ok_or_else(|| format!("expected X,Y but got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid coordinate `{}` in `{value}`", part.trim()))
    };
    Ok(ImagePoint::new(parse(x)?, parse(y)?))
}

fn default_render_output(file: &Path) -> PathBuf {
    let stem = file.file_stem().and_then(|name| name.to_str()).unwrap_or("plan");

    file.with_file_name(format!("{stem}-area.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_point_accepts_signed_decimals() {
        assert_eq!(parse_point("-1.5, 2").unwrap(), ImagePoint::new(-1.5, 2.0));
    }

    #[test]
    fn parse_point_rejects_malformed_input() {
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,1").is_err());
        assert!(parse_point("1,inf").is_err());
    }

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_render_output(Path::new("/plans/floor.jpg")),
            PathBuf::from("/plans/floor-area.png")
        );
    }
}
