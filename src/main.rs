use clap::{Parser, Subcommand};
use imprint::config::{self, ImprintConfig};
use imprint::imaging::{Color, Drawer, Image, Placement, RustEngine, is_writable_format};
use imprint::output::{self, ImageInfo};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Where a command writes its result and in which format.
#[derive(clap::Args, Clone)]
struct OutputArgs {
    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Output format (png, jpeg, gif, webp, tiff, avif). Defaults to the
    /// output file extension, then to the configured canvas format.
    #[arg(long)]
    format: Option<String>,
}

/// Text style overrides on top of the `[text]` config section.
#[derive(clap::Args, Clone)]
struct StyleArgs {
    /// Font file (TrueType/OpenType)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Glyph height in pixels
    #[arg(long)]
    size: Option<f32>,

    /// Fill colour
    #[arg(long)]
    color: Option<String>,

    /// Outline colour
    #[arg(long)]
    stroke_color: Option<String>,

    /// Outline thickness in pixels
    #[arg(long)]
    stroke_width: Option<u32>,
}

#[derive(Parser)]
#[command(name = "imprint")]
#[command(about = "Create, annotate, composite and export images")]
#[command(long_about = "\
Create, annotate, composite and export images

Overlays are positioned with one of nine anchors:

  top-left     top-center     top-right
  mid-left     mid-center     mid-right
  bottom-left  bottom-center  bottom-right

Shorthands: center, top, bottom, left, right.

Run 'imprint gen-config' to generate a documented imprint.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "imprint.toml", global = true)]
    config: PathBuf,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a blank canvas
    Create {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Fill colour (name or #hex)
        #[arg(long)]
        background: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Show an image's size, mime type and format
    Info {
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resample an image with a Lanczos filter
    Resize {
        file: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Draw text on an image, anchored or at absolute coordinates
    Text {
        file: PathBuf,
        /// Text to draw
        #[arg(long)]
        text: String,
        /// Anchor position (ignored when --x and --y are given)
        #[arg(long, default_value = "bottom-right")]
        placement: Placement,
        /// Absolute left edge of the text box
        #[arg(long, requires = "y", allow_negative_numbers = true)]
        x: Option<i64>,
        /// Absolute top edge of the text box
        #[arg(long, requires = "x", allow_negative_numbers = true)]
        y: Option<i64>,
        /// Clockwise rotation in degrees (absolute coordinates only)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        angle: f32,
        #[command(flatten)]
        style: StyleArgs,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Composite another image over this one
    Overlay {
        file: PathBuf,
        /// Image to place on top
        #[arg(long)]
        image: PathBuf,
        /// Anchor position
        #[arg(long, default_value = "bottom-right")]
        placement: Placement,
        /// Resize the overlay first (needs --height too)
        #[arg(long, default_value_t = 0)]
        width: u32,
        /// Resize the overlay first (needs --width too)
        #[arg(long, default_value_t = 0)]
        height: u32,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Print a stock imprint.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let load_config = || config::load_config(&cli.config);

    match cli.command {
        Command::Create {
            width,
            height,
            background,
            out,
        } => {
            let config = load_config()?;
            let background = background.unwrap_or_else(|| config.canvas.background.clone());
            let mut image = Image::new(RustEngine::new());
            image.create_new(width, height, &background)?;
            write_output(&mut image, &out, &config)?;
        }
        Command::Info { file, json } => {
            let image = Image::open(RustEngine::new(), &file)?;
            let info = ImageInfo::from_image(&image);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                output::print_lines(&output::format_info(&info));
            }
        }
        Command::Resize {
            file,
            width,
            height,
            out,
        } => {
            let config = load_config()?;
            let mut image = Image::open(RustEngine::new(), &file)?;
            image.resize(width, height)?;
            write_output(&mut image, &out, &config)?;
        }
        Command::Text {
            file,
            text,
            placement,
            x,
            y,
            angle,
            style,
            out,
        } => {
            let config = load_config()?;
            let drawer = resolve_drawer(&config, &style)?;
            let mut image = Image::open(RustEngine::new(), &file)?;
            match (x, y) {
                (Some(x), Some(y)) => image.annotate(&text, x, y, angle, &drawer)?,
                _ => {
                    let placed = image.place_text(&text, placement, &drawer)?;
                    output::print_lines(&output::format_placement(
                        &format!("\"{text}\""),
                        placed.size,
                        placement,
                        placed.at,
                    ));
                }
            }
            write_output(&mut image, &out, &config)?;
        }
        Command::Overlay {
            file,
            image: overlay,
            placement,
            width,
            height,
            out,
        } => {
            let config = load_config()?;
            let mut image = Image::open(RustEngine::new(), &file)?;
            let placed = image.place_image(&overlay, placement, width, height)?;
            output::print_lines(&output::format_placement(
                &overlay.display().to_string(),
                placed.size,
                placement,
                placed.at,
            ));
            write_output(&mut image, &out, &config)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Pick the output format: explicit flag, then a writable file extension,
/// then the configured default.
fn resolve_format(out: &OutputArgs, config: &ImprintConfig) -> String {
    out.format
        .clone()
        .or_else(|| extension_format(&out.output))
        .unwrap_or_else(|| config.canvas.format.clone())
}

fn extension_format(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| is_writable_format(e))
        .map(str::to_string)
}

fn write_output(
    image: &mut Image<RustEngine>,
    out: &OutputArgs,
    config: &ImprintConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = resolve_format(out, config);
    let bytes = image.output(Some(format.as_str()))?;
    std::fs::write(&out.output, &bytes)?;
    let format = image.format().unwrap_or(format);
    output::print_lines(&output::format_written(
        &out.output,
        &format,
        bytes.len(),
        image.dimensions(),
    ));
    Ok(())
}

/// Config `[text]` section with command-line overrides applied.
fn resolve_drawer(
    config: &ImprintConfig,
    style: &StyleArgs,
) -> Result<Drawer, Box<dyn std::error::Error>> {
    let mut text = config.text.clone();
    if let Some(font) = &style.font {
        text.font = Some(font.clone());
    }
    if let Some(size) = style.size {
        text.size = size;
    }
    if let Some(color) = &style.color {
        text.color = color.clone();
    }
    if let Some(stroke_color) = &style.stroke_color {
        text.stroke_color = Some(stroke_color.clone());
    }
    if let Some(stroke_width) = style.stroke_width {
        text.stroke_width = stroke_width;
        // A width alone outlines in white
        if text.stroke_color.is_none() && stroke_width > 0 {
            text.stroke_color = Some(Color::WHITE.to_string());
        }
    }
    Ok(text.drawer()?)
}
