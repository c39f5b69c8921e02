/// WF3D Terminal - wire-frame viewer and `.obj` tools
///
/// Controls in the viewer:
///   - Mouse drag / WASD / Arrow Keys: Rotate the model
///   - E/R: Roll rotation
///   - Space: Reset rotation
///   - Tab: Next model in the catalog
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use wf3d_core::mesh::MAX_MEASURE;
use wf3d_core::obj::{load_obj_file, write_obj_file};
use wf3d_core::{ObjWireFrame, WireFrameCatalog, WireFrameConfig, WireFrameView};
use wf3d_terminal::{AsciiRenderer, TerminalApp};

/// View and inspect `.obj` wire-frames in the terminal
#[derive(Parser, Debug)]
#[command(name = "wf3d-terminal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive viewer
    View {
        /// A single `.obj` file; otherwise models come from the config
        file: Option<PathBuf>,

        /// Path to config file (auto-searches wf3d.toml if not provided)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Model name to open instead of the configured default
        #[arg(long)]
        model: Option<String>,
    },

    /// Parse and validate a file, then print its counts
    Check { file: PathBuf },

    /// Centre a model on its mean point and scale it to fit the view
    Normalize {
        input: PathBuf,
        output: PathBuf,

        /// Largest absolute coordinate after scaling
        #[arg(long, default_value_t = MAX_MEASURE)]
        max_measure: f64,
    },

    /// Render one frame to stdout
    Dump {
        file: PathBuf,

        /// Rotation around x, y and z in radians
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        rotation: Option<Vec<f64>>,

        /// Width in characters
        #[arg(long, default_value = "80")]
        width: usize,

        /// Height in characters
        #[arg(long, default_value = "40")]
        height: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::View {
            file,
            config,
            model,
        } => view(file, config, model),
        Command::Check { file } => check(&file),
        Command::Normalize {
            input,
            output,
            max_measure,
        } => normalize(&input, &output, max_measure),
        Command::Dump {
            file,
            rotation,
            width,
            height,
        } => dump(&file, rotation, width, height),
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    // stdout belongs to the viewer and to `dump`
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn load_valid(path: &Path) -> Result<ObjWireFrame> {
    let model =
        load_obj_file(path).with_context(|| format!("Failed to load wire-frame: {:?}", path))?;
    model
        .validate()
        .with_context(|| format!("Invalid wire-frame: {:?}", path))?;
    Ok(model)
}

fn view(file: Option<PathBuf>, config: Option<PathBuf>, model: Option<String>) -> Result<()> {
    let mut app = match file {
        Some(path) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model".to_string());
            TerminalApp::with_wire_frame(load_valid(&path)?, &name)?
        }
        None => {
            let catalog = match config.or_else(WireFrameConfig::discover) {
                Some(path) => {
                    info!("Using config {:?}", path);
                    WireFrameCatalog::from_config_file(&path)
                        .with_context(|| format!("Failed to load models from {:?}", path))?
                }
                None => WireFrameCatalog::fallback()?,
            };
            TerminalApp::new(catalog, model.as_deref())?
        }
    };

    app.run()?;
    Ok(())
}

fn check(file: &Path) -> Result<()> {
    let model = load_valid(file)?;

    println!("{}", file.display());
    println!("  vertices:    {}", model.vertices.len());
    println!("  normals:     {}", model.normals.len());
    println!("  faces:       {}", model.faces.len());
    println!("  max measure: {}", model.max_measure());
    Ok(())
}

fn normalize(input: &Path, output: &Path, max_measure: f64) -> Result<()> {
    let mut model = load_obj_file(input)
        .with_context(|| format!("Failed to load wire-frame: {:?}", input))?;

    info!("Normalizing {:?} to max measure {}", input, max_measure);
    model.normalize_to_view(max_measure);

    write_obj_file(&model, output)
        .with_context(|| format!("Failed to write wire-frame: {:?}", output))?;
    println!("Wrote {:?}", output);
    Ok(())
}

fn dump(file: &Path, rotation: Option<Vec<f64>>, width: usize, height: usize) -> Result<()> {
    let mut view = WireFrameView::new(Arc::new(load_valid(file)?));
    if let Some(&[x, y, z]) = rotation.as_deref() {
        view.set_rotation_xyz(x, y, z);
    }

    let mut renderer = AsciiRenderer::new(width, height);
    view.draw(&mut renderer);
    print!("{}", renderer);
    Ok(())
}
