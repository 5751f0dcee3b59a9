/// Vantage - camera matrices, calibration export and terminal preview
///
/// Usage:
///   vantage matrices camera.toml --frame 3 --width 1920 --height 1080
///   vantage export camera.toml --pretty
///   vantage view camera.toml

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use vantage_core::{Camera, CameraConfig};
use vantage_terminal::{logging, report, TerminalApp};

#[derive(Parser, Debug)]
#[command(name = "vantage", version, about = "Camera projection and view matrices")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print projection, view and view-projection matrices of one frame
    Matrices {
        /// Camera description (TOML)
        config: PathBuf,
        /// Frame to evaluate; defaults to the config's frame
        #[arg(long, allow_hyphen_values = true)]
        frame: Option<i64>,
        /// Viewport width in pixels; defaults to the sensor width
        #[arg(long)]
        width: Option<u32>,
        /// Viewport height in pixels; defaults to the sensor height
        #[arg(long)]
        height: Option<u32>,
    },
    /// Print the OpenCV calibration of a perspective camera as JSON
    Export {
        config: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Preview the camera over a reference scene in the terminal
    View { config: PathBuf },
}

fn load(path: &Path) -> anyhow::Result<Camera> {
    CameraConfig::load(path).with_context(|| format!("Failed to load camera from {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    match cli.command {
        Command::Matrices {
            config,
            frame,
            width,
            height,
        } => {
            let mut camera = load(&config)?;
            if let Some(frame) = frame {
                camera.set_current_frame_signed(frame)?;
            }

            let (default_w, default_h) = camera
                .kind()
                .sensor()
                .map(|s| (s.cols(), s.rows()))
                .unwrap_or((800, 600));
            let (width, height) = (width.unwrap_or(default_w), height.unwrap_or(default_h));
            camera.update_matrices(width, height)?;

            println!(
                "{} camera, frame {}/{}, viewport {}x{}\n",
                camera.kind().name(),
                camera.current_frame(),
                camera.n_frames(),
                width,
                height
            );
            print!("{}", report::format_matrix("projection", camera.projection_matrix()));
            print!("{}", report::format_matrix("view", camera.view_matrix()));
            print!("{}", report::format_matrix("view_projection", &camera.view_projection_matrix()));
        }
        Command::Export { config, pretty } => {
            let camera = load(&config)?;
            let value = report::opencv_json(&camera.to_opencv_camera()?);
            let text = if pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            println!("{}", text);
        }
        Command::View { config } => {
            let camera = load(&config)?;
            log::info!("starting preview with {} frame(s)", camera.n_frames());

            let mut app = TerminalApp::new(camera)?;
            app.run()?;
        }
    }

    Ok(())
}
