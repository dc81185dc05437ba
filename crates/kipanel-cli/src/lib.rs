//! kipanel CLI library
//!
//! This module contains the command-line driver: it loads the
//! configuration, panelizes one board file and writes the panel next to it.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, usage_exit_code};

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{info, warn};
use tempfile::NamedTempFile;

use kipanel::{Panel, PanelError, Panelizer};

/// File extension of KiCad board files.
const BOARD_EXTENSION: &str = "kicad_pcb";

/// Run the kipanel CLI application
///
/// Reads the input board, builds the panel and writes it to the output
/// path. Advisories about the finished panel are logged as warnings and do
/// not make the run fail.
///
/// # Errors
///
/// Returns `PanelError` for:
/// - File I/O errors
/// - Configuration loading errors and invalid options
/// - Parsing errors
/// - Boards without a usable outline
/// - Identifier collisions
pub fn run(args: &Args) -> Result<(), PanelError> {
    let input = Path::new(&args.input);
    let output = output_path(input, args.output.as_deref())?;

    info!(
        input_path = args.input,
        output_path = output.display().to_string();
        "Processing board"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    config::apply_args(&mut app_config, args)?;
    if !args.no_report && app_config.report().text().is_none() {
        app_config
            .report_mut()
            .set_text(Some(generation_note(&output, args)));
    }

    let source = fs::read_to_string(input)?;

    let panelizer = Panelizer::new(app_config);
    let board = panelizer.parse(&source)?;
    let panel = panelizer.panelize(&board)?;
    let text = panelizer.render(&panel);

    write_atomically(&output, &text)?;
    info!(output_file = output.display().to_string(); "Panel written");

    log_summary(&panel);

    Ok(())
}

/// Resolve where the panel is written.
///
/// Without an explicit output the panel goes next to the input as
/// `<stem>_panelized.kicad_pcb`.
fn output_path(input: &Path, output: Option<&str>) -> Result<PathBuf, PanelError> {
    if input.extension().and_then(|ext| ext.to_str()) != Some(BOARD_EXTENSION) {
        return Err(PanelError::Config(format!(
            "input `{}` is not a .{BOARD_EXTENSION} file",
            input.display()
        )));
    }

    if let Some(output) = output {
        return Ok(PathBuf::from(output));
    }

    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    Ok(input.with_file_name(format!("{stem}_panelized.{BOARD_EXTENSION}")))
}

/// Default note placed below the panel.
fn generation_note(output: &Path, args: &Args) -> String {
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let options = args.panel_options();
    format!("{name} ({{columns}}x{{rows}} panel) generated with: kipanel {options}")
        .trim_end()
        .to_string()
}

/// Write `text` to `path` through a temporary file in the same directory,
/// so a failed run never leaves a partial board behind.
fn write_atomically(path: &Path, text: &str) -> Result<(), PanelError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.persist(path).map_err(|err| PanelError::Io(err.error))?;

    Ok(())
}

fn log_summary(panel: &Panel) {
    let plan = panel.plan();
    let board = plan.board();
    let size = plan.panel_size();

    info!(width = board.width(), height = board.height(); "Board dimensions (mm)");
    info!(width = size.width(), height = size.height(); "Panel dimensions (mm)");
    if plan.fitted() {
        info!("You can fit {} x {} boards", plan.columns(), plan.rows());
    } else {
        info!(columns = plan.columns(), rows = plan.rows(); "Panel grid");
    }

    for advisory in panel.advisories() {
        warn!("{advisory}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let output = output_path(Path::new("boards/blinky.kicad_pcb"), None).unwrap();
        assert_eq!(output, PathBuf::from("boards/blinky_panelized.kicad_pcb"));
    }

    #[test]
    fn test_explicit_output_path() {
        let output = output_path(Path::new("blinky.kicad_pcb"), Some("out/panel.kicad_pcb")).unwrap();
        assert_eq!(output, PathBuf::from("out/panel.kicad_pcb"));
    }

    #[test]
    fn test_wrong_extension() {
        let err = output_path(Path::new("blinky.kicad_sch"), None).unwrap_err();
        assert!(matches!(err, PanelError::Config(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_generation_note() {
        let args = Args {
            input: "blinky.kicad_pcb".to_string(),
            numx: Some(2),
            numy: Some(3),
            ..Args::default()
        };
        assert_eq!(
            generation_note(Path::new("blinky_panelized.kicad_pcb"), &args),
            "blinky_panelized.kicad_pcb ({columns}x{rows} panel) generated with: kipanel --numx 2 --numy 3"
        );
    }

    #[test]
    fn test_write_atomically_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.kicad_pcb");
        fs::write(&path, "old").unwrap();

        write_atomically(&path, "(kicad_pcb)\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "(kicad_pcb)\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
