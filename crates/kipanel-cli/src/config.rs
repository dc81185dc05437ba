//! Configuration loading for the CLI
//!
//! Finds and loads the TOML configuration file, then applies the panel
//! options given on the command line on top of it.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use kipanel::{PanelError, config::AppConfig};

use crate::args::Args;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for PanelError {
    fn from(err: ConfigError) -> Self {
        PanelError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (kipanel/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, PanelError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("kipanel/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("org", "kipanel", "kipanel") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, PanelError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

/// Override configuration values with the options given on the command line.
///
/// A grid request on the command line replaces the grid request of the
/// file, whichever mode either of them uses.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when both a board count and a panel
/// size are given on the command line.
pub fn apply_args(config: &mut AppConfig, args: &Args) -> Result<(), ConfigError> {
    let count_given = args.numx.is_some() || args.numy.is_some();
    let envelope_given = args.panelx.is_some() || args.panely.is_some();

    match (count_given, envelope_given) {
        (true, true) => {
            return Err(ConfigError::Validation(
                "use either --numx/--numy or --panelx/--panely, not both".to_string(),
            ));
        }
        (true, false) => {
            let panel = config.panel_mut();
            panel.set_envelope(None, None);
            panel.set_count(args.numx, args.numy);
        }
        (false, true) => {
            let panel = config.panel_mut();
            panel.set_count(None, None);
            panel.set_envelope(args.panelx, args.panely);
        }
        (false, false) => {}
    }

    if let Some(padding) = args.padding {
        config.panel_mut().set_padding(padding);
    }

    let rails = config.rails_mut();
    rails.set_widths(
        args.hrail.unwrap_or(rails.horizontal()),
        args.vrail.unwrap_or(rails.vertical()),
    );
    if args.hrailtext.is_some() {
        rails.set_horizontal_text(args.hrailtext.clone());
    }
    if args.vrailtext.is_some() {
        rails.set_vertical_text(args.vrailtext.clone());
    }
    rails.set_titles(
        args.htitle || rails.horizontal_title(),
        args.vtitle || rails.vertical_title(),
    );

    let vscore = config.vscore_mut();
    if let Some(layer) = &args.vscorelayer {
        vscore.set_layer(layer.as_str());
    }
    if let Some(layer) = &args.vscoretextlayer {
        vscore.set_text_layer(layer.as_str());
    }
    if let Some(text) = &args.vscoretext {
        vscore.set_text(text.as_str());
    }
    if let Some(extension) = args.vscoreextends {
        vscore.set_extension(extension);
    }

    config
        .identifiers_mut()
        .add_shared_nets(args.shared_nets.iter().cloned());

    if args.no_report {
        config.report_mut().set_text(None);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(
            ["kipanel", "board.kicad_pcb"]
                .into_iter()
                .chain(argv.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[vscore]\ntext = \"CUT\"\n\n[panel]\npadding = 1.5").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.vscore().text(), "CUT");
        assert_eq!(config.panel().padding(), 1.5);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, PanelError::Config(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[panel]\ncolumns = \"two\"").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_args_override_file() {
        let mut config: AppConfig = toml::from_str(
            r#"
            [panel]
            max_width = 100.0
            max_height = 100.0
            padding = 2.0

            [rails]
            horizontal = 5.0
            "#,
        )
        .unwrap();

        let args = args(&[
            "--numx",
            "2",
            "--numy",
            "2",
            "--vrail",
            "3",
            "--vscoretext",
            "SNAP",
            "--shared-net",
            "GND",
        ]);
        apply_args(&mut config, &args).unwrap();

        assert!(matches!(
            config.panel().grid().unwrap(),
            kipanel::layout::GridSpec::Explicit {
                columns: 2,
                rows: 2
            }
        ));
        assert_eq!(config.panel().padding(), 2.0);
        assert_eq!(config.rails().horizontal(), 5.0);
        assert_eq!(config.rails().vertical(), 3.0);
        assert_eq!(config.vscore().text(), "SNAP");
        assert_eq!(config.identifiers().shared_nets(), ["GND".to_string()]);
    }

    #[test]
    fn test_count_and_envelope_conflict() {
        let mut config = AppConfig::default();
        let args = args(&["--numx", "2", "--panely", "50"]);
        assert!(matches!(
            apply_args(&mut config, &args),
            Err(ConfigError::Validation(_))
        ));
    }
}
