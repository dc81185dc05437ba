//! Command-line argument definitions for the kipanel CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Panel options given here override the values loaded from
//! the configuration file.

use std::fmt::Write as _;

use clap::Parser;
use log::LevelFilter;

use kipanel::PanelError;

/// Command-line arguments for the kipanel panelizer
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input KiCad board
    #[arg(help = "Path to the input .kicad_pcb file")]
    pub input: String,

    /// Path to the output board (default: `<input>_panelized.kicad_pcb`)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of boards in the x direction
    #[arg(long)]
    pub numx: Option<u32>,

    /// Number of boards in the y direction
    #[arg(long)]
    pub numy: Option<u32>,

    /// Maximum panel width in mm; fills the panel with as many boards as fit
    #[arg(long)]
    pub panelx: Option<f64>,

    /// Maximum panel height in mm
    #[arg(long)]
    pub panely: Option<f64>,

    /// Gap between boards in mm
    #[arg(long)]
    pub padding: Option<f64>,

    /// Width of the rails on the left and right edges in mm
    #[arg(long)]
    pub hrail: Option<f64>,

    /// Width of the rails along the top and bottom edges in mm
    #[arg(long)]
    pub vrail: Option<f64>,

    /// Text placed on the left and right rails
    #[arg(long)]
    pub hrailtext: Option<String>,

    /// Text placed on the top and bottom rails
    #[arg(long)]
    pub vrailtext: Option<String>,

    /// Put the board title on the left and right rails
    #[arg(long)]
    pub htitle: bool,

    /// Put the board title on the top and bottom rails
    #[arg(long)]
    pub vtitle: bool,

    /// Layer for the v-score lines
    #[arg(long)]
    pub vscorelayer: Option<String>,

    /// Layer for the v-score labels
    #[arg(long)]
    pub vscoretextlayer: Option<String>,

    /// Label written next to each v-score line
    #[arg(long)]
    pub vscoretext: Option<String>,

    /// How far the v-score lines reach past the panel edge in mm
    #[arg(long, allow_negative_numbers = true)]
    pub vscoreextends: Option<f64>,

    /// Net shared by every board copy instead of being renamed (repeatable)
    #[arg(long = "shared-net", value_name = "NAME")]
    pub shared_nets: Vec<String>,

    /// Do not place the generation note below the panel
    #[arg(long)]
    pub no_report: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The requested log level, `None` if `--log-level` is not a level name.
    pub fn log_filter(&self) -> Option<LevelFilter> {
        self.log_level.parse().ok()
    }

    /// The panel options as they would be typed on the command line.
    ///
    /// Used for the generation note, so the input, output, configuration
    /// and logging options are left out.
    pub fn panel_options(&self) -> String {
        let mut line = String::new();

        let mut push = |flag: &str, value: Option<String>| {
            if let Some(value) = value {
                let _ = write!(line, " --{flag} {value}");
            }
        };
        push("numx", self.numx.map(|v| v.to_string()));
        push("numy", self.numy.map(|v| v.to_string()));
        push("panelx", self.panelx.map(|v| v.to_string()));
        push("panely", self.panely.map(|v| v.to_string()));
        push("padding", self.padding.map(|v| v.to_string()));
        push("hrail", self.hrail.map(|v| v.to_string()));
        push("vrail", self.vrail.map(|v| v.to_string()));
        push("hrailtext", self.hrailtext.as_ref().map(|v| quoted(v)));
        push("vrailtext", self.vrailtext.as_ref().map(|v| quoted(v)));
        push("vscorelayer", self.vscorelayer.clone());
        push("vscoretextlayer", self.vscoretextlayer.clone());
        push("vscoretext", self.vscoretext.as_ref().map(|v| quoted(v)));
        push("vscoreextends", self.vscoreextends.map(|v| v.to_string()));
        for net in &self.shared_nets {
            push("shared-net", Some(quoted(net)));
        }

        if self.htitle {
            line.push_str(" --htitle");
        }
        if self.vtitle {
            line.push_str(" --vtitle");
        }

        line.trim_start().to_string()
    }
}

/// Process exit code for a command line that clap rejected.
///
/// Usage errors are reported like configuration errors; `--help` and
/// `--version` exit successfully.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        PanelError::Config(err.to_string()).exit_code()
    } else {
        0
    }
}

fn quoted(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("'{value}'")
    } else {
        value.to_string()
    }
}
