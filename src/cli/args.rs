//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::capture::{CaptureKind, FacingMode};
use crate::domain::recording::Duration;
use crate::domain::testimonial::MediaType;

/// Echo Capture - record, preview and submit audio/video testimonials
#[derive(Parser, Debug)]
#[command(name = "echo-capture")]
#[command(version)]
#[command(about = "Record, preview and submit audio/video testimonials")]
#[command(long_about = None)]
pub struct Cli {
    /// Enable debug logging (overrides ECHO_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a testimonial from a capture device
    Record(RecordArgs),
    /// Submit a testimonial to the hosted backend
    Submit(SubmitArgs),
    /// List testimonials
    List {
        /// Only approved testimonials
        #[arg(long, conflicts_with = "pending")]
        approved: bool,
        /// Only testimonials awaiting approval
        #[arg(long)]
        pending: bool,
    },
    /// Approve a testimonial for display
    Approve {
        /// Testimonial id
        id: String,
    },
    /// Withdraw approval of a testimonial
    Unapprove {
        /// Testimonial id
        id: String,
    },
    /// Delete a testimonial
    Delete {
        /// Testimonial id
        id: String,
    },
    /// Generate a shareable testimonial form link
    Link {
        /// Origin the form is served from
        #[arg(long, value_name = "URL")]
        origin: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `record`
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Medium to capture
    #[arg(long, value_enum, default_value_t = KindArg::Audio)]
    pub kind: KindArg,

    /// Recording duration (e.g., 10s, 1m, 2m30s)
    #[arg(short = 'd', long, value_name = "TIME")]
    pub duration: Option<String>,

    /// Capture device
    #[arg(long, value_enum, default_value_t = DeviceArg::Default)]
    pub device: DeviceArg,

    /// Camera facing mode (video only)
    #[arg(long, value_enum)]
    pub facing: Option<FacingArg>,

    /// Write the recording to this file
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Play the recording back when done
    #[arg(long)]
    pub play: bool,
}

/// Options for `submit`
#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// Testimonial text
    #[arg(long)]
    pub text: String,

    /// Star rating from 1 to 5
    #[arg(long, default_value_t = 5)]
    pub rating: u8,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub position: Option<String>,

    /// Recorded media file to attach
    #[arg(long, value_name = "FILE")]
    pub media: Option<PathBuf>,

    /// Medium of the attached file (inferred from the extension when omitted)
    #[arg(long, value_enum, requires = "media")]
    pub media_type: Option<KindArg>,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Capture medium argument
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Audio,
    Video,
}

impl From<KindArg> for CaptureKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Audio => CaptureKind::Audio,
            KindArg::Video => CaptureKind::Video,
        }
    }
}

impl From<KindArg> for MediaType {
    fn from(arg: KindArg) -> Self {
        CaptureKind::from(arg).into()
    }
}

/// Capture device argument
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DeviceArg {
    /// The system's default microphone
    Default,
    /// Generated tone or frames, no hardware needed
    Synthetic,
}

/// Facing mode argument
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FacingArg {
    User,
    Environment,
}

impl From<FacingArg> for FacingMode {
    fn from(arg: FacingArg) -> Self {
        match arg {
            FacingArg::User => FacingMode::User,
            FacingArg::Environment => FacingMode::Environment,
        }
    }
}

/// Parsed record options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub kind: CaptureKind,
    pub duration: Duration,
    pub device: DeviceArg,
    pub facing_mode: FacingMode,
    pub output: Option<PathBuf>,
    pub play: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "backend_url",
    "api_key",
    "bucket",
    "table",
    "max_duration",
    "facing_mode",
    "share_origin",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
