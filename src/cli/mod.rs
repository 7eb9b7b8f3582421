use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dealer_intake::config::{IntakeConfig, StorageBackend};

pub mod commands;

#[derive(Parser)]
#[command(name = "dealer-intake")]
#[command(about = "Drive dealership lead-intake workflow sessions")]
#[command(
    long_about = "Dealer intake walks buyers and sellers through a branching questionnaire. \
                  Each command operates on one session and prints the resulting step as JSON."
)]
pub struct Cli {
    /// Configuration file (defaults to ./dealer-intake.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured session store
    #[arg(long, global = true, value_enum)]
    pub storage: Option<StorageBackend>,

    /// Directory for the file session store
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut IntakeConfig) {
        if let Some(backend) = self.storage {
            config.storage.backend = backend;
        }
        if let Some(dir) = &self.data_dir {
            config.storage.directory = dir.clone();
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a session, or show the current step of an existing one
    Start {
        #[arg(long)]
        session: String,
        /// buying or selling
        #[arg(long)]
        workflow_type: String,
    },
    /// Submit form data for the session's current step
    Transition {
        #[arg(long)]
        session: String,
        /// The step the client believes it is on
        #[arg(long)]
        step: String,
        /// Form data as a JSON object
        #[arg(long, default_value = "{}")]
        data: String,
    },
    /// Go back to the previous step
    Back {
        #[arg(long)]
        session: String,
        #[arg(long)]
        step: String,
        /// Predecessor the forward path came through, for steps with several
        #[arg(long)]
        came_from: Option<String>,
    },
    /// Show the session's current step without changing anything
    Status {
        #[arg(long)]
        session: String,
    },
    /// Mark the session abandoned
    Abandon {
        #[arg(long)]
        session: String,
    },
    /// Execute a JSON request document, read from --request or stdin
    Handle {
        #[arg(long)]
        request: Option<String>,
    },
    /// List stored sessions
    Sessions,
    /// Validate and describe the step graph
    Graph {
        /// Print the validation report as JSON
        #[arg(long)]
        json: bool,
    },
}
