use std::{path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};

/// hangar command line interface
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[clap(name = "hangar")]
pub struct Cli {
    /// Target to get parameters from config for
    #[arg(short, long, default_value_t = default_target())]
    pub target: String,

    /// Config path
    #[arg(short, long, default_value_t = default_config())]
    pub config_path: String,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

fn default_target() -> String {
    String::from("default")
}

fn default_config() -> String {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".hangar/config.yaml")
        .to_string_lossy()
        .to_string()
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List builds, globally or of a single job
    Builds {
        /// Number of builds you want to limit the return to
        #[arg(short, long, default_value_t = 50)]
        count: usize,

        /// Name of a job to get builds for
        #[arg(short, long, value_name = "PIPELINE/JOB")]
        job: Option<JobFlag>,

        /// Print builds as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFlag {
    pub pipeline: String,
    pub job: String,
}

impl FromStr for JobFlag {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('/') {
            Some((pipeline, job)) => Ok(JobFlag {
                pipeline: pipeline.to_string(),
                job: job.to_string(),
            }),
            None => Err("argument format should be <pipeline>/<job>".to_string()),
        }
    }
}
