mod builds;

use super::cli::*;

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("{0}")]
    Fatal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub async fn execute(
    config: &super::config::Config,
    command: Commands,
) -> Result<(), ExecuteError> {
    match command {
        Commands::Builds { count, job, json } => {
            builds::execute_builds(config, count, job, json).await?
        }
    }

    Ok(())
}
