use std::io::Write;

use chrono::{DateTime, TimeZone, Utc};
use log::*;

use hangar_client::api;

use crate::cli::JobFlag;
use crate::execute::ExecuteError;
use crate::table::{Cell, Color, Style, Table};
use crate::utils::WithSpinner;

const TIME_DATE_FORMAT: &str = "%Y-%-m-%-d@%H:%M:%S";

const HEADERS: [&str; 7] = [
    "id",
    "pipeline/job",
    "build",
    "status",
    "start",
    "end",
    "duration",
];

pub async fn execute_builds(
    config: &crate::config::Config,
    count: usize,
    job: Option<JobFlag>,
    json: bool,
) -> Result<(), ExecuteError> {
    debug!("Executing builds command");

    let builds = fetch_builds(config, count, job).await?;

    let stdout = std::io::stdout();
    let tty = termion::is_tty(&stdout);
    let mut out = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &builds).map_err(anyhow::Error::from)?;
        writeln!(out).map_err(|err| ExecuteError::Fatal(err.to_string()))?;
    } else {
        builds_table(&builds, Utc::now())
            .render(&mut out, tty)
            .map_err(|err| ExecuteError::Fatal(err.to_string()))?;
    }

    Ok(())
}

/// Fetches at most `count` builds, of a single job when both pipeline and
/// job are given.
pub async fn fetch_builds(
    config: &crate::config::Config,
    count: usize,
    job: Option<JobFlag>,
) -> Result<Vec<models::Build>, ExecuteError> {
    let mut builds = match job {
        Some(JobFlag { pipeline, job }) if !pipeline.is_empty() && !job.is_empty() => {
            let page = models::Page {
                limit: count as u64,
                ..Default::default()
            };
            let (builds, pagination, found) = api::job_builds(config, &pipeline, &job, page)
                .with_spinner("Fetching builds")
                .await?;
            if !found {
                return Err(ExecuteError::Fatal("pipeline/job not found".to_string()));
            }
            debug!("Got {} builds of {}/{}, {:?}", builds.len(), pipeline, job, pagination);
            builds
        }
        _ => {
            api::all_builds(config)
                .with_spinner("Fetching builds")
                .await?
        }
    };

    builds.truncate(count);
    Ok(builds)
}

pub fn builds_table(builds: &[models::Build], now: DateTime<Utc>) -> Table {
    Table {
        headers: HEADERS
            .iter()
            .map(|header| Cell::styled(*header, Style::bold()))
            .collect(),
        rows: builds.iter().map(|build| build_row(build, now)).collect(),
    }
}

fn build_row(build: &models::Build, now: DateTime<Utc>) -> Vec<Cell> {
    let start = if build.start_time == 0 {
        Cell::new("n/a")
    } else {
        Cell::new(format_time(build.start_time))
    };

    let (end, duration) = match (build.start_time, build.end_time) {
        (0, 0) => (Cell::new("n/a"), Cell::new("n/a")),
        (start_time, 0) => {
            let elapsed = match Utc.timestamp_opt(start_time, 0).single() {
                // num_seconds truncates toward zero
                Some(start) => (now - start).num_seconds(),
                None => now.timestamp().saturating_sub(start_time),
            };
            (Cell::new("n/a"), Cell::new(format!("{}+", format_duration(elapsed))))
        }
        (start_time, end_time) => (
            Cell::new(format_time(end_time)),
            Cell::new(format_duration(end_time.saturating_sub(start_time))),
        ),
    };

    let (pipeline_job, name) = if build.pipeline_name.is_empty() {
        (Cell::new("one-off"), Cell::new("n/a"))
    } else {
        (
            Cell::new(format!("{}/{}", build.pipeline_name, build.job_name)),
            Cell::new(build.name.as_str()),
        )
    };

    let status = Cell {
        contents: build.status.to_string(),
        style: status_style(&build.status),
    };

    vec![
        Cell::new(build.id.to_string()),
        pipeline_job,
        name,
        status,
        start,
        end,
        duration,
    ]
}

fn status_style(status: &models::BuildStatus) -> Option<Style> {
    use models::BuildStatus::*;

    match status {
        Pending => Some(Style::fg(Color::White)),
        Started => Some(Style::fg(Color::Yellow)),
        Succeeded => Some(Style::fg(Color::Green)),
        Failed => Some(Style::fg(Color::Red)),
        Errored => Some(Style::fg(Color::White).on(Color::Red).with_bold()),
        Aborted => Some(Style::fg(Color::Yellow)),
        Paused => Some(Style::fg(Color::Cyan)),
        Other(_) => None,
    }
}

fn format_time(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(time) => time.format(TIME_DATE_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

/// Formats whole seconds as `2h3m4s`, omitting leading zero units.
fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let total = seconds.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}
