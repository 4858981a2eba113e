mod cli;
mod config;
mod execute;
mod table;
mod utils;

use clap::Parser;

use termion::{color, style};

use log::*;

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    let config = simplelog::ConfigBuilder::new().build();
    if let Err(err) = simplelog::TermLogger::init(
        get_log_level(args.verbose),
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Failed to init logger: {}", err);
    }

    debug!("Arguments parsed");
    debug!("Loading config");
    let config = config::Config::load_or_default(
        args.config_path.into(),
        args.target,
        &mut std::io::stderr(),
    )
    .await;
    debug!("Loaded config {:?}", config);

    if let Err(err) = execute::execute(&config, args.command).await {
        match err {
            execute::ExecuteError::Fatal(err) => {
                eprintln!("{}{}{}", color::Fg(color::Red), err, style::Reset)
            }
            execute::ExecuteError::Other(err) => {
                eprintln!("{}{}{}", color::Fg(color::LightRed), err, style::Reset)
            }
        }
        std::process::exit(1);
    }
}

fn get_log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
