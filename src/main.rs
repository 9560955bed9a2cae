use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    crawlbot::logging::init().context("init logging")?;

    let cli = crawlbot::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        Some(crawlbot::cli::Command::Prepare(args)) => {
            crawlbot::prepare::run(args).context("prepare")?;
        }
        None => {
            let input = cli
                .input
                .ok_or_else(|| anyhow::anyhow!("missing -i <PATH>"))?;
            let config = crawlbot::config::Config::from_env().context("load configuration")?;
            tracing::debug!(?config, "loaded configuration");
            crawlbot::batch::run(&config, &input).context("run batch")?;
        }
    }

    Ok(())
}
