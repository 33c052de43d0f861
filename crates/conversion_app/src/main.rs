use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use conversion_app::platform::{
    load_config, run_session, Cli, LogObserver, RunConfig, SessionReport, TerminalObserver,
};
use conversion_core::TaskOutcome;
use conversion_logging::LogDestination;
use log::LevelFilter;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let file_config = load_config(cli.config.as_deref()).context("loading config")?;
    let RunConfig { settings, form } = RunConfig::resolve(&cli, file_config)?;

    let report = if cli.no_progress {
        run_session(settings, form, &mut LogObserver::default())?
    } else {
        let mut observer = TerminalObserver::new();
        let report = run_session(settings, form, &mut observer);
        observer.finish();
        report?
    };

    print_summary(&report);
    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // The progress bar owns the terminal, so logs go to a file while it is shown.
    let destination = if cli.quiet {
        LogDestination::Off
    } else if cli.no_progress {
        LogDestination::Terminal
    } else {
        LogDestination::File
    };
    conversion_logging::initialize(destination, level, cli.log_file.as_deref());
}

fn print_summary(report: &SessionReport) {
    match (&report.outcome, &report.download) {
        (Some(TaskOutcome::Completed { .. }), Some(Ok(output))) => {
            println!(
                "Saved {} ({} bytes, sha256 {})",
                output.path.display(),
                output.byte_len,
                output.sha256
            );
        }
        (Some(TaskOutcome::Completed { task_id, .. }), Some(Err(err))) => {
            eprintln!("Task {task_id} completed but the download failed: {err}");
        }
        _ => eprintln!("{}", report.final_view.display.text()),
    }
}
