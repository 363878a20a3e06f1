use anyhow::{Result, bail};
use clap::Parser;
use console::style;
use dialoguer::Confirm;
use log::{error, info};
use media_batch::cli::Cli;
use media_batch::component::{Dispatcher, RunOutcome};
use media_batch::config::Config;
use media_batch::init;
use media_batch::signal::setup_shutdown_signal;
use media_batch::tools::Ffmpeg;
use rust_i18n::t;
use std::process::ExitCode;

rust_i18n::i18n!("locales", fallback = "en-US");

const EXIT_FATAL: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(cli.verbose);
    rust_i18n::set_locale(&cli.lang);

    match run(&cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            error!("啟動失敗: {e:#}");
            eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli) -> Result<RunOutcome> {
    let mut config = Config::load(&cli.config)?;
    if let Some(jobs) = cli.jobs {
        if jobs == 0 {
            bail!("--jobs 必須大於 0");
        }
        config.params.jobs = jobs;
    }
    info!("設定檔: {} (任務 {})", cli.config.display(), config.task);

    if config.params.delete_source && !confirm_delete_source(cli.yes)? {
        println!("{}", style(t!("main.cancelled")).yellow());
        return Ok(RunOutcome::AllSucceeded);
    }

    let tool = Ffmpeg::locate(config.params.ffmpeg.as_deref(), config.params.ffprobe.as_deref())?;
    info!(
        "ffmpeg: {}, ffprobe: {}",
        tool.ffmpeg_path().display(),
        tool.ffprobe_path().display()
    );

    let shutdown_signal = setup_shutdown_signal()?;

    println!(
        "{}",
        style(t!("main.banner", task = config.task)).cyan().bold()
    );
    let summary = Dispatcher::new(&config, &tool, shutdown_signal).run()?;
    summary.display();

    Ok(summary.outcome())
}

/// 非互動環境（例如排程）不詢問，視同確認
fn confirm_delete_source(assume_yes: bool) -> Result<bool> {
    if assume_yes || !console::user_attended() {
        return Ok(true);
    }

    let confirmed = Confirm::new()
        .with_prompt(t!("main.confirm_delete_source").to_string())
        .default(false)
        .interact()?;
    Ok(confirmed)
}
