use crate::config::DEFAULT_PARAMS_FILE;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "media_batch")]
#[command(author, version, about = "Batch media transcoding over directory trees")]
pub struct Cli {
    /// Path to the JSON task configuration
    #[arg(short, long, default_value = DEFAULT_PARAMS_FILE)]
    pub config: PathBuf,

    /// Number of work units processed in parallel (overrides `jobs`)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip the confirmation prompt before deleting source files
    #[arg(short, long)]
    pub yes: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Console language (en-US, zh-TW)
    #[arg(long, default_value = "zh-TW")]
    pub lang: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["media_batch"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_PARAMS_FILE));
        assert_eq!(cli.jobs, None);
        assert!(!cli.yes);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["media_batch", "-c", "task.json", "-j", "4", "-y", "-vv"]);
        assert_eq!(cli.config, PathBuf::from("task.json"));
        assert_eq!(cli.jobs, Some(4));
        assert!(cli.yes);
        assert_eq!(cli.verbose, 2);
    }
}
