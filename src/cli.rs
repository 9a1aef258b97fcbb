use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "foldergrid")]
#[command(about = "Folder-organized photo gallery shell", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Application data directory (defaults to the platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "info")]
    pub log_level: String,

    /// Also print emitted events
    #[arg(long)]
    pub show_events: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["foldergrid"]);
        assert!(cli.data_dir.is_none());
        assert_eq!(cli.log_level, "info");
        assert!(!cli.show_events);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["foldergrid", "--log-level", "loud"]).is_err());
    }
}
