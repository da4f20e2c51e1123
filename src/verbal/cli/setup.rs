use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "verbal-demo",
    bin_name = "verbal-demo",
    disable_help_flag = true,
    disable_version_flag = true
)]
#[command(about = "Docker-like demo host for the verbal execution engine", long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Directory holding verbal.json
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Never color help output
    #[arg(long)]
    pub no_color: bool,

    /// The command line to execute
    #[arg(
        value_name = "COMMAND",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `--log-level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_flags_then_command() {
        let cli = Cli::try_parse_from([
            "verbal-demo",
            "--no-color",
            "--log-level",
            "debug",
            "builder",
            "prune",
            "-af",
            "--keep-storage",
            "10",
        ])
        .unwrap();
        assert!(cli.no_color);
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.command, vec!["builder", "prune", "-af", "--keep-storage", "10"]);
    }

    #[test]
    fn test_leading_hyphens_belong_to_command() {
        let cli = Cli::try_parse_from(["verbal-demo", "-h"]).unwrap();
        assert_eq!(cli.command, vec!["-h"]);

        let cli = Cli::try_parse_from(["verbal-demo", "--version"]).unwrap();
        assert_eq!(cli.command, vec!["--version"]);
    }

    #[test]
    fn test_host_flags_after_command_are_passed_through() {
        let cli = Cli::try_parse_from(["verbal-demo", "attach", "--no-color"]).unwrap();
        assert!(!cli.no_color);
        assert_eq!(cli.command, vec!["attach", "--no-color"]);
    }
}
