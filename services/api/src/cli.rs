use crate::evaluate::{run_config_show, run_evaluate, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use trust_score::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Video Trust Score",
    about = "Serve and inspect video trust scores from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one video from a CSV metrics catalog
    Evaluate(EvaluateArgs),
    /// Inspect the scoring configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the active scoring config as JSON
    Show,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Config {
            command: ConfigCommand::Show,
        } => run_config_show(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["trust-score-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn evaluate_requires_catalog_and_video() {
        let cli = Cli::try_parse_from([
            "trust-score-api",
            "evaluate",
            "--catalog",
            "videos.csv",
            "--video-id",
            "kx81",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.catalog, PathBuf::from("videos.csv"));
                assert_eq!(args.video_id, "kx81");
                assert!(args.json);
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }

        assert!(Cli::try_parse_from(["trust-score-api", "evaluate", "--video-id", "kx81"]).is_err());
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["trust-score-api", "serve", "--port", "9100"])
            .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9100));
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
