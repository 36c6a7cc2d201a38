use crate::commands::{run_batch, run_models, run_recommend, BatchArgs, ModelsArgs, RecommendArgs};
use crate::server;
use assessment::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "assessment-api",
    about = "Score clients and recommend support service combinations",
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
    /// List the model artifacts that would be loaded and the active model
    Models(ModelsArgs),
    /// Recommend interventions for a single client read from a JSON file
    Recommend(RecommendArgs),
    /// Recommend interventions for every row of a client CSV export
    Batch(BatchArgs),
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
        Command::Models(args) => run_models(args),
        Command::Recommend(args) => run_recommend(args),
        Command::Batch(args) => run_batch(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["assessment-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn recommend_accepts_model_and_top_k() {
        let cli = Cli::try_parse_from([
            "assessment-api",
            "recommend",
            "--input",
            "client.json",
            "--model",
            "random_forest",
            "--top-k",
            "5",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Recommend(args)) => {
                assert_eq!(args.input.to_str(), Some("client.json"));
                assert_eq!(args.selection.model.as_deref(), Some("random_forest"));
                assert_eq!(args.selection.top_k, Some(5));
            }
            other => panic!("expected recommend, got {other:?}"),
        }
    }
}
