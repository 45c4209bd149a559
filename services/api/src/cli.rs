use crate::demo::{run_demo, run_match, run_rank, DemoArgs, MatchArgs, RankArgs};
use crate::server;
use autoplaza::config::{AppConfig, EngineConfig};
use autoplaza::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Autoplaza Marketplace",
    about = "Run the used-car marketplace service or explore its ranking and financing rules",
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
    /// Rank a listings CSV the way the search feed does
    Rank(RankArgs),
    /// Match a financing request against a bank partner CSV
    Match(MatchArgs),
    /// Walk through listing, financing, credit and prospect flows on sample data
    Demo(DemoArgs),
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
        Command::Rank(args) => run_rank(args, &engine_config()?),
        Command::Match(args) => run_match(args, &engine_config()?),
        Command::Demo(args) => run_demo(args),
    }
}

/// The offline commands share the engine tuning the server is configured with.
fn engine_config() -> Result<EngineConfig, AppError> {
    Ok(AppConfig::load()?.engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoplaza::marketplace::listings::SortBy;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["autoplaza-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn rank_parses_sort_and_brand() {
        let cli = Cli::try_parse_from([
            "autoplaza-api",
            "rank",
            "--listings",
            "listings.csv",
            "--sort",
            "price_low",
            "--brand",
            "Mazda",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Rank(args)) => {
                assert_eq!(args.sort, SortBy::PriceLow);
                assert_eq!(args.brand.as_deref(), Some("Mazda"));
            }
            other => panic!("expected rank command, got {other:?}"),
        }
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let result = Cli::try_parse_from([
            "autoplaza-api",
            "rank",
            "--listings",
            "listings.csv",
            "--sort",
            "cheapest",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn match_requires_amount_and_term() {
        assert!(Cli::try_parse_from(["autoplaza-api", "match", "--partners", "p.csv"]).is_err());

        let cli = Cli::try_parse_from([
            "autoplaza-api",
            "match",
            "--partners",
            "p.csv",
            "--amount",
            "250000",
            "--term",
            "36",
            "--vehicle-year",
            "2019",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Match(args)) => {
                assert_eq!(args.amount, 250_000);
                assert_eq!(args.term, 36);
                assert_eq!(args.vehicle_year, Some(2019));
                assert!(args.incidents.is_none());
            }
            other => panic!("expected match command, got {other:?}"),
        }
    }
}
