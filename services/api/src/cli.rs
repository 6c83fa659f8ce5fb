use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use event_registration::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Event Registration",
    about = "Run the event registration service or walk through its admission scenarios",
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
    /// Run the admission scenarios against in-memory collaborators and print the outcomes
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
    /// Define a handful of sample events around today's date before serving
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "event-registration-api",
            "serve",
            "--port",
            "8088",
            "--seed-demo",
        ])
        .expect("valid arguments");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8088));
                assert!(args.seed_demo);
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn demo_accepts_reference_date() {
        let cli = Cli::try_parse_from(["event-registration-api", "demo", "--today", "2026-10-19"])
            .expect("valid arguments");

        match cli.command {
            Some(Command::Demo(args)) => {
                assert_eq!(
                    args.today,
                    chrono::NaiveDate::from_ymd_opt(2026, 10, 19)
                );
            }
            other => panic!("expected demo command, got {other:?}"),
        }
    }

    #[test]
    fn missing_command_defaults_to_serve() {
        let cli = Cli::try_parse_from(["event-registration-api"]).expect("no arguments");
        assert!(cli.command.is_none());
    }
}
