use crate::demo::{run_demo, run_plan_report, DemoArgs, PlanArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mess_planner::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Mess Planner",
    about = "Match meal variants to a student cohort and plan a mess service from the command line",
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
    /// Build a meal plan report from cohort and catalogue CSV exports
    Plan(PlanArgs),
    /// Run the meal plan report against a built-in sample cohort
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
        Command::Plan(args) => run_plan_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
