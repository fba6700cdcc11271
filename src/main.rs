use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gracedb_client::cli::{Cli, Command};
use gracedb_client::commands::{self, misc, Output};
use gracedb_client::ops::PermissionAction;

#[tokio::main]
async fn main() -> ExitCode {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(e) => {
			let _ = e.print();
			return if e.use_stderr() {
				ExitCode::FAILURE
			} else {
				ExitCode::SUCCESS
			};
		}
	};

	init_tracing(cli.verbose);

	match run(&cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("{}", commands::error_message(&e));
			ExitCode::FAILURE
		}
	}
}

fn init_tracing(verbose: u8) {
	let default = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = if verbose > 0 {
		EnvFilter::new(default)
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
	};
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
	let client = commands::build_client(cli)?;

	let output: Output = match &cli.command {
		Command::Add { command } => commands::add::run(&client, command).await?,
		Command::Create { command } => commands::create::run(&client, command).await?,
		Command::Delete { command } => commands::delete::run(&client, command).await?,
		Command::Get { command } => commands::get::run(&client, command).await?,
		Command::List { command } => commands::list::run(&client, command).await?,
		Command::Remove { command } => commands::remove::run(&client, command).await?,
		Command::Search { command } => commands::search::run(&client, command).await?,
		Command::Update { command } => commands::update::run(&client, command).await?,
		Command::Ping => misc::ping(&client).await?,
		Command::Info { item } => misc::info(&client, *item).await?,
		Command::Credentials { source } => misc::credentials(&client, *source).await?,
		Command::Expose { superevent_id } => {
			misc::permissions(&client, superevent_id, PermissionAction::Expose).await?
		}
		Command::Hide { superevent_id } => misc::permissions(&client, superevent_id, PermissionAction::Hide).await?,
		Command::ConfirmAsGw { superevent_id } => misc::confirm_as_gw(&client, superevent_id).await?,
	};

	commands::print(output, cli.output_type)
}
