pub mod add;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod misc;
pub mod remove;
pub mod search;
pub mod update;

use std::io::Write;

use anyhow::Result;
use serde_json::Value;

use crate::auth::{AuthOptions, X509Credential};
use crate::cli::{Cli, OutputType};
use crate::client::{ClientOptions, GraceDb};
use crate::config::Config;
use crate::transport::ApiResponse;

/// Bodies longer than this are cut short in CLI error messages.
const MAX_ERROR_BODY: usize = 1000;

/// What a leaf command hands back for printing.
pub enum Output {
	/// A raw server response; printed per `--output-type`.
	Response(ApiResponse),
	Json(Value),
	Text(String),
	/// Already written to stdout while the command ran.
	Streamed,
}

/// Build a client from CLI flags, falling back to the config file.
pub fn build_client(cli: &Cli) -> Result<GraceDb> {
	let config = Config::load()?;
	let x509 = cli.creds.as_deref().map(X509Credential::parse).transpose()?;

	let options = ClientOptions {
		service_url: cli.service_url.clone().unwrap_or(config.service.url.clone()),
		api_version: cli.api_version.clone().or(config.service.api_version.clone()),
		auth: AuthOptions {
			x509,
			username: cli.username.clone(),
			password: cli.password.clone(),
			force_noauth: cli.force_noauth,
			fail_if_noauth: cli.fail_if_noauth,
		},
		reload_certificate: config.auth.reload_certificate,
		reload_buffer: config.reload_buffer(),
		timeout: config.timeout(),
		proxy: cli.proxy.clone(),
	};
	Ok(GraceDb::new(options)?)
}

/// Print a command's result to stdout.
pub fn print(output: Output, output_type: OutputType) -> Result<()> {
	let mut stdout = std::io::stdout().lock();
	match output {
		Output::Response(resp) => match output_type {
			OutputType::Status => writeln!(stdout, "Server returned {}: {}", resp.status, resp.reason)?,
			OutputType::Json => writeln!(stdout, "{}", render_response(&resp))?,
		},
		Output::Json(value) => writeln!(stdout, "{}", serde_json::to_string_pretty(&value)?)?,
		Output::Text(text) => writeln!(stdout, "{text}")?,
		Output::Streamed => {}
	}
	Ok(())
}

/// Pretty JSON when the body decodes, raw text otherwise.
fn render_response(resp: &ApiResponse) -> String {
	match resp.json() {
		Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| resp.text()),
		Err(_) => resp.text(),
	}
}

/// Top-level error text. Long server bodies are truncated; the library error
/// itself keeps the full body.
pub fn error_message(err: &anyhow::Error) -> String {
	if let Some(crate::Error::Request { status, reason, body }) = err.downcast_ref::<crate::Error>() {
		let body = if body.chars().count() >= MAX_ERROR_BODY {
			let head: String = body.chars().take(MAX_ERROR_BODY).collect();
			format!("{head}... (truncated)")
		} else {
			body.clone()
		};
		return format!("Error: {status} {reason}. {body}");
	}
	format!("Error: {err:#}")
}
