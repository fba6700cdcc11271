//! Flat top-level commands: ping, info, credentials and the superevent
//! visibility actions.

use anyhow::Result;

use crate::cli::{CredentialSource, InfoItem};
use crate::client::GraceDb;
use crate::commands::Output;
use crate::ops::PermissionAction;
use crate::resource::ObjectHandle;
use crate::service::AllowedSet;

const NOT_FOUND: &str = "Data not found on server.";

pub async fn ping(client: &GraceDb) -> Result<Output> {
	let resp = client.ping().await?;
	Ok(Output::Text(format!(
		"Response from {}: {} {}",
		client.versioned_url(),
		resp.status,
		resp.reason
	)))
}

pub async fn info(client: &GraceDb, item: InfoItem) -> Result<Output> {
	let text = match item.vocabulary() {
		None => client.server_version().await?,
		Some(name) => {
			let root = client.root().await?;
			root.vocabulary(name).filter(|set| !set.is_empty()).map(format_set)
		}
	};
	Ok(Output::Text(text.unwrap_or_else(|| NOT_FOUND.into())))
}

/// Mappings as `code (display)`, sorted and comma separated.
fn format_set(set: &AllowedSet) -> String {
	let mut items: Vec<String> = if set.is_mapping() {
		set.entries().map(|(code, display)| format!("{code} ({display})")).collect()
	} else {
		set.codes()
	};
	items.sort();
	items.join(", ")
}

pub async fn credentials(client: &GraceDb, source: CredentialSource) -> Result<Output> {
	Ok(match source {
		CredentialSource::Client => Output::Json(client.show_credentials()),
		CredentialSource::Server => Output::Response(client.user_info().await?),
	})
}

pub async fn permissions(client: &GraceDb, superevent_id: &str, action: PermissionAction) -> Result<Output> {
	let resp = client
		.modify_permissions(&ObjectHandle::new(superevent_id), action)
		.await?;
	Ok(Output::Response(resp))
}

pub async fn confirm_as_gw(client: &GraceDb, superevent_id: &str) -> Result<Output> {
	Ok(Output::Response(client.confirm_superevent_as_gw(superevent_id).await?))
}
