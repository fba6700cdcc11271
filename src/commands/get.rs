use std::path::Path;

use anyhow::Result;

use crate::cli::GetCommand;
use crate::client::GraceDb;
use crate::commands::Output;
use crate::ops::{SignoffKey, STDIN_SENTINEL};
use crate::resource::ObjectHandle;

pub async fn run(client: &GraceDb, cmd: &GetCommand) -> Result<Output> {
	let resp = match cmd {
		GetCommand::Emobservation { object_id, n } => {
			client.emobservations(&ObjectHandle::new(object_id), Some(*n)).await?
		}
		GetCommand::Event { graceid } => client.event(graceid).await?,
		GetCommand::File {
			object_id,
			filename,
			destination,
		} => return get_file(client, object_id, filename, destination).await,
		GetCommand::Label { object_id, label } => client.labels(&ObjectHandle::new(object_id), Some(label.as_str())).await?,
		GetCommand::Log { object_id, n } => client.logs(&ObjectHandle::new(object_id), Some(*n)).await?,
		GetCommand::Signoff {
			superevent_id,
			signoff_type,
			instrument,
		} => {
			let key = SignoffKey::new(signoff_type, instrument.clone().unwrap_or_default());
			client.signoffs(&ObjectHandle::new(superevent_id), Some(&key)).await?
		}
		GetCommand::Superevent { superevent_id } => client.superevent(superevent_id).await?,
		GetCommand::Voevent { object_id, n } => client.voevents(&ObjectHandle::new(object_id), Some(*n)).await?,
	};
	Ok(Output::Response(resp))
}

/// Download a file to `destination`, or to stdout for `-`.
async fn get_file(client: &GraceDb, object_id: &str, filename: &str, destination: &str) -> Result<Output> {
	let handle = ObjectHandle::new(object_id);
	if destination == STDIN_SENTINEL {
		client.download_file(&handle, filename, &mut tokio::io::stdout()).await?;
		return Ok(Output::Streamed);
	}

	let path = Path::new(destination);
	let mut file = tokio::fs::File::create(path).await?;
	if let Err(e) = client.download_file(&handle, filename, &mut file).await {
		drop(file);
		let _ = tokio::fs::remove_file(path).await;
		return Err(e.into());
	}
	let shown = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
	Ok(Output::Text(format!(
		"File '{filename}' for {object_id} saved at {}",
		shown.display()
	)))
}
