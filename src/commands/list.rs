use anyhow::Result;

use crate::cli::ListCommand;
use crate::client::GraceDb;
use crate::commands::Output;
use crate::resource::ObjectHandle;

pub async fn run(client: &GraceDb, cmd: &ListCommand) -> Result<Output> {
	let resp = match cmd {
		ListCommand::Emobservations { object_id } => client.emobservations(&ObjectHandle::new(object_id), None).await?,
		ListCommand::Files { object_id } => client.files(&ObjectHandle::new(object_id), None).await?,
		ListCommand::Labels { object_id } => client.labels(&ObjectHandle::new(object_id), None).await?,
		ListCommand::Logs { object_id } => client.logs(&ObjectHandle::new(object_id), None).await?,
		ListCommand::Signoffs { superevent_id } => client.signoffs(&ObjectHandle::new(superevent_id), None).await?,
		ListCommand::Tags { object_id, n } => client.tags(&ObjectHandle::new(object_id), *n).await?,
		ListCommand::Voevents { object_id } => client.voevents(&ObjectHandle::new(object_id), None).await?,
	};
	Ok(Output::Response(resp))
}
