use anyhow::Result;

use crate::cli::RemoveCommand;
use crate::client::GraceDb;
use crate::commands::Output;
use crate::resource::ObjectHandle;

pub async fn run(client: &GraceDb, cmd: &RemoveCommand) -> Result<Output> {
	let resp = match cmd {
		RemoveCommand::Event { superevent_id, graceid } => {
			client.remove_event_from_superevent(superevent_id, graceid).await?
		}
		RemoveCommand::Label { object_id, label } => client.remove_label(&ObjectHandle::new(object_id), label).await?,
		RemoveCommand::Tag {
			object_id,
			log_number,
			tag_name,
		} => {
			client
				.remove_tag(&ObjectHandle::new(object_id), *log_number, tag_name)
				.await?
		}
	};
	Ok(Output::Response(resp))
}
