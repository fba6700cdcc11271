use anyhow::Result;

use crate::cli::AddCommand;
use crate::client::GraceDb;
use crate::commands::Output;
use crate::resource::ObjectHandle;

pub async fn run(client: &GraceDb, cmd: &AddCommand) -> Result<Output> {
	let resp = match cmd {
		AddCommand::Event { superevent_id, graceid } => client.add_event_to_superevent(superevent_id, graceid).await?,
		AddCommand::Label { object_id, label } => client.write_label(&ObjectHandle::new(object_id), label).await?,
		AddCommand::Tag {
			object_id,
			log_number,
			tag_name,
			tag_display_name,
		} => {
			client
				.add_tag(
					&ObjectHandle::new(object_id),
					*log_number,
					tag_name,
					tag_display_name.as_deref(),
				)
				.await?
		}
	};
	Ok(Output::Response(resp))
}
