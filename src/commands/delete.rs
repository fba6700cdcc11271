use anyhow::Result;

use crate::cli::DeleteCommand;
use crate::client::GraceDb;
use crate::commands::Output;
use crate::ops::SignoffKey;
use crate::resource::ObjectHandle;

pub async fn run(client: &GraceDb, cmd: &DeleteCommand) -> Result<Output> {
	match cmd {
		DeleteCommand::Signoff {
			object_id,
			signoff_type,
			instrument,
		} => {
			let key = SignoffKey::new(signoff_type, instrument.clone().unwrap_or_default());
			let resp = client.delete_signoff(&ObjectHandle::new(object_id), &key).await?;
			Ok(Output::Response(resp))
		}
	}
}
