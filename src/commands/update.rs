use anyhow::Result;

use crate::cli::UpdateCommand;
use crate::client::GraceDb;
use crate::commands::Output;
use crate::ops::{GrbUpdate, SignoffKey, SupereventUpdate};
use crate::resource::ObjectHandle;

pub async fn run(client: &GraceDb, cmd: &UpdateCommand) -> Result<Output> {
	let resp = match cmd {
		UpdateCommand::Event { graceid, filename } => client.replace_event(graceid, filename).await?,
		UpdateCommand::Grbevent {
			graceid,
			ra,
			dec,
			error_radius,
			t90,
			redshift,
			designation,
		} => {
			let update = GrbUpdate {
				ra: *ra,
				dec: *dec,
				error_radius: *error_radius,
				t90: *t90,
				redshift: *redshift,
				designation: designation.clone(),
			};
			client.update_grb_event(graceid, &update).await?
		}
		UpdateCommand::Signoff {
			superevent_id,
			signoff_type,
			instrument,
			status,
			comment,
		} => {
			let key = SignoffKey::new(signoff_type, instrument.clone().unwrap_or_default());
			client
				.update_signoff(
					&ObjectHandle::new(superevent_id),
					&key,
					status.as_deref(),
					comment.as_deref(),
				)
				.await?
		}
		UpdateCommand::Superevent {
			superevent_id,
			t_start,
			t_0,
			t_end,
			preferred_event,
			em_type,
			time_coinc_far,
			space_coinc_far,
		} => {
			let update = SupereventUpdate {
				t_start: *t_start,
				t_0: *t_0,
				t_end: *t_end,
				preferred_event: preferred_event.clone(),
				em_type: em_type.clone(),
				time_coinc_far: *time_coinc_far,
				space_coinc_far: *space_coinc_far,
			};
			client.update_superevent(superevent_id, &update).await?
		}
	};
	Ok(Output::Response(resp))
}
