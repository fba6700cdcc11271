use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::cli::CreateCommand;
use crate::client::GraceDb;
use crate::commands::Output;
use crate::ops::{EmObservation, NewEvent, NewLog, NewSignoff, NewSuperevent, NewVoevent, SignoffKey};
use crate::resource::ObjectHandle;

pub async fn run(client: &GraceDb, cmd: &CreateCommand) -> Result<Output> {
	let resp = match cmd {
		CreateCommand::Emobservation {
			object_id,
			group,
			right_ascension,
			right_ascension_width,
			declination,
			declination_width,
			start_time,
			duration,
			comment,
		} => {
			let obs = EmObservation {
				group: group.clone(),
				ra: right_ascension.0.clone(),
				ra_width: right_ascension_width.clone(),
				dec: declination.0.clone(),
				dec_width: declination_width.clone(),
				start_time: start_time.0.clone(),
				duration: duration.clone(),
				comment: comment.clone(),
			};
			client.write_em_observation(&ObjectHandle::new(object_id), &obs).await?
		}
		CreateCommand::Event {
			group,
			pipeline,
			event_file,
			search,
			labels,
			offline,
		} => {
			let (event_file, search) = order_event_args(client, event_file, search.as_deref()).await?;
			let event = NewEvent {
				search,
				labels: labels.clone(),
				offline: *offline,
				..NewEvent::new(group, pipeline, event_file)
			};
			client.create_event(&event).await?
		}
		CreateCommand::Log {
			object_id,
			comment,
			filename,
			tag_name,
			tag_display_name,
		} => {
			let log = NewLog {
				message: comment.clone(),
				file: filename.clone(),
				tags: tag_name.clone(),
				display_names: tag_display_name.clone(),
			};
			client.write_log(&ObjectHandle::new(object_id), &log).await?
		}
		CreateCommand::Signoff {
			superevent_id,
			signoff_type,
			signoff_status,
			comment,
			instrument,
		} => {
			let signoff = NewSignoff {
				key: SignoffKey::new(signoff_type, instrument.clone().unwrap_or_default()),
				status: signoff_status.clone(),
				comment: comment.clone(),
			};
			client.create_signoff(&ObjectHandle::new(superevent_id), &signoff).await?
		}
		CreateCommand::Superevent {
			t_start,
			t_0,
			t_end,
			preferred_event,
			category,
			events,
			labels,
		} => {
			let new = NewSuperevent {
				category: category.clone(),
				events: events.clone(),
				labels: labels.clone(),
				..NewSuperevent::new(*t_start, *t_0, *t_end, preferred_event)
			};
			client.create_superevent(&new).await?
		}
		CreateCommand::Voevent {
			object_id,
			voevent_type,
			skymap_type,
			skymap_filename,
			combined_skymap_filename,
			external,
			open_alert,
			hardware_inj,
			coinc_comment,
			raven_coinc,
			prob_has_ns,
			prob_has_remnant,
			bns,
			nsbh,
			bbh,
			terrestrial,
			mass_gap,
		} => {
			let voevent = NewVoevent {
				skymap_type: skymap_type.clone(),
				skymap_filename: skymap_filename.clone(),
				combined_skymap_filename: combined_skymap_filename.clone(),
				internal: !external,
				open_alert: *open_alert,
				hardware_inj: *hardware_inj,
				coinc_comment: *coinc_comment,
				raven_coinc: *raven_coinc,
				prob_has_ns: *prob_has_ns,
				prob_has_remnant: *prob_has_remnant,
				bns: *bns,
				nsbh: *nsbh,
				bbh: *bbh,
				terrestrial: *terrestrial,
				mass_gap: *mass_gap,
				..NewVoevent::new(voevent_type)
			};
			client.create_voevent(&ObjectHandle::new(object_id), &voevent).await?
		}
	};
	Ok(Output::Response(resp))
}

/// `create event G pipe search file` is accepted for `create event G pipe
/// file search`: swap when the file argument names a known search and the
/// search argument names an existing file.
async fn order_event_args(
	client: &GraceDb,
	event_file: &str,
	search: Option<&str>,
) -> Result<(String, Option<String>)> {
	if let Some(search) = search {
		if !Path::new(event_file).exists() && Path::new(search).exists() {
			let searches = client.searches().await?;
			if searches.contains(event_file) {
				warn!(event_file = search, search = event_file, "event file and search given in reverse order");
				return Ok((search.to_owned(), Some(event_file.to_owned())));
			}
		}
	}
	Ok((event_file.to_owned(), search.map(str::to_owned)))
}
