use anyhow::Result;
use serde_json::Value;

use crate::cli::{SearchArgs, SearchCommand};
use crate::client::GraceDb;
use crate::commands::Output;
use crate::ops::SearchOptions;

const DEFAULT_EVENT_COLUMNS: &str = "graceid,labels,group,pipeline,far,gpstime,created";
const DEFAULT_SUPEREVENT_COLUMNS: &str = "superevent_id,preferred_event,gw_events,labels,far,links.files";

pub async fn run(client: &GraceDb, cmd: &SearchCommand) -> Result<Output> {
	let (args, defaults) = match cmd {
		SearchCommand::Events(args) => (args, DEFAULT_EVENT_COLUMNS),
		SearchCommand::Superevents(args) => (args, DEFAULT_SUPEREVENT_COLUMNS),
	};

	// Columns are picked out here so that dotted paths work for both kinds.
	let opts = SearchOptions {
		query: args.query.clone(),
		max_results: args.max_results,
		..Default::default()
	};
	let records = match cmd {
		SearchCommand::Events(_) => client.events(&opts).await?,
		SearchCommand::Superevents(_) => client.superevents(&opts).await?,
	};

	let columns = columns(args, defaults);
	Ok(Output::Text(render_table(&records, &columns, &delimiter(args))))
}

fn columns(args: &SearchArgs, defaults: &str) -> Vec<String> {
	if args.columns.is_empty() {
		defaults.split(',').map(str::to_owned).collect()
	} else {
		args.columns.iter().map(|c| c.trim().to_owned()).collect()
	}
}

fn delimiter(args: &SearchArgs) -> String {
	if args.delimiter.eq_ignore_ascii_case("tab") {
		"\t".into()
	} else {
		args.delimiter.clone()
	}
}

/// `#`-prefixed header, then one delimited row per record.
fn render_table(records: &[Value], columns: &[String], delimiter: &str) -> String {
	let mut lines = Vec::with_capacity(records.len() + 1);
	lines.push(format!("#{}", columns.join(delimiter)));
	for record in records {
		let row: Vec<String> = columns.iter().map(|c| cell(lookup(record, c))).collect();
		lines.push(row.join(delimiter));
	}
	lines.join("\n")
}

/// Follow a dotted path such as `links.files`.
fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.').try_fold(record, |v, key| v.get(key))
}

fn cell(value: Option<&Value>) -> String {
	match value {
		None | Some(Value::Null) => String::new(),
		Some(Value::String(s)) => s.clone(),
		Some(Value::Array(items)) => items.iter().map(|v| cell(Some(v))).collect::<Vec<_>>().join(","),
		Some(other) => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn table_has_header_and_nested_columns() {
		let records = vec![
			json!({"superevent_id": "S1", "labels": ["EM_READY", "DQOK"], "far": 0.5, "links": {"files": "https://x/files/"}}),
			json!({"superevent_id": "S2", "labels": [], "far": null, "links": {}}),
		];
		let cols = vec!["superevent_id".into(), "labels".into(), "far".into(), "links.files".into()];
		let table = render_table(&records, &cols, "\t");
		let lines: Vec<&str> = table.lines().collect();
		assert_eq!(lines[0], "#superevent_id\tlabels\tfar\tlinks.files");
		assert_eq!(lines[1], "S1\tEM_READY,DQOK\t0.5\thttps://x/files/");
		assert_eq!(lines[2], "S2\t\t\t");
	}

	#[test]
	fn tab_keyword_becomes_tab() {
		let args = SearchArgs {
			query: None,
			columns: vec![],
			max_results: None,
			delimiter: "TAB".into(),
		};
		assert_eq!(delimiter(&args), "\t");
		assert_eq!(columns(&args, DEFAULT_EVENT_COLUMNS)[0], "graceid");
	}
}
