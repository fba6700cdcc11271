use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::ops::OneOrMany;

#[derive(Parser)]
#[command(
	name = "gracedb",
	about = "Command-line client for the GraceDB gravitational-wave candidate database.",
	version
)]
pub struct Cli {
	/// GraceDB API URL.
	#[arg(short = 's', long, env = "GRACEDB_SERVICE_URL", global = true)]
	pub service_url: Option<String>,

	/// HTTP proxy to route requests through.
	#[arg(short = 'p', long, env = "HTTP_PROXY", global = true)]
	pub proxy: Option<String>,

	/// API version to use (e.g. v1).
	#[arg(long, global = true)]
	pub api_version: Option<String>,

	/// 'json' prints response bodies; 'status' prints only the HTTP status.
	#[arg(long, value_enum, default_value = "json", global = true)]
	pub output_type: OutputType,

	/// Username for basic auth.
	#[arg(long, global = true)]
	pub username: Option<String>,

	/// Password for basic auth.
	#[arg(long, global = true)]
	pub password: Option<String>,

	/// X.509 certificate and key files, or a combined proxy file.
	#[arg(long, value_name = "CERT,KEY|PROXY", global = true)]
	pub creds: Option<String>,

	/// Do not use any authentication credentials.
	#[arg(short = 'n', long, global = true)]
	pub force_noauth: bool,

	/// Fail if no authentication credentials are found.
	#[arg(short = 'f', long, global = true)]
	pub fail_if_noauth: bool,

	/// More log output on stderr (-v info, -vv debug).
	#[arg(short, long, action = ArgAction::Count, global = true)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputType {
	Json,
	Status,
}

#[derive(Subcommand)]
pub enum Command {
	/// Add a label to an event or superevent, a tag to a log entry, or an
	/// event to a superevent.
	Add {
		#[command(subcommand)]
		command: AddCommand,
	},

	/// Create an event, superevent, log entry, signoff, EM observation, or
	/// VOEvent.
	Create {
		#[command(subcommand)]
		command: CreateCommand,
	},

	/// Delete a signoff.
	Delete {
		#[command(subcommand)]
		command: DeleteCommand,
	},

	/// Download a file or show a log entry, label, EM observation, VOEvent,
	/// signoff, event, or superevent.
	Get {
		#[command(subcommand)]
		command: GetCommand,
	},

	/// List files, logs, labels, EM observations, signoffs, VOEvents or tags.
	List {
		#[command(subcommand)]
		command: ListCommand,
	},

	/// Remove a label, a tag, or an event from a superevent.
	Remove {
		#[command(subcommand)]
		command: RemoveCommand,
	},

	/// Search for events or superevents.
	Search {
		#[command(subcommand)]
		command: SearchCommand,
	},

	/// Replace an event file, or update a GRB event, signoff, or superevent.
	Update {
		#[command(subcommand)]
		command: UpdateCommand,
	},

	/// Check that the server is reachable.
	Ping,

	/// Show server vocabulary (groups, pipelines, labels, ...).
	Info {
		item: InfoItem,
	},

	/// Show the credentials in use ('client') or your account as the server
	/// sees it ('server').
	Credentials {
		source: CredentialSource,
	},

	/// Expose a superevent to LV-EM and public users.
	Expose {
		superevent_id: String,
	},

	/// Restrict a superevent to internal users.
	Hide {
		superevent_id: String,
	},

	/// Confirm a superevent as a gravitational wave. Cannot be undone.
	#[command(name = "confirm_as_gw")]
	ConfirmAsGw {
		superevent_id: String,
	},
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum InfoItem {
	Emgroups,
	Groups,
	Instruments,
	Labels,
	Pipelines,
	Searches,
	ServerVersion,
	SignoffStatuses,
	SignoffTypes,
	SupereventCategories,
	VoeventTypes,
}

impl InfoItem {
	/// Name of the vocabulary on the server root, if this item is one.
	pub fn vocabulary(&self) -> Option<&'static str> {
		Some(match self {
			Self::Emgroups => "emgroups",
			Self::Groups => "groups",
			Self::Instruments => "instruments",
			Self::Labels => "labels",
			Self::Pipelines => "pipelines",
			Self::Searches => "searches",
			Self::SignoffStatuses => "signoff_statuses",
			Self::SignoffTypes => "signoff_types",
			Self::SupereventCategories => "superevent_categories",
			Self::VoeventTypes => "voevent_types",
			Self::ServerVersion => return None,
		})
	}
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CredentialSource {
	Client,
	Server,
}

// -- Add subcommands --

#[derive(Subcommand)]
pub enum AddCommand {
	/// Add an event to a superevent of the same category.
	Event { superevent_id: String, graceid: String },

	/// Apply a label to an event or superevent.
	Label { object_id: String, label: String },

	/// Tag a log entry.
	Tag {
		object_id: String,
		/// Log entry number.
		#[arg(value_name = "N")]
		log_number: u32,
		tag_name: String,
		/// Display name for a tag that does not exist yet.
		tag_display_name: Option<String>,
	},
}

// -- Create subcommands --

#[derive(Subcommand)]
pub enum CreateCommand {
	/// Upload EM observation data for an event or superevent.
	Emobservation {
		object_id: String,
		/// EM MOU group (see 'info emgroups').
		group: String,
		/// Comma-separated right ascensions (degrees).
		#[arg(value_parser = parse_floats, allow_hyphen_values = true)]
		right_ascension: FloatList,
		/// Comma-separated widths, or one width for all (degrees).
		#[arg(value_parser = parse_one_or_many)]
		right_ascension_width: OneOrMany,
		/// Comma-separated declinations (degrees).
		#[arg(value_parser = parse_floats, allow_hyphen_values = true)]
		declination: FloatList,
		/// Comma-separated widths, or one width for all (degrees).
		#[arg(value_parser = parse_one_or_many)]
		declination_width: OneOrMany,
		/// Comma-separated ISO 8601 start times.
		#[arg(value_parser = parse_strings)]
		start_time: StringList,
		/// Comma-separated exposures, or one for all (seconds).
		#[arg(value_parser = parse_one_or_many)]
		duration: OneOrMany,
		#[arg(long, default_value = "")]
		comment: String,
	},

	/// Create an event by uploading an event data file.
	Event {
		/// Analysis group (see 'info groups').
		group: String,
		/// Analysis pipeline (see 'info pipelines').
		pipeline: String,
		/// Event data file, or '-' for stdin.
		event_file: String,
		/// Search type (see 'info searches').
		search: Option<String>,
		/// Comma-separated labels to apply on creation.
		#[arg(long, value_delimiter = ',')]
		labels: Vec<String>,
		/// The event was found by an offline analysis.
		#[arg(long)]
		offline: bool,
	},

	/// Create a log entry, with optional file upload.
	Log {
		object_id: String,
		comment: String,
		/// File to attach, or '-' for stdin.
		filename: Option<String>,
		/// Comma-separated tag names.
		#[arg(short = 't', long, value_delimiter = ',')]
		tag_name: Vec<String>,
		/// Comma-separated tag display names, one per tag.
		#[arg(short = 'd', long, value_delimiter = ',')]
		tag_display_name: Vec<String>,
	},

	/// Create an operator or advocate signoff on a superevent.
	Signoff {
		superevent_id: String,
		/// See 'info signoff_types'.
		signoff_type: String,
		/// See 'info signoff_statuses'.
		signoff_status: String,
		comment: String,
		/// Required for operator signoffs (see 'info instruments').
		instrument: Option<String>,
	},

	/// Create a superevent.
	Superevent {
		t_start: f64,
		t_0: f64,
		t_end: f64,
		preferred_event: String,
		/// See 'info superevent_categories'.
		#[arg(long, default_value = "production")]
		category: String,
		/// Comma-separated graceids to include.
		#[arg(long, value_delimiter = ',')]
		events: Vec<String>,
		/// Comma-separated labels to apply on creation.
		#[arg(long, value_delimiter = ',')]
		labels: Vec<String>,
	},

	/// Create a VOEvent for an event or superevent.
	Voevent {
		object_id: String,
		/// See 'info voevent_types'.
		voevent_type: String,
		#[arg(long)]
		skymap_type: Option<String>,
		/// Skymap file on the server (required for initial alerts).
		#[arg(long)]
		skymap_filename: Option<String>,
		#[arg(long)]
		combined_skymap_filename: Option<String>,
		/// Distribute outside the collaboration.
		#[arg(long)]
		external: bool,
		#[arg(long)]
		open_alert: bool,
		#[arg(long)]
		hardware_inj: bool,
		/// The candidate has a possible counterpart GRB.
		#[arg(long)]
		coinc_comment: bool,
		#[arg(long)]
		raven_coinc: bool,
		#[arg(long)]
		prob_has_ns: Option<f64>,
		#[arg(long)]
		prob_has_remnant: Option<f64>,
		#[arg(long)]
		bns: Option<f64>,
		#[arg(long)]
		nsbh: Option<f64>,
		#[arg(long)]
		bbh: Option<f64>,
		#[arg(long)]
		terrestrial: Option<f64>,
		#[arg(long)]
		mass_gap: Option<f64>,
	},
}

// -- Delete subcommands --

#[derive(Subcommand)]
pub enum DeleteCommand {
	/// Delete a superevent signoff.
	Signoff {
		object_id: String,
		signoff_type: String,
		instrument: Option<String>,
	},
}

// -- Get subcommands --

#[derive(Subcommand)]
pub enum GetCommand {
	/// Show one EM observation.
	Emobservation {
		object_id: String,
		#[arg(value_name = "N")]
		n: u32,
	},

	/// Show an event.
	Event { graceid: String },

	/// Download a file.
	File {
		object_id: String,
		filename: String,
		/// Where to save it; '-' writes to stdout.
		#[arg(default_value = "-")]
		destination: String,
	},

	/// Show one label.
	Label { object_id: String, label: String },

	/// Show one log entry.
	Log {
		object_id: String,
		#[arg(value_name = "N")]
		n: u32,
	},

	/// Show a superevent signoff.
	Signoff {
		superevent_id: String,
		signoff_type: String,
		instrument: Option<String>,
	},

	/// Show a superevent.
	Superevent { superevent_id: String },

	/// Show one VOEvent.
	Voevent {
		object_id: String,
		#[arg(value_name = "N")]
		n: u32,
	},
}

// -- List subcommands --

#[derive(Subcommand)]
pub enum ListCommand {
	Emobservations { object_id: String },
	Files { object_id: String },
	Labels { object_id: String },
	Logs { object_id: String },
	/// Superevents only.
	Signoffs { superevent_id: String },
	/// Tags on one log entry.
	Tags {
		object_id: String,
		#[arg(value_name = "N")]
		n: u32,
	},
	Voevents { object_id: String },
}

// -- Remove subcommands --

#[derive(Subcommand)]
pub enum RemoveCommand {
	/// Remove an event from a superevent.
	Event { superevent_id: String, graceid: String },

	/// Remove a label from an event or superevent.
	Label { object_id: String, label: String },

	/// Remove a tag from a log entry.
	Tag {
		object_id: String,
		#[arg(value_name = "N")]
		log_number: u32,
		tag_name: String,
	},
}

// -- Search subcommands --

#[derive(Subcommand)]
pub enum SearchCommand {
	/// Search events and print selected columns.
	Events(SearchArgs),
	/// Search superevents and print selected columns.
	Superevents(SearchArgs),
}

#[derive(clap::Args)]
pub struct SearchArgs {
	/// Query string.
	pub query: Option<String>,
	/// Comma-separated columns; 'a.b' reaches into nested objects.
	#[arg(long, value_delimiter = ',')]
	pub columns: Vec<String>,
	#[arg(long)]
	pub max_results: Option<usize>,
	/// Column delimiter; 'TAB' means a tab character.
	#[arg(long, default_value = "TAB")]
	pub delimiter: String,
}

// -- Update subcommands --

#[derive(Subcommand)]
pub enum UpdateCommand {
	/// Replace the data file an event was created from.
	Event { graceid: String, filename: String },

	/// Update parameters of a GRB event.
	Grbevent {
		graceid: String,
		#[arg(long, allow_hyphen_values = true)]
		ra: Option<f64>,
		#[arg(long, allow_hyphen_values = true)]
		dec: Option<f64>,
		#[arg(long)]
		error_radius: Option<f64>,
		#[arg(long)]
		t90: Option<f64>,
		#[arg(long)]
		redshift: Option<f64>,
		#[arg(long)]
		designation: Option<String>,
	},

	/// Change the status and/or comment of a superevent signoff.
	Signoff {
		superevent_id: String,
		signoff_type: String,
		instrument: Option<String>,
		#[arg(long)]
		status: Option<String>,
		#[arg(long)]
		comment: Option<String>,
	},

	/// Update a superevent's times, preferred event or EM coincidence.
	Superevent {
		superevent_id: String,
		#[arg(long)]
		t_start: Option<f64>,
		#[arg(long)]
		t_0: Option<f64>,
		#[arg(long)]
		t_end: Option<f64>,
		#[arg(long)]
		preferred_event: Option<String>,
		#[arg(long)]
		em_type: Option<String>,
		#[arg(long)]
		time_coinc_far: Option<f64>,
		#[arg(long)]
		space_coinc_far: Option<f64>,
	},
}

// -- Value parsers --

#[derive(Debug, Clone, PartialEq)]
pub struct FloatList(pub Vec<f64>);

#[derive(Debug, Clone, PartialEq)]
pub struct StringList(pub Vec<String>);

fn split(s: &str) -> impl Iterator<Item = &str> {
	s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn parse_floats(s: &str) -> Result<FloatList, String> {
	split(s)
		.map(|p| p.parse::<f64>().map_err(|e| format!("'{p}': {e}")))
		.collect::<Result<_, _>>()
		.map(FloatList)
}

fn parse_strings(s: &str) -> Result<StringList, String> {
	Ok(StringList(split(s).map(str::to_owned).collect()))
}

fn parse_one_or_many(s: &str) -> Result<OneOrMany, String> {
	if s.contains(',') {
		parse_floats(s).map(|FloatList(v)| OneOrMany::Many(v))
	} else {
		s.trim()
			.parse::<f64>()
			.map(OneOrMany::One)
			.map_err(|e| format!("'{s}': {e}"))
	}
}
