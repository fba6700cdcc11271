use std::path::PathBuf;

/// Every failure the client can produce.
///
/// Validation and configuration variants are always raised before any
/// network I/O happens; `Timeout`, `Transport` and `Request` come back from
/// the wire.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	// -- Configuration --
	#[error("conflicting options: force_noauth and fail_if_noauth cannot both be set")]
	ConflictingAuthFlags,

	#[error("malformed credentials: {0}")]
	MalformedCredentials(String),

	#[error("invalid service URL {url}: {reason}")]
	InvalidServiceUrl { url: String, reason: String },

	// -- Credentials --
	#[error("no authentication credentials could be found, and fail_if_noauth is set")]
	NoCredentials,

	#[error("invalid X.509 credential {}: {reason}", path.display())]
	InvalidCredential { path: PathBuf, reason: String },

	// -- Service root and templates --
	#[error("{}", unsupported_version_message(.requested, .available))]
	UnsupportedApiVersion {
		requested: String,
		available: Vec<String>,
	},

	#[error("server does not advertise template '{0}'")]
	UnknownTemplate(String),

	#[error("malformed URI template '{template}': {reason}")]
	MalformedTemplate { template: String, reason: String },

	#[error("template '{template}' requires parameter '{param}'")]
	MissingTemplateParameter { template: String, param: String },

	#[error("template '{template}' has no placeholder for parameter '{param}'")]
	UnexpectedTemplateParameter { template: String, param: String },

	#[error("server does not provide a '{0}' link")]
	MissingLink(String),

	// -- Validation --
	#[error("{kind} '{value}' is not allowed by the server (valid: {})", .allowed.join(", "))]
	NotInAllowedSet {
		kind: &'static str,
		value: String,
		allowed: Vec<String>,
	},

	#[error("category must be one of: {}", .valid.join(", "))]
	InvalidCategory { value: String, valid: Vec<String> },

	#[error("signoff_type must be one of: {}", .valid.join(", "))]
	InvalidSignoffType { value: String, valid: Vec<String> },

	#[error("instrument must be one of: {}", .valid.join(", "))]
	InvalidInstrument { value: String, valid: Vec<String> },

	#[error("status must be one of: {}", .valid.join(", "))]
	InvalidSignoffStatus { value: String, valid: Vec<String> },

	#[error("voevent_type must be one of: {}", .valid.join(", "))]
	InvalidVoeventType { value: String, valid: Vec<String> },

	#[error("provide at least one of {}", .0.join(", "))]
	NoUpdateFields(&'static [&'static str]),

	#[error("for a list of tags, provide either no display names or one for each tag ({tags} tags, {display_names} display names)")]
	MismatchedTagNames { tags: usize, display_names: usize },

	#[error("{field} has {actual} entries, expected {expected} to match the right ascension list")]
	ListLengthMismatch {
		field: &'static str,
		expected: usize,
		actual: usize,
	},

	#[error("a skymap filename is required for 'initial' VOEvents")]
	MissingSkymap,

	#[error("operator signoffs require an instrument")]
	OperatorRequiresInstrument,

	#[error("advocate signoffs must not specify an instrument")]
	AdvocateWithInstrument,

	#[error("{field} '{value}' is not an event graceid")]
	NotAnEvent { field: &'static str, value: String },

	#[error("{0} is not implemented for events")]
	NotImplementedForEvents(&'static str),

	// -- Wire --
	#[error("request timed out: {0}")]
	Timeout(#[source] reqwest::Error),

	#[error("transport error: {0}")]
	Transport(#[source] reqwest::Error),

	#[error("{status} {reason}. {body}")]
	Request {
		status: u16,
		reason: String,
		body: String,
	},

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("could not decode response: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// True for errors raised locally before any request was sent.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			Self::NotInAllowedSet { .. }
				| Self::InvalidCategory { .. }
				| Self::InvalidSignoffType { .. }
				| Self::InvalidInstrument { .. }
				| Self::InvalidSignoffStatus { .. }
				| Self::InvalidVoeventType { .. }
				| Self::NoUpdateFields(_)
				| Self::MismatchedTagNames { .. }
				| Self::ListLengthMismatch { .. }
				| Self::MissingSkymap
				| Self::OperatorRequiresInstrument
				| Self::AdvocateWithInstrument
				| Self::NotImplementedForEvents(_)
				| Self::NotAnEvent { .. }
		)
	}

	/// True for failures of the connection itself, as opposed to an HTTP
	/// error status returned by the server.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Timeout(_) | Self::Transport(_))
	}

	/// HTTP status of a rejected request, if this is one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Request { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			Self::Timeout(e)
		} else {
			Self::Transport(e)
		}
	}
}

fn unsupported_version_message(requested: &str, available: &[String]) -> String {
	if available.is_empty() {
		format!(
			"API version '{requested}' is not available: this server does not have a \
			 versioned API, reinstantiate the client without a version"
		)
	} else {
		format!(
			"bad API version '{requested}'. Available versions for this server are: {}",
			available.join(", ")
		)
	}
}
