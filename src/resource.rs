use std::fmt;

/// Leading characters of event graceids (G = gravitational-wave, E =
/// external, H = hardware injection, M = mock data challenge, T = test).
pub const EVENT_PREFIXES: [char; 5] = ['G', 'E', 'H', 'M', 'T'];

/// The two resource families served by GraceDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
	Event,
	Superevent,
}

impl ObjectKind {
	/// Classify an identifier. An event prefix followed only by digits is
	/// an event (`G123456`, `T42`); anything else is a superevent
	/// (`S190425z`, `TS190425z`, `MS200101a`, `G1abc`).
	pub fn classify(id: &str) -> Self {
		let mut chars = id.chars();
		let is_event = match chars.next() {
			Some(prefix) if EVENT_PREFIXES.contains(&prefix) => {
				let rest = chars.as_str();
				!rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
			}
			_ => false,
		};
		if is_event {
			Self::Event
		} else {
			Self::Superevent
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Event => "event",
			Self::Superevent => "superevent",
		}
	}
}

impl fmt::Display for ObjectKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An identifier paired with its kind. Every sub-resource operation takes
/// one of these; the classification happens once, when the handle is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
	id: String,
	kind: ObjectKind,
}

impl ObjectHandle {
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();
		let kind = ObjectKind::classify(&id);
		Self { id, kind }
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	pub fn is_superevent(&self) -> bool {
		self.kind == ObjectKind::Superevent
	}

	/// Name of the template parameter carrying this id.
	pub(crate) fn id_param(&self) -> &'static str {
		match self.kind {
			ObjectKind::Event => "graceid",
			ObjectKind::Superevent => "superevent_id",
		}
	}
}

impl From<&str> for ObjectHandle {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for ObjectHandle {
	fn from(id: String) -> Self {
		Self::new(id)
	}
}

impl fmt::Display for ObjectHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.id)
	}
}
