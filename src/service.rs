use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::template::UriTemplate;

/// The API root document: the server's vocabulary plus its links and
/// URI templates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceRoot {
	#[serde(rename = "api-versions", default)]
	pub api_versions: Option<Vec<String>>,
	#[serde(rename = "server-version", default)]
	pub server_version: Option<String>,
	#[serde(default)]
	pub links: BTreeMap<String, String>,
	#[serde(default)]
	pub templates: BTreeMap<String, String>,
	#[serde(default)]
	pub groups: AllowedSet,
	#[serde(default)]
	pub pipelines: AllowedSet,
	#[serde(default)]
	pub searches: AllowedSet,
	#[serde(default)]
	pub labels: AllowedSet,
	#[serde(rename = "em-groups", default)]
	pub em_groups: AllowedSet,
	#[serde(rename = "voevent-types", default)]
	pub voevent_types: AllowedSet,
	#[serde(rename = "superevent-categories", default)]
	pub superevent_categories: AllowedSet,
	#[serde(default)]
	pub instruments: AllowedSet,
	#[serde(rename = "signoff-types", default)]
	pub signoff_types: AllowedSet,
	#[serde(rename = "signoff-statuses", default)]
	pub signoff_statuses: AllowedSet,
}

impl ServiceRoot {
	pub fn template(&self, name: &str) -> Result<UriTemplate> {
		let raw = self
			.templates
			.get(name)
			.ok_or_else(|| Error::UnknownTemplate(name.to_owned()))?;
		UriTemplate::parse(name, raw)
	}

	pub fn link(&self, rel: &str) -> Result<&str> {
		self.links
			.get(rel)
			.map(String::as_str)
			.ok_or_else(|| Error::MissingLink(rel.to_owned()))
	}

	/// Look up one of the server vocabularies by the name used on the
	/// command line (`gracedb info <item>`).
	pub fn vocabulary(&self, item: &str) -> Option<&AllowedSet> {
		Some(match item {
			"groups" => &self.groups,
			"pipelines" => &self.pipelines,
			"searches" => &self.searches,
			"labels" => &self.labels,
			"emgroups" => &self.em_groups,
			"voevent_types" => &self.voevent_types,
			"superevent_categories" => &self.superevent_categories,
			"instruments" => &self.instruments,
			"signoff_types" => &self.signoff_types,
			"signoff_statuses" => &self.signoff_statuses,
			_ => return None,
		})
	}
}

/// A set of permitted values. The server sends either a plain list of
/// names or a mapping of short code to display name; a list is stored
/// with each entry as its own display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedSet {
	entries: Vec<(String, String)>,
	mapping: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSet {
	List(Vec<String>),
	Mapping(BTreeMap<String, String>),
}

impl<'de> Deserialize<'de> for AllowedSet {
	fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
		Ok(match Option::<RawSet>::deserialize(d)? {
			Some(RawSet::List(names)) => Self::from_list(names),
			Some(RawSet::Mapping(map)) => Self::from_mapping(map),
			None => Self::default(),
		})
	}
}

impl AllowedSet {
	pub fn from_list<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			entries: names
				.into_iter()
				.map(|n| {
					let n = n.into();
					(n.clone(), n)
				})
				.collect(),
			mapping: false,
		}
	}

	pub fn from_mapping<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
			mapping: true,
		}
	}

	pub fn is_mapping(&self) -> bool {
		self.mapping
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// `(code, display name)` pairs.
	pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(c, d)| (c.as_str(), d.as_str()))
	}

	pub fn codes(&self) -> Vec<String> {
		self.entries.iter().map(|(c, _)| c.clone()).collect()
	}

	pub fn display_names(&self) -> Vec<String> {
		self.entries.iter().map(|(_, d)| d.clone()).collect()
	}

	/// Exact membership of a short code.
	pub fn contains(&self, value: &str) -> bool {
		self.entries.iter().any(|(c, _)| c == value)
	}

	/// Resolve a code or display name, ignoring case, to its short code.
	pub fn resolve(&self, value: &str) -> Option<&str> {
		if let Some((code, _)) = self.entries.iter().find(|(c, _)| c == value) {
			return Some(code);
		}
		let wanted = value.to_lowercase();
		self.entries
			.iter()
			.find(|(c, d)| c.to_lowercase() == wanted || d.to_lowercase() == wanted)
			.map(|(c, _)| c.as_str())
	}

	/// Fail with `NotInAllowedSet` unless `value` is an exact member.
	pub(crate) fn require(&self, kind: &'static str, value: &str) -> Result<()> {
		if self.contains(value) {
			Ok(())
		} else {
			Err(Error::NotInAllowedSet {
				kind,
				value: value.to_owned(),
				allowed: self.codes(),
			})
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn root() -> ServiceRoot {
		serde_json::from_value(serde_json::json!({
			"api-versions": ["v1"],
			"server-version": "2.20.0",
			"links": {"self": "https://h/api/", "events": "https://h/api/events/"},
			"templates": {"event-detail-template": "https://h/api/events/{graceid}"},
			"groups": ["CBC", "Burst", "Test"],
			"labels": ["INJ", "DQV"],
			"signoff-types": {"OP": "operator", "ADV": "advocate"},
			"superevent-categories": {"P": "Production", "T": "Test", "M": "MDC"},
			"instruments": null
		}))
		.unwrap()
	}

	#[test]
	fn parses_lists_and_mappings() {
		let r = root();
		assert!(!r.groups.is_mapping());
		assert!(r.groups.contains("Test"));
		assert!(r.signoff_types.is_mapping());
		assert_eq!(r.signoff_types.codes(), ["ADV", "OP"]);
		assert!(r.instruments.is_empty());
		assert!(r.pipelines.is_empty());
		assert_eq!(r.server_version.as_deref(), Some("2.20.0"));
	}

	#[test]
	fn alias_resolution_is_case_insensitive() {
		let r = root();
		for (code, display) in r.superevent_categories.entries() {
			for input in [code.to_owned(), display.to_owned(), display.to_uppercase(), code.to_lowercase()] {
				assert_eq!(r.superevent_categories.resolve(&input), Some(code));
			}
		}
		assert_eq!(r.superevent_categories.resolve("allsky"), None);
	}

	#[test]
	fn require_reports_valid_codes() {
		let r = root();
		assert!(r.labels.require("label", "INJ").is_ok());
		match r.labels.require("label", "inj") {
			Err(Error::NotInAllowedSet { kind, allowed, .. }) => {
				assert_eq!(kind, "label");
				assert_eq!(allowed, ["INJ", "DQV"]);
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn template_and_link_lookup() {
		let r = root();
		let t = r.template("event-detail-template").unwrap();
		assert_eq!(t.fill(&[("graceid", "G1")]).unwrap(), "https://h/api/events/G1");
		assert!(matches!(r.template("nope"), Err(Error::UnknownTemplate(n)) if n == "nope"));
		assert_eq!(r.link("events").unwrap(), "https://h/api/events/");
		assert!(matches!(r.link("user-info"), Err(Error::MissingLink(_))));
	}

	#[test]
	fn vocabulary_by_cli_name() {
		let r = root();
		assert_eq!(r.vocabulary("groups"), Some(&r.groups));
		assert!(r.vocabulary("server_version").is_none());
	}
}
