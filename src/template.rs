//! URI templates advertised by the server root, e.g.
//! `https://host/api/superevents/{superevent_id}/logs/{N}/`.
//!
//! Templates are parsed once into literal and placeholder segments so that
//! filling them can reject both missing and unused parameters instead of
//! silently producing a wrong URL.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
	name: String,
	segments: Vec<Segment>,
}

impl UriTemplate {
	/// Parse `raw`. `{{` and `}}` are literal braces.
	pub fn parse(name: &str, raw: &str) -> Result<Self> {
		let malformed = |reason: &str| Error::MalformedTemplate {
			template: name.to_owned(),
			reason: reason.to_owned(),
		};

		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut chars = raw.chars().peekable();

		while let Some(c) = chars.next() {
			match c {
				'{' if chars.peek() == Some(&'{') => {
					chars.next();
					literal.push('{');
				}
				'}' if chars.peek() == Some(&'}') => {
					chars.next();
					literal.push('}');
				}
				'{' => {
					let mut param = String::new();
					loop {
						match chars.next() {
							Some('}') => break,
							Some('{') => return Err(malformed("nested '{'")),
							Some(ch) => param.push(ch),
							None => return Err(malformed("unterminated placeholder")),
						}
					}
					if param.is_empty() {
						return Err(malformed("empty placeholder"));
					}
					if !literal.is_empty() {
						segments.push(Segment::Literal(std::mem::take(&mut literal)));
					}
					segments.push(Segment::Placeholder(param));
				}
				'}' => return Err(malformed("unmatched '}'")),
				ch => literal.push(ch),
			}
		}
		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}

		Ok(Self {
			name: name.to_owned(),
			segments,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Placeholder names in order of appearance.
	pub fn placeholders(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|s| match s {
			Segment::Placeholder(p) => Some(p.as_str()),
			Segment::Literal(_) => None,
		})
	}

	/// Substitute every placeholder. Each placeholder must have a value and
	/// each value must be used by some placeholder.
	pub fn fill(&self, params: &[(&str, &str)]) -> Result<String> {
		for (key, _) in params {
			if !self.placeholders().any(|p| p == *key) {
				return Err(Error::UnexpectedTemplateParameter {
					template: self.name.clone(),
					param: (*key).to_owned(),
				});
			}
		}

		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(s) => out.push_str(s),
				Segment::Placeholder(p) => {
					let value = params
						.iter()
						.find(|(key, _)| key == p)
						.map(|(_, value)| *value)
						.ok_or_else(|| Error::MissingTemplateParameter {
							template: self.name.clone(),
							param: p.clone(),
						})?;
					out.push_str(value);
				}
			}
		}
		Ok(out)
	}
}

impl fmt::Display for UriTemplate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for segment in &self.segments {
			match segment {
				Segment::Literal(s) => f.write_str(&s.replace('{', "{{").replace('}', "}}"))?,
				Segment::Placeholder(p) => write!(f, "{{{p}}}")?,
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LOG_DETAIL: &str = "https://gracedb.test/api/superevents/{superevent_id}/logs/{N}/";

	#[test]
	fn fills_all_placeholders() {
		let t = UriTemplate::parse("superevent-log-detail-template", LOG_DETAIL).unwrap();
		let url = t.fill(&[("superevent_id", "S190425z"), ("N", "12")]).unwrap();
		assert_eq!(url, "https://gracedb.test/api/superevents/S190425z/logs/12/");
		assert_eq!(t.placeholders().collect::<Vec<_>>(), ["superevent_id", "N"]);
	}

	#[test]
	fn missing_parameter_is_an_error() {
		let t = UriTemplate::parse("x", LOG_DETAIL).unwrap();
		let err = t.fill(&[("superevent_id", "S1")]).unwrap_err();
		assert!(matches!(err, Error::MissingTemplateParameter { param, .. } if param == "N"));
	}

	#[test]
	fn extra_parameter_is_an_error() {
		let t = UriTemplate::parse("x", "https://h/events/{graceid}").unwrap();
		let err = t.fill(&[("graceid", "G1"), ("N", "3")]).unwrap_err();
		assert!(matches!(err, Error::UnexpectedTemplateParameter { param, .. } if param == "N"));
	}

	#[test]
	fn empty_values_are_allowed() {
		let t = UriTemplate::parse("files-template", "https://h/events/{graceid}/files/{filename}").unwrap();
		assert_eq!(t.fill(&[("graceid", "G1"), ("filename", "")]).unwrap(), "https://h/events/G1/files/");
	}

	#[test]
	fn escaped_braces_and_display() {
		let t = UriTemplate::parse("x", "https://h/{{literal}}/{id}").unwrap();
		assert_eq!(t.fill(&[("id", "7")]).unwrap(), "https://h/{literal}/7");
		assert_eq!(t.to_string(), "https://h/{{literal}}/{id}");
	}

	#[test]
	fn rejects_malformed_templates() {
		for raw in ["https://h/{id", "https://h/{}", "https://h/id}", "https://h/{a{b}}"] {
			assert!(
				matches!(UriTemplate::parse("x", raw), Err(Error::MalformedTemplate { .. })),
				"{raw}"
			);
		}
	}
}
