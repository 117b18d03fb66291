//! Static route table.
//!
//! Maps logical routes to relative source-document locations. The
//! table is pure data, immutable after construction; extending it is
//! a configuration change, not a code change.

use std::collections::HashMap;

/// Route path → relative source-document location.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	entries: HashMap<String, String>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a route entry.
	pub fn route(mut self, path: impl Into<String>, file: impl Into<String>) -> Self {
		self.entries.insert(path.into(), file.into());
		self
	}

	/// Looks up the document location for an exact route path.
	pub fn get(&self, path: &str) -> Option<&str> {
		self.entries.get(path).map(String::as_str)
	}

	/// Returns whether the table contains an exact entry for `path`.
	pub fn contains(&self, path: &str) -> bool {
		self.entries.contains_key(path)
	}

	/// Iterates over the registered route paths.
	pub fn routes(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The survey-platform route table used by the production shell.
	pub fn platform_default() -> Self {
		Self::new()
			.route("/", "index.html")
			.route("/home", "index.html")
			.route("/surveys", "surveys/index.html")
			.route("/surveys/list", "surveys/list.html")
			.route("/surveys/edit", "surveys/edit.html")
			.route("/events", "events/index.html")
			.route("/events/list", "events/list.html")
			.route("/sms", "sms/index.html")
			.route("/exw", "exw/index.html")
			.route("/case-management", "case-management/index.html")
			.route("/dashboards", "dashboards/index.html")
			.route("/mywebropol", "mywebropol/index.html")
			.route("/admin-tools", "admin-tools/index.html")
			.route("/training-videos", "training-videos/index.html")
			.route("/shop", "shop/index.html")
			.route("/news", "news/index.html")
			.route("/create", "create/index.html")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_table_builder() {
		let table = RouteTable::new()
			.route("/", "index.html")
			.route("/surveys/list", "surveys/list.html");

		assert_eq!(table.len(), 2);
		assert_eq!(table.get("/surveys/list"), Some("surveys/list.html"));
		assert_eq!(table.get("/missing"), None);
	}

	#[test]
	fn test_platform_default_covers_core_routes() {
		let table = RouteTable::platform_default();
		assert!(table.contains("/"));
		assert!(table.contains("/surveys/list"));
		assert!(table.contains("/create"));
		assert!(table.contains("/events"));
	}

	#[test]
	fn test_later_entry_wins() {
		let table = RouteTable::new()
			.route("/surveys", "old.html")
			.route("/surveys", "surveys/index.html");
		assert_eq!(table.get("/surveys"), Some("surveys/index.html"));
	}
}
