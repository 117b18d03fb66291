//! Path resolution for hash-based navigation.
//!
//! Pure functions converting browser hashes and in-page hrefs into
//! canonical [`RoutePath`] values, and routes into source-document
//! locations. Nothing here touches the DOM, so the whole module is
//! testable on any target.

use super::table::RouteTable;

/// A canonical route plus its raw query string.
///
/// The route always begins with `/` and never contains the hosting
/// base prefix. Constructed transiently per navigation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
	/// Normalized absolute path, e.g. `/surveys/list`.
	pub route: String,
	/// Query string without the leading `?`; empty when absent.
	pub query: String,
}

impl RoutePath {
	/// Creates a route path from already-normalized parts.
	pub fn new(route: impl Into<String>, query: impl Into<String>) -> Self {
		Self {
			route: route.into(),
			query: query.into(),
		}
	}

	/// Parses a user-supplied navigation target such as
	/// `/surveys/list?x=1`, `#/surveys/list` or `surveys/list`.
	pub fn parse(target: &str) -> Self {
		let raw = target.strip_prefix('#').unwrap_or(target);
		let (path, query) = split_query(raw);
		Self {
			route: normalize_path(path),
			query: query.to_string(),
		}
	}

	/// The landing route seeded on first load.
	pub fn home() -> Self {
		Self::new("/home", "")
	}

	/// Renders the `#/route?query` hash form of this path.
	pub fn to_hash(&self) -> String {
		if self.query.is_empty() {
			format!("#{}", self.route)
		} else {
			format!("#{}?{}", self.route, self.query)
		}
	}
}

impl std::fmt::Display for RoutePath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.query.is_empty() {
			write!(f, "{}", self.route)
		} else {
			write!(f, "{}?{}", self.route, self.query)
		}
	}
}

/// Parses a `location.hash` value into a route.
///
/// Only `#/…` hashes participate in routing; anything else returns
/// `None` and is left to the browser for in-page anchor scrolling.
/// A configured hosting base prefix (e.g. `/webropol` on project
/// pages) is stripped when present, so the same hash resolves
/// identically at the domain root and under the subpath. Malformed
/// text after `#/` degrades to the root route rather than failing.
pub fn hash_to_route(hash: &str, base_prefix: &str) -> Option<RoutePath> {
	let raw = hash.strip_prefix('#')?;
	if !raw.starts_with('/') {
		return None;
	}
	let (path, query) = split_query(raw);
	let path = strip_base_prefix(path, base_prefix);
	Some(RoutePath {
		route: normalize_path(path),
		query: query.to_string(),
	})
}

/// Converts an internal document href into a route.
///
/// Relative hrefs are resolved against `current_dir`, the directory of
/// the linking document. A trailing `index.html` or `.html` suffix is
/// stripped; the query string is preserved verbatim. Callers exclude
/// external, `mailto:`/`tel:` and non-HTML targets before invoking.
pub fn href_to_route(href: &str, current_dir: &str, base_prefix: &str) -> RoutePath {
	let raw = href.split('#').next().unwrap_or("");
	let (path, query) = split_query(raw);
	let joined = if path.starts_with('/') {
		path.to_string()
	} else {
		format!("{}/{}", current_dir.trim_end_matches('/'), path)
	};
	let normalized = normalize_path(strip_base_prefix(&joined, base_prefix));
	RoutePath {
		route: strip_html_suffix(&normalized),
		query: query.to_string(),
	}
}

/// Resolves a route to a relative source-document location.
///
/// Lookup order: exact route-table match, the implicit `…/index`
/// table convention, then a deterministic `.html` fallback
/// (`index.html` for trailing-slash routes). Always returns a
/// non-empty location; query strings never participate.
pub fn route_to_file(table: &RouteTable, route: &str) -> String {
	if route == "/" || route == "/home" {
		if let Some(file) = table.get("/") {
			return file.to_string();
		}
		return "index.html".to_string();
	}
	if let Some(file) = table.get(route) {
		return file.to_string();
	}
	// `/surveys` may be listed as `/surveys/index`, and vice versa.
	let trimmed = route.trim_end_matches('/');
	if let Some(file) = table.get(&format!("{trimmed}/index")) {
		return file.to_string();
	}
	if let Some(parent) = trimmed.strip_suffix("/index") {
		if let Some(file) = table.get(parent) {
			return file.to_string();
		}
	}
	let rel = route.trim_start_matches('/');
	if route.ends_with('/') {
		format!("{rel}index.html")
	} else {
		format!("{rel}.html")
	}
}

/// Extracts and percent-decodes a single query parameter.
pub fn query_param(query: &str, key: &str) -> Option<String> {
	for pair in query.split('&') {
		let mut parts = pair.splitn(2, '=');
		let name = parts.next().unwrap_or("");
		if name != key {
			continue;
		}
		let value = parts.next().unwrap_or("");
		return Some(
			urlencoding::decode(value)
				.map(|decoded| decoded.into_owned())
				.unwrap_or_else(|_| value.to_string()),
		);
	}
	None
}

/// Returns the site-absolute directory of a relative file location,
/// e.g. `surveys/list.html` → `/surveys`.
pub fn file_dir(file: &str) -> String {
	match file.rsplit_once('/') {
		Some((dir, _)) => format!("/{}", dir.trim_start_matches('/')),
		None => "/".to_string(),
	}
}

/// Splits a raw path at the first `?`.
pub(crate) fn split_query(raw: &str) -> (&str, &str) {
	match raw.split_once('?') {
		Some((path, query)) => (path, query),
		None => (raw, ""),
	}
}

/// Removes the hosting base prefix when the path starts with it.
pub(crate) fn strip_base_prefix<'a>(path: &'a str, base_prefix: &str) -> &'a str {
	let prefix = base_prefix.trim_end_matches('/');
	if prefix.is_empty() || prefix == "/" {
		return path;
	}
	if path == prefix {
		return "/";
	}
	match path.strip_prefix(prefix) {
		Some(rest) if rest.starts_with('/') => rest,
		_ => path,
	}
}

/// Collapses dot segments and duplicate slashes into a canonical
/// absolute path. `..` above the root clamps at the root. A trailing
/// slash on a non-root input is preserved for the `index.html`
/// fallback in [`route_to_file`].
pub(crate) fn normalize_path(path: &str) -> String {
	let mut segments: Vec<&str> = Vec::new();
	for segment in path.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			other => segments.push(other),
		}
	}
	if segments.is_empty() {
		return "/".to_string();
	}
	let trailing = if path.ends_with('/') { "/" } else { "" };
	format!("/{}{}", segments.join("/"), trailing)
}

fn strip_html_suffix(route: &str) -> String {
	if route == "/index.html" {
		return "/".to_string();
	}
	if let Some(parent) = route.strip_suffix("/index.html") {
		return parent.to_string();
	}
	if let Some(stem) = route.strip_suffix(".html") {
		return stem.to_string();
	}
	route.to_string()
}
