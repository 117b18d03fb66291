//! Navigation state derivation.
//!
//! Breadcrumb trails and the active sidebar section are pure
//! derivations from `(route, query)`, recomputed in full on every
//! navigation. Rendering is delegated to the shell's breadcrumb and
//! sidebar collaborators through attribute writes.

use serde::Serialize;

use super::resolve::query_param;

#[cfg(target_arch = "wasm32")]
use crate::context::ShellContext;

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
	/// Display label.
	pub label: String,
	/// Hash URL the crumb links to.
	pub url: String,
}

impl Crumb {
	fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			url: url.into(),
		}
	}
}

/// Display label for a path segment.
///
/// Known platform sections come from a static dictionary; unknown
/// segments fall back to title-casing the hyphenated segment.
pub fn section_label(segment: &str) -> String {
	match segment {
		"home" => "Home".to_string(),
		"surveys" => "Surveys".to_string(),
		"events" => "Events".to_string(),
		"sms" => "SMS".to_string(),
		"exw" => "eXW".to_string(),
		"case-management" => "Case Management".to_string(),
		"dashboards" => "Dashboards".to_string(),
		"mywebropol" => "MyWebropol".to_string(),
		"admin-tools" => "Admin Tools".to_string(),
		"training-videos" => "Training Videos".to_string(),
		"shop" => "Shop".to_string(),
		"news" => "News".to_string(),
		"create" => "Create".to_string(),
		"list" => "List".to_string(),
		"edit" => "Edit".to_string(),
		other => title_case(other),
	}
}

/// Derives the breadcrumb trail for a route.
///
/// The trail always starts at Home. `/create` is bespoke: its second
/// crumb names the section selected by the `type` query parameter,
/// because the breadcrumb depends on semantic type rather than URL
/// shape (`/create?type=event` → Home, Events, Create).
pub fn breadcrumb_trail(route: &str, query: &str) -> Vec<Crumb> {
	let mut trail = vec![Crumb::new("Home", "#/home")];
	if route == "/" || route == "/home" {
		return trail;
	}
	if route == "/create" {
		if let Some(kind) = query_param(query, "type") {
			let (label, section) = create_section(&kind);
			trail.push(Crumb::new(label, format!("#/{section}")));
		}
		trail.push(Crumb::new("Create", "#/create"));
		return trail;
	}
	let mut url = String::new();
	for segment in route.split('/').filter(|s| !s.is_empty()) {
		url.push('/');
		url.push_str(segment);
		trail.push(Crumb::new(section_label(segment), format!("#{url}")));
	}
	trail
}

/// Derives the active-sidebar section identifier for a route.
///
/// Normally the first path segment; `/create` resolves through its
/// `type` query parameter like the breadcrumb trail does.
pub fn active_section(route: &str, query: &str) -> String {
	if route == "/" || route == "/home" {
		return "home".to_string();
	}
	if route == "/create" {
		if let Some(kind) = query_param(query, "type") {
			return create_section(&kind).1;
		}
		return "create".to_string();
	}
	route
		.split('/')
		.find(|s| !s.is_empty())
		.unwrap_or("home")
		.to_string()
}

/// Maps a `/create?type=…` value to `(section label, section id)`.
fn create_section(kind: &str) -> (String, String) {
	match kind {
		"survey" => ("Surveys".to_string(), "surveys".to_string()),
		"event" => ("Events".to_string(), "events".to_string()),
		"sms" => ("SMS".to_string(), "sms".to_string()),
		"exw" => ("eXW".to_string(), "exw".to_string()),
		other => (title_case(other), other.to_string()),
	}
}

fn title_case(segment: &str) -> String {
	segment
		.split('-')
		.filter(|word| !word.is_empty())
		.map(|word| {
			let mut chars = word.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

/// Writes the derived navigation state onto the shell's collaborators:
/// the breadcrumb element's `trail` attribute (JSON array of crumbs),
/// the sidebar element's `active` attribute, and the document title.
#[cfg(target_arch = "wasm32")]
pub fn apply_nav_state(
	document: &web_sys::Document,
	ctx: &ShellContext,
	route: &str,
	query: &str,
) -> Result<(), wasm_bindgen::JsValue> {
	let trail = breadcrumb_trail(route, query);
	if let Some(breadcrumbs) = document.query_selector(&ctx.breadcrumb_selector)? {
		let json = serde_json::to_string(&trail).unwrap_or_else(|_| "[]".to_string());
		breadcrumbs.set_attribute("trail", &json)?;
	}
	if let Some(sidebar) = document.query_selector(&ctx.sidebar_selector)? {
		sidebar.set_attribute("active", &active_section(route, query))?;
	}
	if let Some(leaf) = trail.last() {
		document.set_title(&format!("{} - Webropol", leaf.label));
	}
	Ok(())
}
