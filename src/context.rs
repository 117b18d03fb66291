//! Shell runtime context.
//!
//! A single injected context object carries every process-wide
//! resource the router needs: the hosting base prefix, the shell's
//! DOM selectors, the shared-script pattern set and the append-only
//! loaded-script registry. Tests construct a fresh context per test
//! instead of reaching for module-level globals.

use std::cell::RefCell;
use std::collections::HashSet;

use regex::RegexSet;

/// Selectors and process-wide state shared by all router components.
#[derive(Debug)]
pub struct ShellContext {
	/// Hosting base path segment stripped from incoming routes
	/// (e.g. `/webropol` on project pages). Empty at the domain root.
	pub base_prefix: String,
	/// Selector of the single content region the router may replace.
	pub region_selector: String,
	/// Selector of the sidebar collaborator (`active` attribute).
	pub sidebar_selector: String,
	/// Selector of the breadcrumb collaborator (`trail` attribute).
	pub breadcrumb_selector: String,
	/// Selector matching out-of-band modal/overlay elements.
	pub modal_selector: String,
	/// Name of the optional global settings object re-applied after
	/// each installation.
	pub settings_global: String,
	/// Patterns for the shell's own shared/global scripts, which are
	/// never re-injected from fetched documents.
	shared_scripts: RegexSet,
	/// Absolute URLs of external scripts already injected. Append-only
	/// for the lifetime of the page; never cleared across navigations,
	/// because re-executing a module-style script corrupts shared
	/// singletons.
	loaded_scripts: RefCell<HashSet<String>>,
}

impl Default for ShellContext {
	fn default() -> Self {
		Self::platform_default()
	}
}

impl ShellContext {
	/// The context used by the production survey-platform shell.
	pub fn platform_default() -> Self {
		Self {
			base_prefix: String::new(),
			region_selector: "#app-content".to_string(),
			sidebar_selector: "webropol-sidebar".to_string(),
			breadcrumb_selector: "webropol-breadcrumbs".to_string(),
			modal_selector: "webropol-modal, dialog, [data-modal]".to_string(),
			settings_global: "WebropolSettings".to_string(),
			shared_scripts: default_shared_scripts(),
			loaded_scripts: RefCell::new(HashSet::new()),
		}
	}

	/// Sets the hosting base prefix.
	pub fn base_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.base_prefix = prefix.into();
		self
	}

	/// Sets the content-region selector.
	pub fn region_selector(mut self, selector: impl Into<String>) -> Self {
		self.region_selector = selector.into();
		self
	}

	/// Sets the sidebar selector.
	pub fn sidebar_selector(mut self, selector: impl Into<String>) -> Self {
		self.sidebar_selector = selector.into();
		self
	}

	/// Sets the breadcrumb selector.
	pub fn breadcrumb_selector(mut self, selector: impl Into<String>) -> Self {
		self.breadcrumb_selector = selector.into();
		self
	}

	/// Replaces the shared-script pattern set.
	pub fn shared_scripts(mut self, patterns: &[&str]) -> Self {
		self.shared_scripts = RegexSet::new(patterns).unwrap_or_else(|_| RegexSet::empty());
		self
	}

	/// Returns whether `url` belongs to the shell's shared/global
	/// scripts, which are assumed already loaded and must never be
	/// re-injected (re-running a configuration script resets shared
	/// state).
	pub fn is_shared_script(&self, url: &str) -> bool {
		self.shared_scripts.is_match(url)
	}

	/// Records an external script URL. Returns `true` when the URL was
	/// not seen before and the caller should inject it.
	pub fn register_script(&self, url: &str) -> bool {
		self.loaded_scripts.borrow_mut().insert(url.to_string())
	}

	/// Returns whether `url` has already been injected this session.
	pub fn script_loaded(&self, url: &str) -> bool {
		self.loaded_scripts.borrow().contains(url)
	}

	/// Number of distinct external script URLs injected this session.
	pub fn loaded_script_count(&self) -> usize {
		self.loaded_scripts.borrow().len()
	}

	/// Invokes `applySettings()` on the global settings object, if one
	/// is reachable, so feature visibility reflects current settings
	/// immediately on the freshly installed route.
	#[cfg(target_arch = "wasm32")]
	pub fn apply_settings(&self) {
		use wasm_bindgen::JsCast;
		use wasm_bindgen::JsValue;

		let Some(window) = web_sys::window() else {
			return;
		};
		let Ok(global) = js_sys::Reflect::get(&window, &JsValue::from_str(&self.settings_global))
		else {
			return;
		};
		if global.is_undefined() || global.is_null() {
			return;
		}
		let Ok(method) = js_sys::Reflect::get(&global, &JsValue::from_str("applySettings")) else {
			return;
		};
		if let Some(func) = method.dyn_ref::<js_sys::Function>() {
			if func.call0(&global).is_err() {
				crate::warn_log!("applySettings() threw; settings not re-applied");
			}
		}
	}
}

fn default_shared_scripts() -> RegexSet {
	RegexSet::new([
		r"tailwindcss",
		r"design-system/",
		r"spa-router(\.min)?\.js$",
		r"settings-manager(\.min)?\.js$",
		r"theme-manager(\.min)?\.js$",
		r"analytics-tracker(\.min)?\.js$",
	])
	.unwrap_or_else(|_| RegexSet::empty())
}
