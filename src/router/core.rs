//! Router facade.
//!
//! Wires hash changes and in-page link clicks to the resolver,
//! fetcher, installer and lifecycle manager, exposing a single
//! `navigate` entry point. One navigation runs
//! `Idle → Resolving → Fetching → Installing → Idle`; overlapping
//! navigations are serialized by a latest-wins generation token, so a
//! fetch that completes after a newer navigation started is discarded
//! before it can touch the DOM.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use super::fetch::FetchError;
use super::resolve::{self, RoutePath};
use super::table::RouteTable;
use crate::context::ShellContext;

#[cfg(target_arch = "wasm32")]
use super::install::InstalledAttrs;
#[cfg(target_arch = "wasm32")]
use super::lifecycle::ArtifactSet;
#[cfg(target_arch = "wasm32")]
use super::{fetch, install, lifecycle, nav};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
#[cfg(target_arch = "wasm32")]
use web_sys::Element;

/// Phase of the navigation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavPhase {
	/// No navigation in flight.
	#[default]
	Idle,
	/// Resolving the target route to a source document.
	Resolving,
	/// Awaiting the document fetch.
	Fetching,
	/// Swapping DOM content.
	Installing,
}

/// Errors internal to one navigation. These are terminal-and-local:
/// they surface as the inline error block and a console log, never as
/// an exception reaching the browser's event handlers.
#[derive(Debug, Error)]
pub enum RouterError {
	/// No browser window is available.
	#[error("no window available")]
	NoWindow,
	/// The shell does not expose the configured content region.
	#[error("content region '{0}' not found")]
	RegionNotFound(String),
	/// Document retrieval or parsing failed.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// A DOM operation failed.
	#[error("dom operation failed: {0}")]
	Dom(String),
}

/// The navigation controller owning the shell content region.
pub struct Router {
	ctx: Rc<ShellContext>,
	table: RouteTable,
	phase: Cell<NavPhase>,
	/// Monotonic navigation token; only the newest generation may
	/// install.
	generation: Cell<u64>,
	/// Number of load passes started (one per navigate to the active
	/// route as well — same-route navigation force-reloads by design).
	loads: Cell<u64>,
	current: RefCell<RoutePath>,
	#[cfg(target_arch = "wasm32")]
	artifacts: RefCell<ArtifactSet>,
	#[cfg(target_arch = "wasm32")]
	installed: RefCell<InstalledAttrs>,
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("phase", &self.phase.get())
			.field("current", &self.current.borrow().clone())
			.field("routes", &self.table.len())
			.finish()
	}
}

impl Router {
	/// Creates a router over a shell context and route table.
	pub fn new(ctx: Rc<ShellContext>, table: RouteTable) -> Self {
		Self {
			ctx,
			table,
			phase: Cell::new(NavPhase::Idle),
			generation: Cell::new(0),
			loads: Cell::new(0),
			current: RefCell::new(RoutePath::home()),
			#[cfg(target_arch = "wasm32")]
			artifacts: RefCell::new(ArtifactSet::new()),
			#[cfg(target_arch = "wasm32")]
			installed: RefCell::new(InstalledAttrs::default()),
		}
	}

	/// Returns the shell context.
	pub fn context(&self) -> &ShellContext {
		&self.ctx
	}

	/// Current machine phase.
	pub fn phase(&self) -> NavPhase {
		self.phase.get()
	}

	/// The route currently considered active.
	pub fn current_route(&self) -> RoutePath {
		self.current.borrow().clone()
	}

	/// Number of load passes started since construction.
	pub fn load_count(&self) -> u64 {
		self.loads.get()
	}

	/// Resolves a raw `location.hash` value against this router's
	/// base prefix. `None` for non-routing hashes.
	pub fn resolve_hash(&self, hash: &str) -> Option<RoutePath> {
		resolve::hash_to_route(hash, &self.ctx.base_prefix)
	}

	/// Source-document location for a route.
	pub fn file_for(&self, route: &str) -> String {
		resolve::route_to_file(&self.table, route)
	}

	/// Records a navigation without DOM work. Off-wasm builds resolve
	/// the full pipeline synchronously so the facade is testable
	/// natively.
	#[cfg(not(target_arch = "wasm32"))]
	pub fn navigate(&self, path: &str) {
		let target = RoutePath::parse(path);
		self.phase.set(NavPhase::Resolving);
		self.generation.set(self.generation.get() + 1);
		self.loads.set(self.loads.get() + 1);
		let _file = self.file_for(&target.route);
		*self.current.borrow_mut() = target;
		self.phase.set(NavPhase::Idle);
	}
}

#[cfg(target_arch = "wasm32")]
impl Router {
	/// Attaches hash/click listeners and seeds the initial route.
	///
	/// When the page loads without a hash, `#/home` is written via
	/// history replacement without fetching: the server-rendered
	/// shell already shows the landing content, so a first-paint
	/// fetch would be redundant.
	pub fn mount(self: Rc<Self>) -> Result<(), RouterError> {
		let window = web_sys::window().ok_or(RouterError::NoWindow)?;
		let document = window.document().ok_or(RouterError::NoWindow)?;

		let hash = window.location().hash().unwrap_or_default();
		if hash.is_empty() {
			if let Ok(history) = window.history() {
				let _ = history.replace_state_with_url(&JsValue::NULL, "", Some("#/home"));
			}
			*self.current.borrow_mut() = RoutePath::home();
			let _ = nav::apply_nav_state(&document, &self.ctx, "/home", "");
		} else if let Some(target) = self.resolve_hash(&hash) {
			Rc::clone(&self).spawn_load(target);
		}

		let router = Rc::clone(&self);
		let on_hashchange = Closure::wrap(Box::new(move |_event: web_sys::Event| {
			let Some(window) = web_sys::window() else {
				return;
			};
			let hash = window.location().hash().unwrap_or_default();
			if let Some(target) = router.resolve_hash(&hash) {
				Rc::clone(&router).spawn_load(target);
			}
		}) as Box<dyn FnMut(web_sys::Event)>);
		window
			.add_event_listener_with_callback("hashchange", on_hashchange.as_ref().unchecked_ref())
			.map_err(js_dom_error)?;
		on_hashchange.forget();

		let router = Rc::clone(&self);
		let on_click = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
			Rc::clone(&router).handle_click(&event);
		}) as Box<dyn FnMut(web_sys::MouseEvent)>);
		document
			.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
			.map_err(js_dom_error)?;
		on_click.forget();

		Ok(())
	}

	/// Navigates to a path such as `/surveys/list?x=1`.
	///
	/// A differing target sets `location.hash`, and the resulting
	/// hashchange event re-enters the machine. Navigating to the hash
	/// that is already current force-reloads it directly — same-route
	/// navigation is deliberately not a no-op.
	pub fn navigate(self: Rc<Self>, path: &str) {
		let target = RoutePath::parse(path);
		let hash = target.to_hash();
		let Some(window) = web_sys::window() else {
			return;
		};
		let current = window.location().hash().unwrap_or_default();
		if current == hash {
			self.spawn_load(target);
		} else {
			let _ = window.location().set_hash(&hash);
		}
	}

	fn spawn_load(self: Rc<Self>, target: RoutePath) {
		wasm_bindgen_futures::spawn_local(async move {
			self.load(target).await;
		});
	}

	/// Runs one full navigation. Never propagates an error to the
	/// caller: failure renders the inline error block and the machine
	/// returns to `Idle` ready for the next attempt.
	pub async fn load(&self, target: RoutePath) {
		let generation = self.generation.get() + 1;
		self.generation.set(generation);
		self.loads.set(self.loads.get() + 1);
		self.set_phase(generation, NavPhase::Resolving);

		let file = self.file_for(&target.route);
		let doc_dir = resolve::file_dir(&file);
		self.set_phase(generation, NavPhase::Fetching);

		match self.load_inner(&target, &file, &doc_dir, generation).await {
			Ok(true) => {
				crate::info_log!("route installed: {}", target);
			}
			Ok(false) => {
				crate::debug_log!("stale navigation to {} discarded", target);
			}
			Err(err) => {
				crate::error_log!("navigation to {} failed: {}", target, err);
				self.render_error(&target.route);
				*self.current.borrow_mut() = target;
			}
		}
		self.set_phase(generation, NavPhase::Idle);
	}

	async fn load_inner(
		&self,
		target: &RoutePath,
		file: &str,
		doc_dir: &str,
		generation: u64,
	) -> Result<bool, RouterError> {
		let window = web_sys::window().ok_or(RouterError::NoWindow)?;
		let live = window.document().ok_or(RouterError::NoWindow)?;

		let doc = fetch::fetch_document(file).await?;
		if self.generation.get() != generation {
			// A newer navigation started while this fetch was in
			// flight; latest wins.
			return Ok(false);
		}
		self.set_phase(generation, NavPhase::Installing);

		let fragment = fetch::extract_fragment(&doc)?;
		let region = live
			.query_selector(&self.ctx.region_selector)
			.map_err(js_dom_error)?
			.ok_or_else(|| RouterError::RegionNotFound(self.ctx.region_selector.clone()))?;

		// Previous generation out before the next one exists.
		self.artifacts.borrow_mut().teardown();
		install::remove_installed(&region, &self.installed.borrow());

		let mut artifacts = ArtifactSet::new();
		let installed =
			install::install_fragment(&region, &fragment, doc_dir, &self.ctx).map_err(js_dom_error)?;
		lifecycle::attach_styles(&doc, &live, &mut artifacts).map_err(js_dom_error)?;
		lifecycle::attach_scripts(&doc, &live, doc_dir, &self.ctx, &mut artifacts)
			.map_err(js_dom_error)?;
		install::reparent_modals(&fragment, &live, &self.ctx, &mut artifacts)
			.map_err(js_dom_error)?;
		*self.artifacts.borrow_mut() = artifacts;
		*self.installed.borrow_mut() = installed;
		*self.current.borrow_mut() = target.clone();

		nav::apply_nav_state(&live, &self.ctx, &target.route, &target.query)
			.map_err(js_dom_error)?;
		region.set_scroll_top(0);

		// Settings first, notification last: listeners must never
		// observe a route string the rendered content does not match.
		self.ctx.apply_settings();
		dispatch_route_change(&window, target);

		Ok(true)
	}

	fn handle_click(self: Rc<Self>, event: &web_sys::Event) {
		let Some(target) = event.target() else {
			return;
		};
		let Some(element) = target.dyn_ref::<Element>() else {
			return;
		};
		let Ok(Some(anchor)) = element.closest("a[href]") else {
			return;
		};
		if anchor.get_attribute("target").as_deref() == Some("_blank")
			|| anchor.has_attribute("download")
		{
			return;
		}
		let Some(href) = anchor.get_attribute("href") else {
			return;
		};
		if let Some(stripped) = href.strip_prefix('#') {
			if stripped.starts_with('/') {
				event.prevent_default();
				self.navigate(stripped);
			}
			// Plain anchors scroll in place.
			return;
		}
		let decision = install::rewrite_href(&href, &self.current_shell_dir(), &self.ctx.base_prefix);
		match decision {
			install::HrefRewrite::ToHash(hash) => {
				event.prevent_default();
				self.navigate(hash.trim_start_matches('#'));
			}
			install::HrefRewrite::Keep => {}
		}
	}

	/// Directory of the document the shell is served from, used to
	/// resolve relative hrefs clicked outside installed content.
	fn current_shell_dir(&self) -> String {
		let Some(window) = web_sys::window() else {
			return "/".to_string();
		};
		let path = window.location().pathname().unwrap_or_else(|_| "/".to_string());
		match path.rsplit_once('/') {
			Some((dir, file)) if file.contains('.') => {
				if dir.is_empty() {
					"/".to_string()
				} else {
					dir.to_string()
				}
			}
			_ => path.trim_end_matches('/').to_string(),
		}
	}

	fn render_error(&self, route: &str) {
		let Some(document) = web_sys::window().and_then(|w| w.document()) else {
			return;
		};
		let Ok(Some(region)) = document.query_selector(&self.ctx.region_selector) else {
			return;
		};
		// The route comes straight from location.hash; built as text
		// nodes so hash-supplied markup is never parsed.
		let Ok(block) = document.create_element("div") else {
			return;
		};
		let _ = block.set_attribute(
			"class",
			"rounded-lg border border-red-200 bg-red-50 p-6 text-red-700",
		);
		if let Ok(heading) = document.create_element("h2") {
			let _ = heading.set_attribute("class", "font-semibold");
			heading.set_text_content(Some(&format!("Failed to load {route}")));
			let _ = block.append_child(&heading);
		}
		if let Ok(hint) = document.create_element("p") {
			let _ = hint.set_attribute("class", "text-sm");
			hint.set_text_content(Some("Check your connection and try again."));
			let _ = block.append_child(&hint);
		}
		region.set_inner_html("");
		let _ = region.append_child(&block);
	}

	fn set_phase(&self, generation: u64, phase: NavPhase) {
		// A stale navigation must not clobber the newer one's phase.
		if self.generation.get() == generation {
			self.phase.set(phase);
		}
	}
}

/// Dispatches the `spa-route-change` notification on the window,
/// after installation and settings re-application complete.
#[cfg(target_arch = "wasm32")]
fn dispatch_route_change(window: &web_sys::Window, target: &RoutePath) {
	let detail = js_sys::Object::new();
	let _ = js_sys::Reflect::set(
		&detail,
		&JsValue::from_str("path"),
		&JsValue::from_str(&target.route),
	);
	let _ = js_sys::Reflect::set(
		&detail,
		&JsValue::from_str("queryString"),
		&JsValue::from_str(&target.query),
	);
	let init = web_sys::CustomEventInit::new();
	init.set_detail(&detail);
	if let Ok(event) = web_sys::CustomEvent::new_with_event_init_dict("spa-route-change", &init) {
		let _ = window.dispatch_event(&event);
	}
}

#[cfg(target_arch = "wasm32")]
fn js_dom_error(err: JsValue) -> RouterError {
	RouterError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
