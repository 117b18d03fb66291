//! Script, style and modal lifecycle management.
//!
//! Every node injected into the live document as a side effect of one
//! route load forms a navigation generation, tracked as a unit in an
//! explicit [`ArtifactSet`] and tagged with [`ARTIFACT_ATTR`]. Exactly
//! one generation exists at a time: the previous one is fully torn
//! down before the next route's content is installed, which is the
//! central invariant preventing style leaks and duplicate global
//! script execution.

#[cfg(target_arch = "wasm32")]
use crate::context::ShellContext;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Element};

/// Marker attribute tagging nodes injected for the current route.
pub const ARTIFACT_ATTR: &str = "data-webropol-page-artifact";

/// The set of live-document nodes owned by the current navigation
/// generation. Ownership is explicit; teardown never relies on DOM
/// traversal to discover what to remove.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct ArtifactSet {
	nodes: Vec<Element>,
}

#[cfg(target_arch = "wasm32")]
impl ArtifactSet {
	/// Creates an empty generation.
	pub fn new() -> Self {
		Self::default()
	}

	/// Tags `element` as a page artifact and takes ownership of it.
	pub fn track(&mut self, element: Element) {
		let _ = element.set_attribute(ARTIFACT_ATTR, "1");
		self.nodes.push(element);
	}

	/// Removes every tracked node from the document. Removal is
	/// best-effort per node: one already-detached node never blocks
	/// the rest of the teardown.
	pub fn teardown(&mut self) {
		for node in self.nodes.drain(..) {
			node.remove();
		}
	}

	/// Number of nodes in this generation.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns whether the generation is empty.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Recognizes one-time global configuration blocks in inline scripts.
///
/// These run once when the shell boots; re-executing them on a later
/// navigation would reset shared runtime configuration, so the
/// lifecycle manager skips them while re-running all other inline
/// scripts.
pub fn is_global_config_inline(code: &str) -> bool {
	code.contains("tailwind.config")
		|| code.contains("window.WebropolConfig")
		|| code.contains("globalSettings")
}

/// Resolves a script `src` to the absolute URL used for de-duplication.
pub fn absolute_script_url(src: &str, doc_dir: &str) -> String {
	if src.starts_with("http://")
		|| src.starts_with("https://")
		|| src.starts_with("//")
		|| src.starts_with('/')
	{
		return src.to_string();
	}
	super::resolve::normalize_path(&format!("{}/{}", doc_dir.trim_end_matches('/'), src))
}

/// Clones stylesheet `<link>`s, font links and `<style>` blocks from
/// the fetched document into the live head, skipping stylesheet URLs
/// that are already present so shared stylesheets are not duplicated
/// across navigations.
#[cfg(target_arch = "wasm32")]
pub fn attach_styles(
	fetched: &Document,
	live: &Document,
	artifacts: &mut ArtifactSet,
) -> Result<(), JsValue> {
	let Some(head) = live.head() else {
		return Ok(());
	};

	let links = fetched.query_selector_all("link[rel='stylesheet'], link[rel='preconnect']")?;
	for index in 0..links.length() {
		let Some(node) = links.item(index) else {
			continue;
		};
		let Ok(link) = node.dyn_into::<Element>() else {
			continue;
		};
		let Some(href) = link.get_attribute("href") else {
			continue;
		};
		let escaped = href.replace('\'', "\\'");
		if live
			.query_selector(&format!("link[href='{escaped}']"))?
			.is_some()
		{
			continue;
		}
		let clone = live.create_element("link")?;
		copy_attributes(&link, &clone)?;
		artifacts.track(clone.clone());
		head.append_child(&clone)?;
	}

	let styles = fetched.query_selector_all("style")?;
	for index in 0..styles.length() {
		let Some(node) = styles.item(index) else {
			continue;
		};
		let clone = live.create_element("style")?;
		clone.set_text_content(node.text_content().as_deref());
		artifacts.track(clone.clone());
		head.append_child(&clone)?;
	}

	Ok(())
}

/// Injects the fetched document's scripts into the live document.
///
/// External scripts matching the shell's shared/global patterns are
/// skipped outright; other external scripts load at most once per
/// absolute URL for the lifetime of the page (the context's
/// de-duplication set is never cleared). Inline scripts get a fresh
/// element on every navigation so their logic reruns, except
/// recognized one-time configuration blocks.
#[cfg(target_arch = "wasm32")]
pub fn attach_scripts(
	fetched: &Document,
	live: &Document,
	doc_dir: &str,
	ctx: &ShellContext,
	artifacts: &mut ArtifactSet,
) -> Result<(), JsValue> {
	let Some(body) = live.body() else {
		return Ok(());
	};

	let scripts = fetched.query_selector_all("script")?;
	for index in 0..scripts.length() {
		let Some(node) = scripts.item(index) else {
			continue;
		};
		let Ok(script) = node.dyn_into::<Element>() else {
			continue;
		};
		match script.get_attribute("src") {
			Some(src) => {
				let url = absolute_script_url(&src, doc_dir);
				if ctx.is_shared_script(&url) {
					continue;
				}
				if !ctx.register_script(&url) {
					// Already executed this session; a second
					// execution would corrupt shared singletons.
					continue;
				}
				let clone = live.create_element("script")?;
				clone.set_attribute("src", &url)?;
				if let Some(kind) = script.get_attribute("type") {
					clone.set_attribute("type", &kind)?;
				}
				if script.has_attribute("defer") {
					clone.set_attribute("defer", "")?;
				}
				artifacts.track(clone.clone());
				body.append_child(&clone)?;
			}
			None => {
				let code = script.text_content().unwrap_or_default();
				if code.trim().is_empty() || is_global_config_inline(&code) {
					continue;
				}
				let clone = live.create_element("script")?;
				clone.set_text_content(Some(&code));
				artifacts.track(clone.clone());
				body.append_child(&clone)?;
			}
		}
	}

	Ok(())
}

#[cfg(target_arch = "wasm32")]
fn copy_attributes(from: &Element, to: &Element) -> Result<(), JsValue> {
	let attributes = from.attributes();
	for index in 0..attributes.length() {
		if let Some(attr) = attributes.item(index) {
			to.set_attribute(&attr.name(), &attr.value())?;
		}
	}
	Ok(())
}
