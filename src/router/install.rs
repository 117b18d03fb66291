//! Fragment installation into the shell content region.
//!
//! The swap is synchronous within one task: old children out, new
//! children in, link/asset rewriting scoped to the freshly installed
//! subtree and never applied globally. Out-of-band modal siblings are
//! re-parented into the shell so injected script can still open them,
//! and captured body state is applied additively with exact records
//! for removal on the next navigation.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Element};

#[cfg(target_arch = "wasm32")]
use super::fetch::{ExtractionStrategy, Fragment};
#[cfg(target_arch = "wasm32")]
use super::lifecycle::ArtifactSet;
use super::resolve::{href_to_route, normalize_path, split_query};
#[cfg(target_arch = "wasm32")]
use crate::context::ShellContext;

/// Rewrite decision for one anchor href inside installed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HrefRewrite {
	/// Replace the href with this hash route.
	ToHash(String),
	/// Leave the href untouched.
	Keep,
}

/// Decides how an anchor href inside the installed subtree is
/// rewritten.
///
/// Internal `.html` documents and internal absolute paths become hash
/// routes so clicks stay inside the SPA; external schemes,
/// `mailto:`/`tel:` and in-page anchors are left alone. New-tab links
/// are excluded by the caller before this runs.
pub fn rewrite_href(href: &str, doc_dir: &str, base_prefix: &str) -> HrefRewrite {
	if href.is_empty() || href.starts_with('#') || has_external_scheme(href) {
		return HrefRewrite::Keep;
	}
	let (path, _query) = split_query(href.split('#').next().unwrap_or(""));
	if path.ends_with(".html") || path.starts_with('/') {
		let route = href_to_route(href, doc_dir, base_prefix);
		return HrefRewrite::ToHash(route.to_hash());
	}
	HrefRewrite::Keep
}

/// Absolutizes a relative asset reference against the fetched
/// document's own directory, because the shell's location differs
/// from the fragment's original location. Returns `None` when the
/// reference is already absolute or not path-like.
pub fn absolutize_asset(src: &str, doc_dir: &str) -> Option<String> {
	if src.is_empty()
		|| src.starts_with('/')
		|| src.starts_with('#')
		|| src.starts_with("data:")
		|| has_external_scheme(src)
	{
		return None;
	}
	Some(normalize_path(&format!(
		"{}/{}",
		doc_dir.trim_end_matches('/'),
		src
	)))
}

fn has_external_scheme(href: &str) -> bool {
	href.starts_with("http://")
		|| href.starts_with("https://")
		|| href.starts_with("//")
		|| href.starts_with("mailto:")
		|| href.starts_with("tel:")
		|| href.starts_with("javascript:")
}

/// Exactly the classes and attributes the installer added to the
/// shell content region for the current route, so the next navigation
/// removes only those and never shell-owned state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledAttrs {
	/// Class tokens added to the region.
	pub classes: Vec<String>,
	/// Attribute names set on the region.
	pub attrs: Vec<String>,
}

/// Removes previously recorded body state from the region.
#[cfg(target_arch = "wasm32")]
pub fn remove_installed(region: &Element, installed: &InstalledAttrs) {
	for class in &installed.classes {
		let _ = region.class_list().remove_1(class);
	}
	for name in &installed.attrs {
		let _ = region.remove_attribute(name);
	}
}

/// Replaces the region's children with the fragment and applies the
/// subtree-scoped rewrites. Returns the body state that was added.
#[cfg(target_arch = "wasm32")]
pub fn install_fragment(
	region: &Element,
	fragment: &Fragment,
	doc_dir: &str,
	ctx: &ShellContext,
) -> Result<InstalledAttrs, JsValue> {
	region.set_inner_html(&fragment.root.inner_html());
	rewrite_links(region, doc_dir, ctx)?;
	rewrite_assets(region, doc_dir)?;
	normalize_widths(region)?;
	apply_body_state(region, fragment)
}

/// Re-parents out-of-band modal/overlay elements, those outside the
/// extraction origin in the source document, into the live shell body,
/// registering them as page artifacts. Fallback extraction installs
/// the whole body, so every modal already arrived with the fragment
/// and nothing is re-parented; re-parenting would duplicate IDs and
/// break modal triggering.
#[cfg(target_arch = "wasm32")]
pub fn reparent_modals(
	fragment: &Fragment,
	live: &Document,
	ctx: &ShellContext,
	artifacts: &mut ArtifactSet,
) -> Result<(), JsValue> {
	if fragment.strategy == ExtractionStrategy::BodyFallback {
		return Ok(());
	}
	let Some(live_body) = live.body() else {
		return Ok(());
	};
	let modals = fragment.source.query_selector_all(&ctx.modal_selector)?;
	for index in 0..modals.length() {
		let Some(node) = modals.item(index) else {
			continue;
		};
		let Ok(modal) = node.dyn_into::<Element>() else {
			continue;
		};
		// Descendants of the extraction origin already arrived with
		// the installed fragment.
		if fragment.origin.contains(Some(modal.as_ref())) {
			continue;
		}
		let imported = live
			.import_node_with_deep(&modal, true)?
			.dyn_into::<Element>()
			.map_err(JsValue::from)?;
		artifacts.track(imported.clone());
		live_body.append_child(&imported)?;
	}
	Ok(())
}

#[cfg(target_arch = "wasm32")]
fn rewrite_links(region: &Element, doc_dir: &str, ctx: &ShellContext) -> Result<(), JsValue> {
	let anchors = region.query_selector_all("a[href]")?;
	for index in 0..anchors.length() {
		let Some(node) = anchors.item(index) else {
			continue;
		};
		let Ok(anchor) = node.dyn_into::<Element>() else {
			continue;
		};
		if anchor.get_attribute("target").as_deref() == Some("_blank")
			|| anchor.has_attribute("download")
		{
			continue;
		}
		let Some(href) = anchor.get_attribute("href") else {
			continue;
		};
		if let HrefRewrite::ToHash(hash) = rewrite_href(&href, doc_dir, &ctx.base_prefix) {
			anchor.set_attribute("href", &hash)?;
		}
	}
	Ok(())
}

#[cfg(target_arch = "wasm32")]
fn rewrite_assets(region: &Element, doc_dir: &str) -> Result<(), JsValue> {
	for (selector, attr) in [
		("img[src]", "src"),
		("source[src]", "src"),
		("audio[src]", "src"),
		("video[src]", "src"),
		("video[poster]", "poster"),
		("iframe[src]", "src"),
	] {
		let nodes = region.query_selector_all(selector)?;
		for index in 0..nodes.length() {
			let Some(node) = nodes.item(index) else {
				continue;
			};
			let Ok(element) = node.dyn_into::<Element>() else {
				continue;
			};
			let Some(value) = element.get_attribute(attr) else {
				continue;
			};
			if let Some(absolute) = absolutize_asset(&value, doc_dir) {
				element.set_attribute(attr, &absolute)?;
			}
		}
	}
	Ok(())
}

/// Strips hard `max-w-*` utility caps from the fragment's wrappers so
/// installed content fills the region consistently. Presentation
/// normalization only.
#[cfg(target_arch = "wasm32")]
fn normalize_widths(region: &Element) -> Result<(), JsValue> {
	let capped = region.query_selector_all("[class*='max-w-']")?;
	for index in 0..capped.length() {
		let Some(node) = capped.item(index) else {
			continue;
		};
		let Ok(element) = node.dyn_into::<Element>() else {
			continue;
		};
		let Some(class) = element.get_attribute("class") else {
			continue;
		};
		let kept: Vec<&str> = class
			.split_whitespace()
			.filter(|token| !token.starts_with("max-w-"))
			.collect();
		element.set_attribute("class", &kept.join(" "))?;
	}
	Ok(())
}

#[cfg(target_arch = "wasm32")]
fn apply_body_state(region: &Element, fragment: &Fragment) -> Result<InstalledAttrs, JsValue> {
	let mut installed = InstalledAttrs::default();
	let class_list = region.class_list();
	for class in &fragment.body_classes {
		if !class_list.contains(class) {
			class_list.add_1(class)?;
			installed.classes.push(class.clone());
		}
	}
	for (name, value) in &fragment.body_attrs {
		if region.get_attribute(name).is_none() {
			region.set_attribute(name, value)?;
			installed.attrs.push(name.clone());
		}
	}
	Ok(installed)
}
