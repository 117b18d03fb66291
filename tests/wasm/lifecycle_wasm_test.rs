//! Browser-side tests for fragment extraction, installation and the
//! artifact lifecycle.
//!
//! Run with: `wasm-pack test --chrome --headless`

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use wasm_bindgen_test::*;
use web_sys::{Document, DomParser, Element, SupportedType};

use webropol_shell::router::{
	ARTIFACT_ATTR, ArtifactSet, ExtractionStrategy, fetch::extract_fragment,
	install::{InstalledAttrs, install_fragment, remove_installed, reparent_modals},
	lifecycle::{attach_scripts, attach_styles},
};
use webropol_shell::{RoutePath, RouteTable, Router, ShellContext};

wasm_bindgen_test_configure!(run_in_browser);

fn parse(html: &str) -> Document {
	DomParser::new()
		.unwrap()
		.parse_from_string(html, SupportedType::TextHtml)
		.unwrap()
}

fn live_document() -> Document {
	web_sys::window().unwrap().document().unwrap()
}

fn make_region(document: &Document) -> Element {
	let region = document.create_element("div").unwrap();
	document.body().unwrap().append_child(&region).unwrap();
	region
}

fn artifact_count(document: &Document) -> u32 {
	document
		.query_selector_all(&format!("[{ARTIFACT_ATTR}]"))
		.unwrap()
		.length()
}

#[wasm_bindgen_test]
fn extracts_primary_region() {
	let doc = parse("<html><body><main><h1>Surveys</h1></main></body></html>");
	let fragment = extract_fragment(&doc).unwrap();
	assert_eq!(fragment.strategy, ExtractionStrategy::PrimaryRegion);
	assert!(fragment.root.inner_html().contains("Surveys"));
}

#[wasm_bindgen_test]
fn preserves_shared_sidebar_layout() {
	let doc = parse(
		"<html><body><div class=\"flex gap-4\"><aside>filters</aside>\
		 <main>list</main></div></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	assert_eq!(fragment.strategy, ExtractionStrategy::SharedSidebarLayout);
	assert!(fragment.root.inner_html().contains("filters"));
	assert!(fragment.root.inner_html().contains("list"));
}

#[wasm_bindgen_test]
fn fallback_strips_shell_elements() {
	let doc = parse(
		"<html><body><webropol-header></webropol-header>\
		 <div id=\"content\">standalone</div></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	assert_eq!(fragment.strategy, ExtractionStrategy::BodyFallback);
	let html = fragment.root.inner_html();
	assert!(html.contains("standalone"));
	assert!(!html.contains("webropol-header"));
}

#[wasm_bindgen_test]
fn extraction_drops_inline_scripts_from_fragment() {
	let doc = parse("<html><body><main><script>1</script><p>x</p></main></body></html>");
	let fragment = extract_fragment(&doc).unwrap();
	assert!(!fragment.root.inner_html().contains("script"));
}

#[wasm_bindgen_test]
fn install_rewrites_internal_links_and_assets() {
	let ctx = ShellContext::platform_default();
	let live = live_document();
	let region = make_region(&live);

	let doc = parse(
		"<html><body><main>\
		 <a id=\"in\" href=\"list.html?x=1\">list</a>\
		 <a id=\"out\" href=\"mailto:a@b.c\">mail</a>\
		 <img id=\"logo\" src=\"img/logo.svg\">\
		 </main></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	install_fragment(&region, &fragment, "/surveys", &ctx).unwrap();

	let internal = region.query_selector("#in").unwrap().unwrap();
	assert_eq!(
		internal.get_attribute("href").as_deref(),
		Some("#/surveys/list?x=1")
	);
	let external = region.query_selector("#out").unwrap().unwrap();
	assert_eq!(external.get_attribute("href").as_deref(), Some("mailto:a@b.c"));
	let logo = region.query_selector("#logo").unwrap().unwrap();
	assert_eq!(
		logo.get_attribute("src").as_deref(),
		Some("/surveys/img/logo.svg")
	);
	region.remove();
}

#[wasm_bindgen_test]
fn install_applies_and_removes_body_state_additively() {
	let ctx = ShellContext::platform_default();
	let live = live_document();
	let region = make_region(&live);
	region.set_attribute("class", "shell-owned").unwrap();

	let doc = parse(
		"<html><body class=\"surveys-page shell-owned\" x-data=\"{open:false}\">\
		 <main>x</main></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	let installed = install_fragment(&region, &fragment, "/", &ctx).unwrap();

	assert!(region.class_list().contains("surveys-page"));
	assert!(region.has_attribute("x-data"));
	// Only the additions are recorded; shell-owned state is not.
	assert_eq!(installed.classes, vec!["surveys-page".to_string()]);

	remove_installed(&region, &installed);
	assert!(!region.class_list().contains("surveys-page"));
	assert!(region.class_list().contains("shell-owned"));
	assert!(!region.has_attribute("x-data"));
	region.remove();
}

#[wasm_bindgen_test]
fn install_strips_max_width_caps() {
	let ctx = ShellContext::platform_default();
	let live = live_document();
	let region = make_region(&live);

	let doc = parse(
		"<html><body><main><div id=\"wrap\" class=\"max-w-7xl mx-auto\">x</div>\
		 </main></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	install_fragment(&region, &fragment, "/", &ctx).unwrap();

	let wrap = region.query_selector("#wrap").unwrap().unwrap();
	let class = wrap.get_attribute("class").unwrap();
	assert!(!class.contains("max-w-7xl"));
	assert!(class.contains("mx-auto"));
	region.remove();
}

#[wasm_bindgen_test]
fn artifact_generations_do_not_accumulate() {
	let live = live_document();
	let before = artifact_count(&live);

	let first = parse(
		"<html><head><style>.a{color:red}</style>\
		 <style>.b{color:blue}</style></head><body><main>x</main></body></html>",
	);
	let mut generation = ArtifactSet::new();
	attach_styles(&first, &live, &mut generation).unwrap();
	assert_eq!(artifact_count(&live), before + 2);

	// Next navigation: previous generation torn down first.
	generation.teardown();
	assert_eq!(artifact_count(&live), before);

	let second = parse("<html><head><style>.c{}</style></head><body><main>y</main></body></html>");
	let mut generation = ArtifactSet::new();
	attach_styles(&second, &live, &mut generation).unwrap();
	assert_eq!(artifact_count(&live), before + 1);
	generation.teardown();
}

#[wasm_bindgen_test]
fn teardown_tolerates_already_detached_nodes() {
	let live = live_document();
	let doc = parse("<html><head><style>.x{}</style></head><body></body></html>");
	let mut generation = ArtifactSet::new();
	attach_styles(&doc, &live, &mut generation).unwrap();

	// Something else removed the node first.
	let node = live
		.query_selector(&format!("style[{ARTIFACT_ATTR}]"))
		.unwrap()
		.unwrap();
	node.remove();
	generation.teardown();
}

#[wasm_bindgen_test]
fn external_scripts_inject_once_per_session() {
	let ctx = ShellContext::platform_default();
	let live = live_document();

	let route_a = parse("<html><body><script src=\"/assets/charts.js\"></script></body></html>");
	let mut gen_a = ArtifactSet::new();
	attach_scripts(&route_a, &live, "/surveys", &ctx, &mut gen_a).unwrap();
	assert_eq!(gen_a.len(), 1);
	gen_a.teardown();

	// A different route referencing the same URL.
	let route_b = parse("<html><body><script src=\"/assets/charts.js\"></script></body></html>");
	let mut gen_b = ArtifactSet::new();
	attach_scripts(&route_b, &live, "/events", &ctx, &mut gen_b).unwrap();
	assert_eq!(gen_b.len(), 0);
	assert_eq!(ctx.loaded_script_count(), 1);
}

#[wasm_bindgen_test]
fn shared_and_config_scripts_are_skipped() {
	let ctx = ShellContext::platform_default();
	let live = live_document();

	let doc = parse(
		"<html><body>\
		 <script src=\"/design-system/components.js\"></script>\
		 <script>tailwind.config = {};</script>\
		 <script>document.title = document.title;</script>\
		 </body></html>",
	);
	let mut generation = ArtifactSet::new();
	attach_scripts(&doc, &live, "/", &ctx, &mut generation).unwrap();

	// Only the plain inline script is injected.
	assert_eq!(generation.len(), 1);
	assert_eq!(ctx.loaded_script_count(), 0);
	generation.teardown();
}

#[wasm_bindgen_test]
fn stylesheets_already_present_are_not_duplicated() {
	let live = live_document();
	let head = live.head().unwrap();
	let existing = live.create_element("link").unwrap();
	existing.set_attribute("rel", "stylesheet").unwrap();
	existing.set_attribute("href", "/css/shared.css").unwrap();
	head.append_child(&existing).unwrap();

	let doc = parse(
		"<html><head><link rel=\"stylesheet\" href=\"/css/shared.css\"></head>\
		 <body></body></html>",
	);
	let mut generation = ArtifactSet::new();
	attach_styles(&doc, &live, &mut generation).unwrap();
	assert!(generation.is_empty());

	let copies = live
		.query_selector_all("link[href='/css/shared.css']")
		.unwrap();
	assert_eq!(copies.length(), 1);
	existing.remove();
}

#[wasm_bindgen_test]
fn out_of_band_modals_are_reparented_once() {
	let ctx = ShellContext::platform_default();
	let live = live_document();
	let region = make_region(&live);

	let doc = parse(
		"<html><body><main>content</main>\
		 <dialog id=\"oob-dialog\">confirm?</dialog></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	assert_eq!(fragment.strategy, ExtractionStrategy::PrimaryRegion);
	install_fragment(&region, &fragment, "/", &ctx).unwrap();
	let mut artifacts = ArtifactSet::new();
	reparent_modals(&fragment, &live, &ctx, &mut artifacts).unwrap();

	assert_eq!(artifacts.len(), 1);
	assert_eq!(
		live.query_selector_all("dialog#oob-dialog").unwrap().length(),
		1
	);
	assert!(region.query_selector("dialog").unwrap().is_none());
	artifacts.teardown();
	region.remove();
}

#[wasm_bindgen_test]
fn sidebar_layout_sibling_modals_are_not_duplicated() {
	let ctx = ShellContext::platform_default();
	let live = live_document();
	let region = make_region(&live);

	// The dialog sits next to <main> inside the flex parent, so it is
	// installed with the fragment and must not arrive a second time.
	let doc = parse(
		"<html><body><div class=\"flex\"><aside>filters</aside>\
		 <main>list</main><dialog id=\"flex-dialog\">sure?</dialog>\
		 </div></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	assert_eq!(fragment.strategy, ExtractionStrategy::SharedSidebarLayout);
	install_fragment(&region, &fragment, "/", &ctx).unwrap();
	let mut artifacts = ArtifactSet::new();
	reparent_modals(&fragment, &live, &ctx, &mut artifacts).unwrap();

	assert!(artifacts.is_empty());
	assert_eq!(
		live.query_selector_all("dialog#flex-dialog").unwrap().length(),
		1
	);
	assert!(region.query_selector("dialog#flex-dialog").unwrap().is_some());
	region.remove();
}

#[wasm_bindgen_test]
fn data_page_main_descendant_modals_stay_with_fragment() {
	let ctx = ShellContext::platform_default();
	let live = live_document();
	let region = make_region(&live);

	let doc = parse(
		"<html><body><div data-page-main>\
		 <dialog id=\"dpm-dialog\">edit</dialog></div></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	assert_eq!(fragment.strategy, ExtractionStrategy::PrimaryRegion);
	install_fragment(&region, &fragment, "/", &ctx).unwrap();
	let mut artifacts = ArtifactSet::new();
	reparent_modals(&fragment, &live, &ctx, &mut artifacts).unwrap();

	assert!(artifacts.is_empty());
	assert_eq!(
		live.query_selector_all("dialog#dpm-dialog").unwrap().length(),
		1
	);
	region.remove();
}

#[wasm_bindgen_test]
fn fallback_extraction_never_reparents_modals() {
	let ctx = ShellContext::platform_default();
	let live = live_document();
	let region = make_region(&live);

	// No primary region: the whole body (dialog included) is the
	// fragment, so re-parenting would duplicate every modal.
	let doc = parse(
		"<html><body><div>standalone</div>\
		 <dialog id=\"fb-dialog\">sure?</dialog></body></html>",
	);
	let fragment = extract_fragment(&doc).unwrap();
	assert_eq!(fragment.strategy, ExtractionStrategy::BodyFallback);
	install_fragment(&region, &fragment, "/", &ctx).unwrap();
	let mut artifacts = ArtifactSet::new();
	reparent_modals(&fragment, &live, &ctx, &mut artifacts).unwrap();

	assert!(artifacts.is_empty());
	assert_eq!(
		live.query_selector_all("dialog#fb-dialog").unwrap().length(),
		1
	);
	region.remove();
}

fn make_app_region(live: &Document) -> Element {
	let region = live.create_element("div").unwrap();
	region.set_id("app-content");
	live.body().unwrap().append_child(&region).unwrap();
	region
}

fn platform_router() -> Rc<Router> {
	Rc::new(Router::new(
		Rc::new(ShellContext::platform_default()),
		RouteTable::platform_default(),
	))
}

#[wasm_bindgen_test]
async fn failed_fetch_renders_inline_error_block() {
	let live = live_document();
	let region = make_app_region(&live);

	let router = platform_router();
	router.load(RoutePath::parse("/no-such-page")).await;

	let text = region.text_content().unwrap_or_default();
	assert!(text.contains("Failed to load /no-such-page"));
	assert_eq!(router.current_route().route, "/no-such-page");
	region.remove();
}

#[wasm_bindgen_test]
async fn error_block_treats_hash_text_as_text() {
	let live = live_document();
	let region = make_app_region(&live);

	let router = platform_router();
	router
		.load(RoutePath::parse("/bad/<img src=x onerror=fail()>"))
		.await;

	// The offending hash must show up as text, never as markup.
	assert!(region.query_selector("img").unwrap().is_none());
	let text = region.text_content().unwrap_or_default();
	assert!(text.contains("Failed to load"));
	assert!(text.contains("<img"));
	region.remove();
}

#[wasm_bindgen_test]
fn installed_attrs_default_region_untouched() {
	let live = live_document();
	let region = make_region(&live);
	region.set_attribute("class", "shell").unwrap();
	remove_installed(&region, &InstalledAttrs::default());
	assert_eq!(region.get_attribute("class").as_deref(), Some("shell"));
	region.remove();
}
