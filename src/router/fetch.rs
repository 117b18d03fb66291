//! Source-document fetching and fragment extraction.
//!
//! Every navigation re-fetches its source document with no-store
//! semantics; freshness is traded for the absence of a cache layer.
//! The fetched document is parsed off-tree and the relevant content
//! fragment extracted through a small ordered list of named
//! strategies rather than ad hoc selector chains.

use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, DomParser, Element, Request, RequestCache, RequestInit, Response, SupportedType};

/// Fetch/parse failures surfaced by the router as an inline error
/// block; they never escape the facade.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
	/// The network request itself failed.
	#[error("network request failed: {0}")]
	Network(String),
	/// The server answered with a non-OK status.
	#[error("request returned HTTP {0}")]
	Status(u16),
	/// The response body could not be read as text.
	#[error("response body unreadable")]
	MissingBody,
	/// The body could not be parsed into a document.
	#[error("failed to parse document: {0}")]
	Parse(String),
}

/// How the content fragment is extracted from a fetched document,
/// evaluated in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
	/// The document defines a primary content region.
	PrimaryRegion,
	/// A secondary sidebar shares a flex container with the primary
	/// region; both are preserved together.
	SharedSidebarLayout,
	/// No primary region: best-effort body extraction with shell
	/// elements stripped from the clone.
	BodyFallback,
}

/// Selects the extraction strategy from the document's shape.
pub fn select_strategy(has_primary: bool, has_shared_sidebar: bool) -> ExtractionStrategy {
	match (has_primary, has_shared_sidebar) {
		(true, true) => ExtractionStrategy::SharedSidebarLayout,
		(true, false) => ExtractionStrategy::PrimaryRegion,
		(false, _) => ExtractionStrategy::BodyFallback,
	}
}

/// Selector for a document's primary content region.
#[cfg(target_arch = "wasm32")]
const PRIMARY_SELECTOR: &str = "main, [data-page-main]";

/// Shell elements stripped from fallback extractions so they are
/// never duplicated into the live shell.
#[cfg(target_arch = "wasm32")]
const SHELL_SELECTOR: &str =
	"webropol-header, webropol-sidebar, webropol-breadcrumbs, header[data-shell], nav[data-shell]";

/// The extracted content fragment plus the body-level state that must
/// be re-applied to the shell's content region.
#[cfg(target_arch = "wasm32")]
#[derive(Debug)]
pub struct Fragment {
	/// Strategy that produced this fragment.
	pub strategy: ExtractionStrategy,
	/// Detached root element whose children get installed.
	pub root: Element,
	/// Element in `source` that `root` was cloned from. Modals inside
	/// it already arrive with the fragment and must not be re-parented
	/// a second time.
	pub origin: Element,
	/// Non-class body attributes of the fetched document (e.g.
	/// reactive-scope declarations).
	pub body_attrs: Vec<(String, String)>,
	/// Body classes of the fetched document.
	pub body_classes: Vec<String>,
	/// The fully parsed source document, kept for style/script/modal
	/// processing.
	pub source: Document,
}

/// Fetches `file` with no-store cache semantics and parses it into a
/// detached document.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_document(file: &str) -> Result<Document, FetchError> {
	let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".to_string()))?;

	let opts = RequestInit::new();
	opts.set_method("GET");
	opts.set_cache(RequestCache::NoStore);
	let request = Request::new_with_str_and_init(file, &opts)
		.map_err(|err| FetchError::Network(js_error_text(&err)))?;

	let response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|err| FetchError::Network(js_error_text(&err)))?;
	let response: Response = response.dyn_into().map_err(|_| FetchError::MissingBody)?;
	if !response.ok() {
		return Err(FetchError::Status(response.status()));
	}

	let text = JsFuture::from(response.text().map_err(|_| FetchError::MissingBody)?)
		.await
		.map_err(|_| FetchError::MissingBody)?;
	let text = text.as_string().ok_or(FetchError::MissingBody)?;

	let parser =
		DomParser::new().map_err(|err| FetchError::Parse(js_error_text(&err)))?;
	parser
		.parse_from_string(&text, SupportedType::TextHtml)
		.map_err(|err| FetchError::Parse(js_error_text(&err)))
}

/// Extracts the content fragment from a parsed document.
///
/// Script elements are dropped from the extracted clone; the
/// lifecycle manager owns script injection and an inert copy inside
/// the region would only shadow it.
#[cfg(target_arch = "wasm32")]
pub fn extract_fragment(doc: &Document) -> Result<Fragment, FetchError> {
	let primary = doc
		.query_selector(PRIMARY_SELECTOR)
		.map_err(|err| FetchError::Parse(js_error_text(&err)))?;

	let shared_sidebar = match &primary {
		Some(main) => main
			.parent_element()
			.map(|parent| {
				let flex = parent
					.get_attribute("class")
					.map(|class| class.split_whitespace().any(|token| token == "flex"))
					.unwrap_or(false);
				let aside = parent
					.query_selector("aside")
					.ok()
					.flatten()
					.is_some();
				flex && aside
			})
			.unwrap_or(false),
		None => false,
	};

	let strategy = select_strategy(primary.is_some(), shared_sidebar);
	let (origin, root) = match strategy {
		ExtractionStrategy::PrimaryRegion => {
			let origin = primary.ok_or(FetchError::MissingBody)?;
			let root = clone_element(&origin)?;
			(origin, root)
		}
		ExtractionStrategy::SharedSidebarLayout => {
			let origin = primary
				.as_ref()
				.and_then(|main| main.parent_element())
				.ok_or(FetchError::MissingBody)?;
			let root = clone_element(&origin)?;
			(origin, root)
		}
		ExtractionStrategy::BodyFallback => {
			let origin: Element = doc.body().ok_or(FetchError::MissingBody)?.into();
			let root = clone_element(&origin)?;
			strip_matching(&root, SHELL_SELECTOR)?;
			(origin, root)
		}
	};
	strip_matching(&root, "script")?;

	let (body_attrs, body_classes) = match doc.body() {
		Some(body) => capture_body_state(&body.into()),
		None => (Vec::new(), Vec::new()),
	};

	Ok(Fragment {
		strategy,
		root,
		origin,
		body_attrs,
		body_classes,
		source: doc.clone(),
	})
}

#[cfg(target_arch = "wasm32")]
fn clone_element(element: &Element) -> Result<Element, FetchError> {
	element
		.clone_node_with_deep(true)
		.map_err(|err| FetchError::Parse(js_error_text(&err)))?
		.dyn_into::<Element>()
		.map_err(|_| FetchError::Parse("clone is not an element".to_string()))
}

#[cfg(target_arch = "wasm32")]
fn strip_matching(root: &Element, selector: &str) -> Result<(), FetchError> {
	let nodes = root
		.query_selector_all(selector)
		.map_err(|err| FetchError::Parse(js_error_text(&err)))?;
	for index in 0..nodes.length() {
		if let Some(node) = nodes.item(index) {
			if let Ok(element) = node.dyn_into::<Element>() {
				element.remove();
			}
		}
	}
	Ok(())
}

#[cfg(target_arch = "wasm32")]
fn capture_body_state(body: &Element) -> (Vec<(String, String)>, Vec<String>) {
	let mut attrs = Vec::new();
	let attributes = body.attributes();
	for index in 0..attributes.length() {
		if let Some(attr) = attributes.item(index) {
			if attr.name() != "class" {
				attrs.push((attr.name(), attr.value()));
			}
		}
	}
	let classes = body
		.get_attribute("class")
		.map(|class| class.split_whitespace().map(str::to_string).collect())
		.unwrap_or_default();
	(attrs, classes)
}

#[cfg(target_arch = "wasm32")]
fn js_error_text(err: &JsValue) -> String {
	err.as_string()
		.unwrap_or_else(|| format!("{err:?}"))
}
