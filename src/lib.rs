//! Webropol Shell - hash-routed SPA shell for the survey platform.
//!
//! The persistent page structure (header, sidebar, content region)
//! survives across navigations; this crate swaps the content region
//! when the hash changes, fetching static source documents and
//! installing their content fragments in place.
//!
//! ## Architecture
//!
//! - [`router`]: the route-driven content swapper — route table, path
//!   resolver, fetcher, installer, script/style lifecycle and the
//!   facade state machine
//! - [`context`]: the injected runtime context (base prefix, shell
//!   selectors, shared-script registry, settings hook)
//! - [`logging`]: console logging macros for WASM and native targets
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use webropol_shell::{Router, RouteTable, ShellContext};
//!
//! let ctx = Rc::new(ShellContext::platform_default().base_prefix("/webropol"));
//! let router = Rc::new(Router::new(ctx, RouteTable::platform_default()));
//! router.mount()?;
//! ```
//!
//! After each successful installation the shell dispatches a
//! `spa-route-change` event (`detail: {path, queryString}`) on the
//! window for external collaborators such as analytics.

#![warn(missing_docs)]

pub mod context;
pub mod logging;
pub mod router;

pub use context::ShellContext;
pub use router::{
	Crumb, NavPhase, RoutePath, RouteTable, Router, RouterError, active_section,
	breadcrumb_trail, hash_to_route, href_to_route, query_param, route_to_file,
};

/// Boots the shell router: installs the optional panic hook, mounts
/// listeners and seeds the initial route.
#[cfg(target_arch = "wasm32")]
pub fn boot(
	ctx: ShellContext,
	table: RouteTable,
) -> Result<std::rc::Rc<Router>, RouterError> {
	#[cfg(feature = "console_error_panic_hook")]
	console_error_panic_hook::set_once();

	let router = std::rc::Rc::new(Router::new(std::rc::Rc::new(ctx), table));
	std::rc::Rc::clone(&router).mount()?;
	Ok(router)
}
