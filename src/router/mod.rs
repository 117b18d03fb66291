//! Route-driven content swapper.
//!
//! The shell's client-side navigation controller: hash-based routes
//! resolve to static source documents whose content fragments are
//! fetched, rewritten and installed into the persistent shell without
//! a full page reload.
//!
//! Components, leaves first:
//!
//! - [`table`]: static route → document mapping (pure data)
//! - [`resolve`]: hash/href parsing and route-to-file resolution
//! - [`fetch`]: document retrieval and fragment extraction
//! - [`install`]: content-region swap, link/asset rewriting
//! - [`lifecycle`]: per-route style/script/modal generations
//! - [`nav`]: breadcrumb and active-section derivation
//! - [`core`]: the facade state machine tying them together

pub mod core;
pub mod fetch;
pub mod install;
pub mod lifecycle;
pub mod nav;
pub mod resolve;
pub mod table;

pub use self::core::{NavPhase, Router, RouterError};
pub use fetch::{ExtractionStrategy, FetchError, select_strategy};
pub use install::{HrefRewrite, InstalledAttrs, absolutize_asset, rewrite_href};
pub use lifecycle::{ARTIFACT_ATTR, is_global_config_inline};
pub use nav::{Crumb, active_section, breadcrumb_trail, section_label};
pub use resolve::{RoutePath, hash_to_route, href_to_route, query_param, route_to_file};
pub use table::RouteTable;

#[cfg(target_arch = "wasm32")]
pub use fetch::Fragment;
#[cfg(target_arch = "wasm32")]
pub use lifecycle::ArtifactSet;
