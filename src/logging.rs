//! Logging abstraction layer.
//!
//! Console-backed logging macros that work across WASM and native
//! targets. All macros compile to no-ops in release builds;
//! `debug_log!` additionally requires the `debug-hooks` feature.
//!
//! | Macro | Debug assertions | Feature | WASM | Non-WASM |
//! |-------|------------------|---------|------|----------|
//! | `debug_log!` | Required | `debug-hooks` | `console.debug` | `eprintln!` |
//! | `info_log!` | Required | None | `console.info` | `eprintln!` |
//! | `warn_log!` | Required | None | `console.warn` | `eprintln!` |
//! | `error_log!` | Required | None | `console.error` | `eprintln!` |

/// Logs a debug message (requires `debug-hooks` + `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks", target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		web_sys::console::debug_1(&format!($($arg)*).into());
	}};
}

/// Logs a debug message (requires `debug-hooks` + `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks", not(target_arch = "wasm32")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		eprintln!("[DEBUG] {}", format!($($arg)*));
	}};
}

/// No-op debug_log when conditions are not met.
#[macro_export]
#[cfg(not(all(debug_assertions, feature = "debug-hooks")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message (requires `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		web_sys::console::info_1(&format!($($arg)*).into());
	}};
}

/// Logs an info message (requires `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		eprintln!("[INFO] {}", format!($($arg)*));
	}};
}

/// No-op info_log in release builds.
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! info_log {
	($($arg:tt)*) => {{}};
}

/// Logs a warning message (requires `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		web_sys::console::warn_1(&format!($($arg)*).into());
	}};
}

/// Logs a warning message (requires `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		eprintln!("[WARN] {}", format!($($arg)*));
	}};
}

/// No-op warn_log in release builds.
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! warn_log {
	($($arg:tt)*) => {{}};
}

/// Logs an error message (requires `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		web_sys::console::error_1(&format!($($arg)*).into());
	}};
}

/// Logs an error message (requires `debug_assertions`).
#[macro_export]
#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		eprintln!("[ERROR] {}", format!($($arg)*));
	}};
}

/// No-op error_log in release builds.
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! error_log {
	($($arg:tt)*) => {{}};
}
