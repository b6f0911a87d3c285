//! mfe-shell: a micro-frontend host. Navigation in, embedded frames out.
//!
//! # Architecture
//!
//! ```text
//! Shell (entry point)
//!   │
//!   ├── AppContext (config, feature toggles, auth state, children cache)
//!   │
//!   ├── RoutingController ── History (hash or path mode)
//!   │     ├── PathResolver (path → PathData, redirects)
//!   │     │     └── AccessFilter (toggles, anonymous access, custom resolver)
//!   │     ├── NavViewBuilder (top / left / tab nav view-models)
//!   │     └── ModalStack (open modals, LIFO close)
//!   │
//!   ├── FrameLifecycleManager (reuse / pool / create / retire)
//!   │     ├── FrameSurface (content wrapper: mount, hide, remove, postMessage)
//!   │     └── TimerQueue (navigate-ok fallback, page-error timers)
//!   │
//!   ├── CommunicationBridge (frame events → router / UX calls)
//!   │
//!   └── Connector (presentation layer: navs, modals, alerts, indicators)
//! ```
//!
//! # Host loop
//!
//! | Host event | Method |
//! |------------|--------|
//! | page load | `shell.start()` |
//! | hashchange / popstate | `shell.on_location_change()` |
//! | frame `load` | `shell.on_frame_loaded(id)` |
//! | frame postMessage | `shell.dispatch_wire(id, payload)` |
//! | elapsed time | `shell.advance_timers(ms)` |
//!
//! # Features
//!
//! - `native` - tokio timer driver, tracing subscriber, CLI
//! - `wasm` - browser history adapter, JS bindings
//!
//! # Usage
//!
//! ```ignore
//! use mfe_shell::{MemoryHistory, NavigationNode, Shell, ShellConfig};
//! use std::rc::Rc;
//!
//! let config = ShellConfig::new(vec![
//!     NavigationNode::new("home").with_view_url("https://apps.example.com/home"),
//! ]);
//! let shell = Shell::new(config, connector, Rc::new(MemoryHistory::new("/")));
//! shell.start().await?;              // redirects "" → "home", mounts the frame
//! shell.navigate("/home?~tab=2").await;
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod auth;
pub mod bridge;
pub mod clock;
pub mod config;
pub mod connector;
pub mod context;
pub mod core;
pub mod error;
pub mod frames;
pub mod modal;
pub mod navigation;
pub mod routing;
pub mod shell;
pub mod ux;

// =============================================================================
// Native-only modules (CLI, tokio)
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod runtime;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use auth::{AuthData, IdpProvider};
pub use bridge::{AlertHandler, AlertOutcome, ConfirmationHandler, InboundEvent};
pub use clock::TimerQueue;
pub use config::ShellConfig;
pub use connector::{AlertSettings, ConfirmationSettings, Connector, ModalSettings};
pub use context::AppContext;
pub use error::{AuthError, ConfigError, ShellError, ShellResult};
pub use frames::{FrameId, FrameSurface, MemorySurface, Slot};
pub use modal::{ModalEntry, ModalStack};
pub use navigation::{NavigationNode, PathData, PathResolver};
pub use routing::{History, MemoryHistory, NavigateOptions, RouteOutcome};
pub use shell::Shell;

// =============================================================================
// Re-exports: Native
// =============================================================================
#[cfg(feature = "native")]
pub use runtime::{drive_timers, Shutdown};

// =============================================================================
// Re-exports: WASM
// =============================================================================
#[cfg(feature = "wasm")]
pub use wasm::BrowserHistory;
