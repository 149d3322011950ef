//! Flamegraph chart
//!
//! Binds a span dataset to a renderer and exposes the operations a viewer
//! offers: load a file selection, search, clear, click-to-zoom, reset zoom
//! and node details.

pub mod config;
pub mod renderer;
pub mod session;

pub use config::{ChartConfig, ConfigError, Ease};
pub use renderer::{ChartDocument, FlamegraphRenderer, JsonRenderer, RenderError, TextRenderer, MAX_DOCUMENT_DEPTH};
pub use session::{ChartSession, LoadTicket, SessionError};
