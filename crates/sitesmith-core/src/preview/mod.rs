//! Sandboxed live preview.
//!
//! [`SandboxRenderer`] turns a file tree into a self-contained document meant
//! for an `<iframe sandbox="allow-scripts">`. A shim injected into that
//! document reports failures to the host over `postMessage`; the host feeds
//! the raw messages to [`PreviewSession::receive`], which checks them against
//! the live sandbox instance before they reach the [`ErrorCollector`].

mod bridge;
mod collector;
mod error;
pub(crate) mod markup;
mod renderer;
mod session;

pub use bridge::{BRIDGE_DISCRIMINATOR, BridgeMessage, BridgePayload, BridgeRejection, accept};
pub use collector::ErrorCollector;
pub use error::{PreviewError, PreviewErrorKind};
pub use renderer::{
    MISSING_MARKUP_PLACEHOLDER, RenderedPreview, SandboxInstance, SandboxInstanceId,
    SandboxPolicy, SandboxRenderer,
};
pub use session::PreviewSession;
