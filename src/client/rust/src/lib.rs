/* src/client/rust/src/lib.rs */

pub mod app;
pub mod bootstrap;

pub use app::{ClientApp, ClientOptions, FetchOutcome, PendingFetch, Settled, hydrate_document};
pub use bootstrap::EmbeddedPayload;
pub use tandem_core;
