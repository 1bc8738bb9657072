/* src/core/rust/src/lib.rs */

pub mod data;
pub mod errors;
pub mod fetcher;
pub mod payload;
pub mod route;
pub mod site;
pub mod view;

// Re-exports for ergonomic use
pub use data::{PageData, Record, identity_string};
pub use errors::{Result, TandemError};
pub use fetcher::{BoxFuture, FetchFn, FetcherDef, FetcherRegistry, Identity};
pub use payload::{EncodeOptions, decode_page_data, encode_page_data};
pub use route::{MatchResult, Params, Route, RouteTable, split_path};
pub use site::{FailureFn, Site, SiteBuilder};
pub use tandem_engine;
pub use view::{RenderContext, Shell, View, ViewStatus};
