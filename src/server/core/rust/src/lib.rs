/* src/server/core/rust/src/lib.rs */

pub mod pipeline;

pub use pipeline::{Contribution, PipelineOptions, RenderPipeline};
pub use tandem_core;
pub use tandem_engine::{AssetKind, AssetRef, SerializedPayload};
