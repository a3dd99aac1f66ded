pub mod batch;
pub mod enrich;
pub mod error;
pub mod normalize;
pub mod resolve;

#[cfg(test)]
mod testing;

pub use batch::{run_public, BatchOptions, BatchRunner, PUBLIC_EMBED_STRATEGY};
pub use enrich::{apply_insights, enrich};
pub use error::{PipelineError, ResolutionError};
pub use normalize::{normalize, truncate_caption, NormalizeOptions, Source};
pub use resolve::{resolve_account, resolve_post, AccountOutcome, ListingStrategy, MediaStrategy};
