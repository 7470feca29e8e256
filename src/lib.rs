pub mod api;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;

pub use error::{PriceSyncError, Result};
pub use pipeline::Config;
