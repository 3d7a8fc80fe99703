mod fetch;
mod fs;
mod json;

pub use fetch::{Fetch, Fetched, MemFetcher};
#[cfg(feature = "download")]
pub use fetch::HttpFetcher;
pub use fs::{write_atomically, PendingWrite};
pub(crate) use json::*;
