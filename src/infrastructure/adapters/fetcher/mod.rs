//! Media Fetcher Adapters

mod fake_fetcher;
mod http_fetcher;

pub use fake_fetcher::FakeMediaFetcher;
pub use http_fetcher::{HttpMediaFetcher, HttpMediaFetcherConfig};
