pub mod browser;
pub mod driver;
pub mod error;
pub mod fetch;
pub mod price;
pub mod resolve;
pub mod stats;
pub mod store;

pub use browser::{Browser, HttpBrowser, Page};
pub use driver::{run, RunReport};
pub use error::{ScrapeError, StoreError};
pub use resolve::{plan_work, resolve_url, ResolvedTarget};
