//! Comic information cache.
//!
//! Two layers sit in front of the retailer's product pages:
//!
//! - **Expiry map**: authoritative; one entry per normalized URL, treated as
//!   absent once it is older than the configured TTL.
//! - **Memo**: bounded LRU beneath it. It may evict on its own and never
//!   serves anything the expiry map would consider stale.
//!
//! Neither lock is held while the retailer is being fetched, so concurrent
//! requests for the same URL can both reach the scraper.

mod clock;
mod config;
mod keys;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::{CacheKey, normalize_url};
pub use store::{
    ComicInfoCache, METRIC_CACHE_FETCH_ERROR, METRIC_CACHE_HIT,
    METRIC_CACHE_MEMO_EVICT, METRIC_CACHE_MEMO_HIT, METRIC_CACHE_MISS,
};
