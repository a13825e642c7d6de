//! Content browser core for a simulated smart-glasses hub.
//!
//! The crate is built around three pieces:
//!
//! - [`RedditController`] — a four-state view controller (feeds, posts,
//!   comments, single-comment detail) that paginates content onto a
//!   three-slot glass display and maps tap / double-tap / swipe gestures
//!   onto transitions and re-renders.
//! - [`RedditClient`] — the content fetcher, talking to the upstream
//!   listing API through a request-forwarding proxy with retry and linear
//!   backoff, implementing the [`ContentSource`] seam.
//! - [`HubBridge`] — the black-box host contract (page rendering and
//!   key-value storage) the controller renders through; fetched listings
//!   are memoized behind it by a best-effort [`TtlCache`].
//!
//! # Quick Start
//!
//! ```no_run
//! use glassfeed_client::{
//!     HubBridge, HubEvent, PageSpec, RedditClient, RedditController, Result,
//! };
//!
//! struct NullBridge;
//!
//! impl HubBridge for NullBridge {
//!     fn create_startup_page(&mut self, _spec: &PageSpec) -> Result<i32> {
//!         Ok(0)
//!     }
//!     fn rebuild_page(&mut self, _spec: &PageSpec) -> Result<()> {
//!         Ok(())
//!     }
//!     fn get_local_storage(&mut self, _key: &str) -> Result<Option<String>> {
//!         Ok(None)
//!     }
//!     fn set_local_storage(&mut self, _key: &str, _value: &str) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let client = RedditClient::new("http://127.0.0.1:5173/__reddit_proxy").unwrap();
//! let mut controller = RedditController::new(NullBridge, client);
//! controller.init().unwrap();
//! // Click the third feed entry on the selector list.
//! controller.handle_event(&HubEvent::list_click(2)).unwrap();
//! ```

pub mod bridge;
pub mod cache;
pub mod client;
pub mod controller;
pub mod error;
pub mod models;

mod util;

// Re-export the main public types at the crate root for convenience.
pub use bridge::{
    normalize_gesture, DeviceStatus, Gesture, HubBridge, HubEvent, ListContainer, ListEvent,
    PageSpec, SysEvent, TextContainer, TextEvent, SCREEN_HEIGHT, SCREEN_WIDTH,
};
pub use cache::TtlCache;
pub use client::{help_post, ContentSource, RedditClient};
pub use controller::{ControllerConfig, RedditController, ViewState};
pub use error::{GlassFeedError, Result};
pub use models::{Comment, FeedOption, Post, FEED_OPTIONS};
