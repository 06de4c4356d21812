//! News coverage of the living world.
//!
//! The news layer sits at the end of the manager order. It reads the
//! events every other manager emits and read-only views of the economy
//! and the character registry, and turns them into [`NewsArticle`]s. It
//! emits nothing, so no other manager depends on it.
//!
//! # Modules
//!
//! - [`feed`] -- [`NewsFeed`]: capped, newest-first article store
//! - [`economic_news`] -- [`EconomicNews`]: price events and market condition changes
//! - [`npc_news`] -- [`NpcNews`]: newsworthy life events
//! - [`world_news`] -- [`WorldNews`]: world simulation events
//!
//! [`NewsArticle`]: tactics_types::NewsArticle

pub mod economic_news;
pub mod feed;
pub mod npc_news;
pub mod world_news;

pub use economic_news::EconomicNews;
pub use feed::NewsFeed;
pub use npc_news::NpcNews;
pub use world_news::WorldNews;
