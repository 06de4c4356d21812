//! Capped in-memory article feed.
//!
//! Each news manager owns one [`NewsFeed`]. Articles are stored newest
//! first and the oldest are dropped once the feed holds [`FEED_LIMIT`].

use std::collections::VecDeque;

use serde::Serialize;
use tactics_types::{ArticleId, NewsArticle, NewsCategory, NpcId};
use tracing::{debug, info};

/// Maximum articles kept per feed.
pub const FEED_LIMIT: usize = 50;

/// Log a freshly written article.
///
/// Live play reports at `info`. Catch-up replays can write hundreds of
/// stories at once, so those drop to `debug`.
pub fn announce(desk: &'static str, article: &NewsArticle, quiet: bool) {
    let country = article.country_code.as_deref().unwrap_or("-");
    if quiet {
        debug!(desk, headline = %article.headline, country, "Published");
    } else {
        info!(desk, headline = %article.headline, country, "Published");
    }
}

/// Published articles, newest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsFeed {
    articles: VecDeque<NewsArticle>,
}

impl NewsFeed {
    /// An empty feed.
    pub const fn new() -> Self {
        Self {
            articles: VecDeque::new(),
        }
    }

    /// Publish an article.
    ///
    /// If the feed exceeds [`FEED_LIMIT`], the oldest article is removed.
    pub fn push(&mut self, article: NewsArticle) {
        self.articles.push_front(article);
        self.articles.truncate(FEED_LIMIT);
    }

    /// Number of articles held.
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Whether nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Every article, newest first.
    pub fn all(&self) -> impl Iterator<Item = &NewsArticle> {
        self.articles.iter()
    }

    /// The `limit` newest articles.
    pub fn latest(&self, limit: usize) -> impl Iterator<Item = &NewsArticle> {
        self.articles.iter().take(limit)
    }

    /// Look up one article.
    pub fn get(&self, id: ArticleId) -> Option<&NewsArticle> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Articles in one section of the paper.
    pub fn by_category(&self, category: NewsCategory) -> impl Iterator<Item = &NewsArticle> {
        self.articles.iter().filter(move |a| a.category == category)
    }

    /// Articles about one country.
    pub fn by_country<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a NewsArticle> {
        self.articles
            .iter()
            .filter(move |a| a.country_code.as_deref() == Some(code))
    }

    /// Articles that mention an NPC.
    pub fn mentioning(&self, npc: NpcId) -> impl Iterator<Item = &NewsArticle> {
        self.articles
            .iter()
            .filter(move |a| a.related_npcs.contains(&npc))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use tactics_core::clock::game_time_at;
    use tactics_types::Severity;

    use super::*;

    fn article(headline: &str, category: NewsCategory, country: Option<&str>) -> NewsArticle {
        NewsArticle {
            id: ArticleId::new(),
            headline: headline.to_owned(),
            body: String::new(),
            category,
            severity: Severity::Normal,
            country_code: country.map(str::to_owned),
            related_npcs: Vec::new(),
            published_at: game_time_at(0),
        }
    }

    #[test]
    fn newest_article_comes_first() {
        let mut feed = NewsFeed::new();
        feed.push(article("first", NewsCategory::World, None));
        feed.push(article("second", NewsCategory::World, None));
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.all().next().unwrap().headline, "second");
        assert_eq!(feed.latest(1).count(), 1);
    }

    #[test]
    fn feed_caps_at_limit() {
        let mut feed = NewsFeed::new();
        for i in 0..FEED_LIMIT + 10 {
            feed.push(article(&format!("story {i}"), NewsCategory::Economy, None));
        }
        assert_eq!(feed.len(), FEED_LIMIT);
        assert_eq!(feed.all().next().unwrap().headline, "story 59");
        assert_eq!(feed.all().last().unwrap().headline, "story 10");
    }

    #[test]
    fn filters_by_category_country_and_npc() {
        let mut feed = NewsFeed::new();
        let npc = NpcId::new();
        let mut obituary = article("obituary", NewsCategory::People, Some("JP"));
        obituary.related_npcs.push(npc);
        let id = obituary.id;
        feed.push(obituary);
        feed.push(article("markets", NewsCategory::Economy, Some("US")));
        feed.push(article("arrest", NewsCategory::Crime, Some("JP")));

        assert_eq!(feed.by_category(NewsCategory::Economy).count(), 1);
        assert_eq!(feed.by_country("JP").count(), 2);
        assert_eq!(feed.by_country("BR").count(), 0);
        assert_eq!(feed.mentioning(npc).next().unwrap().id, id);
        assert_eq!(feed.get(id).unwrap().headline, "obituary");
        assert!(feed.get(ArticleId::new()).is_none());
    }

    #[test]
    fn serializes_newest_first_for_the_ui() {
        let mut feed = NewsFeed::new();
        feed.push(article("older", NewsCategory::Crime, Some("MX")));
        feed.push(article("newer", NewsCategory::Economy, None));
        let json = serde_json::to_value(&feed).unwrap();
        let articles = json["articles"].as_array().unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0]["headline"], "newer");
        assert_eq!(articles[0]["category"], "economy");
        assert_eq!(articles[1]["country_code"], "MX");
    }
}
