//! Front-page coverage of world events.
//!
//! Every event the world simulation publishes becomes an article on the
//! boundary it happens. The event category picks the section of the paper
//! and a stock paragraph that follows the event's own description.

use rand::Rng;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager};
use tactics_types::{
    ArticleId, NewsArticle, NewsCategory, SimEvent, WorldEvent, WorldEventCategory,
};
use tactics_world::starting_world;

use crate::feed::{NewsFeed, announce};

/// Registry name of the world news manager.
pub const WORLD_NEWS: &str = "world_news";

/// Section of the paper a world event runs in.
pub const fn section_for(category: WorldEventCategory) -> NewsCategory {
    match category {
        WorldEventCategory::GangTerritory | WorldEventCategory::CrimeWave => NewsCategory::Crime,
        WorldEventCategory::Political | WorldEventCategory::Military => NewsCategory::Politics,
        WorldEventCategory::Economic => NewsCategory::Economy,
        WorldEventCategory::Superhuman => NewsCategory::Superhuman,
        WorldEventCategory::NaturalDisaster | WorldEventCategory::Social => NewsCategory::Local,
    }
}

fn follow_up(category: WorldEventCategory, place: &str, country: &str) -> String {
    match category {
        WorldEventCategory::GangTerritory => format!(
            "Local authorities are responding to reports of increased gang activity in the \
             {place} area. Residents are advised to exercise caution. Police have increased \
             patrols in affected neighborhoods."
        ),
        WorldEventCategory::Political => format!(
            "Political developments continue to unfold in {country}. Observers are monitoring \
             the situation closely. International response remains measured as events develop."
        ),
        WorldEventCategory::Economic => format!(
            "Financial markets are reacting to the latest economic indicators from {country}. \
             Analysts suggest this could impact regional trade. Businesses are adjusting their \
             strategies accordingly."
        ),
        WorldEventCategory::CrimeWave => format!(
            "Law enforcement in {place} is responding to a spike in criminal activity. Citizens \
             are urged to report suspicious behavior. Additional resources have been allocated \
             to address the situation."
        ),
        WorldEventCategory::Superhuman => format!(
            "Superhuman activity was detected in the {place} metropolitan area. Authorities are \
             assessing the situation and potential threat level. LSW response protocols have \
             been activated."
        ),
        WorldEventCategory::NaturalDisaster => format!(
            "Emergency services are responding to a natural disaster affecting the {place} \
             region. Evacuation orders may be in effect for certain areas. Relief efforts are \
             being coordinated with local authorities."
        ),
        WorldEventCategory::Military => format!(
            "Military activity in {country} has drawn international attention. Defense analysts \
             are evaluating potential implications. Diplomatic channels remain open."
        ),
        WorldEventCategory::Social => format!(
            "Social unrest continues in {place} as citizens express their concerns. Authorities \
             are monitoring the situation. Both peaceful and disruptive elements have been \
             reported."
        ),
    }
}

/// Article covering a world event.
///
/// The event's severity carries over unchanged, so a critical event runs
/// as breaking news.
pub fn world_article<R: Rng + ?Sized>(rng: &mut R, event: &WorldEvent) -> NewsArticle {
    let country = starting_world::country(&event.country_code)
        .map_or(event.country_code.as_str(), |profile| profile.name);
    let place = event.city.as_deref().unwrap_or(country);
    let stock = follow_up(event.category, place, country);
    let body = if event.description.is_empty() {
        stock
    } else {
        format!("{} {stock}", event.description)
    };
    NewsArticle {
        id: ArticleId::from_rng(rng),
        headline: event.headline.clone(),
        body,
        category: section_for(event.category),
        severity: event.severity,
        country_code: Some(event.country_code.clone()),
        related_npcs: Vec::new(),
        published_at: event.created_at,
    }
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct WorldNewsUpdate {
    articles: Vec<NewsArticle>,
    quiet: bool,
}

/// Writes an article for every world event.
#[derive(Debug, Clone, Default)]
pub struct WorldNews {
    feed: NewsFeed,
}

impl WorldNews {
    /// A manager that has published nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Published articles.
    pub const fn feed(&self) -> &NewsFeed {
        &self.feed
    }

    /// Articles about one country.
    pub fn for_country<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a NewsArticle> {
        self.feed.by_country(code)
    }
}

impl SimulationManager for WorldNews {
    type Update = WorldNewsUpdate;

    fn name(&self) -> &'static str {
        WORLD_NEWS
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<WorldNewsUpdate, ManagerError> {
        let events: Vec<&WorldEvent> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::World(world) => Some(world.as_ref()),
                _ => None,
            })
            .collect();
        let mut articles = Vec::with_capacity(events.len());
        for event in events {
            articles.push(world_article(ctx.rng(), event));
        }
        Ok(WorldNewsUpdate {
            articles,
            quiet: ctx.is_catching_up(),
        })
    }

    fn commit(&mut self, update: WorldNewsUpdate) {
        for article in update.articles {
            announce(WORLD_NEWS, &article, update.quiet);
            self.feed.push(article);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tactics_core::clock::game_time_at;
    use tactics_core::{SimulationConfig, TimeEngine};
    use tactics_types::{Prominence, Severity, WorldEventId};
    use tactics_world::WorldSimulation;
    use tactics_world::world_sim::WORLD_SIMULATION;

    use super::*;

    fn event(category: WorldEventCategory, city: Option<&str>, severity: Severity) -> WorldEvent {
        WorldEvent {
            id: WorldEventId::new(),
            category,
            country_code: "NG".to_owned(),
            city: city.map(str::to_owned),
            severity,
            headline: "Something Happened".to_owned(),
            description: "Something happened. Reported from Nigeria.".to_owned(),
            effects: Vec::new(),
            created_at: game_time_at(120),
            expires_at: None,
        }
    }

    fn engine(config: &SimulationConfig) -> TimeEngine {
        let mut engine = TimeEngine::new(config);
        engine.subscribe(WorldSimulation::new(config)).unwrap();
        engine.subscribe(WorldNews::new()).unwrap();
        for name in [WORLD_SIMULATION, WORLD_NEWS] {
            engine.start(name).unwrap();
        }
        engine
    }

    #[test]
    fn every_category_has_a_section() {
        assert_eq!(section_for(WorldEventCategory::GangTerritory), NewsCategory::Crime);
        assert_eq!(section_for(WorldEventCategory::CrimeWave), NewsCategory::Crime);
        assert_eq!(section_for(WorldEventCategory::Military), NewsCategory::Politics);
        assert_eq!(section_for(WorldEventCategory::Economic), NewsCategory::Economy);
        assert_eq!(section_for(WorldEventCategory::Superhuman), NewsCategory::Superhuman);
        assert_eq!(section_for(WorldEventCategory::Social), NewsCategory::Local);
        assert_eq!(section_for(WorldEventCategory::NaturalDisaster), NewsCategory::Local);
    }

    #[test]
    fn city_events_are_reported_from_the_city() {
        let mut rng = StdRng::seed_from_u64(3);
        let riot = world_article(
            &mut rng,
            &event(WorldEventCategory::Social, Some("Lagos"), Severity::Normal),
        );
        assert!(riot.body.starts_with("Something happened. Reported from Nigeria. "));
        assert!(riot.body.contains("Social unrest continues in Lagos"));
        assert_eq!(riot.country_code.as_deref(), Some("NG"));
        assert_eq!(riot.published_at.total_minutes, 120);

        let nigeria = starting_world::country("NG").unwrap();
        let coup = world_article(
            &mut rng,
            &event(WorldEventCategory::Military, None, Severity::Critical),
        );
        assert!(coup.body.contains(&format!("Military activity in {}", nigeria.name)));
        assert_eq!(coup.prominence(), Prominence::Breaking);
        assert_eq!(coup.category, NewsCategory::Politics);
    }

    #[test]
    fn scheduled_event_makes_the_paper_the_same_hour() {
        let mut config = SimulationConfig::default();
        config.world_events = tactics_core::config::WorldEventRates {
            gang_territory: 0.0,
            political: 0.0,
            economic: 0.0,
            crime_wave: 0.0,
            superhuman: 0.0,
            natural_disaster: 0.0,
            military: 0.0,
            social: 0.0,
        };
        let mut engine = engine(&config);
        engine
            .manager_mut::<WorldSimulation>()
            .unwrap()
            .schedule(event(WorldEventCategory::Superhuman, Some("Lagos"), Severity::Major))
            .unwrap();
        engine.advance_hours(1.0).unwrap();

        let news = engine.manager::<WorldNews>().unwrap();
        assert_eq!(news.feed().len(), 1);
        let article = news.for_country("NG").next().unwrap();
        assert_eq!(article.category, NewsCategory::Superhuman);
        assert_eq!(article.severity, Severity::Major);
        assert!(!article.is_breaking());
    }

    #[test]
    fn every_generated_event_gets_an_article() {
        let mut engine = engine(&SimulationConfig::default());
        engine.advance_hours(336.0).unwrap();

        let world = engine.manager::<WorldSimulation>().unwrap();
        let news = engine.manager::<WorldNews>().unwrap();
        let events: Vec<&str> = world
            .recent_events(10)
            .map(|event| event.headline.as_str())
            .collect();
        let articles: Vec<&str> = news
            .feed()
            .latest(10)
            .map(|article| article.headline.as_str())
            .collect();
        assert!(!events.is_empty());
        assert_eq!(events, articles);
    }
}
