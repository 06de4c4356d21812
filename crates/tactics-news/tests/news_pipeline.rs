//! End-to-end coverage of the news layer driven by the real world managers.

#![allow(clippy::unwrap_used)]

use tactics_agents::life_events::LIFE_EVENTS;
use tactics_agents::mercenary::MERCENARY_POOL;
use tactics_agents::registry::CHARACTER_REGISTRY;
use tactics_agents::{CharacterRegistry, LifeEvents, MercenaryPool};
use tactics_core::clock::game_time_at;
use tactics_core::config::WorldEventRates;
use tactics_core::{SimulationConfig, TimeEngine};
use tactics_news::economic_news::ECONOMIC_NEWS;
use tactics_news::npc_news::NPC_NEWS;
use tactics_news::world_news::WORLD_NEWS;
use tactics_news::{EconomicNews, NpcNews, WorldNews};
use tactics_types::{NewsCategory, Prominence, Severity};
use tactics_world::economy::ECONOMY;
use tactics_world::prices::PRICE_FLUCTUATION;
use tactics_world::world_sim::WORLD_SIMULATION;
use tactics_world::{DynamicEconomy, PriceFluctuation, WorldSimulation};

fn disaster_only() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world_events = WorldEventRates {
        gang_territory: 0.0,
        political: 0.0,
        economic: 0.0,
        crime_wave: 0.0,
        superhuman: 0.0,
        natural_disaster: 1.0,
        military: 0.0,
        social: 0.0,
    };
    config
}

fn world_engine(config: &SimulationConfig) -> TimeEngine {
    let mut engine = TimeEngine::new(config);
    engine.subscribe(CharacterRegistry::new(config)).unwrap();
    engine.subscribe(MercenaryPool::new()).unwrap();
    engine.subscribe(LifeEvents::new()).unwrap();
    engine.subscribe(WorldSimulation::new(config)).unwrap();
    engine
        .subscribe(DynamicEconomy::new(config, game_time_at(0)))
        .unwrap();
    engine.subscribe(PriceFluctuation::new()).unwrap();
    engine.subscribe(WorldNews::new()).unwrap();
    engine.subscribe(EconomicNews::new()).unwrap();
    engine.subscribe(NpcNews::new()).unwrap();
    for name in [
        CHARACTER_REGISTRY,
        MERCENARY_POOL,
        LIFE_EVENTS,
        WORLD_SIMULATION,
        ECONOMY,
        PRICE_FLUCTUATION,
        WORLD_NEWS,
        ECONOMIC_NEWS,
        NPC_NEWS,
    ] {
        engine.start(name).unwrap();
    }
    engine
}

#[test]
fn disasters_reach_the_business_page() {
    let config = disaster_only();
    let mut engine = world_engine(&config);
    engine.advance_hours(24.0 * 10.0).unwrap();

    let prices = engine.manager::<PriceFluctuation>().unwrap();
    let news = engine.manager::<EconomicNews>().unwrap();
    assert!(prices.history(usize::MAX).count() > 0);
    for event in prices.history(10) {
        let article = news
            .feed()
            .by_country(&event.country_code)
            .find(|article| article.headline == event.headline && article.published_at == event.at)
            .unwrap();
        assert_eq!(article.category, NewsCategory::Economy);
        assert_eq!(article.severity, Severity::Critical);
    }
}

#[test]
fn disasters_make_the_local_page_the_hour_they_strike() {
    let config = disaster_only();
    let mut engine = world_engine(&config);
    engine.advance_hours(24.0 * 10.0).unwrap();

    let world = engine.manager::<WorldSimulation>().unwrap();
    let news = engine.manager::<WorldNews>().unwrap();
    let events: Vec<_> = world.recent_events(usize::MAX).collect();
    assert!(!events.is_empty());
    assert_eq!(news.feed().len(), events.len().min(tactics_news::feed::FEED_LIMIT));
    for (event, article) in events.iter().zip(news.feed().all()) {
        assert_eq!(article.headline, event.headline);
        assert_eq!(article.published_at, event.created_at);
        assert_eq!(article.category, NewsCategory::Local);
        assert_eq!(article.severity, event.severity);
        assert_eq!(article.prominence(), Prominence::from_severity(event.severity));
        assert!(article.body.starts_with(&event.description));
    }
}

#[test]
fn feeds_stay_capped_over_a_long_run() {
    let config = disaster_only();
    let mut engine = world_engine(&config);
    engine.catch_up(24.0 * 120.0).unwrap();

    let economic = engine.manager::<EconomicNews>().unwrap();
    let people = engine.manager::<NpcNews>().unwrap();
    let world = engine.manager::<WorldNews>().unwrap();
    assert_eq!(world.feed().len(), tactics_news::feed::FEED_LIMIT);
    assert!(economic.feed().len() <= tactics_news::feed::FEED_LIMIT);
    assert!(people.feed().len() <= tactics_news::feed::FEED_LIMIT);
    assert!(!economic.feed().is_empty());

    // Newest first.
    let stamps: Vec<u64> = economic
        .feed()
        .all()
        .map(|article| article.published_at.total_minutes)
        .collect();
    assert!(stamps.windows(2).all(|pair| pair.first() >= pair.last()));
}

#[test]
fn sequential_and_catch_up_runs_publish_the_same_news() {
    let config = disaster_only();
    let mut stepped = world_engine(&config);
    for _ in 0..(24 * 6) {
        stepped.advance_hours(1.0).unwrap();
    }
    let mut caught_up = world_engine(&config);
    caught_up.catch_up(24.0 * 6.0).unwrap();

    let headlines = |engine: &TimeEngine| -> Vec<String> {
        let economic = engine.manager::<EconomicNews>().unwrap().feed().all();
        let world = engine.manager::<WorldNews>().unwrap().feed().all();
        economic
            .chain(world)
            .map(|article| article.headline.clone())
            .collect()
    };
    assert!(!headlines(&stepped).is_empty());
    assert_eq!(headlines(&stepped), headlines(&caught_up));
}
