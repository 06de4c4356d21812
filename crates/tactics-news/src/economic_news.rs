//! Business-page coverage of the markets.
//!
//! Every price event becomes an article as soon as it is published. Once
//! a day the manager also compares each country's market condition with
//! the one it last reported and writes a story when it changed. The first
//! daily check only records the opening conditions.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager};
use tactics_types::{
    ArticleId, BoundaryKind, GameTime, MarketCondition, NewsArticle, NewsCategory, PriceEvent,
    PriceEventType, Severity, SimEvent,
};
use tactics_world::DynamicEconomy;
use tactics_world::starting_world;
use tracing::debug;

use crate::feed::{NewsFeed, announce};

/// Registry name of the economic news manager.
pub const ECONOMIC_NEWS: &str = "economic_news";

/// How prominently a price event runs.
pub const fn price_event_severity(kind: PriceEventType) -> Severity {
    match kind {
        PriceEventType::Coup | PriceEventType::CivilWar | PriceEventType::NaturalDisaster => {
            Severity::Critical
        }
        PriceEventType::Sanctions
        | PriceEventType::CurrencyCrisis
        | PriceEventType::Recession
        | PriceEventType::WarNearby => Severity::Major,
        PriceEventType::ArmsDeal
        | PriceEventType::TradeAgreement
        | PriceEventType::Boom
        | PriceEventType::Peacetime => Severity::Normal,
    }
}

fn price_event_body(kind: PriceEventType, country: &str) -> String {
    match kind {
        PriceEventType::Coup => format!(
            "The military takeover in {country} has flooded local markets with surplus \
             equipment. Weapons and ammunition prices have dropped as armories are emptied. \
             Analysts expect the glut to last until the new government stabilizes."
        ),
        PriceEventType::CivilWar => format!(
            "Ongoing conflict in {country} has created critical shortages of essential \
             supplies. Medical supplies and weapons have doubled in price as demand outstrips \
             supply. Aid organizations are struggling to keep deliveries moving."
        ),
        PriceEventType::Sanctions => format!(
            "International sanctions against {country} are beginning to bite. Electronics \
             and vehicles are increasingly hard to source and prices are climbing. The embargo \
             is expected to hold until diplomatic relations improve."
        ),
        PriceEventType::NaturalDisaster => format!(
            "A natural disaster has struck {country}, creating urgent demand for medical \
             supplies. Prices for essential goods have spiked as relief efforts mobilize."
        ),
        PriceEventType::ArmsDeal => format!(
            "A major arms deal has put surplus military equipment on the {country} market. \
             Defense contractors are offloading inventory at reduced prices."
        ),
        PriceEventType::CurrencyCrisis => format!(
            "The {country} economy is reeling from a currency crisis. As the local currency \
             collapses, prices in dollar terms have dropped sharply. Economists warn of further \
             instability."
        ),
        PriceEventType::Boom => format!(
            "{country} is experiencing an economic boom and demand for goods is surging. \
             Prices have risen as buyers compete for limited inventory."
        ),
        PriceEventType::Recession => format!(
            "Recession has gripped {country}, forcing prices downward. Consumer demand has \
             collapsed, leaving merchants with excess inventory."
        ),
        PriceEventType::WarNearby => format!(
            "Conflict in neighboring regions is affecting markets in {country}. Demand for \
             weapons and protective equipment has increased sharply."
        ),
        PriceEventType::Peacetime => format!(
            "Peace has returned to {country}, stabilizing local markets. Prices for weapons \
             and ammunition have begun to normalize."
        ),
        PriceEventType::TradeAgreement => format!(
            "Economic conditions in {country} are shifting after a new trade agreement. \
             Prices are adjusting as supply and demand settle."
        ),
    }
}

/// Lowercase name used in article bodies.
pub const fn condition_label(condition: MarketCondition) -> &'static str {
    match condition {
        MarketCondition::Boom => "boom",
        MarketCondition::Normal => "normal",
        MarketCondition::Recession => "recession",
        MarketCondition::Crisis => "crisis",
        MarketCondition::Shortage => "shortage",
        MarketCondition::Flooded => "flooded",
    }
}

const fn condition_headlines(condition: MarketCondition) -> &'static [&'static str] {
    match condition {
        MarketCondition::Boom => &[
            "Economic Boom Drives Consumer Spending",
            "Markets Surge on Strong Growth",
            "Prosperity Returns: Economy Thriving",
        ],
        MarketCondition::Normal => &[
            "Markets Stabilize After Volatility",
            "Economy Returns to Normal",
            "Steady Growth Expected",
        ],
        MarketCondition::Recession => &[
            "Recession Fears Grip Economy",
            "Downturn Deepens: Markets Struggle",
            "Economic Contraction Continues",
        ],
        MarketCondition::Crisis => &[
            "Economic Crisis: Markets in Freefall",
            "Emergency Measures as Economy Collapses",
            "Crisis Deepens: Desperate Times",
        ],
        MarketCondition::Shortage => &[
            "Supply Shortages Create Panic Buying",
            "Critical Goods Running Low",
            "Shortages Drive Prices Sky High",
        ],
        MarketCondition::Flooded => &[
            "Market Glut: Prices Plummet",
            "Oversupply Creates Buyer's Market",
            "Excess Inventory Forces Discounts",
        ],
    }
}

fn country_name(code: &str) -> &str {
    starting_world::country(code).map_or(code, |country| country.name)
}

/// Article covering a price event.
pub fn price_article<R: Rng + ?Sized>(rng: &mut R, event: &PriceEvent) -> NewsArticle {
    NewsArticle {
        id: ArticleId::from_rng(rng),
        headline: event.headline.clone(),
        body: price_event_body(event.kind, country_name(&event.country_code)),
        category: NewsCategory::Economy,
        severity: price_event_severity(event.kind),
        country_code: Some(event.country_code.clone()),
        related_npcs: Vec::new(),
        published_at: event.at,
    }
}

/// Article covering a change of market condition, `None` when nothing changed.
pub fn condition_article<R: Rng + ?Sized>(
    rng: &mut R,
    country_code: &str,
    from: MarketCondition,
    to: MarketCondition,
    at: GameTime,
) -> Option<NewsArticle> {
    if from == to {
        return None;
    }
    let name = country_name(country_code);
    let headline = condition_headlines(to).choose(rng).copied().unwrap_or_default();
    let severity = match to {
        MarketCondition::Crisis | MarketCondition::Shortage => Severity::Major,
        MarketCondition::Boom | MarketCondition::Flooded => Severity::Normal,
        MarketCondition::Normal | MarketCondition::Recession => Severity::Minor,
    };
    Some(NewsArticle {
        id: ArticleId::from_rng(rng),
        headline: format!("{name}: {headline}"),
        body: format!(
            "Economic conditions in {name} have shifted from {} to {}. Local businesses are \
             adapting to the new market environment.",
            condition_label(from),
            condition_label(to),
        ),
        category: NewsCategory::Economy,
        severity,
        country_code: Some(country_code.to_owned()),
        related_npcs: Vec::new(),
        published_at: at,
    })
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct EconomicNewsUpdate {
    articles: Vec<NewsArticle>,
    conditions: Vec<(String, MarketCondition)>,
    quiet: bool,
}

/// Writes economy articles from price events and market condition changes.
#[derive(Debug, Clone, Default)]
pub struct EconomicNews {
    feed: NewsFeed,
    conditions: BTreeMap<String, MarketCondition>,
}

impl EconomicNews {
    /// A manager that has published nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Published articles.
    pub const fn feed(&self) -> &NewsFeed {
        &self.feed
    }

    /// Last market condition reported for a country.
    pub fn reported_condition(&self, country_code: &str) -> Option<MarketCondition> {
        self.conditions.get(country_code).copied()
    }
}

impl SimulationManager for EconomicNews {
    type Update = EconomicNewsUpdate;

    fn name(&self) -> &'static str {
        ECONOMIC_NEWS
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<EconomicNewsUpdate, ManagerError> {
        let now = *ctx.now();
        let mut update = EconomicNewsUpdate {
            quiet: ctx.is_catching_up(),
            ..EconomicNewsUpdate::default()
        };

        let price_events: Vec<&PriceEvent> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Price(price) => Some(price.as_ref()),
                _ => None,
            })
            .collect();
        for event in price_events {
            update.articles.push(price_article(ctx.rng(), event));
        }

        if ctx.kind() == BoundaryKind::Day {
            if let Some(economy) = ctx.upstream::<DynamicEconomy>() {
                for (code, market) in economy.markets() {
                    match self.conditions.get(code) {
                        Some(&reported) if reported == market.condition => {}
                        Some(&reported) => {
                            if let Some(article) =
                                condition_article(ctx.rng(), code, reported, market.condition, now)
                            {
                                update.articles.push(article);
                            }
                            update.conditions.push((code.to_owned(), market.condition));
                        }
                        None => update.conditions.push((code.to_owned(), market.condition)),
                    }
                }
            } else {
                debug!("Economy not running; skipping market condition check");
            }
        }
        Ok(update)
    }

    fn commit(&mut self, update: EconomicNewsUpdate) {
        for (code, condition) in update.conditions {
            self.conditions.insert(code, condition);
        }
        for article in update.articles {
            announce(ECONOMIC_NEWS, &article, update.quiet);
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
    use tactics_types::PriceEventId;
    use tactics_world::PriceFluctuation;
    use tactics_world::economy::ECONOMY;
    use tactics_world::prices::PRICE_FLUCTUATION;

    use super::*;

    fn quiet_engine() -> TimeEngine {
        let mut config = SimulationConfig::default();
        config.economy.condition_change_chance = 0.0;
        let mut engine = TimeEngine::new(&config);
        engine
            .subscribe(DynamicEconomy::new(&config, game_time_at(0)))
            .unwrap();
        engine.subscribe(PriceFluctuation::new()).unwrap();
        engine.subscribe(EconomicNews::new()).unwrap();
        for name in [ECONOMY, PRICE_FLUCTUATION, ECONOMIC_NEWS] {
            engine.start(name).unwrap();
        }
        engine
    }

    #[test]
    fn price_article_names_the_country() {
        let event = PriceEvent {
            id: PriceEventId::new(),
            kind: PriceEventType::Sanctions,
            country_code: "RU".to_owned(),
            at: game_time_at(90),
            duration_days: 60,
            market_condition: None,
            effects: Vec::new(),
            headline: "Sanctions Bite".to_owned(),
            source_event: None,
        };
        let article = price_article(&mut StdRng::seed_from_u64(1), &event);
        let russia = starting_world::country("RU").unwrap();
        assert_eq!(article.headline, "Sanctions Bite");
        assert!(article.body.contains(russia.name));
        assert_eq!(article.category, NewsCategory::Economy);
        assert_eq!(article.severity, Severity::Major);
        assert_eq!(article.country_code.as_deref(), Some("RU"));
        assert_eq!(article.published_at.total_minutes, 90);
    }

    #[test]
    fn unchanged_condition_writes_nothing() {
        let mut rng = StdRng::seed_from_u64(2);
        let at = game_time_at(0);
        let steady =
            condition_article(&mut rng, "US", MarketCondition::Boom, MarketCondition::Boom, at);
        assert!(steady.is_none());

        let crash =
            condition_article(&mut rng, "US", MarketCondition::Boom, MarketCondition::Crisis, at)
                .unwrap();
        assert_eq!(crash.severity, Severity::Major);
        assert!(crash.body.contains("from boom to crisis"));
        let us = starting_world::country("US").unwrap();
        assert!(crash.headline.starts_with(us.name));
    }

    #[test]
    fn triggered_price_event_is_reported_immediately() {
        let mut engine = quiet_engine();
        engine
            .manager_mut::<PriceFluctuation>()
            .unwrap()
            .trigger(PriceEventType::CivilWar, "BR")
            .unwrap();
        engine.advance_hours(1.0).unwrap();

        let news = engine.manager::<EconomicNews>().unwrap();
        let article = news.feed().all().next().unwrap();
        assert_eq!(article.country_code.as_deref(), Some("BR"));
        assert_eq!(article.severity, Severity::Critical);
        assert_eq!(article.published_at.total_minutes, 60);
    }

    #[test]
    fn first_check_records_then_changes_are_reported() {
        let mut engine = quiet_engine();
        engine.advance_hours(24.0).unwrap();
        let news = engine.manager::<EconomicNews>().unwrap();
        let opening = news.reported_condition("US").unwrap();
        assert_ne!(opening, MarketCondition::Flooded);
        assert!(news.feed().is_empty());

        // A coup floods the market; the economy applies it on the next
        // boundary and the following daily check reports it.
        engine
            .manager_mut::<PriceFluctuation>()
            .unwrap()
            .trigger(PriceEventType::Coup, "US")
            .unwrap();
        engine.advance_hours(24.0).unwrap();

        let news = engine.manager::<EconomicNews>().unwrap();
        assert_eq!(news.reported_condition("US"), Some(MarketCondition::Flooded));
        assert_eq!(news.feed().by_country("US").count(), 2);
        let latest = news.feed().all().next().unwrap();
        assert!(latest.body.contains("to flooded"));
        assert_eq!(latest.published_at.total_minutes, 2 * 1_440);
    }
}
