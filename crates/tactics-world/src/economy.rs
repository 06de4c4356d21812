//! Dynamic economy: per-country markets and floating exchange rates.
//!
//! Each roster country has one market. A market has a condition (boom,
//! recession, shortage, ...), a supply and a demand level per goods
//! category on a 0-100 scale with 50 as normal, and a stack of temporary
//! price modifiers left behind by price events.
//!
//! # Daily cycle
//!
//! 1. Supply and demand take a random step of up to half the configured
//!    fluctuation either way, clamped to 0-100.
//! 2. With a small chance the market condition flips to normal, boom, or
//!    recession.
//! 3. Supply and demand revert a fixed fraction of their distance to 50.
//! 4. Every currency but the dollar takes a volatility-scaled random step
//!    and then inflates by a 365th of its annual rate.
//! 5. Modifiers past their expiry are dropped.
//!
//! # Pricing
//!
//! A quote multiplies the condition factor, the supply/demand factor
//! `clamp(1 + (50 - supply)/100 + (demand - 50)/100, 0.5, 2.0)`, every
//! live modifier, and for non-dollar countries an inflation discount of
//! `1 - inflation / 2`.

use std::collections::{BTreeMap, VecDeque};

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::Serialize;
use tactics_core::config::EconomyConfig;
use tactics_core::{BoundaryContext, ManagerError, SimulationConfig, SimulationManager, StartContext};
use tactics_types::{
    BoundaryKind, GameTime, GoodsCategory, MarketCondition, PriceEvent, PriceEventId, SimEvent,
};
use tracing::{debug, info, warn};

use crate::error::WorldError;
use crate::prices::expires_at_minute;
use crate::starting_world::{self, ANCHOR_CURRENCY, COUNTRIES, CURRENCIES, CountryProfile};

/// Registry name of the economy manager.
pub const ECONOMY: &str = "economy";

/// Number of player trades kept.
pub const TRADE_LIMIT: usize = 100;

/// Neutral supply or demand level.
const NEUTRAL_LEVEL: f64 = 50.0;

/// Conditions a market can drift into on its own.
const DRIFT_CONDITIONS: [MarketCondition; 3] = [
    MarketCondition::Normal,
    MarketCondition::Boom,
    MarketCondition::Recession,
];

/// Price factor from supply and demand, in `[0.5, 2.0]`.
///
/// Full supply with no demand halves the price; no supply with full demand
/// doubles it.
pub fn supply_demand_multiplier(supply: f64, demand: f64) -> f64 {
    let supply_effect = (NEUTRAL_LEVEL - supply) / 100.0;
    let demand_effect = (demand - NEUTRAL_LEVEL) / 100.0;
    (1.0 + supply_effect + demand_effect).clamp(0.5, 2.0)
}

const fn clamp_level(level: f64) -> f64 {
    level.clamp(0.0, 100.0)
}

/// A temporary or permanent price multiplier on one goods category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceModifier {
    /// Price multiplier.
    pub multiplier: f64,
    /// Why the modifier exists.
    pub reason: String,
    /// Minute after which the modifier is dropped; `None` is permanent.
    pub expires_at: Option<u64>,
    /// Price event that created the modifier.
    pub source: Option<PriceEventId>,
}

/// One country's market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Market {
    /// Country the market belongs to.
    pub country_code: String,
    /// Overall market condition.
    pub condition: MarketCondition,
    /// Supply per goods category, 0-100.
    pub supply: BTreeMap<GoodsCategory, f64>,
    /// Demand per goods category, 0-100.
    pub demand: BTreeMap<GoodsCategory, f64>,
    /// Live price modifiers per goods category.
    pub modifiers: BTreeMap<GoodsCategory, Vec<PriceModifier>>,
    /// Last time the market changed.
    pub last_updated: GameTime,
}

impl Market {
    /// Opening market for a roster country.
    pub fn for_country(country: &CountryProfile, now: GameTime) -> Self {
        let condition = if country.gdp_per_capita > 70 && country.political_stability > 60 {
            MarketCondition::Boom
        } else if country.political_stability < 30 {
            MarketCondition::Crisis
        } else if country.gdp_per_capita < 30 {
            MarketCondition::Recession
        } else {
            MarketCondition::Normal
        };

        let unrest = f64::from(100_i32.saturating_sub(country.political_stability));
        let mut supply = BTreeMap::new();
        let mut demand = BTreeMap::new();
        for category in GoodsCategory::ALL {
            let (s, d) = match category {
                GoodsCategory::Weapons | GoodsCategory::Ammunition | GoodsCategory::Explosives => (
                    (30.0 + f64::from(country.military_strength) / 2.0).min(80.0),
                    NEUTRAL_LEVEL + unrest / 4.0,
                ),
                GoodsCategory::Medical => (
                    (20.0 + f64::from(country.healthcare)).min(80.0),
                    NEUTRAL_LEVEL + f64::from(100_i32.saturating_sub(country.healthcare)) / 4.0,
                ),
                GoodsCategory::Electronics => (
                    (20.0 + f64::from(country.science_technology)).min(80.0),
                    NEUTRAL_LEVEL,
                ),
                GoodsCategory::Contraband => (
                    (20.0 + f64::from(country.corruption)).min(80.0),
                    40.0 + f64::from(100_i32.saturating_sub(country.law_enforcement)) / 4.0,
                ),
                GoodsCategory::Armor | GoodsCategory::Vehicles => (NEUTRAL_LEVEL, NEUTRAL_LEVEL),
            };
            supply.insert(category, clamp_level(s));
            demand.insert(category, clamp_level(d));
        }

        Self {
            country_code: country.code.to_owned(),
            condition,
            supply,
            demand,
            modifiers: BTreeMap::new(),
            last_updated: now,
        }
    }

    /// Supply of a category, 50 when untracked.
    pub fn supply_of(&self, category: GoodsCategory) -> f64 {
        self.supply.get(&category).copied().unwrap_or(NEUTRAL_LEVEL)
    }

    /// Demand for a category, 50 when untracked.
    pub fn demand_of(&self, category: GoodsCategory) -> f64 {
        self.demand.get(&category).copied().unwrap_or(NEUTRAL_LEVEL)
    }

    /// Live modifiers on a category.
    pub fn modifiers_on(&self, category: GoodsCategory) -> &[PriceModifier] {
        self.modifiers
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn shift(&mut self, category: GoodsCategory, supply_change: f64, demand_change: f64) {
        let supply = clamp_level(self.supply_of(category) + supply_change);
        let demand = clamp_level(self.demand_of(category) + demand_change);
        self.supply.insert(category, supply);
        self.demand.insert(category, demand);
    }

    fn has_source(&self, id: PriceEventId) -> bool {
        self.modifiers
            .values()
            .flatten()
            .any(|modifier| modifier.source == Some(id))
    }

    /// Apply a price event once. Returns `false` if it was already applied.
    fn apply_price_event(&mut self, event: &PriceEvent) -> bool {
        if self.has_source(event.id) {
            return false;
        }
        if let Some(condition) = event.market_condition {
            self.condition = condition;
        }
        let expires_at = Some(expires_at_minute(event));
        for effect in &event.effects {
            self.modifiers
                .entry(effect.category)
                .or_default()
                .push(PriceModifier {
                    multiplier: effect.multiplier,
                    reason: format!("{:?}: {}", event.kind, event.headline),
                    expires_at,
                    source: Some(event.id),
                });
            self.shift(effect.category, effect.supply_change, effect.demand_change);
        }
        self.last_updated = event.at;
        true
    }

    fn run_daily<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &EconomyConfig, now: &GameTime) {
        for level in self.supply.values_mut().chain(self.demand.values_mut()) {
            let step = (rng.random::<f64>() - 0.5) * tuning.fluctuation;
            *level = clamp_level(*level + step);
        }
        if rng.random_bool(tuning.condition_change_chance.clamp(0.0, 1.0)) {
            if let Some(condition) = DRIFT_CONDITIONS.choose(rng) {
                self.condition = *condition;
            }
        }
        for level in self.supply.values_mut().chain(self.demand.values_mut()) {
            *level += (NEUTRAL_LEVEL - *level) * tuning.reversion_rate;
        }
        for modifiers in self.modifiers.values_mut() {
            modifiers.retain(|modifier| {
                modifier
                    .expires_at
                    .is_none_or(|minute| minute > now.total_minutes)
            });
        }
        self.modifiers.retain(|_, modifiers| !modifiers.is_empty());
        self.last_updated = *now;
    }
}

/// A currency and its live exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Currency {
    /// ISO currency code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Units per US dollar.
    pub exchange_rate: f64,
    /// How much the rate wanders, 0-1.
    pub volatility: f64,
    /// Annual inflation rate.
    pub inflation: f64,
}

impl Currency {
    fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let step = (rng.random::<f64>() - 0.5) * self.volatility * self.exchange_rate * 0.1;
        self.exchange_rate = (self.exchange_rate + step).max(0.01) * (1.0 + self.inflation / 365.0);
    }
}

/// Direction of a player trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    /// Player bought from the market.
    Buy,
    /// Player sold to the market.
    Sell,
}

/// A recorded player trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    /// When the trade happened.
    pub at: GameTime,
    /// Market country.
    pub country_code: String,
    /// Goods category.
    pub category: GoodsCategory,
    /// Buy or sell.
    pub side: TradeSide,
    /// Units traded.
    pub quantity: u32,
    /// Total value in dollars.
    pub total_value: Decimal,
}

/// One factor in a price quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceFactor {
    /// What the factor is.
    pub factor: String,
    /// Its multiplier.
    pub multiplier: f64,
}

/// A final price and how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    /// Price in dollars, rounded to whole units.
    pub final_price: Decimal,
    /// Factors in the order they were applied.
    pub breakdown: Vec<PriceFactor>,
}

/// Where a category's price is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Demand exceeds supply by more than 15.
    Up,
    /// Supply exceeds demand by more than 15.
    Down,
    /// Balanced.
    Stable,
}

/// Display row for one goods category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    /// Goods category.
    pub category: GoodsCategory,
    /// Supply, 0-100.
    pub supply: f64,
    /// Demand, 0-100.
    pub demand: f64,
    /// Supply/demand price factor.
    pub multiplier: f64,
    /// Price direction.
    pub trend: Trend,
}

/// Display view of one market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    /// Market condition.
    pub condition: MarketCondition,
    /// Per-category rows.
    pub categories: Vec<CategorySummary>,
    /// Local currency.
    pub currency: Currency,
}

/// Planned changes for one boundary.
#[derive(Debug)]
pub struct EconomyUpdate {
    now: GameTime,
    markets: Option<BTreeMap<String, Market>>,
    currencies: Option<BTreeMap<String, Currency>>,
}

/// Owns every market and exchange rate.
#[derive(Debug, Clone)]
pub struct DynamicEconomy {
    tuning: EconomyConfig,
    markets: BTreeMap<String, Market>,
    currencies: BTreeMap<String, Currency>,
    trades: VecDeque<Trade>,
    now: GameTime,
}

impl DynamicEconomy {
    /// Markets opened for every roster country at `now`.
    pub fn new(config: &SimulationConfig, now: GameTime) -> Self {
        let markets = COUNTRIES
            .iter()
            .map(|country| (country.code.to_owned(), Market::for_country(country, now)))
            .collect();
        let currencies = CURRENCIES
            .iter()
            .map(|profile| {
                (
                    profile.code.to_owned(),
                    Currency {
                        code: profile.code.to_owned(),
                        name: profile.name.to_owned(),
                        exchange_rate: profile.usd_rate,
                        volatility: profile.volatility,
                        inflation: profile.inflation,
                    },
                )
            })
            .collect();
        Self {
            tuning: config.economy.clone(),
            markets,
            currencies,
            trades: VecDeque::new(),
            now,
        }
    }

    /// A country's market.
    pub fn market(&self, country_code: &str) -> Option<&Market> {
        self.markets.get(country_code)
    }

    /// Every market, by country code.
    pub fn markets(&self) -> impl Iterator<Item = (&str, &Market)> {
        self.markets.iter().map(|(code, market)| (code.as_str(), market))
    }

    /// A currency by code.
    pub fn currency(&self, code: &str) -> Option<&Currency> {
        self.currencies.get(code)
    }

    /// How many units of `to` one unit of `from` buys.
    pub fn exchange_rate(&self, from: &str, to: &str) -> Option<f64> {
        let from = self.currencies.get(from)?;
        let to = self.currencies.get(to)?;
        Some(to.exchange_rate / from.exchange_rate)
    }

    /// Recent player trades, newest first.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    /// Price of an item with dollar base price `base` in a country.
    pub fn price_quote(
        &self,
        base: Decimal,
        category: GoodsCategory,
        country_code: &str,
    ) -> Result<PriceQuote, WorldError> {
        let market = self
            .markets
            .get(country_code)
            .ok_or_else(|| WorldError::UnknownCountry(country_code.to_owned()))?;

        let mut breakdown = vec![
            PriceFactor {
                factor: format!("Market: {:?}", market.condition),
                multiplier: market.condition.price_multiplier(),
            },
            PriceFactor {
                factor: "Supply/Demand".to_owned(),
                multiplier: supply_demand_multiplier(
                    market.supply_of(category),
                    market.demand_of(category),
                ),
            },
        ];
        breakdown.extend(market.modifiers_on(category).iter().map(|modifier| PriceFactor {
            factor: modifier.reason.clone(),
            multiplier: modifier.multiplier,
        }));

        let currency_code =
            starting_world::country(country_code).map_or(ANCHOR_CURRENCY, |country| country.currency);
        if currency_code != ANCHOR_CURRENCY {
            if let Some(currency) = self.currencies.get(currency_code) {
                breakdown.push(PriceFactor {
                    factor: format!("Currency ({currency_code})"),
                    multiplier: 1.0 - currency.inflation * 0.5,
                });
            }
        }

        let multiplier: f64 = breakdown.iter().map(|factor| factor.multiplier).product();
        let final_price = Decimal::from_f64(multiplier)
            .and_then(|factor| base.checked_mul(factor))
            .map_or(base, |price| price.round());
        Ok(PriceQuote {
            final_price,
            breakdown,
        })
    }

    /// Record a player trade and move the local market.
    ///
    /// Impact is one point per thousand dollars, capped at 10.
    /// Buying drains supply and lifts demand; selling does the reverse.
    pub fn record_transaction(
        &mut self,
        country_code: &str,
        category: GoodsCategory,
        side: TradeSide,
        quantity: u32,
        total_value: Decimal,
    ) -> Result<(), WorldError> {
        if quantity == 0 {
            return Err(WorldError::EmptyTrade {
                country: country_code.to_owned(),
                category,
            });
        }
        let now = self.now;
        let market = self
            .markets
            .get_mut(country_code)
            .ok_or_else(|| WorldError::UnknownCountry(country_code.to_owned()))?;

        let thousands = total_value
            .checked_div(Decimal::ONE_THOUSAND)
            .and_then(|value| value.to_f64())
            .unwrap_or(0.0);
        let impact = thousands.clamp(0.0, 10.0);
        let supply_step = impact * f64::from(quantity) * 0.5;
        let demand_step = impact * 0.25;
        match side {
            TradeSide::Buy => market.shift(category, -supply_step, demand_step),
            TradeSide::Sell => market.shift(category, supply_step, -demand_step),
        }
        market.last_updated = now;

        self.trades.push_front(Trade {
            at: now,
            country_code: country_code.to_owned(),
            category,
            side,
            quantity,
            total_value,
        });
        self.trades.truncate(TRADE_LIMIT);
        Ok(())
    }

    /// Display view of a country's market.
    pub fn market_summary(&self, country_code: &str) -> Option<MarketSummary> {
        let market = self.markets.get(country_code)?;
        let currency_code =
            starting_world::country(country_code).map_or(ANCHOR_CURRENCY, |country| country.currency);
        let currency = self
            .currencies
            .get(currency_code)
            .or_else(|| self.currencies.get(ANCHOR_CURRENCY))?
            .clone();
        let categories = GoodsCategory::ALL
            .into_iter()
            .map(|category| {
                let supply = market.supply_of(category);
                let demand = market.demand_of(category);
                let trend = if demand - supply > 15.0 {
                    Trend::Up
                } else if supply - demand > 15.0 {
                    Trend::Down
                } else {
                    Trend::Stable
                };
                CategorySummary {
                    category,
                    supply,
                    demand,
                    multiplier: supply_demand_multiplier(supply, demand),
                    trend,
                }
            })
            .collect();
        Some(MarketSummary {
            condition: market.condition,
            categories,
            currency,
        })
    }
}

impl SimulationManager for DynamicEconomy {
    type Update = EconomyUpdate;

    fn name(&self) -> &'static str {
        ECONOMY
    }

    fn on_start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        self.now = ctx.now;
        info!(markets = self.markets.len(), currencies = self.currencies.len(), "Economy started");
        Ok(())
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<EconomyUpdate, ManagerError> {
        let now = *ctx.now();
        let price_events: Vec<&PriceEvent> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Price(price) => Some(price.as_ref()),
                _ => None,
            })
            .collect();
        let daily = ctx.kind() == BoundaryKind::Day;
        if price_events.is_empty() && !daily {
            return Ok(EconomyUpdate {
                now,
                markets: None,
                currencies: None,
            });
        }

        let mut markets = self.markets.clone();
        for event in price_events {
            match markets.get_mut(&event.country_code) {
                Some(market) => {
                    if market.apply_price_event(event) {
                        debug!(
                            country = %event.country_code,
                            kind = ?event.kind,
                            "Price event applied to market"
                        );
                    }
                }
                None => warn!(country = %event.country_code, "Price event for unknown market"),
            }
        }

        let mut currencies = None;
        if daily {
            for market in markets.values_mut() {
                market.run_daily(ctx.rng(), &self.tuning, &now);
            }
            let mut next = self.currencies.clone();
            for currency in next.values_mut().filter(|c| c.code != ANCHOR_CURRENCY) {
                currency.drift(ctx.rng());
            }
            currencies = Some(next);
        }

        Ok(EconomyUpdate {
            now,
            markets: Some(markets),
            currencies,
        })
    }

    fn commit(&mut self, update: EconomyUpdate) {
        self.now = update.now;
        if let Some(markets) = update.markets {
            self.markets = markets;
        }
        if let Some(currencies) = update.currencies {
            self.currencies = currencies;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rust_decimal_macros::dec;
    use tactics_core::TimeEngine;
    use tactics_core::clock::game_time_at;
    use tactics_types::{PriceEventType, Severity, WorldEvent, WorldEventCategory, WorldEventId};

    use super::*;
    use crate::prices::{PRICE_FLUCTUATION, PriceFluctuation, build};
    use crate::world_sim::{WORLD_SIMULATION, WorldSimulation};

    fn economy() -> DynamicEconomy {
        DynamicEconomy::new(&SimulationConfig::default(), game_time_at(0))
    }

    #[test]
    fn supply_demand_multiplier_is_bounded() {
        assert!((supply_demand_multiplier(50.0, 50.0) - 1.0).abs() < f64::EPSILON);
        assert!((supply_demand_multiplier(100.0, 0.0) - 0.5).abs() < f64::EPSILON);
        assert!((supply_demand_multiplier(0.0, 100.0) - 2.0).abs() < f64::EPSILON);
        assert!((supply_demand_multiplier(0.0, 0.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn opening_markets_follow_country_profiles() {
        let economy = economy();
        assert_eq!(economy.market("US").unwrap().condition, MarketCondition::Boom);
        assert_eq!(economy.market("NG").unwrap().condition, MarketCondition::Crisis);
        assert_eq!(economy.market("BR").unwrap().condition, MarketCondition::Normal);
        let ng = economy.market("NG").unwrap();
        assert!((ng.supply_of(GoodsCategory::Contraband) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_event_is_applied_once() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let event = build(PriceEventType::Coup, "MX", game_time_at(60), None, &mut rng);
        let mut market = economy().market("MX").unwrap().clone();
        let before = market.supply_of(GoodsCategory::Weapons);

        assert!(market.apply_price_event(&event));
        assert!(!market.apply_price_event(&event));
        assert_eq!(market.condition, MarketCondition::Flooded);
        assert_eq!(market.modifiers_on(GoodsCategory::Weapons).len(), 1);
        assert!((market.supply_of(GoodsCategory::Weapons) - (before + 40.0).min(100.0)).abs() < 1e-9);
    }

    #[test]
    fn quote_breaks_down_every_factor() {
        let economy = economy();
        let us = economy.price_quote(dec!(1000), GoodsCategory::Armor, "US").unwrap();
        // Boom market, neutral supply and demand, no currency discount.
        assert_eq!(us.final_price, dec!(1250));
        assert_eq!(us.breakdown.len(), 2);

        let ng = economy.price_quote(dec!(1000), GoodsCategory::Armor, "NG").unwrap();
        assert_eq!(ng.breakdown.len(), 3);
        assert!(ng.breakdown.iter().any(|f| f.factor == "Currency (NGN)"));
        assert!(economy.price_quote(dec!(1), GoodsCategory::Armor, "ZZ").is_err());
    }

    #[test]
    fn trades_move_the_market_and_are_capped() {
        let mut economy = economy();
        let before = economy.market("GB").unwrap().supply_of(GoodsCategory::Medical);
        economy
            .record_transaction("GB", GoodsCategory::Medical, TradeSide::Buy, 2, dec!(5000))
            .unwrap();
        let after = economy.market("GB").unwrap().supply_of(GoodsCategory::Medical);
        assert!((before - after - 5.0).abs() < 1e-9);
        assert!(matches!(
            economy.record_transaction("GB", GoodsCategory::Medical, TradeSide::Sell, 0, dec!(1)),
            Err(WorldError::EmptyTrade { .. })
        ));
        for _ in 0..(TRADE_LIMIT + 10) {
            economy
                .record_transaction("GB", GoodsCategory::Armor, TradeSide::Sell, 1, dec!(10))
                .unwrap();
        }
        assert_eq!(economy.trades().count(), TRADE_LIMIT);
    }

    #[test]
    fn daily_cycle_keeps_levels_in_range_and_anchors_the_dollar() {
        let config = SimulationConfig::default();
        let mut engine = TimeEngine::new(&config);
        engine.subscribe(DynamicEconomy::new(&config, engine.now())).unwrap();
        engine.start(ECONOMY).unwrap();
        let yen_before = engine.manager::<DynamicEconomy>().unwrap().currency("JPY").unwrap().exchange_rate;

        engine.advance_hours(24.0 * 90.0).unwrap();
        let economy = engine.manager::<DynamicEconomy>().unwrap();
        assert!((economy.currency("USD").unwrap().exchange_rate - 1.0).abs() < f64::EPSILON);
        assert!((economy.currency("JPY").unwrap().exchange_rate - yen_before).abs() > f64::EPSILON);
        for (_, market) in economy.markets() {
            for level in market.supply.values().chain(market.demand.values()) {
                assert!((0.0..=100.0).contains(level));
            }
        }
        let summary = economy.market_summary("JP").unwrap();
        assert_eq!(summary.categories.len(), GoodsCategory::ALL.len());
        assert_eq!(summary.currency.code, "JPY");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["categories"][0]["category"], "weapons");
    }

    #[test]
    fn disaster_reaches_the_market_and_expires() {
        let mut config = SimulationConfig::default();
        config.world_events.natural_disaster = 0.0;
        config.world_events.political = 0.0;
        config.world_events.economic = 0.0;
        config.world_events.military = 0.0;
        let mut engine = TimeEngine::new(&config);
        engine.subscribe(WorldSimulation::new(&config)).unwrap();
        engine.subscribe(PriceFluctuation::new()).unwrap();
        engine.subscribe(DynamicEconomy::new(&config, engine.now())).unwrap();
        for name in [WORLD_SIMULATION, PRICE_FLUCTUATION, ECONOMY] {
            engine.start(name).unwrap();
        }
        engine
            .manager_mut::<WorldSimulation>()
            .unwrap()
            .schedule(WorldEvent {
                id: WorldEventId::new(),
                category: WorldEventCategory::NaturalDisaster,
                country_code: "JP".to_owned(),
                city: Some("Osaka".to_owned()),
                severity: Severity::Critical,
                headline: "Earthquake strikes Osaka region".to_owned(),
                description: String::new(),
                effects: Vec::new(),
                created_at: game_time_at(0),
                expires_at: None,
            })
            .unwrap();

        engine.advance_hours(1.0).unwrap();
        let market = engine.manager::<DynamicEconomy>().unwrap().market("JP").unwrap();
        assert_eq!(market.condition, MarketCondition::Crisis);
        assert_eq!(market.modifiers_on(GoodsCategory::Medical).len(), 1);

        engine.advance_hours(24.0 * 15.0).unwrap();
        let market = engine.manager::<DynamicEconomy>().unwrap().market("JP").unwrap();
        assert!(market.modifiers_on(GoodsCategory::Medical).is_empty());
    }
}
