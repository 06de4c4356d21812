//! The campaign roster: countries, their cities, and currencies.
//!
//! Every manager that needs geography reads from these static tables. The
//! numbers are starting values on a 0-100 scale; world events move the
//! live copies held by the world simulation, never these.

use rand::Rng;
use rand::seq::IndexedRandom;

/// A currency traded on the world markets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyProfile {
    /// ISO currency code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Units per US dollar at campaign start.
    pub usd_rate: f64,
    /// How much the rate wanders, 0-1.
    pub volatility: f64,
    /// Annual inflation rate.
    pub inflation: f64,
}

/// A city in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityProfile {
    /// Display name, unique across the roster.
    pub name: &'static str,
    /// Street crime, 0-100.
    pub crime_index: i32,
    /// Public safety, 0-100.
    pub safety_index: i32,
}

/// A country in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryProfile {
    /// ISO country code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Currency code, see [`CURRENCIES`].
    pub currency: &'static str,
    /// State surveillance capability. Drives how fast heat decays.
    pub surveillance: i32,
    /// Wealth per head.
    pub gdp_per_capita: i32,
    /// Government corruption.
    pub corruption: i32,
    /// Political stability (inverse of instability).
    pub political_stability: i32,
    /// Armed forces strength.
    pub military_strength: i32,
    /// Healthcare quality.
    pub healthcare: i32,
    /// Science and technology base.
    pub science_technology: i32,
    /// Policing capacity.
    pub law_enforcement: i32,
    /// Cities that host NPCs and local events.
    pub cities: &'static [CityProfile],
}

const fn city(name: &'static str, crime_index: i32, safety_index: i32) -> CityProfile {
    CityProfile {
        name,
        crime_index,
        safety_index,
    }
}

/// Currencies in circulation. USD is the anchor and never moves.
pub const CURRENCIES: &[CurrencyProfile] = &[
    CurrencyProfile { code: "USD", name: "US Dollar", usd_rate: 1.0, volatility: 0.1, inflation: 0.03 },
    CurrencyProfile { code: "EUR", name: "Euro", usd_rate: 0.92, volatility: 0.1, inflation: 0.025 },
    CurrencyProfile { code: "GBP", name: "British Pound", usd_rate: 0.79, volatility: 0.12, inflation: 0.04 },
    CurrencyProfile { code: "JPY", name: "Japanese Yen", usd_rate: 148.0, volatility: 0.15, inflation: 0.02 },
    CurrencyProfile { code: "RUB", name: "Russian Ruble", usd_rate: 92.0, volatility: 0.35, inflation: 0.08 },
    CurrencyProfile { code: "BRL", name: "Brazilian Real", usd_rate: 4.9, volatility: 0.25, inflation: 0.05 },
    CurrencyProfile { code: "NGN", name: "Nigerian Naira", usd_rate: 780.0, volatility: 0.4, inflation: 0.22 },
    CurrencyProfile { code: "MXN", name: "Mexican Peso", usd_rate: 17.0, volatility: 0.18, inflation: 0.05 },
];

/// Anchor currency for exchange rates.
pub const ANCHOR_CURRENCY: &str = "USD";

/// Countries in play.
pub const COUNTRIES: &[CountryProfile] = &[
    CountryProfile {
        code: "US",
        name: "United States",
        currency: "USD",
        surveillance: 85,
        gdp_per_capita: 85,
        corruption: 25,
        political_stability: 65,
        military_strength: 95,
        healthcare: 70,
        science_technology: 90,
        law_enforcement: 75,
        cities: &[
            city("New York", 45, 60),
            city("Los Angeles", 50, 55),
            city("Chicago", 55, 50),
        ],
    },
    CountryProfile {
        code: "GB",
        name: "United Kingdom",
        currency: "GBP",
        surveillance: 90,
        gdp_per_capita: 75,
        corruption: 20,
        political_stability: 70,
        military_strength: 70,
        healthcare: 80,
        science_technology: 80,
        law_enforcement: 80,
        cities: &[city("London", 40, 65), city("Manchester", 45, 60)],
    },
    CountryProfile {
        code: "DE",
        name: "Germany",
        currency: "EUR",
        surveillance: 70,
        gdp_per_capita: 80,
        corruption: 15,
        political_stability: 80,
        military_strength: 60,
        healthcare: 85,
        science_technology: 85,
        law_enforcement: 80,
        cities: &[city("Berlin", 35, 70), city("Hamburg", 35, 70)],
    },
    CountryProfile {
        code: "JP",
        name: "Japan",
        currency: "JPY",
        surveillance: 65,
        gdp_per_capita: 75,
        corruption: 15,
        political_stability: 85,
        military_strength: 65,
        healthcare: 90,
        science_technology: 95,
        law_enforcement: 85,
        cities: &[city("Tokyo", 20, 85), city("Osaka", 25, 80)],
    },
    CountryProfile {
        code: "RU",
        name: "Russia",
        currency: "RUB",
        surveillance: 80,
        gdp_per_capita: 45,
        corruption: 70,
        political_stability: 40,
        military_strength: 90,
        healthcare: 55,
        science_technology: 65,
        law_enforcement: 60,
        cities: &[city("Moscow", 50, 50), city("Saint Petersburg", 45, 55)],
    },
    CountryProfile {
        code: "BR",
        name: "Brazil",
        currency: "BRL",
        surveillance: 45,
        gdp_per_capita: 40,
        corruption: 60,
        political_stability: 45,
        military_strength: 55,
        healthcare: 50,
        science_technology: 45,
        law_enforcement: 40,
        cities: &[city("Sao Paulo", 70, 35), city("Rio de Janeiro", 75, 30)],
    },
    CountryProfile {
        code: "NG",
        name: "Nigeria",
        currency: "NGN",
        surveillance: 25,
        gdp_per_capita: 20,
        corruption: 80,
        political_stability: 25,
        military_strength: 45,
        healthcare: 30,
        science_technology: 25,
        law_enforcement: 30,
        cities: &[city("Lagos", 80, 25), city("Abuja", 60, 40)],
    },
    CountryProfile {
        code: "MX",
        name: "Mexico",
        currency: "MXN",
        surveillance: 40,
        gdp_per_capita: 45,
        corruption: 70,
        political_stability: 40,
        military_strength: 50,
        healthcare: 50,
        science_technology: 40,
        law_enforcement: 35,
        cities: &[
            city("Mexico City", 70, 35),
            city("Guadalajara", 65, 40),
            city("Monterrey", 60, 45),
        ],
    },
];

/// Look up a country by ISO code.
pub fn country(code: &str) -> Option<&'static CountryProfile> {
    COUNTRIES.iter().find(|country| country.code == code)
}

/// Look up a city and the country it belongs to.
pub fn city_in_roster(name: &str) -> Option<(&'static CountryProfile, &'static CityProfile)> {
    COUNTRIES.iter().find_map(|country| {
        country
            .cities
            .iter()
            .find(|city| city.name == name)
            .map(|city| (country, city))
    })
}

/// Look up a currency by code.
pub fn currency(code: &str) -> Option<&'static CurrencyProfile> {
    CURRENCIES.iter().find(|currency| currency.code == code)
}

/// Every city in roster order, paired with its country.
pub fn all_cities() -> impl Iterator<Item = (&'static CountryProfile, &'static CityProfile)> {
    COUNTRIES
        .iter()
        .flat_map(|country| country.cities.iter().map(move |city| (country, city)))
}

/// Pick a country uniformly at random.
pub fn random_country<R: Rng + ?Sized>(rng: &mut R) -> Option<&'static CountryProfile> {
    COUNTRIES.choose(rng)
}

/// Pick a country uniformly, then one of its cities uniformly.
pub fn random_city<R: Rng + ?Sized>(
    rng: &mut R,
) -> Option<(&'static CountryProfile, &'static CityProfile)> {
    let country = COUNTRIES.choose(rng)?;
    let city = country.cities.choose(rng)?;
    Some((country, city))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn every_country_has_a_known_currency_and_cities() {
        for country in COUNTRIES {
            assert!(currency(country.currency).is_some(), "{}", country.code);
            assert!(!country.cities.is_empty(), "{}", country.code);
        }
    }

    #[test]
    fn city_names_are_unique() {
        let names: BTreeSet<&str> = all_cities().map(|(_, city)| city.name).collect();
        assert_eq!(names.len(), all_cities().count());
    }

    #[test]
    fn lookups_resolve() {
        assert_eq!(country("JP").unwrap().name, "Japan");
        let (country, city) = city_in_roster("Lagos").unwrap();
        assert_eq!(country.code, "NG");
        assert_eq!(city.crime_index, 80);
        assert!(super::country("ZZ").is_none());
        assert!(city_in_roster("Atlantis").is_none());
    }

    #[test]
    fn random_city_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(random_city(&mut a), random_city(&mut b));
        }
    }
}
