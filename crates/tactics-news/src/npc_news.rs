//! Stories about the people the player deals with.
//!
//! Newsworthy life events become articles on the boundary they are rolled.
//! The character registry, when running, supplies the NPC's role for the
//! article body; mercenaries and other untracked characters get a generic
//! description.

use rand::Rng;
use rand::seq::IndexedRandom;
use tactics_agents::CharacterRegistry;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager};
use tactics_types::{
    ArticleId, LifeEvent, LifeEventType, NewsArticle, NewsCategory, NpcId, NpcRole, Severity,
    SimEvent,
};
use crate::feed::{NewsFeed, announce};

/// Registry name of the NPC news manager.
pub const NPC_NEWS: &str = "npc_news";

/// Section of the paper a life event runs in.
pub const fn category_for(kind: LifeEventType) -> NewsCategory {
    match kind {
        LifeEventType::Arrested
        | LifeEventType::Released
        | LifeEventType::Betrayed
        | LifeEventType::Compromised => NewsCategory::Crime,
        LifeEventType::Promoted | LifeEventType::Demoted => NewsCategory::World,
        LifeEventType::Relocated
        | LifeEventType::LeftCountry
        | LifeEventType::Injured
        | LifeEventType::Recovered
        | LifeEventType::Retired
        | LifeEventType::Died
        | LifeEventType::Recruited
        | LifeEventType::Fired
        | LifeEventType::Married
        | LifeEventType::Divorced => NewsCategory::People,
    }
}

/// How prominently the story runs. Arresting a known criminal is front-page
/// news; everything else follows the event's own weight.
pub const fn severity_for(kind: LifeEventType, role: Option<NpcRole>) -> Severity {
    match (kind, role) {
        (LifeEventType::Arrested, Some(NpcRole::Criminal)) => Severity::Major,
        _ => kind.severity(),
    }
}

const fn role_label(role: Option<NpcRole>) -> &'static str {
    match role {
        Some(NpcRole::Civilian) => "resident",
        Some(NpcRole::Criminal) => "criminal",
        Some(NpcRole::Mercenary) => "mercenary",
        Some(NpcRole::Authority) => "official",
        Some(NpcRole::Contact) => "informant",
        None => "individual",
    }
}

const fn headline_templates(kind: LifeEventType) -> &'static [&'static str] {
    match kind {
        LifeEventType::Arrested => &[
            "{name} Apprehended by Authorities",
            "Police Arrest {name} in {city}",
            "Wanted Figure {name} in Custody",
        ],
        LifeEventType::Released => &[
            "{name} Released from Custody",
            "Controversial Release: {name} Walks Free",
        ],
        LifeEventType::Died => &[
            "{name} Found Dead in {city}",
            "Tragic End for {name}",
            "Community Mourns Loss of {name}",
        ],
        LifeEventType::Betrayed => &[
            "{name} Betrays Associates in Shocking Turn",
            "Informant {name} Breaks Ranks",
            "Double-Cross: {name} Turns Witness",
        ],
        LifeEventType::Compromised => &[
            "{name}'s Cover Blown in {city}",
            "Undercover Operative {name} Exposed",
        ],
        LifeEventType::Promoted => &[
            "{name} Receives Promotion",
            "Career Success for {name} in {city}",
        ],
        LifeEventType::Demoted => &["{name} Demoted Amid Controversy", "Fall from Grace: {name}"],
        LifeEventType::LeftCountry => &["{name} Leaves {city} for Good", "{name} Skips the Country"],
        LifeEventType::Married => &["{name} Ties the Knot", "Wedding Bells for {name}"],
        LifeEventType::Divorced => &["{name} Files for Divorce"],
        LifeEventType::Recruited => &["New Recruit: {name}"],
        LifeEventType::Relocated
        | LifeEventType::Injured
        | LifeEventType::Recovered
        | LifeEventType::Retired
        | LifeEventType::Fired => &[],
    }
}

fn headline<R: Rng + ?Sized>(rng: &mut R, event: &LifeEvent) -> String {
    headline_templates(event.kind).choose(rng).map_or_else(
        || event.description.clone(),
        |template| {
            template
                .replace("{name}", &event.npc_name)
                .replace("{city}", &event.city)
        },
    )
}

fn body(event: &LifeEvent, role: Option<NpcRole>) -> String {
    let name = &event.npc_name;
    let city = &event.city;
    let role = role_label(role);
    match event.kind {
        LifeEventType::Arrested => format!(
            "Authorities in {city} have confirmed the arrest of {name}, a known {role} with \
             reported ties to underground activity. Further details are expected as the case \
             proceeds."
        ),
        LifeEventType::Released => format!(
            "{name} has been released from custody, according to official sources. The \
             circumstances of the release remain under wraps."
        ),
        LifeEventType::Died => format!(
            "{name} was found deceased in {city}. {} Authorities have opened an investigation.",
            event.description
        ),
        LifeEventType::Betrayed => format!(
            "In a stunning development, {name} has betrayed former associates. The {role} is \
             reportedly cooperating with authorities or rival factions."
        ),
        LifeEventType::Compromised => format!(
            "{name}'s identity has been exposed in {city}, sources confirm. The {role}, who was \
             operating under cover, is now at significant risk."
        ),
        LifeEventType::Promoted => format!(
            "{name} has received a promotion. The advancement reflects recognition of their \
             work as a {role}."
        ),
        LifeEventType::LeftCountry => format!(
            "{name} has left {city} and the country, according to people close to the {role}. \
             {}",
            event.description
        ),
        LifeEventType::Relocated
        | LifeEventType::Injured
        | LifeEventType::Recovered
        | LifeEventType::Demoted
        | LifeEventType::Retired
        | LifeEventType::Recruited
        | LifeEventType::Fired
        | LifeEventType::Married
        | LifeEventType::Divorced => event.description.clone(),
    }
}

/// Article covering a life event, `None` unless the event is newsworthy.
pub fn life_article<R: Rng + ?Sized>(
    rng: &mut R,
    event: &LifeEvent,
    role: Option<NpcRole>,
) -> Option<NewsArticle> {
    if !event.newsworthy {
        return None;
    }
    Some(NewsArticle {
        id: ArticleId::from_rng(rng),
        headline: headline(rng, event),
        body: body(event, role),
        category: category_for(event.kind),
        severity: severity_for(event.kind, role),
        country_code: Some(event.country_code.clone()),
        related_npcs: vec![event.npc_id],
        published_at: event.at,
    })
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct NpcNewsUpdate {
    articles: Vec<NewsArticle>,
    quiet: bool,
}

/// Writes articles about newsworthy things happening to characters.
#[derive(Debug, Clone, Default)]
pub struct NpcNews {
    feed: NewsFeed,
}

impl NpcNews {
    /// A manager that has published nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Published articles.
    pub const fn feed(&self) -> &NewsFeed {
        &self.feed
    }

    /// Articles mentioning one NPC.
    pub fn for_npc(&self, id: NpcId) -> impl Iterator<Item = &NewsArticle> {
        self.feed.mentioning(id)
    }
}

impl SimulationManager for NpcNews {
    type Update = NpcNewsUpdate;

    fn name(&self) -> &'static str {
        NPC_NEWS
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<NpcNewsUpdate, ManagerError> {
        let registry = ctx.upstream::<CharacterRegistry>();
        let events: Vec<&LifeEvent> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Life(life) if life.newsworthy => Some(life.as_ref()),
                _ => None,
            })
            .collect();

        let mut articles = Vec::with_capacity(events.len());
        for event in events {
            let role = registry
                .and_then(|registry| registry.npc(event.npc_id))
                .map(|npc| npc.role);
            if let Some(article) = life_article(ctx.rng(), event, role) {
                articles.push(article);
            }
        }
        Ok(NpcNewsUpdate {
            articles,
            quiet: ctx.is_catching_up(),
        })
    }

    fn commit(&mut self, update: NpcNewsUpdate) {
        for article in update.articles {
            announce(NPC_NEWS, &article, update.quiet);
            self.feed.push(article);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tactics_agents::LifeEvents;
    use tactics_agents::MercenaryPool;
    use tactics_agents::life_events::LIFE_EVENTS;
    use tactics_agents::mercenary::MERCENARY_POOL;
    use tactics_agents::registry::CHARACTER_REGISTRY;
    use tactics_core::clock::game_time_at;
    use tactics_core::{SimulationConfig, TimeEngine};
    use tactics_types::LifeEventId;

    use super::*;
    use crate::feed::FEED_LIMIT;

    fn event(kind: LifeEventType) -> LifeEvent {
        LifeEvent {
            id: LifeEventId::new(),
            npc_id: NpcId::new(),
            npc_name: "Ana Lima".to_owned(),
            kind,
            at: game_time_at(1_440),
            description: "Ana Lima died in a car accident.".to_owned(),
            country_code: "BR".to_owned(),
            city: "Rio de Janeiro".to_owned(),
            new_city: None,
            newsworthy: kind.is_newsworthy(),
        }
    }

    #[test]
    fn sections_follow_the_event() {
        assert_eq!(category_for(LifeEventType::Arrested), NewsCategory::Crime);
        assert_eq!(category_for(LifeEventType::Betrayed), NewsCategory::Crime);
        assert_eq!(category_for(LifeEventType::Died), NewsCategory::People);
        assert_eq!(category_for(LifeEventType::Promoted), NewsCategory::World);
    }

    #[test]
    fn arresting_a_criminal_is_major_news() {
        assert_eq!(
            severity_for(LifeEventType::Arrested, Some(NpcRole::Criminal)),
            Severity::Major
        );
        assert_eq!(
            severity_for(LifeEventType::Arrested, Some(NpcRole::Civilian)),
            LifeEventType::Arrested.severity()
        );
        assert_eq!(severity_for(LifeEventType::Died, None), Severity::Major);
    }

    #[test]
    fn obituary_mentions_the_deceased() {
        let death = event(LifeEventType::Died);
        let article = life_article(&mut StdRng::seed_from_u64(4), &death, None).unwrap();
        assert!(article.headline.contains("Ana Lima"));
        assert!(!article.headline.contains('{'));
        assert!(article.body.contains("car accident"));
        assert_eq!(article.related_npcs, vec![death.npc_id]);
        assert_eq!(article.country_code.as_deref(), Some("BR"));
        assert_eq!(article.published_at.total_minutes, 1_440);
    }

    #[test]
    fn private_life_stays_out_of_the_paper() {
        let wedding = event(LifeEventType::Married);
        assert!(!wedding.newsworthy);
        assert!(life_article(&mut StdRng::seed_from_u64(4), &wedding, None).is_none());
    }

    #[test]
    fn newsworthy_rolls_become_articles() {
        let config = SimulationConfig::default();
        let mut engine = TimeEngine::new(&config);
        engine.subscribe(CharacterRegistry::new(&config)).unwrap();
        engine.subscribe(MercenaryPool::new()).unwrap();
        engine.subscribe(LifeEvents::new()).unwrap();
        engine.subscribe(NpcNews::new()).unwrap();
        for name in [CHARACTER_REGISTRY, MERCENARY_POOL, LIFE_EVENTS, NPC_NEWS] {
            engine.start(name).unwrap();
        }

        engine.advance_hours(24.0 * 60.0).unwrap();

        let life = engine.manager::<LifeEvents>().unwrap();
        let news = engine.manager::<NpcNews>().unwrap();
        let newsworthy: Vec<&LifeEvent> = life.newsworthy().take(FEED_LIMIT).collect();
        assert!(!newsworthy.is_empty());
        assert!(news.feed().len() >= newsworthy.len());
        for event in newsworthy {
            assert!(news.for_npc(event.npc_id).any(|article| {
                article.published_at == event.at && article.category == category_for(event.kind)
            }));
        }
    }
}
