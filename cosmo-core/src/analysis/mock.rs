//! Stand-in analyzer: waits a random moment, then answers with a fixed record.

use super::{AnalysisError, Analyzer};
use crate::ingest::ImageData;
use crate::record::{Character, Geography, Item, Record, Worldview};
use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(1800);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(2400);

/// The record every mock analysis returns.
pub fn canned_record() -> Record {
    Record {
        character: Character {
            name: "Selver".to_string(),
            race: "Human (rumored half-elf)".to_string(),
            ability: "Black-robe magic, shadow weaving, old-tongue incantations".to_string(),
            backstory: "A wandering mage from the northern ice fields who lost his memory in a \
                        failed experiment and remembers only his own name. He wears a black robe \
                        said to drink in mana and drifts between the great forests searching for \
                        his lost past."
                .to_string(),
        },
        worldview: Worldview {
            magic_system: "Magic flows through crystal mist. Casters breathe in the mist to gather \
                           power; the denser the mist, the stronger the spell, and the more of the \
                           caster's memory it erodes."
                .to_string(),
            era: "The close of the Third Age, where arcane and mechanical civilizations meet".to_string(),
            factions: "The Black Robe Conclave, the Mistwardens, the Order of the Broken Blade".to_string(),
            cosmology: "The world is wrapped in seven veils of mist, each bound to one school of magic. \
                        The outermost, the Void Mist, is said to be the source of all magic."
                .to_string(),
        },
        geography: Geography {
            name: "Crystal Mist Forest".to_string(),
            location: "The heart of the continent, a forbidden zone straddling three kingdoms".to_string(),
            climate: "Shrouded year-round in pale blue mist; visibility is poor and the air holds at \
                      five below zero"
                .to_string(),
            features: "Trees glow faintly blue and the ground is carpeted with slowly creeping mist moss. \
                       Deep inside lies the Mist Vortex, where mana is densest."
                .to_string(),
            danger: "The lost have their memories eaten by the mist until they become mindless mist-folk. \
                     Those who stay past three days lose 87% of their memories."
                .to_string(),
        },
        item: Item {
            name: "The Talking Broken Sword".to_string(),
            kind: "Magic weapon · First Age relic".to_string(),
            ability: "Speaks mind-to-mind with its bearer and keeps a will and memory of its own. It \
                      senses shifts in mana and warns its bearer in the old tongue."
                .to_string(),
            origin: "By its own account it was the blade of Calvin, Knight of Light, and shattered in \
                     the last battle of the First Age. Part of Calvin's mind is sealed inside, which \
                     is why it can speak."
                .to_string(),
            state: "Broken, only the hilt and a third of the blade remain, yet its power is undimmed. \
                    The break glows a soft gold."
                .to_string(),
        },
    }
}

#[derive(Debug, Clone)]
enum Behavior {
    Canned,
    Returning(Box<Record>),
    Failing(String),
}

/// Inputs seen by the most recent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug)]
pub struct MockAnalyzer {
    min_delay: Duration,
    max_delay: Duration,
    behavior: Behavior,
    calls: AtomicUsize,
    last_call: Mutex<Option<MockCall>>,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalyzer {
    /// Canned record after 1.8 to 2.4 seconds.
    pub fn new() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            behavior: Behavior::Canned,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Answer without waiting.
    pub fn instant() -> Self {
        Self::new().with_delay(Duration::ZERO, Duration::ZERO)
    }

    /// Answer with `record` instead of the canned one.
    pub fn returning(record: Record) -> Self {
        Self {
            behavior: Behavior::Returning(Box::new(record)),
            ..Self::new()
        }
    }

    /// Always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Failing(message.into()),
            ..Self::new()
        }
    }

    /// Wait a uniformly random time in `[min, max]` before answering.
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max.max(min);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<MockCall> {
        self.last_call.lock().ok().and_then(|c| c.clone())
    }

    fn pick_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, text: &str, image: Option<&ImageData>) -> Result<Record, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_call.lock() {
            *last = Some(MockCall {
                text: text.to_string(),
                image: image.map(|i| i.data_url.clone()),
            });
        }

        let delay = self.pick_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "mock analysis");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Canned => Ok(canned_record()),
            Behavior::Returning(record) => Ok((**record).clone()),
            Behavior::Failing(message) => Err(AnalysisError::Unavailable(message.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
