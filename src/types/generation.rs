use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::{Target, Tone};

/// Identity id issued by the external identity provider.
pub type UserId = Uuid;

pub type GenerationId = Uuid;

/// Maximum length of the original text, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Generated text per target, kept in request order.
///
/// Serializes as a JSON object whose keys follow insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResults(Vec<(Target, String)>);

impl GenerationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: Target, text: String) {
        match self.0.iter_mut().find(|(t, _)| *t == target) {
            Some(entry) => entry.1 = text,
            None => self.0.push((target, text)),
        }
    }

    pub fn get(&self, target: &Target) -> Option<&str> {
        self.0
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, text)| text.as_str())
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.0.iter().map(|(t, _)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Target, &str)> {
        self.0.iter().map(|(t, text)| (t, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for GenerationResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (target, text) in &self.0 {
            map.serialize_entry(target.id(), text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GenerationResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResultsVisitor;

        impl<'de> Visitor<'de> for ResultsVisitor {
            type Value = GenerationResults;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of target id to generated text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut results = GenerationResults::new();
                while let Some((target, text)) = access.next_entry::<String, String>()? {
                    results.insert(Target::from(target), text);
                }
                Ok(results)
            }
        }

        deserializer.deserialize_map(ResultsVisitor)
    }
}

/// A past generation, immutable apart from deletion by its owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: GenerationId,
    pub user_id: UserId,
    pub original_content: String,
    pub tone: Tone,
    pub platforms: Vec<Target>,
    pub results: GenerationResults,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a generation to history.
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub user_id: UserId,
    pub original_content: String,
    pub tone: Tone,
    pub platforms: Vec<Target>,
    pub results: GenerationResults,
}
