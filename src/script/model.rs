use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::{self, MapAccess, Visitor};

use crate::foundation::error::{ReelError, ReelResult};
use crate::script::segment::segment;
use crate::slide::model::Slide;

/// A speaking character: portrait and synthesis voice.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct Character {
    pub image: PathBuf,
    /// Voice identifier understood by the speech backend.
    pub voice: String,
}

/// Character registry in declaration order.
///
/// Order matters: portraits are emitted as layers in this order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Characters {
    entries: Vec<(String, Character)>,
}

impl Characters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a character.
    pub fn insert(&mut self, name: impl Into<String>, character: Character) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, c)) => *c = character,
            None => self.entries.push((name, character)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Character)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> serde::Deserialize<'de> for Characters {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CharactersVisitor;

        impl<'de> Visitor<'de> for CharactersVisitor {
            type Value = Characters;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping from character name to {image, voice}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Characters, A::Error> {
                let mut out = Characters::new();
                while let Some((name, character)) = map.next_entry::<String, Character>()? {
                    if out.get(&name).is_some() {
                        return Err(de::Error::custom(format!(
                            "character '{name}' is declared twice"
                        )));
                    }
                    out.entries.push((name, character));
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(CharactersVisitor)
    }
}

/// The script document: ordered slide entries plus the character registry.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct Script {
    /// Untyped single-key entries; classified by [`Script::parse_slides`].
    #[serde(default)]
    pub slides: Vec<serde_yaml::Value>,
    #[serde(default)]
    pub characters: Characters,
}

impl Script {
    pub fn from_yaml_str(src: &str) -> ReelResult<Self> {
        serde_yaml::from_str(src).map_err(|e| ReelError::serde(e.to_string()))
    }

    pub fn load(path: &Path) -> ReelResult<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?;
        Self::from_yaml_str(&src)
    }

    /// Group entries into slides; the first slide is always the implicit empty one.
    pub fn parse_slides(&self) -> ReelResult<Vec<Slide>> {
        segment(&self.slides, &self.characters)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
