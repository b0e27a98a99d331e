//! Interpretation keys and entries.
//!
//! # Invariants
//! - The persisted id of an entry is `InterpretationKey::id()`; no other code
//!   path formats or parses ids.
//! - Category names are the eight fixed camelCase field names of
//!   `NumerologyNumbers`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Shown when no authored interpretation exists for a `(category, number)`.
pub const DEFAULT_INTERPRETATION: &str = "Interpretação não disponível para este número. Por favor, contate o administrador para adicionar este conteúdo.";

/// One of the eight fixed numerology fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    KarmicSeal,
    DestinyCall,
    KarmaPortal,
    KarmicInheritance,
    KarmicReprogramming,
    CycleProphecy,
    SpiritualMark,
    ManifestationEnigma,
}

impl Category {
    /// Every category in report display order.
    pub const ALL: [Category; 8] = [
        Category::KarmicSeal,
        Category::DestinyCall,
        Category::KarmaPortal,
        Category::KarmicInheritance,
        Category::KarmicReprogramming,
        Category::CycleProphecy,
        Category::SpiritualMark,
        Category::ManifestationEnigma,
    ];

    /// Stable key used inside interpretation ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KarmicSeal => "karmicSeal",
            Self::DestinyCall => "destinyCall",
            Self::KarmaPortal => "karmaPortal",
            Self::KarmicInheritance => "karmicInheritance",
            Self::KarmicReprogramming => "karmicReprogramming",
            Self::CycleProphecy => "cycleProphecy",
            Self::SpiritualMark => "spiritualMark",
            Self::ManifestationEnigma => "manifestationEnigma",
        }
    }

    /// User-facing name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::KarmicSeal => "Selo Kármico",
            Self::DestinyCall => "Chamado do Destino",
            Self::KarmaPortal => "Portal do Karma",
            Self::KarmicInheritance => "Herança Kármica",
            Self::KarmicReprogramming => "Códex da Reprogramação",
            Self::CycleProphecy => "Profecia dos Ciclos",
            Self::SpiritualMark => "Marca Espiritual",
            Self::ManifestationEnigma => "Enigma da Manifestação",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = InterpretationKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value.trim())
            .ok_or_else(|| InterpretationKeyError::UnknownCategory(value.trim().to_string()))
    }
}

/// Typed two-part key of an interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterpretationKey {
    pub category: Category,
    pub number: i32,
}

impl InterpretationKey {
    pub fn new(category: Category, number: i32) -> Self {
        Self { category, number }
    }

    /// Deterministic document id: `<category>-<number>`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.category.as_str(), self.number)
    }

    /// Parses an id produced by [`InterpretationKey::id`].
    pub fn parse(id: &str) -> Result<Self, InterpretationKeyError> {
        // Category names never contain '-', so the first one is the separator
        // even for negative numbers.
        let (category, number) = id
            .split_once('-')
            .ok_or_else(|| InterpretationKeyError::MalformedId(id.to_string()))?;
        let category = category.parse::<Category>()?;
        let number = number
            .parse::<i32>()
            .map_err(|_| InterpretationKeyError::MalformedId(id.to_string()))?;
        Ok(Self { category, number })
    }

    /// Title used when no entry was authored.
    pub fn default_title(&self) -> String {
        format!("{} {}", self.category.display_name(), self.number)
    }
}

/// Errors raised when an external id or category name does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpretationKeyError {
    UnknownCategory(String),
    MalformedId(String),
}

impl Display for InterpretationKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCategory(value) => write!(f, "unknown category: `{value}`"),
            Self::MalformedId(value) => {
                write!(f, "interpretation id must be `<category>-<number>`, got `{value}`")
            }
        }
    }
}

impl std::error::Error for InterpretationKeyError {}

/// Authored title/content pair as persisted in the `interpretations` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredInterpretation {
    pub title: String,
    /// Raw authored markup; enrichment is applied at read time only.
    pub content: String,
}

/// Interpretation as seen by readers, authored or synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationEntry {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl InterpretationEntry {
    pub fn from_stored(key: &InterpretationKey, stored: &StoredInterpretation) -> Self {
        Self {
            id: key.id(),
            title: stored.title.clone(),
            content: stored.content.clone(),
        }
    }

    /// Synthesized entry for a key with no authored content.
    pub fn fallback(key: &InterpretationKey) -> Self {
        Self {
            id: key.id(),
            title: key.default_title(),
            content: DEFAULT_INTERPRETATION.to_string(),
        }
    }
}
