//! Mood tags and coarse mood groups.
//!
//! A mood tag is a quadrant code: the first digit is energy (1 high, 0 low),
//! the second is pleasantness (1 pleasant, 0 unpleasant). Pleasant quadrants
//! form the `good` group, unpleasant ones the `bad` group.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Invalid mood input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoodError {
    #[error("At least one mood must be selected")]
    EmptyMoods,

    #[error("Unknown mood tag: {0}")]
    UnknownTag(String),

    #[error("Unknown mood preference: {0}")]
    UnknownPreference(String),
}

/// One of the four mood quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MoodTag {
    /// `11`: high energy, pleasant.
    Energized,
    /// `01`: low energy, pleasant.
    Calm,
    /// `10`: high energy, unpleasant.
    Tense,
    /// `00`: low energy, unpleasant.
    Drained,
}

impl MoodTag {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Energized => "11",
            Self::Calm => "01",
            Self::Tense => "10",
            Self::Drained => "00",
        }
    }

    pub const fn group(self) -> MoodGroup {
        match self {
            Self::Energized | Self::Calm => MoodGroup::Good,
            Self::Tense | Self::Drained => MoodGroup::Bad,
        }
    }
}

impl FromStr for MoodTag {
    type Err = MoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "11" => Ok(Self::Energized),
            "01" => Ok(Self::Calm),
            "10" => Ok(Self::Tense),
            "00" => Ok(Self::Drained),
            other => Err(MoodError::UnknownTag(other.to_string())),
        }
    }
}

impl TryFrom<String> for MoodTag {
    type Error = MoodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MoodTag> for String {
    fn from(tag: MoodTag) -> Self {
        tag.code().to_string()
    }
}

impl fmt::Display for MoodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Coarse classification of a mood set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodGroup {
    Good,
    Bad,
    Mixed,
}

impl MoodGroup {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Mixed => "mixed",
        }
    }

    /// Good and bad are opposites; mixed has none.
    pub const fn opposite(self) -> Option<Self> {
        match self {
            Self::Good => Some(Self::Bad),
            Self::Bad => Some(Self::Good),
            Self::Mixed => None,
        }
    }

    pub fn is_opposite_of(self, other: Self) -> bool {
        self.opposite() == Some(other)
    }

    /// Groups a candidate must belong to for the given preference.
    pub fn targets(self, preference: MoodPreference) -> Vec<Self> {
        match (preference, self) {
            (MoodPreference::Similar, group) => vec![group],
            (MoodPreference::Different, Self::Good) => vec![Self::Bad],
            (MoodPreference::Different, Self::Bad) => vec![Self::Good],
            (MoodPreference::Different, Self::Mixed) => vec![Self::Good, Self::Bad],
        }
    }
}

impl fmt::Display for MoodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the requester wants someone who feels alike or the opposite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodPreference {
    #[default]
    Similar,
    Different,
}

impl MoodPreference {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Similar => "similar",
            Self::Different => "different",
        }
    }
}

impl FromStr for MoodPreference {
    type Err = MoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "similar" => Ok(Self::Similar),
            "different" => Ok(Self::Different),
            other => Err(MoodError::UnknownPreference(other.to_string())),
        }
    }
}

/// Non-empty set of mood tags. Duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<MoodTag>")]
pub struct MoodSet(BTreeSet<MoodTag>);

impl MoodSet {
    /// Parse raw quadrant codes as sent by clients.
    pub fn parse<S: AsRef<str>>(codes: &[S]) -> Result<Self, MoodError> {
        if codes.is_empty() {
            return Err(MoodError::EmptyMoods);
        }
        let tags = codes
            .iter()
            .map(|c| c.as_ref().parse())
            .collect::<Result<BTreeSet<MoodTag>, _>>()?;
        Ok(Self(tags))
    }

    /// Decode the JSON array form stored alongside a profile.
    pub fn from_json(raw: &str) -> Result<Self, MoodError> {
        let codes: Vec<String> =
            serde_json::from_str(raw).map_err(|_| MoodError::UnknownTag(raw.to_string()))?;
        Self::parse(&codes)
    }

    pub fn to_json(&self) -> String {
        let codes: Vec<&str> = self.0.iter().map(|t| t.code()).collect();
        serde_json::to_string(&codes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Never zero; construction rejects empty input.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn group(&self) -> MoodGroup {
        let mut groups = self.0.iter().map(|t| t.group());
        match groups.next() {
            Some(first) if groups.all(|g| g == first) => first,
            _ => MoodGroup::Mixed,
        }
    }

    pub fn overlap(&self, other: &Self) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn difference_count(&self, other: &Self) -> usize {
        self.0.symmetric_difference(&other.0).count()
    }
}

impl From<MoodSet> for Vec<MoodTag> {
    fn from(set: MoodSet) -> Self {
        set.0.into_iter().collect()
    }
}
