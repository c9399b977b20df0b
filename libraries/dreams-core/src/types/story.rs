/// Story domain type
use crate::types::StoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Historical era a story belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Ancient Civilizations")]
    AncientCivilizations,
    #[serde(rename = "Medieval Times")]
    MedievalTimes,
    #[serde(rename = "Renaissance")]
    Renaissance,
    #[serde(rename = "Industrial Revolution")]
    IndustrialRevolution,
    #[serde(rename = "Modern History")]
    ModernHistory,
    #[serde(rename = "Mythology")]
    Mythology,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 6] = [
        Self::AncientCivilizations,
        Self::MedievalTimes,
        Self::Renaissance,
        Self::IndustrialRevolution,
        Self::ModernHistory,
        Self::Mythology,
    ];

    /// Human-readable name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AncientCivilizations => "Ancient Civilizations",
            Self::MedievalTimes => "Medieval Times",
            Self::Renaissance => "Renaissance",
            Self::IndustrialRevolution => "Industrial Revolution",
            Self::ModernHistory => "Modern History",
            Self::Mythology => "Mythology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A narrated history story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Unique story identifier
    pub id: StoryId,

    /// Story title
    pub title: String,

    /// Short description
    pub description: String,

    /// Narrator name
    pub narrator: String,

    /// Duration in seconds (0 until the media resolves its real length)
    pub duration: f64,

    /// Historical era
    pub category: Category,

    /// Time period covered, e.g. "44 BC"
    pub time_period: String,

    /// Region covered, e.g. "Rome"
    pub region: String,

    /// Artwork locator
    #[serde(default, rename = "thumbnailURL")]
    pub thumbnail_url: Option<String>,

    /// Audio locator
    #[serde(default, rename = "audioURL")]
    pub audio_url: Option<String>,

    /// When the story was last played
    #[serde(default, rename = "lastPlayedDate")]
    pub last_played: Option<DateTime<Utc>>,

    /// Fraction already played, in [0, 1]
    #[serde(default)]
    pub progress: Option<f64>,
}

impl Story {
    /// Create a story with a fresh ID and empty metadata
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            id: StoryId::generate(),
            title: title.into(),
            description: String::new(),
            narrator: String::new(),
            duration: 0.0,
            category,
            time_period: String::new(),
            region: String::new(),
            thumbnail_url: None,
            audio_url: None,
            last_played: None,
            progress: None,
        }
    }

    /// Placeholder story for a bare audio locator
    ///
    /// Used when the host hands over only a locator; the duration stays 0
    /// until the media backend reports the real length.
    pub fn placeholder(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        let title = locator
            .rsplit('/')
            .next()
            .and_then(|name| name.split('.').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("Untitled Story")
            .to_string();

        Self {
            audio_url: Some(locator),
            ..Self::new(title, Category::ModernHistory)
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the narrator
    #[must_use]
    pub fn with_narrator(mut self, narrator: impl Into<String>) -> Self {
        self.narrator = narrator.into();
        self
    }

    /// Set the known duration in seconds
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    /// Set time period and region
    #[must_use]
    pub fn with_setting(mut self, time_period: impl Into<String>, region: impl Into<String>) -> Self {
        self.time_period = time_period.into();
        self.region = region.into();
        self
    }

    /// Set the audio locator
    #[must_use]
    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    /// Set the artwork locator
    #[must_use]
    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Set the progress fraction (clamped to [0, 1])
    #[must_use]
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(clamp_progress(progress));
        self
    }

    /// Started but not finished
    pub fn is_partially_played(&self) -> bool {
        matches!(self.progress, Some(p) if p > 0.0 && p < 1.0)
    }

    /// Played to the end
    pub fn is_completed(&self) -> bool {
        matches!(self.progress, Some(p) if p >= 1.0)
    }

    /// Abbreviated hours/minutes, e.g. "1h 5m" or "45m"
    pub fn formatted_duration(&self) -> String {
        let total_minutes = (self.duration.max(0.0) / 60.0).floor() as u64;
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;

        match (hours, minutes) {
            (0, m) => format!("{m}m"),
            (h, 0) => format!("{h}h"),
            (h, m) => format!("{h}h {m}m"),
        }
    }
}

/// Clamp a progress fraction into [0, 1], mapping NaN to 0
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}
