use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_MOOD: u8 = 1;
pub const MAX_MOOD: u8 = 5;

/// One recorded day. `date` is the natural key: a store never holds two
/// entries with the same date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub date: NaiveDate,
    pub mood: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub fn is_valid_mood(mood: u8) -> bool {
    (MIN_MOOD..=MAX_MOOD).contains(&mood)
}

/// Trims a free-text note; blank input means no note.
pub fn normalize_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodLevel {
    pub value: u8,
    pub emoji: &'static str,
    pub label: &'static str,
}

pub const MOOD_LEVELS: [MoodLevel; 5] = [
    MoodLevel { value: 1, emoji: "😞", label: "Very Sad" },
    MoodLevel { value: 2, emoji: "😕", label: "Sad" },
    MoodLevel { value: 3, emoji: "😐", label: "Neutral" },
    MoodLevel { value: 4, emoji: "😊", label: "Happy" },
    MoodLevel { value: 5, emoji: "😁", label: "Very Happy" },
];

pub fn mood_level(mood: u8) -> Option<&'static MoodLevel> {
    MOOD_LEVELS.iter().find(|level| level.value == mood)
}

#[derive(Debug, Deserialize)]
pub struct SaveMoodRequest {
    pub mood: u8,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub entry: Option<MoodEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveMoodResponse {
    pub entry: MoodEntry,
    pub persisted: bool,
}

/// A point in the fixed 7-day window. Days without an entry carry `mood = 0`
/// and `has_entry = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPoint {
    pub date: NaiveDate,
    pub mood: u8,
    pub has_entry: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub date: NaiveDate,
    pub day_label: String,
    pub mood: u8,
    pub mood_label: String,
    pub emoji: String,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub mood: u8,
    pub has_entry: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub total_entries: usize,
    pub average_mood: Option<f64>,
    pub last_7_days: Vec<ChartDay>,
}
