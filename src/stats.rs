use crate::models::{
    mood_level, ChartDay, DayPoint, HistoryItem, InsightsResponse, MoodEntry,
};
use crate::storage::find_by_date;
use chrono::{Duration, NaiveDate};

const WINDOW_DAYS: i64 = 7;

/// Most recent first. The sort is stable, so entries sharing a date keep
/// their relative order.
pub fn sorted_descending(entries: &[MoodEntry]) -> Vec<MoodEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Mean mood rounded to one decimal, or `None` for an empty journal.
pub fn average_mood(entries: &[MoodEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let sum: u64 = entries.iter().map(|entry| u64::from(entry.mood)).sum();
    let mean = sum as f64 / entries.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// The seven calendar days ending at `today`, oldest first.
pub fn last_7_days_series(entries: &[MoodEntry], today: NaiveDate) -> Vec<DayPoint> {
    (0..WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            match find_by_date(entries, date) {
                Some(entry) => DayPoint {
                    date,
                    mood: entry.mood,
                    has_entry: true,
                },
                None => DayPoint {
                    date,
                    mood: 0,
                    has_entry: false,
                },
            }
        })
        .collect()
}

pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_owned();
    }
    if today.pred_opt() == Some(date) {
        return "Yesterday".to_owned();
    }
    date.format("%a, %b %-d").to_string()
}

pub fn build_history(entries: &[MoodEntry], today: NaiveDate) -> Vec<HistoryItem> {
    sorted_descending(entries)
        .into_iter()
        .map(|entry| {
            let level = mood_level(entry.mood);
            HistoryItem {
                day_label: relative_day_label(entry.date, today),
                mood_label: level.map(|l| l.label).unwrap_or_default().to_owned(),
                emoji: level.map(|l| l.emoji).unwrap_or_default().to_owned(),
                id: entry.id,
                date: entry.date,
                mood: entry.mood,
                note: entry.note,
            }
        })
        .collect()
}

pub fn build_insights(entries: &[MoodEntry], today: NaiveDate) -> InsightsResponse {
    let last_7_days = last_7_days_series(entries, today)
        .into_iter()
        .map(|point| ChartDay {
            weekday: point.date.format("%a").to_string(),
            date: point.date,
            mood: point.mood,
            has_entry: point.has_entry,
        })
        .collect();

    InsightsResponse {
        total_entries: entries.len(),
        average_mood: average_mood(entries),
        last_7_days,
    }
}
