//! Reminder text rendering.

use chrono::NaiveDate;

use classtrack_db::models::enrollment::RosterStudent;

/// Everything a reminder needs to say.
pub struct Reminder<'a> {
    pub activity_name: Option<&'a str>,
    pub date: NaiveDate,
    /// Human-readable time slot, e.g. `17:00-18:00`.
    pub slot: Option<String>,
    pub roster: &'a [RosterStudent],
}

/// Render the reminder message sent to the instructor's chat.
pub fn reminder_text(reminder: &Reminder<'_>) -> String {
    let mut text = String::new();

    match reminder.activity_name {
        Some(name) => text.push_str(&format!("Upcoming lesson: {name}\n")),
        None => text.push_str("Upcoming lesson\n"),
    }
    text.push_str(&format!("Date: {}\n", reminder.date.format("%Y-%m-%d")));
    if let Some(slot) = &reminder.slot {
        text.push_str(&format!("Time: {slot}\n"));
    }

    if reminder.roster.is_empty() {
        text.push_str("\nNo students enrolled.");
    } else {
        text.push_str(&format!("\nStudents ({}):\n", reminder.roster.len()));
        for (i, student) in reminder.roster.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", i + 1, student.full_name));
        }
        text.push_str("\nReply with attendance after the lesson.");
    }

    text
}
