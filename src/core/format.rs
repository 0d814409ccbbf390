use crate::domain::model::{Contest, Message};
use chrono::{DateTime, Duration, FixedOffset, Utc};

pub const COLOR_ANNOUNCE: u32 = 0xffa500;
pub const COLOR_LIST: u32 = 0x00ff00;
pub const COLOR_HELP: u32 = 0x0099ff;
pub const COLOR_STATUS: u32 = 0x808080;

/// Formats the absolute value of `d` as `{d}d {h}h {m}m`, `{h}h {m}m` or `{m}m`.
/// Components are truncated, never rounded.
pub fn format_duration(d: Duration) -> String {
    let secs = d.num_seconds().unsigned_abs();
    let days = secs / 86_400;
    let hours = (secs / 3_600) % 24;
    let minutes = (secs / 60) % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

pub fn format_std_duration(d: std::time::Duration) -> String {
    let d = i64::try_from(d.as_secs())
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX);
    format_duration(d)
}

/// `2025-06-01 21:00 UTC`, or `2025-06-01 21:00 +09:00` for non-zero offsets.
pub fn format_start_time(start: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = start.with_timezone(&offset);
    if offset.local_minus_utc() == 0 {
        local.format("%Y-%m-%d %H:%M UTC").to_string()
    } else {
        local.format("%Y-%m-%d %H:%M %:z").to_string()
    }
}

/// The multi-line body shared by announcements and list replies.
pub fn contest_summary(contest: &Contest, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let mut lines = vec![
        format!("**Start:** {}", format_start_time(contest.start_time, offset)),
        format!("**Duration:** {}", format_duration(contest.duration())),
    ];
    if let Some(rate_change) = contest.rate_change.as_deref().filter(|r| !r.is_empty()) {
        lines.push(format!("**Rate Change:** {}", rate_change));
    }
    let until = contest.start_time - now;
    if until > Duration::zero() {
        lines.push(format!("**Starts in:** {}", format_duration(until)));
    }
    if let Some(url) = contest.url.as_deref().filter(|u| !u.is_empty()) {
        lines.push(format!("**Link:** {}", url));
    }
    lines.join("\n")
}

/// Message sent by the scheduled cycle for a newly seen contest.
pub fn render_announcement(contest: &Contest, now: DateTime<Utc>, offset: FixedOffset) -> Message {
    Message::new(format!("🔔 New contest: {}", contest.title), COLOR_ANNOUNCE)
        .with_description(contest_summary(contest, now, offset))
}

pub fn render_contest_list(
    upcoming: &[Contest],
    max: usize,
    now: DateTime<Utc>,
    offset: FixedOffset,
    update_interval: std::time::Duration,
) -> Message {
    let shown = upcoming.len().min(max);
    let mut message = Message::new("🏆 Upcoming Contests", COLOR_LIST)
        .with_description(format!("Here are the next {} upcoming contests:", shown))
        .with_footer(format!(
            "Updated every {}",
            format_std_duration(update_interval)
        ));
    for contest in upcoming.iter().take(max) {
        message = message.with_field(&contest.title, contest_summary(contest, now, offset));
    }
    message
}

pub fn render_next(contest: &Contest, now: DateTime<Utc>, offset: FixedOffset) -> Message {
    Message::new("⏭️ Next Contest", COLOR_LIST)
        .with_field(&contest.title, contest_summary(contest, now, offset))
}
