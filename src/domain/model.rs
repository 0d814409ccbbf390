use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scheduled contest. Constructed by the feed decoder and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_change: Option<String>,
}

impl Contest {
    /// Saturates at `chrono::Duration::MAX` for values chrono cannot hold.
    pub fn duration(&self) -> chrono::Duration {
        i64::try_from(self.duration_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }
}

/// Contests that have already been announced, keyed by contest id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeenSet {
    contests: BTreeMap<String, Contest>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.contests.contains_key(id)
    }

    /// Inserts or refreshes the snapshot for `contest.id`.
    pub fn insert(&mut self, contest: Contest) {
        self.contests.insert(contest.id.clone(), contest);
    }

    pub fn get(&self, id: &str) -> Option<&Contest> {
        self.contests.get(id)
    }

    /// Drops every snapshot whose start time is not after `now`.
    /// Returns how many entries were removed.
    pub fn prune_started(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.contests.len();
        self.contests.retain(|_, c| c.is_upcoming(now));
        before - self.contests.len()
    }

    pub fn len(&self) -> usize {
        self.contests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contests.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.contests.keys().map(String::as_str)
    }

    pub fn contests(&self) -> impl Iterator<Item = &Contest> {
        self.contests.values()
    }
}

impl FromIterator<Contest> for SeenSet {
    fn from_iter<I: IntoIterator<Item = Contest>>(iter: I) -> Self {
        let mut set = SeenSet::new();
        for contest in iter {
            set.insert(contest);
        }
        set
    }
}

/// A rendered chat message. Channels decide whether to send it as plain
/// content or as an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<MessageField>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageField {
    pub name: String,
    pub value: String,
}

impl Message {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            footer: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MessageField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// A title-less message carrying one line of text, e.g. error replies.
    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(String::new(), 0).with_description(text)
    }

    /// Flattens the message into markdown-ish text for content-only channels.
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::new();
        if !self.title.is_empty() {
            lines.push(format!("**{}**", self.title));
        }
        if let Some(description) = &self.description {
            lines.push(description.clone());
        }
        for field in &self.fields {
            lines.push(String::new());
            lines.push(format!("__{}__", field.name));
            lines.push(field.value.clone());
        }
        if let Some(footer) = &self.footer {
            lines.push(String::new());
            lines.push(format!("_{}_", footer));
        }
        lines.join("\n")
    }
}
