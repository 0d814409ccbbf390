use crate::core::format::render_announcement;
use crate::domain::model::Contest;
use crate::domain::ports::Channel;
use crate::utils::error::NotifyError;
use chrono::{DateTime, FixedOffset, Utc};

/// Renders contests and hands them to exactly one channel.
pub struct Notifier<C: Channel> {
    channel: C,
    offset: FixedOffset,
}

impl<C: Channel> Notifier<C> {
    pub fn new(channel: C, offset: FixedOffset) -> Self {
        Self { channel, offset }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub async fn notify(&self, contest: &Contest, now: DateTime<Utc>) -> Result<(), NotifyError> {
        let message = render_announcement(contest, now, self.offset);
        tracing::debug!(contest_id = %contest.id, "Delivering announcement");
        self.channel
            .deliver(&message)
            .await
            .map_err(|source| NotifyError::Delivery {
                contest_id: contest.id.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Message;
    use crate::utils::error::DeliveryError;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<Message>>,
        reject: bool,
    }

    #[async_trait::async_trait]
    impl Channel for RecordingChannel {
        async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
            if self.reject {
                return Err(DeliveryError::Status {
                    status: 404,
                    body: "Unknown Webhook".into(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn contest() -> Contest {
        Contest {
            id: "arc190".into(),
            title: "AtCoder Regular Contest 190".into(),
            start_time: Utc.with_ymd_and_hms(2025, 1, 12, 12, 0, 0).unwrap(),
            duration_seconds: 7200,
            url: None,
            rate_change: Some("1600 ~ 2999".into()),
        }
    }

    #[tokio::test]
    async fn test_notify_delivers_rendered_announcement() {
        let notifier = Notifier::new(RecordingChannel::default(), FixedOffset::east_opt(0).unwrap());
        let now = contest().start_time - Duration::hours(3);

        notifier.notify(&contest(), now).await.unwrap();

        let sent = notifier.channel().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "🔔 New contest: AtCoder Regular Contest 190");
        assert!(sent[0]
            .description
            .as_deref()
            .unwrap()
            .contains("**Duration:** 2h 0m"));
    }

    #[tokio::test]
    async fn test_notify_wraps_channel_rejection() {
        let channel = RecordingChannel {
            reject: true,
            ..Default::default()
        };
        let notifier = Notifier::new(channel, FixedOffset::east_opt(0).unwrap());

        let err = notifier
            .notify(&contest(), contest().start_time)
            .await
            .unwrap_err();
        let NotifyError::Delivery { contest_id, source } = err;
        assert_eq!(contest_id, "arc190");
        assert!(matches!(source, DeliveryError::Status { status: 404, .. }));
    }
}
