pub mod clock;
pub mod commands;
pub mod cycle;
pub mod format;
pub mod notifier;
pub mod scheduler;
pub mod upcoming;

pub use crate::domain::model::{Contest, Message, SeenSet};
pub use crate::domain::ports::{Channel, Clock, ConfigProvider, FeedSource, SeenStore};
pub use crate::utils::error::Result;
