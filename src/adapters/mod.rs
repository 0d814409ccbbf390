// Adapters layer: concrete implementations of the domain ports (feed over HTTP,
// seen-set on disk, outbound chat channels).

pub mod console;
pub mod feed;
pub mod storage;
pub mod webhook;

pub use console::ConsoleChannel;
pub use feed::{FeedClient, FeedFormat};
pub use storage::JsonFileStore;
pub use webhook::{WebhookChannel, WebhookStyle};
