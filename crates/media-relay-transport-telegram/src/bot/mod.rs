/// Command and message handlers
pub mod handlers;
/// `ChatReplier` implementation over the Telegram Bot API
pub mod replier;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;

pub use replier::TelegramReplier;
