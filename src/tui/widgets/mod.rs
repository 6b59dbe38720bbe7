mod messages;

pub use messages::{MessageList, MessageListState};
