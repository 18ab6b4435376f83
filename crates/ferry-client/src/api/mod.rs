//! API endpoint modules.

mod account;
mod callbacks;
mod messages;
mod updates;

pub use account::AccountApi;
pub use callbacks::CallbacksApi;
pub use messages::{EditMessageBuilder, MessagesApi, SendMessageBuilder};
pub use updates::{UpdatePoller, UpdatesApi};
