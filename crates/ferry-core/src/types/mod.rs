mod event;
mod ids;
mod state;
mod telegram;

pub use event::*;
pub use ids::*;
pub use state::*;
pub use telegram::*;
