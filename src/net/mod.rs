pub mod channel;
pub mod socket;
pub mod types;

pub use channel::{Channel, ChannelEvent, ChannelHandle};
pub use socket::{connect, socket_url};
pub use types::{InboundEvent, OutboundEvent};
