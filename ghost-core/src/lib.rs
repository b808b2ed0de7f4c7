pub mod directory;
pub mod events;
pub mod network;
pub mod relay;
pub mod state;
pub mod update;

pub use directory::{UserDirectory, UserProfile};
pub use events::{ClassifiedEvent, IncomingMessage, classify};
pub use network::{ChatNetwork, FETCH_LIMIT, SelfIdentity, UpdateSink, UserLookup, WireMessage};
pub use relay::{Relay, RelayOutcome};
pub use state::{BotState, ReplySettings};
pub use update::{Peer, RawMessage, RawUpdate, ShortMessage, UserTyping};
