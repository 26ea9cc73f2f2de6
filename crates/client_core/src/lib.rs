//! Conversation core for the animation chat client: the message store, the
//! generation endpoint client, persistence glue and the controller tying them together.

pub mod controller;
pub mod generation;
pub mod persistence;
pub mod store;

pub use controller::{ConversationController, StoreEvent, SubmitReceipt, INTERRUPTED_MESSAGE};
pub use generation::{
    GenerationBackend, GenerationError, HttpGenerationClient, CONNECTION_FAILURE_MESSAGE,
    DEFAULT_SUCCESS_TEXT, GENERIC_FAILURE_MESSAGE,
};
pub use persistence::{DurableStore, MemoryDurableStore, MESSAGES_STORAGE_KEY};
pub use store::MessageStore;
