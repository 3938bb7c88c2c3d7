use std::sync::{Arc, RwLock};

use crate::chat::Conversation;
use crate::core::AppConfig;
use crate::openai::Provider;

pub type SharedState = Arc<RwLock<AppState>>;

pub struct AppState {
    // Replaced by every successful `POST /apiKey`
    pub provider: Option<Provider>,
    pub conversation: Conversation,
    // Held from the user's message until the reply is recorded so
    // turns never interleave in the conversation
    pub turn_lock: Arc<tokio::sync::Mutex<()>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            provider: None,
            conversation: Conversation::new(),
            turn_lock: Arc::new(tokio::sync::Mutex::new(())),
            config,
        }
    }
}
