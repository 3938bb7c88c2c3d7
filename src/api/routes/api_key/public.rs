//! Public types for the credential API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ApiKeyRequest {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StatusResponse {
    pub status: u16,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: 200 }
    }
}
