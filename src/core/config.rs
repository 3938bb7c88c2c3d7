use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_model: String,
    pub openai_api_hostname: String,
    // Credential to start the server with. Usually left unset and
    // provided at runtime via `POST /apiKey`.
    pub openai_api_key: Option<String>,
    // Outbound tunnel used to reach the provider network. `None`
    // connects directly.
    pub proxy_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let openai_api_hostname = env::var("RELAY_LLM_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_model =
            env::var("RELAY_LLM_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let proxy_url = parse_proxy_url(env::var("RELAY_PROXY_URL").ok());

        Self {
            openai_api_hostname,
            openai_api_key,
            openai_model,
            proxy_url,
        }
    }
}

/// The local tunnel is used unless explicitly overridden. An empty
/// value turns the proxy off.
fn parse_proxy_url(value: Option<String>) -> Option<String> {
    match value {
        None => Some(String::from("http://127.0.0.1:4780")),
        Some(url) if url.trim().is_empty() => None,
        Some(url) => Some(url.trim().to_string()),
    }
}
