//! Relay settings, read from flags with environment fallbacks.

use std::net::SocketAddr;

use clap::Parser;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "medcase-relay",
    about = "AI comparison relay: matching cases from Supabase, analysed by Gemini."
)]
pub struct RelayConfig {
    /// Address the HTTP server binds to.
    #[arg(long, env = "MEDCASE_RELAY_ADDR", default_value = "0.0.0.0:5000")]
    pub addr: SocketAddr,

    /// Supabase project URL, e.g. https://xyz.supabase.co
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_key: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// The single browser origin allowed by CORS.
    #[arg(long, env = "MEDCASE_ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    pub allowed_origin: String,

    /// Timeout applied to every outbound HTTP request, in seconds.
    #[arg(long, env = "MEDCASE_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// Maximum number of matching cases embedded in one prompt.
    #[arg(long, env = "MEDCASE_COMPARE_LIMIT", default_value_t = 10)]
    pub compare_limit: usize,
}
