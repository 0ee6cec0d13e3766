use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub gemini_api_key: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Remote spreadsheet settings. Both `credentials_path` and `spreadsheet_id`
/// must be present for sync to be enabled; anything less selects local-only
/// mode, which is a supported configuration, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    pub credentials_path: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub worksheet_tab: String,
}

impl SheetsConfig {
    pub fn is_configured(&self) -> bool {
        self.credentials_path.is_some() && self.spreadsheet_id.is_some()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            llm: LlmConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
                gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                openai_base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                max_tokens: env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()),
                temperature: env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()),
            },
            sheets: SheetsConfig {
                credentials_path: env::var("SHEETS_CREDENTIALS_PATH").ok(),
                spreadsheet_id: env::var("SHEETS_SPREADSHEET_ID").ok(),
                worksheet_tab: env::var("SHEETS_WORKSHEET_TAB")
                    .unwrap_or_else(|_| "Sheet1".to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheets_capability_check() {
        let mut sheets = SheetsConfig {
            credentials_path: None,
            spreadsheet_id: None,
            worksheet_tab: "Sheet1".to_string(),
        };
        assert!(!sheets.is_configured());

        sheets.credentials_path = Some("/etc/paperdesk/sa.json".to_string());
        assert!(!sheets.is_configured());

        sheets.spreadsheet_id = Some("1abcDEF".to_string());
        assert!(sheets.is_configured());
    }
}
