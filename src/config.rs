use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub sender_name: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let username = std::env::var("EMAIL_USER")?;
        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".into()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(465),
            password: std::env::var("EMAIL_PASS")?,
            sender_name: std::env::var("APP_NAME").unwrap_or_else(|_| "Snorensics".into()),
            from_address: std::env::var("EMAIL_FROM").unwrap_or_else(|_| username.clone()),
            username,
        };
        Ok(Self { database_url, mail })
    }
}
