/// Server configuration
///
/// # Environment variables
///
/// Every item can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/greenbasket | working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_TO_FILE | false | also write logs to WORK_DIR/logs |
/// | PAYMENT_DELAY_MS | 1500 | simulated gateway processing delay |
/// | PAYMENT_SUCCESS_RATE | 0.9 | simulated gateway approval probability |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/greenbasket HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Mirror logs into WORK_DIR/logs with daily rotation
    pub log_to_file: bool,
    /// Simulated payment gateway delay (milliseconds)
    pub payment_delay_ms: u64,
    /// Simulated payment gateway approval probability (0.0..=1.0)
    pub payment_success_rate: f64,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/greenbasket".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_to_file: std::env::var("LOG_TO_FILE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            payment_delay_ms: std::env::var("PAYMENT_DELAY_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1500),
            payment_success_rate: std::env::var("PAYMENT_SUCCESS_RATE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(0.9),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("database")
    }

    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
