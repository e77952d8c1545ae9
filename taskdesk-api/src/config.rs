/// Configuration management for the API server
///
/// Configuration is read from environment variables, with a `.env` file
/// loaded first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
/// - `JWT_EXPIRATION_HOURS`: Token lifetime (default: 168, i.e. 7 days)
/// - `ADMIN_INVITE_TOKEN`: Invite secret that makes a registrant an admin (optional)
/// - `CLIENT_URL`: Allowed CORS origins, comma separated, `*` for any
///   (default: http://localhost:3000)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 5000)
/// - `UPLOAD_DIR`: Where uploaded images are stored (default: uploads)
/// - `PUBLIC_URL`: Base URL used in uploaded image links (optional)
/// - `RUST_LOG`: Log filter (default: taskdesk_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any origin
    pub cors_origins: Vec<String>,

    /// Base URL for links to uploaded files, without a trailing slash
    pub public_url: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in hours
    pub expiration_hours: i64,
}

/// Registration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When unset, nobody can register as an admin
    pub admin_invite_token: Option<String>,
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric variable doesn't parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = var("PORT")
            .or_else(|| var("API_PORT"))
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?;

        let cors_origins = parse_origins(
            &var("CLIENT_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
        );

        let public_url = var("PUBLIC_URL").map(|url| url.trim_end_matches('/').to_string());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expiration_hours = var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|| "168".to_string())
            .parse::<i64>()?;

        if expiration_hours <= 0 {
            anyhow::bail!("JWT_EXPIRATION_HOURS must be positive");
        }

        let upload_dir = var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                public_url,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_hours,
            },
            auth: AuthConfig {
                admin_invite_token: var("ADMIN_INVITE_TOKEN"),
            },
            uploads: UploadConfig {
                dir: PathBuf::from(upload_dir),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS should allow any origin
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
