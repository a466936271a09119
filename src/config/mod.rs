use std::env;

/// Runtime configuration, loaded from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port (default: 3005)
    pub port: u16,

    /// Database connection string for the record stores
    pub database_url: String,

    /// AWS region used for both S3 and the Cognito issuer URL
    pub aws_region: String,

    /// Bucket holding the file objects
    pub s3_bucket: String,

    /// Optional S3-compatible endpoint override (MinIO and friends)
    pub s3_endpoint: Option<String>,

    /// Managed KMS key for server-side encryption on upload capabilities.
    /// When unset, S3 falls back to its default managed key.
    pub kms_key_id: Option<String>,

    /// Cognito user pool backing the identity verifier
    pub cognito_user_pool_id: String,

    /// Allowed CORS origins (comma separated in the environment)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3005,
            database_url: "sqlite://securecloud.db?mode=rwc".to_string(),
            aws_region: "eu-west-2".to_string(),
            s3_bucket: "securecloud-dev-files".to_string(),
            s3_endpoint: None,
            kms_key_id: None,
            cognito_user_pool_id: "local-dev-pool".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            aws_region: env::var("AWS_REGION").unwrap_or(default.aws_region),

            s3_bucket: env::var("S3_BUCKET").unwrap_or(default.s3_bucket),

            s3_endpoint: env::var("S3_ENDPOINT").ok(),

            kms_key_id: env::var("KMS_KEY_ID").ok(),

            cognito_user_pool_id: env::var("COGNITO_USER_POOL_ID")
                .unwrap_or(default.cognito_user_pool_id),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Issuer URL the identity verifier trusts.
    pub fn issuer_url(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.aws_region, self.cognito_user_pool_id
        )
    }
}
