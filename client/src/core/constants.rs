// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Billdesk";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "billdesk";

/// Crate target used in the default log filter
pub const CRATE_TARGET: &str = "billdesk_client";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".billdesk";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "billdesk.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "BILLDESK_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "BILLDESK_LOG";

// =============================================================================
// Environment Variables - API
// =============================================================================

/// Environment variable for the API base URL
pub const ENV_API_URL: &str = "BILLDESK_API_URL";

/// Environment variable for the platform path prefix
pub const ENV_PLATFORM_PREFIX: &str = "BILLDESK_PLATFORM_PREFIX";

/// Environment variable for the transport request timeout
pub const ENV_API_TIMEOUT_SECS: &str = "BILLDESK_API_TIMEOUT_SECS";

// =============================================================================
// API Defaults
// =============================================================================

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";

/// Reserved path prefix routing requests to the platform session
pub const DEFAULT_PLATFORM_PREFIX: &str = "/platform";

/// Default transport request timeout (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Tenant login endpoint
pub const DEFAULT_LOGIN_ENDPOINT: &str = "/auth/login";

/// Tenant registration endpoint
pub const DEFAULT_REGISTER_ENDPOINT: &str = "/auth/register";

/// Tenant token refresh endpoint
pub const DEFAULT_REFRESH_ENDPOINT: &str = "/auth/refresh";

/// Platform-admin login endpoint
pub const DEFAULT_PLATFORM_LOGIN_ENDPOINT: &str = "/platform/auth/login";

// =============================================================================
// Navigation Defaults
// =============================================================================

/// Tenant login surface
pub const DEFAULT_TENANT_LOGIN_ROUTE: &str = "/login";

/// Platform login surface
pub const DEFAULT_PLATFORM_LOGIN_ROUTE: &str = "/platform/login";

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "BILLDESK_DATA_DIR";

/// Environment variable to force a session storage backend (`file`, `keyring`, `memory`)
pub const ENV_STORAGE_BACKEND: &str = "BILLDESK_STORAGE_BACKEND";

/// Service name for keychain/credential manager entries
pub const KEYRING_SERVICE_NAME: &str = "billdesk";

/// File name of the file-backed session store
pub const SESSION_FILE_NAME: &str = "session.json";

// =============================================================================
// Durable Session Keys
// =============================================================================

/// Tenant session blob (JSON: token + user)
pub const STORAGE_KEY_TENANT_SESSION: &str = "billdesk.session";

/// Platform-admin credential (plain string)
pub const STORAGE_KEY_PLATFORM_TOKEN: &str = "billdesk.platform_token";
