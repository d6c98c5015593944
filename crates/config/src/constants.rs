pub const TOP_LEVEL_DOMAIN: &str = "io";
pub const AUTHOR: &str = "codesearch";
pub const APP_NAME: &str = "codesearch";

pub const CLIENT_CONFIG_FILE_NAME: &str = "client.toml";

/// Environment variable that overrides the config directory
pub const ENV_CONFIG_DIRECTORY: &str = "CONFIG_DIRECTORY";
