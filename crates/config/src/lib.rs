pub mod constants;

pub use etcetera::AppStrategy;
use etcetera::{AppStrategyArgs, choose_app_strategy};

use std::env;
use std::path::PathBuf;

pub fn create_strategy() -> std::result::Result<impl AppStrategy, etcetera::HomeDirError> {
    choose_app_strategy(AppStrategyArgs {
        top_level_domain: constants::TOP_LEVEL_DOMAIN.to_string(),
        author: constants::AUTHOR.to_string(),
        app_name: constants::APP_NAME.to_string(),
    })
}

/// Resolve a directory: the environment variable wins, then the platform strategy,
/// then a folder under the system temp dir.
pub fn resolve_dir<S, F>(env_key: &str, strategy: &S, strategy_fn: F) -> PathBuf
where
    S: AppStrategy,
    F: FnOnce(&S) -> Option<PathBuf>,
{
    env::var_os(env_key)
        .map(PathBuf::from)
        .or_else(|| strategy_fn(strategy))
        .unwrap_or_else(|| env::temp_dir().join(constants::APP_NAME))
}

/// Location of the client configuration file.
pub fn client_config_path() -> PathBuf {
    match create_strategy() {
        Ok(strategy) => resolve_dir(constants::ENV_CONFIG_DIRECTORY, &strategy, |s| {
            Some(s.config_dir())
        }),
        Err(_) => env::var_os(constants::ENV_CONFIG_DIRECTORY)
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(constants::APP_NAME)),
    }
    .join(constants::CLIENT_CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_path_file_name() {
        let path = client_config_path();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(constants::CLIENT_CONFIG_FILE_NAME)
        );
    }
}
