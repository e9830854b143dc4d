//! Configuration commands.

use crate::config::ClientConfig;
use crate::credentials::CredentialSource;
use crate::error::{ClientError, ClientResult};
use crate::secret::redact;

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let mut shown = config.clone();
    for account in &mut shown.accounts {
        account.password = account.password.as_deref().map(redact);
        account.auth_token = redact(&account.auth_token);
    }
    let toml_str = toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    // resolve every account so broken secret references show up now
    for index in 0..config.account_count() {
        let credentials = config.credentials(index)?;
        credentials.validate()?;
        println!("Account {} ({}) is valid.", index, credentials.channel);
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}
