//! Say command: log on, send one text message, disconnect.

use zello_core::NameRegistry;

use crate::config::ClientConfig;
use crate::credentials::CredentialSource;
use crate::error::ClientResult;

/// Sends `text` to the channel of account `account`.
pub async fn run(
    config: &ClientConfig,
    url: &str,
    account: usize,
    text: &str,
    to: Option<&str>,
) -> ClientResult<()> {
    let credentials = config.credentials(account)?;
    credentials.validate()?;
    let channel = credentials.channel.clone();

    let names = NameRegistry::new();
    let session = super::connect(config, url, &names).await?;

    let result = session
        .run(|ctx| async move {
            ctx.step(ctx.session().logon(&credentials)).await?;
            ctx.step(ctx.session().send_text_message(text, to)).await
        })
        .await;
    session.close().await;
    result?;

    match to {
        Some(user) => println!("Message sent to {} on {}.", user, channel),
        None => println!("Message sent to {}.", channel),
    }
    Ok(())
}
