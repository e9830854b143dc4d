//! Listen command: log on and report what happens on the channel.

use std::time::Duration;

use tracing::{debug, info};

use zello_core::NameRegistry;
use zello_protocol::{Event, EventCode};

use crate::config::ClientConfig;
use crate::credentials::CredentialSource;
use crate::error::ClientResult;
use crate::session::Session;

/// Listens on the channel of account `account` until `seconds` elapse,
/// Ctrl-C is pressed, or the connection drops.
pub async fn run(
    config: &ClientConfig,
    url: &str,
    account: usize,
    seconds: Option<u64>,
) -> ClientResult<()> {
    let credentials = config.credentials(account)?;
    credentials.validate()?;

    let names = NameRegistry::new();
    let session = super::connect(config, url, &names).await?;
    install_reporters(&session);

    let result = session
        .run(|ctx| async move {
            let outcome = ctx.step(ctx.session().logon(&credentials)).await?;
            println!(
                "Listening on {} ({} online).",
                outcome.channel_status.channel, outcome.channel_status.users_online
            );

            ctx.step(async {
                tokio::select! {
                    _ = sleep_for(seconds) => debug!("listen time is up"),
                    _ = tokio::signal::ctrl_c() => debug!("interrupted"),
                }
                Ok(())
            })
            .await
        })
        .await;
    session.close().await;
    result
}

async fn sleep_for(seconds: Option<u64>) {
    match seconds {
        Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds)).await,
        None => std::future::pending().await,
    }
}

fn install_reporters(session: &Session) {
    session.on(EventCode::TextMessage, |event| {
        if let Event::TextMessage(message) = event {
            println!("[{}] {}: {}", message.channel, message.from, message.text);
        }
    });
    session.on(EventCode::ChannelStatus, |event| {
        if let Event::ChannelStatus(status) = event {
            info!(channel = %status.channel, status = %status.status, users = status.users_online, "channel status");
        }
    });
    session.on(EventCode::Image, |event| {
        if let Event::Image(image) = event {
            println!("[{}] {} sent an image ({}x{})", image.channel, image.from, image.width, image.height);
        }
    });

    session.on_audio_stream(|mut incoming| {
        let stream_id = incoming.stream_id();
        println!(
            "[{}] {} is talking ({} Hz, {}ms frames)",
            incoming.event.channel,
            incoming.event.from,
            incoming.opus_info.sample_rate,
            incoming.opus_info.frame_size
        );
        tokio::spawn(async move {
            let mut packets = 0u32;
            let mut bytes = 0usize;
            while let Some(packet) = incoming.next_packet().await {
                packets += 1;
                bytes += packet.payload.len();
            }
            info!(stream_id, packets, bytes, "stream ended");
        });
    });
}
