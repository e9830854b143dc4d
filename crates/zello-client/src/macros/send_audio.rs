use std::time::Duration;

use futures_util::StreamExt;
use tracing::{Instrument, debug, info, warn};

use zello_protocol::{OpusInfo, Packet, StartStreamRequest, StopStreamRequest};

use super::{Pacer, SendAudioOptions};
use crate::audio::OpusReader;
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, check_status};

/// Time covered by one outbound packet.
pub(crate) fn packet_interval(info: &OpusInfo) -> Duration {
    info.frame_duration() * info.frames_per_packet.max(1)
}

impl Session {
    /// Takes the channel and streams `audio` to it in real time.
    ///
    /// A `channel busy` answer is retried as configured in `options.retry`.
    /// The stream is stopped once the input is exhausted, and also when the
    /// input fails; if the session itself fails mid-stream the error is
    /// returned without stopping.
    pub async fn send_audio(&self, audio: OpusReader, options: &SendAudioOptions) -> ClientResult<()> {
        let OpusReader {
            opus_info,
            mut packets,
        } = audio;
        opus_info.validate()?;

        let mut request = StartStreamRequest::audio(&opus_info)?;
        if let Some(recipient) = &options.recipient {
            request = request.to_user(recipient.clone());
        }

        let span = self.span().clone();
        async {
            let stream_id = self
                .guard(options.retry.run(|attempt| {
                    debug!(attempt, "requesting channel");
                    self.start_stream(&request)
                }))
                .await?;
            info!(stream_id, "sending audio");

            let mut pacer = Pacer::new(packet_interval(&opus_info));
            let mut packet_id = 0u32;
            let outcome = loop {
                let next = self.guard(async { Ok(packets.next().await) }).await?;
                let payload = match next {
                    Some(Ok(payload)) => payload,
                    Some(Err(e)) => {
                        warn!(stream_id, error = %e, "audio input failed");
                        break Err(e);
                    }
                    None => break Ok(()),
                };
                self.guard(async {
                    pacer.tick().await;
                    Ok(())
                })
                .await?;
                self.send_packet(&Packet::audio(stream_id, packet_id, payload))
                    .await?;
                packet_id = packet_id.wrapping_add(1);
            };

            let stopped = self.stop_stream(stream_id).await;
            match (&outcome, stopped) {
                (Ok(()), Err(e)) => return Err(e),
                (Err(_), Err(e)) => warn!(stream_id, error = %e, "failed to stop stream"),
                (_, Ok(())) => {}
            }
            info!(stream_id, packets = packet_id, "audio sent");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn start_stream(&self, request: &StartStreamRequest) -> ClientResult<u32> {
        let response = self.send_command(request).await?;
        check_status(&response.status)?;
        response
            .stream_id
            .ok_or_else(|| ClientError::Protocol("start_stream response without stream_id".into()))
    }

    async fn stop_stream(&self, stream_id: u32) -> ClientResult<()> {
        let response = self.send_command(&StopStreamRequest { stream_id }).await?;
        check_status(&response)
    }
}
