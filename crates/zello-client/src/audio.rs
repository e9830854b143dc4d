//! Audio on both sides of a session.
//!
//! Outbound audio is an [`OpusReader`]: stream parameters plus a stream of
//! encoded packets, built either from packets that are already Opus or from
//! PCM through an [`AudioEncoder`]. Inbound streams arrive as
//! [`IncomingAudio`] and can be decoded into a paced PCM reader.
//!
//! The codecs themselves are collaborators behind traits; this crate only
//! moves their bytes around.

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{Instrument, Span, debug, warn};

use zello_protocol::{OpusInfo, StreamStartEvent, opus_packet_info};

use crate::error::{ClientError, ClientResult};
use crate::flow::{FlowReader, flow_buffer};

/// Bytes per 16-bit PCM sample.
const SAMPLE_BYTES: usize = 2;

/// One packet of an inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPacket {
    pub packet_id: u32,
    pub payload: Vec<u8>,
}

/// Encodes 16-bit little-endian PCM into Opus packets.
pub trait AudioEncoder: Send + 'static {
    /// Parameters of the packets this encoder produces.
    fn opus_info(&self) -> OpusInfo;

    /// Encodes exactly one packet worth of PCM.
    fn encode(&mut self, pcm: &[u8]) -> ClientResult<Vec<u8>>;
}

/// Decodes Opus packets into 16-bit little-endian PCM.
pub trait AudioDecoder: Send + 'static {
    fn decode(&mut self, packet: &[u8]) -> ClientResult<Vec<u8>>;
}

/// Encoded audio ready to be sent.
pub struct OpusReader {
    pub opus_info: OpusInfo,
    pub packets: BoxStream<'static, ClientResult<Vec<u8>>>,
}

impl std::fmt::Debug for OpusReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpusReader")
            .field("opus_info", &self.opus_info)
            .finish_non_exhaustive()
    }
}

impl OpusReader {
    pub fn new<S>(opus_info: OpusInfo, packets: S) -> Self
    where
        S: Stream<Item = ClientResult<Vec<u8>>> + Send + 'static,
    {
        Self {
            opus_info,
            packets: packets.boxed(),
        }
    }

    /// Wraps packets that are already Opus encoded.
    ///
    /// Frame layout is read from the TOC byte of the first packet; the
    /// sample rate cannot be recovered from a packet and must be given.
    pub fn from_packets(sample_rate: u32, packets: Vec<Vec<u8>>) -> ClientResult<Self> {
        let first = packets
            .first()
            .ok_or_else(|| ClientError::Audio("no packets to send".into()))?;
        let layout = opus_packet_info(first)
            .ok_or_else(|| ClientError::Audio("first packet is empty".into()))?;
        let opus_info = OpusInfo::mono(sample_rate, layout.frames_per_packet, layout.frame_size);
        debug!(?opus_info, packets = packets.len(), "opus packets loaded");
        Ok(Self::new(opus_info, stream::iter(packets.into_iter().map(Ok))))
    }

    /// Encodes a PCM stream on the fly.
    ///
    /// Incoming chunks are cut into whole packets; a short tail is padded
    /// with silence.
    pub fn from_encoder<E, S>(encoder: E, pcm: S) -> Self
    where
        E: AudioEncoder,
        S: Stream<Item = Vec<u8>> + Send + 'static,
    {
        let opus_info = encoder.opus_info();
        let packet_bytes = packet_pcm_bytes(&opus_info).max(SAMPLE_BYTES);
        let state = Reframer {
            encoder,
            pcm: pcm.boxed(),
            pending: Vec::new(),
            packet_bytes,
            done: false,
        };
        Self::new(opus_info, stream::unfold(state, Reframer::next_packet))
    }
}

struct Reframer<E> {
    encoder: E,
    pcm: BoxStream<'static, Vec<u8>>,
    pending: Vec<u8>,
    packet_bytes: usize,
    done: bool,
}

impl<E: AudioEncoder> Reframer<E> {
    async fn next_packet(mut self) -> Option<(ClientResult<Vec<u8>>, Self)> {
        loop {
            if self.pending.len() >= self.packet_bytes {
                let rest = self.pending.split_off(self.packet_bytes);
                let frame = std::mem::replace(&mut self.pending, rest);
                let packet = self.encoder.encode(&frame);
                return Some((packet, self));
            }
            if self.done {
                if self.pending.is_empty() {
                    return None;
                }
                let mut frame = std::mem::take(&mut self.pending);
                frame.resize(self.packet_bytes, 0);
                let packet = self.encoder.encode(&frame);
                return Some((packet, self));
            }
            match self.pcm.next().await {
                Some(chunk) => self.pending.extend_from_slice(&chunk),
                None => self.done = true,
            }
        }
    }
}

/// PCM bytes needed for one packet of `info`.
pub fn packet_pcm_bytes(info: &OpusInfo) -> usize {
    info.samples_per_frame()
        * info.frames_per_packet as usize
        * usize::from(info.channels.max(1))
        * SAMPLE_BYTES
}

/// Playback settings for decoded inbound audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Audio held back before playback starts, in seconds.
    pub buffer_secs: f32,
    /// Usual size of one consumer pull, in bytes.
    pub pull_bytes: usize,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            buffer_secs: 1.0,
            pull_bytes: 3840,
        }
    }
}

/// Buffer size for `buffer_secs` of a stream.
///
/// Counted in whole packets of `packet_duration_ms`, falling back to the
/// frame size when the event did not announce one.
pub fn playback_buffer_bytes(info: &OpusInfo, packet_duration_ms: u32, buffer_secs: f32) -> usize {
    let duration = if packet_duration_ms == 0 {
        info.frame_size
    } else {
        packet_duration_ms as f32
    };
    if duration <= 0.0 {
        return 0;
    }
    let packets = (buffer_secs.max(0.0) * 1000.0 / duration).round() as usize;
    packets * info.samples_per_frame() * info.frames_per_packet as usize
}

/// An inbound audio stream, handed to the handler installed with
/// [`Session::on_audio_stream`](crate::Session::on_audio_stream).
#[derive(Debug)]
pub struct IncomingAudio {
    pub event: StreamStartEvent,
    pub opus_info: OpusInfo,
    packets: mpsc::Receiver<AudioPacket>,
}

impl IncomingAudio {
    pub(crate) fn new(
        event: StreamStartEvent,
        opus_info: OpusInfo,
        packets: mpsc::Receiver<AudioPacket>,
    ) -> Self {
        Self {
            event,
            opus_info,
            packets,
        }
    }

    pub fn stream_id(&self) -> u32 {
        self.event.stream_id
    }

    /// Next encoded packet; `None` once the stream stopped.
    pub async fn next_packet(&mut self) -> Option<AudioPacket> {
        self.packets.recv().await
    }

    /// Encoded packets as a stream.
    pub fn into_packets(self) -> impl Stream<Item = AudioPacket> + Send {
        stream::unfold(self.packets, |mut rx| async move {
            let packet = rx.recv().await?;
            Some((packet, rx))
        })
    }

    /// Decodes the stream into a buffered PCM reader.
    ///
    /// Decoding runs on its own task. Packets that fail to decode are
    /// skipped; the reader ends after the stream stops and the buffer has
    /// drained.
    pub fn into_pcm<D: AudioDecoder>(self, mut decoder: D, options: PlaybackOptions) -> FlowReader {
        let max_bytes = playback_buffer_bytes(
            &self.opus_info,
            self.event.packet_duration,
            options.buffer_secs,
        );
        let (mut writer, reader) = flow_buffer(max_bytes, options.pull_bytes);
        let stream_id = self.event.stream_id;
        let mut packets = self.packets;

        debug!(stream_id, max_bytes, "decoding inbound stream");
        tokio::spawn(
            async move {
                while let Some(packet) = packets.recv().await {
                    let pcm = match decoder.decode(&packet.payload) {
                        Ok(pcm) => pcm,
                        Err(e) => {
                            warn!(stream_id, packet_id = packet.packet_id, error = %e, "failed to decode packet");
                            continue;
                        }
                    };
                    if writer.write(pcm).await.is_err() {
                        debug!(stream_id, "playback consumer gone");
                        return;
                    }
                }
                debug!(stream_id, "inbound stream drained");
                writer.finish();
            }
            .instrument(Span::current()),
        );
        reader
    }
}
