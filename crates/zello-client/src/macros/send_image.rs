use tracing::{Instrument, debug, info};

use zello_protocol::{ImagePacketType, Packet, SendImageRequest, SendTextMessageRequest};

use crate::error::{ClientError, ClientResult};
use crate::image::ImageResizer;
use crate::session::{Session, check_status};

impl Session {
    /// Sends an image to the channel, or to `recipient` only.
    ///
    /// `image` may be in any format `resizer` understands. Returns the id the
    /// server assigned.
    pub async fn send_image(
        &self,
        image: &[u8],
        resizer: &dyn ImageResizer,
        recipient: Option<&str>,
    ) -> ClientResult<u32> {
        let resized = resizer.resize(image)?;
        resized.check()?;

        let mut request = SendImageRequest::jpeg(
            resized.width,
            resized.height,
            resized.full.len(),
            resized.thumbnail.len(),
        );
        request.recipient = recipient.map(str::to_string);

        async {
            let response = self.send_command(&request).await?;
            check_status(&response.status)?;
            let image_id = response
                .image_id
                .ok_or_else(|| ClientError::Protocol("send_image response without image_id".into()))?;
            debug!(image_id, "sending image");

            self.send_packet(&Packet::image(
                image_id,
                ImagePacketType::Thumbnail,
                resized.thumbnail,
            ))
            .await?;
            self.send_packet(&Packet::image(image_id, ImagePacketType::FullImage, resized.full))
                .await?;
            info!(image_id, "image sent");
            Ok(image_id)
        }
        .instrument(self.span().clone())
        .await
    }

    /// Sends a text message to the channel, or to `recipient` only.
    pub async fn send_text_message(&self, text: &str, recipient: Option<&str>) -> ClientResult<()> {
        let request = SendTextMessageRequest {
            text: text.to_string(),
            recipient: recipient.map(str::to_string),
        };
        let response = self.send_command(&request).await?;
        check_status(&response)?;
        debug!(parent: self.span(), len = text.len(), "text message sent");
        Ok(())
    }
}
