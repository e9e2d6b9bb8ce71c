//! Bounded byte channel between an export task and the HTTP response body.
//!
//! The producer side awaits on `send`, so a slow client pauses the export
//! instead of letting chunks pile up in memory. Dropping the receiving body
//! (client disconnect) makes the next `send` fail with `ChannelClosed`.

use std::io;

use futures::channel::mpsc;
use futures::SinkExt;

use crate::ports::ArchiveError;

/// Items carried to the response body. An `Err` makes the HTTP server abort
/// the connection instead of terminating the body cleanly.
pub type ChannelItem = Result<Vec<u8>, io::Error>;

/// Receiving half, suitable for `axum::body::Body::from_stream`.
pub type ChannelBody = mpsc::Receiver<ChannelItem>;

/// Create a channel holding at most `capacity` chunks in flight.
pub fn output_channel(capacity: usize) -> (OutputChannel, ChannelBody) {
    let (sender, receiver) = mpsc::channel(capacity);
    (
        OutputChannel {
            sender,
            bytes_sent: 0,
        },
        receiver,
    )
}

/// Sending half of an export's output channel.
#[derive(Debug)]
pub struct OutputChannel {
    sender: mpsc::Sender<ChannelItem>,
    bytes_sent: u64,
}

impl OutputChannel {
    /// Forward `chunk` to the consumer, waiting for room if necessary.
    /// Empty chunks are skipped.
    pub async fn send(&mut self, chunk: Vec<u8>) -> Result<(), ArchiveError> {
        if chunk.is_empty() {
            return Ok(());
        }
        let len = chunk.len() as u64;
        self.sender
            .send(Ok(chunk))
            .await
            .map_err(|_| ArchiveError::ChannelClosed)?;
        self.bytes_sent += len;
        Ok(())
    }

    /// Terminate the stream with an error so the consumer sees a failed
    /// transfer rather than a short but well-formed one.
    pub async fn fail(mut self, reason: &str) {
        let error = io::Error::new(io::ErrorKind::Other, reason.to_string());
        // consumer may already be gone; nothing left to report to
        let _ = self.sender.send(Err(error)).await;
    }

    /// Signal a clean end-of-stream.
    pub fn close(mut self) {
        self.sender.close_channel();
    }

    /// Total payload bytes accepted by the consumer so far.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn chunks_arrive_in_order_then_stream_ends() {
        let (mut channel, body) = output_channel(4);
        channel.send(b"ab".to_vec()).await.unwrap();
        channel.send(Vec::new()).await.unwrap();
        channel.send(b"cd".to_vec()).await.unwrap();
        assert_eq!(channel.bytes_sent(), 4);
        channel.close();

        let items: Vec<ChannelItem> = body.collect().await;
        let chunks: Vec<Vec<u8>> = items.into_iter().map(Result::unwrap).collect();
        assert_eq!(chunks, vec![b"ab".to_vec(), b"cd".to_vec()]);
    }

    #[tokio::test]
    async fn fail_delivers_an_error_item() {
        let (mut channel, body) = output_channel(4);
        channel.send(b"partial".to_vec()).await.unwrap();
        channel.fail("render fault").await;

        let items: Vec<ChannelItem> = body.collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1].as_ref().unwrap_err().to_string(), "render fault");
    }

    #[tokio::test]
    async fn send_fails_once_consumer_is_dropped() {
        let (mut channel, body) = output_channel(1);
        drop(body);

        let result = channel.send(b"x".to_vec()).await;
        assert!(matches!(result, Err(ArchiveError::ChannelClosed)));
    }

    #[tokio::test]
    async fn full_channel_applies_backpressure() {
        let (mut channel, mut body) = output_channel(1);
        channel.send(b"first".to_vec()).await.unwrap();

        // the buffer is full, so the next send waits until a chunk is read
        {
            let mut second = Box::pin(channel.send(b"second".to_vec()));
            assert!(futures::poll!(second.as_mut()).is_pending());

            assert_eq!(body.next().await.unwrap().unwrap(), b"first".to_vec());
            second.await.unwrap();
        }

        assert_eq!(channel.bytes_sent(), 11);
        assert_eq!(body.next().await.unwrap().unwrap(), b"second".to_vec());
    }
}
