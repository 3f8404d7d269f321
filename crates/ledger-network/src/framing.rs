//! 4-byte big-endian length-prefixed JSON framing for [`Message`].

use crate::error::{NetworkError, NetworkResult};
use ledger_consensus::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Frames larger than this are rejected rather than trusted blindly off the
/// wire; real payloads (a handful of blocks plus a five-entry balance table)
/// never come close.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Read one length-prefixed frame and parse it as a [`Message`].
pub async fn read_message<R>(reader: &mut R) -> NetworkResult<Message>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(NetworkError::FrameTooLarge(len));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    let message = serde_json::from_slice(&body)?;
    Ok(message)
}

/// Serialize `message` to JSON and write it as one length-prefixed frame.
pub async fn write_message<W>(writer: &mut W, message: &Message) -> NetworkResult<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(message)?;
    let len = u32::try_from(body.len()).map_err(|_| NetworkError::FrameTooLarge(body.len()))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_consensus::Ballot;

    #[tokio::test]
    async fn round_trips_through_an_in_memory_duplex_stream() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let msg = Message::Prepare {
            from: 1,
            ballot: Ballot::new(3, 1),
            depth: 2,
        };
        write_message(&mut a, &msg).await.unwrap();
        let decoded = read_message(&mut b).await.unwrap();
        assert_eq!(decoded, msg);
    }

    #[tokio::test]
    async fn two_frames_back_to_back_are_read_in_order() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let first = Message::Recovery { from: 2 };
        let second = Message::Debug { from: 2, text: "hi".into() };
        write_message(&mut a, &first).await.unwrap();
        write_message(&mut a, &second).await.unwrap();
        assert_eq!(read_message(&mut b).await.unwrap(), first);
        assert_eq!(read_message(&mut b).await.unwrap(), second);
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected_before_reading_the_body() {
        let (mut a, mut b) = tokio::io::duplex(64);
        let too_big = (MAX_FRAME_BYTES as u32) + 1;
        a.write_all(&too_big.to_be_bytes()).await.unwrap();
        drop(a);
        let err = read_message(&mut b).await.unwrap_err();
        assert!(matches!(err, NetworkError::FrameTooLarge(_)));
    }

    #[tokio::test]
    async fn truncated_stream_is_an_io_error() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&4u32.to_be_bytes()).await.unwrap();
        a.write_all(b"ab").await.unwrap();
        drop(a);
        let err = read_message(&mut b).await.unwrap_err();
        assert!(matches!(err, NetworkError::Io(_)));
    }
}
