use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::frame::{self, Frame, LENGTH_PREFIX_SIZE};

/// Async counterpart of [`read_frame`](crate::read_frame), with the same
/// end-of-stream, limit and truncation semantics.
///
/// # Errors
///
/// As for [`read_frame`](crate::read_frame).
pub async fn read_frame_async<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    config: &DecoderConfig,
) -> Result<Option<Frame>, DecodeError> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let mut filled = 0;
    while filled < LENGTH_PREFIX_SIZE {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    match filled {
        0 => return Ok(None),
        LENGTH_PREFIX_SIZE => {}
        _ => return Err(DecodeError::truncated("length prefix")),
    }
    let header_size = frame::header_size(prefix, config)?;

    let mut header_buf = vec![0u8; header_size];
    reader
        .read_exact(&mut header_buf)
        .await
        .map_err(|e| frame::eof_as_truncated(e, "blob header"))?;
    let header = frame::decode_header(&header_buf, config)?;

    let mut blob_buf = vec![0u8; header.data_size as usize];
    reader
        .read_exact(&mut blob_buf)
        .await
        .map_err(|e| frame::eof_as_truncated(e, "blob"))?;
    frame::finish(header, header_size, &blob_buf).map(Some)
}

/// Asynchronous frame reader over any `AsyncRead` source.
///
/// Frames are read only when the caller awaits the next one, so
/// backpressure falls out naturally. After an error or the end of the
/// stream, `next` keeps returning `None`.
///
/// # Example
///
/// ```rust,no_run
/// use pbf_decoder::{DecoderConfig, FrameStream, decode_frame};
/// use tokio::io::AsyncRead;
///
/// async fn count_blocks(reader: impl AsyncRead + Unpin) -> usize {
///     let config = DecoderConfig::default();
///     let mut stream = FrameStream::new(reader, config.clone());
///     let mut blocks = 0;
///     while let Some(frame) = stream.next().await {
///         if decode_frame(frame.unwrap(), &config).is_ok() {
///             blocks += 1;
///         }
///     }
///     blocks
/// }
/// ```
pub struct FrameStream<R> {
    reader: R,
    config: DecoderConfig,
    state: StreamState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
    ReadFrames,
    Done,
}

impl<R: AsyncRead + Unpin> FrameStream<R> {
    #[must_use]
    pub fn new(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            config,
            state: StreamState::ReadFrames,
        }
    }

    /// Read the next frame: `Some(Ok(frame))`, `Some(Err(..))` once on
    /// failure, or `None` at the end.
    pub async fn next(&mut self) -> Option<Result<Frame, DecodeError>> {
        if self.state == StreamState::Done {
            return None;
        }
        let result = read_frame_async(&mut self.reader, &self.config).await;
        match result {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.state = StreamState::Done;
                None
            }
            Err(e) => {
                self.state = StreamState::Done;
                Some(Err(e))
            }
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
