//! Source reader adapter
//!
//! Opens local files and HTTP(S) URLs as buffered record streams. Gzip is
//! detected from the first two bytes, so `.gz` suffixes are not required and
//! plain-text sources work unchanged.

use std::io;
use std::path::Path;
use std::time::Duration;

use async_compression::tokio::bufread::GzipDecoder;
use async_trait::async_trait;
use futures::TryStreamExt;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::domain::{SourceLocation, ValidatorConfig};
use crate::error::SourceError;
use crate::ports::{CouponSourceReader, RecordReader};

/// Buffer size for both the raw and the decompressed side
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reader for local and remote sources
#[derive(Clone, Debug)]
pub struct StreamingSourceReader {
    client: reqwest::Client,
}

impl StreamingSourceReader {
    /// `http_timeout` bounds each whole HTTP exchange, body included
    pub fn new(http_timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ValidatorConfig) -> Result<Self, SourceError> {
        Self::new(config.http_timeout)
    }

    async fn open_local(&self, path: &Path) -> Result<RecordReader, SourceError> {
        let file = File::open(path).await?;
        decode(BufReader::with_capacity(READ_BUFFER_SIZE, file)).await
    }

    async fn open_remote(&self, url: &str) -> Result<RecordReader, SourceError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        debug!(url, content_length = ?response.content_length(), "Streaming remote source");

        let body = response.bytes_stream().map_err(io::Error::other);
        let reader = StreamReader::new(Box::pin(body));
        decode(BufReader::with_capacity(READ_BUFFER_SIZE, reader)).await
    }
}

/// Wrap `reader` in a gzip decoder when the stream starts with the gzip magic
async fn decode<R>(mut reader: R) -> Result<RecordReader, SourceError>
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    let is_gzip = reader.fill_buf().await?.starts_with(&GZIP_MAGIC);
    if !is_gzip {
        return Ok(Box::pin(reader));
    }

    let mut decoder = GzipDecoder::new(reader);
    decoder.multiple_members(true);
    Ok(Box::pin(BufReader::with_capacity(READ_BUFFER_SIZE, decoder)))
}

#[async_trait]
impl CouponSourceReader for StreamingSourceReader {
    async fn open(&self, location: &SourceLocation) -> Result<RecordReader, SourceError> {
        match location {
            SourceLocation::Remote(url) => self.open_remote(url).await,
            SourceLocation::Local(path) => self.open_local(path).await,
        }
    }
}
