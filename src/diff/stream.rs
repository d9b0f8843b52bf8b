//! Sources of JSON snapshots: standard input and HTTP watch endpoints.

use std::io::{Read, Write};
use std::marker::PhantomData;

use chrono::Local;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Deserializer, Value};

use super::error::{DiffError, DiffResult};
use super::snapshot::SnapshotDiffer;

/// One item of a Kubernetes-style watch stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatchEvent {
    #[serde(rename = "type", alias = "Type", default)]
    pub kind: String,
    #[serde(alias = "Object", default)]
    pub object: Value,
}

/// Diff every JSON value read from `reader` until EOF, writing blocks to `out`.
///
/// Returns the number of snapshots processed.
pub fn diff_reader<R: Read, W: Write>(reader: R, out: &mut W) -> DiffResult<usize> {
    let mut differ = SnapshotDiffer::new();
    let mut count = 0;

    for value in Deserializer::from_reader(reader).into_iter::<Value>() {
        let value = value.map_err(DiffError::Decode)?;
        out.write_all(differ.push(&value, &Local::now())?.as_bytes())?;
        out.flush()?;
        count += 1;
    }

    crate::debug_event!("diff", "input ended", "{count} snapshots");
    Ok(count)
}

/// Incremental decoder for a stream of concatenated JSON values that arrives in
/// arbitrary chunks.
#[derive(Debug)]
pub struct StreamDecoder<T> {
    pending: Vec<u8>,
    _item: PhantomData<T>,
}

impl<T: DeserializeOwned> StreamDecoder<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Append `chunk` and return every value it completes. A value cut off at
    /// the end of the chunk stays pending until more bytes arrive.
    pub fn feed(&mut self, chunk: &[u8]) -> DiffResult<Vec<T>> {
        self.pending.extend_from_slice(chunk);

        let mut values = Vec::new();
        let mut stream = Deserializer::from_slice(&self.pending).into_iter::<T>();
        let consumed = loop {
            match stream.next() {
                Some(Ok(value)) => values.push(value),
                Some(Err(e)) if e.is_eof() => break stream.byte_offset(),
                Some(Err(e)) => return Err(DiffError::Decode(e)),
                None => break stream.byte_offset(),
            }
        };

        self.pending.drain(..consumed);
        Ok(values)
    }

    /// Check that the stream did not end inside a value.
    pub fn finish(self) -> DiffResult<()> {
        if self.pending.iter().all(u8::is_ascii_whitespace) {
            Ok(())
        } else {
            Err(DiffError::Truncated {
                pending: self.pending.len(),
            })
        }
    }
}

impl<T: DeserializeOwned> Default for StreamDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Follow a watch endpoint, diffing the `object` of each event.
///
/// Each connection starts from an empty baseline. When the server ends the
/// stream the request is re-issued if `reconnect` is set.
pub async fn follow_watch<W: Write>(
    client: &reqwest::Client,
    url: &str,
    reconnect: bool,
    out: &mut W,
) -> DiffResult<()> {
    let request_error = |source| DiffError::Request {
        url: url.to_string(),
        source,
    };

    loop {
        let mut response = client.get(url).send().await.map_err(request_error)?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(DiffError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        crate::log_event!("diff", "connected", "{url}");

        let mut decoder = StreamDecoder::<WatchEvent>::new();
        let mut differ = SnapshotDiffer::new();

        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            for event in decoder.feed(&chunk)? {
                let block = differ.push(&event.object, &Local::now())?;
                writeln!(out, "{}", event.kind)?;
                out.write_all(block.as_bytes())?;
                out.flush()?;
            }
        }
        decoder.finish()?;

        if !reconnect {
            return Ok(());
        }
        crate::log_event!("diff", "stream ended", "reconnecting to {url}");
    }
}
