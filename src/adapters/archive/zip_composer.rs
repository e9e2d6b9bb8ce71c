//! ZIP implementation of the `ArchiveComposer` port.
//!
//! Entries are deflated and written in streaming mode: local headers are
//! followed by data descriptors, so nothing already sent has to be patched.
//! The encoder writes into a small shared buffer that is drained to the
//! output channel after every step, which keeps memory bounded by one chunk
//! plus the deflate window regardless of how many copies are bundled.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use zip::write::{SimpleFileOptions, StreamWriter};
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::output_channel::OutputChannel;
use crate::ports::{ArchiveComposer, ArchiveError, GeneratedDocument};

const COMPRESSION_LEVEL: i64 = 9;
const ENTRY_PERMISSIONS: u32 = 0o644;

/// Bytes produced by the encoder but not yet forwarded.
#[derive(Debug, Clone, Default)]
struct PendingBytes(Arc<Mutex<Vec<u8>>>);

impl PendingBytes {
    fn take(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut buffer = self
            .0
            .lock()
            .map_err(|_| ArchiveError::encoding("pending buffer lock poisoned"))?;
        Ok(std::mem::take(&mut *buffer))
    }
}

impl Write for PendingBytes {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "pending buffer lock poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Options applied to every entry. The timestamp is pinned to the DOS epoch
/// so identical inputs produce identical archives.
fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .last_modified_time(DateTime::default())
        .unix_permissions(ENTRY_PERMISSIONS)
}

/// Streams a ZIP archive into an [`OutputChannel`].
pub struct ZipArchiveComposer {
    writer: ZipWriter<StreamWriter<PendingBytes>>,
    pending: PendingBytes,
    channel: OutputChannel,
    entry_names: HashSet<String>,
    poisoned: bool,
}

impl ZipArchiveComposer {
    /// Creates a composer writing to `channel`.
    pub fn new(channel: OutputChannel) -> Self {
        let pending = PendingBytes::default();
        Self {
            writer: ZipWriter::new_stream(pending.clone()),
            pending,
            channel,
            entry_names: HashSet::new(),
            poisoned: false,
        }
    }

    /// Number of entries accepted so far.
    pub fn entry_count(&self) -> usize {
        self.entry_names.len()
    }

    async fn forward_pending(&mut self) -> Result<(), ArchiveError> {
        let bytes = self.pending.take()?;
        self.channel.send(bytes).await
    }

    async fn write_entry(
        &mut self,
        entry_name: &str,
        mut document: GeneratedDocument,
    ) -> Result<(), ArchiveError> {
        self.writer
            .start_file(entry_name, entry_options())
            .map_err(ArchiveError::encoding)?;
        self.forward_pending().await?;

        while let Some(chunk) = document.next().await {
            let chunk = chunk?;
            self.writer
                .write_all(&chunk)
                .map_err(ArchiveError::encoding)?;
            self.forward_pending().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ArchiveComposer for ZipArchiveComposer {
    async fn append(
        &mut self,
        entry_name: &str,
        document: GeneratedDocument,
    ) -> Result<(), ArchiveError> {
        if self.poisoned {
            return Err(ArchiveError::Poisoned);
        }
        if !self.entry_names.insert(entry_name.to_string()) {
            return Err(ArchiveError::DuplicateEntry(entry_name.to_string()));
        }

        let result = self.write_entry(entry_name, document).await;
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    async fn finalize(self: Box<Self>) -> Result<u64, ArchiveError> {
        let Self {
            writer,
            pending,
            mut channel,
            poisoned,
            ..
        } = *self;

        if poisoned {
            channel.fail("archive is incomplete").await;
            return Err(ArchiveError::Poisoned);
        }

        if let Err(err) = writer.finish() {
            let err = ArchiveError::encoding(err);
            channel.fail(&err.to_string()).await;
            return Err(err);
        }

        let tail = match pending.take() {
            Ok(tail) => tail,
            Err(err) => {
                channel.fail(&err.to_string()).await;
                return Err(err);
            }
        };
        channel.send(tail).await?;

        let total = channel.bytes_sent();
        channel.close();
        Ok(total)
    }

    async fn abort(self: Box<Self>, reason: &str) {
        // the encoder's buffered tail is dropped with `pending`, never sent
        let Self { channel, .. } = *self;
        channel.fail(reason).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::archive::output_channel::{output_channel, ChannelItem};
    use crate::ports::{DocumentChunk, RenderError};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn document(chunks: Vec<DocumentChunk>) -> GeneratedDocument {
        GeneratedDocument::from_chunks(chunks)
    }

    fn ok_document(bytes: &[u8]) -> GeneratedDocument {
        let chunks = bytes.chunks(7).map(|c| Ok(c.to_vec())).collect();
        document(chunks)
    }

    fn start() -> (
        ZipArchiveComposer,
        tokio::task::JoinHandle<Vec<ChannelItem>>,
    ) {
        let (channel, body) = output_channel(4);
        let collector = tokio::spawn(body.collect::<Vec<ChannelItem>>());
        (ZipArchiveComposer::new(channel), collector)
    }

    fn concat_ok(items: &[ChannelItem]) -> Vec<u8> {
        items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .flatten()
            .copied()
            .collect()
    }

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = Vec::new();
                file.read_to_end(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[tokio::test]
    async fn entries_are_written_in_append_order() {
        let (mut composer, collector) = start();
        composer.append("b.pdf", ok_document(b"second body")).await.unwrap();
        composer.append("a.pdf", ok_document(b"first body")).await.unwrap();
        composer.append("c.pdf", ok_document(b"")).await.unwrap();
        assert_eq!(composer.entry_count(), 3);

        let total = Box::new(composer).finalize().await.unwrap();
        let items = collector.await.unwrap();
        assert!(items.iter().all(Result::is_ok));

        let bytes = concat_ok(&items);
        assert_eq!(total, bytes.len() as u64);
        let entries = read_entries(bytes);
        assert_eq!(
            entries,
            vec![
                ("b.pdf".to_string(), b"second body".to_vec()),
                ("a.pdf".to_string(), b"first body".to_vec()),
                ("c.pdf".to_string(), Vec::new()),
            ]
        );
    }

    #[tokio::test]
    async fn entries_are_deflated() {
        let (mut composer, collector) = start();
        let body = "Questão ".repeat(500);
        composer.append("x.pdf", ok_document(body.as_bytes())).await.unwrap();
        Box::new(composer).finalize().await.unwrap();

        let bytes = concat_ok(&collector.await.unwrap());
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let file = archive.by_index(0).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        assert!(file.compressed_size() < file.size());
    }

    #[tokio::test]
    async fn duplicate_entry_is_rejected_without_poisoning() {
        let (mut composer, collector) = start();
        composer.append("same.pdf", ok_document(b"one")).await.unwrap();

        let duplicate = composer.append("same.pdf", ok_document(b"two")).await;
        assert!(matches!(duplicate, Err(ArchiveError::DuplicateEntry(name)) if name == "same.pdf"));

        composer.append("other.pdf", ok_document(b"three")).await.unwrap();
        Box::new(composer).finalize().await.unwrap();

        let entries = read_entries(concat_ok(&collector.await.unwrap()));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("same.pdf".to_string(), b"one".to_vec()));
    }

    #[tokio::test]
    async fn render_failure_poisons_the_archive() {
        let (mut composer, collector) = start();
        composer.append("ok.pdf", ok_document(b"fine")).await.unwrap();

        let failing = document(vec![
            Ok(b"partial".to_vec()),
            Err(RenderError::internal("layout blew up")),
        ]);
        let result = composer.append("bad.pdf", failing).await;
        assert!(matches!(result, Err(ArchiveError::Render(_))));

        let after = composer.append("late.pdf", ok_document(b"late")).await;
        assert!(matches!(after, Err(ArchiveError::Poisoned)));

        let finalized = Box::new(composer).finalize().await;
        assert!(matches!(finalized, Err(ArchiveError::Poisoned)));

        let items = collector.await.unwrap();
        assert!(items.last().unwrap().is_err());
        assert!(ZipArchive::new(Cursor::new(concat_ok(&items))).is_err());
    }

    #[tokio::test]
    async fn abort_ends_the_stream_with_an_error() {
        let (mut composer, collector) = start();
        composer.append("ok.pdf", ok_document(b"fine")).await.unwrap();
        Box::new(composer).abort("cancelled").await;

        let items = collector.await.unwrap();
        let last = items.last().unwrap().as_ref().unwrap_err();
        assert_eq!(last.to_string(), "cancelled");
        assert!(ZipArchive::new(Cursor::new(concat_ok(&items))).is_err());
    }

    #[tokio::test]
    async fn disconnected_consumer_stops_the_composer() {
        let (channel, body) = output_channel(1);
        drop(body);
        let mut composer = ZipArchiveComposer::new(channel);

        let result = composer.append("a.pdf", ok_document(b"data")).await;
        assert!(matches!(result, Err(ArchiveError::ChannelClosed)));

        let after = composer.append("b.pdf", ok_document(b"data")).await;
        assert!(matches!(after, Err(ArchiveError::Poisoned)));
    }

    #[tokio::test]
    async fn identical_inputs_produce_identical_archives() {
        let mut outputs = Vec::new();
        for _ in 0..2 {
            let (mut composer, collector) = start();
            composer.append("v1.pdf", ok_document(b"alpha")).await.unwrap();
            composer.append("v2.pdf", ok_document(b"beta")).await.unwrap();
            Box::new(composer).finalize().await.unwrap();
            outputs.push(concat_ok(&collector.await.unwrap()));
        }
        assert_eq!(outputs[0], outputs[1]);
    }
}
