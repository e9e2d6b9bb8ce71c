//! Archive adapters - Streaming bundle output.
//!
//! - `OutputChannel` / `ChannelBody` - Bounded byte channel feeding a response body
//! - `ZipArchiveComposer` - `ArchiveComposer` that streams a deflated ZIP

mod output_channel;
mod zip_composer;

pub use output_channel::{output_channel, ChannelBody, ChannelItem, OutputChannel};
pub use zip_composer::ZipArchiveComposer;
