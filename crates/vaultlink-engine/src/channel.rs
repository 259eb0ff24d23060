//! Action channel framing
//!
//! The engine consumes an established confidential duplex byte stream.
//! Frames are newline-delimited JSON: the peer sends actions and optional
//! progress values, the engine sends exactly one reply per action.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};

use vaultlink_core::{ActionReply, RemoteAction};

use crate::error::{EngineError, Result};

/// One observation from the channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A remote action to dispatch
    Action(RemoteAction),

    /// Transport progress in `[0.0, 1.0]`; observational only
    Progress(f32),

    /// Orderly closure (EOF or an explicit close frame)
    Closed,
}

/// Wire frames exchanged on the duplex stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelFrame {
    Action { action: RemoteAction },
    Progress { value: f32 },
    Reply { reply: ActionReply },
    Close,
}

/// Duplex channel carrying typed actions and replies
#[async_trait]
pub trait ActionChannel: Send {
    /// Read the next event; `Closed` is returned exactly once at the end
    async fn next(&mut self) -> Result<ChannelEvent>;

    /// Send the single reply for the most recent action
    async fn reply(&mut self, reply: &ActionReply) -> Result<()>;
}

/// Line-delimited JSON framing over any duplex stream
pub struct JsonLineChannel<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    line: String,
}

impl<S> JsonLineChannel<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    pub fn new(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(reader),
            writer,
            line: String::new(),
        }
    }

    async fn send_frame(&mut self, frame: &ChannelFrame) -> Result<()> {
        let json = serde_json::to_string(frame)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<S> ActionChannel for JsonLineChannel<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    async fn next(&mut self) -> Result<ChannelEvent> {
        self.line.clear();
        let read = self.reader.read_line(&mut self.line).await?;
        if read == 0 {
            return Ok(ChannelEvent::Closed);
        }

        // A malformed frame is a protocol error, fatal to the session.
        let frame: ChannelFrame = serde_json::from_str(self.line.trim_end())?;

        match frame {
            ChannelFrame::Action { action } => Ok(ChannelEvent::Action(action)),
            ChannelFrame::Progress { value } => Ok(ChannelEvent::Progress(value.clamp(0.0, 1.0))),
            ChannelFrame::Close => Ok(ChannelEvent::Closed),
            ChannelFrame::Reply { .. } => Err(EngineError::Transport(
                "unexpected reply frame from peer".to_string(),
            )),
        }
    }

    async fn reply(&mut self, reply: &ActionReply) -> Result<()> {
        self.send_frame(&ChannelFrame::Reply {
            reply: reply.clone(),
        })
        .await
    }
}
