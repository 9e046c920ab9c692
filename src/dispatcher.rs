use parking_lot::Mutex;
use std::io::Write;

use crate::error::BridgeError;
use crate::frame::CommandFrame;

/// Sole writer to the controller link.
///
/// Every frame is formatted and written while holding one channel-wide lock,
/// so frames from the reader and the aggregator never interleave on the wire.
pub struct Dispatcher<W: Write + Send> {
    channel: Mutex<W>,
}

impl<W: Write + Send> Dispatcher<W> {
    pub fn new(channel: W) -> Self {
        Self {
            channel: Mutex::new(channel),
        }
    }

    pub fn send(&self, frame: CommandFrame) -> Result<(), BridgeError> {
        let mut channel = self.channel.lock();
        let command = frame.to_wire();
        channel.write_all(command.as_bytes())?;
        channel.flush()?;

        match frame {
            CommandFrame::MotorSet { channel, value } => {
                tracing::debug!(channel, value, "motor set");
            }
            CommandFrame::RelayMask(mask) => {
                tracing::info!(pattern = %mask, "relays activated");
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.channel.into_inner()
    }
}
