use crossbeam::channel::{Receiver, Sender};
use midir::{MidiInput, MidiInputConnection};

use crate::error::BridgeError;
use crate::events::MidiEvent;

const CLIENT_NAME: &str = "relaybridge";

/// Anything the reader thread can poll for performance events.
pub trait EventSource: Send {
    /// Returns every event received since the last call without blocking.
    fn drain_pending(&mut self) -> Vec<MidiEvent>;
}

/// Event source fed through a crossbeam channel.
pub struct ChannelSource {
    events: Receiver<MidiEvent>,
}

impl ChannelSource {
    pub fn new(events: Receiver<MidiEvent>) -> Self {
        Self { events }
    }

    pub fn pair() -> (Sender<MidiEvent>, Self) {
        let (tx, rx) = crossbeam::channel::unbounded();
        (tx, Self::new(rx))
    }
}

impl EventSource for ChannelSource {
    fn drain_pending(&mut self) -> Vec<MidiEvent> {
        self.events.try_iter().collect()
    }
}

pub fn list_ports() -> Result<Vec<String>, BridgeError> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// An open MIDI input port.
///
/// midir delivers messages on its own callback thread; they are parsed there
/// and forwarded to the [`ChannelSource`] handed out by [`MidiSource::events`].
pub struct MidiSource {
    port_name: String,
    connection: MidiInputConnection<()>,
    events: Receiver<MidiEvent>,
}

impl MidiSource {
    pub fn open(port_name: &str) -> Result<Self, BridgeError> {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let ports = midi_in.ports();
        let available: Vec<String> = ports
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect();
        tracing::info!(?available, "available MIDI ports");

        let port = ports
            .iter()
            .find(|p| midi_in.port_name(p).is_ok_and(|name| name == port_name))
            .cloned()
            .ok_or_else(|| BridgeError::SourceUnavailable {
                port: port_name.to_string(),
                available,
            })?;

        let (tx, events) = crossbeam::channel::unbounded();
        let connection = midi_in
            .connect(
                &port,
                "relaybridge-input",
                move |_, msg, _| {
                    if let Some(event) = MidiEvent::parse(msg) {
                        let _ = tx.send(event);
                    }
                },
                (),
            )
            .map_err(|e| BridgeError::MidiConnect {
                port: port_name.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(port = port_name, "connected to MIDI port");
        Ok(Self {
            port_name: port_name.to_string(),
            connection,
            events,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn events(&self) -> ChannelSource {
        ChannelSource::new(self.events.clone())
    }

    pub fn close(self) {
        self.connection.close();
        tracing::info!(port = %self.port_name, "closed MIDI port");
    }
}
