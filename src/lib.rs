//! Bridges a live MIDI input to a serial actuator controller.
//!
//! Control-change messages drive motors with `m<channel> <value>` frames;
//! note messages are coalesced per aggregation cycle into a single
//! `n<HHHH>` relay mask frame.

pub mod aggregator;
pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod frame;
pub mod source;
pub mod transport;
pub mod translator;

pub use aggregator::{PendingRelayEvent, RelayAggregator, RelayDrain};
pub use bridge::{BridgeContext, BridgeHandle, ShutdownReport, spawn_bridge};
pub use config::BridgeConfig;
pub use dispatcher::Dispatcher;
pub use error::BridgeError;
pub use events::{ContinuousControlEvent, MidiEvent, NoteEvent};
pub use frame::{CommandFrame, RelayMask};
pub use source::{ChannelSource, EventSource, MidiSource};
pub use translator::ControlTranslator;
