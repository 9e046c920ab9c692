use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::events::ContinuousControlEvent;
use crate::frame::CommandFrame;

/// Turns control-change events into motor frames, suppressing repeats.
///
/// The stored value for a channel is always the last value handed out as a
/// frame. Only the reader thread owns a translator, so no lock is needed.
pub struct ControlTranslator {
    range: RangeInclusive<u8>,
    motor_state: BTreeMap<u8, u8>,
}

impl ControlTranslator {
    pub fn new(range: RangeInclusive<u8>) -> Self {
        let motor_state = range.clone().map(|channel| (channel, 0)).collect();
        Self { range, motor_state }
    }

    pub fn translate(&mut self, event: ContinuousControlEvent) -> Option<CommandFrame> {
        if !self.range.contains(&event.channel) {
            return None;
        }

        let last = self.motor_state.entry(event.channel).or_insert(0);
        if *last == event.value {
            return None;
        }
        *last = event.value;

        Some(CommandFrame::MotorSet {
            channel: event.channel,
            value: event.value,
        })
    }

    pub fn last_sent(&self, channel: u8) -> Option<u8> {
        self.motor_state.get(&channel).copied()
    }

    pub fn range(&self) -> RangeInclusive<u8> {
        self.range.clone()
    }

    /// One zero frame per channel in the range, ascending, whatever the
    /// last sent value was.
    pub fn zero_all(&mut self) -> Vec<CommandFrame> {
        self.range
            .clone()
            .map(|channel| {
                self.motor_state.insert(channel, 0);
                CommandFrame::MotorSet { channel, value: 0 }
            })
            .collect()
    }
}
