#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuousControlEvent {
    pub channel: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    ControlChange(ContinuousControlEvent),
    Note(NoteEvent),
}

impl MidiEvent {
    /// Decodes a raw channel-voice message. The MIDI channel nibble is
    /// ignored; unsupported or truncated messages yield `None`.
    pub fn parse(msg: &[u8]) -> Option<Self> {
        let (&status, data) = msg.split_first()?;
        let &[a, b, ..] = data else {
            return None;
        };
        let (a, b) = (a & 0x7F, b & 0x7F);

        match status & 0xF0 {
            0xB0 => Some(MidiEvent::ControlChange(ContinuousControlEvent {
                channel: a,
                value: b,
            })),
            0x90 => Some(MidiEvent::Note(NoteEvent {
                pitch: a,
                active: b > 0,
            })),
            0x80 => Some(MidiEvent::Note(NoteEvent {
                pitch: a,
                active: false,
            })),
            _ => None,
        }
    }
}
