//! Bounce to MIDI mapping
//!
//! Turns collision records into raw MIDI bytes for the host to send. No
//! device I/O happens here; the host owns the output port and the timing of
//! note-off messages.

use serde::{Deserialize, Serialize};

use crate::sim::{CollisionRecord, EdgeTag, HexGrid, Rgb};

/// Note used for bounces that have no styled edge (polygons, walls)
pub const DEFAULT_NOTE: u8 = 60;

/// Edge light reported for every bounce until edges carry their own
pub const DEFAULT_EDGE_LIGHT: f32 = 0.8;

/// Color reported for unstyled edges or colors that do not parse
pub const DEFAULT_EDGE_COLOR: Rgb = Rgb::RED;

/// Controller numbers sent after the note
pub const ANGLE_CC: u8 = 20;
pub const LIGHT_CC: u8 = 21;
pub const COLOR_CC: [u8; 3] = [22, 23, 24];

/// How long the host should hold a bounce note before sending note off
pub const NOTE_OFF_DELAY_MS: u64 = 100;

/// Host-facing summary of one bounce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceEvent {
    /// Direction of travel after the bounce, in degrees (-180, 180]
    pub angle_deg: f32,
    pub speed: f32,
    pub note: u8,
    /// MIDI velocity, 0..=127
    pub velocity: u8,
    /// Brightness of the touched edge in [0, 1]
    pub edge_light: f32,
    pub edge_color: Rgb,
}

impl BounceEvent {
    /// Build from a collision record; hex cell hits take the note and color
    /// of the touched edge from the cell's style
    pub fn from_record(record: &CollisionRecord, grid: Option<&HexGrid>) -> Self {
        let (note, edge_color) = match (record.tag, grid) {
            (EdgeTag::Cell { coord, edge }, Some(grid)) => {
                let style = grid.style_of(coord);
                (
                    style.edge_notes[edge % 6],
                    style.edge_rgb(edge).unwrap_or(DEFAULT_EDGE_COLOR),
                )
            }
            _ => (DEFAULT_NOTE, DEFAULT_EDGE_COLOR),
        };
        let speed = record.speed();
        Self {
            angle_deg: record.velocity.y.atan2(record.velocity.x).to_degrees(),
            speed,
            note,
            velocity: speed_to_velocity(speed),
            edge_light: DEFAULT_EDGE_LIGHT,
            edge_color,
        }
    }

    /// Replace the speed and recompute the MIDI velocity from it
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self.velocity = speed_to_velocity(speed);
        self
    }

    /// Angle folded into [0, 360) and scaled to a controller value
    pub fn angle_cc_value(&self) -> u8 {
        let angle = self.angle_deg.rem_euclid(360.0);
        ((angle / 360.0 * 127.0).floor() as u8).min(127)
    }

    pub fn light_cc_value(&self) -> u8 {
        (self.edge_light.clamp(0.0, 1.0) * 127.0).floor() as u8
    }

    /// Color channels scaled from 0..=255 down to 0..=127
    pub fn color_cc_values(&self) -> [u8; 3] {
        let Rgb { r, g, b } = self.edge_color;
        [r, g, b].map(|c| (u16::from(c) * 127 / 255) as u8)
    }
}

/// `min(127, floor(speed * 10))`
pub fn speed_to_velocity(speed: f32) -> u8 {
    (speed * 10.0).floor().clamp(0.0, 127.0) as u8
}

/// A three-byte channel voice message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiMessage(pub [u8; 3]);

impl MidiMessage {
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self([0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F])
    }

    pub fn note_off(channel: u8, note: u8) -> Self {
        Self([0x80 | (channel & 0x0F), note & 0x7F, 0])
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self([0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F])
    }

    pub fn bytes(&self) -> [u8; 3] {
        self.0
    }
}

/// Messages to send immediately for a bounce: note on, then the angle,
/// light and color controllers. The matching note off is
/// [`MidiMessage::note_off`] after [`NOTE_OFF_DELAY_MS`].
pub fn bounce_messages(event: &BounceEvent, channel: u8) -> [MidiMessage; 6] {
    let [r, g, b] = event.color_cc_values();
    [
        MidiMessage::note_on(channel, event.note, event.velocity),
        MidiMessage::control_change(channel, ANGLE_CC, event.angle_cc_value()),
        MidiMessage::control_change(channel, LIGHT_CC, event.light_cc_value()),
        MidiMessage::control_change(channel, COLOR_CC[0], r),
        MidiMessage::control_change(channel, COLOR_CC[1], g),
        MidiMessage::control_change(channel, COLOR_CC[2], b),
    ]
}

/// Host-supplied rewrite of a bounce before it is turned into messages
pub trait BounceTransform {
    fn process(&self, event: BounceEvent) -> BounceEvent;
}

impl<F> BounceTransform for F
where
    F: Fn(BounceEvent) -> BounceEvent,
{
    fn process(&self, event: BounceEvent) -> BounceEvent {
        self(event)
    }
}

/// Multiply the bounce speed, e.g. `ScaleSpeed(1.2)` for livelier hits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSpeed(pub f32);

impl BounceTransform for ScaleSpeed {
    fn process(&self, event: BounceEvent) -> BounceEvent {
        event.with_speed(event.speed * self.0)
    }
}

/// Maps records to messages on one channel, running transforms in the
/// order they were added
pub struct MidiMapper {
    channel: u8,
    transforms: Vec<Box<dyn BounceTransform>>,
}

impl std::fmt::Debug for MidiMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiMapper")
            .field("channel", &self.channel)
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

impl MidiMapper {
    pub fn new(channel: u8) -> Self {
        Self {
            channel: channel & 0x0F,
            transforms: Vec::new(),
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn with_transform(mut self, transform: impl BounceTransform + 'static) -> Self {
        self.push_transform(transform);
        self
    }

    pub fn push_transform(&mut self, transform: impl BounceTransform + 'static) {
        self.transforms.push(Box::new(transform));
    }

    pub fn event(&self, record: &CollisionRecord, grid: Option<&HexGrid>) -> BounceEvent {
        self.transforms
            .iter()
            .fold(BounceEvent::from_record(record, grid), |event, t| {
                t.process(event)
            })
    }

    pub fn messages(&self, record: &CollisionRecord, grid: Option<&HexGrid>) -> [MidiMessage; 6] {
        bounce_messages(&self.event(record, grid), self.channel)
    }
}
