//! Environment events routed to interactive sessions.
//!
//! Payload fields are carried as the host reports them. Block types and
//! edit types are not interpreted here; they only reach the callbacks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of environment event a session can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    TileEdit,
    ContainerOpen,
    SignEdit,
    SignRead,
    SwitchHit,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 5] = [
        EventKind::TileEdit,
        EventKind::ContainerOpen,
        EventKind::SignEdit,
        EventKind::SignRead,
        EventKind::SwitchHit,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TileEdit => "tile_edit",
            Self::ContainerOpen => "container_open",
            Self::SignEdit => "sign_edit",
            Self::SignRead => "sign_read",
            Self::SwitchHit => "switch_hit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// World location in tile coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Kind of tile modification reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileEditType {
    TileKill,
    PlaceTile,
    DestroyWall,
    PlaceWall,
    TileKillNoItem,
    PlaceWire,
    DestroyWire,
    PoundTile,
    PlaceActuator,
    DestroyActuator,
    PlaceWireBlue,
    DestroyWireBlue,
    PlaceWireGreen,
    DestroyWireGreen,
    SlopeTile,
    FrameMinecartTrack,
    PlaceWireYellow,
    DestroyWireYellow,
    PokeLogicGate,
    Actuate,
}

impl TileEditType {
    /// Whether the edit places something rather than removing it.
    pub const fn is_placement(self) -> bool {
        matches!(
            self,
            Self::PlaceTile
                | Self::PlaceWall
                | Self::PlaceWire
                | Self::PlaceActuator
                | Self::PlaceWireBlue
                | Self::PlaceWireGreen
                | Self::PlaceWireYellow
        )
    }
}

/// Host block identifier, opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockType(pub i32);

impl BlockType {
    pub const INVALID: BlockType = BlockType(-1);

    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEdit {
    pub edit_type: TileEditType,
    pub block_type: BlockType,
    pub location: Point,
    pub object_style: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerOpen {
    pub location: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignEdit {
    pub sign_index: i16,
    pub location: Point,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRead {
    pub location: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchHit {
    pub location: Point,
}

/// An event delivered by the host for one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionEvent {
    TileEdit(TileEdit),
    ContainerOpen(ContainerOpen),
    SignEdit(SignEdit),
    SignRead(SignRead),
    SwitchHit(SwitchHit),
}

impl InteractionEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TileEdit(_) => EventKind::TileEdit,
            Self::ContainerOpen(_) => EventKind::ContainerOpen,
            Self::SignEdit(_) => EventKind::SignEdit,
            Self::SignRead(_) => EventKind::SignRead,
            Self::SwitchHit(_) => EventKind::SwitchHit,
        }
    }

    /// Where the event happened.
    pub const fn location(&self) -> Point {
        match self {
            Self::TileEdit(e) => e.location,
            Self::ContainerOpen(e) => e.location,
            Self::SignEdit(e) => e.location,
            Self::SignRead(e) => e.location,
            Self::SwitchHit(e) => e.location,
        }
    }
}

impl From<TileEdit> for InteractionEvent {
    fn from(event: TileEdit) -> Self {
        Self::TileEdit(event)
    }
}

impl From<ContainerOpen> for InteractionEvent {
    fn from(event: ContainerOpen) -> Self {
        Self::ContainerOpen(event)
    }
}

impl From<SignEdit> for InteractionEvent {
    fn from(event: SignEdit) -> Self {
        Self::SignEdit(event)
    }
}

impl From<SignRead> for InteractionEvent {
    fn from(event: SignRead) -> Self {
        Self::SignRead(event)
    }
}

impl From<SwitchHit> for InteractionEvent {
    fn from(event: SwitchHit) -> Self {
        Self::SwitchHit(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_reports_its_kind_and_location() {
        let at = Point::new(10, 20);
        let events: Vec<InteractionEvent> = vec![
            TileEdit {
                edit_type: TileEditType::PlaceTile,
                block_type: BlockType(21),
                location: at,
                object_style: 0,
            }
            .into(),
            ContainerOpen { location: at }.into(),
            SignEdit {
                sign_index: 3,
                location: at,
                new_text: "hello".into(),
            }
            .into(),
            SignRead { location: at }.into(),
            SwitchHit { location: at }.into(),
        ];

        let kinds: Vec<EventKind> = events.iter().map(InteractionEvent::kind).collect();
        assert_eq!(kinds, EventKind::ALL.to_vec());
        assert!(events.iter().all(|e| e.location() == at));
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let event: InteractionEvent = SwitchHit {
            location: Point::new(1, 2),
        }
        .into();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "switch_hit");
        assert_eq!(json["location"]["x"], 1);
    }

    #[test]
    fn block_type_validity() {
        assert!(!BlockType::INVALID.is_valid());
        assert!(BlockType(0).is_valid());
        assert!(TileEditType::PlaceWireYellow.is_placement());
        assert!(!TileEditType::TileKill.is_placement());
    }
}
