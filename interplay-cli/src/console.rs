//! Console actor and the stdin event syntax.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Context, Result};
use interplay_core::{
    Actor, ActorId, BlockType, ContainerOpen, InteractionEvent, Point, SignEdit, SignRead,
    SwitchHit, TileEdit, TileEditType,
};

/// The single local player, printing its messages to stdout.
pub struct ConsoleActor {
    id: ActorId,
    name: String,
    connected: AtomicBool,
}

impl ConsoleActor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ActorId(1),
            name: name.into(),
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    fn print(&self, tag: &str, message: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "[{tag}] {message}");
    }
}

impl Actor for ConsoleActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn send_info_message(&self, message: &str) {
        self.print("info", message);
    }

    fn send_error_message(&self, message: &str) {
        self.print("error", message);
    }
}

/// Parse a world event line.
///
/// ```text
/// place <x> <y> [block]     tile placement
/// break <x> <y>             tile removal
/// chest <x> <y>
/// sign <x> <y> <text...>    sign edit
/// read <x> <y>              sign read
/// switch <x> <y>
/// ```
///
/// Returns `Ok(None)` for lines that are not events.
pub fn parse_event(line: &str) -> Result<Option<InteractionEvent>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    if !matches!(verb, "place" | "break" | "chest" | "sign" | "read" | "switch") {
        return Ok(None);
    }

    let x = coordinate(words.next(), "x")?;
    let y = coordinate(words.next(), "y")?;
    let location = Point::new(x, y);

    let event = match verb {
        "place" => {
            let block = match words.next() {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid block type '{raw}'"))?,
                None => 0,
            };
            TileEdit {
                edit_type: TileEditType::PlaceTile,
                block_type: BlockType(block),
                location,
                object_style: 0,
            }
            .into()
        }
        "break" => TileEdit {
            edit_type: TileEditType::TileKill,
            block_type: BlockType::INVALID,
            location,
            object_style: 0,
        }
        .into(),
        "chest" => ContainerOpen { location }.into(),
        "sign" => {
            let text = words.collect::<Vec<_>>().join(" ");
            SignEdit {
                sign_index: 0,
                location,
                new_text: text,
            }
            .into()
        }
        "read" => SignRead { location }.into(),
        _ => SwitchHit { location }.into(),
    };
    Ok(Some(event))
}

fn coordinate(raw: Option<&str>, axis: &str) -> Result<i32> {
    let Some(raw) = raw else {
        bail!("missing {axis} coordinate");
    };
    raw.parse()
        .with_context(|| format!("invalid {axis} coordinate '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use interplay_core::EventKind;
    use test_case::test_case;

    #[test_case("place 1 2 30", EventKind::TileEdit ; "place")]
    #[test_case("break 1 2", EventKind::TileEdit ; "break")]
    #[test_case("chest 1 2", EventKind::ContainerOpen ; "chest")]
    #[test_case("sign 1 2 hello there", EventKind::SignEdit ; "sign")]
    #[test_case("read 1 2", EventKind::SignRead ; "read")]
    #[test_case("switch 1 2", EventKind::SwitchHit ; "switch")]
    fn parses_event_kinds(line: &str, kind: EventKind) {
        let event = parse_event(line).unwrap().unwrap();
        assert_eq!(event.kind(), kind);
        assert_eq!(event.location(), Point::new(1, 2));
    }

    #[test]
    fn sign_keeps_full_text() {
        match parse_event("sign 0 0 keep   out").unwrap() {
            Some(InteractionEvent::SignEdit(edit)) => assert_eq!(edit.new_text, "keep out"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn break_carries_invalid_block() {
        match parse_event("break 3 4").unwrap() {
            Some(InteractionEvent::TileEdit(edit)) => {
                assert_eq!(edit.edit_type, TileEditType::TileKill);
                assert!(!edit.block_type.is_valid());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn non_events_are_ignored() {
        assert!(parse_event("").unwrap().is_none());
        assert!(parse_event("dance 1 2").unwrap().is_none());
    }

    #[test]
    fn bad_coordinates_are_errors() {
        assert!(parse_event("chest 1").is_err());
        assert!(parse_event("chest one 2").is_err());
        assert!(parse_event("place 1 2 dirt").is_err());
    }
}
