//! Board geometry shared with the wire protocol.
//!
//! All values are normalized board fractions (0..1). Stack placement
//! writes these positions onto cards *before* the move event is emitted,
//! so the numbers here are protocol-visible: both peers must compute the
//! same fan-out for boards to agree visually.
//!
//! The play-area mirror transform lives here too - the one place raw
//! geometry leaks into protocol semantics.

use crate::core::Position;

const CARD_SCALE: f32 = 0.9;
const CARD_ASPECT: f32 = 714.0 / 994.0;
const CANVAS_ASPECT: f32 = 4.0 / 3.0;

/// Normalized card width.
pub const CARD_WIDTH: f32 = 0.08 * CARD_SCALE;
/// Normalized card height, derived from the printed aspect ratio.
pub const CARD_HEIGHT: f32 = (CARD_WIDTH / CARD_ASPECT) * CANVAS_ASPECT;

pub const MARGIN: f32 = 0.005;
const BOARD_MARGIN: f32 = 0.020;

/// Y coordinate of the bottom card bar (hand, decks, discard, support).
pub const BOTTOM_ROW_Y: f32 = 1.0 - (CARD_HEIGHT + BOARD_MARGIN);

pub const SUPPORT_X: f32 = 0.125;
pub const SUPPORT_WIDTH: f32 = 0.25;

pub const HAND_X: f32 = SUPPORT_X + SUPPORT_WIDTH + MARGIN;
pub const HAND_WIDTH: f32 = CARD_WIDTH * 5.5;
/// Horizontal step between fanned hand cards.
pub const HAND_OFFSET: f32 = CARD_WIDTH / 2.2;

pub const DRAW_DECK_X: f32 = HAND_X + HAND_WIDTH + MARGIN;
/// Per-card shift when rendering the draw deck as a ridge.
pub const DRAW_DECK_SHIFT: f32 = 0.0025;

pub const DISCARD_X: f32 = DRAW_DECK_X + CARD_WIDTH + 3.0 * MARGIN;
pub const DEAD_PILE_X: f32 = DISCARD_X + CARD_WIDTH + MARGIN;

/// Horizontal step between an anchor and each stacked attachment.
pub const ATTACHMENT_OFFSET: f32 = 0.0125;
/// Horizontal step between companion slots.
pub const COMPANION_SLOT_OFFSET: f32 = CARD_WIDTH + 1.7 * ATTACHMENT_OFFSET;
pub const COMPANION_ROW_X: f32 = SUPPORT_X;
pub const COMPANION_ROW_Y: f32 = BOTTOM_ROW_Y - (CARD_HEIGHT + MARGIN);

pub const SITE_X: f32 = 0.01;
pub const SITE_Y: f32 = 0.01;
/// Sites render rotated a quarter turn, so width and height swap roles.
pub const SITE_CARD_WIDTH: f32 = CARD_HEIGHT / CANVAS_ASPECT;
pub const SITE_CARD_HEIGHT: f32 = CARD_WIDTH * CANVAS_ASPECT;
const SITE_STEP: f32 = SITE_CARD_HEIGHT + MARGIN;

/// Position of hand card `index` (0-based, left to right).
#[must_use]
pub fn hand_position(index: usize) -> Position {
    Position::new(HAND_X + index as f32 * HAND_OFFSET, BOTTOM_ROW_Y)
}

/// Position of support-area card `index`.
#[must_use]
pub fn support_position(index: usize) -> Position {
    Position::new(SUPPORT_X + index as f32 * ATTACHMENT_OFFSET, BOTTOM_ROW_Y)
}

/// Top-of-discard position.
#[must_use]
pub fn discard_position() -> Position {
    Position::new(DISCARD_X, BOTTOM_ROW_Y)
}

/// Position of draw-deck card `index` (bottom of the ridge is index 0).
#[must_use]
pub fn draw_deck_position(index: usize) -> Position {
    Position::new(DRAW_DECK_X + index as f32 * DRAW_DECK_SHIFT, BOTTOM_ROW_Y)
}

/// Dead-pile position.
#[must_use]
pub fn dead_pile_position() -> Position {
    Position::new(DEAD_PILE_X, BOTTOM_ROW_Y)
}

/// Anchor position for companion slot `slot`.
#[must_use]
pub fn companion_slot_position(slot: usize) -> Position {
    Position::new(
        COMPANION_ROW_X + slot as f32 * COMPANION_SLOT_OFFSET,
        COMPANION_ROW_Y,
    )
}

/// Position of attachment `stack_index` (0-based) on companion slot
/// `slot`. Attachments fan to the right of their anchor.
#[must_use]
pub fn attachment_position(slot: usize, stack_index: usize) -> Position {
    let anchor = companion_slot_position(slot);
    Position::new(
        anchor.x + (stack_index + 1) as f32 * ATTACHMENT_OFFSET,
        anchor.y,
    )
}

/// Position of a card stacked on site slot `slot` (minions, site
/// attachments), `stack_index` 0-based.
#[must_use]
pub fn site_attachment_position(slot: usize, stack_index: usize) -> Position {
    let site = site_slot_position(slot);
    Position::new(site.x + (stack_index + 1) as f32 * ATTACHMENT_OFFSET, site.y)
}

/// Position of site slot `slot` on the left-edge site track.
#[must_use]
pub fn site_slot_position(slot: usize) -> Position {
    Position::new(SITE_X, SITE_Y + slot as f32 * SITE_STEP)
}

/// Mirror a play-area position across the board's horizontal midline.
///
/// The opponent's play area renders as a rotated reflection of the local
/// one, so a card the sender dropped at `y` lands at `1 - (y + cardHeight)`
/// on the receiver. The offsets cancel when composed, so the transform
/// happens to be its own inverse; nothing on the wire relies on that,
/// since each event carries the sender's absolute position.
#[must_use]
pub fn mirror_play_area(position: Position) -> Position {
    Position::new(position.x, 1.0 - (position.y + CARD_HEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_fan_out() {
        let p0 = hand_position(0);
        let p1 = hand_position(1);
        let p2 = hand_position(2);

        assert_eq!(p0.x, HAND_X);
        assert!((p1.x - p0.x - HAND_OFFSET).abs() < 1e-6);
        assert!((p2.x - p1.x - HAND_OFFSET).abs() < 1e-6);
        assert_eq!(p0.y, BOTTOM_ROW_Y);
    }

    #[test]
    fn test_companion_slots_do_not_overlap_attachment_fan() {
        // A full attachment fan on slot n must stay left of slot n+1's
        // anchor column.
        let fan_end = attachment_position(0, 0).x + CARD_WIDTH * 0.5;
        assert!(fan_end < companion_slot_position(1).x + CARD_WIDTH);
    }

    #[test]
    fn test_mirror_formula() {
        let sent = Position::new(0.3, 0.6);
        let mirrored = mirror_play_area(sent);

        assert_eq!(mirrored.x, 0.3);
        assert!((mirrored.y - (1.0 - (0.6 + CARD_HEIGHT))).abs() < 1e-6);
    }

    #[test]
    fn test_mirror_round_trips() {
        // The card-height offsets cancel, so applying the transform
        // twice restores the sender's coordinates exactly.
        let sent = Position::new(0.3, 0.6);
        let twice = mirror_play_area(mirror_play_area(sent));

        assert!((twice.x - sent.x).abs() < 1e-6);
        assert!((twice.y - sent.y).abs() < 1e-6);
    }

    #[test]
    fn test_site_track_descends() {
        assert!(site_slot_position(1).y > site_slot_position(0).y);
        assert!(site_slot_position(8).y < 1.0);
    }

    #[test]
    fn test_bottom_row_on_board() {
        assert!(BOTTOM_ROW_Y > 0.0 && BOTTOM_ROW_Y + CARD_HEIGHT <= 1.0);
    }
}
