//! `GameSession`: one client's complete replication state.
//!
//! The session is an explicit context object; nothing in the crate
//! holds module-level state. It owns the player's view (authoritative
//! zones plus opponent mirror), the character tracker, the phase
//! machine, the uuid allocator, the deck RNG, and the shared counters
//! (twilight pool, site numbers).
//!
//! Every local mutation commits first, then queues its wire event in
//! the outbox; the embedding transport drains [`GameSession::take_outbound`]
//! and ships the payloads. Remote payloads come back in through
//! [`GameSession::handle_card_event`] / [`GameSession::handle_game_event`],
//! which write only the mirror side. All of this runs synchronously
//! inside whatever single-threaded callback the embedder uses; the
//! session itself never blocks or waits for the peer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::board::{AppliedMove, PlayerView};
use crate::board::layout;
use crate::characters::{CharacterError, CharacterInfo, CharacterTracker};
use crate::core::{Card, CardType, CardUuid, DeckRng, Position, UuidAllocator};
use crate::deck::{parse_deck_csv, DeckError};
use crate::phase::{FellowshipHolder, GamePhase, PhaseError, PhaseMachine, PhaseSignal};
use crate::protocol::reconcile::{apply_or_warn, Reconciliation};
use crate::protocol::{CardMovedEvent, GameEvent, GameEventEnvelope, PileName, PlayerId};
use crate::zones::{MoveError, ZoneName};

/// Highest site number on the adventure path.
const LAST_SITE: u8 = 9;

/// A queued outbound payload, ready for its wire channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Outbound {
    /// For the `cardEvent` channel.
    Card(CardMovedEvent),
    /// For the `gameEvent` channel.
    Game(GameEventEnvelope),
}

/// UI work a phase action asks the embedder to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiPrompt {
    OpenBidPopup,
    PromptMoveAgain,
}

/// Any failure of a local session operation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Character(#[from] CharacterError),

    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error("no ring-bearer in the draw deck")]
    MissingRingBearer,
}

/// Snapshot encode/decode failure.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot codec: {0}")]
    Codec(#[from] bincode::Error),
}

/// One client's full replication state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSession {
    player_id: PlayerId,
    /// Bid tie-break flag, fixed at session creation (join order in
    /// practice). The two peers must hold opposite values.
    player_first: bool,
    view: PlayerView,
    characters: CharacterTracker,
    phase: PhaseMachine,
    uuids: UuidAllocator,
    rng: DeckRng,
    /// Shared twilight pool; either side's absolute update wins.
    twilight: i32,
    own_site: u8,
    opponent_site: u8,
    opponent_deck_size: u32,
    #[serde(skip)]
    outbox: Vec<Outbound>,
}

impl GameSession {
    #[must_use]
    pub fn new(player_id: impl Into<String>, player_first: bool, seed: u64) -> Self {
        Self {
            player_id: PlayerId::new(player_id),
            player_first,
            view: PlayerView::new(),
            characters: CharacterTracker::new(),
            phase: PhaseMachine::new(),
            uuids: UuidAllocator::new(),
            rng: DeckRng::new(seed),
            twilight: 0,
            own_site: 1,
            opponent_site: 1,
            opponent_deck_size: 0,
            outbox: Vec::new(),
        }
    }

    // Accessors.

    #[must_use]
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    #[must_use]
    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase.current()
    }

    #[must_use]
    pub fn active_fellowship(&self) -> FellowshipHolder {
        self.phase.active_fellowship()
    }

    #[must_use]
    pub fn twilight(&self) -> i32 {
        self.twilight
    }

    #[must_use]
    pub fn own_site(&self) -> u8 {
        self.own_site
    }

    #[must_use]
    pub fn opponent_site(&self) -> u8 {
        self.opponent_site
    }

    #[must_use]
    pub fn opponent_deck_size(&self) -> u32 {
        self.opponent_deck_size
    }

    #[must_use]
    pub fn own_character(&self, uuid: CardUuid) -> Option<&CharacterInfo> {
        self.characters.own(uuid)
    }

    #[must_use]
    pub fn mirrored_character(&self, uuid: CardUuid) -> Option<&CharacterInfo> {
        self.characters.mirrored(uuid)
    }

    /// Drain the queued outbound payloads for transmission.
    pub fn take_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    // Deck loading.

    /// Load a deck list: sites into the site sub-deck (never shuffled),
    /// everything else shuffled into the draw deck. Emits the
    /// `deckInitialized` handshake.
    pub fn load_deck(&mut self, csv: &str, token: &str) -> Result<(), DeckError> {
        let records = parse_deck_csv(csv)?;

        for record in records {
            let uuid = self.uuids.allocate();
            let mut card = Card::new(uuid, record.card_id, record.card_type);
            match record.site_num {
                Some(site_num) if record.card_type == CardType::Site => {
                    card.site_num = Some(site_num);
                    self.view.own.site_deck.push(card);
                }
                _ => self.view.own.draw_deck.push(card),
            }
        }

        self.rng.shuffle(self.view.own.draw_deck.as_mut_slice());
        for (i, card) in self.view.own.draw_deck.iter_mut().enumerate() {
            card.position = layout::draw_deck_position(i);
        }

        let deck_size = self.view.own.draw_deck.len() as u32;
        debug!(deck_size, token, "deck loaded");
        self.push_game(GameEvent::DeckInitialized {
            deck_size,
            token: token.to_owned(),
        });
        Ok(())
    }

    // Local card operations. Each one mutates the own zones through the
    // view, then queues the wire event describing the committed move.

    pub fn place_in_hand(&mut self, uuid: CardUuid) -> Result<(), MoveError> {
        let moved = self.view.place_in_hand(uuid)?;
        self.commit(moved);
        Ok(())
    }

    pub fn place_in_discard(&mut self, uuid: CardUuid) -> Result<(), MoveError> {
        let moved = self.view.place_in_discard(uuid)?;
        self.commit(moved);
        Ok(())
    }

    /// Move a killed character to the dead pile. The dead pile does not
    /// replicate, so nothing is queued; the opponent's mirror keeps its
    /// stale copy until a later event claims the uuid.
    pub fn place_in_dead_pile(&mut self, uuid: CardUuid) -> Result<(), MoveError> {
        let moved = self.view.place_in_dead_pile(uuid)?;
        self.commit(moved);
        Ok(())
    }

    pub fn place_in_support(&mut self, uuid: CardUuid) -> Result<(), MoveError> {
        let moved = self.view.place_in_support(uuid)?;
        self.commit(moved);
        Ok(())
    }

    pub fn place_on_play_area(
        &mut self,
        uuid: CardUuid,
        position: Position,
    ) -> Result<(), MoveError> {
        let moved = self.view.place_on_play_area(uuid, position)?;
        self.commit(moved);
        Ok(())
    }

    pub fn place_in_companion_slot(
        &mut self,
        uuid: CardUuid,
        slot: usize,
    ) -> Result<(), MoveError> {
        let moved = self.view.place_in_companion_slot(uuid, slot)?;
        self.commit(moved);
        Ok(())
    }

    pub fn place_at_site(&mut self, uuid: CardUuid, slot: usize) -> Result<(), MoveError> {
        let moved = self.view.place_at_site(uuid, slot)?;
        self.commit(moved);
        Ok(())
    }

    /// Draw the top card into the hand. Empty deck is a no-op.
    pub fn draw(&mut self) -> Option<CardUuid> {
        let moved = self.view.draw_from_deck()?;
        let uuid = moved.uuid;
        self.commit(moved);
        Some(uuid)
    }

    // Twilight pool.

    /// Set the shared twilight pool to an absolute value and replicate
    /// it.
    pub fn set_twilight(&mut self, twilight: i32) {
        self.twilight = twilight;
        self.push_game(GameEvent::TwilightChanged { twilight });
    }

    pub fn add_twilight(&mut self, delta: i32) {
        self.set_twilight(self.twilight + delta);
    }

    // Character counters.

    /// Adjust wounds on an own character and replicate the absolute
    /// counters.
    pub fn wound_character(&mut self, uuid: CardUuid, delta: i8) -> Result<(), CharacterError> {
        self.update_character(uuid, |info| {
            info.wounds = info.wounds.saturating_add_signed(delta);
        })
    }

    /// Adjust burdens on an own character.
    pub fn burden_character(&mut self, uuid: CardUuid, delta: i8) -> Result<(), CharacterError> {
        self.update_character(uuid, |info| {
            info.burdens = info.burdens.saturating_add_signed(delta);
        })
    }

    /// Adjust the strength modifier on an own character.
    pub fn modify_strength(&mut self, uuid: CardUuid, delta: i8) -> Result<(), CharacterError> {
        self.update_character(uuid, |info| {
            info.strength_modifier = info.strength_modifier.saturating_add(delta);
        })
    }

    fn update_character<F>(&mut self, uuid: CardUuid, f: F) -> Result<(), CharacterError>
    where
        F: FnOnce(&mut CharacterInfo),
    {
        let info = self.characters.update_own(uuid, f)?;
        self.push_game(GameEvent::CharacterInfoChanged {
            character: uuid,
            wounds: info.wounds,
            burdens: info.burdens,
            strength_modifier: info.strength_modifier,
        });
        Ok(())
    }

    // Phase actions.

    /// Leave `Init`: play the starting fellowship and open bidding.
    pub fn begin_game(&mut self) -> Result<Vec<UiPrompt>, SessionError> {
        let signals = self.phase.begin_game()?;
        self.dispatch(signals)
    }

    /// Submit the local burden bid.
    pub fn submit_bid(&mut self, burdens: u8) -> Result<Vec<UiPrompt>, SessionError> {
        let signals = self.phase.submit_bid(burdens, self.player_first)?;
        self.dispatch(signals)
    }

    /// Finish the current phase.
    pub fn finish_phase(&mut self) -> Result<Vec<UiPrompt>, SessionError> {
        let signals = self.phase.finish_phase()?;
        self.dispatch(signals)
    }

    /// Regroup choice: move to the next site and keep the turn.
    pub fn move_again(&mut self) -> Result<Vec<UiPrompt>, SessionError> {
        let signals = self.phase.move_again()?;
        self.dispatch(signals)
    }

    /// Regroup choice: end the turn and hand the fellowship over.
    pub fn end_turn(&mut self) -> Result<Vec<UiPrompt>, SessionError> {
        let signals = self.phase.end_turn()?;
        self.dispatch(signals)
    }

    fn dispatch(&mut self, signals: Vec<PhaseSignal>) -> Result<Vec<UiPrompt>, SessionError> {
        let mut prompts = Vec::new();
        for signal in signals {
            match signal {
                PhaseSignal::Send(event) => self.push_game(event),
                PhaseSignal::OpenBidPopup => prompts.push(UiPrompt::OpenBidPopup),
                PhaseSignal::PromptMoveAgain => prompts.push(UiPrompt::PromptMoveAgain),
                PhaseSignal::PlayStartingFellowship => self.play_starting_fellowship()?,
                PhaseSignal::AdvanceSite => self.advance_site(),
            }
        }
        Ok(prompts)
    }

    /// Pull the ring-bearer into companion slot 0 and attach the One
    /// Ring to it.
    fn play_starting_fellowship(&mut self) -> Result<(), SessionError> {
        let bearer = self
            .view
            .own
            .draw_deck
            .iter()
            .find(|c| c.card_type == CardType::RingBearer)
            .map(|c| c.uuid)
            .ok_or(SessionError::MissingRingBearer)?;
        self.place_in_companion_slot(bearer, 0)?;

        let ring = self
            .view
            .own
            .draw_deck
            .iter()
            .find(|c| c.card_type == CardType::Ring)
            .map(|c| c.uuid);
        match ring {
            Some(ring) => self.place_in_companion_slot(ring, 0)?,
            None => warn!("deck has no ring card, starting without one"),
        }
        Ok(())
    }

    /// Move one site down the path, replicating the new site number and
    /// revealing the site card if this side still holds it.
    fn advance_site(&mut self) {
        self.own_site = (self.own_site + 1).min(LAST_SITE);
        let site = self.own_site;
        self.push_game(GameEvent::PlayerMoved { site });

        // Already-revealed sites (repeat visits at the end of the path)
        // are no longer in the sub-deck.
        match self.view.play_site_from_deck(site) {
            Ok(moved) => self.commit(moved),
            Err(MoveError::MissingSite { .. }) => {}
            Err(err) => warn!(site, %err, "site reveal failed"),
        }
    }

    // Remote event handling. These write only the mirror side.

    /// Apply an opponent card event. Returns `None` for self-echoes and
    /// dropped events.
    pub fn handle_card_event(&mut self, event: &CardMovedEvent) -> Option<Reconciliation> {
        if event.player_id == self.player_id {
            return None;
        }

        let outcome = apply_or_warn(&mut self.view.mirror, event)?;

        if event.card_type.has_character_info() {
            match event.to_pile {
                PileName::PlayerCompanion | PileName::Site | PileName::PlayArea => {
                    if self.characters.mirrored(event.card_uuid).is_none() {
                        self.characters.init_mirrored(event.card_uuid);
                    }
                }
                PileName::PlayerDiscard => self.characters.remove_mirrored(event.card_uuid),
                _ => {}
            }
        }
        Some(outcome)
    }

    /// Apply an opponent game event. Self-echoes are ignored.
    pub fn handle_game_event(&mut self, envelope: &GameEventEnvelope) {
        if envelope.player_id == self.player_id {
            return;
        }

        match &envelope.event {
            GameEvent::DeckInitialized { deck_size, token } => {
                debug!(deck_size = *deck_size, token = %token, "opponent deck initialized");
                self.opponent_deck_size = *deck_size;
            }
            GameEvent::TwilightChanged { twilight } => {
                self.twilight = *twilight;
            }
            GameEvent::CharacterInfoChanged {
                character,
                wounds,
                burdens,
                strength_modifier,
            } => {
                self.characters.apply_remote(
                    *character,
                    CharacterInfo {
                        wounds: *wounds,
                        burdens: *burdens,
                        strength_modifier: *strength_modifier,
                    },
                );
            }
            GameEvent::PlayerMoved { site } => {
                self.opponent_site = *site;
            }
            GameEvent::BurdensBid { burdens } => {
                self.phase.opponent_bid(*burdens, self.player_first);
            }
            GameEvent::PhaseFinished { current_state } => {
                self.phase
                    .opponent_phase_finished(*current_state, self.player_first);
            }
            GameEvent::EndTurn { .. } => {
                self.phase.opponent_turn_ended();
            }
        }
    }

    // Snapshot hook: one local save point, not a durable log.

    /// Serialize the full session (zones, mirror, counters, phase, RNG
    /// position) to bytes.
    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Rebuild a session from [`GameSession::snapshot`] bytes. The
    /// outbox is not part of the snapshot; pending sends are lost.
    pub fn restore(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }

    // Internals.

    /// Queue the wire event for a committed move and keep the character
    /// tracker in step with zone lifecycle edges.
    fn commit(&mut self, moved: AppliedMove) {
        if moved.card_type.has_character_info() {
            match moved.to {
                ZoneName::Companion(_) | ZoneName::Site(_) | ZoneName::PlayArea => {
                    if self.characters.own(moved.uuid).is_none() {
                        self.characters.init_own(moved.uuid);
                    }
                }
                ZoneName::Discard | ZoneName::DeadPile => self.characters.remove_own(moved.uuid),
                _ => {}
            }
        }

        if let Some(event) = CardMovedEvent::from_applied(&self.player_id, &moved) {
            self.outbox.push(Outbound::Card(event));
        }
    }

    fn push_game(&mut self, event: GameEvent) {
        self.outbox.push(Outbound::Game(GameEventEnvelope {
            player_id: self.player_id.clone(),
            event,
        }));
    }
}
