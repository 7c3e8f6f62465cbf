//! Turn and phase state machine.
//!
//! Ten states per session, advanced by local player actions and by the
//! opponent's phase events. Exactly one side holds the active
//! fellowship at a time, decided once by the burden bid and flipped at
//! the end of every turn. Holding it gates the *linear* boundaries
//! (Fellowship, Regroup); the middle phases (Shadow through Skirmish)
//! advance for both sides as soon as either signals completion.
//!
//! The machine never touches zones or sockets. Local inputs return the
//! signals the session should act on (events to send, prompts to show);
//! remote inputs adjust state silently and never produce sends, which
//! is what keeps two machines from ping-ponging phase events forever.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::GameEvent;

/// Current phase of the local session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    Init,
    BidBurdens,
    AwaitOpponentBid,
    Fellowship,
    Shadow,
    Maneuver,
    Archery,
    Assignment,
    Skirmish,
    Regroup,
}

impl Default for GamePhase {
    fn default() -> Self {
        GamePhase::Init
    }
}

impl GamePhase {
    /// Successor in the linear mid-turn chain, if this phase has one.
    #[must_use]
    fn next_linear(self) -> Option<GamePhase> {
        match self {
            GamePhase::Shadow => Some(GamePhase::Maneuver),
            GamePhase::Maneuver => Some(GamePhase::Archery),
            GamePhase::Archery => Some(GamePhase::Assignment),
            GamePhase::Assignment => Some(GamePhase::Skirmish),
            GamePhase::Skirmish => Some(GamePhase::Regroup),
            _ => None,
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GamePhase::Init => "init",
            GamePhase::BidBurdens => "bidBurdens",
            GamePhase::AwaitOpponentBid => "awaitOpponentBid",
            GamePhase::Fellowship => "fellowship",
            GamePhase::Shadow => "shadow",
            GamePhase::Maneuver => "maneuver",
            GamePhase::Archery => "archery",
            GamePhase::Assignment => "assignment",
            GamePhase::Skirmish => "skirmish",
            GamePhase::Regroup => "regroup",
        };
        f.write_str(name)
    }
}

/// Which side currently holds the active fellowship.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FellowshipHolder {
    /// Not yet decided (before bid resolution).
    #[default]
    Unknown,
    Player,
    Opponent,
}

/// A rejected local phase action. State and holder are unchanged; the
/// caller surfaces this as a blocking alert.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("waiting for the opponent, you do not hold the fellowship")]
    NotFellowshipHolder,

    #[error("{action} is not legal during {phase}")]
    WrongPhase {
        action: &'static str,
        phase: GamePhase,
    },
}

/// What the session should do after a local phase action.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseSignal {
    /// Emit this event (the session wraps it in its envelope).
    Send(GameEvent),
    /// Show the burden-bid popup.
    OpenBidPopup,
    /// Show the "move again?" prompt at the end of Regroup.
    PromptMoveAgain,
    /// Pull the ring-bearer and ring from the deck onto the table.
    PlayStartingFellowship,
    /// Advance the local site number by one.
    AdvanceSite,
}

/// The per-session phase machine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMachine {
    current: GamePhase,
    active: FellowshipHolder,
    local_bid: Option<u8>,
    remote_bid: Option<u8>,
}

impl PhaseMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> GamePhase {
        self.current
    }

    #[must_use]
    pub fn active_fellowship(&self) -> FellowshipHolder {
        self.active
    }

    /// Is this side currently allowed to advance the linear boundaries?
    #[must_use]
    pub fn holds_fellowship(&self) -> bool {
        self.active == FellowshipHolder::Player
    }

    // Local inputs.

    /// Leave `Init`: play the starting fellowship and open the bid.
    pub fn begin_game(&mut self) -> Result<Vec<PhaseSignal>, PhaseError> {
        self.require_phase("begin game", GamePhase::Init)?;
        self.transition(GamePhase::BidBurdens);
        Ok(vec![
            PhaseSignal::PlayStartingFellowship,
            PhaseSignal::OpenBidPopup,
        ])
    }

    /// Submit the local burden bid.
    ///
    /// `player_first` is the tie-break: on equal bids the flag decides
    /// who starts. It is threaded in from the call site rather than
    /// derived symmetrically, so both peers must agree on opposite
    /// values out of band (in practice, join order).
    pub fn submit_bid(
        &mut self,
        burdens: u8,
        player_first: bool,
    ) -> Result<Vec<PhaseSignal>, PhaseError> {
        self.require_phase("bid", GamePhase::BidBurdens)?;
        self.local_bid = Some(burdens);

        if self.remote_bid.is_some() {
            self.resolve_starter(player_first);
        } else {
            self.transition(GamePhase::AwaitOpponentBid);
        }
        Ok(vec![PhaseSignal::Send(GameEvent::BurdensBid { burdens })])
    }

    /// Finish the current phase.
    pub fn finish_phase(&mut self) -> Result<Vec<PhaseSignal>, PhaseError> {
        match self.current {
            GamePhase::Fellowship => {
                if !self.holds_fellowship() {
                    return Err(PhaseError::NotFellowshipHolder);
                }
                self.transition(GamePhase::Shadow);
                Ok(vec![PhaseSignal::Send(GameEvent::PhaseFinished {
                    current_state: GamePhase::Shadow,
                })])
            }
            GamePhase::Regroup => {
                if !self.holds_fellowship() {
                    return Err(PhaseError::NotFellowshipHolder);
                }
                // No send and no transition yet: the player chooses
                // between moving again and ending the turn.
                Ok(vec![PhaseSignal::PromptMoveAgain])
            }
            phase => match phase.next_linear() {
                // Shadow through Skirmish advance for either side.
                Some(next) => {
                    self.transition(next);
                    Ok(vec![PhaseSignal::Send(GameEvent::PhaseFinished {
                        current_state: next,
                    })])
                }
                None => Err(PhaseError::WrongPhase {
                    action: "finish phase",
                    phase,
                }),
            },
        }
    }

    /// Regroup choice: move to the next site and keep the turn.
    pub fn move_again(&mut self) -> Result<Vec<PhaseSignal>, PhaseError> {
        self.require_phase("move again", GamePhase::Regroup)?;
        if !self.holds_fellowship() {
            return Err(PhaseError::NotFellowshipHolder);
        }
        self.transition(GamePhase::Shadow);
        Ok(vec![
            PhaseSignal::AdvanceSite,
            PhaseSignal::Send(GameEvent::PhaseFinished {
                current_state: GamePhase::Shadow,
            }),
        ])
    }

    /// Regroup choice: end the turn and hand the fellowship over.
    pub fn end_turn(&mut self) -> Result<Vec<PhaseSignal>, PhaseError> {
        self.require_phase("end turn", GamePhase::Regroup)?;
        if !self.holds_fellowship() {
            return Err(PhaseError::NotFellowshipHolder);
        }
        self.active = FellowshipHolder::Opponent;
        self.transition(GamePhase::Fellowship);
        Ok(vec![PhaseSignal::Send(GameEvent::EndTurn {
            current_state: GamePhase::Fellowship,
        })])
    }

    // Remote inputs. These never send anything back.

    /// The opponent's burden bid arrived.
    pub fn opponent_bid(&mut self, burdens: u8, player_first: bool) {
        self.remote_bid = Some(burdens);
        match self.current {
            GamePhase::BidBurdens => {
                // Local bid still pending; resolution happens on submit.
            }
            GamePhase::AwaitOpponentBid => self.resolve_starter(player_first),
            phase => warn!(%phase, burdens, "stray opponent bid ignored"),
        }
    }

    /// The opponent finished a phase, announcing the state it entered.
    pub fn opponent_phase_finished(&mut self, entered: GamePhase, player_first: bool) {
        match self.current {
            // A phaseFinished while awaiting the bid doubles as bid
            // resolution (the opponent may race ahead).
            GamePhase::AwaitOpponentBid => self.resolve_starter(player_first),
            GamePhase::Init | GamePhase::BidBurdens => {
                warn!(current = %self.current, %entered, "phase event before bidding done, ignored");
            }
            _ => self.transition(entered),
        }
    }

    /// The opponent ended their turn: the fellowship is ours now.
    pub fn opponent_turn_ended(&mut self) {
        self.active = FellowshipHolder::Player;
        self.transition(GamePhase::Fellowship);
    }

    /// Higher bid starts; a tie falls back to `player_first`.
    fn resolve_starter(&mut self, player_first: bool) {
        let local = self.local_bid.unwrap_or(0);
        let remote = self.remote_bid.unwrap_or(0);
        self.active = if local > remote || (local == remote && player_first) {
            FellowshipHolder::Player
        } else {
            FellowshipHolder::Opponent
        };
        debug!(local, remote, active = ?self.active, "starter resolved");
        self.transition(GamePhase::Fellowship);
    }

    fn require_phase(&self, action: &'static str, expected: GamePhase) -> Result<(), PhaseError> {
        if self.current == expected {
            Ok(())
        } else {
            Err(PhaseError::WrongPhase {
                action,
                phase: self.current,
            })
        }
    }

    fn transition(&mut self, next: GamePhase) {
        debug!(from = %self.current, to = %next, "phase transition");
        self.current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent_states(signals: &[PhaseSignal]) -> Vec<GamePhase> {
        signals
            .iter()
            .filter_map(|s| match s {
                PhaseSignal::Send(GameEvent::PhaseFinished { current_state }) => {
                    Some(*current_state)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_begin_game_opens_bidding() {
        let mut machine = PhaseMachine::new();
        let signals = machine.begin_game().unwrap();

        assert_eq!(machine.current(), GamePhase::BidBurdens);
        assert!(signals.contains(&PhaseSignal::PlayStartingFellowship));
        assert!(signals.contains(&PhaseSignal::OpenBidPopup));

        // Re-entering Init is refused.
        assert!(matches!(
            machine.begin_game(),
            Err(PhaseError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_higher_bid_starts() {
        // A bids 3 first, then B's bid of 1 arrives.
        let mut machine = PhaseMachine::new();
        machine.begin_game().unwrap();
        machine.submit_bid(3, true).unwrap();
        assert_eq!(machine.current(), GamePhase::AwaitOpponentBid);

        machine.opponent_bid(1, true);

        assert_eq!(machine.current(), GamePhase::Fellowship);
        assert_eq!(machine.active_fellowship(), FellowshipHolder::Player);
    }

    #[test]
    fn test_bid_after_opponent_resolves_immediately() {
        let mut machine = PhaseMachine::new();
        machine.begin_game().unwrap();
        machine.opponent_bid(4, false);
        assert_eq!(machine.current(), GamePhase::BidBurdens);

        machine.submit_bid(2, false).unwrap();

        assert_eq!(machine.current(), GamePhase::Fellowship);
        assert_eq!(machine.active_fellowship(), FellowshipHolder::Opponent);
    }

    #[test]
    fn test_tie_falls_back_to_player_first_flag() {
        for (flag, expected) in [
            (true, FellowshipHolder::Player),
            (false, FellowshipHolder::Opponent),
        ] {
            let mut machine = PhaseMachine::new();
            machine.begin_game().unwrap();
            machine.submit_bid(2, flag).unwrap();
            machine.opponent_bid(2, flag);
            assert_eq!(machine.active_fellowship(), expected);
        }
    }

    #[test]
    fn test_phase_finished_doubles_as_bid_resolution() {
        let mut machine = PhaseMachine::new();
        machine.begin_game().unwrap();
        machine.opponent_bid(5, false);
        machine.submit_bid(1, false).unwrap();
        assert_eq!(machine.current(), GamePhase::Fellowship);

        // Opponent races ahead into Shadow.
        machine.opponent_phase_finished(GamePhase::Shadow, false);
        assert_eq!(machine.current(), GamePhase::Shadow);
    }

    #[test]
    fn test_non_holder_cannot_finish_fellowship() {
        let mut machine = PhaseMachine::new();
        machine.begin_game().unwrap();
        machine.submit_bid(1, false).unwrap();
        machine.opponent_bid(3, false);
        assert_eq!(machine.active_fellowship(), FellowshipHolder::Opponent);

        let err = machine.finish_phase().unwrap_err();
        assert_eq!(err, PhaseError::NotFellowshipHolder);
        assert_eq!(machine.current(), GamePhase::Fellowship);
    }

    #[test]
    fn test_linear_chain_advances_symmetrically() {
        let mut machine = PhaseMachine::new();
        machine.begin_game().unwrap();
        machine.submit_bid(3, true).unwrap();
        machine.opponent_bid(1, true);

        let signals = machine.finish_phase().unwrap();
        assert_eq!(sent_states(&signals), vec![GamePhase::Shadow]);

        // Shadow through Skirmish may be finished by either side; the
        // opponent finishing mirrors with no send.
        machine.opponent_phase_finished(GamePhase::Maneuver, true);
        assert_eq!(machine.current(), GamePhase::Maneuver);

        for expected in [
            GamePhase::Archery,
            GamePhase::Assignment,
            GamePhase::Skirmish,
            GamePhase::Regroup,
        ] {
            let signals = machine.finish_phase().unwrap();
            assert_eq!(sent_states(&signals), vec![expected]);
            assert_eq!(machine.current(), expected);
        }
    }

    #[test]
    fn test_regroup_prompts_instead_of_sending() {
        let mut machine = regrouped_holder();

        let signals = machine.finish_phase().unwrap();
        assert_eq!(signals, vec![PhaseSignal::PromptMoveAgain]);
        assert_eq!(machine.current(), GamePhase::Regroup);
    }

    #[test]
    fn test_move_again_advances_site_and_restarts_shadow() {
        let mut machine = regrouped_holder();

        let signals = machine.move_again().unwrap();
        assert!(signals.contains(&PhaseSignal::AdvanceSite));
        assert_eq!(sent_states(&signals), vec![GamePhase::Shadow]);
        assert_eq!(machine.current(), GamePhase::Shadow);
        assert_eq!(machine.active_fellowship(), FellowshipHolder::Player);
    }

    #[test]
    fn test_end_turn_flips_holder() {
        let mut machine = regrouped_holder();

        let signals = machine.end_turn().unwrap();
        assert_eq!(
            signals,
            vec![PhaseSignal::Send(GameEvent::EndTurn {
                current_state: GamePhase::Fellowship,
            })]
        );
        assert_eq!(machine.current(), GamePhase::Fellowship);
        assert_eq!(machine.active_fellowship(), FellowshipHolder::Opponent);

        // And the receiving side's view of the same exchange.
        let mut other = regrouped_holder();
        other.active = FellowshipHolder::Opponent;
        other.current = GamePhase::Regroup;
        other.opponent_turn_ended();
        assert_eq!(other.current(), GamePhase::Fellowship);
        assert_eq!(other.active_fellowship(), FellowshipHolder::Player);
    }

    #[test]
    fn test_non_holder_regroup_actions_rejected() {
        let mut machine = regrouped_holder();
        machine.active = FellowshipHolder::Opponent;

        assert_eq!(machine.move_again(), Err(PhaseError::NotFellowshipHolder));
        assert_eq!(machine.end_turn(), Err(PhaseError::NotFellowshipHolder));
        assert_eq!(machine.current(), GamePhase::Regroup);
        assert_eq!(machine.active_fellowship(), FellowshipHolder::Opponent);
    }

    #[test]
    fn test_stray_remote_events_before_bidding_are_ignored() {
        let mut machine = PhaseMachine::new();
        machine.opponent_phase_finished(GamePhase::Shadow, false);
        assert_eq!(machine.current(), GamePhase::Init);
    }

    /// A machine that holds the fellowship and sits in Regroup.
    fn regrouped_holder() -> PhaseMachine {
        let mut machine = PhaseMachine::new();
        machine.begin_game().unwrap();
        machine.submit_bid(3, true).unwrap();
        machine.opponent_bid(1, true);
        for _ in 0..6 {
            machine.finish_phase().unwrap();
        }
        assert_eq!(machine.current(), GamePhase::Regroup);
        machine
    }
}
