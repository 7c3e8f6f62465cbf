//! Turn/phase integration tests.
//!
//! Bidding, fellowship-holder gating, and turn handover exercised
//! through two full sessions exchanging real payloads.

use mirrortable::session::{GameSession, Outbound, SessionError, UiPrompt};
use mirrortable::{FellowshipHolder, GamePhase, PhaseError};

const DECK: &str = "\
cardNumber,cardName,cardId,cardSide,cardType,cardSiteNum
1,Frodo,LOTR-EN01290,Free Peoples,Ring-Bearer,0
2,The One Ring,LOTR-EN01002,Free Peoples,Ring,0
3,Aragorn,LOTR-EN01364,Free Peoples,Companion,0
4,Bree Gate,LOTR-EN01326,,Site,1
5,Prancing Pony,LOTR-EN01337,,Site,2
";

fn pump(from: &mut GameSession, to: &mut GameSession) {
    for outbound in from.take_outbound() {
        match outbound {
            Outbound::Card(event) => {
                to.handle_card_event(&event);
            }
            Outbound::Game(envelope) => to.handle_game_event(&envelope),
        }
    }
}

/// Two sessions through deck load and Init. `player_first` is opposite
/// by join order.
fn bidding_pair() -> (GameSession, GameSession) {
    let mut a = GameSession::new("playerA", true, 1);
    let mut b = GameSession::new("playerB", false, 2);
    a.load_deck(DECK, "Aragorn").unwrap();
    b.load_deck(DECK, "Gandalf").unwrap();

    let prompts = a.begin_game().unwrap();
    assert_eq!(prompts, vec![UiPrompt::OpenBidPopup]);
    b.begin_game().unwrap();
    pump(&mut a, &mut b);
    pump(&mut b, &mut a);
    (a, b)
}

// =============================================================================
// Bidding
// =============================================================================

/// A bids 3, B bids 1: A holds the fellowship. A's Fellowship
/// PhaseFinished is accepted; B's identical call beforehand is rejected
/// and changes nothing.
#[test]
fn test_bid_scenario_higher_bid_holds_fellowship() {
    let (mut a, mut b) = bidding_pair();

    a.submit_bid(3).unwrap();
    pump(&mut a, &mut b);
    b.submit_bid(1).unwrap();
    pump(&mut b, &mut a);

    assert_eq!(a.phase(), GamePhase::Fellowship);
    assert_eq!(b.phase(), GamePhase::Fellowship);
    assert_eq!(a.active_fellowship(), FellowshipHolder::Player);
    assert_eq!(b.active_fellowship(), FellowshipHolder::Opponent);

    // B jumps the gun.
    let err = b.finish_phase().unwrap_err();
    assert_eq!(err, SessionError::Phase(PhaseError::NotFellowshipHolder));
    assert_eq!(b.phase(), GamePhase::Fellowship);
    assert_eq!(b.active_fellowship(), FellowshipHolder::Opponent);
    assert!(b.take_outbound().is_empty());

    // A advances; B follows from the replicated event.
    a.finish_phase().unwrap();
    pump(&mut a, &mut b);
    assert_eq!(a.phase(), GamePhase::Shadow);
    assert_eq!(b.phase(), GamePhase::Shadow);
}

/// Equal bids fall back to the playerFirst flag, so join order decides.
#[test]
fn test_tied_bid_uses_join_order() {
    let (mut a, mut b) = bidding_pair();

    a.submit_bid(2).unwrap();
    pump(&mut a, &mut b);
    b.submit_bid(2).unwrap();
    pump(&mut b, &mut a);

    assert_eq!(a.active_fellowship(), FellowshipHolder::Player);
    assert_eq!(b.active_fellowship(), FellowshipHolder::Opponent);
}

// =============================================================================
// Mid-turn phases
// =============================================================================

/// Shadow through Skirmish advance symmetrically: the non-holder can
/// finish them too.
#[test]
fn test_middle_phases_are_symmetric() {
    let (mut a, mut b) = bidding_pair();
    a.submit_bid(3).unwrap();
    pump(&mut a, &mut b);
    b.submit_bid(1).unwrap();
    pump(&mut b, &mut a);

    a.finish_phase().unwrap(); // Fellowship -> Shadow, holder only
    pump(&mut a, &mut b);

    // The non-holder finishes Shadow.
    b.finish_phase().unwrap();
    pump(&mut b, &mut a);
    assert_eq!(a.phase(), GamePhase::Maneuver);
    assert_eq!(b.phase(), GamePhase::Maneuver);
}

// =============================================================================
// Turn handover
// =============================================================================

/// EndTurn hands the fellowship across and both sides return to
/// Fellowship.
#[test]
fn test_end_turn_hands_over_fellowship() {
    let (mut a, mut b) = bidding_pair();
    a.submit_bid(3).unwrap();
    pump(&mut a, &mut b);
    b.submit_bid(1).unwrap();
    pump(&mut b, &mut a);

    for _ in 0..6 {
        a.finish_phase().unwrap();
    }
    assert_eq!(a.phase(), GamePhase::Regroup);
    let prompts = a.finish_phase().unwrap();
    assert_eq!(prompts, vec![UiPrompt::PromptMoveAgain]);

    a.end_turn().unwrap();
    pump(&mut a, &mut b);

    assert_eq!(a.phase(), GamePhase::Fellowship);
    assert_eq!(b.phase(), GamePhase::Fellowship);
    assert_eq!(a.active_fellowship(), FellowshipHolder::Opponent);
    assert_eq!(b.active_fellowship(), FellowshipHolder::Player);

    // Now B can advance Fellowship and A cannot.
    assert_eq!(
        a.finish_phase(),
        Err(SessionError::Phase(PhaseError::NotFellowshipHolder))
    );
    b.finish_phase().unwrap();
    pump(&mut b, &mut a);
    assert_eq!(a.phase(), GamePhase::Shadow);
}

/// MoveAgain keeps the turn, advances the site, and replicates the new
/// site number.
#[test]
fn test_move_again_keeps_turn() {
    let (mut a, mut b) = bidding_pair();
    a.submit_bid(3).unwrap();
    pump(&mut a, &mut b);
    b.submit_bid(1).unwrap();
    pump(&mut b, &mut a);

    for _ in 0..6 {
        a.finish_phase().unwrap();
    }
    a.finish_phase().unwrap();
    a.move_again().unwrap();
    pump(&mut a, &mut b);

    assert_eq!(a.own_site(), 2);
    assert_eq!(b.opponent_site(), 2);
    assert_eq!(a.active_fellowship(), FellowshipHolder::Player);
    assert_eq!(a.phase(), GamePhase::Shadow);
    assert_eq!(b.phase(), GamePhase::Shadow);
}

/// Regroup choices from the non-holder are rejected without touching
/// state.
#[test]
fn test_non_holder_regroup_choices_rejected() {
    let (mut a, mut b) = bidding_pair();
    a.submit_bid(3).unwrap();
    pump(&mut a, &mut b);
    b.submit_bid(1).unwrap();
    pump(&mut b, &mut a);

    for _ in 0..6 {
        a.finish_phase().unwrap();
    }
    pump(&mut a, &mut b);
    assert_eq!(b.phase(), GamePhase::Regroup);

    assert_eq!(
        b.move_again(),
        Err(SessionError::Phase(PhaseError::NotFellowshipHolder))
    );
    assert_eq!(
        b.end_turn(),
        Err(SessionError::Phase(PhaseError::NotFellowshipHolder))
    );
    assert_eq!(b.phase(), GamePhase::Regroup);
    assert_eq!(b.own_site(), 1);
    assert!(b.take_outbound().is_empty());
}
