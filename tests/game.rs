//! Blackjack round integration tests.
//!
//! Rounds are dealt from stacked shoes. With one player the deal order is
//! player, dealer up card, player, dealer hole card; later draws follow.

use cardtable::{
    Action, ActionKind, Blackjack, Card, DeckError, DoubleOption, Game, GameConfig, GameError,
    HandOutcome, HandStatus, Identity, IllegalReason, MAX_BET_LIMIT, Phase, Player, PlayerId,
    Rank, RoundPhase, RoundResult, RoundingMode, RuleSettings, SessionId, Suit,
};

const fn card(suit: Suit, rank: Rank) -> Card {
    Card::new(suit, rank)
}

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn seat(game: &mut Game, id: u64) {
    let player = Player::new(Identity::new(id, format!("p{id}"))).with_bet(100);
    game.add_player(player).unwrap();
}

fn table_with(settings: RuleSettings, min_players: usize, draws: &[Card], players: u64) -> Game {
    let config = GameConfig::default()
        .with_players(min_players, 7)
        .with_settings(settings.clone());
    let rules = Box::new(Blackjack::stacked(settings, draws));
    let mut game = Game::new(SessionId(1), "blackjack", config, rules);
    for id in 1..=players {
        seat(&mut game, id);
    }
    game
}

fn table(draws: &[Card], players: u64) -> Game {
    table_with(RuleSettings::default(), 1, draws, players)
}

fn results(game: &Game) -> RoundResult {
    game.public_state(None)
        .blackjack()
        .and_then(|view| view.results.clone())
        .unwrap()
}

fn round(game: &Game) -> RoundPhase {
    game.public_state(None).blackjack().unwrap().round
}

fn illegal_reason(err: GameError) -> IllegalReason {
    match err {
        GameError::IllegalAction(illegal) => illegal.reason,
        other => panic!("expected an illegal action, got {other:?}"),
    }
}

fn events(game: &Game, kind: &str) -> usize {
    game.history().of_kind(kind).count()
}

#[test]
fn dealer_bust_pays_double() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Six),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::King),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    assert_eq!(game.phase(), Phase::Playing);

    game.apply_action(P1, Action::Stand).unwrap();

    assert_eq!(game.phase(), Phase::Finished);
    let result = results(&game);
    assert!(result.dealer_bust);
    assert_eq!(result.dealer_value, 26);

    let p1 = result.player(P1).unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::DealerBust);
    assert_eq!(p1.total_payout, 200);
    assert_eq!(p1.net, 100);

    assert_eq!(events(&game, "dealer_reveal"), 1);
    assert_eq!(events(&game, "dealer_hit"), 1);
    assert_eq!(events(&game, "game_ended"), 1);
}

#[test]
fn natural_pays_three_to_two_and_ends_at_deal() {
    let draws = [
        card(Suit::Hearts, Rank::Ace),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Hearts, Rank::King),
        card(Suit::Clubs, Rank::Eight),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();

    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(events(&game, "natural_blackjack"), 1);

    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Blackjack);
    assert_eq!(p1.total_payout, 150);
    assert_eq!(p1.net, 50);
}

#[test]
fn blackjack_rounding_mode_applies() {
    let draws = [
        card(Suit::Hearts, Rank::Ace),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Hearts, Rank::King),
        card(Suit::Clubs, Rank::Eight),
    ];
    let payout = |mode| {
        let settings = RuleSettings::default().with_rounding_blackjack(mode);
        let mut game = table_with(settings, 1, &draws, 0);
        let player = Player::new(Identity::new(1, "p1")).with_bet(25);
        game.add_player(player).unwrap();
        game.start().unwrap();
        results(&game).player(P1).unwrap().total_payout
    };

    assert_eq!(payout(RoundingMode::Down), 37);
    assert_eq!(payout(RoundingMode::Up), 38);
    assert_eq!(payout(RoundingMode::Nearest), 38);
}

#[test]
fn equal_totals_push() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Clubs, Rank::Eight),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    game.apply_action(P1, Action::Stand).unwrap();

    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Push);
    assert_eq!(p1.total_payout, 100);
    assert_eq!(p1.net, 0);
}

#[test]
fn dealer_hits_soft_17_when_configured() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Six),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Diamonds, Rank::Ace),
        card(Suit::Spades, Rank::Two),
    ];

    let mut hits = table(&draws, 1);
    hits.start().unwrap();
    hits.apply_action(P1, Action::Stand).unwrap();
    let result = results(&hits);
    assert_eq!(result.dealer_value, 19);
    assert_eq!(result.player(P1).unwrap().hands[0].outcome, HandOutcome::Push);

    let settings = RuleSettings::default().with_dealer_hits_soft_17(false);
    let mut stands = table_with(settings, 1, &draws, 1);
    stands.start().unwrap();
    stands.apply_action(P1, Action::Stand).unwrap();
    let result = results(&stands);
    assert_eq!(result.dealer_value, 17);
    assert_eq!(result.player(P1).unwrap().hands[0].outcome, HandOutcome::Win);
    assert_eq!(events(&stands, "dealer_hit"), 0);
}

#[test]
fn bust_loses_even_if_dealer_busts() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Six),
        card(Suit::Hearts, Rank::Six),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::King),
        card(Suit::Spades, Rank::Queen),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    game.apply_action(P1, Action::Hit).unwrap();

    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(events(&game, "bust"), 1);

    let result = results(&game);
    assert!(result.dealer_bust);
    let p1 = result.player(P1).unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Bust);
    assert_eq!(p1.total_payout, 0);
    assert_eq!(p1.net, -100);
}

#[test]
fn split_then_double_after_split() {
    let draws = [
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Eight),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Diamonds, Rank::Three),
        card(Suit::Diamonds, Rank::King),
        card(Suit::Diamonds, Rank::Nine),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();

    game.apply_action(P1, Action::Split).unwrap();
    {
        let player = game.player(P1).unwrap();
        assert_eq!(player.hands().len(), 2);
        assert_eq!(player.hands()[0].value().total, 11);
        assert_eq!(player.hands()[1].value().total, 18);
        assert_eq!(player.hands()[1].bet(), 100);
        assert_eq!(player.active_hand_index(), 0);
    }
    assert_eq!(
        illegal_reason(game.validate_action(P1, &Action::Split).unwrap_err()),
        IllegalReason::NotAPair
    );

    game.apply_action(P1, Action::Double).unwrap();
    {
        let player = game.player(P1).unwrap();
        assert_eq!(player.hands()[0].bet(), 200);
        assert_eq!(player.hands()[0].status(), HandStatus::Stand);
        assert_eq!(player.active_hand_index(), 1);
    }

    game.apply_action(P1, Action::Stand).unwrap();
    assert_eq!(game.phase(), Phase::Finished);

    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands.len(), 2);
    assert_eq!(p1.hands[0].outcome, HandOutcome::Win);
    assert_eq!(p1.hands[0].payout, 400);
    assert_eq!(p1.hands[1].outcome, HandOutcome::Win);
    assert_eq!(p1.hands[1].payout, 200);
    assert_eq!(p1.total_payout, 600);
    assert_eq!(p1.net, 300);
}

#[test]
fn split_hand_may_not_double_without_das() {
    let draws = [
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Eight),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Diamonds, Rank::Three),
        card(Suit::Diamonds, Rank::King),
    ];
    let settings = RuleSettings::default().with_double_after_split(false);
    let mut game = table_with(settings, 1, &draws, 1);
    game.start().unwrap();
    game.apply_action(P1, Action::Split).unwrap();

    let err = game.apply_action(P1, Action::Double).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::DoubleRestricted);
}

#[test]
fn split_requires_equal_ranks() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Spades, Rank::King),
        card(Suit::Clubs, Rank::Nine),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();

    let err = game.apply_action(P1, Action::Split).unwrap_err();
    match err {
        GameError::IllegalAction(illegal) => {
            assert_eq!(illegal.action, ActionKind::Split);
            assert_eq!(illegal.reason, IllegalReason::NotAPair);
            assert_eq!(illegal.hand.cards, 2);
            assert_eq!(illegal.hand.value, 20);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(game.player(P1).unwrap().hands().len(), 1);
}

#[test]
fn max_splits_is_enforced() {
    let draws = [
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Eight),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Diamonds, Rank::Eight),
        card(Suit::Diamonds, Rank::King),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    game.apply_action(P1, Action::Split).unwrap();

    // The left hand is 8-8 again, but one split is the default limit.
    let err = game.apply_action(P1, Action::Split).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::MaxSplitsReached);
}

#[test]
fn double_needs_two_cards() {
    let draws = [
        card(Suit::Hearts, Rank::Five),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Six),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Diamonds, Rank::Two),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    game.apply_action(P1, Action::Hit).unwrap();
    assert_eq!(game.player(P1).unwrap().hands()[0].value().total, 13);

    let history_len = game.history().len();
    let err = game.apply_action(P1, Action::Double).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::NotTwoCards);
    assert_eq!(game.history().len(), history_len);
}

#[test]
fn double_option_restricts_totals() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Two),
        card(Suit::Clubs, Rank::Seven),
    ];
    let settings = RuleSettings::default().with_double(DoubleOption::NineThrough11);
    let mut game = table_with(settings, 1, &draws, 1);
    game.start().unwrap();

    let err = game.validate_action(P1, &Action::Double).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::DoubleRestricted);
    assert!(!game.available_actions(P1).contains(&ActionKind::Double));
}

#[test]
fn surrender_refunds_half() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Six),
        card(Suit::Clubs, Rank::Seven),
    ];
    let settings = RuleSettings::default().with_surrender(true);
    let mut game = table_with(settings, 1, &draws, 1);
    game.start().unwrap();
    assert!(game.available_actions(P1).contains(&ActionKind::Surrender));

    game.apply_action(P1, Action::Surrender).unwrap();

    assert_eq!(game.phase(), Phase::Finished);
    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Surrender);
    assert_eq!(p1.total_payout, 50);
    assert_eq!(p1.net, -50);
}

#[test]
fn surrender_only_as_first_decision() {
    let draws = [
        card(Suit::Hearts, Rank::Two),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Three),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Diamonds, Rank::Four),
    ];
    let settings = RuleSettings::default().with_surrender(true);
    let mut game = table_with(settings, 1, &draws, 1);
    game.start().unwrap();
    game.apply_action(P1, Action::Hit).unwrap();

    let err = game.apply_action(P1, Action::Surrender).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::NotFirstDecision);

    let mut closed = table(&draws, 1);
    closed.start().unwrap();
    let err = closed.apply_action(P1, Action::Surrender).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::SurrenderNotOffered);
}

#[test]
fn insurance_pays_against_dealer_blackjack() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ace),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::King),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();

    // The dealer natural waits for the insurance decision.
    assert_eq!(game.phase(), Phase::Playing);
    let view = game.public_state(Some(P1));
    let bj = view.blackjack().unwrap();
    assert!(bj.insurance_open);
    assert!(!bj.dealer.hole_revealed);
    assert!(view.player(P1).unwrap().available_actions.contains(&ActionKind::Insurance));

    let err = game
        .apply_action(P1, Action::Insurance { amount: 60 })
        .unwrap_err();
    assert_eq!(
        illegal_reason(err),
        IllegalReason::InsuranceAmount { max: 50 }
    );

    game.apply_action(P1, Action::Insurance { amount: 50 }).unwrap();

    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(events(&game, "dealer_blackjack"), 1);

    let result = results(&game);
    assert!(result.dealer_blackjack);
    let p1 = result.player(P1).unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Lose);
    assert_eq!(p1.insurance_bet, 50);
    assert_eq!(p1.insurance_payout, 100);
    assert_eq!(p1.total_payout, 100);
    assert_eq!(p1.net, -50);
}

#[test]
fn insurance_lost_without_dealer_blackjack() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ace),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::Seven),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    game.apply_action(P1, Action::Insurance { amount: 50 }).unwrap();

    assert_eq!(game.phase(), Phase::Playing);
    assert!(!game.public_state(None).blackjack().unwrap().insurance_open);

    let err = game
        .apply_action(P1, Action::Insurance { amount: 10 })
        .unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::InsuranceAlreadyPlaced);

    game.apply_action(P1, Action::Stand).unwrap();
    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Win);
    assert_eq!(p1.insurance_payout, 0);
    assert_eq!(p1.total_payout, 200);
    assert_eq!(p1.net, 50);
    assert_eq!(events(&game, "insurance_result"), 1);
}

#[test]
fn declining_insurance_reveals_dealer_blackjack() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ace),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::King),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    assert_eq!(
        game.available_actions(P1),
        vec![ActionKind::Insurance, ActionKind::DeclineInsurance]
    );

    game.apply_action(P1, Action::DeclineInsurance).unwrap();

    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(events(&game, "insurance_declined"), 1);
    assert_eq!(events(&game, "dealer_hit"), 0);
    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Lose);
    assert_eq!(p1.insurance_bet, 0);
    assert_eq!(p1.net, -100);
}

#[test]
fn play_waits_for_insurance_answers() {
    // Player 5,6 against a dealer ace up and king in the hole.
    let draws = [
        card(Suit::Hearts, Rank::Five),
        card(Suit::Clubs, Rank::Ace),
        card(Suit::Hearts, Rank::Six),
        card(Suit::Clubs, Rank::King),
        card(Suit::Spades, Rank::Ten),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    assert_eq!(game.phase(), Phase::Playing);

    for action in [
        Action::Double,
        Action::Hit,
        Action::Stand,
        Action::Split,
        Action::Surrender,
    ] {
        let err = game.apply_action(P1, action).unwrap_err();
        assert_eq!(illegal_reason(err), IllegalReason::InsuranceDecisionPending);
    }
    let hand = &game.player(P1).unwrap().hands()[0];
    assert_eq!(hand.len(), 2);
    assert_eq!(hand.bet(), 100);

    game.apply_action(P1, Action::DeclineInsurance).unwrap();

    // The natural settles before the hand can change.
    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(events(&game, "double"), 0);
    assert_eq!(events(&game, "dealer_blackjack"), 1);
    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].bet, 100);
    assert_eq!(p1.hands[0].outcome, HandOutcome::Lose);
    assert_eq!(p1.net, -100);
}

#[test]
fn every_player_answers_insurance_before_play() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Spades, Rank::Nine),
        card(Suit::Clubs, Rank::Ace),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Spades, Rank::Seven),
        card(Suit::Clubs, Rank::Six),
        card(Suit::Diamonds, Rank::Two),
    ];
    let mut game = table(&draws, 2);
    game.start().unwrap();

    game.apply_action(P1, Action::DeclineInsurance).unwrap();
    let err = game.apply_action(P1, Action::DeclineInsurance).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::InsuranceDeclined);

    // P2 has not answered, so the dealer has not checked yet.
    let err = game.apply_action(P1, Action::Stand).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::InsuranceDecisionPending);
    assert!(game.public_state(None).blackjack().unwrap().insurance_open);

    game.apply_action(P2, Action::Insurance { amount: 50 }).unwrap();
    assert!(!game.public_state(None).blackjack().unwrap().insurance_open);
    assert_eq!(events(&game, "dealer_blackjack"), 0);

    game.apply_action(P1, Action::Stand).unwrap();
    game.apply_action(P2, Action::Stand).unwrap();

    // Dealer A,6 is a soft 17 and draws a two.
    let result = results(&game);
    assert_eq!(result.dealer_value, 19);
    let p2 = result.player(P2).unwrap();
    assert_eq!(p2.hands[0].outcome, HandOutcome::Lose);
    assert_eq!(p2.insurance_payout, 0);
    assert_eq!(p2.net, -150);
    assert_eq!(result.player(P1).unwrap().net, -100);
}

#[test]
fn largest_stakes_settle_without_overflow() {
    let draws = [
        card(Suit::Hearts, Rank::Five),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Hearts, Rank::Six),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Spades, Rank::Ten),
    ];
    let settings = RuleSettings::default().with_max_bet(MAX_BET_LIMIT);
    let config = GameConfig::default()
        .with_players(1, 7)
        .with_settings(settings.clone());
    let rules = Box::new(Blackjack::stacked(settings, &draws));
    let mut game = Game::new(SessionId(5), "blackjack", config, rules);

    let whale = Player::new(Identity::new(1, "whale")).with_bet(u64::MAX / 2 + 1);
    assert_eq!(
        game.add_player(whale).unwrap_err(),
        GameError::InvalidBet { max: MAX_BET_LIMIT }
    );

    let high_roller = Player::new(Identity::new(1, "high roller")).with_bet(MAX_BET_LIMIT);
    game.add_player(high_roller).unwrap();
    game.start().unwrap();
    game.apply_action(P1, Action::Double).unwrap();

    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Win);
    assert_eq!(p1.hands[0].bet, 2 * MAX_BET_LIMIT);
    assert_eq!(p1.total_payout, 4 * MAX_BET_LIMIT);
    assert_eq!(p1.net, 2 * MAX_BET_LIMIT as i64);
}

#[test]
fn insurance_refused_without_ace() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::Seven),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();

    let err = game
        .apply_action(P1, Action::Insurance { amount: 10 })
        .unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::DealerNotShowingAce);

    let settings = RuleSettings::default().with_insurance(false);
    let mut off = table_with(settings, 1, &draws, 1);
    off.start().unwrap();
    let err = off
        .apply_action(P1, Action::Insurance { amount: 10 })
        .unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::InsuranceNotOffered);
}

#[test]
fn dealer_blackjack_without_insurance_settles_at_deal() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::King),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::Ace),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();

    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(round(&game), RoundPhase::Settled);
    let result = results(&game);
    assert!(result.dealer_blackjack);
    assert_eq!(result.player(P1).unwrap().net, -100);

    let err = game.apply_action(P1, Action::Hit).unwrap_err();
    assert_eq!(err, GameError::GameFinished);
}

#[test]
fn player_natural_is_paid_against_dealer_natural() {
    let draws = [
        card(Suit::Hearts, Rank::Ace),
        card(Suit::Clubs, Rank::King),
        card(Suit::Hearts, Rank::King),
        card(Suit::Clubs, Rank::Ace),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();

    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Blackjack);
    assert_eq!(p1.total_payout, 150);
}

#[test]
fn turns_follow_the_first_unfinished_player() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Spades, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Diamonds, Rank::Nine),
        card(Suit::Spades, Rank::Seven),
    ];
    let mut game = table(&draws, 2);
    game.start().unwrap();
    assert_eq!(game.table().turn_index(), 0);

    game.apply_action(P1, Action::Stand).unwrap();
    assert_eq!(game.table().turn_index(), 1);
    assert_eq!(events(&game, "turn_changed"), 1);
    assert!(game.public_state(Some(P2)).player(P2).unwrap().is_current_turn);

    game.apply_action(P2, Action::Stand).unwrap();
    assert_eq!(game.phase(), Phase::Finished);

    let result = results(&game);
    assert_eq!(result.players.len(), 2);
    assert_eq!(result.player(P1).unwrap().hands[0].outcome, HandOutcome::Win);
    assert_eq!(result.player(P2).unwrap().hands[0].outcome, HandOutcome::Win);
}

#[test]
fn any_unfinished_player_may_act() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Spades, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Diamonds, Rank::Nine),
        card(Suit::Spades, Rank::Seven),
    ];
    let mut game = table(&draws, 2);
    game.start().unwrap();

    game.apply_action(P2, Action::Stand).unwrap();
    assert_eq!(game.table().turn_index(), 0);
    assert_eq!(game.phase(), Phase::Playing);

    let err = game.apply_action(P2, Action::Hit).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::HandFinished);
}

#[test]
fn leaving_mid_round_keeps_quorum_playing() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Spades, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Diamonds, Rank::Nine),
        card(Suit::Spades, Rank::Seven),
    ];
    let mut game = table(&draws, 2);
    game.start().unwrap();

    game.remove_player(P2).unwrap();
    assert_eq!(game.phase(), Phase::Playing);

    game.apply_action(P1, Action::Stand).unwrap();
    let result = results(&game);
    assert_eq!(result.players.len(), 1);
    assert!(result.player(P2).is_none());
}

#[test]
fn last_undecided_player_leaving_finishes_the_round() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Spades, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Diamonds, Rank::Nine),
        card(Suit::Spades, Rank::Seven),
    ];
    let mut game = table(&draws, 2);
    game.start().unwrap();
    game.apply_action(P1, Action::Stand).unwrap();

    game.remove_player(P2).unwrap();
    assert_eq!(game.phase(), Phase::Finished);
    assert_eq!(results(&game).players.len(), 1);
}

#[test]
fn dropping_below_minimum_abandons_the_round() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Spades, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Diamonds, Rank::Nine),
        card(Suit::Spades, Rank::Seven),
    ];
    let mut game = table_with(RuleSettings::default(), 2, &draws, 2);
    game.start().unwrap();

    game.remove_player(P2).unwrap();
    assert_eq!(game.phase(), Phase::Waiting);
    assert_eq!(round(&game), RoundPhase::Idle);
    assert_eq!(events(&game, "round_abandoned"), 1);
    assert!(game.player(P1).unwrap().hands().is_empty());

    let err = game.apply_action(P1, Action::Stand).unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidPhase {
            expected: Phase::Playing,
            actual: Phase::Waiting
        }
    );

    seat(&mut game, 3);
    assert_eq!(game.phase(), Phase::Ready);
    game.start().unwrap();
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(round(&game), RoundPhase::PlayerTurns);
}

#[test]
fn late_joiner_sits_out_the_round() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Spades, Rank::Eight),
        card(Suit::Hearts, Rank::Eight),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    seat(&mut game, 2);

    let err = game.apply_action(P2, Action::Stand).unwrap_err();
    assert_eq!(illegal_reason(err), IllegalReason::NotDealtIn);
    assert!(game.available_actions(P2).is_empty());

    game.apply_action(P1, Action::Stand).unwrap();
    let result = results(&game);
    assert_eq!(result.players.len(), 1);
}

#[test]
fn empty_shoe_is_refreshed_mid_round() {
    let draws = [
        card(Suit::Hearts, Rank::Two),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Three),
        card(Suit::Hearts, Rank::Seven),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    assert_eq!(game.public_state(None).blackjack().unwrap().shoe_size, 0);

    game.apply_action(P1, Action::Hit).unwrap();

    assert_eq!(events(&game, "shoe_refreshed"), 1);
    assert_eq!(game.player(P1).unwrap().hands()[0].len(), 3);
    assert_eq!(
        game.public_state(None).blackjack().unwrap().shoe_size,
        cardtable::DECK_SIZE - 1
    );
}

#[test]
fn short_shoe_leaves_session_ready() {
    let draws = [
        card(Suit::Hearts, Rank::Two),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Three),
    ];
    let mut game = table(&draws, 1);

    let err = game.start().unwrap_err();
    assert_eq!(
        err,
        GameError::Deck(DeckError::InsufficientCards {
            requested: 4,
            remaining: 3
        })
    );
    assert_eq!(game.phase(), Phase::Ready);
    assert_eq!(events(&game, "game_started"), 0);
}

#[test]
fn queries_do_not_mutate() {
    let draws = [
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Eight),
        card(Suit::Clubs, Rank::Seven),
    ];
    let mut game = table(&draws, 1);
    game.start().unwrap();
    let before = game.public_state(Some(P1));

    assert_eq!(
        game.available_actions(P1),
        vec![
            ActionKind::Hit,
            ActionKind::Stand,
            ActionKind::Double,
            ActionKind::Split
        ]
    );
    game.validate_action(P1, &Action::Split).unwrap();
    game.validate_action(P1, &Action::Double).unwrap();

    assert_eq!(game.public_state(Some(P1)), before);
}

#[test]
fn zero_stake_player_plays_for_nothing() {
    let draws = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::Seven),
    ];
    let settings = RuleSettings::default();
    let config = GameConfig::default().with_players(1, 7);
    let rules = Box::new(Blackjack::stacked(settings, &draws));
    let mut game = Game::new(SessionId(9), "blackjack", config, rules);
    game.add_player(Player::new(Identity::new(1, "free"))).unwrap();
    game.start().unwrap();
    game.apply_action(P1, Action::Stand).unwrap();

    let p1 = results(&game).player(P1).cloned().unwrap();
    assert_eq!(p1.hands[0].outcome, HandOutcome::Win);
    assert_eq!(p1.total_payout, 0);
    assert_eq!(p1.net, 0);
}

#[test]
fn shuffled_rounds_are_seeded() {
    let settings = RuleSettings::default().with_decks(6);
    let config = GameConfig::default()
        .with_players(1, 7)
        .with_settings(settings.clone());

    let deal = |seed| {
        let rules = Box::new(Blackjack::new(settings.clone(), seed));
        let mut game = Game::new(SessionId(1), "blackjack", config.clone(), rules);
        seat(&mut game, 1);
        game.start().unwrap();
        game.player(P1).unwrap().hands()[0].cards().to_vec()
    };

    assert_eq!(deal(11), deal(11));
}
