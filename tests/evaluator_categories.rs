use chat_holdem::cards::parse_cards;
use chat_holdem::evaluator::{evaluate, evaluate_five, evaluate_holdem, Category, EvalError};
use chat_holdem::hand::{Board, HoleCards};

fn five(s: &str) -> [chat_holdem::cards::Card; 5] {
    let xs = parse_cards(s).expect("valid cards");
    [xs[0], xs[1], xs[2], xs[3], xs[4]]
}

#[test]
fn seven_card_fixture_picks_pair_with_top_kickers() {
    let cards = parse_cards("K♣ A♣ 10♦ 10♥ 8♣ 5♠ Q♣").unwrap();
    let best = evaluate(&cards).unwrap();
    assert_eq!(best.category, Category::Pair);
    assert_eq!(best.best_five.to_vec(), parse_cards("K♣ A♣ 10♦ 10♥ Q♣").unwrap());

    let no_pair = evaluate_five(&five("A♠ K♦ Q♥ J♣ 9♠"));
    assert!(best > no_pair);
}

#[test]
fn royal_beats_straight_flush_beats_quads() {
    let royal = evaluate_five(&five("A♥ K♥ Q♥ J♥ 10♥"));
    let king_high_sf = evaluate_five(&five("K♠ Q♠ J♠ 10♠ 9♠"));
    let quad_aces = evaluate_five(&five("A♣ A♦ A♥ A♠ K♣"));
    assert_eq!(royal.category, Category::RoyalFlush);
    assert_eq!(king_high_sf.category, Category::StraightFlush);
    assert!(royal > king_high_sf);
    assert!(king_high_sf > quad_aces);
}

#[test]
fn kickers_break_ties_inside_a_category() {
    let aces_king = evaluate_five(&five("A♥ A♦ K♠ 7♣ 2♦"));
    let aces_queen = evaluate_five(&five("A♣ A♠ Q♠ 7♦ 2♣"));
    assert!(aces_king > aces_queen);

    let two_pair_high = evaluate_five(&five("J♣ J♦ 9♣ 9♥ 3♠"));
    let two_pair_low = evaluate_five(&five("J♥ J♠ 9♦ 9♠ 2♠"));
    assert!(two_pair_high > two_pair_low);

    let boat_threes = evaluate_five(&five("3♣ 3♦ 3♥ 2♠ 2♣"));
    let boat_twos = evaluate_five(&five("2♦ 2♥ 2♠ A♠ A♣"));
    assert!(boat_threes > boat_twos);

    let flush_second_card = evaluate_five(&five("A♥ Q♥ 7♥ 5♥ 3♥"));
    let flush_lower = evaluate_five(&five("A♣ J♣ 9♣ 8♣ 6♣"));
    assert!(flush_second_card > flush_lower);
}

#[test]
fn identical_ranks_in_different_suits_tie() {
    let a = evaluate_five(&five("A♥ K♦ 9♠ 7♣ 2♦"));
    let b = evaluate_five(&five("A♣ K♠ 9♦ 7♥ 2♣"));
    assert_eq!(a.value(), b.value());
}

#[test]
fn ace_is_high_only() {
    let wheel = evaluate_five(&five("A♣ 2♦ 3♥ 4♠ 5♣"));
    let six_high = evaluate_five(&five("2♣ 3♦ 4♥ 5♠ 6♣"));
    assert_eq!(wheel.category, Category::HighCard);
    assert_eq!(six_high.category, Category::Straight);
    let broadway = evaluate_five(&five("A♣ K♦ Q♥ J♠ 10♣"));
    assert!(broadway > six_high);
}

#[test]
fn holdem_uses_the_board() {
    let hole: HoleCards = "2♠ 7♦".parse().unwrap();
    let board: Board = "A♥ K♥ Q♥ J♥ 10♥".parse().unwrap();
    let eval = evaluate_holdem(&hole, &board).unwrap();
    assert_eq!(eval.category, Category::RoyalFlush);
}

#[test]
fn holdem_before_the_flop_is_degenerate() {
    let hole: HoleCards = "2♠ 7♦".parse().unwrap();
    let board: Board = "A♥ K♥".parse().unwrap();
    assert_eq!(evaluate_holdem(&hole, &board).unwrap_err(), EvalError::DegenerateHandInput(4));
}
