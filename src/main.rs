use std::collections::HashMap;

use colored::{ColoredString, Colorize};
use judgement_rs::games::judgement::{GamePhase, GameType, JudgementGame, Suit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn suit_label(suit: Suit) -> ColoredString {
    match suit {
        Suit::Spades => format!("{:<8}", "Spades").blue(),
        Suit::Diamonds => format!("{:<8}", "Diamonds").yellow(),
        Suit::Clubs => format!("{:<8}", "Clubs").green(),
        Suit::Hearts => format!("{:<8}", "Hearts").red(),
    }
}

fn print_round(game: &JudgementGame, index: usize) {
    let round = &game.rounds[index];
    println!(
        "round {:>2} | {} | {:>2} cards | first to act: {}",
        index + 1,
        suit_label(round.suit),
        round.card_count,
        round.first_to_act
    );
    for player in &game.players {
        let bid = round.bids[&player.name];
        let earned = round.outcomes[&player.name];
        let result = if earned > 0 {
            format!("+{earned}").green()
        } else {
            "+0".dimmed()
        };
        println!("    {:<10} bid {} -> {}", player.name, bid, result);
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut game = JudgementGame::new_with_rng(&["Asha", "Brian", "Chebet", "Daudi"], &mut rng)
        .expect("player list should be valid");
    game.reconfigure(4, GameType::Complete, 10)
        .expect("configuration should be valid");
    game.start().expect("game should start");

    while game.phase == GamePhase::Playing {
        let index = game.current_round_index;
        let mut session = game
            .start_bid(index)
            .expect("the current round accepts bids");
        while !session.is_complete() {
            let mut bid = rng.gen_range(0..=session.card_count());
            if session.restricted_value() == Some(bid) {
                bid = if bid == 0 { 1 } else { bid - 1 };
            }
            session.submit(bid).expect("bid should be legal");
        }
        game.commit_bids(&session).expect("session is complete");

        let outcomes: HashMap<String, bool> = game
            .players
            .iter()
            .map(|p| (p.name.clone(), rng.gen_bool(0.5)))
            .collect();
        game.commit_scores(&outcomes)
            .expect("every player has a decision");
        print_round(&game, index);
    }

    println!();
    println!("{}", "FINAL RANKING".bold());
    for (place, player) in game.ranking().iter().enumerate() {
        println!("{:>2}. {:<10} {:>4} pts", place + 1, player.name, player.score);
    }
    println!();
    println!(
        "snapshot: {}",
        serde_json::to_string(&game).expect("game state serializes")
    );
}
