//! Whole turns driven through the public API.

use crownmatch::board::{Board, BoardEvent, Pos};
use crownmatch::game::{Game, GameConfig, SwapRejected, TurnPhase};
use crownmatch::session::{Outcome, Session};

fn picture_game(rows: &[&str], session: Session) -> Game {
    Game::from_board(Board::from_picture(3, rows).unwrap(), session, 11)
}

fn seeded(seed: u64) -> Game {
    Game::new(&GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    })
    .unwrap()
}

#[test]
fn non_matching_swap_leaves_board_and_moves_alone() {
    let mut game = picture_game(&["012", "210", "120"], Session::new(3, 3));
    let before = game.board().clone();
    let summary = game
        .play_turn(Pos::new(0, 0), Pos::new(0, 1), &mut ())
        .unwrap();
    assert!(!summary.matched);
    assert_eq!(summary.cascades, 0);
    assert_eq!(game.board(), &before);
    assert_eq!(game.session().moves_left(), 3);
    assert!(game.accepting_input());
}

#[test]
fn cascades_cost_a_single_move() {
    // One column: swapping the bottom pair matches rows 4, 6 and 8. After the fall, the
    // 1s from rows 1, 3 and 8 line up in rows 4, 6 and 8.
    let mut game = picture_game(
        &["2", "1", "2", "1", "0", "0", "0", "0", "1"],
        Session::new(5, 5),
    );
    let mut events = Vec::new();
    let summary = game
        .play_turn(Pos::new(7, 0), Pos::new(8, 0), &mut events)
        .unwrap();
    assert!(summary.matched);
    assert!(summary.cascades >= 2, "{summary:?}");
    assert!(summary.removed >= 6);
    assert_eq!(game.session().moves_left(), 4);

    let removed = events
        .iter()
        .filter(|e| matches!(e, BoardEvent::Removed { .. }))
        .count();
    assert_eq!(removed as u32, summary.removed);
}

#[test]
fn crown_next_to_a_match_counts_down() {
    let mut game = picture_game(&["*20", "210", "012"], Session::new(2, 5));
    let mut events = Vec::new();
    let summary = game
        .play_turn(Pos::new(1, 1), Pos::new(1, 2), &mut events)
        .unwrap();
    assert!(summary.activated >= 1);
    assert_eq!(game.session().crowns_left(), 2 - summary.activated.min(2));
    assert!(events.contains(&BoardEvent::Activated {
        id: game.board().get(Pos::new(0, 0)).unwrap().id,
        at: Pos::new(0, 0),
    }));
    // The crown is not consumed by activating.
    assert!(game.board().kind_at(Pos::new(0, 0)).unwrap().is_crown());
}

#[test]
fn same_seed_same_game() {
    let mut a = seeded(2024);
    let mut b = seeded(2024);
    assert_eq!(a.board(), b.board());
    for _ in 0..3 {
        let Some((p, q)) = a.hint() else { break };
        let sa = a.play_turn(p, q, &mut ()).unwrap();
        let sb = b.play_turn(p, q, &mut ()).unwrap();
        assert_eq!(sa, sb);
        assert_eq!(a.board(), b.board());
    }
}

#[test]
fn hinted_play_keeps_the_board_sound() {
    for seed in 0..8 {
        let mut game = seeded(seed);
        let total_moves = game.session().moves_left();
        for _ in 0..total_moves {
            if game.session().is_finished() {
                break;
            }
            let Some((p, q)) = game.hint() else { break };
            let crowns = game.session().crowns_left();
            let moves = game.session().moves_left();
            let summary = game.play_turn(p, q, &mut ()).unwrap();

            assert!(summary.matched, "seed {seed}: hint {p} <-> {q} did not match");
            assert_eq!(game.session().moves_left(), moves - 1);
            assert!(game.session().crowns_left() <= crowns);
            assert_eq!(game.phase(), &TurnPhase::Idle);
            assert!(game.board().is_full());
            assert!(game.board().is_consistent());
            assert!(game.board().find_matches().is_empty());
        }
        if game.session().moves_left() == 0 {
            assert!(game.session().is_finished());
        }
    }
}

#[test]
fn finished_session_rejects_swaps() {
    let mut game = picture_game(&["*20", "210", "012"], Session::new(1, 3));
    game.play_turn(Pos::new(1, 1), Pos::new(1, 2), &mut ())
        .unwrap();
    assert_eq!(game.session().outcome(), Some(Outcome::Cleared));
    assert!(!game.accepting_input());
    assert_eq!(
        game.play_turn(Pos::new(2, 0), Pos::new(2, 1), &mut ()),
        Err(SwapRejected::Finished)
    );
}

#[test]
fn stepping_by_hand_matches_play_turn() {
    let mut stepped = picture_game(&["012", "210", "120"], Session::new(3, 3));
    let mut direct = picture_game(&["012", "210", "120"], Session::new(3, 3));
    let (a, b) = (Pos::new(1, 1), Pos::new(1, 2));

    stepped.begin_swap(a, b, &mut ()).unwrap();
    let mut steps = 0;
    while stepped.advance(&mut ()).is_some() {
        steps += 1;
        assert!(steps < 1000, "turn never settled");
    }
    let summary = direct.play_turn(a, b, &mut ()).unwrap();
    assert_eq!(stepped.board(), direct.board());
    assert_eq!(stepped.last_turn(), Some(summary));
}
