use draughts::agents::RandomActor;
use draughts::{generate_moves, legal_moves, Actor, Board, Move, Player, Square};
use draughts_shared::{BLACK_MAN, EMPTY, WHITE_KING, WHITE_MAN};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

#[test]
fn test_small_board_opening_moves() {
    let board = Board::new(4).unwrap();

    let white = legal_moves(Player::White, &board);
    let white_moves: Vec<Move> = white.moves().collect();
    assert_eq!(
        white_moves,
        vec![
            Move::simple(Square::new(0, 0), Square::new(1, 1)),
            Move::simple(Square::new(0, 2), Square::new(1, 1)),
            Move::simple(Square::new(0, 2), Square::new(1, 3)),
        ]
    );

    let black = legal_moves(Player::Black, &board);
    assert_eq!(black.move_count(), 3);
    assert!(!black.has_captures());
    assert_eq!(
        black.get(Square::new(3, 3)).map(|c| c.len()),
        Some(1),
        "the corner man only has one square to go to"
    );
}

#[test]
fn test_single_capture_removes_jumped_man() {
    let board = Board::with_pieces(
        8,
        &[(Square::new(3, 3), WHITE_MAN), (Square::new(4, 4), BLACK_MAN)],
    )
    .unwrap();

    let moves = legal_moves(Player::White, &board);
    assert_eq!(moves.move_count(), 1);
    let capture = moves.moves().next().unwrap();
    assert_eq!(capture.from, Square::new(3, 3));
    assert_eq!(capture.to, Square::new(5, 5));
    assert_eq!(capture.captures, vec![Square::new(4, 4)]);

    let after = board.apply(Player::White, &capture).unwrap();
    assert_eq!(after.get(Square::new(3, 3)), EMPTY);
    assert_eq!(after.get(Square::new(4, 4)), EMPTY);
    assert_eq!(after.get(Square::new(5, 5)), WHITE_MAN);
    assert_eq!(after.piece_count(), 1);
}

#[test]
fn test_capture_into_last_row_crowns() {
    let board = Board::with_pieces(
        6,
        &[(Square::new(3, 1), WHITE_MAN), (Square::new(4, 2), BLACK_MAN)],
    )
    .unwrap();
    let capture = legal_moves(Player::White, &board).moves().next().unwrap();
    let after = board.apply(Player::White, &capture).unwrap();
    assert_eq!(after.get(Square::new(5, 3)), WHITE_KING);
}

/// Plays seeded random games and checks every move against the board it was
/// played on.
#[test]
fn test_random_games_only_make_sound_moves() {
    for seed in 0..12u64 {
        let mut white = RandomActor::new(Player::White, Xoshiro256PlusPlus::seed_from_u64(seed));
        let mut black = RandomActor::new(Player::Black, Xoshiro256PlusPlus::seed_from_u64(seed + 100));
        let mut board = Board::new(8).unwrap();
        let mut player = Player::White;

        for _ in 0..300 {
            let raw = generate_moves(player, &board);
            let moves = legal_moves(player, &board);
            if moves.is_empty() {
                assert!(raw.is_empty());
                break;
            }
            assert_eq!(moves.has_captures(), raw.has_captures());
            if moves.has_captures() {
                assert!(moves.moves().all(|m| m.is_capture()));
            }

            let actor: &mut dyn Actor = match player {
                Player::White => &mut white,
                Player::Black => &mut black,
            };
            let mv = actor.select_action(&board, &moves).unwrap();
            assert!(player.owns(board.get(mv.from)));
            assert!(board.is_empty(mv.to) || mv.to == mv.from);
            if mv.is_capture() {
                for taken in &mv.captures {
                    assert!(player.opponent().owns(board.get(*taken)));
                }
            } else {
                assert_eq!(mv.to.row.abs_diff(mv.from.row), 1);
                assert_eq!(mv.to.col.abs_diff(mv.from.col), 1);
            }

            let before = board.piece_count();
            board = board.apply(player, &mv).unwrap();
            assert_eq!(board.piece_count(), before - mv.captures.len());
            for taken in &mv.captures {
                assert_eq!(board.get(*taken), EMPTY);
            }
            player = player.opponent();
        }
    }
}
