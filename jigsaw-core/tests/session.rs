use jigsaw_core::session::TRAY_TILT_MAX_DEG;
use jigsaw_core::{
    DEFAULT_GRID, Feedback, Grid, Location, Progress, Session, SessionError, Tiling, Transition,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn session(seed: u64) -> Session {
    Session::new(DEFAULT_GRID, &mut StdRng::seed_from_u64(seed))
}

fn progress(s: &Session) -> (usize, usize) {
    let Progress { placed, total } = s.progress();
    (placed, total)
}

#[test]
fn place_then_retrieve_round_trip() {
    let mut s = session(1);
    assert_eq!(s.select_piece(5), Transition::Selected { id: 5 });
    assert_eq!(s.attempt_place(5), Transition::Placed { id: 5, slot: 5 });
    assert_eq!(progress(&s), (1, 12));
    assert_eq!(s.selected(), None);

    // nothing selected any more
    assert_eq!(s.attempt_place(5), Transition::Ignored);
    assert_eq!(progress(&s), (1, 12));

    let t = s.select_piece(5);
    assert_eq!(t, Transition::Retrieved { id: 5, slot: 5 });
    assert_eq!(t.feedback(), &[Feedback::Pick]);
    assert_eq!(progress(&s), (0, 12));
    assert_eq!(s.selected(), Some(5));
    assert_eq!(s.location(5), Some(Location::Tray));
    assert_eq!(s.occupant(5), None);
}

#[test]
fn wrong_slot_raises_mismatch_and_keeps_selection() {
    let mut s = session(2);
    s.select_piece(2);
    let t = s.attempt_place(7);
    let Transition::Mismatch { id, mismatch } = t else {
        panic!("expected mismatch, got {t:?}");
    };
    assert_eq!(id, 2);
    assert_eq!(mismatch.slot, 7);
    assert_eq!(t.feedback(), &[Feedback::Error]);
    assert_eq!(s.mismatch(), Some(mismatch));
    assert_eq!(s.selected(), Some(2));
    assert_eq!(s.location(2), Some(Location::Tray));
    assert_eq!(progress(&s), (0, 12));
    assert_eq!(s.moves(), 1);
}

#[test]
fn no_slot_but_its_own_accepts_a_piece() {
    let mut s = session(3);
    for id in 0..12 {
        s.select_piece(id);
        for slot in (0..12).filter(|&slot| slot != id) {
            assert!(matches!(s.attempt_place(slot), Transition::Mismatch { .. }));
            assert_eq!(s.location(id), Some(Location::Tray));
            assert_eq!(s.occupant(slot), None);
        }
        // deselect again so the next id starts clean
        assert_eq!(s.select_piece(id), Transition::Deselected { id });
    }
    assert_eq!(progress(&s), (0, 12));
}

#[test]
fn placing_into_an_occupied_slot_is_ignored() {
    let mut s = session(4);
    s.select_piece(0);
    s.attempt_place(0);
    s.select_piece(1);
    let moves = s.moves();
    assert_eq!(s.attempt_place(0), Transition::Ignored);
    assert_eq!(s.moves(), moves);
    assert_eq!(s.selected(), Some(1));
    assert_eq!(s.occupant(0), Some(0));
    assert_eq!(s.mismatch(), None);
}

#[test]
fn out_of_range_actions_are_ignored() {
    let mut s = session(5);
    assert_eq!(s.select_piece(12), Transition::Ignored);
    s.select_piece(3);
    assert_eq!(s.attempt_place(12), Transition::Ignored);
    assert_eq!(s.selected(), Some(3));
}

#[test]
fn selecting_another_tray_piece_replaces_selection() {
    let mut s = session(6);
    assert_eq!(s.select_piece(1), Transition::Selected { id: 1 });
    assert_eq!(s.select_piece(4), Transition::Selected { id: 4 });
    assert_eq!(s.selected(), Some(4));
    let t = s.select_piece(4);
    assert_eq!(t, Transition::Deselected { id: 4 });
    assert!(t.feedback().is_empty());
    assert_eq!(s.selected(), None);
}

#[test]
fn retrieving_a_placed_piece_overrides_any_selection() {
    let mut s = session(7);
    s.select_piece(8);
    s.attempt_place(8);
    s.select_piece(3);
    assert_eq!(s.select_piece(8), Transition::Retrieved { id: 8, slot: 8 });
    assert_eq!(s.selected(), Some(8));
    assert_eq!(s.location(3), Some(Location::Tray));
}

#[test]
fn win_fires_on_the_last_piece_only() {
    let mut s = session(8);
    for id in 0..11 {
        s.select_piece(id);
        assert_eq!(s.attempt_place(id), Transition::Placed { id, slot: id });
        assert!(!s.is_won());
    }
    s.select_piece(11);
    let t = s.attempt_place(11);
    assert_eq!(t, Transition::Won { id: 11, slot: 11 });
    assert_eq!(t.feedback(), &[Feedback::Success, Feedback::Win]);
    assert!(s.is_won());
    assert!(s.progress().is_complete());
    assert_eq!(s.tray_ids().count(), 0);

    // the board is frozen once won
    assert_eq!(s.select_piece(4), Transition::Ignored);
    assert_eq!(s.location(4), Some(Location::Placed(4)));
    assert_eq!(s.attempt_place(4), Transition::Ignored);
}

#[test]
fn stale_mismatch_clear_leaves_newer_marker() {
    let mut s = session(9);
    s.select_piece(0);
    let Transition::Mismatch { mismatch: first, .. } = s.attempt_place(7) else {
        panic!("expected mismatch");
    };
    let Transition::Mismatch { mismatch: second, .. } = s.attempt_place(7) else {
        panic!("expected mismatch");
    };
    assert!(second.token > first.token);
    assert!(!s.clear_mismatch(first.token));
    assert_eq!(s.mismatch(), Some(second));
    assert!(s.clear_mismatch(second.token));
    assert_eq!(s.mismatch(), None);
    assert!(!s.clear_mismatch(second.token));
}

#[test]
fn successful_placement_clears_pending_mismatch() {
    let mut s = session(10);
    s.select_piece(6);
    let Transition::Mismatch { mismatch, .. } = s.attempt_place(2) else {
        panic!("expected mismatch");
    };
    s.attempt_place(6);
    assert_eq!(s.mismatch(), None);
    assert!(!s.clear_mismatch(mismatch.token));
}

#[test]
fn tray_order_is_fixed_for_the_session() {
    let mut s = session(11);
    let initial: Vec<usize> = s.tray_ids().collect();
    assert_eq!(initial, s.tray_ids().collect::<Vec<_>>());
    let mut sorted = initial.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..12).collect::<Vec<_>>());

    for id in [initial[3], initial[0], initial[7]] {
        s.select_piece(id);
        s.attempt_place(id);
    }
    let remaining: Vec<usize> = s.tray_ids().collect();
    let expected: Vec<usize> = initial
        .iter()
        .copied()
        .filter(|id| remaining.contains(id))
        .collect();
    assert_eq!(remaining, expected);
    assert_eq!(remaining.len(), 9);
    let shapes: Vec<usize> = s.tray().map(|p| p.id).collect();
    assert_eq!(shapes, remaining);
}

#[test]
fn tray_tilt_is_bounded_and_frozen() {
    let s = session(12);
    for id in 0..12 {
        let tilt = s.tray_tilt(id).unwrap();
        assert!(tilt.abs() <= TRAY_TILT_MAX_DEG);
    }
    assert_eq!(s.tray_tilt(12), None);
}

#[test]
fn explicit_tray_order_is_validated() {
    let grid = Grid::new(2, 2).unwrap();
    let tiling = || Tiling::generate(grid, &mut StdRng::seed_from_u64(0));
    let s = Session::with_tray_order(tiling(), vec![3, 1, 0, 2]).unwrap();
    assert_eq!(s.tray_ids().collect::<Vec<_>>(), vec![3, 1, 0, 2]);
    assert_eq!(s.tray_tilt(0), Some(0.0));

    assert_eq!(
        Session::with_tray_order(tiling(), vec![0, 1]).unwrap_err(),
        SessionError::TrayLength { expected: 4, got: 2 }
    );
    assert_eq!(
        Session::with_tray_order(tiling(), vec![0, 1, 1, 2]).unwrap_err(),
        SessionError::TrayNotPermutation(1)
    );
    assert_eq!(
        Session::with_tray_order(tiling(), vec![0, 1, 2, 9]).unwrap_err(),
        SessionError::TrayNotPermutation(9)
    );
}

#[test]
fn geometry_is_frozen_while_playing() {
    let mut s = session(13);
    let before = s.pieces().to_vec();
    for id in 0..6 {
        s.select_piece(id);
        s.attempt_place(id);
        s.select_piece(id);
    }
    assert_eq!(s.pieces(), before.as_slice());
}
