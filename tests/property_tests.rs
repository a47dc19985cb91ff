//! Property tests for board generation, gravity and the turn loop.

use proptest::prelude::*;

use tile_match::{Color, Coord, GameConfig, GameEngine, Grid, HeadlessPort, TouchOutcome};

fn engine(seed: u64, rows: usize, cols: usize, palette: usize) -> GameEngine<HeadlessPort> {
    let config = GameConfig::default()
        .with_board(rows, cols)
        .with_palette_size(palette)
        .with_session(10_000, 1_000_000)
        .with_seed(seed);
    let mut engine = GameEngine::new(config, HeadlessPort::new()).unwrap();
    engine.start();
    engine
}

/// A grid with some cells left empty; `None` entries are holes.
fn arb_grid() -> impl Strategy<Value = Grid> {
    (1usize..9, 1usize..9).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::option::of(0u8..6), rows * cols).prop_map(move |colors| {
            let mut grid = Grid::new(rows, cols);
            for (i, color) in colors.into_iter().enumerate() {
                if let Some(color) = color {
                    grid.spawn(Coord::new(i / cols, i % cols), Color(color));
                }
            }
            grid
        })
    })
}

fn arb_coord() -> impl Strategy<Value = Coord> {
    (0usize..8, 0usize..8).prop_map(|(r, c)| Coord::new(r, c))
}

proptest! {
    #[test]
    fn prop_generated_board_is_full_and_match_free(
        seed in any::<u64>(),
        rows in 3usize..10,
        cols in 3usize..10,
        palette in 3usize..8,
    ) {
        let engine = engine(seed, rows, cols, palette);
        prop_assert!(engine.grid().is_full());
        prop_assert!(!engine.detector().has_match(engine.grid()));
        prop_assert!(engine.grid().tiles().all(|t| t.color().index() < palette));
    }

    #[test]
    fn prop_collapse_compacts_and_keeps_tiles(mut grid in arb_grid()) {
        let before = grid.tile_count();
        let falls = grid.collapse();

        prop_assert!(grid.is_compacted());
        prop_assert_eq!(grid.tile_count(), before);
        for fall in &falls {
            prop_assert_eq!(fall.from.col, fall.to.col);
            prop_assert!(fall.from.row < fall.to.row);
            prop_assert_eq!(grid.tile(fall.tile).and_then(|t| t.cell()), Some(fall.to));
        }

        // A compacted grid does not move again.
        prop_assert!(grid.collapse().is_empty());
    }

    #[test]
    fn prop_turns_terminate_with_monotonic_score(
        seed in any::<u64>(),
        swaps in prop::collection::vec((arb_coord(), 0usize..8), 1..12),
    ) {
        let mut engine = engine(seed, 8, 8, 6);
        let mut last_score = 0;

        for (a, direction) in swaps {
            let (dr, dc) = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)][direction];
            let Some(b) = a.offset(dr, dc).filter(|b| engine.grid().contains(*b)) else {
                continue;
            };

            prop_assert_eq!(engine.request_swap(a, b), TouchOutcome::SwapStarted);
            engine.pump();

            prop_assert!(engine.is_idle());
            prop_assert!(engine.grid().is_full());
            prop_assert!(!engine.detector().has_match(engine.grid()));
            prop_assert!(engine.stats().longest_cascade < 100);

            let score = engine.session().score();
            prop_assert!(score >= last_score);
            prop_assert_eq!(score % 10, 0);
            last_score = score;
        }
    }

    #[test]
    fn prop_distant_swap_changes_nothing(
        seed in any::<u64>(),
        a in arb_coord(),
        b in arb_coord(),
    ) {
        prop_assume!(!a.is_adjacent(b));
        let mut engine = engine(seed, 8, 8, 6);
        let before = engine.grid().layout();

        prop_assert_eq!(engine.request_swap(a, b), TouchOutcome::Rejected);
        prop_assert_eq!(engine.grid().layout(), before);
        prop_assert!(engine.is_idle());
        prop_assert_eq!(engine.session().score(), 0);
    }

    #[test]
    fn prop_same_seed_replays(seed in any::<u64>(), a in arb_coord(), direction in 0usize..8) {
        let (dr, dc) = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)][direction];
        prop_assume!(a.offset(dr, dc).map_or(false, |b| b.row < 8 && b.col < 8));
        let b = a.offset(dr, dc).unwrap();

        let mut first = engine(seed, 8, 8, 6);
        let mut second = engine(seed, 8, 8, 6);
        first.request_swap(a, b);
        second.request_swap(a, b);
        first.pump();
        second.pump();

        prop_assert_eq!(first.grid().snapshot(), second.grid().snapshot());
        prop_assert_eq!(first.session().score(), second.session().score());
        prop_assert_eq!(first.rng_state(), second.rng_state());
    }
}
