//! Combination detection integration tests.
//!
//! These tests exercise the detector with the default triples and with
//! custom offset patterns loaded from configuration.

use tile_match::{
    matched_tile_count, BoardSnapshot, Color, CombinationDetector, CombinationRule, Coord,
    GameConfig, Grid, Offset,
};

fn grid_from(rows: &[&str]) -> Grid {
    let mut grid = Grid::new(rows.len(), rows[0].len());
    for (r, line) in rows.iter().enumerate() {
        for (c, ch) in line.chars().enumerate() {
            if let Some(d) = ch.to_digit(10) {
                grid.spawn(Coord::new(r, c), Color(d as u8));
            }
        }
    }
    grid
}

fn default_detector() -> CombinationDetector {
    CombinationDetector::new(GameConfig::default().rules)
}

// =============================================================================
// Default Rule Tests
// =============================================================================

/// Test that a row and a column meeting at a corner form one group.
#[test]
fn test_l_shape_is_one_group() {
    let grid = grid_from(&[
        "3401", //
        "3012", //
        "3335", //
    ]);
    let groups = default_detector().find_matches(&grid);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].color(), Color(3));
    assert_eq!(groups[0].len(), 5);
    assert_eq!(matched_tile_count(&groups), 5);
}

/// Test that separate matches stay separate groups, in scan order.
#[test]
fn test_disjoint_groups_in_scan_order() {
    let grid = grid_from(&[
        "1110", //
        "0202", //
        "5444", //
    ]);
    let groups = default_detector().find_matches(&grid);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].color(), Color(1));
    assert_eq!(groups[1].color(), Color(4));
    assert!(groups[1].contains(Coord::new(2, 3)));
    assert!(!groups[1].contains(Coord::new(2, 0)));
}

/// Test that every group's tiles are the tiles on its cells.
#[test]
fn test_group_tiles_follow_cells() {
    let grid = grid_from(&["222", "010"]);
    let groups = default_detector().find_matches(&grid);

    let tiles: Vec<_> = groups[0].cells().iter().map(|&c| grid.tile_id_at(c).unwrap()).collect();
    assert_eq!(groups[0].tiles(), tiles.as_slice());
}

/// Test that empty cells never take part in a match.
#[test]
fn test_empty_cells_break_runs() {
    let grid = grid_from(&["1.11", "2.22"]);
    assert!(!default_detector().has_match(&grid));
}

// =============================================================================
// Custom Rule Tests
// =============================================================================

/// Test a square rule loaded from JSON configuration.
#[test]
fn test_square_rule_from_config() {
    let config: GameConfig =
        serde_json::from_str(r#"{"rules": [[{"row": 0, "col": 1}, {"row": 1, "col": 0}, {"row": 1, "col": 1}]]}"#)
            .unwrap();
    assert!(config.validate().is_ok());
    let detector = CombinationDetector::new(config.rules);

    let grid = grid_from(&[
        "0110", //
        "2112", //
        "0303", //
    ]);
    let groups = detector.find_matches(&grid);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].cells(),
        &[Coord::new(0, 1), Coord::new(0, 2), Coord::new(1, 1), Coord::new(1, 2)]
    );
}

/// Test that patterns may reach left of the anchor.
#[test]
fn test_rule_with_negative_offsets() {
    let diagonal: CombinationRule = [(1, -1), (2, -2)].into_iter().collect();
    let detector = CombinationDetector::new(vec![diagonal]);

    let grid = grid_from(&[
        "005", //
        "050", //
        "500", //
    ]);
    let groups = detector.find_matches(&grid);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].cells()[0], Coord::new(0, 2));
    assert_eq!(groups[0].len(), 3);
}

/// Test that longer runs need a longer rule.
#[test]
fn test_five_in_a_row_rule() {
    let detector = CombinationDetector::new(vec![CombinationRule::horizontal(5)]);

    assert!(!detector.has_match(&grid_from(&["11112"])));
    assert!(detector.has_match(&grid_from(&["111112"])));
    assert_eq!(CombinationRule::horizontal(5).offsets()[3], Offset::new(0, 4));
}

// =============================================================================
// Possible Swap Tests
// =============================================================================

/// Test that the search finds a diagonal swap.
#[test]
fn test_possible_swap_diagonal() {
    let grid = grid_from(&[
        "2034", //
        "1145", //
        "1450", //
    ]);
    let detector = default_detector();
    assert!(!detector.has_match(&grid));

    let (a, b) = detector.find_possible_swap(&grid).unwrap();
    assert_eq!((a, b), (Coord::new(0, 0), Coord::new(1, 1)));

    let mut swapped = grid.clone();
    swapped.swap(a, b);
    assert!(detector.has_match(&swapped));
}

/// Test that a board without three of any color has no move.
#[test]
fn test_possible_swap_none() {
    let mut grid = Grid::new(3, 3);
    grid.load(&BoardSnapshot::from_rows(&[[0u8, 1, 2], [3, 4, 5], [0, 1, 2]]));
    assert_eq!(default_detector().find_possible_swap(&grid), None);
}
