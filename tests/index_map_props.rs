//! Properties of the logical -> rendered column mapping.

use proptest::prelude::*;
use stretchtv::stretch::{
    ColumnSpec, Columns, GridOptions, IndexMap, RenderedGrid, StretchyGrid, VisibilityModel,
};

/// Flips column visibility for every generated index, in order.
fn replay(len: usize, flips: &[usize]) -> IndexMap {
    flips.iter().fold(IndexMap::identity(len), |map, &i| {
        let col_idx = i % len;
        if map.is_hidden(col_idx) {
            map.show(col_idx).unwrap()
        } else {
            map.hide(col_idx).unwrap()
        }
    })
}

fn assert_dense(map: &IndexMap) {
    let present: Vec<usize> = map.as_slice().iter().flatten().copied().collect();
    let expected: Vec<usize> = (0..map.visible_count()).collect();
    assert_eq!(present, expected);
}

proptest! {
    #[test]
    fn prop_visible_positions_stay_dense(
        len in 1usize..12,
        flips in prop::collection::vec(0usize..64, 0..40),
    ) {
        let map = replay(len, &flips);
        assert_dense(&map);
        prop_assert_eq!(map.len(), len);
    }

    #[test]
    fn prop_hide_then_show_round_trips(
        len in 1usize..12,
        flips in prop::collection::vec(0usize..64, 0..40),
        pick in 0usize..64,
    ) {
        let map = replay(len, &flips);
        let visible: Vec<usize> = map.visible().collect();
        prop_assume!(!visible.is_empty());
        let col_idx = visible[pick % visible.len()];

        let hidden = map.hide(col_idx).unwrap();
        assert_dense(&hidden);
        prop_assert_eq!(hidden.show(col_idx).unwrap(), map);
    }

    #[test]
    fn prop_notifications_match_direct_transitions(
        flips in prop::collection::vec(0usize..6, 1..30),
    ) {
        let fields = ["a", "b", "c", "d", "e", "f"];
        let columns = Columns::new(fields.iter().map(|f| ColumnSpec::new(*f, 8)).collect());
        let mut grid = StretchyGrid::new(columns.specs().to_vec(), GridOptions::default());
        let mut model = VisibilityModel::new();

        for &i in &flips {
            let hidden = !model.is_hidden(fields[i]);
            model.set(fields[i], hidden);
            grid.on_visibility_changed(&model).unwrap();
        }
        prop_assert_eq!(grid.index_map(), &replay(fields.len(), &flips));
    }

    #[test]
    fn prop_repeated_pass_is_idempotent(
        cells in prop::collection::vec((0usize..80, 0usize..80), 1..6),
    ) {
        let specs = vec![ColumnSpec::new("a", 10).stretch(true), ColumnSpec::new("b", 10).stretch(true)];
        let mut grid = StretchyGrid::new(specs, GridOptions::default());
        let rows: Vec<Vec<(usize, usize)>> = cells.iter().map(|&c| vec![c, c]).collect();
        let rows: Vec<&[(usize, usize)]> = rows.iter().map(|r| r.as_slice()).collect();
        let frame = RenderedGrid::from_widths(&rows);

        grid.on_sort_changed();
        grid.tick(&frame);
        let columns = grid.columns().clone();
        let content_widths = grid.content_widths().clone();

        grid.on_sort_changed();
        prop_assert_eq!(grid.tick(&frame), None);
        prop_assert_eq!(grid.columns(), &columns);
        prop_assert_eq!(grid.content_widths(), &content_widths);
    }
}
