use stretchtv::stretch::{
    ColumnSpec, Columns, GridError, GridOptions, IndexMap, RenderedGrid, StretchEngine,
    StretchyGrid, VisibilityModel,
};

fn abcd() -> Vec<ColumnSpec> {
    ["A", "B", "C", "D"]
        .iter()
        .map(|f| ColumnSpec::new(*f, 10))
        .collect()
}

fn one_stretch_column(width: usize) -> Columns {
    Columns::new(vec![ColumnSpec::new("value", width).stretch(true)])
}

/// Engine that already tracked `content_width` for the single column.
fn engine_tracking(columns: &Columns, content_width: usize) -> StretchEngine {
    let mut engine = StretchEngine::new(1);
    let seed = RenderedGrid::from_widths(&[&[(columns.get(0).unwrap().width, content_width)]]);
    engine.run(columns, &IndexMap::identity(1), &seed);
    assert_eq!(engine.content_widths().as_slice(), &[content_width]);
    engine
}

// ============================================================================
// Index remapping
// ============================================================================

#[test]
fn test_hide_and_show_sequence() {
    let mut grid = StretchyGrid::new(abcd(), GridOptions::default());
    let mut model = VisibilityModel::new();
    let mut step = |field: &str, hidden: bool| {
        model.set(field, hidden);
        grid.on_visibility_changed(&model).unwrap();
        grid.index_map().as_slice().to_vec()
    };

    assert_eq!(step("B", true), vec![Some(0), None, Some(1), Some(2)]);
    assert_eq!(step("D", true), vec![Some(0), None, Some(1), None]);
    assert_eq!(step("B", false), vec![Some(0), Some(1), Some(2), None]);
    assert_eq!(step("D", false), vec![Some(0), Some(1), Some(2), Some(3)]);
}

#[test]
fn test_visible_columns_follow_rendered_order() {
    let mut grid = StretchyGrid::new(abcd(), GridOptions::default());
    let model: VisibilityModel = [("A", true)].into_iter().collect();
    grid.on_visibility_changed(&model).unwrap();

    let fields: Vec<_> = grid
        .visible_columns()
        .map(|(idx, c)| (idx, c.field.as_str()))
        .collect();
    assert_eq!(fields, vec![(1, "B"), (2, "C"), (3, "D")]);
}

#[test]
fn test_stale_visibility_notification_fails() {
    let mut grid = StretchyGrid::new(abcd(), GridOptions::default());
    let model: VisibilityModel = [("C", false)].into_iter().collect();
    assert_eq!(
        grid.on_visibility_changed(&model),
        Err(GridError::NoVisibilityChange)
    );
    // Nothing was queued for a notification that was rejected.
    assert_eq!(grid.pending_passes(), 0);
    assert_eq!(grid.index_map(), &IndexMap::identity(4));
}

// ============================================================================
// Width reconciliation
// ============================================================================

#[test]
fn test_grow_to_cell_footprint() {
    let columns = one_stretch_column(100);
    let mut engine = engine_tracking(&columns, 80);

    let grid = RenderedGrid::from_widths(&[&[(130, 120)], &[(110, 40)]]);
    let update = engine
        .run(&columns, &IndexMap::identity(1), &grid)
        .unwrap();
    assert_eq!(update.columns.get(0).unwrap().width, 130);
    assert_eq!(update.content_widths.as_slice(), &[120]);
}

#[test]
fn test_shrink_keeps_padding() {
    let columns = one_stretch_column(150);
    let mut engine = engine_tracking(&columns, 100);

    let grid = RenderedGrid::from_widths(&[&[(150, 60)]]);
    let update = engine
        .run(&columns, &IndexMap::identity(1), &grid)
        .unwrap();
    assert_eq!(update.columns.get(0).unwrap().width, 110);
    assert_eq!(engine.content_widths().as_slice(), &[60]);
}

#[test]
fn test_unchanged_content_emits_nothing() {
    let columns = one_stretch_column(150);
    let mut engine = engine_tracking(&columns, 100);
    let before = engine.content_widths().clone();

    let grid = RenderedGrid::from_widths(&[&[(170, 100)]]);
    assert_eq!(engine.run(&columns, &IndexMap::identity(1), &grid), None);
    assert_eq!(engine.content_widths(), &before);
}

#[test]
fn test_content_growth_without_cell_growth_keeps_width() {
    let columns = one_stretch_column(100);
    let mut engine = engine_tracking(&columns, 80);

    let grid = RenderedGrid::from_widths(&[&[(100, 90)]]);
    assert_eq!(engine.run(&columns, &IndexMap::identity(1), &grid), None);
    assert_eq!(engine.anomalies(), &[0]);
    assert_eq!(engine.content_widths().as_slice(), &[90]);
}

#[test]
fn test_grid_reports_content_growth_without_cell_growth() {
    let specs = vec![ColumnSpec::new("value", 100).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default());
    grid.on_mount();
    grid.tick(&RenderedGrid::from_widths(&[&[(100, 80)]]));
    assert_eq!(grid.content_widths().as_slice(), &[80]);

    grid.on_sort_changed();
    assert_eq!(grid.tick(&RenderedGrid::from_widths(&[&[(100, 90)]])), None);
    assert_eq!(grid.anomalies(), &[0]);
    assert_eq!(grid.columns().get(0).unwrap().width, 100);
    assert_eq!(grid.content_widths().as_slice(), &[90]);

    // A regular pass clears the report.
    grid.on_sort_changed();
    grid.tick(&RenderedGrid::from_widths(&[&[(100, 90)]]));
    assert!(grid.anomalies().is_empty());
}

#[test]
fn test_measures_at_rendered_position() {
    let specs = vec![
        ColumnSpec::new("A", 10),
        ColumnSpec::new("B", 10).stretch(true),
        ColumnSpec::new("C", 10).stretch(true),
    ];
    let mut grid = StretchyGrid::new(specs, GridOptions::default());
    let model: VisibilityModel = [("B", true)].into_iter().collect();
    grid.on_visibility_changed(&model).unwrap();

    // C is now the second rendered cell.
    let frame = RenderedGrid::from_widths(&[&[(10, 3), (25, 23)]]);
    let update = grid.tick(&frame).unwrap();
    assert_eq!(update.resized, vec![2]);
    let widths: Vec<_> = grid.columns().iter().map(|c| c.width).collect();
    assert_eq!(widths, vec![10, 10, 25]);
    assert_eq!(grid.content_widths().as_slice(), &[0, 0, 23]);
}

// ============================================================================
// Deferral and row polling
// ============================================================================

#[test]
fn test_passes_wait_for_the_next_tick() {
    let specs = vec![ColumnSpec::new("A", 4).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default());
    grid.on_sort_changed();
    assert_eq!(grid.columns().get(0).unwrap().width, 4);
    assert_eq!(grid.pending_passes(), 1);

    grid.tick(&RenderedGrid::from_widths(&[&[(9, 7)]])).unwrap();
    assert_eq!(grid.columns().get(0).unwrap().width, 9);
    assert_eq!(grid.pending_passes(), 0);
}

#[test]
fn test_pass_polls_until_rows_are_rendered() {
    let specs = vec![ColumnSpec::new("A", 4).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default());
    grid.set_row_count(3);
    grid.on_mount();

    for _ in 0..5 {
        assert_eq!(grid.tick(&RenderedGrid::new()), None);
        assert_eq!(grid.pending_passes(), 1);
    }
    assert!(grid.tick(&RenderedGrid::from_widths(&[&[(12, 10)]])).is_some());
    assert_eq!(grid.pending_passes(), 0);
}

#[test]
fn test_declared_empty_source_proceeds_without_rows() {
    let specs = vec![ColumnSpec::new("A", 12).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default());
    grid.on_mount();
    grid.tick(&RenderedGrid::from_widths(&[&[(12, 10)]]));

    // Filtered down to nothing: content shrinks to zero, padding stays.
    grid.set_row_count(0);
    grid.on_filter_changed();
    let update = grid.tick(&RenderedGrid::new()).unwrap();
    assert_eq!(update.columns.get(0).unwrap().width, 2);
    assert_eq!(grid.pending_passes(), 0);
}

#[test]
fn test_poll_limit_drops_pass() {
    let specs = vec![ColumnSpec::new("A", 4).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default().poll_limit(3));
    grid.on_page_changed();

    grid.tick(&RenderedGrid::new());
    grid.tick(&RenderedGrid::new());
    assert_eq!(grid.pending_passes(), 1);
    grid.tick(&RenderedGrid::new());
    assert_eq!(grid.pending_passes(), 0);

    assert_eq!(grid.tick(&RenderedGrid::from_widths(&[&[(12, 10)]])), None);
}

#[test]
fn test_zero_poll_limit_is_raised_to_one() {
    let specs = vec![ColumnSpec::new("A", 4).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default().poll_limit(0));
    assert_eq!(grid.options().poll_limit, 1);

    // Rows already rendered: the pass runs on its first tick.
    grid.on_page_changed();
    assert!(grid.tick(&RenderedGrid::from_widths(&[&[(12, 10)]])).is_some());
}

#[test]
fn test_teardown_cancels_outstanding_passes() {
    let specs = vec![ColumnSpec::new("A", 4).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default());
    grid.on_mount();
    grid.tick(&RenderedGrid::new());
    grid.teardown();
    grid.on_filter_changed();

    assert_eq!(grid.tick(&RenderedGrid::from_widths(&[&[(12, 10)]])), None);
    assert_eq!(grid.pending_passes(), 0);
    assert_eq!(grid.columns().get(0).unwrap().width, 4);
}

#[test]
fn test_later_pass_sees_earlier_results() {
    let specs = vec![ColumnSpec::new("A", 4).stretch(true)];
    let mut grid = StretchyGrid::new(specs, GridOptions::default());
    grid.on_sort_changed();
    grid.on_filter_changed();

    let update = grid.tick(&RenderedGrid::from_widths(&[&[(12, 10)]])).unwrap();
    assert_eq!(update.resized, vec![0]);
    assert_eq!(grid.columns().get(0).unwrap().width, 12);
    assert_eq!(grid.content_widths().as_slice(), &[10]);
}
