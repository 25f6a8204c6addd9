use std::{
    fmt,
    sync::{Arc, Mutex},
    thread,
};

use skirmish_core::{
    to_surface_coords, to_unit_coords, truncate_decimal, CardinalDir, Field, GridError, Pos,
    TeamIndex, UnitId,
};
use skirmish_world::{
    CircularArea, Grid, GridConfig, GridSnapshot, Placement, Resolution, Skill, SyncDiagnostics,
    TerrainSource, UnitArena, UnitKind,
};

fn team(index: usize) -> TeamIndex {
    TeamIndex::new(index).expect("team")
}

/// 6x6 surface map, dry at height 5 with a deep pond on surface cell (4, 4)
/// and a gold mine on surface cell (0, 5).
fn skirmish_source() -> TerrainSource {
    let mut source = TerrainSource::flat("proving grounds", 6, 6, 10.0);
    source.height_factor = 2.0;
    source.water_level = 4.01;
    source.max_players = 2;
    source.start_locations = vec![Pos::new(1, 1), Pos::new(4, 1)];
    for sy in 3..6 {
        for sx in 3..6 {
            source.altitudes[(sy * 6 + sx) as usize] = 2.0;
        }
    }
    source.objects[30] = 11;
    source
}

fn loaded() -> Grid {
    let mut grid = Grid::load(&skirmish_source(), GridConfig::default()).expect("terrain loads");
    grid.init();
    grid
}

#[test]
fn scaling_round_trips_through_unit_coordinates() {
    for y in -20..20 {
        for x in -20..20 {
            let surface = Pos::new(x, y);
            assert_eq!(to_surface_coords(to_unit_coords(surface)), surface);
        }
    }
    assert_eq!(to_surface_coords(Pos::new(-1, 3)), Pos::new(-1, 1));
}

#[test]
fn truncation_is_idempotent_and_close() {
    let mut value = -3.0_f32;
    while value < 3.0 {
        let once = truncate_decimal(value);
        assert_eq!(truncate_decimal(once), once, "{value} is not idempotent");
        assert!((value - once).abs() <= 1.0e-6 + value.abs() * f32::EPSILON);
        value += 0.123_456_7;
    }
}

#[test]
fn diagonal_corner_cutting_is_rejected() {
    let mut grid = loaded();
    let mut units = UnitArena::new();
    let walker = units.spawn(UnitKind::soldier(), team(0), Pos::new(2, 2), CardinalDir::North);
    let wall = units.spawn(UnitKind::structure(1), team(1), Pos::new(3, 2), CardinalDir::North);
    let unit = units.get(wall).expect("wall");
    assert_eq!(grid.put_unit_cells(unit, Pos::new(3, 2), false, false), Ok(Placement::Placed));

    let unit = units.get(walker).expect("walker");
    assert!(grid.is_free_cell(Pos::new(3, 3), Field::Land, &units));
    assert!(grid.is_free_cell(Pos::new(2, 3), Field::Land, &units));
    assert!(
        !grid.can_move(unit, Pos::new(2, 2), Pos::new(3, 3), &units, None),
        "moving past a blocked corner must fail"
    );
}

#[test]
fn fog_tiers_drive_optimistic_planning() {
    let mut grid = loaded();
    let mut units = UnitArena::new();
    let scout = team(0);
    let blocker = units.spawn(UnitKind::structure(1), team(1), Pos::new(4, 0), CardinalDir::North);
    let unit = units.get(blocker).expect("blocker");
    let _ = grid.put_unit_cells(unit, Pos::new(4, 0), false, false).expect("placed");
    let origin = Pos::new(3, 0);
    let pond = Pos::new(9, 9);

    for pos in [Pos::new(4, 0), pond] {
        assert!(
            grid.is_aprox_free_cell_or_might_be_free_soon(origin, pos, Field::Land, scout, &units),
            "unexplored {pos:?} is assumed free"
        );
    }

    grid.reveal_surface_area(scout, Pos::new(2, 0), 0);
    grid.reveal_surface_area(scout, Pos::new(4, 4), 0);
    grid.reset_visibility(scout);
    let shore = Pos::new(4, 0);
    let land_free = |grid: &Grid, pos| {
        grid.is_aprox_free_cell_or_might_be_free_soon(origin, pos, Field::Land, scout, &units)
    };
    assert!(land_free(&grid, shore));
    assert!(!land_free(&grid, pond));

    grid.reveal_surface_area(scout, Pos::new(2, 0), 0);
    assert_eq!(
        land_free(&grid, shore),
        grid.is_free_cell_or_might_be_free_soon(origin, shore, Field::Land, &units),
    );
    assert!(!land_free(&grid, shore));
}

#[test]
fn harvesting_depletes_and_frees_the_mine() {
    let mut grid = loaded();
    let mine = Pos::new(0, 5);
    let units = UnitArena::new();
    assert!(!grid.is_free_cell(to_unit_coords(mine), Field::Land, &units));

    let cell = grid.surface_cell_mut(mine).expect("mine");
    assert!(!cell.dec_amount(499));
    assert!(cell.dec_amount(3), "the last unit exhausts the mine");
    assert_eq!(cell.resource(), None);
    assert!(cell.changed_from_original_load());

    assert!(grid.is_free_cell(to_unit_coords(mine), Field::Land, &units));
}

#[test]
fn circular_area_is_complete_and_restartable() {
    let grid = loaded();
    for radius in 0..6 {
        let mut area = CircularArea::new(&grid, Pos::new(5, 5), radius, Resolution::Fine);
        let first: Vec<Pos> = area.by_ref().collect();
        area.restart();
        let second: Vec<Pos> = area.collect();

        assert_eq!(first, second, "radius {radius} must replay identically");
        let brute = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| Pos::new(x, y)))
            .filter(|pos| Pos::new(5, 5).dist_squared(*pos) <= i64::from(radius * radius))
            .count();
        assert_eq!(first.len(), brute);
    }
}

#[test]
fn moving_unit_blocked_by_other_writes_nothing() {
    let mut grid = loaded();
    let mut units = UnitArena::new();
    let sentry = units.spawn(UnitKind::soldier(), team(1), Pos::new(1, 1), CardinalDir::North);
    let runner = units.spawn(UnitKind::soldier(), team(0), Pos::new(0, 1), CardinalDir::North);
    units.get_mut(runner).expect("runner").set_skill(Skill::Move);

    let unit = units.get(sentry).expect("sentry");
    let _ = grid.put_unit_cells(unit, Pos::new(1, 1), false, false).expect("placed");
    let unit = units.get(runner).expect("runner");
    assert_eq!(
        grid.put_unit_cells(unit, Pos::new(1, 1), false, false),
        Ok(Placement::Blocked {
            pos: Pos::new(1, 1),
            occupant: sentry,
        })
    );
    assert_eq!(grid.cell(Pos::new(1, 1)).expect("cell").occupant(Field::Land), Some(sentry));
}

#[test]
fn snapshot_survives_json_round_trip() {
    let mut grid = loaded();
    let mut units = UnitArena::new();
    let depot = units.spawn(UnitKind::structure(2), team(0), Pos::new(2, 2), CardinalDir::North);
    grid.reveal_surface_area(team(0), Pos::new(1, 1), 2);
    let _ = grid.surface_cell_mut(Pos::new(0, 5)).expect("mine").dec_amount(100);
    grid.prepare_terrain(units.get(depot).expect("depot")).expect("prepare");

    let json = serde_json::to_string(&grid.save_snapshot()).expect("serialize");
    let snapshot: GridSnapshot = serde_json::from_str(&json).expect("deserialize");

    let mut restored = Grid::load(&skirmish_source(), GridConfig::default()).expect("terrain");
    restored.restore_snapshot(&snapshot).expect("restore");

    assert_eq!(restored.save_snapshot(), grid.save_snapshot());
    let mine = restored.surface_cell(Pos::new(0, 5)).expect("mine");
    assert_eq!(mine.resource().map(|resource| resource.amount), Some(400));
    assert!(restored.surface_cell(Pos::new(1, 1)).expect("cell").is_explored(team(0)));
}

#[test]
fn loading_twice_yields_same_checksum() {
    let first = Grid::load(&skirmish_source(), GridConfig::default()).expect("terrain");
    let second = Grid::load(&skirmish_source(), GridConfig::default()).expect("terrain");

    assert_eq!(first.checksum(), second.checksum());
    assert_eq!(first.start_location(1), Ok(Pos::new(8, 2)));
    assert_eq!(
        first.start_location(2),
        Err(GridError::StartLocationOutOfRange {
            index: 2,
            max_players: 2,
        })
    );
}

#[derive(Debug, Default)]
struct Recorder {
    lines: Mutex<Vec<(UnitId, String)>>,
}

#[derive(Debug)]
struct SharedRecorder(Arc<Recorder>);

impl SyncDiagnostics for SharedRecorder {
    fn enabled(&self) -> bool {
        true
    }

    fn record(&self, unit: UnitId, message: fmt::Arguments<'_>) {
        if let Ok(mut lines) = self.0.lines.lock() {
            lines.push((unit, message.to_string()));
        }
    }
}

#[test]
fn diagnostics_never_change_answers() {
    let mut quiet = loaded();
    let mut noisy = loaded();
    let recorder = Arc::new(Recorder::default());
    noisy.set_diagnostics(Box::new(SharedRecorder(Arc::clone(&recorder))));
    let mut units = UnitArena::new();
    let walker = units.spawn(UnitKind::soldier(), team(0), Pos::new(5, 5), CardinalDir::North);
    for grid in [&mut quiet, &mut noisy] {
        grid.reveal_surface_area(team(0), Pos::new(2, 2), 1);
    }
    let unit = units.get(walker).expect("walker");

    for dy in -1..=1 {
        for dx in -1..=1 {
            let to = Pos::new(5 + dx, 5 + dy);
            assert_eq!(
                quiet.aprox_can_move_soon(unit, Pos::new(5, 5), to, &units),
                noisy.aprox_can_move_soon(unit, Pos::new(5, 5), to, &units),
            );
        }
    }

    let lines = recorder.lines.lock().expect("recorder");
    assert!(!lines.is_empty(), "enabled diagnostics must record");
    assert!(lines.iter().all(|(unit, _)| *unit == walker));
}

#[test]
fn worker_threads_query_concurrently() {
    let grid = Arc::new(loaded());
    let units = Arc::new(UnitArena::new());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let grid = Arc::clone(&grid);
            let units = Arc::clone(&units);
            thread::spawn(move || {
                (0..grid.height())
                    .filter(|y| y % 4 == worker)
                    .flat_map(|y| (0..grid.width()).map(move |x| Pos::new(x, y)))
                    .filter(|&pos| grid.is_free_cell(pos, Field::Land, units.as_ref()))
                    .count()
            })
        })
        .collect();
    let free: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .sum();

    let expected = (0..grid.height())
        .flat_map(|y| (0..grid.width()).map(move |x| Pos::new(x, y)))
        .filter(|&pos| grid.is_free_cell(pos, Field::Land, units.as_ref()))
        .count();
    assert_eq!(free, expected);
}

#[test]
fn demo_terrain_loads() {
    let json = include_str!("../../demos/terrain.json");
    let source: TerrainSource = serde_json::from_str(json).expect("demo terrain parses");
    let mut grid = Grid::load(&source, GridConfig::default()).expect("demo terrain loads");
    grid.init();
    let units = UnitArena::new();

    assert_eq!(grid.title(), "Twin Fords");
    assert_eq!((grid.width(), grid.height()), (16, 16));
    assert!(!grid.is_free_cell(Pos::new(6, 6), Field::Land, &units), "the lake is deep");
    assert!(grid.is_free_cell(Pos::new(6, 6), Field::Air, &units), "flyers cross the lake");
    assert!(!grid.is_free_cell(Pos::new(10, 0), Field::Land, &units), "trees block");
    assert!(grid
        .surface_cell(Pos::new(1, 6))
        .expect("mine")
        .resource()
        .is_some());
}

#[test]
fn tracing_diagnostics_run_under_a_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("world_synch=debug")
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let config = GridConfig {
            synch_diagnostics: true,
            ..GridConfig::default()
        };
        let mut traced = Grid::load(&skirmish_source(), config).expect("terrain");
        traced.init();
        let plain = loaded();
        let mut units = UnitArena::new();
        let walker = units.spawn(UnitKind::flyer(), team(1), Pos::new(8, 8), CardinalDir::South);
        let unit = units.get(walker).expect("walker");

        for to in [Pos::new(9, 9), Pos::new(7, 8), Pos::new(8, 12)] {
            assert_eq!(
                traced.aprox_can_move_soon(unit, Pos::new(8, 8), to, &units),
                plain.aprox_can_move_soon(unit, Pos::new(8, 8), to, &units),
                "tracing must not alter the answer for {to:?}"
            );
        }
    });
}
