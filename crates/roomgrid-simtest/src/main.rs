//! RoomGrid Headless Harness
//!
//! Validates merge, region and placement logic plus layout persistence
//! without an editor. Runs entirely in-process: no engine, no rendering.
//!
//! Usage:
//!   cargo run -p roomgrid-simtest
//!   cargo run -p roomgrid-simtest -- --verbose
//!   cargo run -p roomgrid-simtest -- --catalog my_catalog.json --layout room.json --json

use std::fs::File;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use roomgrid_core::persistence::{self, LayoutFile, SaveError};
use roomgrid_core::session::{EditSession, SessionError};
use roomgrid_logic::catalog::{Bounds, Catalog, CatalogEntry, ContentKind};
use roomgrid_logic::cell::{Cell, CellCoord, CellRect, ContentId};
use roomgrid_logic::config::{validate_config, PlacementConfig};
use roomgrid_logic::constants::CELL_COUNT;
use roomgrid_logic::coords;
use roomgrid_logic::layout::{RoomLayout, SegmentKind, SegmentRef};
use roomgrid_logic::merge::{merge, MergeOutcome};
use roomgrid_logic::placement::{generate, PlacementCommand, PlacementPlan, SkipReason};
use roomgrid_logic::region::{self, root_of};
use roomgrid_logic::segment::SegmentGrid;
use roomgrid_logic::validation::{validate_all, Severity};

// ── Default catalog (used when no --catalog is given) ───────────────────
const DEFAULT_CATALOG_JSON: &str = include_str!("../../../data/default_catalog.json");

const EPS: f32 = 1e-4;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    catalog: Option<String>,
    layout: Option<String>,
}

impl Options {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };
        Self {
            verbose: args.iter().any(|a| a == "--verbose"),
            json: args.iter().any(|a| a == "--json"),
            catalog: value("--catalog"),
            layout: value("--layout"),
        }
    }
}

fn main() {
    let options = Options::from_args();
    let filter = if options.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    println!("=== RoomGrid Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog
    let catalog = match load_catalog(options.catalog.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ catalog_parse: {}", e);
            std::process::exit(1);
        }
    };
    results.extend(validate_catalog(&catalog, options.verbose));

    // 2. Merge scenarios
    results.extend(validate_merge_logic(options.verbose));

    // 3. Randomized merge sweep
    results.extend(validate_merge_sweep(options.verbose));

    // 4. Placement geometry
    results.extend(validate_placement_geometry(options.verbose));

    // 5. Randomized rooms against the catalog
    results.extend(validate_room_sweep(&catalog, options.verbose));

    // 6. Persistence
    results.extend(validate_persistence(&catalog, options.verbose));

    // 7. Edit session
    results.extend(validate_session(&catalog, options.verbose));

    // 8. User layout
    let plan = match options.layout.as_deref() {
        Some(path) => {
            let (layout_results, plan) = validate_user_layout(path, &catalog, options.verbose);
            results.extend(layout_results);
            plan
        }
        None => random_room(0, &catalog)
            .ok()
            .map(|layout| generate(&layout, &catalog, &PlacementConfig::default())),
    };

    if options.json {
        if let Some(plan) = &plan {
            match serde_json::to_string_pretty(plan) {
                Ok(text) => println!("{}", text),
                Err(e) => println!("  ✗ plan serialization failed: {}", e),
            }
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn load_catalog(path: Option<&str>) -> Result<Catalog, String> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("{}: {}", path, e))?;
            persistence::load_catalog(file).map_err(|e| format!("{}: {}", path, e))
        }
        None => serde_json::from_str(DEFAULT_CATALOG_JSON).map_err(|e| e.to_string()),
    }
}

fn unit_catalog() -> Catalog {
    let unit = Bounds::new(Vec3::ZERO, Vec3::ONE);
    let mut catalog = Catalog::default();
    for i in 0..4 {
        catalog.push(ContentKind::Floor, CatalogEntry::new(format!("floor_{i}"), unit));
        catalog.push(ContentKind::Wall, CatalogEntry::new(format!("wall_{i}"), unit));
    }
    catalog.push(
        ContentKind::Door,
        CatalogEntry::new(
            "door",
            Bounds::from_min_max(Vec3::new(-0.5, 0.0, -0.05), Vec3::new(0.5, 2.0, 0.05)),
        ),
    );
    catalog
}

fn random_rect(rng: &mut StdRng) -> CellRect {
    let x = rng.gen_range(0..4);
    let y = rng.gen_range(0..4);
    let width = rng.gen_range(1..=4 - x);
    let height = rng.gen_range(1..=4 - y);
    CellRect::new(x, y, width, height)
}

/// Build a room of random size with random fills, merges and doors, using
/// only ids the catalog knows.
fn random_room(seed: u64, catalog: &Catalog) -> Result<RoomLayout, String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let width = rng.gen_range(1..=4);
    let height = rng.gen_range(1..=4);
    let tile = Vec3::new(
        rng.gen_range(2.0..6.0),
        rng.gen_range(2.5..4.0),
        rng.gen_range(2.0..6.0),
    );
    let mut layout = RoomLayout::new(width, height, tile);

    let refs: Vec<SegmentRef> = layout.segments().map(|(at, _)| at).collect();
    for at in refs {
        let count = catalog.entries(at.kind.content_kind()).len();
        if count == 0 || rng.gen_bool(0.3) {
            continue;
        }
        let grid = layout.get_mut(at).map_err(|e| e.to_string())?;
        if rng.gen_bool(0.4) {
            grid.fill_all(Some(rng.gen_range(0..count) as ContentId));
        } else {
            for _ in 0..rng.gen_range(1..4) {
                let outcome = merge(grid, random_rect(&mut rng)).map_err(|e| e.to_string())?;
                if let MergeOutcome::Merged { root } = outcome {
                    grid.paint(root, rng.gen_range(0..count) as ContentId)
                        .map_err(|e| e.to_string())?;
                }
            }
        }
        if at.kind.is_wall() && !catalog.doors.is_empty() && rng.gen_bool(0.2) {
            let door = rng.gen_range(0..catalog.doors.len()) as ContentId;
            grid.set_door(door, random_rect(&mut rng))
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(layout)
}

/// Expected world footprint of a command, from its cell rect and segment kind.
fn expected_footprint(layout: &RoomLayout, cmd: &PlacementCommand) -> Vec2 {
    let cell = coords::cell_size(layout.tile_size());
    let per_cell = match cmd.anchor.segment.kind {
        SegmentKind::Floor => Vec2::new(cell.x, cell.z),
        SegmentKind::VerticalWall => Vec2::new(cell.z, cell.y),
        SegmentKind::HorizontalWall => Vec2::new(cell.x, cell.y),
    };
    per_cell * Vec2::new(cmd.cells.width as f32, cmd.cells.height as f32)
}

/// Number of commands the layout should produce: one per painted group,
/// plus one per wall door.
fn expected_command_count(layout: &RoomLayout) -> usize {
    layout
        .segments()
        .filter(|(_, grid)| grid.is_active())
        .map(|(at, grid)| {
            let regions = region::groups(grid)
                .iter()
                .filter(|g| g.content.content().is_some())
                .count();
            let door = usize::from(at.kind.is_wall() && grid.door().is_some());
            regions + door
        })
        .sum()
}

/// Structural problems in one grid, as a message, or `None` if sound.
fn grid_problem(grid: &SegmentGrid) -> Option<String> {
    if let Err(e) = SegmentGrid::try_from(grid.to_raw()) {
        return Some(format!("raw decode failed: {}", e));
    }
    for i in 0..CELL_COUNT {
        let root = root_of(grid, i);
        if root_of(grid, root) != root {
            return Some(format!("root_of not idempotent at cell {}", i));
        }
    }
    let groups = region::groups(grid);
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if total != CELL_COUNT {
        return Some(format!("groups cover {} cells", total));
    }
    for g in &groups {
        if !g.is_rectangular() {
            return Some(format!("group at {} is not rectangular", g.root));
        }
        if g.root != CellCoord::new(g.bounds.min_col, g.bounds.min_row).index() {
            return Some(format!("group at {} is not rooted top-left", g.root));
        }
    }
    None
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();

    for kind in [ContentKind::Floor, ContentKind::Wall, ContentKind::Door] {
        let entries = catalog.entries(kind);
        results.push(TestResult {
            name: format!("catalog_{:?}_not_empty", kind).to_lowercase(),
            passed: !entries.is_empty(),
            detail: format!("{} {:?} templates", entries.len(), kind),
        });
    }

    let unmeasured: Vec<&str> = [ContentKind::Floor, ContentKind::Wall, ContentKind::Door]
        .iter()
        .flat_map(|&k| catalog.entries(k))
        .filter(|e| e.bounds.is_none())
        .map(|e| e.template.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_bounds_present".into(),
        passed: unmeasured.is_empty(),
        detail: if unmeasured.is_empty() {
            "all templates have bounds".into()
        } else {
            format!("no bounds: {}", unmeasured.join(", "))
        },
    });

    let bad_scale = catalog
        .doors
        .iter()
        .filter(|e| !(e.native_scale.is_finite() && e.native_scale.min_element() > 0.0))
        .count();
    results.push(TestResult {
        name: "catalog_door_scale_positive".into(),
        passed: bad_scale == 0,
        detail: format!("{} doors with non-positive native scale", bad_scale),
    });

    if verbose {
        for kind in [ContentKind::Floor, ContentKind::Wall, ContentKind::Door] {
            for (id, e) in catalog.entries(kind).iter().enumerate() {
                println!("    {:?} {:>3}: {}", kind, id, e.template);
            }
        }
    }

    results
}

// ── 2. Merge Logic ──────────────────────────────────────────────────────

fn validate_merge_logic(_verbose: bool) -> Vec<TestResult> {
    println!("--- Merge Logic ---");
    let mut results = Vec::new();

    // 2×2 merge on an empty grid
    let mut grid = SegmentGrid::new();
    let outcome = merge(&mut grid, CellRect::new(0, 0, 2, 2));
    let raw = grid.to_raw().cells;
    let expected: [i32; CELL_COUNT] = [
        -1, -2, -1, -1, -2, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    ];
    results.push(TestResult {
        name: "merge_2x2_scenario".into(),
        passed: outcome == Ok(MergeOutcome::Merged { root: 0 }) && raw == expected,
        detail: format!("raw cells {:?}", raw),
    });

    // same selection again unmerges
    let outcome = merge(&mut grid, CellRect::new(0, 0, 2, 2));
    results.push(TestResult {
        name: "merge_unmerge_roundtrip".into(),
        passed: outcome == Ok(MergeOutcome::Unmerged { released: 4 })
            && grid.cells().iter().all(|c| *c == Cell::Empty),
        detail: format!("{:?}", outcome),
    });

    // partial overlap destroys the whole prior group
    let mut grid = SegmentGrid::new();
    let mut ok = merge(&mut grid, CellRect::new(0, 0, 2, 2)).is_ok();
    ok &= grid.paint(0, 1).is_ok();
    ok &= merge(&mut grid, CellRect::new(1, 1, 2, 1)).is_ok();
    let cleared = [0, 1, 4].iter().all(|&i| grid.cell(i) == Some(Cell::Empty));
    let regrouped = grid.cell(6) == Some(Cell::MemberOf(5));
    results.push(TestResult {
        name: "merge_partial_overlap".into(),
        passed: ok && cleared && regrouped,
        detail: format!("old group cleared: {}, new group formed: {}", cleared, regrouped),
    });

    // fill_all activity
    let active = SegmentGrid::filled(Some(0)).is_active();
    let inactive = !SegmentGrid::filled(None).is_active();
    results.push(TestResult {
        name: "fill_all_activity".into(),
        passed: active && inactive,
        detail: format!("filled active: {}, cleared inactive: {}", active, inactive),
    });

    // out-of-grid selection is rejected, grid untouched
    let mut grid = SegmentGrid::filled(Some(2));
    let rejected = merge(&mut grid, CellRect::new(3, 0, 2, 1)).is_err();
    results.push(TestResult {
        name: "merge_rejects_out_of_grid".into(),
        passed: rejected && grid == SegmentGrid::filled(Some(2)),
        detail: "selection (3, 0, 2×1) rejected".into(),
    });

    results
}

// ── 3. Merge Sweep ──────────────────────────────────────────────────────

fn validate_merge_sweep(verbose: bool) -> Vec<TestResult> {
    println!("--- Merge Sweep ---");
    let mut results = Vec::new();

    let seeds = 500u64;
    let steps = 50;
    let mut failures = Vec::new();
    let mut max_groups = 0;
    let mut min_groups = CELL_COUNT;

    for seed in 0..seeds {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = SegmentGrid::new();
        for step in 0..steps {
            let result = match rng.gen_range(0..4) {
                0 | 1 => merge(&mut grid, random_rect(&mut rng)).map(|_| ()),
                2 => grid.paint(rng.gen_range(0..CELL_COUNT), rng.gen_range(0..8)),
                _ => grid.erase(rng.gen_range(0..CELL_COUNT)),
            };
            let problem = match result {
                Err(e) => Some(e.to_string()),
                Ok(()) => grid_problem(&grid),
            };
            if let Some(p) = problem {
                failures.push(format!("seed {} step {}: {}", seed, step, p));
                break;
            }
        }
        let n = region::groups(&grid).len();
        max_groups = max_groups.max(n);
        min_groups = min_groups.min(n);
    }

    results.push(TestResult {
        name: "merge_sweep_invariants".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} seeds × {} edits, no violations", seeds, steps)
        } else {
            format!("{} failures, first: {}", failures.len(), failures[0])
        },
    });

    if verbose {
        println!(
            "    Final group counts ranged {}..={} over {} seeds",
            min_groups, max_groups, seeds
        );
    }

    results
}

// ── 4. Placement Geometry ───────────────────────────────────────────────

fn validate_placement_geometry(_verbose: bool) -> Vec<TestResult> {
    println!("--- Placement Geometry ---");
    let mut results = Vec::new();
    let catalog = unit_catalog();
    let config = PlacementConfig::default();

    // merged floor group on a 20-unit tile
    let mut layout = RoomLayout::new(1, 1, Vec3::splat(20.0));
    let mut ok = false;
    if let Ok(grid) = layout.get_mut(SegmentRef::floor(0, 0)) {
        ok = merge(grid, CellRect::new(0, 0, 2, 2)).is_ok();
        ok &= grid.paint(0, 3).is_ok();
    }
    let plan = generate(&layout, &catalog, &config);
    let cmd = plan.commands.first();
    results.push(TestResult {
        name: "placement_floor_region".into(),
        passed: ok
            && plan.len() == 1
            && cmd.is_some_and(|c| {
                c.footprint == Vec2::new(10.0, 10.0)
                    && (c.local_position.x + 5.0).abs() < EPS
                    && (c.local_position.z - 5.0).abs() < EPS
            }),
        detail: format!(
            "setup ok: {}, {} commands, first at {:?}",
            ok,
            plan.len(),
            cmd.map(|c| c.local_position)
        ),
    });

    // door on an 8-unit wall
    let mut layout = RoomLayout::new(1, 1, Vec3::splat(8.0));
    let ok = layout
        .get_mut(SegmentRef::horizontal_wall(0, 0))
        .is_ok_and(|grid| grid.set_door(0, CellRect::new(1, 1, 2, 1)).is_ok());
    let plan = generate(&layout, &catalog, &config);
    let cmd = plan.commands.first();
    results.push(TestResult {
        name: "placement_door_bottom_edge".into(),
        passed: ok
            && cmd.is_some_and(|c| {
                c.footprint == Vec2::new(4.0, 2.0) && (c.local_position.y - 4.0).abs() < EPS
            }),
        detail: format!("setup ok: {}, door at {:?}", ok, cmd.map(|c| c.local_position)),
    });

    // footprint scales with tile size
    let mut worst = 0.0f32;
    let mut setup_failures = 0usize;
    for tile in [0.5f32, 1.0, 2.0, 3.0, 4.0, 7.5, 16.0] {
        let mut layout = RoomLayout::new(1, 1, Vec3::splat(tile));
        let mut ok = false;
        if let Ok(grid) = layout.get_mut(SegmentRef::floor(0, 0)) {
            ok = merge(grid, CellRect::new(1, 0, 3, 2)).is_ok();
            ok &= grid.paint(1, 0).is_ok();
        }
        if !ok {
            setup_failures += 1;
        }
        let plan = generate(&layout, &catalog, &config);
        let seg = tile / 4.0;
        for c in &plan.commands {
            let err = (c.footprint - Vec2::new(3.0 * seg, 2.0 * seg)).abs().max_element();
            worst = worst.max(err);
        }
    }
    results.push(TestResult {
        name: "placement_footprint_scaling".into(),
        passed: setup_failures == 0 && worst < EPS,
        detail: format!(
            "max footprint error {:.2e}, {} setup failures",
            worst, setup_failures
        ),
    });

    // bad ids are skipped without aborting
    let mut layout = RoomLayout::new(2, 1, Vec3::splat(4.0));
    let mut ok = false;
    if let Ok(grid) = layout.get_mut(SegmentRef::floor(0, 0)) {
        ok = grid.paint(0, 99).is_ok();
        ok &= grid.paint(1, 0).is_ok();
    }
    let plan = generate(&layout, &catalog, &config);
    results.push(TestResult {
        name: "placement_skips_unknown".into(),
        passed: ok
            && plan.len() == 1
            && plan.skipped.len() == 1
            && plan.skipped[0].reason == SkipReason::UnknownContent,
        detail: format!("{} placed, {} skipped", plan.len(), plan.skipped.len()),
    });

    results
}

// ── 5. Room Sweep ───────────────────────────────────────────────────────

fn validate_room_sweep(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Room Sweep ---");
    let mut results = Vec::new();
    let config = PlacementConfig::default();

    let seeds = 100u64;
    let mut count_mismatch = Vec::new();
    let mut bad_geometry = Vec::new();
    let mut unknown = 0usize;
    let mut errors = 0usize;
    let mut nondeterministic = 0usize;
    let mut total_commands = 0usize;

    for seed in 0..seeds {
        let layout = match random_room(seed, catalog) {
            Ok(l) => l,
            Err(e) => {
                bad_geometry.push(format!("seed {}: build failed: {}", seed, e));
                continue;
            }
        };
        let plan = generate(&layout, catalog, &config);
        total_commands += plan.len();

        if plan != generate(&layout, catalog, &config) {
            nondeterministic += 1;
        }

        let expected = expected_command_count(&layout);
        if plan.len() + plan.skipped.len() != expected {
            count_mismatch.push(format!(
                "seed {}: {} + {} skipped, expected {}",
                seed,
                plan.len(),
                plan.skipped.len(),
                expected
            ));
        }

        unknown += plan
            .skipped
            .iter()
            .filter(|s| s.reason == SkipReason::UnknownContent)
            .count();

        for c in &plan.commands {
            let finite = c.local_position.is_finite() && c.local_scale.is_finite();
            let positive = c.local_scale.min_element() > 0.0;
            let footprint_ok =
                (c.footprint - expected_footprint(&layout, c)).abs().max_element() < EPS;
            if !(finite && positive && footprint_ok) {
                bad_geometry.push(format!(
                    "seed {}: {} on {:?} cells {:?}",
                    seed, c.template, c.anchor.segment, c.cells
                ));
            }
        }

        errors += validate_all(&layout, catalog)
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
    }

    results.push(TestResult {
        name: "room_sweep_command_count".into(),
        passed: count_mismatch.is_empty(),
        detail: if count_mismatch.is_empty() {
            format!("{} rooms, {} commands", seeds, total_commands)
        } else {
            count_mismatch[0].clone()
        },
    });
    results.push(TestResult {
        name: "room_sweep_geometry".into(),
        passed: bad_geometry.is_empty(),
        detail: if bad_geometry.is_empty() {
            "all commands finite, positive scale, exact footprint".into()
        } else {
            format!("{} bad commands, first: {}", bad_geometry.len(), bad_geometry[0])
        },
    });
    results.push(TestResult {
        name: "room_sweep_known_content".into(),
        passed: unknown == 0 && errors == 0,
        detail: format!("{} unknown-content skips, {} validation errors", unknown, errors),
    });
    results.push(TestResult {
        name: "room_sweep_deterministic".into(),
        passed: nondeterministic == 0,
        detail: format!("{} rooms differed between passes", nondeterministic),
    });

    if verbose {
        println!(
            "    Avg {:.1} commands per room",
            total_commands as f32 / seeds as f32
        );
    }

    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(catalog: &Catalog, _verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut binary_ok = 0;
    let mut json_ok = 0;
    let seeds = 20u64;
    for seed in 0..seeds {
        let Ok(layout) = random_room(seed, catalog) else {
            continue;
        };

        let mut buffer = Vec::new();
        if persistence::save_layout(&mut buffer, &layout).is_ok()
            && persistence::load_layout(&buffer[..]).is_ok_and(|l| l == layout)
        {
            binary_ok += 1;
        }

        let mut buffer = Vec::new();
        if persistence::save_layout_json(&mut buffer, &layout).is_ok()
            && persistence::load_layout_json(&buffer[..]).is_ok_and(|l| l == layout)
        {
            json_ok += 1;
        }
    }
    results.push(TestResult {
        name: "persistence_binary_roundtrip".into(),
        passed: binary_ok == seeds,
        detail: format!("{}/{} layouts", binary_ok, seeds),
    });
    results.push(TestResult {
        name: "persistence_json_roundtrip".into(),
        passed: json_ok == seeds,
        detail: format!("{}/{} layouts", json_ok, seeds),
    });

    // a file holding a pointer chain must not load
    let file = LayoutFile::from(&RoomLayout::new(1, 1, Vec3::splat(4.0)));
    let rejected = match serde_json::to_value(&file) {
        Ok(mut json) => {
            json["floor"][0]["cells"][1] = (-2).into();
            json["floor"][0]["cells"][0] = (-4).into();
            matches!(
                persistence::load_layout_json(json.to_string().as_bytes()),
                Err(SaveError::Json(_))
            )
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "persistence_rejects_pointer_chain".into(),
        passed: rejected,
        detail: "cell 1 → 0 → 2 rejected on load".into(),
    });

    results
}

// ── 7. Edit Session ─────────────────────────────────────────────────────

fn validate_session(catalog: &Catalog, _verbose: bool) -> Vec<TestResult> {
    println!("--- Edit Session ---");
    let mut results = Vec::new();

    let mut session = EditSession::new(
        RoomLayout::new(2, 2, Vec3::splat(4.0)),
        catalog.clone(),
        PlacementConfig::default(),
    );

    // committed edit lands in the layout
    let at = SegmentRef::horizontal_wall(1, 0);
    let committed = session
        .open_detail(at)
        .and_then(|mut edit| {
            edit.merge(CellRect::full())?;
            edit.paint(0, 0)?;
            session.commit_detail(edit)
        })
        .is_ok();
    let placed = session.preview(at).map(|p| p.len()).unwrap_or(0);
    results.push(TestResult {
        name: "session_commit_detail".into(),
        passed: committed && placed == 1,
        detail: format!("{} commands on the edited wall", placed),
    });

    // an edit opened before a resize is stale
    let stale = session.open_detail(SegmentRef::floor(0, 0)).map(|edit| {
        session.resize(3, 2);
        session.commit_detail(edit)
    });
    results.push(TestResult {
        name: "session_stale_handle".into(),
        passed: matches!(stale, Ok(Err(SessionError::StaleHandle { .. }))),
        detail: format!("{:?}", stale.map(|r| r.err())),
    });

    results
}

// ── 8. User Layout ──────────────────────────────────────────────────────

fn validate_user_layout(
    path: &str,
    catalog: &Catalog,
    verbose: bool,
) -> (Vec<TestResult>, Option<PlacementPlan>) {
    println!("--- Layout: {} ---", path);
    let mut results = Vec::new();

    let loaded = File::open(path)
        .map_err(SaveError::from)
        .and_then(persistence::load_layout_json);
    let layout = match loaded {
        Ok(l) => l,
        Err(e) => {
            results.push(TestResult {
                name: "layout_load".into(),
                passed: false,
                detail: e.to_string(),
            });
            return (results, None);
        }
    };
    results.push(TestResult {
        name: "layout_load".into(),
        passed: true,
        detail: format!(
            "{}×{} tiles, {} active segments",
            layout.width(),
            layout.height(),
            layout.active_count()
        ),
    });

    let config = PlacementConfig::default();
    let config_errors = validate_config(&config);
    let findings = validate_all(&layout, catalog);
    let error_count = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    results.push(TestResult {
        name: "layout_validation".into(),
        passed: error_count == 0 && config_errors.is_empty(),
        detail: format!(
            "{} errors, {} warnings",
            error_count + config_errors.len(),
            findings.len() - error_count
        ),
    });
    if verbose {
        for f in &findings {
            println!("    [{:?}] {}: {}", f.severity, f.category, f.message);
        }
    }

    let plan = generate(&layout, catalog, &config);
    results.push(TestResult {
        name: "layout_generate".into(),
        passed: plan.skipped.is_empty(),
        detail: format!("{} commands, {} skipped", plan.len(), plan.skipped.len()),
    });

    (results, Some(plan))
}
