#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads terrain descriptions and inspects the grid.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use skirmish_core::{to_surface_coords, Field, Pos, TeamIndex};
use skirmish_system_visibility::{Config as VisibilityConfig, Sighting, Visibility};
use skirmish_world::{Grid, GridConfig, TerrainSource, UnitArena};
use tracing_subscriber::EnvFilter;

/// Inspects skirmish terrain files.
#[derive(Parser, Debug)]
#[command(name = "skirmish", about = "Loads and inspects skirmish terrain", long_about = None)]
struct Args {
    /// Terrain description in JSON.
    terrain: PathBuf,

    /// Grid configuration in JSON. Missing keys keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Prints the load summary and terrain checksum.
    Summary,
    /// Prints every predicate answer for one fine cell.
    Inspect {
        /// Fine column.
        #[arg(long)]
        x: i32,
        /// Fine row.
        #[arg(long)]
        y: i32,
        /// Field the inspecting unit lives in.
        #[arg(long, value_enum, default_value_t = FieldArg::Land)]
        field: FieldArg,
        /// Team whose fog of war the approximate predicates use.
        #[arg(long, default_value_t = 0)]
        team: usize,
    },
    /// Prints the fog of war produced by a single observer.
    Fog {
        /// Fine column of the observer.
        #[arg(long)]
        x: i32,
        /// Fine row of the observer.
        #[arg(long)]
        y: i32,
        /// Sight radius in fine cells.
        #[arg(long, default_value_t = 8)]
        sight: i32,
        /// Team of the observer.
        #[arg(long, default_value_t = 0)]
        team: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FieldArg {
    Land,
    Air,
}

impl From<FieldArg> for Field {
    fn from(value: FieldArg) -> Self {
        match value {
            FieldArg::Land => Field::Land,
            FieldArg::Air => Field::Air,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => GridConfig::default(),
    };
    let text = fs::read_to_string(&args.terrain)
        .with_context(|| format!("failed to read terrain {}", args.terrain.display()))?;
    let source: TerrainSource = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse terrain {}", args.terrain.display()))?;
    let mut grid = Grid::load(&source, config).context("terrain rejected")?;
    grid.init();

    match args.command {
        Action::Summary => print_summary(&grid),
        Action::Inspect { x, y, field, team } => {
            inspect(&grid, Pos::new(x, y), field.into(), team)?
        }
        Action::Fog { x, y, sight, team } => fog(&mut grid, Pos::new(x, y), sight, team)?,
    }
    Ok(())
}

fn print_summary(grid: &Grid) {
    println!("title:          {}", grid.title());
    println!(
        "surface cells:  {}x{}",
        grid.surface_width(),
        grid.surface_height()
    );
    println!("unit cells:     {}x{}", grid.width(), grid.height());
    println!("water level:    {:.6}", grid.water_level());
    println!("cliff level:    {:.6}", grid.cliff_level());
    println!("max height:     {:.6}", grid.max_map_height());
    println!("camera height:  {}", grid.camera_height());
    println!("checksum:       {:08x}", grid.checksum());
    for index in 0..grid.max_players() {
        if let Ok(pos) = grid.start_location(index) {
            println!("start {index}:        ({}, {})", pos.x(), pos.y());
        }
    }
}

fn inspect(grid: &Grid, pos: Pos, field: Field, team: usize) -> Result<()> {
    let team = TeamIndex::new(team).context("invalid team")?;
    let units = UnitArena::new();
    let cell = grid
        .cell(pos)
        .with_context(|| format!("no cell at ({}, {})", pos.x(), pos.y()))?;
    let surface = grid.surface_cell(to_surface_coords(pos))?;

    println!("cell:           ({}, {}) {field:?}", pos.x(), pos.y());
    println!("height:         {:.6}", cell.height());
    println!("submerged:      {}", grid.is_submerged_cell(cell));
    println!("deep submerged: {}", grid.is_deep_submerged_cell(cell));
    println!("surface type:   {}", surface.surface_type());
    println!("near submerged: {}", surface.near_submerged());
    println!("surface free:   {}", surface.is_free());
    if let Some(resource) = surface.resource() {
        println!("resource:       kind {} amount {}", resource.kind.get(), resource.amount);
    }
    println!("free:           {}", grid.is_free_cell(pos, field, &units));
    println!(
        "aprox free:     {}",
        grid.is_aprox_free_cell(pos, field, team, &units)
    );
    println!("explored:       {}", grid.is_explored_by(pos, team));
    Ok(())
}

fn fog(grid: &mut Grid, observer: Pos, sight: i32, team: usize) -> Result<()> {
    let team = TeamIndex::new(team).context("invalid team")?;
    let mut commands = Vec::new();
    Visibility::new(VisibilityConfig::default()).handle(
        grid,
        &[team],
        &[Sighting::new(team, observer, sight)],
        &mut commands,
    );
    grid.apply_fog(&commands).context("fog commands rejected")?;

    for y in 0..grid.surface_height() {
        let row: String = (0..grid.surface_width())
            .map(|x| match grid.try_surface_cell(Pos::new(x, y)) {
                Some(cell) if cell.is_visible(team) => 'o',
                Some(cell) if cell.is_explored(team) => '.',
                _ => '#',
            })
            .collect();
        println!("{row}");
    }
    Ok(())
}
