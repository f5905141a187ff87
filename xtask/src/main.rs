use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use glam::vec2;
use planscape::{Building, BuildingDef, Definitions, LoadError, ObjectCollection, Path, PathDef};
use rayon::prelude::*;

const DEFAULT_GRID_SIZE: usize = 100;
/// Distance between neighbouring building centers
const GRID_SPACING: f32 = 8.0;
/// Gap between a building center and the belt endpoint next to it
const BELT_INSET: f32 = 2.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "gen-grid" => gen_grid(args.get(2).map(String::as_str)),
        "check" => check(&args[2..]),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            usage();
            std::process::exit(1);
        }
    }
}

fn usage() {
    eprintln!("Usage: cargo xtask <command>");
    eprintln!("Commands:");
    eprintln!("  gen-grid [n]       Write an n x n grid of splitters and mergers linked by belts");
    eprintln!("  check <file>...    Decode scene files and report object counts or errors");
}

/// Registry the generated and checked files are written against
fn sample_defs() -> Arc<Definitions> {
    Arc::new(Definitions::new(
        vec![PathDef::new("Belt", 1.0), PathDef::new("Pipe", 2.0)],
        vec![
            BuildingDef::new("Splitter", 4.0, 4.0),
            BuildingDef::new("Merger", 4.0, 4.0),
            BuildingDef::new("Constructor", 8.0, 6.0),
        ],
    ))
}

// ============================================================================
// gen-grid
// ============================================================================

fn gen_grid(arg: Option<&str>) {
    let n = match arg.map(str::parse::<usize>) {
        None => DEFAULT_GRID_SIZE,
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            eprintln!("Invalid argument, expected a positive integer");
            std::process::exit(1);
        }
    };

    let defs = sample_defs();
    let objects = grid(&defs, n);
    let filename = Utf8PathBuf::from(format!("grid_{n}.planscape"));

    let result = File::create(&filename).and_then(|f| planscape::encode_text(&objects, &defs, f));
    if let Err(e) = result {
        eprintln!("Failed to write {filename}: {e}");
        std::process::exit(1);
    }

    let splitters = objects.buildings.iter().filter(|b| b.def == 0).count();
    println!("Generated grid:");
    println!("  - {n} x {n} buildings");
    println!("  - {splitters} splitters");
    println!("  - {} mergers", objects.buildings.len() - splitters);
    println!("  - {} belts", objects.paths.len());
    println!();
    println!("{filename}");
}

/// Buildings alternate like a checkerboard; belts link horizontal and vertical
/// neighbours, flowing one way on even columns/rows and the other on odd ones.
fn grid(defs: &Definitions, n: usize) -> ObjectCollection {
    let (Some(belt), Some(splitter), Some(merger)) = (
        defs.path_index("Belt"),
        defs.building_index("Splitter"),
        defs.building_index("Merger"),
    ) else {
        unreachable!("sample registry defines Belt, Splitter and Merger");
    };

    let mut objects = ObjectCollection::new();
    for x in 0..n {
        for y in 0..n {
            let def = if (x + y) % 2 == 1 { merger } else { splitter };
            let (fx, fy) = (x as f32 * GRID_SPACING, y as f32 * GRID_SPACING);
            objects.push(Building::new(def, vec2(fx, fy), 0));

            if x > 0 {
                let from = vec2(fx - GRID_SPACING + BELT_INSET, fy);
                let to = vec2(fx - BELT_INSET, fy);
                objects.push(belt_between(belt, from, to, x % 2 == 0));
            }
            if y > 0 {
                let from = vec2(fx, fy - GRID_SPACING + BELT_INSET);
                let to = vec2(fx, fy - BELT_INSET);
                objects.push(belt_between(belt, from, to, y % 2 == 0));
            }
        }
    }
    objects
}

fn belt_between(def: usize, from: glam::Vec2, to: glam::Vec2, forward: bool) -> Path {
    if forward {
        Path::new(def, from, to)
    } else {
        Path::new(def, to, from)
    }
}

// ============================================================================
// check
// ============================================================================

fn check(files: &[String]) {
    if files.is_empty() {
        usage();
        std::process::exit(1);
    }

    let defs = sample_defs();
    let results: Vec<(&Utf8Path, Result<ObjectCollection, LoadError>)> = files
        .par_iter()
        .map(|f| {
            let path = Utf8Path::new(f);
            (path, load(path, &defs))
        })
        .collect();

    let mut failed = 0;
    for (path, result) in results {
        match result {
            Ok(objects) => println!(
                "{path}: {} buildings, {} paths, {} text boxes",
                objects.buildings.len(),
                objects.paths.len(),
                objects.text_boxes.len()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{path}:");
                eprintln!("{:?}", miette::Report::new(e));
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} files failed to decode", files.len());
        std::process::exit(1);
    }
}

fn load(path: &Utf8Path, defs: &Definitions) -> Result<ObjectCollection, LoadError> {
    let file = File::open(path)?;
    planscape::decode_text(BufReader::new(file), defs)
}
