//! Shared plumbing for the roomcrate binaries
//!
//! `legacy2gltf` converts legacy three.js JSON models into glTF files placed
//! next to their input. `room2gltf` bakes a room layout (the sample room, a
//! project file, or the stored project) into a single glTF scene.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use roomcrate_core::{Project, ViewMode};
use roomcrate_io::{
    convert_file, load_project, parse_project, write_gltf, ConversionReport, ConvertOptions, FileStore, GltfDocument,
    GltfExporter,
};
use roomcrate_scene::{RoomScene, SceneConfig};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Route `log` output to stderr, `info` unless `RUST_LOG` says otherwise
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

/// `path` relative to the working directory when it lies below it
pub fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Convert a legacy three.js JSON model (format 3) to glTF 2.0
#[derive(Debug, Parser)]
#[command(name = "legacy2gltf", version, about)]
pub struct LegacyArgs {
    /// Model file, `.js` or `.json`
    pub input: PathBuf,

    /// Weld duplicate vertices before export
    #[arg(long)]
    pub optimize: bool,

    /// Replace every material with a plain grey one
    #[arg(long)]
    pub no_textures: bool,
}

impl LegacyArgs {
    pub fn options(&self) -> ConvertOptions {
        let options = if self.optimize {
            ConvertOptions::optimized()
        } else {
            ConvertOptions::default()
        };
        if self.no_textures {
            options.without_textures()
        } else {
            options
        }
    }
}

pub fn run_legacy(args: &LegacyArgs) -> Result<ConversionReport> {
    let report = convert_file(&args.input, &args.options())?;
    Ok(report)
}

/// One `⚠️` line per texture warning on `err`, then `✓ <output>` on `out`
pub fn print_report(report: &ConversionReport, out: &mut impl Write, err: &mut impl Write) -> std::io::Result<()> {
    for warning in &report.warnings {
        writeln!(err, "⚠️  {}", warning)?;
    }
    writeln!(out, "✓ {}", display_path(&report.output))
}

/// Export a room layout as a glTF scene
#[derive(Debug, Parser)]
#[command(name = "room2gltf", version, about)]
pub struct RoomArgs {
    /// Project document to export instead of the sample room
    #[arg(long, conflicts_with = "from_store")]
    pub project: Option<PathBuf>,

    /// Export the project saved by the editor
    #[arg(long)]
    pub from_store: bool,

    /// Directory of the project store used by `--from-store`, defaults to the
    /// per-user data directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// `3d` or `floorplan`
    #[arg(long, default_value = "3d")]
    pub view: ViewMode,

    /// Output file
    #[arg(short, long, default_value = "room.gltf")]
    pub output: PathBuf,
}

/// Read a project document from disk
pub fn read_project_file(path: &Path) -> Result<Project> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_project(&text).ok_or_else(|| anyhow!("{} is not a project document", path.display()))
}

/// The project selected by the command line
pub fn resolve_project(args: &RoomArgs) -> Result<Project> {
    if let Some(path) = &args.project {
        return read_project_file(path);
    }
    if args.from_store {
        let store = match &args.store_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::default_location()?,
        };
        let project = load_project(&store)
            .with_context(|| format!("failed to read the project store in {}", store.root().display()))?;
        return project.ok_or_else(|| anyhow!("No saved project found."));
    }
    Ok(Project::default())
}

/// Scene for a project as the editor would show it, with nothing selected
pub fn build_room_scene(project: &Project, view: ViewMode, config: &SceneConfig) -> RoomScene {
    let mut scene = RoomScene::new(view, config.clone());
    scene.set_floor_material(project.floor_material);
    scene.sync_walls(&project.walls, &project.wall_color);
    scene.sync_furniture(&project.furniture, None);
    scene
}

/// Bake a project into a glTF document holding one mesh named `room`
pub fn export_room(project: &Project, view: ViewMode, config: &SceneConfig) -> Result<GltfDocument> {
    let (mesh, materials) = build_room_scene(project, view, config).bake();
    let mut exporter = GltfExporter::new();
    let slots: Vec<usize> = materials.iter().map(|m| exporter.add_material(m, None)).collect();
    let mesh_index = exporter.add_mesh(Some("room"), &mesh, &slots)?;
    exporter.add_node(Some("room"), Some(mesh_index), None);
    Ok(exporter.finish())
}

pub fn run_room(args: &RoomArgs) -> Result<PathBuf> {
    let project = resolve_project(args)?;
    let document = export_room(&project, args.view, &SceneConfig::default())?;
    write_gltf(&document, &args.output).with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        "exported {} walls and {} items ({} vertices)",
        project.walls.len(),
        project.furniture.len(),
        document.vertex_count()
    );
    Ok(args.output.clone())
}
