use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use palace_assets::{Assets, ModelLoad, PalacePaths};
use palace_core::{NullRenderer, Palace, RecordingSurface, SectionLayout, SilentAudio, snapshot};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser)]
#[command(name = "palace", about = "Headless memory palace driver and developer console")]
struct Cli {
    /// Palace directory (defaults to $PALACE_DIR, then the current directory)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Seed for particle generation
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what the palace directory provides
    Inspect,

    /// Scroll through every section, then fly into exploration
    Tour {
        /// Seconds spent on each section
        #[arg(long, default_value_t = 1.5)]
        dwell: f32,

        /// Simulation frames per second
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
    },

    /// Enter exploration and optionally open a node's dashboard
    Explore {
        /// Node name to click once exploration has settled
        #[arg(long)]
        open: Option<String>,

        /// Keyword index to select on the opened dashboard
        #[arg(long, requires = "open")]
        keyword: Option<usize>,
    },

    /// Run a developer console script ("-" reads stdin)
    Console {
        script: PathBuf,
    },

    /// Write a JSON snapshot of the scene
    Export {
        /// Output file path (stdout if omitted)
        path: Option<PathBuf>,

        /// Enter exploration first so nodes are built
        #[arg(long)]
        explore: bool,

        /// Include raw satellite points
        #[arg(long)]
        points: bool,
    },
}

/// Enough simulated time for the exploration flight to land.
const SETTLE_SECONDS: f32 = 5.0;
const FPS: f32 = 60.0;

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Inspect => cmd_inspect(&cli),
        Commands::Tour { dwell, fps } => cmd_tour(&cli, *dwell, *fps),
        Commands::Explore { open, keyword } => cmd_explore(&cli, open.as_deref(), *keyword),
        Commands::Console { script } => cmd_console(&cli, script),
        Commands::Export {
            path,
            explore,
            points,
        } => cmd_export(&cli, path.as_deref(), *explore, *points),
    }
}

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

fn load_assets(cli: &Cli) -> Result<(PalacePaths, Assets)> {
    let paths = PalacePaths::discover(cli.dir.as_deref());
    let assets = Assets::load(&paths)
        .with_context(|| format!("failed to load palace from {}", paths.root.display()))?;
    Ok((paths, assets))
}

fn open_palace(cli: &Cli) -> Result<Palace<RecordingSurface>> {
    let (_, assets) = load_assets(cli)?;
    let rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let mut palace = Palace::new(
        assets.config,
        assets.registry,
        RecordingSurface::permissive(),
        rng,
    )
    .context("failed to initialise palace")?;

    match assets.model {
        ModelLoad::Loaded(meshes) => palace.on_model_loaded(meshes),
        ModelLoad::Failed(reason) => palace.on_model_failed(reason),
        ModelLoad::Missing => tracing::info!("no model in palace directory"),
    }
    Ok(palace)
}

fn explore_and_settle(palace: &mut Palace<RecordingSurface>, renderer: &mut NullRenderer) {
    palace.enter_exploration();
    palace.simulate(SETTLE_SECONDS, FPS, renderer);
}

fn fmt_vec(v: glam::Vec3) -> String {
    format!("{:.2}, {:.2}, {:.2}", v.x, v.y, v.z)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_inspect(cli: &Cli) -> Result<()> {
    let (paths, assets) = load_assets(cli)?;
    let source = |p: &Option<PathBuf>| {
        p.as_ref()
            .map_or("(built-in)".to_string(), |p| p.display().to_string())
    };

    println!("root:      {}", paths.root.display());
    println!("config:    {}", source(&paths.config));
    println!("registry:  {}", source(&paths.registry));
    match &assets.model {
        ModelLoad::Missing => println!("model:     (none)"),
        ModelLoad::Failed(reason) => println!("model:     failed: {reason}"),
        ModelLoad::Loaded(meshes) => {
            let vertices: usize = meshes.iter().map(|m| m.positions.len()).sum();
            println!("model:     {} meshes, {} vertices", meshes.len(), vertices);
        }
    }
    println!("nodes:     {}", assets.registry.nodes.len());
    for node in &assets.registry.nodes {
        println!(
            "  {:<14} {:<24} [{}] keywords={}",
            node.name,
            node.title,
            fmt_vec(node.position()),
            node.keywords.len()
        );
    }
    println!("sections:  {}", assets.registry.sections.len());
    for section in &assets.registry.sections {
        println!("  {:<14} {}", section.id, section.title);
    }
    Ok(())
}

fn cmd_tour(cli: &Cli, dwell: f32, fps: f32) -> Result<()> {
    let mut palace = open_palace(cli)?;
    let mut renderer = NullRenderer::default();
    let height = palace.camera().viewport.height;
    let layout = SectionLayout::stacked(palace.registry().sections.len(), height);

    for index in 0..layout.len() {
        palace.on_scroll(&layout, index as f32 * height);
        palace.simulate(dwell, fps, &mut renderer);
        let title = palace
            .registry()
            .sections
            .get(index)
            .map_or("", |s| s.title.as_str());
        println!(
            "section {index}: {title} model=[{}]",
            fmt_vec(palace.scene().model.transform.translation)
        );
    }

    palace.enter_exploration();
    palace.simulate(SETTLE_SECONDS, fps, &mut renderer);
    println!(
        "exploring: camera=[{}] nodes={} frames={}",
        fmt_vec(palace.camera().position),
        palace.scene().nodes().len(),
        renderer.frames
    );
    Ok(())
}

fn cmd_explore(cli: &Cli, open: Option<&str>, keyword: Option<usize>) -> Result<()> {
    let mut palace = open_palace(cli)?;
    let mut renderer = NullRenderer::default();
    explore_and_settle(&mut palace, &mut renderer);

    println!("camera:    {}", fmt_vec(palace.camera().position));
    println!("nodes:     {}", palace.scene().nodes().len());
    if let Some(hud) = palace.hud() {
        let nearest = hud
            .nearest
            .and_then(|(id, d)| palace.registry().node(id).map(|n| format!("{} ({d:.1})", n.title)))
            .unwrap_or_else(|| "--".to_string());
        println!("nearest:   {nearest}");
        println!("proximity: {}", hud.proximity.label());
        println!("lobe:      {}", hud.lobe.label());
    }

    let Some(name) = open else {
        return Ok(());
    };
    let id = palace
        .registry()
        .find(name)
        .with_context(|| format!("no node named '{name}'"))?;
    let Some(centre) = palace.scene().subtree(id).map(|s| s.center()) else {
        bail!("node '{name}' was not built (no model loaded?)");
    };
    let Some(pixel) = palace.camera().project_to_pixel(centre) else {
        bail!("node '{name}' is not on screen");
    };
    if palace.on_pointer_click(pixel.x, pixel.y) != Some(id) {
        bail!("click at ({:.0}, {:.0}) did not hit '{name}'", pixel.x, pixel.y);
    }
    if let Some(index) = keyword
        && !palace.select_keyword(index)
    {
        bail!("node '{name}' has no keyword {index}");
    }
    palace.simulate(SETTLE_SECONDS, FPS, &mut renderer);

    let view = palace
        .dashboard()
        .view()
        .context("dashboard did not open")?;
    println!("opened:    {}", view.title);
    println!("summary:   {}", view.summary);
    if !view.tags.is_empty() {
        println!("tags:      {}", view.tags.join(", "));
    }
    if !view.keywords.is_empty() {
        println!("keywords:  {}", view.keywords.join(", "));
    }
    if let Some(photo) = &view.photo {
        println!("photo:     {photo}");
    }

    palace.close_dashboard();
    palace.teardown(&mut SilentAudio::default());
    Ok(())
}

fn cmd_console(cli: &Cli, script: &Path) -> Result<()> {
    let text = if script == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read script from stdin")?;
        buf
    } else {
        std::fs::read_to_string(script)
            .with_context(|| format!("failed to read {}", script.display()))?
    };

    let mut palace = open_palace(cli)?;
    let applied = palace.run_console(&text);
    palace.frame(1.0 / FPS, &mut NullRenderer::default());

    let scene = palace.scene();
    println!("applied:    {applied}");
    println!("background: {}", scene.backdrop.background);
    println!("model:      {}", fmt_vec(scene.model.transform.translation));
    println!("star spin:  {}", scene.backdrop.star_spin);
    println!("speed:      {}", palace.config().movement.speed);
    println!("bounds:     {}", palace.config().movement.bounds_extent);
    Ok(())
}

fn cmd_export(cli: &Cli, path: Option<&Path>, explore: bool, points: bool) -> Result<()> {
    let mut palace = open_palace(cli)?;
    let mut renderer = NullRenderer::default();
    if explore {
        explore_and_settle(&mut palace, &mut renderer);
    } else {
        palace.frame(1.0 / FPS, &mut renderer);
    }

    let json = snapshot::to_json(&palace.snapshot(points)).context("failed to serialize snapshot")?;
    match path {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("exported to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
