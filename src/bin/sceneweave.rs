use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sceneweave::{
    BlockId, EngineConfig, PlayerConfig, ProjectDocument, RecordingSink, SceneId, ScenePlayer,
    base_state_entering_step, interpolate,
};

#[derive(Parser, Debug)]
#[command(name = "sceneweave", version)]
struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a project document and report its scenes and broken references.
    Validate(ValidateArgs),
    /// Print the interpolated state of one block at one point of a step.
    Sample(SampleArgs),
    /// Play a project headlessly and print every presentation command as a JSON line.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scene holding the block.
    #[arg(long)]
    scene: String,

    /// Block id.
    #[arg(long)]
    block: u64,

    /// Timeline step (absolute, not relative to the block).
    #[arg(long)]
    step: u32,

    /// Percent through the step, 0..=100.
    #[arg(long, default_value_t = 0.0)]
    t: f64,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Start scene; defaults to the document's active scene.
    #[arg(long)]
    scene: Option<String>,

    /// Option indices picked for successive choice menus; later menus pick 0.
    #[arg(long, value_delimiter = ',')]
    choose: Vec<usize>,

    /// Upper bound on player events before giving up.
    #[arg(long, default_value_t = 10_000)]
    max_steps: usize,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_project(path: &Path) -> anyhow::Result<ProjectDocument> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("read project '{}'", path.display()))?;
    let doc = sceneweave::load_project_str(&src)
        .with_context(|| format!("parse project '{}'", path.display()))?;
    Ok(doc)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let doc = read_project(&args.in_path)?;

    println!("active scene: {}", doc.active_scene_id);
    for scene in doc.scenes.values() {
        println!(
            "scene {} \"{}\": {} blocks, {} steps",
            scene.id,
            scene.name,
            scene.blocks.len(),
            scene.end_step()
        );
        for block in &scene.blocks {
            println!(
                "  [{}] {} @{}+{} track {}: {}",
                block.id,
                block.kind().as_str(),
                block.start,
                block.duration,
                block.track,
                doc.block_summary(block)
            );
        }
    }

    let broken = doc.broken_references();
    if broken.is_empty() {
        println!("no broken references");
    } else {
        for r in &broken {
            println!(
                "broken reference: scene {} block {} -> {}",
                r.scene, r.block, r.target
            );
        }
    }
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let doc = read_project(&args.in_path)?;
    let scene_id = SceneId::new(args.scene);
    let scene = doc
        .scene(&scene_id)
        .with_context(|| format!("unknown scene '{scene_id}'"))?;
    let block = scene
        .block(BlockId(args.block))
        .with_context(|| format!("no block {} in scene '{scene_id}'", args.block))?;
    if !block.kind().is_animated() {
        anyhow::bail!(
            "block {} is a {} block and has no visual state",
            block.id,
            block.kind().as_str()
        );
    }
    let offset = block.relative_step(args.step).with_context(|| {
        format!(
            "block {} occupies steps {}..{}, not {}",
            block.id,
            block.start,
            block.end(),
            args.step
        )
    })?;

    let base = base_state_entering_step(block, offset);
    let keyframes = block
        .step_anim(offset)
        .map_or(&[][..], |s| &s.keyframes[..]);
    let state = interpolate(&base, keyframes, args.t.clamp(0.0, 100.0));
    println!("{}", serde_json::to_string(&state)?);
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let doc = read_project(&args.in_path)?;
    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let player_config = PlayerConfig {
        auto_advance_dialogue: true,
        ..config.player
    };

    let mut player = ScenePlayer::new(&doc, player_config, RecordingSink::new());
    if let Some(scene) = args.scene {
        player.goto_scene(&SceneId::new(scene))?;
    }

    let run = player.play();
    flush_commands(&mut player)?;

    let mut choices = args.choose.into_iter();
    let mut events = 0usize;
    while player.is_running() {
        if events >= args.max_steps {
            tracing::warn!(events, "event limit reached, stopping");
            player.stop();
            flush_commands(&mut player)?;
            break;
        }
        events += 1;

        if let Some(labels) = player.pending_choice() {
            let pick = choices.next().unwrap_or(0);
            let pick = if pick < labels.len() {
                pick
            } else {
                tracing::warn!(pick, options = labels.len(), "choice out of range, picking 0");
                0
            };
            player.select_choice(run, pick);
        } else if let Some(dt) = player.time_to_next_event() {
            player.advance(dt);
        } else if player.pending_dialogue() {
            player.advance_dialogue(run);
        } else {
            tracing::warn!("player awaits nothing the host can deliver, stopping");
            player.stop();
        }
        flush_commands(&mut player)?;
    }

    eprintln!("playback finished after {events} events");
    Ok(())
}

fn flush_commands(player: &mut ScenePlayer<RecordingSink>) -> anyhow::Result<()> {
    for cmd in player.sink_mut().take_commands() {
        println!("{}", serde_json::to_string(&cmd)?);
    }
    Ok(())
}
