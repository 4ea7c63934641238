use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fingerset::{
    config, storage, SimulatedEngine, SlotId, VerifyAllOutcome, VerifyOutcome, Workbench,
};
use log::info;

#[derive(Parser)]
#[command(name = "fingerset")]
#[command(version, about = "Fingerprint template set: enroll, import and verify")]
struct Cli {
    /// Template presented to the sensor (overrides `probe` in the config)
    #[arg(long, global = true)]
    probe: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List fingerprint devices on the configured transport
    Devices {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enroll a finger and write the template to a file
    Enroll {
        /// Output file (defaults to a new file in the enroll directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Verify a finger against stored templates
    Verify {
        /// Directory of template files (defaults to the enroll directory)
        #[arg(short, long, conflicts_with = "snapshot")]
        dir: Option<PathBuf>,
        /// Packed template set to load instead of a directory
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// Only match against this slot
        #[arg(long)]
        slot: Option<usize>,
    },
    /// Compare two template files
    Match { first: PathBuf, second: PathBuf },
    /// Show which slots a directory import fills
    List {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Pack a directory of templates into a single snapshot file
    Pack {
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load_config(None)?;
    if cli.probe.is_some() {
        cfg.probe = cli.probe;
    }

    match cli.command {
        Commands::Devices { json } => devices(&cfg, json),
        Commands::Enroll { out } => enroll(&cfg, out),
        Commands::Verify {
            dir,
            snapshot,
            slot,
        } => verify(&cfg, dir, snapshot, slot),
        Commands::Match { first, second } => compare(&cfg, &first, &second),
        Commands::List { dir } => list(&cfg, dir),
        Commands::Pack { dir, out } => pack(&cfg, dir, out),
        Commands::Config => open_config(),
    }
}

fn workbench(cfg: &config::Config) -> Result<Workbench<SimulatedEngine>> {
    let mut engine = SimulatedEngine::single_usb();
    if let Some(probe) = &cfg.probe {
        let bir = storage::read_template(probe).context("Failed to load probe template")?;
        engine.present(bir.payload().to_vec());
    }
    Ok(Workbench::new(engine, cfg.operation()))
}

fn open(bench: &mut Workbench<SimulatedEngine>, cfg: &config::Config) -> Result<()> {
    info!("Opening a session...");
    let device = bench
        .open(&cfg.transport, cfg.device)
        .context("Failed to open fingerprint device")?;
    info!("Opened '{}'", device);
    Ok(())
}

fn devices(cfg: &config::Config, json: bool) -> Result<()> {
    let mut engine = SimulatedEngine::single_usb();
    let devices = fingerset::Session::discover(&mut engine, &cfg.transport)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }
    if devices.is_empty() {
        info!("No fingerprint device found on '{}'", cfg.transport);
    }
    for (i, device) in devices.iter().enumerate() {
        println!("{}  {}", i, device);
    }
    Ok(())
}

fn enroll(cfg: &config::Config, out: Option<PathBuf>) -> Result<()> {
    let mut bench = workbench(cfg)?;
    open(&mut bench, cfg)?;

    info!("Add new template...");
    let slot = bench.enroll().context("Enrollment failed")?;

    let out = match out {
        Some(path) => path,
        None => {
            std::fs::create_dir_all(&cfg.enroll_dir).with_context(|| {
                format!("creating enroll directory {}", cfg.enroll_dir.display())
            })?;
            cfg.enroll_dir.join(format!(
                "{}.{}",
                uuid::Uuid::new_v4(),
                cfg.template_extension
            ))
        }
    };
    bench.export(slot, &out).context("Failed to export template")?;

    info!("✓ Template written to {}", out.display());
    Ok(())
}

fn populate(
    bench: &mut Workbench<SimulatedEngine>,
    cfg: &config::Config,
    dir: Option<PathBuf>,
    snapshot: Option<PathBuf>,
) -> Result<Vec<(SlotId, PathBuf)>> {
    if let Some(snapshot) = snapshot {
        let slots = bench
            .restore_snapshot(&snapshot)
            .context("Failed to restore template snapshot")?;
        return Ok(slots.into_iter().map(|s| (s, snapshot.clone())).collect());
    }
    let dir = dir.unwrap_or_else(|| cfg.enroll_dir.clone());
    bench
        .import_dir(&dir, &cfg.template_extension)
        .with_context(|| format!("Failed to import templates from {}", dir.display()))
}

fn verify(
    cfg: &config::Config,
    dir: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    slot: Option<usize>,
) -> Result<()> {
    let mut bench = workbench(cfg)?;
    open(&mut bench, cfg)?;
    let sources = populate(&mut bench, cfg, dir, snapshot)?;
    let source_of = |slot: SlotId| {
        sources
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, p)| p.display().to_string())
            .unwrap_or_default()
    };

    if let Some(index) = slot {
        let slot = SlotId::new(index)?;
        info!("Verify finger against slot {}...", slot);
        return match bench.verify(slot)? {
            VerifyOutcome::Matched => {
                info!("✓ Match ({})", source_of(slot));
                Ok(())
            }
            VerifyOutcome::NotMatched => anyhow::bail!("No match"),
        };
    }

    info!("Verify finger against all templates...");
    match bench.verify_all()? {
        VerifyAllOutcome::Matched(slot) => {
            info!("✓ Slot {} matches ({})", slot, source_of(slot));
            Ok(())
        }
        VerifyAllOutcome::NotMatched => anyhow::bail!("No matches"),
        VerifyAllOutcome::Empty => anyhow::bail!("The template set is empty. Run 'enroll' first."),
    }
}

fn compare(cfg: &config::Config, first: &Path, second: &Path) -> Result<()> {
    let mut bench = workbench(cfg)?;
    let a = bench.import(first)?;
    let b = bench.import(second)?;
    if bench.compare(a, b)? {
        info!("Templates {} and {} do match.", first.display(), second.display());
    } else {
        info!(
            "Templates {} and {} do NOT match.",
            first.display(),
            second.display()
        );
    }
    Ok(())
}

fn list(cfg: &config::Config, dir: Option<PathBuf>) -> Result<()> {
    let mut bench = workbench(cfg)?;
    let sources = populate(&mut bench, cfg, dir, None)?;
    if sources.is_empty() {
        info!("Enrolled slots: none");
    }
    for (slot, path) in &sources {
        println!("{:>2}  {}", slot, path.display());
    }
    Ok(())
}

fn pack(cfg: &config::Config, dir: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let mut bench = workbench(cfg)?;
    populate(&mut bench, cfg, dir, None)?;
    let out = out.unwrap_or_else(|| config::SNAPSHOT_PATH.clone());
    let count = bench
        .save_snapshot(&out)
        .with_context(|| format!("writing snapshot {}", out.display()))?;
    info!("✓ Packed {} template(s) into {}", count, out.display());
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
