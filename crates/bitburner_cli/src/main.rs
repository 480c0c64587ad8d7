use std::fs;
use std::path::PathBuf;
use std::process;

use bitburner_core::augmentations::MAX_QUEUED_REPEATABLE_LEVELS;
use bitburner_core::core_api::{AugmentationCatalog, Engine, StateManager, StatusKind};
use bitburner_core::model::SaveModel;
use bitburner_core::sections::is_valid_server_ram;
use bitburner_core::stats::Skill;
use bitburner_render::{
    FieldSelection, JsonStyle, TextRenderOptions, render_json_full, render_json_selected,
    render_text, render_text_selected,
};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    /// Augmentation catalog (JSON array) replacing the built-in one.
    #[arg(long, value_name = "CATALOG.json")]
    catalog: Option<PathBuf>,
    #[arg(long)]
    summary: bool,
    #[arg(long)]
    multipliers: bool,
    #[arg(long)]
    skills: bool,
    #[arg(long)]
    health: bool,
    #[arg(long)]
    augmentations: bool,
    #[arg(long)]
    json: bool,
    #[arg(long = "set-aug", value_name = "KEY=none|queued|installed")]
    set_aug: Vec<String>,
    #[arg(long = "set-neuroflux", value_name = "INSTALLED[:QUEUED]")]
    set_neuroflux: Option<String>,
    #[arg(long = "set-exp", value_name = "SKILL=VALUE")]
    set_exp: Vec<String>,
    #[arg(long = "set-money", allow_hyphen_values = true)]
    set_money: Option<f64>,
    #[arg(long = "set-bitnode")]
    set_bitnode: Option<u32>,
    #[arg(long = "set-server-ram", value_name = "HOST=GB")]
    set_server_ram: Vec<String>,
    #[arg(long = "install-queued")]
    install_queued: bool,
    #[arg(long = "enforce-consistency")]
    enforce_consistency: bool,
    #[arg(long)]
    recalculate: bool,
    #[arg(long)]
    output: Option<PathBuf>,
    /// Show breakdowns in text output and debug logging on stderr.
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn fields(&self) -> FieldSelection {
        FieldSelection {
            summary: self.summary,
            multipliers: self.multipliers,
            skills: self.skills,
            health: self.health,
            augmentations: self.augmentations,
        }
    }

    fn has_edits(&self) -> bool {
        !self.set_aug.is_empty()
            || self.set_neuroflux.is_some()
            || !self.set_exp.is_empty()
            || self.set_money.is_some()
            || self.set_bitnode.is_some()
            || !self.set_server_ram.is_empty()
            || self.install_queued
            || self.enforce_consistency
            || self.recalculate
    }
}

/// One requested edit, validated before the save is opened.
#[derive(Debug, Clone, PartialEq)]
enum Edit {
    Bitnode(u32),
    Money(f64),
    Experience(Skill, f64),
    ServerRam(String, f64),
    Augmentation(String, StatusKind),
    Neuroflux { installed: u32, queued_through: u32 },
    InstallQueued,
    EnforceConsistency,
    Recalculate,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let edits = collect_edits(&cli).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(2);
    });
    if !edits.is_empty() && cli.output.is_none() {
        eprintln!("edit flags require --output <PATH>");
        process::exit(2);
    }
    if edits.is_empty() && cli.output.is_some() {
        eprintln!("--output requires at least one edit flag");
        process::exit(2);
    }

    let engine = match &cli.catalog {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            });
            let catalog = AugmentationCatalog::from_json(&text).unwrap_or_else(|e| {
                eprintln!("Error loading catalog {}: {e}", path.display());
                process::exit(1);
            });
            Engine::with_catalog(catalog)
        }
        None => Engine::new(),
    };

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });
    let mut state = engine.open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    for edit in &edits {
        debug!(?edit, "applying edit");
        apply_edit(&engine, &mut state, edit).unwrap_or_else(|e| {
            eprintln!("Error applying edit: {e}");
            process::exit(1);
        });
    }

    if let Some(out_path) = &cli.output {
        let edited = state.export_bytes().unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });
        fs::write(out_path, edited).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        info!(path = %out_path.display(), "wrote edited save");
    }

    let fields = cli.fields();
    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&engine, &state, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&engine, &state, JsonStyle::CanonicalV1)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    let options = TextRenderOptions {
        verbose: cli.verbose,
    };
    if fields.is_any_selected() {
        print!("{}", render_text_selected(&engine, &state, &fields, options));
        return;
    }
    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }
    print!("{}", render_text(&engine, &state, options));
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn collect_edits(cli: &Cli) -> Result<Vec<Edit>, String> {
    let mut edits = Vec::new();
    if let Some(bitnode) = cli.set_bitnode {
        if bitnode == 0 {
            return Err("--set-bitnode must be at least 1".to_string());
        }
        edits.push(Edit::Bitnode(bitnode));
    }
    if let Some(money) = cli.set_money {
        if !money.is_finite() {
            return Err("--set-money must be a finite number".to_string());
        }
        edits.push(Edit::Money(money));
    }
    for value in &cli.set_exp {
        let (skill, amount) = split_pair(value, "--set-exp", "SKILL=VALUE")?;
        let skill = Skill::from_key(&skill.to_ascii_lowercase())
            .ok_or_else(|| format!("--set-exp: unknown skill '{skill}'"))?;
        let amount = parse_number(amount, "--set-exp")?;
        if amount < 0.0 {
            return Err("--set-exp: experience cannot be negative".to_string());
        }
        edits.push(Edit::Experience(skill, amount));
    }
    for value in &cli.set_server_ram {
        let (host, ram) = split_pair(value, "--set-server-ram", "HOST=GB")?;
        let ram = parse_number(ram, "--set-server-ram")?;
        if !is_valid_server_ram(ram) {
            return Err(format!(
                "--set-server-ram: {ram} is not a power of two of at least 1 GB"
            ));
        }
        edits.push(Edit::ServerRam(host.to_string(), ram));
    }
    for value in &cli.set_aug {
        let (key, target) = split_pair(value, "--set-aug", "KEY=none|queued|installed")?;
        let target = StatusKind::parse(target)
            .ok_or_else(|| format!("--set-aug: unknown status '{target}'"))?;
        edits.push(Edit::Augmentation(key.to_string(), target));
    }
    if let Some(value) = &cli.set_neuroflux {
        edits.push(parse_neuroflux(value)?);
    }
    if cli.install_queued {
        edits.push(Edit::InstallQueued);
    }
    if cli.enforce_consistency {
        edits.push(Edit::EnforceConsistency);
    }
    if cli.recalculate {
        edits.push(Edit::Recalculate);
    }
    Ok(edits)
}

fn apply_edit(engine: &Engine, state: &mut StateManager, edit: &Edit) -> Result<(), String> {
    state.update(|model| -> Result<SaveModel, String> {
        let mut next = model.clone();
        match edit {
            Edit::Bitnode(bitnode) => next.player.bit_node = *bitnode,
            Edit::Money(money) => next.player.money = Some(*money),
            Edit::Experience(skill, amount) => next.player.exp.set(*skill, *amount),
            Edit::ServerRam(host, ram) => {
                let server = next
                    .servers
                    .get_mut(host)
                    .ok_or_else(|| format!("no server named '{host}'"))?;
                server.max_ram = *ram;
            }
            Edit::Augmentation(key, target) => {
                let def = engine
                    .catalog()
                    .resolve(key)
                    .ok_or_else(|| format!("unknown augmentation '{key}'"))?;
                let check = engine.prerequisites(model, &def.key);
                let allowed = match target {
                    StatusKind::None => true,
                    StatusKind::Queued => check.all_owned,
                    StatusKind::Installed => check.all_installed,
                };
                if !allowed {
                    return Err(format!(
                        "cannot mark '{}' as {}: prerequisites are not met",
                        def.name,
                        target.as_str()
                    ));
                }
                next = engine.apply_status(model, &def.key, *target);
            }
            Edit::Neuroflux {
                installed,
                queued_through,
            } => {
                if engine.catalog().repeatable().is_none() {
                    return Err("catalog has no repeatable augmentation".to_string());
                }
                next = engine.set_repeatable_levels(model, *installed, *queued_through);
            }
            Edit::InstallQueued => next = engine.install_queued(model),
            Edit::EnforceConsistency => {
                let (swept, outcome) = engine.enforce_consistency(model);
                if !outcome.converged {
                    return Err(format!(
                        "consistency sweep did not settle after {} passes",
                        outcome.passes
                    ));
                }
                next = swept;
            }
            Edit::Recalculate => next = engine.recalculate(model),
        }
        Ok(next)
    })
}

fn split_pair<'a>(value: &'a str, flag: &str, shape: &str) -> Result<(&'a str, &'a str), String> {
    match value.split_once('=') {
        Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            Ok((left.trim(), right.trim()))
        }
        _ => Err(format!("{flag} expects {shape}, got '{value}'")),
    }
}

fn parse_number(value: &str, flag: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{flag}: '{value}' is not a number"))
}

// Levels feed integer powers in the multiplier engine.
const MAX_NEUROFLUX_LEVEL: u32 = i32::MAX as u32;

fn parse_neuroflux(value: &str) -> Result<Edit, String> {
    let parse_level = |s: &str| {
        let level = s
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("--set-neuroflux: '{s}' is not a level"))?;
        if level > MAX_NEUROFLUX_LEVEL {
            return Err(format!(
                "--set-neuroflux: level {level} is above {MAX_NEUROFLUX_LEVEL}"
            ));
        }
        Ok(level)
    };
    let (installed, queued_through) = match value.split_once(':') {
        Some((installed, queued)) => (parse_level(installed)?, parse_level(queued)?),
        None => {
            let installed = parse_level(value)?;
            (installed, installed)
        }
    };
    if queued_through < installed {
        return Err(format!(
            "--set-neuroflux: queued level {queued_through} is below installed level {installed}"
        ));
    }
    if queued_through - installed > MAX_QUEUED_REPEATABLE_LEVELS {
        return Err(format!(
            "--set-neuroflux: at most {MAX_QUEUED_REPEATABLE_LEVELS} levels can be queued"
        ));
    }
    Ok(Edit::Neuroflux {
        installed,
        queued_through,
    })
}
