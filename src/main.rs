use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use zeocat::config::Config;
use zeocat::io::library::{DirectoryLibrary, FrameworkProvider, SiteKind};
use zeocat::io::rings::{PrecomputedRings, Validation};
use zeocat::io::{load_structure, save_candidate};
use zeocat::model::Structure;
use zeocat::physics::analysis::dedup::{group_equivalent, LatticeMatcher};
use zeocat::physics::analysis::symmetry;
use zeocat::physics::operations::divalent::divalent;
use zeocat::physics::operations::monovalent::{monovalent, MonovalentOptions};
use zeocat::physics::rings::RingSize;
use zeocat::utils::logger;

#[derive(Parser)]
#[command(name = "zeocat")]
#[command(about = "Enumerate extra-framework cation sites in zeolites")]
struct Cmd {
    /// Settings file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Place a monovalent cation in the rings around one T site
    Monovalent {
        #[arg(long)]
        framework: PathBuf,
        /// Precomputed ring paths (JSON)
        #[arg(long)]
        rings: PathBuf,
        #[arg(long)]
        site: usize,
        #[arg(long)]
        species: String,
        /// Ring size (T atoms) to fill; repeatable
        #[arg(long = "include")]
        include: Vec<usize>,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        bond_length: Option<f64>,
        #[arg(long, conflicts_with = "no_clash_check")]
        cutoff: Option<f64>,
        #[arg(long)]
        no_clash_check: bool,
        #[arg(long)]
        validation: Option<Validation>,
        /// Keep one candidate per symmetry class
        #[arg(long)]
        unique: bool,
    },
    /// Bridge oxygen pairs around two Al charge centers with a divalent cation
    Divalent {
        #[arg(long)]
        framework: PathBuf,
        #[arg(long)]
        species: String,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        neighbor_cutoff: Option<f64>,
        #[arg(long)]
        unique: bool,
    },
    /// Print the effective settings; `--write` stores them at the config path
    Config {
        #[arg(long)]
        write: bool,
    },
    /// Print the first atom index of every T and O site class
    Sites {
        #[arg(long)]
        library: PathBuf,
        #[arg(long)]
        code: String,
    },
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    logger::init(logger::level_for(cmd.verbose)).context("installing logger")?;

    let (config, msg) = Config::load(cmd.config.as_deref());
    log::debug!("{}", msg);

    match cmd.action {
        Action::Monovalent {
            framework,
            rings,
            site,
            species,
            include,
            out,
            bond_length,
            cutoff,
            no_clash_check,
            validation,
            unique,
        } => {
            let mut options = MonovalentOptions::from_config(&config);
            if !include.is_empty() {
                options.included_rings = Some(include.into_iter().map(RingSize).collect());
            }
            options.output = out.clone();
            options.bond_length = bond_length.or(options.bond_length);
            if no_clash_check {
                options.cutoff = None;
            } else if cutoff.is_some() {
                options.cutoff = cutoff;
            }
            if let Some(v) = validation {
                options.validation = v;
            }

            let fw = load_framework(&framework, &config)?;
            let finder = PrecomputedRings::load(&rings)
                .with_context(|| format!("reading rings from {}", rings.display()))?;
            let (candidates, labels) = monovalent(&fw, site, &species, &finder, &options)?;
            report(&config, candidates, labels, out.as_deref(), unique)
        }
        Action::Divalent {
            framework,
            species,
            out,
            neighbor_cutoff,
            unique,
        } => {
            let fw = load_framework(&framework, &config)?;
            let cutoff = neighbor_cutoff.unwrap_or(config.neighbor_cutoff);
            let (candidates, labels) = divalent(&fw, &species, out.as_deref(), cutoff)?;
            report(&config, candidates, labels, out.as_deref(), unique)
        }
        Action::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if write {
                log::info!("{}", config.save(cmd.config.as_deref()));
            }
            Ok(())
        }
        Action::Sites { library, code } => {
            let lib = DirectoryLibrary::new(library);
            let fw = lib.framework(&code)?;
            for kind in [SiteKind::T, SiteKind::O] {
                let classes = lib.site_classes(&code, kind)?;
                let firsts = classes.first_indices(&fw, kind)?;
                for ((label, m), first) in classes.labels.iter().zip(&classes.multiplicities).zip(firsts) {
                    println!("{:<6} x{:<4} first index {}", label, m, first);
                }
            }
            Ok(())
        }
    }
}

fn load_framework(path: &Path, config: &Config) -> Result<Structure> {
    let fw = load_structure(path).with_context(|| format!("reading framework {}", path.display()))?;
    match symmetry::analyze(&fw, config.symprec) {
        Ok(info) => log::info!(
            "{}: {} atoms, space group {} ({})",
            fw.formula_string(),
            fw.len(),
            info.number,
            info.system
        ),
        Err(e) => log::warn!("{}: symmetry analysis failed: {}", fw.formula_string(), e),
    }
    Ok(fw)
}

/// Print candidate labels; with `unique` only the first of every symmetry class,
/// also written under `out/unique/` when an output directory is set.
fn report(
    config: &Config,
    candidates: Vec<Structure>,
    labels: Vec<String>,
    out: Option<&Path>,
    unique: bool,
) -> Result<()> {
    if !unique {
        for label in &labels {
            println!("{}", label);
        }
        println!("{} candidates", candidates.len());
        return Ok(());
    }

    let groups = group_equivalent(&candidates, &LatticeMatcher::from_config(config))?;
    for (n, group) in groups.iter().enumerate() {
        let first = group[0];
        println!("{} ({} equivalent)", labels[first], group.len());
        if let Some(root) = out {
            let name = format!("{}-{}", labels[first], n);
            save_candidate(&root.join("unique"), &name, &candidates[first])?;
        }
    }
    println!("{} unique of {} candidates", groups.len(), candidates.len());
    Ok(())
}
