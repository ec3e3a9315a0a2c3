use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use drp_adapters::{bootstrap_repo, standard_plan};
use drp_core::{LogMode, StageDefinition};
use drp_domain::TractId;
use drpflow::config::{parse_workers, PipelineConfig};
use drpflow::logging::init_logging;
use drpflow::{run_pipeline, AppError, ConfigError};
use log::{error, info};
use serde_json::json;

#[derive(Parser)]
#[command(name = "drpflow")]
#[command(about = "Run the DRP processing pipeline stage by stage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the output repository and run every stage
    Run(RunArgs),
    /// Only create the output repository (_mapper, ref_cats link)
    Bootstrap(BootstrapArgs),
    /// Print the stage plan and its hash
    Plan(PlanArgs),
}

#[derive(Args)]
struct RepoArgs {
    /// Output repository
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Reference catalog linked as <repo>/ref_cats
    #[arg(long)]
    ref_cats: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    repo: RepoArgs,

    /// Raw image glob passed to the ingest tool
    #[arg(long)]
    images: Option<String>,

    /// Concurrent external processes
    #[arg(long)]
    workers: Option<String>,

    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// combined | separate | disabled
    #[arg(long)]
    log_mode: Option<String>,

    /// Directory holding the task config overrides
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Tract to process (repeatable)
    #[arg(long = "tract")]
    tracts: Vec<u32>,

    /// Sky map geometry JSON (default <repo>/deepCoadd_skyMap.json).
    /// makeDiscreteSkyMap does not write this file; export it before the patch loop
    #[arg(long)]
    skymap: Option<PathBuf>,

    /// Log invocations instead of launching them
    #[arg(long)]
    dry_run: bool,

    /// Append run events to this JSON lines file
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Args)]
struct BootstrapArgs {
    #[command(flatten)]
    repo: RepoArgs,

    /// Camera mapper written to <repo>/_mapper
    #[arg(long)]
    mapper: Option<String>,
}

#[derive(Args)]
struct PlanArgs {
    #[arg(long)]
    images: Option<String>,

    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Print the stage templates as JSON
    #[arg(long)]
    json: bool,
}

impl RepoArgs {
    fn apply(self, cfg: &mut PipelineConfig) {
        if let Some(repo) = self.repo {
            cfg.output_repo = repo;
        }
        if let Some(refs) = self.ref_cats {
            cfg.ref_cats = Some(refs);
        }
    }
}

impl RunArgs {
    fn apply(self, cfg: &mut PipelineConfig) -> Result<bool, ConfigError> {
        self.repo.apply(cfg);
        if let Some(images) = self.images {
            cfg.eimage_pattern = images;
        }
        if let Some(workers) = self.workers {
            cfg.workers = parse_workers("--workers", &workers)?;
        }
        if let Some(dir) = self.log_dir {
            cfg.log_dir = dir;
        }
        if let Some(mode) = self.log_mode {
            cfg.log_mode = mode.parse::<LogMode>().map_err(|reason| ConfigError::Invalid { var: "--log-mode",
                                                                                         value: mode.clone(),
                                                                                         reason })?;
        }
        if let Some(dir) = self.config_dir {
            cfg.config_dir = dir;
        }
        if !self.tracts.is_empty() {
            cfg.tracts = self.tracts.into_iter().map(TractId).collect();
        }
        if let Some(skymap) = self.skymap {
            cfg.skymap = Some(skymap);
        }
        if let Some(events) = self.events {
            cfg.events = Some(events);
        }
        Ok(self.dry_run)
    }
}

fn dispatch(command: Commands) -> Result<(), AppError> {
    let mut cfg = PipelineConfig::from_env()?;
    match command {
        Commands::Run(args) => {
            let dry_run = args.apply(&mut cfg)?;
            let summary = run_pipeline(&cfg, dry_run)?;
            info!("drpflow:done run_id={} tasks={} fingerprint={}",
                  summary.run_id,
                  summary.tasks,
                  summary.fingerprint);
        }
        Commands::Bootstrap(args) => {
            args.repo.apply(&mut cfg);
            if let Some(mapper) = args.mapper {
                cfg.mapper = mapper;
            }
            let repo = bootstrap_repo(&cfg.output_repo, cfg.require_ref_cats()?, &cfg.mapper)?;
            info!("drpflow:bootstrapped {}", repo.root().display());
        }
        Commands::Plan(args) => {
            if let Some(images) = args.images {
                cfg.eimage_pattern = images;
            }
            if let Some(dir) = args.config_dir {
                cfg.config_dir = dir;
            }
            let plan = standard_plan(&cfg.eimage_pattern, &cfg.config_dir)?;
            if args.json {
                let stages: Vec<_> = plan.stages()
                                         .iter()
                                         .map(|s| json!({ "name": s.name(), "phase": s.phase(), "template": s.template() }))
                                         .collect();
                println!("{:#}", json!({ "plan_hash": plan.plan_hash(), "stages": stages }));
            } else {
                for stage in plan.stages() {
                    println!("{:<24} {:?}", stage.name(), stage.phase());
                }
                println!("plan_hash {}", plan.plan_hash());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = match init_logging("info") {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("drpflow: logger init failed: {e}");
            None
        }
    };
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("drpflow: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
