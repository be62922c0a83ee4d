//! CG-008: CLI subcommands: init, validate, render, plan, order, inspect, schema, types.

use crate::core::config::{OutputFormat, Settings, ValidateSettings, SETTINGS_FILE};
use crate::core::{hasher, parser, planner, resolver, synth, types};
use crate::glue::ResourceKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Typed CloudFormation tooling for AWS Glue
#[derive(Parser, Debug)]
#[command(name = "cfn-glue", version, about, long_about = None)]
pub struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Settings file
    #[arg(long, default_value = SETTINGS_FILE, global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a starter template and settings file
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate templates without contacting AWS
    Validate {
        /// Template paths or glob patterns
        #[arg(short, long = "file", required = true, num_args = 1..)]
        files: Vec<String>,

        /// Reject resource types outside AWS::Glue::*
        #[arg(long)]
        glue_only: bool,

        /// Require AWSTemplateFormatVersion
        #[arg(long)]
        require_version: bool,
    },

    /// Normalize Glue properties and print or write the template
    Render {
        /// Template to render
        #[arg(short, long)]
        file: PathBuf,

        /// Output format (default from settings)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the change set between a deployed and a new template
    Plan {
        /// Currently deployed template
        #[arg(long)]
        old: PathBuf,

        /// Template to deploy
        #[arg(long)]
        new: PathBuf,
    },

    /// Print the deployment order of resources
    Order {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show resource types, property hashes, and attributes
    Inspect {
        #[arg(short, long)]
        file: PathBuf,

        /// Only this logical id
        #[arg(short, long)]
        resource: Option<String>,
    },

    /// Print the JSON Schema of a Glue type's Properties
    Schema {
        /// e.g. AWS::Glue::Job
        resource_type: String,
    },

    /// List supported Glue resource types
    Types,

    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands, settings: &Settings) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate {
            files,
            glue_only,
            require_version,
        } => {
            let mut validate = settings.validate.clone();
            if glue_only {
                validate.allow_foreign_types = false;
            }
            if require_version {
                validate.require_format_version = true;
            }
            cmd_validate(&files, &validate)
        }
        Commands::Render {
            file,
            format,
            output,
        } => cmd_render(
            &file,
            format.unwrap_or(settings.render.format),
            output.as_deref(),
            settings,
        ),
        Commands::Plan { old, new } => cmd_plan(&old, &new, settings),
        Commands::Order { file } => cmd_order(&file),
        Commands::Inspect { file, resource } => cmd_inspect(&file, resource.as_deref()),
        Commands::Schema { resource_type } => cmd_schema(&resource_type),
        Commands::Types => {
            cmd_types();
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cfn-glue", &mut std::io::stdout());
            Ok(())
        }
    }
}

const STARTER_TEMPLATE: &str = r#"AWSTemplateFormatVersion: "2010-09-09"
Description: Glue ETL pipeline managed by cfn-glue

Parameters:
  ScriptBucket:
    Type: String

Resources:
  RawDatabase:
    Type: AWS::Glue::Database
    Properties:
      CatalogId: !Ref AWS::AccountId
      DatabaseInput:
        Name: raw

  NightlyJob:
    Type: AWS::Glue::Job
    Properties:
      Name: nightly-etl
      Role: !Sub "arn:aws:iam::${AWS::AccountId}:role/glue-etl"
      Command:
        Name: glueetl
        ScriptLocation: !Sub "s3://${ScriptBucket}/etl.py"
      DefaultArguments:
        "--database": !Ref RawDatabase
      GlueVersion: "4.0"
      WorkerType: G.1X
      NumberOfWorkers: 2

  NightlyTrigger:
    Type: AWS::Glue::Trigger
    Properties:
      Type: SCHEDULED
      Schedule: cron(0 2 * * ? *)
      StartOnCreation: true
      Actions:
        - JobName: !Ref NightlyJob
"#;

fn cmd_init(path: &Path) -> Result<(), String> {
    let template_path = path.join("template.yaml");
    if template_path.exists() {
        return Err(format!("{} already exists", template_path.display()));
    }
    std::fs::create_dir_all(path).map_err(|e| format!("cannot create {}: {}", path.display(), e))?;

    std::fs::write(&template_path, STARTER_TEMPLATE)
        .map_err(|e| format!("cannot write {}: {}", template_path.display(), e))?;
    println!("Initialized cfn-glue project at {}", path.display());
    println!("  Created: {}", template_path.display());

    let settings_path = path.join(SETTINGS_FILE);
    if !settings_path.exists() {
        let text = Settings::default().to_toml().map_err(|e| e.to_string())?;
        std::fs::write(&settings_path, text)
            .map_err(|e| format!("cannot write {}: {}", settings_path.display(), e))?;
        println!("  Created: {}", settings_path.display());
    }
    Ok(())
}

/// Expand each argument as a glob; a pattern matching nothing is kept as a
/// literal path so the parse reports it.
fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for pattern in patterns {
        let paths = glob::glob(pattern).map_err(|e| format!("bad pattern '{}': {}", pattern, e))?;
        let before = files.len();
        for path in paths {
            files.push(path.map_err(|e| e.to_string())?);
        }
        if files.len() == before {
            files.push(PathBuf::from(pattern));
        }
    }
    Ok(files)
}

fn cmd_validate(patterns: &[String], settings: &ValidateSettings) -> Result<(), String> {
    let files = expand_files(patterns)?;
    let mut failed = 0;

    for file in &files {
        let template = match parser::parse_template_file(file) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("  ERROR: {}", e);
                failed += 1;
                continue;
            }
        };
        let errors = parser::validate_template(&template, settings);
        if errors.is_empty() {
            println!(
                "OK: {} ({} resources, {} Glue)",
                file.display(),
                template.resources.len(),
                template.resources.values().filter(|e| e.is_glue()).count()
            );
        } else {
            println!("FAIL: {}", file.display());
            for e in &errors {
                eprintln!("  ERROR: {}", e);
            }
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} template(s) invalid", failed, files.len()));
    }
    Ok(())
}

/// Parse and validate a template file, returning errors if invalid.
fn parse_and_validate(file: &Path, settings: &Settings) -> Result<types::Template, String> {
    let template = parser::parse_template_file(file).map_err(|e| e.to_string())?;
    let errors = parser::validate_template(&template, &settings.validate);
    if errors.is_empty() {
        return Ok(template);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(format!("{}: validation failed", file.display()))
}

fn cmd_render(
    file: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<(), String> {
    let template = parse_and_validate(file, settings)?;
    let normalized = synth::normalize(&template).map_err(|e| e.to_string())?;
    match output {
        Some(path) => {
            synth::write_template(path, &normalized, format).map_err(|e| e.to_string())?;
            println!("Wrote {}", path.display());
        }
        None => {
            let text = synth::render(&normalized, format).map_err(|e| e.to_string())?;
            print!("{}", text);
        }
    }
    Ok(())
}

fn cmd_plan(old: &Path, new: &Path, settings: &Settings) -> Result<(), String> {
    // The deployed template was accepted by CloudFormation; only parse it
    let old_template = parser::parse_template_file(old).map_err(|e| e.to_string())?;
    let new_template = parse_and_validate(new, settings)?;
    let plan = planner::plan(&old_template, &new_template).map_err(|e| e.to_string())?;
    print_plan(&plan);
    Ok(())
}

/// Display a change set to stdout.
fn print_plan(plan: &planner::ChangeSet) {
    println!("Planning: {} resource(s)", plan.deployment_order.len());
    println!();

    for change in &plan.changes {
        let symbol = match change.action {
            planner::PlanAction::Create => "+",
            planner::PlanAction::Update => "~",
            planner::PlanAction::Replace => "±",
            planner::PlanAction::Delete => "-",
            planner::PlanAction::NoOp => " ",
        };
        println!("  {} {}", symbol, change.description);
    }

    println!();
    println!(
        "Plan: {} to create, {} to update, {} to replace, {} to delete, {} unchanged.",
        plan.to_create, plan.to_update, plan.to_replace, plan.to_delete, plan.unchanged
    );
}

fn cmd_order(file: &Path) -> Result<(), String> {
    let template = parser::parse_template_file(file).map_err(|e| e.to_string())?;
    let order = resolver::build_deployment_order(&template).map_err(|e| e.to_string())?;
    for (i, id) in order.iter().enumerate() {
        let resource_type = template
            .resources
            .get(id)
            .map(|e| e.resource_type.as_str())
            .unwrap_or_default();
        println!("{:>3}. {} ({})", i + 1, id, resource_type);
    }
    Ok(())
}

fn cmd_inspect(file: &Path, resource: Option<&str>) -> Result<(), String> {
    let template = parser::parse_template_file(file).map_err(|e| e.to_string())?;
    if let Some(id) = resource {
        if !template.resources.contains_key(id) {
            return Err(format!("resource '{}' not found in {}", id, file.display()));
        }
    }

    for (id, entry) in &template.resources {
        if resource.is_some_and(|r| r != id) {
            continue;
        }
        println!("{}:", id);
        println!("  Type: {}", entry.resource_type);
        println!("  Hash: {}", hasher::hash_entry(entry));
        if !entry.depends_on.is_empty() {
            println!("  DependsOn: {}", entry.depends_on.to_vec().join(", "));
        }
        if let Some(kind) = ResourceKind::from_type_name(&entry.resource_type) {
            let attributes = kind.attributes();
            if attributes.is_empty() {
                println!("  Attributes: (none)");
            } else {
                println!("  Attributes: {}", attributes.join(", "));
            }
        }
    }
    Ok(())
}

fn cmd_schema(resource_type: &str) -> Result<(), String> {
    let kind = ResourceKind::from_type_name(resource_type)
        .ok_or_else(|| format!("unsupported Glue resource type: {}", resource_type))?;
    let schema = serde_json::to_string_pretty(&kind.json_schema()).map_err(|e| e.to_string())?;
    println!("{}", schema);
    Ok(())
}

fn cmd_types() {
    for kind in ResourceKind::ALL {
        let attributes = kind.attributes();
        if attributes.is_empty() {
            println!("{}", kind);
        } else {
            println!("{} [{}]", kind, attributes.join(", "));
        }
    }
}
