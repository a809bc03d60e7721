use std::fs;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use meridian_catalog::{ChainOptions, standard_chain};
use meridian_core::armid;
use meridian_core::context::Context;
use meridian_core::pattern::Pattern;

mod example;

#[derive(Parser)]
#[command(name = "meridian")]
#[command(about = "Generate test configuration for Azure control-plane APIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate configuration from an API example
    Generate {
        /// Path to the example JSON file
        example: PathBuf,

        /// API path template the example belongs to
        #[arg(long)]
        path: Option<String>,

        /// Explicit target resource identifier (overrides --path)
        #[arg(long)]
        id: Option<String>,

        /// Directory the generated configuration is written to
        #[arg(long, default_value = "testing")]
        output_dir: PathBuf,

        /// Directory scanned for already-declared configuration
        #[arg(long)]
        working_dir: Option<PathBuf>,

        /// Reuse-only resolution: skip the synthesized fallbacks
        #[arg(long)]
        offline: bool,
    },
    /// Classify a resource identifier
    Id {
        /// The identifier to classify
        id: String,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            example,
            path,
            id,
            output_dir,
            working_dir,
            offline,
        } => run_generate(
            &example,
            path.as_deref(),
            id.as_deref(),
            &output_dir,
            working_dir,
            offline,
        ),
        Commands::Id { id } => run_id(&id),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "meridian", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_generate(
    example_path: &Path,
    path_template: Option<&str>,
    id_override: Option<&str>,
    output_dir: &Path,
    working_dir: Option<PathBuf>,
    offline: bool,
) -> Result<(), String> {
    let text = fs::read_to_string(example_path)
        .map_err(|e| format!("reading {}: {}", example_path.display(), e))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| format!("parsing {}: {}", example_path.display(), e))?;

    let target = example::target_from_example(&json, path_template, id_override)
        .map_err(|e| e.to_string())?;
    println!(
        "{} {} @ {}",
        "Target:".cyan().bold(),
        target.id,
        target.api_version
    );

    let definition = example::definition_from_target(&target);
    let chain = standard_chain(ChainOptions {
        pool: Vec::new(),
        working_dir,
        reuse_only: offline,
    });
    let mut ctx = Context::new(chain).map_err(|e| e.to_string())?;
    let reference = ctx.add_definition(&definition).map_err(|e| e.to_string())?;

    fs::create_dir_all(output_dir)
        .map_err(|e| format!("creating {}: {}", output_dir.display(), e))?;
    let out_file = output_dir.join("main.tf");
    fs::write(&out_file, ctx.render())
        .map_err(|e| format!("writing {}: {}", out_file.display(), e))?;

    println!(
        "{} {} ({})",
        "Generated".green().bold(),
        out_file.display(),
        reference
    );
    Ok(())
}

fn run_id(id: &str) -> Result<(), String> {
    if armid::is_action_id(id) {
        let action = id.rsplit('/').next().unwrap_or("");
        let target = armid::parent_id(id).unwrap_or_else(|| "/".to_string());
        println!("{} action identifier", "Kind:".cyan().bold());
        println!("{} {}", "Action:".cyan().bold(), action);
        println!("{} {}", "Target:".cyan().bold(), target);
        return Ok(());
    }
    let Some(pattern) = Pattern::from_id(id) else {
        return Err(format!("\"{}\" is not a resource identifier", id));
    };
    println!("{} resource identifier", "Kind:".cyan().bold());
    println!("{} {}", "Type:".cyan().bold(), pattern.resource_type);
    println!("{} {}", "Scope:".cyan().bold(), pattern.scope);
    println!(
        "{} {}",
        "Parent:".cyan().bold(),
        armid::parent_id(id).unwrap_or_else(|| "(none)".to_string())
    );
    println!("{} {}", "Pattern:".cyan().bold(), pattern.key());
    Ok(())
}
