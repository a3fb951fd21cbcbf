use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use lifecyclectl::aws::{self, load_sdk_config, verify_caller_identity};
use lifecyclectl::config::{init_config, Config};
use lifecyclectl::error::LifecyclectlError;
use lifecyclectl::exit_codes::{codes, exit_code_for_error};
use lifecyclectl::list::{list_instances, ListOptions};
use lifecyclectl::sweep::{run_sweep, SweepOptions};
use lifecyclectl::utils::parse_tag_specs;
use lifecyclectl::validation::{validate_instance_id, validate_threshold_hours};

#[derive(Parser)]
#[command(name = "lifecyclectl")]
#[command(
    about = "EC2 instance lifecycle sweeper",
    long_about = "lifecyclectl finds EC2 instances by tag, checks each instance's root\nvolume age against a threshold, and stops the ones that have outlived it.\n\nA sweep is one pass per invocation: no scheduler, no state between runs.\nPair with cron or a CloudWatch scheduled event (see the bundled Lambda\nbinary) for recurring cleanup."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Stop tagged instances whose root volume is past the age threshold
    ///
    /// Runs one pass: find instances matching the tag filter, check each
    /// root volume's creation time, stop the expired ones.
    ///
    /// Examples:
    ///   lifecyclectl sweep
    ///   lifecyclectl sweep --tag env=dev --tag lifecycle=temporary
    ///   lifecyclectl sweep --threshold-hours 48 --dry-run
    Sweep {
        /// Tag filter as key=value (repeatable, replaces the configured filter)
        #[arg(long, value_name = "KEY=VALUE")]
        tag: Vec<String>,

        /// Root volume age threshold in hours (default from config, 24)
        #[arg(long, value_name = "HOURS")]
        threshold_hours: Option<i64>,

        /// Report what would be stopped without stopping anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List tagged instances with their root volume ages
    ///
    /// Examples:
    ///   lifecyclectl list
    ///   lifecyclectl list --format table
    List {
        /// Tag filter as key=value (repeatable, replaces the configured filter)
        #[arg(long, value_name = "KEY=VALUE")]
        tag: Vec<String>,

        /// Display format (compact, table)
        #[arg(long, default_value = "compact")]
        format: String,
    },

    /// Stop specific instances by ID
    ///
    /// Examples:
    ///   lifecyclectl stop i-1234567890abcdef0
    Stop {
        /// EC2 instance IDs
        #[arg(value_name = "INSTANCE_ID", required = true)]
        instance_ids: Vec<String>,
    },

    /// Terminate specific instances (disables termination protection first)
    ///
    /// Examples:
    ///   lifecyclectl terminate i-1234567890abcdef0 --yes
    #[command(alias = "rm")]
    Terminate {
        /// EC2 instance IDs
        #[arg(value_name = "INSTANCE_ID", required = true)]
        instance_ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".lifecyclectl.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {:#}", err);
        let code = err
            .downcast_ref::<LifecyclectlError>()
            .map(exit_code_for_error)
            .unwrap_or(codes::SYSTEM_ERROR);
        std::process::exit(code);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Suppress INFO by default, only show warnings and errors
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    // Init needs no AWS clients
    if let Commands::Init { output } = &cli.command {
        return init_config(output);
    }

    let sdk_config = load_sdk_config(&config.aws).await;
    verify_caller_identity(&sdk_config).await?;
    let client = aws_sdk_ec2::Client::new(&sdk_config);

    match cli.command {
        Commands::Sweep {
            tag,
            threshold_hours,
            dry_run,
            yes,
        } => {
            let tags = if tag.is_empty() {
                config.sweep.tags.clone()
            } else {
                parse_tag_specs(&tag)?
            };
            let threshold_hours =
                threshold_hours.unwrap_or(config.sweep.max_root_volume_age_hours);
            validate_threshold_hours(threshold_hours)?;

            let options = SweepOptions {
                tags,
                threshold_hours,
                dry_run: dry_run || config.sweep.dry_run,
                assume_yes: yes,
            };
            run_sweep(&client, &options, &cli.output).await?;
        }
        Commands::List { tag, format } => {
            let tags = if tag.is_empty() {
                config.sweep.tags.clone()
            } else {
                parse_tag_specs(&tag)?
            };
            let options = ListOptions {
                tags,
                format,
                threshold_hours: config.sweep.max_root_volume_age_hours,
            };
            list_instances(&client, &options, &cli.output).await?;
        }
        Commands::Stop { instance_ids } => {
            for instance_id in &instance_ids {
                validate_instance_id(instance_id)?;
            }
            for instance_id in &instance_ids {
                let instance = aws::get_instance(&client, instance_id).await?;
                if instance.state == "stopped" || instance.state == "stopping" {
                    println!("Instance {} is already stopped or stopping", instance_id);
                    continue;
                }
                aws::stop_instance(&client, instance_id).await?;
                println!("Instance stop requested: {}", instance_id);
            }
        }
        Commands::Terminate { instance_ids, yes } => {
            for instance_id in &instance_ids {
                validate_instance_id(instance_id)?;
            }
            if !yes {
                use std::io::{self, Write};
                print!(
                    "Terminate {} instance(s)? This cannot be undone. (y/N): ",
                    instance_ids.len()
                );
                io::stdout().flush()?;
                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                if input.trim().to_lowercase() != "y" {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            for instance_id in &instance_ids {
                let instance = aws::get_instance(&client, instance_id).await?;
                if instance.state == "terminated" {
                    println!("Instance {} is already terminated", instance_id);
                    continue;
                }
                aws::terminate_instance(&client, instance_id).await?;
                println!("Instance termination requested: {}", instance_id);
            }
        }
        Commands::Init { .. } => unreachable!("handled before client construction"),
    }

    Ok(())
}
