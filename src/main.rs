use anyhow::{Context, Result};
use backupchan_client::config::{self, Config};
use backupchan_client::logging::{self, LoggingConfig};
use backupchan_client::models::{
    Backup, BackupRecycleAction, BackupRecycleCriteria, BackupTarget, BackupType, NewTarget,
};
use backupchan_client::Api;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backupchan")]
#[command(about = "Command-line client for a Backupchan server", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults to <config dir>/backupchan/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage backup targets
    Target {
        #[command(subcommand)]
        command: TargetCommand,
    },

    /// Upload a file or a folder as a new backup
    Upload {
        /// Target to upload into
        target_id: String,

        /// File or directory to back up (directories are sent as .tar.gz)
        path: PathBuf,

        /// Mark the backup as automatic instead of manual
        #[arg(long)]
        automatic: bool,
    },

    /// Delete or recycle individual backups
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },

    /// Inspect or empty the recycle bin
    RecycleBin {
        #[command(subcommand)]
        command: RecycleBinCommand,
    },

    /// Show the tail of the server log
    Log {
        /// Number of lines to show
        #[arg(short, long, default_value_t = 100)]
        tail: u32,
    },

    /// Show server statistics
    Stats,
}

#[derive(Subcommand)]
enum TargetCommand {
    /// List targets
    List {
        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Show a target and its backups
    Show { id: String },

    /// Create a new target
    New {
        #[arg(long)]
        name: String,

        /// single or folder
        #[arg(long = "type")]
        backup_type: BackupType,

        /// none, count or age
        #[arg(long)]
        recycle_criteria: BackupRecycleCriteria,

        /// Threshold for the recycle criteria (count, or age in days)
        #[arg(long, default_value_t = 0)]
        recycle_value: i64,

        /// delete or recycle
        #[arg(long)]
        recycle_action: BackupRecycleAction,

        /// Storage location on the server
        #[arg(long)]
        location: String,

        /// File name template for stored backups
        #[arg(long)]
        name_template: String,

        #[arg(long)]
        deduplicate: bool,

        #[arg(long)]
        alias: Option<String>,
    },

    /// Change a target (unspecified fields keep their current value)
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        recycle_criteria: Option<BackupRecycleCriteria>,

        #[arg(long)]
        recycle_value: Option<i64>,

        #[arg(long)]
        recycle_action: Option<BackupRecycleAction>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        name_template: Option<String>,

        #[arg(long)]
        deduplicate: Option<bool>,

        #[arg(long)]
        alias: Option<String>,

        /// Remove the alias
        #[arg(long, conflicts_with = "alias")]
        clear_alias: bool,
    },

    /// Delete a target
    Delete {
        id: String,

        /// Also delete the stored backup files
        #[arg(long)]
        delete_files: bool,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every backup of a target
    DeleteBackups {
        id: String,

        /// Also delete the stored backup files
        #[arg(long)]
        delete_files: bool,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum BackupCommand {
    /// Delete a backup
    Delete {
        id: String,

        /// Also delete the stored file
        #[arg(long)]
        delete_files: bool,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a backup to the recycle bin
    Recycle { id: String },

    /// Take a backup back out of the recycle bin
    Restore { id: String },
}

#[derive(Subcommand)]
enum RecycleBinCommand {
    /// List recycled backups
    List,

    /// Empty the recycle bin
    Clear {
        /// Also delete the stored files
        #[arg(long)]
        delete_files: bool,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let config: Config = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let _log_guard = logging::init_logging(&LoggingConfig::from_settings(&config.logging))?;

    let api = Api::from_config(&config).context("Failed to create API client")?;

    match cli.command {
        Commands::Target { command } => handle_target(&api, command),
        Commands::Upload {
            target_id,
            path,
            automatic,
        } => {
            let manual = !automatic;
            let id = if path.is_dir() {
                println!("Packaging and uploading folder {:?}...", path);
                api.upload_backup_folder(&target_id, &path, manual)?
            } else {
                println!("Uploading {:?}...", path);
                api.upload_backup_file(&target_id, &path, manual)?
            };
            println!("✓ Uploaded backup {}", id);
            Ok(())
        }
        Commands::Backup { command } => handle_backup(&api, command),
        Commands::RecycleBin { command } => handle_recycle_bin(&api, command),
        Commands::Log { tail } => {
            println!("{}", api.get_log(tail)?);
            Ok(())
        }
        Commands::Stats => {
            let stats = api.view_stats()?;
            println!("Server version:     {}", stats.program_version);
            println!("Targets:            {}", stats.total_targets);
            println!(
                "Backups:            {} ({})",
                stats.total_backups,
                format_size(stats.total_target_size)
            );
            println!(
                "Recycled backups:   {} ({})",
                stats.total_recycled_backups,
                format_size(stats.total_recycle_bin_size)
            );
            Ok(())
        }
    }
}

fn handle_target(api: &Api, command: TargetCommand) -> Result<()> {
    match command {
        TargetCommand::List { page } => {
            let targets = api.list_targets(page)?;
            if targets.is_empty() {
                println!("No targets on page {}", page);
            }
            for target in &targets {
                print_target_line(target);
            }
        }

        TargetCommand::Show { id } => {
            let (target, backups) = api.get_target(&id)?;
            println!("=== Target: {} ===\n", target.name);
            println!("ID:             {}", target.id);
            println!("Alias:          {}", target.alias.as_deref().unwrap_or("-"));
            println!("Type:           {}", target.backup_type);
            println!(
                "Recycling:      {} {} -> {}",
                target.recycle_criteria, target.recycle_value, target.recycle_action
            );
            println!("Location:       {}", target.location);
            println!("Name template:  {}", target.name_template);
            println!("Deduplicate:    {}", target.deduplicate);
            println!("\nBackups ({}):", backups.len());
            for backup in &backups {
                print_backup_line(backup);
            }
        }

        TargetCommand::New {
            name,
            backup_type,
            recycle_criteria,
            recycle_value,
            recycle_action,
            location,
            name_template,
            deduplicate,
            alias,
        } => {
            let id = api.new_target(&NewTarget {
                name,
                backup_type,
                recycle_criteria,
                recycle_value,
                recycle_action,
                location,
                name_template,
                deduplicate,
                alias,
            })?;
            println!("✓ Created target {}", id);
        }

        TargetCommand::Edit {
            id,
            name,
            recycle_criteria,
            recycle_value,
            recycle_action,
            location,
            name_template,
            deduplicate,
            alias,
            clear_alias,
        } => {
            let (target, _) = api.get_target(&id)?;
            let mut edit = target.to_edit();
            if let Some(name) = name {
                edit.name = name;
            }
            if let Some(criteria) = recycle_criteria {
                edit.recycle_criteria = criteria;
            }
            if let Some(value) = recycle_value {
                edit.recycle_value = value;
            }
            if let Some(action) = recycle_action {
                edit.recycle_action = action;
            }
            if let Some(location) = location {
                edit.location = location;
            }
            if let Some(template) = name_template {
                edit.name_template = template;
            }
            if let Some(deduplicate) = deduplicate {
                edit.deduplicate = deduplicate;
            }
            if clear_alias {
                edit.alias = None;
            } else if alias.is_some() {
                edit.alias = alias;
            }

            api.edit_target(&id, &edit)?;
            println!("✓ Updated target {}", id);
        }

        TargetCommand::Delete {
            id,
            delete_files,
            yes,
        } => {
            if confirm_deletion(&format!("target {}", id), delete_files, yes)? {
                api.delete_target(&id, delete_files)?;
                println!("✓ Deleted target {}", id);
            }
        }

        TargetCommand::DeleteBackups {
            id,
            delete_files,
            yes,
        } => {
            if confirm_deletion(&format!("all backups of target {}", id), delete_files, yes)? {
                api.delete_target_backups(&id, delete_files)?;
                println!("✓ Deleted all backups of target {}", id);
            }
        }
    }

    Ok(())
}

fn handle_backup(api: &Api, command: BackupCommand) -> Result<()> {
    match command {
        BackupCommand::Delete {
            id,
            delete_files,
            yes,
        } => {
            if confirm_deletion(&format!("backup {}", id), delete_files, yes)? {
                api.delete_backup(&id, delete_files)?;
                println!("✓ Deleted backup {}", id);
            }
        }
        BackupCommand::Recycle { id } => {
            api.recycle_backup(&id, true)?;
            println!("✓ Moved backup {} to the recycle bin", id);
        }
        BackupCommand::Restore { id } => {
            api.recycle_backup(&id, false)?;
            println!("✓ Restored backup {} from the recycle bin", id);
        }
    }

    Ok(())
}

fn handle_recycle_bin(api: &Api, command: RecycleBinCommand) -> Result<()> {
    match command {
        RecycleBinCommand::List => {
            let backups = api.list_recycled_backups()?;
            if backups.is_empty() {
                println!("Recycle bin is empty");
            }
            for backup in &backups {
                print_backup_line(backup);
            }
        }
        RecycleBinCommand::Clear { delete_files, yes } => {
            if confirm_deletion("everything in the recycle bin", delete_files, yes)? {
                api.clear_recycle_bin(delete_files)?;
                println!("✓ Recycle bin cleared");
            }
        }
    }

    Ok(())
}

/// Ask before anything is removed from disk on the server
fn confirm_deletion(what: &str, delete_files: bool, yes: bool) -> Result<bool> {
    if !delete_files || yes {
        return Ok(true);
    }

    let confirmed = dialoguer::Confirm::new()
        .with_prompt(format!("Permanently delete the files of {}?", what))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("Cancelled");
    }
    Ok(confirmed)
}

fn print_target_line(target: &BackupTarget) {
    let alias = target
        .alias
        .as_deref()
        .map(|a| format!(" [{}]", a))
        .unwrap_or_default();
    println!(
        "{}  {}{}  ({}, {})",
        target.id, target.name, alias, target.backup_type, target.location
    );
}

fn print_backup_line(backup: &Backup) {
    let created = backup
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let size = backup.filesize.map(format_size).unwrap_or_default();
    let kind = if backup.manual { "manual" } else { "auto" };
    let recycled = if backup.is_recycled { " (recycled)" } else { "" };

    println!(
        "  {}  {}  {}  {} {}{}",
        backup.id, created, backup.filename, kind, size, recycled
    );
}

/// Format a byte count in human-readable form
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
