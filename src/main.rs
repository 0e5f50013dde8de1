mod db;
mod error;
mod interactive;
mod models;
mod table;

use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use db::{ApplicationUpdate, Database, SortKey};
use models::{Status, parse_date};

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Track job applications - add, list, and update them from the command line")]
struct Cli {
    /// Database file (defaults to the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Add an application
    Add {
        /// Company name
        company: String,

        /// Position title
        position: String,

        /// Date applied (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Initial status (applied, interviewing, offer, rejected, withdrawn)
        #[arg(short, long, default_value = "applied")]
        status: String,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List applications
    List {
        /// Filter by status (applied, interviewing, offer, rejected, withdrawn)
        #[arg(short, long)]
        status: Option<String>,

        /// Sort order (id, date, company)
        #[arg(long, default_value = "id")]
        sort: String,

        /// Emit records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show application details
    Show {
        /// Application ID
        id: i64,
    },

    /// Update an application's status
    Status {
        /// Application ID
        id: i64,

        /// New status (applied, interviewing, offer, rejected, withdrawn)
        new_status: String,
    },

    /// Edit an application's fields
    Edit {
        /// Application ID
        id: i64,

        /// New company name
        #[arg(long)]
        company: Option<String>,

        /// New position title
        #[arg(long)]
        position: Option<String>,

        /// New date applied (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New notes (empty string clears them)
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: i64,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Search applications by company name
    Search {
        /// Company name fragment (case-insensitive)
        fragment: String,
    },

    /// Show application counts by status
    Stats,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let db = match &cli.db {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };

    let Some(command) = cli.command else {
        // No subcommand: interactive session. Schema setup failing here is
        // the one fatal startup error.
        db.init()?;
        return interactive::run(&db);
    };

    match command {
        Commands::Init => {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
        }

        Commands::Add {
            company,
            position,
            date,
            status,
            notes,
        } => {
            db.ensure_initialized()?;
            let status: Status = status.parse()?;
            let date_applied = match date {
                Some(raw) => parse_date(&raw)?,
                None => Local::now().date_naive(),
            };
            let id = db.add_application(
                &company,
                &position,
                date_applied,
                status,
                notes.as_deref(),
            )?;
            println!("Added application #{id}");
        }

        Commands::List { status, sort, json } => {
            db.ensure_initialized()?;
            let status = match status {
                Some(raw) => Some(raw.parse::<Status>()?),
                None => None,
            };
            let sort: SortKey = sort.parse()?;
            let apps = db.list_applications(status, sort)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&apps)?);
            } else if apps.is_empty() {
                println!("No applications found.");
            } else {
                print!("{}", table::render_table(&apps));
            }
        }

        Commands::Show { id } => {
            db.ensure_initialized()?;
            match db.get_application(id)? {
                Some(app) => {
                    println!("Application #{}", app.id);
                    println!("Company: {}", app.company);
                    println!("Position: {}", app.position);
                    println!("Status: {}", app.status);
                    println!("Applied: {}", app.date_applied);
                    if let Some(notes) = &app.notes {
                        println!("Notes: {}", notes);
                    }
                    println!("Created: {}", app.created_at);
                    println!("Updated: {}", app.updated_at);
                }
                None => {
                    println!("Application #{id} not found.");
                }
            }
        }

        Commands::Status { id, new_status } => {
            db.ensure_initialized()?;
            let status: Status = new_status.parse()?;
            db.update_status(id, status)?;
            println!("Application #{id} status updated to {status}.");
        }

        Commands::Edit {
            id,
            company,
            position,
            date,
            notes,
        } => {
            db.ensure_initialized()?;
            let update = ApplicationUpdate {
                company,
                position,
                date_applied: match date {
                    Some(raw) => Some(parse_date(&raw)?),
                    None => None,
                },
                notes,
            };
            if update.is_empty() {
                bail!("nothing to edit; pass at least one of --company, --position, --date, --notes");
            }
            db.update_application(id, &update)?;
            println!("Application #{id} updated.");
        }

        Commands::Delete { id, yes } => {
            db.ensure_initialized()?;
            if !yes {
                bail!("refusing to delete application #{id} without --yes");
            }
            db.delete_application(id)?;
            println!("Deleted application #{id}.");
        }

        Commands::Search { fragment } => {
            db.ensure_initialized()?;
            let apps = db.search_by_company(&fragment)?;
            if apps.is_empty() {
                println!("No applications matching '{fragment}'.");
            } else {
                print!("{}", table::render_table(&apps));
            }
        }

        Commands::Stats => {
            db.ensure_initialized()?;
            let stats = db.statistics()?;
            print!("{}", table::render_stats(&stats));
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("apptrack=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
