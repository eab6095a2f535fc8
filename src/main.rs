mod models;
mod store;
mod tui;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use models::{ApplicationPatch, NewApplication, Status, StatusFilter};
use store::{NullNotify, StdoutNotify, Store};

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Track and manage your job applications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a job application
    Add {
        /// Company name
        company: String,

        /// Position title
        position: String,

        /// Location (city or "Remote")
        location: String,

        /// Status (applied, interview, offer, rejected, pending)
        #[arg(short, long, default_value = "applied")]
        status: String,

        /// Date applied (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Job posting URL
        #[arg(short, long)]
        url: Option<String>,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Salary or salary range
        #[arg(long)]
        salary: Option<String>,

        /// Contact person
        #[arg(long)]
        contact_name: Option<String>,

        /// Contact e-mail
        #[arg(long)]
        contact_email: Option<String>,
    },

    /// List applications
    List {
        /// Filter by status (applied, interview, offer, rejected, pending, all)
        #[arg(short, long)]
        status: Option<String>,

        /// Search company, position, and location
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Show application details
    Show {
        /// Application id (a unique prefix is enough)
        id: String,
    },

    /// Update fields of an application
    Update {
        /// Application id (a unique prefix is enough)
        id: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// New status (applied, interview, offer, rejected, pending)
        #[arg(short, long)]
        status: Option<String>,

        /// Date applied (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        salary: Option<String>,

        #[arg(long)]
        contact_name: Option<String>,

        #[arg(long)]
        contact_email: Option<String>,
    },

    /// Delete an application
    Remove {
        /// Application id (a unique prefix is enough)
        id: String,
    },

    /// Show per-status counts
    Stats,

    /// Show applications per month
    Monthly,

    /// Show recently updated applications
    Recent {
        /// Number of applications to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Export all applications as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive application board
    Board,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Add {
            company,
            position,
            location,
            status,
            date,
            url,
            notes,
            salary,
            contact_name,
            contact_email,
        } => {
            let mut store = Store::with_seed(Box::new(StdoutNotify));
            let status: Status = status.parse()?;
            let date_applied = match date {
                Some(d) => parse_date(&d)?,
                None => chrono::Local::now().date_naive(),
            };
            let added = store.add(NewApplication {
                company,
                position,
                location,
                status,
                date_applied,
                url,
                notes,
                salary,
                contact_name,
                contact_email,
            });
            println!(
                "Added '{}' at {} (id {})",
                added.position,
                added.company,
                short_id(&added.id)
            );
        }

        Commands::List { status, search } => {
            let mut store = Store::with_seed(Box::new(StdoutNotify));
            if let Some(s) = status {
                store.set_status_filter(s.parse::<StatusFilter>()?);
            }
            if let Some(q) = search {
                store.set_search_query(q);
            }
            print_list(&store);
        }

        Commands::Show { id } => {
            let store = Store::with_seed(Box::new(StdoutNotify));
            let id = resolve_id(&store, &id)?;
            let app = store
                .get(&id)
                .ok_or_else(|| anyhow!("Application {} not found", id))?;

            println!("Application {}", short_id(&app.id));
            println!("Company: {}", app.company);
            println!("Position: {}", app.position);
            println!("Location: {}", app.location);
            println!("Status: {}", app.status);
            println!("Applied: {}", app.date_applied);
            println!("Updated: {}", app.last_updated);
            if let Some(url) = &app.url {
                println!("URL: {}", url);
            }
            if let Some(salary) = &app.salary {
                println!("Salary: {}", salary);
            }
            if let Some(name) = &app.contact_name {
                println!("Contact: {}", name);
            }
            if let Some(email) = &app.contact_email {
                println!("Contact e-mail: {}", email);
            }
            if let Some(notes) = &app.notes {
                println!("\n{}", textwrap::fill(notes, 78));
            }
        }

        Commands::Update {
            id,
            company,
            position,
            location,
            status,
            date,
            url,
            notes,
            salary,
            contact_name,
            contact_email,
        } => {
            let mut store = Store::with_seed(Box::new(StdoutNotify));
            let id = resolve_id(&store, &id)?;

            let patch = ApplicationPatch {
                company,
                position,
                location,
                status: status.map(|s| s.parse()).transpose()?,
                date_applied: date.map(|d| parse_date(&d)).transpose()?,
                url,
                notes,
                salary,
                contact_name,
                contact_email,
            };

            if !store.update(&id, patch) {
                println!("Application {} not found.", short_id(&id));
            }
        }

        Commands::Remove { id } => {
            let mut store = Store::with_seed(Box::new(StdoutNotify));
            let id = resolve_id(&store, &id)?;
            if !store.remove(&id) {
                println!("Application {} not found.", short_id(&id));
            }
        }

        Commands::Stats => {
            let store = Store::with_seed(Box::new(StdoutNotify));
            println!("{:<12} {:>6}", "STATUS", "COUNT");
            println!("{}", "-".repeat(40));
            for entry in store.status_counts() {
                println!(
                    "{:<12} {:>6}  {}",
                    entry.status.to_string(),
                    entry.count,
                    "#".repeat(entry.count)
                );
            }
            println!("{}", "-".repeat(40));
            println!("{:<12} {:>6}", "total", store.len());
        }

        Commands::Monthly => {
            let store = Store::with_seed(Box::new(StdoutNotify));
            let monthly = store.monthly_applications();
            if monthly.is_empty() {
                println!("No applications yet.");
            } else {
                println!("{:<10} {:>6}", "MONTH", "COUNT");
                println!("{}", "-".repeat(40));
                for entry in monthly {
                    println!("{:<10} {:>6}  {}", entry.month, entry.count, "#".repeat(entry.count));
                }
            }
        }

        Commands::Recent { limit } => {
            let store = Store::with_seed(Box::new(StdoutNotify));
            let recent = store.recent_activity(limit);
            if recent.is_empty() {
                println!("No applications yet.");
            } else {
                println!(
                    "{:<10} {:<12} {:<24} {:<24}",
                    "UPDATED", "STATUS", "COMPANY", "POSITION"
                );
                println!("{}", "-".repeat(72));
                for app in recent {
                    println!(
                        "{:<10} {:<12} {:<24} {:<24}",
                        app.last_updated.to_string(),
                        app.status.to_string(),
                        truncate(&app.company, 22),
                        truncate(&app.position, 22)
                    );
                }
            }
        }

        Commands::Export { output } => {
            let store = Store::with_seed(Box::new(StdoutNotify));
            let json = serde_json::to_string_pretty(store.applications())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported {} application(s) to {}", store.len(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Board => {
            let mut store = Store::with_seed(Box::new(NullNotify));
            tui::run_board(&mut store)?;
        }
    }

    Ok(())
}

fn print_list(store: &Store) {
    let apps = store.filtered_view();
    if apps.is_empty() {
        println!("No applications found.");
        return;
    }
    println!(
        "{:<10} {:<12} {:<24} {:<24} {:<18} {:<10}",
        "ID", "STATUS", "COMPANY", "POSITION", "LOCATION", "APPLIED"
    );
    println!("{}", "-".repeat(100));
    for app in apps {
        println!(
            "{:<10} {:<12} {:<24} {:<24} {:<18} {:<10}",
            short_id(&app.id),
            app.status.to_string(),
            truncate(&app.company, 22),
            truncate(&app.position, 22),
            truncate(&app.location, 16),
            app.date_applied.to_string()
        );
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse::<NaiveDate>()
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Resolves a full id or a unique id prefix to a full id.
fn resolve_id(store: &Store, prefix: &str) -> Result<String> {
    if store.get(prefix).is_some() {
        return Ok(prefix.to_string());
    }
    let matches: Vec<&str> = store
        .applications()
        .iter()
        .filter(|a| a.id.starts_with(prefix))
        .map(|a| a.id.as_str())
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).to_string()),
        [] => Err(anyhow!("No application matching id '{}'", prefix)),
        _ => Err(anyhow!(
            "Id prefix '{}' is ambiguous ({} matches)",
            prefix,
            matches.len()
        )),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_iso() {
        assert_eq!(
            parse_date("2025-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_malformed() {
        assert!(parse_date("03/15/2025").is_err());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("soon").is_err());
    }

    #[test]
    fn test_resolve_id_by_unique_prefix() {
        let store = Store::with_seed(Box::new(NullNotify));
        let full = store.applications()[0].id.clone();
        let resolved = resolve_id(&store, &full[..8]).unwrap();
        assert_eq!(resolved, full);
    }

    #[test]
    fn test_resolve_id_unknown_prefix() {
        let store = Store::with_seed(Box::new(NullNotify));
        // Uuids are lowercase hex, so an uppercase prefix can never match.
        assert!(resolve_id(&store, "ZZZZ").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long company name", 10), "a very ...");
    }
}
