mod tui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use applog::config::{self, Config};
use applog::models::{format_date, format_salary};
use applog::validate::{validate_new_job, validate_update};
use applog::{
    FilterUpdate, HttpJobRepository, JobApplication, JobStatus, JobStore, JobUpdate, NewJobApplication,
    SortKey,
};

#[derive(Parser)]
#[command(name = "applog")]
#[command(about = "Track the jobs you applied to - companies, positions, statuses and dates")]
struct Cli {
    /// Config file (defaults to config.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the jobs API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Filter by status (Applied, Interview, Offer, Rejected)
    #[arg(long)]
    status: Option<JobStatus>,

    /// Case-insensitive match on company or position
    #[arg(short, long)]
    search: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List job applications
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Sort order (newest, oldest, company-asc, company-desc, salary-high, salary-low)
        #[arg(long, default_value = "newest")]
        sort: SortKey,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a job application
    Show {
        /// Job ID
        id: String,
    },

    /// Record a new job application
    Add {
        /// Company name
        company: String,

        /// Position title
        position: String,

        /// e.g. "San Francisco, CA" or "Remote"
        #[arg(short, long)]
        location: String,

        #[arg(long, default_value = "Applied")]
        status: JobStatus,

        /// Date applied (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// Change fields of a job application
    Update {
        /// Job ID
        id: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        status: Option<JobStatus>,

        /// Date applied (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// Delete a job application
    Delete {
        /// Job ID
        id: String,
    },

    /// Count job applications per status
    Stats {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Browse job applications interactively
    Browse {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value = "newest")]
        sort: SortKey,
    },
}

#[derive(clap::Args)]
struct DetailArgs {
    /// Yearly salary
    #[arg(long)]
    salary: Option<f64>,

    #[arg(long)]
    description: Option<String>,

    #[arg(short, long)]
    notes: Option<String>,

    #[arg(long)]
    contact_person: Option<String>,

    #[arg(long)]
    contact_email: Option<String>,

    /// Link to the posting or application
    #[arg(long)]
    url: Option<String>,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("applog={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = config::parse_base_url(url)?;
    }
    if let Some(secs) = cli.timeout {
        config.api.timeout = Duration::from_secs(secs);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // the browser owns the terminal, keep log lines off it
    let level = match cli.command {
        Commands::Browse { .. } => "off",
        _ => config.log_level.as_str(),
    };
    init_tracing(level);
    tracing::debug!(api = %config.api.base_url, "starting");

    let repository = HttpJobRepository::new(&config.api)?;
    let mut store = JobStore::new(repository);

    match cli.command {
        Commands::List { filters, sort, json } => {
            load_jobs(&mut store).await?;
            store.set_filters(FilterUpdate {
                status: Some(filters.status),
                search: Some(filters.search),
                sort: Some(sort),
            });
            let jobs = store.sorted_jobs();

            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else if jobs.is_empty() {
                println!("No jobs found.");
            } else {
                println!(
                    "{:<8} {:<10} {:<22} {:<28} {:<14} {:>8}",
                    "ID", "STATUS", "COMPANY", "POSITION", "APPLIED", "SALARY"
                );
                println!("{}", "-".repeat(95));
                for job in jobs {
                    println!(
                        "{:<8} {:<10} {:<22} {:<28} {:<14} {:>8}",
                        truncate(&job.id, 8),
                        job.status,
                        truncate(&job.company, 20),
                        truncate(&job.position, 26),
                        format_date(job.date_applied),
                        job.salary.map(format_salary).unwrap_or_else(|| "-".to_string())
                    );
                }
            }
        }

        Commands::Show { id } => {
            let job = store
                .find_job(&id)
                .await
                .with_context(|| format!("Failed to load job {}", id))?;
            print_job(&job);
        }

        Commands::Add {
            company,
            position,
            location,
            status,
            date,
            details,
        } => {
            let new_job = NewJobApplication {
                company,
                position,
                status,
                date_applied: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                location,
                salary: details.salary,
                description: details.description,
                notes: details.notes,
                contact_person: details.contact_person,
                contact_email: details.contact_email,
                application_url: details.url,
            };
            validate_new_job(&new_job)?;

            let job = store.create_job(&new_job).await.context("Failed to create job")?;
            println!("Added job {} ({} at {})", job.id, job.position, job.company);
        }

        Commands::Update {
            id,
            company,
            position,
            location,
            status,
            date,
            details,
        } => {
            let update = JobUpdate {
                company,
                position,
                status,
                date_applied: date,
                location,
                salary: details.salary,
                description: details.description,
                notes: details.notes,
                contact_person: details.contact_person,
                contact_email: details.contact_email,
                application_url: details.url,
            };
            if update.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field, e.g. --status Interview"));
            }
            validate_update(&update)?;

            let job = store
                .update_job(&id, &update)
                .await
                .with_context(|| format!("Failed to update job {}", id))?;
            println!("Updated job {}", job.id);
            print_job(&job);
        }

        Commands::Delete { id } => {
            store
                .delete_job(&id)
                .await
                .with_context(|| format!("Failed to delete job {}", id))?;
            println!("Deleted job {}", id);
        }

        Commands::Stats { filters, json } => {
            load_jobs(&mut store).await?;
            store.set_filters(FilterUpdate {
                status: Some(filters.status),
                search: Some(filters.search),
                sort: None,
            });
            let counts = store.job_counts();

            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                println!("{:<12} {:>6}", "STATUS", "COUNT");
                println!("{}", "-".repeat(19));
                for status in JobStatus::ALL {
                    println!("{:<12} {:>6}", status, counts.get(status));
                }
                println!("{}", "-".repeat(19));
                println!("{:<12} {:>6}", "Total", counts.total);
            }
        }

        Commands::Browse { filters, sort } => {
            store.set_filters(FilterUpdate {
                status: Some(filters.status),
                search: Some(filters.search),
                sort: Some(sort),
            });
            tui::run_browse(store, config.search_debounce).await?;
        }
    }

    Ok(())
}

async fn load_jobs(store: &mut JobStore<HttpJobRepository>) -> Result<()> {
    store.fetch_jobs().await;
    match store.error() {
        Some(err) => Err(anyhow!(
            "Failed to load jobs from {}: {}",
            store.repository().base_url(),
            err
        )),
        None => Ok(()),
    }
}

fn print_job(job: &JobApplication) {
    println!("Job {}", job.id);
    println!("Company: {}", job.company);
    println!("Position: {}", job.position);
    println!("Status: {}", job.status);
    println!("Applied: {}", format_date(job.date_applied));
    println!("Location: {}", job.location);
    if let Some(salary) = job.salary {
        println!("Salary: {}", format_salary(salary));
    }
    if let Some(url) = &job.application_url {
        println!("URL: {}", url);
    }
    match (&job.contact_person, &job.contact_email) {
        (Some(person), Some(email)) => println!("Contact: {} <{}>", person, email),
        (Some(person), None) => println!("Contact: {}", person),
        (None, Some(email)) => println!("Contact: {}", email),
        (None, None) => {}
    }
    if let Some(description) = &job.description {
        println!("\n--- Description ---\n{}", textwrap::fill(description, 80));
    }
    if let Some(notes) = &job.notes {
        println!("\n--- Notes ---\n{}", textwrap::fill(notes, 80));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max.saturating_sub(3)).collect::<String>())
    }
}
