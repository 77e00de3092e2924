//! Pemilu - command-line client for the online voting backend

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;

use pemilu_client::config::{self, ClientConfig};
use pemilu_client::models::Voter;
use pemilu_client::services::VoterQuery;
use pemilu_client::session::{keys, FileSessionStore, SessionStore};
use pemilu_client::stats::{page_window, DashboardStats};
use pemilu_client::{ApiClient, ClientError, Services};

const DEFAULT_SESSION_FILE: &str = ".pemilu-session.json";

/// Pemilu - command-line client for the online voting backend
#[derive(Parser)]
#[command(name = "pemilu", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base URL (e.g. https://host/api)
    #[arg(long, global = true, env = "PEMILU_API_URL")]
    api_url: Option<String>,

    /// Base URL for non-API endpoints such as the CSRF cookie
    #[arg(long, global = true, env = "PEMILU_APP_URL")]
    app_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// File holding the session between invocations
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[command(subcommand)]
        role: LoginRole,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// List candidates
    Candidates,

    /// Cast a vote for a candidate
    Vote {
        /// Candidate id (kandidat_id)
        kandidat_id: u64,
    },

    /// Show whether the current voter has voted
    Status,

    /// Show the results dashboard (admin only)
    Results,

    /// List voters (admin only)
    Voters {
        /// Search by name or NIM
        #[arg(short, long, default_value = "")]
        search: String,

        /// Status filter (all, voted, not_voted)
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Rows per page
        #[arg(long, default_value_t = 50)]
        per_page: u32,
    },
}

#[derive(Subcommand)]
enum LoginRole {
    /// Log in as admin
    Admin {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "PEMILU_PASSWORD")]
        password: String,
    },
    /// Log in as super-admin
    SuperAdmin {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "PEMILU_PASSWORD")]
        password: String,
    },
    /// Log in as a voter with NIM and one-time token
    Pemilih {
        #[arg(short, long)]
        nim: String,
        #[arg(short, long)]
        token: String,
    },
}

fn load_client_config(cli: &Cli) -> pemilu_client::Result<ClientConfig> {
    let mut client_config = if let Some(ref path) = cli.config {
        config::load_config(path)?
    } else {
        let default_path = Path::new("config/pemilu.toml");
        if default_path.exists() {
            config::load_config(default_path)?
        } else {
            ClientConfig::default()
        }
    };

    config::merge_cli_args(
        &mut client_config,
        cli.api_url.clone(),
        cli.app_url.clone(),
        cli.timeout,
        cli.session_file.clone(),
    )?;

    Ok(client_config)
}

fn print_voters(voters: &[Voter]) {
    let mut builder = Builder::default();
    builder.push_record(["ID", "NIM", "Nama", "Fakultas", "Program Studi", "Token", "Status", "Waktu"]);
    for voter in voters {
        let status = if voter.sudah_memilih {
            "Sudah Memilih"
        } else {
            "Belum Memilih"
        };
        builder.push_record([
            voter.id.to_string(),
            voter.nim.clone(),
            voter.nama.clone(),
            voter.fakultas.clone(),
            voter.program_studi.clone(),
            voter.token.clone().unwrap_or_default(),
            status.to_string(),
            voter.waktu_memilih.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
}

fn print_dashboard(stats: &DashboardStats) {
    println!("\n{}", "  Hasil Pemilihan".bold());
    println!("  {}", "─".repeat(35));

    let mut builder = Builder::default();
    builder.push_record(["No", "Kandidat", "Suara", "%"]);
    for candidate in &stats.candidates {
        builder.push_record([
            candidate.nomor_urut.to_string(),
            candidate.nama.clone(),
            candidate.votes.to_string(),
            format!("{:.2}", candidate.share),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");

    println!(
        "\n  {} {}  {} {}  {} {}  {} {}",
        "Total:".bold(),
        stats.total_voters.to_string().cyan(),
        "Sudah:".bold(),
        stats.total_voted.to_string().green(),
        "Belum:".bold(),
        stats.total_not_voted.to_string().yellow(),
        "Partisipasi:".bold(),
        format!("{:.1}%", stats.participation).cyan(),
    );

    if !stats.faculties.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Fakultas", "Sudah", "Belum"]);
        for faculty in &stats.faculties {
            builder.push_record([
                faculty.fakultas.clone(),
                faculty.voted.to_string(),
                faculty.not_voted.to_string(),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        println!("\n{table}");
    }
}

fn print_json(value: &impl serde::Serialize) -> pemilu_client::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> pemilu_client::Result<()> {
    let client_config = load_client_config(&cli)?;
    let session_path = client_config
        .session_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
    let session = Arc::new(FileSessionStore::open(&session_path));
    let client = ApiClient::new(client_config, session.clone())?;
    let services = Services::new(client.clone());

    match cli.command {
        Commands::Login { role } => {
            client.prime_anti_forgery().await;
            let logged_in = match role {
                LoginRole::Admin { username, password } => {
                    let response = services.auth.login_admin(&username, &password).await?;
                    response.token.is_some()
                }
                LoginRole::SuperAdmin { username, password } => {
                    let response = services
                        .auth
                        .login_super_admin(&username, &password)
                        .await?;
                    response.token.is_some()
                }
                LoginRole::Pemilih { nim, token } => {
                    let response = services.auth.login_pemilih(&nim, &token).await?;
                    response.token.is_some()
                }
            };
            if logged_in {
                println!(
                    "  {} {}",
                    "Logged in as".bold(),
                    services
                        .auth
                        .user_role()
                        .map(|r| r.to_string())
                        .unwrap_or_default()
                        .green()
                );
            } else {
                println!("  {}", "Login response carried no token".yellow());
            }
        }

        Commands::Logout => {
            client.prime_anti_forgery().await;
            services.auth.logout().await;
            println!("  {}", "Logged out".green());
        }

        Commands::Whoami => {
            if !services.auth.is_authenticated() {
                println!("  {}", "Not logged in".yellow());
                return Ok(());
            }
            let role = services
                .auth
                .user_role()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("  {} {}", "Role:".bold(), role.green());
            if let Some(name) = session.get(keys::VOTER_NAME) {
                println!("  {} {}", "Name:".bold(), name);
            }
            if let Some(nim) = session.get(keys::VOTER_NIM) {
                println!("  {} {}", "NIM:".bold(), nim);
            }
            if let Some(user) = session.user_data() {
                print_json(&user)?;
            }
        }

        Commands::Candidates => {
            let response = services.kandidat.list().await?;
            let mut builder = Builder::default();
            builder.push_record(["ID", "No", "Nama"]);
            for kandidat in response.data.unwrap_or_default() {
                builder.push_record([
                    kandidat.kandidat_id.to_string(),
                    kandidat.nomor_urut.to_string(),
                    kandidat.nama,
                ]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            println!("{table}");
        }

        Commands::Vote { kandidat_id } => {
            client.prime_anti_forgery().await;
            let response = services.vote.vote(kandidat_id).await?;
            let message = response
                .message
                .unwrap_or_else(|| "Vote submitted".to_string());
            println!("  {}", message.green());
        }

        Commands::Status => {
            let response = services.vote.status().await?;
            print_json(&response)?;
        }

        Commands::Results => {
            let summary = services.results.summary().await?;
            let voters = services.admin.all_voters().await?;
            print_dashboard(&DashboardStats::from_summary(&summary, &voters));
        }

        Commands::Voters {
            search,
            filter,
            page,
            per_page,
        } => {
            let query = VoterQuery::new(search, filter, page, per_page);
            let response = services.admin.voters(&query).await?;
            let voters = response.data.unwrap_or_default();
            if voters.is_empty() {
                println!("  {}", "No voters found".yellow());
                return Ok(());
            }
            print_voters(&voters);
            if let Some(pagination) = response.pagination {
                let pages: Vec<String> = page_window(pagination.current_page, pagination.total_pages)
                    .into_iter()
                    .map(|p| {
                        if p == pagination.current_page {
                            format!("[{p}]").bold().to_string()
                        } else {
                            p.to_string()
                        }
                    })
                    .collect();
                println!(
                    "  Menampilkan {} - {} dari {} data   {} / {}",
                    pagination.from.unwrap_or(0),
                    pagination.to.unwrap_or(0),
                    pagination.total,
                    pages.join(" "),
                    pagination.total_pages
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "pemilu_client=debug"
    } else {
        "pemilu_client=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        match e {
            ClientError::SessionExpired { ref redirect_to } => {
                eprintln!(
                    "  {} {} (log in again; redirect to {})",
                    "Error:".red().bold(),
                    e,
                    redirect_to
                );
            }
            _ => eprintln!("  {} {}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}
