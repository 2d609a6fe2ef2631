use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cleancity_reports::config::Config;
use cleancity_reports::projection::{self, Dashboard, Role};
use cleancity_reports::prompt::{confirm_reset, resolve_agent_name, LinePrompt};
use cleancity_reports::render;
use cleancity_reports::utils::geo::format_coordinates;
use cleancity_reports::utils::image::ImageReader;
use cleancity_reports::{FileStore, NewReport, ReportError, ReportService, ReportStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cleancity", version, about = "Track municipal cleanliness reports")]
struct Cli {
    /// Directory holding the report slot
    #[arg(long, env = "CLEANCITY_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a new report (citizen)
    Submit {
        /// Short description of the problem
        #[arg(long)]
        description: String,

        #[arg(long, default_value = "Garbage")]
        category: String,

        #[arg(long, default_value = "Medium")]
        urgency: String,

        /// Free-text location
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        location: Option<String>,

        /// Latitude, used with --lon instead of --location
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Photo of the problem
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Assign an agent to a report (admin)
    Assign {
        id: String,

        /// Agent name; asked interactively when omitted
        #[arg(long)]
        agent: Option<String>,
    },
    /// Upload before/after photos and mark resolved (agent)
    Verify {
        id: String,

        #[arg(long)]
        before: Option<PathBuf>,

        #[arg(long)]
        after: Option<PathBuf>,
    },
    /// Assign placeholder agents to every unassigned report
    AutoAssign,
    /// Resolve every In Progress report
    AutoResolve,
    /// Clear all reports
    Reset {
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
    /// Show one report's details
    Show { id: String },
    /// List reports as seen by one role
    List {
        #[arg(long, value_enum, default_value_t = ViewArg::Admin)]
        view: ViewArg,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count reports per status
    Summary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ViewArg {
    Citizen,
    Admin,
    Agent,
}

impl From<ViewArg> for Role {
    fn from(v: ViewArg) -> Self {
        match v {
            ViewArg::Citizen => Role::Citizen,
            ViewArg::Admin => Role::Admin,
            ViewArg::Agent => Role::Agent,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ReportError>() {
            Some(report_err) if report_err.is_user_error() => eprintln!("{}", report_err),
            _ => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
        config.validate()?;
    }

    let store = FileStore::from_config(&config);
    tracing::debug!("Using slot {}", store.path().display());
    let service = ReportService::new(store);
    let images = ImageReader::from_config(&config);

    match cli.command {
        Command::Submit {
            description,
            category,
            urgency,
            location,
            lat,
            lon,
            image,
        } => {
            let location = match (location, lat, lon) {
                (Some(text), _, _) => Some(text),
                (None, Some(lat), Some(lon)) => Some(format_coordinates(lat, lon)?),
                _ => None,
            };
            let image = match image {
                Some(path) => Some(images.read_or_cancel(&path, ctrl_c()).await?),
                None => None,
            };
            let report = service.submit(NewReport {
                description,
                category,
                urgency,
                location,
                image,
            })?;
            let view = refresh(&service, Role::Citizen);
            println!("Report {} submitted. Use `cleancity assign {}` to assign an agent.", report.id, report.id);
            print!("{}", view);
        }
        Command::Assign { id, agent } => {
            service.find(&id)?;
            let mut prompt = LinePrompt::stdio();
            let agent = resolve_agent_name(&mut prompt, agent)?;
            let report = service.assign(&id, &agent)?;
            let view = refresh(&service, Role::Admin);
            println!(
                "Report {} assigned to {}.",
                report.id,
                report.agent.as_deref().unwrap_or_default()
            );
            print!("{}", view);
        }
        Command::Verify { id, before, after } => {
            let before = match before {
                Some(path) => Some(images.read_or_cancel(&path, ctrl_c()).await?),
                None => None,
            };
            let after = match after {
                Some(path) => Some(images.read_or_cancel(&path, ctrl_c()).await?),
                None => None,
            };
            let report = service.verify(&id, before, after)?;
            let view = refresh(&service, Role::Citizen);
            println!("Report {} marked resolved. Proof is visible in the citizen view.", report.id);
            print!("{}", view);
        }
        Command::AutoAssign => {
            let changed = service.auto_assign_all()?;
            let view = refresh(&service, Role::Agent);
            if changed == 0 {
                println!("No unassigned reports found.");
            } else {
                println!("Auto-assigned agents to {} unassigned reports.", changed);
            }
            print!("{}", view);
        }
        Command::AutoResolve => {
            let changed = service.auto_resolve_all()?;
            let view = refresh(&service, Role::Citizen);
            println!("Auto-resolved {} In Progress reports.", changed);
            print!("{}", view);
        }
        Command::Reset { yes } => {
            let mut prompt = LinePrompt::stdio();
            if !confirm_reset(&mut prompt, yes) {
                println!("Reset cancelled.");
                return Ok(());
            }
            service.reset_all()?;
            let view = refresh(&service, Role::Admin);
            println!("All reports cleared.");
            print!("{}", view);
        }
        Command::Show { id } => {
            let report = service.find(&id)?;
            print!("{}", render::render_details(&report));
        }
        Command::List { view, json } => {
            let reports = service.reports();
            let role = Role::from(view);
            let selected = projection::view_for(role, &reports);
            if json {
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                print!("{}", render::render_view(role, &selected));
            }
        }
        Command::Summary => {
            let reports = service.reports();
            print!("{}", render::render_summary(&projection::summary(&reports)));
        }
    }

    Ok(())
}

/// Recomputes every view after a mutation and renders the one `role` sees.
fn refresh<S: ReportStore>(service: &ReportService<S>, role: Role) -> String {
    let reports = service.reports();
    let dashboard = Dashboard::from_reports(&reports);
    tracing::info!(
        "Views refreshed: citizen={} admin={} agent={} received={} in_progress={} resolved={}",
        dashboard.citizen.len(),
        dashboard.admin.len(),
        dashboard.agent.len(),
        dashboard.summary.received,
        dashboard.summary.in_progress,
        dashboard.summary.resolved
    );
    let view = match role {
        Role::Citizen => &dashboard.citizen,
        Role::Admin => &dashboard.admin,
        Role::Agent => &dashboard.agent,
    };
    render::render_view(role, view)
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use cleancity_reports::MemoryStore;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_with_coordinates() {
        let cli = Cli::parse_from([
            "cleancity",
            "submit",
            "--description",
            "Overflowing bin",
            "--lat",
            "-33.86882",
            "--lon",
            "151.20930",
        ]);
        match cli.command {
            Command::Submit { lat, lon, location, .. } => {
                assert_eq!(lat, Some(-33.86882));
                assert_eq!(lon, Some(151.20930));
                assert_eq!(location, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_location_conflicts_with_coordinates() {
        let res = Cli::try_parse_from([
            "cleancity",
            "submit",
            "--description",
            "x",
            "--location",
            "Main St",
            "--lat",
            "1",
            "--lon",
            "2",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_parse_list_view() {
        let cli = Cli::parse_from(["cleancity", "list", "--view", "agent"]);
        match cli.command {
            Command::List { view, json } => {
                assert_eq!(view, ViewArg::Agent);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_refresh_renders_affected_view() {
        let service = ReportService::new(MemoryStore::new());
        assert_eq!(refresh(&service, Role::Agent), format!("{}\n", render::NO_TASKS));

        let report = service
            .submit(NewReport {
                description: "Broken bench".to_string(),
                category: "Damage".to_string(),
                urgency: "Low".to_string(),
                location: None,
                image: None,
            })
            .unwrap();
        assert!(refresh(&service, Role::Citizen).contains("Broken bench"));

        service.assign(&report.id, "  Agent-42 ").unwrap();
        assert!(refresh(&service, Role::Admin).contains("Agent-42"));
        assert!(refresh(&service, Role::Agent).contains("Broken bench"));

        service.reset_all().unwrap();
        assert_eq!(refresh(&service, Role::Admin), format!("{}\n", render::NO_REPORTS));
    }
}
