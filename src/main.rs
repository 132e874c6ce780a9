use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod api;
mod commands;
mod config;
mod due;
mod editors;
mod error;
mod form;
mod hierarchy;
mod import;
mod models;
mod report;
mod store;
mod users;

use crate::models::{ResourceType, Role, UserStatus};

#[derive(Parser)]
#[command(name = "openlearn-admin")]
#[command(about = "Admin client for the OpenLearn content hierarchy", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: config::Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage cohorts
    Cohort {
        #[command(subcommand)]
        action: CohortAction,
    },
    /// Manage leagues
    League {
        #[command(subcommand)]
        action: LeagueAction,
    },
    /// Manage specializations and their league order
    Specialization {
        #[command(subcommand)]
        action: SpecializationAction,
    },
    /// Manage weeks within a league
    Week {
        #[command(subcommand)]
        action: WeekAction,
    },
    /// Manage sections within a week
    Section {
        #[command(subcommand)]
        action: SectionAction,
    },
    /// Manage learning resources within a section
    Resource {
        #[command(subcommand)]
        action: ResourceAction,
    },
    /// Manage league assignments
    Assignment {
        #[command(subcommand)]
        action: AssignmentAction,
    },
    /// Review and moderate users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Generate a markdown content report
    Report {
        #[arg(long)]
        cohort: Option<String>,
        /// Include member counts (requires admin access)
        #[arg(long)]
        with_members: bool,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Create resources from a CSV file
    ImportResources {
        #[arg(long)]
        csv: PathBuf,
        /// Section for rows that leave section_id blank
        #[arg(long)]
        section: Option<String>,
    },
}

#[derive(Args)]
struct DeleteArgs {
    id: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
}

#[derive(Subcommand)]
enum CohortAction {
    List,
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        inactive: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum LeagueAction {
    List {
        #[arg(long)]
        cohort: Option<String>,
    },
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        cohort: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cohort: Option<String>,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum SpecializationAction {
    List {
        #[arg(long)]
        cohort: Option<String>,
    },
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        cohort: String,
        /// League ids in offering order
        #[arg(long = "league")]
        leagues: Vec<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "add-league")]
        add: Vec<String>,
        #[arg(long = "remove-league")]
        remove: Vec<String>,
        #[arg(long)]
        move_up: Vec<String>,
        #[arg(long)]
        move_down: Vec<String>,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum WeekAction {
    List {
        #[arg(long)]
        league: Option<String>,
    },
    Create {
        #[arg(long)]
        league: Option<String>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "1")]
        order: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        league: Option<String>,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum SectionAction {
    List {
        #[arg(long)]
        league: Option<String>,
        #[arg(long)]
        week: Option<String>,
    },
    Create {
        #[arg(long)]
        week: Option<String>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "1")]
        order: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        week: Option<String>,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
enum ResourceAction {
    List {
        #[arg(long)]
        league: Option<String>,
        #[arg(long)]
        week: Option<String>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long = "type", value_enum)]
        kind: Option<ResourceType>,
        #[arg(long, default_value = "")]
        search: String,
        /// Print only the header of these section groups
        #[arg(long)]
        collapse: Vec<String>,
    },
    Create {
        #[arg(long)]
        section: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long = "type", value_enum, default_value_t = ResourceType::Video)]
        kind: ResourceType,
        #[arg(long, default_value = "1")]
        order: String,
    },
    Update {
        id: String,
        /// Section the resource currently belongs to
        #[arg(long)]
        section: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long = "type", value_enum)]
        kind: Option<ResourceType>,
        #[arg(long)]
        order: Option<String>,
    },
    Delete {
        id: String,
        #[arg(long)]
        section: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AssignmentAction {
    List {
        #[arg(long)]
        league: String,
        /// Also list submissions
        #[arg(long)]
        submissions: bool,
    },
    Create {
        #[arg(long, default_value = "")]
        league: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD or an RFC 3339 timestamp
        #[arg(long, default_value = "")]
        due: String,
    },
    Update {
        id: String,
        #[arg(long)]
        league: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    Delete {
        id: String,
        #[arg(long)]
        league: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    List {
        #[arg(long, value_enum)]
        role: Option<Role>,
        #[arg(long, value_enum)]
        status: Option<UserStatus>,
        #[arg(long, default_value = "")]
        search: String,
    },
    Approve {
        id: String,
    },
    Role {
        id: String,
        #[arg(value_enum)]
        role: Role,
    },
    Status {
        id: String,
        #[arg(value_enum)]
        status: UserStatus,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let context = cli.settings.request_context()?;
    let transport = api::HttpTransport::new(context)?;
    let mut page = store::AdminPage::new(api::ApiClient::new(transport));

    let result = commands::run(&mut page, cli.command).await;
    if result.is_err() {
        if let Some(banner) = page.error() {
            eprintln!("Error: {banner}");
            std::process::exit(1);
        }
    }
    result
}
