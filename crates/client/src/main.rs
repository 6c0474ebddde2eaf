use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_client::config::ClientConfig;
use folio_client::error::ClientError;
use folio_client::form::ProjectForm;
use folio_client::guest::FileGuestFlag;
use folio_client::orchestrator::{ProjectOrchestrator, SubmitOutcome};
use folio_client::session::Session;
use folio_core::backend::Credentials;
use folio_core::project::{Project, ProjectCategory, ProjectField, ProjectStatus};
use folio_core::search::{SortField, ViewMode};
use folio_core::types::ProjectId;
use folio_core::upload::{content_type_for_path, ImageFile};
use folio_core::visibility::ListingScope;
use folio_remote::{BackendClient, EdgeUploader, HostedAuth, RestProjectStore};

#[derive(Parser)]
#[command(name = "folio", about = "Browse and manage a project portfolio")]
struct Cli {
    /// Account email for owner actions.
    #[arg(long, env = "FOLIO_EMAIL", global = true)]
    email: Option<String>,

    /// Account password for owner actions.
    #[arg(long, env = "FOLIO_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List projects visible to the current session.
    List {
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long, default_value = "title")]
        sort: SortField,
        #[arg(long)]
        desc: bool,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        table: bool,
    },
    /// Show one project.
    Show { id: ProjectId },
    /// Enter or leave guest mode.
    Guest {
        #[arg(value_enum)]
        action: GuestAction,
    },
    /// Print the current role and display name.
    Whoami,
    /// Create a project.
    Add(FieldArgs),
    /// Edit a project.
    Edit {
        id: ProjectId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a project.
    Delete { id: ProjectId },
    /// Upload a preview image, optionally attaching it to a project.
    Upload {
        path: PathBuf,
        #[arg(long)]
        project: Option<ProjectId>,
    },
    /// Email a passwordless sign-in link.
    MagicLink { email: String },
    /// Register an account using the password from FOLIO_PASSWORD.
    SignUp { email: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Public,
    Private,
    All,
}

impl From<ScopeArg> for ListingScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Public => ListingScope::Public,
            ScopeArg::Private => ListingScope::Private,
            ScopeArg::All => ListingScope::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GuestAction {
    Enter,
    Exit,
}

#[derive(Args, Default)]
struct FieldArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    link: Option<String>,
    #[arg(long)]
    github: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    /// "Not Started", "In Progress" or "Completed".
    #[arg(long)]
    status: Option<String>,
    /// Category label; an empty string clears it.
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    featured: Option<bool>,
    #[arg(long)]
    private: Option<bool>,
}

impl FieldArgs {
    fn apply(self, form: &mut ProjectForm) -> anyhow::Result<()> {
        let text = [
            (ProjectField::Title, self.title),
            (ProjectField::Description, self.description),
            (ProjectField::Link, self.link),
            (ProjectField::Github, self.github),
            (ProjectField::PreviewImageUrl, self.image_url),
        ];
        for (field, value) in text {
            if let Some(value) = value {
                form.set_text(field, value)?;
            }
        }
        if let Some(status) = self.status {
            form.set_status(ProjectStatus::from_label(&status)?);
        }
        if let Some(category) = self.category {
            let category = if category.trim().is_empty() {
                None
            } else {
                Some(ProjectCategory::from_label(&category)?)
            };
            form.set_category(category);
        }
        if let Some(year) = self.year {
            form.set_year(year);
        }
        if let Some(featured) = self.featured {
            form.set_featured(featured);
        }
        if let Some(private) = self.private {
            form.set_private(private);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_client=info,folio_remote=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    let client = BackendClient::new(config.remote.clone());
    let auth = Arc::new(HostedAuth::new(client.clone()));
    let guest_store = Arc::new(FileGuestFlag::new(&config.state_dir));

    let session = Session::start(auth, guest_store, config.owner_policy()).await?;
    let mut app = ProjectOrchestrator::new(
        session,
        Arc::new(RestProjectStore::new(client.clone())),
        Arc::new(EdgeUploader::new(client)),
    );

    // Sign in through the session so a stored guest flag is cleared.
    if let (Some(email), Some(password)) = (cli.email.as_deref(), cli.password.as_deref()) {
        if needs_sign_in(&cli.command) {
            let credentials = Credentials {
                email: email.to_string(),
                password: password.to_string(),
            };
            app.sign_in(&credentials).await.context("Sign-in failed")?;
        }
    }

    let result = run(&mut app, cli).await;
    if let Err(e) = &result {
        if let Some(client_error) = e.downcast_ref::<ClientError>() {
            let (code, message) = client_error.classify();
            bail!("{code}: {message}");
        }
    }
    result
}

fn needs_sign_in(command: &Command) -> bool {
    !matches!(
        command,
        Command::Guest { .. } | Command::MagicLink { .. } | Command::SignUp { .. }
    )
}

async fn run(app: &mut ProjectOrchestrator, cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::List {
            scope,
            query,
            sort,
            desc,
            featured,
            table,
        } => {
            app.set_scope(scope.map(Into::into));
            app.set_featured_only(featured);
            app.load().await?;

            if let Some(query) = query {
                app.set_query(query);
            }
            if app.query().sort.field != sort {
                app.select_sort(sort);
            }
            if desc {
                app.select_sort(sort);
            }
            if table {
                app.toggle_view();
            }
            render(&app.visible_projects(), app.query().view);
        }
        Command::Show { id } => {
            app.load().await?;
            let form = app.open_project(id)?;
            if let Some(project) = form.project() {
                print_card(project);
                println!("mode: {}", form.mode().name());
            }
        }
        Command::Guest { action } => {
            let role = match action {
                GuestAction::Enter => app.enter_guest().await?,
                GuestAction::Exit => app.exit_guest().await?,
            };
            println!("role: {role}");
        }
        Command::Whoami => {
            let session = app.session();
            println!("{} ({})", session.display_name(), session.role());
        }
        Command::Add(fields) => {
            let mut form = app.open_add()?;
            fields.apply(&mut form)?;
            report(app.submit(&mut form).await?)?;
        }
        Command::Edit { id, fields } => {
            app.load().await?;
            let mut form = app.open_project(id)?;
            fields.apply(&mut form)?;
            report(app.submit(&mut form).await?)?;
        }
        Command::Delete { id } => {
            app.load().await?;
            let mut form = app.open_delete(id)?;
            report(app.submit(&mut form).await?)?;
        }
        Command::Upload { path, project } => {
            let content_type = content_type_for_path(&path).unwrap_or("application/octet-stream");
            let bytes = std::fs::read(&path).with_context(|| format!("Reading {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image")
                .to_string();
            let image = ImageFile::new(file_name, content_type, bytes);

            let mut form = match project {
                Some(id) => {
                    app.load().await?;
                    app.open_project(id)?
                }
                None => app.open_add()?,
            };
            let url = app.upload_image(&mut form, &image).await?;
            println!("{url}");
            if project.is_some() {
                report(app.submit(&mut form).await?)?;
            }
        }
        Command::MagicLink { email } => {
            app.session().send_magic_link(&email).await?;
            println!("Check {email} for a sign-in link.");
        }
        Command::SignUp { email } => {
            let Some(password) = cli.password else {
                bail!("FOLIO_PASSWORD must be set to sign up");
            };
            let credentials = Credentials { email, password };
            match app.sign_up(&credentials).await? {
                Some(role) => println!("Signed up and signed in as {role}"),
                None => println!("Check your email to confirm the account."),
            }
        }
    }

    if let Some(message) = app.last_error() {
        eprintln!("warning: {message}");
    }
    Ok(())
}

fn report(outcome: SubmitOutcome) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::Saved(project) => {
            println!("Saved {}", project.id);
            Ok(())
        }
        SubmitOutcome::Deleted(id) => {
            println!("Deleted {id}");
            Ok(())
        }
        SubmitOutcome::Blocked(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
            bail!("Project not saved")
        }
    }
}

fn render(projects: &[&Project], view: ViewMode) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }
    match view {
        ViewMode::Grid => {
            for project in projects {
                print_card(project);
                println!();
            }
        }
        ViewMode::List => {
            println!("{:<36}  {:<32}  {:<12}  {:<4}  STATUS", "ID", "TITLE", "CATEGORY", "YEAR");
            for p in projects {
                println!(
                    "{:<36}  {:<32}  {:<12}  {:<4}  {}",
                    p.id,
                    truncate(&p.title, 32),
                    p.category.map(|c| c.label()).unwrap_or("-"),
                    p.year,
                    p.status.label()
                );
            }
        }
    }
}

fn print_card(project: &Project) {
    let mut badges = Vec::new();
    if project.featured {
        badges.push("featured");
    }
    if project.private {
        badges.push("private");
    }
    println!("{} ({})", project.title, project.year);
    println!("  id:       {}", project.id);
    println!("  status:   {}", project.status.label());
    if let Some(category) = project.category {
        println!("  category: {}", category.label());
    }
    if !badges.is_empty() {
        println!("  flags:    {}", badges.join(", "));
    }
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }
    for (label, value) in [
        ("link", project.link()),
        ("github", project.github()),
        ("image", project.preview_image_url()),
    ] {
        if let Some(value) = value {
            println!("  {label:<8}  {value}");
        }
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let cut: String = value.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
