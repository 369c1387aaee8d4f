use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hostpanel_auth::{
    AuthApi, AuthState, GuardOutcome, LoginRequest, MockAuthApi, Notifier, RecordingNavigator,
    RegisterRequest, Role, RouteGuard, SessionManager, TokenStore,
};
use hostpanel_config::load as load_config;
use hostpanel_runtime::{telemetry, DashboardServices};
use tracing::info;

#[derive(Parser)]
#[command(name = "hostpanel")]
#[command(about = "HostPanel dashboard session client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore the stored session and show who is logged in
    Whoami,
    /// Log in; without --remember the session ends with this process
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Create an account (verify the email before logging in)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the stored session
    Logout,
    /// Check whether the current session may open a dashboard page
    Visit { path: String },
    /// Walk through a login/logout cycle against the built-in mock API
    Demo,
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("✔ {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("✖ {message}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let cli = Cli::parse();
    let navigator = Arc::new(RecordingNavigator::new());

    let config = load_config().context("failed to load configuration")?;
    let services =
        DashboardServices::initialise(config, navigator.clone(), Arc::new(ConsoleNotifier))
            .context("failed to initialise dashboard services")?;
    let session = &services.session;

    match cli.command {
        Commands::Whoami => {
            let state = session.bootstrap().await;
            println!("{state}");
        }
        Commands::Login {
            email,
            password,
            remember,
        } => {
            session
                .login(&LoginRequest::new(email, password, remember))
                .await?;
            if !remember {
                println!("session is not remembered and ends when this command exits");
            }
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            session
                .register(&RegisterRequest::new(name, email, password, confirm_password))
                .await?;
        }
        Commands::Logout => {
            session.bootstrap().await;
            session.logout().await;
        }
        Commands::Visit { path } => {
            session.bootstrap().await;
            println!("{path}: {}", describe(session, &path));
        }
        Commands::Demo => return run_demo(navigator).await,
    }

    if let Some(route) = navigator.current() {
        println!("→ {route}");
    }

    Ok(())
}

fn describe<A: AuthApi>(session: &SessionManager<A>, path: &str) -> String {
    match RouteGuard::for_path(path).map(|guard| session.guard(guard)) {
        None => "public page".to_string(),
        Some(GuardOutcome::Render) => "allowed".to_string(),
        Some(GuardOutcome::Pending) => "waiting for session check".to_string(),
        Some(GuardOutcome::Redirect(route)) => format!("redirected to {route}"),
    }
}

async fn run_demo(navigator: Arc<RecordingNavigator>) -> anyhow::Result<()> {
    let api = MockAuthApi::new();
    api.seed_account("Casey Customer", "customer@hostpanel.test", "customer1", Role::User)
        .await;
    api.seed_account("Avery Admin", "admin@hostpanel.test", "admin123", Role::Admin)
        .await;

    let session = SessionManager::new(
        api,
        TokenStore::in_memory(),
        navigator.clone(),
        Arc::new(ConsoleNotifier),
    );

    let state = session.bootstrap().await;
    println!("after bootstrap: {state}");
    println!("/admin/customers: {}", describe(&session, "/admin/customers"));

    let user = session
        .login(&LoginRequest::new("customer@hostpanel.test", "customer1", true))
        .await?;
    info!(user = %user.id, "demo customer logged in");
    print_route("customer login", &navigator);
    println!("/dashboard/billing: {}", describe(&session, "/dashboard/billing"));
    println!("/admin/customers: {}", describe(&session, "/admin/customers"));

    // a wrong password leaves the customer logged in
    let rejected = session
        .login(&LoginRequest::new("customer@hostpanel.test", "guess", false))
        .await
        .is_err();
    println!("wrong password rejected: {rejected}; state: {}", session.state());

    session.logout().await;
    print_route("logout", &navigator);

    session
        .login(&LoginRequest::new("admin@hostpanel.test", "admin123", false))
        .await?;
    print_route("admin login", &navigator);
    println!("/admin/registrars: {}", describe(&session, "/admin/registrars"));

    session.logout().await;
    if session.state() == AuthState::Anonymous {
        println!("demo finished; {} API calls made", session.api().request_count());
    }
    Ok(())
}

fn print_route(step: &str, navigator: &RecordingNavigator) {
    if let Some(route) = navigator.current() {
        println!("{step} → {route}");
    }
}
