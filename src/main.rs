use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cha_backend::config::Config;
use cha_backend::models::user::RegisterRequest;
use cha_backend::{app, auth, db, AppState};

#[derive(Parser)]
#[command(name = "cha-backend", about = "Baby shower events API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create a user account; the credential is prompted for
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        tax_id: String,
        #[arg(long)]
        phone: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    let pool = db::connect(&config)
        .await
        .expect("failed to connect to database");

    db::migrate(&pool).await.expect("failed to run migrations");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(AppState::new(pool, config)).await,
        Command::CreateUser {
            email,
            full_name,
            tax_id,
            phone,
        } => {
            let credential =
                rpassword::prompt_password("Credential: ").expect("failed to read credential");
            let request = RegisterRequest {
                full_name,
                tax_id,
                email,
                phone,
                credential,
                push_token: None,
            };
            match auth::register(&pool, request).await {
                Ok(user) => println!("Created user {} <{}>", user.id, user.email),
                Err(e) => {
                    eprintln!("Could not create user: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn serve(state: AppState) {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = app(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app).await.expect("server error");
}
