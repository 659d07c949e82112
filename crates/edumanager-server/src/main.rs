//! EduManager server - main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use edumanager_common::{
    logging::{init_logging, LogConfig},
    UserRole,
};
use tracing::info;

use edumanager_server::{
    api,
    config::Config,
    db,
    features::users::{commands::create, CreateUserCommand, SessionContext},
};

#[derive(Parser, Debug)]
#[command(name = "edumanager-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Register an account, e.g. the first super_admin
    CreateUser {
        #[arg(long)]
        email: String,

        #[arg(long, env = "EDU_BOOTSTRAP_PASSWORD", hide_env_values = true)]
        password: String,

        /// super_admin, admin or reader
        #[arg(long, default_value = "reader")]
        role: UserRole,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .log_file_prefix("edumanager-server")
        .filter_directives("edumanager_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;
    init_logging(&log_config)?;

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database).await?;
    db::ensure_schema(&pool).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Starting EduManager server");
            api::serve(pool, config).await?;
        },
        Commands::CreateUser {
            email,
            password,
            role,
        } => {
            let verifier = config.app.credential_scheme.verifier();
            let command = CreateUserCommand {
                email,
                password,
                role,
            };
            let created =
                create::handle(pool, verifier, &SessionContext::system(), command).await?;
            info!(user_id = created.id, email = %created.email, role = %created.role, "Account created");
        },
    }

    Ok(())
}
