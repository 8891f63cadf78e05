//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::auth::AuthApi;
use crate::api::{ApiError, AuthClient, Credentials, RegisterRequest, ReqwestTransport};
use crate::core::cli::{self, Commands, GuardArea, PlatformCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{CRATE_TARGET, ENV_LOG};
use crate::core::storage::AppStorage;
use crate::data::session::open_backend;
use crate::routes::{LogNavigator, Routes, admin_guard, platform_guard, tenant_guard};
use crate::session::{Namespace, Sessions};

pub struct CoreApp {
    pub config: AppConfig,
    pub storage: AppStorage,
    pub routes: Routes,
    pub navigator: Arc<LogNavigator>,
    pub client: Arc<AuthClient>,
    pub auth: AuthApi,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let config = AppConfig::load(&cli_config)?;
        let app = Self::init(config).await?;
        app.handle_command(command).await
    }

    /// Wire storage, sessions and the request pipeline
    pub async fn init(config: AppConfig) -> Result<Self> {
        let storage = AppStorage::init().await?;
        let backend = open_backend(config.storage.backend, &storage)?;
        let sessions = Sessions::open(backend);

        let routes = Routes::new(&config.routes);
        let navigator = Arc::new(LogNavigator::new(routes.clone()));
        let transport = Arc::new(
            ReqwestTransport::new(&config.api).context("Failed to build HTTP client")?,
        );
        let client = Arc::new(AuthClient::with_http_refresher(
            &config.api,
            transport,
            sessions,
            navigator.clone(),
        ));
        let auth = AuthApi::new(client.clone(), config.api.endpoints.clone());

        Ok(Self {
            config,
            storage,
            routes,
            navigator,
            client,
            auth,
        })
    }

    async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Login { email, password } => {
                let user = self
                    .auth
                    .login(&Credentials::new(email, password))
                    .await
                    .map_err(|e| self.explain(e))?;
                println!("Signed in as {}", user.email.as_deref().unwrap_or(&user.id));
            }
            Commands::Register {
                email,
                password,
                name,
                company,
            } => {
                let request = RegisterRequest {
                    email,
                    password,
                    name,
                    company,
                };
                let user = self
                    .auth
                    .register(&request)
                    .await
                    .map_err(|e| self.explain(e))?;
                println!("Registered and signed in as {}", user.id);
            }
            Commands::Logout => {
                self.auth.logout(Namespace::Tenant);
                println!("Signed out");
            }
            Commands::Whoami => self.print_identity(),
            Commands::Get { path } => {
                let response = self
                    .client
                    .execute(crate::api::ApiRequest::get(path))
                    .await
                    .map_err(|e| self.explain(e))?;
                println!("{}", Self::pretty_body(&response.text()));
            }
            Commands::Platform { command } => self.handle_platform_command(command).await?,
            Commands::Guard { area } => self.check_guard(area),
        }
        Ok(())
    }

    async fn handle_platform_command(&self, command: PlatformCommands) -> Result<()> {
        match command {
            PlatformCommands::Login { email, password } => {
                self.auth
                    .platform_login(&Credentials::new(email, password))
                    .await
                    .map_err(|e| self.explain(e))?;
                println!("Signed in to the platform area");
            }
            PlatformCommands::Logout => {
                self.auth.logout(Namespace::Platform);
                println!("Signed out of the platform area");
            }
            PlatformCommands::Status => {
                if self.client.sessions().platform.current().has_credential() {
                    println!("Platform session active");
                } else {
                    println!("No platform session");
                }
            }
        }
        Ok(())
    }

    fn print_identity(&self) {
        let session = self.client.sessions().tenant.current();
        match (&session.credential, &session.identity) {
            (Some(_), Some(user)) => {
                println!("id:    {}", user.id);
                if let Some(email) = &user.email {
                    println!("email: {}", email);
                }
                match user.role {
                    Some(role) => println!("role:  {}", role),
                    None => println!("role:  (none)"),
                }
                if let Some(sub) = &user.subscription {
                    let state = if sub.is_active() { "active" } else { "inactive" };
                    println!(
                        "plan:  {} ({})",
                        sub.plan.as_deref().unwrap_or("unknown"),
                        state
                    );
                }
            }
            (Some(_), None) => println!("Signed in (no identity stored)"),
            (None, _) => println!("Not signed in"),
        }
    }

    fn check_guard(&self, area: GuardArea) {
        let sessions = self.client.sessions();
        let decision = match area {
            GuardArea::Tenant => tenant_guard(&sessions.tenant.current(), &self.routes),
            GuardArea::Admin => admin_guard(&sessions.tenant.current(), &self.routes),
            GuardArea::Platform => platform_guard(&sessions.platform.current(), &self.routes),
        };

        if decision.apply(self.navigator.as_ref()) {
            println!("allowed");
        } else {
            println!(
                "denied, redirect to {}",
                self.navigator.last().unwrap_or_default()
            );
        }
    }

    /// Add the login hint when the pipeline forced a logout
    fn explain(&self, error: ApiError) -> anyhow::Error {
        match self.navigator.last() {
            Some(path) if error.is_auth_failure() => {
                anyhow::Error::new(error).context(format!("Session ended, sign in again ({})", path))
            }
            _ => anyhow::Error::new(error),
        }
    }

    fn pretty_body(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .and_then(|v| serde_json::to_string_pretty(&v))
            .unwrap_or_else(|_| body.to_string())
    }

    fn init_logging() {
        let default_filter = format!("warn,{}=info", CRATE_TARGET);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}
