//! adminctl - terminal front-end for the admin console
//!
//! Logs in, registers accounts, and manages the user table (list, create,
//! edit, delete, JSON export/import) on the user-management backend.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::debug;

use admin_console::api::Credentials;
use admin_console::config::{self, AppConfig};
use admin_console::view::{CreateUserForm, LoginForm, RegisterForm};
use admin_console::{AdminClient, ApiClient, TerminalConsole};

fn main() -> ExitCode {
    match try_main() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            let _ = writeln!(io::stderr(), "Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn try_main() -> Result<bool> {
    let cli = Cli::parse();

    let config_path = config::config_path(cli.config.as_deref())?;
    let mut config = config::load(&config_path)?;
    if let Some(server) = cli.server.clone() {
        config.server.url = server;
    }
    init_logging(&cli, &config);
    debug!("using config {}", config_path.display());

    match &cli.command {
        Command::Login { username, password } => {
            let password = resolve_password(password.clone())?;
            handle_login(&cli, &config, username, password).await
        }
        Command::Register { username, password } => {
            let password = resolve_password(password.clone())?;
            handle_register(&cli, &config, username, password).await
        }
        Command::Users { command } => handle_users(&cli, &config, command).await,
        Command::Config { command } => handle_config(&config, &config_path, command),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "adminctl", &mut io::stdout());
            Ok(true)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "adminctl",
    author,
    version,
    about = "Admin console CLI - log in, register, and manage users on the backend."
)]
struct Cli {
    /// Backend URL (overrides server.url from the config file)
    #[arg(long, short = 's', env = "ADMIN_CONSOLE_SERVER", global = true)]
    server: Option<String>,

    /// Path to the config file
    #[arg(long, short = 'c', env = "ADMIN_CONSOLE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Assume "yes" for confirmation prompts
    #[arg(short = 'y', long = "yes", global = true)]
    assume_yes: bool,

    /// Output machine-readable JSON (user table and logs)
    #[arg(long, global = true)]
    json: bool,

    /// Reduce output to only errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and report where the account lands
    Login {
        username: String,
        /// Password (prompted without echo if omitted)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Register a new account
    Register {
        username: String,
        /// Password (prompted without echo if omitted)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// List all users
    List,
    /// Create a user
    Create {
        username: String,
        /// Password (prompted without echo if omitted)
        #[arg(long, short)]
        password: Option<String>,
        /// User role (user, admin)
        #[arg(long, short, default_value = "user")]
        role: String,
        /// Mark the user as paid
        #[arg(long)]
        paid: bool,
    },
    /// Edit a user; omitted fields keep their current value
    Edit {
        id: u64,
        #[arg(long, short)]
        username: Option<String>,
        /// New password (the stored one is kept if omitted)
        #[arg(long, short)]
        password: Option<String>,
        #[arg(long, short)]
        role: Option<String>,
        /// Set the paid flag (true/false)
        #[arg(long)]
        paid: Option<bool>,
    },
    /// Delete a user
    Delete { id: u64 },
    /// Download a JSON backup of all users
    Export {
        /// Directory to save the backup in (default: downloads.dir)
        #[arg(long, short)]
        dir: Option<PathBuf>,
    },
    /// Import users from a JSON backup; existing usernames are skipped
    Import { file: PathBuf },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(cli: &Cli, config: &AppConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    if cli.quiet {
        return;
    }

    let level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("admin_console={level},adminctl={level}")));

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .try_init()
            .ok();
    } else {
        let disable_color = cli.no_color
            || env::var_os("NO_COLOR").is_some()
            || !io::stderr().is_terminal();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(!disable_color)
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .try_init()
            .ok();
    }
}

fn build_client(
    cli: &Cli,
    config: &AppConfig,
    download_dir: Option<&Path>,
) -> Result<AdminClient<TerminalConsole>> {
    let api = ApiClient::new(
        &config.server.url,
        &config.server.api_base,
        config.server.request_timeout(),
    )
    .context("creating HTTP client")?;

    let download_dir = download_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.downloads.dir));
    let console = TerminalConsole::new(download_dir)
        .assume_yes(cli.assume_yes)
        .json(cli.json);

    Ok(AdminClient::new(api, console).with_timings(config.timing.timings()))
}

async fn handle_login(
    cli: &Cli,
    config: &AppConfig,
    username: &str,
    password: String,
) -> Result<bool> {
    let mut client = build_client(cli, config, None)?;
    let form = LoginForm {
        username: username.to_string(),
        password,
    };
    Ok(client.login(&form).await.is_some())
}

async fn handle_register(
    cli: &Cli,
    config: &AppConfig,
    username: &str,
    password: String,
) -> Result<bool> {
    let mut client = build_client(cli, config, None)?;
    client.show_register();
    let form = RegisterForm {
        username: username.to_string(),
        password,
    };
    Ok(client.register(&form).await)
}

async fn handle_users(cli: &Cli, config: &AppConfig, command: &UsersCommand) -> Result<bool> {
    let download_dir = match command {
        UsersCommand::Export { dir } => dir.as_deref(),
        _ => None,
    };
    let mut client = build_client(cli, config, download_dir)?;
    open_session(&client, config).await?;

    match command {
        UsersCommand::List => Ok(client.load_users().await),

        UsersCommand::Create {
            username,
            password,
            role,
            paid,
        } => {
            let role = validate_role(role)?;
            let password = resolve_password(password.clone())?;
            let form = client.open_create_modal();
            form.username = username.clone();
            form.password = password;
            form.role = role;
            form.has_paid = *paid;
            let form: CreateUserForm = form.clone();
            Ok(client.create_user(&form).await)
        }

        UsersCommand::Edit {
            id,
            username,
            password,
            role,
            paid,
        } => {
            let users = client
                .api()
                .list_users()
                .await
                .context("fetching users")?;
            let Some(user) = users.iter().find(|user| user.id == *id) else {
                bail!("User {} not found", id);
            };

            let form = client.open_edit(user);
            if let Some(username) = username {
                form.username = username.clone();
            }
            if let Some(password) = password {
                form.password = password.clone();
            }
            if let Some(role) = role {
                form.role = validate_role(role)?;
            }
            if let Some(paid) = paid {
                form.has_paid = *paid;
            }
            let form = form.clone();
            Ok(client.edit_user(&form).await)
        }

        UsersCommand::Delete { id } => Ok(client.delete_user(*id).await),

        UsersCommand::Export { .. } => Ok(client.export_users().await.is_some()),

        UsersCommand::Import { file } => Ok(client.import_users(file).await.is_some()),
    }
}

/// Log in with configured credentials so admin-only endpoints accept us.
async fn open_session(client: &AdminClient<TerminalConsole>, config: &AppConfig) -> Result<()> {
    let Some((username, password)) = config.auth.credentials() else {
        return Ok(());
    };

    let response = client
        .api()
        .login(&Credentials::new(username, password))
        .await
        .context("opening session")?;
    if !response.success {
        bail!("authentication as {} failed: {}", username, response.message);
    }
    debug!("session opened for {}", username);
    Ok(())
}

fn validate_role(role: &str) -> Result<String> {
    match role.to_lowercase().as_str() {
        "user" | "admin" => Ok(role.to_lowercase()),
        _ => bail!("Invalid role: {}. Must be 'user' or 'admin'", role),
    }
}

fn handle_config(config: &AppConfig, path: &Path, command: &ConfigCommand) -> Result<bool> {
    match command {
        ConfigCommand::Path => {
            println!("{}", path.display());
        }
        ConfigCommand::Show => {
            let mut shown = config.clone();
            if shown.auth.password.is_some() {
                shown.auth.password = Some("<redacted>".to_string());
            }
            let body = toml::to_string_pretty(&shown).context("serializing configuration")?;
            print!("{body}");
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            config::write_default(path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(true)
}

/// Use the given password or prompt for one on stderr without echo.
fn resolve_password(password: Option<String>) -> Result<String> {
    let password = match password {
        Some(password) => password,
        None => {
            eprint!("Password: ");
            io::stderr().flush()?;

            let mut line = String::new();
            let hidden = EchoOff::disable();
            io::stdin()
                .read_line(&mut line)
                .context("reading password")?;
            if hidden.is_some() {
                eprintln!();
            }
            drop(hidden);

            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        bail!("Password cannot be empty");
    }
    Ok(password)
}

/// Terminal echo switched off for stdin until dropped.
#[cfg(unix)]
struct EchoOff {
    fd: std::os::unix::io::RawFd,
    saved: libc::termios,
}

#[cfg(unix)]
impl EchoOff {
    /// `None` when stdin is not a terminal or its attributes cannot be changed.
    fn disable() -> Option<Self> {
        use std::os::unix::io::AsRawFd;

        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return None;
        }
        let fd = stdin.as_raw_fd();

        // SAFETY: termios is plain old data; tcgetattr fills it before use.
        let mut saved = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(fd, &mut saved) } != 0 {
            return None;
        }
        let mut quiet = saved;
        quiet.c_lflag &= !libc::ECHO;
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &quiet) } != 0 {
            return None;
        }
        Some(Self { fd, saved })
    }
}

#[cfg(unix)]
impl Drop for EchoOff {
    fn drop(&mut self) {
        // SAFETY: restores attributes read from the same descriptor.
        unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved) };
    }
}

#[cfg(not(unix))]
struct EchoOff;

#[cfg(not(unix))]
impl EchoOff {
    fn disable() -> Option<Self> {
        None
    }
}
