// Harmonia Portal - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI over the portal. One process = one browser context: sessions
// without --remember live only until the process exits.
// Usage:
//   harmonia login <user> <password> [--remember]     # Sign in
//   harmonia logout                                   # End the session
//   harmonia register <user> <email> <password>       # Create an account
//   harmonia route [fragment]                         # Mount and print a view
//   harmonia products list|add|edit|delete            # Product CRUD
//   harmonia shell                                    # Interactive context

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harmonia_portal::{
    auth::{RegistrationForm, Role},
    config::PortalConfig,
    paths,
    products::ProductDraft,
    storage::StorageGateway,
    views, Portal,
};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

fn default_data_path() -> PathBuf {
    paths::harmonia_root().to_path_buf()
}

#[derive(Parser)]
#[command(name = "harmonia")]
#[command(author = "Joseph Stone")]
#[command(version = "1.0.0")]
#[command(about = "Harmonia Portal - users, sessions and products over local storage")]
struct Cli {
    /// Data directory (durable store + harmonia.json)
    #[arg(short, long, default_value_os_t = default_data_path())]
    data: PathBuf,

    /// Config file (defaults to <data>/harmonia.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// A single line typed into `harmonia shell`
#[derive(Parser)]
#[command(name = "harmonia", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: PortalCommand,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Portal(PortalCommand),

    /// Write harmonia.json with defaults if missing
    InitConfig,

    /// Interactive shell sharing one short-lived scope
    Shell,
}

/// Commands available both from the command line and inside the shell
#[derive(Subcommand)]
enum PortalCommand {
    /// Sign in. Without --remember the session ends with this process.
    Login {
        username: String,
        password: String,

        /// Keep the session in durable storage
        #[arg(long)]
        remember: bool,
    },

    /// End the current session
    Logout,

    /// Show the current session
    Whoami,

    /// Create an account
    Register {
        username: String,
        email: String,
        password: String,

        /// administrador or operacional
        #[arg(long, default_value = "operacional")]
        role: String,
    },

    /// Mount a fragment (#/login, #/register, #/dashboard) and print it
    Route {
        fragment: Option<String>,
    },

    /// List the user directory (passwords omitted)
    Users,

    /// Show failed attempts and lockout state
    Lockout,

    /// Product CRUD
    Products {
        #[command(subcommand)]
        action: ProductCommand,
    },

    /// Show portal status
    Status,
}

#[derive(Subcommand)]
enum ProductCommand {
    /// List products, optionally filtered by name
    List {
        #[arg(long)]
        search: Option<String>,
    },

    /// Create a product
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        price: String,
        #[arg(allow_hyphen_values = true)]
        stock: String,
    },

    /// Replace a product's fields
    Edit {
        id: String,
        name: String,
        #[arg(allow_hyphen_values = true)]
        price: String,
        #[arg(allow_hyphen_values = true)]
        stock: String,
    },

    /// Delete a product (administrador only)
    Delete {
        id: String,
    },
}

/// Where this process keeps its state
struct Locations {
    data: PathBuf,
    store: PathBuf,
    config: PathBuf,
}

fn main() -> Result<()> {
    // Initialize logging (safe if already init)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.data)
        .with_context(|| format!("Failed to create data dir {:?}", cli.data))?;

    let config_path = cli.config.clone().unwrap_or_else(|| paths::config_file(&cli.data));
    let config = PortalConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let store_path = paths::durable_store_dir(&cli.data);
    let storage = StorageGateway::open(&store_path)
        .with_context(|| format!("Failed to open durable store at {:?}", store_path))?;

    let mut portal = Portal::new(storage, config);
    let locations = Locations {
        data: cli.data,
        store: store_path,
        config: config_path,
    };

    match cli.command {
        Commands::Shell => run_shell(&mut portal, &locations),
        Commands::InitConfig => init_config(&portal, &locations.config),
        Commands::Portal(command) => run(&mut portal, &locations, command),
    }
}

fn init_config(portal: &Portal, path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already present at {:?}", path);
    } else {
        portal.config().save(path)?;
        println!("Default config written to {:?}", path);
    }
    Ok(())
}

fn run(portal: &mut Portal, locations: &Locations, command: PortalCommand) -> Result<()> {
    match command {
        PortalCommand::Login { username, password, remember } => {
            let session = portal.login(&username, &password, remember)?;
            println!("{}", portal.screen());
            if !remember {
                log::info!("Session for {} is short-lived", session.username);
            }
        }

        PortalCommand::Logout => {
            portal.logout()?;
            println!("{}", portal.screen());
        }

        PortalCommand::Whoami => match portal.session()? {
            Some(session) => println!("Session: {}", session.status_summary()),
            None => println!("Session: none"),
        },

        PortalCommand::Register { username, email, password, role } => {
            let role: Role = role.parse()?;
            let form = RegistrationForm { username, email, password, role };
            portal.register(&form)?;
            println!("{}", portal.screen());
        }

        PortalCommand::Route { fragment } => {
            match fragment {
                Some(f) => portal.navigate(&f)?,
                None => portal.mount()?,
            };
            println!("{}", portal.screen());
        }

        PortalCommand::Users => {
            for user in portal.auth().list_users()? {
                println!("{:<20} {:<32} {}", user.username, user.email, user.role);
            }
        }

        PortalCommand::Lockout => {
            let auth = portal.auth();
            let status = auth.check_lockout()?;
            println!("Failed attempts: {}", auth.failed_attempts()?);
            match status.minutes_remaining.filter(|_| status.is_locked) {
                Some(minutes) => println!("Locked: yes ({} min remaining)", minutes),
                None => println!("Locked: no"),
            }
        }

        PortalCommand::Products { action } => run_products(portal, action)?,

        PortalCommand::Status => {
            println!("Harmonia Portal v1.0.0");
            println!("Data:   {:?}", locations.data);
            println!("Store:  {:?}", locations.store);
            println!("Config: {:?}", locations.config);
            println!();
            run(portal, locations, PortalCommand::Whoami)?;
            run(portal, locations, PortalCommand::Lockout)?;
            println!("Users: {}", portal.auth().list_users()?.len());
            println!("Products: {}", portal.list_products()?.len());
        }
    }
    Ok(())
}

fn run_products(portal: &mut Portal, action: ProductCommand) -> Result<()> {
    match action {
        ProductCommand::List { search } => {
            let products = portal.search_products(search.as_deref().unwrap_or(""))?;
            print!("{}", views::product_table(&products, portal.can_delete()?));
        }
        ProductCommand::Add { name, price, stock } => {
            let product = portal.create_product(&ProductDraft::from_input(&name, &price, &stock))?;
            println!("Product created: {}", product.id);
        }
        ProductCommand::Edit { id, name, price, stock } => {
            let product = portal.update_product(&id, &ProductDraft::from_input(&name, &price, &stock))?;
            println!("Product updated: {}", product.id);
        }
        ProductCommand::Delete { id } => {
            let product = portal.delete_product(&id)?;
            println!("Product removed: {}", product.name);
        }
    }
    Ok(())
}

/// Split a shell line the way a POSIX shell would, quotes included
fn parse_shell_line(line: &str) -> Result<PortalCommand> {
    let words = shlex::split(line).context("Unbalanced quotes")?;
    Ok(ShellLine::try_parse_from(words)?.command)
}

fn run_shell(portal: &mut Portal, locations: &Locations) -> Result<()> {
    portal.mount()?;
    println!("{}", portal.screen());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("harmonia> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match parse_shell_line(line) {
            Ok(command) => {
                if let Err(e) = run(portal, locations, command) {
                    println!("error: {}", e);
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    log::info!("Shell closed, short-lived session scope dropped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_keeps_quoted_names_together() {
        let command = parse_shell_line(r#"products add "Café Especial" 21.90 30"#).unwrap();
        match command {
            PortalCommand::Products { action: ProductCommand::Add { name, price, stock } } => {
                assert_eq!(name, "Café Especial");
                assert_eq!(price, "21.90");
                assert_eq!(stock, "30");
            }
            _ => panic!("expected products add"),
        }
    }

    #[test]
    fn shell_accepts_status_only() {
        assert!(matches!(parse_shell_line("status"), Ok(PortalCommand::Status)));
        assert!(parse_shell_line("shell").is_err());
        assert!(parse_shell_line("init-config").is_err());
        assert!(parse_shell_line(r#"products add "Café"#).is_err());
    }

    #[test]
    fn command_line_still_has_every_command() {
        let cli = Cli::try_parse_from(["harmonia", "init-config"]).unwrap();
        assert!(matches!(cli.command, Commands::InitConfig));
        let cli = Cli::try_parse_from(["harmonia", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Portal(PortalCommand::Status)));
    }
}
