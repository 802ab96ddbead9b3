//! stockroom - Terminal client for the material inventory
//!
//! Login opens a session stored in the client data folder. Listing is open
//! to every role; create, edit and delete need the `master` role.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rand::Rng;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use stockroom_cli::config::{ClientSettings, MODULE_NAME};
use stockroom_cli::{
    resolve_photo_url, ApiClient, MaterialFilter, MaterialForm, Session, SessionStore,
};
use stockroom_common::auth::hash_password;
use stockroom_common::categories::KNOWN_CATEGORIES;
use stockroom_common::config::TomlConfig;
use stockroom_common::Material;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(about = "Material inventory client")]
#[command(version)]
struct Cli {
    /// Folder holding the session file
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// Base URL of stockroom-api
    #[arg(long, env = "STOCKROOM_API_URL", global = true)]
    api_url: Option<String>,

    /// Shared secret sent as x-api-key
    #[arg(long, env = "STOCKROOM_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a session
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Close the session
    Logout,
    /// Show the logged-in user and role
    Whoami,
    /// List materials, optionally filtered
    List(FilterArgs),
    /// Create a material (master only)
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Photo file to upload
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Edit a material (master only); omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// New photo file, replacing the stored one
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Delete a material (master only)
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Categories offered by the form
    Categories,
    /// Print a `[[users]]` entry for the config file
    HashPassword {
        username: String,
        password: String,
        #[arg(long, default_value = "maintenance")]
        role: String,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct FilterArgs {
    /// Substring of the code
    #[arg(long, default_value = "")]
    code: String,
    /// Substring of the description
    #[arg(long, default_value = "")]
    description: String,
    /// Substring of the category
    #[arg(long, default_value = "")]
    category: String,
}

impl From<FilterArgs> for MaterialFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            code: args.code,
            description: args.description,
            category: args.category,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml_config = TomlConfig::load_for_module(MODULE_NAME);
    let settings = ClientSettings::resolve(
        cli.root_folder.clone(),
        cli.api_url.clone(),
        cli.api_key.clone(),
        cli.log_level.clone(),
        &toml_config,
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = settings.session_store();
    let client = ApiClient::new(&settings.api_url, &settings.api_key)?;

    match cli.command {
        Command::Login { username, password } => {
            if settings.credentials.is_empty() {
                warn!("No [[users]] configured; nobody can log in");
            }
            let password = match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            };
            let session = Session::login(&settings.credentials, &username, &password, Utc::now())?;
            store.save(&session)?;
            println!("Logged in as {} ({})", session.username, session.role);
        }
        Command::Logout => {
            store.clear()?;
            println!("Logged out");
        }
        Command::Whoami => {
            let session = store.resume(Utc::now())?;
            println!("{} ({})", session.username, session.role);
        }
        Command::List(filter) => {
            store.resume(Utc::now())?;
            let materials = client.list().await?;
            print_materials(&client, &MaterialFilter::from(filter).apply(&materials));
        }
        Command::Create {
            code,
            description,
            category,
            photo,
        } => {
            elevated_session(&store)?;
            let mut form = MaterialForm::new();
            form.code = code;
            form.description = description;
            form.category = category;
            if let Some(photo) = photo {
                form.select_photo(photo);
            }

            warn_unlisted_category(&form);
            println!("{}", form.preview_line(client.base_url()));
            let material = client.submit(&form).await?;
            println!("Created material {} (id {})", material.code, material.id);
        }
        Command::Edit {
            id,
            code,
            description,
            category,
            photo,
        } => {
            elevated_session(&store)?;
            let existing = find_material(&client, id).await?;

            let mut form = MaterialForm::edit(&existing);
            if let Some(code) = code {
                form.code = code;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(category) = category {
                form.category = category;
            }
            if let Some(photo) = photo {
                form.select_photo(photo);
            }

            warn_unlisted_category(&form);
            println!("{}", form.preview_line(client.base_url()));
            let material = client.submit(&form).await?;
            println!("Updated material {} (id {})", material.code, material.id);
        }
        Command::Delete { id, yes } => {
            elevated_session(&store)?;
            let existing = find_material(&client, id).await?;

            if !yes {
                let answer = prompt(&format!(
                    "Delete material {} - {}? [y/N] ",
                    existing.code, existing.description
                ))?;
                if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim") {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            println!("{}", client.delete(id).await?);
            let materials = client.list().await?;
            print_materials(&client, &materials.iter().collect::<Vec<_>>());
        }
        Command::Categories => {
            for category in KNOWN_CATEGORIES {
                println!("{}", category);
            }
        }
        Command::HashPassword {
            username,
            password,
            role,
        } => {
            if role != "master" && role != "maintenance" {
                bail!("Role must be master or maintenance");
            }
            let salt: String = rand::thread_rng()
                .gen::<[u8; 16]>()
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect();
            println!("[[users]]");
            println!("username = \"{}\"", username);
            println!("role = \"{}\"", role);
            println!("password_salt = \"{}\"", salt);
            println!("password_hash = \"{}\"", hash_password(&salt, &password));
        }
    }

    Ok(())
}

/// Session allowed to modify records
fn elevated_session(store: &SessionStore) -> Result<Session> {
    let session = store.resume(Utc::now())?;
    session.require_elevated()?;
    Ok(session)
}

fn warn_unlisted_category(form: &MaterialForm) {
    if form.has_unlisted_category() {
        warn!(
            "Category {:?} is not in the standard list (see `stockroom categories`)",
            form.category
        );
    }
}

async fn find_material(client: &ApiClient, id: i64) -> Result<Material> {
    client
        .list()
        .await?
        .into_iter()
        .find(|m| m.id == id)
        .with_context(|| format!("Material {} not found", id))
}

fn print_materials(client: &ApiClient, materials: &[&Material]) {
    if materials.is_empty() {
        println!("No materials found");
        return;
    }

    println!("{:>6}  {:<14} {:<40} {:<14} PHOTO", "ID", "CODE", "DESCRIPTION", "CATEGORY");
    for m in materials {
        let photo = m
            .photo_url
            .as_deref()
            .map(|url| resolve_photo_url(client.base_url(), url))
            .unwrap_or_default();
        println!(
            "{:>6}  {:<14} {:<40} {:<14} {}",
            m.id, m.code, m.description, m.category, photo
        );
    }
    println!("{} material(s)", materials.len());
}

fn prompt(message: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", message)?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
