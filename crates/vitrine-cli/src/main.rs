use std::{
    env,
    path::{Path, PathBuf},
    sync::RwLock,
};

use account::{handle_profile_action, handle_session_action, login, signup};
use categories::handle_category_action;
use clap::Parser;
use cli::{Args, Commands};
use contacts::handle_contact_action;
use images::handle_image_action;
use logging::setup_logging;
use products::handle_product_action;
use quotes::handle_quote_action;
use settings::handle_settings_action;
use tracing::{debug, info};
use utils::{json_enabled, print_json, COLOR, JSON};
use vitrine_config::{
    config::{default_config_path, generate_default_config, Config},
    error::ConfigError,
};
use vitrine_core::{error::ErrorContext, AppContext, CoreError, CoreResult};
use vitrine_utils::path::resolve_path;

mod account;
mod categories;
mod cli;
mod contacts;
mod images;
mod logging;
mod products;
mod quotes;
mod settings;
mod utils;

fn config_path(args: &Args) -> CoreResult<PathBuf> {
    let Some(ref c) = args.config else {
        return Ok(default_config_path()?);
    };

    let path = resolve_path(c).map_err(ConfigError::from)?;
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()
            .with_context(|| "retrieving current directory".into())?
            .join(path))
    }
}

fn set_flag(flag: &RwLock<bool>, value: bool) -> CoreResult<()> {
    let mut guard = flag
        .write()
        .map_err(|_| CoreError::Custom("output settings lock poisoned".into()))?;
    *guard = value;
    Ok(())
}

fn show_config(path: &Path) -> CoreResult<()> {
    let config = Config::load(path)?.redacted();
    if json_enabled() {
        return print_json(&config);
    }

    info!("# {}", path.display());
    info!("{}", config.to_toml()?);
    Ok(())
}

async fn handle_cli() -> CoreResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_flag(&COLOR, false)?;
    }
    if args.json {
        set_flag(&JSON, true)?;
    }

    let path = config_path(&args)?;
    debug!("using config file {}", path.display());

    match args.command {
        Commands::Config {
            init,
        } => {
            if init {
                generate_default_config(&path)?;
            } else {
                show_config(&path)?;
            }
        }
        command => {
            let ctx = AppContext::new(Config::load(&path)?)?;

            match command {
                Commands::Products(action) => handle_product_action(&ctx, action).await?,
                Commands::Categories(action) => handle_category_action(&ctx, action).await?,
                Commands::Images(action) => handle_image_action(&ctx, action).await?,
                Commands::Contacts(action) => handle_contact_action(&ctx, action).await?,
                Commands::Quotes(action) => handle_quote_action(&ctx, action).await?,
                Commands::Settings(action) => handle_settings_action(&ctx, action).await?,
                Commands::Signup {
                    nome,
                    email,
                    senha,
                    admin_password,
                } => signup(&ctx, &nome, &email, senha, admin_password).await?,
                Commands::Login {
                    email,
                    senha,
                } => login(&ctx, &email, senha).await?,
                Commands::Session(action) => handle_session_action(&ctx, action).await?,
                Commands::Profile(action) => handle_profile_action(&ctx, action).await?,
                Commands::Config {
                    ..
                } => unreachable!(),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
