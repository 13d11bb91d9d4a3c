mod config;

use std::path::{Path, PathBuf};
use std::{env, io, time::Duration};

use clap::{Parser, Subcommand};
use expando_msg::ResponseError;
use expando_parse::{ParseOptions, parse_str_with};
use expando_server::{Expander, ProcMacroServer, ServerError};
use expando_tree::Subtree;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

pub use crate::config::{CONFIG_FILE_NAME, Config, ConfigError};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "expando", version, about = "Token trees and proc-macro expansion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file, or a directory holding expando.toml
    #[arg(long = "config", global = true, env = "EXPANDO_CONFIG")]
    pub config_path: Option<PathBuf>,

    #[arg(long = "log", global = true, default_value = "info")]
    pub log: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token tree built from a file ("-" for stdin)
    Tree { file: PathBuf },

    /// Print the token tree built from a file as wire JSON
    Json { file: PathBuf },

    /// Expand a macro call with a proc-macro library
    Expand {
        /// Compiled proc-macro library
        #[arg(long)]
        lib: PathBuf,

        /// Macro or derived trait name
        #[arg(long)]
        name: String,

        /// File holding attribute macro arguments
        #[arg(long = "attr")]
        attr_file: Option<PathBuf>,

        /// Macro call body ("-" for stdin)
        file: PathBuf,
    },

    /// List macros exported by a proc-macro library
    List {
        #[arg(long)]
        lib: PathBuf,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode token tree: {0}")]
    Json(#[source] serde_json::Error),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("proc-macro server reported {0}")]
    Response(#[from] ResponseError),

    #[error("failed to expand {name} from {}", lib.display())]
    ExpansionFailed { name: String, lib: PathBuf },
}

pub async fn get_config(cli: &Cli) -> Result<Config, AppError> {
    let config = match &cli.config_path {
        Some(path) => Config::load(path).await?,
        None => {
            let dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::load_or_default(&dir).await?
        }
    };
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = get_config(&cli).await?;
    match cli.command {
        Command::Tree { file } => cmd_tree(config, file).await,
        Command::Json { file } => cmd_json(config, file).await,
        Command::Expand {
            lib,
            name,
            attr_file,
            file,
        } => cmd_expand(config, lib, name, attr_file, file).await,
        Command::List { lib } => cmd_list(config, lib).await,
    }
}

async fn cmd_tree(config: Config, file: PathBuf) -> Result<(), AppError> {
    let subtree = parse_file(&file, config.parser).await?;
    println!("{}", subtree.debug_dump());
    Ok(())
}

async fn cmd_json(config: Config, file: PathBuf) -> Result<(), AppError> {
    let subtree = parse_file(&file, config.parser).await?;
    println!("{}", to_pretty_json(&subtree)?);
    Ok(())
}

async fn cmd_expand(
    config: Config,
    lib: PathBuf,
    name: String,
    attr_file: Option<PathBuf>,
    file: PathBuf,
) -> Result<(), AppError> {
    let body = read_input(&file).await?;
    let attributes = match attr_file {
        Some(attr_file) => Some(read_input(&attr_file).await?),
        None => None,
    };

    let expander = Expander::new(ProcMacroServer::spawn(&config.server)?, config.parser);
    info!(macro_name = %name, lib = %lib.display(), "Expanding");
    let result = match &attributes {
        Some(attributes) => {
            expander
                .expand_source_with_attributes(&body, Some(attributes), &name, &lib)
                .await
        }
        None => expander.expand_source(&body, &name, &lib).await,
    };
    shutdown(expander.into_server()).await;

    let Some(result) = result else {
        return Err(AppError::ExpansionFailed { name, lib });
    };
    let expansion = result?;
    println!("{}", expansion.to_text());
    println!("{}", expansion.debug_dump());
    Ok(())
}

async fn cmd_list(config: Config, lib: PathBuf) -> Result<(), AppError> {
    let server = ProcMacroServer::spawn(&config.server)?;
    let result = server.list_macros(lib).await;
    shutdown(server).await;

    for (name, kind) in result?? {
        println!("{name}\t{kind}");
    }
    Ok(())
}

async fn shutdown(server: ProcMacroServer) {
    if let Err(error) = server.shutdown(SHUTDOWN_GRACE).await {
        warn!(%error, "Failed to shut down proc-macro server");
    }
}

async fn parse_file(path: &Path, options: ParseOptions) -> Result<Subtree, AppError> {
    let source = read_input(path).await?;
    Ok(parse_str_with(&source, options))
}

async fn read_input(path: &Path) -> Result<String, AppError> {
    let read_error = |source| AppError::ReadInput {
        path: path.to_owned(),
        source,
    };

    if path == Path::new("-") {
        let mut source = String::new();
        tokio::io::stdin()
            .read_to_string(&mut source)
            .await
            .map_err(read_error)?;
        Ok(source)
    } else {
        tokio::fs::read_to_string(path).await.map_err(read_error)
    }
}

fn to_pretty_json(subtree: &Subtree) -> Result<String, AppError> {
    serde_json::to_string_pretty(subtree).map_err(AppError::Json)
}
