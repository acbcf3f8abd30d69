#![deny(missing_docs)]
#![deny(unsafe_code)]

//! custody-keytool command line binary

use custody_keytool::dependencies::*;
use custody_keytool::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use structopt::StructOpt;

mod cmd_init;
mod cmd_run;

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Write a template config file to the config path.
    /// Refuses to overwrite an existing file.
    #[structopt(verbatim_doc_comment)]
    Init,

    /// Derive fresh mnemonics and everything below them,
    /// split and store them. The product and open dirs
    /// must not exist yet.
    #[structopt(verbatim_doc_comment)]
    Generate,

    /// Reconstruct and cross check every stored value.
    /// Never writes, apart from the optional export dir
    /// and audit log.
    #[structopt(verbatim_doc_comment)]
    Retrieve,

    /// Like retrieve, then store every value that could
    /// be derived but was not retrieved.
    #[structopt(verbatim_doc_comment)]
    Complete,
}

#[derive(Debug, StructOpt)]
#[structopt(about = "offline key custody tool")]
struct Opt {
    /// Config file. Relative directories inside it resolve
    /// against the directory holding the file.
    #[structopt(
        short = "c",
        long,
        default_value = "keytool-config.yaml",
        env = "CUSTODY_KEYTOOL_CONFIG",
        verbatim_doc_comment
    )]
    config: PathBuf,

    /// The subcommand to execute
    #[structopt(subcommand)]
    cmd: Cmd,
}

fn get_config(config_path: &Path) -> CustodyResult<KeyToolConfig> {
    let bytes = match std::fs::read(config_path) {
        Err(e) => {
            return Err(format!(
                "Could not read config file {config_path:?}, did you run init? - {e}",
            )
            .into());
        }
        Ok(b) => b,
    };

    let config = KeyToolConfigInner::from_bytes(&bytes)?;

    let root = match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let root = dunce::canonicalize(root)?;

    Ok(Arc::new(config.resolve_relative_to(&root)))
}

fn init_tracing() {
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .compact()
            .finish(),
    );
}

fn exec() -> CustodyResult<()> {
    let Opt { config, cmd } = Opt::from_args();
    let mode = match cmd {
        Cmd::Init => return cmd_init::exec(&config),
        Cmd::Generate => Mode::Generate,
        Cmd::Retrieve => Mode::Retrieve,
        Cmd::Complete => Mode::Complete,
    };
    eprintln!("# WARNING: only run on a secure, offline computer under audit");
    let config = get_config(&config)?;
    cmd_run::exec(config, mode)
}

fn main() {
    init_tracing();
    if let Err(e) = exec() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
