#![forbid(unsafe_code)]

mod config;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tbgen_matrix::{build_all, default_catalog, suite, BuildContext, ComponentMatrix, TestCatalog};
use tbgen_refgen::{
    encode_file, write_variant, AlwaysStale, ArtifactStore, ErrorKind, Freshness, MtimeFreshness,
    RaggedTail,
};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Overrides};

#[derive(Parser, Debug)]
#[command(
    name = "tbgen",
    about = "Build testbench configuration matrices and the reference files they read."
)]
struct Args {
    /// Seed handed to every configuration and used for generated data (default: random)
    #[arg(long, global = true, allow_negative_numbers = true, value_name = "SEED")]
    seed: Option<i32>,

    /// Directory for generated files [env: TBGEN_OUTPUT_DIR, default: vunit_out]
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Regenerate files even when they look up to date [env: TBGEN_FORCE_REGEN=1]
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    force: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build the configuration matrix and print it as JSON
    Matrix {
        /// Only build these testbench entities (repeatable)
        #[arg(long = "component", value_name = "ENTITY")]
        components: Vec<String>,

        /// Arbiter test case names (repeatable; defaults to the known arbiter tests)
        #[arg(long = "arbiter-test", value_name = "NAME")]
        arbiter_tests: Vec<String>,

        /// Pretty-print the JSON
        #[arg(long, action = clap::ArgAction::SetTrue)]
        pretty: bool,
    },
    /// Encode an existing raw file into a reference log
    Encode {
        #[arg(long, value_name = "BITS")]
        width: u32,

        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Handling of a partial final word on sub-byte buses
        #[arg(long, value_enum, default_value_t = Ragged::ZeroPad)]
        ragged: Ragged,
    },
    /// Derive an error variant of a reference log
    Derive {
        #[arg(long, value_enum)]
        kind: Kind,

        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        #[arg(long, value_name = "PATH")]
        output: PathBuf,
    },
    /// Generate one random raw/reference pair in the output directory
    Generate {
        #[arg(long, value_name = "BITS")]
        width: u32,

        /// Raw file length in bytes
        #[arg(long, value_name = "BYTES")]
        length: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Ragged {
    Truncate,
    ZeroPad,
}

impl From<Ragged> for RaggedTail {
    fn from(r: Ragged) -> Self {
        match r {
            Ragged::Truncate => RaggedTail::Truncate,
            Ragged::ZeroPad => RaggedTail::ZeroPad,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Single,
    Double,
    Last,
}

impl From<Kind> for ErrorKind {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Single => ErrorKind::SingleMismatch,
            Kind::Double => ErrorKind::DoubleMismatch,
            Kind::Last => ErrorKind::LastFlagError,
        }
    }
}

#[derive(Serialize)]
struct MatrixOutput<'a> {
    seed: i32,
    components: &'a [ComponentMatrix],
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let cfg = Config::from_env(Overrides {
        output_dir: args.output_dir,
        seed: args.seed,
        force_regen: args.force,
    })
    .context("read environment")?;
    run(args.command, cfg)
}

fn run(command: Cmd, cfg: Config) -> anyhow::Result<()> {
    let seed = cfg.seed.unwrap_or_else(rand::random::<i32>);
    let output_dir = cfg.output_dir;
    let force = cfg.force_regen;

    match command {
        Cmd::Matrix {
            components,
            arbiter_tests,
            pretty,
        } => {
            let store = ArtifactStore::new(&output_dir, seed, freshness(force)?);
            let catalog = if arbiter_tests.is_empty() {
                default_catalog()
            } else {
                let mut catalog = TestCatalog::new();
                catalog.insert(tbgen_matrix::ARBITER_ENTITY, arbiter_tests);
                catalog
            };

            let mut domains = suite();
            if !components.is_empty() {
                if let Some(unknown) = components
                    .iter()
                    .find(|c| !domains.iter().any(|d| d.entity == c.as_str()))
                {
                    bail!("unknown component {unknown:?}");
                }
                domains.retain(|d| components.iter().any(|c| c == d.entity));
            }

            let ctx = BuildContext {
                store: &store,
                catalog: &catalog,
            };
            let matrix = build_all(&domains, seed, &ctx).context("build test matrix")?;
            let output = MatrixOutput {
                seed,
                components: &matrix,
            };

            let mut stdout = io::stdout().lock();
            if pretty {
                serde_json::to_writer_pretty(&mut stdout, &output)?;
            } else {
                serde_json::to_writer(&mut stdout, &output)?;
            }
            writeln!(stdout)?;
        }
        Cmd::Encode {
            width,
            input,
            output,
            ragged,
        } => {
            let encoding = encode_file(&input, &output, width, ragged.into())
                .with_context(|| format!("encode {} as {width}-bit", input.display()))?;
            println!("{}: {} transfers", output.display(), encoding.log.len());
        }
        Cmd::Derive {
            kind,
            input,
            output,
        } => {
            let kind = ErrorKind::from(kind);
            write_variant(&input, &output, kind)
                .with_context(|| format!("derive {kind} from {}", input.display()))?;
            println!("{}: {kind}", output.display());
        }
        Cmd::Generate { width, length } => {
            println!("Seed: {seed}");
            let store = ArtifactStore::new(&output_dir, seed, freshness(force)?);
            let pair = store
                .reader_pair(width, length)
                .with_context(|| format!("generate {width}-bit pair of {length} bytes"))?;
            println!("{}", pair.input.display());
            println!("{}", pair.reference.display());
        }
    }
    Ok(())
}

fn freshness(force: bool) -> anyhow::Result<Box<dyn Freshness>> {
    if force {
        return Ok(Box::new(AlwaysStale));
    }
    let exe = std::env::current_exe().context("locate tbgen executable")?;
    Ok(Box::new(MtimeFreshness::for_generator(&exe)))
}
