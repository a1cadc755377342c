mod ancestors;
mod fixture;
mod imports;
mod lookup;
mod view;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use fixture::Fixture;

#[derive(Parser)]
#[command(
    name = "semscope",
    version,
    about = "Inspect a language server's suggestion database offline",
    long_about = "Semscope mirrors a language server's suggestion database. The CLI replays a \
                  recorded fixture (snapshot, component groups and update batches) through a \
                  session and answers queries against the resulting database."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the suggestions defined at a qualified name
    Lookup {
        /// Fixture file to replay
        #[arg(value_name = "FIXTURE")]
        fixture: PathBuf,
        /// Qualified name, e.g. Standard.Base.Data.Vector.Vector
        #[arg(value_name = "QUALIFIED_NAME")]
        name: String,
    },
    /// List the supertypes of a type, nearest first
    Ancestors {
        #[arg(value_name = "FIXTURE")]
        fixture: PathBuf,
        #[arg(value_name = "QUALIFIED_NAME")]
        name: String,
    },
    /// Compute the imports needed to reference a suggestion
    #[command(
        long_about = "Prints the import statements needed to use the suggestion by its short name. \
                      With --module, the imports missing from that source file are added and the \
                      edited source is printed instead."
    )]
    Imports {
        #[arg(value_name = "FIXTURE")]
        fixture: PathBuf,
        #[arg(value_name = "QUALIFIED_NAME")]
        name: String,
        /// Source module to add the missing imports to
        #[arg(long, value_name = "FILE")]
        module: Option<PathBuf>,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = semscope_core::logging::init_logging("cli", false);

    let rt = tokio::runtime::Runtime::new()?;

    let output = match cli.command {
        Commands::Lookup { fixture, name } => rt.block_on(lookup::run(fixture, name))?,
        Commands::Ancestors { fixture, name } => rt.block_on(ancestors::run(fixture, name))?,
        Commands::Imports {
            fixture,
            name,
            module,
        } => rt.block_on(imports::run(fixture, name, module))?,
    };
    println!("{}", output);
    Ok(())
}
