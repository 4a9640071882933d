use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fhirshape", version, about = "Shape templates for FHIR bundles")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "JSON config file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build one model per record type from every bundle in a directory.
    Build {
        dir: PathBuf,
        #[arg(long, help = "Leaf value written into models")]
        placeholder: Option<String>,
        #[arg(long, help = "Where to write the registry (default: <DIR>/_models.json)")]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false, help = "Stop at the first unusable document or record")]
        fail_fast: bool,
        #[arg(long, default_value_t = false, help = "Let later records replace established shapes")]
        last_write_wins: bool,
    },
    /// Reshape a record to match the model of its type.
    Project {
        #[arg(long, help = "Registry written by `build`")]
        models: PathBuf,
        #[arg(long = "type", help = "Record type to project onto")]
        type_name: String,
        #[arg(long, help = "Record file: a bare record or a bundle")]
        record: PathBuf,
        #[arg(long, help = "Value for fields the record lacks")]
        default: Option<String>,
    },
    /// List every dotted field path in a JSON file.
    Keys { file: PathBuf },
    /// Render a bundle as an HTML page.
    Render {
        file: PathBuf,
        #[arg(long, help = "Write the page here instead of stdout")]
        output: Option<PathBuf>,
    },
}
