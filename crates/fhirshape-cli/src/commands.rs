use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, bail};
use serde_json::json;

use fhirshape_core::bundle::first_of_type;
use fhirshape_core::options::{CollisionPolicy, defaults};
use fhirshape_core::path::field_paths;
use fhirshape_core::project::project;
use fhirshape_core::tree::Scalar;
use fhirshape_export::render::render_document;
use fhirshape_storage::documents::{artifact_path, read_document};
use fhirshape_storage::ingest::{IngestPolicy, ingest_directory};
use fhirshape_storage::state::{load_registry, save_registry};

use crate::config::CliConfig;

pub struct BuildArgs {
    pub dir: PathBuf,
    pub placeholder: Option<String>,
    pub output: Option<PathBuf>,
    pub fail_fast: bool,
    pub last_write_wins: bool,
}

pub async fn build(config: &CliConfig, args: BuildArgs, json_out: bool) -> Result<()> {
    let mut merge = config.merge.clone();
    if let Some(placeholder) = args.placeholder {
        merge = merge.with_placeholder(placeholder);
    }
    if args.last_write_wins {
        merge = merge.with_collision(CollisionPolicy::LastWriteWins);
    }
    let policy = if args.fail_fast {
        IngestPolicy::FailFast
    } else {
        config.ingest_policy
    };

    let report = ingest_directory(&args.dir, merge, policy)
        .await
        .wrap_err_with(|| format!("failed to build models from {}", args.dir.display()))?;

    let output = args.output.unwrap_or_else(|| artifact_path(&args.dir));
    save_registry(&output, &report.registry).await?;

    let types: Vec<&str> = report.registry.type_names().collect();
    if json_out {
        print_json(&json!({
            "output": output.display().to_string(),
            "types": types,
            "documents_read": report.documents_read,
            "documents_skipped": report.documents_skipped,
            "records_merged": report.records_merged,
            "records_skipped": report.records_skipped,
        }))?;
    } else {
        println!(
            "wrote {} models from {} records in {} documents to {}",
            types.len(),
            report.records_merged,
            report.documents_read,
            output.display()
        );
        if report.documents_skipped + report.records_skipped > 0 {
            println!(
                "skipped {} documents and {} records",
                report.documents_skipped, report.records_skipped
            );
        }
    }
    Ok(())
}

pub async fn project_file(
    config: &CliConfig,
    models: &Path,
    type_name: &str,
    record: &Path,
    default: Option<String>,
) -> Result<()> {
    let registry = load_registry(models, config.merge.clone()).await?;
    let Some(model) = registry.get(type_name) else {
        bail!("no model for type '{type_name}' in {}", models.display());
    };

    let document = read_document(record).await?;
    let source = if document.get(defaults::ENTRY_FIELD).is_some() {
        match first_of_type(&document, type_name, &config.merge.discriminant) {
            Some(found) => found,
            None => bail!("no '{type_name}' record in bundle {}", record.display()),
        }
    } else {
        &document
    };

    let default = default
        .map(Scalar::String)
        .unwrap_or_else(|| config.projection_default.clone());

    print_json(&project(model, Some(source), &default))
}

pub async fn keys(file: &Path, json_out: bool) -> Result<()> {
    let document = read_document(file).await?;
    let paths = field_paths(&document);

    if json_out {
        print_json(&paths)?;
    } else {
        for path in paths {
            println!("{path}");
        }
    }
    Ok(())
}

pub async fn render(config: &CliConfig, file: &Path, output: Option<&Path>) -> Result<()> {
    let document = read_document(file).await?;
    let html = render_document(&document, &config.render)
        .wrap_err_with(|| format!("failed to render {}", file.display()))?;

    match output {
        Some(path) => {
            tokio::fs::write(path, html)
                .await
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "page written");
        }
        None => print!("{html}"),
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
