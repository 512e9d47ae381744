//! Print element trees stored in a catalog database.
//!
//! Reads the flat element listing for each resource, rebuilds the forest the
//! same way an HTTP client would and prints it as an indented outline.

use anyhow::{Context, Result, bail};
use clap::Parser;
use resteasy::catalog::{ElementForest, Resource, ResourceView};
use resteasy::error::ErrorKind;
use resteasy::{Catalog, CatalogStore, ResourceId, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "resteasy-tree", about = "Render element trees from a catalog database")]
struct Args {
    /// SQLite catalog file written by resteasy-serve.
    #[arg(long, env = "RESTEASY_DB")]
    database: PathBuf,

    /// Only render this resource; every resource is rendered otherwise.
    #[arg(long)]
    resource: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    if !args.database.is_file() {
        bail!("catalog database not found: {}", args.database.display());
    }
    let store = Arc::new(
        SqliteStore::open(&args.database)
            .with_context(|| format!("opening {}", args.database.display()))?,
    );
    let catalog = Catalog::new(store.clone());

    let resources = match &args.resource {
        Some(id) => vec![catalog.resources().find(&ResourceId::from(id.as_str()))?],
        None => all_resources(&catalog)?,
    };
    if resources.is_empty() {
        bail!("catalog {} has no resources", args.database.display());
    }

    for resource in &resources {
        print_resource(&catalog, resource)?;
    }
    store.close().context("closing catalog database")?;
    Ok(())
}

fn all_resources(catalog: &Catalog) -> Result<Vec<Resource>> {
    let mut resources = Vec::new();
    for specification in catalog.store().specifications()? {
        resources.extend(catalog.store().resources_for(&specification.id)?);
    }
    Ok(resources)
}

fn print_resource(catalog: &Catalog, resource: &Resource) -> Result<()> {
    let view: ResourceView = catalog.resources().view(resource)?;
    println!(
        "{}:{} {} ({})",
        view.spec_name, view.spec_version, view.url, view.id
    );
    let listing = match catalog.elements().list_by_resource(&resource.id) {
        Ok(listing) => listing,
        Err(err) if err.kind() == ErrorKind::EmptyResult => {
            println!("  (no elements)");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let forest = ElementForest::from_listing(listing)
        .with_context(|| format!("rebuilding element tree for {}", resource.id))?;
    for line in forest.render().lines() {
        println!("  {line}");
    }
    Ok(())
}
