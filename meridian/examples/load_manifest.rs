//! This example loads a dataset manifest from a local folder, prints a summary of every layer and writes the
//! attribute table of each layer as CSV next to the data.
//!
//! ```text
//! cargo run --example load_manifest -- path/to/data [layers.json]
//! ```

use anyhow::Context;
use meridian::data_provider::FileSource;
use meridian::{LogMessenger, Workbench, WorkbenchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let folder = args.next().context("usage: load_manifest <folder> [manifest]")?;
    let manifest = args.next().unwrap_or_else(|| "layers.json".to_string());

    let source = FileSource::new(&folder);
    let mut workbench = Workbench::new(WorkbenchConfig::default()).with_messenger(LogMessenger);
    let report = workbench.load_manifest(&source, &manifest).await?;

    for failure in &report.failures {
        eprintln!("{}: {}", failure.file, failure.error);
    }

    for (group, layers) in workbench.groups() {
        println!("{group}");
        for id in layers {
            let Some(layer) = workbench.layer(id) else {
                continue;
            };
            println!(
                "  {} ({}, {} features), columns: {}",
                layer.name(),
                layer.kind(),
                layer.features().len(),
                layer.columns().join(", ")
            );
        }
    }

    for id in &report.loaded {
        let export = workbench.export_attributes(id)?;
        let path = source.file_path(&export.file_name);
        tokio::fs::write(&path, export.contents).await?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
