//! Fill a template deck from a YAML fill document.
//!
//! # Usage
//!
//! ```bash
//! # Fill a template
//! pptx-fill template.pptx fill.yaml -o report.pptx
//!
//! # List the tags of every slide
//! pptx-fill template.pptx --list-tags
//!
//! # More detail about cloned and removed slides
//! RUST_LOG=debug pptx-fill template.pptx fill.yaml -o report.pptx
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use pptx_templater::config::FillConfig;
use pptx_templater::ooxml::pptx::{Package, RegexSubstitution};
use std::path::{Path, PathBuf};

/// Fill a PowerPoint template from a YAML fill document
#[derive(Parser, Debug)]
#[command(name = "pptx-fill")]
#[command(version, about, long_about = None)]
struct Args {
    /// Template .pptx file
    template: PathBuf,

    /// Fill document (YAML)
    config: Option<PathBuf>,

    /// Output .pptx file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the tags found on each slide and exit
    #[arg(long)]
    list_tags: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut pkg = Package::open(&args.template)
        .with_context(|| format!("Failed to open {}", args.template.display()))?;

    if args.list_tags {
        return list_tags(&pkg);
    }

    let Some(config_path) = args.config else {
        bail!("A fill document is required unless --list-tags is given");
    };
    let Some(output) = args.output else {
        bail!("--output is required when filling a template");
    };

    let config = FillConfig::from_path(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let base_dir = config_path.parent().unwrap_or(Path::new("."));

    config
        .apply(&mut pkg, &RegexSubstitution::new(), base_dir)
        .context("Failed to apply fill document")?;

    pkg.save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!(
        "Wrote {} ({} slides)",
        output.display(),
        pkg.slide_count().context("Failed to count slides")?
    );
    Ok(())
}

fn list_tags(pkg: &Package) -> Result<()> {
    for (index, slide) in pkg.slides().context("Failed to read slides")?.iter().enumerate() {
        let tables: Vec<String> = slide.tables().into_iter().map(|info| info.title).collect();
        println!("Slide {} ({})", index, slide.partname());
        for tag in slide.tags() {
            println!("  text   {}", tag);
        }
        for title in tables {
            println!("  table  {}", title);
        }
        for picture in slide.pictures() {
            if let Some(tag) = picture.tag() {
                println!("  image  {}", tag);
            }
        }
    }
    Ok(())
}
