//! richtext - normalize and inspect rich-text HTML fragments

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use richtext_core::content::{export_html, import_html};
use richtext_core::{Config, Document};
use std::path::{Path, PathBuf};

/// Rich-text HTML toolkit
#[derive(Parser, Debug)]
#[command(name = "richtext")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a fragment and print its canonical HTML
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the plain text of a fragment, one line per block
    Text {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the block and span structure of a fragment
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Show which blocks changed between two fragments
    #[cfg(feature = "diff")]
    Diff {
        #[arg(value_name = "OLD")]
        old: PathBuf,
        #[arg(value_name = "NEW")]
        new: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    match args.command {
        Command::Normalize { file } => {
            let doc = load(&file, &config)?;
            println!("{}", export_html(&doc, &config.output));
        }
        Command::Text { file } => {
            let doc = load(&file, &config)?;
            println!("{}", doc.plain_text());
        }
        Command::Inspect { file } => {
            let doc = load(&file, &config)?;
            print!("{}", inspect(&doc));
        }
        #[cfg(feature = "diff")]
        Command::Diff { old, new } => {
            let before = load(&old, &config)?;
            let after = load(&new, &config)?;
            print!("{}", gutter(&before, &after));
        }
    }

    Ok(())
}

fn load(path: &Path, config: &Config) -> Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    log::debug!("Read {} bytes from {}", raw.len(), path.display());
    Ok(import_html(Some(&raw), &config.input))
}

fn inspect(doc: &Document) -> String {
    let mut out = String::new();
    for (index, block) in doc.blocks().iter().enumerate() {
        out.push_str(&format!(
            "{} {} [{}]\n",
            index,
            block.kind().type_id(),
            block.alignment().css_value()
        ));
        for span in block.spans() {
            out.push_str(&format!("  {:?} ({})\n", span.text, span.format));
        }
    }
    out
}

#[cfg(feature = "diff")]
fn gutter(before: &Document, after: &Document) -> String {
    use richtext_core::diff::{block_gutter, BlockMark};

    let marks = block_gutter(before, after);
    let mut out = String::new();
    for (index, block) in after.blocks().iter().enumerate() {
        let sign = match marks.get(index) {
            BlockMark::None => " ".to_string(),
            BlockMark::Added => "+".to_string(),
            BlockMark::Modified => "~".to_string(),
            BlockMark::DeletedAfter(n) => format!("-{}", n),
        };
        out.push_str(&format!("{:>3} {}\n", sign, block.text()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::parse::parse_str;

    #[test]
    fn test_inspect_lists_blocks_and_spans() {
        let doc = parse_str("<h2 style=\"text-align: center\">T</h2><p>a<b>b</b></p>");
        let out = inspect(&doc);
        assert_eq!(
            out,
            "0 heading2 [center]\n  \"T\" (plain)\n1 paragraph [left]\n  \"a\" (plain)\n  \"b\" (bold)\n"
        );
    }

    #[cfg(feature = "diff")]
    #[test]
    fn test_gutter_output() {
        let before = parse_str("<p>a</p><p>b</p>");
        let after = parse_str("<p>a</p><p>b</p><p>c</p>");
        assert_eq!(gutter(&before, &after), "    a\n    b\n  + c\n");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["richtext", "--config", "x.toml", "text", "in.html"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(args.command, Command::Text { .. }));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load(Path::new("/nonexistent/in.html"), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
