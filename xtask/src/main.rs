//! xtask - Build tasks for bondlog
//!
//! Run with: cargo xtask <command>
//!
//! Commands:
//! - gen-docs: Generate documentation (man pages, COMMANDS.md)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser, Subcommand};

use bondlog::cli::Cli;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build tasks for bondlog")]
struct Xtask {
    #[command(subcommand)]
    command: XtaskCommand,
}

#[derive(Subcommand)]
enum XtaskCommand {
    /// Generate documentation from CLI definitions
    #[command(name = "gen-docs")]
    GenDocs {
        /// Output directory (default: docs/)
        #[arg(long, short, default_value = "docs")]
        output: PathBuf,

        /// Generate man pages
        #[arg(long)]
        man: bool,

        /// Generate COMMANDS.md
        #[arg(long)]
        markdown: bool,
    },
}

fn main() -> Result<()> {
    let args = Xtask::parse();

    match args.command {
        XtaskCommand::GenDocs {
            output,
            man,
            markdown,
        } => {
            // If no specific format is specified, generate both
            let gen_all = !man && !markdown;

            if gen_all || man {
                generate_man_pages(&output)?;
            }
            if gen_all || markdown {
                generate_markdown(&output)?;
            }
        }
    }

    Ok(())
}

fn render_man(cmd: &Command, path: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Generated: {}", path.display());
    Ok(())
}

/// Generate man pages using clap_mangen
fn generate_man_pages(output: &Path) -> Result<()> {
    let man_dir = output.join("man");
    fs::create_dir_all(&man_dir).context("Failed to create man directory")?;

    let cmd = Cli::command();
    render_man(&cmd, &man_dir.join("bondlog.1"))?;

    for subcommand in cmd.get_subcommands().filter(|c| !c.is_hide_set()) {
        let name = subcommand.get_name();
        render_man(subcommand, &man_dir.join(format!("bondlog-{}.1", name)))?;

        for nested in subcommand.get_subcommands().filter(|c| !c.is_hide_set()) {
            let file = format!("bondlog-{}-{}.1", name, nested.get_name());
            render_man(nested, &man_dir.join(file))?;
        }
    }

    println!("Man pages generated in {}", man_dir.display());
    Ok(())
}

/// Append argument and option lists for `cmd`.
fn push_arguments(markdown: &mut String, cmd: &Command) {
    let visible: Vec<_> = cmd
        .get_arguments()
        .filter(|a| {
            let id = a.get_id().as_str();
            id != "help" && id != "version"
        })
        .collect();

    let positional: Vec<_> = visible.iter().filter(|a| a.is_positional()).collect();
    if !positional.is_empty() {
        markdown.push_str("### Arguments\n\n");
        for arg in positional {
            markdown.push_str(&format!("- `<{}>`: ", arg.get_id().as_str().to_uppercase()));
            if let Some(help) = arg.get_help() {
                markdown.push_str(&help.to_string());
            }
            markdown.push('\n');
        }
        markdown.push('\n');
    }

    let options: Vec<_> = visible.iter().filter(|a| !a.is_positional()).collect();
    if !options.is_empty() {
        markdown.push_str("### Options\n\n");
        for arg in options {
            let long = arg.get_long().map(|l| format!("--{}", l));
            let short = arg.get_short().map(|s| format!("-{}", s));
            let flag = match (long, short) {
                (Some(l), Some(s)) => format!("{}, {}", s, l),
                (Some(l), None) => l,
                (None, Some(s)) => s,
                _ => continue,
            };
            markdown.push_str(&format!("- `{}`: ", flag));
            if let Some(help) = arg.get_help() {
                markdown.push_str(&help.to_string());
            }
            markdown.push('\n');
        }
        markdown.push('\n');
    }
}

/// Generate COMMANDS.md markdown documentation
fn generate_markdown(output: &Path) -> Result<()> {
    fs::create_dir_all(output).context("Failed to create output directory")?;

    let cmd = Cli::command();
    let mut markdown = String::new();

    markdown.push_str("# bondlog Command Reference\n\n");
    markdown.push_str("This document is auto-generated from the CLI definitions.\n\n");
    markdown.push_str("## Table of Contents\n\n");
    for subcommand in cmd.get_subcommands().filter(|c| !c.is_hide_set()) {
        let name = subcommand.get_name();
        markdown.push_str(&format!("- [{}](#bondlog-{})\n", name, name));
    }
    markdown.push_str("\n---\n\n");

    markdown.push_str("## bondlog\n\n");
    if let Some(long_about) = cmd.get_long_about() {
        markdown.push_str(&format!("```\n{}\n```\n\n", long_about));
    }
    push_arguments(&mut markdown, &cmd);

    for subcommand in cmd.get_subcommands().filter(|c| !c.is_hide_set()) {
        let name = subcommand.get_name();
        markdown.push_str(&format!("## bondlog {}\n\n", name));
        if let Some(about) = subcommand.get_about() {
            markdown.push_str(&format!("{}\n\n", about));
        }
        push_arguments(&mut markdown, subcommand);

        if let Some(long_about) = subcommand.get_long_about() {
            markdown.push_str("### Description\n\n");
            markdown.push_str(&format!("```\n{}\n```\n\n", long_about));
        }

        for nested in subcommand.get_subcommands().filter(|c| !c.is_hide_set()) {
            markdown.push_str(&format!("#### bondlog {} {}\n\n", name, nested.get_name()));
            if let Some(about) = nested.get_about() {
                markdown.push_str(&format!("{}\n\n", about));
            }
            push_arguments(&mut markdown, nested);
        }

        markdown.push_str("---\n\n");
    }

    markdown.push_str("\n*Generated by `cargo xtask gen-docs`*\n");

    let output_path = output.join("COMMANDS.md");
    fs::write(&output_path, markdown)?;
    println!("Generated: {}", output_path.display());

    Ok(())
}
