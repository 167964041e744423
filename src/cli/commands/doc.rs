//! `qmt doc` command - Controlled document management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::helpers::{
    confirm, output_list, output_record, print_field, report, require, today, tone_style,
    truncate_str, Session,
};
use crate::cli::GlobalOpts;
use crate::core::entity::Sector;
use crate::core::identity::RecordId;
use crate::core::reducer::Action;
use crate::core::stats::search;
use crate::entities::document::{format_file_size, DocumentStatus, DocumentType};
use crate::entities::Document;

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// List documents with filtering
    List(ListArgs),

    /// Register a new document
    New(NewArgs),

    /// Show a document's details
    Show(ShowArgs),

    /// Edit document fields
    Edit(EditArgs),

    /// Delete a document
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by sector
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    /// Filter by status (activo, en-revision, obsoleto, borrador)
    #[arg(long)]
    pub status: Option<DocumentStatus>,

    /// Filter by document type
    #[arg(long, short = 't')]
    pub r#type: Option<DocumentType>,

    /// Search in title and description
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Document title
    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Take file name and size from this file (contents are not stored)
    #[arg(long, conflicts_with = "file_name")]
    pub file: Option<PathBuf>,

    /// Attached file name, when no --file is given
    #[arg(long)]
    pub file_name: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'T')]
    pub r#type: Option<DocumentType>,

    /// Initial status (default: borrador)
    #[arg(long)]
    pub status: Option<DocumentStatus>,

    #[arg(long, default_value = "1.0")]
    pub version: String,

    /// Author (default: from config)
    #[arg(long, short = 'a')]
    pub author: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Document ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Document ID
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'T')]
    pub r#type: Option<DocumentType>,

    #[arg(long)]
    pub status: Option<DocumentStatus>,

    #[arg(long)]
    pub version: Option<String>,

    #[arg(long, short = 'a')]
    pub author: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Document ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a document subcommand
pub fn run(cmd: DocCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DocCommands::List(args) => run_list(args, global),
        DocCommands::New(args) => run_new(args, global),
        DocCommands::Show(args) => run_show(args, global),
        DocCommands::Edit(args) => run_edit(args, global),
        DocCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();

    let docs: Vec<&Document> = search(&state.documents, args.search.as_deref().unwrap_or(""))
        .into_iter()
        .filter(|d| args.sector.map_or(true, |s| d.sector == s))
        .filter(|d| args.status.map_or(true, |s| d.status == s))
        .filter(|d| args.r#type.map_or(true, |t| d.doc_type == t))
        .collect();

    if args.count {
        println!("{}", docs.len());
        return Ok(());
    }

    output_list(
        &docs,
        global.format,
        &["ID", "TITLE", "TYPE", "SECTOR", "STATUS", "VERSION", "MODIFIED"],
        |d| {
            vec![
                d.id.to_string(),
                truncate_str(&d.title, 40),
                d.doc_type.to_string(),
                d.sector.to_string(),
                d.status.to_string(),
                d.version.clone(),
                d.last_modified.to_string(),
            ]
        },
    )
}

/// File name and formatted size from a file on disk
fn file_metadata(path: &Path) -> Result<(String, String)> {
    let meta = std::fs::metadata(path).into_diagnostic()?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| miette::miette!("'{}' has no file name", path.display()))?;
    Ok((name, format_file_size(meta.len())))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let author = args.author.unwrap_or_else(|| session.author());

    let mut doc = Document::new(session.new_id(), args.title, author, today());
    if let Some(description) = args.description {
        doc.description = description;
    }
    if let Some(ref path) = args.file {
        let (name, size) = file_metadata(path)?;
        doc.file_name = name;
        doc.file_size = size;
    } else if let Some(name) = args.file_name {
        doc.file_name = name;
    }
    if let Some(sector) = args.sector {
        doc.sector = sector;
    }
    if let Some(doc_type) = args.r#type {
        doc.doc_type = doc_type;
    }
    if let Some(status) = args.status {
        doc.status = status;
    }
    doc.version = args.version;

    let missing = doc.missing_fields();
    if !missing.is_empty() {
        return Err(miette::miette!(
            help = "pass --file or --file-name",
            "Cannot create document: {}",
            missing.join(", ")
        ));
    }

    report(global, "Created", "document", &doc.id, &doc.title);
    session.dispatch(Action::AddDocument(doc));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let doc = require(state.document(&RecordId::new(&args.id)), &args.id)?;

    output_record(&doc, global.format, |d| {
        println!("{}", style(&d.title).bold());
        println!("{}", "─".repeat(60));
        print_field("ID", &d.id);
        print_field("Type", d.doc_type);
        print_field("Status", tone_style(d.status.label(), d.status.tone()));
        print_field("Sector", d.sector);
        print_field("Version", &d.version);
        print_field("Author", &d.author);
        print_field("File", format!("{} ({})", d.file_name, d.file_size));
        print_field("Uploaded", d.upload_date);
        print_field("Last modified", d.last_modified);
        if !d.description.is_empty() {
            println!();
            println!("{}", d.description);
        }
    })
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let mut doc = require(state.document(&RecordId::new(&args.id)), &args.id)?;

    if let Some(title) = args.title {
        doc.title = title;
    }
    if let Some(description) = args.description {
        doc.description = description;
    }
    if let Some(ref path) = args.file {
        let (name, size) = file_metadata(path)?;
        doc.file_name = name;
        doc.file_size = size;
        doc.upload_date = today();
    }
    if let Some(sector) = args.sector {
        doc.sector = sector;
    }
    if let Some(doc_type) = args.r#type {
        doc.doc_type = doc_type;
    }
    if let Some(status) = args.status {
        doc.status = status;
    }
    if let Some(version) = args.version {
        doc.version = version;
    }
    if let Some(author) = args.author {
        doc.author = author;
    }
    let doc = doc.touched(today());

    let missing = doc.missing_fields();
    if !missing.is_empty() {
        return Err(miette::miette!("Cannot update document: {}", missing.join(", ")));
    }

    report(global, "Updated", "document", &doc.id, &doc.title);
    session.dispatch(Action::UpdateDocument(doc));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let doc = require(state.document(&RecordId::new(&args.id)), &args.id)?;

    if !confirm(&format!("Delete document '{}'?", doc.title), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    session.dispatch(Action::DeleteDocument(doc.id.clone()));
    if !global.quiet {
        println!("{} Deleted document {}", style("✓").green(), style(&doc.id).cyan());
    }
    Ok(())
}
