use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::Value;
use tally_sdk::{Author, CommitOutcome, SaveReport, Tally, TallyConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let tally = open(&cli)?;
    match cli.command {
        Command::Init => cmd_init(&tally),
        Command::Status => cmd_status(&tally, &cli.format),
        Command::Log(args) => cmd_log(&tally, args, &cli.format),
        Command::Put(args) => cmd_put(&tally, args),
        Command::Get(args) => cmd_get(&tally, args),
        Command::List(args) => cmd_list(&tally, args),
        Command::File(args) => match args.action {
            FileAction::Put { paths, name } => cmd_file_put(&tally, &paths, name),
            FileAction::Get { name, output } => cmd_file_get(&tally, &name, output.as_deref()),
            FileAction::List => cmd_file_list(&tally),
        },
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> anyhow::Result<TallyConfig> {
    let mut config = match &cli.config {
        Some(path) => TallyConfig::load(path)?,
        None => TallyConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(name) = &cli.author_name {
        config.author.name = name.clone();
    }
    if let Some(email) = &cli.author_email {
        config.author.email = email.clone();
    }
    Ok(config)
}

fn open(cli: &Cli) -> anyhow::Result<Tally> {
    let config = resolve_config(cli)?;
    let author: Author = config.author()?;
    Tally::open_at(&config.root, author)
        .with_context(|| format!("opening repository at {}", config.root.display()))
}

fn cmd_init(tally: &Tally) -> anyhow::Result<()> {
    println!(
        "{} Initialized tally repository in {}",
        "✓".green().bold(),
        tally.root().display().to_string().bold()
    );
    println!("  Author: {}", tally.author().to_string().cyan());
    Ok(())
}

fn cmd_status(tally: &Tally, format: &OutputFormat) -> anyhow::Result<()> {
    let dirty = tally.is_dirty()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "dirty": dirty })),
        OutputFormat::Text if dirty => println!("Working tree has {}.", "unrecorded changes".red()),
        OutputFormat::Text => println!("Working tree {}.", "clean".green()),
    }
    Ok(())
}

fn cmd_log(tally: &Tally, args: LogArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let entries = tally.history(args.limit)?;
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No history.");
    }
    for entry in &entries {
        println!(
            "{}  {}  {}",
            entry.short_revision().yellow(),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            entry.summary()
        );
        println!("  Author: {}", entry.author);
        for path in &entry.paths {
            println!("    {}", path.display());
        }
    }
    Ok(())
}

fn cmd_put(tally: &Tally, args: PutArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.json_file)
        .with_context(|| format!("reading {}", args.json_file.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.json_file.display()))?;

    let report = match &value {
        Value::Array(items) => tally.objects().save_documents(&args.type_name, items),
        document => tally.objects().save_document(&args.type_name, document),
    };
    print_report(&report)
}

fn cmd_get(tally: &Tally, args: GetArgs) -> anyhow::Result<()> {
    match tally.objects().get_document(&args.type_name, &args.id)? {
        Some(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        None => bail!("no {} with id {:?}", args.type_name, args.id),
    }
}

fn cmd_list(tally: &Tally, args: ListArgs) -> anyhow::Result<()> {
    let filter = args.filter.as_deref().map(parse_filter).transpose()?;
    let query = tally.objects().documents(&args.type_name, |doc: &Value| match &filter {
        Some((field, expected)) => field_matches(doc, field, expected),
        None => true,
    });

    let mut count = 0usize;
    for document in &query {
        println!("{document}");
        count += 1;
    }
    eprintln!("{} {} document(s)", count.to_string().bold(), args.type_name);
    Ok(())
}

fn cmd_file_put(tally: &Tally, paths: &[PathBuf], name: Option<String>) -> anyhow::Result<()> {
    if name.is_some() && paths.len() > 1 {
        bail!("--name can only be used with a single path");
    }

    let mut opened = Vec::with_capacity(paths.len());
    for path in paths {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let stored_name = match &name {
            Some(name) => name.clone(),
            None => file_name_of(path)?,
        };
        opened.push((file, stored_name));
    }

    let report = if opened.len() == 1 {
        let (file, stored_name) = &mut opened[0];
        tally.files().save_one(file, stored_name.as_str())
    } else {
        tally
            .files()
            .save_many(opened.iter_mut().map(|(file, stored_name)| (file, stored_name.as_str())))
    };
    print_report(&report)
}

fn cmd_file_get(tally: &Tally, name: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let Some(mut file) = tally.files().get_by_name(name)? else {
        bail!("no stored file named {name:?}");
    };
    match output {
        Some(out) => {
            let mut target = File::create(out).with_context(|| format!("creating {}", out.display()))?;
            let bytes = io::copy(&mut file, &mut target)?;
            eprintln!("{} Wrote {} bytes to {}", "✓".green(), bytes, out.display());
        }
        None => {
            io::copy(&mut file, &mut io::stdout().lock())?;
        }
    }
    Ok(())
}

fn cmd_file_list(tally: &Tally) -> anyhow::Result<()> {
    for name in tally.files().list()? {
        println!("{name}");
    }
    Ok(())
}

fn print_report(report: &SaveReport) -> anyhow::Result<()> {
    for path in &report.written {
        println!("  {} {}", "written:".green(), path.display());
    }
    for skipped in &report.skipped {
        println!("  {} item {}: {}", "skipped:".red(), skipped.index, skipped.reason);
    }
    match &report.commit {
        CommitOutcome::Committed(entry) => {
            println!("{} Recorded {} {}", "✓".green().bold(), entry.short_revision().yellow(), entry.summary())
        }
        CommitOutcome::Unchanged => println!("Nothing changed; no history entry added."),
        CommitOutcome::Empty => println!("Nothing written."),
        CommitOutcome::Failed(reason) => println!("{} History not recorded: {}", "✗".red().bold(), reason),
    }

    if !report.is_complete() {
        bail!("save incomplete: {} skipped", report.skipped.len());
    }
    Ok(())
}

fn parse_filter(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => bail!("expected FIELD=VALUE, got {raw:?}"),
    }
}

/// Strings compare by content, other scalars by their JSON text.
fn field_matches(doc: &Value, field: &str, expected: &str) -> bool {
    match doc.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == expected,
        None => false,
    }
}

fn file_name_of(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}
