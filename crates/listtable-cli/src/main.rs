//! ListTable CLI
//!
//! Command-line tool for checking, previewing and exporting list tables.

use clap::{Args, Parser, Subcommand};
use listtable_core::{
    build_table, check_documents, load_document, text_content, ContentNode, Error,
    ResolvedCell, ResolvedTable, SectionKind, TableOptions, TableOutput, ValidationMode,
};
use log::LevelFilter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "listtable")]
#[command(about = "Nested-list table resolver", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every table in the Markdown files under one or more roots
    Check {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,

        /// Validation mode to use instead of each table's own
        #[arg(long)]
        validation: Option<ValidationMode>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview a resolved table
    Show {
        /// Input file (.md, .mdx, .csv or .json)
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Print the resolved table or error report as JSON
    Render {
        /// Input file (.md, .mdx, .csv or .json)
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        table: TableArgs,

        /// Output file path, stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a resolved table to a file
    Export {
        /// Input file (.md, .mdx, .csv or .json)
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        table: TableArgs,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Table selection and options shared by the single-table commands
#[derive(Args)]
struct TableArgs {
    /// Index of the table within the file
    #[arg(long, default_value_t = 0)]
    table: usize,

    /// Rows rendered as the header section
    #[arg(long)]
    header_rows: Option<usize>,

    /// Leading columns rendered as row headers
    #[arg(long)]
    header_columns: Option<usize>,

    /// Rows rendered as the footer section
    #[arg(long)]
    footer_rows: Option<usize>,

    /// Table caption
    #[arg(long)]
    caption: Option<String>,

    /// Validation mode (strict, warn or off)
    #[arg(long)]
    validation: Option<ValidationMode>,

    /// Class name passed through to the output
    #[arg(long)]
    class_name: Option<String>,
}

impl TableArgs {
    /// Layer explicit flags over the options found in the document
    fn apply(&self, mut options: TableOptions) -> TableOptions {
        if let Some(rows) = self.header_rows {
            options.header_rows = rows;
        }
        if let Some(columns) = self.header_columns {
            options.header_columns = columns;
        }
        if let Some(rows) = self.footer_rows {
            options.footer_rows = rows;
        }
        if let Some(caption) = &self.caption {
            options.caption = Some(vec![ContentNode::text(caption.as_str())]);
        }
        if let Some(mode) = self.validation {
            options.validation = mode;
        }
        if let Some(class_name) = &self.class_name {
            options.class_name = Some(class_name.clone());
        }
        options
    }
}

fn main() {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> listtable_core::Result<()> {
    match command {
        Commands::Check {
            root,
            validation,
            format,
            output,
        } => {
            let clean = cmd_check(&root, validation, &format, output.as_deref())?;
            if !clean {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Show { file, table } => cmd_show(&file, &table),
        Commands::Render {
            file,
            table,
            output,
        } => cmd_render(&file, &table, output.as_deref()),
        Commands::Export {
            file,
            table,
            format,
            output,
        } => cmd_export(&file, &table, &format, &output),
    }
}

fn cmd_check(
    roots: &[PathBuf],
    validation: Option<ValidationMode>,
    format: &str,
    output: Option<&Path>,
) -> listtable_core::Result<bool> {
    let report = check_documents(roots, validation)?;

    match format.to_lowercase().as_str() {
        "text" => {
            for file in &report.files {
                for diagnostic in &file.diagnostics {
                    println!("{}: {}", file.path.display(), diagnostic);
                }
                for table in &file.tables {
                    for diagnostic in &table.diagnostics {
                        println!("{}:{}: {}", file.path.display(), table.line, diagnostic);
                    }
                }
            }
            println!(
                "Checked {} tables in {} files: {} error(s)",
                report.table_count(),
                report.files.len(),
                report.error_count()
            );
        }
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => {
            return Err(Error::InvalidOption(format!(
                "unknown format '{}', supported formats: text, json",
                other
            )))
        }
    }

    if let Some(path) = output {
        report.save(path)?;
    }

    Ok(report.is_clean())
}

/// Load the selected table of a file and build it
fn build_from_file(file: &Path, args: &TableArgs) -> listtable_core::Result<TableOutput> {
    let document = load_document(file)?;
    let count = document.tables.len();

    let block = document.tables.into_iter().nth(args.table).ok_or_else(|| {
        Error::InvalidOption(format!(
            "table {} not found, '{}' has {} table(s)",
            args.table,
            file.display(),
            count
        ))
    })?;

    let options = args.apply(block.options);
    log::debug!("building table {} of {} with {:?}", args.table, file.display(), options);
    Ok(build_table(&block.content, &options))
}

/// Unwrap a built table, printing the error report instead when there is one
fn require_table(output: TableOutput) -> ResolvedTable {
    match output {
        TableOutput::Table(table) => table,
        TableOutput::Error(report) => {
            eprint!("{}", report);
            std::process::exit(1);
        }
    }
}

fn cmd_show(file: &Path, args: &TableArgs) -> listtable_core::Result<()> {
    let table = require_table(build_from_file(file, args)?);

    if let Some(caption) = &table.caption {
        println!("Caption: {}", text_content(caption));
    }
    println!(
        "Rows: {}, Columns: {}",
        table.row_count(),
        table.column_count()
    );

    for kind in [SectionKind::Header, SectionKind::Body, SectionKind::Footer] {
        let rows = table.section(kind);
        if rows.is_empty() {
            continue;
        }

        println!();
        println!("[{}]", section_label(kind));
        for row in rows {
            let values: Vec<String> = row.cells.iter().map(format_cell).collect();
            println!("{}", values.join("\t"));
        }
    }

    Ok(())
}

fn section_label(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Header => "header",
        SectionKind::Body => "body",
        SectionKind::Footer => "footer",
    }
}

/// Cell text with header and span annotations, e.g. `*Region*{r2}`
fn format_cell(cell: &ResolvedCell) -> String {
    let mut value = cell.text();
    if cell.is_header() {
        value = format!("*{}*", value);
    }
    if let Some(rows) = cell.row_span {
        value.push_str(&format!("{{r{}}}", rows));
    }
    if let Some(cols) = cell.col_span {
        value.push_str(&format!("{{c{}}}", cols));
    }
    value
}

fn cmd_render(file: &Path, args: &TableArgs, output: Option<&Path>) -> listtable_core::Result<()> {
    let rendered = build_from_file(file, args)?;
    let json = serde_json::to_string_pretty(&rendered)?;

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            writeln!(writer, "{}", json)?;
            writer.flush()?;
            println!("Rendered {} to {}", file.display(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_export(
    file: &Path,
    args: &TableArgs,
    format: &str,
    output: &Path,
) -> listtable_core::Result<()> {
    let table = require_table(build_from_file(file, args)?);

    match format.to_lowercase().as_str() {
        "csv" => write_csv(&table, output)?,
        "json" => {
            let mut writer = BufWriter::new(File::create(output)?);
            writeln!(writer, "{}", serde_json::to_string_pretty(&table)?)?;
            writer.flush()?;
        }
        other => {
            return Err(Error::InvalidOption(format!(
                "unknown format '{}', supported formats: csv, json",
                other
            )))
        }
    }

    println!("Exported {} rows to {}", table.row_count(), output.display());

    Ok(())
}

/// Write one CSV record per row, one field per logical slot
fn write_csv(table: &ResolvedTable, output: &Path) -> listtable_core::Result<()> {
    let csv_error = |source| Error::Csv {
        path: output.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(output)
        .map_err(csv_error)?;

    for row in table.to_slot_grid()? {
        let fields: Vec<String> = row
            .iter()
            .map(|slot| slot.map(ResolvedCell::text).unwrap_or_default())
            .collect();
        writer.write_record(&fields).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}
