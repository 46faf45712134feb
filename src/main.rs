use clap::Parser;
use docx_table_images::{Document, ExtractOptions, NamingCoordinate};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

const PREVIEW_ROWS: usize = 10;
const PREVIEW_CHARS: usize = 50;

#[derive(Parser)]
#[command(
    name = "docx-table-images",
    about = "Extract images from DOCX tables into folders named after a chosen cell"
)]
struct Args {
    /// Input DOCX file
    input: PathBuf,
    /// Output directory (created if missing)
    output: PathBuf,
    /// Naming cell as ROW,COL (0-based); prompts when omitted
    #[arg(long)]
    cell: Option<NamingCoordinate>,
    /// Prefix for tables whose naming cell is missing or empty
    #[arg(long)]
    prefix: Option<String>,
    /// Give up on a table after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Dump table text and context for tables that got a default name
    #[arg(long)]
    dump_unnamed: bool,
    /// Do not write error_log.txt
    #[arg(long)]
    no_error_log: bool,
    /// Maximum number of entries kept in the error log
    #[arg(long, default_value_t = 500)]
    max_log_entries: usize,
    /// Print the first table with cell coordinates and exit
    #[arg(long)]
    preview: bool,
}

fn print_preview(doc: &Document) {
    let Some(table) = doc.tables.first() else {
        println!("The document contains no tables.");
        return;
    };
    println!("First table ({} rows):", table.rows.len());
    for (r, row) in table.rows.iter().take(PREVIEW_ROWS).enumerate() {
        // grid positions, so merged cells show up under every column they cover
        let cells: Vec<String> = (0..row.grid_width())
            .filter_map(|c| table.cell(r, c).map(|cell| (c, cell)))
            .map(|(c, cell)| {
                let text: String = cell.text().chars().take(PREVIEW_CHARS).collect();
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if text.is_empty() {
                    format!("[{r},{c}]: (empty)")
                } else {
                    format!("[{r},{c}]: {text}")
                }
            })
            .collect();
        println!("  {}", cells.join(" | "));
    }
    if table.rows.len() > PREVIEW_ROWS {
        println!("  ... {} more rows", table.rows.len() - PREVIEW_ROWS);
    }
}

fn prompt_coordinate() -> Option<NamingCoordinate> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Naming cell for every table (ROW,COL, e.g. 0,0): ");
        io::stdout().flush().ok();
        let line = lines.next()?.ok()?;
        match line.parse::<NamingCoordinate>() {
            Ok(coord) => return Some(coord),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.input.exists() {
        eprintln!("Error: file not found: {}", args.input.display());
        std::process::exit(1);
    }
    if !args.input.is_file() {
        eprintln!("Error: not a file: {}", args.input.display());
        std::process::exit(1);
    }

    let doc = match docx_table_images::open(&args.input) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: cannot open {}: {e}", args.input.display());
            std::process::exit(1);
        }
    };

    if args.preview {
        print_preview(&doc);
        return;
    }

    let coord = match args.cell {
        Some(coord) => coord,
        None => {
            print_preview(&doc);
            let Some(coord) = prompt_coordinate() else {
                eprintln!("Error: no naming cell given");
                std::process::exit(1);
            };
            coord
        }
    };

    let mut options = ExtractOptions {
        record_timeout: args.timeout.map(Duration::from_secs),
        dump_unnamed: args.dump_unnamed,
        write_error_log: !args.no_error_log,
        max_log_entries: args.max_log_entries,
        ..Default::default()
    };
    if let Some(prefix) = args.prefix {
        options.fallback_prefix = prefix;
    }

    println!(
        "Naming cell {coord}, {} tables, output to {}",
        doc.tables.len(),
        args.output.display()
    );

    let report = match docx_table_images::process_document(&doc, &args.output, coord, &options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &report.error_log_path {
        println!("Error log: {}", path.display());
    } else if options.write_error_log {
        eprintln!("Warning: error log could not be written");
    }

    println!("{report}");
}
