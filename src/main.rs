use std::path::PathBuf;

use clap::Parser;
use comfy_table::{Cell, Table as ComfyTable, presets::UTF8_FULL};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use sqlite_inspector::{
    Command, Cursor, DatabaseConnection, Schema, Settings, Statement, Value, parse_command,
};
use tracing_subscriber::EnvFilter;

/// Interactive inspector for local SQLite databases
#[derive(Parser, Debug)]
#[command(name = "sqlinspect")]
#[command(about = "Inspect and query a local SQLite database", long_about = None)]
struct Args {
    /// Database file
    database: Option<PathBuf>,

    /// Execute a single statement and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Open the database read-only
    #[arg(long)]
    read_only: bool,

    /// Log filter (e.g. "info", "sqlite_inspector=debug")
    #[arg(long)]
    log_level: Option<String>,

    /// Do not load or save line history
    #[arg(long)]
    no_history: bool,
}

/// Настройки: CLI args > ENV > config file > defaults
fn load_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::load()?;

    if let Some(database) = &args.database {
        settings.database = Some(database.clone());
    }
    if args.read_only {
        settings.read_only = true;
    }
    if let Some(log_level) = &args.log_level {
        settings.log_level.clone_from(log_level);
    }
    if args.no_history {
        settings.history = false;
    }
    Ok(settings)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = load_settings(&args)?;
    init_logging(&settings.log_level);

    let Some(path) = settings.database.clone() else {
        eprintln!("✗ No database file given. Usage: sqlinspect <DATABASE>");
        std::process::exit(2);
    };

    let connection = match DatabaseConnection::open(&path, settings.open_options()).await {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("✗ {}", e);
            return Err(e.into());
        }
    };

    // Неинтерактивный режим: одна команда и выход
    if let Some(sql) = &args.command {
        let result = run_statement(&connection, Statement::new(sql.as_str())).await;
        connection.close().await?;
        return result;
    }

    let outcome = repl(&connection, &settings).await;
    connection.close().await?;
    outcome
}

async fn repl(connection: &DatabaseConnection, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = DefaultEditor::new()?;

    let history_file = settings
        .history
        .then(dirs::home_dir)
        .flatten()
        .map(|mut p| {
            p.push(".sqlinspect_history");
            p
        });

    if let Some(ref path) = history_file {
        let _ = rl.load_history(path); // Ignore error if file doesn't exist
    }

    println!("Connected to {}", connection.path().display());
    println!("Type \\? for help, \\q to quit.\n");

    let mut params: Vec<Value> = Vec::new();

    loop {
        let line = match rl.readline("sqlinspect> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                return Err(err.into());
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };

        let result = match command {
            Command::Quit => break,
            Command::Help => {
                print_help();
                Ok(())
            }
            Command::ListTables => list_tables(connection).await,
            Command::Describe(table) => describe_table(connection, &table).await,
            Command::Schema => print_schema_json(connection).await,
            Command::Bind(values) => {
                println!("{} parameter(s) bound for the next statement", values.len());
                params = values;
                Ok(())
            }
            Command::Unbind => {
                params.clear();
                Ok(())
            }
            Command::Sql(sql) => {
                let statement = Statement::with_params(sql, std::mem::take(&mut params));
                run_statement(connection, statement).await
            }
        };

        if let Err(e) = result {
            eprintln!("✗ {}", e);
        }
    }

    // Save history before exiting
    if let Some(ref path) = history_file {
        let _ = rl.save_history(path);
    }
    Ok(())
}

fn print_help() {
    println!("Meta-commands:");
    println!("  \\q, \\quit            - Quit");
    println!("  \\dt                  - List tables and views");
    println!("  \\d <table>           - Describe table");
    println!("  \\schema              - Print the whole schema as JSON");
    println!("  \\bind v1, v2, ...    - Bind parameters for the next statement");
    println!("  \\unbind              - Drop bound parameters");
    println!("  \\?, \\h, \\help        - Show this help");
    println!("\nAnything else is executed as SQL.");
}

async fn run_statement(connection: &DatabaseConnection, statement: Statement) -> Result<(), Box<dyn std::error::Error>> {
    match connection.execute(statement).await? {
        Some(cursor) => print_rows(&cursor).await,
        None => {
            println!("OK");
            Ok(())
        }
    }
}

async fn print_rows(cursor: &Cursor) -> Result<(), Box<dyn std::error::Error>> {
    let mut table = ComfyTable::new();
    table.load_preset(UTF8_FULL);
    table.set_header(cursor.columns().iter().map(|c| Cell::new(&c.name)));

    let mut count = 0usize;
    while let Some(row) = cursor.next().await? {
        table.add_row(row.values.iter().map(Cell::new));
        count += 1;
    }
    cursor.close().await?;

    if count == 0 {
        println!("(0 rows)");
    } else {
        println!("{}\n({} rows)", table, count);
    }
    Ok(())
}

async fn list_tables(connection: &DatabaseConnection) -> Result<(), Box<dyn std::error::Error>> {
    let schema = connection.read_schema().await?;

    let mut table = ComfyTable::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "Type", "Columns", "Row id"]);
    for t in &schema.tables {
        table.add_row(vec![
            Cell::new(&t.name),
            Cell::new(if t.is_view { "view" } else { "table" }),
            Cell::new(t.columns.len()),
            Cell::new(t.row_id_name.map_or("-", |r| r.as_str())),
        ]);
    }
    println!("{}", table);
    Ok(())
}

async fn describe_table(connection: &DatabaseConnection, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let schema: Schema = connection.read_schema().await?;
    let Some(t) = schema.get_table(name) else {
        println!("Table '{}' not found", name);
        return Ok(());
    };

    let mut table = ComfyTable::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Column", "Type", "Primary key"]);
    for column in &t.columns {
        table.add_row(vec![
            Cell::new(&column.name),
            Cell::new(column.sql_type),
            Cell::new(if column.in_primary_key { "yes" } else { "" }),
        ]);
    }
    println!("{} \"{}\"", if t.is_view { "View" } else { "Table" }, t.name);
    println!("{}", table);
    if let Some(row_id) = t.row_id_name {
        println!("Rows addressed by {}", row_id);
    }
    Ok(())
}

async fn print_schema_json(connection: &DatabaseConnection) -> Result<(), Box<dyn std::error::Error>> {
    let schema = connection.read_schema().await?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
