//! `dbook` - CLI for dispatchbook
//!
//! This binary provides the command-line interface for keeping the delivery
//! worksheet, its archived history and the driver roster.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use dispatchbook::cli::{
    Cli, Command, ConfigCommand, DriverCommand, RecordCommand, ShowCommand,
};
use dispatchbook::notify::ConsoleNotifier;
use dispatchbook::views::export_file_name;
use dispatchbook::{init_logging, Config, DeliveryRecord, Dispatcher, Storage, WorksheetSelection};

type Book = Dispatcher<Storage, ConsoleNotifier>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    if let Command::Config(config_cmd) = cli.command {
        return handle_config(&config, config_cmd);
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path());
    let storage = Storage::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    let mut book = Dispatcher::open(storage, ConsoleNotifier, config.detection());

    match cli.command {
        Command::Record(record_cmd) => handle_record(&mut book, record_cmd),
        Command::Archive => {
            if let Some(id) = book.archive() {
                println!("{id}");
            }
            Ok(())
        }
        Command::Show(show_cmd) => handle_show(&mut book, show_cmd),
        Command::History(history_cmd) => handle_history(&book, history_cmd.json),
        Command::Driver(driver_cmd) => handle_driver(&mut book, driver_cmd),
        Command::Status(status_cmd) => handle_status(&book, status_cmd.json),
        Command::Config(_) => Ok(()),
    }
}

fn handle_record(book: &mut Book, cmd: RecordCommand) -> Result<()> {
    match cmd {
        RecordCommand::Add(add) => {
            let mut draft = add.to_draft();
            if add.fields.locality.is_none() {
                if let Some(locality) = book.suggest_locality(&draft.driver_name) {
                    draft.locality = locality.to_string();
                }
            }
            let id = book.save_record(draft, None);
            println!("{id}");
        }
        RecordCommand::Update { id, driver, fields } => {
            let Some(record) = book.edit_record(&id) else {
                bail!("no record with id {id} on the current worksheet");
            };
            let mut draft = record.to_draft();
            if let Some(driver) = driver {
                draft.driver_name = driver;
                if fields.locality.is_none() {
                    if let Some(locality) = book.suggest_locality(&draft.driver_name) {
                        draft.locality = locality.to_string();
                    }
                }
            }
            fields.apply(&mut draft);
            book.save_record(draft, Some(&id));
        }
        RecordCommand::Delete { id } => book.delete_record(&id),
    }
    Ok(())
}

fn handle_show(book: &mut Book, cmd: ShowCommand) -> Result<()> {
    book.select_worksheet(cmd.worksheet);

    let sheet_date = match book.selection() {
        WorksheetSelection::Current => Some(Local::now().date_naive()),
        WorksheetSelection::Viewing(id) => book
            .worksheets()
            .iter()
            .find(|sheet| &sheet.id == id)
            .map(|sheet| sheet.date.with_timezone(&Local).date_naive()),
    };

    if cmd.json {
        let view = serde_json::json!({
            "selection": book.selection().to_string(),
            "read_only": book.is_read_only(),
            "date": sheet_date,
            "records": book.display_records(),
            "summary": book.summary(),
            "export_file_name": sheet_date.map(export_file_name),
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if book.is_read_only() {
        println!("Estás viendo una planilla archivada en modo de solo lectura.");
        println!();
    }
    print_records(book.display_records());

    println!();
    println!("{}", book.summary());
    if let Some(date) = sheet_date {
        print_export_hint(date);
    }
    Ok(())
}

fn print_records(records: &[DeliveryRecord]) {
    if records.is_empty() {
        println!("(sin registros)");
        return;
    }
    println!(
        "{:<36}  {:<18}  {:<16}  {:>7}  {:>7}  {:<5}  PARTIDOS / OBSERVACIONES",
        "ID", "CONDUCTOR", "LOCALIDAD", "SISTEMA", "FUERA", "MARCA"
    );
    for record in records {
        let marks: String = [
            (record.is_full_locality, 'T'),
            (record.is_substitute, 'S'),
            (record.is_complicated, 'C'),
        ]
        .iter()
        .map(|&(set, mark)| if set { mark } else { '-' })
        .collect();
        let mut detail = record.parties.join(", ");
        if !record.observations.is_empty() {
            if !detail.is_empty() {
                detail.push_str(" / ");
            }
            detail.push_str(&record.observations);
        }
        println!(
            "{:<36}  {:<18}  {:<16}  {:>7}  {:>7}  {:<5}  {}",
            record.id,
            record.driver_name,
            record.locality,
            record.system_packages,
            record.off_system_packages,
            marks,
            detail
        );
    }
}

fn print_export_hint(date: NaiveDate) {
    println!();
    println!("Archivo de exportación: {}", export_file_name(date));
}

fn handle_history(book: &Book, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(book.worksheets())?);
        return Ok(());
    }

    if book.worksheets().is_empty() {
        println!("(sin planillas archivadas)");
        return Ok(());
    }
    println!("{:<36}  {:<16}  {:>9}  {:>8}", "ID", "FECHA", "REGISTROS", "PAQUETES");
    for sheet in book.worksheets() {
        let packages: u64 = sheet.records.iter().map(DeliveryRecord::total_packages).sum();
        println!(
            "{:<36}  {:<16}  {:>9}  {:>8}",
            sheet.id,
            sheet.date.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
            sheet.records.len(),
            packages
        );
    }
    Ok(())
}

fn handle_driver(book: &mut Book, cmd: DriverCommand) -> Result<()> {
    match cmd {
        DriverCommand::Add { name, locality } => {
            let id = book.save_driver(dispatchbook::DriverDraft { name, locality }, None);
            println!("{id}");
        }
        DriverCommand::Update { id, name, locality } => {
            let Some(existing) = book.titular_drivers().iter().find(|d| d.id == id) else {
                bail!("no titular driver with id {id}");
            };
            let draft = DriverCommand::merge(existing.to_draft(), name, locality);
            book.save_driver(draft, Some(&id));
        }
        DriverCommand::Delete { id } => book.delete_driver(&id),
        DriverCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(book.titular_drivers())?);
            } else if book.titular_drivers().is_empty() {
                println!("(sin conductores titulares)");
            } else {
                println!("{:<36}  {:<24}  LOCALIDAD", "ID", "NOMBRE");
                for driver in book.titular_drivers() {
                    println!("{:<36}  {:<24}  {}", driver.id, driver.name, driver.locality);
                }
            }
        }
    }
    Ok(())
}

fn handle_status(book: &Book, json: bool) -> Result<()> {
    let stats = book.store().stats()?;
    if json {
        let status = serde_json::json!({
            "database_path": book.store().path(),
            "database_size_bytes": stats.db_size_bytes,
            "entries": stats.total_entries,
            "last_write": stats.last_write,
            "current_records": book.current_records().len(),
            "worksheets": book.worksheets().len(),
            "titular_drivers": book.titular_drivers().len(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("dbook status");
        println!("------------");
        println!("Database:        {}", book.store().path().display());
        println!("Size:            {} bytes", stats.db_size_bytes);
        match stats.last_write {
            Some(at) => println!(
                "Last write:      {}",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            ),
            None => println!("Last write:      never"),
        }
        println!();
        println!("Current records: {}", book.current_records().len());
        println!("Worksheets:      {}", book.worksheets().len());
        println!("Drivers:         {}", book.titular_drivers().len());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Migration]");
                println!("  Detection:          {}", config.detection());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
