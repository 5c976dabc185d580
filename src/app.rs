//! Catalog application state and command dispatcher.
//!
//! [`App`] holds everything the interactive catalog needs between commands:
//! the signed-in user, the selected record id and the active search filter.
//! Each input line is split with [`split_args`], parsed into a [`Command`]
//! with clap, and run by [`App::dispatch`], which returns a [`Reply`] for
//! the front end to render. Nothing here depends on how replies are shown.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::StoreError;
use crate::models::{EcuRecord, NewEcu};
use crate::reconcile::{self, ExportMode};
use crate::search::SearchFilter;
use crate::store::RecordStore;

/// One line of catalog input.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the records matching the active search.
    List,

    /// Search by case-insensitive substrings. Omitted fields match anything.
    Search {
        #[arg(short = 'p', long = "part", default_value = "")]
        part_number: String,
        #[arg(short = 'm', long = "model", default_value = "")]
        model_name: String,
        #[arg(short = 'f', long = "maker", default_value = "")]
        manufacturer: String,
    },

    /// Clear the active search and show every record.
    Clear,

    /// Select a record by id for `edit` and `delete`.
    Select { id: i64 },

    /// Add a new record.
    Add {
        part_number: String,
        model_name: String,
        manufacturer: String,
    },

    /// Rewrite the selected record.
    Edit {
        part_number: String,
        model_name: String,
        manufacturer: String,
    },

    /// Delete the selected record.
    Delete,

    /// Import records from a CSV file.
    Import { path: PathBuf },

    /// Export every record to a CSV file.
    Export {
        path: PathBuf,
        /// Include the id column.
        #[arg(long)]
        with_id: bool,
    },

    /// Show how many records are stored.
    Count,

    /// Leave the catalog.
    #[command(alias = "quit", alias = "exit")]
    Logout,
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    Records(Vec<EcuRecord>),
    Logout,
}

fn message(text: impl Into<String>) -> Result<Reply> {
    Ok(Reply::Message(text.into()))
}

pub struct App {
    user: String,
    store: Box<dyn RecordStore>,
    selected: Option<i64>,
    filter: SearchFilter,
    export_mode: ExportMode,
}

impl App {
    pub fn new(user: impl Into<String>, store: Box<dyn RecordStore>, export_mode: ExportMode) -> Self {
        Self {
            user: user.into(),
            store,
            selected: None,
            filter: SearchFilter::all(),
            export_mode,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    /// Parse one input line. Blank lines yield `Ok(None)`.
    ///
    /// Parse errors (including `help`) come back as clap's rendered text.
    pub fn parse(line: &str) -> std::result::Result<Option<Command>, String> {
        let words = split_args(line)?;
        if words.is_empty() {
            return Ok(None);
        }
        CommandLine::try_parse_from(words)
            .map(|cl| Some(cl.command))
            .map_err(|e| e.render().to_string())
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::List => Ok(Reply::Records(self.store.search(&self.filter).await?)),
            Command::Search {
                part_number,
                model_name,
                manufacturer,
            } => {
                self.filter = SearchFilter::new(&part_number, &model_name, &manufacturer);
                Ok(Reply::Records(self.store.search(&self.filter).await?))
            }
            Command::Clear => {
                self.filter = SearchFilter::all();
                Ok(Reply::Records(self.store.get_all().await?))
            }
            Command::Select { id } => match self.store.get(id).await? {
                Some(record) => {
                    self.selected = Some(id);
                    Ok(Reply::Records(vec![record]))
                }
                None => message(format!("No record with id {}.", id)),
            },
            Command::Add {
                part_number,
                model_name,
                manufacturer,
            } => self.add(NewEcu::new(&part_number, &model_name, &manufacturer)).await,
            Command::Edit {
                part_number,
                model_name,
                manufacturer,
            } => self.edit(NewEcu::new(&part_number, &model_name, &manufacturer)).await,
            Command::Delete => self.delete().await,
            Command::Import { path } => {
                let report = reconcile::import_file(self.store.as_ref(), &path).await?;
                self.filter = SearchFilter::all();
                message(format!(
                    "Imported: {}\nDuplicates skipped: {}\nIncomplete rows ignored: {}",
                    report.imported, report.skipped, report.ignored
                ))
            }
            Command::Export { path, with_id } => {
                let records = self.store.get_all().await?;
                if records.is_empty() {
                    return message("No records to export.");
                }
                let mode = if with_id {
                    ExportMode::WithId
                } else {
                    self.export_mode
                };
                let n = reconcile::export_file(&path, &records, mode)?;
                message(format!("{} records saved to {}", n, path.display()))
            }
            Command::Count => message(format!("{} records", self.store.count().await?)),
            Command::Logout => Ok(Reply::Logout),
        }
    }

    async fn add(&mut self, ecu: NewEcu) -> Result<Reply> {
        if !ecu.is_complete() {
            return message("Fill in all fields.");
        }
        match self.store.insert(&ecu).await {
            Ok(id) => {
                self.filter = SearchFilter::all();
                message(format!("Added record {}.", id))
            }
            Err(StoreError::Duplicate { .. }) => message("This ECU already exists."),
            Err(e) => Err(e.into()),
        }
    }

    async fn edit(&mut self, ecu: NewEcu) -> Result<Reply> {
        let Some(id) = self.selected else {
            return message("Select a record first.");
        };
        if !ecu.is_complete() {
            return message("Fill in all fields.");
        }
        match self.store.update(id, &ecu).await {
            Ok(true) => {
                self.filter = SearchFilter::all();
                message(format!("Record {} updated.", id))
            }
            Ok(false) => message("Failed to update record."),
            Err(StoreError::Duplicate { .. }) => {
                message("Another record already has this part number and model.")
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&mut self) -> Result<Reply> {
        let Some(id) = self.selected else {
            return message("Select a record first.");
        };
        let removed = self.store.delete(id).await?;
        self.selected = None;
        self.filter = SearchFilter::all();
        if removed {
            message(format!("Record {} deleted.", id))
        } else {
            message(format!("Record {} no longer exists.", id))
        }
    }
}

/// Split a command line into words. Single or double quotes group words;
/// a backslash escapes the next character outside single quotes.
pub fn split_args(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => match chars.next() {
                Some(next) => {
                    current.push(next);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Render records as an aligned table.
pub fn format_records(records: &[EcuRecord]) -> String {
    if records.is_empty() {
        return "No records.".to_string();
    }
    let mut out = format!(
        "{:>6}  {:<20} {:<30} {:<20}\n",
        "ID", "PART NUMBER", "MODEL", "MANUFACTURER"
    );
    out.push_str(&"-".repeat(79));
    for r in records {
        out.push('\n');
        out.push_str(&format!(
            "{:>6}  {:<20} {:<30} {:<20}",
            r.id, r.part_number, r.model_name, r.manufacturer
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    fn app() -> App {
        App::new("victor", Box::new(MemoryStore::new()), ExportMode::Plain)
    }

    async fn run(app: &mut App, line: &str) -> Reply {
        let cmd = App::parse(line).unwrap().unwrap();
        app.dispatch(cmd).await.unwrap()
    }

    async fn run_msg(app: &mut App, line: &str) -> String {
        match run(app, line).await {
            Reply::Message(text) => text,
            other => panic!("expected a message, got {:?}", other),
        }
    }

    fn records(reply: Reply) -> Vec<EcuRecord> {
        match reply {
            Reply::Records(r) => r,
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[test]
    fn split_args_handles_quotes_and_escapes() {
        assert_eq!(
            split_args(r#"add 0281 "EDC 17" 'Bosch GmbH'"#).unwrap(),
            vec!["add", "0281", "EDC 17", "Bosch GmbH"]
        );
        assert_eq!(split_args(r"add a\ b c").unwrap(), vec!["add", "a b", "c"]);
        assert_eq!(split_args(r#"x """#).unwrap(), vec!["x", ""]);
        assert!(split_args("add \"open").is_err());
        assert!(split_args("   ").unwrap().is_empty());
    }

    #[test]
    fn parse_commands() {
        assert_eq!(App::parse("").unwrap(), None);
        assert_eq!(App::parse("quit").unwrap(), Some(Command::Logout));
        assert_eq!(
            App::parse("search -m edc").unwrap(),
            Some(Command::Search {
                part_number: String::new(),
                model_name: "edc".to_string(),
                manufacturer: String::new(),
            })
        );
        assert!(App::parse("frobnicate").is_err());
        assert!(App::parse("add only-two args").is_err());
    }

    #[tokio::test]
    async fn add_list_and_duplicate() {
        let mut app = app();
        assert_eq!(run_msg(&mut app, "add 123 ModelA Bosch").await, "Added record 1.");
        assert_eq!(
            run_msg(&mut app, "add 123 ModelA Siemens").await,
            "This ECU already exists."
        );
        assert_eq!(records(run(&mut app, "list").await).len(), 1);
    }

    #[tokio::test]
    async fn add_rejects_empty_fields() {
        let mut app = app();
        assert_eq!(run_msg(&mut app, "add 123 '  ' Bosch").await, "Fill in all fields.");
        assert_eq!(run_msg(&mut app, "count").await, "0 records");
    }

    #[tokio::test]
    async fn edit_and_delete_need_a_selection() {
        let mut app = app();
        run(&mut app, "add 1 A F").await;
        assert_eq!(run_msg(&mut app, "edit 1 A G").await, "Select a record first.");
        assert_eq!(run_msg(&mut app, "delete").await, "Select a record first.");
    }

    #[tokio::test]
    async fn select_edit_delete_flow() {
        let mut app = app();
        run(&mut app, "add 1 A F").await;
        run(&mut app, "add 2 B F").await;

        let selected = records(run(&mut app, "select 2").await);
        assert_eq!(selected[0].part_number, "2");
        assert_eq!(app.selected(), Some(2));

        assert_eq!(run_msg(&mut app, "edit 20 BB G").await, "Record 2 updated.");
        assert_eq!(
            run_msg(&mut app, "edit 1 A G").await,
            "Another record already has this part number and model."
        );

        assert_eq!(run_msg(&mut app, "delete").await, "Record 2 deleted.");
        assert_eq!(app.selected(), None);
        assert_eq!(records(run(&mut app, "list").await).len(), 1);
    }

    #[tokio::test]
    async fn selecting_missing_id_keeps_selection() {
        let mut app = app();
        run(&mut app, "add 1 A F").await;
        run(&mut app, "select 1").await;
        assert_eq!(run_msg(&mut app, "select 9").await, "No record with id 9.");
        assert_eq!(app.selected(), Some(1));
    }

    #[tokio::test]
    async fn search_sets_filter_and_clear_resets_it() {
        let mut app = app();
        run(&mut app, "add 0281 EDC16 Bosch").await;
        run(&mut app, "add 5WS SID803 Siemens").await;

        let hits = records(run(&mut app, "search --maker SIEM").await);
        assert_eq!(hits.len(), 1);
        assert_eq!(records(run(&mut app, "list").await).len(), 1);

        assert_eq!(records(run(&mut app, "clear").await).len(), 2);
        assert!(app.filter().is_empty());
    }

    #[tokio::test]
    async fn export_and_import_through_commands() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ecus.csv");
        let path_arg = path.display().to_string();

        let mut app = app();
        assert_eq!(
            run_msg(&mut app, &format!("export '{}'", path_arg)).await,
            "No records to export."
        );
        assert!(!path.exists());

        run(&mut app, "add 123 ModelA Bosch").await;
        run(&mut app, "add 456 ModelB Bosch").await;
        let msg = run_msg(&mut app, &format!("export '{}'", path_arg)).await;
        assert!(msg.starts_with("2 records saved"));

        let mut other = App::new("victor", Box::new(MemoryStore::new()), ExportMode::Plain);
        let msg = run_msg(&mut other, &format!("import '{}'", path_arg)).await;
        assert_eq!(msg, "Imported: 2\nDuplicates skipped: 0\nIncomplete rows ignored: 0");
        let msg = run_msg(&mut other, &format!("import '{}'", path_arg)).await;
        assert_eq!(msg, "Imported: 0\nDuplicates skipped: 2\nIncomplete rows ignored: 0");
    }

    #[tokio::test]
    async fn import_of_missing_file_is_an_error() {
        let mut app = app();
        let cmd = App::parse("import /definitely/not/here.csv").unwrap().unwrap();
        assert!(app.dispatch(cmd).await.is_err());
    }

    #[test]
    fn table_rendering() {
        assert_eq!(format_records(&[]), "No records.");
        let out = format_records(&[EcuRecord {
            id: 7,
            part_number: "0281".into(),
            model_name: "EDC17".into(),
            manufacturer: "Bosch".into(),
        }]);
        assert!(out.lines().count() == 3);
        assert!(out.contains("0281"));
    }
}
