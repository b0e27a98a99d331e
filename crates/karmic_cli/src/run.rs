use crate::commands::{Commands, IdentityCommands, InterpretationCommands, ReportCommands};

use karmic_core::{
    enrich, normalize, AuthorizationRegistry, Category, ConfigError, DbError,
    InterpretationEntry, InterpretationKeyError, InterpretationRepository, ProfileStore,
    RegistryError, RepoError, SqliteDocumentRepository,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub(crate) type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub(crate) enum CliError {
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
    Registry(RegistryError),
    Input(String),
    File { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Input(message) => write!(f, "{message}"),
            Self::File { path, source } => write!(f, "`{}`: {source}", path.display()),
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
        }
    }
}

impl Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RegistryError> for CliError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<InterpretationKeyError> for CliError {
    fn from(value: InterpretationKeyError) -> Self {
        Self::Input(value.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Executes `command` against the durable tier and returns its JSON result.
pub(crate) fn execute(command: Commands, repo: SqliteDocumentRepository<'_>) -> CliResult<Value> {
    match command {
        Commands::Identity { action } => identity(action, repo),
        Commands::Interpretation { action } => interpretation(action, repo),
        Commands::Report { action } => report(action, repo),
    }
}

fn identity(action: IdentityCommands, repo: SqliteDocumentRepository<'_>) -> CliResult<Value> {
    let mut registry = AuthorizationRegistry::load(repo)?;
    match action {
        IdentityCommands::Add { email } => {
            let added = registry.add(&email)?;
            Ok(json!({ "email": normalize(&email), "added": added }))
        }
        IdentityCommands::Remove { email, strict } => {
            let removed = if strict {
                registry.try_remove(&email)?
            } else {
                registry.remove(&email)?
            };
            Ok(json!({
                "email": normalize(&email),
                "removed": removed,
                "protected": registry.is_protected(&email),
            }))
        }
        IdentityCommands::List => {
            let entries: Vec<Value> = registry
                .list()
                .iter()
                .map(|identity| {
                    json!({
                        "email": identity,
                        "protected": registry.is_protected(identity.as_str()),
                    })
                })
                .collect();
            Ok(Value::Array(entries))
        }
    }
}

fn interpretation(
    action: InterpretationCommands,
    repo: SqliteDocumentRepository<'_>,
) -> CliResult<Value> {
    let mut interpretations = InterpretationRepository::load(repo)?;
    match action {
        InterpretationCommands::Set {
            category,
            number,
            title,
            content,
            content_file,
        } => {
            let category: Category = category.parse()?;
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => read_file(&path)?,
                (None, None) => {
                    return Err(CliError::Input(
                        "either --content or --content-file is required".to_string(),
                    ))
                }
            };
            let entry = interpretations.set_entry(category, number, &title, &content)?;
            Ok(serde_json::to_value(entry)?)
        }
        InterpretationCommands::Get { category, number } => {
            let category: Category = category.parse()?;
            let entry = interpretations.get_entry(category, number);
            Ok(json!({
                "entry": entry,
                "authored": interpretations.has_entry(category, number),
            }))
        }
        InterpretationCommands::Delete { category, number } => {
            let category: Category = category.parse()?;
            let deleted = interpretations.delete_entry(category, number)?;
            Ok(json!({ "deleted": deleted }))
        }
        InterpretationCommands::Export { output } => {
            let exported = serde_json::to_value(interpretations.export_all())?;
            match output {
                Some(path) => {
                    let body = serde_json::to_string_pretty(&exported)?;
                    std::fs::write(&path, body)
                        .map_err(|source| CliError::File { path: path.clone(), source })?;
                    Ok(json!({ "exported": interpretations.len(), "path": path }))
                }
                None => Ok(exported),
            }
        }
        InterpretationCommands::Import { file } => {
            let body = read_file(&file)?;
            let entries: BTreeMap<String, InterpretationEntry> = serde_json::from_str(&body)?;
            let summary = interpretations.import_all(entries)?;
            Ok(serde_json::to_value(summary)?)
        }
        InterpretationCommands::Render { category, number } => {
            let category: Category = category.parse()?;
            let entry = interpretations.get_entry(category, number);
            Ok(json!({
                "id": entry.id,
                "title": entry.title,
                "html": enrich(&entry.content),
            }))
        }
    }
}

fn report(action: ReportCommands, repo: SqliteDocumentRepository<'_>) -> CliResult<Value> {
    let profiles = ProfileStore::new(repo);
    match action {
        ReportCommands::List { email } => Ok(serde_json::to_value(profiles.list_reports(&email)?)?),
        ReportCommands::Counts => Ok(serde_json::to_value(profiles.report_counts()?)?),
    }
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}
