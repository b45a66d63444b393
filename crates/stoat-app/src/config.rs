//! Layered configuration scopes backed by TOML files
//!
//! A scope is one parsed table, optionally layered over the base table it
//! was opened against. Scopes are immutable once loaded; a reload opens a
//! fresh scope and replaces the old one whole.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stoat_core::prelude::*;
use toml::{Table, Value};

/// File backing the base scope
pub const BASE_FILE: &str = "stoat.toml";

/// Suffix of per-schema settings files: `<schema_id>.schema.toml`
pub const SCHEMA_FILE_SUFFIX: &str = ".schema.toml";

/// Schema identifiers starting with this prefix are reserved for the
/// engine's internal schemas and never have settings of their own
const RESERVED_SCHEMA_PREFIX: char = '.';

#[derive(Debug, Clone)]
struct Scope {
    table: Arc<Table>,
    /// Base table consulted when a key is absent from `table`
    base: Option<Arc<Table>>,
}

/// Loads and layers configuration scopes from one directory.
///
/// All load failures surface as `false` returns and leave the previously
/// open scope in place, so callers keep whatever configuration they had.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_dir: PathBuf,
    scope: Option<Scope>,
}

impl ConfigStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            scope: None,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn is_open(&self) -> bool {
        self.scope.is_some()
    }

    /// Load the base scope from `stoat.toml`
    pub fn open_base(&mut self) -> bool {
        let path = self.config_dir.join(BASE_FILE);
        match load_table(&path) {
            Ok(table) => {
                self.scope = Some(Scope {
                    table: Arc::new(table),
                    base: None,
                });
                debug!("Opened base configuration scope");
                true
            }
            Err(Error::ConfigNotFound { .. }) => {
                debug!("No base configuration at {}", path.display());
                false
            }
            Err(e) => {
                warn!("Failed to load base configuration: {}", e);
                false
            }
        }
    }

    /// Load the scope for one schema, layered over `base`.
    ///
    /// Fails when the identifier is empty or reserved, when `base` has no
    /// open scope to layer over, or when the file is absent or malformed.
    pub fn open_schema(&mut self, schema_id: &str, base: &ConfigStore) -> bool {
        if schema_id.is_empty() || schema_id.starts_with(RESERVED_SCHEMA_PREFIX) {
            debug!("Ignoring reserved schema id {:?}", schema_id);
            return false;
        }
        let Some(base_scope) = &base.scope else {
            debug!("No base scope to layer schema {} over", schema_id);
            return false;
        };
        let path = self
            .config_dir
            .join(format!("{}{}", schema_id, SCHEMA_FILE_SUFFIX));
        match load_table(&path) {
            Ok(table) => {
                self.scope = Some(Scope {
                    table: Arc::new(table),
                    base: Some(Arc::clone(&base_scope.table)),
                });
                debug!("Opened schema scope {}", schema_id);
                true
            }
            Err(Error::ConfigNotFound { .. }) => {
                debug!("No settings for schema {}", schema_id);
                false
            }
            Err(e) => {
                warn!("Failed to load settings for schema {}: {}", schema_id, e);
                false
            }
        }
    }

    /// Whether the scope's own table defines `section` as a table.
    ///
    /// Layering deliberately does not apply here: a schema without its own
    /// section must fall back to the base scope as a whole, not borrow the
    /// base's section piecemeal.
    pub fn has_section(&self, section: &str) -> bool {
        match &self.scope {
            Some(scope) => matches!(scope.table.get(section), Some(Value::Table(_))),
            None => false,
        }
    }

    /// Scalar value at a slash- or dot-delimited key path, rendered as a
    /// string. Tables, arrays, and missing keys yield `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.lookup(key).and_then(value_to_string)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.lookup(key).and_then(Value::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.lookup(key).and_then(Value::as_integer)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.lookup(key).and_then(|value| match value {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        })
    }

    /// Release the open scope; a no-op when nothing is open
    pub fn close(&mut self) {
        if self.scope.take().is_some() {
            trace!("Configuration scope closed");
        }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let scope = self.scope.as_ref()?;
        lookup_path(&scope.table, key)
            .or_else(|| scope.base.as_deref().and_then(|base| lookup_path(base, key)))
    }
}

fn load_table(path: &Path) -> Result<Table> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::config_not_found(path));
        }
        Err(e) => return Err(e.into()),
    };
    text.parse::<Table>()
        .map_err(|e| Error::config_invalid(format!("{}: {}", path.display(), e)))
}

fn lookup_path<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let mut segments = key.split(['/', '.']);
    let mut value = table.get(segments.next()?)?;
    for segment in segments {
        value = value.as_table()?.get(segment)?;
    }
    Some(value)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}
