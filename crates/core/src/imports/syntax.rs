//! The import statement grammar:
//!
//! ```text
//! import M
//! import M as A
//! from M import all
//! from M import all hiding A, B
//! from M import A, B
//! ```

use crate::model::{Identifier, QualifiedName};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static MODULE_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^import\s+(\S+)(?:\s+as\s+(\S+))?$")
        .unwrap_or_else(|e| panic!("invalid import regex: {e}"))
});

static ALL_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^from\s+(\S+)\s+import\s+all(?:\s+hiding\s+(.+))?$")
        .unwrap_or_else(|e| panic!("invalid import regex: {e}"))
});

static LIST_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^from\s+(\S+)\s+import\s+(.+)$")
        .unwrap_or_else(|e| panic!("invalid import regex: {e}"))
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImportedNames {
    Module { alias: Option<Identifier> },
    List { names: Vec<Identifier> },
    All { except: Vec<Identifier> },
}

/// A recognised import statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Import {
    pub from: QualifiedName,
    pub imported: ImportedNames,
}

impl Import {
    pub fn module(from: QualifiedName) -> Self {
        Self {
            from,
            imported: ImportedNames::Module { alias: None },
        }
    }

    pub fn list(from: QualifiedName, names: Vec<Identifier>) -> Self {
        Self {
            from,
            imported: ImportedNames::List { names },
        }
    }

    pub fn all(from: QualifiedName, except: Vec<Identifier>) -> Self {
        Self {
            from,
            imported: ImportedNames::All { except },
        }
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[Identifier]) -> fmt::Result {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(name.as_str())?;
    }
    Ok(())
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.imported {
            ImportedNames::Module { alias: None } => write!(f, "import {}", self.from),
            ImportedNames::Module { alias: Some(alias) } => {
                write!(f, "import {} as {}", self.from, alias)
            }
            ImportedNames::All { except } if except.is_empty() => {
                write!(f, "from {} import all", self.from)
            }
            ImportedNames::All { except } => {
                write!(f, "from {} import all hiding ", self.from)?;
                write_names(f, except)
            }
            ImportedNames::List { names } => {
                write!(f, "from {} import ", self.from)?;
                write_names(f, names)
            }
        }
    }
}

fn parse_names(raw: &str) -> Option<Vec<Identifier>> {
    let names = raw
        .split(',')
        .map(|name| Identifier::parse(name.trim()).ok())
        .collect::<Option<Vec<_>>>()?;
    (!names.is_empty()).then_some(names)
}

/// Recognise a single import statement. Anything outside the grammar
/// (including polyglot imports and exports) yields `None`.
pub fn recognize_import(statement: &str) -> Option<Import> {
    let statement = statement.trim();

    if let Some(caps) = MODULE_IMPORT_RE.captures(statement) {
        let from = QualifiedName::parse(caps.get(1)?.as_str()).ok()?;
        let alias = match caps.get(2) {
            Some(alias) => Some(Identifier::parse(alias.as_str()).ok()?),
            None => None,
        };
        return Some(Import {
            from,
            imported: ImportedNames::Module { alias },
        });
    }

    if let Some(caps) = ALL_IMPORT_RE.captures(statement) {
        let from = QualifiedName::parse(caps.get(1)?.as_str()).ok()?;
        let except = match caps.get(2) {
            Some(hidden) => parse_names(hidden.as_str())?,
            None => Vec::new(),
        };
        return Some(Import::all(from, except));
    }

    let caps = LIST_IMPORT_RE.captures(statement)?;
    let from = QualifiedName::parse(caps.get(1)?.as_str()).ok()?;
    let names = parse_names(caps.get(2)?.as_str())?;
    Some(Import::list(from, names))
}

/// Whether a line starts an import statement of any flavour, recognised or
/// not. Used to place new imports next to existing ones.
pub fn is_import_statement(statement: &str) -> bool {
    let statement = statement.trim_start();
    ["import ", "from ", "polyglot "]
        .iter()
        .any(|keyword| statement.starts_with(keyword))
}

/// An import needed to reference an entity by its short name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RequiredImport {
    /// Import the module itself: `import M`.
    Qualified { module: QualifiedName },
    /// Import one name out of a module: `from M import N`.
    Unqualified {
        from: QualifiedName,
        import: Identifier,
    },
}

impl RequiredImport {
    pub fn to_import(&self) -> Import {
        match self {
            RequiredImport::Qualified { module } => Import::module(module.clone()),
            RequiredImport::Unqualified { from, import } => {
                Import::list(from.clone(), vec![import.clone()])
            }
        }
    }
}

impl fmt::Display for RequiredImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_import().fmt(f)
    }
}
