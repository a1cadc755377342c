use super::analysis::missing_imports;
use super::syntax::{Import, RequiredImport, is_import_statement, recognize_import};

/// A module whose top-level statements can be read and extended.
///
/// This is the boundary to whatever owns the module's syntax tree;
/// [`SourceModule`] is a plain text implementation.
pub trait EditableModule {
    /// Top-level statements in source order.
    fn top_level_statements(&self) -> Vec<String>;

    /// Insert `statement` so that it becomes the top-level statement at
    /// `index`. An index past the end appends.
    fn insert_top_level(&mut self, index: usize, statement: &str);
}

/// Line-based module: every non-blank line starting at column zero opens a
/// new top-level statement; indented lines continue the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceModule {
    lines: Vec<String>,
}

impl SourceModule {
    pub fn parse(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_string).collect(),
        }
    }

    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    fn is_statement_start(line: &str) -> bool {
        !line.trim().is_empty()
            && !line.starts_with(char::is_whitespace)
            && !line.starts_with('#')
    }

    fn is_continuation(line: &str) -> bool {
        !line.trim().is_empty() && line.starts_with(char::is_whitespace)
    }

    /// Line ranges `[start, end)` of top-level statements, trailing blank
    /// and comment lines excluded.
    fn statement_spans(&self) -> Vec<(usize, usize)> {
        let starts: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| Self::is_statement_start(line))
            .map(|(i, _)| i)
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let limit = starts.get(n + 1).copied().unwrap_or(self.lines.len());
                let end = (start + 1..limit)
                    .rev()
                    .find(|&i| Self::is_continuation(&self.lines[i]))
                    .map_or(start + 1, |i| i + 1);
                (start, end)
            })
            .collect()
    }
}

impl EditableModule for SourceModule {
    fn top_level_statements(&self) -> Vec<String> {
        self.statement_spans()
            .into_iter()
            .map(|(start, end)| self.lines[start..end].join("\n"))
            .collect()
    }

    fn insert_top_level(&mut self, index: usize, statement: &str) {
        let spans = self.statement_spans();
        let line = match index.checked_sub(1) {
            None => 0,
            Some(previous) => spans
                .get(previous)
                .or(spans.last())
                .map_or(0, |&(_, end)| end),
        };
        for (offset, text) in statement.lines().enumerate() {
            self.lines.insert(line + offset, text.to_string());
        }
    }
}

/// All recognised import statements of a module.
pub fn recognize_imports(module: &impl EditableModule) -> Vec<Import> {
    module
        .top_level_statements()
        .iter()
        .filter_map(|statement| recognize_import(statement))
        .collect()
}

/// Insert imports for those of `required` the module does not already cover.
///
/// New statements go right after the last existing import, or at the top of
/// a module without imports. Returns the inserted imports.
pub fn add_imports(module: &mut impl EditableModule, required: &[RequiredImport]) -> Vec<Import> {
    let existing = recognize_imports(module);
    let mut pending = missing_imports(&existing, required);
    let mut seen = std::collections::HashSet::new();
    pending.retain(|import| seen.insert(import.clone()));

    let mut position = module
        .top_level_statements()
        .iter()
        .rposition(|statement| is_import_statement(statement))
        .map_or(0, |last| last + 1);

    let mut added = Vec::with_capacity(pending.len());
    for required in pending {
        let import = required.to_import();
        tracing::debug!("Adding import `{}`", import);
        module.insert_top_level(position, &import.to_string());
        position += 1;
        added.push(import);
    }
    added
}
