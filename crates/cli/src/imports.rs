use crate::fixture::{self, Fixture};
use semscope_core::imports::{
    SourceModule, add_imports, detect_import_conflicts, recognize_imports,
};
use std::path::PathBuf;

pub async fn run(
    fixture: PathBuf,
    name: String,
    module: Option<PathBuf>,
) -> Result<String, Box<dyn std::error::Error>> {
    let session = Fixture::load(&fixture)?.replay().await?;
    let ids = fixture::find(&session, &name).await?;
    let id = ids[0];
    let required = session.required_imports(id).await.unwrap_or_default();

    let Some(module_path) = module else {
        if required.is_empty() {
            return Ok(format!("{} needs no imports", name));
        }
        let lines: Vec<String> = required.iter().map(|r| r.to_import().to_string()).collect();
        return Ok(lines.join("\n"));
    };

    let source = std::fs::read_to_string(&module_path)
        .map_err(|e| format!("Cannot read module {}: {}", module_path.display(), e))?;
    let mut source_module = SourceModule::parse(&source);

    {
        let db = session.db().read().await;
        let existing = recognize_imports(&source_module);
        for import in &required {
            if let Some(conflict) =
                detect_import_conflicts(&db, session.resolver(), &existing, import)
            {
                tracing::warn!(
                    "Importing {} shadows {} already in scope",
                    import,
                    conflict.fully_qualified
                );
                eprintln!(
                    "warning: {} is already imported as {}; use the qualified name",
                    conflict.name, conflict.fully_qualified
                );
            }
        }
    }

    let added = add_imports(&mut source_module, &required);
    tracing::info!("Added {} import(s) to {}", added.len(), module_path.display());
    Ok(source_module.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "project": "local.Demo",
        "snapshot": {
            "currentVersion": 3,
            "entries": [
                { "id": 1, "suggestion": { "type": "type", "module": "Standard.Base.Data.Vector", "name": "Vector", "reexport": "Standard.Base" } },
                { "id": 2, "suggestion": { "type": "type", "module": "local.Demo.Shapes", "name": "Vector" } }
            ]
        }
    }"#;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_prints_required_imports() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write(&dir, "fixture.json", FIXTURE);
        let output = run(fixture, "Standard.Base.Data.Vector.Vector".to_string(), None)
            .await
            .unwrap();
        assert_eq!(output, "from Standard.Base import Vector");
    }

    #[tokio::test]
    async fn test_adds_imports_to_module() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write(&dir, "fixture.json", FIXTURE);
        let module = write(&dir, "Main.enso", "import Standard.Visualization\n\nmain = 42\n");
        let output = run(fixture, "local.Demo.Shapes.Vector".to_string(), Some(module))
            .await
            .unwrap();
        assert_eq!(
            output,
            "import Standard.Visualization\nfrom local.Demo.Shapes import Vector\n\nmain = 42\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write(&dir, "fixture.json", FIXTURE);
        assert!(run(fixture, "local.Demo.Nothing".to_string(), None).await.is_err());
    }
}
