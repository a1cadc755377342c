use semscope_api::{SuggestionsDatabaseSnapshot, SuggestionRecord};
use semscope_core::imports::{
    EditableModule, Import, RequiredImport, SourceModule, add_imports, covers,
    detect_import_conflicts, recognize_import, recognize_imports,
};
use semscope_core::model::{Identifier, QualifiedName};
use semscope_core::{InMemoryLanguageServer, Session, SessionConfig};
use serde_json::json;
use std::sync::Arc;

fn qn(s: &str) -> QualifiedName {
    QualifiedName::parse(s).unwrap()
}

fn id(s: &str) -> Identifier {
    Identifier::parse(s).unwrap()
}

fn library_snapshot() -> SuggestionsDatabaseSnapshot {
    serde_json::from_value(json!({
        "currentVersion": 1,
        "entries": [
            { "id": 1, "suggestion": { "type": "module", "module": "Standard.Base.Data.Vector" } },
            { "id": 2, "suggestion": {
                "type": "type",
                "module": "Standard.Base.Data.Vector",
                "name": "Vector",
                "reexport": "Standard.Base"
            } },
            { "id": 3, "suggestion": {
                "type": "method",
                "module": "Standard.Base.Data.Vector",
                "name": "new",
                "selfType": "Standard.Base.Data.Vector.Vector",
                "returnType": "Standard.Base.Data.Vector.Vector",
                "isStatic": true
            } },
            { "id": 4, "suggestion": {
                "type": "type",
                "module": "local.Project.Foo",
                "name": "Vector"
            } },
            { "id": 5, "suggestion": { "type": "module", "module": "local.Project.Foo" } },
            { "id": 6, "suggestion": { "type": "module", "module": "Standard.Table.Extensions" } },
            { "id": 7, "suggestion": {
                "type": "method",
                "module": "Standard.Table.Extensions",
                "name": "from_table",
                "selfType": "Standard.Base.Data.Vector.Vector",
                "returnType": "Standard.Base.Data.Vector.Vector",
                "isStatic": true
            } }
        ]
    }))
    .unwrap()
}

async fn loaded_session() -> Session {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(library_snapshot()));
    let session = Session::start(server, qn("local.Project"), SessionConfig::default()).unwrap();
    session.wait_until_loaded().await;
    session
}

#[tokio::test]
async fn test_reexported_type_is_imported_from_reexporting_module() {
    let session = loaded_session().await;
    assert_eq!(
        session.required_imports(2).await,
        Some(vec![RequiredImport::Unqualified {
            from: qn("Standard.Base"),
            import: id("Vector"),
        }])
    );
    // The static method resolves its owner through the database.
    assert_eq!(session.required_imports(3).await, session.required_imports(2).await);
    assert_eq!(session.required_imports(42).await, None);
}

#[tokio::test]
async fn test_static_extension_method_imports_type_and_defining_module() {
    let session = loaded_session().await;
    assert_eq!(
        session.required_imports(7).await,
        Some(vec![
            RequiredImport::Unqualified {
                from: qn("Standard.Base"),
                import: id("Vector"),
            },
            RequiredImport::Qualified {
                module: qn("Standard.Table.Extensions"),
            },
        ])
    );

    let mut module = SourceModule::parse("from Standard.Base import Vector

main = 42
");
    let added = add_imports(&mut module, &session.required_imports(7).await.unwrap());
    assert_eq!(added, vec![Import::module(qn("Standard.Table.Extensions"))]);
}

#[tokio::test]
async fn test_local_entries_print_with_current_project_name() {
    let session = loaded_session().await;
    assert_eq!(
        session.required_imports(5).await,
        Some(vec![RequiredImport::Qualified {
            module: qn("local.Project.Foo"),
        }])
    );

    session.request_project_rename(qn("local.Renamed")).unwrap();
    assert_eq!(
        session.required_imports(4).await,
        Some(vec![RequiredImport::Unqualified {
            from: qn("local.Renamed.Foo"),
            import: id("Vector"),
        }])
    );
}

#[tokio::test]
async fn test_conflicting_vector_import() {
    let session = loaded_session().await;
    let db = session.db().read().await;
    let resolver = session.resolver();

    let module = SourceModule::parse("from Standard.Base import all\n\nmain = Vector.new\n");
    let existing = recognize_imports(&module);
    let importing = RequiredImport::Unqualified {
        from: qn("Project.Foo"),
        import: id("Vector"),
    };
    let conflict = detect_import_conflicts(&db, resolver, &existing, &importing).unwrap();
    assert_eq!(conflict.fully_qualified, qn("Project.Foo.Vector"));
    assert_eq!(conflict.name, id("Vector"));

    let nothing_imported = SourceModule::parse("main = 42\n");
    assert_eq!(
        detect_import_conflicts(&db, resolver, &recognize_imports(&nothing_imported), &importing),
        None
    );
}

#[tokio::test]
async fn test_adding_required_imports_to_source() {
    let session = loaded_session().await;
    let required = session.required_imports(3).await.unwrap();

    let mut module = SourceModule::parse("import Standard.Visualization\n\nmain =\n    42\n");
    let added = add_imports(&mut module, &required);
    assert_eq!(added, vec![Import::list(qn("Standard.Base"), vec![id("Vector")])]);
    assert_eq!(
        module.text(),
        "import Standard.Visualization\nfrom Standard.Base import Vector\n\nmain =\n    42\n"
    );

    // Adding again is a no-op.
    assert!(add_imports(&mut module, &required).is_empty());
    assert_eq!(module.top_level_statements().len(), 3);
}

#[test]
fn test_coverage_examples() {
    assert!(covers(
        &Import::module(qn("Standard.Base")),
        &RequiredImport::Qualified {
            module: qn("Standard.Base")
        }
    ));
    assert!(!covers(
        &Import::all(qn("Standard.Numbers"), vec![id("Number")]),
        &RequiredImport::Qualified {
            module: qn("Standard.Numbers.Number")
        }
    ));
    let aliased = recognize_import("import Standard.Base as B").unwrap();
    assert!(covers(
        &aliased,
        &RequiredImport::Qualified {
            module: qn("Standard.Base")
        }
    ));
}

#[test]
fn test_required_imports_round_trip_through_syntax() {
    for required in [
        RequiredImport::Qualified {
            module: qn("Standard.Base.Data"),
        },
        RequiredImport::Unqualified {
            from: qn("Standard.Base"),
            import: id("Vector"),
        },
    ] {
        let import = required.to_import();
        assert_eq!(recognize_import(&import.to_string()), Some(import));
    }
}

#[test]
fn test_wire_records_parse() {
    let record: SuggestionRecord = serde_json::from_value(json!({
        "type": "constructor",
        "module": "Standard.Base.Data.Maybe",
        "name": "Some",
        "returnType": "Standard.Base.Data.Maybe.Maybe",
        "arguments": [{ "name": "value", "reprType": "Standard.Base.Any" }]
    }))
    .unwrap();
    assert_eq!(record.module(), "Standard.Base.Data.Maybe");
    let SuggestionRecord::Constructor { arguments, .. } = record else {
        panic!("expected a constructor");
    };
    assert_eq!(arguments[0].repr_type, "Standard.Base.Any");
    assert!(!arguments[0].has_default);
}
