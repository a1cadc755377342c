use crate::fixture::{self, Fixture};
use crate::view::EntryView;
use std::path::PathBuf;
use tabled::{Table, settings::Style};

pub async fn run(fixture: PathBuf, name: String) -> Result<String, Box<dyn std::error::Error>> {
    let session = Fixture::load(&fixture)?.replay().await?;
    let ids = fixture::find(&session, &name).await?;

    let db = session.db().read().await;
    let entry = ids
        .iter()
        .filter_map(|id| db.get(*id))
        .next()
        .ok_or_else(|| format!("No suggestion defined at {}", name))?;

    let mut views = Vec::new();
    for ancestor in db.ancestors(entry) {
        // Ancestors are found through the path index, so the lookup back to an id succeeds.
        let path = ancestor.definition_path();
        if let Some(id) = db.find_by_project_path(&path) {
            views.push(EntryView::from_entry(id, ancestor, session.resolver()));
        }
    }
    if views.is_empty() {
        return Ok(format!("{} has no known supertypes", name));
    }
    Ok(Table::new(&views).with(Style::psql()).to_string())
}
