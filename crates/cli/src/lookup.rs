use crate::fixture::{self, Fixture};
use crate::view::EntryView;
use std::path::PathBuf;
use tabled::{Table, settings::Style};

pub async fn run(fixture: PathBuf, name: String) -> Result<String, Box<dyn std::error::Error>> {
    let session = Fixture::load(&fixture)?.replay().await?;
    let ids = fixture::find(&session, &name).await?;

    let db = session.db().read().await;
    let views: Vec<EntryView> = ids
        .into_iter()
        .filter_map(|id| db.get(id).map(|entry| (id, entry)))
        .map(|(id, entry)| EntryView::from_entry(id, entry, session.resolver()))
        .collect();
    Ok(Table::new(&views).with(Style::psql()).to_string())
}
