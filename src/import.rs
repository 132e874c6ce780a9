use std::io;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::api::Transport;
use crate::editors::resource::ResourceDraft;
use crate::error::EditorError;
use crate::form::Editor;
use crate::models::ResourceType;
use crate::store::AdminPage;

#[derive(Debug, Deserialize)]
struct ResourceRow {
    title: String,
    url: String,
    #[serde(rename = "type")]
    kind: ResourceType,
    #[serde(default)]
    order: Option<String>,
    #[serde(default)]
    section_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Reads `title,url,type[,order][,section_id]` rows. Rows without a section
/// fall back to `default_section`.
pub fn read_drafts<R: io::Read>(
    reader: R,
    default_section: Option<&str>,
) -> anyhow::Result<Vec<ResourceDraft>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut drafts = Vec::new();

    for (index, result) in reader.deserialize::<ResourceRow>().enumerate() {
        let row = result.with_context(|| format!("malformed resource row {}", index + 1))?;
        let section_id = row
            .section_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| default_section.map(str::to_string))
            .unwrap_or_default();
        drafts.push(ResourceDraft {
            title: row.title,
            url: row.url,
            kind: row.kind,
            order: row.order.unwrap_or_else(|| "1".to_string()),
            section_id,
        });
    }

    Ok(drafts)
}

/// Sends each draft through the resource editor. Rows that fail validation
/// are skipped; a server rejection aborts the import.
pub async fn import_drafts<T: Transport>(
    page: &mut AdminPage<T>,
    drafts: Vec<ResourceDraft>,
) -> anyhow::Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let mut editor = Editor::<ResourceDraft>::default();

    for (index, draft) in drafts.into_iter().enumerate() {
        let title = draft.title.clone();
        editor.start_create_with(draft);
        match page.submit(&mut editor).await {
            Ok(_) => summary.inserted += 1,
            Err(EditorError::Invalid(errors)) => {
                warn!(row = index + 1, title = %title, %errors, "skipping invalid resource");
                editor.cancel();
                summary.skipped += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to import row {}", index + 1));
            }
        }
    }

    Ok(summary)
}

pub async fn import_csv<T: Transport>(
    page: &mut AdminPage<T>,
    csv_path: &Path,
    default_section: Option<&str>,
) -> anyhow::Result<ImportSummary> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let drafts = read_drafts(file, default_section)?;
    import_drafts(page, drafts).await
}
