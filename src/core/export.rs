use crate::domain::model::{Category, ComparisonResult};
use crate::domain::ports::Storage;
use crate::utils::error::{CompareError, Result};

/// Renders a completed comparison as a single-worksheet CSV document.
///
/// Callers pass the category set the result was scored under; for reloaded
/// snapshots that is the snapshot's own set, never the session's currently
/// edited one. Header first, one row per college sorted by descending total
/// score, then an optional summary trailer.
pub fn to_csv(results: &ComparisonResult, categories: &[Category]) -> Result<Vec<u8>> {
    // The summary trailer is shorter than the data rows.
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);

    let mut header = vec![
        "Entity".to_string(),
        "State".to_string(),
        "Type".to_string(),
        "Total Score".to_string(),
    ];
    for category in categories {
        header.push(format!("{} Score", category.name));
    }
    for category in categories {
        header.push(format!("{} Reasoning", category.name));
    }
    writer.write_record(&header).map_err(export_error)?;

    let mut ranked = results.entities.clone();
    ranked.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

    for entry in &ranked {
        let mut row = vec![
            entry.college.name.clone(),
            entry.college.state.clone().unwrap_or_default(),
            entry.college.r#type.clone().unwrap_or_default(),
            format!("{:.1}", entry.total_score),
        ];
        for category in categories {
            row.push(
                entry
                    .scores_by_category
                    .get(&category.name)
                    .map(|s| format!("{:.1}", s.score))
                    .unwrap_or_default(),
            );
        }
        for category in categories {
            row.push(
                entry
                    .scores_by_category
                    .get(&category.name)
                    .map(|s| s.reasoning.clone())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row).map_err(export_error)?;
    }

    if let Some(summary) = &results.summary {
        writer.write_record(&[""]).map_err(export_error)?;
        writer
            .write_record(&["Summary", summary.as_str()])
            .map_err(export_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| CompareError::ExportError {
            message: e.to_string(),
        })
}

fn export_error(e: csv::Error) -> CompareError {
    CompareError::ExportError {
        message: e.to_string(),
    }
}

/// Renders and writes the document through the storage port; returns the
/// file name it was written under.
pub async fn write_to<S: Storage>(
    storage: &S,
    filename: &str,
    results: &ComparisonResult,
    categories: &[Category],
) -> Result<String> {
    let bytes = to_csv(results, categories)?;
    tracing::debug!("writing export ({} bytes) to {}", bytes.len(), filename);
    storage.write_file(filename, &bytes).await?;
    Ok(filename.to_string())
}
