//! Product import pipeline.
//!
//! `run_import` authenticates, loads the category index, reads the CSV and
//! hands the rows to [`import_all`]. Everything before `import_all` is fatal;
//! inside it each row ends in exactly one [`RowOutcome`] and a failing row
//! never stops the others.

use std::collections::HashMap;
use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use prodimport_client::MedusaClient;
use prodimport_core::{AppConfig, CategoryIndex, ProductRow};

use crate::catalog;
use crate::csv_reader::{self, SourceRow};

#[derive(Debug, Clone)]
pub(crate) struct ImportOptions {
    pub file: PathBuf,
    /// Run existence and category checks but never call create.
    pub dry_run: bool,
    /// Rows in flight at once. `1` processes strictly in file order. Rows
    /// sharing a handle always run one after another.
    pub max_concurrent_rows: usize,
}

/// Terminal state of one CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RowOutcome {
    Created { product_id: String },
    WouldCreate,
    SkippedExisting,
    SkippedNoCategory,
    Failed { reason: String },
}

/// A row that ended in [`RowOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FailedRow {
    /// 1-based line the record starts on, counting the header as line 1.
    pub line: u64,
    pub name: String,
    pub reason: String,
}

/// Per-outcome tallies for a run, plus the rows that failed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub total: usize,
    pub created: usize,
    pub would_create: usize,
    pub skipped_existing: usize,
    pub skipped_no_category: usize,
    pub failed: Vec<FailedRow>,
}

impl ImportSummary {
    fn record(&mut self, row: &SourceRow, outcome: RowOutcome) {
        self.total += 1;
        match outcome {
            RowOutcome::Created { product_id } => {
                tracing::debug!(line = row.line, %product_id, "row recorded as created");
                self.created += 1;
            }
            RowOutcome::WouldCreate => self.would_create += 1,
            RowOutcome::SkippedExisting => self.skipped_existing += 1,
            RowOutcome::SkippedNoCategory => self.skipped_no_category += 1,
            RowOutcome::Failed { reason } => self.failed.push(FailedRow {
                line: row.line,
                name: row.product.name.clone(),
                reason,
            }),
        }
    }

    fn print(&self, dry_run: bool) {
        tracing::info!(
            total = self.total,
            created = self.created,
            would_create = self.would_create,
            skipped_existing = self.skipped_existing,
            skipped_no_category = self.skipped_no_category,
            failed = self.failed.len(),
            dry_run,
            "import finished"
        );

        println!();
        if dry_run {
            println!("dry run: {} rows checked, nothing created", self.total);
            println!("  would create:         {}", self.would_create);
        } else {
            println!("{} rows processed", self.total);
            println!("  created:              {}", self.created);
        }
        println!("  skipped (exists):     {}", self.skipped_existing);
        println!("  skipped (no category): {}", self.skipped_no_category);
        println!("  failed:               {}", self.failed.len());
        for failed in &self.failed {
            println!("    line {}: {}: {}", failed.line, failed.name, failed.reason);
        }
    }
}

/// Handler for `prodimport import`.
///
/// Returns `Err` only for fatal setup failures. Row failures are reported in
/// the printed summary.
pub(crate) async fn run_import(config: &AppConfig, options: &ImportOptions) -> anyhow::Result<()> {
    let summary = execute(config, options).await?;
    summary.print(options.dry_run);
    Ok(())
}

async fn execute(config: &AppConfig, options: &ImportOptions) -> anyhow::Result<ImportSummary> {
    let client = catalog::connect(config).await?;
    let index = catalog::load_category_index(&client, config.category_page_size).await?;

    let rows = csv_reader::read_products(&options.file)?;
    tracing::info!(
        file = %options.file.display(),
        rows = rows.len(),
        dry_run = options.dry_run,
        max_concurrent_rows = options.max_concurrent_rows,
        "starting import"
    );

    Ok(import_all(&client, &rows, &index, options).await)
}

/// Processes every row and tallies the outcomes in file order.
///
/// Rows are grouped by handle. Groups run concurrently up to
/// `max_concurrent_rows`; rows inside a group run in file order, so a later
/// duplicate sees the product created by an earlier one and is skipped.
pub(crate) async fn import_all(
    client: &MedusaClient,
    rows: &[SourceRow],
    index: &CategoryIndex,
    options: &ImportOptions,
) -> ImportSummary {
    let max_concurrent = options.max_concurrent_rows.max(1);
    let dry_run = options.dry_run;

    let grouped: Vec<Vec<(usize, RowOutcome)>> = stream::iter(group_by_handle(rows))
        .map(move |group| async move {
            let mut outcomes = Vec::with_capacity(group.len());
            for i in group {
                outcomes.push((i, import_row(client, index, &rows[i].product, dry_run).await));
            }
            outcomes
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let mut results: Vec<(usize, RowOutcome)> = grouped.into_iter().flatten().collect();
    results.sort_unstable_by_key(|(i, _)| *i);

    let mut summary = ImportSummary::default();
    for (i, outcome) in results {
        summary.record(&rows[i], outcome);
    }
    summary
}

/// Row indices grouped by derived handle, groups ordered by first appearance.
fn group_by_handle(rows: &[SourceRow]) -> Vec<Vec<usize>> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let handle = row.product.handle();
        if let Some(&g) = positions.get(&handle) {
            tracing::debug!(line = row.line, %handle, "duplicate handle in file; row will run after the first");
            groups[g].push(i);
        } else {
            positions.insert(handle, groups.len());
            groups.push(vec![i]);
        }
    }
    groups
}

async fn import_row(
    client: &MedusaClient,
    index: &CategoryIndex,
    row: &ProductRow,
    dry_run: bool,
) -> RowOutcome {
    let handle = row.handle();

    match client.products_exist_with_handle(&handle).await {
        Ok(true) => {
            tracing::info!(name = %row.name, %handle, "product already exists, skipping");
            return RowOutcome::SkippedExisting;
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!(name = %row.name, %handle, error = %e, "existence check failed");
            return RowOutcome::Failed {
                reason: format!("existence check failed: {e}"),
            };
        }
    }

    let Some(category_id) = index.lookup(&row.category) else {
        tracing::warn!(
            name = %row.name,
            category = %row.category,
            "category not found, skipping product"
        );
        return RowOutcome::SkippedNoCategory;
    };

    let request = match row.to_create_request(category_id) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(name = %row.name, %handle, error = %e, "invalid product row");
            return RowOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    if dry_run {
        tracing::info!(name = %row.name, %handle, category = %row.category, "would create product");
        return RowOutcome::WouldCreate;
    }

    match client.create_product(&request).await {
        Ok(product) => {
            tracing::info!(
                title = %product.title,
                product_id = %product.id,
                category = %row.category,
                "created product"
            );
            RowOutcome::Created {
                product_id: product.id,
            }
        }
        Err(e) => {
            tracing::error!(name = %row.name, %handle, error = %e, "failed to create product");
            RowOutcome::Failed {
                reason: format!("create failed: {e}"),
            }
        }
    }
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
