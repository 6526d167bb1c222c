use std::time::Duration;

use crate::core::categories::CategorySet;
use crate::core::export;
use crate::core::job::{CancelToken, JobClient, PollPolicy};
use crate::core::selection::CollegeSelector;
use crate::domain::model::{
    Category, CollegeRef, ComparisonRequest, ComparisonResult, SavedComparison,
};
use crate::domain::ports::{CollegeDirectory, Evaluator, Storage};
use crate::utils::error::{CompareError, Result};

/// One user's comparison workflow: categories and selection are edited in
/// session state, a job runs them to a result, and snapshots can be loaded
/// back in without touching the evaluator.
pub struct ComparisonSession<E: Evaluator, D: CollegeDirectory> {
    categories: CategorySet,
    selector: CollegeSelector<D>,
    job: JobClient<E>,
    result: Option<ComparisonResult>,
    // Category set the current result was scored under. For a live run this
    // is the valid view at completion time; for a loaded snapshot it is the
    // snapshot's own set. Export must use this, not the edited set.
    result_categories: Vec<Category>,
}

impl<E: Evaluator, D: CollegeDirectory> ComparisonSession<E, D> {
    pub fn new(
        evaluator: E,
        directory: D,
        policy: PollPolicy,
        debounce: Duration,
        page_size: usize,
    ) -> Self {
        Self {
            categories: CategorySet::new(),
            selector: CollegeSelector::new(directory, debounce, page_size),
            job: JobClient::new(evaluator, policy),
            result: None,
            result_categories: Vec::new(),
        }
    }

    /// Wires the session from the configuration port: poll cadence, search
    /// debounce and result page size all come from it.
    pub fn from_config(
        evaluator: E,
        directory: D,
        config: &impl crate::domain::ports::ConfigProvider,
    ) -> Self {
        Self::new(
            evaluator,
            directory,
            PollPolicy::from_config(config),
            Duration::from_millis(config.debounce_ms()),
            config.search_limit(),
        )
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategorySet {
        &mut self.categories
    }

    pub fn selector(&self) -> &CollegeSelector<D> {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut CollegeSelector<D> {
        &mut self.selector
    }

    pub fn job(&self) -> &JobClient<E> {
        &self.job
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    pub fn result_categories(&self) -> &[Category] {
        &self.result_categories
    }

    pub fn colleges(&self) -> &[CollegeRef] {
        self.selector.selected()
    }

    /// Builds the submission request from the current session state: ordered
    /// college ids plus the valid category view.
    pub fn request(&self) -> ComparisonRequest {
        ComparisonRequest {
            college_ids: self.selector.ids(),
            categories: self.categories.valid(),
        }
    }

    /// Submits and polls to completion, retaining the result together with
    /// the category set it was scored under.
    pub async fn run(&mut self, cancel: &CancelToken) -> Result<&ComparisonResult> {
        let request = self.request();
        let result = self.job.run(&request, cancel).await?;
        self.result_categories = request.categories;
        Ok(&*self.result.insert(result))
    }

    /// Restores a saved snapshot as the ready-to-view state. No evaluator
    /// contact: the scores reflect the time the snapshot was taken.
    pub fn load_snapshot(&mut self, saved: &SavedComparison) {
        self.categories = CategorySet::from_categories(&saved.categories);
        self.selector.set_selected(saved.colleges.to_vec());
        self.result_categories = saved.categories.clone();
        self.result = Some(saved.results.clone());
        tracing::info!("loaded snapshot {:?} ({} colleges)", saved.name, saved.colleges.len());
    }

    pub fn export_csv(&self) -> Result<Vec<u8>> {
        let result = self.result.as_ref().ok_or_else(|| CompareError::ExportError {
            message: "no completed comparison to export".to_string(),
        })?;
        export::to_csv(result, &self.result_categories)
    }

    /// Renders the export and writes it through the storage port.
    pub async fn export_to<S: Storage>(&self, storage: &S, filename: &str) -> Result<String> {
        let result = self.result.as_ref().ok_or_else(|| CompareError::ExportError {
            message: "no completed comparison to export".to_string(),
        })?;
        export::write_to(storage, filename, result, &self.result_categories).await
    }
}
