use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::cells::ColumnRenderers;
use super::form::{validate_form, FormErrors};
use crate::client::{ClientError, ListParams, ResourceApi};
use crate::resources::{RegistryError, ResourceDescriptor, ResourceRegistry};
use crate::types::{record_id, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Load,
    Create,
    Update,
    Delete,
}

impl fmt::Display for PageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageAction::Load => "loading",
            PageAction::Create => "create",
            PageAction::Update => "update",
            PageAction::Delete => "delete",
        })
    }
}

/// A visible failure on the page. Rows rendered before it are kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error(transparent)]
    Invalid(#[from] FormErrors),

    #[error("{action} failed: {message}")]
    Request {
        action: PageAction,
        status: Option<u16>,
        message: String,
    },
}

impl PageError {
    fn request(action: PageAction, err: &ClientError) -> Self {
        tracing::warn!("{} failed: {}", action, err);
        PageError::Request {
            action,
            status: err.status(),
            message: err.user_message(),
        }
    }
}

/// How a completion was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    Applied(T),
    /// The view was unmounted (or superseded) before the call finished.
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    pub rows: Vec<Record>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub loading: bool,
    pub error: Option<PageError>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    /// Re-fetch the authoritative list after every successful mutation.
    pub reload_after_mutation: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            reload_after_mutation: true,
        }
    }
}

/// List + form page for one resource, backed by a [`ResourceApi`].
///
/// Local rows are a cache of the server list. Completions that arrive
/// after `unmount` are dropped without touching state.
pub struct ResourcePage {
    api: Arc<dyn ResourceApi>,
    descriptor: ResourceDescriptor,
    renderers: ColumnRenderers,
    options: PageOptions,
    params: std::sync::RwLock<ListParams>,
    state: RwLock<PageState>,
    epoch: AtomicU64,
    /// Number of loads that have reached the API, newest last.
    started: AtomicU64,
    mounted: AtomicBool,
}

impl ResourcePage {
    pub fn new(descriptor: ResourceDescriptor, api: Arc<dyn ResourceApi>) -> Self {
        Self {
            api,
            descriptor,
            renderers: ColumnRenderers::default(),
            options: PageOptions::default(),
            params: std::sync::RwLock::new(ListParams::new()),
            state: RwLock::new(PageState::default()),
            epoch: AtomicU64::new(0),
            started: AtomicU64::new(0),
            mounted: AtomicBool::new(true),
        }
    }

    /// Resolve `name` in the registry and build its page.
    pub fn open(registry: &ResourceRegistry, name: &str, api: Arc<dyn ResourceApi>) -> Result<Self, RegistryError> {
        Ok(Self::new(registry.get(name)?.clone(), api))
    }

    pub fn with_renderers(mut self, renderers: ColumnRenderers) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn with_options(mut self, options: PageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub async fn state(&self) -> PageState {
        self.state.read().await.clone()
    }

    /// Replace the list query. Loads already in flight become stale.
    pub fn set_params(&self, params: ListParams) {
        if let Ok(mut current) = self.params.write() {
            *current = params;
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// The view is gone; every pending completion becomes a no-op.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn load_is_current(&self, epoch: u64) -> bool {
        self.is_mounted() && self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn current_params(&self) -> ListParams {
        self.params.read().map(|p| p.clone()).unwrap_or_default()
    }

    /// Fetch the list. The request is tied to the view as it is right now.
    pub fn load(&self) -> impl Future<Output = Result<Completion<()>, PageError>> + '_ {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let params = self.current_params();
        async move { self.load_at(epoch, params).await }
    }

    async fn load_at(&self, epoch: u64, params: ListParams) -> Result<Completion<()>, PageError> {
        if !self.load_is_current(epoch) {
            return Ok(Completion::Discarded);
        }
        let ticket = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let result = self.api.list(&self.descriptor.endpoint, &params).await;

        if !self.load_is_current(epoch) {
            // a superseded load still owns the spinner until a newer one starts
            if self.is_mounted() && self.started.load(Ordering::SeqCst) == ticket {
                self.state.write().await.loading = false;
            }
            return Ok(Completion::Discarded);
        }

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(list) => {
                state.rows = list.data;
                state.total = list.total;
                state.page = list.page;
                state.limit = list.limit;
                state.error = None;
                Ok(Completion::Applied(()))
            }
            Err(err) => {
                let error = PageError::request(PageAction::Load, &err);
                state.error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Validate and create. Invalid input never reaches the API.
    pub async fn create(&self, values: &Record) -> Result<Completion<Record>, PageError> {
        let data = self.validated(values).await?;

        let result = self.api.create(&self.descriptor.endpoint, &data).await;
        if !self.is_mounted() {
            return Ok(Completion::Discarded);
        }

        match result {
            Ok(created) => {
                {
                    let mut state = self.state.write().await;
                    state.rows.push(created.clone());
                    state.total += 1;
                    state.error = None;
                }
                self.reconcile().await;
                Ok(Completion::Applied(created))
            }
            Err(err) => Err(self.fail(PageAction::Create, &err).await),
        }
    }

    pub async fn update(&self, id: &str, values: &Record) -> Result<Completion<Record>, PageError> {
        let data = self.validated(values).await?;

        let result = self.api.update(&self.descriptor.endpoint, id, &data).await;
        if !self.is_mounted() {
            return Ok(Completion::Discarded);
        }

        match result {
            Ok(updated) => {
                {
                    let mut state = self.state.write().await;
                    if let Some(row) = state.rows.iter_mut().find(|r| record_id(r).as_deref() == Some(id)) {
                        *row = updated.clone();
                    }
                    state.error = None;
                }
                self.reconcile().await;
                Ok(Completion::Applied(updated))
            }
            Err(err) => Err(self.fail(PageAction::Update, &err).await),
        }
    }

    /// Remove the row immediately, restoring it if the server refuses.
    pub async fn remove(&self, id: &str) -> Result<Completion<Record>, PageError> {
        let removed = {
            let mut state = self.state.write().await;
            let position = state.rows.iter().position(|r| record_id(r).as_deref() == Some(id));
            position.map(|index| {
                state.total = state.total.saturating_sub(1);
                (index, state.rows.remove(index))
            })
        };

        let result = self.api.remove(&self.descriptor.endpoint, id).await;
        if !self.is_mounted() {
            return Ok(Completion::Discarded);
        }

        match result {
            Ok(deleted) => {
                self.state.write().await.error = None;
                self.reconcile().await;
                Ok(Completion::Applied(deleted))
            }
            Err(err) => {
                if let Some((index, row)) = removed {
                    let mut state = self.state.write().await;
                    let index = index.min(state.rows.len());
                    state.rows.insert(index, row);
                    state.total += 1;
                }
                Err(self.fail(PageAction::Delete, &err).await)
            }
        }
    }

    /// Column titles, in declaration order.
    pub fn headers(&self) -> Vec<String> {
        self.descriptor.list_columns.iter().map(|c| c.title.clone()).collect()
    }

    /// One row per record (server order), one cell per declared column.
    pub async fn render_rows(&self) -> Vec<Vec<String>> {
        let state = self.state.read().await;
        render_records(&self.descriptor, &self.renderers, &state.rows)
    }

    async fn validated(&self, values: &Record) -> Result<Record, PageError> {
        match validate_form(&self.descriptor.form_fields, values) {
            Ok(data) => Ok(data),
            Err(errors) => {
                let error = PageError::Invalid(errors);
                self.state.write().await.error = Some(error.clone());
                Err(error)
            }
        }
    }

    async fn fail(&self, action: PageAction, err: &ClientError) -> PageError {
        let error = PageError::request(action, err);
        self.state.write().await.error = Some(error.clone());
        error
    }

    async fn reconcile(&self) {
        if self.options.reload_after_mutation {
            // failure is recorded in state; the mutation itself succeeded
            let _ = self.load().await;
        }
    }
}

pub fn render_records(descriptor: &ResourceDescriptor, renderers: &ColumnRenderers, rows: &[Record]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|record| {
            descriptor
                .list_columns
                .iter()
                .map(|column| renderers.render(column, record))
                .collect()
        })
        .collect()
}
