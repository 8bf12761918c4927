//! Verb dispatcher
//!
//! Implements the six OAI-PMH verbs against the repository. The dispatcher
//! is shared across requests; its only state is the write-once earliest
//! datestamp.

use super::types::{
    Header, Identify, ListPage, ListRequest, OaiRequest, OaiResponse, Record, RecordMetadata,
    SetEntry,
};
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::metadata::{
    DcatRdfRenderer, DublinCoreRecord, FormatRegistry, MetadataFormat, MetadataRenderer,
};
use crate::pagination::{BatchFilter, BatchSelector, RecordBatch};
use crate::repository::{Dataset, Repository};
use crate::token::{Continuation, ListCriteria};
use crate::types::{Granularity, Timestamp};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

const PROTOCOL_VERSION: &str = "2.0";

/// Serves OAI-PMH verbs from a repository
pub struct Dispatcher {
    config: Arc<ServerConfig>,
    repository: Arc<dyn Repository>,
    selector: BatchSelector,
    formats: FormatRegistry,
    renderer: Arc<dyn MetadataRenderer>,
    earliest_datestamp: OnceCell<Timestamp>,
}

impl Dispatcher {
    /// Create a dispatcher with the built-in DCAT renderer
    pub fn new(config: ServerConfig, repository: Arc<dyn Repository>) -> Self {
        let renderer = Arc::new(DcatRdfRenderer::new(config.site_url.clone()));
        let formats = FormatRegistry::from_config(&config.metadata_formats);
        let selector = BatchSelector::new(Arc::clone(&repository), config.unknown_set);

        Self {
            config: Arc::new(config),
            repository,
            selector,
            formats,
            renderer,
            earliest_datestamp: OnceCell::new(),
        }
    }

    /// Replace the RDF renderer
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn MetadataRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Supported metadata formats
    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Serve a validated request
    pub async fn dispatch(&self, request: OaiRequest) -> Result<OaiResponse> {
        match request {
            OaiRequest::Identify => self.identify().await.map(OaiResponse::Identify),
            OaiRequest::GetRecord {
                identifier,
                metadata_prefix,
            } => self
                .get_record(&metadata_prefix, &identifier)
                .await
                .map(OaiResponse::GetRecord),
            OaiRequest::ListIdentifiers(list) => self
                .list_identifiers(list)
                .await
                .map(OaiResponse::ListIdentifiers),
            OaiRequest::ListRecords(list) => {
                self.list_records(list).await.map(OaiResponse::ListRecords)
            }
            OaiRequest::ListSets(resume) => self.list_sets(resume).await.map(OaiResponse::ListSets),
            OaiRequest::ListMetadataFormats { identifier } => self
                .list_metadata_formats(identifier.as_deref())
                .await
                .map(OaiResponse::ListMetadataFormats),
        }
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// Describe the repository
    pub async fn identify(&self) -> Result<Identify> {
        let earliest = self
            .earliest_datestamp
            .get_or_try_init(|| async {
                let earliest = self.repository.earliest_timestamp().await?;
                Ok::<_, Error>(earliest.unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
            })
            .await?;

        Ok(Identify {
            repository_name: self.config.repository_name.clone(),
            base_url: self.config.base_url(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            admin_emails: self.config.admin_emails.clone(),
            earliest_datestamp: *earliest,
            deleted_record: "no".to_string(),
            granularity: Granularity::Seconds.as_str().to_string(),
            compression: vec!["identity".to_string()],
        })
    }

    /// Fetch a single record
    pub async fn get_record(&self, metadata_prefix: &str, identifier: &str) -> Result<Record> {
        let format = self.formats.require(metadata_prefix)?;

        let dataset = self
            .repository
            .get_record(identifier)
            .await?
            .filter(Dataset::is_harvestable)
            .ok_or_else(|| Error::id_does_not_exist(identifier))?;

        let spec = self.resolve_set_spec(&dataset, &mut HashMap::new()).await?;
        self.render(&dataset, format, spec)
    }

    /// List record headers
    pub async fn list_identifiers(&self, request: ListRequest) -> Result<ListPage<Header>> {
        let (criteria, carried_size, batch, _) = self.select(request).await?;
        let specs = self.set_specs(&batch).await?;

        let items = batch
            .items
            .iter()
            .zip(specs)
            .map(|(dataset, spec)| header(dataset, spec))
            .collect();
        Ok(page(items, criteria, carried_size, &batch))
    }

    /// List full records
    pub async fn list_records(&self, request: ListRequest) -> Result<ListPage<Record>> {
        let (criteria, carried_size, batch, format) = self.select(request).await?;
        let specs = self.set_specs(&batch).await?;

        let items = batch
            .items
            .iter()
            .zip(specs)
            .map(|(dataset, spec)| self.render(dataset, format, spec))
            .collect::<Result<Vec<_>>>()?;
        Ok(page(items, criteria, carried_size, &batch))
    }

    /// List sets (active groups)
    pub async fn list_sets(&self, resume: Option<Continuation>) -> Result<ListPage<SetEntry>> {
        let (cursor, carried_size) = match resume {
            Some(continuation) => (Some(continuation.cursor), continuation.complete_list_size),
            None => (None, None),
        };

        let batch = self
            .selector
            .select_sets(cursor, self.config.page_size())
            .await?;
        let batch = batch.map(|group| SetEntry {
            name: group.title.clone().unwrap_or_else(|| group.name.clone()),
            spec: group.name,
            description: group.description,
        });

        Ok(ListPage {
            complete_list_size: reported_size(carried_size, &batch),
            criteria: ListCriteria::default(),
            cursor: batch.cursor,
            next_cursor: batch.next_cursor,
            items: batch.items,
        })
    }

    /// List supported formats, optionally for one record
    pub async fn list_metadata_formats(
        &self,
        identifier: Option<&str>,
    ) -> Result<Vec<MetadataFormat>> {
        if let Some(identifier) = identifier {
            let exists = self
                .repository
                .get_record(identifier)
                .await?
                .is_some_and(|d| d.is_harvestable());
            if !exists {
                return Err(Error::id_does_not_exist(identifier));
            }
        }
        Ok(self.formats.iter().cloned().collect())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Run the batch query for a list request
    async fn select(
        &self,
        request: ListRequest,
    ) -> Result<(
        ListCriteria,
        Option<usize>,
        RecordBatch<Dataset>,
        &MetadataFormat,
    )> {
        let (criteria, cursor, carried_size) = match request {
            ListRequest::Fresh(criteria) => (criteria, None, None),
            ListRequest::Resume(continuation) => (
                continuation.criteria,
                Some(continuation.cursor),
                continuation.complete_list_size,
            ),
        };

        let prefix = criteria
            .metadata_prefix
            .as_deref()
            .ok_or_else(|| Error::bad_token("The resumption token has no metadataPrefix"))?;
        let format = self.formats.require(prefix)?;

        let batch = self
            .selector
            .select_batch(&BatchFilter::from(&criteria), cursor, self.config.page_size())
            .await?;
        Ok((criteria, carried_size, batch, format))
    }

    /// Set spec of every record in a batch
    ///
    /// A set-restricted query reports that set; otherwise each record
    /// reports its owning group, or its own name when it has none.
    async fn set_specs(&self, batch: &RecordBatch<Dataset>) -> Result<Vec<String>> {
        if let Some(group) = &batch.group {
            return Ok(vec![group.name.clone(); batch.items.len()]);
        }

        let mut owners = HashMap::new();
        let mut specs = Vec::with_capacity(batch.items.len());
        for dataset in &batch.items {
            specs.push(self.resolve_set_spec(dataset, &mut owners).await?);
        }
        Ok(specs)
    }

    /// Owning group's name, or the record's own name
    async fn resolve_set_spec(
        &self,
        dataset: &Dataset,
        owners: &mut HashMap<String, Option<String>>,
    ) -> Result<String> {
        let Some(owner) = dataset.owner_org.as_deref() else {
            return Ok(dataset.name.clone());
        };

        if !owners.contains_key(owner) {
            let name = self
                .repository
                .resolve_group(owner)
                .await?
                .map(|g| g.name)
                .filter(|n| !n.is_empty());
            owners.insert(owner.to_string(), name);
        }

        Ok(owners
            .get(owner)
            .cloned()
            .flatten()
            .unwrap_or_else(|| dataset.name.clone()))
    }

    fn render(&self, dataset: &Dataset, format: &MetadataFormat, spec: String) -> Result<Record> {
        let metadata = if format.is_rdf() {
            RecordMetadata::Serialized(self.renderer.render_profile(dataset, &format.profiles)?)
        } else {
            RecordMetadata::DublinCore(DublinCoreRecord::from_dataset(dataset, &self.config))
        };
        Ok(Record {
            header: header(dataset, spec),
            metadata,
        })
    }
}

fn header(dataset: &Dataset, spec: String) -> Header {
    Header {
        identifier: dataset.id.clone(),
        datestamp: dataset.metadata_created,
        set_specs: vec![spec],
    }
}

fn page<T, U>(
    items: Vec<T>,
    criteria: ListCriteria,
    carried_size: Option<usize>,
    batch: &RecordBatch<U>,
) -> ListPage<T> {
    ListPage {
        items,
        criteria,
        cursor: batch.cursor,
        complete_list_size: reported_size(carried_size, batch),
        next_cursor: batch.next_cursor,
    }
}

/// `completeListSize` for a page: the size carried in the token, unless the
/// result set grew past it, in which case the live total takes over so the
/// next token still satisfies `cursor <= completeListSize`.
fn reported_size<T>(carried_size: Option<usize>, batch: &RecordBatch<T>) -> usize {
    match (carried_size, batch.next_cursor) {
        (Some(size), Some(next)) if next > size => batch.total,
        (Some(size), _) => size,
        (None, _) => batch.total,
    }
}
