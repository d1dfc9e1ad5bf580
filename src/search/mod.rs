//! Permission-aware semantic search
//!
//! [`SearchEngine`] answers queries against one collection on behalf of a
//! user, using one of two strategies:
//!
//! - **filter_first** (default): resolve the user's readable resources from
//!   the ACL, then rank only those documents. Every slot of `top_k` is filled
//!   by an authorized document whenever enough exist.
//! - **query_first**: rank the whole collection, keep the top `top_k`, then
//!   drop what the user may not read. Ordering reflects global relevance, but
//!   the result can hold fewer than `top_k` documents even when more
//!   authorized matches exist outside the window.
//!
//! Without a user id the ACL is bypassed and the query is a plain top-k
//! nearest-neighbor lookup.

mod strategy;

pub use strategy::SearchMethod;

use crate::acl::{permission, AccessControl};
use crate::defaults::{DEFAULT_TOP_K, RESOURCE_ID_KEY};
use crate::error::{Result, SearchError};
use crate::index::{Metadata, MetadataFilter, QueryHit, VectorIndexClient};
use serde::Serialize;
use std::sync::Arc;

/// A search query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub user_id: Option<String>,
    pub method: SearchMethod,
    pub top_k: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: None,
            method: SearchMethod::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(SearchError::invalid_argument("query text must not be empty"));
        }
        if self.top_k == 0 {
            return Err(SearchError::invalid_argument("top_k must be positive"));
        }
        Ok(())
    }
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub document_id: String,
    pub content: String,
    pub metadata: Metadata,
    /// Distance reported by the index; lower is more relevant
    pub relevance_score: f32,
    /// 1-based position in the final result list
    pub rank: usize,
}

impl SearchResult {
    /// Resource this result belongs to, if its metadata names one
    pub fn resource_id(&self) -> Option<&str> {
        resource_id_of(&self.metadata)
    }
}

/// Read-only, permission-aware search over one collection
#[derive(Debug, Clone)]
pub struct SearchEngine {
    index: Arc<dyn VectorIndexClient>,
    collection: String,
    acl: Arc<dyn AccessControl>,
}

impl SearchEngine {
    /// Bind to a populated collection
    ///
    /// Fails with [`SearchError::NotInitialized`] if the collection does not
    /// exist or holds no documents.
    pub fn new(
        index: Arc<dyn VectorIndexClient>,
        collection: impl Into<String>,
        acl: Arc<dyn AccessControl>,
    ) -> Result<Self> {
        let collection = collection.into();

        if !index.collection_exists(&collection) || index.count(&collection)? == 0 {
            return Err(SearchError::not_initialized(collection));
        }

        Ok(Self {
            index,
            collection,
            acl,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Run a query
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        request.validate()?;

        let hits = match request.user_id.as_deref() {
            None => self.query_index(&request.query, request.top_k, None)?,
            Some(user_id) => match request.method {
                SearchMethod::FilterFirst => {
                    self.search_filter_first(&request.query, user_id, request.top_k)?
                }
                SearchMethod::QueryFirst => {
                    self.search_query_first(&request.query, user_id, request.top_k)?
                }
            },
        };

        tracing::debug!(
            collection = %self.collection,
            user_id = request.user_id.as_deref().unwrap_or("<none>"),
            method = request.method.as_str(),
            top_k = request.top_k,
            returned = hits.len(),
            "Search completed"
        );

        Ok(rank(hits))
    }

    /// Pass-through permission check
    pub fn can_access(&self, user_id: &str, resource_id: &str, permission: &str) -> bool {
        self.acl.can_access(user_id, resource_id, permission)
    }

    /// Restrict candidates to readable resources, then rank
    fn search_filter_first(&self, query: &str, user_id: &str, top_k: usize) -> Result<Vec<QueryHit>> {
        let allowed = self.acl.allowed_resource_ids(user_id, permission::READ);
        if allowed.is_empty() {
            return Ok(Vec::new());
        }

        let filter = MetadataFilter::new().field_in(RESOURCE_ID_KEY, allowed);
        self.query_index(query, top_k, Some(&filter))
    }

    /// Rank the whole collection, then drop unreadable results
    fn search_query_first(&self, query: &str, user_id: &str, top_k: usize) -> Result<Vec<QueryHit>> {
        let mut hits = self.query_index(query, top_k, None)?;
        hits.retain(|hit| {
            resource_id_of(&hit.metadata)
                .map_or(false, |resource| self.acl.can_access(user_id, resource, permission::READ))
        });
        Ok(hits)
    }

    fn query_index(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryHit>> {
        Ok(self.index.query(&self.collection, query, top_k, filter)?)
    }
}

fn resource_id_of(metadata: &Metadata) -> Option<&str> {
    metadata.get(RESOURCE_ID_KEY).and_then(|v| v.as_str())
}

fn rank(hits: Vec<QueryHit>) -> Vec<SearchResult> {
    hits.into_iter()
        .enumerate()
        .map(|(i, hit)| SearchResult {
            document_id: hit.id,
            content: hit.content,
            metadata: hit.metadata,
            relevance_score: hit.distance,
            rank: i + 1,
        })
        .collect()
}
