//! REST adapter for the `projects` table.
//!
//! Row-level access policy lives in the backend; this adapter only builds
//! filters. Writes ask for `return=representation` so the stored row
//! (with server-assigned id and timestamps) comes back.

use async_trait::async_trait;
use reqwest::Method;

use folio_core::backend::{ListingQuery, ProjectStore};
use folio_core::error::CoreError;
use folio_core::project::{NewProject, Project, ProjectChanges, PROJECTS_TABLE};
use folio_core::types::{ProjectId, UserId};
use folio_core::visibility::ListingScope;

use crate::client::BackendClient;
use crate::error::RemoteError;

const RETURN_REPRESENTATION: &str = "return=representation";

/// [`ProjectStore`] backed by the hosted REST API.
#[derive(Clone)]
pub struct RestProjectStore {
    client: BackendClient,
}

impl RestProjectStore {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn url(&self) -> String {
        self.client.config().rest_url(PROJECTS_TABLE)
    }

    /// Query-string pairs for a listing request.
    pub fn listing_params(query: ListingQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        match query.scope {
            ListingScope::Public => params.push(("private", "eq.false".to_string())),
            ListingScope::Private => params.push(("private", "eq.true".to_string())),
            ListingScope::All => {}
        }
        if query.featured_only {
            params.push(("featured", "eq.true".to_string()));
        }
        params
    }

    fn id_filter(id: ProjectId) -> (&'static str, String) {
        ("id", format!("eq.{id}"))
    }

    /// First row of a representation response, or `NotFound`.
    fn single(rows: Vec<Project>, id: impl ToString) -> Result<Project, CoreError> {
        rows.into_iter().next().ok_or_else(|| CoreError::NotFound {
            entity: "project",
            id: id.to_string(),
        })
    }
}

/// A 404 on a row-addressed call means the row is gone.
fn not_found_or(err: RemoteError, id: ProjectId) -> CoreError {
    if err.status() == Some(404) {
        CoreError::NotFound {
            entity: "project",
            id: id.to_string(),
        }
    } else {
        err.into()
    }
}

#[async_trait]
impl ProjectStore for RestProjectStore {
    async fn list(&self, query: ListingQuery) -> Result<Vec<Project>, CoreError> {
        let response = self
            .client
            .request(Method::GET, &self.url())
            .await
            .query(&Self::listing_params(query))
            .send()
            .await
            .map_err(RemoteError::from)?;

        let rows: Vec<Project> = BackendClient::parse_response(response).await.map_err(|e| {
            tracing::error!(error = %e, scope = query.scope.name(), "Failed to fetch projects");
            e
        })?;
        tracing::debug!(count = rows.len(), scope = query.scope.name(), "Fetched projects");
        Ok(rows)
    }

    async fn get(&self, id: ProjectId) -> Result<Project, CoreError> {
        let response = self
            .client
            .request(Method::GET, &self.url())
            .await
            .query(&[("select", "*".to_string()), Self::id_filter(id)])
            .send()
            .await
            .map_err(RemoteError::from)?;

        let rows: Vec<Project> = BackendClient::parse_response(response)
            .await
            .map_err(|e| not_found_or(e, id))?;
        Self::single(rows, id)
    }

    async fn create(&self, owner: UserId, changes: &ProjectChanges) -> Result<Project, CoreError> {
        let body = [NewProject {
            changes,
            user_id: owner,
        }];
        let response = self
            .client
            .request(Method::POST, &self.url())
            .await
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::from)?;

        let rows: Vec<Project> = BackendClient::parse_response(response).await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::Network("Insert returned no row".into()))?;
        tracing::info!(project_id = %created.id, "Project created");
        Ok(created)
    }

    async fn update(&self, id: ProjectId, changes: &ProjectChanges) -> Result<Project, CoreError> {
        let response = self
            .client
            .request(Method::PATCH, &self.url())
            .await
            .query(&[Self::id_filter(id)])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(changes)
            .send()
            .await
            .map_err(RemoteError::from)?;

        // The row policy hides rows the caller may not touch, so an empty
        // representation covers both "gone" and "not yours".
        let rows: Vec<Project> = BackendClient::parse_response(response)
            .await
            .map_err(|e| not_found_or(e, id))?;
        let updated = Self::single(rows, id)?;
        tracing::info!(project_id = %id, "Project updated");
        Ok(updated)
    }

    async fn delete(&self, id: ProjectId) -> Result<(), CoreError> {
        let response = self
            .client
            .request(Method::DELETE, &self.url())
            .await
            .query(&[Self::id_filter(id)])
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await
            .map_err(RemoteError::from)?;

        let rows: Vec<Project> = BackendClient::parse_response(response)
            .await
            .map_err(|e| not_found_or(e, id))?;
        Self::single(rows, id)?;
        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn public_listing_filters_private_rows() {
        let params = RestProjectStore::listing_params(ListingQuery::scope(ListingScope::Public));
        assert_eq!(param(&params, "private"), Some("eq.false"));
        assert_eq!(param(&params, "order"), Some("created_at.desc"));
        assert_eq!(param(&params, "featured"), None);
    }

    #[test]
    fn all_listing_has_no_visibility_filter() {
        let params = RestProjectStore::listing_params(ListingQuery::scope(ListingScope::All));
        assert_eq!(param(&params, "private"), None);
    }

    #[test]
    fn featured_listing_adds_filter() {
        let params =
            RestProjectStore::listing_params(ListingQuery::scope(ListingScope::Private).featured());
        assert_eq!(param(&params, "private"), Some("eq.true"));
        assert_eq!(param(&params, "featured"), Some("eq.true"));
    }
}
