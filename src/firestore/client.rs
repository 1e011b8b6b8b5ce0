use super::{DocumentRef, DocumentStore};
use crate::google::{endpoint_url, json_response, Authenticator};
use anyhow::{anyhow, Result};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::{debug, info_span, instrument, Instrument};

const COUNT_ALIAS: &str = "total";

/// Firestore REST client bound to one project database.
#[derive(Debug)]
pub struct FirestoreClient<'a> {
    auth: &'a Authenticator,
    base_url: String,
    database: String,
}

impl<'a> FirestoreClient<'a> {
    #[must_use]
    pub fn new(auth: &'a Authenticator, base_url: &str, database: &str) -> Self {
        Self {
            auth,
            base_url: base_url.to_string(),
            database: database.to_string(),
        }
    }

    /// Resource name of the database's document root.
    #[must_use]
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.auth.project_id(),
            self.database
        )
    }

    async fn post(&self, method: &str, payload: &Value) -> Result<Value> {
        let url = endpoint_url(
            &self.base_url,
            &format!("/v1/{}:{method}", self.documents_root()),
        )?;
        let token = self.auth.token().await?;

        let span = info_span!(
            "firestore.request",
            http.method = "POST",
            url = %url
        );
        let response = self
            .auth
            .http()
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(payload)
            .send()
            .instrument(span)
            .await?;

        json_response(&url, response).await
    }
}

fn integer_value(value: &Value) -> Option<u64> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| value.as_u64())
}

impl DocumentStore for FirestoreClient<'_> {
    #[instrument(skip(self))]
    async fn count(&self, collection: &str) -> Result<u64> {
        let payload = json!({
            "structuredAggregationQuery": {
                "structuredQuery": {
                    "from": [{ "collectionId": collection }]
                },
                "aggregations": [{ "alias": COUNT_ALIAS, "count": {} }]
            }
        });

        let json_response = self.post("runAggregationQuery", &payload).await?;

        json_response
            .as_array()
            .and_then(|rows| {
                rows.iter().find_map(|row| {
                    row.get("result")?
                        .get("aggregateFields")?
                        .get(COUNT_ALIAS)?
                        .get("integerValue")
                        .and_then(integer_value)
                })
            })
            .ok_or_else(|| anyhow!("Error parsing JSON response: no count found"))
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, collection: &str, limit: usize) -> Result<Vec<DocumentRef>> {
        // only the document name is projected, the handles are all the purge needs
        let payload = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "select": { "fields": [{ "fieldPath": "__name__" }] },
                "limit": limit
            }
        });

        let json_response = self.post("runQuery", &payload).await?;

        let rows = json_response
            .as_array()
            .ok_or_else(|| anyhow!("Error parsing JSON response: expected an array of results"))?;

        let page: Vec<DocumentRef> = rows
            .iter()
            .filter_map(|row| row.get("document")?.get("name")?.as_str())
            .map(DocumentRef::new)
            .collect();

        debug!("fetched {} document handles", page.len());

        Ok(page)
    }

    #[instrument(skip(self, documents), fields(writes = documents.len()))]
    async fn commit_deletes(&self, documents: &[DocumentRef]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let writes: Vec<Value> = documents
            .iter()
            .map(|document| json!({ "delete": document.name() }))
            .collect();

        self.post("commit", &json!({ "writes": writes })).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::DEFAULT_DATABASE;
    use crate::google::testing::{authenticator, can_bind_localhost};
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ROOT: &str = "/v1/projects/demo-project/databases/(default)/documents";

    #[test]
    fn integer_value_accepts_string_and_number() {
        assert_eq!(integer_value(&json!("250")), Some(250));
        assert_eq!(integer_value(&json!(7)), Some(7));
        assert_eq!(integer_value(&json!("x")), None);
    }

    #[tokio::test]
    async fn count_reads_aggregation_result() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let auth = authenticator(&server).await?;

        Mock::given(method("POST"))
            .and(path(format!("{ROOT}:runAggregationQuery")))
            .and(body_partial_json(json!({
                "structuredAggregationQuery": {
                    "structuredQuery": { "from": [{ "collectionId": "orders" }] }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "result": { "aggregateFields": { "total": { "integerValue": "250" } } },
                "readTime": "2026-01-01T00:00:00Z"
            }])))
            .mount(&server)
            .await;

        let store = FirestoreClient::new(&auth, &server.uri(), DEFAULT_DATABASE);
        assert_eq!(store.count("orders").await?, 250);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_page_returns_handles() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let auth = authenticator(&server).await?;

        Mock::given(method("POST"))
            .and(path(format!("{ROOT}:runQuery")))
            .and(body_partial_json(json!({
                "structuredQuery": { "limit": 2 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "document": {
                        "name": "projects/demo-project/databases/(default)/documents/orders/a"
                    },
                    "readTime": "2026-01-01T00:00:00Z"
                },
                {
                    "document": {
                        "name": "projects/demo-project/databases/(default)/documents/orders/b"
                    },
                    "readTime": "2026-01-01T00:00:00Z"
                }
            ])))
            .mount(&server)
            .await;

        let store = FirestoreClient::new(&auth, &server.uri(), DEFAULT_DATABASE);
        let page = store.fetch_page("orders", 2).await?;

        assert_eq!(
            page,
            vec![
                DocumentRef::new("projects/demo-project/databases/(default)/documents/orders/a"),
                DocumentRef::new("projects/demo-project/databases/(default)/documents/orders/b"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn fetch_page_of_empty_collection() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let auth = authenticator(&server).await?;

        // an empty result still carries one row with only a readTime
        Mock::given(method("POST"))
            .and(path(format!("{ROOT}:runQuery")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "readTime": "2026-01-01T00:00:00Z" }])),
            )
            .mount(&server)
            .await;

        let store = FirestoreClient::new(&auth, &server.uri(), DEFAULT_DATABASE);
        assert!(store.fetch_page("orders", 100).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn commit_deletes_sends_one_write_per_handle() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let auth = authenticator(&server).await?;

        Mock::given(method("POST"))
            .and(path(format!("{ROOT}:commit")))
            .and(body_json(json!({
                "writes": [
                    { "delete": "projects/demo-project/databases/(default)/documents/orders/a" },
                    { "delete": "projects/demo-project/databases/(default)/documents/orders/b" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "writeResults": [{}, {}],
                "commitTime": "2026-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = FirestoreClient::new(&auth, &server.uri(), DEFAULT_DATABASE);
        store
            .commit_deletes(&[
                DocumentRef::new("projects/demo-project/databases/(default)/documents/orders/a"),
                DocumentRef::new("projects/demo-project/databases/(default)/documents/orders/b"),
            ])
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn commit_of_nothing_is_skipped() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let auth = authenticator(&server).await?;

        Mock::given(method("POST"))
            .and(path(format!("{ROOT}:commit")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let store = FirestoreClient::new(&auth, &server.uri(), DEFAULT_DATABASE);
        store.commit_deletes(&[]).await?;
        Ok(())
    }

    #[tokio::test]
    async fn commit_surfaces_backend_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let auth = authenticator(&server).await?;

        Mock::given(method("POST"))
            .and(path(format!("{ROOT}:commit")))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": 403,
                    "message": "Missing or insufficient permissions.",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&server)
            .await;

        let store = FirestoreClient::new(&auth, &server.uri(), DEFAULT_DATABASE);
        let handle = DocumentRef::new("projects/p/databases/(default)/documents/orders/a");
        let err = store
            .commit_deletes(&[handle])
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("insufficient permissions"));
        Ok(())
    }
}
