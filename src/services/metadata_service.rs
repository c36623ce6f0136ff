//! Relational persistence for Case / Document / File records.
//!
//! Plain pass-through CRUD over the shared SQLite pool. File rows are the
//! only part the upload pipeline writes; they are created exactly once at
//! upload completion and removed only by the document cascade.

use crate::models::{case::Case, document::Document, file::File};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("case {0} not found")]
    CaseNotFound(i64),
    #[error("document {0} not found")]
    DocumentNotFound(i64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Clone)]
pub struct MetadataService {
    /// Shared SQLite connection pool; also probed by the readiness check.
    pub db: Arc<SqlitePool>,
}

impl MetadataService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn create_case(&self, name: &str) -> MetadataResult<Case> {
        let case = sqlx::query_as::<_, Case>(
            "INSERT INTO cases (name, created_at) VALUES (?, ?)
             RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        Ok(case)
    }

    /// All cases, newest first.
    pub async fn list_cases(&self) -> MetadataResult<Vec<Case>> {
        let cases =
            sqlx::query_as::<_, Case>("SELECT id, name, created_at FROM cases ORDER BY id DESC")
                .fetch_all(&*self.db)
                .await?;

        Ok(cases)
    }

    pub async fn create_document(
        &self,
        name: &str,
        case_id: i64,
        posting_date: Option<DateTime<Utc>>,
    ) -> MetadataResult<Document> {
        let case_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM cases WHERE id = ?")
            .bind(case_id)
            .fetch_optional(&*self.db)
            .await?;
        if case_exists.is_none() {
            return Err(MetadataError::CaseNotFound(case_id));
        }

        let document = sqlx::query_as::<_, Document>(
            "INSERT INTO documents (name, case_id, posting_date, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, name, case_id, posting_date, created_at",
        )
        .bind(name)
        .bind(case_id)
        .bind(posting_date)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        Ok(document)
    }

    /// All documents, newest first.
    pub async fn list_documents(&self) -> MetadataResult<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT id, name, case_id, posting_date, created_at
             FROM documents ORDER BY id DESC",
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(documents)
    }

    pub async fn get_document(&self, id: i64) -> MetadataResult<Document> {
        sqlx::query_as::<_, Document>(
            "SELECT id, name, case_id, posting_date, created_at
             FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(MetadataError::DocumentNotFound(id))
    }

    pub async fn files_for_document(&self, document_id: i64) -> MetadataResult<Vec<File>> {
        let files = sqlx::query_as::<_, File>(
            "SELECT id, name, document_id, path
             FROM files WHERE document_id = ? ORDER BY id ASC",
        )
        .bind(document_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(files)
    }

    /// Record a finished upload against its document.
    ///
    /// Fails with `DocumentNotFound` when the referenced document is
    /// absent; callers invoke this only after the store-side assembly has
    /// already succeeded.
    pub async fn create_file(
        &self,
        name: &str,
        document_id: i64,
        path: &str,
    ) -> MetadataResult<File> {
        self.get_document(document_id).await?;

        let file = sqlx::query_as::<_, File>(
            "INSERT INTO files (name, document_id, path) VALUES (?, ?, ?)
             RETURNING id, name, document_id, path",
        )
        .bind(name)
        .bind(document_id)
        .bind(path)
        .fetch_one(&*self.db)
        .await?;

        Ok(file)
    }
}

/// Apply semicolon-separated migration statements to the pool.
pub async fn apply_migrations(db: &SqlitePool, sql: &str) -> Result<(), sqlx::Error> {
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty());

    for stmt in statements {
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn service() -> MetadataService {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        apply_migrations(&pool, include_str!("../../migrations/0001_init.sql"))
            .await
            .unwrap();

        MetadataService::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn cases_list_newest_first() {
        let svc = service().await;
        svc.create_case("First").await.unwrap();
        svc.create_case("Second").await.unwrap();

        let cases = svc.list_cases().await.unwrap();
        let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Second", "First"]);
    }

    #[tokio::test]
    async fn document_requires_existing_case() {
        let svc = service().await;

        let err = svc.create_document("Orphan", 42, None).await.unwrap_err();
        assert!(matches!(err, MetadataError::CaseNotFound(42)));
    }

    #[tokio::test]
    async fn file_requires_existing_document() {
        let svc = service().await;

        let err = svc
            .create_file("scan.pdf", 7, "evidence/scan.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::DocumentNotFound(7)));
    }

    #[tokio::test]
    async fn file_round_trip() {
        let svc = service().await;
        let case = svc.create_case("Case").await.unwrap();
        let document = svc
            .create_document("Contract", case.id, Some(Utc::now()))
            .await
            .unwrap();

        let file = svc
            .create_file("contract.pdf", document.id, "evidence/contract.pdf")
            .await
            .unwrap();
        assert_eq!(file.document_id, document.id);
        assert_eq!(file.path, "evidence/contract.pdf");

        let files = svc.files_for_document(document.id).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "contract.pdf");
    }

    #[tokio::test]
    async fn deleting_a_document_cascades_to_files() {
        let svc = service().await;
        let case = svc.create_case("Case").await.unwrap();
        let document = svc.create_document("Doc", case.id, None).await.unwrap();
        svc.create_file("a.txt", document.id, "evidence/a.txt")
            .await
            .unwrap();

        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document.id)
            .execute(&*svc.db)
            .await
            .unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&*svc.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
