use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    error::{Error as MongoError, ErrorKind as MongoErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions},
};

use docfacade_core::backend::{
    BackendError, BackendResult, DocumentBackend, DocumentBackendBuilder, NativeQuery, RawRecord,
};

use crate::query::MongoQuery;

const ID_FIELD: &str = "_id";

/// Command error code returned when the user lacks a privilege.
const UNAUTHORIZED: i32 = 13;
/// Write error code for a duplicate key.
const DUPLICATE_KEY: i32 = 11000;

fn command_code(code: i32, code_name: &str) -> &'static str {
    match (code, code_name) {
        (UNAUTHORIZED, _) => "permission-denied",
        (_, "ExceededTimeLimit" | "MaxTimeMSExpired") => "deadline-exceeded",
        (_, "Interrupted") => "cancelled",
        _ => "internal",
    }
}

fn write_code(code: i32) -> &'static str {
    match code {
        DUPLICATE_KEY => "already-exists",
        _ => "aborted",
    }
}

/// Maps a driver error onto a backend code understood by the error translator.
fn backend_error(err: MongoError) -> BackendError {
    let code = match err.kind.as_ref() {
        MongoErrorKind::Authentication { .. } => "unauthenticated",
        MongoErrorKind::Command(command) => command_code(command.code, &command.code_name),
        MongoErrorKind::Write(WriteFailure::WriteError(write)) => write_code(write.code),
        MongoErrorKind::Write(_) => "aborted",
        MongoErrorKind::ServerSelection { .. } | MongoErrorKind::Io(_) => "unavailable",
        MongoErrorKind::InvalidArgument { .. } => "invalid-argument",
        _ => "unknown",
    };

    BackendError::new(code, err.to_string())
}

/// Splits a stored document into its identifier and payload.
fn restore_record(mut document: Document) -> RawRecord {
    let id = match document.remove(ID_FIELD) {
        Some(Bson::String(id)) => id,
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    RawRecord::new(id, document)
}

/// Payload with `_id` set; a caller-supplied `_id` is overwritten.
fn prepare_document(id: &str, mut data: Document) -> Document {
    data.insert(ID_FIELD, id);
    data
}

/// MongoDB-backed document storage.
///
/// Collection paths map to collection names of one database. Document identifiers are stored
/// as string `_id` values; identifiers generated by [`DocumentBackend::add_document`] are
/// fresh ObjectId hex strings.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, path: &str) -> MongoCollection<Document> {
        self.client.database(&self.database).collection(path)
    }

    async fn find(&self, path: &str, filter: Document, options: FindOptions) -> BackendResult<Vec<RawRecord>> {
        Ok(self
            .get_collection(path)
            .find(filter)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(restore_record)
            .collect())
    }
}

#[async_trait]
impl DocumentBackend for MongoDbStore {
    type Query = MongoQuery;

    fn collection_query(&self, path: &str) -> Self::Query {
        MongoQuery::new(path)
    }

    async fn get_document(&self, path: &str, id: &str) -> BackendResult<Option<RawRecord>> {
        Ok(self
            .get_collection(path)
            .find_one(doc! { ID_FIELD: id })
            .await
            .map_err(backend_error)?
            .map(restore_record))
    }

    async fn list_documents(&self, path: &str) -> BackendResult<Vec<RawRecord>> {
        self.find(path, doc! {}, FindOptions::default()).await
    }

    async fn run_query(&self, query: Self::Query) -> BackendResult<Vec<RawRecord>> {
        let mut options = FindOptions::default();
        options.sort = query.sort();

        tracing::trace!(path = query.path(), filter = %query.filter(), "running query");

        self.find(query.path(), query.filter(), options).await
    }

    async fn update_document(&self, path: &str, id: &str, mut data: Document) -> BackendResult<()> {
        data.remove(ID_FIELD);

        let result = self
            .get_collection(path)
            .update_one(doc! { ID_FIELD: id }, doc! { "$set": data })
            .await
            .map_err(backend_error)?;

        if result.matched_count == 0 {
            return Err(BackendError::new("not-found", format!("no document {id} in {path}")));
        }

        Ok(())
    }

    async fn set_document(&self, path: &str, id: &str, data: Document) -> BackendResult<()> {
        self.get_collection(path)
            .replace_one(doc! { ID_FIELD: id }, prepare_document(id, data))
            .upsert(true)
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn add_document(&self, path: &str, data: Document) -> BackendResult<String> {
        let id = ObjectId::new().to_hex();

        self.get_collection(path)
            .insert_one(prepare_document(&id, data))
            .await
            .map_err(backend_error)?;

        Ok(id)
    }

    async fn delete_document(&self, path: &str, id: &str) -> BackendResult<()> {
        self.get_collection(path)
            .delete_one(doc! { ID_FIELD: id })
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn shutdown(self) -> BackendResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl DocumentBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> BackendResult<Self::Backend> {
        let options = ClientOptions::parse(&self.dsn).await.map_err(backend_error)?;

        Ok(MongoDbStore::new(
            Client::with_options(options).map_err(backend_error)?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_record_extracts_string_id() {
        let record = restore_record(doc! { "_id": "abc", "name": "Ann" });

        assert_eq!(record.id, "abc");
        assert_eq!(record.data, doc! { "name": "Ann" });
    }

    #[test]
    fn test_restore_record_converts_object_id() {
        let oid = ObjectId::new();
        let record = restore_record(doc! { "_id": oid, "name": "Ann" });

        assert_eq!(record.id, oid.to_hex());
    }

    #[test]
    fn test_driver_codes_map_to_backend_codes() {
        assert_eq!(command_code(13, "Unauthorized"), "permission-denied");
        assert_eq!(command_code(50, "MaxTimeMSExpired"), "deadline-exceeded");
        assert_eq!(command_code(262, "ExceededTimeLimit"), "deadline-exceeded");
        assert_eq!(command_code(11601, "Interrupted"), "cancelled");
        assert_eq!(command_code(2, "BadValue"), "internal");

        assert_eq!(write_code(11000), "already-exists");
        assert_eq!(write_code(121), "aborted");
    }

    #[test]
    fn test_mapped_codes_translate_to_backend_failures() {
        use docfacade_core::error::{BackendCode, ErrorKind, translate};

        let cases = [
            (command_code(13, "Unauthorized"), BackendCode::PermissionDenied),
            (command_code(50, "MaxTimeMSExpired"), BackendCode::DeadlineExceeded),
            (write_code(11000), BackendCode::AlreadyExists),
            (write_code(121), BackendCode::Aborted),
        ];

        for (code, expected) in cases {
            let err = translate(&BackendError::new(code, "driver failure"), "users");
            assert_eq!(err.kind, ErrorKind::BackendFailure(expected), "{code}");
        }
    }

    #[test]
    fn test_prepare_document_sets_id() {
        let document = prepare_document("abc", doc! { "_id": "other", "name": "Ann" });

        assert_eq!(document.get_str("_id").unwrap(), "abc");
        assert_eq!(document.get_str("name").unwrap(), "Ann");
    }
}
