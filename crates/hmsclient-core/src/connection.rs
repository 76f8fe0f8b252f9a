//! Metastore connection lifecycle and forwarded operations.
//!
//! A [`MetastoreConnection`] owns exactly one transport. It starts `Closed`,
//! and the intended way to use it is [`MetastoreConnection::scoped`], which
//! opens the channel, runs a body and closes the channel on every exit path:
//!
//! ```no_run
//! # async fn demo() -> hmsclient_core::Result<()> {
//! use hmsclient_core::MetastoreConnection;
//!
//! let mut conn = MetastoreConnection::new(None, None)?;
//! let databases = conn
//!     .scoped(|c| Box::pin(async move { c.list_databases().await }))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Operations never retry and never reconnect; remote errors reach the caller
//! unchanged. A connection is not meant to be shared between tasks without
//! external synchronization.

use crate::config::{EnvSource, MetastoreConfig, ProcessEnv};
use crate::model::{Database, PartitionDescriptor, TableDescriptor};
use crate::partition::make_partition;
use crate::thrift::ThriftTransport;
use crate::transport::MetastoreTransport;
use crate::{Endpoint, Result};
use futures::future::BoxFuture;
use tracing::{debug, warn};

/// `max_parts` value asking the metastore for every partition.
pub const ALL_PARTITIONS: i16 = -1;

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No channel is held
    Closed,
    /// The channel has been opened
    Open,
}

/// Connection to a Hive Metastore.
pub struct MetastoreConnection<T: MetastoreTransport = ThriftTransport> {
    endpoint: Endpoint,
    transport: T,
    state: ConnectionState,
}

impl MetastoreConnection<ThriftTransport> {
    /// Create a connection, resolving the endpoint against the process
    /// environment. The channel is not opened.
    pub fn new(host: Option<&str>, port: Option<u16>) -> Result<Self> {
        Self::with_env(host, port, &ProcessEnv)
    }

    /// Create a connection, resolving the endpoint against `env`.
    pub fn with_env(host: Option<&str>, port: Option<u16>, env: &impl EnvSource) -> Result<Self> {
        let endpoint = Endpoint::resolve(host, port, env)?;
        let transport = ThriftTransport::new(endpoint.clone());
        Ok(Self::with_transport(endpoint, transport))
    }

    /// Create a connection from the `[metastore]` configuration section.
    pub fn from_config(config: &MetastoreConfig) -> Result<Self> {
        Self::with_env(config.host.as_deref(), config.port, &ProcessEnv)
    }
}

impl<T: MetastoreTransport> MetastoreConnection<T> {
    /// Wrap an existing transport.
    pub fn with_transport(endpoint: Endpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
            state: ConnectionState::Closed,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open the channel.
    ///
    /// Opening an already open connection is not guarded; what happens is up
    /// to the transport.
    pub async fn open(&mut self) -> Result<&mut Self> {
        self.transport.open().await?;
        self.state = ConnectionState::Open;
        Ok(self)
    }

    /// Close the channel.
    ///
    /// The connection counts as closed afterwards even if the transport
    /// reports an error.
    pub async fn close(&mut self) -> Result<()> {
        let result = self.transport.close().await;
        self.state = ConnectionState::Closed;
        result
    }

    /// Open the connection, run `body`, then close the connection.
    ///
    /// The connection is closed whether `body` succeeds or fails. An error
    /// from `body` takes precedence over an error from closing; a close error
    /// after a successful body is returned. If opening fails, `body` is not
    /// run and nothing is closed.
    pub async fn scoped<R, F>(&mut self, body: F) -> Result<R>
    where
        F: for<'c> FnOnce(&'c mut Self) -> BoxFuture<'c, Result<R>>,
    {
        self.open().await?;

        let result = body(&mut *self).await;
        let closed = self.close().await;

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(
                    endpoint = %self.endpoint,
                    error = %close_err,
                    "Failed to close Hive Metastore connection"
                );
                Err(e)
            }
        }
    }

    pub async fn list_databases(&self) -> Result<Vec<String>> {
        debug!("Listing databases");
        self.transport.get_all_databases().await
    }

    pub async fn get_database(&self, name: &str) -> Result<Database> {
        debug!(database = %name, "Fetching database");
        self.transport.get_database(name).await
    }

    pub async fn list_tables(&self, db_name: &str) -> Result<Vec<String>> {
        debug!(database = %db_name, "Listing tables");
        self.transport.get_all_tables(db_name).await
    }

    /// Create a database with an optional comment and owner.
    pub async fn create_database(
        &self,
        name: &str,
        comment: Option<&str>,
        owner: Option<&str>,
    ) -> Result<()> {
        debug!(database = %name, "Creating database");
        let database = Database {
            name: name.to_string(),
            description: comment.map(str::to_string),
            owner_name: owner.map(str::to_string),
            ..Default::default()
        };
        self.transport.create_database(database).await
    }

    /// Drop a database and its data. Contained tables are not cascaded.
    pub async fn drop_database(&self, name: &str) -> Result<()> {
        debug!(database = %name, "Dropping database");
        self.transport.drop_database(name, true, false).await
    }

    pub async fn alter_table(
        &self,
        db_name: &str,
        table_name: &str,
        new_table: TableDescriptor,
    ) -> Result<()> {
        debug!(database = %db_name, table = %table_name, "Altering table");
        self.transport
            .alter_table(db_name, table_name, new_table)
            .await
    }

    pub async fn create_table(&self, table: TableDescriptor) -> Result<()> {
        debug!(database = %table.db_name, table = %table.table_name, "Creating table");
        self.transport.create_table(table).await
    }

    /// Drop a table and its data.
    pub async fn drop_table(&self, db_name: &str, table_name: &str) -> Result<()> {
        debug!(database = %db_name, table = %table_name, "Dropping table");
        self.transport.drop_table(db_name, table_name, true).await
    }

    pub async fn get_table(&self, db_name: &str, table_name: &str) -> Result<TableDescriptor> {
        debug!(database = %db_name, table = %table_name, "Fetching table");
        self.transport.get_table(db_name, table_name).await
    }

    /// Add the partition of `table` identified by `values`.
    ///
    /// The partition is built locally, so an arity mismatch fails before any
    /// remote call.
    pub async fn add_partition<S: AsRef<str>>(
        &self,
        table: &TableDescriptor,
        values: &[S],
    ) -> Result<PartitionDescriptor> {
        let partition = make_partition(table, values)?;
        debug!(
            database = %partition.db_name,
            table = %partition.table_name,
            location = %partition.sd.location,
            "Adding partition"
        );
        self.transport.add_partition(partition).await
    }

    /// Add several prepared partitions, returning how many were added.
    pub async fn add_partitions(&self, partitions: Vec<PartitionDescriptor>) -> Result<i32> {
        debug!(count = partitions.len(), "Adding partitions");
        self.transport.add_partitions(partitions).await
    }

    /// Fetch up to `limit` partitions; [`ALL_PARTITIONS`] means no limit.
    pub async fn get_partitions(
        &self,
        db_name: &str,
        table_name: &str,
        limit: i16,
    ) -> Result<Vec<PartitionDescriptor>> {
        debug!(database = %db_name, table = %table_name, limit, "Fetching partitions");
        self.transport
            .get_partitions(db_name, table_name, limit)
            .await
    }

    pub async fn get_partition_by_name(
        &self,
        db_name: &str,
        table_name: &str,
        part_name: &str,
    ) -> Result<PartitionDescriptor> {
        self.transport
            .get_partition_by_name(db_name, table_name, part_name)
            .await
    }

    /// Drop one partition and its data.
    pub async fn drop_partition<S: AsRef<str>>(
        &self,
        db_name: &str,
        table_name: &str,
        values: &[S],
    ) -> Result<bool> {
        let values: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        debug!(database = %db_name, table = %table_name, values = ?values, "Dropping partition");
        self.transport
            .drop_partition(db_name, table_name, values, true)
            .await
    }

    /// Fetch up to `limit` partition names; a missing list comes back empty.
    pub async fn get_partition_names(
        &self,
        db_name: &str,
        table_name: &str,
        limit: i16,
    ) -> Result<Vec<String>> {
        let names = self
            .transport
            .get_partition_names(db_name, table_name, limit)
            .await?;
        Ok(names.unwrap_or_default())
    }

    /// Whether a partition named like `ds=2024-01-01/hr=00` exists.
    ///
    /// Only the "no such object" answer becomes `false`; every other error is
    /// returned unchanged.
    pub async fn check_for_named_partition(
        &self,
        db_name: &str,
        table_name: &str,
        part_name: &str,
    ) -> Result<bool> {
        match self
            .transport
            .get_partition_by_name(db_name, table_name, part_name)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!(database = %db_name, table = %table_name, partition = %part_name, "Partition not found");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// The id of the most recent metastore notification event.
    pub async fn get_current_notification_id(&self) -> Result<i64> {
        self.transport.get_current_notification_event_id().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldSchema, StorageDescriptor};
    use crate::transport::testing::{Call, Lookup, RecordingTransport};
    use crate::{Error, MetastoreError};
    use std::collections::HashMap;

    fn connection(transport: RecordingTransport) -> MetastoreConnection<RecordingTransport> {
        MetastoreConnection::with_transport(Endpoint::default(), transport)
    }

    fn sales_table() -> TableDescriptor {
        TableDescriptor {
            db_name: "retail".into(),
            table_name: "sales".into(),
            partition_keys: vec![FieldSchema::new("region", "string")],
            sd: StorageDescriptor::text("s3://lake/retail/sales", vec![]),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_resolves_endpoint_without_opening() {
        let env: HashMap<String, String> =
            [("HMS_HOST".to_string(), "foo:123".to_string())].into();
        let conn = MetastoreConnection::with_env(None, None, &env).unwrap();
        assert_eq!(conn.endpoint().host, "foo");
        assert_eq!(conn.endpoint().port, 123);
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_from_config() {
        let config = MetastoreConfig {
            host: Some("bar:456".into()),
            port: None,
        };
        let conn = MetastoreConnection::from_config(&config).unwrap();
        assert_eq!(conn.endpoint().address(), "bar:456");
    }

    #[tokio::test]
    async fn test_open_close_state() {
        let mut conn = connection(RecordingTransport::default());
        assert!(!conn.is_open());

        conn.open().await.unwrap();
        assert!(conn.is_open());

        conn.close().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert_eq!(conn.transport().calls(), vec![Call::Open, Call::Close]);
    }

    #[tokio::test]
    async fn test_scoped_opens_and_closes() {
        let mut conn = connection(RecordingTransport::default());

        let databases = conn
            .scoped(|c| {
                Box::pin(async move {
                    assert!(c.is_open());
                    c.list_databases().await
                })
            })
            .await
            .unwrap();

        assert_eq!(databases, vec!["default"]);
        assert!(!conn.is_open());
        assert_eq!(
            conn.transport().calls(),
            vec![Call::Open, Call::GetAllDatabases, Call::Close]
        );
    }

    #[tokio::test]
    async fn test_scoped_closes_when_body_fails() {
        let mut conn = connection(RecordingTransport {
            fail_remote: true,
            ..Default::default()
        });

        for _ in 0..3 {
            let result = conn
                .scoped(|c| Box::pin(async move { c.get_table("retail", "sales").await }))
                .await;
            assert!(matches!(
                result,
                Err(Error::Metastore(MetastoreError::Transport(_)))
            ));
        }

        let opens = conn.transport().count(|c| *c == Call::Open);
        let closes = conn.transport().count(|c| *c == Call::Close);
        assert_eq!(opens, 3);
        assert_eq!(closes, 3);
        assert!(!conn.is_open());
    }

    #[tokio::test]
    async fn test_close_failure_still_marks_closed() {
        let mut conn = connection(RecordingTransport {
            fail_close: true,
            ..Default::default()
        });

        conn.open().await.unwrap();
        let err = conn.close().await.unwrap_err();

        assert!(matches!(err, Error::Metastore(MetastoreError::Transport(_))));
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_scoped_returns_close_error_after_success() {
        let mut conn = connection(RecordingTransport {
            fail_close: true,
            ..Default::default()
        });

        let err = conn
            .scoped(|c| Box::pin(async move { c.list_databases().await }))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("close failed"));
        assert!(!conn.is_open());
        assert_eq!(
            conn.transport().calls(),
            vec![Call::Open, Call::GetAllDatabases, Call::Close]
        );
    }

    #[tokio::test]
    async fn test_scoped_body_error_wins_over_close_error() {
        let mut conn = connection(RecordingTransport {
            fail_remote: true,
            fail_close: true,
            ..Default::default()
        });

        let err = conn
            .scoped(|c| Box::pin(async move { c.get_table("retail", "sales").await }))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert!(!err.to_string().contains("close failed"));
        assert!(!conn.is_open());
        assert_eq!(conn.transport().count(|c| *c == Call::Close), 1);
    }

    #[tokio::test]
    async fn test_scoped_closes_on_local_error() {
        let mut conn = connection(RecordingTransport::default());
        let table = sales_table();

        let result = conn
            .scoped(|c| {
                Box::pin(async move { c.add_partition(&table, &["emea", "extra"]).await })
            })
            .await;

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(conn.transport().calls(), vec![Call::Open, Call::Close]);
    }

    #[tokio::test]
    async fn test_drop_policies_are_fixed() {
        let conn = connection(RecordingTransport::default());

        conn.drop_database("retail").await.unwrap();
        conn.drop_table("retail", "sales").await.unwrap();
        conn.drop_partition("retail", "sales", &["emea"]).await.unwrap();

        assert_eq!(
            conn.transport().calls(),
            vec![
                Call::DropDatabase {
                    name: "retail".into(),
                    delete_data: true,
                    cascade: false,
                },
                Call::DropTable {
                    table: "sales".into(),
                    delete_data: true,
                },
                Call::DropPartition {
                    values: vec!["emea".into()],
                    delete_data: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_create_database_fields() {
        let conn = connection(RecordingTransport::default());
        conn.create_database("retail", Some("sales data"), None)
            .await
            .unwrap();

        match &conn.transport().calls()[0] {
            Call::CreateDatabase(db) => {
                assert_eq!(db.name, "retail");
                assert_eq!(db.description.as_deref(), Some("sales data"));
                assert!(db.owner_name.is_none());
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_partition_builds_location() {
        let conn = connection(RecordingTransport::default());
        let table = sales_table();

        let added = conn.add_partition(&table, &["emea"]).await.unwrap();
        assert_eq!(added.sd.location, "s3://lake/retail/sales/region=emea");
        assert_eq!(table.sd.location, "s3://lake/retail/sales");
    }

    #[tokio::test]
    async fn test_partition_names_missing_result_is_empty() {
        let conn = connection(RecordingTransport::default());
        let names = conn
            .get_partition_names("retail", "sales", ALL_PARTITIONS)
            .await
            .unwrap();
        assert!(names.is_empty());
        assert_eq!(conn.transport().calls(), vec![Call::GetPartitionNames(-1)]);
    }

    #[tokio::test]
    async fn test_check_for_named_partition() {
        let conn = connection(RecordingTransport::default());
        assert!(conn
            .check_for_named_partition("retail", "sales", "region=emea")
            .await
            .unwrap());

        let conn = connection(RecordingTransport {
            lookup: Lookup::NotFound,
            ..Default::default()
        });
        assert!(!conn
            .check_for_named_partition("retail", "sales", "region=apac")
            .await
            .unwrap());

        let conn = connection(RecordingTransport {
            lookup: Lookup::ServiceFailure,
            ..Default::default()
        });
        let err = conn
            .check_for_named_partition("retail", "sales", "region=apac")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Metastore(MetastoreError::Service(_))));
    }

    #[tokio::test]
    async fn test_check_for_named_partition_propagates_transport_errors() {
        let conn = connection(RecordingTransport {
            fail_remote: true,
            ..Default::default()
        });
        let err = conn
            .check_for_named_partition("retail", "sales", "region=emea")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Metastore(MetastoreError::Transport(_))));
    }

    #[tokio::test]
    async fn test_notification_id() {
        let conn = connection(RecordingTransport {
            notification_id: 4242,
            ..Default::default()
        });
        assert_eq!(conn.get_current_notification_id().await.unwrap(), 4242);
    }
}
