//! Hive Metastore Thrift transport.
//!
//! Implements [`MetastoreTransport`] on top of the generated
//! `hive_metastore` client and the `volo-thrift` runtime:
//!
//! - Buffered binary protocol, the metastore's default
//! - Remote `NoSuchObjectException` mapped to [`MetastoreError::NotFound`]
//! - All other exceptions mapped to [`MetastoreError::Service`]
//! - Runtime/connection failures mapped to [`MetastoreError::Transport`]

use crate::config::Endpoint;
use crate::model::{
    Database, DropPartitionsRequest, DropPartitionsResult, FieldSchema, PartitionDescriptor,
    SerDeInfo, StorageDescriptor, TableDescriptor,
};
use crate::transport::MetastoreTransport;
use crate::{MetastoreError, Result};
use ahash::AHashMap;
use async_trait::async_trait;
use faststr::FastStr;
use hive_metastore::{ThriftHiveMetastoreClient, ThriftHiveMetastoreClientBuilder};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use tracing::{debug, info};
use volo_thrift::MaybeException;

/// Service name given to the volo client.
const SERVICE_NAME: &str = "hive-metastore";

/// Name of the remote exception that signals a missing object.
const NO_SUCH_OBJECT: &str = "NoSuchObjectException";

/// Thrift transport to a single metastore endpoint.
///
/// The volo client dials lazily, so connection failures surface on the first
/// remote call after [`open`](MetastoreTransport::open) rather than from
/// `open` itself. Calling `open` twice replaces the client.
pub struct ThriftTransport {
    endpoint: Endpoint,
    client: Option<ThriftHiveMetastoreClient>,
}

impl ThriftTransport {
    /// Create a transport for `endpoint`. Nothing is dialed yet.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            client: None,
        }
    }

    /// The endpoint this transport talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn client(&self) -> Result<&ThriftHiveMetastoreClient> {
        self.client.as_ref().ok_or_else(|| {
            MetastoreError::Transport("Hive Metastore client not connected".into()).into()
        })
    }
}

/// Unwrap a volo response, classifying remote exceptions and runtime errors.
fn from_response<T, E, C>(
    response: std::result::Result<MaybeException<T, E>, C>,
    operation: &str,
) -> Result<T>
where
    E: Debug,
    C: Display,
{
    match response {
        Ok(MaybeException::Ok(value)) => Ok(value),
        Ok(MaybeException::Exception(exception)) => Err(classify_exception(&exception, operation)),
        Err(e) => Err(transport_error(e, operation)),
    }
}

/// Generated exception enums print as `O2(NoSuchObjectException { .. })`.
/// Only the payload type decides; messages may quote other exception names.
fn is_no_such_object(detail: &str) -> bool {
    detail
        .split_once('(')
        .map_or(false, |(_, payload)| payload.starts_with(NO_SUCH_OBJECT))
}

fn classify_exception<E: Debug>(exception: &E, operation: &str) -> crate::Error {
    let detail = format!("{:?}", exception);
    if is_no_such_object(&detail) {
        MetastoreError::NotFound(format!("{}: {}", operation, detail)).into()
    } else {
        MetastoreError::Service(format!("{}: {}", operation, detail)).into()
    }
}

fn transport_error<C: Display>(error: C, operation: &str) -> crate::Error {
    MetastoreError::Transport(format!("{} failed: {}", operation, error)).into()
}

#[async_trait]
impl MetastoreTransport for ThriftTransport {
    async fn open(&mut self) -> Result<()> {
        let address = self.endpoint.address();
        debug!(address = %address, "Connecting to Hive Metastore");

        let socket_addr = tokio::net::lookup_host(address.as_str())
            .await
            .map_err(|e| {
                MetastoreError::Transport(format!(
                    "Failed to resolve Hive Metastore address {}: {}",
                    address, e
                ))
            })?
            .next()
            .ok_or_else(|| {
                MetastoreError::Transport(format!(
                    "No socket address found for Hive Metastore {}",
                    address
                ))
            })?;

        let client = ThriftHiveMetastoreClientBuilder::new(SERVICE_NAME)
            .address(socket_addr)
            .make_codec(volo_thrift::codec::default::DefaultMakeCodec::buffered())
            .build();

        self.client = Some(client);

        info!(endpoint = %self.endpoint, addr = %socket_addr, "Connected to Hive Metastore");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.client = None;
        info!(endpoint = %self.endpoint, "Hive Metastore connection closed");
        Ok(())
    }

    async fn get_all_databases(&self) -> Result<Vec<String>> {
        let databases = from_response(
            self.client()?.get_all_databases().await,
            "get_all_databases",
        )?;
        Ok(databases.into_iter().map(|s| s.to_string()).collect())
    }

    async fn get_database(&self, name: &str) -> Result<Database> {
        let database = from_response(
            self.client()?.get_database(FastStr::new(name)).await,
            "get_database",
        )?;
        Ok(database_from_thrift(database))
    }

    async fn get_all_tables(&self, db_name: &str) -> Result<Vec<String>> {
        let tables = from_response(
            self.client()?.get_all_tables(FastStr::new(db_name)).await,
            "get_all_tables",
        )?;
        Ok(tables.into_iter().map(|s| s.to_string()).collect())
    }

    async fn create_database(&self, database: Database) -> Result<()> {
        from_response(
            self.client()?
                .create_database(database_to_thrift(database))
                .await,
            "create_database",
        )
    }

    async fn drop_database(&self, name: &str, delete_data: bool, cascade: bool) -> Result<()> {
        from_response(
            self.client()?
                .drop_database(FastStr::new(name), delete_data, cascade)
                .await,
            "drop_database",
        )
    }

    async fn create_table(&self, table: TableDescriptor) -> Result<()> {
        from_response(
            self.client()?.create_table(table_to_thrift(table)).await,
            "create_table",
        )
    }

    async fn alter_table(
        &self,
        db_name: &str,
        table_name: &str,
        new_table: TableDescriptor,
    ) -> Result<()> {
        from_response(
            self.client()?
                .alter_table(
                    FastStr::new(db_name),
                    FastStr::new(table_name),
                    table_to_thrift(new_table),
                )
                .await,
            "alter_table",
        )
    }

    async fn drop_table(&self, db_name: &str, table_name: &str, delete_data: bool) -> Result<()> {
        from_response(
            self.client()?
                .drop_table(FastStr::new(db_name), FastStr::new(table_name), delete_data)
                .await,
            "drop_table",
        )
    }

    async fn get_table(&self, db_name: &str, table_name: &str) -> Result<TableDescriptor> {
        let table = from_response(
            self.client()?
                .get_table(FastStr::new(db_name), FastStr::new(table_name))
                .await,
            "get_table",
        )?;
        Ok(table_from_thrift(table))
    }

    async fn add_partition(&self, partition: PartitionDescriptor) -> Result<PartitionDescriptor> {
        let added = from_response(
            self.client()?
                .add_partition(partition_to_thrift(partition))
                .await,
            "add_partition",
        )?;
        Ok(partition_from_thrift(added))
    }

    async fn add_partitions(&self, partitions: Vec<PartitionDescriptor>) -> Result<i32> {
        let partitions = partitions.into_iter().map(partition_to_thrift).collect();
        from_response(
            self.client()?.add_partitions(partitions).await,
            "add_partitions",
        )
    }

    async fn get_partitions(
        &self,
        db_name: &str,
        table_name: &str,
        max_parts: i16,
    ) -> Result<Vec<PartitionDescriptor>> {
        let partitions = from_response(
            self.client()?
                .get_partitions(FastStr::new(db_name), FastStr::new(table_name), max_parts)
                .await,
            "get_partitions",
        )?;
        Ok(partitions.into_iter().map(partition_from_thrift).collect())
    }

    async fn get_partition_by_name(
        &self,
        db_name: &str,
        table_name: &str,
        part_name: &str,
    ) -> Result<PartitionDescriptor> {
        let partition = from_response(
            self.client()?
                .get_partition_by_name(
                    FastStr::new(db_name),
                    FastStr::new(table_name),
                    FastStr::new(part_name),
                )
                .await,
            "get_partition_by_name",
        )?;
        Ok(partition_from_thrift(partition))
    }

    async fn drop_partition(
        &self,
        db_name: &str,
        table_name: &str,
        part_vals: Vec<String>,
        delete_data: bool,
    ) -> Result<bool> {
        from_response(
            self.client()?
                .drop_partition(
                    FastStr::new(db_name),
                    FastStr::new(table_name),
                    faststr_vec(part_vals),
                    delete_data,
                )
                .await,
            "drop_partition",
        )
    }

    async fn get_partition_names(
        &self,
        db_name: &str,
        table_name: &str,
        max_parts: i16,
    ) -> Result<Option<Vec<String>>> {
        let names = from_response(
            self.client()?
                .get_partition_names(FastStr::new(db_name), FastStr::new(table_name), max_parts)
                .await,
            "get_partition_names",
        )?;
        Ok(Some(names.into_iter().map(|s| s.to_string()).collect()))
    }

    async fn drop_partitions_req(
        &self,
        request: DropPartitionsRequest,
    ) -> Result<DropPartitionsResult> {
        let request = hive_metastore::DropPartitionsRequest {
            db_name: FastStr::new(&request.db_name),
            tbl_name: FastStr::new(&request.table_name),
            parts: hive_metastore::RequestPartsSpec::Names(faststr_vec(request.names)),
            delete_data: request.delete_data,
            if_exists: request.if_exists,
            need_result: request.need_result,
            ..Default::default()
        };

        let result = from_response(
            self.client()?.drop_partitions_req(request).await,
            "drop_partitions_req",
        )?;

        Ok(DropPartitionsResult {
            partitions: result
                .partitions
                .unwrap_or_default()
                .into_iter()
                .map(partition_from_thrift)
                .collect(),
        })
    }

    async fn get_current_notification_event_id(&self) -> Result<i64> {
        let id = self
            .client()?
            .get_current_notification_event_id()
            .await
            .map_err(|e| transport_error(e, "get_current_notificationEventId"))?;
        Ok(id.event_id)
    }
}

// Conversions between crate model types and generated Thrift types

fn faststr_vec(values: Vec<String>) -> Vec<FastStr> {
    values.into_iter().map(FastStr::from).collect()
}

fn opt_string(value: Option<FastStr>) -> Option<String> {
    value.map(|s| s.to_string())
}

fn opt_faststr(value: Option<String>) -> Option<FastStr> {
    value.map(FastStr::from)
}

fn params_from_thrift(params: Option<AHashMap<FastStr, FastStr>>) -> BTreeMap<String, String> {
    params
        .map(|p| {
            p.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn params_to_thrift(params: BTreeMap<String, String>) -> Option<AHashMap<FastStr, FastStr>> {
    if params.is_empty() {
        return None;
    }
    Some(
        params
            .into_iter()
            .map(|(k, v)| (FastStr::from(k), FastStr::from(v)))
            .collect(),
    )
}

fn field_from_thrift(field: hive_metastore::FieldSchema) -> FieldSchema {
    FieldSchema {
        name: field.name.map(|s| s.to_string()).unwrap_or_default(),
        field_type: field
            .r#type
            .map(|s| s.to_string())
            .unwrap_or_else(|| crate::model::DEFAULT_COLUMN_TYPE.to_string()),
        comment: field.comment.map(|s| s.to_string()).unwrap_or_default(),
    }
}

fn field_to_thrift(field: FieldSchema) -> hive_metastore::FieldSchema {
    hive_metastore::FieldSchema {
        name: Some(field.name.into()),
        r#type: Some(field.field_type.into()),
        comment: Some(field.comment.into()),
    }
}

/// What is left of a generated struct once the modelled fields are taken
/// out, or `None` if nothing is.
fn remainder<T: Default + PartialEq>(rest: T) -> Option<Box<T>> {
    if rest == T::default() {
        None
    } else {
        Some(Box::new(rest))
    }
}

fn serde_from_thrift(mut info: hive_metastore::SerDeInfo) -> SerDeInfo {
    SerDeInfo {
        name: opt_string(info.name.take()),
        serialization_lib: opt_string(info.serialization_lib.take()),
        parameters: params_from_thrift(info.parameters.take()),
        unmodeled: remainder(info),
    }
}

fn serde_to_thrift(info: SerDeInfo) -> hive_metastore::SerDeInfo {
    let mut thrift = info.unmodeled.map(|rest| *rest).unwrap_or_default();
    thrift.name = opt_faststr(info.name);
    thrift.serialization_lib = opt_faststr(info.serialization_lib);
    thrift.parameters = params_to_thrift(info.parameters);
    thrift
}

fn sd_from_thrift(mut sd: hive_metastore::StorageDescriptor) -> StorageDescriptor {
    StorageDescriptor {
        location: sd.location.take().map(|s| s.to_string()).unwrap_or_default(),
        cols: sd
            .cols
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(field_from_thrift)
            .collect(),
        input_format: opt_string(sd.input_format.take()),
        output_format: opt_string(sd.output_format.take()),
        compressed: sd.compressed.take(),
        num_buckets: sd.num_buckets.take(),
        bucket_cols: sd
            .bucket_cols
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.to_string())
            .collect(),
        serde_info: sd.serde_info.take().map(serde_from_thrift),
        parameters: params_from_thrift(sd.parameters.take()),
        unmodeled: remainder(sd),
    }
}

fn sd_to_thrift(sd: StorageDescriptor) -> hive_metastore::StorageDescriptor {
    let mut thrift = sd.unmodeled.map(|rest| *rest).unwrap_or_default();
    thrift.cols = Some(sd.cols.into_iter().map(field_to_thrift).collect());
    thrift.location = Some(sd.location.into());
    thrift.input_format = opt_faststr(sd.input_format);
    thrift.output_format = opt_faststr(sd.output_format);
    thrift.compressed = sd.compressed;
    thrift.num_buckets = sd.num_buckets;
    thrift.bucket_cols = Some(faststr_vec(sd.bucket_cols));
    thrift.serde_info = sd.serde_info.map(serde_to_thrift);
    thrift.parameters = params_to_thrift(sd.parameters);
    thrift
}

fn database_from_thrift(db: hive_metastore::Database) -> Database {
    Database {
        name: db.name.map(|s| s.to_string()).unwrap_or_default(),
        description: opt_string(db.description),
        location_uri: opt_string(db.location_uri),
        owner_name: opt_string(db.owner_name),
        parameters: params_from_thrift(db.parameters),
    }
}

fn database_to_thrift(db: Database) -> hive_metastore::Database {
    hive_metastore::Database {
        name: Some(db.name.into()),
        description: opt_faststr(db.description),
        location_uri: opt_faststr(db.location_uri),
        owner_name: opt_faststr(db.owner_name),
        parameters: params_to_thrift(db.parameters),
        ..Default::default()
    }
}

fn table_from_thrift(mut table: hive_metastore::Table) -> TableDescriptor {
    TableDescriptor {
        db_name: table.db_name.take().map(|s| s.to_string()).unwrap_or_default(),
        table_name: table
            .table_name
            .take()
            .map(|s| s.to_string())
            .unwrap_or_default(),
        owner: opt_string(table.owner.take()),
        partition_keys: table
            .partition_keys
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(field_from_thrift)
            .collect(),
        sd: table.sd.take().map(sd_from_thrift).unwrap_or_default(),
        parameters: params_from_thrift(table.parameters.take()),
        table_type: opt_string(table.table_type.take()),
        create_time: table.create_time.take(),
        last_access_time: table.last_access_time.take(),
        retention: table.retention.take(),
        view_original_text: opt_string(table.view_original_text.take()),
        view_expanded_text: opt_string(table.view_expanded_text.take()),
        unmodeled: remainder(table),
    }
}

fn table_to_thrift(table: TableDescriptor) -> hive_metastore::Table {
    let mut thrift = table.unmodeled.map(|rest| *rest).unwrap_or_default();
    thrift.table_name = Some(table.table_name.into());
    thrift.db_name = Some(table.db_name.into());
    thrift.owner = opt_faststr(table.owner);
    thrift.create_time = table.create_time;
    thrift.last_access_time = table.last_access_time;
    thrift.retention = table.retention;
    thrift.sd = Some(sd_to_thrift(table.sd));
    thrift.partition_keys = Some(
        table
            .partition_keys
            .into_iter()
            .map(field_to_thrift)
            .collect(),
    );
    thrift.parameters = params_to_thrift(table.parameters);
    thrift.view_original_text = opt_faststr(table.view_original_text);
    thrift.view_expanded_text = opt_faststr(table.view_expanded_text);
    thrift.table_type = opt_faststr(table.table_type);
    thrift
}

fn partition_from_thrift(mut partition: hive_metastore::Partition) -> PartitionDescriptor {
    PartitionDescriptor {
        values: partition
            .values
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.to_string())
            .collect(),
        db_name: partition
            .db_name
            .take()
            .map(|s| s.to_string())
            .unwrap_or_default(),
        table_name: partition
            .table_name
            .take()
            .map(|s| s.to_string())
            .unwrap_or_default(),
        sd: partition.sd.take().map(sd_from_thrift).unwrap_or_default(),
        parameters: params_from_thrift(partition.parameters.take()),
        create_time: partition.create_time.take(),
        last_access_time: partition.last_access_time.take(),
        unmodeled: remainder(partition),
    }
}

fn partition_to_thrift(partition: PartitionDescriptor) -> hive_metastore::Partition {
    let mut thrift = partition.unmodeled.map(|rest| *rest).unwrap_or_default();
    thrift.values = Some(faststr_vec(partition.values));
    thrift.db_name = Some(partition.db_name.into());
    thrift.table_name = Some(partition.table_name.into());
    thrift.create_time = partition.create_time;
    thrift.last_access_time = partition.last_access_time;
    thrift.sd = Some(sd_to_thrift(partition.sd));
    thrift.parameters = params_to_thrift(partition.parameters);
    thrift
}
