//! Batched partition removal.

use crate::connection::{MetastoreConnection, ALL_PARTITIONS};
use crate::model::{DropPartitionsRequest, DropPartitionsResult};
use crate::transport::MetastoreTransport;
use crate::Result;
use tracing::{debug, info};

impl<T: MetastoreTransport> MetastoreConnection<T> {
    /// Drop the named partitions in one batched request.
    ///
    /// An empty `names` list returns `None` without contacting the metastore.
    /// `need_result` asks the service to send back the dropped partitions;
    /// `None` leaves the server default.
    pub async fn drop_partitions(
        &self,
        db_name: &str,
        table_name: &str,
        names: Vec<String>,
        need_result: Option<bool>,
    ) -> Result<Option<DropPartitionsResult>> {
        if names.is_empty() {
            debug!(database = %db_name, table = %table_name, "No partitions to drop");
            return Ok(None);
        }

        let count = names.len();
        let request = DropPartitionsRequest::by_names(db_name, table_name, names, need_result);
        let result = self.transport().drop_partitions_req(request).await?;

        info!(
            database = %db_name,
            table = %table_name,
            partitions = count,
            "Dropped partitions"
        );
        Ok(Some(result))
    }

    /// Drop every partition of a table.
    ///
    /// Lists the partition names, then drops them in one batch. The two calls
    /// are not atomic: a partition added between them survives.
    pub async fn drop_all_partitions(
        &self,
        db_name: &str,
        table_name: &str,
        need_result: Option<bool>,
    ) -> Result<Option<DropPartitionsResult>> {
        let names = self
            .get_partition_names(db_name, table_name, ALL_PARTITIONS)
            .await?;
        self.drop_partitions(db_name, table_name, names, need_result)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Endpoint;
    use crate::connection::MetastoreConnection;
    use crate::transport::testing::{Call, RecordingTransport};
    use crate::{Error, MetastoreError};

    fn connection(transport: RecordingTransport) -> MetastoreConnection<RecordingTransport> {
        MetastoreConnection::with_transport(Endpoint::default(), transport)
    }

    fn is_drop(call: &Call) -> bool {
        matches!(call, Call::DropPartitionsReq(_))
    }

    #[tokio::test]
    async fn test_drop_partitions_empty_is_noop() {
        let conn = connection(RecordingTransport::default());

        let result = conn
            .drop_partitions("db", "tbl", vec![], Some(true))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(conn.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_drop_partitions_builds_single_request() {
        let conn = connection(RecordingTransport::default());
        let names = vec!["ds=2024-01-01".to_string(), "ds=2024-01-02".to_string()];

        let result = conn
            .drop_partitions("db", "tbl", names.clone(), Some(false))
            .await
            .unwrap();
        assert!(result.is_some());

        let calls = conn.transport().calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::DropPartitionsReq(req) => {
                assert_eq!(req.db_name, "db");
                assert_eq!(req.table_name, "tbl");
                assert_eq!(req.names, names);
                assert_eq!(req.need_result, Some(false));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_drop_all_partitions_lists_then_drops_once() {
        let conn = connection(RecordingTransport {
            partition_names: Some(vec!["ds=1".into(), "ds=2".into(), "ds=3".into()]),
            ..Default::default()
        });

        conn.drop_all_partitions("db", "tbl", None).await.unwrap();

        let calls = conn.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::GetPartitionNames(-1));
        match &calls[1] {
            Call::DropPartitionsReq(req) => {
                assert_eq!(req.names.len(), 3);
                assert!(req.need_result.is_none());
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_drop_all_partitions_without_partitions() {
        // Both an empty list and a missing list skip the drop
        for names in [Some(vec![]), None] {
            let conn = connection(RecordingTransport {
                partition_names: names,
                ..Default::default()
            });

            let result = conn.drop_all_partitions("db", "tbl", Some(true)).await.unwrap();
            assert!(result.is_none());
            assert_eq!(conn.transport().count(|c| matches!(c, Call::GetPartitionNames(_))), 1);
            assert_eq!(conn.transport().count(is_drop), 0);
        }
    }

    #[tokio::test]
    async fn test_drop_all_partitions_listing_failure_skips_drop() {
        let conn = connection(RecordingTransport {
            fail_remote: true,
            ..Default::default()
        });

        let err = conn.drop_all_partitions("db", "tbl", None).await.unwrap_err();
        assert!(matches!(err, Error::Metastore(MetastoreError::Transport(_))));
        assert_eq!(conn.transport().count(is_drop), 0);
    }
}
