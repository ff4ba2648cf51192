//! Transform run: turns every pending raw file into a transformed CSV, keeping
//! the payment type and company masters up to date along the way.

use bytes::Bytes;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{EtlError, Result};
use crate::models::{MasterKind, MasterTable};
use crate::processors::{reconcile_kind, resolve, shape, FileOutcome, TransformReport, TripNormalizer};
use crate::readers::{MasterReader, RawReader};
use crate::storage::{
    BucketStore, FileKind, PrefixWorkQueue, StorageError, StorageLayout, WorkItem, WorkQueue,
};
use crate::utils::constants::CONTENT_TYPE_CSV;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;

/// Master tables as they stand at a given point of the run
#[derive(Debug, Clone, PartialEq)]
pub struct Masters {
    pub payment_type: MasterTable,
    pub company: MasterTable,
}

impl Masters {
    pub fn get(&self, kind: MasterKind) -> &MasterTable {
        match kind {
            MasterKind::PaymentType => &self.payment_type,
            MasterKind::Company => &self.company,
        }
    }
}

pub struct TransformJob<'a> {
    store: &'a dyn BucketStore,
    layout: &'a StorageLayout,
    queue: Box<dyn WorkQueue + 'a>,
    kinds: Vec<FileKind>,
    raw_reader: RawReader,
    master_reader: MasterReader,
    normalizer: TripNormalizer,
    writer: CsvWriter,
}

impl<'a> TransformJob<'a> {
    /// Job reading work from the incoming prefixes of `store`
    pub fn new(store: &'a dyn BucketStore, layout: &'a StorageLayout) -> Self {
        Self {
            store,
            layout,
            queue: Box::new(PrefixWorkQueue::new(store, layout)),
            kinds: FileKind::ALL.to_vec(),
            raw_reader: RawReader::new(),
            master_reader: MasterReader::new(),
            normalizer: TripNormalizer::new(),
            writer: CsvWriter::new(),
        }
    }

    /// Take work items from another queue; outputs and masters still go to `store`
    pub fn with_queue(mut self, queue: impl WorkQueue + 'a) -> Self {
        self.queue = Box::new(queue);
        self
    }

    /// Restrict the run to the given file kinds (taxi files always go first)
    pub fn with_kinds(mut self, kinds: &[FileKind]) -> Self {
        self.kinds = FileKind::ALL
            .into_iter()
            .filter(|kind| kinds.contains(kind))
            .collect();
        self
    }

    pub async fn run(&self, progress: Option<&ProgressReporter>) -> Result<TransformReport> {
        let mut report = TransformReport::new();

        if self.kinds.contains(&FileKind::Taxi) {
            let pending = self.queue.pending(FileKind::Taxi).await?;
            report.skipped_keys.extend(pending.skipped);

            if !pending.items.is_empty() {
                let mut masters = self.load_masters().await?;
                for item in &pending.items {
                    if let Some(pb) = progress {
                        pb.set_message(&format!("Transforming {}", item.file_name));
                    }
                    let outcome = self
                        .process_taxi(item, &mut masters, &mut report)
                        .await
                        .map_err(|err| log_failure(item, err))?;
                    report.taxi_files.push(outcome);
                    if let Some(pb) = progress {
                        pb.increment(1);
                    }
                }
            } else {
                info!("no pending taxi files");
            }
        }

        if self.kinds.contains(&FileKind::Weather) {
            let pending = self.queue.pending(FileKind::Weather).await?;
            report.skipped_keys.extend(pending.skipped);

            if pending.items.is_empty() {
                info!("no pending weather files");
            }
            for item in &pending.items {
                if let Some(pb) = progress {
                    pb.set_message(&format!("Transforming {}", item.file_name));
                }
                let outcome = self
                    .process_weather(item)
                    .await
                    .map_err(|err| log_failure(item, err))?;
                report.weather_files.push(outcome);
                if let Some(pb) = progress {
                    pb.increment(1);
                }
            }
        }

        Ok(report)
    }

    /// Current masters from storage; a master that was never written is empty
    pub async fn load_masters(&self) -> Result<Masters> {
        Ok(Masters {
            payment_type: self.load_master(MasterKind::PaymentType).await?,
            company: self.load_master(MasterKind::Company).await?,
        })
    }

    async fn load_master(&self, kind: MasterKind) -> Result<MasterTable> {
        let key = self.layout.master_key(kind);
        match self.store.get_object(&key).await {
            Ok(bytes) => {
                let table = self.master_reader.read_master(kind, &bytes)?;
                debug!(key = %key, rows = table.len(), "loaded {}", kind.table_name());
                Ok(table)
            }
            Err(StorageError::NotFound(_)) => {
                info!(key = %key, "no {} yet, starting empty", kind.table_name());
                Ok(MasterTable::empty(kind))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn process_taxi(
        &self,
        item: &WorkItem,
        masters: &mut Masters,
        report: &mut TransformReport,
    ) -> Result<FileOutcome> {
        let bytes = self.queue.read(item).await?;
        let raw_trips = self.raw_reader.read_trips(&bytes)?;
        let rows_read = raw_trips.len();

        let trips = self.normalizer.normalize(raw_trips)?;

        let payment_type = reconcile_kind(
            &masters.payment_type,
            MasterKind::PaymentType,
            trips.iter().map(|t| t.payment_type.as_str()),
        )?;
        let company = reconcile_kind(
            &masters.company,
            MasterKind::Company,
            trips.iter().map(|t| t.company.as_str()),
        )?;

        let resolved = resolve(trips, &payment_type, &company)?;
        let date = output_date(resolved.first().map(|t| t.datetime_for_weather.date()), item)?;

        let output_key = self.layout.transformed_key(FileKind::Taxi, date);
        let body = self.writer.write_trips(&resolved)?;
        self.store
            .put_object(&output_key, Bytes::from(body), CONTENT_TYPE_CSV)
            .await?;

        self.queue.complete(item).await?;

        self.persist_master(MasterKind::PaymentType, &payment_type).await?;
        self.persist_master(MasterKind::Company, &company).await?;

        report.record_new_keys(
            MasterKind::PaymentType,
            payment_type.len() - masters.payment_type.len(),
        );
        report.record_new_keys(MasterKind::Company, company.len() - masters.company.len());
        masters.payment_type = payment_type;
        masters.company = company;

        info!(
            source = %item.key,
            output = %output_key,
            rows_read,
            rows_written = resolved.len(),
            "transformed taxi file"
        );

        Ok(FileOutcome {
            source_key: item.key.clone(),
            output_key,
            rows_read,
            rows_written: resolved.len(),
        })
    }

    async fn process_weather(&self, item: &WorkItem) -> Result<FileOutcome> {
        let bytes = self.queue.read(item).await?;
        let response = self.raw_reader.read_weather(&bytes)?;
        let records = shape(response)?;

        let date = output_date(records.first().map(|r| r.datetime.date()), item)?;
        let output_key = self.layout.transformed_key(FileKind::Weather, date);
        let body = self.writer.write_weather(&records)?;
        self.store
            .put_object(&output_key, Bytes::from(body), CONTENT_TYPE_CSV)
            .await?;

        self.queue.complete(item).await?;

        info!(
            source = %item.key,
            output = %output_key,
            rows = records.len(),
            "transformed weather file"
        );

        Ok(FileOutcome {
            source_key: item.key.clone(),
            output_key,
            rows_read: records.len(),
            rows_written: records.len(),
        })
    }

    /// Write `table` as the current master, first copying the existing
    /// current object to the previous-version key
    async fn persist_master(&self, kind: MasterKind, table: &MasterTable) -> Result<()> {
        let key = self.layout.master_key(kind);

        if self.store.object_exists(&key).await? {
            let previous = self.layout.master_previous_key(kind);
            self.store.copy_object(&key, &previous).await?;
            debug!(from = %key, to = %previous, "archived previous {}", kind.table_name());
        }

        let body = self.writer.write_master(table)?;
        self.store
            .put_object(&key, Bytes::from(body), CONTENT_TYPE_CSV)
            .await?;
        debug!(key = %key, rows = table.len(), "wrote {}", kind.table_name());
        Ok(())
    }
}

fn log_failure(item: &WorkItem, err: EtlError) -> EtlError {
    if err.is_validation() {
        warn!(key = %item.key, error = %err, "rejected raw file; it stays in the incoming prefix");
    } else {
        warn!(key = %item.key, error = %err, "failed to transform raw file");
    }
    err
}

/// Output files are named after the first row's day, or the raw file's date
/// when there are no rows
fn output_date(first_row: Option<NaiveDate>, item: &WorkItem) -> Result<NaiveDate> {
    first_row.or(item.date).ok_or_else(|| {
        EtlError::MissingData(format!(
            "cannot date output for {}: no rows and no date in file name",
            item.key
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MasterRow;
    use crate::storage::InMemoryBucketStore;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    const PAYMENT_MASTER: &str = "transformed_data/payment_type/payment_type_master.csv";
    const PAYMENT_PREVIOUS: &str =
        "transformed_data/master_table_previous_version/payment_type_master_previous_version.csv";

    fn item(date: Option<NaiveDate>) -> WorkItem {
        WorkItem {
            key: "raw_data/to_processed/taxi_data/taxi_raw_x.json".to_string(),
            file_name: "taxi_raw_x.json".to_string(),
            kind: FileKind::Taxi,
            date,
        }
    }

    #[test]
    fn test_output_date_prefers_first_row() {
        let row = NaiveDate::from_ymd_opt(2024, 1, 2);
        let file = NaiveDate::from_ymd_opt(2024, 1, 1);

        assert_eq!(output_date(row, &item(file)).unwrap(), row.unwrap());
        assert_eq!(output_date(None, &item(file)).unwrap(), file.unwrap());
        assert!(matches!(
            output_date(None, &item(None)),
            Err(EtlError::MissingData(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_masters_load_empty() {
        let store = InMemoryBucketStore::new();
        let layout = StorageLayout::default();

        let masters = TransformJob::new(&store, &layout).load_masters().await.unwrap();

        assert!(masters.payment_type.is_empty());
        assert_eq!(masters.get(MasterKind::Company).id_column(), "company_id");
    }

    #[tokio::test]
    async fn test_corrupt_master_fails_load() {
        let store = InMemoryBucketStore::new();
        let layout = StorageLayout::default();
        store.insert(PAYMENT_MASTER, "id,name\n1,Cash\n");

        let result = TransformJob::new(&store, &layout).load_masters().await;

        assert!(matches!(result, Err(EtlError::MissingColumn { .. })));
    }

    /// Queue fed from a fixed list, recording what was completed
    struct FixedQueue {
        items: Vec<(WorkItem, &'static str)>,
        completed: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl WorkQueue for FixedQueue {
        async fn pending(&self, kind: FileKind) -> Result<crate::storage::PendingWork> {
            Ok(crate::storage::PendingWork {
                items: self
                    .items
                    .iter()
                    .filter(|(item, _)| item.kind == kind)
                    .map(|(item, _)| item.clone())
                    .collect(),
                skipped: Vec::new(),
            })
        }

        async fn read(&self, item: &WorkItem) -> Result<Bytes> {
            let (_, body) = self
                .items
                .iter()
                .find(|(i, _)| i.key == item.key)
                .ok_or_else(|| StorageError::NotFound(item.key.clone()))?;
            Ok(Bytes::copy_from_slice(body.as_bytes()))
        }

        async fn complete(&self, item: &WorkItem) -> Result<String> {
            self.completed.lock().unwrap().push(item.key.clone());
            Ok(item.key.clone())
        }
    }

    #[tokio::test]
    async fn test_runs_from_custom_queue() {
        let store = InMemoryBucketStore::new();
        let layout = StorageLayout::default();
        let item = WorkItem {
            key: "queue/message-1".to_string(),
            file_name: "message-1".to_string(),
            kind: FileKind::Weather,
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
        };
        let queue = FixedQueue {
            items: vec![(item, r#"{"hourly":{"time":[],"temperature_2m":[],"wind_speed_10m":[],"precipitation":[],"rain":[]}}"#)],
            completed: Arc::new(Mutex::new(Vec::new())),
        };
        let completed = Arc::clone(&queue.completed);

        let report = TransformJob::new(&store, &layout)
            .with_queue(queue)
            .run(None)
            .await
            .unwrap();

        assert_eq!(report.weather_files.len(), 1);
        assert_eq!(*completed.lock().unwrap(), vec!["queue/message-1".to_string()]);
        assert_eq!(
            store.keys(),
            vec!["transformed_data/weather/weather_2024-03-01.csv".to_string()]
        );
    }

    #[tokio::test]
    async fn test_persist_master_keeps_previous_version() {
        let store = InMemoryBucketStore::new();
        let layout = StorageLayout::default();
        let job = TransformJob::new(&store, &layout);

        let first = MasterTable::from_rows(MasterKind::PaymentType, vec![MasterRow::new(1, "Cash")]).unwrap();
        job.persist_master(MasterKind::PaymentType, &first).await.unwrap();
        assert!(!store.keys().contains(&PAYMENT_PREVIOUS.to_string()));

        let second = MasterTable::from_rows(
            MasterKind::PaymentType,
            vec![MasterRow::new(1, "Cash"), MasterRow::new(2, "Card")],
        )
        .unwrap();
        job.persist_master(MasterKind::PaymentType, &second).await.unwrap();

        let previous = store.get_object(PAYMENT_PREVIOUS).await.unwrap();
        let current = store.get_object(PAYMENT_MASTER).await.unwrap();
        assert_eq!(&previous[..], b"payment_type_id,payment_type\n1,Cash\n");
        assert_eq!(&current[..], b"payment_type_id,payment_type\n1,Cash\n2,Card\n");
    }
}
