use tracing::info;

use crate::cli::args::{Cli, Commands};
use crate::config::{Settings, StorageBackend};
use crate::error::Result;
use crate::jobs::{ExtractJob, TransformJob};
use crate::models::MasterKind;
use crate::sources::HttpReferenceSource;
use crate::storage::{
    BucketStore, FileKind, LocalBucketStore, PrefixWorkQueue, S3BucketStore, WorkQueue,
};
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let store = open_store(&settings).await?;
    let layout = &settings.layout;

    match cli.command {
        Commands::Extract { date } => {
            let source =
                HttpReferenceSource::new(settings.sources.clone(), settings.trip_api_token())?;
            let job = ExtractJob::new(&source, store.as_ref(), layout)
                .with_lag_months(settings.extract.lag_months);

            let progress = ProgressReporter::new_spinner("Fetching trips and weather...", cli.quiet);
            let outcome = match date {
                Some(date) => job.run_for(date).await?,
                None => job.run().await?,
            };
            progress.finish_with_message(&format!("Extracted {}", outcome.date));

            println!("Uploaded {}", outcome.taxi_key);
            println!("Uploaded {}", outcome.weather_key);
        }

        Commands::Transform { only } => {
            let kinds: Vec<FileKind> = match only {
                Some(kind) => vec![kind.into()],
                None => FileKind::ALL.to_vec(),
            };

            let progress = ProgressReporter::new_spinner("Transforming raw files...", cli.quiet);
            let job = TransformJob::new(store.as_ref(), layout).with_kinds(&kinds);
            let report = job.run(Some(&progress)).await?;
            progress.finish_with_message(&format!(
                "Transformed {} files",
                report.files_processed()
            ));

            println!("\n{}", report.generate_summary());
        }

        Commands::Status => {
            let queue = PrefixWorkQueue::new(store.as_ref(), layout);
            for kind in FileKind::ALL {
                let pending = queue.pending(kind).await?;
                println!(
                    "{} files pending: {} (prefix {})",
                    kind,
                    pending.items.len(),
                    layout.incoming_prefix(kind)
                );
                for item in &pending.items {
                    println!("  {}", item.file_name);
                }
                for key in &pending.skipped {
                    println!("  skipped: {}", key);
                }
            }

            let masters = TransformJob::new(store.as_ref(), layout).load_masters().await?;
            for kind in MasterKind::ALL {
                let table = masters.get(kind);
                println!(
                    "{}: {} rows (max id {})",
                    kind.table_name(),
                    table.len(),
                    table.max_id()
                );
            }
        }

        Commands::Master { kind } => {
            let kind = MasterKind::from(kind);
            let masters = TransformJob::new(store.as_ref(), layout).load_masters().await?;
            let table = masters.get(kind);

            println!("{} ({})", kind.table_name(), layout.master_key(kind));
            println!("{:>6}  {}", table.id_column(), table.value_column());
            for row in table.rows() {
                println!("{:>6}  {}", row.id, row.value);
            }
        }
    }

    Ok(())
}

async fn open_store(settings: &Settings) -> Result<Box<dyn BucketStore>> {
    let store: Box<dyn BucketStore> = match settings.storage.backend {
        StorageBackend::S3 => {
            let store = S3BucketStore::new(settings.storage.s3.clone()).await?;
            info!(bucket = %store.bucket(), "using S3 storage");
            Box::new(store)
        }
        StorageBackend::Local => {
            let store = LocalBucketStore::new(&settings.storage.local_root)?;
            info!(root = %store.root().display(), "using local storage");
            Box::new(store)
        }
    };
    Ok(store)
}
