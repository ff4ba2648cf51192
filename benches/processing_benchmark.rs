use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use taxi_weather_etl::models::{MasterKind, MasterRow, MasterTable, RawTrip};
use taxi_weather_etl::processors::{reconcile_kind, resolve, TripNormalizer};

const COMPANIES: usize = 60;
const PAYMENT_TYPES: [&str; 6] = ["Cash", "Credit Card", "Mobile", "Prcard", "Unknown", "No Charge"];

// Synthetic raw batch shaped like the trip source's output
fn create_raw_trips(count: usize) -> Vec<RawTrip> {
    (0..count)
        .map(|i| {
            let minute = i % 60;
            let hour = (i / 60) % 24;
            RawTrip {
                trip_id: Some(format!("trip-{}", i)),
                taxi_id: Some(format!("taxi-{}", i % 500)),
                trip_start_timestamp: Some(format!("2024-01-15T{:02}:{:02}:00.000", hour, minute)),
                trip_end_timestamp: Some(format!("2024-01-15T{:02}:{:02}:30.000", hour, minute)),
                trip_seconds: Some("630".to_string()),
                trip_miles: Some("2.4".to_string()),
                pickup_community_area: Some(((i % 77) + 1).to_string()),
                dropoff_community_area: Some(((i * 7 % 77) + 1).to_string()),
                fare: Some("11.25".to_string()),
                tips: Some("2".to_string()),
                tolls: Some("0".to_string()),
                extras: Some("1".to_string()),
                trip_total: Some("14.25".to_string()),
                payment_type: Some(PAYMENT_TYPES[i % PAYMENT_TYPES.len()].to_string()),
                // Every 10th trip has no company and is dropped
                company: (i % 10 != 0).then(|| format!("Company {}", i % COMPANIES)),
                pickup_centroid_latitude: Some("41.899602111".to_string()),
                pickup_centroid_longitude: Some("-87.633308037".to_string()),
                dropoff_centroid_latitude: Some("41.884987192".to_string()),
                dropoff_centroid_longitude: Some("-87.620992913".to_string()),
                ..RawTrip::default()
            }
        })
        .collect()
}

fn create_company_master(size: usize) -> MasterTable {
    let rows = (0..size)
        .map(|i| MasterRow::new(i as u64 + 1, format!("Company {}", i)))
        .collect();
    MasterTable::from_rows(MasterKind::Company, rows).unwrap()
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [1_000, 10_000, 30_000] {
        let observed: Vec<String> = (0..size).map(|i| format!("Company {}", i % 120)).collect();
        // Half of the observed companies are already known
        let master = create_company_master(COMPANIES);

        group.bench_with_input(BenchmarkId::new("companies", size), &observed, |b, observed| {
            b.iter(|| {
                reconcile_kind(
                    black_box(&master),
                    MasterKind::Company,
                    observed.iter().map(String::as_str),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let normalizer = TripNormalizer::new();

    for size in [1_000, 10_000, 30_000] {
        let raw = create_raw_trips(size);
        group.bench_with_input(BenchmarkId::new("trips", size), &raw, |b, raw| {
            b.iter(|| normalizer.normalize(black_box(raw.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_full_batch(c: &mut Criterion) {
    let normalizer = TripNormalizer::new();
    let raw = create_raw_trips(30_000);
    let payment = MasterTable::empty(MasterKind::PaymentType);
    let company = create_company_master(COMPANIES / 2);

    c.bench_function("normalize_reconcile_resolve_30k", |b| {
        b.iter(|| {
            let trips = normalizer.normalize(black_box(raw.clone())).unwrap();
            let payment = reconcile_kind(
                &payment,
                MasterKind::PaymentType,
                trips.iter().map(|t| t.payment_type.as_str()),
            )
            .unwrap();
            let company = reconcile_kind(
                &company,
                MasterKind::Company,
                trips.iter().map(|t| t.company.as_str()),
            )
            .unwrap();
            resolve(trips, &payment, &company).unwrap()
        })
    });
}

criterion_group!(benches, bench_reconcile, bench_normalize, bench_full_batch);
criterion_main!(benches);
