use crate::error::{EtlError, Result};
use crate::models::{CleanTrip, MasterKind, MasterTable, ResolvedTrip};

/// Replace each trip's payment type and company text with the surrogate keys
/// held in the (already reconciled) master tables.
///
/// Both masters must carry their expected columns; a trip whose value is not
/// in a master is reported as `MissingData` rather than silently dropped.
pub fn resolve(
    cleaned_trips: Vec<CleanTrip>,
    payment_master: &MasterTable,
    company_master: &MasterTable,
) -> Result<Vec<ResolvedTrip>> {
    payment_master.ensure_kind(MasterKind::PaymentType)?;
    company_master.ensure_kind(MasterKind::Company)?;

    let payment_ids = payment_master.lookup();
    let company_ids = company_master.lookup();

    cleaned_trips
        .into_iter()
        .map(|trip| {
            let payment_type_id = *payment_ids
                .get(trip.payment_type.as_str())
                .ok_or_else(|| unresolved(MasterKind::PaymentType, &trip.payment_type, &trip.trip_id))?;
            let company_id = *company_ids
                .get(trip.company.as_str())
                .ok_or_else(|| unresolved(MasterKind::Company, &trip.company, &trip.trip_id))?;

            Ok(ResolvedTrip::from_clean(trip, payment_type_id, company_id))
        })
        .collect()
}

fn unresolved(kind: MasterKind, value: &str, trip_id: &str) -> EtlError {
    EtlError::MissingData(format!(
        "{} '{}' of trip {} has no entry in {}",
        kind.value_column(),
        value,
        trip_id,
        kind.table_name()
    ))
}
