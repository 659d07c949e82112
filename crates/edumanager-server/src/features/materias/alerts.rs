//! Deadline alerts
//!
//! The horizon is always applied as given. Treating `0` as "no filtering" is
//! a list-view rule and lives in `queries::list`.

use chrono::{Days, NaiveDate};

use super::types::Materia;

/// Last day covered by a horizon starting at `today`
pub fn horizon_end(today: NaiveDate, horizon_days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Deadline set, on or before `today + horizon_days`, and status not "Concluído"
///
/// Overdue records are included.
pub fn is_alert(record: &Materia, horizon_days: u32, today: NaiveDate) -> bool {
    let Some(deadline) = record.data_limite_da_entrega else {
        return false;
    };
    let done = record.status.is_some_and(|s| s.is_done());
    deadline <= horizon_end(today, horizon_days) && !done
}

/// Records that need attention within the horizon
pub fn compute_alerts(records: &[Materia], horizon_days: u32, today: NaiveDate) -> Vec<Materia> {
    let alerts: Vec<Materia> = records
        .iter()
        .filter(|r| is_alert(r, horizon_days, today))
        .cloned()
        .map(|mut r| {
            r.alerta = true;
            r
        })
        .collect();

    tracing::info!(count = alerts.len(), horizon_days, "Alerts computed");
    alerts
}
