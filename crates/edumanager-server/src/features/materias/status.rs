//! Read-time status derivation
//!
//! A record linked to a group takes its status and deadline from the block
//! chain of that group instead of its own columns. Blocks are ordered by
//! their numeric label: block `n` follows block `n - 1` of the same group.
//!
//! For block `n` with deadline `own` and predecessor deadline `prev`:
//!
//! | today                  | first block (`n == 1`) | later block   |
//! |------------------------|------------------------|---------------|
//! | `today >= own`         | Concluído              | Concluído     |
//! | `prev <= today < own`  | Em andamento           | Em andamento  |
//! | `today < prev`         | Em andamento           | Não iniciado  |
//!
//! After resolution a "Concluído" record without a final approval date is
//! shown as "Aguardando revisão pedagógica".

use std::collections::HashMap;

use chrono::NaiveDate;
use edumanager_common::MateriaStatus;

use super::types::Materia;

/// One `bloco` row, as loaded for derivation
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BlockDeadline {
    pub bloco: String,
    pub grupo: String,
    pub data_limite_entrega: NaiveDate,
}

/// Numeric position of a block label, if it has one
pub fn block_ordinal(label: &str) -> Option<i64> {
    label.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

/// Status of a block given its own deadline and its predecessor's
///
/// `previous` is `None` for the first block of a chain.
pub fn status_for_block(
    own: NaiveDate,
    previous: Option<NaiveDate>,
    today: NaiveDate,
) -> MateriaStatus {
    if today >= own {
        return MateriaStatus::Done;
    }
    match previous {
        None => MateriaStatus::InProgress,
        Some(prev) if today >= prev => MateriaStatus::InProgress,
        Some(_) => MateriaStatus::NotStarted,
    }
}

/// "Concluído" without final approval is awaiting pedagogical review
pub fn apply_review_gate(
    status: Option<MateriaStatus>,
    approved_on: Option<NaiveDate>,
) -> Option<MateriaStatus> {
    match (status, approved_on) {
        (Some(MateriaStatus::Done), None) => Some(MateriaStatus::AwaitingPedagogicalReview),
        (status, _) => status,
    }
}

/// Block deadlines indexed by group and ordinal
#[derive(Debug, Default, Clone)]
pub struct BlockSchedule {
    deadlines: HashMap<(String, i64), Vec<NaiveDate>>,
}

impl BlockSchedule {
    pub fn new(rows: impl IntoIterator<Item = BlockDeadline>) -> Self {
        let mut deadlines: HashMap<(String, i64), Vec<NaiveDate>> = HashMap::new();
        for row in rows {
            let Some(ordinal) = block_ordinal(&row.bloco) else {
                tracing::debug!(bloco = %row.bloco, "Skipping non-numeric block label");
                continue;
            };
            deadlines
                .entry((row.grupo, ordinal))
                .or_default()
                .push(row.data_limite_entrega);
        }
        for dates in deadlines.values_mut() {
            dates.sort_unstable();
            dates.dedup();
        }
        Self { deadlines }
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// The checkpoint still ahead of `today`, or the last one once all have passed
    fn own_deadline(&self, grupo: &str, ordinal: i64, today: NaiveDate) -> Option<NaiveDate> {
        let dates = self.deadlines.get(&(grupo.to_string(), ordinal))?;
        dates
            .iter()
            .copied()
            .find(|d| *d >= today)
            .or_else(|| dates.last().copied())
    }

    fn previous_deadline(&self, grupo: &str, ordinal: i64) -> Option<NaiveDate> {
        if ordinal <= 1 {
            return None;
        }
        self.deadlines
            .get(&(grupo.to_string(), ordinal - 1))
            .and_then(|dates| dates.last().copied())
    }

    /// Effective status and deadline for block `bloco` in `grupo`
    ///
    /// A later block whose predecessor is missing is treated as the first
    /// block of its chain.
    pub fn resolve(
        &self,
        grupo: &str,
        bloco: &str,
        today: NaiveDate,
    ) -> Option<(MateriaStatus, NaiveDate)> {
        let ordinal = block_ordinal(bloco)?;
        let own = self.own_deadline(grupo, ordinal, today)?;
        let previous = self.previous_deadline(grupo, ordinal);
        Some((status_for_block(own, previous, today), own))
    }
}

/// Overlay the effective status and deadline onto `record`
pub fn derive_status(
    record: &mut Materia,
    grupo: Option<&str>,
    schedule: &BlockSchedule,
    today: NaiveDate,
) {
    if let (Some(bloco), Some(grupo)) = (record.bloco.as_deref(), grupo) {
        if let Some((status, deadline)) = schedule.resolve(grupo, bloco, today) {
            record.status = Some(status);
            record.data_limite_da_entrega = Some(deadline);
        }
    }
    record.status = apply_review_gate(record.status, record.data_de_aprovacao_final);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn block(bloco: &str, grupo: &str, deadline: NaiveDate) -> BlockDeadline {
        BlockDeadline {
            bloco: bloco.into(),
            grupo: grupo.into(),
            data_limite_entrega: deadline,
        }
    }

    fn chain() -> BlockSchedule {
        BlockSchedule::new([
            block("1", "G", date(2026, 3, 10)),
            block("2", "G", date(2026, 4, 10)),
        ])
    }

    #[test]
    fn test_chain_before_first_deadline() {
        let schedule = chain();
        let today = date(2026, 3, 1);
        assert_eq!(
            schedule.resolve("G", "1", today).map(|r| r.0),
            Some(MateriaStatus::InProgress)
        );
        assert_eq!(
            schedule.resolve("G", "2", today).map(|r| r.0),
            Some(MateriaStatus::NotStarted)
        );
    }

    #[test]
    fn test_chain_between_deadlines() {
        let schedule = chain();
        let today = date(2026, 3, 20);
        assert_eq!(schedule.resolve("G", "1", today).map(|r| r.0), Some(MateriaStatus::Done));
        assert_eq!(
            schedule.resolve("G", "2", today).map(|r| r.0),
            Some(MateriaStatus::InProgress)
        );
    }

    #[test]
    fn test_chain_after_last_deadline() {
        let schedule = chain();
        let today = date(2026, 5, 1);
        assert_eq!(schedule.resolve("G", "1", today).map(|r| r.0), Some(MateriaStatus::Done));
        assert_eq!(schedule.resolve("G", "2", today).map(|r| r.0), Some(MateriaStatus::Done));
    }

    #[test]
    fn test_boundary_days() {
        let own = date(2026, 4, 10);
        let prev = date(2026, 3, 10);
        assert_eq!(status_for_block(own, None, own), MateriaStatus::Done);
        assert_eq!(status_for_block(own, Some(prev), own), MateriaStatus::Done);
        assert_eq!(status_for_block(own, Some(prev), prev), MateriaStatus::InProgress);
    }

    #[test]
    fn test_groups_are_independent() {
        let schedule = BlockSchedule::new([
            block("1", "G", date(2026, 3, 10)),
            block("2", "G", date(2026, 4, 10)),
            block("1", "H", date(2026, 5, 10)),
            block("2", "H", date(2026, 6, 10)),
        ]);
        let today = date(2026, 3, 20);
        assert_eq!(
            schedule.resolve("H", "2", today).map(|r| r.0),
            Some(MateriaStatus::NotStarted)
        );
        assert_eq!(schedule.resolve("Z", "1", today), None);
    }

    #[test]
    fn test_missing_predecessor_acts_as_first_block() {
        let schedule = BlockSchedule::new([block("3", "G", date(2026, 4, 10))]);
        assert_eq!(
            schedule.resolve("G", "3", date(2026, 1, 1)).map(|r| r.0),
            Some(MateriaStatus::InProgress)
        );
    }

    #[test]
    fn test_non_numeric_labels_do_not_resolve() {
        let schedule = BlockSchedule::new([block("A", "G", date(2026, 4, 10))]);
        assert!(schedule.is_empty());
        assert_eq!(schedule.resolve("G", "A", date(2026, 1, 1)), None);
        assert_eq!(block_ordinal(" 2 "), Some(2));
        assert_eq!(block_ordinal("0"), None);
    }

    #[test]
    fn test_own_deadline_picks_next_checkpoint() {
        let schedule = BlockSchedule::new([
            block("1", "G", date(2026, 2, 1)),
            block("1", "G", date(2026, 6, 1)),
        ]);
        assert_eq!(
            schedule.resolve("G", "1", date(2026, 3, 1)),
            Some((MateriaStatus::InProgress, date(2026, 6, 1)))
        );
        assert_eq!(
            schedule.resolve("G", "1", date(2026, 7, 1)),
            Some((MateriaStatus::Done, date(2026, 6, 1)))
        );
    }

    #[test]
    fn test_derive_overrides_stored_values() {
        let mut record = Materia::with_id(1);
        record.bloco = Some("2".into());
        record.status = Some(MateriaStatus::Done);
        record.data_limite_da_entrega = Some(date(2030, 1, 1));

        derive_status(&mut record, Some("G"), &chain(), date(2026, 3, 20));
        assert_eq!(record.status, Some(MateriaStatus::InProgress));
        assert_eq!(record.data_limite_da_entrega, Some(date(2026, 4, 10)));
    }

    #[test]
    fn test_derive_falls_back_without_group() {
        let mut record = Materia::with_id(1);
        record.bloco = Some("2".into());
        record.status = Some(MateriaStatus::NotStarted);

        derive_status(&mut record, None, &chain(), date(2026, 3, 20));
        assert_eq!(record.status, Some(MateriaStatus::NotStarted));
    }

    #[test]
    fn test_review_gate() {
        let mut record = Materia::with_id(1);
        record.status = Some(MateriaStatus::Done);
        derive_status(&mut record, None, &BlockSchedule::default(), date(2026, 1, 1));
        assert_eq!(record.status, Some(MateriaStatus::AwaitingPedagogicalReview));

        let mut approved = Materia::with_id(2);
        approved.status = Some(MateriaStatus::Done);
        approved.data_de_aprovacao_final = Some(date(2026, 1, 1));
        derive_status(&mut approved, None, &BlockSchedule::default(), date(2026, 1, 2));
        assert_eq!(approved.status, Some(MateriaStatus::Done));
    }

    #[test]
    fn test_review_gate_applies_to_block_result() {
        let mut record = Materia::with_id(1);
        record.bloco = Some("1".into());
        derive_status(&mut record, Some("G"), &chain(), date(2026, 5, 1));
        assert_eq!(record.status, Some(MateriaStatus::AwaitingPedagogicalReview));
    }
}
