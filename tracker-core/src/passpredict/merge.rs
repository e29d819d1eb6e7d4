//! Pass-predict merge-commit rule (spec §4.4 "AOP updates commit as a
//! whole"), grounded on `argos_rx_service.cpp`'s `update_pass_predict`:
//! a freshly decoded batch only replaces the stored database if every one
//! of its records was successfully merged *and* the result is at least as
//! large as what it replaces. A partial batch (one truncated/unparseable
//! record) is discarded in full rather than applied piecemeal.

use super::aop::{AopSatelliteEntry, BasePassPredict};

/// Merges `new` into `existing` record-by-record: a record whose status is
/// "on" and carries a non-empty bulletin fully overwrites (or inserts) the
/// matching entry; a record that is "off" on both links only refreshes the
/// status fields of an existing entry, leaving its orbit/bulletin alone.
/// Returns the merged database and the count of records successfully
/// applied, mirroring `update_pass_predict`'s `num_updated_records`.
fn apply_records(existing: &BasePassPredict, new: &BasePassPredict) -> (BasePassPredict, usize) {
    let mut merged = *existing;
    let mut updated = 0usize;

    for record in new.as_slice() {
        if let Some(slot) = merged.records[..merged.num_records]
            .iter_mut()
            .find(|e| e.sat_hex_id == record.sat_hex_id)
        {
            if record.is_off() {
                slot.downlink_status = record.downlink_status;
                slot.uplink_status = record.uplink_status;
            } else if !record.bulletin.is_empty() {
                *slot = *record;
            } else {
                continue;
            }
            updated += 1;
        } else if merged.num_records < super::aop::MAX_AOP_SATELLITE_ENTRIES {
            insert(&mut merged, *record);
            updated += 1;
        }
    }

    (merged, updated)
}

fn insert(db: &mut BasePassPredict, record: AopSatelliteEntry) {
    db.records[db.num_records] = record;
    db.num_records += 1;
}

/// Attempts to commit `new` over `existing`. Returns the merged database
/// only if every record in `new` was applied (`num_updated_records ==
/// new.num_records`) and the merge didn't shrink the database
/// (`num_updated_records >= existing.num_records`); otherwise the existing
/// database is left untouched.
pub fn commit_pass_predict(
    existing: &BasePassPredict,
    new: &BasePassPredict,
) -> Option<BasePassPredict> {
    let (merged, num_updated_records) = apply_records(existing, new);
    if num_updated_records == new.num_records && num_updated_records >= existing.num_records {
        Some(merged)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passpredict::aop::{BulletinTimestamp, DownlinkStatus, OrbitalElements, UplinkStatus};

    fn on_record(hex_id: u8) -> AopSatelliteEntry {
        AopSatelliteEntry {
            sat_hex_id: hex_id,
            dcs_id: hex_id,
            downlink_status: DownlinkStatus::OnA3,
            uplink_status: UplinkStatus::default(),
            bulletin: BulletinTimestamp {
                year: 2026,
                month: 1,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
            },
            orbit: OrbitalElements::default(),
        }
    }

    #[test]
    fn fully_applied_batch_commits() {
        let existing = BasePassPredict::new();
        let mut new = BasePassPredict::new();
        new.records[0] = on_record(3);
        new.num_records = 1;

        let merged = commit_pass_predict(&existing, &new).expect("commits");
        assert_eq!(merged.num_records, 1);
        assert_eq!(merged.records[0].sat_hex_id, 3);
    }

    #[test]
    fn batch_that_would_shrink_the_database_is_rejected() {
        let mut existing = BasePassPredict::new();
        existing.records[0] = on_record(3);
        existing.records[1] = on_record(4);
        existing.num_records = 2;

        let mut new = BasePassPredict::new();
        new.records[0] = on_record(3);
        new.num_records = 1;

        assert!(commit_pass_predict(&existing, &new).is_none());
    }

    #[test]
    fn status_only_record_refreshes_without_touching_orbit() {
        let mut existing = BasePassPredict::new();
        let mut stored = on_record(5);
        stored.orbit.semi_major_axis_km = 7123.4;
        existing.records[0] = stored;
        existing.num_records = 1;

        let mut new = BasePassPredict::new();
        new.records[0] = AopSatelliteEntry {
            sat_hex_id: 5,
            dcs_id: 5,
            downlink_status: DownlinkStatus::Off,
            uplink_status: UplinkStatus::default(),
            bulletin: BulletinTimestamp::default(),
            orbit: OrbitalElements::default(),
        };
        new.num_records = 1;

        let merged = commit_pass_predict(&existing, &new).expect("commits");
        assert_eq!(merged.records[0].downlink_status, DownlinkStatus::Off);
        assert_eq!(merged.records[0].orbit.semi_major_axis_km, 7123.4);
    }
}
