//! [`SqliteStore`] — the SQLite implementation of [`ScheduleStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tend_core::{
  activity::{ActivityEvent, NewActivityEvent},
  assignment::{CareRecipientAssignment, TemporaryReassignment},
  roster::{
    Caregiver, CareRecipient, House, NewCareRecipient, NewCaregiver, NewHouse,
  },
  schedule::{ScheduleAssignment, ScheduleVersion},
  store::ScheduleStore,
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_kind, encode_uuid, RawCaregiver, RawEvent,
    RawHouse, RawReassignment, RawRecipient, RawRecipientAssignment,
    RawScheduleAssignment, RawVersion,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tend schedule store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_version_row(&self, version: i64) -> Result<Option<ScheduleVersion>> {
    let raw: Option<RawVersion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT version, created_at, valid_from, valid_until, is_current
               FROM versions WHERE version = ?1",
              rusqlite::params![version],
              |row| {
                Ok(RawVersion {
                  version:     row.get(0)?,
                  created_at:  row.get(1)?,
                  valid_from:  row.get(2)?,
                  valid_until: row.get(3)?,
                  is_current:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVersion::into_version).transpose()
  }
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = Error;

  // ── Rosters ───────────────────────────────────────────────────────────────

  async fn add_caregiver(&self, input: NewCaregiver) -> Result<Caregiver> {
    let caregiver = Caregiver {
      caregiver_id: Uuid::new_v4(),
      display_name: input.display_name,
      created_at:   Utc::now(),
    };

    let id_str   = encode_uuid(caregiver.caregiver_id);
    let name     = caregiver.display_name.clone();
    let at_str   = encode_dt(caregiver.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO caregivers (caregiver_id, display_name, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(caregiver)
  }

  async fn get_caregiver(&self, id: Uuid) -> Result<Option<Caregiver>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCaregiver> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT caregiver_id, display_name, created_at
               FROM caregivers WHERE caregiver_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCaregiver {
                  caregiver_id: row.get(0)?,
                  display_name: row.get(1)?,
                  created_at:   row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCaregiver::into_caregiver).transpose()
  }

  async fn list_caregivers(&self) -> Result<Vec<Caregiver>> {
    let raws: Vec<RawCaregiver> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT caregiver_id, display_name, created_at
           FROM caregivers ORDER BY display_name, caregiver_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCaregiver {
              caregiver_id: row.get(0)?,
              display_name: row.get(1)?,
              created_at:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCaregiver::into_caregiver).collect()
  }

  async fn add_house(&self, input: NewHouse) -> Result<House> {
    let house = House {
      house_id:      Uuid::new_v4(),
      name:          input.name,
      acuity_weight: input.acuity_weight,
      high_acuity:   input.high_acuity,
      created_at:    Utc::now(),
    };

    let id_str = encode_uuid(house.house_id);
    let name   = house.name.clone();
    let weight = house.acuity_weight as i64;
    let high   = house.high_acuity;
    let at_str = encode_dt(house.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO houses (house_id, name, acuity_weight, high_acuity, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, weight, high, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(house)
  }

  async fn list_houses(&self) -> Result<Vec<House>> {
    let raws: Vec<RawHouse> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT house_id, name, acuity_weight, high_acuity, created_at
           FROM houses ORDER BY name, house_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawHouse {
              house_id:      row.get(0)?,
              name:          row.get(1)?,
              acuity_weight: row.get(2)?,
              high_acuity:   row.get(3)?,
              created_at:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHouse::into_house).collect()
  }

  async fn add_recipient(&self, input: NewCareRecipient) -> Result<CareRecipient> {
    let recipient = CareRecipient {
      recipient_id: Uuid::new_v4(),
      house_id:     input.house_id,
      display_name: input.display_name,
      active:       true,
      created_at:   Utc::now(),
    };

    let id_str    = encode_uuid(recipient.recipient_id);
    let house_str = encode_uuid(recipient.house_id);
    let name      = recipient.display_name.clone();
    let at_str    = encode_dt(recipient.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO recipients (recipient_id, house_id, display_name, active, created_at)
           VALUES (?1, ?2, ?3, 1, ?4)",
          rusqlite::params![id_str, house_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(recipient)
  }

  async fn list_recipients(&self, active_only: bool) -> Result<Vec<CareRecipient>> {
    let raws: Vec<RawRecipient> = self
      .conn
      .call(move |conn| {
        let sql = if active_only {
          "SELECT recipient_id, house_id, display_name, active, created_at
           FROM recipients WHERE active = 1 ORDER BY display_name, recipient_id"
        } else {
          "SELECT recipient_id, house_id, display_name, active, created_at
           FROM recipients ORDER BY display_name, recipient_id"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRecipient {
              recipient_id: row.get(0)?,
              house_id:     row.get(1)?,
              display_name: row.get(2)?,
              active:       row.get(3)?,
              created_at:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecipient::into_recipient).collect()
  }

  // ── Versions ──────────────────────────────────────────────────────────────

  async fn current_version(&self) -> Result<Option<ScheduleVersion>> {
    let raw: Option<RawVersion> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT version, created_at, valid_from, valid_until, is_current
               FROM versions WHERE is_current = 1",
              [],
              |row| {
                Ok(RawVersion {
                  version:     row.get(0)?,
                  created_at:  row.get(1)?,
                  valid_from:  row.get(2)?,
                  valid_until: row.get(3)?,
                  is_current:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVersion::into_version).transpose()
  }

  async fn latest_version_number(&self) -> Result<i64> {
    let latest: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(MAX(version), 0) FROM versions",
          [],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(latest)
  }

  async fn create_version(
    &self,
    version:     i64,
    valid_from:  NaiveDate,
    valid_until: NaiveDate,
  ) -> Result<ScheduleVersion> {
    let row = ScheduleVersion {
      version,
      created_at: Utc::now(),
      valid_from,
      valid_until,
      is_current: false,
    };

    let at_str    = encode_dt(row.created_at);
    let from_str  = encode_date(valid_from);
    let until_str = encode_date(valid_until);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO versions (version, created_at, valid_from, valid_until, is_current)
           VALUES (?1, ?2, ?3, ?4, 0)",
          rusqlite::params![version, at_str, from_str, until_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(row)
  }

  async fn activate_version(&self, version: i64) -> Result<()> {
    if self.get_version_row(version).await?.is_none() {
      return Err(Error::VersionNotFound(version));
    }

    // Retiring the old generation and promoting the new one happens in one
    // transaction so readers never observe zero or two current versions.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE versions SET is_current = 0 WHERE version != ?1",
          rusqlite::params![version],
        )?;
        tx.execute(
          "UPDATE schedule_assignments SET is_current = 0 WHERE version != ?1",
          rusqlite::params![version],
        )?;
        tx.execute(
          "UPDATE versions SET is_current = 1 WHERE version = ?1",
          rusqlite::params![version],
        )?;
        tx.execute(
          "UPDATE schedule_assignments SET is_current = 1 WHERE version = ?1",
          rusqlite::params![version],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn retire_current_version(&self) -> Result<Option<i64>> {
    let current = match self.current_version().await? {
      Some(v) => v.version,
      None => return Ok(None),
    };

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE versions SET is_current = 0 WHERE version = ?1",
          rusqlite::params![current],
        )?;
        tx.execute(
          "UPDATE schedule_assignments SET is_current = 0 WHERE version = ?1",
          rusqlite::params![current],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(Some(current))
  }

  // ── Schedule assignments ──────────────────────────────────────────────────

  async fn insert_schedule_assignments(
    &self,
    rows: Vec<ScheduleAssignment>,
  ) -> Result<()> {
    let raws: Vec<RawScheduleAssignment> = rows
      .iter()
      .map(RawScheduleAssignment::from_assignment)
      .collect::<Result<_>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO schedule_assignments (
               assignment_id, caregiver_id, house_id, shift, work_days,
               version, valid_from, valid_until, is_current, absent_on
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          )?;
          for raw in &raws {
            stmt.execute(rusqlite::params![
              raw.assignment_id,
              raw.caregiver_id,
              raw.house_id,
              raw.shift,
              raw.work_days,
              raw.version,
              raw.valid_from,
              raw.valid_until,
              raw.is_current,
              raw.absent_on,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_schedule_assignment(
    &self,
    id: Uuid,
  ) -> Result<Option<ScheduleAssignment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawScheduleAssignment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT assignment_id, caregiver_id, house_id, shift, work_days,
                      version, valid_from, valid_until, is_current, absent_on
               FROM schedule_assignments WHERE assignment_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawScheduleAssignment {
                  assignment_id: row.get(0)?,
                  caregiver_id:  row.get(1)?,
                  house_id:      row.get(2)?,
                  shift:         row.get(3)?,
                  work_days:     row.get(4)?,
                  version:       row.get(5)?,
                  valid_from:    row.get(6)?,
                  valid_until:   row.get(7)?,
                  is_current:    row.get(8)?,
                  absent_on:     row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScheduleAssignment::into_assignment).transpose()
  }

  async fn list_schedule_assignments(
    &self,
    version: i64,
  ) -> Result<Vec<ScheduleAssignment>> {
    let raws: Vec<RawScheduleAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT assignment_id, caregiver_id, house_id, shift, work_days,
                  version, valid_from, valid_until, is_current, absent_on
           FROM schedule_assignments WHERE version = ?1
           ORDER BY house_id, shift, assignment_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![version], |row| {
            Ok(RawScheduleAssignment {
              assignment_id: row.get(0)?,
              caregiver_id:  row.get(1)?,
              house_id:      row.get(2)?,
              shift:         row.get(3)?,
              work_days:     row.get(4)?,
              version:       row.get(5)?,
              valid_from:    row.get(6)?,
              valid_until:   row.get(7)?,
              is_current:    row.get(8)?,
              absent_on:     row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawScheduleAssignment::into_assignment)
      .collect()
  }

  async fn mark_assignment_absent(&self, id: Uuid, date: NaiveDate) -> Result<()> {
    let id_str   = encode_uuid(id);
    let date_str = encode_date(date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE schedule_assignments SET absent_on = ?2 WHERE assignment_id = ?1",
          rusqlite::params![id_str, date_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Care-recipient assignments ────────────────────────────────────────────

  async fn insert_recipient_assignments(
    &self,
    rows: Vec<CareRecipientAssignment>,
  ) -> Result<()> {
    let raws: Vec<RawRecipientAssignment> =
      rows.iter().map(RawRecipientAssignment::from_assignment).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO recipient_assignments (
               id, caregiver_id, recipient_id, weekday, shift,
               version, cross_shift, status
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;
          for raw in &raws {
            stmt.execute(rusqlite::params![
              raw.id,
              raw.caregiver_id,
              raw.recipient_id,
              raw.weekday,
              raw.shift,
              raw.version,
              raw.cross_shift,
              raw.status,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_recipient_assignments(
    &self,
    version: i64,
  ) -> Result<Vec<CareRecipientAssignment>> {
    let raws: Vec<RawRecipientAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, caregiver_id, recipient_id, weekday, shift,
                  version, cross_shift, status
           FROM recipient_assignments WHERE version = ?1
           ORDER BY weekday, shift, id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![version], |row| {
            Ok(RawRecipientAssignment {
              id:           row.get(0)?,
              caregiver_id: row.get(1)?,
              recipient_id: row.get(2)?,
              weekday:      row.get(3)?,
              shift:        row.get(4)?,
              version:      row.get(5)?,
              cross_shift:  row.get(6)?,
              status:       row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRecipientAssignment::into_assignment)
      .collect()
  }

  async fn retire_recipient_assignments(&self, ids: Vec<Uuid>) -> Result<()> {
    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "UPDATE recipient_assignments SET status = 'redistributed' WHERE id = ?1",
          )?;
          for id in &id_strs {
            stmt.execute(rusqlite::params![id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Temporary reassignments ───────────────────────────────────────────────

  async fn insert_reassignments(
    &self,
    rows: Vec<TemporaryReassignment>,
  ) -> Result<()> {
    let raws: Vec<RawReassignment> = rows
      .iter()
      .map(RawReassignment::from_reassignment)
      .collect::<Result<_>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO reassignments (
               id, recipient_id, origin, to_caregiver, date,
               version, reason, revoked
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;
          for raw in &raws {
            stmt.execute(rusqlite::params![
              raw.id,
              raw.recipient_id,
              raw.origin,
              raw.to_caregiver,
              raw.date,
              raw.version,
              raw.reason,
              raw.revoked,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_reassignments(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<TemporaryReassignment>> {
    let date_str = encode_date(date);

    let raws: Vec<RawReassignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, recipient_id, origin, to_caregiver, date,
                  version, reason, revoked
           FROM reassignments WHERE date = ?1 AND revoked = 0
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |row| {
            Ok(RawReassignment {
              id:           row.get(0)?,
              recipient_id: row.get(1)?,
              origin:       row.get(2)?,
              to_caregiver: row.get(3)?,
              date:         row.get(4)?,
              version:      row.get(5)?,
              reason:       row.get(6)?,
              revoked:      row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawReassignment::into_reassignment)
      .collect()
  }

  async fn revoke_reassignments(&self, ids: Vec<Uuid>) -> Result<()> {
    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx
            .prepare("UPDATE reassignments SET revoked = 1 WHERE id = ?1")?;
          for id in &id_strs {
            stmt.execute(rusqlite::params![id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Activity log ──────────────────────────────────────────────────────────

  async fn log_event(&self, input: NewActivityEvent) -> Result<ActivityEvent> {
    let event = ActivityEvent {
      event_id: Uuid::new_v4(),
      at:       Utc::now(),
      operator: input.operator,
      kind:     input.kind,
      summary:  input.summary,
    };

    let id_str   = encode_uuid(event.event_id);
    let at_str   = encode_dt(event.at);
    let operator = event.operator.clone();
    let kind_str = encode_kind(event.kind).to_owned();
    let summary  = event.summary.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activity_log (event_id, at, operator, kind, summary)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, at_str, operator, kind_str, summary],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_events(&self, limit: usize) -> Result<Vec<ActivityEvent>> {
    let limit_val = limit as i64;

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, at, operator, kind, summary
           FROM activity_log ORDER BY at DESC, event_id LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(RawEvent {
              event_id: row.get(0)?,
              at:       row.get(1)?,
              operator: row.get(2)?,
              kind:     row.get(3)?,
              summary:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
