//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! dates. Structured fields (day patterns, reassignment origins) are stored
//! as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use tend_core::{
  activity::{ActivityEvent, ActivityKind},
  assignment::{
    AssignmentStatus, CareRecipientAssignment, ReassignReason,
    ReassignmentOrigin, TemporaryReassignment,
  },
  roster::{Caregiver, CareRecipient, House},
  schedule::{DayPattern, ScheduleAssignment, ScheduleVersion, Shift},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── Shift ───────────────────────────────────────────────────────────────────

pub fn encode_shift(s: Shift) -> &'static str {
  match s {
    Shift::First => "first",
    Shift::Second => "second",
    Shift::Night => "night",
  }
}

pub fn decode_shift(s: &str) -> Result<Shift> {
  match s {
    "first" => Ok(Shift::First),
    "second" => Ok(Shift::Second),
    "night" => Ok(Shift::Night),
    other => Err(Error::Decode(format!("unknown shift: {other:?}"))),
  }
}

// ─── Weekday ─────────────────────────────────────────────────────────────────

pub fn encode_weekday(d: Weekday) -> &'static str {
  match d {
    Weekday::Mon => "mon",
    Weekday::Tue => "tue",
    Weekday::Wed => "wed",
    Weekday::Thu => "thu",
    Weekday::Fri => "fri",
    Weekday::Sat => "sat",
    Weekday::Sun => "sun",
  }
}

pub fn decode_weekday(s: &str) -> Result<Weekday> {
  match s {
    "mon" => Ok(Weekday::Mon),
    "tue" => Ok(Weekday::Tue),
    "wed" => Ok(Weekday::Wed),
    "thu" => Ok(Weekday::Thu),
    "fri" => Ok(Weekday::Fri),
    "sat" => Ok(Weekday::Sat),
    "sun" => Ok(Weekday::Sun),
    other => Err(Error::Decode(format!("unknown weekday: {other:?}"))),
  }
}

// ─── Day pattern ─────────────────────────────────────────────────────────────

pub fn encode_day_pattern(p: &DayPattern) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn decode_day_pattern(s: &str) -> Result<DayPattern> {
  Ok(serde_json::from_str(s)?)
}

// ─── Reassignment origin ─────────────────────────────────────────────────────

pub fn encode_origin(o: &ReassignmentOrigin) -> Result<String> {
  Ok(serde_json::to_string(o)?)
}

pub fn decode_origin(s: &str) -> Result<ReassignmentOrigin> {
  Ok(serde_json::from_str(s)?)
}

// ─── Reassignment reason ─────────────────────────────────────────────────────

pub fn encode_reason(r: ReassignReason) -> &'static str {
  match r {
    ReassignReason::Absence => "absence",
    ReassignReason::EmergencyCover => "emergency_cover",
    ReassignReason::EmergencyBackfill => "emergency_backfill",
  }
}

pub fn decode_reason(s: &str) -> Result<ReassignReason> {
  match s {
    "absence" => Ok(ReassignReason::Absence),
    "emergency_cover" => Ok(ReassignReason::EmergencyCover),
    "emergency_backfill" => Ok(ReassignReason::EmergencyBackfill),
    other => Err(Error::Decode(format!("unknown reason: {other:?}"))),
  }
}

// ─── Assignment status ───────────────────────────────────────────────────────

pub fn encode_status(s: AssignmentStatus) -> &'static str {
  match s {
    AssignmentStatus::Active => "active",
    AssignmentStatus::Redistributed => "redistributed",
  }
}

pub fn decode_status(s: &str) -> Result<AssignmentStatus> {
  match s {
    "active" => Ok(AssignmentStatus::Active),
    "redistributed" => Ok(AssignmentStatus::Redistributed),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── Activity kind ───────────────────────────────────────────────────────────

pub fn encode_kind(k: ActivityKind) -> &'static str {
  match k {
    ActivityKind::Generated => "generated",
    ActivityKind::Cleared => "cleared",
    ActivityKind::AbsenceMarked => "absence_marked",
    ActivityKind::EmergencyActivated => "emergency_activated",
    ActivityKind::CaregiverIntegrated => "caregiver_integrated",
  }
}

pub fn decode_kind(s: &str) -> Result<ActivityKind> {
  match s {
    "generated" => Ok(ActivityKind::Generated),
    "cleared" => Ok(ActivityKind::Cleared),
    "absence_marked" => Ok(ActivityKind::AbsenceMarked),
    "emergency_activated" => Ok(ActivityKind::EmergencyActivated),
    "caregiver_integrated" => Ok(ActivityKind::CaregiverIntegrated),
    other => Err(Error::Decode(format!("unknown activity kind: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `caregivers` row.
pub struct RawCaregiver {
  pub caregiver_id: String,
  pub display_name: String,
  pub created_at:   String,
}

impl RawCaregiver {
  pub fn into_caregiver(self) -> Result<Caregiver> {
    Ok(Caregiver {
      caregiver_id: decode_uuid(&self.caregiver_id)?,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `houses` row.
pub struct RawHouse {
  pub house_id:      String,
  pub name:          String,
  pub acuity_weight: i64,
  pub high_acuity:   bool,
  pub created_at:    String,
}

impl RawHouse {
  pub fn into_house(self) -> Result<House> {
    Ok(House {
      house_id:      decode_uuid(&self.house_id)?,
      name:          self.name,
      acuity_weight: self.acuity_weight as u32,
      high_acuity:   self.high_acuity,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `recipients` row.
pub struct RawRecipient {
  pub recipient_id: String,
  pub house_id:     String,
  pub display_name: String,
  pub active:       bool,
  pub created_at:   String,
}

impl RawRecipient {
  pub fn into_recipient(self) -> Result<CareRecipient> {
    Ok(CareRecipient {
      recipient_id: decode_uuid(&self.recipient_id)?,
      house_id:     decode_uuid(&self.house_id)?,
      display_name: self.display_name,
      active:       self.active,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `versions` row.
pub struct RawVersion {
  pub version:     i64,
  pub created_at:  String,
  pub valid_from:  String,
  pub valid_until: String,
  pub is_current:  bool,
}

impl RawVersion {
  pub fn into_version(self) -> Result<ScheduleVersion> {
    Ok(ScheduleVersion {
      version:     self.version,
      created_at:  decode_dt(&self.created_at)?,
      valid_from:  decode_date(&self.valid_from)?,
      valid_until: decode_date(&self.valid_until)?,
      is_current:  self.is_current,
    })
  }
}

/// Raw strings read directly from a `schedule_assignments` row.
pub struct RawScheduleAssignment {
  pub assignment_id: String,
  pub caregiver_id:  String,
  pub house_id:      String,
  pub shift:         String,
  pub work_days:     String,
  pub version:       i64,
  pub valid_from:    String,
  pub valid_until:   String,
  pub is_current:    bool,
  pub absent_on:     Option<String>,
}

impl RawScheduleAssignment {
  pub fn from_assignment(a: &ScheduleAssignment) -> Result<Self> {
    Ok(Self {
      assignment_id: encode_uuid(a.assignment_id),
      caregiver_id:  encode_uuid(a.caregiver_id),
      house_id:      encode_uuid(a.house_id),
      shift:         encode_shift(a.shift).to_owned(),
      work_days:     encode_day_pattern(&a.work_days)?,
      version:       a.version,
      valid_from:    encode_date(a.valid_from),
      valid_until:   encode_date(a.valid_until),
      is_current:    a.is_current,
      absent_on:     a.absent_on.map(encode_date),
    })
  }

  pub fn into_assignment(self) -> Result<ScheduleAssignment> {
    Ok(ScheduleAssignment {
      assignment_id: decode_uuid(&self.assignment_id)?,
      caregiver_id:  decode_uuid(&self.caregiver_id)?,
      house_id:      decode_uuid(&self.house_id)?,
      shift:         decode_shift(&self.shift)?,
      work_days:     decode_day_pattern(&self.work_days)?,
      version:       self.version,
      valid_from:    decode_date(&self.valid_from)?,
      valid_until:   decode_date(&self.valid_until)?,
      is_current:    self.is_current,
      absent_on:     self.absent_on.as_deref().map(decode_date).transpose()?,
    })
  }
}

/// Raw strings read directly from a `recipient_assignments` row.
pub struct RawRecipientAssignment {
  pub id:           String,
  pub caregiver_id: String,
  pub recipient_id: String,
  pub weekday:      String,
  pub shift:        String,
  pub version:      i64,
  pub cross_shift:  bool,
  pub status:       String,
}

impl RawRecipientAssignment {
  pub fn from_assignment(a: &CareRecipientAssignment) -> Self {
    Self {
      id:           encode_uuid(a.id),
      caregiver_id: encode_uuid(a.caregiver_id),
      recipient_id: encode_uuid(a.recipient_id),
      weekday:      encode_weekday(a.weekday).to_owned(),
      shift:        encode_shift(a.shift).to_owned(),
      version:      a.version,
      cross_shift:  a.cross_shift,
      status:       encode_status(a.status).to_owned(),
    }
  }

  pub fn into_assignment(self) -> Result<CareRecipientAssignment> {
    Ok(CareRecipientAssignment {
      id:           decode_uuid(&self.id)?,
      caregiver_id: decode_uuid(&self.caregiver_id)?,
      recipient_id: decode_uuid(&self.recipient_id)?,
      weekday:      decode_weekday(&self.weekday)?,
      shift:        decode_shift(&self.shift)?,
      version:      self.version,
      cross_shift:  self.cross_shift,
      status:       decode_status(&self.status)?,
    })
  }
}

/// Raw strings read directly from a `reassignments` row.
pub struct RawReassignment {
  pub id:           String,
  pub recipient_id: String,
  pub origin:       String,
  pub to_caregiver: String,
  pub date:         String,
  pub version:      i64,
  pub reason:       String,
  pub revoked:      bool,
}

impl RawReassignment {
  pub fn from_reassignment(r: &TemporaryReassignment) -> Result<Self> {
    Ok(Self {
      id:           encode_uuid(r.id),
      recipient_id: encode_uuid(r.recipient_id),
      origin:       encode_origin(&r.origin)?,
      to_caregiver: encode_uuid(r.to_caregiver),
      date:         encode_date(r.date),
      version:      r.version,
      reason:       encode_reason(r.reason).to_owned(),
      revoked:      r.revoked,
    })
  }

  pub fn into_reassignment(self) -> Result<TemporaryReassignment> {
    Ok(TemporaryReassignment {
      id:           decode_uuid(&self.id)?,
      recipient_id: decode_uuid(&self.recipient_id)?,
      origin:       decode_origin(&self.origin)?,
      to_caregiver: decode_uuid(&self.to_caregiver)?,
      date:         decode_date(&self.date)?,
      version:      self.version,
      reason:       decode_reason(&self.reason)?,
      revoked:      self.revoked,
    })
  }
}

/// Raw strings read directly from an `activity_log` row.
pub struct RawEvent {
  pub event_id: String,
  pub at:       String,
  pub operator: String,
  pub kind:     String,
  pub summary:  String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<ActivityEvent> {
    Ok(ActivityEvent {
      event_id: decode_uuid(&self.event_id)?,
      at:       decode_dt(&self.at)?,
      operator: self.operator,
      kind:     decode_kind(&self.kind)?,
      summary:  self.summary,
    })
  }
}
