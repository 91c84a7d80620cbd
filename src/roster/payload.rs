//! Mutation body parsing.
//!
//! Upsert rows are coerced field by field into a [`MemberDraft`]. Each row is
//! validated on its own and the outcome recorded as a [`RowValidation`]; a
//! batch with any invalid row is refused as a whole before the store is
//! touched.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::database::record::MemberRecord;
use crate::error::ApiError;

/// Upsert row without its event scope or write stamp
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDraft {
    pub seq: i64,
    pub name: String,
    pub power_m: Option<f64>,
    pub gold: Option<f64>,
    pub wish_slot: Option<String>,
    pub seat: Option<String>,
    pub note: Option<String>,
}

impl MemberDraft {
    pub fn into_record(self, event_slug: &str, updated_at: DateTime<Utc>) -> MemberRecord {
        MemberRecord {
            event_slug: event_slug.to_string(),
            seq: self.seq,
            name: self.name,
            power_m: self.power_m,
            gold: self.gold,
            wish_slot: self.wish_slot,
            seat: self.seat,
            note: self.note,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowValidation {
    Valid(MemberDraft),
    Invalid(String),
}

impl RowValidation {
    pub fn validate(row: &Value) -> Self {
        let Some(obj) = row.as_object() else {
            return RowValidation::Invalid("row must be an object".to_string());
        };
        match Self::coerce(obj) {
            Ok(draft) => RowValidation::Valid(draft),
            Err(reason) => RowValidation::Invalid(reason),
        }
    }

    fn coerce(obj: &Map<String, Value>) -> Result<MemberDraft, String> {
        let seq = coerce_seq(field(obj, &["seq"]))?;
        let name = match field(obj, &["name"]) {
            None | Some(Value::Null) => String::new(),
            Some(v) => scalar_text(v).ok_or("name must be a string")?,
        };

        Ok(MemberDraft {
            seq,
            name,
            power_m: coerce_number(field(obj, &["power_m", "powerMetric", "power_metric"])),
            gold: coerce_number(field(obj, &["gold", "currency"])),
            wish_slot: nullable_text(field(obj, &["wish_slot", "wishSlot"]), "wish_slot")?,
            seat: nullable_text(field(obj, &["seat"]), "seat")?,
            note: nullable_text(field(obj, &["note"]), "note")?,
        })
    }
}

/// Validated mutation request: upserts first, then deletes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationBatch {
    pub upserts: Vec<MemberDraft>,
    pub deletes: Vec<i64>,
}

impl MutationBatch {
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::bad_request("invalid body"));
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("invalid body: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        let obj = value.as_object().ok_or_else(|| ApiError::bad_request("invalid body"))?;

        let mut errors = Vec::new();
        let mut upserts = Vec::new();
        for (i, row) in list(obj, "upserts")?.iter().enumerate() {
            match RowValidation::validate(row) {
                RowValidation::Valid(draft) => upserts.push(draft),
                RowValidation::Invalid(reason) => errors.push(format!("upserts[{}]: {}", i, reason)),
            }
        }

        let mut deletes = Vec::new();
        for (i, entry) in list(obj, "deletes")?.iter().enumerate() {
            let seq = entry
                .as_object()
                .ok_or_else(|| "entry must be an object".to_string())
                .and_then(|o| coerce_seq(field(o, &["seq"])));
            match seq {
                Ok(seq) => deletes.push(seq),
                Err(reason) => errors.push(format!("deletes[{}]: {}", i, reason)),
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::bad_request(errors.join("; ")));
        }
        Ok(Self { upserts, deletes })
    }

    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// Absent or null lists are empty; anything else must be an array
fn list<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], ApiError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ApiError::bad_request(format!("{} must be an array", key))),
    }
}

/// First present key among a column name and its aliases
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n))
}

fn coerce_seq(value: Option<&Value>) -> Result<i64, String> {
    let seq = match value {
        None | Some(Value::Null) => return Err("seq is required".to_string()),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        Some(_) => None,
    };
    seq.ok_or_else(|| "seq must be an integer".to_string())
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Numbers pass through; null, blank, and non-numeric input all read as null
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn nullable_text(value: Option<&Value>, name: &str) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_text(v).map(Some).ok_or_else(|| format!("{} must be a string", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid(row: Value) -> MemberDraft {
        match RowValidation::validate(&row) {
            RowValidation::Valid(draft) => draft,
            RowValidation::Invalid(reason) => panic!("expected valid row, got: {}", reason),
        }
    }

    #[test]
    fn minimal_row_gets_defaults() {
        let draft = valid(json!({ "seq": 3 }));
        assert_eq!(
            draft,
            MemberDraft {
                seq: 3,
                name: String::new(),
                power_m: None,
                gold: None,
                wish_slot: None,
                seat: None,
                note: None,
            }
        );
    }

    #[test]
    fn numeric_fields_coerce_failures_to_null() {
        let draft = valid(json!({ "seq": "7", "power_m": "", "gold": "lots" }));
        assert_eq!(draft.seq, 7);
        assert_eq!(draft.power_m, None);
        assert_eq!(draft.gold, None);

        let draft = valid(json!({ "seq": 7.0, "power_m": "12.5", "gold": 300 }));
        assert_eq!(draft.seq, 7);
        assert_eq!(draft.power_m, Some(12.5));
        assert_eq!(draft.gold, Some(300.0));
    }

    #[test]
    fn camel_case_aliases_are_read() {
        let draft = valid(json!({ "seq": 1, "powerMetric": 9, "currency": "4", "wishSlot": "B2" }));
        assert_eq!(draft.power_m, Some(9.0));
        assert_eq!(draft.gold, Some(4.0));
        assert_eq!(draft.wish_slot.as_deref(), Some("B2"));
    }

    #[test]
    fn bad_seq_is_invalid() {
        for row in [json!({}), json!({ "seq": null }), json!({ "seq": "x1" }), json!({ "seq": 1.5 }), json!({ "seq": [1] })] {
            assert!(matches!(RowValidation::validate(&row), RowValidation::Invalid(_)), "row: {}", row);
        }
        assert!(matches!(RowValidation::validate(&json!("seq")), RowValidation::Invalid(_)));
    }

    #[test]
    fn structured_text_fields_are_invalid() {
        let outcome = RowValidation::validate(&json!({ "seq": 1, "note": { "x": 1 } }));
        assert_eq!(outcome, RowValidation::Invalid("note must be a string".to_string()));
        let draft = valid(json!({ "seq": 1, "seat": 12, "name": true }));
        assert_eq!(draft.seat.as_deref(), Some("12"));
        assert_eq!(draft.name, "true");
    }

    #[test]
    fn batch_collects_upserts_and_deletes() {
        let batch = MutationBatch::from_body(br#"{"upserts":[{"seq":1,"name":"A"}],"deletes":[{"seq":2},{"seq":"3"}]}"#).unwrap();
        assert_eq!(batch.upserts.len(), 1);
        assert_eq!(batch.upserts[0].name, "A");
        assert_eq!(batch.deletes, vec![2, 3]);
    }

    #[test]
    fn empty_object_is_empty_batch() {
        let batch = MutationBatch::from_body(b"{}").unwrap();
        assert!(batch.is_empty());
        let batch = MutationBatch::from_body(br#"{"upserts":null,"deletes":[]}"#).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn malformed_bodies_are_bad_requests() {
        let bodies: [&[u8]; 6] = [b"", b"  ", b"not json", b"[1,2]", b"\"text\"", br#"{"upserts":{"seq":1}}"#];
        for body in bodies {
            let err = MutationBatch::from_body(body).unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn invalid_rows_are_all_reported() {
        let err = MutationBatch::from_value(&json!({
            "upserts": [{ "seq": 1 }, { "seq": "abc" }, 5],
            "deletes": [{ "seq": 2 }, { "id": 3 }]
        }))
        .unwrap_err();
        let msg = err.message();
        assert!(msg.contains("upserts[1]: seq must be an integer"), "{}", msg);
        assert!(msg.contains("upserts[2]: row must be an object"), "{}", msg);
        assert!(msg.contains("deletes[1]: seq is required"), "{}", msg);
        assert!(!msg.contains("upserts[0]"), "{}", msg);
    }

    #[test]
    fn draft_becomes_scoped_record() {
        let now = Utc::now();
        let record = valid(json!({ "seq": 4, "name": "Kim" })).into_record("spring-cup", now);
        assert_eq!(record.event_slug, "spring-cup");
        assert_eq!(record.seq, 4);
        assert_eq!(record.updated_at, now);
    }
}
