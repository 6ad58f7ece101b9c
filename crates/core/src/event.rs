//! The calendar event entity and its JSON wire encoding.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event.
///
/// The serde representation is the wire format shared by the queue message
/// body and the HTTP adapter: `startDt`/`endDt` are RFC 3339 timestamps and
/// `notifyBefore` is an integer duration in nanoseconds. Existing consumers
/// depend on these exact field names.
///
/// `notified` is bookkeeping between the store and the scheduler and is not
/// part of the wire representation; a decoded event always starts with
/// `notified = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "startDt")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDt")]
    pub end_date: DateTime<Utc>,
    #[serde(rename = "creatorId")]
    pub creator_id: i64,
    #[serde(rename = "notifyBefore", with = "duration_nanos")]
    pub notify_before: Duration,
    #[serde(skip)]
    pub notified: bool,
}

impl Event {
    /// The calendar day on which this event becomes due for notification:
    /// `end_date - notify_before`, truncated to a UTC day.
    ///
    /// Day granularity (rather than instant granularity) is deliberate: it
    /// makes the due query insensitive to scheduler tick jitter.
    pub fn notification_day(&self) -> NaiveDate {
        (self.end_date - self.notify_before).date_naive()
    }

    /// Replace every mutable field from `patch`, keeping the id.
    pub fn apply(&mut self, patch: EventPatch) {
        self.title = patch.title;
        self.description = patch.description;
        self.start_date = patch.start_date;
        self.end_date = patch.end_date;
        self.creator_id = patch.creator_id;
        self.notify_before = patch.notify_before;
        self.notified = patch.notified;
    }
}

/// Full replacement of an event's mutable fields (everything but the id).
#[derive(Debug, Clone)]
pub struct EventPatch {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub creator_id: i64,
    pub notify_before: Duration,
    pub notified: bool,
}

impl EventPatch {
    /// Build a patch carrying the event's current field values, to be
    /// modified before an update (e.g. flipping `notified`).
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            creator_id: event.creator_id,
            notify_before: event.notify_before,
            notified: event.notified,
        }
    }
}

/// Caller-suppliable event fields, as accepted by the domain service.
///
/// `creator_id` is stamped by the service and `notified` always starts (or
/// is reset to) false on a service-level write.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub notify_before: Duration,
}

/// Serde adapter encoding a [`chrono::Duration`] as integer nanoseconds,
/// matching the wire contract for `notifyBefore`.
pub mod duration_nanos {
    use chrono::Duration;
    use serde::de::Deserialize;
    use serde::ser::Error as _;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = value
            .num_nanoseconds()
            .ok_or_else(|| S::Error::custom("duration overflows i64 nanoseconds"))?;
        serializer.serialize_i64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        Ok(Duration::nanoseconds(nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Event {
        Event {
            id: "E1".to_string(),
            title: "standup".to_string(),
            description: "daily sync".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap(),
            creator_id: 42,
            notify_before: Duration::hours(24),
            notified: false,
        }
    }

    #[test]
    fn wire_format_uses_exact_field_names() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["id"], "E1");
        assert_eq!(json["title"], "standup");
        assert_eq!(json["description"], "daily sync");
        assert_eq!(json["startDt"], "2024-06-01T09:00:00Z");
        assert_eq!(json["endDt"], "2024-06-10T10:00:00Z");
        assert_eq!(json["creatorId"], 42);
        assert_eq!(json["notifyBefore"], 86_400_000_000_000_i64);
    }

    #[test]
    fn notified_is_not_on_the_wire() {
        let mut event = sample();
        event.notified = true;

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("notified").is_none());

        let decoded: Event = serde_json::from_value(json).unwrap();
        assert!(!decoded.notified);
    }

    #[test]
    fn wire_round_trip_preserves_fields() {
        let event = sample();
        let decoded: Event =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn notification_day_subtracts_notify_before() {
        // end 2024-06-10, notify 24h ahead: due on the 9th.
        assert_eq!(
            sample().notification_day(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
        );
    }

    #[test]
    fn notification_day_truncates_to_a_day() {
        let mut event = sample();
        // 90 minutes before 00:30 crosses a day boundary.
        event.end_date = Utc.with_ymd_and_hms(2024, 6, 10, 0, 30, 0).unwrap();
        event.notify_before = Duration::minutes(90);
        assert_eq!(
            event.notification_day(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
        );
    }

    #[test]
    fn apply_replaces_all_mutable_fields() {
        let mut event = sample();
        let patch = EventPatch {
            title: "retro".to_string(),
            description: String::new(),
            start_date: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 7, 2, 0, 0, 0).unwrap(),
            creator_id: 7,
            notify_before: Duration::zero(),
            notified: true,
        };
        event.apply(patch);

        assert_eq!(event.id, "E1");
        assert_eq!(event.title, "retro");
        assert_eq!(event.creator_id, 7);
        assert!(event.notified);
    }
}
