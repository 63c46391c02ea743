//! Anchorable projections of domain entities.
//!
//! Only provenance-relevant fields are carried. Operational fields (asset id,
//! stored CID forms, update timestamps) are left out so a record never hashes
//! its own identifier.

use chrono::{DateTime, Utc};
use classics_canonical::{generate_cid, CanonicalizationError, CidResult};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::event::Event;
use crate::vehicle::Vehicle;

/// Anchorable snapshot of a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    /// Entity identifier.
    pub id: Uuid,
    /// License plate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    /// Chassis number (VIN).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis_number: Option<String>,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Paint color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Engine number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_number: Option<String>,
    /// Transmission number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_number: Option<String>,
    /// Body type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    /// Drive type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    /// Gearbox type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_type: Option<String>,
    /// Suspension type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_type: Option<String>,
    /// Registered owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    /// Creation time of the entity.
    #[serde(serialize_with = "rfc3339_nano::serialize")]
    pub created_at: DateTime<Utc>,
}

/// Anchorable snapshot of an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Entity identifier.
    pub id: Uuid,
    /// Organizing entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    /// Event type name.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Short title.
    pub title: String,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the event took place.
    #[serde(serialize_with = "rfc3339_nano::serialize")]
    pub date: DateTime<Utc>,
    /// Where the event took place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Open-ended metadata; omitted when absent or empty.
    #[serde(skip_serializing_if = "metadata_is_empty")]
    pub metadata: Option<Map<String, Value>>,
    /// Creation time of the entity.
    #[serde(serialize_with = "rfc3339_nano::serialize")]
    pub created_at: DateTime<Utc>,
}

/// RFC 3339 with up to nine fractional digits. Trailing zeros are trimmed
/// and a zero fraction is dropped entirely, so `12:00:00.123400` renders as
/// `12:00:00.1234Z` and a whole second as `12:00:00Z`.
mod rfc3339_nano {
    use chrono::{DateTime, Timelike, Utc};
    use serde::Serializer;

    pub fn format(t: &DateTime<Utc>) -> String {
        let mut text = t.format("%Y-%m-%dT%H:%M:%S").to_string();
        // Leap seconds carry an extra second in the nanosecond field.
        let nanos = t.nanosecond() % 1_000_000_000;
        if nanos > 0 {
            let digits = format!("{:09}", nanos);
            text.push('.');
            text.push_str(digits.trim_end_matches('0'));
        }
        text.push('Z');
        text
    }

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(t))
    }
}

fn metadata_is_empty(metadata: &Option<Map<String, Value>>) -> bool {
    metadata.as_ref().map_or(true, Map::is_empty)
}

impl From<&Vehicle> for VehicleRecord {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id,
            license_plate: v.license_plate.clone(),
            chassis_number: v.chassis_number.clone(),
            make: v.make.clone(),
            model: v.model.clone(),
            year: v.year,
            color: v.color.clone(),
            engine_number: v.engine_number.clone(),
            transmission_number: v.transmission_number.clone(),
            body_type: v.body_type.clone(),
            drive_type: v.drive_type.clone(),
            gear_type: v.gear_type.clone(),
            suspension_type: v.suspension_type.clone(),
            owner_id: v.owner_id,
            created_at: v.created_at,
        }
    }
}

impl From<&Event> for EventRecord {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id,
            entity_id: e.entity_id,
            event_type: e.event_type.as_str().to_string(),
            title: e.title.clone(),
            description: e.description.clone(),
            date: e.date,
            location: e.location.clone(),
            metadata: e.metadata.clone(),
            created_at: e.created_at,
        }
    }
}

impl VehicleRecord {
    /// Canonical forms and CID of this snapshot.
    pub fn cid(&self) -> Result<CidResult, CanonicalizationError> {
        generate_cid(self)
    }
}

impl EventRecord {
    /// Canonical forms and CID of this snapshot.
    pub fn cid(&self) -> Result<CidResult, CanonicalizationError> {
        generate_cid(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn timestamps_trim_fractional_zeros() {
        assert_eq!(rfc3339_nano::format(&noon()), "2024-03-01T12:00:00Z");
        assert_eq!(
            rfc3339_nano::format(&(noon() + Duration::nanoseconds(123_400_000))),
            "2024-03-01T12:00:00.1234Z"
        );
        assert_eq!(
            rfc3339_nano::format(&(noon() + Duration::milliseconds(500))),
            "2024-03-01T12:00:00.5Z"
        );
        assert_eq!(
            rfc3339_nano::format(&(noon() + Duration::nanoseconds(1))),
            "2024-03-01T12:00:00.000000001Z"
        );
    }

    #[test]
    fn event_dates_use_trimmed_timestamps() {
        let mut event = Event::new(Uuid::new_v4(), EventType::Maintenance, "Oil change");
        event.date = noon() + Duration::microseconds(250_000);
        event.created_at = noon();
        let value = serde_json::to_value(EventRecord::from(&event)).unwrap();
        assert_eq!(value["date"], "2024-03-01T12:00:00.25Z");
        assert_eq!(value["createdAt"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn vehicle_record_drops_operational_fields() {
        let mut vehicle = Vehicle::new("Honda", "Civic", 2010);
        let before = VehicleRecord::from(&vehicle).cid().unwrap();

        vehicle.blockchain_asset_id = Some(7);
        vehicle.record_snapshot(&before);
        vehicle.updated_at = vehicle.updated_at + chrono::Duration::days(3);

        let after = VehicleRecord::from(&vehicle).cid().unwrap();
        assert_eq!(before.cid, after.cid);
    }

    #[test]
    fn empty_metadata_is_omitted() {
        let mut event = Event::new(Uuid::new_v4(), EventType::Maintenance, "Oil change");
        event.metadata = Some(Map::new());
        let value = serde_json::to_value(EventRecord::from(&event)).unwrap();
        assert!(value.get("metadata").is_none());
        assert_eq!(value["type"], "maintenance");
    }

    #[test]
    fn unset_entity_is_omitted() {
        let event = Event::new(Uuid::new_v4(), EventType::Rally, "Mille Miglia");
        let value = serde_json::to_value(EventRecord::from(&event)).unwrap();
        assert!(value.get("entityId").is_none());
        assert!(value.get("vehicleId").is_none());
    }
}
