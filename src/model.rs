//! Data hierarchy records.
//!
//! All hierarchy entities live in one denormalized table, distinguished by a
//! `type` discriminant and a `parentId` back-reference:
//!
//! ```text
//! Site <- Area <- Process <- Event
//!              <- Station <- Device
//! ```
//!
//! At the application layer the discriminant becomes a tagged sum type so the
//! walker's type-directed traversal is statically checked.

use std::fmt;

/// Hierarchy entity discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Site,
    Area,
    Process,
    Station,
    Device,
    Event,
}

impl NodeKind {
    /// The `type` attribute value stored in the table.
    pub fn discriminant(&self) -> &'static str {
        match self {
            NodeKind::Site => "SITE",
            NodeKind::Area => "AREA",
            NodeKind::Process => "PROCESS",
            NodeKind::Station => "STATION",
            NodeKind::Device => "DEVICE",
            NodeKind::Event => "EVENT",
        }
    }

    /// Human-readable label for error messages.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Site => "site",
            NodeKind::Area => "area",
            NodeKind::Process => "process",
            NodeKind::Station => "station",
            NodeKind::Device => "device",
            NodeKind::Event => "event",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Root of the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: String,
    pub name: String,
}

/// A physical area within a site.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: String,
    pub name: String,
    /// Parent Site id.
    pub parent_id: String,
    pub description: Option<String>,
}

/// A manufacturing process within an area. Events hang off processes.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub id: String,
    pub name: String,
    /// Parent Area id.
    pub parent_id: String,
}

/// A work station within an area. Devices hang off stations.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    /// Parent Area id.
    pub parent_id: String,
}

/// A machine or sensor reporting telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Parent Station id.
    pub parent_id: String,
    /// Alternate identifier assigned by an operator or third-party integration.
    pub alias: Option<String>,
}

/// A reportable condition, e.g. "temperature_high".
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub name: String,
    /// Parent Process id.
    pub parent_id: String,
    pub priority: String,
    /// `"automated"` marks the target event for anomaly-detection issues.
    pub event_type: Option<String>,
    /// Alternate identifier assigned by an operator or third-party integration.
    pub alias: Option<String>,
}

impl Event {
    /// Whether this event is the target for anomaly-detection-sourced issues.
    pub fn is_automated(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("automated"))
    }
}

/// A hierarchy record decoded from the single-table representation.
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyRecord {
    Site(Site),
    Area(Area),
    Process(Process),
    Station(Station),
    Device(Device),
    Event(Event),
}

impl HierarchyRecord {
    pub fn kind(&self) -> NodeKind {
        match self {
            HierarchyRecord::Site(_) => NodeKind::Site,
            HierarchyRecord::Area(_) => NodeKind::Area,
            HierarchyRecord::Process(_) => NodeKind::Process,
            HierarchyRecord::Station(_) => NodeKind::Station,
            HierarchyRecord::Device(_) => NodeKind::Device,
            HierarchyRecord::Event(_) => NodeKind::Event,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            HierarchyRecord::Site(s) => &s.id,
            HierarchyRecord::Area(a) => &a.id,
            HierarchyRecord::Process(p) => &p.id,
            HierarchyRecord::Station(s) => &s.id,
            HierarchyRecord::Device(d) => &d.id,
            HierarchyRecord::Event(e) => &e.id,
        }
    }

    /// The `parentId` back-reference. Sites are roots and have none.
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            HierarchyRecord::Site(_) => None,
            HierarchyRecord::Area(a) => Some(&a.parent_id),
            HierarchyRecord::Process(p) => Some(&p.parent_id),
            HierarchyRecord::Station(s) => Some(&s.parent_id),
            HierarchyRecord::Device(d) => Some(&d.parent_id),
            HierarchyRecord::Event(e) => Some(&e.parent_id),
        }
    }

    /// The alias, where the entity type supports one.
    pub fn alias(&self) -> Option<&str> {
        match self {
            HierarchyRecord::Device(d) => d.alias.as_deref(),
            HierarchyRecord::Event(e) => e.alias.as_deref(),
            _ => None,
        }
    }

    pub fn into_site(self) -> Option<Site> {
        match self {
            HierarchyRecord::Site(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_area(self) -> Option<Area> {
        match self {
            HierarchyRecord::Area(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_process(self) -> Option<Process> {
        match self {
            HierarchyRecord::Process(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_station(self) -> Option<Station> {
        match self {
            HierarchyRecord::Station(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_device(self) -> Option<Device> {
        match self {
            HierarchyRecord::Device(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_event(self) -> Option<Event> {
        match self {
            HierarchyRecord::Event(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminants_match_table_values() {
        assert_eq!(NodeKind::Site.discriminant(), "SITE");
        assert_eq!(NodeKind::Area.discriminant(), "AREA");
        assert_eq!(NodeKind::Process.discriminant(), "PROCESS");
        assert_eq!(NodeKind::Station.discriminant(), "STATION");
        assert_eq!(NodeKind::Device.discriminant(), "DEVICE");
        assert_eq!(NodeKind::Event.discriminant(), "EVENT");
    }

    #[test]
    fn test_event_is_automated_trims_and_ignores_case() {
        let mut event = Event {
            id: "e1".to_string(),
            name: "anomaly".to_string(),
            parent_id: "p1".to_string(),
            priority: "high".to_string(),
            event_type: Some("  Automated ".to_string()),
            alias: None,
        };
        assert!(event.is_automated());

        event.event_type = Some("manual".to_string());
        assert!(!event.is_automated());

        event.event_type = None;
        assert!(!event.is_automated());
    }

    #[test]
    fn test_record_accessors() {
        let record = HierarchyRecord::Device(Device {
            id: "d1".to_string(),
            name: "press".to_string(),
            parent_id: "st1".to_string(),
            alias: Some("machine-4".to_string()),
        });

        assert_eq!(record.kind(), NodeKind::Device);
        assert_eq!(record.id(), "d1");
        assert_eq!(record.parent_id(), Some("st1"));
        assert_eq!(record.alias(), Some("machine-4"));
        assert!(record.clone().into_event().is_none());
        assert!(record.into_device().is_some());
    }
}
