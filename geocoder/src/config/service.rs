//! Geocoding service selection.

use std::fmt;

/// URL template of the OpenStreetMap Nominatim service.
pub const OSM_NOMINATIM_TEMPLATE: &str =
    "https://nominatim.openstreetmap.org/search?q=%s&format=xml&polygon_text=1&addressdetails=1";

/// URL template of the MapQuest Nominatim service.
pub const MAPQUEST_NOMINATIM_TEMPLATE: &str =
    "https://open.mapquestapi.com/nominatim/v1/search.php?q=%s&format=xml&addressdetails=1";

/// Which remote geocoding service a session talks to.
///
/// The two built-in services come with a URL template and their own rate-limit
/// bucket. Any other name is accepted, but then needs an explicit
/// `QUERY_TEMPLATE` and is not throttled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ServiceKind {
    #[default]
    OsmNominatim,
    MapQuestNominatim,
    Other(String),
}

impl ServiceKind {
    /// Parse a service name, ignoring ASCII case for the built-in names.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("OSM_NOMINATIM") {
            ServiceKind::OsmNominatim
        } else if name.eq_ignore_ascii_case("MAPQUEST_NOMINATIM") {
            ServiceKind::MapQuestNominatim
        } else {
            ServiceKind::Other(name.to_string())
        }
    }

    /// The service name.
    pub fn as_str(&self) -> &str {
        match self {
            ServiceKind::OsmNominatim => "OSM_NOMINATIM",
            ServiceKind::MapQuestNominatim => "MAPQUEST_NOMINATIM",
            ServiceKind::Other(name) => name,
        }
    }

    /// Built-in URL template, if the service has one.
    pub fn default_template(&self) -> Option<&'static str> {
        match self {
            ServiceKind::OsmNominatim => Some(OSM_NOMINATIM_TEMPLATE),
            ServiceKind::MapQuestNominatim => Some(MAPQUEST_NOMINATIM_TEMPLATE),
            ServiceKind::Other(_) => None,
        }
    }

    /// Whether the service accepts a contact `email` query parameter.
    pub fn supports_email(&self) -> bool {
        matches!(self, ServiceKind::OsmNominatim)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builtin_names() {
        assert_eq!(ServiceKind::parse("OSM_NOMINATIM"), ServiceKind::OsmNominatim);
        assert_eq!(ServiceKind::parse("osm_nominatim"), ServiceKind::OsmNominatim);
        assert_eq!(
            ServiceKind::parse("MapQuest_Nominatim"),
            ServiceKind::MapQuestNominatim
        );
    }

    #[test]
    fn other_service_keeps_name() {
        let service = ServiceKind::parse("PHOTON");
        assert_eq!(service, ServiceKind::Other("PHOTON".to_string()));
        assert_eq!(service.as_str(), "PHOTON");
        assert_eq!(service.default_template(), None);
        assert!(!service.supports_email());
    }

    #[test]
    fn only_osm_supports_email() {
        assert!(ServiceKind::OsmNominatim.supports_email());
        assert!(!ServiceKind::MapQuestNominatim.supports_email());
    }

    #[test]
    fn builtin_templates_are_valid() {
        use crate::config::QueryTemplate;

        for service in [ServiceKind::OsmNominatim, ServiceKind::MapQuestNominatim] {
            let template = service.default_template().unwrap();
            assert!(QueryTemplate::parse(template).is_ok(), "{service}");
        }
    }
}
