//! Nominatim XML decoding.
//!
//! The body is first read into a small element tree, then the
//! `searchresults` element is located and each of its `place` children is
//! turned into a record. A place's fields are its attributes (in document
//! order) followed by its child elements; the schema grows as new field
//! names are seen, and every record shares it.

use geo_types::{Geometry, Point};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;
use wkt::TryFromWkt;

use super::error::DecodeError;
use super::record::{Record, RecordSet};
use super::schema::{FieldDefn, FieldType, FieldValue, Schema};

/// Element holding the list of places.
pub const RESULTS_ELEMENT: &str = "searchresults";

/// Element describing one place.
pub const PLACE_ELEMENT: &str = "place";

/// Field carrying the place geometry as WKT. Never becomes a schema field.
pub const GEOMETRY_TEXT: &str = "geotext";

const LAT: &str = "lat";
const LON: &str = "lon";

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| DecodeError::Xml(e.to_string()))?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| DecodeError::Xml(e.to_string()))?;
            attributes.push((key, value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    /// First element called `name`, searching this element and its
    /// descendants depth-first.
    fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Text content, or `None` if empty or whitespace-only.
    fn value(&self) -> Option<&str> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    /// Name/value pairs of a place: attributes, then child elements.
    fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        let attributes = self.attributes.iter().map(|(name, value)| {
            let value = if value.trim().is_empty() {
                None
            } else {
                Some(value.as_str())
            };
            (name.as_str(), value)
        });
        let elements = self
            .children
            .iter()
            .map(|child| (child.name.as_str(), child.value()));
        attributes.chain(elements)
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(bytes).map_err(|e| DecodeError::Xml(e.to_string()))
}

/// Parse `body` into its top-level elements.
fn parse_document(body: &str) -> Result<Vec<Element>, DecodeError> {
    let mut reader = Reader::from_str(body);
    let mut roots = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(DecodeError::Xml(format!(
                    "at position {}: {e}",
                    reader.error_position()
                )));
            }
            Ok(Event::Start(start)) => stack.push(Element::from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = Element::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => roots.push(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DecodeError::Xml("unmatched end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => roots.push(element),
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| DecodeError::Xml(e.to_string()))?;
                match stack.last_mut() {
                    Some(element) => element.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(DecodeError::Xml(
                            "text outside the root element".to_string(),
                        ));
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(utf8(&data)?);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::Xml(format!("unclosed element <{}>", open.name)));
    }
    if roots.is_empty() {
        return Err(DecodeError::Xml("no root element".to_string()));
    }
    Ok(roots)
}

/// Decode a Nominatim XML response into a record set.
///
/// Fails only if the body is not well-formed XML or has no `searchresults`
/// element. Values that do not parse as their field's type, and `geotext`
/// values that are not valid WKT, are left unset.
pub fn decode(body: &str) -> Result<RecordSet, DecodeError> {
    let roots = parse_document(body)?;
    let results = roots
        .iter()
        .find_map(|root| root.find(RESULTS_ELEMENT))
        .ok_or(DecodeError::MissingResults)?;

    let mut schema = Schema::new();
    let mut records = Vec::new();

    for place in results.children.iter().filter(|e| e.name == PLACE_ELEMENT) {
        let mut lat = None;
        let mut lon = None;

        for (name, value) in place.fields() {
            match name {
                GEOMETRY_TEXT => continue,
                LAT => lat = value.and_then(parse_coordinate),
                LON => lon = value.and_then(parse_coordinate),
                _ => {}
            }
            if schema.index_of(name).is_none() {
                schema.add(FieldDefn::new(name, FieldType::for_name(name)));
            }
        }

        let mut record = Record::new();
        for (name, value) in place.fields() {
            let Some(value) = value else { continue };
            if let Some(index) = schema.index_of(name) {
                let field_type = schema
                    .field(index)
                    .map_or(FieldType::String, FieldDefn::field_type);
                if let Some(value) = FieldValue::parse(field_type, value) {
                    record.set(index, value);
                }
            } else if name == GEOMETRY_TEXT {
                match Geometry::<f64>::try_from_wkt_str(value.trim()) {
                    Ok(geometry) => record.set_geometry(geometry),
                    Err(e) => debug!(error = %e, "ignoring unparseable geotext"),
                }
            }
        }

        if record.geometry().is_none()
            && let (Some(lon), Some(lat)) = (lon, lat)
        {
            record.set_geometry(Geometry::Point(Point::new(lon, lat)));
        }

        records.push(record);
    }

    debug!(places = records.len(), fields = schema.len(), "decoded response");
    Ok(RecordSet::new(PLACE_ELEMENT, schema, records))
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
