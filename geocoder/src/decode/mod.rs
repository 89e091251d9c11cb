//! Decoding of Nominatim XML responses into record sets.

mod error;
mod record;
mod schema;
mod xml;

pub use error::DecodeError;
pub use record::{Place, Record, RecordSet};
pub use schema::{FieldDefn, FieldType, FieldValue, Schema};
pub use xml::{GEOMETRY_TEXT, PLACE_ELEMENT, RESULTS_ELEMENT, decode};
