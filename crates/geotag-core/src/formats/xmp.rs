//! XMP sidecar reader and writer
//!
//! A property may be stored as an attribute of an `rdf:Description` or as a
//! child element with text content. Properties are matched by resolved
//! namespace and local name, so files using unusual prefixes still work.
//! Writing streams the document through unchanged except for the touched
//! properties.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::{LocalName, QName, ResolveResult};
use quick_xml::{NsReader, Writer};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

use crate::error::{GeotagError, Result};
use crate::models::{Axis, LocationField, LocationFieldSet, MetadataRecord};
use crate::ports::{MetadataReader, MetadataWriter};

pub const NS_EXIF: &str = "http://ns.adobe.com/exif/1.0/";
pub const NS_IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
pub const NS_PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
pub const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// A sidecar property read or written by geotag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmpProperty {
    GpsLatitude,
    GpsLongitude,
    Location,
    City,
    State,
    Country,
    CountryCode,
}

impl XmpProperty {
    pub const ALL: [XmpProperty; 7] = [
        XmpProperty::GpsLatitude,
        XmpProperty::GpsLongitude,
        XmpProperty::Location,
        XmpProperty::City,
        XmpProperty::State,
        XmpProperty::Country,
        XmpProperty::CountryCode,
    ];

    pub fn namespace(&self) -> &'static str {
        match self {
            XmpProperty::GpsLatitude | XmpProperty::GpsLongitude => NS_EXIF,
            XmpProperty::Location | XmpProperty::CountryCode => NS_IPTC_CORE,
            XmpProperty::City | XmpProperty::State | XmpProperty::Country => NS_PHOTOSHOP,
        }
    }

    /// Conventional prefix, used when the namespace has to be declared
    pub fn prefix(&self) -> &'static str {
        match self.namespace() {
            NS_EXIF => "exif",
            NS_IPTC_CORE => "Iptc4xmpCore",
            _ => "photoshop",
        }
    }

    pub fn local_name(&self) -> &'static str {
        match self {
            XmpProperty::GpsLatitude => Axis::Latitude.property_name(),
            XmpProperty::GpsLongitude => Axis::Longitude.property_name(),
            XmpProperty::Location => LocationField::Location.as_str(),
            XmpProperty::City => LocationField::City.as_str(),
            XmpProperty::State => LocationField::State.as_str(),
            XmpProperty::Country => LocationField::Country.as_str(),
            XmpProperty::CountryCode => LocationField::CountryCode.as_str(),
        }
    }

    pub fn for_field(field: LocationField) -> Self {
        match field {
            LocationField::Location => XmpProperty::Location,
            LocationField::City => XmpProperty::City,
            LocationField::State => XmpProperty::State,
            LocationField::Country => XmpProperty::Country,
            LocationField::CountryCode => XmpProperty::CountryCode,
        }
    }

    pub fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Latitude => XmpProperty::GpsLatitude,
            Axis::Longitude => XmpProperty::GpsLongitude,
        }
    }

    fn matching(resolved: (ResolveResult<'_>, LocalName<'_>)) -> Option<Self> {
        match resolved {
            (ResolveResult::Bound(ns), local) => {
                let (ns, local) = (ns.into_inner(), local.into_inner());
                XmpProperty::ALL.iter().copied().find(|p| {
                    ns == p.namespace().as_bytes() && local == p.local_name().as_bytes()
                })
            }
            _ => None,
        }
    }
}

/// Property values found in a sidecar, and where they are stored
#[derive(Debug, Clone, Default)]
pub struct SidecarContent {
    pub values: HashMap<XmpProperty, String>,
    attribute_props: HashSet<XmpProperty>,
    element_props: HashSet<XmpProperty>,
}

impl SidecarContent {
    /// Trimmed value of a property, empty if absent
    pub fn value(&self, property: XmpProperty) -> &str {
        self.values.get(&property).map(String::as_str).unwrap_or("")
    }

    /// Whether the document already has a slot for this property
    fn is_stored(&self, property: XmpProperty) -> bool {
        self.attribute_props.contains(&property) || self.element_props.contains(&property)
    }

    pub fn into_record(self, path: &Path) -> MetadataRecord {
        let mut fields = LocationFieldSet::new();
        for field in LocationField::ALL {
            fields.set(field, self.value(XmpProperty::for_field(field)));
        }
        MetadataRecord {
            path: path.to_path_buf(),
            latitude: self.value(XmpProperty::GpsLatitude).to_string(),
            longitude: self.value(XmpProperty::GpsLongitude).to_string(),
            fields,
        }
    }
}

/// Parse the geotag properties out of an XMP document
pub fn parse_sidecar(content: &str) -> std::result::Result<SidecarContent, String> {
    let mut reader = NsReader::from_str(content);
    let mut sidecar = SidecarContent::default();
    let mut has_description = false;
    // Property element being read and its text so far
    let mut current: Option<(XmpProperty, String)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(xml_error(&reader, e)),
        };

        match event {
            Event::Start(e) => {
                if is_description(&reader, &e) {
                    has_description = true;
                    collect_attributes(&reader, &e, &mut sidecar)?;
                }
                current = XmpProperty::matching(reader.resolve_element(e.name()))
                    .map(|property| (property, String::new()));
                if let Some((property, _)) = &current {
                    sidecar.element_props.insert(*property);
                }
            }
            Event::Empty(e) => {
                if is_description(&reader, &e) {
                    has_description = true;
                    collect_attributes(&reader, &e, &mut sidecar)?;
                }
                if let Some(property) = XmpProperty::matching(reader.resolve_element(e.name())) {
                    sidecar.element_props.insert(property);
                }
                current = None;
            }
            Event::Text(t) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::CData(c) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(std::str::from_utf8(&c).map_err(|e| e.to_string())?);
                }
            }
            Event::End(_) => {
                if let Some((property, text)) = current.take() {
                    let value = text.trim();
                    if !value.is_empty() {
                        sidecar.values.insert(property, value.to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !has_description {
        return Err("no rdf:Description element found".to_string());
    }

    Ok(sidecar)
}

/// Rewrite an XMP document with new property values
///
/// Values already stored are replaced where they are. Properties without a
/// slot are added as attributes of the first `rdf:Description`.
pub fn update_sidecar(
    content: &str,
    updates: &[(XmpProperty, String)],
) -> std::result::Result<String, String> {
    let existing = parse_sidecar(content)?;
    let mut reader = NsReader::from_str(content);
    let mut writer = Writer::new(Vec::with_capacity(content.len() + 256));
    let mut description_seen = false;
    // New value of the property element being streamed, and whether it was written
    let mut replacing: Option<(&str, bool)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(xml_error(&reader, e)),
        };

        match event {
            Event::Start(e) => {
                if is_description(&reader, &e) {
                    let missing = if description_seen { None } else { Some(&existing) };
                    description_seen = true;
                    let start = rewrite_description(&reader, &e, updates, missing)?;
                    write_event(&mut writer, Event::Start(start))?;
                    continue;
                }
                replacing = XmpProperty::matching(reader.resolve_element(e.name()))
                    .and_then(|p| update_value(updates, p))
                    .map(|value| (value, false));
                write_event(&mut writer, Event::Start(e))?;
            }
            Event::Empty(e) => {
                if is_description(&reader, &e) {
                    let missing = if description_seen { None } else { Some(&existing) };
                    description_seen = true;
                    let start = rewrite_description(&reader, &e, updates, missing)?;
                    write_event(&mut writer, Event::Empty(start))?;
                    continue;
                }
                let replacement = XmpProperty::matching(reader.resolve_element(e.name()))
                    .and_then(|p| update_value(updates, p));
                match replacement {
                    Some(value) => {
                        let end = e.to_end().into_owned();
                        write_event(&mut writer, Event::Start(e.clone()))?;
                        write_event(&mut writer, Event::Text(BytesText::new(value)))?;
                        write_event(&mut writer, Event::End(end))?;
                    }
                    None => write_event(&mut writer, Event::Empty(e))?,
                }
            }
            Event::Text(_) | Event::CData(_) if replacing.is_some() => {
                if let Some((value, written)) = replacing.as_mut() {
                    if !*written {
                        write_event(&mut writer, Event::Text(BytesText::new(value)))?;
                        *written = true;
                    }
                }
            }
            Event::End(e) => {
                if let Some((value, false)) = replacing.take() {
                    write_event(&mut writer, Event::Text(BytesText::new(value)))?;
                }
                write_event(&mut writer, Event::End(e))?;
            }
            Event::Eof => break,
            other => write_event(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}

fn update_value(updates: &[(XmpProperty, String)], property: XmpProperty) -> Option<&str> {
    updates.iter().find(|(p, _)| *p == property).map(|(_, v)| v.as_str())
}

fn is_description(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> bool {
    match reader.resolve_element(e.name()) {
        (ResolveResult::Bound(ns), local) => {
            ns.into_inner() == NS_RDF.as_bytes() && local.into_inner() == &b"Description"[..]
        }
        _ => false,
    }
}

fn collect_attributes(
    reader: &NsReader<&[u8]>,
    e: &BytesStart<'_>,
    sidecar: &mut SidecarContent,
) -> std::result::Result<(), String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if let Some(property) = XmpProperty::matching(reader.resolve_attribute(attr.key)) {
            let raw = attr.unescape_value().map_err(|err| err.to_string())?;
            let value = raw.trim();
            sidecar.attribute_props.insert(property);
            if !value.is_empty() {
                sidecar.values.insert(property, value.to_string());
            }
        }
    }
    Ok(())
}

/// Copy a description start tag, replacing updated attributes
///
/// When `missing` is given, updates without a slot in that document are
/// appended as attributes, declaring their namespace if needed.
fn rewrite_description(
    reader: &NsReader<&[u8]>,
    e: &BytesStart<'_>,
    updates: &[(XmpProperty, String)],
    missing: Option<&SidecarContent>,
) -> std::result::Result<BytesStart<'static>, String> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut start = BytesStart::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let replacement = XmpProperty::matching(reader.resolve_attribute(attr.key))
            .and_then(|p| update_value(updates, p));
        match replacement {
            Some(value) => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                start.push_attribute((key.as_str(), value));
            }
            None => start.push_attribute(attr),
        }
    }

    if let Some(existing) = missing {
        let mut declared: Vec<(String, &'static str)> = Vec::new();
        let mut added: Vec<(String, &str)> = Vec::new();

        for (property, value) in updates {
            if existing.is_stored(*property) {
                continue;
            }
            let prefix = prefix_in_scope(reader, *property, &mut declared);
            added.push((format!("{}:{}", prefix, property.local_name()), value.as_str()));
        }

        for (prefix, namespace) in &declared {
            let key = format!("xmlns:{}", prefix);
            start.push_attribute((key.as_str(), *namespace));
        }
        for (key, value) in &added {
            start.push_attribute((key.as_str(), *value));
        }
    }

    Ok(start)
}

/// Find a prefix bound to the property namespace, declaring one if needed
fn prefix_in_scope(
    reader: &NsReader<&[u8]>,
    property: XmpProperty,
    declared: &mut Vec<(String, &'static str)>,
) -> String {
    let namespace = property.namespace();
    let mut candidate = property.prefix().to_string();
    let mut counter = 1;

    loop {
        if let Some((_, ns)) = declared.iter().find(|(p, _)| *p == candidate) {
            if *ns == namespace {
                return candidate;
            }
        } else {
            let probe = format!("{}:{}", candidate, property.local_name());
            match reader.resolve_attribute(QName(probe.as_bytes())) {
                (ResolveResult::Bound(ns), _) if ns.into_inner() == namespace.as_bytes() => {
                    return candidate;
                }
                (ResolveResult::Unknown(_), _) => {
                    declared.push((candidate.clone(), namespace));
                    return candidate;
                }
                // prefix taken by another namespace
                _ => {}
            }
        }
        candidate = format!("{}{}", property.prefix(), counter);
        counter += 1;
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> std::result::Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

fn xml_error(reader: &NsReader<&[u8]>, error: quick_xml::Error) -> String {
    format!("XML error at position {}: {}", reader.buffer_position(), error)
}

/// XMP sidecar adapter for the metadata ports
#[derive(Debug, Clone, Copy, Default)]
pub struct XmpSidecar;

impl XmpSidecar {
    pub fn new() -> Self {
        Self
    }

    async fn load(&self, path: &Path) -> Result<(String, SidecarContent)> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GeotagError::UnreadableSource {
                path: path.to_path_buf(),
                reason: format!("Failed to open sidecar: {}", e),
            }
        })?;

        let sidecar = parse_sidecar(&content).map_err(|reason| GeotagError::UnreadableSource {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok((content, sidecar))
    }
}

#[async_trait]
impl MetadataReader for XmpSidecar {
    async fn read(&self, path: &Path) -> Result<MetadataRecord> {
        let (_, sidecar) = self.load(path).await?;
        debug!(path = %path.display(), properties = sidecar.values.len(), "Read XMP sidecar");
        Ok(sidecar.into_record(path))
    }
}

#[async_trait]
impl MetadataWriter for XmpSidecar {
    async fn write(
        &self,
        path: &Path,
        fields: &LocationFieldSet,
        latitude: &str,
        longitude: &str,
    ) -> Result<()> {
        let (content, existing) = self.load(path).await?;

        let mut desired = vec![
            (XmpProperty::GpsLatitude, latitude),
            (XmpProperty::GpsLongitude, longitude),
        ];
        desired.extend(
            LocationField::ALL.iter().map(|f| (XmpProperty::for_field(*f), fields.get(*f))),
        );

        let updates: Vec<(XmpProperty, String)> = desired
            .into_iter()
            .filter(|(property, value)| !value.is_empty() && existing.value(*property) != *value)
            .map(|(property, value)| (property, value.to_string()))
            .collect();

        if updates.is_empty() {
            debug!(path = %path.display(), "Sidecar already up to date");
            return Ok(());
        }

        let rewritten = update_sidecar(&content, &updates).map_err(|reason| {
            GeotagError::UnreadableSource { path: path.to_path_buf(), reason }
        })?;

        tokio::fs::write(path, rewritten).await.map_err(|e| GeotagError::WriteDenied {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), properties = updates.len(), "Wrote XMP sidecar");
        Ok(())
    }
}
