//! The BDN XML subtitle document: a language, and a list of timed events,
//! each of which points at one or more bitmap graphics.
//!
//! ```xml
//! <BDN Version="0.93">
//!   <Description>
//!     <Language Code="eng"/>
//!     <Events Type="Graphic" FirstEventInTC="00:00:01:00"
//!             LastEventOutTC="00:00:03:00" NumberofEvents="1"/>
//!   </Description>
//!   <Events>
//!     <Event InTC="00:00:01:00" OutTC="00:00:03:00" Forced="False">
//!       <Graphic Width="100" Height="50" X="10" Y="20">sub1.png</Graphic>
//!     </Event>
//!   </Events>
//! </BDN>
//! ```

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::{Error, Result};
use crate::util::is_same_file;
use crate::xml::{Element, Node};

/// The language we assume when the document doesn't declare one.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// The summary timecode written when every event has been removed.
pub const EMPTY_TIMECODE: &str = "00:00:00:00";

/// The position and size of a graphic, in full-frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A parsed BDN XML document.
#[derive(Clone, Debug)]
pub struct SubtitleDocument {
    root: Element,
    /// Where we were loaded from, if anywhere.
    source: Option<PathBuf>,
}

impl SubtitleDocument {
    /// Load a document from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SubtitleDocument> {
        let path = path.as_ref();
        debug!("Reading subtitle XML from {}", path.display());
        let xml = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut doc = SubtitleDocument::parse(&xml)?;
        doc.source = Some(path.to_owned());
        Ok(doc)
    }

    /// Parse a document from a string.
    pub fn parse(xml: &str) -> Result<SubtitleDocument> {
        let root = Element::parse(xml)?;
        if root.child("Events").is_none() {
            return Err(Error::MissingElement { name: "Events" });
        }
        Ok(SubtitleDocument { root, source: None })
    }

    /// The 3-letter code from `Description/Language`, or
    /// [`DEFAULT_LANGUAGE`] if there isn't one.
    pub fn language(&self) -> &str {
        self.root
            .child("Description")
            .and_then(|desc| desc.child("Language"))
            .and_then(|lang| lang.attr("Code"))
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Iterate over our events, in order.
    pub fn events(&self) -> impl Iterator<Item = Event<'_>> + '_ {
        self.root
            .child("Events")
            .into_iter()
            .flat_map(|events| events.children_named("Event"))
            .map(|element| Event { element })
    }

    /// Call `keep` on every event, then remove the events for which it
    /// returned `false`. Returns the number of events removed.
    ///
    /// The survivors are collected into a new list which replaces the old
    /// one only after every event has been visited, so nothing is removed if
    /// `keep` fails partway through.
    pub fn retain_events<F>(&mut self, mut keep: F) -> Result<usize>
    where
        F: FnMut(EventMut<'_>) -> Result<bool>,
    {
        let events = self
            .root
            .child_mut("Events")
            .ok_or(Error::MissingElement { name: "Events" })?;

        let mut verdicts = Vec::with_capacity(events.children.len());
        for node in events.children.iter_mut() {
            let verdict = match node {
                Node::Element(element) if element.name == "Event" => {
                    keep(EventMut { element })?
                }
                _ => true,
            };
            verdicts.push(verdict);
        }

        let old = mem::take(&mut events.children);
        let removed = verdicts.iter().filter(|v| !**v).count();
        events.children = old
            .into_iter()
            .zip(verdicts)
            .filter_map(|(node, verdict)| if verdict { Some(node) } else { None })
            .collect();

        if removed > 0 {
            self.refresh_description();
        }
        Ok(removed)
    }

    /// Bring the event summary in `Description/Events` back in line with
    /// the actual events. Attributes which aren't already there are left
    /// out. With no events left, both timecodes become [`EMPTY_TIMECODE`].
    fn refresh_description(&mut self) {
        let count = self.events().count();
        let (first_in, last_out) = if count == 0 {
            (
                Some(EMPTY_TIMECODE.to_owned()),
                Some(EMPTY_TIMECODE.to_owned()),
            )
        } else {
            (
                self.events()
                    .next()
                    .and_then(|e| e.in_tc())
                    .map(str::to_owned),
                self.events()
                    .last()
                    .and_then(|e| e.out_tc())
                    .map(str::to_owned),
            )
        };

        let summary = match self
            .root
            .child_mut("Description")
            .and_then(|desc| desc.child_mut("Events"))
        {
            Some(summary) => summary,
            None => return,
        };
        let updates = [
            ("NumberofEvents", Some(count.to_string())),
            ("FirstEventInTC", first_in),
            ("LastEventOutTC", last_out),
        ];
        for (name, value) in updates {
            if let Some(value) = value {
                if summary.attr(name).is_some() {
                    summary.set_attr(name, value);
                }
            }
        }
    }

    /// Serialize this document to a string.
    pub fn to_xml_string(&self) -> Result<String> {
        let bytes = self.root.to_xml_bytes()?;
        String::from_utf8(bytes).map_err(|e| Error::malformed(e.to_string()))
    }

    /// Write this document to `path`. Writing over the file we were loaded
    /// from requires `overwrite`.
    pub fn save<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if let Some(source) = &self.source {
            if !overwrite && is_same_file(source, path)? {
                return Err(Error::WriteConflict {
                    path: path.to_owned(),
                });
            }
        }
        debug!("Writing subtitle XML to {}", path.display());
        let bytes = self.root.to_xml_bytes()?;
        fs::write(path, bytes).map_err(|e| Error::io(path, e))
    }
}

/// A timed subtitle cue.
#[derive(Clone, Copy, Debug)]
pub struct Event<'a> {
    element: &'a Element,
}

impl<'a> Event<'a> {
    /// When the event appears.
    pub fn in_tc(&self) -> Option<&'a str> {
        self.element.attr("InTC")
    }

    /// When the event disappears.
    pub fn out_tc(&self) -> Option<&'a str> {
        self.element.attr("OutTC")
    }

    /// The graphics displayed by this event.
    pub fn graphics(&self) -> impl Iterator<Item = Graphic<'a>> + 'a {
        self.element
            .children_named("Graphic")
            .map(|element| Graphic { element })
    }
}

/// A timed subtitle cue which we're allowed to modify.
#[derive(Debug)]
pub struct EventMut<'a> {
    element: &'a mut Element,
}

impl<'a> EventMut<'a> {
    /// A read-only view of this event.
    pub fn as_event(&self) -> Event<'_> {
        Event {
            element: &*self.element,
        }
    }

    /// The graphics displayed by this event.
    pub fn graphics_mut(&mut self) -> impl Iterator<Item = GraphicMut<'_>> + '_ {
        self.element.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) if element.name == "Graphic" => {
                Some(GraphicMut { element })
            }
            _ => None,
        })
    }
}

/// A bitmap and where it goes on screen.
#[derive(Clone, Copy, Debug)]
pub struct Graphic<'a> {
    element: &'a Element,
}

impl<'a> Graphic<'a> {
    /// The bitmap path, relative to the XML file.
    pub fn file(&self) -> String {
        self.element.text().trim().to_owned()
    }

    /// Our position and size.
    pub fn geometry(&self) -> Result<Geometry> {
        geometry_of(self.element)
    }
}

/// A graphic which we're allowed to modify.
#[derive(Debug)]
pub struct GraphicMut<'a> {
    element: &'a mut Element,
}

impl<'a> GraphicMut<'a> {
    /// The bitmap path, relative to the XML file.
    pub fn file(&self) -> String {
        self.element.text().trim().to_owned()
    }

    /// Point this graphic at a different bitmap.
    pub fn set_file(&mut self, file: &str) {
        self.element.set_text(file);
    }

    /// Our position and size.
    pub fn geometry(&self) -> Result<Geometry> {
        geometry_of(self.element)
    }

    /// Replace our position and size.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.element.set_attr("Width", geometry.width.to_string());
        self.element.set_attr("Height", geometry.height.to_string());
        self.element.set_attr("X", geometry.x.to_string());
        self.element.set_attr("Y", geometry.y.to_string());
    }
}

fn geometry_of(element: &Element) -> Result<Geometry> {
    Ok(Geometry {
        x: u32_attr(element, "X")?,
        y: u32_attr(element, "Y")?,
        width: u32_attr(element, "Width")?,
        height: u32_attr(element, "Height")?,
    })
}

fn u32_attr(element: &Element, name: &'static str) -> Result<u32> {
    let value = element.attr(name);
    value
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| Error::InvalidAttribute {
            element: element.name.clone(),
            name,
            value: value.map(str::to_owned),
        })
}
