//! Parser for GNOME-style slideshow descriptors.
//!
//! ```xml
//! <background>
//!   <starttime><year>2022</year><month>5</month><day>24</day><hour>8</hour></starttime>
//!   <static><duration>36000</duration><file>day.jpg</file></static>
//!   <transition type="overlay"><duration>7200</duration><from>day.jpg</from><to>night.jpg</to></transition>
//! </background>
//! ```
//!
//! Parsing never fails: unreadable or malformed documents produce an empty
//! timeline, which callers treat as "not a slideshow".

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use tracing::debug;

use crate::resolution::{Dimension, find_preferred_image};
use crate::scheduler::wall_clock;
use crate::timeline::{SlideshowTimeline, TimelineEntry};

pub(crate) type XmlReader<'a> = Reader<&'a [u8]>;

#[derive(Debug, Error)]
pub(crate) enum ParseError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Attribute(#[from] AttrError),
    #[error("document ended inside an open element")]
    UnexpectedEof,
}

/// Parse the slideshow descriptor at `path`.
///
/// `target` selects among multi-resolution `<file>` variants. Relative paths
/// are resolved against the descriptor's directory. Missing start-time date
/// fields come from today in the system zone.
#[must_use]
pub fn parse_slideshow(path: &Path, target: Dimension) -> SlideshowTimeline {
    parse_slideshow_in(path, target, None)
}

/// Like [`parse_slideshow`], with "today" taken in `tz` when given.
#[must_use]
pub fn parse_slideshow_in(path: &Path, target: Dimension, tz: Option<Tz>) -> SlideshowTimeline {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), %err, "slideshow descriptor unreadable");
            return SlideshowTimeline::empty();
        }
    };
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse_slideshow_str(&text, base_dir, target, wall_clock(tz).date())
}

/// Parse a descriptor held in memory.
///
/// `today` fills in start-time date fields the document leaves out.
#[must_use]
pub fn parse_slideshow_str(
    text: &str,
    base_dir: &Path,
    target: Dimension,
    today: NaiveDate,
) -> SlideshowTimeline {
    let parser = DocumentParser {
        base_dir,
        target,
        today,
    };
    let mut reader = Reader::from_str(text);
    match parser.find_background(&mut reader) {
        Ok(Some(timeline)) => timeline,
        Ok(None) => {
            debug!("no <background> element in slideshow descriptor");
            SlideshowTimeline::empty()
        }
        Err(err) => {
            debug!(%err, "malformed slideshow descriptor");
            SlideshowTimeline::empty()
        }
    }
}

struct DocumentParser<'p> {
    base_dir: &'p Path,
    target: Dimension,
    today: NaiveDate,
}

/// Raw `<starttime>` fields as written in the document.
#[derive(Debug, Default)]
struct StartTimeFields {
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    hour: Option<i64>,
    minute: Option<i64>,
    second: Option<i64>,
}

impl StartTimeFields {
    fn resolve(&self, today: NaiveDate) -> Option<NaiveDateTime> {
        let year = self
            .year
            .map_or(i64::from(today.year()), |y| y.clamp(0, 9999));
        let month = self.month.map_or(i64::from(today.month()), |m| m.clamp(1, 12));
        let day = self.day.map_or(i64::from(today.day()), |d| d.clamp(1, 31));

        // Shorter months take their last day instead of rolling over.
        let date = (1..=day)
            .rev()
            .find_map(|d| NaiveDate::from_ymd_opt(year as i32, month as u32, d as u32))?;

        let offset = self
            .hour
            .unwrap_or(0)
            .checked_mul(3600)
            .and_then(|h| h.checked_add(self.minute.unwrap_or(0).checked_mul(60)?))
            .and_then(|hm| hm.checked_add(self.second.unwrap_or(0)))
            .and_then(TimeDelta::try_seconds)
            .unwrap_or_default();

        let midnight = date.and_time(NaiveTime::MIN);
        Some(midnight.checked_add_signed(offset).unwrap_or(midnight))
    }
}

impl DocumentParser<'_> {
    fn find_background(
        &self,
        reader: &mut XmlReader<'_>,
    ) -> Result<Option<SlideshowTimeline>, ParseError> {
        loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"background" => {
                    return self.parse_background(reader).map(Some);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"background" => {
                    return Ok(Some(SlideshowTimeline::empty()));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn parse_background(
        &self,
        reader: &mut XmlReader<'_>,
    ) -> Result<SlideshowTimeline, ParseError> {
        let mut entries = Vec::new();
        let mut start_time = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"starttime" => {
                        start_time = self.parse_start_time(reader)?;
                    }
                    b"static" => {
                        if let Some(entry) = self.parse_static(reader)? {
                            entries.push(entry);
                        }
                    }
                    b"transition" => {
                        let kind = type_attribute(&e)?;
                        if let Some(entry) = self.parse_transition(reader, kind)? {
                            entries.push(entry);
                        }
                    }
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
        }

        Ok(SlideshowTimeline::new(entries, start_time))
    }

    fn parse_start_time(
        &self,
        reader: &mut XmlReader<'_>,
    ) -> Result<Option<NaiveDateTime>, ParseError> {
        let mut fields = StartTimeFields::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let slot = match e.local_name().as_ref() {
                        b"year" => Some(&mut fields.year),
                        b"month" => Some(&mut fields.month),
                        b"day" => Some(&mut fields.day),
                        b"hour" => Some(&mut fields.hour),
                        b"minute" => Some(&mut fields.minute),
                        b"second" => Some(&mut fields.second),
                        _ => None,
                    };
                    let text = read_text(reader)?;
                    if let Some(slot) = slot {
                        *slot = text.trim().parse::<i64>().ok();
                    }
                }
                Event::End(_) => break,
                Event::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
        }
        Ok(fields.resolve(self.today))
    }

    fn parse_static(
        &self,
        reader: &mut XmlReader<'_>,
    ) -> Result<Option<TimelineEntry>, ParseError> {
        let mut duration = 0.0;
        let mut path = PathBuf::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"duration" => duration = parse_seconds(&read_text(reader)?),
                    b"file" => path = self.pick_file(&read_text(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
        }

        if path.as_os_str().is_empty() {
            debug!("dropping <static> entry without a usable file");
            return Ok(None);
        }
        Ok(Some(TimelineEntry::Static { path, duration }))
    }

    fn parse_transition(
        &self,
        reader: &mut XmlReader<'_>,
        kind: String,
    ) -> Result<Option<TimelineEntry>, ParseError> {
        let mut duration = 0.0;
        let mut from = PathBuf::new();
        let mut to = PathBuf::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"duration" => duration = parse_seconds(&read_text(reader)?),
                    b"from" => from = self.resolve(&read_text(reader)?),
                    b"to" => to = self.resolve(&read_text(reader)?),
                    _ => skip_element(reader)?,
                },
                Event::End(_) => break,
                Event::Eof => return Err(ParseError::UnexpectedEof),
                _ => {}
            }
        }

        if from.as_os_str().is_empty() || to.as_os_str().is_empty() {
            debug!("dropping <transition> entry without both endpoints");
            return Ok(None);
        }
        Ok(Some(TimelineEntry::Transition {
            from,
            to,
            duration,
            kind,
        }))
    }

    /// `<file>` may list several resolution variants separated by whitespace.
    fn pick_file(&self, text: &str) -> PathBuf {
        let variants: Vec<PathBuf> = text.split_whitespace().map(|v| self.resolve(v)).collect();
        match variants.as_slice() {
            [] => PathBuf::new(),
            [only] => only.clone(),
            many => find_preferred_image(many, self.target).unwrap_or_default(),
        }
    }

    fn resolve(&self, raw: &str) -> PathBuf {
        resolve_path(self.base_dir, raw)
    }
}

/// Resolve a document path relative to the document's directory. Blank input
/// stays empty.
pub(crate) fn resolve_path(base_dir: &Path, raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() {
        return PathBuf::new();
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn type_attribute(e: &BytesStart<'_>) -> Result<String, ParseError> {
    match e.try_get_attribute("type")? {
        Some(attr) => Ok(attr.unescape_value()?.into_owned()),
        None => Ok(String::new()),
    }
}

fn parse_seconds(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Collect the text of the current element, including nested children, and
/// consume its end tag. Separate text nodes are joined with a space.
pub(crate) fn read_text(reader: &mut XmlReader<'_>) -> Result<String, ParseError> {
    let mut depth = 0usize;
    let mut out = String::new();
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Text(t) => {
                out.push_str(&t.unescape()?);
                out.push(' ');
            }
            Event::CData(c) => {
                out.push_str(&String::from_utf8_lossy(&c.into_inner()));
                out.push(' ');
            }
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
    Ok(out)
}

pub(crate) fn skip_element(reader: &mut XmlReader<'_>) -> Result<(), ParseError> {
    read_text(reader).map(|_| ())
}
