use std::fs;
use std::path::Path;
use quick_xml::events::{BytesCData, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// A parsed `pom.xml`, held as an owned stream of XML events.
///
/// Text is trimmed on parse, so serialization re-indents the whole file.
/// Comments, CDATA, processing instructions and the XML declaration are kept.
#[derive(Debug, Clone)]
pub struct PomDocument {
    events: Vec<Event<'static>>,
}

/// Text content found directly inside a named element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementText<'a> {
    Text(&'a str),
    /// Self-closing element, or one with no text child at all
    Empty,
}

#[derive(Debug, Error)]
pub enum PomError {
    #[error("Failed to read {0}: {1}")]
    Io(String, std::io::Error),

    #[error("Malformed XML at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("Invalid escape in element text: {0}")]
    Unescape(String),

    #[error("Failed to serialize XML: {0}")]
    Serialize(String),
}

struct Frame {
    name: String,
    saw_text: bool,
}

impl PomDocument {
    pub fn parse(xml: &str) -> Result<Self, PomError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut events = Vec::new();
        let mut depth: usize = 0;
        let mut saw_root = false;

        loop {
            let event = reader.read_event().map_err(|e| PomError::Parse {
                position: reader.error_position() as u64,
                message: e.to_string(),
            })?;

            match &event {
                Event::Eof => break,
                Event::Start(_) => {
                    depth += 1;
                    saw_root = true;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Empty(_) => saw_root = true,
                _ => {}
            }
            events.push(event.into_owned());
        }

        if depth != 0 {
            return Err(PomError::Parse {
                position: reader.buffer_position() as u64,
                message: format!("{} element(s) left unclosed", depth),
            });
        }
        if !saw_root {
            return Err(PomError::Parse {
                position: reader.buffer_position() as u64,
                message: "document has no root element".to_string(),
            });
        }

        Ok(Self { events })
    }

    pub fn from_file(path: &Path) -> Result<Self, PomError> {
        let xml = fs::read_to_string(path)
            .map_err(|e| PomError::Io(path.display().to_string(), e))?;
        Self::parse(&xml)
    }

    /// Serialize with two-space indentation, keeping element text inline
    pub fn to_pretty_xml(&self) -> Result<String, PomError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        for event in &self.events {
            writer
                .write_event(event.clone())
                .map_err(|e| PomError::Serialize(e.to_string()))?;
        }

        let mut xml = String::from_utf8(writer.into_inner())
            .map_err(|e| PomError::Serialize(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }

    /// Text values of every element named `tag`, in document order
    pub fn texts_of(&self, tag: &str) -> Result<Vec<String>, PomError> {
        let mut texts = Vec::new();
        self.map_element_texts::<_, PomError>(|name, text| {
            if let (true, ElementText::Text(value)) = (name == tag, text) {
                texts.push(value.to_string());
            }
            Ok(None)
        })?;
        Ok(texts)
    }

    /// Build a new document with element texts replaced wherever `f` returns one.
    ///
    /// `f` sees every element together with its first direct text child, in
    /// the order that child appears. Comments and nested elements before the
    /// text are passed over. Elements without any text child are reported as
    /// [`ElementText::Empty`] when they close; returning `Some` for those has
    /// no effect.
    pub fn map_element_texts<F, E>(&self, mut f: F) -> Result<PomDocument, E>
    where
        F: FnMut(&str, ElementText<'_>) -> Result<Option<String>, E>,
        E: From<PomError>,
    {
        let mut stack: Vec<Frame> = Vec::new();
        let mut events = Vec::with_capacity(self.events.len());

        for event in &self.events {
            let first_text = stack.last().map(|frame| !frame.saw_text).unwrap_or(false);

            let replacement = match event {
                Event::Text(text) if first_text => {
                    let value = text
                        .unescape()
                        .map_err(|e| PomError::Unescape(e.to_string()))?;
                    let name = current_name(&stack);
                    f(name, ElementText::Text(&value))?
                        .map(|new| Event::Text(BytesText::new(&new).into_owned()))
                }
                Event::CData(data) if first_text => {
                    let value = String::from_utf8_lossy(data).into_owned();
                    let name = current_name(&stack);
                    f(name, ElementText::Text(&value))?
                        .map(|new| Event::CData(BytesCData::new(new)))
                }
                Event::Empty(start) => {
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    f(&name, ElementText::Empty)?;
                    None
                }
                Event::End(_) if first_text => {
                    f(current_name(&stack), ElementText::Empty)?;
                    None
                }
                _ => None,
            };

            match event {
                Event::Text(_) | Event::CData(_) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.saw_text = true;
                    }
                }
                Event::Start(start) => stack.push(Frame {
                    name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                    saw_text: false,
                }),
                Event::End(_) => {
                    stack.pop();
                }
                _ => {}
            }

            events.push(replacement.unwrap_or_else(|| event.clone()));
        }

        Ok(PomDocument { events })
    }
}

fn current_name(stack: &[Frame]) -> &str {
    stack.last().map(|frame| frame.name.as_str()).unwrap_or_default()
}
