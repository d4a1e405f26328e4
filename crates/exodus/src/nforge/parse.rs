//! XML parsing for the download-board documents.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::NforgeError;
use super::types::{FileEntry, ReleaseDetail};

/// Extract the ordered `<release_id>` values from a listing document.
///
/// The order of identifiers in the listing is the order releases will be
/// recreated in, so it is preserved exactly.
pub fn parse_release_ids(xml: &str) -> Result<Vec<String>, NforgeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    let mut in_id = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(event)) if event.name().as_ref() == b"release_id" => in_id = true,
            Ok(Event::End(event)) if event.name().as_ref() == b"release_id" => in_id = false,
            Ok(Event::Text(text)) if in_id => {
                let value = text
                    .unescape()
                    .map_err(|e| NforgeError::Xml(e.to_string()))?;
                ids.push(value.into_owned());
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(NforgeError::Xml(e.to_string())),
        }
    }

    Ok(ids)
}

/// Parse one release detail document.
///
/// The document carries `<name>`, `<description>`, and an optional
/// `<files>` block whose `<file>` children each hold an `<id>` and a
/// `<name>`. `<name>` is required at the release level; a missing
/// description is treated as empty rather than an error, since releases
/// without one are common.
pub fn parse_release_detail(xml: &str) -> Result<ReleaseDetail, NforgeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut files = Vec::new();

    let mut in_files = false;
    let mut file_id: Option<String> = None;
    let mut file_name: Option<String> = None;
    // Innermost open element, so text can be attributed to its parent.
    let mut element: Option<Vec<u8>> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| NforgeError::Xml(e.to_string()))?;

        match event {
            Event::Start(start) => match start.name().as_ref() {
                b"files" => in_files = true,
                b"file" if in_files => {
                    file_id = None;
                    file_name = None;
                }
                other => element = Some(other.to_vec()),
            },
            Event::End(end) => match end.name().as_ref() {
                b"files" => in_files = false,
                b"file" if in_files => {
                    let id = file_id.take().ok_or(NforgeError::MissingField("id"))?;
                    let name = file_name.take().ok_or(NforgeError::MissingField("name"))?;
                    files.push(FileEntry { id, name });
                }
                _ => element = None,
            },
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| NforgeError::Xml(e.to_string()))?
                    .into_owned();
                assign(&mut name, &mut description, &mut file_id, &mut file_name, in_files, element.as_deref(), value);
            }
            // Descriptions are frequently wrapped in CDATA.
            Event::CData(data) => {
                let value = String::from_utf8_lossy(data.as_ref()).into_owned();
                assign(&mut name, &mut description, &mut file_id, &mut file_name, in_files, element.as_deref(), value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ReleaseDetail {
        name: name.ok_or(NforgeError::MissingField("name"))?,
        description: description.unwrap_or_default(),
        files,
    })
}

#[allow(clippy::too_many_arguments)]
fn assign(
    name: &mut Option<String>,
    description: &mut Option<String>,
    file_id: &mut Option<String>,
    file_name: &mut Option<String>,
    in_files: bool,
    element: Option<&[u8]>,
    value: String,
) {
    match element {
        Some(b"id") if in_files => *file_id = Some(value),
        Some(b"name") if in_files => *file_name = Some(value),
        Some(b"name") => *name = Some(value),
        Some(b"description") => *description = Some(value),
        _ => {}
    }
}
