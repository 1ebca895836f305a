//! XML-RPC encoding and decoding for `pingback.ping`.
//!
//! Inbound calls carry two string params, the source URI followed by the
//! target URI. Each param value is read from `value/string` when present and
//! from the bare `value` text otherwise, since both forms are legal XML-RPC.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Literal marker every pingback call must contain.
pub const PING_METHOD_MARKER: &str = "<methodName>pingback.ping</methodName>";

/// Element path of a param value, relative to the document root.
const VALUE_PATH: [&str; 4] = ["methodCall", "params", "param", "value"];

#[derive(Debug, thiserror::Error)]
pub enum XmlRpcError {
    #[error("Malformed XML-RPC payload: {0}")]
    Malformed(String),

    #[error("Expected at least 2 params, found {0}")]
    MissingParams(usize),
}

/// The two URIs of a `pingback.ping` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingParams {
    pub source_url: String,
    pub target_url: String,
}

/// Whether the body names the `pingback.ping` method.
pub fn is_ping_call(body: &str) -> bool {
    body.contains(PING_METHOD_MARKER)
}

/// Parse the source and target URIs out of a `pingback.ping` call.
pub fn parse_ping_params(body: &str) -> Result<PingParams, XmlRpcError> {
    let values = parse_param_values(body)?;
    let mut iter = values.into_iter();
    match (iter.next(), iter.next()) {
        (Some(source_url), Some(target_url)) => Ok(PingParams {
            source_url,
            target_url,
        }),
        (Some(_), None) => Err(XmlRpcError::MissingParams(1)),
        _ => Err(XmlRpcError::MissingParams(0)),
    }
}

/// Collect the text of every `methodCall/params/param/value`, preferring a
/// nested `<string>` element over the value's own text.
fn parse_param_values(body: &str) -> Result<Vec<String>, XmlRpcError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut values = Vec::new();
    let mut string_text: Option<String> = None;
    let mut bare_text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlRpcError::Malformed(e.to_string()))?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                path.push(name);
                if at_value(&path) {
                    string_text = None;
                    bare_text.clear();
                } else if in_string(&path) {
                    string_text.get_or_insert_with(String::new);
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                path.push(name);
                if at_value(&path) {
                    values.push(String::new());
                } else if in_string(&path) {
                    string_text.get_or_insert_with(String::new);
                }
                path.pop();
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| XmlRpcError::Malformed(e.to_string()))?;
                push_text(&path, &text, &mut string_text, &mut bare_text);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = String::from_utf8_lossy(&raw);
                push_text(&path, &text, &mut string_text, &mut bare_text);
            }
            Event::End(_) => {
                if at_value(&path) {
                    let value = string_text
                        .take()
                        .unwrap_or_else(|| std::mem::take(&mut bare_text));
                    values.push(value.trim().to_string());
                    bare_text.clear();
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(XmlRpcError::Malformed("unexpected end of document".into()));
    }

    Ok(values)
}

fn at_value(path: &[String]) -> bool {
    path.len() == VALUE_PATH.len() && path.iter().zip(VALUE_PATH).all(|(a, b)| a == b)
}

fn in_string(path: &[String]) -> bool {
    path.len() == VALUE_PATH.len() + 1
        && at_value(&path[..VALUE_PATH.len()])
        && path[VALUE_PATH.len()] == "string"
}

fn push_text(path: &[String], text: &str, string_text: &mut Option<String>, bare_text: &mut String) {
    if in_string(path) {
        string_text.get_or_insert_with(String::new).push_str(text);
    } else if at_value(path) {
        bare_text.push_str(text);
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Build the `pingback.ping` call a sender POSTs to a remote endpoint.
pub fn build_ping_call(source_url: &str, target_url: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <methodCall><methodName>pingback.ping</methodName><params>\
         <param><value><string>{}</string></value></param>\
         <param><value><string>{}</string></value></param>\
         </params></methodCall>",
        escape(source_url),
        escape(target_url),
    )
}

/// Build a successful `methodResponse` carrying a single string.
pub fn success_response(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <methodResponse><params><param><value><string>{}</string></value></param></params></methodResponse>",
        escape(message),
    )
}

/// Build a `methodResponse` fault with the given code and message.
pub fn fault_response(code: i32, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>{code}</int></value></member>\
         <member><name>faultString</name><value><string>{}</string></value></member>\
         </struct></value></fault></methodResponse>",
        escape(message),
    )
}
