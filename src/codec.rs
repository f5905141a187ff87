//! Scene text format
//!
//! ```text
//! #VERSION=0
//! <BuildingClass> <posX> <posY> <rotation>
//! <PathClass> <startX> <startY> <endX> <endY>
//! TextBox <x> <y> <width> <height> "<escaped content>"
//! ```
//!
//! Numbers are written with the shortest representation that reads back to
//! the same value. Text box content is a double-quoted string with C-style
//! escapes, unquoted through the pest grammar in `scene.pest`.

use std::io::{self, BufRead, BufWriter, Write};

use glam::Vec2;
use pest::Parser;
use pest::iterators::Pair;

use crate::defaults::{TEXTBOX_CLASS, VERSION, VERSION_TAG};
use crate::defs::Definitions;
use crate::errors::{DecodeErrorKind, DecodeTextError, LoadError, UnquoteError};
use crate::log::debug;
use crate::object::{Building, ObjectCollection, ObjectValue, Path, TextBox};
use crate::types::Rect;
use crate::{Rule, SceneTextParser};

// ============================================================================
// Encoding
// ============================================================================

/// Write `objects` in the current text format version
pub fn encode_text<W: Write>(objects: &ObjectCollection, defs: &Definitions, writer: W) -> io::Result<()> {
    let mut w = BufWriter::new(writer);
    writeln!(w, "{VERSION_TAG}={VERSION}")?;

    for b in &objects.buildings {
        let class = &defs.building(b.def).class;
        writeln!(w, "{class} {} {} {}", b.pos.x, b.pos.y, b.rot)?;
    }
    for p in &objects.paths {
        let class = &defs.path(p.def).class;
        writeln!(w, "{class} {} {} {} {}", p.start.x, p.start.y, p.end.x, p.end.y)?;
    }
    for t in &objects.text_boxes {
        let r = &t.bounds;
        writeln!(
            w,
            "{TEXTBOX_CLASS} {} {} {} {} {}",
            r.x,
            r.y,
            r.width,
            r.height,
            quote(&t.content)
        )?;
    }

    debug!(
        paths = objects.paths.len(),
        buildings = objects.buildings.len(),
        text_boxes = objects.text_boxes.len(),
        "encoded scene text"
    );
    w.flush()
}

/// Quote `s` as a double-quoted string literal with C-style escapes
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if c.is_control() || (c.is_whitespace() && c != ' ') => {
                let code = c as u32;
                let escaped = if code < 0x80 {
                    format!("\\x{code:02x}")
                } else if code < 0x1_0000 {
                    format!("\\u{code:04x}")
                } else {
                    format!("\\U{code:08x}")
                };
                out.push_str(&escaped);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ============================================================================
// Decoding
// ============================================================================

/// Read a scene written by [`encode_text`]
///
/// Stops at the first malformed line; nothing is returned in that case.
pub fn decode_text<R: BufRead>(mut reader: R, defs: &Definitions) -> Result<ObjectCollection, LoadError> {
    let first = match read_line(&mut reader, 1, None)? {
        Some(line) if !line.is_empty() => line,
        _ => return Err(DecodeTextError::new(DecodeErrorKind::Empty, 1).into()),
    };

    let version = parse_version(&first)?;
    debug!(version, "decoding scene text");
    match version {
        0 => decode_v0(reader, defs),
        v => Err(DecodeTextError::new(DecodeErrorKind::VersionTooHigh, 1)
            .with_version(v)
            .into()),
    }
}

/// [`decode_text`] over an in-memory string
pub fn decode_str(text: &str, defs: &Definitions) -> Result<ObjectCollection, LoadError> {
    decode_text(text.as_bytes(), defs)
}

/// Next line without its `\n` or `\r\n` terminator, `None` at end of input
fn read_line<R: BufRead>(reader: &mut R, no: usize, version: Option<u64>) -> Result<Option<String>, LoadError> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    match String::from_utf8(buf) {
        Ok(line) => Ok(Some(line)),
        Err(e) => {
            let mut err = DecodeTextError::new(DecodeErrorKind::InvalidEncoding, no).with_source(e);
            err.version = version;
            Err(err.into())
        }
    }
}

fn parse_version(line: &str) -> Result<u64, DecodeTextError> {
    let pairs = SceneTextParser::parse(Rule::version_line, line)
        .map_err(|e| DecodeTextError::new(DecodeErrorKind::InvalidVersionLine, 1).with_source(e))?;
    let number = pairs
        .flatten()
        .find(|p| p.as_rule() == Rule::version_number)
        .map(|p| p.as_str())
        .unwrap_or_default();

    let invalid = || DecodeTextError::new(DecodeErrorKind::InvalidVersionNumber, 1);
    let version: i64 = number.parse().map_err(|e| invalid().with_source(e))?;
    u64::try_from(version).map_err(|e| invalid().with_source(e))
}

fn decode_v0<R: BufRead>(mut reader: R, defs: &Definitions) -> Result<ObjectCollection, LoadError> {
    let mut objects = ObjectCollection::new();
    // line 1 was the header
    let mut no = 1;
    loop {
        no += 1;
        let Some(line) = read_line(&mut reader, no, Some(0))? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        objects.push(decode_record(&line, no, defs)?);
    }

    debug!(
        paths = objects.paths.len(),
        buildings = objects.buildings.len(),
        text_boxes = objects.text_boxes.len(),
        "decoded scene text"
    );
    Ok(objects)
}

/// Decode one non-blank version 0 line
fn decode_record(line: &str, no: usize, defs: &Definitions) -> Result<ObjectValue, DecodeTextError> {
    let fail = |kind| DecodeTextError::new(kind, no).with_version(0);
    let (class, rest) = line.split_once(' ').unwrap_or((line, ""));

    if class == TEXTBOX_CLASS {
        let kind = DecodeErrorKind::InvalidTextBox;
        let fields: Vec<&str> = rest.splitn(5, ' ').collect();
        let &[x, y, w, h, content] = fields.as_slice() else {
            return Err(fail(kind));
        };
        let num = |s: &str| s.parse::<f32>().map_err(|e| fail(kind).with_source(e));
        let bounds = Rect::new(num(x)?, num(y)?, num(w)?, num(h)?);
        let content = unquote(content).map_err(|e| fail(kind).with_source(e))?;
        Ok(TextBox::new(bounds, content).into())
    } else if let Some(def) = defs.path_index(class) {
        let kind = DecodeErrorKind::InvalidPath;
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let &[sx, sy, ex, ey] = fields.as_slice() else {
            return Err(fail(kind));
        };
        let num = |s: &str| s.parse::<f32>().map_err(|e| fail(kind).with_source(e));
        let start = Vec2::new(num(sx)?, num(sy)?);
        let end = Vec2::new(num(ex)?, num(ey)?);
        Ok(Path::new(def, start, end).into())
    } else if let Some(def) = defs.building_index(class) {
        let kind = DecodeErrorKind::InvalidBuilding;
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let &[x, y, rot] = fields.as_slice() else {
            return Err(fail(kind));
        };
        let num = |s: &str| s.parse::<f32>().map_err(|e| fail(kind).with_source(e));
        let pos = Vec2::new(num(x)?, num(y)?);
        let rot = rot.parse::<i32>().map_err(|e| fail(kind).with_source(e))?;
        Ok(Building::new(def, pos, rot).into())
    } else {
        Err(fail(DecodeErrorKind::UnknownClass))
    }
}

/// Inverse of [`quote`]
pub fn unquote(s: &str) -> Result<String, UnquoteError> {
    let pairs = SceneTextParser::parse(Rule::quoted, s).map_err(|e| UnquoteError::Syntax(Box::new(e)))?;
    let mut out = String::with_capacity(s.len());
    for part in pairs.flat_map(|quoted| quoted.into_inner()) {
        match part.as_rule() {
            Rule::literal_run => out.push_str(part.as_str()),
            Rule::escape => out.push(unescape(part)?),
            _ => {}
        }
    }
    Ok(out)
}

fn unescape(escape: Pair<'_, Rule>) -> Result<char, UnquoteError> {
    // includes the leading backslash
    let text = escape.as_str();
    let rule = escape.into_inner().next().map(|p| p.as_rule());

    let (digits, radix, max) = match rule {
        Some(Rule::simple_escape) => {
            return Ok(match &text[1..] {
                "a" => '\u{07}',
                "b" => '\u{08}',
                "f" => '\u{0c}',
                "n" => '\n',
                "r" => '\r',
                "t" => '\t',
                "v" => '\u{0b}',
                "\"" => '"',
                _ => '\\',
            });
        }
        Some(Rule::hex_escape) => (&text[2..], 16, 0x7f),
        Some(Rule::octal_escape) => (&text[1..], 8, 0x7f),
        _ => (&text[2..], 16, char::MAX as u32),
    };

    u32::from_str_radix(digits, radix)
        .ok()
        .filter(|&code| code <= max)
        .and_then(char::from_u32)
        .ok_or_else(|| UnquoteError::InvalidEscape(text.to_string()))
}
