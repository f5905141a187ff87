//! Editable scene model for 2D factory layouts.
//!
//! A [`Scene`] holds paths, buildings and text boxes in an
//! [`ObjectCollection`], records every mutation in a linear undo/redo
//! [`History`], and saves to / loads from a versioned line-oriented text
//! format (see [`codec`]).
//!
//! ```
//! use std::sync::Arc;
//! use glam::vec2;
//! use planscape::{Building, BuildingDef, Definitions, PathDef, Scene};
//!
//! let defs = Arc::new(Definitions::new(
//!     vec![PathDef::new("Belt", 1.0)],
//!     vec![BuildingDef::new("Splitter", 4.0, 4.0)],
//! ));
//! let mut scene = Scene::new(defs);
//! scene.add_building(Building::new(0, vec2(0.0, 0.0), 0));
//! assert!(scene.is_modified());
//! scene.undo().unwrap();
//! assert!(scene.objects().is_empty());
//! ```

use pest_derive::Parser;

pub mod arena;
pub mod codec;
pub mod defaults;
pub mod defs;
pub mod errors;
pub mod history;
pub mod log;
pub mod object;
pub mod scene;
pub mod selection;
pub mod types;

pub use codec::{decode_text, encode_text};
pub use defs::{BuildingDef, Definitions, PathDef};
pub use errors::{DecodeErrorKind, DecodeTextError, HistoryError, LoadError};
pub use history::{History, SceneOp};
pub use object::{Building, Object, ObjectCollection, ObjectKind, ObjectValue, Path, Shape, TextBox};
pub use scene::Scene;
pub use selection::{PathSel, Selection};
pub use types::{BBox, Rect};

#[derive(Parser)]
#[grammar = "scene.pest"]
pub struct SceneTextParser;

#[cfg(test)]
mod tests {
    use super::*;
    use pest::Parser;

    #[test]
    fn parse_version_line() {
        let result = SceneTextParser::parse(Rule::version_line, "#VERSION=0");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_negative_version_line() {
        // rejected later, as a number
        let result = SceneTextParser::parse(Rule::version_line, "#VERSION=-3");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn reject_version_line_with_trailing_text() {
        assert!(SceneTextParser::parse(Rule::version_line, "#VERSION=0 extra").is_err());
        assert!(SceneTextParser::parse(Rule::version_line, "#VERSION=").is_err());
        assert!(SceneTextParser::parse(Rule::version_line, "hello").is_err());
    }

    #[test]
    fn parse_quoted_simple() {
        let result = SceneTextParser::parse(Rule::quoted, r#""Hello world""#);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_quoted_escapes() {
        let input = r#""say \"hi\"\n\t\\ \x41 é \U0001F600 \101""#;
        let result = SceneTextParser::parse(Rule::quoted, input);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_quoted_empty() {
        let result = SceneTextParser::parse(Rule::quoted, r#""""#);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn reject_bad_quoted() {
        for input in [r#"no quotes"#, r#""unterminated"#, r#""bad \q escape""#, r#""a" trailing"#, r#""\x4""#] {
            let result = SceneTextParser::parse(Rule::quoted, input);
            assert!(result.is_err(), "{input} should not parse");
        }
    }
}
