// crates/fieldtree/src/fragment.rs
//! Reads and rewrites the `Disabled` flag inside a configuration fragment.
//!
//! Fragments are treated as opaque text. Only two marker shapes are
//! recognised:
//!
//! - element form: `<Disabled>true</Disabled>`
//! - attribute form: `Disabled="true"`
//!
//! The element form wins when both are present, and only the first
//! occurrence of the chosen form is authoritative. Everything outside the
//! marker's value is left byte-for-byte untouched.

use core::ops::Range;

const ELEMENT_OPEN: &str = "<Disabled>";
const ELEMENT_CLOSE: &str = "</Disabled>";
const ATTRIBUTE_PREFIX: &str = "Disabled=\"";

/// The surface form a disabled marker was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerForm {
    Element,
    Attribute,
}

/// The authoritative disabled marker of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagMarker {
    pub form: MarkerForm,
    /// Byte range of the marker's value (between the tags or the quotes).
    pub value: Range<usize>,
}

impl FlagMarker {
    /// The marker's raw value text.
    pub fn value_str<'a>(&self, fragment: &'a str) -> &'a str {
        &fragment[self.value.clone()]
    }

    /// `true` only for the exact, lowercase text `true`.
    pub fn is_disabled(&self, fragment: &str) -> bool {
        self.value_str(fragment) == "true"
    }
}

/// Finds the authoritative disabled marker, if any.
pub fn locate(fragment: &str) -> Option<FlagMarker> {
    locate_element(fragment).or_else(|| locate_attribute(fragment))
}

/// Returns `true` if the fragment marks its node as disabled.
///
/// A fragment without a marker is implicitly enabled.
pub fn read(fragment: &str) -> bool {
    locate(fragment).is_some_and(|marker| marker.is_disabled(fragment))
}

/// Rewrites the disabled marker to `target_disabled`.
///
/// A fragment without a marker is returned unchanged: the flag is never
/// injected, since the engine's expected position for it is unknown.
pub fn write(fragment: &str, target_disabled: bool) -> String {
    match locate(fragment) {
        Some(marker) => {
            let mut out = String::with_capacity(fragment.len() + 1);
            out.push_str(&fragment[..marker.value.start]);
            out.push_str(bool_text(target_disabled));
            out.push_str(&fragment[marker.value.end..]);
            out
        }
        None => fragment.to_owned(),
    }
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn locate_element(fragment: &str) -> Option<FlagMarker> {
    let open = fragment.find(ELEMENT_OPEN)?;
    let start = open + ELEMENT_OPEN.len();
    let len = fragment[start..].find(ELEMENT_CLOSE)?;
    Some(FlagMarker {
        form: MarkerForm::Element,
        value: start..start + len,
    })
}

fn locate_attribute(fragment: &str) -> Option<FlagMarker> {
    let mut from = 0;
    while let Some(pos) = fragment[from..].find(ATTRIBUTE_PREFIX) {
        let at = from + pos;
        let start = at + ATTRIBUTE_PREFIX.len();
        // Must be a whole attribute name, not the tail of e.g. `IsDisabled`.
        let bounded = fragment[..at]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        if bounded {
            let len = fragment[start..].find('"')?;
            return Some(FlagMarker {
                form: MarkerForm::Attribute,
                value: start..start + len,
            });
        }
        from = start;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_element_form() {
        assert!(read("<TreeItem><Disabled>true</Disabled></TreeItem>"));
        assert!(!read("<TreeItem><Disabled>false</Disabled></TreeItem>"));
    }

    #[test]
    fn test_read_attribute_form() {
        assert!(read(r#"<TreeItem Disabled="true"><ItemName>Box 1</ItemName></TreeItem>"#));
        assert!(!read(r#"<TreeItem Disabled="false"/>"#));
    }

    #[test]
    fn test_read_is_case_sensitive() {
        assert!(!read("<Disabled>True</Disabled>"));
        assert!(!read(r#"<TreeItem Disabled="TRUE"/>"#));
    }

    #[test]
    fn test_read_without_marker_is_enabled() {
        assert!(!read("<TreeItem><ItemName>Term 1</ItemName></TreeItem>"));
        assert!(!read(""));
        assert!(!read("<<<not xml at all"));
    }

    #[test]
    fn test_attribute_requires_name_boundary() {
        let xml = r#"<TreeItem IsDisabled="true"/>"#;
        assert_eq!(locate(xml), None);
        assert!(!read(xml));
        assert_eq!(write(xml, false), xml);
    }

    #[test]
    fn test_unterminated_element_falls_back_to_attribute() {
        let xml = r#"<TreeItem Disabled="true"><Disabled>false"#;
        let marker = locate(xml).unwrap();
        assert_eq!(marker.form, MarkerForm::Attribute);
        assert!(read(xml));
    }

    #[test]
    fn test_element_form_wins_over_attribute() {
        let xml = r#"<TreeItem Disabled="true"><Disabled>false</Disabled></TreeItem>"#;
        assert_eq!(locate(xml).unwrap().form, MarkerForm::Element);
        assert!(!read(xml));
        assert_eq!(
            write(xml, true),
            r#"<TreeItem Disabled="true"><Disabled>true</Disabled></TreeItem>"#
        );
    }

    #[test]
    fn test_write_scenario_fragment() {
        let xml = "<TreeItem><Disabled>true</Disabled></TreeItem>";
        assert!(read(xml));
        assert_eq!(
            write(xml, false),
            "<TreeItem><Disabled>false</Disabled></TreeItem>"
        );
    }

    #[test]
    fn test_write_preserves_surrounding_bytes() {
        let xml = "<?xml version=\"1.0\"?>\r\n<TreeItem>\r\n  <ItemName>EK1100</ItemName>\r\n  <Disabled>false</Disabled>\r\n  <BoxFlags>0x0003</BoxFlags>\r\n</TreeItem>";
        let out = write(xml, true);
        assert_eq!(out, xml.replace("<Disabled>false<", "<Disabled>true<"));
    }

    #[test]
    fn test_write_only_touches_first_occurrence() {
        let xml = "<A><Disabled>false</Disabled><B><Disabled>false</Disabled></B></A>";
        assert_eq!(
            write(xml, true),
            "<A><Disabled>true</Disabled><B><Disabled>false</Disabled></B></A>"
        );
    }

    #[test]
    fn test_write_without_marker_is_unchanged() {
        let xml = "<TreeItem><ItemName>Device 1 (EtherCAT)</ItemName></TreeItem>";
        assert_eq!(write(xml, true), xml);
        assert_eq!(write(xml, false), xml);
    }

    #[test]
    fn test_write_normalizes_odd_values() {
        let xml = r#"<TreeItem Disabled="1"/>"#;
        assert_eq!(write(xml, false), r#"<TreeItem Disabled="false"/>"#);
        assert_eq!(write("<Disabled></Disabled>", true), "<Disabled>true</Disabled>");
    }

    #[test]
    fn test_write_is_idempotent_and_round_trips() {
        let fragments = [
            "<TreeItem><Disabled>true</Disabled></TreeItem>",
            "<TreeItem><Disabled>false</Disabled><Disabled>true</Disabled></TreeItem>",
            r#"<TreeItem Name="x" Disabled="false" Id="3"/>"#,
            "<Disabled>maybe</Disabled>",
        ];
        for f in fragments {
            for target in [true, false] {
                let once = write(f, target);
                assert_eq!(write(&once, target), once, "not idempotent for {f}");
                assert_eq!(read(&once), target, "round trip failed for {f}");
            }
        }
    }
}
