use std::collections::HashSet;

use crate::merger;
use crate::model::{StringEntry, TranslatedEntry};
use crate::parser::RawResources;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Escape the five XML special characters. `&` goes first so the entities
/// produced for the others are not escaped twice.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render entries as a `strings.xml` document, in the given order
pub fn serialize(entries: &[StringEntry]) -> String {
    let mut out = String::from(XML_HEADER);
    out.push_str("<resources>\n");
    for entry in entries {
        push_string(&mut out, entry);
    }
    out.push_str("</resources>\n");
    out
}

fn push_string(out: &mut String, entry: &StringEntry) {
    out.push_str("    <string name=\"");
    out.push_str(&escape_xml(&entry.key));
    out.push('"');
    if !entry.translatable {
        out.push_str(" translatable=\"false\"");
    }
    out.push('>');
    out.push_str(&escape_xml(&entry.value));
    out.push_str("</string>\n");
}

fn push_raw(out: &mut String, raw: &str) {
    out.push_str("    ");
    out.push_str(raw);
    out.push('\n');
}

/// Render merged translations over the file they were merged into.
///
/// Strings the file already had are copied from it verbatim, markup included.
/// New strings are rendered as usual. Everything else the file held (plurals,
/// arrays, comments) follows the strings in its original order.
pub fn serialize_over(merged: &[TranslatedEntry], existing: &RawResources) -> String {
    let mut out = String::from(XML_HEADER);
    if existing.root_attributes.is_empty() {
        out.push_str("<resources>\n");
    } else {
        out.push_str(&format!("<resources {}>\n", existing.root_attributes));
    }

    let mut emitted: HashSet<&str> = HashSet::new();
    for entry in merged {
        match existing.strings.get(&entry.key) {
            Some(raw) => push_raw(&mut out, raw),
            None => push_string(
                &mut out,
                &StringEntry::new(entry.key.clone(), entry.translated_value.clone()),
            ),
        }
        emitted.insert(entry.key.as_str());
    }
    // Strings the merge never saw, such as empty ones
    for (key, raw) in &existing.strings {
        if !emitted.contains(key.as_str()) {
            push_raw(&mut out, raw);
        }
    }
    for raw in &existing.others {
        push_raw(&mut out, raw);
    }

    out.push_str("</resources>\n");
    out
}

/// Render merged translations; the translated value becomes the string value
pub fn serialize_translations(entries: &[TranslatedEntry]) -> String {
    serialize(&merger::to_string_entries(entries))
}

/// Path of the `locale` file next to a default-language file.
///
/// The last `values` directory becomes `values-{locale}`; paths without one get
/// `values-{locale}/<file name>` under the same parent directory.
pub fn target_path(default_path: &str, locale: &str) -> String {
    let localized = format!("values-{}", locale);
    let mut segments: Vec<&str> = default_path.split('/').collect();

    let file_index = segments.len().saturating_sub(1);
    if let Some(index) = segments[..file_index]
        .iter()
        .rposition(|segment| *segment == "values")
    {
        segments[index] = &localized;
        return segments.join("/");
    }

    let file_name = segments.get(file_index).copied().unwrap_or("strings.xml");
    match default_path.rfind('/') {
        Some(slash) => format!("{}/{}/{}", &default_path[..slash], localized, file_name),
        None => format!("{}/{}", localized, file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn escapes_ampersand_first() {
        assert_eq!(escape_xml("a & <b> \"c\" 'd'"), "a &amp; &lt;b&gt; &quot;c&quot; &apos;d&apos;");
        assert_eq!(escape_xml("&amp;"), "&amp;amp;");
    }

    #[test]
    fn serializes_in_input_order() {
        let xml = serialize(&[StringEntry::new("b", "Bee"), StringEntry::new("a", "Ay")]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n    <string name=\"b\">Bee</string>\n    <string name=\"a\">Ay</string>\n</resources>\n"
        );
    }

    #[test]
    fn empty_list_is_valid_document() {
        let xml = serialize(&[]);
        assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n</resources>\n");
        assert!(parser::parse(&xml).is_empty());
    }

    #[test]
    fn round_trip_is_stable() {
        let entries = vec![
            StringEntry::new("welcome", "Hello"),
            StringEntry::untranslatable("app_name", "Demo"),
        ];
        let xml = serialize(&entries);
        assert_eq!(serialize(&parser::parse(&xml)), xml);
    }

    #[test]
    fn escaped_values_parse_back_to_original() {
        let entries = vec![StringEntry::new("q", "Tom & Jerry's <\"show\">")];
        assert_eq!(parser::parse(&serialize(&entries)), entries);
    }

    #[test]
    fn rewriting_keeps_existing_markup_and_elements() {
        let existing = r#"<resources xmlns:xliff="urn:oasis:names:tc:xliff:document:1.2">
    <string name="w">Hola <b>amigo</b></string>
    <plurals name="n">
        <item quantity="one">%d libro</item>
    </plurals>
    <string name="empty"></string>
</resources>"#;
        let raw = parser::parse_raw(existing).unwrap();
        let merged = merger::merge_into_locale(
            &parser::parse(existing),
            &[TranslatedEntry {
                key: "bye".into(),
                original_value: "Bye & see you".into(),
                translated_value: "Adiós & hasta luego".into(),
                locale: "es".into(),
            }],
            "es",
        );

        let xml = serialize_over(&merged, &raw);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<resources xmlns:xliff=\"urn:oasis:names:tc:xliff:document:1.2\">\n\
\x20   <string name=\"bye\">Adiós &amp; hasta luego</string>\n\
\x20   <string name=\"w\">Hola <b>amigo</b></string>\n\
\x20   <string name=\"empty\"></string>\n\
\x20   <plurals name=\"n\">\n        <item quantity=\"one\">%d libro</item>\n    </plurals>\n\
</resources>\n"
        );
        // Rendering the result again changes nothing
        let again = merger::merge_into_locale(&parser::parse(&xml), &[], "es");
        assert_eq!(serialize_over(&again, &parser::parse_raw(&xml).unwrap()), xml);
    }

    #[test]
    fn target_path_replaces_values_directory() {
        assert_eq!(
            target_path("app/src/main/res/values/strings.xml", "fr"),
            "app/src/main/res/values-fr/strings.xml"
        );
        assert_eq!(target_path("values/strings.xml", "pt-rBR"), "values-pt-rBR/strings.xml");
    }

    #[test]
    fn target_path_uses_last_values_segment() {
        assert_eq!(
            target_path("values/app/src/main/res/values/strings.xml", "de"),
            "values/app/src/main/res/values-de/strings.xml"
        );
    }

    #[test]
    fn target_path_without_values_directory() {
        assert_eq!(
            target_path("shared/src/commonMain/resources/MR/base/strings.xml", "es"),
            "shared/src/commonMain/resources/MR/base/values-es/strings.xml"
        );
        assert_eq!(target_path("strings.xml", "es"), "values-es/strings.xml");
    }
}
