use babel_thrive::{
    Error, ExtractedMessage, GodotExtractor, KeywordMap, Options,
    extract_godot_resource, extract_godot_scene,
    godot::{godot_unquote, is_numeric_expression},
};
use encoding_rs::WINDOWS_1251;
use pretty_assertions::assert_eq;

fn scene(content: &str, keywords: &[&str]) -> Vec<ExtractedMessage> {
    extract_godot_scene(content.as_bytes(), keywords, &[], &Options::default())
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn resource(content: &str, keywords: &[&str]) -> Vec<ExtractedMessage> {
    extract_godot_resource(
        content.as_bytes(),
        keywords,
        &[],
        &Options::default(),
    )
    .unwrap()
    .collect::<Result<Vec<_>, _>>()
    .unwrap()
}

fn summary(messages: &[ExtractedMessage]) -> Vec<(usize, Option<&str>, &str)> {
    messages
        .iter()
        .map(|m| (m.line, m.keyword.as_deref(), m.message()))
        .collect()
}

const LABEL_SCENE: &str = r#"[gd_scene load_steps=2 format=2]

[node name="Root" type="Control"]

[node name="Title" type="Label" parent="."]
text = "Hello world"
align = 1
"#;

#[test]
fn single_line_property() {
    let messages = scene(LABEL_SCENE, &["Label/text"]);

    assert_eq!(
        summary(&messages),
        vec![(6, Some("Label/text"), "Hello world")]
    );
    assert_eq!(messages[0].messages.len(), 1);
    assert!(messages[0].comments.is_empty());
}

#[test]
fn unknown_property_is_skipped() {
    assert!(scene(LABEL_SCENE, &["Button/text", "tooltip"]).is_empty());
}

#[test]
fn node_type_keyword_takes_precedence() {
    let content = r#"[node name="Root" type="Control"]

[node name="Title" type="Label" parent="."]
text = "Title"

[node name="Start" type="Button" parent="."]
text = "Start"
"#;
    let messages = scene(content, &["text", "Button/text"]);

    assert_eq!(
        summary(&messages),
        vec![(4, Some("text"), "Title"), (7, Some("Button/text"), "Start")]
    );
}

#[test]
fn properties_outside_nodes_are_ignored() {
    let content = r#"[gd_scene load_steps=2 format=2]
text = "Not in a node"

[ext_resource path="res://font.tres" type="DynamicFont" id=1]
text = "Still not"

[node name="Title" type="Label"]
text = "Inside"

[connection signal="pressed" from="." to="." method="_on_pressed"]
text = "After connection"
"#;
    let messages = scene(content, &["text"]);

    assert_eq!(summary(&messages), vec![(8, Some("text"), "Inside")]);
}

#[test]
fn instanced_node_has_empty_type() {
    let content = r#"[node name="Root" type="Control"]

[node name="Instanced" parent="." instance=ExtResource( 2 )]
text = "From instance"
"#;

    assert_eq!(
        summary(&scene(content, &["text"])),
        vec![(4, Some("text"), "From instance")]
    );
    assert_eq!(
        summary(&scene(content, &["/text"])),
        vec![(4, Some("/text"), "From instance")]
    );
    assert!(scene(content, &["Label/text"]).is_empty());
}

#[test]
fn multi_line_string_is_numbered_at_its_end() {
    let content = r#"[node name="Description" type="Label"]
text = "First line
second line
third line"
autowrap = true
"#;
    let messages = scene(content, &["text"]);

    assert_eq!(
        summary(&messages),
        vec![(4, Some("text"), "First line\nsecond line\nthird line")]
    );
}

#[test]
fn escapes_are_resolved() {
    let content = r#"[node name="Quote" type="Label"]
text = "Say \"hi\"\tnow\\n and \q"
"#;
    let messages = scene(content, &["text"]);

    assert_eq!(messages[0].message(), "Say \"hi\"\tnow\\n and q");
}

#[test]
fn escaped_newline_is_newline() {
    let content = "[node name=\"A\" type=\"Label\"]\ntext = \"one\\ntwo\"\n";

    assert_eq!(scene(content, &["text"])[0].message(), "one\ntwo");
}

#[test]
fn numeric_values_are_dropped() {
    let content = r#"[node name="Stats" type="Label"]
text = "3.14"
text = "-1"
text = "1 + 2"
text = ""
text = "Level 2"
"#;

    assert_eq!(
        summary(&scene(content, &["text"])),
        vec![(6, Some("text"), "Level 2")]
    );
}

#[test]
fn placeholder_suppresses_block() {
    let content = r#"[node name="A" type="Label"]
text = "Real"

[node name="B" type="Label"]
text = "Template"
hint = "PLACEHOLDER"

[node name="C" type="Label"]
text = "PLACEHOLDER text"

[node name="D" type="Label"]
text = "After"
"#;

    assert_eq!(
        summary(&scene(content, &["text"])),
        vec![(2, Some("text"), "Real"), (12, Some("text"), "After")]
    );
}

#[test]
fn placeholder_in_next_block_does_not_leak() {
    let content = r#"[node name="A" type="Label"]
text = "Kept"
[node name="B" type="Label"]
text = "PLACEHOLDER"
"#;

    assert_eq!(
        summary(&scene(content, &["text"])),
        vec![(2, Some("text"), "Kept")]
    );
}

#[test]
fn option_items_are_split_in_entries_of_five() {
    let content = r#"[node name="Difficulty" type="OptionButton"]
text = "Pick one"
items = [ "Easy", null, false, 0, null, 'Hard', null, false, 1, null ]
"#;
    let messages = scene(content, &["OptionButton/text"]);

    assert_eq!(
        summary(&messages),
        vec![
            (2, Some("OptionButton/text"), "Pick one"),
            (3, Some("OptionButton/text"), "Easy"),
            (3, Some("OptionButton/text"), "Hard"),
        ]
    );
}

#[test]
fn option_items_before_any_property_have_no_keyword() {
    let content = r#"[node name="Difficulty" type="OptionButton"]
items = [ "Easy", null, false, 0, null ]
"#;

    assert_eq!(summary(&scene(content, &["text"])), vec![(2, None, "Easy")]);
}

#[test]
fn malformed_option_items_are_skipped() {
    let content = r#"[node name="Difficulty" type="OptionButton"]
text = "Pick one"
items = [ "Easy", null, false, 0 ]
text = "Still scanned"
"#;

    assert_eq!(
        summary(&scene(content, &["text"])),
        vec![(2, Some("text"), "Pick one"), (4, Some("text"), "Still scanned")]
    );
}

#[test]
fn numeric_option_items_are_dropped() {
    let content = r#"[node name="Scale" type="OptionButton"]
text = "Scale"
items = [ "1", null, false, 0, null, "Auto", null, false, 1, null ]
"#;
    let messages = scene(content, &["text"]);

    assert_eq!(
        summary(&messages),
        vec![(2, Some("text"), "Scale"), (3, Some("text"), "Auto")]
    );
}

#[test]
fn placeholder_suppresses_option_items() {
    let content = r#"[node name="Options" type="OptionButton"]
text = "Label"
items = [ "PLACEHOLDER", null, false, 0, null ]
"#;

    assert!(scene(content, &["text"]).is_empty());
}

#[test]
fn trailing_data_aborts_extraction() {
    let content = r#"[node name="A" type="Label"]
text = "Before"
text = "Broken" extra
text = "Never"
"#;
    let mut extractor = extract_godot_scene(
        content.as_bytes(),
        &["text"],
        &[],
        &Options::default(),
    )
    .unwrap();

    assert_eq!(extractor.next().unwrap().unwrap().message(), "Before");
    assert!(matches!(
        extractor.next(),
        Some(Err(Error::TrailingData { line: 3 }))
    ));
    assert!(extractor.next().is_none());
    assert!(extractor.next().is_none());
}

#[test]
fn trailing_data_after_multi_line_string() {
    let content =
        "[node name=\"A\" type=\"Label\"]\ntext = \"start\nend\" junk\n";
    let results: Vec<_> = extract_godot_scene(
        content.as_bytes(),
        &["text"],
        &[],
        &Options::default(),
    )
    .unwrap()
    .collect();

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(Error::TrailingData { line: 3 })));
}

#[test]
fn unterminated_string_at_end_of_file_is_dropped() {
    let content = "[node name=\"A\" type=\"Label\"]\ntext = \"never\nclosed\n";

    assert!(scene(content, &["text"]).is_empty());
}

#[test]
fn crlf_lines_are_numbered_like_lf() {
    let content = "[node name=\"A\" type=\"Label\"]\r\n\r\n\
                   text = \"Hello\"\r\n\
                   text = \"Multi\r\nline\"\r\n";

    assert_eq!(
        summary(&scene(content, &["text"])),
        vec![(3, Some("text"), "Hello"), (5, Some("text"), "Multi\nline")]
    );
}

#[test]
fn decodes_configured_encoding() {
    let (bytes, _, _) = WINDOWS_1251
        .encode("[node name=\"A\" type=\"Label\"]\ntext = \"Привет\"\n");
    let options = Options::from_pairs([("encoding", "cp1251")]).unwrap();
    let messages: Vec<ExtractedMessage> =
        extract_godot_scene(bytes.as_ref(), &["text"], &[], &options)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

    assert_eq!(messages[0].message(), "Привет");
}

#[test]
fn malformed_bytes_are_fatal() {
    let bytes: &[u8] = b"[node name=\"A\" type=\"Label\"]\ntext = \"\xff\"\n";
    let result =
        extract_godot_scene(bytes, &["text"], &[], &Options::default());

    assert!(matches!(result, Err(Error::Decode { encoding: "UTF-8" })));
}

#[test]
fn byte_order_mark_is_skipped() {
    let content = format!("\u{feff}{LABEL_SCENE}");

    assert_eq!(
        summary(&scene(&content, &["text"])),
        vec![(6, Some("text"), "Hello world")]
    );
}

#[test]
fn extraction_is_repeatable() {
    let content = r#"[node name="Difficulty" type="OptionButton"]
text = "Pick
one"
items = [ "Easy", null, false, 0, null ]
"#;

    assert_eq!(scene(content, &["text"]), scene(content, &["text"]));
}

const ITEM_RESOURCE: &str = r#"[gd_resource type="Resource" format=2]

[ext_resource path="res://item.gd" type="Script" id=1]

[resource]
script = ExtResource( 1 )
name = "Sword"
description = "A sharp
blade"
value = "42"
"#;

#[test]
fn resource_properties() {
    let messages = resource(
        ITEM_RESOURCE,
        &[
            "Resource/name",
            "Resource/description",
            "Resource/value",
            "Label/text",
        ],
    );

    assert_eq!(
        summary(&messages),
        vec![
            (7, Some("Resource/name"), "Sword"),
            (9, Some("Resource/description"), "A sharp\nblade"),
        ]
    );
}

#[test]
fn resource_ignores_bare_keywords() {
    assert!(resource(ITEM_RESOURCE, &["name", "gettext", "_"]).is_empty());
    assert!(
        resource("[resource]\ntext = \"Hello\"\n", &["text", "gettext", "_"])
            .is_empty()
    );
    assert_eq!(
        summary(&resource(ITEM_RESOURCE, &["name", "Resource/name"])),
        vec![(7, Some("Resource/name"), "Sword")]
    );
}

#[test]
fn resource_ignores_other_contexts() {
    assert!(resource(ITEM_RESOURCE, &["Item/name"]).is_empty());
}

#[test]
fn resource_trailing_data_is_fatal() {
    let content = "[resource]\nname = \"Sword\", \"Axe\"\n";
    let results: Vec<_> = extract_godot_resource(
        content.as_bytes(),
        &["Resource/name"],
        &[],
        &Options::default(),
    )
    .unwrap()
    .collect();

    assert!(matches!(
        results.as_slice(),
        [Err(Error::TrailingData { line: 2 })]
    ));
}

#[test]
fn keyword_map_resolution() {
    let map = KeywordMap::for_scene(&["text", "Label/text", "Button/hint"]);

    assert_eq!(map.resolve(Some("Label"), "text"), Some("Label/text"));
    assert_eq!(map.resolve(Some("Button"), "text"), Some("text"));
    assert_eq!(map.resolve(None, "text"), Some("text"));
    assert_eq!(map.resolve(Some("Button"), "hint"), Some("Button/hint"));
    assert_eq!(map.resolve(Some("Label"), "hint"), None);
    assert_eq!(map.resolve(None, "missing"), None);
    assert!(!map.is_empty());
}

#[test]
fn keyword_map_is_empty_without_applicable_keywords() {
    assert!(KeywordMap::for_scene::<&str>(&[]).is_empty());
    assert!(KeywordMap::for_resource(&["Label/text", "text"]).is_empty());
    assert!(!KeywordMap::for_resource(&["Resource/text"]).is_empty());
}

#[test]
fn extractor_reports_its_format() {
    assert!(GodotExtractor::scene(LABEL_SCENE, &["text"]).format().is_scene());
    assert!(
        GodotExtractor::resource(ITEM_RESOURCE, &["Resource/name"])
            .format()
            .is_resource()
    );
    assert_eq!(GodotExtractor::scene("", &["text"]).count(), 0);
}

#[test]
fn unquote_reports_remainder() {
    assert_eq!(godot_unquote("abc\" ]"), ("abc".to_owned(), Some(" ]")));
    assert_eq!(godot_unquote(r#"a\"b"#), ("a\"b".to_owned(), None));
    assert_eq!(godot_unquote(""), (String::new(), None));
}

#[test]
fn numeric_expressions() {
    for value in ["", "3.14", "-1", "1 + 2", "10 * 2 / 5", "...", "  "] {
        assert!(is_numeric_expression(value), "{value:?}");
    }

    for value in ["Level 2", "OK", "1.2.3.4 done", "x"] {
        assert!(!is_numeric_expression(value), "{value:?}");
    }
}
