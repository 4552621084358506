use super::*;

const SCRIPT: &str = r#"
characters:
  Zed:
    image: zed.png
    voice: en_US/vctk_low#p236
  Amy:
    image: amy.png
    voice: en_UK/apope_low
slides:
  - Zed: Hello
  - image: diagram.png
    zoom_to_fit: true
  - Amy: Bye
"#;

#[test]
fn parses_characters_in_declaration_order() {
    let script = Script::from_yaml_str(SCRIPT).unwrap();
    let names: Vec<&str> = script.characters.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Zed", "Amy"]);
    assert_eq!(
        script.characters.get("Amy").unwrap().voice,
        "en_UK/apope_low"
    );
    assert_eq!(script.slides.len(), 3);
}

#[test]
fn missing_sections_default_to_empty() {
    let script = Script::from_yaml_str("{}").unwrap();
    assert!(script.slides.is_empty());
    assert!(script.characters.is_empty());
    let slides = script.parse_slides().unwrap();
    assert_eq!(slides.len(), 1);
}

#[test]
fn invalid_yaml_is_a_serde_error() {
    assert!(matches!(
        Script::from_yaml_str("slides: [unclosed"),
        Err(ReelError::Serde(_))
    ));
    assert!(matches!(
        Script::from_yaml_str("characters:\n  A: {voice: v}\n"),
        Err(ReelError::Serde(_))
    ));
}

#[test]
fn insert_replaces_existing_character() {
    let mut chars = Characters::new();
    chars.insert(
        "A",
        Character {
            image: PathBuf::from("a.png"),
            voice: "v1".to_string(),
        },
    );
    chars.insert(
        "A",
        Character {
            image: PathBuf::from("a.png"),
            voice: "v2".to_string(),
        },
    );
    assert_eq!(chars.len(), 1);
    assert_eq!(chars.get("A").unwrap().voice, "v2");
}
