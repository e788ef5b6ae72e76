use xmljson::{
    convert, convert_node, convert_with_options, from_xml_str_with_config, Config,
    ConvertOptions, ErrorKind, TextMode, XmlElement,
};

fn nested(depth: usize) -> String {
    format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth))
}

#[test]
fn test_default_depth_limit_rejects_deep_text() {
    let max = Config::default().max_depth;
    assert!(convert(nested(usize::from(max)).as_str()).is_ok());

    let err = convert(nested(usize::from(max) + 1).as_str()).err();
    assert_eq!(
        err.map(|e| e.kind().clone()),
        Some(ErrorKind::MaxDepthExceeded { max })
    );
}

#[test]
fn test_size_limit() {
    let options = ConvertOptions::new(Config::new(0, 64), TextMode::Last);
    let small = format!("<r>{}</r>", "x".repeat(10));
    let large = format!("<r>{}</r>", "x".repeat(100));

    assert!(convert_with_options(small.as_str(), &options).is_ok());
    let err = convert_with_options(large.as_str(), &options).err();
    assert!(err.as_ref().is_some_and(|e| e.is_parse_error()));
    assert_eq!(
        err.map(|e| e.kind().clone()),
        Some(ErrorKind::MaxSizeExceeded { max: 64 })
    );
}

/// `{"n":{"n":...{}...}}` with `depth - 1` objects around the innermost `{}`
fn nested_json(depth: usize) -> String {
    format!("{}{{}}{}", r#"{"n":"#.repeat(depth - 1), "}".repeat(depth - 1))
}

#[test]
fn test_unlimited_config_converts_very_deep_text() -> Result<(), Box<dyn std::error::Error>> {
    let depth = 100_000;
    let options = ConvertOptions::new(Config::unlimited(), TextMode::Last);
    let value = convert_with_options(nested(depth).as_str(), &options)?;
    assert_eq!(value.to_json(), nested_json(depth));
    drop(value);

    let doc = from_xml_str_with_config(&nested(depth), Config::unlimited())?;
    assert_eq!(convert_node(&doc.root).to_json(), nested_json(depth));
    Ok(())
}

#[test]
fn test_widest_depth_limit_is_usable() -> Result<(), Box<dyn std::error::Error>> {
    let depth = usize::from(u16::MAX);
    let options = ConvertOptions::new(Config::new(u16::MAX, 0), TextMode::Last);
    let value = convert_with_options(nested(depth).as_str(), &options)?;
    assert_eq!(value.to_json(), nested_json(depth));
    Ok(())
}

#[test]
fn test_prebuilt_trees_skip_parser_limits() -> Result<(), Box<dyn std::error::Error>> {
    let depth = 100_000;
    let tree = (0..depth).fold(XmlElement::new("leaf").with_text("end"), |inner, _| {
        XmlElement::new("n").with_child(inner)
    });
    // no parsing happens, so the depth limit does not apply
    let value = convert(&tree)?;
    drop(tree);

    let json = value.to_json();
    let expected = format!(
        "{}{}{}",
        r#"{"n":"#.repeat(depth - 1),
        r#"{"leaf":"end"}"#,
        "}".repeat(depth - 1)
    );
    assert_eq!(json, expected);
    assert!(value.to_json_pretty().ends_with("}\n}"));
    drop(value);
    Ok(())
}
