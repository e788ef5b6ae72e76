#![cfg(feature = "serde")]

use serde_json::json;
use xmljson::convert;

#[test]
fn test_value_serializes_like_plain_json() -> Result<(), Box<dyn std::error::Error>> {
    let value = convert(r#"<person id="7"><name>Ada</name><tag>x</tag><tag>y</tag></person>"#)?;
    let json = serde_json::to_value(&value)?;
    assert_eq!(json, json!({ "id": "7", "name": "Ada", "tag": ["x", "y"] }));
    Ok(())
}

#[test]
fn test_scalar_root_serializes_as_string() -> Result<(), Box<dyn std::error::Error>> {
    let value = convert("<age>30</age>")?;
    assert_eq!(serde_json::to_string(&value)?, r#""30""#);
    Ok(())
}

#[test]
fn test_serde_output_matches_builtin_renderer() -> Result<(), Box<dyn std::error::Error>> {
    let input = "<r b=\"q&quot;\"><c>1</c><c>tab\there</c><d/><a>x\ny</a></r>";
    let value = convert(input)?;
    // both preserve key order, so the compact strings are identical
    assert_eq!(serde_json::to_string(&value)?, value.to_json());
    Ok(())
}

#[test]
fn test_empty_element_serializes_as_empty_object() -> Result<(), Box<dyn std::error::Error>> {
    let value = convert("<r><e/><e>1</e></r>")?;
    assert_eq!(serde_json::to_string(&value)?, r#"{"e":[{},"1"]}"#);
    Ok(())
}
