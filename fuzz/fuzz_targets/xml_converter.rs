#![no_main]
use libfuzzer_sys::fuzz_target;
use xmljson::{convert, convert_node, from_xml_bytes};

fuzz_target!(|data: &[u8]| {
    // byte input and the pre-parsed tree must agree, failures included
    let direct = convert(data);
    match from_xml_bytes(data) {
        Ok(doc) => assert_eq!(direct.ok(), Some(convert_node(&doc.root))),
        Err(err) => assert_eq!(direct.err(), Some(err)),
    }
});
