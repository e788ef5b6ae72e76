#![no_main]
use libfuzzer_sys::fuzz_target;
use xmljson::from_xml_bytes;

fuzz_target!(|data: &[u8]| {
    let _ = from_xml_bytes(data);
});
