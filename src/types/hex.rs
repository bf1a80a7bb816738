//! Serializers for Hex output
//!
//! Checksums, identifiers and type fields read better as hex than as decimal integers. The
//! functions in this module plug into `#[serde(serialize_with = ...)]` attributes on the layer
//! structs to render such fields as `"0x...."` strings.

macro_rules! generate_serialize_hex_fns {
    (($fn:ident, $format:literal, $trait:path)) => {
        pub fn $fn<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
            T: $trait,
        {
            serializer.serialize_str(format!($format, value).as_str())
        }
    };

    ($($tt:tt,)*) => {
        $(
            generate_serialize_hex_fns!($tt);
        )+
    };
}

generate_serialize_hex_fns! {
    (serialize_lower_hex_u8, "0x{:02x}", core::fmt::LowerHex),
    (serialize_lower_hex_u16, "0x{:04x}", core::fmt::LowerHex),
    (serialize_lower_hex_u32, "0x{:08x}", core::fmt::LowerHex),
    (serialize_upper_hex_u16, "0x{:04X}", core::fmt::UpperHex),
}
