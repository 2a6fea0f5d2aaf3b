//! Order-preserving byte encoding for [`Value`].
//!
//! Comparing two encodings bytewise gives the same result as comparing the
//! values themselves. Radix-tree indexes rely on this to branch on bytes.
//!
//! # Layout
//!
//! Every encoding starts with a kind tag that mirrors the value order:
//!
//! | kind    | tag  | payload                                       |
//! |---------|------|-----------------------------------------------|
//! | Null    | 0x00 | none                                          |
//! | Bool    | 0x01 | `0x00` / `0x01`                               |
//! | Integer | 0x02 | sign bit flipped, 8 bytes big-endian          |
//! | Text    | 0x03 | escaped UTF-8, terminated by `0x00 0x00`      |
//! | Bytes   | 0x04 | escaped bytes, terminated by `0x00 0x00`      |
//!
//! Inside escaped payloads a `0x00` byte is written as `0x00 0x01`, so the
//! terminator never appears early and `"a" < "a\0" < "aa"` still holds.
//!
//! The encoding is prefix-free: no encoding is a proper prefix of another.

use crate::Value;

/// Kind tags. Their numeric order is the order of value kinds.
pub mod tags {
    /// Null values sort first.
    pub const NULL: u8 = 0x00;
    /// Boolean values.
    pub const BOOL: u8 = 0x01;
    /// 64-bit signed integers.
    pub const INTEGER: u8 = 0x02;
    /// UTF-8 text.
    pub const TEXT: u8 = 0x03;
    /// Raw bytes.
    pub const BYTES: u8 = 0x04;
}

const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;
const ESCAPE_BYTE: u8 = 0x01;
const TERMINATOR: u8 = 0x00;

fn encode_escaped(data: &[u8], buf: &mut Vec<u8>) {
    for &byte in data {
        if byte == 0x00 {
            buf.push(0x00);
            buf.push(ESCAPE_BYTE);
        } else {
            buf.push(byte);
        }
    }
    buf.push(TERMINATOR);
    buf.push(TERMINATOR);
}

/// Appends the sortable encoding of `value` to `buf`.
fn encode_into(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.push(tags::NULL),
        Value::Bool(b) => {
            buf.push(tags::BOOL);
            buf.push(u8::from(*b));
        }
        Value::Integer(n) => {
            buf.push(tags::INTEGER);
            #[allow(clippy::cast_sign_loss)]
            let flipped = (*n as u64) ^ SIGN_FLIP_I64;
            buf.extend_from_slice(&flipped.to_be_bytes());
        }
        Value::Text(s) => {
            buf.push(tags::TEXT);
            encode_escaped(s.as_bytes(), buf);
        }
        Value::Bytes(b) => {
            buf.push(tags::BYTES);
            encode_escaped(b, buf);
        }
    }
}

/// Returns the sortable encoding of `value`.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + value.byte_width() + 2);
    encode_into(value, &mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            "[a-c\\x00]{0,4}".prop_map(Value::Text),
            prop::collection::vec(prop_oneof![Just(0u8), Just(1u8), Just(255u8)], 0..4)
                .prop_map(Value::Bytes),
        ]
    }

    #[test]
    fn integer_sign_flip() {
        assert!(encode(&Value::Integer(-1)) < encode(&Value::Integer(0)));
        assert!(encode(&Value::Integer(i64::MIN)) < encode(&Value::Integer(-1)));
        assert!(encode(&Value::Integer(1)) < encode(&Value::Integer(i64::MAX)));
    }

    #[test]
    fn escaped_text_order() {
        let a = encode(&Value::from("a"));
        let a_nul = encode(&Value::from("a\u{0}"));
        let aa = encode(&Value::from("aa"));
        assert!(a < a_nul);
        assert!(a_nul < aa);
    }

    #[test]
    fn prefix_free() {
        let a = encode(&Value::from("a"));
        let ab = encode(&Value::from("ab"));
        assert!(!ab.starts_with(&a));
    }

    proptest! {
        #[test]
        fn encoding_preserves_order(a in value_strategy(), b in value_strategy()) {
            prop_assert_eq!(a.cmp(&b), encode(&a).cmp(&encode(&b)));
        }
    }
}
