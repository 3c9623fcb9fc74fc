// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! EC2 XML response rendering.
//!
//! Response bodies are built as JSON-like mappings and rendered with one set
//! of rules:
//!
//! | Value | XML |
//! |-------|-----|
//! | string / number | `<key>text</key>` |
//! | bool | `<key>true</key>` / `<key>false</key>` |
//! | mapping | `<key><child>...</child></key>` |
//! | sequence | `<key><item>...</item><item>...</item></key>` |
//! | empty mapping or sequence | `<key/>` |
//! | null | omitted |
//!
//! Handlers name sequence keys the way EC2 does (`vpcSet`, `tagSet`), so the
//! wrapper element is always the key itself.

use std::borrow::Cow;
use std::fmt::Write;

use serde_json::{Map, Value};

use crate::constants::{XML_DECLARATION, XML_NAMESPACE};

const ITEM: &str = "item";

pub fn serialize_response(action: &str, body: &Map<String, Value>, request_id: &str) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    let _ = write!(out, r#"<{action}Response xmlns="{XML_NAMESPACE}">"#);
    write_text_element(&mut out, "requestId", request_id);
    for (key, value) in body {
        write_element(&mut out, key, value);
    }
    let _ = write!(out, "</{action}Response>");
    out
}

pub fn serialize_error(code: &str, message: &str, request_id: &str) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push_str("<Response><Errors><Error>");
    write_text_element(&mut out, "Code", code);
    write_text_element(&mut out, "Message", message);
    out.push_str("</Error></Errors>");
    write_text_element(&mut out, "RequestID", request_id);
    out.push_str("</Response>");
    out
}

fn write_text_element(out: &mut String, name: &str, text: &str) {
    let _ = write!(out, "<{name}>{}</{name}>", escape(text));
}

fn write_element(out: &mut String, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => write_text_element(out, name, if *b { "true" } else { "false" }),
        Value::Number(n) => write_text_element(out, name, &n.to_string()),
        Value::String(s) => write_text_element(out, name, s),
        Value::Object(map) if map.is_empty() => {
            let _ = write!(out, "<{name}/>");
        }
        Value::Object(map) => {
            let _ = write!(out, "<{name}>");
            for (key, child) in map {
                write_element(out, key, child);
            }
            let _ = write!(out, "</{name}>");
        }
        Value::Array(items) if items.iter().all(Value::is_null) => {
            let _ = write!(out, "<{name}/>");
        }
        Value::Array(items) => {
            let _ = write!(out, "<{name}>");
            for item in items {
                write_item(out, item);
            }
            let _ = write!(out, "</{name}>");
        }
    }
}

fn write_item(out: &mut String, item: &Value) {
    match item {
        Value::Object(map) => {
            let _ = write!(out, "<{ITEM}>");
            for (key, child) in map {
                write_element(out, key, child);
            }
            let _ = write!(out, "</{ITEM}>");
        }
        Value::Array(nested) => {
            let _ = write!(out, "<{ITEM}>");
            for inner in nested {
                write_item(out, inner);
            }
            let _ = write!(out, "</{ITEM}>");
        }
        other => write_element(out, ITEM, other),
    }
}

/// Escapes the five XML special characters.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("body must be an object"),
        }
    }

    fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_envelope() {
        let xml = serialize_response("DeleteVpc", &body(json!({"return": true})), "req-1");
        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<DeleteVpcResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">"#,
                "<requestId>req-1</requestId><return>true</return>",
                "</DeleteVpcResponse>"
            )
        );
    }

    #[test]
    fn test_scalars_and_null() {
        let xml = serialize_response(
            "CreateCustomerGateway",
            &body(json!({"bgpAsn": 65000, "flag": false, "gone": null, "name": "cgw"})),
            "r",
        );
        assert!(xml.contains("<bgpAsn>65000</bgpAsn>"));
        assert!(xml.contains("<flag>false</flag>"));
        assert!(xml.contains("<name>cgw</name>"));
        assert!(!xml.contains("gone"));
    }

    #[test]
    fn test_sequences_and_mappings() {
        let xml = serialize_response(
            "DescribeVpcs",
            &body(json!({
                "vpcSet": [
                    {"vpcId": "vpc-1", "tagSet": [{"key": "env", "value": "prod"}]},
                    {"vpcId": "vpc-2"}
                ],
                "routeTableIdSet": ["rtb-1", "rtb-2"],
                "options": {"staticRoutesOnly": true},
                "emptySet": [],
                "emptyMap": {}
            })),
            "r",
        );
        assert!(xml.contains(concat!(
            "<vpcSet><item><vpcId>vpc-1</vpcId>",
            "<tagSet><item><key>env</key><value>prod</value></item></tagSet></item>",
            "<item><vpcId>vpc-2</vpcId></item></vpcSet>"
        )));
        assert!(xml.contains("<routeTableIdSet><item>rtb-1</item><item>rtb-2</item></routeTableIdSet>"));
        assert!(xml.contains("<options><staticRoutesOnly>true</staticRoutesOnly></options>"));
        assert!(xml.contains("<emptySet/>"));
        assert!(xml.contains("<emptyMap/>"));
    }

    #[test]
    fn test_preserves_field_order() {
        let xml = serialize_response("X", &body(json!({"zeta": "1", "alpha": "2"})), "r");
        let zeta = xml.find("<zeta>").unwrap();
        let alpha = xml.find("<alpha>").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_error_envelope() {
        let xml = serialize_error("InvalidAction", "The action Nope is not valid", "req-9");
        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                "<Response><Errors><Error><Code>InvalidAction</Code>",
                "<Message>The action Nope is not valid</Message></Error></Errors>",
                "<RequestID>req-9</RequestID></Response>"
            )
        );
    }

    #[test]
    fn test_escaping_round_trip() {
        let original = r#"<policy a="b" & 'c'>"#;
        let xml = serialize_response("X", &body(json!({"policyDocument": original})), "r");
        let start = xml.find("<policyDocument>").unwrap() + "<policyDocument>".len();
        let end = xml.find("</policyDocument>").unwrap();
        let text = &xml[start..end];
        assert!(!text.contains(['<', '>', '"', '\'']));
        assert_eq!(unescape(text), original);
        // the only markup left is the envelope and the element itself
        assert_eq!(xml.matches('<').count(), 7);
    }

    #[test]
    fn test_escape_borrows_clean_text() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape("a&b"), "a&amp;b");
    }

    #[test]
    fn test_error_message_is_escaped() {
        let xml = serialize_error("InvalidParameterValue", "bad <value>", "r");
        assert!(xml.contains("<Message>bad &lt;value&gt;</Message>"));
    }
}
