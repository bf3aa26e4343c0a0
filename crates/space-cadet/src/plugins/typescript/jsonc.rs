//! JSON-with-comments support for tsconfig files
//!
//! tsconfig files routinely carry `//` and `/* */` comments and trailing
//! commas. They are removed here so `serde_json` can take over. Line breaks
//! inside comments are kept so error positions still point at the right line.

/// Strip comments and trailing commas from a JSONC document
pub fn strip_jsonc(input: &str) -> String {
    let without_comments = strip_comments(input.trim_start_matches('\u{feff}'));
    strip_trailing_commas(&without_comments)
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    #[test]
    fn test_line_and_block_comments() {
        let input = r#"{
            // compiler settings
            "compilerOptions": { /* strict */ "strict": true },
            "include": ["src"] /* trailing
            block */
        }"#;
        let value: Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value, json!({"compilerOptions": {"strict": true}, "include": ["src"]}));
    }

    #[test]
    fn test_trailing_commas() {
        let input = r#"{"include": ["src", "lib",], "exclude": [],}"#;
        let value: Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value, json!({"include": ["src", "lib"], "exclude": []}));
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let input = r#"{"url": "http://example.com/*x*/", "glob": "src/**/*.ts", "q": "a\"//b,]"}"#;
        let value: Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value["url"], "http://example.com/*x*/");
        assert_eq!(value["glob"], "src/**/*.ts");
        assert_eq!(value["q"], "a\"//b,]");
    }

    #[test]
    fn test_block_comment_keeps_line_numbers() {
        let input = "{\n/* one\ntwo */\n\"a\": }";
        let err = serde_json::from_str::<Value>(&strip_jsonc(input)).unwrap_err();
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn test_byte_order_mark() {
        let value: Value = serde_json::from_str(&strip_jsonc("\u{feff}{\"a\": 1}")).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            ".*".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map(".*", inner, 0..6)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn plain_json_is_unchanged_in_meaning(value in json_value()) {
            let compact = serde_json::to_string(&value).unwrap();
            let pretty = serde_json::to_string_pretty(&value).unwrap();
            prop_assert_eq!(&serde_json::from_str::<Value>(&strip_jsonc(&compact)).unwrap(), &value);
            prop_assert_eq!(&serde_json::from_str::<Value>(&strip_jsonc(&pretty)).unwrap(), &value);
        }
    }
}
