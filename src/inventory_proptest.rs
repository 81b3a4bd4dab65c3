//! Property-based tests for inventory localization.

#[cfg(test)]
mod proptest_tests {
    use crate::inventory::{localize_flat, localize_structured};
    use proptest::prelude::*;
    use serde_yaml::{Mapping, Value};

    fn attribute() -> impl Strategy<Value = (String, String)> {
        ("[a-z][a-z_]{0,7}", "[a-zA-Z0-9./-]{1,8}")
            .prop_filter("not the connection attribute", |(k, _)| k != "ansible_connection")
    }

    fn host_line() -> impl Strategy<Value = (String, Vec<(String, String)>, Option<String>)> {
        (
            "[a-z][a-z0-9-]{0,10}",
            prop::collection::vec(attribute(), 0..4),
            prop::option::of("[a-z]{1,6}"),
        )
    }

    fn render((host, attrs, connection): &(String, Vec<(String, String)>, Option<String>)) -> String {
        let mut line = host.clone();
        for (k, v) in attrs {
            line.push_str(&format!(" {}={}", k, v));
        }
        if let Some(c) = connection {
            line.push_str(&format!(" ansible_connection={}", c));
        }
        line
    }

    fn leaf_group(depth: u32) -> impl Strategy<Value = Value> {
        let hosts = prop::collection::btree_map(
            "[a-z]{1,6}",
            prop::option::of(prop::collection::btree_map("[a-z_]{1,6}", "[a-z0-9]{1,6}", 0..3)),
            0..4,
        )
        .prop_map(|hosts| {
            let mut map = Mapping::new();
            for (host, vars) in hosts {
                let vars = vars
                    .map(|vars| {
                        Value::Mapping(
                            vars.into_iter()
                                .map(|(k, v)| (Value::from(k), Value::from(v)))
                                .collect(),
                        )
                    })
                    .unwrap_or(Value::Null);
                map.insert(Value::from(host), vars);
            }
            let mut group = Mapping::new();
            group.insert(Value::from("hosts"), Value::Mapping(map));
            Value::Mapping(group)
        });

        hosts.prop_recursive(depth, 32, 3, |inner| {
            prop::collection::btree_map("[a-z]{1,6}", inner, 1..3).prop_map(|children| {
                let mut group = Mapping::new();
                group.insert(
                    Value::from("children"),
                    Value::Mapping(
                        children
                            .into_iter()
                            .map(|(name, g)| (Value::from(name), g))
                            .collect(),
                    ),
                );
                Value::Mapping(group)
            })
        })
    }

    fn every_host_is_local(groups: &Value) -> bool {
        let Value::Mapping(groups) = groups else {
            return true;
        };
        groups.values().all(|group| {
            let hosts_ok = match group.get("hosts") {
                Some(Value::Mapping(hosts)) => hosts.values().all(|vars| {
                    vars.get("ansible_connection") == Some(&Value::from("local"))
                }),
                _ => true,
            };
            let children_ok = group.get("children").map(every_host_is_local).unwrap_or(true);
            hosts_ok && children_ok
        })
    }

    proptest! {
        /// Every host line ends up with exactly one local connection attribute
        /// and keeps all of its other attributes in order.
        #[test]
        fn flat_host_lines_get_one_local_connection(lines in prop::collection::vec(host_line(), 1..6)) {
            let mut input = String::from("[servers]\n");
            for line in &lines {
                input.push_str(&render(line));
                input.push('\n');
            }

            let output = localize_flat(&input);
            let out_lines: Vec<&str> = output.lines().skip(1).collect();
            prop_assert_eq!(out_lines.len(), lines.len());

            for ((host, attrs, _), out) in lines.iter().zip(out_lines) {
                let tokens: Vec<&str> = out.split_whitespace().collect();
                prop_assert_eq!(tokens[0], host.as_str());
                prop_assert_eq!(
                    tokens.iter().filter(|t| t.starts_with("ansible_connection=")).count(),
                    1
                );
                prop_assert!(tokens.contains(&"ansible_connection=local"));

                let others: Vec<String> = tokens[1..]
                    .iter()
                    .filter(|t| !t.starts_with("ansible_connection="))
                    .map(|t| t.to_string())
                    .collect();
                let expected: Vec<String> = attrs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                prop_assert_eq!(others, expected);
            }
        }

        /// Localizing flat text twice gives the same result as once.
        #[test]
        fn flat_localization_is_idempotent(lines in prop::collection::vec(host_line(), 0..6)) {
            let mut input = String::from("[servers]\n");
            for line in &lines {
                input.push_str(&render(line));
                input.push('\n');
            }
            let once = localize_flat(&input);
            prop_assert_eq!(localize_flat(&once), once);
        }

        /// Every host at any depth is forced local.
        #[test]
        fn structured_hosts_are_all_local(tree in prop::collection::btree_map("[a-z]{1,6}", leaf_group(3), 1..3)) {
            let input = Value::Mapping(
                tree.into_iter().map(|(k, v)| (Value::from(k), v)).collect(),
            );
            let output = localize_structured(&input);
            prop_assert!(every_host_is_local(&output));
        }
    }
}
