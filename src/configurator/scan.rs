//! Scalar argument scanning.

use std::str::FromStr;
use std::time::Duration;

use crate::config::ConfigNode;
use crate::configurator::error::ConfigureError;

/// Tokens accepted by on/off directives, in index order.
pub const OFF_ON: &[&str] = &["OFF", "ON"];

/// The node's scalar token. Handlers only see scalar nodes once the
/// dispatcher has checked the argument shape, but a caller using the
/// scanner directly gets a proper error.
pub fn scalar<'a>(name: &str, node: &'a ConfigNode) -> Result<&'a str, ConfigureError> {
    node.as_scalar().ok_or_else(|| ConfigureError::ExpectedScalar {
        name: name.to_string(),
        found: node.kind(),
        location: node.location.clone(),
    })
}

/// Parse the node's token as `T`.
pub fn parse_scalar<T: FromStr>(
    name: &str,
    node: &ConfigNode,
    expected: &'static str,
) -> Result<T, ConfigureError> {
    let token = scalar(name, node)?;
    token.trim().parse().map_err(|_| ConfigureError::ScalarFormat {
        value: token.to_string(),
        expected,
        location: node.location.clone(),
    })
}

/// Parse a non-negative number of milliseconds.
pub fn parse_millis(name: &str, node: &ConfigNode) -> Result<Duration, ConfigureError> {
    parse_scalar::<u64>(name, node, "a non-negative integer (milliseconds)").map(Duration::from_millis)
}

/// Index of the node's token within `choices`. Matching is exact.
pub fn one_of(name: &str, node: &ConfigNode, choices: &[&str]) -> Result<usize, ConfigureError> {
    let token = scalar(name, node)?;
    choices
        .iter()
        .position(|choice| *choice == token)
        .ok_or_else(|| ConfigureError::InvalidEnumChoice {
            value: token.to_string(),
            allowed: choices.join(", "),
            location: node.location.clone(),
        })
}

/// Shorthand for an `OFF`/`ON` flag.
pub fn on_off(name: &str, node: &ConfigNode) -> Result<bool, ConfigureError> {
    one_of(name, node, OFF_ON).map(|i| i == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceLocation;

    fn node(token: &str) -> ConfigNode {
        ConfigNode::scalar(SourceLocation::root(None).child("x"), token)
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("x", &node("1500")).unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_millis("x", &node(" 0 ")).unwrap(), Duration::ZERO);

        let err = parse_millis("x", &node("-1")).unwrap_err();
        assert!(matches!(err, ConfigureError::ScalarFormat { .. }));
        let err = parse_millis("x", &node("5s")).unwrap_err();
        assert!(err.to_string().contains("milliseconds"));
    }

    #[test]
    fn test_one_of() {
        assert_eq!(one_of("x", &node("ON"), OFF_ON).unwrap(), 1);
        assert_eq!(one_of("x", &node("OFF"), OFF_ON).unwrap(), 0);

        match one_of("x", &node("on"), OFF_ON).unwrap_err() {
            ConfigureError::InvalidEnumChoice { value, allowed, .. } => {
                assert_eq!(value, "on");
                assert_eq!(allowed, "OFF, ON");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_on_off() {
        assert!(on_off("x", &node("ON")).unwrap());
        assert!(!on_off("x", &node("OFF")).unwrap());
    }

    #[test]
    fn test_non_scalar_node() {
        let mapping = ConfigNode::mapping(SourceLocation::root(None), Vec::new());
        let err = parse_millis("proxy.timeout.io", &mapping).unwrap_err();
        assert!(matches!(err, ConfigureError::ExpectedScalar { found: "mapping", .. }));
    }
}
