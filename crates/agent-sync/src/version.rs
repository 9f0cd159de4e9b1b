//! Pick the authoritative version of a remote agent.

use crate::model::RemoteAgentVersion;

/// Return the version with the greatest numeric ordinal, or `None` for an
/// empty list. Unparseable labels lose to every numeric one; among equal
/// ordinals the last entry wins.
pub fn select_latest(versions: &[RemoteAgentVersion]) -> Option<&RemoteAgentVersion> {
    versions.iter().max_by_key(|v| v.ordinal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(label: &str) -> RemoteAgentVersion {
        RemoteAgentVersion {
            version: label.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_yields_none() {
        assert!(select_latest(&[]).is_none());
    }

    #[test]
    fn numeric_not_lexicographic() {
        let versions = vec![v("9"), v("10"), v("2")];
        assert_eq!(select_latest(&versions).unwrap().version, "10");
    }

    #[test]
    fn unparseable_always_loses() {
        let versions = vec![v("latest"), v("0"), v("")];
        assert_eq!(select_latest(&versions).unwrap().version, "0");
        let only_bad = vec![v("draft")];
        assert_eq!(select_latest(&only_bad).unwrap().version, "draft");
    }

    proptest! {
        #[test]
        fn picks_max_parseable_ordinal(
            labels in prop::collection::vec(
                prop_oneof![
                    (0u64..10_000).prop_map(|n| n.to_string()),
                    "[a-z]{0,4}",
                ],
                0..20,
            )
        ) {
            let versions: Vec<_> = labels.iter().map(|l| v(l)).collect();
            let picked = select_latest(&versions);
            let best = labels.iter().filter_map(|l| l.parse::<u64>().ok()).max();
            match (picked, best) {
                (None, _) => prop_assert!(labels.is_empty()),
                (Some(p), Some(b)) => prop_assert_eq!(p.ordinal(), Some(b)),
                (Some(p), None) => prop_assert_eq!(p.ordinal(), None),
            }
        }
    }
}
