//! Recorded gateway events, one JSON object per line.

use anyhow::Context;
use votegate_types::GatewayEvent;

/// Parse a JSON-lines event log. Blank lines and lines starting with `#` are
/// skipped.
pub fn parse_events(text: &str) -> anyhow::Result<Vec<GatewayEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: invalid event", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use votegate_types::{AccountId, CommunityId, MessageId};

    #[test]
    fn parses_events_and_skips_comments() {
        let log = r#"
# a member joins, two people approve
{"type":"member_joined","community":1,"account":50}

{"type":"reaction_added","community":1,"message":1,"account":60,"symbol":"✅"}
{"type":"reaction_removed","community":1,"message":1,"account":60,"symbol":"✅"}
"#;
        let events = parse_events(log).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            GatewayEvent::MemberJoined {
                community: CommunityId::new(1),
                account: AccountId::new(50),
            }
        );
        let GatewayEvent::ReactionAdded(reaction) = &events[1] else {
            panic!("expected a reaction, got {:?}", events[1]);
        };
        assert_eq!(reaction.message, MessageId::new(1));
        assert_eq!(reaction.symbol, "✅");
        assert_eq!(events[2].kind(), "reaction_removed");
    }

    #[test]
    fn reports_the_failing_line() {
        let log = "{\"type\":\"member_joined\",\"community\":1,\"account\":2}\nnot json\n";
        let err = parse_events(log).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
