// MIT License
// Topic interest matching

//! Broker-independent topic matching and subscription lifecycle.
//!
//! The MQTT client itself is the bridge binary's concern; this module only
//! decides which messages a consumer cares about and announces the
//! subscribe/unsubscribe moments so the client can mirror them to the
//! broker.

use tokio::sync::mpsc;
use tracing::debug;

/// A message as seen on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Test a concrete topic against a subscription pattern.
///
/// Segments are `/`-separated and compared left to right: a literal segment
/// must match exactly, `#` matches everything from here on, and `+` matches
/// exactly one segment. The pattern qualifies only when every subject
/// segment was consumed and no pattern segments are left over.
pub fn topic_qualifier(subject: &str, pattern: &str) -> bool {
    let qualifiers: Vec<&str> = pattern.split('/').collect();
    let actuals: Vec<&str> = subject.split('/').collect();
    for (i, actual) in actuals.iter().enumerate() {
        let Some(qualifier) = qualifiers.get(i) else {
            // remaining subject segments cannot qualify
            return false;
        };
        match *qualifier {
            "#" => return true,
            "+" => continue,
            q if q == *actual => continue,
            _ => return false,
        }
    }
    // leftover pattern segments are unmet
    actuals.len() == qualifiers.len()
}

/// Announcement channel for subscription lifecycle changes. Each value is
/// the full pattern set being subscribed or unsubscribed.
pub type TopicAnnouncer = mpsc::UnboundedSender<Vec<String>>;

/// A consumer's interest in a set of topic patterns.
///
/// Announces its pattern set on the subscribe sink exactly once when
/// attached, and on the unsubscribe sink exactly once when detached or
/// dropped, however many patterns the set holds. An optional observer
/// installed with [`observe`](Self::observe) sees every message offered,
/// qualifying or not, without affecting the filter verdict.
pub struct TopicInterest {
    patterns: Vec<String>,
    observer: Option<Box<dyn Fn(&BusMessage) + Send>>,
    unsub: TopicAnnouncer,
    detached: bool,
}

impl TopicInterest {
    pub fn attach(
        patterns: impl IntoIterator<Item = impl Into<String>>,
        sub: &TopicAnnouncer,
        unsub: TopicAnnouncer,
    ) -> Self {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        debug!(count = patterns.len(), "announcing topic interest");
        let _ = sub.send(patterns.clone());
        Self {
            patterns,
            observer: None,
            unsub,
            detached: false,
        }
    }

    /// Install a pass-through observer invoked for every message offered to
    /// [`accept`](Self::accept), regardless of qualification.
    pub fn observe(mut self, observer: impl Fn(&BusMessage) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Whether a message falls under any of the attached patterns.
    pub fn accept(&self, msg: &BusMessage) -> bool {
        if let Some(observer) = &self.observer {
            observer(msg);
        }
        self.patterns
            .iter()
            .any(|pattern| topic_qualifier(&msg.topic, pattern))
    }

    /// End the interest, announcing the unsubscribe now rather than at drop.
    pub fn detach(mut self) {
        self.announce_detach();
    }

    fn announce_detach(&mut self) {
        if !self.detached {
            self.detached = true;
            let _ = self.unsub.send(self.patterns.clone());
        }
    }
}

impl Drop for TopicInterest {
    fn drop(&mut self) {
        self.announce_detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifier_literal() {
        assert!(topic_qualifier("a/b/c", "a/b/c"));
        assert!(!topic_qualifier("a/b/c", "a/b/c/d"));
        assert!(!topic_qualifier("a/b/c", "a/b"));
        assert!(!topic_qualifier("a/b/c", "x/b/c"));
        assert!(!topic_qualifier("a/b/c", "a/x/c"));
        assert!(!topic_qualifier("a/b/c", "a/b/x"));
    }

    #[test]
    fn test_qualifier_single_level_wildcard() {
        assert!(topic_qualifier("a/b/c", "a/+/c"));
        assert!(topic_qualifier("a/b/c", "a/+/+"));
        assert!(topic_qualifier("a/b/c", "+/b/c"));
        assert!(!topic_qualifier("a/b", "a/+/+"));
        assert!(!topic_qualifier("a/b", "+/b/c"));
        assert!(!topic_qualifier("a/b/c/d", "a/+/+"));
        assert!(topic_qualifier("a/b/c/d", "a/+/+/d"));
        assert!(topic_qualifier("a/b/c/d", "a/+/c/+"));
        assert!(!topic_qualifier("a/b/c", "a/+/+/d"));
        assert!(!topic_qualifier("a/b/c/d/e", "a/+/+/d"));
    }

    #[test]
    fn test_qualifier_wildcard_needs_following_match() {
        // + never matches past a later literal mismatch
        assert!(!topic_qualifier("a/b/x", "a/+/y"));
    }

    #[test]
    fn test_qualifier_multi_level_wildcard() {
        assert!(topic_qualifier("a/b/c", "a/b/#"));
        assert!(topic_qualifier("a/b/c", "a/#"));
        assert!(topic_qualifier("a/b/c", "#"));
        assert!(topic_qualifier("a/b/c", "+/b/#"));
        assert!(topic_qualifier("a/b/c/d", "+/b/#"));
        assert!(topic_qualifier("a/b/c/d", "a/+/+/#"));
        assert!(topic_qualifier("a/b/c/d/e", "a/+/+/#"));
        assert!(topic_qualifier("a/b/c/d/e", "a/+/+/d/#"));
        assert!(topic_qualifier("a/b/c/d/e/f", "a/+/+/d/#"));
    }

    fn channels() -> (
        TopicAnnouncer,
        mpsc::UnboundedReceiver<Vec<String>>,
        TopicAnnouncer,
        mpsc::UnboundedReceiver<Vec<String>>,
    ) {
        let (sub_tx, sub_rx) = mpsc::unbounded_channel();
        let (unsub_tx, unsub_rx) = mpsc::unbounded_channel();
        (sub_tx, sub_rx, unsub_tx, unsub_rx)
    }

    #[test]
    fn test_interest_announces_once_on_attach() {
        let (sub_tx, mut sub_rx, unsub_tx, _unsub_rx) = channels();
        let _interest = TopicInterest::attach(["a/b/7", "a/b/3"], &sub_tx, unsub_tx);
        assert_eq!(
            sub_rx.try_recv().unwrap(),
            vec!["a/b/7".to_string(), "a/b/3".to_string()]
        );
        assert!(sub_rx.try_recv().is_err());
    }

    #[test]
    fn test_interest_filters_messages() {
        let (sub_tx, _sub_rx, unsub_tx, _unsub_rx) = channels();
        let interest = TopicInterest::attach(["a/b/7", "a/b/3"], &sub_tx, unsub_tx);
        let accepted: Vec<u32> = (0..9)
            .filter(|i| interest.accept(&BusMessage::new(format!("a/b/{}", i), b"x".to_vec())))
            .collect();
        assert_eq!(accepted, vec![3, 7]);
    }

    #[test]
    fn test_interest_observer_sees_every_message() {
        let (sub_tx, _sub_rx, unsub_tx, _unsub_rx) = channels();
        let (seen_tx, seen_rx) = std::sync::mpsc::channel();
        let interest = TopicInterest::attach(["a/b/7", "a/b/3"], &sub_tx, unsub_tx)
            .observe(move |msg: &BusMessage| {
                let _ = seen_tx.send(msg.topic.clone());
            });

        // non-qualifying messages are still observed, just not accepted
        assert!(!interest.accept(&BusMessage::new("a/b/2", b"x".to_vec())));
        assert!(interest.accept(&BusMessage::new("a/b/3", b"x".to_vec())));
        assert!(!interest.accept(&BusMessage::new("a/b/4", b"x".to_vec())));

        let seen: Vec<String> = seen_rx.try_iter().collect();
        assert_eq!(seen, vec!["a/b/2", "a/b/3", "a/b/4"]);
    }

    #[test]
    fn test_interest_unsubscribes_once_on_detach() {
        let (sub_tx, _sub_rx, unsub_tx, mut unsub_rx) = channels();
        let interest = TopicInterest::attach(["a/b/7", "a/b/3"], &sub_tx, unsub_tx);
        assert!(unsub_rx.try_recv().is_err());
        interest.detach();
        assert_eq!(unsub_rx.try_recv().unwrap().len(), 2);
        assert!(unsub_rx.try_recv().is_err());
    }

    #[test]
    fn test_interest_unsubscribes_on_drop() {
        let (sub_tx, _sub_rx, unsub_tx, mut unsub_rx) = channels();
        {
            let _interest = TopicInterest::attach(["cmd/#"], &sub_tx, unsub_tx);
        }
        assert_eq!(unsub_rx.try_recv().unwrap(), vec!["cmd/#".to_string()]);
    }
}
