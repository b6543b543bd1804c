//! Notices: the protocol between workers and the controller.
//!
//! A notice means "something changed, re-read the state", never "here is the
//! new value". FIFO pop order is the only ordering guarantee between workers,
//! so the controller must re-read current shared state for every redraw.

/// A completed-update notification from a worker.
///
/// Sent over a bounded, blocking channel, always after the sender has
/// released the state lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The human paddle moved (key or pointer).
    KeyboardMoved,
    /// The AI paddle moved.
    AiMoved,
    /// The ball advanced one step.
    BallMoved,
    /// The round ended, or a blocked consumer must wake. Carries no redraw
    /// semantics.
    RoundQuit,
}

impl Notice {
    /// Fixed-width wire tag: four distinct, distinguishable 4-byte tokens.
    pub const fn tag(self) -> &'static [u8; 4] {
        match self {
            Self::KeyboardMoved => b"KBD ",
            Self::AiMoved => b"AI  ",
            Self::BallMoved => b"BALL",
            Self::RoundQuit => b"QUIT",
        }
    }

    /// Decode a wire tag.
    pub fn from_tag(tag: &[u8; 4]) -> Option<Self> {
        match tag {
            b"KBD " => Some(Self::KeyboardMoved),
            b"AI  " => Some(Self::AiMoved),
            b"BALL" => Some(Self::BallMoved),
            b"QUIT" => Some(Self::RoundQuit),
            _ => None,
        }
    }

    /// Tag as a displayable token for log lines.
    pub fn label(self) -> &'static str {
        // Tags are fixed ASCII; the unwrap cannot fire.
        std::str::from_utf8(self.tag()).unwrap_or("????")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Notice; 4] = [
        Notice::KeyboardMoved,
        Notice::AiMoved,
        Notice::BallMoved,
        Notice::RoundQuit,
    ];

    #[test]
    fn test_tags_are_fixed_width_and_distinct() {
        for (i, a) in ALL.iter().enumerate() {
            assert_eq!(a.tag().len(), 4);
            for b in &ALL[i + 1..] {
                assert_ne!(a.tag(), b.tag());
            }
        }
    }

    #[test]
    fn test_tag_roundtrip() {
        for notice in ALL {
            assert_eq!(Notice::from_tag(notice.tag()), Some(notice));
        }
        assert_eq!(Notice::from_tag(b"ZZZZ"), None);
    }

    #[test]
    fn test_channel_preserves_fifo_order() {
        let (tx, rx) = crossbeam_channel::bounded(8);
        for notice in ALL {
            tx.send(notice).unwrap();
        }
        for notice in ALL {
            assert_eq!(rx.recv().unwrap(), notice);
        }
    }
}
