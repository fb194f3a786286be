//! Score bookkeeping and score broadcast
//!
//! The score is the furthest vertical distance reached from the start,
//! counted in `score_increase_dist` steps. It never goes down.
//!
//! Other components learn about score changes through a [`ScoreBus`] owned by
//! the game state. Subscribing hands back a [`Subscription`] holding the
//! receiving end of a channel; the subscriber drains it on its own schedule
//! and gives the id back to unsubscribe.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Identity of one bus subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving side of a bus subscription
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: Receiver<u32>,
}

impl Subscription {
    /// Most recent score published since the last drain, if any
    pub fn latest(&self) -> Option<u32> {
        self.events.try_iter().last()
    }
}

/// Fan-out of score changes to explicit subscribers
#[derive(Debug, Default)]
pub struct ScoreBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<u32>)>,
}

impl ScoreBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let (tx, rx) = unbounded();
        self.subscribers.push((id, tx));
        Subscription { id, events: rx }
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Send a score to every subscriber, dropping ones whose receiver is gone
    pub fn publish(&mut self, score: u32) {
        self.subscribers.retain(|(id, tx)| {
            let alive = tx.send(score).is_ok();
            if !alive {
                log::debug!("Dropping disconnected score subscriber {:?}", id);
            }
            alive
        });
    }
}

/// Monotonic distance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTracker {
    score: u32,
    increase_dist: f32,
}

impl ScoreTracker {
    pub fn new(increase_dist: f32) -> Self {
        Self {
            score: 0,
            increase_dist,
        }
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Score for a signed travel distance, publishing on increase
    ///
    /// Returns the new score if it went up.
    pub fn update(&mut self, travel: i64, bus: &mut ScoreBus) -> Option<u32> {
        let reached = (travel.unsigned_abs() as f64 / self.increase_dist as f64).floor() as u32;
        if reached <= self.score {
            return None;
        }
        self.score = reached;
        bus.publish(reached);
        Some(reached)
    }

    pub fn restart(&mut self) {
        self.score = 0;
    }
}
