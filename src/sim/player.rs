//! Player kinematics
//!
//! The player always moves forward along its direction. Taps set a goal
//! direction; the direction turns toward it no faster than the turn rate,
//! then the player advances by `speed * dt`. Speed and turn rate step up as
//! the score grows.

use glam::Vec2;

use super::score::{ScoreBus, Subscription};
use super::shape::{Circle, PlayerShape};
use super::vector;
use crate::settings::GameConfig;

/// Straight up the screen
const START_DIRECTION: Vec2 = Vec2::new(0.0, -1.0);

/// Position, heading and speed of the player
#[derive(Debug)]
pub struct PlayerKinematics {
    radius: f32,
    base_speed: f32,
    max_speed: f32,
    base_turn_rate: f32,
    speed_step_points: u32,
    speed_step_rate: f32,

    /// Where the player sits on screen; also its start position
    screen_position: Vec2,
    position: Vec2,
    /// Unit length
    direction: Vec2,
    goal: Vec2,
    speed: f32,
    turn_rate: f32,

    subscription: Option<Subscription>,
}

impl PlayerKinematics {
    pub fn new(config: &GameConfig) -> Self {
        let screen_position = config.player_screen_position();
        Self {
            radius: config.player_radius,
            base_speed: config.base_speed,
            max_speed: config.max_speed,
            base_turn_rate: config.base_turn_rate,
            speed_step_points: config.speed_step_points.max(1),
            speed_step_rate: config.speed_step_rate,
            screen_position,
            position: screen_position,
            direction: START_DIRECTION,
            goal: START_DIRECTION,
            speed: config.base_speed,
            turn_rate: config.base_turn_rate,
            subscription: None,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn goal(&self) -> Vec2 {
        self.goal
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn turn_rate(&self) -> f32 {
        self.turn_rate
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn screen_position(&self) -> Vec2 {
        self.screen_position
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start listening for score changes
    pub fn attach(&mut self, bus: &mut ScoreBus) {
        if self.subscription.is_none() {
            self.subscription = Some(bus.subscribe());
        }
    }

    /// Stop listening for score changes
    pub fn detach(&mut self, bus: &mut ScoreBus) {
        if let Some(subscription) = self.subscription.take() {
            bus.unsubscribe(subscription.id);
        }
    }

    /// Turn toward the goal and move; returns the displacement
    pub fn integrate(&mut self, dt: f32) -> Vec2 {
        if let Some(score) = self.subscription.as_ref().and_then(Subscription::latest) {
            self.apply_score(score);
        }

        let max_rotation = self.turn_rate * dt;
        let rotation =
            vector::signed_angle_to(self.direction, self.goal).clamp(-max_rotation, max_rotation);
        self.direction = vector::normalize(vector::rotate(self.direction, rotation));

        let movement = vector::scale(self.direction, self.speed * dt);
        self.position = vector::add(self.position, movement);
        movement
    }

    /// Step speed and turn rate for a score
    ///
    /// Once speed reaches the cap neither value changes again until restart.
    pub fn apply_score(&mut self, score: u32) {
        if self.speed >= self.max_speed {
            return;
        }
        let factor = 1.0 + (score / self.speed_step_points) as f32 * self.speed_step_rate;
        self.speed = (self.base_speed * factor).min(self.max_speed);
        self.turn_rate = self.base_turn_rate * factor;
        log::debug!("Score {}: speed {:.1}, turn rate {:.3}", score, self.speed, self.turn_rate);
    }

    /// Aim at a screen-space tap
    ///
    /// Returns false, keeping the old goal, for a tap on the player's center.
    pub fn set_goal_from_tap(&mut self, tap: Vec2) -> bool {
        let goal = vector::normalize(vector::subtract(tap, self.screen_position));
        if goal == Vec2::ZERO {
            return false;
        }
        self.goal = goal;
        true
    }

    /// Signed vertical distance from the start, truncated toward zero
    pub fn travel_y(&self) -> i64 {
        (self.position.y - self.screen_position.y) as i64
    }

    pub fn shape(&self) -> PlayerShape {
        PlayerShape::Circle(Circle::new(self.position, self.radius))
    }

    /// Outline of the directional marker
    ///
    /// Center, then bottom-left, top-left, top-middle (the tip), top-right
    /// and bottom-right, relative to the current heading.
    pub fn drawing_vertices(&self) -> [Vec2; 6] {
        let diameter = self.radius * 2.0;
        let dir = self.direction;
        let left = vector::ccw_perpendicular(dir);

        let bottom_mid = self.position - dir * self.radius;
        let bottom_left = bottom_mid + left * self.radius;
        let top_left = bottom_left + dir * diameter;
        let top_mid = self.position + dir * diameter;
        let top_right = top_left - left * diameter;
        let bottom_right = top_right - dir * diameter;

        [
            self.position,
            bottom_left,
            top_left,
            top_mid,
            top_right,
            bottom_right,
        ]
    }

    /// Back to the start position and base speed; stays subscribed
    pub fn restart(&mut self) {
        if let Some(subscription) = &self.subscription {
            // Score events from the finished run
            subscription.latest();
        }
        self.position = self.screen_position;
        self.direction = START_DIRECTION;
        self.goal = START_DIRECTION;
        self.speed = self.base_speed;
        self.turn_rate = self.base_turn_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_3, FRAC_PI_6};

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    fn player() -> PlayerKinematics {
        PlayerKinematics::new(&GameConfig::default())
    }

    #[test]
    fn test_moves_straight_up_at_base_speed() {
        let mut player = player();
        assert_eq!(player.position(), Vec2::new(540.0, 1000.0));

        let movement = player.integrate(0.5);
        assert!(approx(movement, Vec2::new(0.0, -150.0)));
        assert!(approx(player.position(), Vec2::new(540.0, 850.0)));
        assert_eq!(player.travel_y(), -150);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let mut player = player();
        player.set_goal_from_tap(Vec2::new(2000.0, 1000.0));
        assert_eq!(player.integrate(0.0), Vec2::ZERO);
        assert_eq!(player.direction(), START_DIRECTION);
    }

    #[test]
    fn test_turn_is_rate_limited() {
        let mut player = player();
        assert!(player.set_goal_from_tap(Vec2::new(1540.0, 1000.0)));
        assert_eq!(player.goal(), Vec2::new(1.0, 0.0));

        // π/3 rad/s for half a second
        player.integrate(0.5);
        let expected = Vec2::new(FRAC_PI_6.sin(), -FRAC_PI_6.cos());
        assert!(approx(player.direction(), expected));
        assert!((player.direction().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_turn_stops_at_goal() {
        let mut player = player();
        player.set_goal_from_tap(Vec2::new(0.0, 1000.0));
        for _ in 0..10 {
            player.integrate(0.5);
        }
        assert!(approx(player.direction(), Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn test_tap_on_center_is_ignored() {
        let mut player = player();
        assert!(!player.set_goal_from_tap(Vec2::new(540.0, 1000.0)));
        assert_eq!(player.goal(), START_DIRECTION);
    }

    #[test]
    fn test_speed_ramp_steps_and_caps() {
        let mut player = player();
        player.apply_score(49);
        assert_eq!(player.speed(), 300.0);

        player.apply_score(50);
        assert!((player.speed() - 330.0).abs() < 1e-3);
        assert!((player.turn_rate() - FRAC_PI_3 * 1.1).abs() < 1e-5);

        player.apply_score(400);
        assert_eq!(player.speed(), 540.0);
        let frozen_turn = player.turn_rate();

        player.apply_score(1000);
        assert_eq!(player.speed(), 540.0);
        assert_eq!(player.turn_rate(), frozen_turn);
    }

    #[test]
    fn test_score_events_reach_player() {
        let mut bus = ScoreBus::new();
        let mut player = player();
        player.attach(&mut bus);
        player.attach(&mut bus);
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(100);
        player.integrate(0.0);
        assert!((player.speed() - 360.0).abs() < 1e-3);

        player.detach(&mut bus);
        assert!(!player.is_attached());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_restart_resets_and_drops_old_events() {
        let mut bus = ScoreBus::new();
        let mut player = player();
        player.attach(&mut bus);
        player.set_goal_from_tap(Vec2::new(0.0, 0.0));
        player.integrate(1.0);
        bus.publish(200);

        player.restart();
        player.integrate(0.0);
        assert_eq!(player.position(), Vec2::new(540.0, 1000.0));
        assert_eq!(player.direction(), START_DIRECTION);
        assert_eq!(player.goal(), START_DIRECTION);
        assert_eq!(player.speed(), 300.0);
        assert!(player.is_attached());
    }

    #[test]
    fn test_drawing_vertices_facing_up() {
        let player = player();
        let v = player.drawing_vertices();
        assert_eq!(v[0], Vec2::new(540.0, 1000.0));
        assert_eq!(v[1], Vec2::new(524.0, 1016.0));
        assert_eq!(v[2], Vec2::new(524.0, 984.0));
        assert_eq!(v[3], Vec2::new(540.0, 968.0));
        assert_eq!(v[4], Vec2::new(556.0, 984.0));
        assert_eq!(v[5], Vec2::new(556.0, 1016.0));
    }

    #[test]
    fn test_shape_is_circle_at_position() {
        let mut player = player();
        player.integrate(0.1);
        match player.shape() {
            PlayerShape::Circle(circle) => {
                assert_eq!(circle.center, player.position());
                assert_eq!(circle.radius, 16.0);
            }
            PlayerShape::Rect(_) => panic!("player collides as a circle"),
        }
    }
}
