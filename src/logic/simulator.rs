//! Match simulator: one pong game between two named players.
//!
//! `PongSimulator` runs headless with two CPU paddles on a fixed tick. Physics is
//! deliberately simple: wall bounce, paddle hits that speed the ball up to a cap and
//! deflect it by where it struck, and one side scoring per point.

use crate::models::{GameOptions, Theme};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Everything the game needs to start one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub player1: String,
    pub player2: String,
    pub theme: Theme,
    pub score_bonus_enabled: bool,
    pub winning_score: u32,
}

impl MatchConfig {
    pub fn new(player1: impl Into<String>, player2: impl Into<String>, options: &GameOptions) -> Self {
        Self {
            player1: player1.into(),
            player2: player2.into(),
            theme: options.theme,
            score_bonus_enabled: options.score_bonus_enabled,
            winning_score: options.winning_score.max(1),
        }
    }
}

/// Final score of a match. Exactly one side reached the winning score.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score1: u32,
    pub score2: u32,
    pub winner: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SimulatorError {
    /// No point was decided within the tick budget.
    Stalled { ticks: u64 },
    /// The configuration cannot be played.
    InvalidConfig(String),
}

impl std::fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulatorError::Stalled { ticks } => write!(f, "Game stalled after {} ticks", ticks),
            SimulatorError::InvalidConfig(reason) => write!(f, "Invalid game configuration: {}", reason),
        }
    }
}

impl std::error::Error for SimulatorError {}

/// Runs one match to completion.
pub trait MatchSimulator {
    fn run(&mut self, config: &MatchConfig) -> Result<MatchResult, SimulatorError>;
}

/// Field and physics constants (pixels, per tick).
const FIELD_WIDTH: f32 = 800.0;
const FIELD_HEIGHT: f32 = 400.0;
const PADDLE_HEIGHT: f32 = 80.0;
const PADDLE_WIDTH: f32 = 10.0;
const PADDLE_MARGIN: f32 = 20.0;
const PADDLE_SPEED: f32 = 6.0;
const BALL_SIZE: f32 = 10.0;
const SERVE_SPEED: f32 = 5.0;
const SPEEDUP: f32 = 1.08;
const MAX_BALL_SPEED: f32 = 14.0;
const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

/// Paddle hits in one rally after which a point counts double (when enabled).
pub const BONUS_RALLY_HITS: u32 = 6;
/// Hard cap on ticks per match.
pub const MAX_TICKS: u64 = 1_000_000;

#[derive(Clone, Copy, Debug)]
struct Ball {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

impl Ball {
    fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }
}

#[derive(Clone, Copy, Debug)]
struct Paddle {
    /// Top edge.
    y: f32,
    /// Offset from paddle centre the CPU aims at; rerolled on every hit.
    aim: f32,
    /// Shrinks over a long rally so rallies always end.
    speed: f32,
}

impl Paddle {
    fn new() -> Self {
        Self {
            y: (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0,
            aim: 0.0,
            speed: PADDLE_SPEED,
        }
    }

    fn centre(&self) -> f32 {
        self.y + PADDLE_HEIGHT / 2.0
    }

    fn track(&mut self, target_y: f32) {
        let delta = (target_y + self.aim - self.centre()).clamp(-self.speed, self.speed);
        self.y = (self.y + delta).clamp(0.0, FIELD_HEIGHT - PADDLE_HEIGHT);
    }

    fn covers(&self, y: f32) -> bool {
        y + BALL_SIZE >= self.y && y <= self.y + PADDLE_HEIGHT
    }
}

/// Headless CPU-vs-CPU pong.
#[derive(Debug)]
pub struct PongSimulator {
    rng: StdRng,
    max_ticks: u64,
}

impl Default for PongSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl PongSimulator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_ticks: MAX_TICKS,
        }
    }

    /// Reproducible simulator for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_ticks: MAX_TICKS,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    fn serve(&mut self, towards_right: bool) -> Ball {
        let angle = self.rng.gen_range(-0.4f32..0.4);
        let dir = if towards_right { 1.0 } else { -1.0 };
        Ball {
            x: (FIELD_WIDTH - BALL_SIZE) / 2.0,
            y: self.rng.gen_range(FIELD_HEIGHT * 0.25..FIELD_HEIGHT * 0.75),
            vx: dir * SERVE_SPEED * angle.cos(),
            vy: SERVE_SPEED * angle.sin(),
        }
    }

    /// Bounce off a paddle: deflect by hit offset and speed up to the cap.
    fn return_hit(&mut self, ball: &mut Ball, paddle: &Paddle, towards_right: bool) {
        let offset = ((ball.y + BALL_SIZE / 2.0 - paddle.centre()) / (PADDLE_HEIGHT / 2.0))
            .clamp(-1.0, 1.0);
        let jitter = self.rng.gen_range(-0.15f32..0.15);
        let angle =
            (offset * MAX_BOUNCE_ANGLE + jitter).clamp(-MAX_BOUNCE_ANGLE, MAX_BOUNCE_ANGLE);
        let speed = (ball.speed() * SPEEDUP).min(MAX_BALL_SPEED);
        let dir = if towards_right { 1.0 } else { -1.0 };
        ball.vx = dir * speed * angle.cos();
        ball.vy = speed * angle.sin();
    }

    /// Where the receiving CPU aims relative to its centre; widens as the rally goes on.
    fn aim_error(&mut self, rally: u32) -> f32 {
        let spread = PADDLE_HEIGHT * (0.3 + 0.05 * rally as f32);
        self.rng.gen_range(-spread..spread)
    }
}

impl MatchSimulator for PongSimulator {
    fn run(&mut self, config: &MatchConfig) -> Result<MatchResult, SimulatorError> {
        if config.winning_score == 0 {
            return Err(SimulatorError::InvalidConfig("winning score must be positive".into()));
        }
        if config.player1 == config.player2 {
            return Err(SimulatorError::InvalidConfig("a player cannot face themselves".into()));
        }

        let target = config.winning_score;
        let (mut score1, mut score2) = (0u32, 0u32);
        let mut left = Paddle::new();
        let mut right = Paddle::new();
        let first_serve_right = self.rng.gen_bool(0.5);
        let mut ball = self.serve(first_serve_right);
        let mut rally = 0u32;
        let mut ticks = 0u64;

        while score1 < target && score2 < target {
            ticks += 1;
            if ticks > self.max_ticks {
                log::warn!(
                    "{} vs {} stalled at {}-{} after {} ticks",
                    config.player1,
                    config.player2,
                    score1,
                    score2,
                    self.max_ticks
                );
                return Err(SimulatorError::Stalled { ticks: self.max_ticks });
            }

            let ball_centre = ball.y + BALL_SIZE / 2.0;
            if ball.vx < 0.0 {
                left.track(ball_centre);
            } else {
                right.track(ball_centre);
            }

            ball.x += ball.vx;
            ball.y += ball.vy;
            if ball.y <= 0.0 {
                ball.y = -ball.y;
                ball.vy = ball.vy.abs();
            } else if ball.y + BALL_SIZE >= FIELD_HEIGHT {
                ball.y = 2.0 * (FIELD_HEIGHT - BALL_SIZE) - ball.y;
                ball.vy = -ball.vy.abs();
            }

            let left_face = PADDLE_MARGIN + PADDLE_WIDTH;
            let right_face = FIELD_WIDTH - PADDLE_MARGIN - PADDLE_WIDTH;

            if ball.vx < 0.0
                && ball.x <= left_face
                && ball.x >= PADDLE_MARGIN - BALL_SIZE
                && left.covers(ball.y)
            {
                ball.x = left_face;
                rally += 1;
                self.return_hit(&mut ball, &left, true);
                left.speed *= 0.97;
                right.aim = self.aim_error(rally);
            } else if ball.vx > 0.0
                && ball.x + BALL_SIZE >= right_face
                && ball.x + BALL_SIZE <= FIELD_WIDTH - PADDLE_MARGIN + BALL_SIZE
                && right.covers(ball.y)
            {
                ball.x = right_face - BALL_SIZE;
                rally += 1;
                self.return_hit(&mut ball, &right, false);
                right.speed *= 0.97;
                left.aim = self.aim_error(rally);
            }

            let scorer = if ball.x + BALL_SIZE < 0.0 {
                Some(false)
            } else if ball.x > FIELD_WIDTH {
                Some(true)
            } else {
                None
            };

            if let Some(left_scored) = scorer {
                let gain = if config.score_bonus_enabled && rally >= BONUS_RALLY_HITS {
                    2
                } else {
                    1
                };
                if left_scored {
                    score1 = (score1 + gain).min(target);
                } else {
                    score2 = (score2 + gain).min(target);
                }
                log::debug!(
                    "{} {}-{} {} (rally {})",
                    config.player1,
                    score1,
                    score2,
                    config.player2,
                    rally
                );
                rally = 0;
                left = Paddle::new();
                right = Paddle::new();
                // Loser of the point receives the serve.
                ball = self.serve(left_scored);
            }
        }

        let winner = if score1 >= target {
            config.player1.clone()
        } else {
            config.player2.clone()
        };
        Ok(MatchResult {
            score1,
            score2,
            winner,
        })
    }
}
