//! User generation.

use fake::{
    Fake,
    faker::name::en::{FirstName, LastName},
};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use runs::models::User;

/// Generated user plus the athlete profile fields.
#[derive(Debug, Clone)]
pub struct GeneratedUser {
    pub user: User,
    /// Kilograms, athletes only.
    pub weight: Option<i32>,
    pub goals: Option<String>,
}

/// Configuration for user generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    pub weight_mean: f64,
    pub weight_std: f64,
    /// Probability that an athlete fills in their profile.
    pub profile_fill_rate: f64,
    pub goals: Vec<String>,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            weight_mean: 70.0,
            weight_std: 12.0,
            profile_fill_rate: 0.7,
            goals: vec![
                "Run a half marathon".to_string(),
                "5 km under 25 minutes".to_string(),
                "Run three times a week".to_string(),
                "Lose 5 kg before summer".to_string(),
            ],
        }
    }
}

/// Generates athletes and coaches.
pub struct UserGenerator {
    config: UserGenConfig,
}

impl UserGenerator {
    pub fn new() -> Self {
        Self {
            config: UserGenConfig::default(),
        }
    }

    pub fn with_config(config: UserGenConfig) -> Self {
        Self { config }
    }

    pub fn athlete(&self, rng: &mut impl Rng) -> GeneratedUser {
        let user = self.user(false, rng);
        if rng.r#gen::<f64>() >= self.config.profile_fill_rate {
            return GeneratedUser {
                user,
                weight: None,
                goals: None,
            };
        }

        let goals = self.config.goals[rng.gen_range(0..self.config.goals.len())].clone();
        GeneratedUser {
            user,
            weight: Some(self.generate_weight(rng)),
            goals: Some(goals),
        }
    }

    pub fn coach(&self, rng: &mut impl Rng) -> GeneratedUser {
        GeneratedUser {
            user: self.user(true, rng),
            weight: None,
            goals: None,
        }
    }

    pub fn athletes(&self, count: usize, rng: &mut impl Rng) -> Vec<GeneratedUser> {
        (0..count).map(|_| self.athlete(rng)).collect()
    }

    pub fn coaches(&self, count: usize, rng: &mut impl Rng) -> Vec<GeneratedUser> {
        (0..count).map(|_| self.coach(rng)).collect()
    }

    fn user(&self, is_coach: bool, rng: &mut impl Rng) -> User {
        let first_name: String = FirstName().fake_with_rng(rng);
        let last_name: String = LastName().fake_with_rng(rng);
        let username = generate_username(&first_name, &last_name, rng);
        User::new(username, first_name, last_name, is_coach)
    }

    /// Weight within the accepted 1..=899 range, clamped to plausible values.
    fn generate_weight(&self, rng: &mut impl Rng) -> i32 {
        match Normal::new(self.config.weight_mean, self.config.weight_std) {
            Ok(normal) => normal.sample(rng).clamp(45.0, 120.0).round() as i32,
            Err(_) => self.config.weight_mean.round() as i32,
        }
    }
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// `first.last1234`, lowercase ASCII.
fn generate_username(first: &str, last: &str, rng: &mut impl Rng) -> String {
    let normalized: String = format!("{first}.{last}")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect();
    let suffix: u32 = rng.gen_range(1..99_999);
    format!("{normalized}{suffix}")
}
