//! Session configuration and rule options.
//!
//! A game type registers a default [`GameConfig`]. Callers creating a session
//! pass [`ConfigOverrides`], which are merged on top of the defaults and then
//! validated. Unknown keys are rejected when overrides are deserialised.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ceiling for [`RuleSettings::max_bet`]. Doubled split stakes and insurance
/// stay far inside `i64` below it.
pub const MAX_BET_LIMIT: u64 = 1_000_000_000_000;

const fn default_max_bet() -> u64 {
    1_000_000
}

/// Conditions under which doubling down is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DoubleOption {
    /// Double down allowed on any two-card hand.
    #[default]
    Any,
    /// Double down allowed only on 9 or 10.
    NineOrTen,
    /// Double down allowed only on 9 through 11.
    NineThrough11,
    /// Double down allowed only on 9 through 15.
    NineThrough15,
    /// Double down not allowed.
    None,
}

impl DoubleOption {
    /// Returns whether a hand of this value may double.
    #[must_use]
    pub const fn allows(self, value: u8) -> bool {
        match self {
            Self::Any => true,
            Self::NineOrTen => value == 9 || value == 10,
            Self::NineThrough11 => value >= 9 && value <= 11,
            Self::NineThrough15 => value >= 9 && value <= 15,
            Self::None => false,
        }
    }
}

/// Rounding mode for fractional payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round up.
    Up,
    /// Round down.
    Down,
    /// Round to nearest.
    Nearest,
}

/// Rule settings recognised by the built-in rule sets.
///
/// Use the builder methods to customise them:
///
/// ```
/// use cardtable::RuleSettings;
///
/// let settings = RuleSettings::default()
///     .with_decks(6)
///     .with_blackjack_pays(1.5)
///     .with_dealer_hits_soft_17(false);
/// assert_eq!(settings.decks, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    /// Number of decks in the shoe.
    pub decks: u8,
    /// Whether the dealer draws on a soft 17.
    pub dealer_hits_soft_17: bool,
    /// Blackjack payout multiplier applied to the bet.
    pub blackjack_pays: f64,
    /// Double down conditions.
    pub double: DoubleOption,
    /// Whether split hands may double.
    pub double_after_split: bool,
    /// Maximum number of splits per player.
    pub max_splits: u8,
    /// Whether surrender is offered.
    pub surrender: bool,
    /// Whether insurance is offered.
    pub insurance: bool,
    /// Rounding for blackjack payouts.
    pub rounding_blackjack: RoundingMode,
    /// Rounding for surrender refunds.
    pub rounding_surrender: RoundingMode,
    /// Largest stake a player may put on the table.
    #[serde(default = "default_max_bet")]
    pub max_bet: u64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            decks: 1,
            dealer_hits_soft_17: true,
            blackjack_pays: 1.5,
            double: DoubleOption::Any,
            double_after_split: true,
            max_splits: 1,
            surrender: false,
            insurance: true,
            rounding_blackjack: RoundingMode::Down,
            rounding_surrender: RoundingMode::Down,
            max_bet: default_max_bet(),
        }
    }
}

impl RuleSettings {
    /// Sets the number of decks in the shoe.
    #[must_use]
    pub const fn with_decks(mut self, decks: u8) -> Self {
        self.decks = decks;
        self
    }

    /// Sets whether the dealer hits soft 17.
    #[must_use]
    pub const fn with_dealer_hits_soft_17(mut self, hits: bool) -> Self {
        self.dealer_hits_soft_17 = hits;
        self
    }

    /// Sets the blackjack payout multiplier.
    #[must_use]
    pub const fn with_blackjack_pays(mut self, ratio: f64) -> Self {
        self.blackjack_pays = ratio;
        self
    }

    /// Sets the double down conditions.
    #[must_use]
    pub const fn with_double(mut self, double: DoubleOption) -> Self {
        self.double = double;
        self
    }

    /// Sets whether split hands may double.
    #[must_use]
    pub const fn with_double_after_split(mut self, allowed: bool) -> Self {
        self.double_after_split = allowed;
        self
    }

    /// Sets the maximum number of splits.
    #[must_use]
    pub const fn with_max_splits(mut self, splits: u8) -> Self {
        self.max_splits = splits;
        self
    }

    /// Sets whether surrender is offered.
    #[must_use]
    pub const fn with_surrender(mut self, allowed: bool) -> Self {
        self.surrender = allowed;
        self
    }

    /// Sets whether insurance is offered.
    #[must_use]
    pub const fn with_insurance(mut self, offered: bool) -> Self {
        self.insurance = offered;
        self
    }

    /// Sets the rounding for blackjack payouts.
    #[must_use]
    pub const fn with_rounding_blackjack(mut self, mode: RoundingMode) -> Self {
        self.rounding_blackjack = mode;
        self
    }

    /// Sets the rounding for surrender refunds.
    #[must_use]
    pub const fn with_rounding_surrender(mut self, mode: RoundingMode) -> Self {
        self.rounding_surrender = mode;
        self
    }

    /// Sets the table stake limit.
    #[must_use]
    pub const fn with_max_bet(mut self, max_bet: u64) -> Self {
        self.max_bet = max_bet;
        self
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=8).contains(&self.decks) {
            return Err(ConfigError::InvalidSetting {
                key: "decks",
                reason: "must be between 1 and 8",
            });
        }
        if !self.blackjack_pays.is_finite() || self.blackjack_pays <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                key: "blackjack_pays",
                reason: "must be a positive number",
            });
        }
        if !(1..=MAX_BET_LIMIT).contains(&self.max_bet) {
            return Err(ConfigError::InvalidSetting {
                key: "max_bet",
                reason: "must be between 1 and 10^12",
            });
        }
        Ok(())
    }
}

/// Full configuration of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    /// Table name shown in the lobby.
    pub name: Option<String>,
    /// Whether joining needs a password. The password itself is checked by
    /// the identity collaborator.
    pub password_protected: bool,
    /// Players needed before the session is ready.
    pub min_players: usize,
    /// Seats at the table.
    pub max_players: usize,
    /// Named rule variants in effect (`standard`, `double-deck`, ...).
    pub variants: Vec<String>,
    /// Rule settings.
    pub settings: RuleSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: None,
            password_protected: false,
            min_players: 2,
            max_players: 4,
            variants: Vec::new(),
            settings: RuleSettings::default(),
        }
    }
}

impl GameConfig {
    /// Sets the table name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the player bounds.
    #[must_use]
    pub const fn with_players(mut self, min: usize, max: usize) -> Self {
        self.min_players = min;
        self.max_players = max;
        self
    }

    /// Sets the declared rule variants.
    #[must_use]
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the rule settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: RuleSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Checks the configuration is self-consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PlayerBounds`] for empty or inverted bounds and
    /// whatever [`RuleSettings::validate`] reports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players == 0 || self.min_players > self.max_players {
            return Err(ConfigError::PlayerBounds {
                min: self.min_players,
                max: self.max_players,
            });
        }
        self.settings.validate()
    }
}

/// Partial rule settings; every present key replaces the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SettingsOverrides {
    /// See [`RuleSettings::decks`].
    pub decks: Option<u8>,
    /// See [`RuleSettings::dealer_hits_soft_17`].
    pub dealer_hits_soft_17: Option<bool>,
    /// See [`RuleSettings::blackjack_pays`].
    pub blackjack_pays: Option<f64>,
    /// See [`RuleSettings::double`].
    pub double: Option<DoubleOption>,
    /// See [`RuleSettings::double_after_split`].
    pub double_after_split: Option<bool>,
    /// See [`RuleSettings::max_splits`].
    pub max_splits: Option<u8>,
    /// See [`RuleSettings::surrender`].
    pub surrender: Option<bool>,
    /// See [`RuleSettings::insurance`].
    pub insurance: Option<bool>,
    /// See [`RuleSettings::rounding_blackjack`].
    pub rounding_blackjack: Option<RoundingMode>,
    /// See [`RuleSettings::rounding_surrender`].
    pub rounding_surrender: Option<RoundingMode>,
    /// See [`RuleSettings::max_bet`].
    pub max_bet: Option<u64>,
}

impl SettingsOverrides {
    fn merge_into(&self, settings: &mut RuleSettings) {
        if let Some(decks) = self.decks {
            settings.decks = decks;
        }
        if let Some(hits) = self.dealer_hits_soft_17 {
            settings.dealer_hits_soft_17 = hits;
        }
        if let Some(ratio) = self.blackjack_pays {
            settings.blackjack_pays = ratio;
        }
        if let Some(double) = self.double {
            settings.double = double;
        }
        if let Some(allowed) = self.double_after_split {
            settings.double_after_split = allowed;
        }
        if let Some(splits) = self.max_splits {
            settings.max_splits = splits;
        }
        if let Some(allowed) = self.surrender {
            settings.surrender = allowed;
        }
        if let Some(offered) = self.insurance {
            settings.insurance = offered;
        }
        if let Some(mode) = self.rounding_blackjack {
            settings.rounding_blackjack = mode;
        }
        if let Some(mode) = self.rounding_surrender {
            settings.rounding_surrender = mode;
        }
        if let Some(max_bet) = self.max_bet {
            settings.max_bet = max_bet;
        }
    }
}

/// Caller-supplied changes to a game type's default configuration.
///
/// `settings` merges key by key; every other present value replaces the
/// default outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ConfigOverrides {
    /// Table name.
    pub name: Option<String>,
    /// Whether joining needs a password.
    pub password_protected: Option<bool>,
    /// Minimum players.
    pub min_players: Option<usize>,
    /// Maximum players.
    pub max_players: Option<usize>,
    /// Rule variants in effect; must be offered by the game type.
    pub variants: Option<Vec<String>>,
    /// Rule settings to change.
    pub settings: Option<SettingsOverrides>,
}

impl ConfigOverrides {
    /// Sets the table name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the player bounds.
    #[must_use]
    pub const fn with_players(mut self, min: usize, max: usize) -> Self {
        self.min_players = Some(min);
        self.max_players = Some(max);
        self
    }

    /// Sets the rule setting changes.
    #[must_use]
    pub fn with_settings(mut self, settings: SettingsOverrides) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Merges these overrides onto `defaults` and validates the result.
    ///
    /// Player bounds may only narrow the type's bounds, and variants must be
    /// among those the type declares.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violation.
    pub fn apply(&self, defaults: &GameConfig) -> Result<GameConfig, ConfigError> {
        let mut config = defaults.clone();

        if let Some(name) = &self.name {
            config.name = Some(name.clone());
        }
        if let Some(protected) = self.password_protected {
            config.password_protected = protected;
        }
        if let Some(min) = self.min_players {
            config.min_players = min;
        }
        if let Some(max) = self.max_players {
            config.max_players = max;
        }
        if let Some(variants) = &self.variants {
            if let Some(unknown) = variants.iter().find(|v| !defaults.variants.contains(v)) {
                return Err(ConfigError::UnknownVariant(unknown.clone()));
            }
            config.variants.clone_from(variants);
        }
        if let Some(settings) = &self.settings {
            settings.merge_into(&mut config.settings);
        }

        if config.min_players < defaults.min_players || config.max_players > defaults.max_players
        {
            return Err(ConfigError::OutsideTypeBounds {
                min: defaults.min_players,
                max: defaults.max_players,
            });
        }

        config.validate()?;
        Ok(config)
    }
}
