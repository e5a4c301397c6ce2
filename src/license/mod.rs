//! Activation codes, plans and expiry arithmetic.
//!
//! Everything here is pure: callers pass in "now" and the stored row, and get
//! back a verdict. Persistence lives in the license service.
//!
//! Validation is purely local and offers no protection against a user who edits
//! the database; it gates the app, it does not secure it.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use regex::Regex;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::clock::ceil_days;
use crate::constants::license::{
    LIFETIME_SENTINEL, MONTH_DAYS, TRIAL_DAYS, WEEK_DAYS, YEAR_DAYS,
};
use crate::entities::licenses;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}$").expect("Invalid regex")
    })
}

/// Duration class of a license, identified in codes by a 4-character tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum LicensePlan {
    #[sea_orm(string_value = "TRIAL")]
    Trial,
    #[sea_orm(string_value = "WEEK")]
    Week,
    #[sea_orm(string_value = "MONTH")]
    Month,
    #[sea_orm(string_value = "YEAR")]
    Year,
    #[sea_orm(string_value = "LIFETIME")]
    Lifetime,
}

impl LicensePlan {
    pub const ALL: [Self; 5] = [
        Self::Trial,
        Self::Week,
        Self::Month,
        Self::Year,
        Self::Lifetime,
    ];

    /// First group of every activation code for this plan.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Trial => "TRIA",
            Self::Week => "WEEK",
            Self::Month => "MNTH",
            Self::Year => "YEAR",
            Self::Lifetime => "LIFE",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Trial => "TRIAL",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
            Self::Lifetime => "LIFETIME",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|plan| plan.tag() == tag)
    }

    /// Day count, or `None` for a permanent license.
    #[must_use]
    pub const fn duration_days(&self) -> Option<i64> {
        match self {
            Self::Trial => Some(TRIAL_DAYS),
            Self::Week => Some(WEEK_DAYS),
            Self::Month => Some(MONTH_DAYS),
            Self::Year => Some(YEAR_DAYS),
            Self::Lifetime => None,
        }
    }
}

impl fmt::Display for LicensePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either the plan name (`MONTH`) or its code tag (`MNTH`).
impl FromStr for LicensePlan {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|plan| plan.name() == upper || plan.tag() == upper)
            .ok_or(CodeError::InvalidCode)
    }
}

/// Stored lifecycle marker. Callers should rely on [`describe`] for the
/// effective status, since the stored value is never flipped to expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Expired => "expired",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("Invalid activation code format")]
    InvalidFormat,

    #[error("Invalid activation code")]
    InvalidCode,

    #[error("Trial codes cannot be activated; start a free trial instead")]
    TrialNotAllowedHere,
}

/// Trims and upper-cases user input before any check.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[must_use]
pub fn is_valid_format(code: &str) -> bool {
    code_pattern().is_match(code)
}

/// Normalizes a user-supplied code and resolves the paid plan it encodes.
///
/// # Errors
///
/// Returns [`CodeError::InvalidFormat`] when the shape is wrong,
/// [`CodeError::InvalidCode`] for an unknown plan tag and
/// [`CodeError::TrialNotAllowedHere`] for trial codes.
pub fn parse_code(raw: &str) -> Result<(String, LicensePlan), CodeError> {
    let code = normalize_code(raw);
    if !is_valid_format(&code) {
        return Err(CodeError::InvalidFormat);
    }

    let plan = LicensePlan::from_tag(&code[..4]).ok_or(CodeError::InvalidCode)?;
    if plan == LicensePlan::Trial {
        return Err(CodeError::TrialNotAllowedHere);
    }

    Ok((code, plan))
}

/// Produces `TAG-XXXX-XXXX-XXXX`. Not suitable as a secret.
#[must_use]
pub fn generate_code(plan: LicensePlan) -> String {
    let mut rng = rand::rng();
    let mut group = || -> String {
        (0..4)
            .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
            .collect()
    };

    let (second, third, fourth) = (group(), group(), group());
    format!("{}-{second}-{third}-{fourth}", plan.tag())
}

/// When a license stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(DateTime<Utc>),
}

impl Expiry {
    #[must_use]
    pub fn for_plan(plan: LicensePlan, activated_at: DateTime<Utc>) -> Self {
        match plan.duration_days() {
            Some(days) => Self::At(activated_at + Duration::days(days)),
            None => Self::Never,
        }
    }

    /// Parses a stored `expires_at` value. Unparseable timestamps yield `None`.
    #[must_use]
    pub fn parse(stored: &str) -> Option<Self> {
        if stored == LIFETIME_SENTINEL {
            return Some(Self::Never);
        }
        DateTime::parse_from_rfc3339(stored)
            .ok()
            .map(|at| Self::At(at.with_timezone(&Utc)))
    }

    #[must_use]
    pub fn to_stored(&self) -> String {
        match self {
            Self::Never => LIFETIME_SENTINEL.to_string(),
            Self::At(at) => at.to_rfc3339(),
        }
    }

    /// Permanent, or strictly in the future.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Never => true,
            Self::At(at) => *at > now,
        }
    }

    /// `ceil((expiry - now) / day)`, or `None` for permanent licenses.
    #[must_use]
    pub fn remaining_days(&self, now: DateTime<Utc>) -> Option<i64> {
        match self {
            Self::Never => None,
            Self::At(at) => Some(ceil_days(*at - now)),
        }
    }
}

/// Whether a stored license row grants access at `now`.
#[must_use]
pub fn is_valid(license: Option<&licenses::Model>, now: DateTime<Utc>) -> bool {
    license
        .and_then(|l| Expiry::parse(&l.expires_at))
        .is_some_and(|expiry| expiry.is_valid_at(now))
}

/// Effective license state for display and gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseInfo {
    pub status: LicenseStatus,
    pub plan: Option<LicensePlan>,
    pub is_trial: bool,
    pub remaining_days: Option<i64>,
    pub activated_at: Option<String>,
    pub expires_at: Option<String>,
}

impl LicenseInfo {
    #[must_use]
    pub fn message(&self) -> String {
        match (self.status, self.plan, self.remaining_days) {
            (LicenseStatus::Inactive, _, _) => "No active license".to_string(),
            (LicenseStatus::Expired, _, _) => "License expired".to_string(),
            (LicenseStatus::Active, Some(LicensePlan::Lifetime), _) => {
                "Lifetime License".to_string()
            }
            (LicenseStatus::Active, _, Some(1)) => "License expires in 1 day".to_string(),
            (LicenseStatus::Active, _, Some(days)) => format!("License expires in {days} days"),
            (LicenseStatus::Active, _, None) => "License active".to_string(),
        }
    }
}

/// Derives the effective status of a stored row.
///
/// A remaining-day count of zero or less reports `expired`, as does an
/// expiry timestamp that cannot be parsed.
#[must_use]
pub fn describe(license: Option<&licenses::Model>, now: DateTime<Utc>) -> LicenseInfo {
    let Some(license) = license else {
        return LicenseInfo {
            status: LicenseStatus::Inactive,
            plan: None,
            is_trial: false,
            remaining_days: None,
            activated_at: None,
            expires_at: None,
        };
    };

    let expiry = Expiry::parse(&license.expires_at);
    let remaining_days = expiry.and_then(|e| e.remaining_days(now));
    let status = match (expiry, remaining_days) {
        (Some(Expiry::Never), _) => LicenseStatus::Active,
        (Some(Expiry::At(_)), Some(days)) if days > 0 => LicenseStatus::Active,
        _ => LicenseStatus::Expired,
    };

    LicenseInfo {
        status,
        plan: Some(license.plan),
        is_trial: license.is_trial,
        remaining_days,
        activated_at: Some(license.activated_at.clone()),
        expires_at: Some(license.expires_at.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn row(plan: LicensePlan, activated: DateTime<Utc>) -> licenses::Model {
        licenses::Model {
            user_id: 7,
            activation_code: Some(format!("{}-AB12-CD34-EF56", plan.tag())),
            plan,
            is_trial: plan == LicensePlan::Trial,
            activated_at: activated.to_rfc3339(),
            expires_at: Expiry::for_plan(plan, activated).to_stored(),
            status: LicenseStatus::Active,
        }
    }

    #[test]
    fn generated_codes_match_the_pattern() {
        for plan in LicensePlan::ALL {
            for _ in 0..50 {
                let code = generate_code(plan);
                assert!(is_valid_format(&code), "bad code {code}");
                assert_eq!(&code[..4], plan.tag());
            }
        }
    }

    #[test]
    fn parse_code_normalizes_input() {
        let (code, plan) = parse_code("  mnth-ab12-cd34-ef56 ").unwrap();
        assert_eq!(code, "MNTH-AB12-CD34-EF56");
        assert_eq!(plan, LicensePlan::Month);
    }

    #[test]
    fn parse_code_rejections() {
        assert_eq!(parse_code("MNTH-AB12-CD34"), Err(CodeError::InvalidFormat));
        assert_eq!(parse_code("MNTH_AB12_CD34_EF56"), Err(CodeError::InvalidFormat));
        assert_eq!(parse_code("ZZZZ-AB12-CD34-EF56"), Err(CodeError::InvalidCode));
        assert_eq!(
            parse_code("TRIA-AB12-CD34-EF56"),
            Err(CodeError::TrialNotAllowedHere)
        );
    }

    #[test]
    fn plan_parses_from_name_or_tag() {
        assert_eq!("month".parse::<LicensePlan>(), Ok(LicensePlan::Month));
        assert_eq!("MNTH".parse::<LicensePlan>(), Ok(LicensePlan::Month));
        assert_eq!("life".parse::<LicensePlan>(), Ok(LicensePlan::Lifetime));
        assert!("decade".parse::<LicensePlan>().is_err());
    }

    #[test]
    fn month_license_expires_after_thirty_days() {
        let activated = at(2024, 3, 1);
        let license = row(LicensePlan::Month, activated);
        assert_eq!(
            Expiry::parse(&license.expires_at),
            Some(Expiry::At(activated + Duration::days(30)))
        );

        let info = describe(Some(&license), activated);
        assert_eq!(info.status, LicenseStatus::Active);
        assert_eq!(info.remaining_days, Some(30));
        assert_eq!(info.message(), "License expires in 30 days");
    }

    #[test]
    fn validity_is_monotonic_for_time_bound_licenses() {
        let activated = at(2024, 3, 1);
        let license = row(LicensePlan::Week, activated);

        let mut seen_invalid = false;
        for hours in (0..24 * 10).step_by(6) {
            let valid = is_valid(Some(&license), activated + Duration::hours(hours));
            if seen_invalid {
                assert!(!valid, "license became valid again at +{hours}h");
            }
            seen_invalid |= !valid;
        }
        assert!(seen_invalid);
        assert!(!is_valid(Some(&license), activated + Duration::days(7)));
    }

    #[test]
    fn lifetime_never_expires() {
        let license = row(LicensePlan::Lifetime, at(2024, 1, 1));
        assert_eq!(license.expires_at, LIFETIME_SENTINEL);
        assert!(is_valid(Some(&license), at(2099, 1, 1)));

        let info = describe(Some(&license), at(2099, 1, 1));
        assert_eq!(info.status, LicenseStatus::Active);
        assert_eq!(info.remaining_days, None);
        assert_eq!(info.message(), "Lifetime License");
    }

    #[test]
    fn missing_license_is_inactive() {
        assert!(!is_valid(None, at(2024, 1, 1)));
        assert_eq!(describe(None, at(2024, 1, 1)).status, LicenseStatus::Inactive);
    }

    #[test]
    fn expired_when_remaining_days_not_positive() {
        let activated = at(2024, 3, 1);
        let license = row(LicensePlan::Trial, activated);

        let half_day = describe(Some(&license), activated + Duration::hours(12));
        assert_eq!(half_day.status, LicenseStatus::Active);
        assert_eq!(half_day.remaining_days, Some(1));

        let exact = describe(Some(&license), activated + Duration::days(1));
        assert_eq!(exact.status, LicenseStatus::Expired);
        assert_eq!(exact.remaining_days, Some(0));

        let later = describe(Some(&license), activated + Duration::hours(60));
        assert_eq!(later.status, LicenseStatus::Expired);
        assert_eq!(later.remaining_days, Some(-1));
    }

    #[test]
    fn garbage_expiry_is_treated_as_expired() {
        let mut license = row(LicensePlan::Year, at(2024, 1, 1));
        license.expires_at = "soon".to_string();
        assert!(!is_valid(Some(&license), at(2024, 1, 2)));
        assert_eq!(describe(Some(&license), at(2024, 1, 2)).status, LicenseStatus::Expired);
    }
}
