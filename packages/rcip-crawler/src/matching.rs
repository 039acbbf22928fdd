//! Job-to-applicant match scoring.
//!
//! Scores range 0-100: 40 for the same occupation code (20 when the job's
//! code starts with the first three digits of the applicant's), 30 for the same skill tier (15 when one
//! level apart) and 30 when the employer is verified.

use crate::error::{StoreError, StoreResult};
use crate::traits::store::JobStore;
use crate::types::posting::SkillTier;
use crate::types::store::JobId;

const EXACT_CODE: u8 = 40;
const RELATED_CODE: u8 = 20;
const EXACT_TIER: u8 = 30;
const ADJACENT_TIER: u8 = 15;
const VERIFIED_EMPLOYER: u8 = 30;
const MAX_SCORE: u8 = 100;

/// Score one job against an applicant's occupation code and tier.
///
/// Unclassified jobs only earn the employer component.
pub fn score_job_match(
    job_code: Option<&str>,
    job_tier: Option<SkillTier>,
    employer_verified: bool,
    user_code: &str,
    user_tier: SkillTier,
) -> u8 {
    let mut score = 0u8;

    if let Some(code) = job_code {
        if code == user_code {
            score += EXACT_CODE;
        } else if shares_major_group(code, user_code) {
            score += RELATED_CODE;
        }
    }

    if let Some(tier) = job_tier {
        match tier.level().abs_diff(user_tier.level()) {
            0 => score += EXACT_TIER,
            1 => score += ADJACENT_TIER,
            _ => {}
        }
    }

    if employer_verified {
        score += VERIFIED_EMPLOYER;
    }

    score.min(MAX_SCORE)
}

/// Whether `job_code` starts with up to the first three characters of
/// `user_code`. A blank applicant code never matches.
fn shares_major_group(job_code: &str, user_code: &str) -> bool {
    let prefix: String = user_code.trim().chars().take(3).collect();
    !prefix.is_empty() && job_code.starts_with(&prefix)
}

/// Score a stored job, looking up its employer's verification status.
pub async fn rank_job_match(
    store: &dyn JobStore,
    job_id: JobId,
    user_code: &str,
    user_tier: SkillTier,
) -> StoreResult<u8> {
    let job = store
        .get_job(job_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("job {}", job_id)))?;
    let employer = store
        .get_employer(job.employer_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("employer {}", job.employer_id)))?;

    Ok(score_job_match(
        job.fields.occupation_code.as_deref(),
        job.fields.skill_tier,
        employer.is_verified,
        user_code,
        user_tier,
    ))
}
