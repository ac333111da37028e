//! [`MicroblogApi`] over the Twitter REST client.

use crate::api::{ApiError, Candidate, MicroblogApi, SearchParams};
use std::time::Duration;
use twitter_client::{Client, Geocode, SearchQuery, Status, TwitterError};

pub struct TwitterApi {
    client: Client,
}

impl TwitterApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn classify(err: TwitterError) -> ApiError {
    if err.is_rate_limited() {
        let retry_after = err.rate_limit_reset().and_then(|reset| {
            let secs = reset - chrono::Utc::now().timestamp();
            (secs > 0).then(|| Duration::from_secs(secs as u64))
        });
        ApiError::RateLimited { retry_after }
    } else if err.is_duplicate_status() {
        ApiError::DuplicateContent
    } else {
        ApiError::other(err.to_string())
    }
}

fn to_candidate(status: Status) -> Candidate {
    let is_retweet = status.is_retweet();
    Candidate {
        handle: status.user.screen_name,
        post_id: status.id,
        follower_count: status.user.followers_count,
        is_retweet,
    }
}

impl MicroblogApi for TwitterApi {
    fn search(&self, params: &SearchParams) -> Result<Vec<Candidate>, ApiError> {
        let query = SearchQuery {
            q: params.query.clone(),
            lang: Some(params.lang.clone()),
            geocode: Some(Geocode {
                latitude: params.latitude,
                longitude: params.longitude,
                radius_km: params.radius_km,
            }),
            result_type: Some(params.result_type.clone()),
            count: Some(params.count),
        };
        let statuses = self.client.search(&query).map_err(classify)?;
        Ok(statuses.into_iter().map(to_candidate).collect())
    }

    fn follower_count(&self, handle: &str, limit: u32) -> Result<u64, ApiError> {
        let ids = self.client.follower_ids(handle, limit).map_err(classify)?;
        Ok(ids.len() as u64)
    }

    fn post_reply(&self, text: &str, in_reply_to: u64) -> Result<(), ApiError> {
        self.client
            .post_update(text, Some(in_reply_to))
            .map(|_| ())
            .map_err(classify)
    }

    fn verify_credentials(&self) -> Result<String, ApiError> {
        let user = self.client.verify_credentials().map_err(classify)?;
        Ok(user.screen_name)
    }
}
